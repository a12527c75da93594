// Copyright (C) 2021-2025 the DTVM authors. All Rights Reserved.
// SPDX-License-Identifier: Apache-2.0

//! Memory ABI Adapters
//!
//! Guest toolchains disagree on how a byte buffer crosses the host boundary.
//! Each convention is one adapter:
//!
//! - [`TwoRegisterAdapter`] - `(ptr: i32, len: i32)`, caller-owned buffers
//! - [`PackedI64Adapter`] - one `i64` holding `ptr << 32 | len`, freed on read
//! - [`AssemblyScriptAdapter`] - one `i32`, length in a header at `ptr - 4`
//!
//! [`MemoryAdapter`] is the closed set of adapters the loader can pick from.
//! A [`PointerRepr`] produced by one adapter is rejected by the others.

pub mod accessor;
pub mod assemblyscript;
pub mod packed_i64;
pub mod registry;
pub mod two_register;

pub use accessor::MemoryAccessor;
pub use assemblyscript::AssemblyScriptAdapter;
pub use packed_i64::PackedI64Adapter;
pub use registry::{AdapterRegistry, AllocatorExports};
pub use two_register::TwoRegisterAdapter;

use crate::core::instance::GuestInstance;
use crate::core::types::{ValueType, WasmValue};
use crate::error::{memory_fault, validation_error, HostResult};
use std::fmt;

/// Calling convention identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AbiKind {
    TwoRegister,
    PackedI64,
    SelfDescribing,
}

impl fmt::Display for AbiKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            AbiKind::TwoRegister => "two-register",
            AbiKind::PackedI64 => "packed-i64",
            AbiKind::SelfDescribing => "self-describing",
        };
        f.write_str(name)
    }
}

/// ABI-specific encoding of a guest buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerRepr {
    TwoRegister { ptr: i32, len: i32 },
    PackedI64(i64),
    SelfDescribing(i32),
}

impl PointerRepr {
    pub fn kind(&self) -> AbiKind {
        match self {
            PointerRepr::TwoRegister { .. } => AbiKind::TwoRegister,
            PointerRepr::PackedI64(_) => AbiKind::PackedI64,
            PointerRepr::SelfDescribing(_) => AbiKind::SelfDescribing,
        }
    }
}

/// One calling convention for passing buffers between host and guest.
pub trait MemoryAbi {
    fn kind(&self) -> AbiKind;

    /// Native parameter types one logical pointer expands to.
    fn ptr_value_types(&self) -> &'static [ValueType];

    /// How many native parameters one logical pointer occupies.
    fn ptr_param_count(&self) -> usize {
        self.ptr_value_types().len()
    }

    /// Allocate guest memory through the guest's allocator and copy `data` in.
    fn allocate_and_write(
        &self,
        instance: &mut dyn GuestInstance,
        data: &[u8],
    ) -> HostResult<PointerRepr>;

    /// Copy the buffer `ptr` refers to out of guest memory.
    fn read_from_ptr(&self, instance: &mut dyn GuestInstance, ptr: PointerRepr)
        -> HostResult<Vec<u8>>;

    /// Read a guest string. UTF-8 unless the convention says otherwise.
    fn read_string_from_ptr(
        &self,
        instance: &mut dyn GuestInstance,
        ptr: PointerRepr,
    ) -> HostResult<String> {
        let bytes = self.read_from_ptr(instance, ptr)?;
        String::from_utf8(bytes).map_err(|e| memory_fault(&format!("invalid utf8: {}", e), None, None))
    }

    /// Fold `ptr_param_count()` native values into a pointer.
    fn pointer_from_params(&self, params: &[WasmValue]) -> HostResult<PointerRepr>;

    /// Expand a pointer into native values.
    fn pointer_to_params(&self, ptr: PointerRepr) -> HostResult<Vec<WasmValue>>;
}

/// The closed set of supported adapters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MemoryAdapter {
    TwoRegister(TwoRegisterAdapter),
    PackedI64(PackedI64Adapter),
    SelfDescribing(AssemblyScriptAdapter),
}

impl MemoryAdapter {
    pub fn two_register() -> Self {
        MemoryAdapter::TwoRegister(TwoRegisterAdapter::default())
    }

    pub fn packed_i64() -> Self {
        MemoryAdapter::PackedI64(PackedI64Adapter::default())
    }

    pub fn assemblyscript() -> Self {
        MemoryAdapter::SelfDescribing(AssemblyScriptAdapter)
    }

    fn inner(&self) -> &dyn MemoryAbi {
        match self {
            MemoryAdapter::TwoRegister(a) => a,
            MemoryAdapter::PackedI64(a) => a,
            MemoryAdapter::SelfDescribing(a) => a,
        }
    }
}

impl MemoryAbi for MemoryAdapter {
    fn kind(&self) -> AbiKind {
        self.inner().kind()
    }

    fn ptr_value_types(&self) -> &'static [ValueType] {
        self.inner().ptr_value_types()
    }

    fn allocate_and_write(
        &self,
        instance: &mut dyn GuestInstance,
        data: &[u8],
    ) -> HostResult<PointerRepr> {
        self.inner().allocate_and_write(instance, data)
    }

    fn read_from_ptr(
        &self,
        instance: &mut dyn GuestInstance,
        ptr: PointerRepr,
    ) -> HostResult<Vec<u8>> {
        self.inner().read_from_ptr(instance, ptr)
    }

    fn read_string_from_ptr(
        &self,
        instance: &mut dyn GuestInstance,
        ptr: PointerRepr,
    ) -> HostResult<String> {
        self.inner().read_string_from_ptr(instance, ptr)
    }

    fn pointer_from_params(&self, params: &[WasmValue]) -> HostResult<PointerRepr> {
        self.inner().pointer_from_params(params)
    }

    fn pointer_to_params(&self, ptr: PointerRepr) -> HostResult<Vec<WasmValue>> {
        self.inner().pointer_to_params(ptr)
    }
}

/// Call a guest allocator export and return the offset it handed out.
pub(crate) fn call_allocator(
    instance: &mut dyn GuestInstance,
    export: &str,
    args: &[WasmValue],
) -> HostResult<u32> {
    if !instance.has_export(export) {
        return Err(memory_fault(
            &format!("allocator export '{}' not found", export),
            None,
            None,
        ));
    }
    let result = instance.call_export(export, args)?;
    let ptr = match result.first() {
        Some(WasmValue::I32(ptr)) => *ptr,
        _ => {
            return Err(memory_fault(
                &format!("allocator '{}' returned no i32", export),
                None,
                None,
            ))
        }
    };
    if ptr <= 0 {
        return Err(memory_fault(
            &format!("allocator '{}' returned {}", export, ptr),
            Some(ptr as i64 as u64),
            None,
        ));
    }
    Ok(ptr as u32)
}

pub(crate) fn data_len_i32(data: &[u8]) -> HostResult<i32> {
    i32::try_from(data.len()).map_err(|_| memory_fault("buffer larger than 2 GiB", None, None))
}

pub(crate) fn mismatch(expected: AbiKind, found: PointerRepr) -> crate::error::HostError {
    memory_fault(
        &format!("{} adapter cannot decode a {} pointer", expected, found.kind()),
        None,
        None,
    )
}

pub(crate) fn param_count_error(expected: usize, found: usize) -> crate::error::HostError {
    validation_error(format!(
        "pointer needs {} native params, got {}",
        expected, found
    ))
}
