// Copyright (C) 2021-2025 the DTVM authors. All Rights Reserved.
// SPDX-License-Identifier: Apache-2.0

//! Packed 64-bit pointers: `(ptr << 32) | len` in a single `i64`.
//!
//! Reading a buffer transfers its ownership to the host, so every
//! successful read is followed by exactly one call to the guest's free
//! export with the decoded pointer.
//!
//! Strings are C strings: they run from the decoded offset to the first null
//! byte, the packed length is ignored and nothing is freed.

use super::{call_allocator, data_len_i32, mismatch, param_count_error, AbiKind, MemoryAbi, PointerRepr};
use crate::core::instance::GuestInstance;
use crate::core::types::{ValueType, WasmValue};
use crate::error::{memory_fault, HostResult};
use crate::memory::accessor::MemoryAccessor;
use log::debug;

pub const DEFAULT_ALLOC_EXPORT: &str = "malloc";
pub const DEFAULT_FREE_EXPORT: &str = "free";

/// Pack an offset and a length into one `i64`.
pub fn build_ptr_i64(ptr: u32, len: u32) -> i64 {
    (((ptr as u64) << 32) | len as u64) as i64
}

/// Split a packed `i64` into `(offset, length)`.
pub fn decode_ptr_i64(value: i64) -> (u32, u32) {
    let raw = value as u64;
    ((raw >> 32) as u32, (raw & 0xFFFF_FFFF) as u32)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackedI64Adapter {
    alloc_export: String,
    free_export: String,
}

impl PackedI64Adapter {
    pub fn new(alloc_export: &str, free_export: &str) -> Self {
        Self {
            alloc_export: alloc_export.to_string(),
            free_export: free_export.to_string(),
        }
    }

    pub fn alloc_export(&self) -> &str {
        &self.alloc_export
    }

    pub fn free_export(&self) -> &str {
        &self.free_export
    }

    fn free(&self, instance: &mut dyn GuestInstance, ptr: u32) -> HostResult<()> {
        if !instance.has_export(&self.free_export) {
            return Err(memory_fault(
                &format!("free export '{}' not found", self.free_export),
                Some(ptr as u64),
                None,
            ));
        }
        instance
            .call_export(&self.free_export, &[WasmValue::I32(ptr as i32)])
            .map_err(|e| memory_fault(&format!("cannot free memory: {}", e), Some(ptr as u64), None))?;
        Ok(())
    }
}

impl Default for PackedI64Adapter {
    fn default() -> Self {
        Self::new(DEFAULT_ALLOC_EXPORT, DEFAULT_FREE_EXPORT)
    }
}

impl MemoryAbi for PackedI64Adapter {
    fn kind(&self) -> AbiKind {
        AbiKind::PackedI64
    }

    fn ptr_value_types(&self) -> &'static [ValueType] {
        &[ValueType::I64]
    }

    fn allocate_and_write(
        &self,
        instance: &mut dyn GuestInstance,
        data: &[u8],
    ) -> HostResult<PointerRepr> {
        let len = data_len_i32(data)?;
        let ptr = call_allocator(instance, &self.alloc_export, &[WasmValue::I32(len)])?;
        MemoryAccessor::new(instance).write_bytes(ptr, data)?;
        Ok(PointerRepr::PackedI64(build_ptr_i64(ptr, len as u32)))
    }

    fn read_from_ptr(
        &self,
        instance: &mut dyn GuestInstance,
        ptr: PointerRepr,
    ) -> HostResult<Vec<u8>> {
        let PointerRepr::PackedI64(packed) = ptr else {
            return Err(mismatch(self.kind(), ptr));
        };
        let (offset, length) = decode_ptr_i64(packed);
        let data = MemoryAccessor::new(&mut *instance).read_bytes_vec(offset, length)?;
        debug!("packed-i64 read {} bytes at {}, freeing", length, offset);
        self.free(instance, offset)?;
        Ok(data)
    }

    fn read_string_from_ptr(
        &self,
        instance: &mut dyn GuestInstance,
        ptr: PointerRepr,
    ) -> HostResult<String> {
        let PointerRepr::PackedI64(packed) = ptr else {
            return Err(mismatch(self.kind(), ptr));
        };
        let (offset, _) = decode_ptr_i64(packed);
        let bytes = MemoryAccessor::new(&mut *instance).read_until_null(offset)?;
        String::from_utf8(bytes)
            .map_err(|e| memory_fault(&format!("invalid utf8: {}", e), Some(offset as u64), None))
    }

    fn pointer_from_params(&self, params: &[WasmValue]) -> HostResult<PointerRepr> {
        match params {
            [value] => Ok(PointerRepr::PackedI64(value.as_i64()?)),
            _ => Err(param_count_error(1, params.len())),
        }
    }

    fn pointer_to_params(&self, ptr: PointerRepr) -> HostResult<Vec<WasmValue>> {
        match ptr {
            PointerRepr::PackedI64(value) => Ok(vec![WasmValue::I64(value)]),
            other => Err(mismatch(self.kind(), other)),
        }
    }
}
