// Copyright (C) 2021-2025 the DTVM authors. All Rights Reserved.
// SPDX-License-Identifier: Apache-2.0

//! `(ptr: i32, len: i32)` convention. Buffers stay owned by the guest.

use super::{call_allocator, data_len_i32, mismatch, param_count_error, AbiKind, MemoryAbi, PointerRepr};
use crate::core::instance::GuestInstance;
use crate::core::types::{ValueType, WasmValue};
use crate::error::HostResult;
use crate::memory::accessor::{validate_offset, MemoryAccessor};

pub const DEFAULT_ALLOC_EXPORT: &str = "alloc";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TwoRegisterAdapter {
    alloc_export: String,
}

impl TwoRegisterAdapter {
    pub fn new(alloc_export: &str) -> Self {
        Self {
            alloc_export: alloc_export.to_string(),
        }
    }

    pub fn alloc_export(&self) -> &str {
        &self.alloc_export
    }
}

impl Default for TwoRegisterAdapter {
    fn default() -> Self {
        Self::new(DEFAULT_ALLOC_EXPORT)
    }
}

impl MemoryAbi for TwoRegisterAdapter {
    fn kind(&self) -> AbiKind {
        AbiKind::TwoRegister
    }

    fn ptr_value_types(&self) -> &'static [ValueType] {
        &[ValueType::I32, ValueType::I32]
    }

    fn allocate_and_write(
        &self,
        instance: &mut dyn GuestInstance,
        data: &[u8],
    ) -> HostResult<PointerRepr> {
        let len = data_len_i32(data)?;
        let ptr = call_allocator(instance, &self.alloc_export, &[WasmValue::I32(len)])?;
        MemoryAccessor::new(instance).write_bytes(ptr, data)?;
        Ok(PointerRepr::TwoRegister {
            ptr: ptr as i32,
            len,
        })
    }

    fn read_from_ptr(
        &self,
        instance: &mut dyn GuestInstance,
        ptr: PointerRepr,
    ) -> HostResult<Vec<u8>> {
        let PointerRepr::TwoRegister { ptr, len } = ptr else {
            return Err(mismatch(self.kind(), ptr));
        };
        let offset = validate_offset(ptr, "two-register pointer")?;
        let length = validate_offset(len, "two-register length")?;
        MemoryAccessor::new(instance).read_bytes_vec(offset, length)
    }

    fn pointer_from_params(&self, params: &[WasmValue]) -> HostResult<PointerRepr> {
        match params {
            [ptr, len] => Ok(PointerRepr::TwoRegister {
                ptr: ptr.as_i32()?,
                len: len.as_i32()?,
            }),
            _ => Err(param_count_error(2, params.len())),
        }
    }

    fn pointer_to_params(&self, ptr: PointerRepr) -> HostResult<Vec<WasmValue>> {
        match ptr {
            PointerRepr::TwoRegister { ptr, len } => {
                Ok(vec![WasmValue::I32(ptr), WasmValue::I32(len)])
            }
            other => Err(mismatch(self.kind(), other)),
        }
    }
}
