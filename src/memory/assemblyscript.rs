// Copyright (C) 2021-2025 the DTVM authors. All Rights Reserved.
// SPDX-License-Identifier: Apache-2.0

//! AssemblyScript managed objects.
//!
//! Layout before the payload, see the AssemblyScript runtime docs:
//!
//! | offset | field  | meaning                         |
//! |--------|--------|---------------------------------|
//! | -8     | rtId   | class id of the object          |
//! | -4     | rtSize | payload size in bytes           |
//! | 0      |        | payload starts here             |
//!
//! Strings are UTF-16LE.

use super::{call_allocator, data_len_i32, mismatch, param_count_error, AbiKind, MemoryAbi, PointerRepr};
use crate::core::instance::GuestInstance;
use crate::core::types::{ValueType, WasmValue};
use crate::error::{memory_fault, HostResult};
use crate::memory::accessor::{validate_offset, MemoryAccessor};

pub const AS_PTR_LENGTH_OFFSET: u32 = 4;
pub const AS_ARRAY_BUFFER_TYPE: i32 = 1;
pub const AS_ALLOC_EXPORT: &str = "__new";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AssemblyScriptAdapter;

impl MemoryAbi for AssemblyScriptAdapter {
    fn kind(&self) -> AbiKind {
        AbiKind::SelfDescribing
    }

    fn ptr_value_types(&self) -> &'static [ValueType] {
        &[ValueType::I32]
    }

    fn allocate_and_write(
        &self,
        instance: &mut dyn GuestInstance,
        data: &[u8],
    ) -> HostResult<PointerRepr> {
        let len = data_len_i32(data)?;
        let ptr = call_allocator(
            instance,
            AS_ALLOC_EXPORT,
            &[WasmValue::I32(len), WasmValue::I32(AS_ARRAY_BUFFER_TYPE)],
        )?;
        if ptr < AS_PTR_LENGTH_OFFSET {
            return Err(memory_fault(
                "managed object has no room for its header",
                Some(ptr as u64),
                None,
            ));
        }
        let mut accessor = MemoryAccessor::new(instance);
        accessor.write_u32_le(ptr - AS_PTR_LENGTH_OFFSET, len as u32)?;
        accessor.write_bytes(ptr, data)?;
        Ok(PointerRepr::SelfDescribing(ptr as i32))
    }

    fn read_from_ptr(
        &self,
        instance: &mut dyn GuestInstance,
        ptr: PointerRepr,
    ) -> HostResult<Vec<u8>> {
        let PointerRepr::SelfDescribing(ptr) = ptr else {
            return Err(mismatch(self.kind(), ptr));
        };
        let offset = validate_offset(ptr, "assemblyscript pointer")?;
        let header = offset.checked_sub(AS_PTR_LENGTH_OFFSET).ok_or_else(|| {
            memory_fault(
                "length header before start of memory",
                Some(offset as u64),
                Some(AS_PTR_LENGTH_OFFSET as u64),
            )
        })?;
        let accessor = MemoryAccessor::new(instance);
        let length = accessor.read_u32_le(header)?;
        accessor.read_bytes_vec(offset, length)
    }

    fn read_string_from_ptr(
        &self,
        instance: &mut dyn GuestInstance,
        ptr: PointerRepr,
    ) -> HostResult<String> {
        let bytes = self.read_from_ptr(instance, ptr)?;
        decode_utf16le(&bytes)
    }

    fn pointer_from_params(&self, params: &[WasmValue]) -> HostResult<PointerRepr> {
        match params {
            [value] => Ok(PointerRepr::SelfDescribing(value.as_i32()?)),
            _ => Err(param_count_error(1, params.len())),
        }
    }

    fn pointer_to_params(&self, ptr: PointerRepr) -> HostResult<Vec<WasmValue>> {
        match ptr {
            PointerRepr::SelfDescribing(value) => Ok(vec![WasmValue::I32(value)]),
            other => Err(mismatch(self.kind(), other)),
        }
    }
}

/// Decode an AssemblyScript string payload.
pub fn decode_utf16le(bytes: &[u8]) -> HostResult<String> {
    if bytes.len() % 2 != 0 {
        return Err(memory_fault(
            "utf16 payload has odd length",
            None,
            Some(bytes.len() as u64),
        ));
    }
    let units = bytes
        .chunks_exact(2)
        .map(|pair| u16::from_le_bytes([pair[0], pair[1]]));
    char::decode_utf16(units)
        .collect::<Result<String, _>>()
        .map_err(|e| memory_fault(&format!("invalid utf16: {}", e), None, None))
}

/// Encode a string the way AssemblyScript stores it.
pub fn encode_utf16le(value: &str) -> Vec<u8> {
    value.encode_utf16().flat_map(|unit| unit.to_le_bytes()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_utf16_codec() {
        let encoded = encode_utf16le("hé");
        assert_eq!(encoded, vec![0x68, 0x00, 0xe9, 0x00]);
        assert_eq!(decode_utf16le(&encoded).unwrap(), "hé");
        assert!(decode_utf16le(&[0x68]).is_err());
        // lone surrogate
        assert!(decode_utf16le(&[0x00, 0xd8]).is_err());
    }
}
