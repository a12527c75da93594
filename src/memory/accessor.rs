// Copyright (C) 2021-2025 the DTVM authors. All Rights Reserved.
// SPDX-License-Identifier: Apache-2.0

//! Guest Memory Access
//!
//! Bounds-checked reads and writes over a guest's linear memory. Every ABI
//! adapter goes through [`MemoryAccessor`]; nothing else in the crate indexes
//! guest memory directly.
//!
//! # Safety
//!
//! All accesses are validated against the current memory size, so a hostile
//! or buggy guest pointer produces a `MemoryFault` instead of a panic:
//! - negative offsets
//! - `offset + length` overflow
//! - ranges past the end of memory

use crate::core::instance::GuestInstance;
use crate::error::{memory_fault, HostResult};
use num_bigint::BigUint;

/// Memory accessor for safe guest memory operations
pub struct MemoryAccessor<'a, I: GuestInstance + ?Sized> {
    instance: &'a mut I,
}

impl<'a, I: GuestInstance + ?Sized> MemoryAccessor<'a, I> {
    /// Create a new memory accessor
    pub fn new(instance: &'a mut I) -> Self {
        Self { instance }
    }

    pub fn memory_size(&self) -> usize {
        self.instance.memory().len()
    }

    /// Validate that a memory range is accessible
    pub fn validate_range(&self, offset: u32, length: u32) -> bool {
        match (offset as usize).checked_add(length as usize) {
            Some(end) => end <= self.memory_size(),
            None => false,
        }
    }

    /// Read bytes from guest memory with bounds checking
    pub fn read_bytes(&self, offset: u32, length: u32) -> HostResult<&[u8]> {
        if !self.validate_range(offset, length) {
            return Err(out_of_bounds(offset, length));
        }
        let start = offset as usize;
        Ok(&self.instance.memory()[start..start + length as usize])
    }

    /// Read a variable-length byte array from memory
    pub fn read_bytes_vec(&self, offset: u32, length: u32) -> HostResult<Vec<u8>> {
        Ok(self.read_bytes(offset, length)?.to_vec())
    }

    /// Write bytes to guest memory with bounds checking
    pub fn write_bytes(&mut self, offset: u32, data: &[u8]) -> HostResult<()> {
        let length = u32::try_from(data.len())
            .map_err(|_| memory_fault("write larger than 4 GiB", Some(offset as u64), None))?;
        if !self.validate_range(offset, length) {
            return Err(out_of_bounds(offset, length));
        }
        let start = offset as usize;
        self.instance.memory_mut()[start..start + data.len()].copy_from_slice(data);
        Ok(())
    }

    pub fn read_u32_le(&self, offset: u32) -> HostResult<u32> {
        let bytes = self.read_bytes(offset, 4)?;
        let mut raw = [0u8; 4];
        raw.copy_from_slice(bytes);
        Ok(u32::from_le_bytes(raw))
    }

    pub fn write_u32_le(&mut self, offset: u32, value: u32) -> HostResult<()> {
        self.write_bytes(offset, &value.to_le_bytes())
    }
    /// Read bytes starting at `offset` up to, not including, the first zero byte.
    pub fn read_until_null(&self, offset: u32) -> HostResult<Vec<u8>> {
        let size = self.memory_size();
        let start = offset as usize;
        if start >= size {
            return Err(out_of_bounds(offset, 1));
        }
        let memory = self.instance.memory();
        match memory[start..].iter().position(|b| *b == 0) {
            Some(end) => Ok(memory[start..start + end].to_vec()),
            None => Err(memory_fault(
                "no null terminator before end of memory",
                Some(offset as u64),
                None,
            )),
        }
    }

    /// Read a big-endian unsigned integer of `size` bytes.
    pub fn read_big_int(&self, offset: u32, size: u32) -> HostResult<BigUint> {
        Ok(BigUint::from_bytes_be(self.read_bytes(offset, size)?))
    }

    /// Write `value` big-endian, left-padded to `size` bytes.
    pub fn write_big_int(&mut self, offset: u32, value: &BigUint, size: u32) -> HostResult<()> {
        let bytes = value.to_bytes_be();
        if bytes.len() > size as usize {
            return Err(memory_fault(
                &format!("value needs {} bytes, slot has {}", bytes.len(), size),
                Some(offset as u64),
                Some(size as u64),
            ));
        }
        let mut padded = vec![0u8; size as usize - bytes.len()];
        padded.extend_from_slice(&bytes);
        self.write_bytes(offset, &padded)
    }
}

/// Convert a guest `i32` offset into a memory offset, rejecting negatives.
pub fn validate_offset(offset: i32, context: &str) -> HostResult<u32> {
    u32::try_from(offset).map_err(|_| {
        memory_fault(
            &format!("negative offset {} in {}", offset, context),
            None,
            None,
        )
    })
}

fn out_of_bounds(offset: u32, length: u32) -> crate::error::HostError {
    memory_fault(
        &format!("range {}+{} out of bounds", offset, length),
        Some(offset as u64),
        Some(length as u64),
    )
}
