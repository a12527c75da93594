// Copyright (C) 2021-2025 the DTVM authors. All Rights Reserved.
// SPDX-License-Identifier: Apache-2.0

//! Cryptographic host functions

use crate::error::HostResult;
use crate::host::{HostArg, HostCall};
use sha2::{Digest, Sha256};
use sha3::Keccak256;

pub fn sha256_digest(data: &[u8]) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hasher.finalize().into()
}

pub fn keccak256_digest(data: &[u8]) -> [u8; 32] {
    let mut hasher = Keccak256::new();
    hasher.update(data);
    hasher.finalize().into()
}

/// sha256(data): 32-byte digest
pub fn sha256(call: &mut HostCall<'_, '_>, args: &[HostArg]) -> HostResult<Vec<HostArg>> {
    let data = call.read(&args[0])?;
    Ok(vec![call.alloc(&sha256_digest(&data))?])
}

/// keccak256(data): 32-byte digest
pub fn keccak256(call: &mut HostCall<'_, '_>, args: &[HostArg]) -> HostResult<Vec<HostArg>> {
    let data = call.read(&args[0])?;
    Ok(vec![call.alloc(&keccak256_digest(&data))?])
}
