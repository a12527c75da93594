// Copyright (C) 2021-2025 the DTVM authors. All Rights Reserved.
// SPDX-License-Identifier: Apache-2.0

//! Environment host functions

use crate::error::HostResult;
use crate::host::context::pad_left_32;
use crate::host::{HostArg, HostCall};
use num_bigint::BigUint;

/// getCallData(): the raw call data of the current call
pub fn get_call_data(call: &mut HostCall<'_, '_>, _args: &[HostArg]) -> HostResult<Vec<HostArg>> {
    let data = call.ctx.env.current_call.call_data.clone();
    Ok(vec![call.alloc(&data)?])
}

/// getEnv(): the JSON encoded [`Env`](crate::host::Env)
pub fn get_env(call: &mut HostCall<'_, '_>, _args: &[HostArg]) -> HostResult<Vec<HostArg>> {
    let env = serde_json::to_vec(&call.ctx.env)?;
    Ok(vec![call.alloc(&env)?])
}

/// getCaller(): sender address, left-padded to 32 bytes
pub fn get_caller(call: &mut HostCall<'_, '_>, _args: &[HostArg]) -> HostResult<Vec<HostArg>> {
    let sender = call.ctx.env.current_call.sender.clone();
    let bytes = call.ctx.padded_address(&sender)?;
    Ok(vec![call.alloc(&bytes)?])
}

/// getAddress(): own address, left-padded to 32 bytes
pub fn get_address(call: &mut HostCall<'_, '_>, _args: &[HostArg]) -> HostResult<Vec<HostArg>> {
    let address = call.ctx.contract_address().to_string();
    let bytes = call.ctx.padded_address(&address)?;
    Ok(vec![call.alloc(&bytes)?])
}

/// getBalance(address): balance in the chain denom as a 32-byte big-endian value
pub fn get_balance(call: &mut HostCall<'_, '_>, args: &[HostArg]) -> HostResult<Vec<HostArg>> {
    let raw = call.read(&args[0])?;
    let address = call.ctx.guest_address(&raw)?;
    let denom = call.ctx.env.chain.denom.clone();
    let balance = call.ctx.balance(&address, &denom);
    Ok(vec![call.alloc(&biguint_to_bytes32(&balance))?])
}

/// getBlockHash(height): hash of a past block, empty when unknown
pub fn get_block_hash(call: &mut HostCall<'_, '_>, args: &[HostArg]) -> HostResult<Vec<HostArg>> {
    let raw = call.read(&args[0])?;
    let height = BigUint::from_bytes_be(&raw);
    let hash = u64::try_from(&height)
        .ok()
        .and_then(|h| call.ctx.host().block_hash(h))
        .unwrap_or_default();
    Ok(vec![call.alloc(&hash)?])
}

/// Strip the zero padding of a 32-byte encoded 20-byte address.
pub fn cleanup_address(raw: &[u8]) -> &[u8] {
    if raw.len() == 32 && raw[..12].iter().all(|b| *b == 0) {
        &raw[12..]
    } else {
        raw
    }
}

/// Big-endian, zero-padded on the left, truncated to the low 32 bytes.
pub fn biguint_to_bytes32(value: &BigUint) -> Vec<u8> {
    let bytes = value.to_bytes_be();
    if bytes.len() >= 32 {
        return bytes[bytes.len() - 32..].to_vec();
    }
    pad_left_32(&bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cleanup_address() {
        let mut padded = vec![0u8; 12];
        padded.extend_from_slice(&[7u8; 20]);
        assert_eq!(cleanup_address(&padded), &[7u8; 20]);
        assert_eq!(cleanup_address(&[1u8; 32]).len(), 32);
        assert_eq!(cleanup_address(&[1u8; 20]).len(), 20);
    }

    #[test]
    fn test_biguint_to_bytes32() {
        let bytes = biguint_to_bytes32(&BigUint::from(258u32));
        assert_eq!(bytes.len(), 32);
        assert_eq!(&bytes[30..], &[1, 2]);
        assert!(bytes[..30].iter().all(|b| *b == 0));
    }
}
