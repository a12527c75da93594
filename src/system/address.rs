// Copyright (C) 2021-2025 the DTVM authors. All Rights Reserved.
// SPDX-License-Identifier: Apache-2.0

//! Hex and bech32 address handling for genesis assembly.

use crate::error::{validation_error, HostResult};
use bech32::{Bech32, Hrp};
use sha2::{Digest, Sha256};

pub const ADDRESS_LENGTH_ETH: usize = 20;
pub const ADDRESS_LENGTH_WASMX: usize = 32;

fn strip_0x(s: &str) -> &str {
    s.strip_prefix("0x")
        .or_else(|| s.strip_prefix("0X"))
        .unwrap_or(s)
}

/// True for 20- or 32-byte hex strings, `0x` prefix optional.
pub fn is_hex_address(s: &str) -> bool {
    let body = strip_0x(s);
    (body.len() == 2 * ADDRESS_LENGTH_ETH || body.len() == 2 * ADDRESS_LENGTH_WASMX)
        && body.bytes().all(|c| c.is_ascii_hexdigit())
}

pub fn parse_hex_address(s: &str) -> HostResult<Vec<u8>> {
    if !is_hex_address(s) {
        return Err(validation_error(format!(
            "address '{}' is not a valid hex address",
            s
        )));
    }
    Ok(hex::decode(strip_0x(s))?)
}

pub fn is_zero_address(s: &str) -> bool {
    match parse_hex_address(s) {
        Ok(bytes) => bytes.iter().all(|b| *b == 0),
        Err(_) => false,
    }
}

pub fn validate_non_zero_address(s: &str) -> HostResult<()> {
    parse_hex_address(s)?;
    if is_zero_address(s) {
        return Err(validation_error(format!("address '{}' must not be zero", s)));
    }
    Ok(())
}

/// Address of a named module account: first 20 bytes of `sha256(name)`.
pub fn module_address(name: &str) -> [u8; ADDRESS_LENGTH_ETH] {
    let digest = Sha256::digest(name.as_bytes());
    let mut out = [0u8; ADDRESS_LENGTH_ETH];
    out.copy_from_slice(&digest[..ADDRESS_LENGTH_ETH]);
    out
}

/// Bech32 encoding under a fixed human-readable prefix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddressCodec {
    hrp: Hrp,
}

impl AddressCodec {
    pub fn new(prefix: &str) -> HostResult<Self> {
        let hrp = Hrp::parse(prefix)
            .map_err(|e| validation_error(format!("invalid bech32 prefix '{}': {}", prefix, e)))?;
        Ok(Self { hrp })
    }

    pub fn prefix(&self) -> &str {
        self.hrp.as_str()
    }

    pub fn bytes_to_string(&self, bytes: &[u8]) -> HostResult<String> {
        bech32::encode::<Bech32>(self.hrp, bytes)
            .map_err(|e| validation_error(format!("cannot encode address: {}", e)))
    }

    pub fn string_to_bytes(&self, address: &str) -> HostResult<Vec<u8>> {
        let (hrp, data) = bech32::decode(address)
            .map_err(|e| validation_error(format!("invalid bech32 address '{}': {}", address, e)))?;
        if hrp != self.hrp {
            return Err(validation_error(format!(
                "address '{}' has prefix '{}', expected '{}'",
                address,
                hrp,
                self.hrp
            )));
        }
        Ok(data)
    }

    /// Hex address to its prefixed form.
    pub fn hex_to_prefixed(&self, hex_address: &str) -> HostResult<String> {
        self.bytes_to_string(&parse_hex_address(hex_address)?)
    }

    pub fn module_account(&self, name: &str) -> HostResult<String> {
        self.bytes_to_string(&module_address(name))
    }
}
