// Copyright (C) 2021-2025 the DTVM authors. All Rights Reserved.
// SPDX-License-Identifier: Apache-2.0

//! Runtime configuration.
//!
//! Every field has a default, so a JSON document only needs to name what it
//! overrides:
//!
//! ```rust
//! use wasmx_host::config::RuntimeConfig;
//!
//! let config = RuntimeConfig::from_json_str(r#"{"bech32_prefix":"test"}"#).unwrap();
//! assert_eq!(config.bech32_prefix, "test");
//! assert_eq!(config.limits.max_interpreted_code_size, 0xF000);
//! ```

use crate::error::{validation_error, HostResult};
use crate::gas_metering::GasConfig;
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const MAX_WASM_SIZE: usize = 1500 * 1024;
/// Must stay at least 0x6000 to fit Ethereum contracts.
pub const MAX_INTERPRETED_CODE_SIZE: usize = 0xF000;
pub const MAX_PROPOSAL_WASM_SIZE: usize = 3 * 1024 * 1024;
pub const MAX_LABEL_SIZE: usize = 128;
pub const DEFAULT_BECH32_PREFIX: &str = "mythos";
pub const DEFAULT_MAX_CALL_DEPTH: usize = 10;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CodeLimits {
    pub max_wasm_size: usize,
    pub max_interpreted_code_size: usize,
    pub max_proposal_wasm_size: usize,
    pub max_label_size: usize,
}

impl Default for CodeLimits {
    fn default() -> Self {
        Self {
            max_wasm_size: MAX_WASM_SIZE,
            max_interpreted_code_size: MAX_INTERPRETED_CODE_SIZE,
            max_proposal_wasm_size: MAX_PROPOSAL_WASM_SIZE,
            max_label_size: MAX_LABEL_SIZE,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuntimeConfig {
    pub bech32_prefix: String,
    pub limits: CodeLimits,
    pub gas: GasConfig,
    pub max_call_depth: usize,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            bech32_prefix: DEFAULT_BECH32_PREFIX.to_string(),
            limits: CodeLimits::default(),
            gas: GasConfig::default(),
            max_call_depth: DEFAULT_MAX_CALL_DEPTH,
        }
    }
}

impl RuntimeConfig {
    pub fn from_json_str(input: &str) -> HostResult<Self> {
        let config: RuntimeConfig = serde_json::from_str(input)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: impl AsRef<Path>) -> HostResult<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|e| {
            validation_error(format!("cannot read config {}: {}", path.display(), e))
        })?;
        Self::from_json_str(&raw)
    }

    pub fn validate(&self) -> HostResult<()> {
        if self.bech32_prefix.is_empty() {
            return Err(validation_error("bech32 prefix must not be empty"));
        }
        let limits = &self.limits;
        if limits.max_wasm_size == 0
            || limits.max_interpreted_code_size == 0
            || limits.max_proposal_wasm_size == 0
            || limits.max_label_size == 0
        {
            return Err(validation_error("code size ceilings must be non-zero"));
        }
        if self.gas.gas_multiplier == 0 {
            return Err(validation_error("gas multiplier can not be 0"));
        }
        if self.max_call_depth == 0 {
            return Err(validation_error("max call depth must be non-zero"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = RuntimeConfig::default();
        assert_eq!(config.limits.max_wasm_size, 1_536_000);
        assert_eq!(config.limits.max_proposal_wasm_size, 3_145_728);
        assert_eq!(config.gas.gas_multiplier, 140_000_000);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_override() {
        let config = RuntimeConfig::from_json_str(
            r#"{"limits":{"max_wasm_size":1024},"gas":{"instance_cost":5}}"#,
        )
        .unwrap();
        assert_eq!(config.limits.max_wasm_size, 1024);
        assert_eq!(config.limits.max_label_size, MAX_LABEL_SIZE);
        assert_eq!(config.gas.instance_cost, 5);
        assert_eq!(config.gas.compile_cost_per_byte, 3);
        assert_eq!(config.bech32_prefix, DEFAULT_BECH32_PREFIX);
    }

    #[test]
    fn test_rejects_bad_values() {
        assert!(RuntimeConfig::from_json_str(r#"{"gas":{"gas_multiplier":0}}"#).is_err());
        assert!(RuntimeConfig::from_json_str(r#"{"bech32_prefix":""}"#).is_err());
        assert!(RuntimeConfig::from_json_str("not json").is_err());
    }
}
