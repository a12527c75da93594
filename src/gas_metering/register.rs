// Copyright (C) 2021-2025 the DTVM authors. All Rights Reserved.
// SPDX-License-Identifier: Apache-2.0

//! Conversion between host gas and engine-native gas, plus the fixed costs
//! charged around a call (compiling, instantiating, emitting events).

use crate::error::{out_of_gas, validation_error, HostResult};
use serde::{Deserialize, Serialize};

pub const DEFAULT_INSTANCE_COST: u64 = 60_000;
pub const DEFAULT_COMPILE_COST: u64 = 3;
/// Native engine units per host gas unit.
pub const DEFAULT_GAS_MULTIPLIER: u64 = 140_000_000;
pub const DEFAULT_EVENT_COST_PER_BYTE: u64 = 1;
/// Least a single host function call is charged.
pub const DEFAULT_HOST_CALL_COST: u64 = 10;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GasConfig {
    pub instance_cost: u64,
    pub compile_cost_per_byte: u64,
    pub gas_multiplier: u64,
    pub event_cost_per_byte: u64,
    pub host_call_base_cost: u64,
}

impl Default for GasConfig {
    fn default() -> Self {
        Self {
            instance_cost: DEFAULT_INSTANCE_COST,
            compile_cost_per_byte: DEFAULT_COMPILE_COST,
            gas_multiplier: DEFAULT_GAS_MULTIPLIER,
            event_cost_per_byte: DEFAULT_EVENT_COST_PER_BYTE,
            host_call_base_cost: DEFAULT_HOST_CALL_COST,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GasRegister {
    config: GasConfig,
}

impl GasRegister {
    pub fn new(config: GasConfig) -> HostResult<Self> {
        if config.gas_multiplier == 0 {
            return Err(validation_error("gas multiplier can not be 0"));
        }
        Ok(Self { config })
    }

    pub fn config(&self) -> &GasConfig {
        &self.config
    }

    /// Host gas to engine-native units.
    pub fn to_native(&self, host_gas: u64) -> HostResult<u64> {
        host_gas
            .checked_mul(self.config.gas_multiplier)
            .ok_or_else(|| out_of_gas("to_native", u64::MAX, 0, host_gas))
    }

    /// Engine-native units to host gas, rounding down.
    pub fn from_native(&self, native_gas: u64) -> u64 {
        native_gas / self.config.gas_multiplier
    }

    pub fn multiplier(&self) -> u64 {
        self.config.gas_multiplier
    }

    pub fn compile_costs(&self, code_len: usize) -> u64 {
        self.config
            .compile_cost_per_byte
            .saturating_mul(code_len as u64)
    }

    /// Pinned modules are kept warm and skip the instance cost.
    pub fn instance_costs(&self, pinned: bool, msg_len: usize) -> u64 {
        let data_costs = self.event_costs(msg_len);
        if pinned {
            data_costs
        } else {
            self.config.instance_cost.saturating_add(data_costs)
        }
    }

    pub fn event_costs(&self, bytes: usize) -> u64 {
        self.config.event_cost_per_byte.saturating_mul(bytes as u64)
    }

    /// Charge for one host function call with flat cost `flat`.
    pub fn host_call_costs(&self, flat: u64) -> u64 {
        flat.max(self.config.host_call_base_cost)
    }
}

impl Default for GasRegister {
    fn default() -> Self {
        Self {
            config: GasConfig::default(),
        }
    }
}
