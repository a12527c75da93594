// Copyright (C) 2021-2025 the DTVM authors. All Rights Reserved.
// SPDX-License-Identifier: Apache-2.0

//! Embedding Host Interface
//!
//! [`WasmxHost`] is what a node implements to give contracts access to chain
//! state. The runtime never writes through it while a guest is running:
//! storage writes and value transfers are buffered in the call context and
//! only flushed once the call has succeeded.
//!
//! The JSON shapes exchanged with guests live here too: [`Env`],
//! [`CallRequest`], [`CallResponse`], [`WasmxLog`] and [`LoggerLog`].

use crate::error::{validation_error, HostResult};
use crate::gas_metering::GasMeter;
use crate::system::StorageScope;
use num_bigint::BigUint;
use serde::{Deserialize, Serialize};

mod b64_list {
    use base64::{engine::general_purpose, Engine as _};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(items: &[Vec<u8>], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(items.iter().map(|i| general_purpose::STANDARD.encode(i)))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<Vec<u8>>, D::Error> {
        Option::<Vec<String>>::deserialize(deserializer)?
            .unwrap_or_default()
            .into_iter()
            .map(|s| {
                general_purpose::STANDARD
                    .decode(s)
                    .map_err(serde::de::Error::custom)
            })
            .collect()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChainInfo {
    pub denom: String,
    pub chain_id: u64,
    pub chain_id_full: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockInfo {
    pub height: u64,
    /// Nanoseconds since the unix epoch.
    pub timestamp: u64,
    pub gas_limit: u64,
    #[serde(with = "crate::message::base64_bytes", default)]
    pub hash: Vec<u8>,
    pub proposer: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionInfo {
    pub index: u32,
    pub gas_price: u128,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContractInfo {
    /// Prefixed (bech32) address.
    pub address: String,
    #[serde(with = "crate::message::base64_bytes", default)]
    pub code_hash: Vec<u8>,
    pub code_id: u64,
    #[serde(rename = "deps", default)]
    pub system_deps: Vec<String>,
    #[serde(with = "crate::message::base64_bytes", default)]
    pub bytecode: Vec<u8>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageInfo {
    pub origin: String,
    pub sender: String,
    pub funds: u128,
    pub gas_limit: u64,
    #[serde(with = "crate::message::base64_bytes", default)]
    pub call_data: Vec<u8>,
}

/// Execution environment handed to guests by `getEnv`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Env {
    pub chain: ChainInfo,
    pub block: BlockInfo,
    pub transaction: Option<TransactionInfo>,
    pub contract: ContractInfo,
    pub current_call: MessageInfo,
}

/// Guest request for a nested contract call.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CallRequest {
    /// Prefixed address or role name.
    pub to: String,
    #[serde(with = "crate::message::base64_bytes", default)]
    pub calldata: Vec<u8>,
    /// Decimal amount of the chain denom to send along.
    #[serde(default)]
    pub value: Option<String>,
    #[serde(default)]
    pub gas_limit: Option<u64>,
    #[serde(default)]
    pub is_query: bool,
}

impl CallRequest {
    pub fn value(&self) -> HostResult<BigUint> {
        match self.value.as_deref() {
            None | Some("") => Ok(BigUint::default()),
            Some(v) => v
                .parse::<BigUint>()
                .map_err(|e| validation_error(format!("invalid call value '{}': {}", v, e))),
        }
    }
}

pub const CALL_SUCCESS: u8 = 0;
pub const CALL_FAILURE: u8 = 1;
pub const CALL_TRANSFER_FAILURE: u8 = 2;

/// Answer to a nested call, `success` is 0 on success.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallResponse {
    pub success: u8,
    #[serde(with = "crate::message::base64_bytes", default)]
    pub data: Vec<u8>,
}

/// Nested call as handed to the embedding host, target already resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContractCall {
    pub from: String,
    pub to: String,
    /// Attached value. The caller's context moves it when the caller commits,
    /// the host must not transfer it again.
    pub value: BigUint,
    pub calldata: Vec<u8>,
    pub is_query: bool,
    pub depth: usize,
}

/// Outcome of a nested call reported by the embedding host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContractCallResult {
    pub success: bool,
    pub data: Vec<u8>,
}

impl ContractCallResult {
    pub fn success(data: Vec<u8>) -> Self {
        Self {
            success: true,
            data,
        }
    }

    pub fn failure(data: Vec<u8>) -> Self {
        Self {
            success: false,
            data,
        }
    }
}

pub const LOG_TYPE_WASMX: &str = "wasmx";

/// Event as written by the guest through `log`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WasmxJsonLog {
    #[serde(rename = "type", default)]
    pub log_type: String,
    #[serde(with = "crate::message::base64_bytes", default)]
    pub data: Vec<u8>,
    #[serde(with = "b64_list", default)]
    pub topics: Vec<Vec<u8>>,
}

/// Event recorded by the runtime, tagged with its emitter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WasmxLog {
    pub log_type: String,
    pub contract_address: String,
    pub system_dependency: String,
    pub data: Vec<u8>,
    pub topics: Vec<Vec<u8>>,
}

/// Structured message for the `Logger*` host functions.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggerLog {
    pub msg: String,
    #[serde(default)]
    pub parts: Vec<String>,
}

/// Chain state as seen by contracts.
///
/// Storage is addressed by scope, contract (prefixed address) and key.
pub trait WasmxHost {
    fn storage_get(&self, scope: StorageScope, contract: &str, key: &[u8]) -> Option<Vec<u8>>;

    fn storage_set(&mut self, scope: StorageScope, contract: &str, key: &[u8], value: &[u8]);

    fn storage_delete(&mut self, scope: StorageScope, contract: &str, key: &[u8]);

    /// Balance of `address` in `denom`.
    fn balance(&self, address: &str, denom: &str) -> BigUint;

    fn block_hash(&self, height: u64) -> Option<Vec<u8>>;

    fn contract_exists(&self, address: &str) -> bool;

    fn transfer(&mut self, from: &str, to: &str, denom: &str, amount: &BigUint) -> HostResult<()>;

    /// Run a nested call under `meter`, which is a child of the caller's meter.
    fn call_contract(
        &mut self,
        call: &ContractCall,
        meter: &mut GasMeter,
    ) -> HostResult<ContractCallResult>;
}
