// Copyright (C) 2021-2025 the DTVM authors. All Rights Reserved.
// SPDX-License-Identifier: Apache-2.0

//! Host functions published to guests, grouped by concern:
//!
//! - **env**: call data, environment, caller, own address, balances, block hashes
//! - **storage**: buffered contract storage
//! - **crypto**: sha256 and keccak256
//! - **control**: finish data, finish, revert
//! - **log**: contract events and guest logging
//! - **call**: nested contract calls
//! - **roles**: role registry lookups (`wasmxcore`)

pub mod call;
pub mod control;
pub mod crypto;
pub mod env;
pub mod log;
pub mod roles;
pub mod storage;

use super::{HostFnDef, HostModule, HostModuleBuilder, ParamKind};
use crate::memory::MemoryAdapter;
use crate::system::constants::{WASMX_CORE_IMPORT_MODULE, WASMX_IMPORT_MODULE};

/// Flat charge for every host function call.
pub const HOST_CALL_COST: u64 = crate::gas_metering::register::DEFAULT_HOST_CALL_COST;
pub const SSTORE_COST: u64 = 20_000;
pub const SLOAD_COST: u64 = 100;
pub const CALL_COST: u64 = 1_000;

const NONE: &[ParamKind] = &[];
const PTR: &[ParamKind] = &[ParamKind::Ptr];
const PTR_PTR: &[ParamKind] = &[ParamKind::Ptr, ParamKind::Ptr];

const fn def(
    name: &'static str,
    inputs: &'static [ParamKind],
    outputs: &'static [ParamKind],
    cost: u64,
    func: super::HostFn,
) -> HostFnDef {
    HostFnDef {
        name,
        inputs,
        outputs,
        cost,
        func,
    }
}

pub const WASMX_FUNCTIONS: &[HostFnDef] = &[
    def("getCallData", NONE, PTR, HOST_CALL_COST, env::get_call_data),
    def("getEnv", NONE, PTR, HOST_CALL_COST, env::get_env),
    def("getCaller", NONE, PTR, HOST_CALL_COST, env::get_caller),
    def("getAddress", NONE, PTR, HOST_CALL_COST, env::get_address),
    def("getBalance", PTR, PTR, HOST_CALL_COST, env::get_balance),
    def("getBlockHash", PTR, PTR, HOST_CALL_COST, env::get_block_hash),
    def("storageStore", PTR_PTR, NONE, SSTORE_COST, storage::storage_store),
    def("storageLoad", PTR, PTR, SLOAD_COST, storage::storage_load),
    def("storageDelete", PTR, NONE, HOST_CALL_COST, storage::storage_delete),
    def("sha256", PTR, PTR, HOST_CALL_COST, crypto::sha256),
    def("keccak256", PTR, PTR, HOST_CALL_COST, crypto::keccak256),
    def("log", PTR, NONE, HOST_CALL_COST, log::log),
    def("getReturnData", NONE, PTR, HOST_CALL_COST, control::get_return_data),
    def("getFinishData", NONE, PTR, HOST_CALL_COST, control::get_finish_data),
    def("setFinishData", PTR, NONE, HOST_CALL_COST, control::set_finish_data),
    def("finish", PTR, NONE, HOST_CALL_COST, control::finish),
    def("revert", PTR, NONE, HOST_CALL_COST, control::revert),
    def("call", PTR, PTR, CALL_COST, call::call),
    def("LoggerInfo", PTR, NONE, HOST_CALL_COST, log::logger_info),
    def("LoggerError", PTR, NONE, HOST_CALL_COST, log::logger_error),
    def("LoggerDebug", PTR, NONE, HOST_CALL_COST, log::logger_debug),
];

pub const WASMX_CORE_FUNCTIONS: &[HostFnDef] = &[
    def("getAddressByRole", PTR, PTR, HOST_CALL_COST, roles::get_address_by_role),
    def("getRoleByAddress", PTR, PTR, HOST_CALL_COST, roles::get_role_by_address),
];

/// The `wasmx` import module for `adapter`.
pub fn wasmx_module(adapter: &MemoryAdapter) -> HostModule {
    HostModuleBuilder::new(WASMX_IMPORT_MODULE, adapter.clone())
        .functions(WASMX_FUNCTIONS)
        .build()
}

/// The `wasmxcore` import module for `adapter`.
pub fn wasmx_core_module(adapter: &MemoryAdapter) -> HostModule {
    HostModuleBuilder::new(WASMX_CORE_IMPORT_MODULE, adapter.clone())
        .functions(WASMX_CORE_FUNCTIONS)
        .build()
}
