// Copyright (C) 2021-2025 the DTVM authors. All Rights Reserved.
// SPDX-License-Identifier: Apache-2.0

//! Fixed addresses, role names, contract labels and host interface names
//! shared by genesis assembly and the loader.

// Ethereum-compatible precompiles
pub const ADDR_ECRECOVER: &str = "0x0000000000000000000000000000000000000001";
pub const ADDR_SHA2_256: &str = "0x0000000000000000000000000000000000000002";
pub const ADDR_RIPMD160: &str = "0x0000000000000000000000000000000000000003";
pub const ADDR_IDENTITY: &str = "0x0000000000000000000000000000000000000004";
pub const ADDR_MODEXP: &str = "0x0000000000000000000000000000000000000005";
pub const ADDR_ECADD: &str = "0x0000000000000000000000000000000000000006";
pub const ADDR_ECMUL: &str = "0x0000000000000000000000000000000000000007";
pub const ADDR_ECPAIRINGS: &str = "0x0000000000000000000000000000000000000008";
pub const ADDR_BLAKE2F: &str = "0x0000000000000000000000000000000000000009";
pub const ADDR_ECRECOVERETH: &str = "0x000000000000000000000000000000000000001f";

pub const ADDR_SECP384R1: &str = "0x0000000000000000000000000000000000000020";
pub const ADDR_SECP384R1_REGISTRY: &str = "0x0000000000000000000000000000000000000021";
pub const ADDR_SECRET_SHARING: &str = "0x0000000000000000000000000000000000000022";
pub const ADDR_INTERPRETER_EVM_SHANGHAI: &str = "0x0000000000000000000000000000000000000023";
pub const ADDR_ALIAS_ETH: &str = "0x0000000000000000000000000000000000000024";
pub const ADDR_PROXY_INTERFACES: &str = "0x0000000000000000000000000000000000000025";
pub const ADDR_INTERPRETER_PYTHON: &str = "0x0000000000000000000000000000000000000026";
pub const ADDR_INTERPRETER_JS: &str = "0x0000000000000000000000000000000000000027";
pub const ADDR_INTERPRETER_FSM: &str = "0x0000000000000000000000000000000000000028";
pub const ADDR_STORAGE_CHAIN: &str = "0x0000000000000000000000000000000000000029";
pub const ADDR_CONSENSUS_RAFT_LIBRARY: &str = "0x000000000000000000000000000000000000002a";
pub const ADDR_CONSENSUS_TENDERMINT_LIBRARY: &str = "0x000000000000000000000000000000000000002b";
pub const ADDR_CONSENSUS_RAFT: &str = "0x000000000000000000000000000000000000002c";
pub const ADDR_CONSENSUS_TENDERMINT: &str = "0x000000000000000000000000000000000000002d";
pub const ADDR_CONSENSUS_AVA_SNOWMAN_LIBRARY: &str = "0x000000000000000000000000000000000000002e";
pub const ADDR_CONSENSUS_AVA_SNOWMAN: &str = "0x000000000000000000000000000000000000002f";
pub const ADDR_STAKING: &str = "0x0000000000000000000000000000000000000030";
pub const ADDR_BANK: &str = "0x0000000000000000000000000000000000000031";
pub const ADDR_HOOKS: &str = "0x0000000000000000000000000000000000000034";
pub const ADDR_GOV: &str = "0x0000000000000000000000000000000000000035";
pub const ADDR_CONSENSUS_RAFTP2P_LIBRARY: &str = "0x0000000000000000000000000000000000000036";
pub const ADDR_CONSENSUS_RAFTP2P: &str = "0x0000000000000000000000000000000000000037";
pub const ADDR_GOV_CONT: &str = "0x0000000000000000000000000000000000000038";
pub const ADDR_AUTH: &str = "0x0000000000000000000000000000000000000039";
pub const ADDR_CONSENSUS_TENDERMINTP2P_LIBRARY: &str = "0x0000000000000000000000000000000000000040";
pub const ADDR_CONSENSUS_TENDERMINTP2P: &str = "0x0000000000000000000000000000000000000041";
pub const ADDR_CHAT: &str = "0x0000000000000000000000000000000000000042";
pub const ADDR_HOOKS_NONC: &str = "0x0000000000000000000000000000000000000043";
pub const ADDR_CHAT_VERIFIER: &str = "0x0000000000000000000000000000000000000044";
pub const ADDR_SLASHING: &str = "0x0000000000000000000000000000000000000045";
pub const ADDR_DISTRIBUTION: &str = "0x0000000000000000000000000000000000000046";
pub const ADDR_TIME: &str = "0x0000000000000000000000000000000000000047";
pub const ADDR_LEVEL0: &str = "0x0000000000000000000000000000000000000048";
pub const ADDR_LEVEL0_LIBRARY: &str = "0x0000000000000000000000000000000000000049";
pub const ADDR_MULTICHAIN_REGISTRY: &str = "0x000000000000000000000000000000000000004a";
pub const ADDR_MULTICHAIN_REGISTRY_LOCAL: &str = "0x000000000000000000000000000000000000004b";
pub const ADDR_LOBBY: &str = "0x000000000000000000000000000000000000004d";
pub const ADDR_LOBBY_LIBRARY: &str = "0x000000000000000000000000000000000000004e";
pub const ADDR_METAREGISTRY: &str = "0x000000000000000000000000000000000000004f";
pub const ADDR_INTERPRETER_TAY: &str = "0x0000000000000000000000000000000000000050";
pub const ADDR_LEVEL0_ONDEMAND: &str = "0x0000000000000000000000000000000000000051";
pub const ADDR_LEVEL0_ONDEMAND_LIBRARY: &str = "0x0000000000000000000000000000000000000052";
pub const ADDR_ROLES: &str = "0x0000000000000000000000000000000000000060";
pub const ADDR_STORAGE_CONTRACTS: &str = "0x0000000000000000000000000000000000000061";
pub const ADDR_SYS_PROXY: &str =
    "0xffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffff";

// Roles
pub const ROLE_ROLES: &str = "roles";
pub const ROLE_STORAGE_CONTRACTS: &str = "storage_contracts";
pub const ROLE_AUTH: &str = "auth";
pub const ROLE_INTERPRETER: &str = "interpreter";
pub const ROLE_LIBRARY: &str = "deplibrary";
pub const ROLE_CONSENSUS: &str = "consensus";
pub const ROLE_DENOM: &str = "denom";
pub const ROLE_FEE_COLLECTOR: &str = "fee_collector";
pub const ROLE_STORAGE: &str = "storage";
pub const ROLE_ALIAS: &str = "alias";
pub const ROLE_EID_REGISTRY: &str = "eid_registry";
pub const ROLE_HOOKS: &str = "hooks";
pub const ROLE_HOOKS_NONC: &str = "hooks_nonconsensus";
pub const ROLE_STAKING: &str = "staking";
pub const ROLE_BANK: &str = "bank";
pub const ROLE_GOVERNANCE: &str = "gov";
pub const ROLE_SLASHING: &str = "slashing";
pub const ROLE_DISTRIBUTION: &str = "distribution";
pub const ROLE_TIME: &str = "time";
pub const ROLE_CHAT: &str = "chat";
pub const ROLE_MULTICHAIN_REGISTRY: &str = "multichain_registry";
pub const ROLE_MULTICHAIN_REGISTRY_LOCAL: &str = "multichain_registry_local";
pub const ROLE_LOBBY: &str = "lobby";
pub const ROLE_METAREGISTRY: &str = "metaregistry";

/// Module account name the fee collector address is derived from.
pub const FEE_COLLECTOR: &str = "fee_collector";

// Contract labels
pub const INTERPRETER_EVM_SHANGHAI: &str = "interpreter_evm_shanghai_bz_1.0.0";
pub const INTERPRETER_PYTHON: &str = "interpreter_python_utf8_0.2.0";
pub const INTERPRETER_JS: &str = "interpreter_javascript_utf8_0.1.0";
pub const INTERPRETER_FSM: &str = "interpreter_state_machine_bz_0.1.0";
pub const INTERPRETER_TAY: &str = "tay_interpreter_v0.0.1";

pub const ALIAS_ETH: &str = "alias_eth";
pub const STORAGE_CHAIN: &str = "storage_chain";
pub const PROXY_INTERFACES: &str = "proxy_interfaces";
pub const SYS_PROXY: &str = "sys_proxy";
pub const SECP384R1_REGISTRY: &str = "secp384r1_registry";

pub const CONSENSUS_RAFT: &str = "consensus_raft_0.0.1";
pub const CONSENSUS_RAFT_LIBRARY: &str = "raft_library";
pub const CONSENSUS_RAFTP2P: &str = "consensus_raftp2p_0.0.1";
pub const CONSENSUS_RAFTP2P_LIBRARY: &str = "raftp2p_library";
pub const CONSENSUS_TENDERMINT: &str = "consensus_tendermint_0.0.1";
pub const CONSENSUS_TENDERMINT_LIBRARY: &str = "tendermint_library";
pub const CONSENSUS_TENDERMINTP2P: &str = "consensus_tendermintp2p_0.0.1";
pub const CONSENSUS_TENDERMINTP2P_LIBRARY: &str = "tendermintp2p_library";
pub const CONSENSUS_AVA_SNOWMAN: &str = "consensus_ava_snowman_0.0.1";
pub const CONSENSUS_AVA_SNOWMAN_LIBRARY: &str = "ava_snowman_library";
pub const CONSENSUS_LEVEL_LIBRARY: &str = "level0_library";
pub const LOBBY_LIBRARY: &str = "lobby_library";
pub const LEVEL0_ONDEMAND_LIBRARY: &str = "level0_ondemand_library";

pub const STAKING_V001: &str = "staking_0.0.1";
pub const BANK_V001: &str = "bank_0.0.1";
pub const ERC20_V001: &str = "erc20json";
pub const DERC20_V001: &str = "derc20json";
pub const HOOKS_V001: &str = "hooks_0.0.1";
pub const GOV_V001: &str = "gov_0.0.1";
pub const GOV_CONT_V001: &str = "gov_cont_0.0.1";
pub const AUTH_V001: &str = "auth_0.0.1";
pub const ROLES_V001: &str = "roles_0.0.1";
pub const STORAGE_CONTRACTS_V001: &str = "storage_contracts_0.0.1";
pub const SLASHING_V001: &str = "slashing_0.0.1";
pub const DISTRIBUTION_V001: &str = "distribution_0.0.1";
pub const CHAT_V001: &str = "chat_0.0.1";
pub const CHAT_VERIFIER_V001: &str = "chat_verifier_0.0.1";
pub const TIME_V001: &str = "time_0.0.1";
pub const LEVEL0_V001: &str = "level0_0.0.1";
pub const LEVEL0_ONDEMAND_V001: &str = "level0_ondemand_0.0.1";
pub const MULTICHAIN_REGISTRY_V001: &str = "multichain_registry_0.0.1";
pub const MULTICHAIN_REGISTRY_LOCAL_V001: &str = "multichain_registry_local_0.0.1";
pub const LOBBY_V001: &str = "lobby_json_0.0.1";
pub const METAREGISTRY_V001: &str = "metaregistry_json_0.0.1";

// Host interface dependency labels
pub const WASMX_ENV_2: &str = "wasmx_env_2";
pub const WASMX_ENV_I32_2: &str = "wasmx_env_i32_2";
pub const WASMX_ENV_I64_2: &str = "wasmx_env_i64_2";
pub const WASMX_CORE_ENV_I32_1: &str = "wasmx_env_core_i32_1";
pub const WASMX_CORE_ENV_I64_1: &str = "wasmx_env_core_i64_1";

/// Import module names the host modules are published under.
pub const WASMX_IMPORT_MODULE: &str = "wasmx";
pub const WASMX_CORE_IMPORT_MODULE: &str = "wasmxcore";
