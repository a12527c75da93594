// Copyright (C) 2021-2025 the DTVM authors. All Rights Reserved.
// SPDX-License-Identifier: Apache-2.0

//! Genesis Bootstrap Graph
//!
//! The built-in contracts, assembled phase by phase. The order is part of
//! consensus: genesis replays this list front to back on every node.
//!
//! 1. starter: contract storage, roles, auth (everything after needs roles)
//! 2. stateless precompiles
//! 3. interpreters
//! 4. base services, EID, hooks, cosmos modules
//! 5. consensus libraries and their state machine instances
//! 6. multichain and chat extensions

use super::address::AddressCodec;
use super::constants::*;
use super::contract::{StorageScope, SystemContract};
use super::hooks::{default_hooks, default_hooks_nonconsensus, time_chain_hooks_nonconsensus, Hook};
use super::roles::fill_roles;
use crate::deps::build_dep;
use crate::error::{resolution_error, HostResult};
use crate::message::ExecutionMessage;

/// Chain-specific values baked into init messages.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenesisParams {
    /// Prefixed fee collector address. Empty derives the module account.
    pub fee_collector: String,
    pub mint: String,
    pub min_validator_count: i32,
    pub enable_eid_check: bool,
    /// JSON value for the local multichain registry's initial ports.
    pub initial_port_values: String,
}

impl Default for GenesisParams {
    fn default() -> Self {
        Self {
            fee_collector: String::new(),
            mint: String::new(),
            min_validator_count: 1,
            enable_eid_check: false,
            initial_port_values: "{}".to_string(),
        }
    }
}

fn init_msg(data: &str) -> HostResult<Vec<u8>> {
    ExecutionMessage::new(data.as_bytes().to_vec()).to_json_bytes()
}

fn empty_init() -> HostResult<Vec<u8>> {
    ExecutionMessage::default().to_json_bytes()
}

fn hooks_init(hooks: &[Hook]) -> HostResult<Vec<u8>> {
    init_msg(&format!("{{\"hooks\":{}}}", serde_json::to_string(hooks)?))
}

fn fsm_deps(library: &str) -> Vec<String> {
    vec![INTERPRETER_FSM.to_string(), build_dep(library, ROLE_LIBRARY)]
}

pub fn starter_precompiles() -> HostResult<Vec<SystemContract>> {
    let init = empty_init()?;
    Ok(vec![
        SystemContract::new(ADDR_STORAGE_CONTRACTS, STORAGE_CONTRACTS_V001, init.clone())
            .with_role(ROLE_STORAGE_CONTRACTS, ROLE_STORAGE_CONTRACTS, true),
        SystemContract::new(ADDR_ROLES, ROLES_V001, init.clone())
            .with_role(ROLE_ROLES, ADDR_ROLES, true),
        SystemContract::new(ADDR_AUTH, AUTH_V001, init).with_role(ROLE_AUTH, ADDR_AUTH, true),
    ])
}

pub fn simple_precompiles() -> HostResult<Vec<SystemContract>> {
    let init = empty_init()?;
    let mut contracts =
        vec![SystemContract::new(ADDR_ECRECOVER, "ecrecover", init.clone()).native()];
    for (address, label) in [
        (ADDR_ECRECOVERETH, "ecrecovereth"),
        (ADDR_SHA2_256, "sha2-256"),
        (ADDR_RIPMD160, "ripmd160"),
        (ADDR_IDENTITY, "identity"),
        (ADDR_MODEXP, "modexp"),
        (ADDR_ECADD, "ecadd"),
        (ADDR_ECMUL, "ecmul"),
        (ADDR_ECPAIRINGS, "ecpairings"),
        (ADDR_BLAKE2F, "blake2f"),
    ] {
        contracts.push(SystemContract::new(address, label, init.clone()));
    }
    Ok(contracts)
}

pub fn interpreter_precompiles() -> HostResult<Vec<SystemContract>> {
    let init = empty_init()?;
    Ok(vec![
        SystemContract::new(ADDR_INTERPRETER_EVM_SHANGHAI, INTERPRETER_EVM_SHANGHAI, init.clone())
            .with_role(ROLE_INTERPRETER, INTERPRETER_EVM_SHANGHAI, true),
        SystemContract::new(ADDR_INTERPRETER_PYTHON, INTERPRETER_PYTHON, init.clone())
            .with_role(ROLE_INTERPRETER, INTERPRETER_PYTHON, false),
        SystemContract::new(ADDR_INTERPRETER_JS, INTERPRETER_JS, init.clone())
            .with_role(ROLE_INTERPRETER, INTERPRETER_JS, false),
        SystemContract::new(ADDR_INTERPRETER_FSM, INTERPRETER_FSM, init.clone())
            .with_role(ROLE_INTERPRETER, INTERPRETER_FSM, false),
        SystemContract::new(ADDR_INTERPRETER_TAY, INTERPRETER_TAY, init)
            .with_role(ROLE_INTERPRETER, INTERPRETER_TAY, false)
            .with_deps(vec![crate::memory::registry::MEMORY_TAYLOR.to_string()]),
    ])
}

pub fn base_precompiles() -> HostResult<Vec<SystemContract>> {
    let init = empty_init()?;
    Ok(vec![
        SystemContract::new(
            ADDR_STORAGE_CHAIN,
            STORAGE_CHAIN,
            init_msg(r#"{"initialBlockIndex":1}"#)?,
        )
        .with_role(ROLE_STORAGE, STORAGE_CHAIN, true)
        .with_storage(StorageScope::MetaConsensus),
        SystemContract::new(ADDR_ALIAS_ETH, ALIAS_ETH, init.clone())
            .unpinned()
            .with_role(ROLE_ALIAS, ALIAS_ETH, true),
        SystemContract::new(ADDR_PROXY_INTERFACES, PROXY_INTERFACES, init.clone()).native(),
        SystemContract::new(ADDR_SYS_PROXY, SYS_PROXY, init).unpinned(),
    ])
}

pub fn eid_precompiles() -> HostResult<Vec<SystemContract>> {
    let init = empty_init()?;
    Ok(vec![
        SystemContract::new(ADDR_SECP384R1, "secp384r1", init.clone()),
        SystemContract::new(ADDR_SECP384R1_REGISTRY, SECP384R1_REGISTRY, init.clone())
            .with_role(ROLE_EID_REGISTRY, SECP384R1_REGISTRY, true),
        SystemContract::new(ADDR_SECRET_SHARING, "secret_sharing", init).native(),
    ])
}

fn hook_contracts(nonconsensus: &[Hook]) -> HostResult<Vec<SystemContract>> {
    Ok(vec![
        SystemContract::new(ADDR_HOOKS, HOOKS_V001, hooks_init(&default_hooks())?).with_role(
            ROLE_HOOKS,
            &format!("{}_{}", ROLE_HOOKS, HOOKS_V001),
            true,
        ),
        SystemContract::new(ADDR_HOOKS_NONC, HOOKS_V001, hooks_init(nonconsensus)?)
            .with_role(
                ROLE_HOOKS_NONC,
                &format!("{}_{}", ROLE_HOOKS_NONC, HOOKS_V001),
                true,
            )
            .with_storage(StorageScope::SingleConsensus),
    ])
}

pub fn hook_precompiles() -> HostResult<Vec<SystemContract>> {
    hook_contracts(&default_hooks_nonconsensus())
}

pub fn cosmos_precompiles(fee_collector: &str, mint: &str) -> HostResult<Vec<SystemContract>> {
    let init = empty_init()?;
    let bank_init = init_msg(&format!(
        r#"{{"authorities":["{}","{}","{}","{}","{}"]}}"#,
        ROLE_STAKING, ROLE_GOVERNANCE, ROLE_BANK, fee_collector, mint
    ))?;
    let gov_init = init_msg(
        r#"{"arbitrationDenom":"aarb","coefs":[1048576, 3, 100, 2000, 1500, 10, 4, 8, 10000, 1531, 1000],"defaultX":1531,"defaultY":1000}"#,
    )?;
    Ok(vec![
        SystemContract::new(ADDR_STAKING, STAKING_V001, init.clone())
            .with_role(ROLE_STAKING, STAKING_V001, true),
        SystemContract::new(ADDR_BANK, BANK_V001, bank_init).with_role(ROLE_BANK, BANK_V001, true),
        SystemContract::create_only(ERC20_V001, init.clone()),
        SystemContract::create_only(DERC20_V001, init.clone()),
        SystemContract::new(ADDR_SLASHING, SLASHING_V001, init.clone())
            .with_role(ROLE_SLASHING, SLASHING_V001, true),
        SystemContract::new(ADDR_DISTRIBUTION, DISTRIBUTION_V001, init.clone())
            .with_role(ROLE_DISTRIBUTION, DISTRIBUTION_V001, true),
        SystemContract::new(ADDR_GOV, GOV_V001, init).with_role(ROLE_GOVERNANCE, GOV_V001, false),
        SystemContract::new(ADDR_GOV_CONT, GOV_CONT_V001, gov_init)
            .with_role(ROLE_GOVERNANCE, GOV_CONT_V001, true),
    ])
}

const RAFT_INIT: &str = r#"{"instantiate":{"context":[{"key":"log","value":""},{"key":"validatorNodesInfo","value":"[]"},{"key":"votedFor","value":"0"},{"key":"nextIndex","value":"[]"},{"key":"matchIndex","value":"[]"},{"key":"commitIndex","value":"0"},{"key":"currentTerm","value":"0"},{"key":"lastApplied","value":"0"},{"key":"blockTimeout","value":"heartbeatTimeout"},{"key":"max_tx_bytes","value":"65536"},{"key":"prevLogIndex","value":"0"},{"key":"currentNodeId","value":"0"},{"key":"electionReset","value":"0"},{"key":"max_block_gas","value":"20000000"},{"key":"electionTimeout","value":"0"},{"key":"maxElectionTime","value":"20000"},{"key":"minElectionTime","value":"10000"},{"key":"heartbeatTimeout","value":"5000"}],"initialState":"uninitialized"}}"#;

const TENDERMINT_INIT: &str = r#"{"instantiate":{"context":[{"key":"log","value":""},{"key":"votedFor","value":"0"},{"key":"nextIndex","value":"[]"},{"key":"currentTerm","value":"0"},{"key":"blockTimeout","value":"roundTimeout"},{"key":"max_tx_bytes","value":"65536"},{"key":"roundTimeout","value":15000},{"key":"currentNodeId","value":"0"},{"key":"max_block_gas","value":"20000000"}],"initialState":"uninitialized"}}"#;

const TENDERMINTP2P_INIT: &str = r#"{"instantiate":{"context":[{"key":"log","value":""},{"key":"votedFor","value":"0"},{"key":"nextIndex","value":"[]"},{"key":"currentTerm","value":"0"},{"key":"blockTimeout","value":"roundTimeout"},{"key":"max_tx_bytes","value":"65536"},{"key":"roundTimeout","value":"2000"},{"key":"currentNodeId","value":"0"},{"key":"max_block_gas","value":"60000000"},{"key":"timeoutPropose","value":15000},{"key":"timeoutPrevote","value":15000},{"key":"timeoutPrecommit","value":20000}],"initialState":"uninitialized"}}"#;

const AVA_INIT: &str = r#"{"instantiate":{"context":[{"key":"sampleSize","value":"2"},{"key":"betaThreshold","value":2},{"key":"roundsCounter","value":"0"},{"key":"alphaThreshold","value":80}],"initialState":"uninitialized"}}"#;

const TIME_INIT: &str = r#"{"params":{"chain_id":"time_666-1","interval_ms":100}}"#;

const LEVEL0_INIT: &str = r#"{"instantiate":{"context":[{"key":"log","value":""},{"key":"votedFor","value":"0"},{"key":"nextIndex","value":"[]"},{"key":"currentTerm","value":"0"},{"key":"blockTimeout","value":"roundTimeout"},{"key":"max_tx_bytes","value":"65536"},{"key":"roundTimeout","value":3000},{"key":"currentNodeId","value":"0"},{"key":"max_block_gas","value":"60000000"},{"key":"timeoutPropose","value":20000},{"key":"timeoutPrecommit","value":20000}],"initialState":"uninitialized"}}"#;

const METAREGISTRY_INIT: &str = r#"{"params":{"current_level":0}}"#;

const LEVEL0_ONDEMAND_INIT: &str = r#"{"instantiate":{"context":[{"key":"log","value":""},{"key":"votedFor","value":"0"},{"key":"nextIndex","value":"[]"},{"key":"currentTerm","value":"0"},{"key":"blockTimeout","value":"roundTimeout"},{"key":"max_tx_bytes","value":"65536"},{"key":"roundTimeout","value":2000},{"key":"currentNodeId","value":"0"},{"key":"max_block_gas","value":"60000000"},{"key":"timeoutPropose","value":20000},{"key":"timeoutPrecommit","value":20000},{"key":"batchTimeout","value":1000}],"initialState":"uninitialized"}}"#;

fn library(address: &str, label: &str, primary: bool, init: &[u8]) -> SystemContract {
    SystemContract::new(address, label, init.to_vec())
        .with_role(ROLE_LIBRARY, label, primary)
        .with_storage(StorageScope::SingleConsensus)
}

fn fsm_instance(address: &str, label: &str, init: Vec<u8>, library: &str) -> SystemContract {
    SystemContract::new(address, label, init)
        .unpinned()
        .with_storage(StorageScope::SingleConsensus)
        .with_deps(fsm_deps(library))
}

pub fn consensus_precompiles(
    params: &GenesisParams,
    erc20_code_id: i32,
    derc20_code_id: i32,
) -> HostResult<Vec<SystemContract>> {
    let init = empty_init()?;
    let raft_init = init_msg(RAFT_INIT)?;
    let lobby_init = init_msg(&format!(
        r#"{{"instantiate":{{"context":[{{"key":"heartbeatTimeout","value":5000}},{{"key":"newchainTimeout","value":20000}},{{"key":"current_level","value":0}},{{"key":"min_validators_count","value":{}}},{{"key":"enable_eid_check","value":{}}},{{"key":"erc20CodeId","value":{}}},{{"key":"derc20CodeId","value":{}}},{{"key":"level_initial_balance","value":10000000000000000000}}],"initialState":"uninitialized"}}}}"#,
        params.min_validator_count, params.enable_eid_check, erc20_code_id, derc20_code_id
    ))?;
    let multichain_local_init = init_msg(&format!(
        r#"{{"ids":[],"initialPorts":{}}}"#,
        params.initial_port_values
    ))?;

    Ok(vec![
        library(ADDR_CONSENSUS_RAFT_LIBRARY, CONSENSUS_RAFT_LIBRARY, false, &init),
        library(ADDR_CONSENSUS_RAFTP2P_LIBRARY, CONSENSUS_RAFTP2P_LIBRARY, false, &init),
        library(ADDR_CONSENSUS_TENDERMINT_LIBRARY, CONSENSUS_TENDERMINT_LIBRARY, false, &init),
        library(ADDR_CONSENSUS_TENDERMINTP2P_LIBRARY, CONSENSUS_TENDERMINTP2P_LIBRARY, true, &init),
        fsm_instance(ADDR_CONSENSUS_RAFT, CONSENSUS_RAFT, raft_init.clone(), ADDR_CONSENSUS_RAFT_LIBRARY),
        fsm_instance(ADDR_CONSENSUS_RAFTP2P, CONSENSUS_RAFTP2P, raft_init, ADDR_CONSENSUS_RAFTP2P_LIBRARY),
        fsm_instance(
            ADDR_CONSENSUS_TENDERMINT,
            CONSENSUS_TENDERMINT,
            init_msg(TENDERMINT_INIT)?,
            ADDR_CONSENSUS_TENDERMINT_LIBRARY,
        ),
        fsm_instance(
            ADDR_CONSENSUS_TENDERMINTP2P,
            CONSENSUS_TENDERMINTP2P,
            init_msg(TENDERMINTP2P_INIT)?,
            ADDR_CONSENSUS_TENDERMINTP2P_LIBRARY,
        ),
        library(ADDR_CONSENSUS_AVA_SNOWMAN_LIBRARY, CONSENSUS_AVA_SNOWMAN_LIBRARY, false, &init),
        fsm_instance(
            ADDR_CONSENSUS_AVA_SNOWMAN,
            CONSENSUS_AVA_SNOWMAN,
            init_msg(AVA_INIT)?,
            ADDR_CONSENSUS_AVA_SNOWMAN_LIBRARY,
        ),
        SystemContract::new(ADDR_TIME, TIME_V001, init_msg(TIME_INIT)?)
            .with_role(ROLE_TIME, TIME_V001, true)
            .with_storage(StorageScope::SingleConsensus),
        library(ADDR_LEVEL0_LIBRARY, CONSENSUS_LEVEL_LIBRARY, false, &init),
        fsm_instance(ADDR_LEVEL0, LEVEL0_V001, init_msg(LEVEL0_INIT)?, ADDR_LEVEL0_LIBRARY),
        SystemContract::new(
            ADDR_MULTICHAIN_REGISTRY_LOCAL,
            MULTICHAIN_REGISTRY_LOCAL_V001,
            multichain_local_init,
        )
        .with_role(
            ROLE_MULTICHAIN_REGISTRY_LOCAL,
            MULTICHAIN_REGISTRY_LOCAL_V001,
            true,
        )
        .with_storage(StorageScope::SingleConsensus),
        library(ADDR_LOBBY_LIBRARY, LOBBY_LIBRARY, false, &init),
        fsm_instance(ADDR_LOBBY, LOBBY_V001, lobby_init, ADDR_LOBBY_LIBRARY)
            .with_role(ROLE_LOBBY, LOBBY_V001, true),
        SystemContract::new(ADDR_METAREGISTRY, METAREGISTRY_V001, init_msg(METAREGISTRY_INIT)?)
            .with_role(ROLE_METAREGISTRY, METAREGISTRY_V001, true)
            .with_storage(StorageScope::MetaConsensus),
        library(ADDR_LEVEL0_ONDEMAND_LIBRARY, LEVEL0_ONDEMAND_LIBRARY, false, &init),
        fsm_instance(
            ADDR_LEVEL0_ONDEMAND,
            LEVEL0_ONDEMAND_V001,
            init_msg(LEVEL0_ONDEMAND_INIT)?,
            ADDR_LEVEL0_ONDEMAND_LIBRARY,
        ),
    ])
}

pub fn multichain_precompiles(
    params: &GenesisParams,
    erc20_code_id: i32,
    derc20_code_id: i32,
) -> HostResult<Vec<SystemContract>> {
    let init = init_msg(&format!(
        r#"{{"params":{{"min_validators_count":{},"enable_eid_check":{},"erc20CodeId":{},"derc20CodeId":{},"level_initial_balance":"10000000000000000000"}}}}"#,
        params.min_validator_count, params.enable_eid_check, erc20_code_id, derc20_code_id
    ))?;
    Ok(vec![SystemContract::new(
        ADDR_MULTICHAIN_REGISTRY,
        MULTICHAIN_REGISTRY_V001,
        init,
    )
    .with_role(ROLE_MULTICHAIN_REGISTRY, MULTICHAIN_REGISTRY_V001, true)])
}

pub fn chat_precompiles() -> HostResult<Vec<SystemContract>> {
    let init = empty_init()?;
    Ok(vec![
        SystemContract::new(ADDR_CHAT, CHAT_V001, init.clone())
            .with_role(ROLE_CHAT, CHAT_V001, true)
            .with_storage(StorageScope::SingleConsensus),
        SystemContract::new(ADDR_CHAT_VERIFIER, CHAT_VERIFIER_V001, init),
    ])
}

/// 1-based position of `label` in `contracts`, used as its code id.
pub fn code_id_of(contracts: &[SystemContract], label: &str) -> Option<i32> {
    contracts
        .iter()
        .rposition(|c| c.label == label)
        .map(|i| i as i32 + 1)
}

fn assemble(
    codec: &AddressCodec,
    params: &GenesisParams,
    hooks_nonconsensus: &[Hook],
    consensus_label: &str,
) -> HostResult<Vec<SystemContract>> {
    let mut contracts = starter_precompiles()?;
    contracts.extend(simple_precompiles()?);
    contracts.extend(interpreter_precompiles()?);
    contracts.extend(base_precompiles()?);
    contracts.extend(eid_precompiles()?);
    contracts.extend(hook_contracts(hooks_nonconsensus)?);
    contracts.extend(cosmos_precompiles(&params.fee_collector, &params.mint)?);

    let (erc20_code_id, derc20_code_id) = match (
        code_id_of(&contracts, ERC20_V001),
        code_id_of(&contracts, DERC20_V001),
    ) {
        (Some(erc20), Some(derc20)) => (erc20, derc20),
        (erc20, derc20) => {
            return Err(resolution_error(format!(
                "erc20 or derc20 contracts not found: erc20 {:?}, derc20 {:?}",
                erc20, derc20
            )))
        }
    };

    let mut consensus = consensus_precompiles(params, erc20_code_id, derc20_code_id)?;
    let mut marked = false;
    for contract in consensus.iter_mut().filter(|c| c.label == consensus_label) {
        contract.role = Some(super::contract::SystemContractRole::new(
            ROLE_CONSENSUS,
            consensus_label,
            true,
        ));
        marked = true;
    }
    if !marked {
        return Err(resolution_error(format!(
            "consensus contract '{}' not found",
            consensus_label
        )));
    }
    contracts.extend(consensus);
    contracts.extend(multichain_precompiles(params, erc20_code_id, derc20_code_id)?);
    contracts.extend(chat_precompiles()?);

    let fee_collector = Some(params.fee_collector.as_str()).filter(|f| !f.is_empty());
    fill_roles(contracts, codec, fee_collector)
}

/// Genesis contracts of a regular chain, with tendermint-p2p as consensus.
pub fn default_system_contracts(
    codec: &AddressCodec,
    params: &GenesisParams,
) -> HostResult<Vec<SystemContract>> {
    assemble(
        codec,
        params,
        &default_hooks_nonconsensus(),
        CONSENSUS_TENDERMINTP2P,
    )
}

/// Genesis contracts of the time chain, with on-demand level0 as consensus.
pub fn default_time_chain_contracts(
    codec: &AddressCodec,
    params: &GenesisParams,
) -> HostResult<Vec<SystemContract>> {
    assemble(
        codec,
        params,
        &time_chain_hooks_nonconsensus(),
        LEVEL0_ONDEMAND_V001,
    )
}
