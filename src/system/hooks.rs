// Copyright (C) 2021-2025 the DTVM authors. All Rights Reserved.
// SPDX-License-Identifier: Apache-2.0

use super::constants::*;
use serde::{Deserialize, Serialize};

// non-consensus
pub const HOOK_START_NODE: &str = "StartNode";
pub const HOOK_SETUP_NODE: &str = "SetupNode";
pub const HOOK_NEW_SUBCHAIN: &str = "NewSubChain";

// consensus
pub const HOOK_BEGIN_BLOCK: &str = "BeginBlock";
pub const HOOK_END_BLOCK: &str = "EndBlock";
pub const HOOK_CREATE_VALIDATOR: &str = "CreatedValidator";
pub const HOOK_ROLE_CHANGED: &str = "RoleChanged";

// staking
pub const STAKING_HOOKS: [&str; 11] = [
    "AfterValidatorCreated",
    "AfterValidatorBonded",
    "AfterValidatorRemoved",
    "AfterValidatorBeginUnbonding",
    "AfterDelegationModified",
    "AfterUnbondingInitiated",
    "BeforeValidatorModified",
    "BeforeDelegationCreated",
    "BeforeDelegationSharesModified",
    "BeforeDelegationRemoved",
    "BeforeValidatorSlashed",
];

/// Routes a named event from its source roles to its target roles.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Hook {
    pub name: String,
    #[serde(rename = "sourceModules")]
    pub source_modules: Vec<String>,
    #[serde(rename = "targetModules")]
    pub target_modules: Vec<String>,
}

impl Hook {
    pub fn new(name: &str, sources: &[&str], targets: &[&str]) -> Self {
        Self {
            name: name.to_string(),
            source_modules: sources.iter().map(|s| s.to_string()).collect(),
            target_modules: targets.iter().map(|s| s.to_string()).collect(),
        }
    }
}

pub fn default_hooks() -> Vec<Hook> {
    let mut hooks = vec![
        Hook::new(HOOK_BEGIN_BLOCK, &[ROLE_CONSENSUS], &[ROLE_SLASHING]),
        Hook::new(
            HOOK_END_BLOCK,
            &[ROLE_CONSENSUS],
            &[ROLE_GOVERNANCE, ROLE_DISTRIBUTION],
        ),
        Hook::new(HOOK_CREATE_VALIDATOR, &[ROLE_CONSENSUS], &[]),
    ];
    hooks.extend(
        STAKING_HOOKS
            .iter()
            .map(|name| Hook::new(name, &[ROLE_STAKING], &[ROLE_SLASHING])),
    );
    hooks
}

pub fn default_hooks_nonconsensus() -> Vec<Hook> {
    vec![
        Hook::new(
            HOOK_START_NODE,
            &[ROLE_HOOKS_NONC],
            &[ROLE_CONSENSUS, ROLE_MULTICHAIN_REGISTRY_LOCAL, ROLE_CHAT],
        ),
        Hook::new(HOOK_SETUP_NODE, &[ROLE_HOOKS_NONC], &[ROLE_CONSENSUS, ROLE_LOBBY]),
        Hook::new(
            HOOK_NEW_SUBCHAIN,
            &[ROLE_HOOKS_NONC],
            &[ROLE_METAREGISTRY, ROLE_MULTICHAIN_REGISTRY_LOCAL],
        ),
    ]
}

/// Non-consensus hooks of the time chain, which runs no chat contract.
pub fn time_chain_hooks_nonconsensus() -> Vec<Hook> {
    vec![
        Hook::new(
            HOOK_START_NODE,
            &[ROLE_HOOKS_NONC],
            &[
                ROLE_CONSENSUS,
                ROLE_MULTICHAIN_REGISTRY_LOCAL,
                ROLE_TIME,
                ROLE_LOBBY,
            ],
        ),
        Hook::new(HOOK_SETUP_NODE, &[ROLE_HOOKS_NONC], &[ROLE_CONSENSUS, ROLE_LOBBY]),
        Hook::new(
            HOOK_NEW_SUBCHAIN,
            &[ROLE_HOOKS_NONC, ROLE_LOBBY, ROLE_CONSENSUS],
            &[ROLE_METAREGISTRY, ROLE_MULTICHAIN_REGISTRY_LOCAL],
        ),
    ]
}
