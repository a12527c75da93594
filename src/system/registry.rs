// Copyright (C) 2021-2025 the DTVM authors. All Rights Reserved.
// SPDX-License-Identifier: Apache-2.0

use super::contract::{StorageScope, SystemContract, SystemContractRole};
use crate::config::CodeLimits;
use crate::deps::resolver::{normalize, ContractLookup, DepResolver};
use crate::error::{validation_error, HostResult};
use log::debug;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Dependency lookup keyed by normalized address.
struct NormalizedLookup(BTreeMap<String, Vec<String>>);

impl ContractLookup for NormalizedLookup {
    fn deps_of(&self, address: &str) -> Option<&[String]> {
        self.0.get(&normalize(address)).map(Vec::as_slice)
    }
}

/// Validate a genesis contract list as a whole.
///
/// Each entry must validate on its own, fixed addresses must be unique and
/// every library dependency must resolve without cycles.
pub fn validate_registry(contracts: &[SystemContract], limits: &CodeLimits) -> HostResult<()> {
    let mut lookup = BTreeMap::new();
    for contract in contracts {
        contract.validate(limits)?;
        let Some(address) = contract.address.as_deref().filter(|a| !a.is_empty()) else {
            continue;
        };
        if lookup
            .insert(normalize(address), contract.deps.clone())
            .is_some()
        {
            return Err(validation_error(format!(
                "duplicate system contract address {} ({})",
                address, contract.label
            )));
        }
    }

    let lookup = NormalizedLookup(lookup);
    let resolver = DepResolver::new(&lookup);
    for contract in contracts {
        let root = contract.address.as_deref().filter(|a| !a.is_empty());
        resolver.resolve(root, &contract.deps)?;
    }
    debug!("validated {} system contracts", contracts.len());
    Ok(())
}

/// Serialized form of a system contract, as found in genesis files.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SystemContractEntry {
    #[serde(default)]
    pub address: String,
    pub label: String,
    #[serde(default = "default_storage_type")]
    pub storage_type: String,
    #[serde(default, with = "crate::message::base64_bytes")]
    pub init_message: Vec<u8>,
    #[serde(default)]
    pub pinned: bool,
    #[serde(default)]
    pub metering_off: bool,
    #[serde(default)]
    pub native: bool,
    #[serde(default)]
    pub role: Option<RoleEntry>,
    #[serde(default)]
    pub deps: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleEntry {
    pub role: String,
    pub label: String,
    #[serde(default)]
    pub primary: bool,
}

fn default_storage_type() -> String {
    StorageScope::CoreConsensus.as_str().to_string()
}

impl SystemContractEntry {
    pub fn into_contract(self) -> HostResult<SystemContract> {
        Ok(SystemContract {
            address: Some(self.address).filter(|a| !a.is_empty()),
            label: self.label,
            storage_type: self.storage_type.parse()?,
            init_message: self.init_message,
            pinned: self.pinned,
            metering_off: self.metering_off,
            native: self.native,
            role: self
                .role
                .map(|r| SystemContractRole::new(&r.role, &r.label, r.primary)),
            deps: self.deps,
        })
    }
}

impl From<&SystemContract> for SystemContractEntry {
    fn from(contract: &SystemContract) -> Self {
        Self {
            address: contract.address_str().to_string(),
            label: contract.label.clone(),
            storage_type: contract.storage_type.to_string(),
            init_message: contract.init_message.clone(),
            pinned: contract.pinned,
            metering_off: contract.metering_off,
            native: contract.native,
            role: contract.role.as_ref().map(|r| RoleEntry {
                role: r.role.clone(),
                label: r.label.clone(),
                primary: r.primary,
            }),
            deps: contract.deps.clone(),
        }
    }
}

/// Parse a JSON list of contract entries.
pub fn contracts_from_json(raw: &[u8]) -> HostResult<Vec<SystemContract>> {
    let entries: Vec<SystemContractEntry> = serde_json::from_slice(raw)?;
    entries
        .into_iter()
        .map(SystemContractEntry::into_contract)
        .collect()
}

pub fn contracts_to_json(contracts: &[SystemContract]) -> HostResult<Vec<u8>> {
    let entries: Vec<SystemContractEntry> = contracts.iter().map(Into::into).collect();
    Ok(serde_json::to_vec(&entries)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::deps::build_dep;
    use crate::message::ExecutionMessage;
    use crate::system::constants::*;

    fn init() -> Vec<u8> {
        ExecutionMessage::default().to_json_bytes().unwrap()
    }

    #[test]
    fn test_duplicate_address_rejected() {
        let contracts = vec![
            SystemContract::new(ADDR_BANK, BANK_V001, init()),
            SystemContract::new(&ADDR_BANK.to_uppercase().replace("0X", "0x"), "bank_copy", init()),
        ];
        let err = validate_registry(&contracts, &CodeLimits::default()).unwrap_err();
        assert_eq!(err.category(), "validation");
    }

    #[test]
    fn test_library_cycle_rejected() {
        let contracts = vec![
            SystemContract::new(ADDR_LOBBY_LIBRARY, LOBBY_LIBRARY, init())
                .with_deps(vec![build_dep(ADDR_LEVEL0_LIBRARY, ROLE_LIBRARY)]),
            SystemContract::new(ADDR_LEVEL0_LIBRARY, CONSENSUS_LEVEL_LIBRARY, init())
                .with_deps(vec![build_dep(ADDR_LOBBY_LIBRARY, ROLE_LIBRARY)]),
        ];
        let err = validate_registry(&contracts, &CodeLimits::default()).unwrap_err();
        assert_eq!(err.category(), "dependency");
        assert!(err.to_string().contains("cycle"));
    }

    #[test]
    fn test_create_only_entries_skip_address_checks() {
        let contracts = vec![
            SystemContract::create_only(ERC20_V001, init()),
            SystemContract::create_only(DERC20_V001, init()),
            SystemContract::new(ADDR_LOBBY, LOBBY_V001, init()).with_deps(vec![
                INTERPRETER_FSM.to_string(),
                build_dep(ADDR_LOBBY_LIBRARY, ROLE_LIBRARY),
            ]),
            SystemContract::new(ADDR_LOBBY_LIBRARY, LOBBY_LIBRARY, init()),
        ];
        validate_registry(&contracts, &CodeLimits::default()).unwrap();
    }

    #[test]
    fn test_entry_json() {
        let contracts = vec![SystemContract::new(ADDR_TIME, TIME_V001, init())
            .with_role(ROLE_TIME, TIME_V001, true)
            .with_storage(StorageScope::SingleConsensus)];
        let raw = contracts_to_json(&contracts).unwrap();
        let text = String::from_utf8(raw.clone()).unwrap();
        assert!(text.contains("\"storage_type\":\"SingleConsensus\""));
        assert_eq!(contracts_from_json(&raw).unwrap(), contracts);

        let bad = br#"[{"label":"x","storage_type":"Galactic"}]"#;
        let err = contracts_from_json(bad).unwrap_err();
        assert_eq!(err.category(), "dependency");
    }
}
