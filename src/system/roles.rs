// Copyright (C) 2021-2025 the DTVM authors. All Rights Reserved.
// SPDX-License-Identifier: Apache-2.0

//! Role Resolution
//!
//! [`fill_roles`] turns the ordered system contract list into the role
//! genesis of the roles registry contract:
//!
//! 1. primaries: every role seen gets an entry (first-seen order is kept);
//!    a primary contract's address goes in and its index becomes `primary`
//! 2. secondaries: every other contract of a role is appended
//! 3. implicit `denom` and `fee_collector` roles are added when missing
//! 4. the roles are serialized in insertion order into [`RolesGenesis`]
//!    and set as the init message of the contract holding the `roles` role
//!
//! The output must be byte-identical on every node, so nothing here iterates
//! a hash map.

use super::address::AddressCodec;
use super::constants::{FEE_COLLECTOR, ROLE_CONSENSUS, ROLE_DENOM, ROLE_FEE_COLLECTOR, ROLE_ROLES};
use super::contract::{StorageScope, SystemContract};
use crate::error::{resolution_error, HostResult};
use crate::message::ExecutionMessage;
use log::debug;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A resolved role as stored by the roles registry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleJson {
    pub role: String,
    pub storage_type: i32,
    pub primary: i32,
    pub multiple: bool,
    pub labels: Vec<String>,
    pub addresses: Vec<String>,
}

impl RoleJson {
    fn empty(role: &str, storage_type: StorageScope) -> Self {
        Self {
            role: role.to_string(),
            storage_type: storage_type.as_i32(),
            primary: 0,
            multiple: false,
            labels: Vec::new(),
            addresses: Vec::new(),
        }
    }

    pub fn storage_scope(&self) -> HostResult<StorageScope> {
        StorageScope::from_i32(self.storage_type)
    }

    pub fn primary_address(&self) -> Option<&str> {
        usize::try_from(self.primary)
            .ok()
            .and_then(|i| self.addresses.get(i))
            .map(String::as_str)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RolesGenesis {
    pub roles: Vec<RoleJson>,
    pub individual_migration: Vec<String>,
}

impl RolesGenesis {
    /// Decode the genesis from a roles contract init message.
    pub fn from_init_message(init_message: &[u8]) -> HostResult<Self> {
        let envelope = ExecutionMessage::from_json_bytes(init_message)?;
        Ok(serde_json::from_slice(&envelope.data)?)
    }

    pub fn to_init_message(&self) -> HostResult<Vec<u8>> {
        ExecutionMessage::new(serde_json::to_vec(self)?).to_json_bytes()
    }
}

/// Role map that remembers insertion order.
struct OrderedRoles {
    entries: HashMap<String, RoleJson>,
    order: Vec<String>,
}

impl OrderedRoles {
    fn new() -> Self {
        Self {
            entries: HashMap::new(),
            order: Vec::new(),
        }
    }

    fn ensure(&mut self, role: &str, storage_type: StorageScope) -> &mut RoleJson {
        if !self.entries.contains_key(role) {
            self.order.push(role.to_string());
        }
        self.entries
            .entry(role.to_string())
            .or_insert_with(|| RoleJson::empty(role, storage_type))
    }

    fn into_ordered(mut self) -> HostResult<Vec<RoleJson>> {
        if self.entries.len() != self.order.len() {
            return Err(resolution_error(format!(
                "role map has {} entries but insertion order has {}",
                self.entries.len(),
                self.order.len()
            )));
        }
        self.order
            .iter()
            .map(|role| {
                self.entries
                    .remove(role)
                    .ok_or_else(|| resolution_error(format!("role '{}' lost during resolution", role)))
            })
            .collect()
    }
}

fn prefixed_address(codec: &AddressCodec, contract: &SystemContract) -> HostResult<String> {
    codec.hex_to_prefixed(contract.address_str()).map_err(|e| {
        resolution_error(format!(
            "role contract '{}' has an invalid address: {}",
            contract.label, e
        ))
    })
}

/// Resolve roles and embed the result in the roles contract.
///
/// `fee_collector` is the prefixed fee collector address; when `None` the
/// module account address derived from `"fee_collector"` is used.
pub fn fill_roles(
    mut contracts: Vec<SystemContract>,
    codec: &AddressCodec,
    fee_collector: Option<&str>,
) -> HostResult<Vec<SystemContract>> {
    let genesis = resolve_roles(&contracts, codec, fee_collector)?;
    let init_message = genesis.to_init_message()?;

    for contract in contracts.iter_mut() {
        if contract.role_name() == Some(ROLE_ROLES) {
            contract.init_message = init_message.clone();
        }
    }
    Ok(contracts)
}

/// The role genesis for `contracts`, without touching the list.
pub fn resolve_roles(
    contracts: &[SystemContract],
    codec: &AddressCodec,
    fee_collector: Option<&str>,
) -> HostResult<RolesGenesis> {
    let mut roles = OrderedRoles::new();

    for contract in contracts {
        let Some(role) = contract.role.as_ref() else {
            continue;
        };
        let entry = roles.ensure(&role.role, contract.storage_type);
        if role.primary {
            let address = prefixed_address(codec, contract)?;
            entry.primary = entry.addresses.len() as i32;
            entry.labels.push(role.label.clone());
            entry.addresses.push(address);
        }
    }

    for contract in contracts {
        let Some(role) = contract.role.as_ref() else {
            continue;
        };
        let address = prefixed_address(codec, contract)?;
        let entry = roles.ensure(&role.role, contract.storage_type);
        if !entry.addresses.contains(&address) {
            entry.labels.push(role.label.clone());
            entry.addresses.push(address);
            if entry.addresses.len() > 1 {
                entry.multiple = true;
            }
        }
    }

    if !roles.entries.contains_key(ROLE_DENOM) {
        roles.ensure(ROLE_DENOM, StorageScope::CoreConsensus).multiple = true;
    }

    if !roles.entries.contains_key(ROLE_FEE_COLLECTOR) {
        let address = match fee_collector {
            Some(address) => address.to_string(),
            None => codec.module_account(FEE_COLLECTOR)?,
        };
        let entry = roles.ensure(ROLE_FEE_COLLECTOR, StorageScope::CoreConsensus);
        entry.labels.push(FEE_COLLECTOR.to_string());
        entry.addresses.push(address);
    }

    let roles = roles.into_ordered()?;
    debug!("resolved {} roles", roles.len());
    Ok(RolesGenesis {
        roles,
        individual_migration: vec![ROLE_CONSENSUS.to_string()],
    })
}

/// Runtime role routing table.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RoleTable {
    roles: Vec<RoleJson>,
}

impl RoleTable {
    pub fn from_genesis(genesis: &RolesGenesis) -> Self {
        Self {
            roles: genesis.roles.clone(),
        }
    }

    /// Read the table from the init message of the roles contract in `contracts`.
    pub fn from_contracts(contracts: &[SystemContract]) -> HostResult<Self> {
        let roles_contract = contracts
            .iter()
            .find(|c| c.role_name() == Some(ROLE_ROLES))
            .ok_or_else(|| resolution_error("no contract holds the roles role"))?;
        Ok(Self::from_genesis(&RolesGenesis::from_init_message(
            &roles_contract.init_message,
        )?))
    }

    pub fn get(&self, role: &str) -> Option<&RoleJson> {
        self.roles.iter().find(|r| r.role == role)
    }

    pub fn address_by_role(&self, role: &str) -> Option<&str> {
        self.get(role).and_then(RoleJson::primary_address)
    }

    pub fn addresses_by_role(&self, role: &str) -> &[String] {
        self.get(role).map(|r| r.addresses.as_slice()).unwrap_or(&[])
    }

    /// First role, in genesis order, that lists `address`.
    pub fn role_by_address(&self, address: &str) -> Option<&str> {
        self.roles
            .iter()
            .find(|r| r.addresses.iter().any(|a| a == address))
            .map(|r| r.role.as_str())
    }

    pub fn roles(&self) -> impl Iterator<Item = &RoleJson> {
        self.roles.iter()
    }
}
