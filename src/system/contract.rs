// Copyright (C) 2021-2025 the DTVM authors. All Rights Reserved.
// SPDX-License-Identifier: Apache-2.0

use crate::config::CodeLimits;
use crate::error::{resolution_error, validation_error, HostError, HostResult};
use crate::message::ExecutionMessage;
use crate::system::address::validate_non_zero_address;
use std::fmt;
use std::str::FromStr;

/// State partition a contract's storage lives in.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum StorageScope {
    #[default]
    CoreConsensus,
    MetaConsensus,
    SingleConsensus,
}

impl StorageScope {
    pub fn as_i32(self) -> i32 {
        match self {
            StorageScope::CoreConsensus => 0,
            StorageScope::MetaConsensus => 1,
            StorageScope::SingleConsensus => 2,
        }
    }

    pub fn from_i32(value: i32) -> HostResult<Self> {
        match value {
            0 => Ok(StorageScope::CoreConsensus),
            1 => Ok(StorageScope::MetaConsensus),
            2 => Ok(StorageScope::SingleConsensus),
            other => Err(resolution_error(format!("unknown storage type {}", other))),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            StorageScope::CoreConsensus => "CoreConsensus",
            StorageScope::MetaConsensus => "MetaConsensus",
            StorageScope::SingleConsensus => "SingleConsensus",
        }
    }
}

impl fmt::Display for StorageScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StorageScope {
    type Err = HostError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "CoreConsensus" => Ok(StorageScope::CoreConsensus),
            "MetaConsensus" => Ok(StorageScope::MetaConsensus),
            "SingleConsensus" => Ok(StorageScope::SingleConsensus),
            other => Err(resolution_error(format!("unknown storage scope '{}'", other))),
        }
    }
}

/// Role a system contract registers under.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SystemContractRole {
    pub role: String,
    pub label: String,
    pub primary: bool,
}

impl SystemContractRole {
    pub fn new(role: &str, label: &str, primary: bool) -> Self {
        Self {
            role: role.to_string(),
            label: label.to_string(),
            primary,
        }
    }
}

/// One entry of the genesis bootstrap list.
///
/// `address: None` marks a create-only template: its code is stored and its
/// code id recorded, but nothing is instantiated at a fixed address.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SystemContract {
    pub address: Option<String>,
    pub label: String,
    pub storage_type: StorageScope,
    pub init_message: Vec<u8>,
    pub pinned: bool,
    pub metering_off: bool,
    pub native: bool,
    pub role: Option<SystemContractRole>,
    pub deps: Vec<String>,
}

impl SystemContract {
    /// A pinned, unmetered core-consensus contract with no role or deps.
    pub fn new(address: &str, label: &str, init_message: Vec<u8>) -> Self {
        Self {
            address: Some(address.to_string()),
            label: label.to_string(),
            storage_type: StorageScope::CoreConsensus,
            init_message,
            pinned: true,
            metering_off: true,
            native: false,
            role: None,
            deps: Vec::new(),
        }
    }

    pub fn create_only(label: &str, init_message: Vec<u8>) -> Self {
        Self {
            address: None,
            ..Self::new("", label, init_message)
        }
    }

    pub fn with_role(mut self, role: &str, label: &str, primary: bool) -> Self {
        self.role = Some(SystemContractRole::new(role, label, primary));
        self
    }

    pub fn with_storage(mut self, storage_type: StorageScope) -> Self {
        self.storage_type = storage_type;
        self
    }

    pub fn with_deps(mut self, deps: Vec<String>) -> Self {
        self.deps = deps;
        self
    }

    /// Not pinned, metered.
    pub fn unpinned(mut self) -> Self {
        self.pinned = false;
        self.metering_off = false;
        self
    }

    /// Implemented by the host, not by guest code.
    pub fn native(mut self) -> Self {
        self.native = true;
        self.pinned = false;
        self.metering_off = false;
        self
    }

    pub fn address_str(&self) -> &str {
        self.address.as_deref().unwrap_or("")
    }

    pub fn role_name(&self) -> Option<&str> {
        self.role.as_ref().map(|r| r.role.as_str())
    }

    pub fn validate(&self, limits: &CodeLimits) -> HostResult<()> {
        if self.label.is_empty() {
            return Err(validation_error("system contract label must not be empty"));
        }
        if self.label.len() > limits.max_label_size {
            return Err(validation_error(format!(
                "label '{}' exceeds {} bytes",
                self.label, limits.max_label_size
            )));
        }
        if self.init_message.is_empty() {
            return Err(validation_error(format!(
                "{}: initialization message cannot be empty",
                self.label
            )));
        }
        ExecutionMessage::from_json_bytes(&self.init_message)
            .map_err(|e| validation_error(format!("{}: {}", self.label, e)))?;
        match self.address.as_deref() {
            None | Some("") => Ok(()),
            Some(address) => validate_non_zero_address(address)
                .map_err(|e| validation_error(format!("{}: {}", self.label, e))),
        }
    }
}
