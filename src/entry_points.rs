// Copyright (C) 2021-2025 the DTVM authors. All Rights Reserved.
// SPDX-License-Identifier: Apache-2.0

//! Contract entry points
//!
//! `instantiate`, `execute` and `query` are always available. Callback
//! entry points are opt-in through an [`EntryPointRegistry`]; `reply`,
//! `eventual` and `p2pmsg` are registered by default.

use crate::error::{validation_error, HostError};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

pub const ENTRY_POINT_INSTANTIATE: &str = "instantiate";
pub const ENTRY_POINT_EXECUTE: &str = "execute";
pub const ENTRY_POINT_QUERY: &str = "query";
pub const ENTRY_POINT_REPLY: &str = "reply";
pub const ENTRY_POINT_EVENTUAL: &str = "eventual";
pub const ENTRY_POINT_P2P_MSG: &str = "p2pmsg";

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum EntryPoint {
    /// Contract creation
    Instantiate,
    /// State-changing call
    Execute,
    /// Read-only call
    Query,
    /// Asynchronous callback
    Reply,
    /// Scheduled callback
    Eventual,
    /// Peer message callback
    P2pMsg,
    Custom(String),
}

impl EntryPoint {
    pub fn as_str(&self) -> &str {
        match self {
            EntryPoint::Instantiate => ENTRY_POINT_INSTANTIATE,
            EntryPoint::Execute => ENTRY_POINT_EXECUTE,
            EntryPoint::Query => ENTRY_POINT_QUERY,
            EntryPoint::Reply => ENTRY_POINT_REPLY,
            EntryPoint::Eventual => ENTRY_POINT_EVENTUAL,
            EntryPoint::P2pMsg => ENTRY_POINT_P2P_MSG,
            EntryPoint::Custom(name) => name,
        }
    }

    pub fn is_read_only(&self) -> bool {
        matches!(self, EntryPoint::Query)
    }

    /// Always callable, no registration needed.
    pub fn is_builtin(&self) -> bool {
        matches!(
            self,
            EntryPoint::Instantiate | EntryPoint::Execute | EntryPoint::Query
        )
    }
}

impl fmt::Display for EntryPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EntryPoint {
    type Err = HostError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            ENTRY_POINT_INSTANTIATE => EntryPoint::Instantiate,
            ENTRY_POINT_EXECUTE => EntryPoint::Execute,
            ENTRY_POINT_QUERY => EntryPoint::Query,
            ENTRY_POINT_REPLY => EntryPoint::Reply,
            ENTRY_POINT_EVENTUAL => EntryPoint::Eventual,
            ENTRY_POINT_P2P_MSG => EntryPoint::P2pMsg,
            "" => return Err(validation_error("empty entry point name")),
            other => EntryPoint::Custom(other.to_string()),
        })
    }
}

/// Callback entry points a host accepts besides the built-in three.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryPointRegistry {
    names: BTreeSet<String>,
}

impl EntryPointRegistry {
    pub fn new() -> Self {
        let names = [ENTRY_POINT_REPLY, ENTRY_POINT_EVENTUAL, ENTRY_POINT_P2P_MSG]
            .into_iter()
            .map(str::to_string)
            .collect();
        Self { names }
    }

    /// Returns false when `name` was already registered.
    pub fn register(&mut self, name: &str) -> bool {
        self.names.insert(name.to_string())
    }

    pub fn is_allowed(&self, entry: &EntryPoint) -> bool {
        entry.is_builtin() || self.names.contains(entry.as_str())
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(String::as_str)
    }
}

impl Default for EntryPointRegistry {
    fn default() -> Self {
        Self::new()
    }
}
