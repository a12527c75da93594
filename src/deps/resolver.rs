// Copyright (C) 2021-2025 the DTVM authors. All Rights Reserved.
// SPDX-License-Identifier: Apache-2.0

use super::{DepKind, SystemDep};
use crate::error::{resolution_error, HostResult};
use std::collections::{BTreeMap, HashMap};

/// Registered contracts, keyed by address.
pub trait ContractLookup {
    /// Persisted dependency strings of the contract at `address`.
    fn deps_of(&self, address: &str) -> Option<&[String]>;
}

impl ContractLookup for BTreeMap<String, Vec<String>> {
    fn deps_of(&self, address: &str) -> Option<&[String]> {
        self.get(address).map(Vec::as_slice)
    }
}

impl ContractLookup for HashMap<String, Vec<String>> {
    fn deps_of(&self, address: &str) -> Option<&[String]> {
        self.get(address).map(Vec::as_slice)
    }
}

/// Expands flat dependency strings into an owned tree, following library
/// references through `lookup`. A library reachable from itself is an error.
pub struct DepResolver<'a, L: ContractLookup + ?Sized> {
    lookup: &'a L,
}

impl<'a, L: ContractLookup + ?Sized> DepResolver<'a, L> {
    pub fn new(lookup: &'a L) -> Self {
        Self { lookup }
    }

    /// Resolve the dependencies of the contract at `root` (or of a module
    /// not yet stored, when `root` is `None`).
    pub fn resolve(&self, root: Option<&str>, deps: &[String]) -> HostResult<Vec<SystemDep>> {
        let mut path: Vec<String> = root.map(|r| vec![normalize(r)]).unwrap_or_default();
        self.expand(deps, &mut path)
    }

    fn expand(&self, deps: &[String], path: &mut Vec<String>) -> HostResult<Vec<SystemDep>> {
        let mut nodes = Vec::with_capacity(deps.len());
        for dep in deps {
            let node = match DepKind::classify(dep) {
                DepKind::Library { address, role } => {
                    let key = normalize(&address);
                    if path.contains(&key) {
                        let mut cycle = path.clone();
                        cycle.push(key);
                        return Err(resolution_error(format!(
                            "dependency cycle: {}",
                            cycle.join(" -> ")
                        )));
                    }
                    let child_deps = self.lookup.deps_of(&address).ok_or_else(|| {
                        resolution_error(format!(
                            "library {} for role {} is not registered",
                            address, role
                        ))
                    })?;
                    path.push(key);
                    let children = self.expand(child_deps, path)?;
                    path.pop();
                    SystemDep {
                        children,
                        ..SystemDep::library(&address, &role)
                    }
                }
                DepKind::MemoryEntrypoint { label, role } => SystemDep {
                    role,
                    ..SystemDep::new(&label)
                },
                DepKind::HostInterface(label)
                | DepKind::Memory(label)
                | DepKind::Interpreter(label) => SystemDep::new(&label),
            };
            nodes.push(node);
        }
        Ok(nodes)
    }
}

/// Lowercase hex without the `0x` prefix, so address spellings compare equal.
pub fn normalize(address: &str) -> String {
    address
        .strip_prefix("0x")
        .or_else(|| address.strip_prefix("0X"))
        .unwrap_or(address)
        .to_ascii_lowercase()
}
