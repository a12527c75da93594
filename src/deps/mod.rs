// Copyright (C) 2021-2025 the DTVM authors. All Rights Reserved.
// SPDX-License-Identifier: Apache-2.0

//! System Dependency Declarations
//!
//! A contract's dependencies are persisted as a flat list of strings:
//!
//! - `"<host-module>_<abi>_<version>"` - a host import module to attach,
//!   e.g. `wasmx_env_i32_2`
//! - `"memory_<convention>"` - the memory ABI the module speaks
//! - `"memory_<convention>:entrypoint_alloc_<name>"` - the same, naming the
//!   guest's allocator (or `entrypoint_free_<name>`, its free export)
//! - `"interpreter_..."` - the payload runs inside an interpreter contract
//! - `"<address>:<role>"` - a contract library that must already exist
//!
//! In memory they are expanded into an owned [`SystemDep`] tree by
//! [`resolver::DepResolver`]; strings are only produced again by
//! [`SystemDep::flatten`].

pub mod resolver;

pub use resolver::{ContractLookup, DepResolver};

use crate::config::CodeLimits;
use crate::error::{validation_error, HostResult};

pub const DEP_SEPARATOR: char = ':';
pub const INTERPRETER_MARKER: &str = "interpreter_";
pub const UTF8_MARKER: &str = "utf8";

/// Encode a contract-library reference.
pub fn build_dep(address: &str, role: &str) -> String {
    format!("{}{}{}", address, DEP_SEPARATOR, role)
}

/// Decode a dependency string. Anything other than exactly one separator
/// is returned whole with no role.
pub fn parse_dep(dep: &str) -> (String, Option<String>) {
    let mut parts = dep.split(DEP_SEPARATOR);
    match (parts.next(), parts.next(), parts.next()) {
        (Some(address), Some(role), None) => (address.to_string(), Some(role.to_string())),
        _ => (dep.to_string(), None),
    }
}

pub fn has_interpreter_dep<S: AsRef<str>>(deps: &[S]) -> bool {
    deps.iter().any(|d| d.as_ref().contains(INTERPRETER_MARKER))
}

pub fn has_utf8_dep<S: AsRef<str>>(deps: &[S]) -> bool {
    deps.iter().any(|d| d.as_ref().contains(UTF8_MARKER))
}

pub fn has_interpreter_system_dep(deps: &[SystemDep]) -> bool {
    deps.iter().any(|d| d.label.contains(INTERPRETER_MARKER))
}

pub fn has_utf8_system_dep(deps: &[SystemDep]) -> bool {
    deps.iter().any(|d| d.label.contains(UTF8_MARKER))
}

/// Largest payload accepted for a contract with these dependencies.
pub fn max_code_size<S: AsRef<str>>(deps: &[S], limits: &CodeLimits) -> usize {
    if has_interpreter_dep(deps) {
        limits.max_interpreted_code_size
    } else {
        limits.max_wasm_size
    }
}

/// Check a stored payload against its dependency class.
pub fn validate_code_size<S: AsRef<str>>(
    code: &[u8],
    deps: &[S],
    limits: &CodeLimits,
) -> HostResult<()> {
    if code.is_empty() {
        return Err(validation_error("code payload is empty"));
    }
    let max = max_code_size(deps, limits);
    if code.len() > max {
        return Err(validation_error(format!(
            "code payload of {} bytes exceeds the {} byte ceiling",
            code.len(),
            max
        )));
    }
    if has_utf8_dep(deps) && std::str::from_utf8(code).is_err() {
        return Err(validation_error("source payload is not valid utf8"));
    }
    Ok(())
}

/// Governance-submitted code has its own, larger ceiling.
pub fn validate_proposal_code_size(code: &[u8], limits: &CodeLimits) -> HostResult<()> {
    if code.len() > limits.max_proposal_wasm_size {
        return Err(validation_error(format!(
            "proposal code of {} bytes exceeds the {} byte ceiling",
            code.len(),
            limits.max_proposal_wasm_size
        )));
    }
    Ok(())
}

/// What a single dependency string asks the loader for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DepKind {
    HostInterface(String),
    Memory(String),
    /// Memory dependency whose role renames an allocator export.
    MemoryEntrypoint { label: String, role: String },
    Interpreter(String),
    Library { address: String, role: String },
}

impl DepKind {
    pub fn classify(dep: &str) -> Self {
        if let (address, Some(role)) = parse_dep(dep) {
            if address.starts_with(crate::memory::registry::MEMORY_PREFIX) {
                return DepKind::MemoryEntrypoint {
                    label: address,
                    role,
                };
            }
            return DepKind::Library { address, role };
        }
        if dep.starts_with(crate::memory::registry::MEMORY_PREFIX) {
            DepKind::Memory(dep.to_string())
        } else if dep.contains("interpreter") {
            DepKind::Interpreter(dep.to_string())
        } else {
            DepKind::HostInterface(dep.to_string())
        }
    }
}

/// A node of the expanded dependency tree.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SystemDep {
    pub role: String,
    pub label: String,
    pub code_path: String,
    pub aot_path: String,
    pub pinned: bool,
    pub children: Vec<SystemDep>,
}

impl SystemDep {
    pub fn new(label: &str) -> Self {
        Self {
            label: label.to_string(),
            ..Default::default()
        }
    }

    /// A library dependency: `label` is the library's address.
    pub fn library(address: &str, role: &str) -> Self {
        Self {
            role: role.to_string(),
            label: address.to_string(),
            ..Default::default()
        }
    }

    pub fn with_child(mut self, child: SystemDep) -> Self {
        self.children.push(child);
        self
    }

    pub fn with_paths(mut self, code_path: &str, aot_path: &str) -> Self {
        self.code_path = code_path.to_string();
        self.aot_path = aot_path.to_string();
        self
    }

    pub fn pinned(mut self, pinned: bool) -> Self {
        self.pinned = pinned;
        self
    }

    pub fn is_library(&self) -> bool {
        !self.role.is_empty() && !self.label.starts_with(crate::memory::registry::MEMORY_PREFIX)
    }

    /// The persisted string form of this node alone.
    pub fn to_dep_string(&self) -> String {
        if !self.role.is_empty() {
            build_dep(&self.label, &self.role)
        } else {
            self.label.clone()
        }
    }

    /// Pre-order string form of all descendants, first occurrence wins.
    pub fn flatten(&self) -> Vec<String> {
        let mut out = Vec::new();
        for child in &self.children {
            child.collect_into(&mut out);
        }
        out
    }

    fn collect_into(&self, out: &mut Vec<String>) {
        let dep = self.to_dep_string();
        if !out.contains(&dep) {
            out.push(dep);
        }
        for child in &self.children {
            child.collect_into(out);
        }
    }

    /// Number of nodes in this subtree, including `self`.
    pub fn size(&self) -> usize {
        1 + self.children.iter().map(SystemDep::size).sum::<usize>()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn prop_build_parse_round_trip(
            address in "(0x)?[0-9a-f]{40}|memory_[a-z0-9_]{1,16}",
            role in "[a-z][a-z0-9_.]{0,24}",
        ) {
            let dep = build_dep(&address, &role);
            prop_assert_eq!(parse_dep(&dep), (address, Some(role)));
        }

        #[test]
        fn prop_labels_without_separator_have_no_role(
            name in "[a-z]{1,12}",
            version in "[0-9]{1,2}\\.[0-9]{1,2}\\.[0-9]{1,2}",
        ) {
            let label = format!("{}_{}", name, version);
            prop_assert_eq!(parse_dep(&label), (label.clone(), None));
        }

        #[test]
        fn prop_interpreter_marker_anywhere(
            prefix in "[a-z]{0,8}",
            version in "[0-9]\\.[0-9]\\.[0-9]",
        ) {
            let label = format!("{}interpreter_{}", prefix, version);
            let deps = [label.as_str()];
            prop_assert!(has_interpreter_dep(&deps));
            prop_assert!(has_interpreter_system_dep(&[SystemDep::new(&label)]));
            let limits = CodeLimits::default();
            prop_assert_eq!(max_code_size(&deps, &limits), limits.max_interpreted_code_size);
        }
    }

    #[test]
    fn test_markers_inside_labels() {
        let deps = ["tay_interpreter_v0.0.1", "wasmx_env_i32_2"];
        assert!(has_interpreter_dep(&deps));
        assert!(!has_utf8_dep(&deps));
        let deps = ["0xaa:role_utf8_reader"];
        assert!(has_utf8_dep(&deps));
        assert!(!has_interpreter_dep(&deps));
        assert!(!has_interpreter_dep(&["interpreter"]));
        assert!(has_utf8_system_dep(&[SystemDep::new("python_utf8_1")]));
    }

    #[test]
    fn test_memory_entrypoint_roles() {
        let dep = build_dep("memory_rust_i64_1", "entrypoint_alloc_my_alloc");
        assert_eq!(
            DepKind::classify(&dep),
            DepKind::MemoryEntrypoint {
                label: "memory_rust_i64_1".to_string(),
                role: "entrypoint_alloc_my_alloc".to_string(),
            }
        );
        let node = SystemDep {
            role: "entrypoint_alloc_my_alloc".to_string(),
            ..SystemDep::new("memory_rust_i64_1")
        };
        assert!(!node.is_library());
        assert_eq!(node.to_dep_string(), dep);
    }

    #[test]
    fn test_build_and_parse() {
        let dep = build_dep("0x0000000000000000000000000000000000000028", "deplibrary");
        assert_eq!(dep, "0x0000000000000000000000000000000000000028:deplibrary");
        assert_eq!(
            parse_dep(&dep),
            (
                "0x0000000000000000000000000000000000000028".to_string(),
                Some("deplibrary".to_string())
            )
        );
        assert_eq!(parse_dep("wasmx_env_i32_2"), ("wasmx_env_i32_2".to_string(), None));
        assert_eq!(parse_dep("a:b:c"), ("a:b:c".to_string(), None));
    }

    #[test]
    fn test_interpreter_python_dep() {
        let deps = ["interpreter_python_utf8_0.2.0"];
        assert!(has_interpreter_dep(&deps));
        assert!(has_utf8_dep(&deps));
        let limits = CodeLimits::default();
        assert_eq!(max_code_size(&deps, &limits), limits.max_interpreted_code_size);
        assert_eq!(max_code_size(&["wasmx_env_i32_2"], &limits), limits.max_wasm_size);
    }

    #[test]
    fn test_validate_code_size() {
        let limits = CodeLimits::default();
        let deps = ["interpreter_python_utf8_0.2.0"];
        assert!(validate_code_size(b"print(1)", &deps, &limits).is_ok());
        assert!(validate_code_size(&[0xff, 0xfe], &deps, &limits).is_err());
        let big = vec![b'a'; limits.max_interpreted_code_size + 1];
        assert!(validate_code_size(&big, &deps, &limits).is_err());
        assert!(validate_code_size(&big, &["wasmx_env_2"], &limits).is_ok());
        assert!(validate_code_size(&[], &["wasmx_env_2"], &limits).is_err());

        let proposal = vec![0u8; limits.max_proposal_wasm_size + 1];
        assert!(validate_proposal_code_size(&proposal, &limits).is_err());
        assert!(validate_proposal_code_size(&proposal[1..], &limits).is_ok());
    }

    #[test]
    fn test_classify() {
        assert_eq!(
            DepKind::classify("memory_assemblyscript_1"),
            DepKind::Memory("memory_assemblyscript_1".to_string())
        );
        assert_eq!(
            DepKind::classify("tay_interpreter_v0.0.1"),
            DepKind::Interpreter("tay_interpreter_v0.0.1".to_string())
        );
        assert_eq!(
            DepKind::classify("wasmx_env_core_i64_1"),
            DepKind::HostInterface("wasmx_env_core_i64_1".to_string())
        );
        assert_eq!(
            DepKind::classify("0x2a:deplibrary"),
            DepKind::Library {
                address: "0x2a".to_string(),
                role: "deplibrary".to_string()
            }
        );
    }

    #[test]
    fn test_tree_flatten() {
        let fsm = SystemDep::new("interpreter_state_machine_bz_0.1.0");
        let library = SystemDep::library("0xaa", "deplibrary")
            .with_child(SystemDep::new("wasmx_env_i32_2"))
            .with_child(fsm.clone());
        let root = SystemDep::new("consensus").with_child(fsm).with_child(library);

        assert_eq!(
            root.flatten(),
            vec![
                "interpreter_state_machine_bz_0.1.0".to_string(),
                "0xaa:deplibrary".to_string(),
                "wasmx_env_i32_2".to_string(),
            ]
        );
        assert_eq!(root.size(), 5);
        assert!(has_interpreter_system_dep(&root.children));
        assert!(!has_utf8_system_dep(&root.children));
    }
}
