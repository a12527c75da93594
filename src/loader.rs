// Copyright (C) 2021-2025 the DTVM authors. All Rights Reserved.
// SPDX-License-Identifier: Apache-2.0

//! Module Loader
//!
//! Turns a stored code payload plus its resolved dependencies into a
//! [`LoadPlan`]: the memory adapter the guest speaks, the host modules it
//! links against and the libraries it relies on.
//!
//! # Steps
//!
//! 1. size ceiling for the dependency class, UTF-8 check for source payloads
//! 2. import/export analysis (binary or text wasm; skipped for interpreted code)
//! 3. adapter selection from memory deps, host interface flavor or exports;
//!    `entrypoint_alloc_*` / `entrypoint_free_*` roles rename the allocator
//! 4. host module assembly for every host interface dependency
//! 5. import coverage: every imported function must be provided

use crate::config::CodeLimits;
use crate::deps::{has_interpreter_dep, validate_code_size, DepKind, SystemDep};
use crate::error::{validation_error, HostResult};
use crate::host::{HostEnvRegistry, HostModule};
use crate::memory::{AbiKind, AdapterRegistry, AllocatorExports, MemoryAbi, MemoryAdapter};
use log::{debug, info};
use parity_wasm::elements::{External, Internal, Module};
use std::collections::BTreeSet;

const WASM_MAGIC: &[u8] = b"\0asm";

/// A function imported by the guest.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct ImportRef {
    pub module: String,
    pub name: String,
}

/// Imports and exports of a wasm module.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ModuleInfo {
    pub imports: Vec<ImportRef>,
    /// Exported function names.
    pub exports: BTreeSet<String>,
}

/// Parse a binary (or text) wasm module and list what it imports and exports.
pub fn analyze(code: &[u8]) -> HostResult<ModuleInfo> {
    let binary = to_binary(code)?;
    let module = Module::from_bytes(&binary)
        .map_err(|e| validation_error(format!("failed to parse wasm: {}", e)))?;

    let imports = module
        .import_section()
        .map(|section| {
            section
                .entries()
                .iter()
                .filter(|entry| matches!(entry.external(), External::Function(_)))
                .map(|entry| ImportRef {
                    module: entry.module().to_string(),
                    name: entry.field().to_string(),
                })
                .collect()
        })
        .unwrap_or_default();

    let exports = module
        .export_section()
        .map(|section| {
            section
                .entries()
                .iter()
                .filter(|export| matches!(export.internal(), Internal::Function(_)))
                .map(|export| export.field().to_string())
                .collect()
        })
        .unwrap_or_default();

    Ok(ModuleInfo { imports, exports })
}

fn to_binary(code: &[u8]) -> HostResult<Vec<u8>> {
    if code.starts_with(WASM_MAGIC) {
        return Ok(code.to_vec());
    }
    wat::parse_bytes(code)
        .map(|bytes| bytes.into_owned())
        .map_err(|e| validation_error(format!("code is neither wasm nor wat: {}", e)))
}

/// Everything the dispatcher needs to run a guest.
#[derive(Debug, Clone)]
pub struct LoadPlan {
    /// Binary wasm, or the source for interpreted contracts.
    pub code: Vec<u8>,
    pub adapter: MemoryAdapter,
    pub modules: Vec<HostModule>,
    pub host_interfaces: Vec<String>,
    /// Interpreter dependency of a source payload.
    pub interpreter: Option<String>,
    pub libraries: Vec<SystemDep>,
    pub imports: Vec<ImportRef>,
    pub exports: BTreeSet<String>,
}

impl LoadPlan {
    pub fn has_export(&self, name: &str) -> bool {
        self.exports.contains(name)
    }

    pub fn adapter_kind(&self) -> AbiKind {
        self.adapter.kind()
    }

    pub fn is_interpreted(&self) -> bool {
        self.interpreter.is_some()
    }

    pub fn host_module(&self, name: &str) -> Option<&HostModule> {
        self.modules.iter().find(|m| m.name() == name)
    }
}

pub struct ModuleLoader {
    adapters: AdapterRegistry,
    hosts: HostEnvRegistry,
    limits: CodeLimits,
}

impl ModuleLoader {
    pub fn new(adapters: AdapterRegistry, hosts: HostEnvRegistry, limits: CodeLimits) -> Self {
        Self {
            adapters,
            hosts,
            limits,
        }
    }

    pub fn limits(&self) -> &CodeLimits {
        &self.limits
    }

    /// Build a load plan. `exports` overrides the analyzed export list and
    /// is how an interpreted contract declares its entry points.
    pub fn prepare(
        &self,
        code: &[u8],
        deps: &[SystemDep],
        exports: Option<&[String]>,
    ) -> HostResult<LoadPlan> {
        let dep_strings: Vec<String> = deps.iter().map(SystemDep::to_dep_string).collect();
        validate_code_size(code, &dep_strings, &self.limits)?;

        let mut host_interfaces = Vec::new();
        let mut memory_deps: Vec<String> = Vec::new();
        let mut entrypoint_roles = Vec::new();
        let mut interpreter = None;
        let mut libraries = Vec::new();
        for dep in deps {
            match DepKind::classify(&dep.to_dep_string()) {
                DepKind::HostInterface(label) => host_interfaces.push(label),
                DepKind::Memory(label) => memory_deps.push(label),
                DepKind::MemoryEntrypoint { label, role } => {
                    if !memory_deps.contains(&label) {
                        memory_deps.push(label);
                    }
                    entrypoint_roles.push(role);
                }
                DepKind::Interpreter(label) => {
                    if interpreter.is_none() {
                        interpreter = Some(label);
                    }
                }
                DepKind::Library { .. } => libraries.push(dep.clone()),
            }
        }

        let interpreted = has_interpreter_dep(&dep_strings);
        let (binary, info) = if interpreted {
            (code.to_vec(), ModuleInfo::default())
        } else {
            let binary = to_binary(code)?;
            let info = analyze(&binary)?;
            (binary, info)
        };
        let exports: BTreeSet<String> = match exports {
            Some(names) => names.iter().cloned().collect(),
            None => info.exports,
        };

        let mut selection = memory_deps.clone();
        selection.extend(host_interfaces.iter().cloned());
        let allocator = AllocatorExports::from_roles(&entrypoint_roles);
        let adapter = self
            .adapters
            .select_with(&selection, &allocator, |name| exports.contains(name))?;
        let modules = self.hosts.build_modules(&host_interfaces, &adapter)?;

        check_imports(&info.imports, &modules)?;

        debug!(
            "load plan: adapter {}, {} host modules, {} libraries, {} imports",
            adapter.kind(),
            modules.len(),
            libraries.len(),
            info.imports.len()
        );
        if let Some(label) = &interpreter {
            info!("contract runs on interpreter {}", label);
        }

        Ok(LoadPlan {
            code: binary,
            adapter,
            modules,
            host_interfaces,
            interpreter,
            libraries,
            imports: info.imports,
            exports,
        })
    }
}

impl Default for ModuleLoader {
    fn default() -> Self {
        Self::new(
            AdapterRegistry::default(),
            HostEnvRegistry::default(),
            CodeLimits::default(),
        )
    }
}

fn check_imports(imports: &[ImportRef], modules: &[HostModule]) -> HostResult<()> {
    for import in imports {
        let module = modules
            .iter()
            .find(|m| m.name() == import.module)
            .ok_or_else(|| {
                validation_error(format!(
                    "import {}.{}: host module '{}' is not attached",
                    import.module, import.name, import.module
                ))
            })?;
        let desc = module.function(&import.name).ok_or_else(|| {
            validation_error(format!(
                "import {}.{} is not provided by the host",
                import.module, import.name
            ))
        })?;
        debug!(
            "import {}.{} linked ({} params)",
            import.module,
            import.name,
            desc.arg_types.len()
        );
    }
    Ok(())
}
