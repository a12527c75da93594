// Copyright (C) 2021-2025 the DTVM authors. All Rights Reserved.
// SPDX-License-Identifier: Apache-2.0

//! Adapter registry: memory dependency label -> adapter constructor.
//!
//! Built once at host startup and handed to the loader. Hosts may register
//! extra labels (for example a toolchain that exports `allocate` instead of
//! `alloc`) before the first module is loaded. A single module can rename its
//! packed-i64 allocator exports through [`AllocatorExports`].

use super::{MemoryAdapter, PackedI64Adapter, TwoRegisterAdapter};
use crate::error::{validation_error, HostResult};
use log::debug;
use std::collections::BTreeMap;

pub const MEMORY_PREFIX: &str = "memory_";
pub const MEMORY_DEFAULT: &str = "memory_default_1";
pub const MEMORY_PTRLEN_I32: &str = "memory_ptrlen_i32_1";
pub const MEMORY_RUST_I64: &str = "memory_rust_i64_1";
pub const MEMORY_PTRLEN_I64: &str = "memory_ptrlen_i64_1";
pub const MEMORY_ASSEMBLYSCRIPT: &str = "memory_assemblyscript_1";
pub const MEMORY_TAYLOR: &str = "memory_taylor";

pub const EXPORT_MALLOC: &str = "malloc";
pub const EXPORT_ALLOC: &str = "alloc";
pub const EXPORT_ALLOCATE: &str = "allocate";
pub const EXPORT_AS_NEW: &str = "__new";
pub const EXPORT_FREE: &str = "free";

pub const MEMORY_ENTRYPOINT_ALLOC: &str = "entrypoint_alloc_";
pub const MEMORY_ENTRYPOINT_FREE: &str = "entrypoint_free_";

/// Allocator and free export names read from memory dependency roles,
/// e.g. `memory_rust_i64_1:entrypoint_alloc_my_alloc`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AllocatorExports {
    pub alloc: Option<String>,
    pub free: Option<String>,
}

impl AllocatorExports {
    /// Later roles override earlier ones.
    pub fn from_roles<S: AsRef<str>>(roles: &[S]) -> Self {
        let mut exports = Self::default();
        for role in roles {
            let role = role.as_ref();
            if let Some(name) = role.strip_prefix(MEMORY_ENTRYPOINT_ALLOC) {
                exports.alloc = Some(name.to_string());
            }
            if let Some(name) = role.strip_prefix(MEMORY_ENTRYPOINT_FREE) {
                exports.free = Some(name.to_string());
            }
        }
        exports
    }

    pub fn is_empty(&self) -> bool {
        self.alloc.is_none() && self.free.is_none()
    }

    fn alloc_or(&self, default: &str) -> String {
        self.alloc.clone().unwrap_or_else(|| default.to_string())
    }

    fn free_or(&self, default: &str) -> String {
        self.free.clone().unwrap_or_else(|| default.to_string())
    }

    /// Rename the exports of a packed-i64 adapter; other ABIs are unchanged.
    pub fn apply(&self, adapter: MemoryAdapter) -> MemoryAdapter {
        match adapter {
            MemoryAdapter::PackedI64(inner) if !self.is_empty() => {
                MemoryAdapter::PackedI64(PackedI64Adapter::new(
                    &self.alloc_or(inner.alloc_export()),
                    &self.free_or(inner.free_export()),
                ))
            }
            other => other,
        }
    }
}

pub type AdapterFactory = fn() -> MemoryAdapter;

pub struct AdapterRegistry {
    factories: BTreeMap<String, AdapterFactory>,
}

impl AdapterRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self {
            factories: BTreeMap::new(),
        }
    }

    /// Registry with the built-in memory labels.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register(MEMORY_DEFAULT, MemoryAdapter::two_register);
        registry.register(MEMORY_PTRLEN_I32, MemoryAdapter::two_register);
        registry.register(MEMORY_RUST_I64, MemoryAdapter::packed_i64);
        registry.register(MEMORY_PTRLEN_I64, MemoryAdapter::packed_i64);
        registry.register(MEMORY_ASSEMBLYSCRIPT, MemoryAdapter::assemblyscript);
        registry
    }

    /// Register or replace a label. Returns the previous factory, if any.
    pub fn register(&mut self, label: &str, factory: AdapterFactory) -> Option<AdapterFactory> {
        self.factories.insert(label.to_string(), factory)
    }

    pub fn contains(&self, label: &str) -> bool {
        self.factories.contains_key(label)
    }

    pub fn get(&self, label: &str) -> Option<MemoryAdapter> {
        self.factories.get(label).map(|factory| factory())
    }

    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.factories.keys().map(String::as_str)
    }

    /// Pick the adapter for a module.
    ///
    /// Order: explicit `memory_*` dependency, then the ABI named by a host
    /// interface dependency, then the allocator exports the guest carries.
    pub fn select<F>(&self, deps: &[String], has_export: F) -> HostResult<MemoryAdapter>
    where
        F: Fn(&str) -> bool,
    {
        self.select_with(deps, &AllocatorExports::default(), has_export)
    }

    /// [`select`](Self::select) with renamed allocator exports.
    pub fn select_with<F>(
        &self,
        deps: &[String],
        exports: &AllocatorExports,
        has_export: F,
    ) -> HostResult<MemoryAdapter>
    where
        F: Fn(&str) -> bool,
    {
        if let Some(label) = deps.iter().find(|d| d.starts_with(MEMORY_PREFIX)) {
            return self
                .get(label)
                .map(|adapter| exports.apply(adapter))
                .ok_or_else(|| validation_error(format!("unsupported memory dependency: {}", label)));
        }

        if deps.iter().any(|d| d.contains("_i64_")) {
            debug!("adapter selected from i64 host interface");
            return Ok(exports.apply(MemoryAdapter::packed_i64()));
        }
        if deps.iter().any(|d| d.contains("_i32_")) {
            debug!("adapter selected from i32 host interface");
            return Ok(MemoryAdapter::two_register());
        }

        if has_export(EXPORT_AS_NEW) {
            return Ok(MemoryAdapter::assemblyscript());
        }
        let alloc = exports.alloc_or(EXPORT_MALLOC);
        let free = exports.free_or(EXPORT_FREE);
        if has_export(&alloc) && has_export(&free) {
            return Ok(MemoryAdapter::PackedI64(PackedI64Adapter::new(&alloc, &free)));
        }
        if has_export(EXPORT_ALLOC) {
            return Ok(MemoryAdapter::TwoRegister(TwoRegisterAdapter::default()));
        }
        if has_export(EXPORT_ALLOCATE) {
            return Ok(MemoryAdapter::TwoRegister(TwoRegisterAdapter::new(
                EXPORT_ALLOCATE,
            )));
        }
        Err(validation_error(
            "module declares no memory dependency and exports no known allocator",
        ))
    }
}

impl Default for AdapterRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}
