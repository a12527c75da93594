// Copyright (C) 2021-2025 the DTVM authors. All Rights Reserved.
// SPDX-License-Identifier: Apache-2.0

pub mod config;
pub mod core;
pub mod deps;
pub mod entry_points;
pub mod error;
pub mod gas_metering;
pub mod host;
pub mod loader;
pub mod memory;
pub mod message;
pub mod runtime;
pub mod system;

#[cfg(test)]
mod tests;

// Re-export the types an embedding node needs most
pub use config::RuntimeConfig;
pub use entry_points::{EntryPoint, EntryPointRegistry};
pub use error::{HostError, HostResult};
pub use host::{Env, WasmxHost};
pub use loader::{LoadPlan, ModuleLoader};
pub use memory::{AdapterRegistry, MemoryAdapter};
pub use runtime::{Dispatcher, ExecutionOutcome, ExecutionRequest};
