// Copyright (C) 2021-2025 the DTVM authors. All Rights Reserved.
// SPDX-License-Identifier: Apache-2.0

use crate::core::types::WasmValue;
use crate::error::{execution_error, HostResult};

/// A compiled guest module instantiated inside the engine.
///
/// Implementations own the guest's linear memory. While a guest export runs,
/// the engine routes imported function calls and metering events through the
/// supplied [`HostImports`], handing the instance back so host functions can
/// read and allocate guest memory.
pub trait GuestInstance {
    /// Call an exported function.
    fn call(
        &mut self,
        name: &str,
        args: &[WasmValue],
        imports: &mut dyn HostImports,
    ) -> HostResult<Vec<WasmValue>>;

    /// The guest's linear memory.
    fn memory(&self) -> &[u8];

    fn memory_mut(&mut self) -> &mut [u8];

    fn has_export(&self, name: &str) -> bool;

    /// Call an export that must not re-enter the host, such as an allocator.
    fn call_export(&mut self, name: &str, args: &[WasmValue]) -> HostResult<Vec<WasmValue>> {
        if !self.has_export(name) {
            return Err(execution_error(
                &format!("export '{}' not found", name),
                "call_export",
            ));
        }
        self.call(name, args, &mut NoImports)
    }
}

/// Host side of a running guest: imported functions and native metering.
pub trait HostImports {
    fn invoke(
        &mut self,
        instance: &mut dyn GuestInstance,
        module: &str,
        name: &str,
        args: &[WasmValue],
    ) -> HostResult<Vec<WasmValue>>;

    /// Engine-native gas spent by guest instructions since the last report.
    fn consume_gas(&mut self, native_units: u64) -> HostResult<()>;
}

/// Import resolver for exports that never call back into the host.
pub struct NoImports;

impl HostImports for NoImports {
    fn invoke(
        &mut self,
        _instance: &mut dyn GuestInstance,
        module: &str,
        name: &str,
        _args: &[WasmValue],
    ) -> HostResult<Vec<WasmValue>> {
        Err(execution_error(
            &format!("import {}.{} is not available here", module, name),
            "invoke",
        ))
    }

    fn consume_gas(&mut self, _native_units: u64) -> HostResult<()> {
        Ok(())
    }
}
