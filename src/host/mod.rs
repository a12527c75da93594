// Copyright (C) 2021-2025 the DTVM authors. All Rights Reserved.
// SPDX-License-Identifier: Apache-2.0

//! Host Module Builder
//!
//! Host functions are written once against logical signatures made of
//! [`ParamKind`]s. A [`HostModuleBuilder`] expands them for one memory
//! adapter: every `Ptr` becomes `ptr_param_count()` native parameters of the
//! adapter's value types, so the same definition serves `(i32, i32)`,
//! packed `i64` and AssemblyScript guests.
//!
//! # Invocation
//!
//! ```text
//! engine -> Linker::invoke -> HostModule::invoke
//!     check arity and value types
//!     charge the flat cost, at least the configured base cost
//!     fold native params into HostArgs
//!     run the body
//!     flatten HostArgs back into native results
//! ```

pub mod context;
pub mod functions;
pub mod traits;

pub use context::{CallContext, PendingTransfer};
pub use traits::{
    CallRequest, CallResponse, ContractCall, ContractCallResult, Env, LoggerLog, WasmxHost,
    WasmxLog,
};

use crate::core::{GuestInstance, HostImports, ValueType, WasmValue};
use crate::error::{validation_error, HostResult};
use crate::memory::{MemoryAbi, MemoryAdapter, PointerRepr};
use log::trace;
use std::collections::BTreeMap;

/// Logical parameter kind of a host function.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamKind {
    Ptr,
    I32,
    I64,
}

/// A logical argument or result after folding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostArg {
    Ptr(PointerRepr),
    I32(i32),
    I64(i64),
}

impl HostArg {
    pub fn kind(&self) -> ParamKind {
        match self {
            HostArg::Ptr(_) => ParamKind::Ptr,
            HostArg::I32(_) => ParamKind::I32,
            HostArg::I64(_) => ParamKind::I64,
        }
    }

    pub fn as_ptr(&self) -> HostResult<PointerRepr> {
        match self {
            HostArg::Ptr(ptr) => Ok(*ptr),
            other => Err(validation_error(format!(
                "expected a pointer argument, got {:?}",
                other.kind()
            ))),
        }
    }
}

/// What a host function body sees: the call context, the guest and the
/// adapter it speaks.
pub struct HostCall<'a, 'h> {
    pub ctx: &'a mut CallContext<'h>,
    pub instance: &'a mut dyn GuestInstance,
    pub adapter: &'a MemoryAdapter,
}

impl HostCall<'_, '_> {
    /// Read the buffer behind a pointer argument.
    pub fn read(&mut self, arg: &HostArg) -> HostResult<Vec<u8>> {
        let ptr = arg.as_ptr()?;
        self.adapter.read_from_ptr(self.instance, ptr)
    }

    pub fn read_string(&mut self, arg: &HostArg) -> HostResult<String> {
        let ptr = arg.as_ptr()?;
        self.adapter.read_string_from_ptr(self.instance, ptr)
    }

    /// Copy `data` into fresh guest memory and return it as a result.
    pub fn alloc(&mut self, data: &[u8]) -> HostResult<HostArg> {
        Ok(HostArg::Ptr(self.adapter.allocate_and_write(self.instance, data)?))
    }
}

pub type HostFn = fn(&mut HostCall<'_, '_>, &[HostArg]) -> HostResult<Vec<HostArg>>;

/// A host function written against logical parameter kinds.
#[derive(Clone, Copy)]
pub struct HostFnDef {
    pub name: &'static str,
    pub inputs: &'static [ParamKind],
    pub outputs: &'static [ParamKind],
    /// Flat host-gas charge per invocation.
    pub cost: u64,
    pub func: HostFn,
}

/// A host function expanded for one adapter.
#[derive(Clone)]
pub struct HostFuncDesc {
    pub name: String,
    pub arg_types: Vec<ValueType>,
    pub ret_types: Vec<ValueType>,
    pub cost: u64,
    inputs: Vec<ParamKind>,
    outputs: Vec<ParamKind>,
    func: HostFn,
}

impl std::fmt::Debug for HostFuncDesc {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HostFuncDesc")
            .field("name", &self.name)
            .field("arg_types", &self.arg_types)
            .field("ret_types", &self.ret_types)
            .field("cost", &self.cost)
            .finish()
    }
}

fn expand_kinds(kinds: &[ParamKind], adapter: &MemoryAdapter) -> Vec<ValueType> {
    let mut types = Vec::with_capacity(kinds.len());
    for kind in kinds {
        match kind {
            ParamKind::Ptr => types.extend_from_slice(adapter.ptr_value_types()),
            ParamKind::I32 => types.push(ValueType::I32),
            ParamKind::I64 => types.push(ValueType::I64),
        }
    }
    types
}

pub struct HostModuleBuilder {
    module_name: String,
    adapter: MemoryAdapter,
    functions: BTreeMap<String, HostFuncDesc>,
}

impl HostModuleBuilder {
    pub fn new(module_name: &str, adapter: MemoryAdapter) -> Self {
        Self {
            module_name: module_name.to_string(),
            adapter,
            functions: BTreeMap::new(),
        }
    }

    pub fn function(mut self, def: HostFnDef) -> Self {
        let desc = HostFuncDesc {
            name: def.name.to_string(),
            arg_types: expand_kinds(def.inputs, &self.adapter),
            ret_types: expand_kinds(def.outputs, &self.adapter),
            cost: def.cost,
            inputs: def.inputs.to_vec(),
            outputs: def.outputs.to_vec(),
            func: def.func,
        };
        self.functions.insert(desc.name.clone(), desc);
        self
    }

    pub fn functions(self, defs: &[HostFnDef]) -> Self {
        defs.iter().fold(self, |builder, def| builder.function(*def))
    }

    pub fn build(self) -> HostModule {
        HostModule {
            name: self.module_name,
            adapter: self.adapter,
            functions: self.functions,
        }
    }
}

/// A named set of host functions bound to one adapter.
#[derive(Debug, Clone)]
pub struct HostModule {
    name: String,
    adapter: MemoryAdapter,
    functions: BTreeMap<String, HostFuncDesc>,
}

impl HostModule {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn adapter(&self) -> &MemoryAdapter {
        &self.adapter
    }

    pub fn function(&self, name: &str) -> Option<&HostFuncDesc> {
        self.functions.get(name)
    }

    pub fn function_names(&self) -> impl Iterator<Item = &str> {
        self.functions.keys().map(String::as_str)
    }

    pub fn invoke(
        &self,
        ctx: &mut CallContext<'_>,
        instance: &mut dyn GuestInstance,
        name: &str,
        args: &[WasmValue],
    ) -> HostResult<Vec<WasmValue>> {
        let desc = self.functions.get(name).ok_or_else(|| {
            validation_error(format!("{}.{} is not a host function", self.name, name))
        })?;
        check_types(&self.name, desc, args)?;
        let cost = ctx.register.host_call_costs(desc.cost);
        ctx.gas.consume(cost, name)?;
        trace!("{}.{} called with {} native args", self.name, name, args.len());

        let logical = self.fold(desc, args)?;
        let mut call = HostCall {
            ctx,
            instance,
            adapter: &self.adapter,
        };
        let results = (desc.func)(&mut call, &logical)?;
        self.flatten(desc, &results)
    }

    fn fold(&self, desc: &HostFuncDesc, args: &[WasmValue]) -> HostResult<Vec<HostArg>> {
        let mut logical = Vec::with_capacity(desc.inputs.len());
        let mut cursor = 0;
        for kind in &desc.inputs {
            match kind {
                ParamKind::Ptr => {
                    let count = self.adapter.ptr_param_count();
                    let ptr = self
                        .adapter
                        .pointer_from_params(&args[cursor..cursor + count])?;
                    logical.push(HostArg::Ptr(ptr));
                    cursor += count;
                }
                ParamKind::I32 => {
                    logical.push(HostArg::I32(args[cursor].as_i32()?));
                    cursor += 1;
                }
                ParamKind::I64 => {
                    logical.push(HostArg::I64(args[cursor].as_i64()?));
                    cursor += 1;
                }
            }
        }
        Ok(logical)
    }

    fn flatten(&self, desc: &HostFuncDesc, results: &[HostArg]) -> HostResult<Vec<WasmValue>> {
        if results.len() != desc.outputs.len()
            || results.iter().zip(&desc.outputs).any(|(r, k)| r.kind() != *k)
        {
            return Err(validation_error(format!(
                "{}.{} produced results that do not match its signature",
                self.name, desc.name
            )));
        }
        let mut native = Vec::with_capacity(desc.ret_types.len());
        for result in results {
            match result {
                HostArg::Ptr(ptr) => native.extend(self.adapter.pointer_to_params(*ptr)?),
                HostArg::I32(v) => native.push(WasmValue::I32(*v)),
                HostArg::I64(v) => native.push(WasmValue::I64(*v)),
            }
        }
        Ok(native)
    }
}

fn check_types(module: &str, desc: &HostFuncDesc, args: &[WasmValue]) -> HostResult<()> {
    if args.len() != desc.arg_types.len() {
        return Err(validation_error(format!(
            "{}.{} expects {} arguments, got {}",
            module,
            desc.name,
            desc.arg_types.len(),
            args.len()
        )));
    }
    for (i, (arg, expected)) in args.iter().zip(&desc.arg_types).enumerate() {
        if arg.value_type() != *expected {
            return Err(validation_error(format!(
                "{}.{} argument {} should be {}, got {}",
                module,
                desc.name,
                i,
                expected,
                arg.value_type()
            )));
        }
    }
    Ok(())
}

/// Routes engine callbacks to the attached host modules and converts
/// engine-native gas into host gas.
pub struct Linker<'a, 'h> {
    ctx: &'a mut CallContext<'h>,
    modules: &'a [HostModule],
    native_remainder: u64,
}

impl<'a, 'h> Linker<'a, 'h> {
    pub fn new(ctx: &'a mut CallContext<'h>, modules: &'a [HostModule]) -> Self {
        Self {
            ctx,
            modules,
            native_remainder: 0,
        }
    }

    pub fn context(&mut self) -> &mut CallContext<'h> {
        self.ctx
    }

    /// Native units reported but not yet worth a whole unit of host gas.
    pub fn native_remainder(&self) -> u64 {
        self.native_remainder
    }
}

impl HostImports for Linker<'_, '_> {
    fn invoke(
        &mut self,
        instance: &mut dyn GuestInstance,
        module: &str,
        name: &str,
        args: &[WasmValue],
    ) -> HostResult<Vec<WasmValue>> {
        let host_module = self
            .modules
            .iter()
            .find(|m| m.name() == module)
            .ok_or_else(|| validation_error(format!("host module '{}' is not attached", module)))?;
        host_module.invoke(self.ctx, instance, name, args)
    }

    fn consume_gas(&mut self, native_units: u64) -> HostResult<()> {
        let multiplier = self.ctx.register.multiplier();
        let total = self.native_remainder.saturating_add(native_units);
        self.native_remainder = total % multiplier;
        let host_gas = self.ctx.register.from_native(total);
        if host_gas == 0 {
            return Ok(());
        }
        self.ctx.gas.consume(host_gas, "wasm")
    }
}

pub type HostModuleFactory = fn(&MemoryAdapter) -> HostModule;

/// Host interface dependency label -> host module constructor.
#[derive(Clone)]
pub struct HostEnvRegistry {
    factories: BTreeMap<String, HostModuleFactory>,
}

impl HostEnvRegistry {
    pub fn new() -> Self {
        Self {
            factories: BTreeMap::new(),
        }
    }

    pub fn with_defaults() -> Self {
        use crate::system::constants::*;
        let mut registry = Self::new();
        for label in [WASMX_ENV_2, WASMX_ENV_I32_2, WASMX_ENV_I64_2] {
            registry.register(label, functions::wasmx_module);
        }
        for label in [WASMX_CORE_ENV_I32_1, WASMX_CORE_ENV_I64_1] {
            registry.register(label, functions::wasmx_core_module);
        }
        registry
    }

    pub fn register(&mut self, label: &str, factory: HostModuleFactory) -> Option<HostModuleFactory> {
        self.factories.insert(label.to_string(), factory)
    }

    pub fn contains(&self, label: &str) -> bool {
        self.factories.contains_key(label)
    }

    /// Build the host modules for a set of host interface labels. Labels
    /// that map to an already built import module are skipped.
    pub fn build_modules<S: AsRef<str>>(
        &self,
        labels: &[S],
        adapter: &MemoryAdapter,
    ) -> HostResult<Vec<HostModule>> {
        let mut modules: Vec<HostModule> = Vec::new();
        for label in labels {
            let label = label.as_ref();
            let factory = self.factories.get(label).ok_or_else(|| {
                validation_error(format!("unsupported host interface: {}", label))
            })?;
            let module = factory(adapter);
            if modules.iter().all(|m| m.name() != module.name()) {
                modules.push(module);
            }
        }
        Ok(modules)
    }
}

impl std::fmt::Debug for HostEnvRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.factories.keys()).finish()
    }
}

impl Default for HostEnvRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}
