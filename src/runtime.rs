// Copyright (C) 2021-2025 the DTVM authors. All Rights Reserved.
// SPDX-License-Identifier: Apache-2.0

//! Call Dispatcher
//!
//! Runs one entry point of a prepared guest and decides what survives:
//!
//! - `Ok(())` or `finish` from the guest: value transfers and storage are
//!   committed, logs and finish data are returned
//! - `revert(data)`: nothing is committed, the outcome carries `data`
//! - any other error (out of gas, memory faults, validation): nothing is
//!   committed and the typed error is returned
//!
//! The message reaches the guest as `{"data": <base64>}` through
//! `getCallData`; entry points take no parameters.

use crate::config::RuntimeConfig;
use crate::core::GuestInstance;
use crate::entry_points::{EntryPoint, EntryPointRegistry};
use crate::error::{validation_error, HostError, HostResult};
use crate::gas_metering::{GasMeter, GasRegister};
use crate::host::{CallContext, Env, Linker, WasmxHost, WasmxLog};
use crate::loader::LoadPlan;
use crate::message::ExecutionMessage;
use crate::system::{AddressCodec, RoleTable, StorageScope};
use log::{debug, warn};

/// One call into a guest.
#[derive(Debug, Clone)]
pub struct ExecutionRequest {
    pub entry_point: EntryPoint,
    /// Raw payload, wrapped into the message envelope by the dispatcher.
    pub message: Vec<u8>,
    pub env: Env,
    pub gas_limit: u64,
    pub metering_off: bool,
    /// Pinned modules skip the instance cost.
    pub pinned: bool,
    pub scope: StorageScope,
    pub depth: usize,
}

impl ExecutionRequest {
    pub fn new(entry_point: EntryPoint, message: Vec<u8>, env: Env, gas_limit: u64) -> Self {
        Self {
            entry_point,
            message,
            env,
            gas_limit,
            metering_off: false,
            pinned: false,
            scope: StorageScope::CoreConsensus,
            depth: 0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionOutcome {
    pub success: bool,
    /// Finish data on success, revert data otherwise.
    pub data: Vec<u8>,
    pub logs: Vec<WasmxLog>,
    pub gas_used: u64,
}

pub struct Dispatcher {
    config: RuntimeConfig,
    codec: AddressCodec,
    register: GasRegister,
    entry_points: EntryPointRegistry,
}

impl Dispatcher {
    pub fn new(config: RuntimeConfig) -> HostResult<Self> {
        config.validate()?;
        let codec = AddressCodec::new(&config.bech32_prefix)?;
        let register = GasRegister::new(config.gas.clone())?;
        Ok(Self {
            config,
            codec,
            register,
            entry_points: EntryPointRegistry::default(),
        })
    }

    pub fn with_entry_points(mut self, entry_points: EntryPointRegistry) -> Self {
        self.entry_points = entry_points;
        self
    }

    pub fn config(&self) -> &RuntimeConfig {
        &self.config
    }

    pub fn entry_points_mut(&mut self) -> &mut EntryPointRegistry {
        &mut self.entry_points
    }

    pub fn execute(
        &self,
        instance: &mut dyn GuestInstance,
        plan: &LoadPlan,
        request: ExecutionRequest,
        host: &mut dyn WasmxHost,
        roles: &RoleTable,
    ) -> HostResult<ExecutionOutcome> {
        let entry = request.entry_point.clone();
        if !self.entry_points.is_allowed(&entry) {
            return Err(validation_error(format!(
                "entry point '{}' is not registered",
                entry
            )));
        }
        if !plan.has_export(entry.as_str()) || !instance.has_export(entry.as_str()) {
            return Err(validation_error(format!(
                "contract does not export '{}'",
                entry
            )));
        }

        let envelope = ExecutionMessage::new(request.message).to_json_bytes()?;
        let mut gas = if request.metering_off {
            GasMeter::unmetered()
        } else {
            GasMeter::new(request.gas_limit)
        };
        if !request.metering_off {
            gas.consume(
                self.register.instance_costs(request.pinned, envelope.len()),
                "instantiate",
            )?;
        }

        let mut env = request.env;
        env.current_call.call_data = envelope;
        let mut ctx = CallContext::new(host, roles, env, self.codec.clone(), gas)
            .with_register(self.register.clone())
            .with_scope(request.scope)
            .read_only(entry.is_read_only())
            .with_depth(request.depth, self.config.max_call_depth);

        debug!(
            "calling {} on {} ({} adapter, depth {})",
            entry,
            ctx.contract_address(),
            plan.adapter_kind(),
            request.depth
        );
        let result = {
            let mut linker = Linker::new(&mut ctx, &plan.modules);
            instance.call(entry.as_str(), &[], &mut linker)
        };

        match result {
            Ok(_) | Err(HostError::Finish) => {
                if let Err(err) = ctx.commit() {
                    warn!("{} could not commit: {}", entry, err);
                    return Err(err);
                }
                Ok(ExecutionOutcome {
                    success: true,
                    data: std::mem::take(&mut ctx.finish_data),
                    logs: std::mem::take(&mut ctx.logs),
                    gas_used: ctx.gas.consumed(),
                })
            }
            Err(HostError::Revert { data }) => {
                ctx.discard();
                debug!("{} reverted with {} bytes", entry, data.len());
                Ok(ExecutionOutcome {
                    success: false,
                    data,
                    logs: Vec::new(),
                    gas_used: ctx.gas.consumed(),
                })
            }
            Err(err) => {
                ctx.discard();
                warn!("{} failed ({}): {}", entry, err.category(), err);
                Err(err)
            }
        }
    }
}
