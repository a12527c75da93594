// Copyright (C) 2021-2025 the DTVM authors. All Rights Reserved.
// SPDX-License-Identifier: Apache-2.0

//! Event and logging host functions
//!
//! `log` records a contract event that is returned with a successful
//! outcome. The `Logger*` functions forward a guest message to the `log`
//! facade under the `wasmx::guest` target.

use crate::error::HostResult;
use crate::host::traits::{LoggerLog, WasmxJsonLog, WasmxLog, LOG_TYPE_WASMX};
use crate::host::{HostArg, HostCall};
use crate::system::constants::WASMX_ENV_2;
use ::log::Level;

const GUEST_TARGET: &str = "wasmx::guest";

/// log(json): record a `{type, data, topics}` event
pub fn log(call: &mut HostCall<'_, '_>, args: &[HostArg]) -> HostResult<Vec<HostArg>> {
    let raw = call.read(&args[0])?;
    let entry: WasmxJsonLog = serde_json::from_slice(&raw)?;
    let size = entry.data.len() + entry.topics.iter().map(Vec::len).sum::<usize>();
    let cost = call.ctx.register.event_costs(size);
    call.ctx.gas.consume(cost, "log")?;

    let log_type = if entry.log_type.is_empty() {
        LOG_TYPE_WASMX.to_string()
    } else {
        entry.log_type
    };
    let system_dependency = call
        .ctx
        .env
        .contract
        .system_deps
        .first()
        .cloned()
        .unwrap_or_else(|| WASMX_ENV_2.to_string());
    let contract_address = call.ctx.contract_address().to_string();
    call.ctx.logs.push(WasmxLog {
        log_type,
        contract_address,
        system_dependency,
        data: entry.data,
        topics: entry.topics,
    });
    Ok(Vec::new())
}

fn forward(call: &mut HostCall<'_, '_>, args: &[HostArg], level: Level) -> HostResult<Vec<HostArg>> {
    let raw = call.read(&args[0])?;
    let entry: LoggerLog = serde_json::from_slice(&raw)?;
    ::log::log!(
        target: GUEST_TARGET,
        level,
        "[{}] {} {}",
        call.ctx.contract_address(),
        entry.msg,
        entry.parts.join(" ")
    );
    Ok(Vec::new())
}

/// LoggerInfo(json): `{msg, parts}` at info level
pub fn logger_info(call: &mut HostCall<'_, '_>, args: &[HostArg]) -> HostResult<Vec<HostArg>> {
    forward(call, args, Level::Info)
}

pub fn logger_error(call: &mut HostCall<'_, '_>, args: &[HostArg]) -> HostResult<Vec<HostArg>> {
    forward(call, args, Level::Error)
}

pub fn logger_debug(call: &mut HostCall<'_, '_>, args: &[HostArg]) -> HostResult<Vec<HostArg>> {
    forward(call, args, Level::Debug)
}
