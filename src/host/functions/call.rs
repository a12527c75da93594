// Copyright (C) 2021-2025 the DTVM authors. All Rights Reserved.
// SPDX-License-Identifier: Apache-2.0

//! Nested Contract Calls
//!
//! `call(request)` takes a JSON [`CallRequest`] and answers with a JSON
//! [`CallResponse`]:
//!
//! - `success = 2` when the value cannot be sent (read-only call or
//!   insufficient funds), the target is not run
//! - `success = 0` with empty data when no contract lives at the target;
//!   the value is still sent
//! - `success = 1` with empty data when the call depth limit is reached
//! - otherwise the embedding host runs the call under a child gas meter
//!   capped by the caller's remaining gas; any failure, including the child
//!   running out of gas, becomes `success = 1`
//!
//! Value is never moved through the host here. It is buffered in the call
//! context once the target accepted it and moves when the caller commits, so
//! a failed nested call or a caller that reverts keeps its funds.
//!
//! The child meter is absorbed into the caller's meter afterwards, so a
//! child that ran out of gas costs its whole limit.

use crate::error::HostResult;
use crate::host::traits::{
    CallRequest, CallResponse, ContractCall, CALL_FAILURE, CALL_SUCCESS, CALL_TRANSFER_FAILURE,
};
use crate::host::{HostArg, HostCall};
use log::{debug, warn};
use num_traits::Zero;

pub fn call(call: &mut HostCall<'_, '_>, args: &[HostArg]) -> HostResult<Vec<HostArg>> {
    let raw = call.read(&args[0])?;
    let request: CallRequest = serde_json::from_slice(&raw)?;
    let response = dispatch(call, &request)?;
    let encoded = serde_json::to_vec(&response)?;
    Ok(vec![call.alloc(&encoded)?])
}

fn dispatch(call: &mut HostCall<'_, '_>, request: &CallRequest) -> HostResult<CallResponse> {
    let ctx = &mut *call.ctx;
    let to = ctx.resolve_address(&request.to)?;
    let from = ctx.contract_address().to_string();
    let value = request.value()?;
    let is_query = request.is_query || ctx.read_only;

    let denom = ctx.env.chain.denom.clone();
    if !value.is_zero() {
        if is_query {
            warn!("value transfer from {} in a read-only call", from);
            return Ok(response(CALL_TRANSFER_FAILURE, Vec::new()));
        }
        if ctx.balance(&from, &denom) < value {
            debug!("{} cannot send {}{} to {}", from, value, denom, to);
            return Ok(response(CALL_TRANSFER_FAILURE, Vec::new()));
        }
    }

    if !ctx.host().contract_exists(&to) {
        ctx.return_data.clear();
        if !value.is_zero() {
            ctx.transfer(&from, &to, &denom, &value)?;
        }
        return Ok(response(CALL_SUCCESS, Vec::new()));
    }

    if ctx.depth + 1 > ctx.max_depth {
        warn!("call depth {} exceeded calling {}", ctx.max_depth, to);
        ctx.return_data.clear();
        return Ok(response(CALL_FAILURE, Vec::new()));
    }

    let limit = request.gas_limit.unwrap_or_else(|| ctx.gas.remaining());
    let mut child = ctx.gas.nested(limit);
    let nested = ContractCall {
        from,
        to,
        value: value.clone(),
        calldata: request.calldata.clone(),
        is_query,
        depth: ctx.depth + 1,
    };
    let result = ctx.host().call_contract(&nested, &mut child);
    ctx.gas.absorb(&child, "call")?;

    let (success, data) = match result {
        Ok(result) if result.success => {
            if !value.is_zero() {
                if let Err(err) = ctx.transfer(&nested.from, &nested.to, &denom, &value) {
                    debug!("value for {} not sent: {}", nested.to, err);
                    ctx.return_data.clear();
                    return Ok(response(CALL_TRANSFER_FAILURE, Vec::new()));
                }
            }
            (CALL_SUCCESS, result.data)
        }
        Ok(result) => (CALL_FAILURE, result.data),
        Err(err) => {
            debug!("nested call to {} failed: {}", nested.to, err);
            (CALL_FAILURE, Vec::new())
        }
    };
    ctx.return_data = data.clone();
    Ok(response(success, data))
}

fn response(success: u8, data: Vec<u8>) -> CallResponse {
    CallResponse { success, data }
}
