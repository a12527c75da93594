// Copyright (C) 2021-2025 the DTVM authors. All Rights Reserved.
// SPDX-License-Identifier: Apache-2.0

//! Execution control host functions
//!
//! `finish` and `revert` end the guest by returning [`HostError::Finish`]
//! and [`HostError::Revert`] up through the engine; the dispatcher turns
//! them back into an outcome.

use crate::error::{HostError, HostResult};
use crate::host::{HostArg, HostCall};

/// getReturnData(): data returned by the last nested call
pub fn get_return_data(call: &mut HostCall<'_, '_>, _args: &[HostArg]) -> HostResult<Vec<HostArg>> {
    let data = call.ctx.return_data.clone();
    Ok(vec![call.alloc(&data)?])
}

/// getFinishData(): the current finish data
pub fn get_finish_data(call: &mut HostCall<'_, '_>, _args: &[HostArg]) -> HostResult<Vec<HostArg>> {
    let data = call.ctx.finish_data.clone();
    Ok(vec![call.alloc(&data)?])
}

/// setFinishData(data): set the call result without stopping
pub fn set_finish_data(call: &mut HostCall<'_, '_>, args: &[HostArg]) -> HostResult<Vec<HostArg>> {
    call.ctx.finish_data = call.read(&args[0])?;
    Ok(Vec::new())
}

/// finish(data): stop successfully with `data` as result
pub fn finish(call: &mut HostCall<'_, '_>, args: &[HostArg]) -> HostResult<Vec<HostArg>> {
    let data = call.read(&args[0])?;
    call.ctx.return_data = data.clone();
    call.ctx.finish_data = data;
    Err(HostError::Finish)
}

/// revert(data): stop and discard every effect of the call
pub fn revert(call: &mut HostCall<'_, '_>, args: &[HostArg]) -> HostResult<Vec<HostArg>> {
    let data = call.read(&args[0])?;
    call.ctx.return_data = data.clone();
    call.ctx.finish_data = data.clone();
    Err(HostError::Revert { data })
}
