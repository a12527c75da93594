// Copyright (C) 2021-2025 the DTVM authors. All Rights Reserved.
// SPDX-License-Identifier: Apache-2.0

//! Storage Host Functions
//!
//! Keys and values are arbitrary byte strings. Writes are buffered in the
//! call context, reads see the buffered writes first. A missing key reads as
//! an empty buffer.

use crate::error::HostResult;
use crate::host::{HostArg, HostCall};

/// storageStore(key, value)
pub fn storage_store(call: &mut HostCall<'_, '_>, args: &[HostArg]) -> HostResult<Vec<HostArg>> {
    let key = call.read(&args[0])?;
    let value = call.read(&args[1])?;
    call.ctx.storage_store(&key, &value)?;
    Ok(Vec::new())
}

/// storageLoad(key): value
pub fn storage_load(call: &mut HostCall<'_, '_>, args: &[HostArg]) -> HostResult<Vec<HostArg>> {
    let key = call.read(&args[0])?;
    let value = call.ctx.storage_load(&key);
    Ok(vec![call.alloc(&value)?])
}

/// storageDelete(key)
pub fn storage_delete(call: &mut HostCall<'_, '_>, args: &[HostArg]) -> HostResult<Vec<HostArg>> {
    let key = call.read(&args[0])?;
    call.ctx.storage_delete(&key)?;
    Ok(Vec::new())
}
