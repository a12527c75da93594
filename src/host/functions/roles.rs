// Copyright (C) 2021-2025 the DTVM authors. All Rights Reserved.
// SPDX-License-Identifier: Apache-2.0

//! Role registry host functions (`wasmxcore`)

use crate::error::{execution_error, HostResult};
use crate::host::{HostArg, HostCall};

/// getAddressByRole(role): raw address bytes of the role's primary contract
pub fn get_address_by_role(call: &mut HostCall<'_, '_>, args: &[HostArg]) -> HostResult<Vec<HostArg>> {
    let role = call.read_string(&args[0])?;
    let address = call
        .ctx
        .roles()
        .address_by_role(&role)
        .map(str::to_string)
        .ok_or_else(|| execution_error("no such role", "getAddressByRole"))?;
    let bytes = call.ctx.codec.string_to_bytes(&address)?;
    Ok(vec![call.alloc(&bytes)?])
}

/// getRoleByAddress(address): role name, empty when the address has none
pub fn get_role_by_address(call: &mut HostCall<'_, '_>, args: &[HostArg]) -> HostResult<Vec<HostArg>> {
    let raw = call.read(&args[0])?;
    let address = call.ctx.guest_address(&raw)?;
    let role = call
        .ctx
        .roles()
        .role_by_address(&address)
        .unwrap_or_default()
        .to_string();
    Ok(vec![call.alloc(role.as_bytes())?])
}
