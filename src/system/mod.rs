// Copyright (C) 2021-2025 the DTVM authors. All Rights Reserved.
// SPDX-License-Identifier: Apache-2.0

//! System contracts: the fixed genesis set, its roles and the address
//! handling they rely on.

pub mod address;
pub mod constants;
pub mod contract;
pub mod hooks;
pub mod precompiles;
pub mod registry;
pub mod roles;

pub use address::AddressCodec;
pub use contract::{StorageScope, SystemContract, SystemContractRole};
pub use hooks::Hook;
pub use precompiles::{default_system_contracts, default_time_chain_contracts, GenesisParams};
pub use registry::{validate_registry, SystemContractEntry};
pub use roles::{fill_roles, resolve_roles, RoleJson, RoleTable, RolesGenesis};
