// Copyright (C) 2021-2025 the DTVM authors. All Rights Reserved.
// SPDX-License-Identifier: Apache-2.0

//! Engine-facing abstractions.
//!
//! The WASM engine itself is external. It is reached only through
//! [`instance::GuestInstance`] (calling exports, touching linear memory) and
//! gives control back to the host through [`instance::HostImports`].

pub mod instance;
pub mod types;

pub use instance::{GuestInstance, HostImports, NoImports};
pub use types::{ValueType, WasmValue};
