// Copyright (C) 2021-2025 the DTVM authors. All Rights Reserved.
// SPDX-License-Identifier: Apache-2.0

pub mod meter;
pub mod register;

pub use meter::{ExternalMeter, GasMeter};
pub use register::{GasConfig, GasRegister};
