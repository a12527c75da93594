// Copyright (C) 2021-2025 the DTVM authors. All Rights Reserved.
// SPDX-License-Identifier: Apache-2.0

use crate::error::{out_of_gas, HostResult};
use log::debug;

/// A surrounding framework meter that owns the canonical out-of-gas error.
pub trait ExternalMeter {
    /// Charge `amount`; expected to fail when the framework limit is exceeded.
    fn consume_gas(&mut self, amount: u64, descriptor: &str) -> HostResult<()>;
}

/// Per-call gas meter.
///
/// `used` only grows. The first `consume` that would push `used` past
/// `limit` leaves `used` untouched, marks the meter exhausted and reports
/// the breach once, either through the delegate or as `OutOfGas`. Every
/// later `consume` fails without touching state.
pub struct GasMeter {
    limit: u64,
    used: u64,
    exhausted: bool,
    delegate: Option<Box<dyn ExternalMeter>>,
}

impl GasMeter {
    pub fn new(limit: u64) -> Self {
        Self {
            limit,
            used: 0,
            exhausted: false,
            delegate: None,
        }
    }

    pub fn with_delegate(limit: u64, delegate: Box<dyn ExternalMeter>) -> Self {
        Self {
            delegate: Some(delegate),
            ..Self::new(limit)
        }
    }

    /// Meter for contracts that run with metering switched off.
    pub fn unmetered() -> Self {
        Self::new(u64::MAX)
    }

    pub fn consume(&mut self, amount: u64, descriptor: &str) -> HostResult<()> {
        if self.exhausted {
            return Err(out_of_gas(descriptor, self.limit, self.used, amount));
        }
        match self.used.checked_add(amount) {
            Some(next) if next <= self.limit => {
                self.used = next;
                Ok(())
            }
            _ => {
                self.exhausted = true;
                debug!(
                    "gas limit {} breached by {} ({} used) in {}",
                    self.limit, amount, self.used, descriptor
                );
                if let Some(delegate) = self.delegate.as_mut() {
                    delegate.consume_gas(amount, descriptor)?;
                }
                Err(out_of_gas(descriptor, self.limit, self.used, amount))
            }
        }
    }

    pub fn consumed(&self) -> u64 {
        self.used
    }

    pub fn limit(&self) -> u64 {
        self.limit
    }

    pub fn remaining(&self) -> u64 {
        self.limit - self.used
    }

    pub fn is_exhausted(&self) -> bool {
        self.exhausted
    }

    /// Child meter for a nested call, capped by what is left here.
    pub fn nested(&self, requested: u64) -> GasMeter {
        GasMeter::new(requested.min(self.remaining()))
    }

    /// Charge a finished child meter back. A child that ran out of gas
    /// costs its whole limit.
    pub fn absorb(&mut self, child: &GasMeter, descriptor: &str) -> HostResult<()> {
        let spent = if child.is_exhausted() {
            child.limit()
        } else {
            child.consumed()
        };
        self.consume(spent, descriptor)
    }
}

impl std::fmt::Debug for GasMeter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GasMeter")
            .field("limit", &self.limit)
            .field("used", &self.used)
            .field("exhausted", &self.exhausted)
            .field("delegate", &self.delegate.is_some())
            .finish()
    }
}
