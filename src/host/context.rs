// Copyright (C) 2021-2025 the DTVM authors. All Rights Reserved.
// SPDX-License-Identifier: Apache-2.0

use super::functions::env::cleanup_address;
use super::traits::{Env, WasmxHost, WasmxLog};
use crate::error::{execution_error, validation_error, HostResult};
use crate::gas_metering::{GasMeter, GasRegister};
use crate::system::{AddressCodec, RoleTable, StorageScope};
use log::debug;
use num_bigint::BigUint;
use std::collections::BTreeMap;

/// Value transfer requested by the guest, applied on commit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingTransfer {
    pub from: String,
    pub to: String,
    pub denom: String,
    pub amount: BigUint,
}

/// Per-call state shared by every host function of one guest invocation.
///
/// Storage writes go to `pending` and value transfers to `transfers`; both
/// reach the host only through [`CallContext::commit`].
pub struct CallContext<'h> {
    host: &'h mut dyn WasmxHost,
    roles: &'h RoleTable,
    pub env: Env,
    pub codec: AddressCodec,
    pub gas: GasMeter,
    pub register: GasRegister,
    pub scope: StorageScope,
    pub read_only: bool,
    pub depth: usize,
    pub max_depth: usize,
    pending: BTreeMap<Vec<u8>, Option<Vec<u8>>>,
    transfers: Vec<PendingTransfer>,
    pub logs: Vec<WasmxLog>,
    pub finish_data: Vec<u8>,
    pub return_data: Vec<u8>,
}

impl<'h> CallContext<'h> {
    pub fn new(
        host: &'h mut dyn WasmxHost,
        roles: &'h RoleTable,
        env: Env,
        codec: AddressCodec,
        gas: GasMeter,
    ) -> Self {
        Self {
            host,
            roles,
            env,
            codec,
            gas,
            register: GasRegister::default(),
            scope: StorageScope::CoreConsensus,
            read_only: false,
            depth: 0,
            max_depth: crate::config::DEFAULT_MAX_CALL_DEPTH,
            pending: BTreeMap::new(),
            transfers: Vec::new(),
            logs: Vec::new(),
            finish_data: Vec::new(),
            return_data: Vec::new(),
        }
    }

    pub fn with_register(mut self, register: GasRegister) -> Self {
        self.register = register;
        self
    }

    pub fn with_scope(mut self, scope: StorageScope) -> Self {
        self.scope = scope;
        self
    }

    pub fn read_only(mut self, read_only: bool) -> Self {
        self.read_only = read_only;
        self
    }

    pub fn with_depth(mut self, depth: usize, max_depth: usize) -> Self {
        self.depth = depth;
        self.max_depth = max_depth;
        self
    }

    pub fn host(&mut self) -> &mut dyn WasmxHost {
        &mut *self.host
    }

    pub fn roles(&self) -> &RoleTable {
        self.roles
    }

    pub fn contract_address(&self) -> &str {
        &self.env.contract.address
    }

    pub fn storage_load(&self, key: &[u8]) -> Vec<u8> {
        match self.pending.get(key) {
            Some(Some(value)) => value.clone(),
            Some(None) => Vec::new(),
            None => self
                .host
                .storage_get(self.scope, self.contract_address(), key)
                .unwrap_or_default(),
        }
    }

    pub fn storage_store(&mut self, key: &[u8], value: &[u8]) -> HostResult<()> {
        self.ensure_writable("storageStore")?;
        self.pending.insert(key.to_vec(), Some(value.to_vec()));
        Ok(())
    }

    pub fn storage_delete(&mut self, key: &[u8]) -> HostResult<()> {
        self.ensure_writable("storageDelete")?;
        self.pending.insert(key.to_vec(), None);
        Ok(())
    }

    fn ensure_writable(&self, function: &str) -> HostResult<()> {
        if self.read_only {
            return Err(execution_error("storage write in a read-only call", function));
        }
        Ok(())
    }

    pub fn pending_writes(&self) -> usize {
        self.pending.len()
    }

    pub fn pending_transfers(&self) -> &[PendingTransfer] {
        &self.transfers
    }

    /// Host balance adjusted by the transfers buffered so far.
    pub fn balance(&self, address: &str, denom: &str) -> BigUint {
        let mut incoming = self.host.balance(address, denom);
        let mut outgoing = BigUint::default();
        for t in self.transfers.iter().filter(|t| t.denom == denom) {
            if t.to == address {
                incoming += &t.amount;
            }
            if t.from == address {
                outgoing += &t.amount;
            }
        }
        if outgoing > incoming {
            return BigUint::default();
        }
        incoming - outgoing
    }

    /// Buffer a value transfer. Fails when `from` cannot cover it.
    pub fn transfer(&mut self, from: &str, to: &str, denom: &str, amount: &BigUint) -> HostResult<()> {
        self.ensure_writable("transfer")?;
        if &self.balance(from, denom) < amount {
            return Err(execution_error(
                &format!("insufficient funds: {} cannot send {}{}", from, amount, denom),
                "transfer",
            ));
        }
        self.transfers.push(PendingTransfer {
            from: from.to_string(),
            to: to.to_string(),
            denom: denom.to_string(),
            amount: amount.clone(),
        });
        Ok(())
    }

    /// Flush buffered transfers, then storage writes in key order.
    ///
    /// Every sender is checked against its host balance before anything is
    /// applied, so a failed commit leaves the host untouched.
    pub fn commit(&mut self) -> HostResult<()> {
        let transfers = std::mem::take(&mut self.transfers);
        let mut net: BTreeMap<(&str, &str), (BigUint, BigUint)> = BTreeMap::new();
        for t in &transfers {
            net.entry((t.from.as_str(), t.denom.as_str())).or_default().1 += &t.amount;
            net.entry((t.to.as_str(), t.denom.as_str())).or_default().0 += &t.amount;
        }
        for ((address, denom), (incoming, outgoing)) in &net {
            if self.host.balance(address, denom) + incoming < *outgoing {
                self.pending.clear();
                return Err(execution_error(
                    &format!("insufficient funds for {} at commit", address),
                    "transfer",
                ));
            }
        }
        for t in &transfers {
            self.host.transfer(&t.from, &t.to, &t.denom, &t.amount)?;
        }

        let pending = std::mem::take(&mut self.pending);
        debug!(
            "committing {} transfers and {} storage writes for {}",
            transfers.len(),
            pending.len(),
            self.env.contract.address
        );
        for (key, value) in pending {
            match value {
                Some(value) => {
                    self.host
                        .storage_set(self.scope, &self.env.contract.address, &key, &value)
                }
                None => self
                    .host
                    .storage_delete(self.scope, &self.env.contract.address, &key),
            }
        }
        Ok(())
    }

    pub fn discard(&mut self) {
        self.pending.clear();
        self.transfers.clear();
    }

    /// Resolve a role name or prefixed address to a prefixed address.
    pub fn resolve_address(&self, target: &str) -> HostResult<String> {
        if let Some(address) = self.roles.address_by_role(target) {
            return Ok(address.to_string());
        }
        self.codec.string_to_bytes(target).map_err(|_| {
            validation_error(format!("'{}' is neither a role nor an address", target))
        })?;
        Ok(target.to_string())
    }

    /// Prefixed form of an address passed in by the guest.
    ///
    /// A 32-byte value with 12 leading zero bytes is read as a padded 20-byte
    /// address unless the full 32-byte address is a known contract or role.
    pub fn guest_address(&self, raw: &[u8]) -> HostResult<String> {
        let stripped = cleanup_address(raw);
        if stripped.len() != raw.len() {
            let full = self.codec.bytes_to_string(raw)?;
            if self.host.contract_exists(&full) || self.roles.role_by_address(&full).is_some() {
                return Ok(full);
            }
        }
        self.codec.bytes_to_string(stripped)
    }

    /// Raw address bytes left-padded to 32 bytes.
    pub fn padded_address(&self, prefixed: &str) -> HostResult<Vec<u8>> {
        let bytes = self.codec.string_to_bytes(prefixed)?;
        Ok(pad_left_32(&bytes))
    }
}

pub fn pad_left_32(bytes: &[u8]) -> Vec<u8> {
    if bytes.len() >= 32 {
        return bytes.to_vec();
    }
    let mut out = vec![0u8; 32 - bytes.len()];
    out.extend_from_slice(bytes);
    out
}
