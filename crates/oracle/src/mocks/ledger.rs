//! This module contains an in-memory [AssetLedger] that keeps balances in a map.

use alloy_primitives::{Address, U256};
use anyhow::{bail, Result};
use std::{
    collections::HashMap,
    sync::{Mutex, MutexGuard},
};
use verdict_primitives::AssetLedger;

/// The [InMemoryLedger] is an [AssetLedger] over a plain balance map. Pulls do
/// not model allowances: any payer with enough balance can be debited.
#[derive(Debug, Default)]
pub struct InMemoryLedger {
    balances: Mutex<HashMap<Address, U256>>,
}

impl InMemoryLedger {
    /// Credits `amount` to `account` out of thin air.
    pub fn mint(&self, account: Address, amount: U256) {
        let mut balances = self.balances();
        let balance = balances.entry(account).or_default();
        *balance = balance.saturating_add(amount);
    }

    pub fn balance_of(&self, account: Address) -> U256 {
        self.balances().get(&account).copied().unwrap_or_default()
    }

    fn balances(&self) -> MutexGuard<'_, HashMap<Address, U256>> {
        self.balances.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn move_balance(&self, from: Address, to: Address, amount: U256) -> Result<()> {
        let mut balances = self.balances();
        let available = balances.get(&from).copied().unwrap_or_default();
        let Some(remaining) = available.checked_sub(amount) else {
            bail!("insufficient balance: {from} holds {available}, needs {amount}");
        };
        if from == to {
            return Ok(());
        }
        let credited = balances
            .get(&to)
            .copied()
            .unwrap_or_default()
            .checked_add(amount);
        let Some(credited) = credited else {
            bail!("balance overflow crediting {to}");
        };
        balances.insert(from, remaining);
        balances.insert(to, credited);
        Ok(())
    }
}

#[async_trait::async_trait]
impl AssetLedger for InMemoryLedger {
    async fn transfer_from(&self, payer: Address, payee: Address, amount: U256) -> Result<()> {
        self.move_balance(payer, payee, amount)
    }

    async fn transfer(&self, custodian: Address, payee: Address, amount: U256) -> Result<()> {
        self.move_balance(custodian, payee, amount)
    }
}
