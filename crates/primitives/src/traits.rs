//! The traits module contains the collaborator interfaces the engine is written against.

use alloy_primitives::{Address, U256};
use anyhow::Result;
use std::sync::Arc;

/// The [AssetLedger] trait describes a fungible-asset ledger that the engine
/// moves bonds, stakes and rewards through. It has two key properties:
///
/// - A transfer either moves exactly `amount` or returns [Err]. It never
///   silently under-transfers.
/// - A failed transfer leaves every balance untouched, so the engine can
///   abort the surrounding operation without compensating.
#[async_trait::async_trait]
pub trait AssetLedger {
    /// Pulls `amount` from `payer` into `payee`. The payer must have
    /// authorized the pull beforehand.
    async fn transfer_from(&self, payer: Address, payee: Address, amount: U256) -> Result<()>;

    /// Pays `amount` out of the `custodian` account, which the engine
    /// controls, to `payee`.
    async fn transfer(&self, custodian: Address, payee: Address, amount: U256) -> Result<()>;
}

/// The [ArbitrationAuthority] trait answers whether a caller may rule on an
/// escalated dispute. It is consulted at call time, never cached.
#[async_trait::async_trait]
pub trait ArbitrationAuthority {
    /// Returns true if `caller` is the arbitration authority.
    async fn is_arbiter(&self, caller: Address) -> bool;
}

/// The [OracleClock] trait is a monotonically non-decreasing source of unix
/// timestamps, in seconds.
pub trait OracleClock {
    /// Returns the current timestamp.
    fn now(&self) -> u64;
}

#[async_trait::async_trait]
impl<T: AssetLedger + Send + Sync + ?Sized> AssetLedger for Arc<T> {
    async fn transfer_from(&self, payer: Address, payee: Address, amount: U256) -> Result<()> {
        (**self).transfer_from(payer, payee, amount).await
    }

    async fn transfer(&self, custodian: Address, payee: Address, amount: U256) -> Result<()> {
        (**self).transfer(custodian, payee, amount).await
    }
}

#[async_trait::async_trait]
impl<T: ArbitrationAuthority + Send + Sync + ?Sized> ArbitrationAuthority for Arc<T> {
    async fn is_arbiter(&self, caller: Address) -> bool {
        (**self).is_arbiter(caller).await
    }
}

impl<T: OracleClock + ?Sized> OracleClock for Arc<T> {
    fn now(&self) -> u64 {
        (**self).now()
    }
}
