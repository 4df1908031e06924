//! This module contains the [SharedAdmin], an [ArbitrationAuthority] whose
//! identity can be rotated while every holder of a handle observes the change.

use alloy_primitives::Address;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::info;
use verdict_primitives::{ArbitrationAuthority, OracleError, Result};

/// The [SharedAdmin] is a cloneable handle to a single administrator identity.
/// Clones share the identity, so a transfer through one handle is seen by all.
#[derive(Debug, Clone)]
pub struct SharedAdmin {
    admin: Arc<RwLock<Address>>,
}

impl SharedAdmin {
    pub fn try_new(admin: Address) -> Result<Self> {
        if admin.is_zero() {
            return Err(OracleError::ZeroAddress);
        }
        Ok(Self {
            admin: Arc::new(RwLock::new(admin)),
        })
    }

    /// Returns the current administrator.
    pub async fn current(&self) -> Address {
        *self.admin.read().await
    }

    /// Hands the administrator role from `caller` to `new_admin`.
    pub async fn transfer(&self, caller: Address, new_admin: Address) -> Result<()> {
        if new_admin.is_zero() {
            return Err(OracleError::ZeroAddress);
        }
        let mut admin = self.admin.write().await;
        if *admin != caller {
            return Err(OracleError::Unauthorized(caller));
        }
        let previous = std::mem::replace(&mut *admin, new_admin);
        info!(%previous, current = %new_admin, "administrator transferred");
        Ok(())
    }
}

#[async_trait::async_trait]
impl ArbitrationAuthority for SharedAdmin {
    async fn is_arbiter(&self, caller: Address) -> bool {
        *self.admin.read().await == caller
    }
}
