//! This module contains the [RequestFactory], which mints one isolated
//! [OracleInstance] per request and acts as their arbitration authority.

use crate::{OracleInstance, SharedAdmin};
use alloy_primitives::{keccak256, Address, Bytes, U256};
use std::{collections::HashMap, sync::Arc};
use tokio::sync::Mutex;
use tracing::info;
use verdict_primitives::{AssetLedger, OracleClock, OracleConfig, OracleError, RequestId, Result};

/// An [OracleInstance] as handed out by a [RequestFactory].
pub type SharedInstance<L, C> = Arc<Mutex<OracleInstance<L, C, SharedAdmin>>>;

/// The [RequestFactory] creates and indexes [OracleInstance]s. Every instance
/// it creates shares the factory's owner handle, so transferring ownership
/// changes who may arbitrate every instance, including ones already created.
pub struct RequestFactory<L, C> {
    /// The factory's own address, mixed into every request id.
    address: Address,
    owner: SharedAdmin,
    nonce: u64,
    instances: HashMap<RequestId, SharedInstance<L, C>>,
    order: Vec<RequestId>,
    assets: Arc<L>,
    clock: C,
}

impl<L, C> RequestFactory<L, C>
where
    L: AssetLedger + Send + Sync,
    C: OracleClock + Clone,
{
    pub fn try_new(address: Address, owner: Address, assets: Arc<L>, clock: C) -> Result<Self> {
        if address.is_zero() {
            return Err(OracleError::ZeroAddress);
        }
        Ok(Self {
            address,
            owner: SharedAdmin::try_new(owner)?,
            nonce: 0,
            instances: HashMap::new(),
            order: Vec::new(),
            assets,
            clock,
        })
    }

    /// Deploys a fresh instance under `config` and funds it with `reward`
    /// from `requester`. The instance's escrow is derived from its id.
    pub async fn create_request(
        &mut self,
        requester: Address,
        reward: U256,
        bond: U256,
        description: Bytes,
        config: OracleConfig,
    ) -> Result<(RequestId, SharedInstance<L, C>)> {
        let nonce = self.nonce.checked_add(1).ok_or(OracleError::Overflow)?;
        let id = keccak256([self.address.as_slice(), &self.nonce.to_be_bytes()[..]].concat());
        let escrow = Address::from_slice(&id[12..]);

        let mut instance = OracleInstance::try_new(
            id,
            escrow,
            config,
            self.assets.clone(),
            self.clock.clone(),
            self.owner.clone(),
        )?;
        instance
            .initialize(requester, reward, bond, description)
            .await?;

        self.nonce = nonce;
        let instance = Arc::new(Mutex::new(instance));
        self.instances.insert(id, instance.clone());
        self.order.push(id);
        info!(request = %id, %escrow, %requester, "deployed request instance");
        Ok((id, instance))
    }

    /// Looks up a previously created instance.
    pub fn instance(&self, id: RequestId) -> Result<SharedInstance<L, C>> {
        self.instances
            .get(&id)
            .cloned()
            .ok_or(OracleError::UnknownRequest(id))
    }

    /// Returns every request id, oldest first.
    pub fn request_ids(&self) -> &[RequestId] {
        &self.order
    }

    pub fn address(&self) -> Address {
        self.address
    }

    pub async fn owner(&self) -> Address {
        self.owner.current().await
    }

    /// Hands ownership, and with it arbitration over every instance, to `new_owner`.
    pub async fn transfer_ownership(&self, caller: Address, new_owner: Address) -> Result<()> {
        self.owner.transfer(caller, new_owner).await
    }
}
