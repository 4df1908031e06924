//! The multi-request deployment: one [OracleHub] multiplexes many requests
//! under a single administrator and a versioned default configuration.

use crate::{RequestLedger, ResolvabilityStatus, SharedAdmin, Transfer, Transition};
use alloy_primitives::{keccak256, Address, Bytes, U256};
use std::{collections::HashMap, sync::Arc};
use tracing::{info, warn};
use verdict_primitives::{
    ArbitrationAuthority, AssetLedger, Dispute, OracleClock, OracleConfig, OracleError, Outcome,
    Proposal, Request, RequestId, RequestState, Result, Side, VersionedConfig, VoterStake,
};

/// The [OracleHub] keeps one [RequestLedger] per request, keyed by
/// [RequestId], all sharing one escrow account. New requests capture the
/// configuration current at creation; later updates never reach them.
pub struct OracleHub<L, C> {
    escrow: Address,
    admin: SharedAdmin,
    config: VersionedConfig,
    requests: HashMap<RequestId, RequestLedger>,
    /// Request ids in creation order.
    order: Vec<RequestId>,
    nonce: u64,
    assets: Arc<L>,
    clock: C,
}

impl<L, C> OracleHub<L, C>
where
    L: AssetLedger + Send + Sync,
    C: OracleClock,
{
    pub fn try_new(
        escrow: Address,
        admin: Address,
        config: OracleConfig,
        assets: Arc<L>,
        clock: C,
    ) -> Result<Self> {
        if escrow.is_zero() {
            return Err(OracleError::ZeroAddress);
        }
        Ok(Self {
            escrow,
            admin: SharedAdmin::try_new(admin)?,
            config: VersionedConfig::try_new(0, config)?,
            requests: HashMap::new(),
            order: Vec::new(),
            nonce: 0,
            assets,
            clock,
        })
    }

    /// Opens a new request funded with `reward` from `requester`.
    pub async fn create_request(
        &mut self,
        requester: Address,
        reward: U256,
        bond: U256,
        description: Bytes,
    ) -> Result<RequestId> {
        let nonce = self.nonce.checked_add(1).ok_or(OracleError::Overflow)?;
        let id = keccak256([self.escrow.as_slice(), &self.nonce.to_be_bytes()[..]].concat());
        let mut ledger = RequestLedger::new(id, self.escrow);
        let plan = ledger.initialize(
            requester,
            reward,
            bond,
            description,
            self.config,
            self.clock.now(),
        )?;
        ledger.settle(&*self.assets, plan).await?;

        self.nonce = nonce;
        self.requests.insert(id, ledger);
        self.order.push(id);
        Ok(id)
    }

    pub async fn propose(&mut self, id: RequestId, caller: Address, result: Bytes) -> Result<()> {
        self.drive(id, |book, now| book.propose(caller, result, now))
            .await
            .map(drop)
    }

    pub async fn dispute(&mut self, id: RequestId, caller: Address) -> Result<()> {
        self.drive(id, |book, now| book.dispute(caller, now))
            .await
            .map(drop)
    }

    /// Finalizes an unchallenged proposal. Callable by anyone.
    pub async fn resolve_undisputed(&mut self, id: RequestId) -> Result<()> {
        self.drive(id, |book, now| book.resolve_undisputed(now))
            .await
            .map(drop)
    }

    pub async fn vote(
        &mut self,
        id: RequestId,
        caller: Address,
        side: Side,
        amount: U256,
    ) -> Result<()> {
        self.drive(id, |book, now| book.vote(caller, side, amount, now))
            .await
            .map(drop)
    }

    /// Finalizes a dispute by sustained dominance. Callable by anyone.
    pub async fn resolve_dispute(&mut self, id: RequestId) -> Result<()> {
        self.drive(id, |book, now| book.resolve_dispute(now))
            .await
            .map(drop)
    }

    /// Finalizes an escalated dispute. Only the administrator may call this.
    pub async fn admin_resolve(
        &mut self,
        id: RequestId,
        caller: Address,
        outcome: Outcome,
        result: Bytes,
    ) -> Result<()> {
        if !self.admin.is_arbiter(caller).await {
            warn!(request = %id, %caller, "rejected arbitration from non-administrator");
            return Err(OracleError::Unauthorized(caller));
        }
        self.drive(id, |book, now| book.admin_resolve(outcome, result, now))
            .await
            .map(drop)
    }

    /// Pays out `caller`'s winnings and returns the amount paid.
    pub async fn claim_winnings(&mut self, id: RequestId, caller: Address) -> Result<U256> {
        self.drive(id, |book, _| book.claim_winnings(caller))
            .await
            .map(|transfer| transfer.amount())
    }

    /// Installs a new default configuration for requests created from now on
    /// and returns its version.
    pub async fn set_config(&mut self, caller: Address, config: OracleConfig) -> Result<u64> {
        if !self.admin.is_arbiter(caller).await {
            return Err(OracleError::Unauthorized(caller));
        }
        self.config = self.config.next(config)?;
        info!(version = self.config.version, ?config, "configuration updated");
        Ok(self.config.version)
    }

    pub async fn transfer_admin(&mut self, caller: Address, new_admin: Address) -> Result<()> {
        self.admin.transfer(caller, new_admin).await
    }

    pub fn escrow(&self) -> Address {
        self.escrow
    }

    /// Returns the configuration new requests will be created under.
    pub fn config(&self) -> &VersionedConfig {
        &self.config
    }

    /// Returns every request id, oldest first.
    pub fn request_ids(&self) -> &[RequestId] {
        &self.order
    }

    pub fn ledger(&self, id: RequestId) -> Result<&RequestLedger> {
        self.requests
            .get(&id)
            .ok_or(OracleError::UnknownRequest(id))
    }

    pub fn state(&self, id: RequestId) -> Result<RequestState> {
        Ok(self.ledger(id)?.state())
    }

    pub fn request(&self, id: RequestId) -> Result<Option<&Request>> {
        Ok(self.ledger(id)?.request())
    }

    pub fn proposal(&self, id: RequestId) -> Result<Option<&Proposal>> {
        Ok(self.ledger(id)?.proposal())
    }

    pub fn dispute_record(&self, id: RequestId) -> Result<Option<&Dispute>> {
        Ok(self.ledger(id)?.dispute_record())
    }

    pub fn voter_stake(&self, id: RequestId, voter: Address) -> Result<Option<&VoterStake>> {
        Ok(self.ledger(id)?.voter_stake(voter))
    }

    pub fn result(&self, id: RequestId) -> Result<&Bytes> {
        self.ledger(id)?.result()
    }

    pub fn can_resolve_dispute(&self, id: RequestId) -> Result<ResolvabilityStatus> {
        Ok(self.ledger(id)?.can_resolve_dispute(self.clock.now()))
    }

    pub fn claimable(&self, id: RequestId, voter: Address) -> Result<U256> {
        self.ledger(id)?.claimable(voter)
    }

    /// Plans against request `id` at the current time, then settles the plan.
    async fn drive<F>(&mut self, id: RequestId, plan: F) -> Result<Transfer>
    where
        F: FnOnce(&RequestLedger, u64) -> Result<Transition>,
    {
        let now = self.clock.now();
        let book = self
            .requests
            .get_mut(&id)
            .ok_or(OracleError::UnknownRequest(id))?;
        book.execute(&*self.assets, |book| plan(book, now)).await
    }
}
