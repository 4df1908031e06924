//! The single-request deployment: one [OracleInstance] per request, with a
//! configuration fixed when the instance is constructed.

use crate::{RequestLedger, ResolvabilityStatus, Transfer, Transition};
use alloy_primitives::{Address, Bytes, U256};
use std::sync::Arc;
use tracing::warn;
use verdict_primitives::{
    ArbitrationAuthority, AssetLedger, Dispute, OracleClock, OracleConfig, OracleError, Outcome,
    Proposal, Request, RequestId, RequestState, Result, Side, VersionedConfig, VoterStake,
};

/// The [OracleInstance] wraps a single [RequestLedger]. It does not know who
/// its administrator is; every [Self::admin_resolve] asks the
/// [ArbitrationAuthority] it was built with.
pub struct OracleInstance<L, C, A> {
    book: RequestLedger,
    config: VersionedConfig,
    assets: Arc<L>,
    clock: C,
    authority: A,
}

impl<L, C, A> OracleInstance<L, C, A>
where
    L: AssetLedger + Send + Sync,
    C: OracleClock,
    A: ArbitrationAuthority + Sync,
{
    /// Constructs an uninitialized instance holding its funds in `escrow`.
    pub fn try_new(
        id: RequestId,
        escrow: Address,
        config: OracleConfig,
        assets: Arc<L>,
        clock: C,
        authority: A,
    ) -> Result<Self> {
        if escrow.is_zero() {
            return Err(OracleError::ZeroAddress);
        }
        Ok(Self {
            book: RequestLedger::new(id, escrow),
            config: VersionedConfig::try_new(0, config)?,
            assets,
            clock,
            authority,
        })
    }

    /// Funds the request with `reward` from `requester`. Succeeds once.
    pub async fn initialize(
        &mut self,
        requester: Address,
        reward: U256,
        bond: U256,
        description: Bytes,
    ) -> Result<()> {
        let (config, now) = (self.config, self.clock.now());
        self.run(|book| book.initialize(requester, reward, bond, description, config, now))
            .await
            .map(drop)
    }

    pub async fn propose(&mut self, caller: Address, result: Bytes) -> Result<()> {
        let now = self.clock.now();
        self.run(|book| book.propose(caller, result, now))
            .await
            .map(drop)
    }

    pub async fn dispute(&mut self, caller: Address) -> Result<()> {
        let now = self.clock.now();
        self.run(|book| book.dispute(caller, now)).await.map(drop)
    }

    pub async fn resolve_undisputed(&mut self) -> Result<()> {
        let now = self.clock.now();
        self.run(|book| book.resolve_undisputed(now))
            .await
            .map(drop)
    }

    pub async fn vote(&mut self, caller: Address, side: Side, amount: U256) -> Result<()> {
        let now = self.clock.now();
        self.run(|book| book.vote(caller, side, amount, now))
            .await
            .map(drop)
    }

    pub async fn resolve_dispute(&mut self) -> Result<()> {
        let now = self.clock.now();
        self.run(|book| book.resolve_dispute(now)).await.map(drop)
    }

    /// Finalizes an escalated dispute on behalf of the arbitration authority.
    pub async fn admin_resolve(
        &mut self,
        caller: Address,
        outcome: Outcome,
        result: Bytes,
    ) -> Result<()> {
        if !self.authority.is_arbiter(caller).await {
            warn!(request = %self.book.id(), %caller, "rejected arbitration from non-owner");
            return Err(OracleError::Unauthorized(caller));
        }
        let now = self.clock.now();
        self.run(|book| book.admin_resolve(outcome, result, now))
            .await
            .map(drop)
    }

    /// Pays out `caller`'s winnings and returns the amount paid.
    pub async fn claim_winnings(&mut self, caller: Address) -> Result<U256> {
        self.run(|book| book.claim_winnings(caller))
            .await
            .map(|transfer| transfer.amount())
    }

    pub fn id(&self) -> RequestId {
        self.book.id()
    }

    pub fn escrow(&self) -> Address {
        self.book.escrow()
    }

    pub fn config(&self) -> &OracleConfig {
        &self.config.config
    }

    pub fn ledger(&self) -> &RequestLedger {
        &self.book
    }

    pub fn state(&self) -> RequestState {
        self.book.state()
    }

    pub fn request(&self) -> Option<&Request> {
        self.book.request()
    }

    pub fn proposal(&self) -> Option<&Proposal> {
        self.book.proposal()
    }

    pub fn dispute_record(&self) -> Option<&Dispute> {
        self.book.dispute_record()
    }

    pub fn voter_stake(&self, voter: Address) -> Option<&VoterStake> {
        self.book.voter_stake(voter)
    }

    pub fn result(&self) -> Result<&Bytes> {
        self.book.result()
    }

    pub fn can_resolve_dispute(&self) -> ResolvabilityStatus {
        self.book.can_resolve_dispute(self.clock.now())
    }

    pub fn claimable(&self, voter: Address) -> Result<U256> {
        self.book.claimable(voter)
    }

    async fn run<F>(&mut self, plan: F) -> Result<Transfer>
    where
        F: FnOnce(&RequestLedger) -> Result<Transition>,
    {
        self.book.execute(&*self.assets, plan).await
    }
}
