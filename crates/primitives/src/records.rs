//! The records owned by a request ledger. Outside the ledger these are only
//! ever handed out by shared reference.

use crate::{Outcome, RequestState, ResolutionPath, Side};
use alloy_primitives::{Address, Bytes, U256};

/// The [Request] struct is the oracle query itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    pub requester: Address,
    /// Paid to the winning principal. Strictly positive.
    pub reward: U256,
    /// Required from both the proposer and the disputer. Strictly positive.
    pub bond: U256,
    pub description: Bytes,
    pub state: RequestState,
    pub created_at: u64,
}

/// The [Proposal] struct holds the single answer submitted for a request.
/// It is never modified after creation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Proposal {
    pub proposer: Address,
    pub result: Bytes,
    pub proposed_at: u64,
    /// A dispute is accepted strictly before this timestamp.
    pub liveness_ends_at: u64,
}

/// The [DominanceTimer] records since when, and for which side, a dispute has
/// been continuously 2x dominant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DominanceTimer {
    pub started_at: u64,
    pub side: Side,
}

/// The [Dispute] struct holds the challenge against a proposal and the
/// running totals of the vote.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dispute {
    pub disputer: Address,
    pub disputed_at: u64,
    pub proposer_stake: U256,
    pub disputer_stake: U256,
    /// `None` whenever neither side is currently dominant.
    pub dominance: Option<DominanceTimer>,
    pub outcome: Option<Outcome>,
}

impl Dispute {
    pub fn new(disputer: Address, disputed_at: u64) -> Self {
        Self {
            disputer,
            disputed_at,
            proposer_stake: U256::ZERO,
            disputer_stake: U256::ZERO,
            dominance: None,
            outcome: None,
        }
    }

    /// Returns the pool backing `side`.
    pub fn pool(&self, side: Side) -> U256 {
        match side {
            Side::Proposer => self.proposer_stake,
            Side::Disputer => self.disputer_stake,
        }
    }

    /// Returns the timestamp the current dominance streak started at, or 0 if
    /// no side is dominant.
    pub fn dominance_started_at(&self) -> u64 {
        self.dominance.map(|t| t.started_at).unwrap_or_default()
    }
}

/// The [VoterStake] struct accumulates one voter's stake across every vote
/// they cast on a dispute.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VoterStake {
    pub proposer_stake: U256,
    pub disputer_stake: U256,
    pub claimed: bool,
}

impl VoterStake {
    /// Returns the stake this voter placed on `side`.
    pub fn on(&self, side: Side) -> U256 {
        match side {
            Side::Proposer => self.proposer_stake,
            Side::Disputer => self.disputer_stake,
        }
    }
}

/// The [Resolution] struct is the final verdict of a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    pub outcome: Outcome,
    /// The proposal's result, the arbiter's result, or empty when the
    /// disputer won by dominance.
    pub result: Bytes,
    pub resolved_at: u64,
    pub path: ResolutionPath,
}
