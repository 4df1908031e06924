//! The types module holds the values the [crate::RequestLedger] plans and applies.

use alloy_primitives::{Address, U256};
use verdict_primitives::{
    Dispute, DominanceTimer, Proposal, Request, RequestState, Resolution, ResolutionPath, Side,
    VersionedConfig,
};

/// The [Transfer] enum is a single value-transfer instruction against a
/// request's escrow.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transfer {
    /// Pull `amount` from `payer` into the escrow.
    Debit { payer: Address, amount: U256 },
    /// Pay `amount` out of the escrow to `payee`.
    Credit { payee: Address, amount: U256 },
}

impl Transfer {
    pub fn amount(&self) -> U256 {
        match self {
            Transfer::Debit { amount, .. } | Transfer::Credit { amount, .. } => *amount,
        }
    }
}

/// The [Transition] enum is a fully planned state change. Every guard has
/// already passed by the time one exists, so applying it cannot fail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transition {
    Initialized {
        request: Request,
        config: VersionedConfig,
        funding: Transfer,
    },
    Proposed {
        proposal: Proposal,
        bond: Transfer,
    },
    Disputed {
        dispute: Dispute,
        bond: Transfer,
    },
    Voted {
        voter: Address,
        side: Side,
        amount: U256,
        /// Pool totals after this vote.
        proposer_pool: U256,
        disputer_pool: U256,
        /// The dominance timer after this vote.
        dominance: Option<DominanceTimer>,
        /// True if this vote pushed the total stake to the escalation threshold.
        escalated: bool,
        stake: Transfer,
    },
    Resolved {
        resolution: Resolution,
        payout: Transfer,
    },
    Claimed {
        voter: Address,
        payout: Transfer,
    },
}

impl Transition {
    /// Returns the value transfer that must succeed before this transition is applied.
    pub fn transfer(&self) -> &Transfer {
        match self {
            Transition::Initialized { funding, .. } => funding,
            Transition::Proposed { bond, .. } | Transition::Disputed { bond, .. } => bond,
            Transition::Voted { stake, .. } => stake,
            Transition::Resolved { payout, .. } | Transition::Claimed { payout, .. } => payout,
        }
    }

    /// Returns the state the request must be in for this transition to apply.
    pub fn required_state(&self) -> RequestState {
        match self {
            Transition::Initialized { .. } => RequestState::Uninitialized,
            Transition::Proposed { .. } => RequestState::Initialized,
            Transition::Disputed { .. } => RequestState::Proposed,
            Transition::Voted { .. } => RequestState::Disputed,
            Transition::Resolved { resolution, .. } => match resolution.path {
                ResolutionPath::Undisputed => RequestState::Proposed,
                ResolutionPath::Dominance => RequestState::Disputed,
                ResolutionPath::Arbitration => RequestState::Escalated,
            },
            Transition::Claimed { .. } => RequestState::Resolved,
        }
    }

    /// Returns the state this transition moves the request into, or [None] if
    /// the state is unchanged.
    pub fn target(&self) -> Option<RequestState> {
        match self {
            Transition::Initialized { .. } => Some(RequestState::Initialized),
            Transition::Proposed { .. } => Some(RequestState::Proposed),
            Transition::Disputed { .. } => Some(RequestState::Disputed),
            Transition::Voted { escalated, .. } => escalated.then_some(RequestState::Escalated),
            Transition::Resolved { .. } => Some(RequestState::Resolved),
            Transition::Claimed { .. } => None,
        }
    }

    /// Returns a short name for logging.
    pub fn name(&self) -> &'static str {
        match self {
            Transition::Initialized { .. } => "initialized",
            Transition::Proposed { .. } => "proposed",
            Transition::Disputed { .. } => "disputed",
            Transition::Voted { .. } => "voted",
            Transition::Resolved { .. } => "resolved",
            Transition::Claimed { .. } => "claimed",
        }
    }
}

/// The [ResolvabilityStatus] enum answers "can this dispute be resolved now, and if not, why".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolvabilityStatus {
    /// The request is not in [RequestState::Disputed].
    NotDisputed,
    /// Neither pool is more than twice the other.
    NoDominance,
    /// A side is dominant but no timer is recorded for it.
    DominanceNotTracked,
    /// A side is dominant but has not been for long enough.
    DominancePeriodNotMet { remaining: u64 },
    /// The given side may be declared the winner.
    Resolvable(Side),
}
