//! Types describing where a request sits in its lifecycle and who it favours.

use anyhow::{bail, Error};
use std::{convert::TryFrom, fmt};

/// The [RequestState] enum tracks the lifecycle of a single oracle request.
///
/// The states form a DAG that is only ever walked forward:
///
/// ```text
/// Uninitialized -> Initialized -> Proposed -> Resolved
///                                    |
///                                    v
///                                 Disputed -> Resolved
///                                    |
///                                    v
///                                 Escalated -> Resolved
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RequestState {
    /// The request slot exists but has not been initialized.
    Uninitialized = 0,
    /// The request has been funded and is waiting for a proposal.
    Initialized = 1,
    /// An answer has been proposed and the liveness window is running.
    Proposed = 2,
    /// The proposal has been challenged and stake-weighted voting is open.
    Disputed = 3,
    /// Total dispute stake crossed the escalation threshold. Only the
    /// arbitration authority may finalize the request.
    Escalated = 4,
    /// The request is final.
    Resolved = 5,
}

impl RequestState {
    /// Returns true if `next` is a legal direct successor of `self`.
    pub fn can_advance_to(&self, next: RequestState) -> bool {
        use RequestState::*;
        matches!(
            (self, next),
            (Uninitialized, Initialized)
                | (Initialized, Proposed)
                | (Proposed, Disputed)
                | (Proposed, Resolved)
                | (Disputed, Escalated)
                | (Disputed, Resolved)
                | (Escalated, Resolved)
        )
    }

    /// Returns true if no further transitions are possible.
    pub fn is_terminal(&self) -> bool {
        matches!(self, RequestState::Resolved)
    }
}

impl TryFrom<u8> for RequestState {
    type Error = Error;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(RequestState::Uninitialized),
            1 => Ok(RequestState::Initialized),
            2 => Ok(RequestState::Proposed),
            3 => Ok(RequestState::Disputed),
            4 => Ok(RequestState::Escalated),
            5 => Ok(RequestState::Resolved),
            _ => bail!("Invalid request state"),
        }
    }
}

impl fmt::Display for RequestState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// The [Side] enum names one of the two camps in a dispute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Side {
    /// Stake backing the original proposal.
    Proposer = 0,
    /// Stake backing the challenge.
    Disputer = 1,
}

impl Side {
    /// Returns the opposing side.
    pub fn opposite(&self) -> Side {
        match self {
            Side::Proposer => Side::Disputer,
            Side::Disputer => Side::Proposer,
        }
    }
}

impl TryFrom<u8> for Side {
    type Error = Error;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Side::Proposer),
            1 => Ok(Side::Disputer),
            _ => bail!("Invalid dispute side"),
        }
    }
}

/// The [Outcome] enum is the terminal verdict of a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Outcome {
    /// The proposal stands. Also recorded for undisputed resolutions.
    ProposerWins = 1,
    /// The challenge succeeded and the proposal is discarded.
    DisputerWins = 2,
}

impl Outcome {
    /// Returns the [Side] whose stakers are paid out under this outcome.
    pub fn winning_side(&self) -> Side {
        match self {
            Outcome::ProposerWins => Side::Proposer,
            Outcome::DisputerWins => Side::Disputer,
        }
    }
}

impl From<Side> for Outcome {
    fn from(side: Side) -> Self {
        match side {
            Side::Proposer => Outcome::ProposerWins,
            Side::Disputer => Outcome::DisputerWins,
        }
    }
}

impl TryFrom<u8> for Outcome {
    type Error = Error;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Outcome::ProposerWins),
            2 => Ok(Outcome::DisputerWins),
            _ => bail!("Invalid outcome"),
        }
    }
}

/// The [ResolutionPath] enum records which rule finalized a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolutionPath {
    /// The liveness window elapsed without a challenge.
    Undisputed,
    /// One side held 2x dominance for the configured period.
    Dominance,
    /// The arbitration authority ruled on an escalated dispute.
    Arbitration,
}
