//! The error type shared by every crate in the workspace.

use crate::RequestState;
use alloy_primitives::{Address, B256};
use thiserror::Error;

/// The [ConfigError] enum names the configuration value that failed validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("liveness period must be non-zero")]
    ZeroLivenessPeriod,
    #[error("voting dominance period must be non-zero")]
    ZeroDominancePeriod,
    #[error("escalation threshold must be non-zero")]
    ZeroEscalationThreshold,
}

/// The [ErrorKind] enum classifies an [OracleError] by how a caller should
/// react to it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Wrong state, zero amount, zero identity or invalid configuration.
    Precondition,
    /// Depends on the clock; retrying later may succeed.
    Temporal,
    /// The caller is not the arbitration authority.
    Authorization,
    /// Permanent for the (request, voter) pair.
    Claim,
    /// A checked arithmetic operation overflowed.
    Arithmetic,
    /// The value-transfer collaborator rejected a transfer.
    Ledger,
}

/// The [OracleError] enum is returned by every fallible operation on a request.
/// No variant is ever produced after a mutation has been applied.
#[derive(Debug, Error)]
pub enum OracleError {
    #[error("invalid state: currently {current}, expected {expected}")]
    InvalidState {
        current: RequestState,
        expected: RequestState,
    },
    #[error("request already initialized")]
    AlreadyInitialized,
    #[error("amount must be non-zero")]
    ZeroAmount,
    #[error("identity must be non-zero")]
    ZeroAddress,
    #[error("invalid configuration: {0}")]
    InvalidConfig(#[from] ConfigError),
    #[error("malformed configuration: {0}")]
    MalformedConfig(#[from] serde_json::Error),
    #[error("planned transition no longer matches the request")]
    StaleTransition,
    #[error("unknown request {0}")]
    UnknownRequest(B256),

    #[error("liveness period has not ended")]
    LivenessNotEnded,
    #[error("liveness period has ended")]
    LivenessEnded,
    #[error("no side has 2x dominance")]
    NoDominance,
    #[error("dominance is not being tracked")]
    DominanceNotTracked,
    #[error("dominance period not met, {remaining}s remaining")]
    DominancePeriodNotMet { remaining: u64 },

    #[error("{0} is not the arbitration authority")]
    Unauthorized(Address),

    #[error("winnings already claimed")]
    AlreadyClaimed,
    #[error("nothing to claim")]
    NothingToClaim,

    #[error("arithmetic overflow")]
    Overflow,

    #[error("ledger transfer failed: {0}")]
    Ledger(#[from] anyhow::Error),
}

impl OracleError {
    /// Returns the [ErrorKind] this error belongs to.
    pub fn kind(&self) -> ErrorKind {
        match self {
            OracleError::InvalidState { .. }
            | OracleError::AlreadyInitialized
            | OracleError::ZeroAmount
            | OracleError::ZeroAddress
            | OracleError::InvalidConfig(_)
            | OracleError::MalformedConfig(_)
            | OracleError::StaleTransition
            | OracleError::UnknownRequest(_) => ErrorKind::Precondition,
            OracleError::LivenessNotEnded
            | OracleError::LivenessEnded
            | OracleError::NoDominance
            | OracleError::DominanceNotTracked
            | OracleError::DominancePeriodNotMet { .. } => ErrorKind::Temporal,
            OracleError::Unauthorized(_) => ErrorKind::Authorization,
            OracleError::AlreadyClaimed | OracleError::NothingToClaim => ErrorKind::Claim,
            OracleError::Overflow => ErrorKind::Arithmetic,
            OracleError::Ledger(_) => ErrorKind::Ledger,
        }
    }

    /// Returns true if the same call may succeed once more time has passed.
    pub fn is_retryable(&self) -> bool {
        self.kind() == ErrorKind::Temporal
    }
}

/// A [Result] alias defaulting to [OracleError].
pub type Result<T, E = OracleError> = std::result::Result<T, E>;
