#![doc = include_str!("../README.md")]

//! Primitives for Verdict, an optimistic dispute-resolution engine.

mod request;
pub use request::{Outcome, RequestState, ResolutionPath, Side};

mod records;
pub use records::{Dispute, DominanceTimer, Proposal, Request, Resolution, VoterStake};

mod config;
pub use config::{
    OracleConfig, VersionedConfig, DEFAULT_DOMINANCE_PERIOD, DEFAULT_ESCALATION_THRESHOLD,
    DEFAULT_LIVENESS_PERIOD,
};

mod error;
pub use error::{ConfigError, ErrorKind, OracleError, Result};

mod traits;
pub use traits::{ArbitrationAuthority, AssetLedger, OracleClock};

pub mod rule;

/// Uniquely identifies a request for its whole life.
pub type RequestId = alloy_primitives::B256;
