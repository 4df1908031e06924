//! Per-request configuration and its validator.

use crate::{chain_rules, ConfigError, OracleError, Result};
use alloy_primitives::U256;
use serde::{Deserialize, Serialize};

/// Two hours.
pub const DEFAULT_LIVENESS_PERIOD: u64 = 2 * 60 * 60;

/// One day.
pub const DEFAULT_DOMINANCE_PERIOD: u64 = 24 * 60 * 60;

/// 10,000 tokens at 18 decimals.
pub const DEFAULT_ESCALATION_THRESHOLD: u128 = 10_000_000_000_000_000_000_000;

/// The [OracleConfig] struct holds the rules a request is played under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OracleConfig {
    /// Seconds a proposal must stand unchallenged before it can be finalized.
    pub liveness_period: u64,
    /// Seconds one side must stay 2x dominant before a dispute can resolve.
    pub dominance_period: u64,
    /// Total dispute stake at which resolution moves to the arbitration authority.
    pub escalation_threshold: U256,
}

impl Default for OracleConfig {
    fn default() -> Self {
        Self {
            liveness_period: DEFAULT_LIVENESS_PERIOD,
            dominance_period: DEFAULT_DOMINANCE_PERIOD,
            escalation_threshold: U256::from(DEFAULT_ESCALATION_THRESHOLD),
        }
    }
}

impl OracleConfig {
    pub fn new(liveness_period: u64, dominance_period: u64, escalation_threshold: U256) -> Self {
        Self {
            liveness_period,
            dominance_period,
            escalation_threshold,
        }
    }

    /// Parses a configuration from JSON and validates it.
    pub fn from_json(raw: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(raw)?;
        config.validate()
    }

    /// Rejects any zero-valued field, returning the configuration unchanged otherwise.
    pub fn validate(self) -> Result<Self> {
        chain_rules!(
            self,
            rules::liveness_period(),
            rules::dominance_period(),
            rules::escalation_threshold()
        )
    }
}

mod rules {
    use super::*;
    use crate::rule::Rule;

    /// Builds a [Rule] that rejects the configuration with `error` when `is_zero` holds.
    fn non_zero(
        is_zero: fn(&OracleConfig) -> bool,
        error: ConfigError,
    ) -> Rule<OracleConfig, OracleError> {
        Box::new(move |config: OracleConfig| {
            if is_zero(&config) {
                return Err(OracleError::InvalidConfig(error));
            }
            Ok(config)
        })
    }

    pub(super) fn liveness_period() -> Rule<OracleConfig, OracleError> {
        non_zero(|c| c.liveness_period == 0, ConfigError::ZeroLivenessPeriod)
    }

    pub(super) fn dominance_period() -> Rule<OracleConfig, OracleError> {
        non_zero(|c| c.dominance_period == 0, ConfigError::ZeroDominancePeriod)
    }

    pub(super) fn escalation_threshold() -> Rule<OracleConfig, OracleError> {
        non_zero(
            |c| c.escalation_threshold.is_zero(),
            ConfigError::ZeroEscalationThreshold,
        )
    }
}

/// The [VersionedConfig] struct pins the configuration a request was created
/// under. Later administrator updates bump the version and never touch
/// requests already in flight.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VersionedConfig {
    pub version: u64,
    pub config: OracleConfig,
}

impl VersionedConfig {
    /// Validates `config` and pins it at `version`.
    pub fn try_new(version: u64, config: OracleConfig) -> Result<Self> {
        Ok(Self {
            version,
            config: config.validate()?,
        })
    }

    /// Returns a validated successor of this configuration.
    pub fn next(&self, config: OracleConfig) -> Result<Self> {
        let version = self.version.checked_add(1).ok_or(OracleError::Overflow)?;
        Self::try_new(version, config)
    }
}
