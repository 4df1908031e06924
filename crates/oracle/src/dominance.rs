//! The dominance tracker decides which side of a dispute, if any, holds more
//! than twice the other side's stake, and keeps the timer that measures how
//! long it has done so.

use crate::ResolvabilityStatus;
use alloy_primitives::U256;
use verdict_primitives::{Dispute, DominanceTimer, Side};

/// Returns the side whose pool is strictly more than twice the other's, if any.
/// Exactly 2x is not dominant.
pub fn check_dominance(proposer_stake: U256, disputer_stake: U256) -> Option<Side> {
    // A saturated product only arises when the true product exceeds every
    // representable stake, so the comparison stays exact.
    if proposer_stake > disputer_stake.saturating_mul(U256::from(2)) {
        Some(Side::Proposer)
    } else if disputer_stake > proposer_stake.saturating_mul(U256::from(2)) {
        Some(Side::Disputer)
    } else {
        None
    }
}

/// Computes the dominance timer after the pools changed.
///
/// - No dominance resets the timer.
/// - A fresh dominance, or a flip to the other side, restarts it at `now`.
/// - The same side staying dominant leaves it untouched.
pub fn update_dominance_timer(
    proposer_stake: U256,
    disputer_stake: U256,
    current: Option<DominanceTimer>,
    now: u64,
) -> Option<DominanceTimer> {
    let side = check_dominance(proposer_stake, disputer_stake)?;
    match current {
        Some(timer) if timer.side == side => Some(timer),
        _ => Some(DominanceTimer {
            started_at: now,
            side,
        }),
    }
}

/// Assesses whether `dispute` may be resolved by dominance at `now`, given the
/// configured dominance period.
pub fn assess(dispute: &Dispute, dominance_period: u64, now: u64) -> ResolvabilityStatus {
    let Some(side) = check_dominance(dispute.proposer_stake, dispute.disputer_stake) else {
        return ResolvabilityStatus::NoDominance;
    };
    match dispute.dominance {
        Some(timer) if timer.side == side => {
            let elapsed = now.saturating_sub(timer.started_at);
            if elapsed >= dominance_period {
                ResolvabilityStatus::Resolvable(side)
            } else {
                ResolvabilityStatus::DominancePeriodNotMet {
                    remaining: dominance_period - elapsed,
                }
            }
        }
        _ => ResolvabilityStatus::DominanceNotTracked,
    }
}
