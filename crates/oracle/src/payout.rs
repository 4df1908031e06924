//! The payout engine. All arithmetic is checked and every division floors, so
//! rounding dust stays in escrow and never favours a claimant.

use alloy_primitives::U256;
use verdict_primitives::{OracleError, Result};

/// Returns a winning voter's payout: their own stake back plus their
/// proportional share of the losing pool.
///
/// `stake + floor(stake * loser_pool / winner_pool)`, or just `stake` when the
/// winning pool is empty.
pub fn calculate_payout(voter_stake: U256, winner_pool: U256, loser_pool: U256) -> Result<U256> {
    if winner_pool.is_zero() {
        return Ok(voter_stake);
    }
    let share = voter_stake
        .checked_mul(loser_pool)
        .ok_or(OracleError::Overflow)?
        / winner_pool;
    voter_stake.checked_add(share).ok_or(OracleError::Overflow)
}

/// Payout to an unchallenged proposer: the reward plus their bond back.
pub fn undisputed_payout(reward: U256, bond: U256) -> Result<U256> {
    reward.checked_add(bond).ok_or(OracleError::Overflow)
}

/// Payout to the winning principal of a dispute: the reward, their own bond,
/// and the loser's forfeited bond.
pub fn dispute_payout(reward: U256, bond: U256) -> Result<U256> {
    bond.checked_mul(U256::from(2))
        .and_then(|bonds| bonds.checked_add(reward))
        .ok_or(OracleError::Overflow)
}

#[cfg(test)]
mod test {
    use super::*;
    use proptest::prelude::*;

    fn u(v: u64) -> U256 {
        U256::from(v)
    }

    #[test]
    fn proportional_share_floors() {
        assert_eq!(calculate_payout(u(2000), u(3000), u(1000)).unwrap(), u(2666));
        assert_eq!(calculate_payout(u(1000), u(3000), u(1000)).unwrap(), u(1333));
        assert_eq!(calculate_payout(u(10), u(10), U256::ZERO).unwrap(), u(10));
        assert_eq!(calculate_payout(u(7), U256::ZERO, u(100)).unwrap(), u(7));
    }

    #[test]
    fn principal_payouts() {
        assert_eq!(undisputed_payout(u(100), u(50)).unwrap(), u(150));
        assert_eq!(dispute_payout(u(100), u(50)).unwrap(), u(200));
        assert!(matches!(
            dispute_payout(u(1), U256::MAX),
            Err(OracleError::Overflow)
        ));
        assert!(matches!(
            calculate_payout(U256::MAX, u(1), u(2)),
            Err(OracleError::Overflow)
        ));
    }

    proptest! {
        #[test]
        fn payouts_never_exceed_pools(
            stakes in proptest::collection::vec(1u64..1_000_000_000, 1..50),
            loser_pool in 0u64..1_000_000_000_000,
        ) {
            let winner_pool = stakes.iter().fold(U256::ZERO, |acc, s| acc + U256::from(*s));
            let loser_pool = U256::from(loser_pool);
            let mut paid = U256::ZERO;
            for stake in &stakes {
                let payout = calculate_payout(U256::from(*stake), winner_pool, loser_pool).unwrap();
                prop_assert!(payout >= U256::from(*stake));
                paid += payout;
            }
            prop_assert!(paid <= winner_pool + loser_pool);
            // Rounding loses at most one unit per claimant.
            prop_assert!(winner_pool + loser_pool - paid < U256::from(stakes.len()));
        }
    }
}
