//! This module contains the [RequestLedger], the state machine that owns every
//! record belonging to one oracle request.
//!
//! Mutating operations come in two halves. The planning methods take `&self`,
//! run every guard up front and return a [Transition] describing the change and
//! the single [Transfer] it needs. [RequestLedger::apply] then installs a
//! planned transition and cannot fail. Callers move value between the two
//! halves (see [RequestLedger::settle]), so a rejected transfer leaves the
//! ledger exactly as it was.

use crate::{dominance, payout, ResolvabilityStatus, Transfer, Transition};
use alloy_primitives::{Address, Bytes, U256};
use std::collections::HashMap;
use verdict_primitives::{
    Dispute, OracleError, Outcome, Proposal, Request, RequestId, RequestState, Resolution,
    ResolutionPath, Result, Side, VersionedConfig, VoterStake,
};

/// The [RequestLedger] holds the [Request], [Proposal], [Dispute] and
/// [VoterStake] records of a single request along with the history of every
/// transition applied to it.
#[derive(Debug, Clone)]
pub struct RequestLedger {
    id: RequestId,
    /// The account bonds, stakes and the reward are held in.
    escrow: Address,
    config: Option<VersionedConfig>,
    request: Option<Request>,
    proposal: Option<Proposal>,
    dispute: Option<Dispute>,
    voters: HashMap<Address, VoterStake>,
    resolution: Option<Resolution>,
    history: Vec<Transition>,
}

impl RequestLedger {
    /// Creates an uninitialized ledger for request `id`, holding funds in `escrow`.
    pub fn new(id: RequestId, escrow: Address) -> Self {
        Self {
            id,
            escrow,
            config: None,
            request: None,
            proposal: None,
            dispute: None,
            voters: HashMap::new(),
            resolution: None,
            history: Vec::new(),
        }
    }

    /// Rebuilds a ledger from a recorded history. Each transition must pass
    /// [Self::verify] against the ledger the previous ones left behind.
    pub fn replay(
        id: RequestId,
        escrow: Address,
        transitions: impl IntoIterator<Item = Transition>,
    ) -> Result<Self> {
        let mut ledger = Self::new(id, escrow);
        for transition in transitions {
            ledger.verify(&transition)?;
            ledger.apply(transition);
        }
        Ok(ledger)
    }

    pub fn id(&self) -> RequestId {
        self.id
    }

    pub fn escrow(&self) -> Address {
        self.escrow
    }

    /// Returns the current lifecycle state.
    pub fn state(&self) -> RequestState {
        self.request
            .as_ref()
            .map(|r| r.state)
            .unwrap_or(RequestState::Uninitialized)
    }

    pub fn config(&self) -> Option<&VersionedConfig> {
        self.config.as_ref()
    }

    pub fn request(&self) -> Option<&Request> {
        self.request.as_ref()
    }

    pub fn proposal(&self) -> Option<&Proposal> {
        self.proposal.as_ref()
    }

    pub fn dispute_record(&self) -> Option<&Dispute> {
        self.dispute.as_ref()
    }

    pub fn voter_stake(&self, voter: Address) -> Option<&VoterStake> {
        self.voters.get(&voter)
    }

    pub fn resolution(&self) -> Option<&Resolution> {
        self.resolution.as_ref()
    }

    /// Returns every transition applied so far, oldest first.
    pub fn history(&self) -> &[Transition] {
        &self.history
    }

    /// Returns the final result. Not observable before the request is resolved.
    pub fn result(&self) -> Result<&Bytes> {
        self.expect_state(RequestState::Resolved)?;
        let resolution = self
            .resolution
            .as_ref()
            .ok_or_else(|| self.invalid(RequestState::Resolved))?;
        Ok(&resolution.result)
    }

    /// Reports whether [Self::resolve_dispute] would succeed at `now`.
    pub fn can_resolve_dispute(&self, now: u64) -> ResolvabilityStatus {
        match (self.state(), &self.dispute, &self.config) {
            (RequestState::Disputed, Some(dispute), Some(config)) => {
                dominance::assess(dispute, config.config.dominance_period, now)
            }
            _ => ResolvabilityStatus::NotDisputed,
        }
    }

    /// Returns what `voter` would receive from [Self::claim_winnings] right now.
    pub fn claimable(&self, voter: Address) -> Result<U256> {
        self.expect_state(RequestState::Resolved)?;
        let outcome = self
            .resolution
            .as_ref()
            .map(|r| r.outcome)
            .ok_or_else(|| self.invalid(RequestState::Resolved))?;
        let (Some(dispute), Some(stake)) = (&self.dispute, self.voters.get(&voter)) else {
            return Err(OracleError::NothingToClaim);
        };
        if stake.claimed {
            return Err(OracleError::AlreadyClaimed);
        }

        let side = outcome.winning_side();
        let voter_stake = stake.on(side);
        if voter_stake.is_zero() {
            return Err(OracleError::NothingToClaim);
        }
        payout::calculate_payout(voter_stake, dispute.pool(side), dispute.pool(side.opposite()))
    }

    /// Plans the initialization of the request, pulling the reward from the requester.
    pub fn initialize(
        &self,
        requester: Address,
        reward: U256,
        bond: U256,
        description: Bytes,
        config: VersionedConfig,
        now: u64,
    ) -> Result<Transition> {
        if self.state() != RequestState::Uninitialized {
            return Err(OracleError::AlreadyInitialized);
        }
        non_zero_address(requester)?;
        if reward.is_zero() || bond.is_zero() {
            return Err(OracleError::ZeroAmount);
        }
        let config = VersionedConfig {
            version: config.version,
            config: config.config.validate()?,
        };

        Ok(Transition::Initialized {
            request: Request {
                requester,
                reward,
                bond,
                description,
                state: RequestState::Initialized,
                created_at: now,
            },
            config,
            funding: Transfer::Debit {
                payer: requester,
                amount: reward,
            },
        })
    }

    /// Plans a proposal of `result` by `caller`, who posts the bond.
    pub fn propose(&self, caller: Address, result: Bytes, now: u64) -> Result<Transition> {
        self.expect_state(RequestState::Initialized)?;
        non_zero_address(caller)?;
        let (request, config) = self.funded()?;
        let liveness_ends_at = now
            .checked_add(config.config.liveness_period)
            .ok_or(OracleError::Overflow)?;

        Ok(Transition::Proposed {
            proposal: Proposal {
                proposer: caller,
                result,
                proposed_at: now,
                liveness_ends_at,
            },
            bond: Transfer::Debit {
                payer: caller,
                amount: request.bond,
            },
        })
    }

    /// Plans a challenge of the proposal by `caller`, who posts a matching bond.
    /// Only accepted strictly before the liveness deadline.
    pub fn dispute(&self, caller: Address, now: u64) -> Result<Transition> {
        self.expect_state(RequestState::Proposed)?;
        non_zero_address(caller)?;
        let (request, _) = self.funded()?;
        if now >= self.proposed()?.liveness_ends_at {
            return Err(OracleError::LivenessEnded);
        }

        Ok(Transition::Disputed {
            dispute: Dispute::new(caller, now),
            bond: Transfer::Debit {
                payer: caller,
                amount: request.bond,
            },
        })
    }

    /// Plans the finalization of an unchallenged proposal once liveness has elapsed.
    pub fn resolve_undisputed(&self, now: u64) -> Result<Transition> {
        self.expect_state(RequestState::Proposed)?;
        let (request, _) = self.funded()?;
        let proposal = self.proposed()?;
        if now < proposal.liveness_ends_at {
            return Err(OracleError::LivenessNotEnded);
        }

        Ok(Transition::Resolved {
            resolution: Resolution {
                outcome: Outcome::ProposerWins,
                result: proposal.result.clone(),
                resolved_at: now,
                path: ResolutionPath::Undisputed,
            },
            payout: Transfer::Credit {
                payee: proposal.proposer,
                amount: payout::undisputed_payout(request.reward, request.bond)?,
            },
        })
    }

    /// Plans a vote of `amount` on `side` by `caller`. The vote that brings the
    /// total stake to the escalation threshold moves the request to
    /// [RequestState::Escalated].
    pub fn vote(&self, caller: Address, side: Side, amount: U256, now: u64) -> Result<Transition> {
        self.expect_state(RequestState::Disputed)?;
        non_zero_address(caller)?;
        if amount.is_zero() {
            return Err(OracleError::ZeroAmount);
        }
        let (_, config) = self.funded()?;
        let dispute = self.disputed()?;

        let (proposer_pool, disputer_pool) = pools_after_vote(dispute, side, amount)?;
        let total = proposer_pool
            .checked_add(disputer_pool)
            .ok_or(OracleError::Overflow)?;

        Ok(Transition::Voted {
            voter: caller,
            side,
            amount,
            proposer_pool,
            disputer_pool,
            dominance: dominance::update_dominance_timer(
                proposer_pool,
                disputer_pool,
                dispute.dominance,
                now,
            ),
            escalated: total >= config.config.escalation_threshold,
            stake: Transfer::Debit {
                payer: caller,
                amount,
            },
        })
    }

    /// Plans the resolution of a dispute in favour of the side that has held
    /// 2x dominance for the configured period.
    pub fn resolve_dispute(&self, now: u64) -> Result<Transition> {
        self.expect_state(RequestState::Disputed)?;
        let side = match self.can_resolve_dispute(now) {
            ResolvabilityStatus::Resolvable(side) => side,
            ResolvabilityStatus::NotDisputed => return Err(self.invalid(RequestState::Disputed)),
            ResolvabilityStatus::NoDominance => return Err(OracleError::NoDominance),
            ResolvabilityStatus::DominanceNotTracked => {
                return Err(OracleError::DominanceNotTracked)
            }
            ResolvabilityStatus::DominancePeriodNotMet { remaining } => {
                return Err(OracleError::DominancePeriodNotMet { remaining })
            }
        };

        let outcome = Outcome::from(side);
        let result = match outcome {
            Outcome::ProposerWins => self.proposed()?.result.clone(),
            Outcome::DisputerWins => Bytes::new(),
        };
        self.dispute_resolution(outcome, result, ResolutionPath::Dominance, now)
    }

    /// Plans the arbitration authority's ruling on an escalated dispute. The
    /// caller is responsible for checking the authority before planning.
    pub fn admin_resolve(&self, outcome: Outcome, result: Bytes, now: u64) -> Result<Transition> {
        self.expect_state(RequestState::Escalated)?;
        self.dispute_resolution(outcome, result, ResolutionPath::Arbitration, now)
    }

    /// Plans the payout of `caller`'s winnings.
    pub fn claim_winnings(&self, caller: Address) -> Result<Transition> {
        let amount = self.claimable(caller)?;
        Ok(Transition::Claimed {
            voter: caller,
            payout: Transfer::Credit {
                payee: caller,
                amount,
            },
        })
    }

    /// Checks that a planned `transition` still fits the ledger as it is now.
    /// A plan that no longer fits fails here instead of moving value.
    pub fn verify(&self, transition: &Transition) -> Result<()> {
        match transition {
            Transition::Initialized { .. } if self.request.is_some() => {
                return Err(OracleError::AlreadyInitialized)
            }
            Transition::Resolved { resolution, .. }
                if resolution.path == ResolutionPath::Dominance =>
            {
                self.expect_state(RequestState::Disputed)?;
                match self.can_resolve_dispute(resolution.resolved_at) {
                    ResolvabilityStatus::Resolvable(side)
                        if Outcome::from(side) == resolution.outcome => {}
                    _ => return Err(OracleError::StaleTransition),
                }
            }
            Transition::Voted {
                side,
                amount,
                proposer_pool,
                disputer_pool,
                ..
            } => {
                self.expect_state(RequestState::Disputed)?;
                let expected = pools_after_vote(self.disputed()?, *side, *amount)?;
                if expected != (*proposer_pool, *disputer_pool) {
                    return Err(OracleError::StaleTransition);
                }
            }
            Transition::Claimed { voter, .. } => {
                self.expect_state(RequestState::Resolved)?;
                match self.voters.get(voter) {
                    Some(stake) if stake.claimed => return Err(OracleError::AlreadyClaimed),
                    Some(_) => {}
                    None => return Err(OracleError::NothingToClaim),
                }
            }
            _ => {}
        }
        self.expect_state(transition.required_state())
    }

    /// Installs a planned transition and records it in the history. Callers
    /// must [Self::verify] it first.
    pub(crate) fn apply(&mut self, transition: Transition) {
        match &transition {
            Transition::Initialized {
                request, config, ..
            } => {
                self.request = Some(request.clone());
                self.config = Some(*config);
            }
            Transition::Proposed { proposal, .. } => {
                self.proposal = Some(proposal.clone());
            }
            Transition::Disputed { dispute, .. } => {
                self.dispute = Some(dispute.clone());
            }
            Transition::Voted {
                voter,
                side,
                amount,
                proposer_pool,
                disputer_pool,
                dominance,
                ..
            } => {
                if let Some(dispute) = self.dispute.as_mut() {
                    dispute.proposer_stake = *proposer_pool;
                    dispute.disputer_stake = *disputer_pool;
                    dispute.dominance = *dominance;
                }
                let stake = self.voters.entry(*voter).or_default();
                match side {
                    Side::Proposer => {
                        stake.proposer_stake = stake.proposer_stake.saturating_add(*amount)
                    }
                    Side::Disputer => {
                        stake.disputer_stake = stake.disputer_stake.saturating_add(*amount)
                    }
                }
            }
            Transition::Resolved { resolution, .. } => {
                if let Some(dispute) = self.dispute.as_mut() {
                    dispute.outcome = Some(resolution.outcome);
                }
                self.resolution = Some(resolution.clone());
            }
            Transition::Claimed { voter, .. } => {
                if let Some(stake) = self.voters.get_mut(voter) {
                    stake.claimed = true;
                }
            }
        }

        if let (Some(next), Some(request)) = (transition.target(), self.request.as_mut()) {
            debug_assert!(
                request.state == next || request.state.can_advance_to(next),
                "illegal transition {} -> {next}",
                request.state
            );
            request.state = next;
        }
        self.history.push(transition);
    }

    fn dispute_resolution(
        &self,
        outcome: Outcome,
        result: Bytes,
        path: ResolutionPath,
        now: u64,
    ) -> Result<Transition> {
        let (request, _) = self.funded()?;
        let payee = match outcome {
            Outcome::ProposerWins => self.proposed()?.proposer,
            Outcome::DisputerWins => self.disputed()?.disputer,
        };

        Ok(Transition::Resolved {
            resolution: Resolution {
                outcome,
                result,
                resolved_at: now,
                path,
            },
            payout: Transfer::Credit {
                payee,
                amount: payout::dispute_payout(request.reward, request.bond)?,
            },
        })
    }

    fn expect_state(&self, expected: RequestState) -> Result<()> {
        if self.state() == expected {
            Ok(())
        } else {
            Err(self.invalid(expected))
        }
    }

    fn invalid(&self, expected: RequestState) -> OracleError {
        OracleError::InvalidState {
            current: self.state(),
            expected,
        }
    }

    fn funded(&self) -> Result<(&Request, &VersionedConfig)> {
        match (&self.request, &self.config) {
            (Some(request), Some(config)) => Ok((request, config)),
            _ => Err(self.invalid(RequestState::Initialized)),
        }
    }

    fn proposed(&self) -> Result<&Proposal> {
        self.proposal
            .as_ref()
            .ok_or_else(|| self.invalid(RequestState::Proposed))
    }

    fn disputed(&self) -> Result<&Dispute> {
        self.dispute
            .as_ref()
            .ok_or_else(|| self.invalid(RequestState::Disputed))
    }
}

/// Returns the `(proposer, disputer)` pool totals once `amount` is added to `side`.
fn pools_after_vote(dispute: &Dispute, side: Side, amount: U256) -> Result<(U256, U256)> {
    let (mut proposer_pool, mut disputer_pool) = (dispute.proposer_stake, dispute.disputer_stake);
    let pool = match side {
        Side::Proposer => &mut proposer_pool,
        Side::Disputer => &mut disputer_pool,
    };
    *pool = pool.checked_add(amount).ok_or(OracleError::Overflow)?;
    Ok((proposer_pool, disputer_pool))
}

fn non_zero_address(address: Address) -> Result<()> {
    if address.is_zero() {
        return Err(OracleError::ZeroAddress);
    }
    Ok(())
}

#[cfg(test)]
mod test {
    use super::*;
    use alloy_primitives::B256;
    use proptest::prelude::*;
    use verdict_primitives::OracleConfig;

    const LIVENESS: u64 = 100;
    const DOMINANCE: u64 = 50;

    fn u(v: u64) -> U256 {
        U256::from(v)
    }

    fn addr(byte: u8) -> Address {
        Address::repeat_byte(byte)
    }

    fn config() -> VersionedConfig {
        VersionedConfig::try_new(0, OracleConfig::new(LIVENESS, DOMINANCE, u(10_000))).unwrap()
    }

    /// Plans against the ledger and applies the result, panicking on a failed plan.
    fn step(ledger: &mut RequestLedger, plan: impl FnOnce(&RequestLedger) -> Result<Transition>) {
        let transition = plan(ledger).unwrap();
        ledger.apply(transition);
    }

    fn disputed() -> RequestLedger {
        let mut ledger = RequestLedger::new(B256::repeat_byte(7), addr(0xee));
        step(&mut ledger, |l| {
            l.initialize(addr(1), u(100), u(50), Bytes::from_static(b"q"), config(), 0)
        });
        step(&mut ledger, |l| l.propose(addr(2), Bytes::from_static(b"yes"), 10));
        step(&mut ledger, |l| l.dispute(addr(3), 20));
        ledger
    }

    #[test]
    fn initialize_guards() {
        let ledger = RequestLedger::new(B256::ZERO, addr(0xee));
        assert!(matches!(
            ledger.initialize(addr(1), U256::ZERO, u(1), Bytes::new(), config(), 0),
            Err(OracleError::ZeroAmount)
        ));
        assert!(matches!(
            ledger.initialize(addr(1), u(1), U256::ZERO, Bytes::new(), config(), 0),
            Err(OracleError::ZeroAmount)
        ));
        assert!(matches!(
            ledger.initialize(Address::ZERO, u(1), u(1), Bytes::new(), config(), 0),
            Err(OracleError::ZeroAddress)
        ));
        let bad = VersionedConfig {
            version: 0,
            config: OracleConfig::new(LIVENESS, 0, u(1)),
        };
        assert!(matches!(
            ledger.initialize(addr(1), u(1), u(1), Bytes::new(), bad, 0),
            Err(OracleError::InvalidConfig(_))
        ));

        let mut ledger = ledger;
        step(&mut ledger, |l| {
            l.initialize(addr(1), u(1), u(1), Bytes::new(), config(), 0)
        });
        assert!(matches!(
            ledger.initialize(addr(1), u(1), u(1), Bytes::new(), config(), 0),
            Err(OracleError::AlreadyInitialized)
        ));
    }

    #[test]
    fn planning_does_not_mutate() {
        let ledger = disputed();
        let before = ledger.history().len();
        let _ = ledger.vote(addr(4), Side::Proposer, u(10), 30).unwrap();
        assert_eq!(ledger.history().len(), before);
        assert_eq!(ledger.dispute_record().unwrap().proposer_stake, U256::ZERO);
    }

    #[test]
    fn liveness_boundaries() {
        let mut ledger = RequestLedger::new(B256::ZERO, addr(0xee));
        step(&mut ledger, |l| {
            l.initialize(addr(1), u(100), u(50), Bytes::new(), config(), 0)
        });
        step(&mut ledger, |l| l.propose(addr(2), Bytes::from_static(b"yes"), 10));
        let deadline = ledger.proposal().unwrap().liveness_ends_at;
        assert_eq!(deadline, 10 + LIVENESS);

        assert!(ledger.dispute(addr(3), deadline - 1).is_ok());
        assert!(matches!(
            ledger.dispute(addr(3), deadline),
            Err(OracleError::LivenessEnded)
        ));
        assert!(matches!(
            ledger.resolve_undisputed(deadline - 1),
            Err(OracleError::LivenessNotEnded)
        ));
        let Transition::Resolved { payout, .. } = ledger.resolve_undisputed(deadline).unwrap()
        else {
            panic!("expected a resolution");
        };
        assert_eq!(
            payout,
            Transfer::Credit {
                payee: addr(2),
                amount: u(150)
            }
        );
    }

    #[test]
    fn invalid_state_reports_both_states() {
        let ledger = disputed();
        match ledger.propose(addr(9), Bytes::new(), 30) {
            Err(OracleError::InvalidState { current, expected }) => {
                assert_eq!(current, RequestState::Disputed);
                assert_eq!(expected, RequestState::Initialized);
            }
            other => panic!("unexpected {other:?}"),
        }
        assert!(matches!(
            ledger.result(),
            Err(OracleError::InvalidState { .. })
        ));
    }

    #[test]
    fn dominance_resolution_and_claims() {
        let mut ledger = disputed();
        step(&mut ledger, |l| l.vote(addr(4), Side::Proposer, u(2000), 30));
        step(&mut ledger, |l| l.vote(addr(5), Side::Proposer, u(1000), 31));
        step(&mut ledger, |l| l.vote(addr(6), Side::Disputer, u(1000), 32));
        assert_eq!(ledger.dispute_record().unwrap().dominance_started_at(), 30);

        assert_eq!(
            ledger.can_resolve_dispute(79),
            ResolvabilityStatus::DominancePeriodNotMet { remaining: 1 }
        );
        assert!(matches!(
            ledger.resolve_dispute(79),
            Err(OracleError::DominancePeriodNotMet { remaining: 1 })
        ));
        step(&mut ledger, |l| l.resolve_dispute(80));

        assert_eq!(ledger.state(), RequestState::Resolved);
        assert_eq!(ledger.dispute_record().unwrap().outcome, Some(Outcome::ProposerWins));
        assert_eq!(ledger.result().unwrap(), &Bytes::from_static(b"yes"));
        assert_eq!(ledger.claimable(addr(4)).unwrap(), u(2666));
        assert_eq!(ledger.claimable(addr(5)).unwrap(), u(1333));
        assert!(matches!(
            ledger.claimable(addr(6)),
            Err(OracleError::NothingToClaim)
        ));

        step(&mut ledger, |l| l.claim_winnings(addr(4)));
        assert!(matches!(
            ledger.claim_winnings(addr(4)),
            Err(OracleError::AlreadyClaimed)
        ));
    }

    #[test]
    fn resolution_goes_stale_when_dominance_flips() {
        let mut ledger = disputed();
        step(&mut ledger, |l| l.vote(addr(4), Side::Proposer, u(500), 30));
        let resolve = ledger.resolve_dispute(80).unwrap();
        assert!(ledger.verify(&resolve).is_ok());

        step(&mut ledger, |l| l.vote(addr(5), Side::Disputer, u(2_000), 80));
        assert!(matches!(
            ledger.verify(&resolve),
            Err(OracleError::StaleTransition)
        ));
        assert!(matches!(
            RequestLedger::replay(
                ledger.id(),
                ledger.escrow(),
                ledger.history().iter().cloned().chain([resolve]),
            ),
            Err(OracleError::StaleTransition)
        ));
    }

    #[test]
    fn disputer_win_clears_result() {
        let mut ledger = disputed();
        step(&mut ledger, |l| l.vote(addr(4), Side::Disputer, u(500), 30));
        let Transition::Resolved { payout, .. } = ledger.resolve_dispute(80).unwrap() else {
            panic!("expected a resolution");
        };
        assert_eq!(
            payout,
            Transfer::Credit {
                payee: addr(3),
                amount: u(200)
            }
        );
        step(&mut ledger, |l| l.resolve_dispute(80));
        assert!(ledger.result().unwrap().is_empty());
    }

    #[test]
    fn escalates_at_threshold() {
        let mut ledger = disputed();
        step(&mut ledger, |l| l.vote(addr(4), Side::Proposer, u(9_999), 30));
        assert_eq!(ledger.state(), RequestState::Disputed);
        step(&mut ledger, |l| l.vote(addr(5), Side::Disputer, u(1), 31));
        assert_eq!(ledger.state(), RequestState::Escalated);

        assert!(matches!(
            ledger.vote(addr(5), Side::Disputer, u(1), 32),
            Err(OracleError::InvalidState { .. })
        ));
        assert_eq!(ledger.can_resolve_dispute(10_000), ResolvabilityStatus::NotDisputed);
        step(&mut ledger, |l| {
            l.admin_resolve(Outcome::DisputerWins, Bytes::from_static(b"no"), 40)
        });
        assert_eq!(ledger.result().unwrap(), &Bytes::from_static(b"no"));
        assert_eq!(
            ledger.resolution().unwrap().path,
            ResolutionPath::Arbitration
        );
        assert_eq!(ledger.claimable(addr(5)).unwrap(), u(10_000));
    }

    #[test]
    fn replays_history() {
        let mut ledger = disputed();
        step(&mut ledger, |l| l.vote(addr(4), Side::Disputer, u(500), 30));
        step(&mut ledger, |l| l.resolve_dispute(80));
        step(&mut ledger, |l| l.claim_winnings(addr(4)));

        let replayed =
            RequestLedger::replay(ledger.id(), ledger.escrow(), ledger.history().to_vec()).unwrap();
        assert_eq!(replayed.state(), RequestState::Resolved);
        assert_eq!(replayed.dispute_record(), ledger.dispute_record());
        assert_eq!(replayed.voter_stake(addr(4)), ledger.voter_stake(addr(4)));
        assert_eq!(replayed.history(), ledger.history());

        let mut claimed_twice = ledger.history().to_vec();
        claimed_twice.extend(ledger.history().last().cloned());
        assert!(matches!(
            RequestLedger::replay(ledger.id(), ledger.escrow(), claimed_twice),
            Err(OracleError::AlreadyClaimed)
        ));

        let mut voted_twice = ledger.history()[..4].to_vec();
        voted_twice.push(ledger.history()[3].clone());
        assert!(matches!(
            RequestLedger::replay(ledger.id(), ledger.escrow(), voted_twice),
            Err(OracleError::StaleTransition)
        ));

        let mut out_of_order = ledger.history().to_vec();
        out_of_order.swap(1, 2);
        assert!(matches!(
            RequestLedger::replay(ledger.id(), ledger.escrow(), out_of_order),
            Err(OracleError::InvalidState { .. })
        ));
    }

    #[derive(Debug, Clone)]
    enum Op {
        Propose,
        Dispute,
        ResolveUndisputed,
        Vote(bool, u64),
        ResolveDispute,
        AdminResolve(bool),
        Claim(u8),
        Wait(u64),
    }

    fn op() -> impl Strategy<Value = Op> {
        prop_oneof![
            Just(Op::Propose),
            Just(Op::Dispute),
            Just(Op::ResolveUndisputed),
            (any::<bool>(), 1u64..5_000).prop_map(|(p, a)| Op::Vote(p, a)),
            Just(Op::ResolveDispute),
            any::<bool>().prop_map(Op::AdminResolve),
            (1u8..6).prop_map(Op::Claim),
            (1u64..80).prop_map(Op::Wait),
        ]
    }

    proptest! {
        #[test]
        fn state_only_moves_forward(ops in proptest::collection::vec(op(), 1..60)) {
            let mut ledger = RequestLedger::new(B256::ZERO, addr(0xee));
            ledger.apply(
                ledger.initialize(addr(1), u(100), u(50), Bytes::new(), config(), 0).unwrap()
            );
            let mut now = 1u64;
            let mut voter = 10u8;
            let mut claimed_total = U256::ZERO;

            for op in ops {
                let before = ledger.state();
                let plan = match op {
                    Op::Propose => ledger.propose(addr(2), Bytes::from_static(b"yes"), now),
                    Op::Dispute => ledger.dispute(addr(3), now),
                    Op::ResolveUndisputed => ledger.resolve_undisputed(now),
                    Op::Vote(for_proposer, amount) => {
                        voter = voter.wrapping_add(1).max(10);
                        let side = if for_proposer { Side::Proposer } else { Side::Disputer };
                        ledger.vote(addr(voter), side, u(amount), now)
                    }
                    Op::ResolveDispute => ledger.resolve_dispute(now),
                    Op::AdminResolve(proposer_wins) => {
                        let outcome = if proposer_wins {
                            Outcome::ProposerWins
                        } else {
                            Outcome::DisputerWins
                        };
                        ledger.admin_resolve(outcome, Bytes::new(), now)
                    }
                    Op::Claim(offset) => ledger.claim_winnings(addr(10 + offset)),
                    Op::Wait(secs) => {
                        now += secs;
                        continue;
                    }
                };
                if let Ok(transition) = plan {
                    if let Transition::Claimed { payout, .. } = &transition {
                        claimed_total += payout.amount();
                    }
                    ledger.apply(transition);
                }
                let after = ledger.state();
                prop_assert!(after == before || before.can_advance_to(after));

                if let Some(dispute) = ledger.dispute_record() {
                    prop_assert!(claimed_total <= dispute.proposer_stake + dispute.disputer_stake);
                }
            }
        }
    }
}
