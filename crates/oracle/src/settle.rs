//! Settlement moves value for a planned [Transition] and only then applies it.

use crate::{RequestLedger, Transfer, Transition};
use tracing::{debug, info, warn};
use verdict_primitives::{AssetLedger, Result};

impl RequestLedger {
    /// Plans a transition with `plan`, settles it, and returns the transfer it made.
    pub async fn execute<A, F>(&mut self, assets: &A, plan: F) -> Result<Transfer>
    where
        A: AssetLedger + Sync + ?Sized,
        F: FnOnce(&Self) -> Result<Transition>,
    {
        let transition = plan(self)?;
        let transfer = *transition.transfer();
        self.settle(assets, transition).await?;
        Ok(transfer)
    }

    /// Executes the transfer `transition` requires against `assets` and, once
    /// it succeeds, applies the transition. The transition is verified against
    /// the current ledger first, so a plan can be settled at most once. A failed
    /// transfer is returned as [verdict_primitives::OracleError::Ledger] and the
    /// ledger is untouched.
    pub async fn settle<A>(&mut self, assets: &A, transition: Transition) -> Result<()>
    where
        A: AssetLedger + Sync + ?Sized,
    {
        self.verify(&transition)?;
        let escrow = self.escrow();
        match *transition.transfer() {
            Transfer::Debit { payer, amount } => {
                debug!(request = %self.id(), %payer, %amount, "pulling into escrow");
                assets.transfer_from(payer, escrow, amount).await?;
            }
            Transfer::Credit { payee, amount } => {
                debug!(request = %self.id(), %payee, %amount, "paying out of escrow");
                assets.transfer(escrow, payee, amount).await?;
            }
        }

        if let Transition::Voted {
            dominance,
            escalated,
            ..
        } = &transition
        {
            let previous = self.dispute_record().and_then(|d| d.dominance);
            if previous != *dominance {
                debug!(
                    request = %self.id(),
                    previous = ?previous,
                    current = ?dominance,
                    "dominance timer changed"
                );
            }
            if *escalated {
                warn!(request = %self.id(), "dispute stake reached escalation threshold");
            }
        }

        info!(
            request = %self.id(),
            transition = transition.name(),
            amount = %transition.transfer().amount(),
            "applied transition"
        );
        self.apply(transition);
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use crate::{mocks::InMemoryLedger, RequestLedger};
    use alloy_primitives::{Address, Bytes, B256, U256};
    use verdict_primitives::{OracleConfig, OracleError, RequestState, Side, VersionedConfig};

    fn u(v: u64) -> U256 {
        U256::from(v)
    }

    fn addr(byte: u8) -> Address {
        Address::repeat_byte(byte)
    }

    #[tokio::test]
    async fn failed_transfer_leaves_ledger_untouched() {
        let assets = InMemoryLedger::default();
        let requester = Address::repeat_byte(1);
        let mut ledger = RequestLedger::new(B256::ZERO, Address::repeat_byte(0xee));
        let config = VersionedConfig::try_new(0, OracleConfig::default()).unwrap();

        let plan = ledger
            .initialize(requester, U256::from(100), U256::from(50), Bytes::new(), config, 0)
            .unwrap();
        let err = ledger.settle(&assets, plan.clone()).await.unwrap_err();
        assert!(matches!(err, OracleError::Ledger(_)));
        assert_eq!(ledger.state(), RequestState::Uninitialized);
        assert!(ledger.history().is_empty());

        assets.mint(requester, U256::from(100));
        ledger.settle(&assets, plan).await.unwrap();
        assert_eq!(ledger.state(), RequestState::Initialized);
        assert_eq!(assets.balance_of(requester), U256::ZERO);
        assert_eq!(assets.balance_of(ledger.escrow()), U256::from(100));
    }

    #[tokio::test]
    async fn settled_plans_cannot_be_replayed() {
        let assets = InMemoryLedger::default();
        let escrow = addr(0xee);
        for (account, amount) in [(1, 100), (2, 50), (3, 50), (4, 3_000), (5, 1_000)] {
            assets.mint(addr(account), u(amount));
        }
        // Funds held for other requests sharing the same escrow.
        assets.mint(escrow, u(10_000));

        let mut ledger = RequestLedger::new(B256::ZERO, escrow);
        let config =
            VersionedConfig::try_new(0, OracleConfig::new(100, 50, u(1_000_000))).unwrap();
        ledger
            .execute(&assets, |l| {
                l.initialize(addr(1), u(100), u(50), Bytes::new(), config, 0)
            })
            .await
            .unwrap();
        ledger
            .execute(&assets, |l| l.propose(addr(2), Bytes::from_static(b"yes"), 0))
            .await
            .unwrap();
        ledger
            .execute(&assets, |l| l.dispute(addr(3), 1))
            .await
            .unwrap();

        let vote = ledger.vote(addr(4), Side::Proposer, u(3_000), 2).unwrap();
        ledger.settle(&assets, vote.clone()).await.unwrap();
        assert!(matches!(
            ledger.settle(&assets, vote).await,
            Err(OracleError::StaleTransition)
        ));
        assert_eq!(assets.balance_of(addr(4)), U256::ZERO);

        ledger
            .execute(&assets, |l| l.vote(addr(5), Side::Disputer, u(1_000), 3))
            .await
            .unwrap();
        ledger
            .execute(&assets, |l| l.resolve_dispute(100))
            .await
            .unwrap();

        let claim = ledger.claim_winnings(addr(4)).unwrap();
        ledger.settle(&assets, claim.clone()).await.unwrap();
        assert_eq!(assets.balance_of(addr(4)), u(4_000));
        assert!(matches!(
            ledger.settle(&assets, claim).await,
            Err(OracleError::AlreadyClaimed)
        ));
        assert_eq!(assets.balance_of(addr(4)), u(4_000));
        assert_eq!(assets.balance_of(escrow), u(10_000));
        assert_eq!(ledger.history().len(), 7);
    }
}
