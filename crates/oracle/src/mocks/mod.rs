//! In-memory implementations of the collaborator traits for testing.

mod ledger;
pub use self::ledger::InMemoryLedger;

mod clock;
pub use self::clock::MockClock;
