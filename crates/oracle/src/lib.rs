#![doc = include_str!("../README.md")]

extern crate verdict_primitives;

mod types;
pub use types::{ResolvabilityStatus, Transfer, Transition};

pub mod dominance;
pub mod payout;

mod ledger;
pub use ledger::RequestLedger;

mod settle;

mod clock;
pub use clock::SystemClock;

mod authority;
pub use authority::SharedAdmin;

mod hub;
pub use hub::OracleHub;

mod instance;
pub use instance::OracleInstance;

mod factory;
pub use factory::{RequestFactory, SharedInstance};

pub mod mocks;

pub mod prelude {
    pub use super::{
        OracleHub, OracleInstance, RequestFactory, RequestLedger, ResolvabilityStatus,
        SharedAdmin, SystemClock, Transfer, Transition,
    };
    pub use verdict_primitives::*;
}
