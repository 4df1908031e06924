//! The clock module holds the wall-clock [OracleClock].

use std::time::{SystemTime, UNIX_EPOCH};
use verdict_primitives::OracleClock;

/// The [SystemClock] reads unix seconds from the operating system.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl OracleClock for SystemClock {
    fn now(&self) -> u64 {
        // A clock set before the epoch reads as the epoch.
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or_default()
    }
}
