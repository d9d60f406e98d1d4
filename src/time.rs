//! clock abstraction separating "what time is it" from the components that
//! stamp records and compute trigger times, so tests can pin the clock

use chrono::{DateTime, Local, NaiveDateTime, Utc};

/// source of the current time
///
/// `now_utc` stamps persisted records, `now_local` is the wall clock the
/// next-trigger arithmetic runs against.
pub trait Clock: Send + Sync {
    fn now_utc(&self) -> DateTime<Utc>;
    fn now_local(&self) -> NaiveDateTime;
}

/// real clock used outside of tests
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_utc(&self) -> DateTime<Utc> {
        Utc::now()
    }

    fn now_local(&self) -> NaiveDateTime {
        Local::now().naive_local()
    }
}

/// clock pinned to one instant, for deterministic tests
#[derive(Debug, Clone, Copy)]
pub struct FixedClock {
    now: NaiveDateTime,
}

impl FixedClock {
    #[must_use]
    pub const fn new(now: NaiveDateTime) -> Self {
        Self { now }
    }
}

impl Clock for FixedClock {
    fn now_utc(&self) -> DateTime<Utc> {
        self.now.and_utc()
    }

    fn now_local(&self) -> NaiveDateTime {
        self.now
    }
}
