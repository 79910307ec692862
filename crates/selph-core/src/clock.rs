//! Injectable wall clock

use chrono::{DateTime, Local, Timelike, Utc};

pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;

    /// Local hour of day, 0-23.
    fn hour(&self) -> u32;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }

    fn hour(&self) -> u32 {
        Local::now().hour()
    }
}

/// A clock pinned to one hour. `now()` still advances so timestamps stay ordered.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock {
    hour: u32,
}

impl FixedClock {
    pub fn at_hour(hour: u32) -> Self {
        Self { hour: hour % 24 }
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }

    fn hour(&self) -> u32 {
        self.hour
    }
}
