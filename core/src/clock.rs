//! Simulation clock: owns the day counter and the remaining day budget.

use crate::types::Day;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SimClock {
    pub current_day:    Day,
    pub max_days:       Day,
    pub days_remaining: Day,
}

impl SimClock {
    pub fn new(max_days: Day) -> Self {
        Self {
            current_day: 0,
            max_days,
            days_remaining: max_days,
        }
    }

    /// Advance one day. Returns the new day number.
    /// Panics if the budget is already spent. `SimEngine::advance_day_with`
    /// rejects terminal runs first, and a spent budget always ends the run.
    pub fn advance(&mut self) -> Day {
        assert!(self.days_remaining > 0, "advance() called with no days remaining");
        self.days_remaining -= 1;
        self.current_day += 1;
        self.current_day
    }

    pub fn is_exhausted(&self) -> bool {
        self.days_remaining == 0
    }

    /// Back to day 0 with the full budget.
    pub fn rewind(&mut self) {
        *self = Self::new(self.max_days);
    }
}
