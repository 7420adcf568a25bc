//! Per-day snapshots and the run's time series.
//!
//! One snapshot is published for day 0 (the seeded state) and one after
//! every completed day step. The series is append-only.

use crate::types::Day;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct DaySnapshot {
    pub day:         Day,
    pub susceptible: usize,
    pub infected:    usize,
    pub recovered:   usize,
    /// Highest `infected` seen up to and including this day.
    pub peak:        usize,
}

impl DaySnapshot {
    pub fn total(&self) -> usize {
        self.susceptible + self.infected + self.recovered
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct TimeSeries {
    entries: Vec<DaySnapshot>,
}

impl TimeSeries {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn push(&mut self, snapshot: DaySnapshot) {
        debug_assert!(
            self.entries.last().map_or(true, |last| last.day < snapshot.day),
            "time series must stay in day order"
        );
        self.entries.push(snapshot);
    }

    pub(crate) fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn last(&self) -> Option<&DaySnapshot> {
        self.entries.last()
    }

    pub fn get(&self, day: Day) -> Option<&DaySnapshot> {
        self.entries.iter().find(|s| s.day == day)
    }

    pub fn iter(&self) -> impl Iterator<Item = &DaySnapshot> {
        self.entries.iter()
    }

    pub fn as_slice(&self) -> &[DaySnapshot] {
        &self.entries
    }

    // Plotting columns.

    pub fn susceptible(&self) -> Vec<usize> {
        self.entries.iter().map(|s| s.susceptible).collect()
    }

    pub fn infected(&self) -> Vec<usize> {
        self.entries.iter().map(|s| s.infected).collect()
    }

    pub fn recovered(&self) -> Vec<usize> {
        self.entries.iter().map(|s| s.recovered).collect()
    }

    /// Highest infected count anywhere in the series.
    pub fn max_infected(&self) -> usize {
        self.entries.iter().map(|s| s.infected).max().unwrap_or(0)
    }
}

impl<'a> IntoIterator for &'a TimeSeries {
    type Item = &'a DaySnapshot;
    type IntoIter = std::slice::Iter<'a, DaySnapshot>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}
