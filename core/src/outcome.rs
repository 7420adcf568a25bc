//! Outcome evaluation: judges a finished run against hospital capacity
//! and the herd immunity threshold. Pure functions of final statistics.

use crate::{
    config::{ScenarioMode, SimConfig},
    engine::RunStatus,
    types::{Day, RunId},
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    Success,
    PeakExceeded,
    ImmunityNotReached,
    Both,
}

impl Outcome {
    pub fn peak_ok(&self) -> bool {
        matches!(self, Self::Success | Self::ImmunityNotReached)
    }

    pub fn immunity_ok(&self) -> bool {
        matches!(self, Self::Success | Self::PeakExceeded)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct OutcomeThresholds {
    /// Highest peak the hospitals can absorb.
    pub hospital_capacity: usize,
    /// Minimum recovered percentage for herd immunity.
    pub herd_immunity_percent: f64,
}

impl Default for OutcomeThresholds {
    fn default() -> Self {
        Self {
            hospital_capacity: 60,
            herd_immunity_percent: 50.0,
        }
    }
}

impl From<&SimConfig> for OutcomeThresholds {
    fn from(config: &SimConfig) -> Self {
        Self {
            hospital_capacity: config.hospital_capacity,
            herd_immunity_percent: config.herd_immunity_threshold,
        }
    }
}

/// Recovered share of the population, as a percentage.
pub fn immunity_percent(recovered: usize, population_size: usize) -> f64 {
    if population_size == 0 {
        return 0.0;
    }
    recovered as f64 / population_size as f64 * 100.0
}

/// A peak exactly at capacity still counts as handled; immunity exactly
/// at the threshold counts as reached.
pub fn evaluate(peak: usize, immunity_percent: f64, thresholds: &OutcomeThresholds) -> Outcome {
    let peak_ok = peak <= thresholds.hospital_capacity;
    let immunity_ok = immunity_percent >= thresholds.herd_immunity_percent;
    match (peak_ok, immunity_ok) {
        (true, true)   => Outcome::Success,
        (false, true)  => Outcome::PeakExceeded,
        (true, false)  => Outcome::ImmunityNotReached,
        (false, false) => Outcome::Both,
    }
}

/// End-of-run statistics handed to the renderer.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RunSummary {
    pub run_id:           RunId,
    pub days_run:         Day,
    pub peak:             usize,
    pub immunity_percent: f64,
    /// True when the infection died out before the day budget ran out.
    pub ended_early:      bool,
    pub status:           RunStatus,
    pub outcome:          Outcome,
}

impl RunSummary {
    /// Whether the run meets the goal of the given exercise. Social
    /// distancing only cares about the peak.
    pub fn passed(&self, mode: ScenarioMode) -> bool {
        match mode {
            ScenarioMode::SocialDistancing => self.outcome.peak_ok(),
            ScenarioMode::HerdImmunity     => self.outcome == Outcome::Success,
        }
    }
}
