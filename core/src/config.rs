use crate::{
    error::{SimError, SimResult},
    types::Day,
};
use serde::{Deserialize, Serialize};

/// Which playground exercise a run is judged against.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum ScenarioMode {
    /// Keep the peak under hospital capacity.
    #[default]
    SocialDistancing,
    /// Keep the peak under capacity AND reach the herd immunity threshold.
    HerdImmunity,
}

/// Everything a run needs besides its seed. Immutable once the engine
/// has been built.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SimConfig {
    /// Daily contacts attempted per individual.
    pub alpha: u32,
    /// Transmission probability per contact with a symptomatic case.
    pub rho: f64,
    pub initial_infected: usize,
    pub max_days: Day,
    pub population_size: usize,
    /// Per-day recovery probability for any infected individual.
    pub gamma: f64,
    /// Probability that a new infection is asymptomatic.
    pub asymptomatic_fraction: f64,
    /// Days after infection during which a symptomatic case still transmits.
    pub symptomatic_infectious_days: u32,
    /// Multiplier on rho for contacts with an asymptomatic case.
    pub asymptomatic_rho_factor: f64,
    pub hospital_capacity: usize,
    /// Percentage of the population that must have recovered.
    pub herd_immunity_threshold: f64,
    pub mode: ScenarioMode,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            alpha:                       24,
            rho:                         0.01,
            initial_infected:            3,
            max_days:                    100,
            population_size:             225, // 15 x 15 grid
            gamma:                       1.0 / 20.0,
            asymptomatic_fraction:       0.2,
            symptomatic_infectious_days: 4,
            asymptomatic_rho_factor:     0.5,
            hospital_capacity:           60,
            herd_immunity_threshold:     50.0,
            mode:                        ScenarioMode::SocialDistancing,
        }
    }
}

impl SimConfig {
    /// The social distancing exercise: average contact rate, judged on peak only.
    pub fn social_distancing() -> Self {
        Self::default()
    }

    /// The herd immunity exercise: fewer contacts, judged on peak and immunity.
    pub fn herd_immunity() -> Self {
        Self {
            alpha: 10,
            mode: ScenarioMode::HerdImmunity,
            ..Self::default()
        }
    }

    /// Small, fast configuration for tests.
    pub fn default_test() -> Self {
        Self {
            alpha: 6,
            rho: 0.05,
            initial_infected: 2,
            max_days: 30,
            population_size: 50,
            hospital_capacity: 20,
            ..Self::default()
        }
    }

    /// Load from a JSON file. Fields missing from the file keep their defaults.
    pub fn load(path: &str) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("Cannot read {path}: {e}"))?;
        let config: SimConfig = serde_json::from_str(&content)
            .map_err(|e| anyhow::anyhow!("Cannot parse {path}: {e}"))?;
        Ok(config)
    }

    /// Checks every field once. Reports the first invalid one.
    pub fn validate(&self) -> SimResult<()> {
        if self.alpha == 0 {
            return Err(SimError::config("alpha", "must be greater than 0"));
        }
        if !(0.0..=1.0).contains(&self.rho) {
            return Err(SimError::config("rho", format!("must be in [0, 1], got {}", self.rho)));
        }
        if self.population_size == 0 {
            return Err(SimError::config("population_size", "must be greater than 0"));
        }
        if self.initial_infected == 0 || self.initial_infected > self.population_size {
            return Err(SimError::config(
                "initial_infected",
                format!(
                    "must be in [1, {}], got {}",
                    self.population_size, self.initial_infected
                ),
            ));
        }
        if self.max_days == 0 {
            return Err(SimError::config("max_days", "must be greater than 0"));
        }
        if !(0.0..=1.0).contains(&self.gamma) {
            return Err(SimError::config("gamma", format!("must be in [0, 1], got {}", self.gamma)));
        }
        if !(0.0..=1.0).contains(&self.asymptomatic_fraction) {
            return Err(SimError::config(
                "asymptomatic_fraction",
                format!("must be in [0, 1], got {}", self.asymptomatic_fraction),
            ));
        }
        if !(0.0..=1.0).contains(&self.asymptomatic_rho_factor) {
            return Err(SimError::config(
                "asymptomatic_rho_factor",
                format!("must be in [0, 1], got {}", self.asymptomatic_rho_factor),
            ));
        }
        if !(0.0..=100.0).contains(&self.herd_immunity_threshold) {
            return Err(SimError::config(
                "herd_immunity_threshold",
                format!("must be a percentage, got {}", self.herd_immunity_threshold),
            ));
        }
        Ok(())
    }

    /// Transmission probability for a contact with an asymptomatic case.
    pub fn asymptomatic_rho(&self) -> f64 {
        self.asymptomatic_rho_factor * self.rho
    }

    /// How many people a single symptomatic case could infect over its
    /// infectious window, rounded to two decimals.
    pub fn theoretical_spread(&self) -> f64 {
        let raw = self.alpha as f64 * self.rho * self.symptomatic_infectious_days as f64;
        (raw * 100.0).round() / 100.0
    }
}
