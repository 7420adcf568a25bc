//! Population model: per-individual health state for a fixed-size population.
//!
//! RULE: Transitions only move forward:
//!   Susceptible → InfectedSymptomatic | InfectedAsymptomatic → Recovered.
//! The only way back to Susceptible is a full rebuild on reset.

use crate::{
    error::{SimError, SimResult},
    rng::SimRng,
    types::IndividualId,
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum HealthState {
    Susceptible,
    InfectedSymptomatic,
    InfectedAsymptomatic,
    Recovered,
}

impl HealthState {
    pub fn is_infected(&self) -> bool {
        matches!(self, Self::InfectedSymptomatic | Self::InfectedAsymptomatic)
    }
}

/// Tally of the population by health state.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct StateCounts {
    pub susceptible:           usize,
    pub infected_symptomatic:  usize,
    pub infected_asymptomatic: usize,
    pub recovered:             usize,
}

impl StateCounts {
    pub fn infected(&self) -> usize {
        self.infected_symptomatic + self.infected_asymptomatic
    }

    pub fn total(&self) -> usize {
        self.susceptible + self.infected() + self.recovered
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Population {
    states:        Vec<HealthState>,
    days_infected: Vec<u32>,
}

impl Population {
    /// A fully susceptible population of `size` individuals.
    pub fn new(size: usize) -> Self {
        Self {
            states:        vec![HealthState::Susceptible; size],
            days_infected: vec![0; size],
        }
    }

    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    pub fn state(&self, index: IndividualId) -> HealthState {
        self.states[index]
    }

    pub fn states(&self) -> &[HealthState] {
        &self.states
    }

    /// Days this individual has spent infected. Meaningful only while infected.
    pub fn days_infected(&self, index: IndividualId) -> u32 {
        self.days_infected[index]
    }

    /// Marks `count` distinct individuals, chosen uniformly at random, as
    /// asymptomatically infected. Returns the chosen indices in draw order.
    ///
    /// Draws `count` indices from the RNG (partial Fisher–Yates).
    pub fn seed_infections(
        &mut self,
        count: usize,
        rng: &mut SimRng,
    ) -> SimResult<Vec<IndividualId>> {
        let n = self.len();
        if count == 0 || count > n {
            return Err(SimError::config(
                "initial_infected",
                format!("must be in [1, {n}], got {count}"),
            ));
        }

        let mut pool: Vec<IndividualId> = (0..n).collect();
        for k in 0..count {
            let pick = k + rng.next_below(n - k);
            pool.swap(k, pick);
        }
        pool.truncate(count);

        for &index in &pool {
            self.states[index] = HealthState::InfectedAsymptomatic;
            self.days_infected[index] = 0;
        }
        Ok(pool)
    }

    /// A uniformly random individual other than `excluding`, using a single
    /// draw. `None` when the population is too small to have anyone else.
    pub fn pick_random_contact(
        &self,
        excluding: IndividualId,
        rng: &mut SimRng,
    ) -> Option<IndividualId> {
        let n = self.len();
        if n <= 1 {
            return None;
        }
        let pick = rng.next_below(n - 1);
        Some(if pick >= excluding { pick + 1 } else { pick })
    }

    /// Direct mutation. Only the index is checked.
    pub fn set_state(&mut self, index: IndividualId, new_state: HealthState) -> SimResult<()> {
        let len = self.len();
        let slot = self
            .states
            .get_mut(index)
            .ok_or(SimError::IndexOutOfBounds { index, len })?;
        *slot = new_state;
        Ok(())
    }

    pub(crate) fn increment_days_infected(&mut self, index: IndividualId) {
        self.days_infected[index] += 1;
    }

    pub fn count_by_state(&self) -> StateCounts {
        let mut counts = StateCounts::default();
        for state in &self.states {
            match state {
                HealthState::Susceptible          => counts.susceptible += 1,
                HealthState::InfectedSymptomatic  => counts.infected_symptomatic += 1,
                HealthState::InfectedAsymptomatic => counts.infected_asymptomatic += 1,
                HealthState::Recovered            => counts.recovered += 1,
            }
        }
        counts
    }
}
