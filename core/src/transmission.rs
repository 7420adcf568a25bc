//! The day step: recovery and transmission for one simulated day.
//!
//! EXECUTION ORDER (fixed, documented, never reordered):
//!   Individuals are visited once each, in index order 0..N, and
//!   mutated in place. For individual i:
//!   1. Recovery     : infected i recovers with probability gamma.
//!   2. Symptomatic  : i (if symptomatic and still within its infectious
//!                      window) makes alpha contacts, infecting susceptible
//!                      contacts with probability rho; then its
//!                      days-infected counter advances.
//!   3. Asymptomatic : i (if asymptomatic) makes alpha contacts, infecting
//!                      susceptible contacts with probability rho * factor.
//!   4. Exposure     : i (if susceptible) makes alpha contacts and may be
//!                      infected by an infected contact, at most once.
//!
//! RNG DRAW ORDER per individual, all from the transmission stream:
//!   recovery roll (infected only); then per contact: the contact pick,
//!   the transmission roll (only for an eligible pair), and the
//!   symptomatic/asymptomatic split roll (only on a successful transmission).
//!
//! Because the pass mutates in place, an individual infected earlier in
//! the pass is already infected when later individuals read it, and is
//! itself processed normally if its index has not been reached yet.

use crate::{
    config::SimConfig,
    event::{EventSink, SimEvent},
    population::{HealthState, Population},
    rng::SimRng,
    types::{Day, IndividualId},
};

/// The parameters the day step reads, resolved from a `SimConfig`.
///
/// Not validated: the engine validates its config, while tests may
/// drive degenerate values (e.g. `alpha == 0`) directly.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DayParams {
    pub alpha:                       u32,
    pub rho:                         f64,
    pub asymptomatic_rho:            f64,
    pub gamma:                       f64,
    pub asymptomatic_fraction:       f64,
    pub symptomatic_infectious_days: u32,
}

impl From<&SimConfig> for DayParams {
    fn from(config: &SimConfig) -> Self {
        Self {
            alpha:                       config.alpha,
            rho:                         config.rho,
            asymptomatic_rho:            config.asymptomatic_rho(),
            gamma:                       config.gamma,
            asymptomatic_fraction:       config.asymptomatic_fraction,
            symptomatic_infectious_days: config.symptomatic_infectious_days,
        }
    }
}

/// What changed during one day step.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DayTally {
    pub new_infections: usize,
    pub new_recoveries: usize,
}

struct DayStep<'a, S: EventSink> {
    population: &'a mut Population,
    params:     &'a DayParams,
    rng:        &'a mut SimRng,
    sink:       &'a mut S,
    day:        Day,
    tally:      DayTally,
}

/// Runs one full day step over `population`, emitting a `StateChanged`
/// event for every transition as it happens.
pub fn run_day<S: EventSink>(
    population: &mut Population,
    params: &DayParams,
    day: Day,
    rng: &mut SimRng,
    sink: &mut S,
) -> DayTally {
    let mut step = DayStep {
        population,
        params,
        rng,
        sink,
        day,
        tally: DayTally::default(),
    };
    for i in 0..step.population.len() {
        step.visit(i);
    }
    step.tally
}

impl<S: EventSink> DayStep<'_, S> {
    fn visit(&mut self, i: IndividualId) {
        // 1. Recovery
        if self.population.state(i).is_infected() && self.rng.chance(self.params.gamma) {
            self.transition(i, HealthState::Recovered);
            self.tally.new_recoveries += 1;
        }

        // 2. Symptomatic spread, limited to the infectious window.
        if self.population.state(i) == HealthState::InfectedSymptomatic {
            if self.population.days_infected(i) <= self.params.symptomatic_infectious_days {
                self.spread_from(i, self.params.rho);
            }
            self.population.increment_days_infected(i);
        }

        // 3. Asymptomatic spread, for as long as the infection lasts.
        if self.population.state(i) == HealthState::InfectedAsymptomatic {
            self.spread_from(i, self.params.asymptomatic_rho);
        }

        // 4. Exposure of a susceptible individual.
        if self.population.state(i) == HealthState::Susceptible {
            self.expose(i);
        }
    }

    /// `source` contacts alpha others; every susceptible contact may be infected.
    fn spread_from(&mut self, source: IndividualId, p: f64) {
        for _ in 0..self.params.alpha {
            let Some(contact) = self.population.pick_random_contact(source, self.rng) else {
                return;
            };
            if self.population.state(contact) == HealthState::Susceptible && self.rng.chance(p) {
                self.infect(contact);
            }
        }
    }

    /// Susceptible `target` contacts alpha others and is infected at most once.
    /// Contacts are still drawn after infection so the stream stays aligned.
    fn expose(&mut self, target: IndividualId) {
        let mut already_infected = false;
        for _ in 0..self.params.alpha {
            let Some(contact) = self.population.pick_random_contact(target, self.rng) else {
                return;
            };
            if already_infected {
                continue;
            }
            let p = match self.population.state(contact) {
                HealthState::InfectedSymptomatic  => self.params.rho,
                HealthState::InfectedAsymptomatic => self.params.asymptomatic_rho,
                _ => continue,
            };
            if self.rng.chance(p) {
                self.infect(target);
                already_infected = true;
            }
        }
    }

    fn infect(&mut self, target: IndividualId) {
        let state = if self.rng.chance(self.params.asymptomatic_fraction) {
            HealthState::InfectedAsymptomatic
        } else {
            HealthState::InfectedSymptomatic
        };
        self.transition(target, state);
        self.tally.new_infections += 1;
    }

    fn transition(&mut self, individual: IndividualId, state: HealthState) {
        // Only ever called with indices from 0..len.
        let _ = self.population.set_state(individual, state);
        log::trace!("day={} individual={individual} -> {state:?}", self.day);
        self.sink.emit(SimEvent::StateChanged {
            day: self.day,
            individual,
            state,
        });
    }
}
