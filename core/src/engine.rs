//! The simulation engine. Owns the population and drives it one day at a time.
//!
//! STATE MACHINE (per run):
//!   Running → Completed   (day budget exhausted)
//!   Running → Extinct     (no infected left before the budget ran out)
//!   Completed | Extinct → Running only through reset().
//!
//! RULES:
//!   - The engine is the only writer of population and counters.
//!   - Consumers read published snapshots and events, never internals.
//!   - All randomness flows through the RngBank handed in at construction.
//!   - advance_day() either completes a full day or is rejected outright.

use crate::{
    clock::SimClock,
    config::SimConfig,
    error::{SimError, SimResult},
    event::{Discard, EventSink, SimEvent},
    outcome::{evaluate, immunity_percent, OutcomeThresholds, RunSummary},
    population::Population,
    rng::{RngBank, SimRng, StreamSlot},
    snapshot::{DaySnapshot, TimeSeries},
    transmission::{run_day, DayParams},
    types::{Day, RunId},
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    Running,
    Completed,
    Extinct,
}

impl RunStatus {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Running)
    }
}

/// Aggregate compartment counts. `susceptible + infected + recovered == N`.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct SirCounts {
    pub susceptible: usize,
    pub infected:    usize,
    pub recovered:   usize,
}

/// The result of one `advance_day()` call.
#[derive(Debug, Clone, PartialEq)]
pub struct DayReport {
    pub snapshot: DaySnapshot,
    /// Every event emitted during the day, in emission order.
    pub events:   Vec<SimEvent>,
}

pub struct SimEngine {
    pub run_id:       RunId,
    config:           SimConfig,
    params:           DayParams,
    rng_bank:         RngBank,
    seeding_rng:      SimRng,
    transmission_rng: SimRng,
    clock:            SimClock,
    population:       Population,
    counts:           SirCounts,
    peak:             usize,
    status:           RunStatus,
    series:           TimeSeries,
    generation:       u32,
}

impl SimEngine {
    /// Validate `config`, seed the initial infections and publish day 0.
    pub fn new(run_id: RunId, config: SimConfig, rng_bank: RngBank) -> SimResult<Self> {
        Self::new_with(run_id, config, rng_bank, &mut Discard)
    }

    pub fn from_seed(run_id: RunId, config: SimConfig, seed: u64) -> SimResult<Self> {
        Self::new(run_id, config, RngBank::new(seed))
    }

    /// Like `new()`, but the initialization and seeding events reach `sink`.
    pub fn new_with<S: EventSink>(
        run_id: RunId,
        config: SimConfig,
        rng_bank: RngBank,
        sink: &mut S,
    ) -> SimResult<Self> {
        config.validate()?;

        let mut engine = Self {
            params:           DayParams::from(&config),
            seeding_rng:      rng_bank.for_stream(StreamSlot::Seeding),
            transmission_rng: rng_bank.for_stream(StreamSlot::Transmission),
            clock:            SimClock::new(config.max_days),
            population:       Population::new(config.population_size),
            counts:           SirCounts::default(),
            peak:             0,
            status:           RunStatus::Running,
            series:           TimeSeries::new(),
            generation:       0,
            rng_bank,
            config,
            run_id,
        };

        sink.emit(SimEvent::RunInitialized {
            run_id:           engine.run_id.clone(),
            seed:             engine.rng_bank.master_seed(),
            population_size:  engine.config.population_size,
            initial_infected: engine.config.initial_infected,
        });
        engine.seed(sink)?;

        log::info!(
            "run={} initialized: seed={} N={} I0={} alpha={} rho={} days={}",
            engine.run_id,
            engine.rng_bank.master_seed(),
            engine.config.population_size,
            engine.config.initial_infected,
            engine.config.alpha,
            engine.config.rho,
            engine.config.max_days,
        );
        Ok(engine)
    }

    /// Advance one day, collecting the day's events.
    pub fn advance_day(&mut self) -> SimResult<DayReport> {
        let mut events: Vec<SimEvent> = Vec::new();
        let snapshot = self.advance_day_with(&mut events)?;
        Ok(DayReport { snapshot, events })
    }

    /// Advance one day. This is the core simulation step.
    ///
    /// State changes reach `sink` as they happen; the day's snapshot is
    /// emitted only after every individual has been processed.
    pub fn advance_day_with<S: EventSink>(&mut self, sink: &mut S) -> SimResult<DaySnapshot> {
        if self.status.is_terminal() {
            return Err(SimError::InvalidState { status: self.status });
        }

        let day = self.clock.current_day + 1;
        let tally = run_day(
            &mut self.population,
            &self.params,
            day,
            &mut self.transmission_rng,
            sink,
        );
        self.clock.advance();

        self.counts.susceptible -= tally.new_infections;
        self.counts.infected = self.counts.infected + tally.new_infections - tally.new_recoveries;
        self.counts.recovered += tally.new_recoveries;
        debug_assert_eq!(
            self.counts.infected,
            self.population.count_by_state().infected(),
            "aggregate counts drifted from population"
        );

        self.peak = self.peak.max(self.counts.infected);
        let snapshot = self.publish(day);
        sink.emit(SimEvent::DayCompleted { snapshot });

        log::debug!(
            "run={} day={day} S={} I={} R={} peak={} (+{} infected, +{} recovered)",
            self.run_id,
            snapshot.susceptible,
            snapshot.infected,
            snapshot.recovered,
            snapshot.peak,
            tally.new_infections,
            tally.new_recoveries,
        );

        if self.counts.infected == 0 {
            self.finish(RunStatus::Extinct, sink);
        } else if self.clock.is_exhausted() {
            self.finish(RunStatus::Completed, sink);
        }

        Ok(snapshot)
    }

    /// Advance until the run reaches a terminal state.
    pub fn run_to_end<S: EventSink>(&mut self, sink: &mut S) -> SimResult<RunSummary> {
        while !self.status.is_terminal() {
            self.advance_day_with(sink)?;
        }
        self.summary().ok_or_else(|| anyhow::anyhow!("terminal run without summary").into())
    }

    /// Rerun from the original configuration: fresh population, the same
    /// `initial_infected` count, new random seeding, cleared series.
    pub fn reset(&mut self) -> SimResult<()> {
        self.reset_with(&mut Discard)
    }

    pub fn reset_with<S: EventSink>(&mut self, sink: &mut S) -> SimResult<()> {
        self.generation += 1;
        sink.emit(SimEvent::RunReset {
            run_id: self.run_id.clone(),
            generation: self.generation,
        });
        self.seed(sink)?;
        log::info!("run={} reset (generation {})", self.run_id, self.generation);
        Ok(())
    }

    /// End-of-run statistics. `None` while the run is still going.
    pub fn summary(&self) -> Option<RunSummary> {
        if !self.status.is_terminal() {
            return None;
        }
        let immunity = immunity_percent(self.counts.recovered, self.config.population_size);
        Some(RunSummary {
            run_id:           self.run_id.clone(),
            days_run:         self.clock.current_day,
            peak:             self.peak,
            immunity_percent: immunity,
            ended_early:      self.status == RunStatus::Extinct && !self.clock.is_exhausted(),
            status:           self.status,
            outcome:          evaluate(self.peak, immunity, &OutcomeThresholds::from(&self.config)),
        })
    }

    pub fn status(&self) -> RunStatus {
        self.status
    }

    pub fn counts(&self) -> SirCounts {
        self.counts
    }

    pub fn peak(&self) -> usize {
        self.peak
    }

    pub fn day(&self) -> Day {
        self.clock.current_day
    }

    pub fn clock(&self) -> &SimClock {
        &self.clock
    }

    pub fn series(&self) -> &TimeSeries {
        &self.series
    }

    pub fn population(&self) -> &Population {
        &self.population
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    pub fn seed_value(&self) -> u64 {
        self.rng_bank.master_seed()
    }

    /// How many times `reset()` has been called.
    pub fn generation(&self) -> u32 {
        self.generation
    }

    // Rebuilds population, counters, clock and series, then publishes day 0.
    // The seeding stream is not rewound, so every rerun seeds differently.
    fn seed<S: EventSink>(&mut self, sink: &mut S) -> SimResult<()> {
        let n = self.config.population_size;
        let initial = self.config.initial_infected;

        self.population = Population::new(n);
        let seeded = self.population.seed_infections(initial, &mut self.seeding_rng)?;
        for individual in seeded {
            sink.emit(SimEvent::InfectionSeeded { individual });
        }

        self.counts = SirCounts {
            susceptible: n - initial,
            infected:    initial,
            recovered:   0,
        };
        self.peak = initial;
        self.status = RunStatus::Running;
        self.clock.rewind();
        self.series.clear();

        let snapshot = self.publish(0);
        sink.emit(SimEvent::DayCompleted { snapshot });
        Ok(())
    }

    fn publish(&mut self, day: Day) -> DaySnapshot {
        let snapshot = DaySnapshot {
            day,
            susceptible: self.counts.susceptible,
            infected:    self.counts.infected,
            recovered:   self.counts.recovered,
            peak:        self.peak,
        };
        self.series.push(snapshot);
        snapshot
    }

    fn finish<S: EventSink>(&mut self, status: RunStatus, sink: &mut S) {
        self.status = status;
        let day = self.clock.current_day;
        sink.emit(SimEvent::RunEnded { day, status });
        log::info!(
            "run={} ended day={day} status={status:?} peak={} R={}",
            self.run_id,
            self.peak,
            self.counts.recovered
        );
    }
}
