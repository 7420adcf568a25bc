//! The event stream: everything a renderer may observe.
//!
//! RULE: Consumers only ever see events and published snapshots.
//! Nothing outside the engine reads or writes simulation state directly.

use crate::{
    engine::RunStatus,
    population::HealthState,
    snapshot::DaySnapshot,
    types::{Day, IndividualId, RunId},
};
use serde::{Deserialize, Serialize};
use std::sync::mpsc::Sender;

/// Every event emitted during a run.
/// Variants may be added, never removed or reordered.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SimEvent {
    // ── Run lifecycle ──────────────────────────────
    RunInitialized {
        run_id: RunId,
        seed: u64,
        population_size: usize,
        initial_infected: usize,
    },
    RunReset {
        run_id: RunId,
        generation: u32,
    },
    RunEnded {
        day: Day,
        status: RunStatus,
    },

    // ── Population ─────────────────────────────────
    InfectionSeeded {
        individual: IndividualId,
    },
    StateChanged {
        day: Day,
        individual: IndividualId,
        state: HealthState,
    },

    // ── Day step ───────────────────────────────────
    DayCompleted {
        snapshot: DaySnapshot,
    },
}

impl SimEvent {
    /// Stable string name for the variant, matching its serde tag.
    pub fn type_name(&self) -> &'static str {
        match self {
            SimEvent::RunInitialized { .. }  => "run_initialized",
            SimEvent::RunReset { .. }        => "run_reset",
            SimEvent::RunEnded { .. }        => "run_ended",
            SimEvent::InfectionSeeded { .. } => "infection_seeded",
            SimEvent::StateChanged { .. }    => "state_changed",
            SimEvent::DayCompleted { .. }    => "day_completed",
        }
    }
}

/// Receives events the moment they happen.
pub trait EventSink {
    fn emit(&mut self, event: SimEvent);
}

impl EventSink for Vec<SimEvent> {
    fn emit(&mut self, event: SimEvent) {
        self.push(event);
    }
}

/// A hung-up receiver is not an error for the simulation; the event is dropped.
impl EventSink for Sender<SimEvent> {
    fn emit(&mut self, event: SimEvent) {
        let _ = self.send(event);
    }
}

/// Drops every event. For drivers that only want snapshots.
#[derive(Debug, Default, Clone, Copy)]
pub struct Discard;

impl EventSink for Discard {
    fn emit(&mut self, _event: SimEvent) {}
}
