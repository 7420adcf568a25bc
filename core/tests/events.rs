//! The renderer contract: replaying the event stream alone must rebuild
//! exactly the engine's population and published series.

use epidemic_core::{
    config::SimConfig,
    engine::SimEngine,
    event::SimEvent,
    population::HealthState,
    rng::RngBank,
    snapshot::DaySnapshot,
};

#[derive(Default)]
struct Renderer {
    grid:   Vec<HealthState>,
    series: Vec<DaySnapshot>,
    ended:  usize,
}

impl Renderer {
    fn apply(&mut self, event: &SimEvent) {
        match event {
            SimEvent::RunInitialized { population_size, .. } => {
                self.grid = vec![HealthState::Susceptible; *population_size];
            }
            SimEvent::RunReset { .. } => {
                self.grid.fill(HealthState::Susceptible);
                self.series.clear();
            }
            SimEvent::InfectionSeeded { individual } => {
                self.grid[*individual] = HealthState::InfectedAsymptomatic;
            }
            SimEvent::StateChanged { individual, state, .. } => {
                self.grid[*individual] = *state;
            }
            SimEvent::DayCompleted { snapshot } => self.series.push(*snapshot),
            SimEvent::RunEnded { .. } => self.ended += 1,
        }
    }
}

#[test]
fn replaying_events_rebuilds_engine_state() {
    let mut events: Vec<SimEvent> = Vec::new();
    let mut engine = SimEngine::new_with(
        "replay".into(),
        SimConfig { rho: 0.04, ..SimConfig::default() },
        RngBank::new(31),
        &mut events,
    )
    .unwrap();
    engine.run_to_end(&mut events).unwrap();

    let mut renderer = Renderer::default();
    for event in &events {
        renderer.apply(event);
    }

    assert_eq!(renderer.grid.as_slice(), engine.population().states());
    assert_eq!(renderer.series.as_slice(), engine.series().as_slice());
    assert_eq!(renderer.ended, 1);
}

#[test]
fn replay_survives_reset() {
    let mut events: Vec<SimEvent> = Vec::new();
    let mut engine = SimEngine::new_with(
        "replay-reset".into(),
        SimConfig::default_test(),
        RngBank::new(32),
        &mut events,
    )
    .unwrap();
    engine.run_to_end(&mut events).unwrap();
    engine.reset_with(&mut events).unwrap();
    for _ in 0..5 {
        engine.advance_day_with(&mut events).unwrap();
    }

    let mut renderer = Renderer::default();
    for event in &events {
        renderer.apply(event);
    }
    assert_eq!(renderer.grid.as_slice(), engine.population().states());
    assert_eq!(renderer.series.as_slice(), engine.series().as_slice());
}

#[test]
fn events_serialize_with_snake_case_tags() {
    let event = SimEvent::StateChanged {
        day: 3,
        individual: 17,
        state: HealthState::InfectedSymptomatic,
    };
    let json = serde_json::to_string(&event).unwrap();
    assert_eq!(
        json,
        r#"{"type":"state_changed","day":3,"individual":17,"state":"infected_symptomatic"}"#
    );
    let back: SimEvent = serde_json::from_str(&json).unwrap();
    assert_eq!(back, event);
}
