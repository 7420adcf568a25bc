//! Engine state machine: construction, terminal states, reset.

use epidemic_core::{
    config::SimConfig,
    engine::{RunStatus, SimEngine},
    error::{SimError, SimResult},
    event::Discard,
};

fn build(run_id: &str, seed: u64) -> SimEngine {
    SimEngine::from_seed(run_id.to_string(), SimConfig::default_test(), seed)
        .expect("build test engine")
}

#[test]
fn construction_publishes_day_zero() {
    let engine = build("day-zero", 1);
    let config = SimConfig::default_test();

    assert_eq!(engine.status(), RunStatus::Running);
    assert_eq!(engine.day(), 0);
    assert_eq!(engine.series().len(), 1);

    let day0 = engine.series().get(0).unwrap();
    assert_eq!(day0.infected, config.initial_infected);
    assert_eq!(day0.susceptible, config.population_size - config.initial_infected);
    assert_eq!(day0.recovered, 0);
    assert_eq!(day0.peak, config.initial_infected);
    assert!(engine.summary().is_none());
}

#[test]
fn invalid_config_is_rejected_before_running() {
    let config = SimConfig { rho: 2.0, ..SimConfig::default() };
    match SimEngine::from_seed("bad".into(), config, 1) {
        Err(SimError::Config { field, .. }) => assert_eq!(field, "rho"),
        Err(other) => panic!("expected config error, got {other}"),
        Ok(_) => panic!("invalid config accepted"),
    }

    let config = SimConfig { initial_infected: 500, ..SimConfig::default() };
    assert!(matches!(
        SimEngine::from_seed("bad".into(), config, 1),
        Err(SimError::Config { field: "initial_infected", .. })
    ));
}

#[test]
fn advance_after_end_is_rejected() -> SimResult<()> {
    let mut engine = build("terminal", 5);
    let summary = engine.run_to_end(&mut Discard)?;
    let series_len = engine.series().len();

    match engine.advance_day() {
        Err(SimError::InvalidState { status }) => assert_eq!(status, summary.status),
        other => panic!("expected InvalidState, got {other:?}"),
    }
    // The rejected call changed nothing.
    assert_eq!(engine.series().len(), series_len);
    assert_eq!(engine.summary(), Some(summary));
    Ok(())
}

#[test]
fn budget_exhaustion_completes_the_run() -> SimResult<()> {
    // Nobody recovers, so the run can only end by running out of days.
    let config = SimConfig { gamma: 0.0, max_days: 12, ..SimConfig::default() };
    let mut engine = SimEngine::from_seed("budget".into(), config, 9)?;

    for day in 1..=12 {
        assert_eq!(engine.status(), RunStatus::Running);
        let report = engine.advance_day()?;
        assert_eq!(report.snapshot.day, day);
    }
    assert_eq!(engine.status(), RunStatus::Completed);

    let summary = engine.summary().unwrap();
    assert!(!summary.ended_early);
    assert_eq!(summary.days_run, 12);
    assert_eq!(summary.immunity_percent, 0.0);
    Ok(())
}

#[test]
fn reset_restores_original_configuration() -> SimResult<()> {
    let mut engine = build("reset", 13);
    let config = engine.config().clone();
    engine.run_to_end(&mut Discard)?;

    engine.reset()?;
    assert_eq!(engine.generation(), 1);
    assert_eq!(engine.status(), RunStatus::Running);
    assert_eq!(engine.day(), 0);
    assert_eq!(engine.series().len(), 1);
    assert_eq!(engine.peak(), config.initial_infected);

    let counts = engine.counts();
    assert_eq!(counts.infected, config.initial_infected);
    assert_eq!(counts.susceptible, config.population_size - config.initial_infected);
    assert_eq!(counts.recovered, 0);
    assert_eq!(engine.clock().days_remaining, config.max_days);

    // And it runs again.
    engine.advance_day()?;
    assert_eq!(engine.day(), 1);
    Ok(())
}

#[test]
fn reset_mid_run_uses_configured_initial_count() -> SimResult<()> {
    let config = SimConfig { rho: 0.3, ..SimConfig::default() };
    let mut engine = SimEngine::from_seed("mid-reset".into(), config, 17)?;
    for _ in 0..5 {
        engine.advance_day()?;
    }
    engine.reset()?;
    assert_eq!(engine.counts().infected, 3);
    assert_eq!(engine.population().count_by_state().infected_asymptomatic, 3);
    Ok(())
}

#[test]
fn day_report_events_end_with_snapshot() -> SimResult<()> {
    let mut engine = build("report", 21);
    let report = engine.advance_day()?;

    let day_completed = report
        .events
        .iter()
        .position(|e| e.type_name() == "day_completed")
        .expect("day_completed event");
    // Only a run_ended event may follow the snapshot.
    assert!(report.events[day_completed + 1..]
        .iter()
        .all(|e| e.type_name() == "run_ended"));
    assert!(report.events[..day_completed]
        .iter()
        .all(|e| e.type_name() == "state_changed"));
    Ok(())
}
