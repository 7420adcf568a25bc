//! epi-runner: headless driver for the epidemic simulation.
//!
//! Usage:
//!   epi-runner --seed 42 --alpha 10 --rho 0.01 --days 100
//!   epi-runner --mode herd --json
//!   epi-runner --config scenario.json --seed 7
//!   epi-runner --seed 42 --ipc-mode

use anyhow::Result;
use epidemic_core::{
    config::{ScenarioMode, SimConfig},
    engine::{RunStatus, SimEngine},
    event::Discard,
    outcome::RunSummary,
    snapshot::DaySnapshot,
    types::Day,
};
use std::env;
use std::io::{self, BufRead, Write};

#[derive(serde::Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum IpcCommand {
    GetState,
    Step { count: u64 },
    Run,
    Reset,
    Quit,
}

#[derive(serde::Serialize)]
struct UiState<'a> {
    day: Day,
    status: RunStatus,
    susceptible: usize,
    infected: usize,
    recovered: usize,
    peak: usize,
    series: &'a [DaySnapshot],
    summary: Option<RunSummary>,
}

#[derive(serde::Serialize)]
struct JsonReport<'a> {
    seed: u64,
    config: &'a SimConfig,
    series: &'a [DaySnapshot],
    summary: &'a RunSummary,
}

fn main() -> Result<()> {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    let seed = parse_arg(&args, "--seed", 42u64);
    let ipc_mode = args.iter().any(|a| a == "--ipc-mode");
    let json = args.iter().any(|a| a == "--json");
    let config = build_config(&args)?;

    let run_id = format!("run-{seed}");
    let mut engine = SimEngine::from_seed(run_id, config, seed)?;

    if ipc_mode {
        return run_ipc_loop(&mut engine);
    }

    let summary = engine.run_to_end(&mut Discard)?;
    if json {
        let report = JsonReport {
            seed,
            config: engine.config(),
            series: engine.series().as_slice(),
            summary: &summary,
        };
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_header(&engine);
        print_series(&engine);
        print_summary(&engine, &summary);
    }
    Ok(())
}

/// Preset (or config file) first, then individual flag overrides.
fn build_config(args: &[String]) -> Result<SimConfig> {
    let mut config = match find_arg(args, "--config") {
        Some(path) => SimConfig::load(path)?,
        None => match find_arg(args, "--mode") {
            Some("herd") => SimConfig::herd_immunity(),
            Some("social") | None => SimConfig::social_distancing(),
            Some(other) => anyhow::bail!("Unknown mode: {other} (expected social|herd)"),
        },
    };

    if let Some(alpha) = parse_opt(args, "--alpha") {
        config.alpha = alpha;
    }
    if let Some(rho) = parse_opt(args, "--rho") {
        config.rho = rho;
    }
    if let Some(initial) = parse_opt(args, "--initial") {
        config.initial_infected = initial;
    }
    if let Some(days) = parse_opt(args, "--days") {
        config.max_days = days;
    }
    if let Some(population) = parse_opt(args, "--population") {
        config.population_size = population;
    }
    if let Some(gamma) = parse_opt(args, "--gamma") {
        config.gamma = gamma;
    }
    Ok(config)
}

fn run_ipc_loop(engine: &mut SimEngine) -> Result<()> {
    let stdin = io::stdin();
    let mut stdout = io::stdout();
    let mut handle = stdin.lock();
    let mut buffer = String::new();

    loop {
        buffer.clear();
        let bytes_read = handle.read_line(&mut buffer)?;
        if bytes_read == 0 {
            break; // EOF
        }

        let cmd: IpcCommand = match serde_json::from_str(&buffer) {
            Ok(c) => c,
            Err(e) => {
                let err_json = serde_json::json!({ "error": e.to_string() });
                writeln!(stdout, "{}", err_json)?;
                stdout.flush()?;
                continue;
            }
        };

        let result = match cmd {
            IpcCommand::Quit => break,
            IpcCommand::GetState => Ok(()),
            IpcCommand::Step { count } => step(engine, count),
            IpcCommand::Run => engine.run_to_end(&mut Discard).map(|_| ()),
            IpcCommand::Reset => engine.reset(),
        };

        match result {
            Ok(()) => writeln!(stdout, "{}", serde_json::to_string(&build_ui_state(engine))?)?,
            Err(e) => {
                log::warn!("Rejected command: {e}");
                let err_json = serde_json::json!({ "error": e.to_string() });
                writeln!(stdout, "{}", err_json)?;
            }
        }
        stdout.flush()?;
    }
    Ok(())
}

/// Advance up to `count` days, stopping quietly once the run has ended.
fn step(engine: &mut SimEngine, count: u64) -> epidemic_core::error::SimResult<()> {
    for _ in 0..count {
        if engine.status().is_terminal() {
            break;
        }
        engine.advance_day_with(&mut Discard)?;
    }
    Ok(())
}

fn build_ui_state(engine: &SimEngine) -> UiState<'_> {
    let counts = engine.counts();
    UiState {
        day: engine.day(),
        status: engine.status(),
        susceptible: counts.susceptible,
        infected: counts.infected,
        recovered: counts.recovered,
        peak: engine.peak(),
        series: engine.series().as_slice(),
        summary: engine.summary(),
    }
}

fn print_header(engine: &SimEngine) {
    let config = engine.config();
    println!("Epidemic simulation (epi-runner)");
    println!("  seed:       {}", engine.seed_value());
    println!("  mode:       {:?}", config.mode);
    println!("  population: {}", config.population_size);
    println!("  alpha:      {}", config.alpha);
    println!("  rho:        {}", config.rho);
    println!("  gamma:      {:.4}", config.gamma);
    println!("  initial:    {}", config.initial_infected);
    println!("  max days:   {}", config.max_days);
    println!(
        "  one case could infect ~{} people in its first {} days",
        config.theoretical_spread(),
        config.symptomatic_infectious_days
    );
    println!();
}

fn print_series(engine: &SimEngine) {
    println!("{:>5} {:>6} {:>6} {:>6} {:>6}", "day", "S", "I", "R", "peak");
    for s in engine.series() {
        println!(
            "{:>5} {:>6} {:>6} {:>6} {:>6}",
            s.day, s.susceptible, s.infected, s.recovered, s.peak
        );
    }
    println!();
}

fn print_summary(engine: &SimEngine, summary: &RunSummary) {
    let config = engine.config();
    let verdict = if summary.passed(config.mode) { "Success!" } else { "Uh-Oh!" };

    println!("=== RUN SUMMARY ===");
    println!("  run_id:       {}", summary.run_id);
    println!("  days run:     {}", summary.days_run);
    println!("  status:       {:?}", summary.status);
    println!("  ended early:  {}", summary.ended_early);
    println!(
        "  peak:         {} (hospital capacity {})",
        summary.peak, config.hospital_capacity
    );
    if config.mode == ScenarioMode::HerdImmunity {
        println!(
            "  immunity:     {:.1}% (target {:.1}%)",
            summary.immunity_percent, config.herd_immunity_threshold
        );
    } else {
        println!("  immunity:     {:.1}%", summary.immunity_percent);
    }
    println!("  outcome:      {:?}", summary.outcome);
    println!("  verdict:      {verdict}");
}

fn find_arg<'a>(args: &'a [String], flag: &str) -> Option<&'a str> {
    args.windows(2)
        .find(|w| w[0] == flag)
        .map(|w| w[1].as_str())
}

fn parse_opt<T: std::str::FromStr>(args: &[String], flag: &str) -> Option<T> {
    find_arg(args, flag).and_then(|v| v.parse().ok())
}

fn parse_arg<T: std::str::FromStr + Copy>(args: &[String], flag: &str, default: T) -> T {
    parse_opt(args, flag).unwrap_or(default)
}
