// floortrack_sim/src/main.rs

use std::path::Path;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{error, info};

use floortrack_sim::cli::{Cli, Command, OutputArgs};
use floortrack_sim::config::{discover_scenarios, load_scenario, write_demo_scenario, ScenarioConfig};
use floortrack_sim::logging::init_logging;
use floortrack_sim::prelude::*;

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(&cli.log);

    match cli.command {
        Command::Simulate {
            scenario,
            record,
            output,
        } => simulate(&scenario, record.as_deref(), &output),
        Command::Replay {
            log_file,
            scenario,
            map_id,
            output,
        } => replay(&log_file, scenario.as_deref(), map_id, &output),
        Command::Init { path } => write_demo_scenario(&path),
    }
}

fn simulate(scenario_path: &Path, record: Option<&Path>, output: &OutputArgs) -> Result<()> {
    let paths = discover_scenarios(scenario_path)?;
    let mut store = open_store(output)?;
    if let Some(dir) = record {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("failed to create {}", dir.display()))?;
    }

    let mut failures = 0;
    for path in &paths {
        let mut run = || -> Result<()> {
            let scenario = load_scenario(path)?;
            let events = WalkSynthesizer::new(&scenario)?.generate(&scenario);
            if let Some(dir) = record {
                let log = dir.join(format!("{}.jsonl", scenario.simulation.name));
                write_event_log(&log, &events)?;
                info!("Recorded {} events to {}", events.len(), log.display());
            }
            let (session, report) = run_events(&scenario.engine, scenario.map.map_id(), &events)?;
            finish(&session, &report, store.as_mut(), output)
        };
        if let Err(e) = run() {
            error!("Scenario {} failed: {:#}", path.display(), e);
            failures += 1;
        }
    }

    anyhow::ensure!(
        failures == 0,
        "{failures} of {} scenarios failed",
        paths.len()
    );
    Ok(())
}

fn replay(
    log_file: &Path,
    scenario_path: Option<&Path>,
    map_id: Option<String>,
    output: &OutputArgs,
) -> Result<()> {
    let scenario = match scenario_path {
        Some(path) => load_scenario(path)?,
        None => ScenarioConfig::default(),
    };
    let map_id = map_id.map(MapId::new).unwrap_or_else(|| scenario.map.map_id());

    let events = read_event_log(log_file)?;
    info!("Replaying {} events from {}", events.len(), log_file.display());
    let (session, report) = run_events(&scenario.engine, map_id, &events)?;

    let mut store = open_store(output)?;
    finish(&session, &report, store.as_mut(), output)
}

fn open_store(output: &OutputArgs) -> Result<Option<JsonRouteStore>> {
    output
        .out
        .as_ref()
        .map(|dir| {
            JsonRouteStore::open(dir)
                .with_context(|| format!("failed to open route store at {}", dir.display()))
        })
        .transpose()
}

fn finish(
    session: &PositioningSession,
    report: &RunReport,
    store: Option<&mut JsonRouteStore>,
    output: &OutputArgs,
) -> Result<()> {
    info!(
        "Map '{}': {} events -> {} points, {:.1} px",
        report.map_id, report.events, report.points, report.length
    );
    if let Some(store) = store {
        persist(session, store)?;
    }
    if output.print {
        let snapshot = serde_json::to_string_pretty(&session.snapshot())
            .context("failed to render route snapshot")?;
        println!("{snapshot}");
    }
    Ok(())
}
