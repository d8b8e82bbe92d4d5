#![deny(unsafe_code)]
//! Headless command-line front end for cellsim.
//!
//! Subcommands:
//! - `run <simulation>`: drive a simulation N updates and write a PNG
//! - `replay <scenario.json>`: run a saved scenario
//! - `list`: print available simulations and their capabilities

mod error;

use std::path::{Path, PathBuf};
use std::process;

use cellsim_core::{Palette, RgbaSurface, Scenario, SimState, Simulation};
use cellsim_engines::driver::FPS_DEFAULT;
use cellsim_engines::snapshot::write_png;
use cellsim_engines::{FrameDriver, HeadlessRun, Registry};
use clap::{Parser, Subcommand};
use error::CliError;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "cellsim", about = "Cellular automaton simulations, headless")]
struct Cli {
    /// Output as JSON instead of human-readable text.
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run a simulation for N updates and write a PNG snapshot.
    Run {
        /// Simulation identifier (conway, langton, termite, reaction).
        simulation: String,

        /// Surface width in pixels.
        #[arg(short = 'W', long, default_value_t = 800)]
        width: usize,

        /// Surface height in pixels.
        #[arg(short = 'H', long, default_value_t = 600)]
        height: usize,

        /// Number of updates.
        #[arg(short, long, default_value_t = 200)]
        steps: usize,

        /// PRNG seed for deterministic output.
        #[arg(long, default_value_t = 42)]
        seed: u64,

        /// Simulation parameters as a JSON object.
        #[arg(long, default_value = "{}")]
        params: String,

        /// Output file path.
        #[arg(short, long, default_value = "output.png")]
        output: PathBuf,

        /// Frames per second of the simulated clock.
        #[arg(long, default_value_t = FPS_DEFAULT)]
        fps: u32,

        /// Also save the run as a scenario file for `replay`.
        #[arg(long)]
        save_scenario: Option<PathBuf>,
    },
    /// Run a scenario file and write a PNG snapshot.
    Replay {
        /// Path to a scenario JSON file.
        scenario: PathBuf,

        /// Output file path.
        #[arg(short, long, default_value = "output.png")]
        output: PathBuf,

        /// Frames per second of the simulated clock.
        #[arg(long, default_value_t = FPS_DEFAULT)]
        fps: u32,
    },
    /// List available simulations and palettes.
    List,
}

/// Result of driving one scenario to completion.
struct Outcome {
    state: SimState,
    run: HeadlessRun,
    fps: u32,
}

fn load_scenario(path: &Path) -> Result<Scenario, CliError> {
    let text = std::fs::read_to_string(path)
        .map_err(|e| CliError::Io(format!("cannot read {}: {e}", path.display())))?;
    serde_json::from_str(&text)
        .map_err(|e| CliError::Input(format!("invalid scenario {}: {e}", path.display())))
}

fn save_scenario(scenario: &Scenario, path: &Path) -> Result<(), CliError> {
    let text = serde_json::to_string_pretty(scenario)?;
    std::fs::write(path, text)
        .map_err(|e| CliError::Io(format!("cannot write {}: {e}", path.display())))
}

/// Builds the scenario's simulation, drives it `steps` updates and writes
/// the final frame to `output`.
fn execute(
    registry: &Registry,
    scenario: &Scenario,
    output: &Path,
    fps: u32,
) -> Result<Outcome, CliError> {
    scenario.validate()?;
    if !scenario.params.is_object() {
        return Err(CliError::Input("params must be a JSON object".into()));
    }
    let mut surface = RgbaSurface::new(scenario.width, scenario.height)?;
    let mut sim = registry.create(
        &scenario.simulation,
        &surface,
        &scenario.params,
        scenario.seed,
    )?;
    let mut driver = FrameDriver::new(fps);
    let run = driver.run_headless(&mut sim, &mut surface, scenario.steps as u64)?;
    write_png(&surface, output)?;
    tracing::info!(
        simulation = %scenario.simulation,
        updates = run.updates,
        output = %output.display(),
        "snapshot written"
    );
    Ok(Outcome {
        state: sim.state(),
        run,
        fps: driver.fps(),
    })
}

fn report(
    json: bool,
    scenario: &Scenario,
    outcome: &Outcome,
    output: &Path,
) -> Result<(), CliError> {
    if json {
        let info = serde_json::json!({
            "simulation": scenario.simulation,
            "width": scenario.width,
            "height": scenario.height,
            "steps": scenario.steps,
            "seed": scenario.seed,
            "frames": outcome.run.frames,
            "simulated_secs": outcome.run.simulated(outcome.fps).as_secs_f64(),
            "state": outcome.state,
            "output": output.display().to_string(),
        });
        println!("{}", serde_json::to_string_pretty(&info)?);
    } else {
        let s = &outcome.state;
        eprintln!(
            "ran {} ({}x{} px, {}x{} cells, {} updates, seed {}): {} active -> {}",
            s.name,
            scenario.width,
            scenario.height,
            s.cols,
            s.rows,
            s.generation,
            scenario.seed,
            s.cell_count,
            output.display()
        );
    }
    Ok(())
}

fn run(cli: Cli) -> Result<(), CliError> {
    let registry = Registry::standard();
    match cli.command {
        Command::List => {
            let palettes = Palette::list_names();
            if cli.json {
                let info = serde_json::json!({
                    "simulations": registry.entries(),
                    "palettes": palettes,
                });
                println!("{}", serde_json::to_string_pretty(&info)?);
            } else {
                println!("Simulations:");
                for entry in registry.entries() {
                    let caps = entry.capabilities;
                    println!(
                        "  {:<10} grid={:<5} actors={:<5} {}",
                        entry.kind.name(),
                        caps.grid_based,
                        caps.actor_based,
                        entry.description
                    );
                }
                println!("Palettes (reaction):");
                println!("  {}", palettes.join(", "));
            }
        }
        Command::Run {
            simulation,
            width,
            height,
            steps,
            seed,
            params,
            output,
            fps,
            save_scenario: scenario_path,
        } => {
            let params: serde_json::Value = serde_json::from_str(&params)
                .map_err(|e| CliError::Input(format!("invalid --params JSON: {e}")))?;
            let mut scenario = Scenario::new(&simulation, width, height, seed);
            scenario.params = params;
            scenario.steps = steps;

            let outcome = execute(&registry, &scenario, &output, fps)?;
            if let Some(path) = scenario_path {
                save_scenario(&scenario, &path)?;
            }
            report(cli.json, &scenario, &outcome, &output)?;
        }
        Command::Replay {
            scenario,
            output,
            fps,
        } => {
            let scenario = load_scenario(&scenario)?;
            let outcome = execute(&registry, &scenario, &output, fps)?;
            report(cli.json, &scenario, &outcome, &output)?;
        }
    }

    Ok(())
}

fn init_tracing() {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "cellsim=info".into()),
        ))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn main() {
    init_tracing();
    let cli = Cli::parse();
    let json_mode = cli.json;
    if let Err(e) = run(cli) {
        if json_mode {
            eprintln!(
                "{}",
                serde_json::to_string_pretty(&e.to_json()).unwrap_or_default()
            );
        } else {
            eprintln!("error: {e}");
        }
        process::exit(e.exit_code());
    }
}
