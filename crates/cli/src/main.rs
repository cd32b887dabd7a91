mod sweep;

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use rayon::prelude::*;
use tracing_subscriber::EnvFilter;

use lander_shared::*;
use lander_sim::analyzer::analyze;
use lander_sim::pilots::{make_pilot, PILOT_NAMES};
use lander_sim::{run_episode, run_episode_with, FrameRecorder, LogRenderer, Policy, Renderer};

#[derive(Parser)]
#[command(name = "lander", about = "Lunar lander kernel CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Simulation configuration shared by every command.
#[derive(Args, Debug, Clone)]
struct SimArgs {
    /// JSON file with SimConfig fields; missing fields use the defaults
    #[arg(long)]
    config: Option<PathBuf>,

    /// Action space (simple, graded)
    #[arg(long)]
    action_space: Option<ActionSpace>,

    /// Reward policy (sparse, shaped)
    #[arg(long)]
    reward: Option<RewardPolicy>,

    /// Observation mode (raw, normalized)
    #[arg(long)]
    observation: Option<ObservationMode>,
}

impl SimArgs {
    fn load(&self) -> Result<SimConfig> {
        let mut config = match &self.config {
            Some(path) => read_config(path)?,
            None => SimConfig::default(),
        };
        if let Some(space) = self.action_space {
            config.action_space = space;
        }
        if let Some(policy) = self.reward {
            config.reward_policy = policy;
        }
        if let Some(mode) = self.observation {
            config.observation_mode = mode;
        }
        config.validate()?;
        Ok(config)
    }
}

fn read_config(path: &Path) -> Result<SimConfig> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("reading config {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("parsing config {}", path.display()))
}

#[derive(Subcommand)]
enum Commands {
    /// Fly one episode with a scripted pilot
    Run {
        /// Pilot (autopilot, do_nothing, random)
        #[arg(long, default_value = "autopilot")]
        pilot: String,

        /// Seed for pad placement (and the random pilot)
        #[arg(long, default_value_t = 42)]
        seed: u64,

        /// Stop after this many steps even if still flying
        #[arg(long, default_value_t = MAX_STEPS)]
        max_steps: u32,

        /// Record every Nth frame in the replay
        #[arg(long, default_value_t = FRAME_INTERVAL)]
        frame_interval: u32,

        /// Emit every frame as a debug event while flying (use with RUST_LOG=debug)
        #[arg(long)]
        log_frames: bool,

        /// Output path for replay JSON
        #[arg(long)]
        output: Option<PathBuf>,

        #[command(flatten)]
        sim: SimArgs,
    },

    /// Fly many seeds per pilot in parallel and tabulate outcomes
    Bench {
        /// Comma-separated list of pilot names
        #[arg(long, default_value = "autopilot,random,do_nothing")]
        pilots: String,

        /// Number of seeds per pilot
        #[arg(long, default_value_t = 100)]
        seeds: u32,

        #[command(flatten)]
        sim: SimArgs,
    },

    /// Sweep one physics parameter (or all) and report landing rates
    Sweep {
        /// Parameter to sweep (default: all)
        #[arg(long)]
        param: Option<String>,

        /// Number of values between min and max
        #[arg(long, default_value_t = 5)]
        steps: usize,

        /// Seeds per value
        #[arg(long, default_value_t = 50)]
        seeds: u32,

        /// Pilot flying every episode
        #[arg(long, default_value = "autopilot")]
        pilot: String,

        /// Output path for CSV results
        #[arg(long)]
        output: Option<PathBuf>,

        #[command(flatten)]
        sim: SimArgs,
    },

    /// Print the effective configuration as JSON
    Config {
        #[command(flatten)]
        sim: SimArgs,
    },
}

/// Resolve a pilot name, failing with the list of valid names.
fn resolve_pilot(name: &str, config: &SimConfig, seed: u64) -> Result<Box<dyn Policy>> {
    match make_pilot(name, config, seed) {
        Some(pilot) => Ok(pilot),
        None => bail!(
            "unknown pilot '{}'. Valid options: {}",
            name,
            PILOT_NAMES.join(", ")
        ),
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            pilot,
            seed,
            max_steps,
            frame_interval,
            log_frames,
            output,
            sim,
        } => {
            let config = RolloutConfig {
                seed,
                policy_name: pilot,
                max_steps,
                frame_interval,
                sim_config: sim.load()?,
            };
            cmd_run(&config, log_frames, output)
        }

        Commands::Bench { pilots, seeds, sim } => cmd_bench(&pilots, seeds, &sim.load()?),

        Commands::Sweep {
            param,
            steps,
            seeds,
            pilot,
            output,
            sim,
        } => sweep::cmd_sweep(
            param.as_deref(),
            steps,
            seeds,
            &pilot,
            &sim.load()?,
            output.as_deref(),
        ),

        Commands::Config { sim } => {
            println!("{}", serde_json::to_string_pretty(&sim.load()?)?);
            Ok(())
        }
    }
}

fn cmd_run(config: &RolloutConfig, log_frames: bool, output: Option<PathBuf>) -> Result<()> {
    let mut pilot = resolve_pilot(&config.policy_name, &config.sim_config, config.seed)?;

    tracing::info!(
        pilot = pilot.name(),
        seed = config.seed,
        action_space = %config.sim_config.action_space,
        reward = %config.sim_config.reward_policy,
        "running episode"
    );

    let replay = record_episode(config, pilot.as_mut(), &mut log_frames.then_some(LogRenderer))?;

    let result = &replay.result;
    let metrics = analyze(&replay);

    println!();
    println!("=== Episode Result ===");
    println!("Status:       {}", result.status.label());
    if let Some(reason) = result.status.crash_reason() {
        println!("Reason:       {}", reason.describe());
    }
    println!(
        "Steps:        {} ({:.1}s)",
        result.steps,
        result.steps as f32 / TICK_RATE as f32
    );
    println!("Total reward: {:.2}", result.total_reward);
    println!("Pad x:        {:.1}", result.pad.x);
    println!();
    println!("--- Touchdown ---");
    println!(
        "  v=({:.3}, {:.3})  angle={:.2}  offset={:.1}",
        metrics.touchdown_vx, metrics.touchdown_vy, metrics.touchdown_angle, metrics.pad_offset
    );
    println!(
        "  peak tilt={:.2}  thrust steps={}  softness={:.2}",
        metrics.peak_tilt, metrics.thrust_steps, metrics.softness
    );

    if let Some(path) = output {
        let json = serde_json::to_string_pretty(&replay)?;
        std::fs::write(&path, json)
            .with_context(|| format!("writing replay to {}", path.display()))?;
        println!("\nReplay written to {}", path.display());
    }
    Ok(())
}

/// Record a replay while `live` sees every frame as it is produced.
fn record_episode(
    config: &RolloutConfig,
    pilot: &mut dyn Policy,
    live: &mut dyn Renderer,
) -> Result<Replay> {
    let mut recorder = FrameRecorder::new(config.frame_interval);
    let result = run_episode_with(config, pilot, &mut (&mut recorder, live))?;
    Ok(Replay {
        config: config.clone(),
        frames: recorder.into_frames(),
        result,
    })
}

/// Outcome counts for one pilot.
#[derive(Default)]
struct BenchRow {
    landed: u32,
    too_fast: u32,
    too_steep: u32,
    out_of_bounds: u32,
    flying: u32,
    steps: u64,
    reward: f64,
}

impl BenchRow {
    fn add(&mut self, result: &EpisodeResult) {
        match result.status {
            EpisodeStatus::Landed => self.landed += 1,
            EpisodeStatus::Crashed(CrashReason::TooFast) => self.too_fast += 1,
            EpisodeStatus::Crashed(CrashReason::AngleTooSteep) => self.too_steep += 1,
            EpisodeStatus::OutOfBounds => self.out_of_bounds += 1,
            EpisodeStatus::Flying => self.flying += 1,
        }
        self.steps += result.steps as u64;
        self.reward += result.total_reward as f64;
    }
}

fn cmd_bench(pilots_str: &str, seeds: u32, sim_config: &SimConfig) -> Result<()> {
    let pilot_names: Vec<&str> = pilots_str.split(',').map(|s| s.trim()).collect();
    for name in &pilot_names {
        resolve_pilot(name, sim_config, 0)?;
    }
    if seeds == 0 {
        bail!("bench needs at least one seed");
    }

    println!(
        "Bench: {} pilots, {} seeds each ({} actions, {} reward)",
        pilot_names.len(),
        seeds,
        sim_config.action_space,
        sim_config.reward_policy
    );
    println!();
    println!(
        "{:<12} {:>7} {:>9} {:>9} {:>7} {:>7} {:>9} {:>10}",
        "Pilot", "landed", "too_fast", "too_steep", "oob", "flying", "steps", "reward"
    );
    println!("{:-<78}", "");

    let start = std::time::Instant::now();
    for name in &pilot_names {
        let results = (0..seeds as u64)
            .into_par_iter()
            .map(|seed| -> Result<EpisodeResult> {
                let mut pilot = resolve_pilot(name, sim_config, seed)?;
                let config = RolloutConfig {
                    seed,
                    policy_name: name.to_string(),
                    sim_config: *sim_config,
                    ..Default::default()
                };
                Ok(run_episode(&config, pilot.as_mut())?.result)
            })
            .collect::<Result<Vec<EpisodeResult>>>()?;

        let mut row = BenchRow::default();
        for result in &results {
            row.add(result);
        }
        let n = results.len() as f64;
        println!(
            "{:<12} {:>6.1}% {:>9} {:>9} {:>7} {:>7} {:>9.1} {:>10.2}",
            name,
            row.landed as f64 / n * 100.0,
            row.too_fast,
            row.too_steep,
            row.out_of_bounds,
            row.flying,
            row.steps as f64 / n,
            row.reward / n,
        );
    }
    tracing::info!(elapsed_s = start.elapsed().as_secs_f32(), "bench finished");
    Ok(())
}
