use std::io::Write;
use std::path::Path;

use anyhow::{bail, Context, Result};
use rayon::prelude::*;

use lander_shared::*;
use lander_sim::analyzer::{analyze, LandingMetrics};
use lander_sim::pilots::make_pilot;
use lander_sim::run_episode;

/// A sweepable physics parameter with its name, range, and accessor.
struct SweepParam {
    name: &'static str,
    min: f32,
    default: f32,
    max: f32,
    /// Apply this parameter value to a SimConfig.
    apply: fn(&mut SimConfig, f32),
}

const SWEEP_PARAMS: &[SweepParam] = &[
    SweepParam {
        name: "gravity",
        min: 0.1,
        default: GRAVITY,
        max: 0.4,
        apply: |c, v| c.gravity = v,
    },
    SweepParam {
        name: "thrust",
        min: 0.2,
        default: THRUST,
        max: 0.5,
        apply: |c, v| c.thrust = v,
    },
    SweepParam {
        name: "thrust_unit",
        min: 0.06,
        default: THRUST_UNIT,
        max: 0.15,
        apply: |c, v| c.thrust_unit = v,
    },
    SweepParam {
        name: "rotation_speed",
        min: 0.5,
        default: ROTATION_SPEED,
        max: 3.0,
        apply: |c, v| c.rotation_speed = v,
    },
    SweepParam {
        name: "damping",
        min: 0.9,
        default: DAMPING,
        max: 1.0,
        apply: |c, v| c.damping = v,
    },
    SweepParam {
        name: "velocity_threshold",
        min: 1.0,
        default: VELOCITY_THRESHOLD,
        max: 4.0,
        apply: |c, v| c.velocity_threshold = v,
    },
    SweepParam {
        name: "angle_threshold",
        min: 5.0,
        default: ANGLE_THRESHOLD,
        max: 30.0,
        apply: |c, v| c.angle_threshold = v,
    },
    SweepParam {
        name: "pad_width",
        min: 40.0,
        default: PAD_WIDTH,
        max: 300.0,
        apply: |c, v| c.pad_width = v,
    },
];

/// Aggregated outcomes for one parameter value across all seeds.
#[derive(Debug)]
struct AggResult {
    value: f32,
    landing_rate: f32,
    crash_rate: f32,
    oob_rate: f32,
    mean_steps: f32,
    mean_reward: f32,
    /// Mean |v| at touchdown over landed episodes only.
    mean_touchdown_speed: f32,
    episode_count: u32,
}

/// A single episode job to be run in parallel.
struct EpisodeJob<'a> {
    pilot: &'a str,
    seed: u64,
    sim_config: SimConfig,
}

fn run_job(job: &EpisodeJob) -> Result<LandingMetrics> {
    let Some(mut pilot) = make_pilot(job.pilot, &job.sim_config, job.seed) else {
        bail!("unknown pilot '{}'", job.pilot);
    };
    let config = RolloutConfig {
        seed: job.seed,
        policy_name: job.pilot.to_string(),
        sim_config: job.sim_config,
        ..Default::default()
    };
    let replay = run_episode(&config, pilot.as_mut())?;
    Ok(analyze(&replay))
}

/// Linearly-spaced values; a single step sweeps just the default.
fn sweep_values(param: &SweepParam, steps: usize) -> Vec<f32> {
    if steps <= 1 {
        return vec![param.default];
    }
    (0..steps)
        .map(|i| param.min + (param.max - param.min) * i as f32 / (steps - 1) as f32)
        .collect()
}

fn aggregate(value: f32, metrics: &[LandingMetrics]) -> AggResult {
    let n = metrics.len().max(1) as f32;
    let rate = |outcome: &str| metrics.iter().filter(|m| m.outcome == outcome).count() as f32 / n;

    let landed: Vec<&LandingMetrics> = metrics.iter().filter(|m| m.outcome == "landed").collect();
    let mean_touchdown_speed = if landed.is_empty() {
        0.0
    } else {
        landed
            .iter()
            .map(|m| (m.touchdown_vx * m.touchdown_vx + m.touchdown_vy * m.touchdown_vy).sqrt())
            .sum::<f32>()
            / landed.len() as f32
    };

    AggResult {
        value,
        landing_rate: rate("landed"),
        crash_rate: rate("crashed"),
        oob_rate: rate("out_of_bounds"),
        mean_steps: metrics.iter().map(|m| m.steps as f32).sum::<f32>() / n,
        mean_reward: metrics.iter().map(|m| m.total_reward).sum::<f32>() / n,
        mean_touchdown_speed,
        episode_count: metrics.len() as u32,
    }
}

fn sweep_param(
    param: &SweepParam,
    steps: usize,
    seeds: u32,
    pilot: &str,
    base: &SimConfig,
) -> Result<Vec<AggResult>> {
    sweep_values(param, steps)
        .into_iter()
        .map(|val| {
            let mut sim_config = *base;
            (param.apply)(&mut sim_config, val);
            sim_config
                .validate()
                .with_context(|| format!("{} = {}", param.name, val))?;

            let jobs: Vec<EpisodeJob> = (0..seeds as u64)
                .map(|seed| EpisodeJob {
                    pilot,
                    seed,
                    sim_config,
                })
                .collect();

            let metrics = jobs
                .par_iter()
                .map(run_job)
                .collect::<Result<Vec<LandingMetrics>>>()?;
            Ok(aggregate(val, &metrics))
        })
        .collect()
}

fn best_index(results: &[AggResult]) -> Option<usize> {
    results
        .iter()
        .enumerate()
        .max_by(|(_, a), (_, b)| a.landing_rate.total_cmp(&b.landing_rate))
        .map(|(i, _)| i)
}

fn print_param_table(param_name: &str, results: &[AggResult]) {
    println!("\n--- {} ---", param_name);
    println!(
        "{:>10} {:>8} {:>8} {:>8} {:>8} {:>9} {:>8}",
        "value", "landed%", "crash%", "oob%", "steps", "reward", "td_speed"
    );
    println!("{:-<66}", "");

    let best_idx = best_index(results);
    for (i, r) in results.iter().enumerate() {
        let marker = if Some(i) == best_idx { " *" } else { "" };
        println!(
            "{:>10.3} {:>8.1} {:>8.1} {:>8.1} {:>8.1} {:>9.2} {:>8.3}{}",
            r.value,
            r.landing_rate * 100.0,
            r.crash_rate * 100.0,
            r.oob_rate * 100.0,
            r.mean_steps,
            r.mean_reward,
            r.mean_touchdown_speed,
            marker,
        );
    }
}

fn write_csv(path: &Path, all_results: &[(&str, Vec<AggResult>)]) -> Result<()> {
    let mut file = std::fs::File::create(path)
        .with_context(|| format!("creating CSV file {}", path.display()))?;
    writeln!(
        file,
        "parameter,value,landing_rate,crash_rate,oob_rate,mean_steps,mean_reward,mean_touchdown_speed,episodes"
    )?;

    for (param_name, results) in all_results {
        for r in results {
            writeln!(
                file,
                "{},{:.4},{:.3},{:.3},{:.3},{:.1},{:.3},{:.4},{}",
                param_name,
                r.value,
                r.landing_rate,
                r.crash_rate,
                r.oob_rate,
                r.mean_steps,
                r.mean_reward,
                r.mean_touchdown_speed,
                r.episode_count,
            )?;
        }
    }
    println!("\nCSV written to {}", path.display());
    Ok(())
}

pub fn cmd_sweep(
    param_filter: Option<&str>,
    steps: usize,
    seeds: u32,
    pilot: &str,
    base: &SimConfig,
    output: Option<&Path>,
) -> Result<()> {
    if make_pilot(pilot, base, 0).is_none() {
        bail!("unknown pilot '{}' for sweep", pilot);
    }
    if seeds == 0 {
        bail!("sweep needs at least one seed");
    }

    // Filter to requested parameter(s)
    let params_to_sweep: Vec<&SweepParam> = match param_filter {
        Some(name) => match SWEEP_PARAMS.iter().find(|p| p.name == name) {
            Some(p) => vec![p],
            None => bail!(
                "unknown parameter '{}'. Available: {}",
                name,
                SWEEP_PARAMS
                    .iter()
                    .map(|p| p.name)
                    .collect::<Vec<_>>()
                    .join(", ")
            ),
        },
        None => SWEEP_PARAMS.iter().collect(),
    };

    let total = params_to_sweep.len() * steps.max(1) * seeds as usize;
    println!(
        "=== Physics Sweep ===\nPilot: {} | Steps: {} | Seeds: {} | Actions: {}\nParams: {} | Total episodes: {}",
        pilot,
        steps,
        seeds,
        base.action_space,
        params_to_sweep.len(),
        total,
    );

    let start = std::time::Instant::now();

    let mut all_results: Vec<(&str, Vec<AggResult>)> = Vec::new();
    let mut best_per_param: Vec<(&str, f32, f32)> = Vec::new();

    for param in &params_to_sweep {
        let results = sweep_param(param, steps, seeds, pilot, base)?;
        if let Some(best) = best_index(&results).map(|i| &results[i]) {
            best_per_param.push((param.name, best.value, best.landing_rate));
        }
        print_param_table(param.name, &results);
        all_results.push((param.name, results));
    }

    let elapsed = start.elapsed();
    println!("\n=== Summary ({:.1}s) ===", elapsed.as_secs_f32());
    println!("{:<20} {:>12} {:>10}", "Parameter", "Best Value", "Landed%");
    println!("{:-<44}", "");
    for (name, value, rate) in &best_per_param {
        println!("{:<20} {:>12.3} {:>10.1}", name, value, rate * 100.0);
    }

    if let Some(path) = output {
        write_csv(path, &all_results)?;
    }
    Ok(())
}
