pub mod autopilot;
pub mod random;

pub use autopilot::AutopilotPolicy;
pub use random::RandomPolicy;

use lander_shared::SimConfig;

use crate::policy::{DoNothingPolicy, Policy};

/// Scripted pilots selectable by name.
pub const PILOT_NAMES: &[&str] = &["autopilot", "do_nothing", "random"];

/// Build a pilot by name; `seed` only matters for stochastic pilots.
pub fn make_pilot(name: &str, config: &SimConfig, seed: u64) -> Option<Box<dyn Policy>> {
    match name {
        "autopilot" => Some(Box::new(AutopilotPolicy::new(config))),
        "do_nothing" => Some(Box::new(DoNothingPolicy)),
        "random" => Some(Box::new(RandomPolicy::new(config.action_space, seed))),
        _ => None,
    }
}
