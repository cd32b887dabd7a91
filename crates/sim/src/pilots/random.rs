use lander_shared::*;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg64;

use crate::policy::Policy;

/// Uniform over the action space; seeded so rollouts stay reproducible.
pub struct RandomPolicy {
    n_actions: u32,
    rng: Pcg64,
}

impl RandomPolicy {
    pub fn new(action_space: ActionSpace, seed: u64) -> Self {
        Self {
            n_actions: action_space.n_actions(),
            rng: Pcg64::seed_from_u64(seed),
        }
    }
}

impl Policy for RandomPolicy {
    fn name(&self) -> &str {
        "random"
    }

    fn act(&mut self, _frame: &Frame) -> u32 {
        self.rng.gen_range(0..self.n_actions)
    }
}
