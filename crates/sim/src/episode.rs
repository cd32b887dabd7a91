use lander_shared::*;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg64;

use crate::action::decode_action;
use crate::observation::encode;
use crate::physics::integrate;
use crate::reward::compute_reward;
use crate::termination::classify;

/// One lander over one pad. The only stateful piece of the kernel: every
/// other component is a pure function of the state held here.
///
/// Stepping after a terminal status is idempotent: the action is still
/// validated, but no physics runs, the stored status is reported again and the
/// reward is zero.
#[derive(Debug, Clone)]
pub struct Episode {
    config: SimConfig,
    lander: LanderState,
    pad: PadState,
    status: EpisodeStatus,
    steps: u32,
    last_action: Option<u32>,
    last_reward: f32,
    rng: Pcg64,
}

impl Episode {
    /// Validate `config` and start the first episode with a pad drawn from
    /// `seed`.
    pub fn new(config: SimConfig, seed: u64) -> Result<Self, LanderError> {
        config.validate()?;
        let mut rng = Pcg64::seed_from_u64(seed);
        let pad = draw_pad(&mut rng, &config);
        Ok(Self {
            lander: LanderState::spawn(&config),
            pad,
            config,
            status: EpisodeStatus::Flying,
            steps: 0,
            last_action: None,
            last_reward: 0.0,
            rng,
        })
    }

    /// Restore the spawn state and redraw the pad. `Some(seed)` reseeds this
    /// episode's generator; `None` continues its current stream.
    pub fn reset(&mut self, seed: Option<u64>) -> Observation {
        if let Some(seed) = seed {
            self.rng = Pcg64::seed_from_u64(seed);
        }
        let pad = draw_pad(&mut self.rng, &self.config);
        self.restart(pad)
    }

    /// Like [`Episode::reset`] but drawing the pad from a caller-owned RNG.
    pub fn reset_with_rng<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Observation {
        let pad = draw_pad(rng, &self.config);
        self.restart(pad)
    }

    /// Start a new episode over a pad at a chosen `x` instead of a drawn one.
    /// The generator is left untouched.
    pub fn reset_with_pad(&mut self, x: f32) -> Result<Observation, LanderError> {
        let max_x = self.config.pad_x_max();
        if !(0.0..=max_x).contains(&x) {
            return Err(LanderError::PadOutOfRange { x, max_x });
        }
        Ok(self.restart(PadState::at(x, &self.config)))
    }

    fn restart(&mut self, pad: PadState) -> Observation {
        self.lander = LanderState::spawn(&self.config);
        self.pad = pad;
        self.status = EpisodeStatus::Flying;
        self.steps = 0;
        self.last_action = None;
        self.last_reward = 0.0;
        self.observe()
    }

    /// Decode, integrate, classify, reward, encode.
    pub fn step(&mut self, action: u32) -> Result<StepOutcome, LanderError> {
        let control = decode_action(action, self.lander.angle, &self.config)?;

        if self.status.is_terminal() {
            tracing::warn!(
                action,
                status = self.status.label(),
                steps = self.steps,
                "step after terminal status; call reset first"
            );
            return Ok(self.outcome(0.0));
        }

        integrate(&mut self.lander, control, &self.config);
        self.status = classify(&self.lander, &self.pad, &self.config);
        let reward = compute_reward(self.status, &self.lander, &self.pad, &self.config);

        self.steps += 1;
        self.last_action = Some(action);
        self.last_reward = reward;

        if self.status.is_terminal() {
            tracing::debug!(
                status = self.status.label(),
                reason = self.status.crash_reason().map(|r| r.describe()),
                steps = self.steps,
                vx = self.lander.velocity.x,
                vy = self.lander.velocity.y,
                angle = self.lander.angle,
                "episode finished"
            );
        }

        Ok(self.outcome(reward))
    }

    fn outcome(&self, reward: f32) -> StepOutcome {
        StepOutcome {
            observation: self.observe(),
            reward,
            terminated: self.status.is_terminated(),
            truncated: self.status.is_truncated(),
            status: self.status,
        }
    }

    pub fn observe(&self) -> Observation {
        encode(&self.lander, &self.pad, &self.config)
    }

    pub fn snapshot(&self) -> Frame {
        Frame {
            step: self.steps,
            lander: self.lander,
            pad: self.pad,
            status: self.status,
            action: self.last_action,
            reward: self.last_reward,
        }
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    /// Swap reward weights; physics and geometry stay as validated. Weights
    /// that would not pass [`SimConfig::validate`] are rejected and the old
    /// ones kept.
    pub fn set_rewards(&mut self, rewards: RewardWeights) -> Result<(), LanderError> {
        let candidate = SimConfig {
            rewards,
            ..self.config
        };
        candidate.validate()?;
        self.config = candidate;
        Ok(())
    }

    pub fn lander(&self) -> &LanderState {
        &self.lander
    }

    pub fn pad(&self) -> &PadState {
        &self.pad
    }

    pub fn status(&self) -> EpisodeStatus {
        self.status
    }

    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }

    pub fn steps(&self) -> u32 {
        self.steps
    }
}

/// Pad x uniform over `[0, screen_width - pad_width]`.
pub fn draw_pad<R: Rng + ?Sized>(rng: &mut R, config: &SimConfig) -> PadState {
    let max_x = config.pad_x_max();
    let x = rng.gen_range(0.0..=max_x).clamp(0.0, max_x);
    PadState::at(x, config)
}
