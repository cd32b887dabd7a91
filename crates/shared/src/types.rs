use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::config::SimConfig;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LanderState {
    /// Top-left corner of the craft's bounding box.
    pub position: Vec2,
    /// Units per step.
    pub velocity: Vec2,
    /// Degrees, positive tilts the nose toward +x. Never wrapped.
    pub angle: f32,
    pub width: f32,
    pub height: f32,
}

impl LanderState {
    /// Craft at rest, centered horizontally at the spawn height.
    pub fn spawn(config: &SimConfig) -> Self {
        Self {
            position: Vec2::new(config.spawn_x(), config.spawn_y),
            velocity: Vec2::ZERO,
            angle: 0.0,
            width: config.lander_width,
            height: config.lander_height,
        }
    }

    pub fn center(&self) -> Vec2 {
        self.position + Vec2::new(self.width, self.height) / 2.0
    }

    pub fn bottom(&self) -> f32 {
        self.position.y + self.height
    }

    pub fn right(&self) -> f32 {
        self.position.x + self.width
    }

    /// Unit vector the engine pushes along (straight up at zero angle).
    pub fn heading(&self) -> Vec2 {
        let radians = self.angle.to_radians();
        Vec2::new(radians.sin(), -radians.cos())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PadState {
    pub x: f32,
    /// Top edge.
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl PadState {
    pub fn at(x: f32, config: &SimConfig) -> Self {
        Self {
            x,
            y: config.pad_y(),
            width: config.pad_width,
            height: config.pad_height,
        }
    }

    pub fn top_center(&self) -> Vec2 {
        Vec2::new(self.x + self.width / 2.0, self.y)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CrashReason {
    TooFast,
    AngleTooSteep,
}

impl CrashReason {
    pub fn describe(&self) -> &'static str {
        match self {
            CrashReason::TooFast => "too fast",
            CrashReason::AngleTooSteep => "angle too steep",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum EpisodeStatus {
    #[default]
    Flying,
    Landed,
    Crashed(CrashReason),
    OutOfBounds,
}

impl EpisodeStatus {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, EpisodeStatus::Flying)
    }

    /// Ended by touching down, successfully or not.
    pub fn is_terminated(&self) -> bool {
        matches!(self, EpisodeStatus::Landed | EpisodeStatus::Crashed(_))
    }

    /// Ended by leaving the screen.
    pub fn is_truncated(&self) -> bool {
        matches!(self, EpisodeStatus::OutOfBounds)
    }

    pub fn label(&self) -> &'static str {
        match self {
            EpisodeStatus::Flying => "flying",
            EpisodeStatus::Landed => "landed",
            EpisodeStatus::Crashed(_) => "crashed",
            EpisodeStatus::OutOfBounds => "out_of_bounds",
        }
    }

    pub fn crash_reason(&self) -> Option<CrashReason> {
        match self {
            EpisodeStatus::Crashed(reason) => Some(*reason),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Observation {
    pub data: [f32; crate::OBS_SIZE],
}

impl serde::Serialize for Observation {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.data.as_slice().serialize(serializer)
    }
}

impl<'de> serde::Deserialize<'de> for Observation {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let v: Vec<f32> = Vec::deserialize(deserializer)?;
        if v.len() != crate::OBS_SIZE {
            return Err(serde::de::Error::custom(format!(
                "expected {} floats, got {}",
                crate::OBS_SIZE,
                v.len()
            )));
        }
        let mut data = [0.0f32; crate::OBS_SIZE];
        data.copy_from_slice(&v);
        Ok(Observation { data })
    }
}

/// Everything a caller gets back from one step.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StepOutcome {
    pub observation: Observation,
    pub reward: f32,
    pub terminated: bool,
    pub truncated: bool,
    pub status: EpisodeStatus,
}

/// Read-only snapshot handed to renderers and scripted pilots.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Frame {
    pub step: u32,
    pub lander: LanderState,
    pub pad: PadState,
    pub status: EpisodeStatus,
    /// Action that produced this frame; `None` right after reset.
    pub action: Option<u32>,
    pub reward: f32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RolloutConfig {
    pub seed: u64,
    pub policy_name: String,
    pub max_steps: u32,
    pub frame_interval: u32,
    pub sim_config: SimConfig,
}

impl Default for RolloutConfig {
    fn default() -> Self {
        Self {
            seed: 0,
            policy_name: "pilot".into(),
            max_steps: crate::MAX_STEPS,
            frame_interval: crate::FRAME_INTERVAL,
            sim_config: SimConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct EpisodeResult {
    /// `Flying` when the rollout hit `max_steps` first.
    pub status: EpisodeStatus,
    pub steps: u32,
    pub total_reward: f32,
    pub lander: LanderState,
    pub pad: PadState,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Replay {
    pub config: RolloutConfig,
    pub frames: Vec<Frame>,
    pub result: EpisodeResult,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_heading_at_zero_is_up() {
        let lander = LanderState::spawn(&SimConfig::default());
        let h = lander.heading();
        assert!(h.x.abs() < 1e-6);
        assert!((h.y + 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_heading_tilted_right() {
        let mut lander = LanderState::spawn(&SimConfig::default());
        lander.angle = 90.0;
        let h = lander.heading();
        assert!((h.x - 1.0).abs() < 1e-6);
        assert!(h.y.abs() < 1e-6);
    }

    #[test]
    fn test_status_flags() {
        assert!(!EpisodeStatus::Flying.is_terminal());
        assert!(EpisodeStatus::Landed.is_terminated());
        assert!(EpisodeStatus::Crashed(CrashReason::TooFast).is_terminated());
        assert!(!EpisodeStatus::OutOfBounds.is_terminated());
        assert!(EpisodeStatus::OutOfBounds.is_truncated());
        assert_eq!(
            EpisodeStatus::Crashed(CrashReason::AngleTooSteep).crash_reason(),
            Some(CrashReason::AngleTooSteep)
        );
    }

    #[test]
    fn test_observation_rejects_wrong_length() {
        let err = serde_json::from_str::<Observation>("[1.0, 2.0]");
        assert!(err.is_err());

        let obs: Observation = serde_json::from_str("[1, 2, 3, 4, 5, 6, 7]").unwrap();
        assert_eq!(obs.data[6], 7.0);
        assert_eq!(serde_json::to_string(&obs).unwrap(), "[1.0,2.0,3.0,4.0,5.0,6.0,7.0]");
    }
}
