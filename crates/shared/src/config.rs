use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::constants::*;
use crate::error::ConfigError;

/// Which discrete action set the episode accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionSpace {
    /// 0 no-op, 1 rotate left, 2 rotate right, 3 thrust.
    #[default]
    Simple,
    /// 0 no-op, 1 rotate left, 2 rotate right, 3/4/5 weak/medium/strong thrust.
    Graded,
}

impl ActionSpace {
    pub fn n_actions(&self) -> u32 {
        match self {
            ActionSpace::Simple => SIMPLE_ACTIONS,
            ActionSpace::Graded => GRADED_ACTIONS,
        }
    }

    pub fn is_thrust(&self, action: u32) -> bool {
        action >= ACTION_THRUST && action < self.n_actions()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RewardPolicy {
    /// Terminal bonus/penalty plus a constant per-step cost.
    #[default]
    Sparse,
    /// Dense distance/speed/tilt shaping with a landing bonus.
    Shaped,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ObservationMode {
    #[default]
    Raw,
    Normalized,
}

macro_rules! selector_str {
    ($ty:ty, $kind:literal, $expected:literal, { $($variant:path => $name:literal),+ $(,)? }) => {
        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                let name = match self {
                    $($variant => $name),+
                };
                f.write_str(name)
            }
        }

        impl FromStr for $ty {
            type Err = ConfigError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s.trim().to_ascii_lowercase().as_str() {
                    $($name => Ok($variant),)+
                    other => Err(ConfigError::UnknownVariant {
                        kind: $kind,
                        value: other.to_string(),
                        expected: $expected,
                    }),
                }
            }
        }
    };
}

selector_str!(ActionSpace, "action space", "simple, graded", {
    ActionSpace::Simple => "simple",
    ActionSpace::Graded => "graded",
});

selector_str!(RewardPolicy, "reward policy", "sparse, shaped", {
    RewardPolicy::Sparse => "sparse",
    RewardPolicy::Shaped => "shaped",
});

selector_str!(ObservationMode, "observation mode", "raw, normalized", {
    ObservationMode::Raw => "raw",
    ObservationMode::Normalized => "normalized",
});

/// Reward magnitudes shared by both reward policies.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RewardWeights {
    pub landed: f32,
    pub failed: f32,
    pub step: f32,
    pub distance: f32,
    pub speed: f32,
    pub tilt: f32,
}

impl Default for RewardWeights {
    fn default() -> Self {
        Self {
            landed: LANDING_REWARD,
            failed: FAILURE_REWARD,
            step: STEP_REWARD,
            distance: DISTANCE_WEIGHT,
            speed: SPEED_WEIGHT,
            tilt: TILT_WEIGHT,
        }
    }
}

/// Every tunable of the simulation. Partial JSON documents fill the rest
/// from [`SimConfig::default`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    pub screen_width: f32,
    pub screen_height: f32,
    pub lander_width: f32,
    pub lander_height: f32,
    pub spawn_y: f32,
    pub gravity: f32,
    pub thrust: f32,
    pub thrust_unit: f32,
    pub rotation_speed: f32,
    pub damping: f32,
    pub pad_width: f32,
    pub pad_height: f32,
    pub pad_margin: f32,
    pub velocity_threshold: f32,
    pub angle_threshold: f32,
    pub action_space: ActionSpace,
    pub reward_policy: RewardPolicy,
    pub observation_mode: ObservationMode,
    pub rewards: RewardWeights,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            screen_width: SCREEN_WIDTH,
            screen_height: SCREEN_HEIGHT,
            lander_width: LANDER_WIDTH,
            lander_height: LANDER_HEIGHT,
            spawn_y: SPAWN_Y,
            gravity: GRAVITY,
            thrust: THRUST,
            thrust_unit: THRUST_UNIT,
            rotation_speed: ROTATION_SPEED,
            damping: DAMPING,
            pad_width: PAD_WIDTH,
            pad_height: PAD_HEIGHT,
            pad_margin: PAD_MARGIN,
            velocity_threshold: VELOCITY_THRESHOLD,
            angle_threshold: ANGLE_THRESHOLD,
            action_space: ActionSpace::default(),
            reward_policy: RewardPolicy::default(),
            observation_mode: ObservationMode::default(),
            rewards: RewardWeights::default(),
        }
    }
}

impl SimConfig {
    /// Check every field that would make the simulation meaningless.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let finite = [
            ("screen_width", self.screen_width),
            ("screen_height", self.screen_height),
            ("lander_width", self.lander_width),
            ("lander_height", self.lander_height),
            ("spawn_y", self.spawn_y),
            ("gravity", self.gravity),
            ("thrust", self.thrust),
            ("thrust_unit", self.thrust_unit),
            ("rotation_speed", self.rotation_speed),
            ("damping", self.damping),
            ("pad_width", self.pad_width),
            ("pad_height", self.pad_height),
            ("pad_margin", self.pad_margin),
            ("velocity_threshold", self.velocity_threshold),
            ("angle_threshold", self.angle_threshold),
            ("rewards.landed", self.rewards.landed),
            ("rewards.failed", self.rewards.failed),
            ("rewards.step", self.rewards.step),
            ("rewards.distance", self.rewards.distance),
            ("rewards.speed", self.rewards.speed),
            ("rewards.tilt", self.rewards.tilt),
        ];
        for (field, value) in finite {
            if !value.is_finite() {
                return Err(ConfigError::NonFinite { field, value });
            }
        }

        if !(self.damping > 0.0 && self.damping <= 1.0) {
            return Err(ConfigError::Damping(self.damping));
        }

        let positive = [
            ("screen_width", self.screen_width),
            ("screen_height", self.screen_height),
            ("lander_width", self.lander_width),
            ("lander_height", self.lander_height),
            ("pad_width", self.pad_width),
            ("pad_height", self.pad_height),
            ("velocity_threshold", self.velocity_threshold),
            ("angle_threshold", self.angle_threshold),
        ];
        for (field, value) in positive {
            if value <= 0.0 {
                return Err(ConfigError::NonPositive { field, value });
            }
        }

        if self.pad_width > self.screen_width {
            return Err(ConfigError::PadWiderThanScreen {
                pad_width: self.pad_width,
                screen_width: self.screen_width,
            });
        }

        Ok(())
    }

    /// Top edge of the pad in screen space.
    pub fn pad_y(&self) -> f32 {
        self.screen_height - self.pad_margin
    }

    /// Largest legal pad x.
    pub fn pad_x_max(&self) -> f32 {
        self.screen_width - self.pad_width
    }

    pub fn spawn_x(&self) -> f32 {
        (self.screen_width - self.lander_width) / 2.0
    }

    /// Divisors turning a raw observation into its normalized form.
    pub fn observation_scale(&self) -> [f32; OBS_SIZE] {
        [
            self.screen_width,
            self.screen_height,
            NORM_SPEED,
            NORM_SPEED,
            NORM_ANGLE,
            self.screen_width,
            self.screen_height,
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert_eq!(SimConfig::default().validate(), Ok(()));
    }

    #[test]
    fn test_default_geometry() {
        let c = SimConfig::default();
        assert_eq!(c.pad_y(), 550.0);
        assert_eq!(c.pad_x_max(), 700.0);
        assert_eq!(c.spawn_x(), 390.0);
    }

    #[test]
    fn test_damping_bounds() {
        for damping in [0.0, -0.5, 1.01] {
            let c = SimConfig {
                damping,
                ..Default::default()
            };
            assert_eq!(c.validate(), Err(ConfigError::Damping(damping)));
        }
        let c = SimConfig {
            damping: 1.0,
            ..Default::default()
        };
        assert!(c.validate().is_ok());
    }

    #[test]
    fn test_non_positive_dimensions_rejected() {
        let c = SimConfig {
            screen_height: 0.0,
            ..Default::default()
        };
        assert_eq!(
            c.validate(),
            Err(ConfigError::NonPositive {
                field: "screen_height",
                value: 0.0
            })
        );

        let c = SimConfig {
            pad_width: -10.0,
            ..Default::default()
        };
        assert!(matches!(
            c.validate(),
            Err(ConfigError::NonPositive { field: "pad_width", .. })
        ));
    }

    #[test]
    fn test_pad_wider_than_screen_rejected() {
        let c = SimConfig {
            pad_width: 900.0,
            ..Default::default()
        };
        assert!(matches!(
            c.validate(),
            Err(ConfigError::PadWiderThanScreen { .. })
        ));

        // A pad exactly as wide as the screen is legal (pad_x is pinned to 0).
        let c = SimConfig {
            pad_width: 800.0,
            ..Default::default()
        };
        assert!(c.validate().is_ok());
    }

    #[test]
    fn test_nan_rejected() {
        let c = SimConfig {
            gravity: f32::NAN,
            ..Default::default()
        };
        assert!(matches!(
            c.validate(),
            Err(ConfigError::NonFinite { field: "gravity", .. })
        ));
    }

    #[test]
    fn test_selectors_parse() {
        assert_eq!("graded".parse::<ActionSpace>(), Ok(ActionSpace::Graded));
        assert_eq!(" Shaped ".parse::<RewardPolicy>(), Ok(RewardPolicy::Shaped));
        assert_eq!(
            "normalized".parse::<ObservationMode>(),
            Ok(ObservationMode::Normalized)
        );
        assert!("hover".parse::<ActionSpace>().is_err());
        assert_eq!(ActionSpace::Graded.to_string(), "graded");
    }

    #[test]
    fn test_action_space_sizes() {
        assert_eq!(ActionSpace::Simple.n_actions(), 4);
        assert_eq!(ActionSpace::Graded.n_actions(), 6);
        assert!(ActionSpace::Simple.is_thrust(3));
        assert!(!ActionSpace::Simple.is_thrust(4));
        assert!(ActionSpace::Graded.is_thrust(5));
        assert!(!ActionSpace::Graded.is_thrust(2));
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let c: SimConfig = serde_json::from_str(
            r#"{"gravity": 0.5, "action_space": "graded", "rewards": {"step": -1.0}}"#,
        )
        .unwrap();
        assert_eq!(c.gravity, 0.5);
        assert_eq!(c.action_space, ActionSpace::Graded);
        assert_eq!(c.rewards.step, -1.0);
        assert_eq!(c.rewards.landed, LANDING_REWARD);
        assert_eq!(c.damping, DAMPING);
    }
}
