use glam::Vec2;
use lander_shared::*;

/// Decoded effect of one action id.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Control {
    /// Degrees added to the craft angle this step.
    pub rotation: f32,
    /// Force added to the velocity this step.
    pub thrust: Vec2,
}

impl Control {
    pub const NONE: Control = Control {
        rotation: 0.0,
        thrust: Vec2::ZERO,
    };
}

/// Map an action id to a rotation delta or a thrust vector along the
/// current heading (`angle` in degrees).
pub fn decode_action(action: u32, angle: f32, config: &SimConfig) -> Result<Control, LanderError> {
    let space = config.action_space;
    if action >= space.n_actions() {
        return Err(LanderError::InvalidAction {
            action: action as i64,
            space,
            n_actions: space.n_actions(),
        });
    }

    let control = match action {
        ACTION_NOOP => Control::NONE,
        ACTION_ROTATE_LEFT => Control {
            rotation: config.rotation_speed,
            thrust: Vec2::ZERO,
        },
        ACTION_ROTATE_RIGHT => Control {
            rotation: -config.rotation_speed,
            thrust: Vec2::ZERO,
        },
        level => {
            let magnitude = match space {
                ActionSpace::Simple => config.thrust,
                ActionSpace::Graded => (level - 2) as f32 * config.thrust_unit,
            };
            Control {
                rotation: 0.0,
                thrust: thrust_vector(angle, magnitude),
            }
        }
    };
    Ok(control)
}

/// `(sin(angle), -cos(angle)) * magnitude`; zero angle pushes toward -y.
pub fn thrust_vector(angle: f32, magnitude: f32) -> Vec2 {
    let radians = angle.to_radians();
    Vec2::new(radians.sin() * magnitude, -radians.cos() * magnitude)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn graded() -> SimConfig {
        SimConfig {
            action_space: ActionSpace::Graded,
            ..Default::default()
        }
    }

    #[test]
    fn test_noop_and_rotation() {
        let config = SimConfig::default();
        assert_eq!(decode_action(0, 0.0, &config).unwrap(), Control::NONE);

        let left = decode_action(1, 0.0, &config).unwrap();
        assert_eq!(left.rotation, ROTATION_SPEED);
        assert_eq!(left.thrust, Vec2::ZERO);

        let right = decode_action(2, 0.0, &config).unwrap();
        assert_eq!(right.rotation, -ROTATION_SPEED);
    }

    #[test]
    fn test_upright_thrust_points_up() {
        let c = decode_action(3, 0.0, &SimConfig::default()).unwrap();
        assert_eq!(c.rotation, 0.0);
        assert!(c.thrust.x.abs() < 1e-7);
        assert!((c.thrust.y + THRUST).abs() < 1e-7);
    }

    #[test]
    fn test_tilted_thrust_decomposition() {
        let c = decode_action(3, 30.0, &SimConfig::default()).unwrap();
        assert!((c.thrust.x - 0.15).abs() < 1e-6, "x = {}", c.thrust.x);
        assert!((c.thrust.y + 0.259_807_6).abs() < 1e-6, "y = {}", c.thrust.y);

        // Negative tilt mirrors horizontally.
        let m = decode_action(3, -30.0, &SimConfig::default()).unwrap();
        assert!((m.thrust.x + c.thrust.x).abs() < 1e-7);
        assert!((m.thrust.y - c.thrust.y).abs() < 1e-7);
    }

    #[test]
    fn test_graded_thrust_levels() {
        let config = graded();
        for (action, expected) in [(3, 0.1f32), (4, 0.2), (5, 0.3)] {
            let c = decode_action(action, 0.0, &config).unwrap();
            assert!(
                (c.thrust.length() - expected).abs() < 1e-6,
                "action {} magnitude {}",
                action,
                c.thrust.length()
            );
        }
    }

    #[test]
    fn test_out_of_range_rejected() {
        let err = decode_action(4, 0.0, &SimConfig::default()).unwrap_err();
        assert_eq!(
            err,
            LanderError::InvalidAction {
                action: 4,
                space: ActionSpace::Simple,
                n_actions: 4,
            }
        );
        assert!(decode_action(5, 0.0, &graded()).is_ok());
        assert!(decode_action(6, 0.0, &graded()).is_err());
        assert!(decode_action(u32::MAX, 0.0, &graded()).is_err());
    }
}
