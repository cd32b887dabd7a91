use lander_shared::*;

use crate::policy::Policy;

/// Scripted lander: tilts to steer over the pad, throttles the descent rate
/// down with altitude, and straightens up for touchdown.
///
/// One action per step, so rotating and thrusting compete; a descent that is
/// running away always wins over attitude corrections.
pub struct AutopilotPolicy {
    action_space: ActionSpace,
    rotation_speed: f32,
}

impl AutopilotPolicy {
    pub fn new(config: &SimConfig) -> Self {
        Self {
            action_space: config.action_space,
            rotation_speed: config.rotation_speed,
        }
    }

    fn thrust(&self, excess: f32) -> u32 {
        match self.action_space {
            ActionSpace::Simple => ACTION_THRUST,
            // Medium burn for trimming, strong burn when well over target.
            ActionSpace::Graded if excess > 0.3 => ACTION_THRUST + 2,
            ActionSpace::Graded => ACTION_THRUST + 1,
        }
    }
}

impl Policy for AutopilotPolicy {
    fn name(&self) -> &str {
        "autopilot"
    }

    fn act(&mut self, frame: &Frame) -> u32 {
        let lander = &frame.lander;
        let dx = frame.pad.top_center().x - lander.center().x;
        let altitude = frame.pad.y - lander.bottom();
        let vx = lander.velocity.x;
        let vy = lander.velocity.y;

        // Horizontal: chase a velocity proportional to the offset, gentler
        // near the ground so touchdown drift stays small.
        let max_vx = if altitude < 60.0 { 1.0 } else { 2.5 };
        let desired_vx = (dx * 0.02).clamp(-max_vx, max_vx);
        let max_tilt = if altitude < 25.0 { 4.0 } else { 12.0 };
        let desired_angle = ((desired_vx - vx) * 15.0).clamp(-max_tilt, max_tilt);

        // Vertical: descend faster when high, hover-ish while still off target.
        let mut vy_target = (0.6 + altitude * 0.015).clamp(0.6, 4.0);
        if dx.abs() > 60.0 {
            vy_target = vy_target.min(0.6 + (altitude - 80.0).max(0.0) * 0.01);
        }

        let excess = vy - vy_target;
        if excess > 0.5 && lander.angle.abs() < 25.0 {
            return self.thrust(excess);
        }

        let angle_error = desired_angle - lander.angle;
        if angle_error.abs() > self.rotation_speed / 2.0 {
            return if angle_error > 0.0 {
                ACTION_ROTATE_LEFT
            } else {
                ACTION_ROTATE_RIGHT
            };
        }

        if excess > 0.0 {
            return self.thrust(excess);
        }

        ACTION_NOOP
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::episode::Episode;

    fn frame_with(config: &SimConfig, pad_x: f32) -> Frame {
        let mut ep = Episode::new(*config, 0).unwrap();
        ep.reset_with_pad(pad_x).unwrap();
        ep.snapshot()
    }

    #[test]
    fn test_tilts_toward_distant_pad() {
        let config = SimConfig::default();
        let mut pilot = AutopilotPolicy::new(&config);
        // Pad far to the right: positive tilt pushes toward +x.
        assert_eq!(pilot.act(&frame_with(&config, 700.0)), ACTION_ROTATE_LEFT);
        assert_eq!(pilot.act(&frame_with(&config, 0.0)), ACTION_ROTATE_RIGHT);
    }

    #[test]
    fn test_brakes_fast_descent() {
        let config = SimConfig {
            action_space: ActionSpace::Graded,
            ..Default::default()
        };
        let mut pilot = AutopilotPolicy::new(&config);
        let mut frame = frame_with(&config, 350.0);
        frame.lander.position.y = 480.0;
        frame.lander.velocity.y = 5.0;
        assert_eq!(pilot.act(&frame), 5);
    }

    #[test]
    fn test_idles_when_on_profile() {
        let config = SimConfig::default();
        let mut pilot = AutopilotPolicy::new(&config);
        // Directly above the pad, upright, descending slower than target.
        let frame = frame_with(&config, 350.0);
        assert_eq!(pilot.act(&frame), ACTION_NOOP);
    }
}
