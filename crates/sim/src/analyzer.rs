use lander_shared::*;

/// Summary of how a recorded episode went.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct LandingMetrics {
    /// "flying", "landed", "crashed" or "out_of_bounds".
    pub outcome: &'static str,
    pub crash_reason: Option<&'static str>,
    pub steps: u32,
    pub total_reward: f32,
    /// Velocity and tilt on the last frame; the touchdown state for landings
    /// and crashes.
    pub touchdown_vx: f32,
    pub touchdown_vy: f32,
    pub touchdown_angle: f32,
    /// Largest |angle| seen in any recorded frame.
    pub peak_tilt: f32,
    /// Recorded frames whose action fired the engine. Only exact when the
    /// replay was recorded with a frame interval of 1.
    pub thrust_steps: u32,
    /// Lander centre minus pad centre on the last frame.
    pub pad_offset: f32,
    /// How much of the landing envelope was left unused, 0-1. Zero for
    /// anything that is not a landing.
    pub softness: f32,
}

/// Analyze a replay and compute landing metrics.
pub fn analyze(replay: &Replay) -> LandingMetrics {
    let result = &replay.result;
    let config = &replay.config.sim_config;
    let lander = frames_last_lander(replay);

    let mut peak_tilt = 0.0f32;
    let mut thrust_steps = 0u32;
    for frame in &replay.frames {
        peak_tilt = peak_tilt.max(frame.lander.angle.abs());
        if frame.action.is_some_and(|a| config.action_space.is_thrust(a)) {
            thrust_steps += 1;
        }
    }

    let pad_offset = lander.center().x - result.pad.top_center().x;

    let softness = if result.status == EpisodeStatus::Landed {
        let speed_margin = 1.0 - (lander.velocity.length() / config.velocity_threshold).min(1.0);
        let tilt_margin = 1.0 - (lander.angle.abs() / config.angle_threshold).min(1.0);
        (speed_margin + tilt_margin) / 2.0
    } else {
        0.0
    };

    LandingMetrics {
        outcome: result.status.label(),
        crash_reason: result.status.crash_reason().map(|r| r.describe()),
        steps: result.steps,
        total_reward: result.total_reward,
        touchdown_vx: lander.velocity.x,
        touchdown_vy: lander.velocity.y,
        touchdown_angle: lander.angle,
        peak_tilt,
        thrust_steps,
        pad_offset,
        softness,
    }
}

fn frames_last_lander(replay: &Replay) -> LanderState {
    replay
        .frames
        .last()
        .map(|f| f.lander)
        .unwrap_or(replay.result.lander)
}
