use lander_shared::*;

/// Scalar reward for a post-step state under the selected policy.
pub fn compute_reward(
    status: EpisodeStatus,
    lander: &LanderState,
    pad: &PadState,
    config: &SimConfig,
) -> f32 {
    let w = &config.rewards;
    match config.reward_policy {
        RewardPolicy::Sparse => match status {
            EpisodeStatus::Landed => w.landed,
            EpisodeStatus::Crashed(_) | EpisodeStatus::OutOfBounds => w.failed,
            EpisodeStatus::Flying => w.step,
        },
        RewardPolicy::Shaped => match status {
            EpisodeStatus::Landed => w.landed + shaping(lander, pad, config),
            // Shaping is discarded on failure.
            EpisodeStatus::Crashed(_) | EpisodeStatus::OutOfBounds => w.failed,
            EpisodeStatus::Flying => shaping(lander, pad, config),
        },
    }
}

/// Sum of the distance, speed and tilt penalties.
pub fn shaping(lander: &LanderState, pad: &PadState, config: &SimConfig) -> f32 {
    let w = &config.rewards;

    let distance = lander.center().distance(pad.top_center());
    let distance_term = -w.distance * distance;

    let speed_term = -w.speed * (lander.velocity.x.abs() + lander.velocity.y.abs());

    let tilt = lander.angle.abs();
    let angle_term = if tilt > config.angle_threshold {
        -w.tilt * tilt
    } else {
        0.0
    };

    distance_term + speed_term + angle_term
}
