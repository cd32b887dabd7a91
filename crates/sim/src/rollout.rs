use lander_shared::*;

use crate::episode::Episode;
use crate::policy::Policy;
use crate::render::{FrameRecorder, Renderer};

/// Run one deterministic episode and record it as a replay.
pub fn run_episode(config: &RolloutConfig, policy: &mut dyn Policy) -> Result<Replay, LanderError> {
    let mut recorder = FrameRecorder::new(config.frame_interval);
    let result = run_episode_with(config, policy, &mut recorder)?;
    Ok(Replay {
        config: config.clone(),
        frames: recorder.into_frames(),
        result,
    })
}

/// Drive `policy` until the episode ends or `max_steps` is reached, showing
/// every frame to `renderer`.
pub fn run_episode_with(
    config: &RolloutConfig,
    policy: &mut dyn Policy,
    renderer: &mut dyn Renderer,
) -> Result<EpisodeResult, LanderError> {
    let mut episode = Episode::new(config.sim_config, config.seed)?;
    let mut total_reward = 0.0f32;

    let mut frame = episode.snapshot();
    renderer.draw(&frame);

    while episode.steps() < config.max_steps {
        let action = policy.act(&frame);
        let outcome = episode.step(action)?;
        total_reward += outcome.reward;

        frame = episode.snapshot();
        renderer.draw(&frame);

        if outcome.status.is_terminal() {
            break;
        }
    }
    renderer.finish(&frame);

    tracing::debug!(
        policy = policy.name(),
        seed = config.seed,
        status = episode.status().label(),
        steps = episode.steps(),
        total_reward,
        "rollout finished"
    );

    Ok(EpisodeResult {
        status: episode.status(),
        steps: episode.steps(),
        total_reward,
        lander: *episode.lander(),
        pad: *episode.pad(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pilots::{AutopilotPolicy, RandomPolicy};
    use crate::policy::DoNothingPolicy;

    #[test]
    fn test_episode_completes() {
        let config = RolloutConfig::default();
        let mut pilot = AutopilotPolicy::new(&config.sim_config);
        let replay = run_episode(&config, &mut pilot).unwrap();

        assert!(!replay.frames.is_empty());
        assert!(replay.result.status.is_terminal());
        assert!(replay.result.steps <= MAX_STEPS);
    }

    #[test]
    fn test_free_fall_ends_quickly() {
        let config = RolloutConfig::default();
        let replay = run_episode(&config, &mut DoNothingPolicy).unwrap();

        // Free fall reaches the pad line in well under 100 steps; depending on
        // where the pad landed it is either a hard crash or a miss.
        assert!(replay.result.steps < 100);
        assert!(matches!(
            replay.result.status,
            EpisodeStatus::Crashed(CrashReason::TooFast) | EpisodeStatus::OutOfBounds
        ));
        assert_eq!(replay.frames.len() as u32, replay.result.steps + 1);
    }

    #[test]
    fn test_max_steps_caps_rollout() {
        let config = RolloutConfig {
            max_steps: 10,
            ..Default::default()
        };
        let replay = run_episode(&config, &mut DoNothingPolicy).unwrap();
        assert_eq!(replay.result.steps, 10);
        assert_eq!(replay.result.status, EpisodeStatus::Flying);
        // -0.1 per flying step
        assert!((replay.result.total_reward + 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_invalid_pilot_action_surfaces() {
        struct Broken;
        impl Policy for Broken {
            fn name(&self) -> &str {
                "broken"
            }
            fn act(&mut self, _frame: &Frame) -> u32 {
                42
            }
        }
        let err = run_episode(&RolloutConfig::default(), &mut Broken).unwrap_err();
        assert!(matches!(err, LanderError::InvalidAction { action: 42, .. }));
    }

    #[test]
    fn test_random_pilot_is_reproducible() {
        let config = RolloutConfig {
            seed: 9,
            ..Default::default()
        };
        let a = run_episode(&config, &mut RandomPolicy::new(ActionSpace::Simple, 1)).unwrap();
        let b = run_episode(&config, &mut RandomPolicy::new(ActionSpace::Simple, 1)).unwrap();
        assert_eq!(a.frames, b.frames);
        assert_eq!(a.result.total_reward, b.result.total_reward);
    }
}
