use lander_shared::*;

/// `[x, y, vx, vy, angle, pad_x, pad_y]` in native units.
pub fn observe_raw(lander: &LanderState, pad: &PadState) -> Observation {
    Observation {
        data: [
            lander.position.x,
            lander.position.y,
            lander.velocity.x,
            lander.velocity.y,
            lander.angle,
            pad.x,
            pad.y,
        ],
    }
}

/// Raw observation divided by fixed nominal scales. Not clamped: fast or
/// spinning craft legitimately produce values outside [-1, 1].
pub fn observe_normalized(lander: &LanderState, pad: &PadState, config: &SimConfig) -> Observation {
    let mut obs = observe_raw(lander, pad);
    for (value, scale) in obs.data.iter_mut().zip(config.observation_scale()) {
        *value /= scale;
    }
    obs
}

/// Encode in whichever form the configuration selects.
pub fn encode(lander: &LanderState, pad: &PadState, config: &SimConfig) -> Observation {
    match config.observation_mode {
        ObservationMode::Raw => observe_raw(lander, pad),
        ObservationMode::Normalized => observe_normalized(lander, pad, config),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec2;

    fn moving() -> (LanderState, PadState, SimConfig) {
        let config = SimConfig::default();
        let pad = PadState::at(123.0, &config);
        let mut lander = LanderState::spawn(&config);
        lander.position = Vec2::new(250.5, 321.25);
        lander.velocity = Vec2::new(-3.5, 12.0);
        lander.angle = -400.0;
        (lander, pad, config)
    }

    #[test]
    fn test_raw_layout() {
        let (lander, pad, _) = moving();
        let obs = observe_raw(&lander, &pad);
        assert_eq!(obs.data, [250.5, 321.25, -3.5, 12.0, -400.0, 123.0, 550.0]);
    }

    #[test]
    fn test_normalized_values() {
        let (lander, pad, config) = moving();
        let obs = observe_normalized(&lander, &pad, &config);
        assert!((obs.data[0] - 250.5 / 800.0).abs() < 1e-6);
        assert!((obs.data[3] - 1.2).abs() < 1e-6);
        // Not clamped.
        assert!(obs.data[3] > 1.0);
        assert!(obs.data[4] < -2.0);
        assert!((obs.data[6] - 550.0 / 600.0).abs() < 1e-6);
    }

    #[test]
    fn test_normalization_round_trip() {
        let (lander, pad, config) = moving();
        let raw = observe_raw(&lander, &pad);
        let norm = observe_normalized(&lander, &pad, &config);
        for (i, scale) in config.observation_scale().iter().enumerate() {
            let rebuilt = norm.data[i] * scale;
            assert!(
                (rebuilt - raw.data[i]).abs() <= 1e-4 * raw.data[i].abs().max(1.0),
                "field {}: {} vs {}",
                i,
                rebuilt,
                raw.data[i]
            );
        }
    }

    #[test]
    fn test_encode_follows_mode() {
        let (lander, pad, mut config) = moving();
        assert_eq!(encode(&lander, &pad, &config), observe_raw(&lander, &pad));
        config.observation_mode = ObservationMode::Normalized;
        assert_eq!(
            encode(&lander, &pad, &config),
            observe_normalized(&lander, &pad, &config)
        );
    }
}
