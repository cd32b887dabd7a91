use lander_shared::*;

/// Craft's horizontal extent intersects the pad's (edges inclusive).
pub fn overlaps_pad(lander: &LanderState, pad: &PadState) -> bool {
    lander.right() >= pad.x && lander.position.x <= pad.x + pad.width
}

/// Craft's lower edge has reached or passed the pad's top.
pub fn touches_pad(lander: &LanderState, pad: &PadState) -> bool {
    lander.bottom() >= pad.y
}

pub fn out_of_bounds(lander: &LanderState, config: &SimConfig) -> bool {
    lander.position.y > config.screen_height
        || lander.position.x < 0.0
        || lander.right() > config.screen_width
}

/// Classify a post-step state. Pad contact is checked before the screen
/// bounds, so a touchdown that also leaves the screen counts as contact.
pub fn classify(lander: &LanderState, pad: &PadState, config: &SimConfig) -> EpisodeStatus {
    if overlaps_pad(lander, pad) && touches_pad(lander, pad) {
        let slow = lander.velocity.x.abs() < config.velocity_threshold
            && lander.velocity.y.abs() < config.velocity_threshold;
        let upright = lander.angle.abs() < config.angle_threshold;

        return match (slow, upright) {
            (true, true) => EpisodeStatus::Landed,
            (true, false) => EpisodeStatus::Crashed(CrashReason::AngleTooSteep),
            (false, _) => EpisodeStatus::Crashed(CrashReason::TooFast),
        };
    }

    if out_of_bounds(lander, config) {
        return EpisodeStatus::OutOfBounds;
    }

    EpisodeStatus::Flying
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec2;

    /// Craft centered over a pad at x=350, bottom edge exactly on the pad top.
    fn on_pad() -> (LanderState, PadState, SimConfig) {
        let config = SimConfig::default();
        let pad = PadState::at(350.0, &config);
        let mut lander = LanderState::spawn(&config);
        lander.position = Vec2::new(390.0, pad.y - lander.height);
        (lander, pad, config)
    }

    #[test]
    fn test_gentle_upright_contact_lands() {
        let (lander, pad, config) = on_pad();
        assert_eq!(classify(&lander, &pad, &config), EpisodeStatus::Landed);
    }

    #[test]
    fn test_fast_contact_crashes() {
        let (mut lander, pad, config) = on_pad();
        lander.velocity.y = 5.0;
        assert_eq!(
            classify(&lander, &pad, &config),
            EpisodeStatus::Crashed(CrashReason::TooFast)
        );

        lander.velocity = Vec2::new(-2.0, 0.0);
        assert_eq!(
            classify(&lander, &pad, &config),
            EpisodeStatus::Crashed(CrashReason::TooFast)
        );
    }

    #[test]
    fn test_steep_contact_crashes() {
        let (mut lander, pad, config) = on_pad();
        lander.angle = 30.0;
        assert_eq!(
            classify(&lander, &pad, &config),
            EpisodeStatus::Crashed(CrashReason::AngleTooSteep)
        );

        // Exactly at the threshold is already too steep.
        lander.angle = -15.0;
        assert_eq!(
            classify(&lander, &pad, &config),
            EpisodeStatus::Crashed(CrashReason::AngleTooSteep)
        );

        // A full turn is not upright: angle is never wrapped.
        lander.angle = 360.0;
        assert_eq!(
            classify(&lander, &pad, &config),
            EpisodeStatus::Crashed(CrashReason::AngleTooSteep)
        );
    }

    #[test]
    fn test_too_fast_wins_over_too_steep() {
        let (mut lander, pad, config) = on_pad();
        lander.angle = 45.0;
        lander.velocity.y = 3.0;
        assert_eq!(
            classify(&lander, &pad, &config),
            EpisodeStatus::Crashed(CrashReason::TooFast)
        );
    }

    #[test]
    fn test_overlap_edges_are_inclusive() {
        let (mut lander, pad, config) = on_pad();
        lander.position.x = pad.x - lander.width;
        assert_eq!(classify(&lander, &pad, &config), EpisodeStatus::Landed);

        lander.position.x = pad.x + pad.width;
        assert_eq!(classify(&lander, &pad, &config), EpisodeStatus::Landed);

        lander.position.x = pad.x + pad.width + 0.5;
        assert_eq!(classify(&lander, &pad, &config), EpisodeStatus::Flying);
    }

    #[test]
    fn test_above_pad_is_flying() {
        let (mut lander, pad, config) = on_pad();
        lander.position.y -= 0.01;
        assert_eq!(classify(&lander, &pad, &config), EpisodeStatus::Flying);
    }

    #[test]
    fn test_out_of_bounds_edges() {
        let config = SimConfig::default();
        let pad = PadState::at(0.0, &config);
        let mut lander = LanderState::spawn(&config);

        lander.position = Vec2::new(400.0, 600.5);
        assert_eq!(classify(&lander, &pad, &config), EpisodeStatus::OutOfBounds);

        lander.position = Vec2::new(-0.1, 100.0);
        assert_eq!(classify(&lander, &pad, &config), EpisodeStatus::OutOfBounds);

        lander.position = Vec2::new(780.5, 100.0);
        assert_eq!(classify(&lander, &pad, &config), EpisodeStatus::OutOfBounds);

        // Touching the right edge exactly is still inside.
        lander.position = Vec2::new(780.0, 100.0);
        assert_eq!(classify(&lander, &pad, &config), EpisodeStatus::Flying);
    }

    #[test]
    fn test_contact_takes_precedence_over_bounds() {
        let config = SimConfig::default();
        let pad = PadState::at(0.0, &config);
        let mut lander = LanderState::spawn(&config);
        // Left of the screen but still overlapping the pad, resting on it.
        lander.position = Vec2::new(-5.0, pad.y - lander.height);
        assert_eq!(classify(&lander, &pad, &config), EpisodeStatus::Landed);
    }
}
