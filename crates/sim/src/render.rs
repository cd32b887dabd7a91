use lander_shared::Frame;

/// Consumer of read-only frames. The kernel never builds one itself; callers
/// hand it to the rollout runner.
pub trait Renderer {
    fn draw(&mut self, frame: &Frame);

    /// Called once with the last frame of a rollout.
    fn finish(&mut self, _frame: &Frame) {}
}

impl<R: Renderer + ?Sized> Renderer for &mut R {
    fn draw(&mut self, frame: &Frame) {
        (**self).draw(frame);
    }

    fn finish(&mut self, frame: &Frame) {
        (**self).finish(frame);
    }
}

/// Fan-out: both renderers see every frame, left first.
impl<A: Renderer, B: Renderer> Renderer for (A, B) {
    fn draw(&mut self, frame: &Frame) {
        self.0.draw(frame);
        self.1.draw(frame);
    }

    fn finish(&mut self, frame: &Frame) {
        self.0.finish(frame);
        self.1.finish(frame);
    }
}

/// An absent renderer draws nothing.
impl<R: Renderer> Renderer for Option<R> {
    fn draw(&mut self, frame: &Frame) {
        if let Some(r) = self {
            r.draw(frame);
        }
    }

    fn finish(&mut self, frame: &Frame) {
        if let Some(r) = self {
            r.finish(frame);
        }
    }
}

/// Keeps every `interval`-th frame plus terminal and final frames.
#[derive(Debug, Default)]
pub struct FrameRecorder {
    interval: u32,
    frames: Vec<Frame>,
}

impl FrameRecorder {
    pub fn new(interval: u32) -> Self {
        Self {
            interval: interval.max(1),
            frames: Vec::new(),
        }
    }

    pub fn frames(&self) -> &[Frame] {
        &self.frames
    }

    pub fn into_frames(self) -> Vec<Frame> {
        self.frames
    }
}

impl Renderer for FrameRecorder {
    fn draw(&mut self, frame: &Frame) {
        if frame.step % self.interval == 0 || frame.status.is_terminal() {
            self.frames.push(*frame);
        }
    }

    fn finish(&mut self, frame: &Frame) {
        if self.frames.last().map(|f| f.step) != Some(frame.step) {
            self.frames.push(*frame);
        }
    }
}

/// Emits one `tracing` debug event per frame.
pub struct LogRenderer;

impl Renderer for LogRenderer {
    fn draw(&mut self, frame: &Frame) {
        tracing::debug!(
            step = frame.step,
            x = frame.lander.position.x,
            y = frame.lander.position.y,
            vx = frame.lander.velocity.x,
            vy = frame.lander.velocity.y,
            angle = frame.lander.angle,
            action = frame.action,
            reward = frame.reward,
            status = frame.status.label(),
            "frame"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::episode::Episode;
    use lander_shared::*;

    #[test]
    fn test_recorder_interval_and_final_frame() {
        let mut ep = Episode::new(SimConfig::default(), 1).unwrap();
        let mut recorder = FrameRecorder::new(4);
        recorder.draw(&ep.snapshot());
        for _ in 0..10 {
            ep.step(ACTION_NOOP).unwrap();
            recorder.draw(&ep.snapshot());
        }
        recorder.finish(&ep.snapshot());

        let steps: Vec<u32> = recorder.frames().iter().map(|f| f.step).collect();
        assert_eq!(steps, vec![0, 4, 8, 10]);
    }

    #[test]
    fn test_pair_sees_every_frame() {
        let config = RolloutConfig {
            max_steps: 12,
            ..Default::default()
        };
        let mut sparse = FrameRecorder::new(5);
        let mut every = FrameRecorder::new(1);
        let result = crate::rollout::run_episode_with(
            &config,
            &mut crate::policy::DoNothingPolicy,
            &mut (&mut sparse, &mut every),
        )
        .unwrap();

        assert_eq!(result.steps, 12);
        let dense: Vec<u32> = every.frames().iter().map(|f| f.step).collect();
        assert_eq!(dense, (0..=12).collect::<Vec<u32>>(), "every frame should reach the second renderer");
        let steps: Vec<u32> = sparse.frames().iter().map(|f| f.step).collect();
        assert_eq!(steps, vec![0, 5, 10, 12]);
    }

    #[test]
    fn test_none_renderer_draws_nothing() {
        let ep = Episode::new(SimConfig::default(), 1).unwrap();
        let mut off: Option<FrameRecorder> = None;
        off.draw(&ep.snapshot());
        assert!(off.is_none());

        let mut on = Some(FrameRecorder::new(1));
        on.draw(&ep.snapshot());
        on.finish(&ep.snapshot());
        assert_eq!(on.map(|r| r.into_frames().len()), Some(1));
    }

    #[test]
    fn test_recorder_finish_does_not_duplicate() {
        let ep = Episode::new(SimConfig::default(), 1).unwrap();
        let mut recorder = FrameRecorder::new(1);
        recorder.draw(&ep.snapshot());
        recorder.finish(&ep.snapshot());
        assert_eq!(recorder.frames().len(), 1);
    }
}
