use lander_shared::{Frame, ACTION_NOOP};

/// Input source: turns what it can see of the episode into an action id.
pub trait Policy: Send {
    fn name(&self) -> &str;
    fn act(&mut self, frame: &Frame) -> u32;
}

/// Policy that does nothing - the craft free-falls.
pub struct DoNothingPolicy;

impl Policy for DoNothingPolicy {
    fn name(&self) -> &str {
        "do_nothing"
    }

    fn act(&mut self, _frame: &Frame) -> u32 {
        ACTION_NOOP
    }
}
