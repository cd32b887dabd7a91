use thiserror::Error;

use crate::config::ActionSpace;

/// Rejected configuration. Raised before any episode can be reset or stepped.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("damping must be in (0, 1], got {0}")]
    Damping(f32),
    #[error("{field} must be positive, got {value}")]
    NonPositive { field: &'static str, value: f32 },
    #[error("{field} must be finite, got {value}")]
    NonFinite { field: &'static str, value: f32 },
    #[error("pad width {pad_width} exceeds screen width {screen_width}")]
    PadWiderThanScreen { pad_width: f32, screen_width: f32 },
    #[error("unknown {kind} '{value}' (expected one of: {expected})")]
    UnknownVariant {
        kind: &'static str,
        value: String,
        expected: &'static str,
    },
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum LanderError {
    #[error("invalid action {action}: the {space} action space accepts 0..{n_actions}")]
    InvalidAction {
        action: i64,
        space: ActionSpace,
        n_actions: u32,
    },
    #[error("pad x {x} outside [0, {max_x}]")]
    PadOutOfRange { x: f32, max_x: f32 },
    #[error("invalid configuration: {0}")]
    InvalidConfig(#[from] ConfigError),
}
