// Display loop
pub const TICK_RATE: u32 = 60;

// Rollouts
pub const MAX_STEPS: u32 = 2000;
pub const FRAME_INTERVAL: u32 = 1;

// Screen (origin top-left, y grows downward)
pub const SCREEN_WIDTH: f32 = 800.0;
pub const SCREEN_HEIGHT: f32 = 600.0;

// Craft
pub const LANDER_WIDTH: f32 = 20.0;
pub const LANDER_HEIGHT: f32 = 40.0;
pub const SPAWN_Y: f32 = 50.0;

// Forces (per step)
pub const GRAVITY: f32 = 0.2;
pub const THRUST: f32 = 0.3;
pub const THRUST_UNIT: f32 = 0.1; // graded levels are 1x, 2x, 3x this
pub const ROTATION_SPEED: f32 = 1.5; // degrees per step
pub const DAMPING: f32 = 0.99;

// Pad
pub const PAD_WIDTH: f32 = 100.0;
pub const PAD_HEIGHT: f32 = 20.0;
pub const PAD_MARGIN: f32 = 50.0; // distance from the bottom edge to the pad top

// Safe landing envelope
pub const VELOCITY_THRESHOLD: f32 = 2.0;
pub const ANGLE_THRESHOLD: f32 = 15.0; // degrees

// Actions
pub const SIMPLE_ACTIONS: u32 = 4;
pub const GRADED_ACTIONS: u32 = 6;
pub const ACTION_NOOP: u32 = 0;
pub const ACTION_ROTATE_LEFT: u32 = 1;
pub const ACTION_ROTATE_RIGHT: u32 = 2;
pub const ACTION_THRUST: u32 = 3;

// Observation
pub const OBS_SIZE: usize = 7;

// Fixed normalization denominators for the normalized observation.
pub const NORM_SPEED: f32 = 10.0;
pub const NORM_ANGLE: f32 = 180.0;

// Rewards
pub const LANDING_REWARD: f32 = 100.0;
pub const FAILURE_REWARD: f32 = -100.0;
pub const STEP_REWARD: f32 = -0.1;
pub const DISTANCE_WEIGHT: f32 = 0.01;
pub const SPEED_WEIGHT: f32 = 0.1;
pub const TILT_WEIGHT: f32 = 0.5;
