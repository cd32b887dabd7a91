pub mod action;
pub mod analyzer;
pub mod episode;
pub mod observation;
pub mod physics;
pub mod pilots;
pub mod policy;
pub mod render;
pub mod reward;
pub mod rollout;
pub mod termination;

pub use action::*;
pub use episode::*;
pub use physics::*;
pub use policy::*;
pub use render::*;
pub use rollout::*;
