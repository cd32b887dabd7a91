use lander_shared::*;

use crate::action::Control;

/// Advance one fixed timestep.
///
/// Order is load-bearing: rotation, thrust, gravity, damping, then position
/// (semi-implicit Euler). Any other order produces different trajectories.
pub fn integrate(lander: &mut LanderState, control: Control, config: &SimConfig) {
    lander.angle += control.rotation;

    lander.velocity += control.thrust;
    lander.velocity.y += config.gravity;
    lander.velocity *= config.damping;

    lander.position += lander.velocity;
}
