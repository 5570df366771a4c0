//! Coordinate substitutions applied between loading and integration.

use log::info;
use nalgebra::Vector3;

use crate::body::Body;
use crate::consts::GRAV_CONST;

/// Rewrites positions and velocities relative to the system's center of mass
/// and net momentum, so the whole system doesn't drift out of frame over a
/// long run.
///
/// Divides by the total mass, which the loader guarantees is positive.
pub fn recenter_on_barycenter(bodies: &mut [Body]) {
    let total_mass: f64 = bodies.iter().map(|body| body.mass).sum();

    let total_momentum = bodies
        .iter()
        .fold(Vector3::zeros(), |sum: Vector3<f64>, body| {
            sum + body.velocity * body.mass
        });
    let total_moment = bodies
        .iter()
        .fold(Vector3::zeros(), |sum: Vector3<f64>, body| {
            sum + body.position * body.mass
        });

    let system_velocity = total_momentum / total_mass;
    let system_center = total_moment / total_mass;

    info!(
        "net velocity of system is ({:.3e}, {:.3e}, {:.3e}) m/s",
        system_velocity.x, system_velocity.y, system_velocity.z
    );
    info!(
        "center of mass of system is ({:.3e}, {:.3e}, {:.3e}) m",
        system_center.x, system_center.y, system_center.z
    );

    for body in bodies {
        body.position -= system_center;
        body.velocity -= system_velocity;
    }
}

/// Folds the gravitational constant into every mass. Done exactly once,
/// before integration; the force model relies on this and never multiplies
/// by G itself.
pub fn premultiply_gravity(bodies: &mut [Body]) {
    for body in bodies.iter_mut() {
        body.mass *= GRAV_CONST;
    }
}
