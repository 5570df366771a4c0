use std::sync::atomic::{AtomicBool, Ordering};

use log::warn;
use nalgebra::Vector3;

use crate::body::Body;
use crate::consts::MIN_SEPARATION_SQUARED;

/// Direct all-pairs gravitational acceleration.
///
/// Holds the warning latch for near-singular separations, so the "objects too
/// close" message is emitted at most once per model instance no matter how
/// many pairs or steps trigger it. Both engines share one instance for the
/// whole run.
#[derive(Debug, Default)]
pub struct ForceModel {
    close_approach_warned: AtomicBool,
}

impl ForceModel {
    pub fn new() -> Self {
        ForceModel::default()
    }

    /// Net gravitational acceleration at `trial_position`, summed over every
    /// body except `self_index`.
    ///
    /// Masses are expected to be pre-multiplied by the gravitational
    /// constant, so each term is just `q · m_j / |q|³`. When a pair sits
    /// closer than 1000 m the squared distance is clamped to keep the term
    /// finite; that is a stability guard, not a collision model.
    pub fn acceleration_at(
        &self,
        bodies: &[Body],
        trial_position: Vector3<f64>,
        self_index: usize,
    ) -> Vector3<f64> {
        let mut sum = Vector3::zeros();

        for (j, other) in bodies.iter().enumerate() {
            if j == self_index {
                continue;
            }

            let q = other.position - trial_position;
            let mut mag_squared = q.norm_squared();
            if mag_squared < MIN_SEPARATION_SQUARED {
                self.note_close_approach();
                mag_squared = MIN_SEPARATION_SQUARED;
            }

            sum += q * (other.mass * mag_squared.powf(-1.5));
        }

        sum
    }

    /// Whether any pair has come within the clamp distance so far.
    pub fn close_approach_occurred(&self) -> bool {
        self.close_approach_warned.load(Ordering::Relaxed)
    }

    /// Latches the warning; returns true only for the call that fired it.
    fn note_close_approach(&self) -> bool {
        let already = self.close_approach_warned.swap(true, Ordering::Relaxed);
        if !already {
            warn!(
                "two objects are separated by a distance less than 1000 m; \
                 collision is anticipated and accuracy of results is compromised"
            );
        }
        !already
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn body(name: &str, mass: f64, position: Vector3<f64>) -> Body {
        Body::new(name, mass, position, Vector3::zeros())
    }

    #[test]
    fn excludes_own_contribution() {
        // Trial position coincides exactly with body 0's own position; if the
        // self-term were included it would clamp to a spurious finite pull.
        let bodies = vec![
            body("a", 1.0e15, Vector3::new(0.0, 0.0, 0.0)),
            body("b", 2.0e15, Vector3::new(1.0e5, 0.0, 0.0)),
        ];
        let forces = ForceModel::new();

        let accel = forces.acceleration_at(&bodies, bodies[0].position, 0);

        let expected = 2.0e15 / (1.0e5_f64 * 1.0e5);
        assert_relative_eq!(accel.x, expected, max_relative = 1e-12);
        assert_eq!(accel.y, 0.0);
        assert_eq!(accel.z, 0.0);
        assert!(!forces.close_approach_occurred());
    }

    #[test]
    fn zero_mass_contributes_nothing() {
        let trial = Vector3::new(2.0e5, -1.0e5, 3.0e4);
        let with_massless = vec![
            body("self", 1.0e15, Vector3::zeros()),
            body("other", 5.0e14, Vector3::new(7.0e5, 1.0e5, 0.0)),
            body("ghost", 0.0, Vector3::new(-3.0e5, 2.0e5, 1.0e5)),
        ];
        let without = with_massless[..2].to_vec();
        let forces = ForceModel::new();

        let a = forces.acceleration_at(&with_massless, trial, 0);
        let b = forces.acceleration_at(&without, trial, 0);

        assert_eq!(a, b);
    }

    #[test]
    fn summation_is_order_independent_in_value() {
        let trial = Vector3::new(1.0e4, 2.0e4, -5.0e3);
        let bodies = vec![
            body("self", 1.0e15, trial),
            body("b", 3.0e14, Vector3::new(9.0e5, 0.0, 0.0)),
            body("c", 7.0e14, Vector3::new(0.0, -8.0e5, 2.0e5)),
            body("d", 1.0e13, Vector3::new(4.0e5, 4.0e5, 4.0e5)),
        ];
        // Same set with the non-self bodies listed in a different order.
        let permuted = vec![
            bodies[0].clone(),
            bodies[3].clone(),
            bodies[1].clone(),
            bodies[2].clone(),
        ];
        let forces = ForceModel::new();

        let a = forces.acceleration_at(&bodies, trial, 0);
        let b = forces.acceleration_at(&permuted, trial, 0);

        assert_relative_eq!(a.x, b.x, max_relative = 1e-15);
        assert_relative_eq!(a.y, b.y, max_relative = 1e-15);
        assert_relative_eq!(a.z, b.z, max_relative = 1e-15);
    }

    #[test]
    fn close_pairs_use_clamped_distance() {
        // 500 m apart: the true inverse-square term would be four times
        // larger than the clamped one.
        let bodies = vec![
            body("a", 1.0e15, Vector3::zeros()),
            body("b", 1.0e15, Vector3::new(500.0, 0.0, 0.0)),
        ];
        let forces = ForceModel::new();

        let accel = forces.acceleration_at(&bodies, bodies[0].position, 0);

        // q · m / (1e6)^1.5 with |q| = 500
        let expected = 500.0 * 1.0e15 * 1.0e6_f64.powf(-1.5);
        assert_relative_eq!(accel.x, expected, max_relative = 1e-12);
        assert!(forces.close_approach_occurred());
    }

    #[test]
    fn warning_latch_fires_exactly_once() {
        let forces = ForceModel::new();
        assert!(forces.note_close_approach());
        assert!(!forces.note_close_approach());
        assert!(!forces.note_close_approach());
        assert!(forces.close_approach_occurred());
    }

    #[test]
    fn latch_stays_set_across_many_violating_pairs() {
        let bodies = vec![
            body("a", 1.0e15, Vector3::zeros()),
            body("b", 1.0e15, Vector3::new(10.0, 0.0, 0.0)),
            body("c", 1.0e15, Vector3::new(0.0, 20.0, 0.0)),
            body("d", 1.0e15, Vector3::new(0.0, 0.0, 30.0)),
        ];
        let forces = ForceModel::new();

        for i in 0..bodies.len() {
            forces.acceleration_at(&bodies, bodies[i].position, i);
        }

        assert!(forces.close_approach_occurred());
        // A fresh model has its own latch.
        assert!(!ForceModel::new().close_approach_occurred());
    }
}
