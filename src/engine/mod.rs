//! The two integration engines and the per-step math they share.
//!
//! Both engines advance the same fixed-step RK4 scheme; they differ only in
//! how the "every stage reads the pre-step snapshot" rule is realized. The
//! single-threaded engine stages every body's update in a buffer and commits
//! in a second pass; the threaded engine separates the read and write phases
//! with a barrier rendezvous.

pub mod single;
pub mod threaded;

use nalgebra::Vector3;

use crate::body::Body;
use crate::consts::{HOURS_PER_DAY, MINUTES_PER_HOUR, SECONDS_PER_MINUTE};
use crate::forces::ForceModel;

/// Integration step, one simulated second.
const STEP: f64 = 1.0;
const HALF_STEP: f64 = STEP / 2.0;
const STAGE_WEIGHT: f64 = STEP / 6.0;

/// One RK4 step for the body at `index`, evaluated entirely against the
/// pre-step snapshot in `bodies`. Returns the candidate (position, velocity);
/// committing them is the caller's job.
pub(crate) fn rk4_step(
    bodies: &[Body],
    index: usize,
    forces: &ForceModel,
) -> (Vector3<f64>, Vector3<f64>) {
    let pi = bodies[index].position;
    let vi = bodies[index].velocity;

    let k1_v = forces.acceleration_at(bodies, pi, index);
    let k1_r = vi;

    let k2_v = forces.acceleration_at(bodies, pi + k1_r * HALF_STEP, index);
    let k2_r = vi + k1_v * HALF_STEP;

    let k3_v = forces.acceleration_at(bodies, pi + k2_r * HALF_STEP, index);
    let k3_r = vi + k2_v * HALF_STEP;

    let k4_v = forces.acceleration_at(bodies, pi + k3_r * STEP, index);
    let k4_r = vi + k3_v * STEP;

    let velocity = vi + (k1_v + k2_v * 2.0 + k3_v * 2.0 + k4_v) * STAGE_WEIGHT;
    let position = pi + (k1_r + k2_r * 2.0 + k3_r * 2.0 + k4_r) * STAGE_WEIGHT;

    (position, velocity)
}

/// Seconds → minutes → hours bookkeeping for a run of whole simulated days.
///
/// Purely a progress/termination counter; one `tick` per committed step.
#[derive(Debug, Clone)]
pub(crate) struct Clock {
    seconds: u32,
    minutes: u32,
    hours: u64,
    end_hours: u64,
}

impl Clock {
    pub fn new(days: u32) -> Self {
        Clock {
            seconds: 0,
            minutes: 0,
            hours: 0,
            end_hours: u64::from(HOURS_PER_DAY) * u64::from(days),
        }
    }

    /// Advances one second; returns true when a minute boundary was crossed,
    /// which is the engines' cue to sample positions.
    pub fn tick(&mut self) -> bool {
        self.seconds += 1;
        if self.seconds < SECONDS_PER_MINUTE {
            return false;
        }

        self.seconds = 0;
        self.minutes += 1;
        if self.minutes == MINUTES_PER_HOUR {
            self.minutes = 0;
            self.hours += 1;
        }
        true
    }

    pub fn finished(&self) -> bool {
        self.hours >= self.end_hours
    }
}
