use anyhow::Result;
use log::info;
use nalgebra::Vector3;

use super::{rk4_step, Clock};
use crate::body::Body;
use crate::forces::ForceModel;
use crate::sink::SampleSink;

/// Advances all bodies on the calling thread until `days` simulated days
/// have elapsed, sampling every body's position to `sink` once per simulated
/// minute.
///
/// Each step is two-phase: every body's new state is computed into a staging
/// buffer from the pre-step snapshot, then all of them are committed at
/// once. No body ever sees a neighbour already advanced to the new step, so
/// the result is independent of the iteration order over bodies.
pub fn run<S: SampleSink>(bodies: &mut [Body], days: u32, sink: &mut S) -> Result<()> {
    info!(
        "beginning single-threaded simulation: {} bodies for {} days",
        bodies.len(),
        days
    );

    let forces = ForceModel::new();
    let mut clock = Clock::new(days);
    let mut elapsed_seconds: u64 = 0;
    let mut staged: Vec<(Vector3<f64>, Vector3<f64>)> = Vec::with_capacity(bodies.len());

    while !clock.finished() {
        // Phase 1: compute every candidate state against the snapshot.
        staged.clear();
        {
            let snapshot: &[Body] = bodies;
            staged.extend((0..snapshot.len()).map(|i| rk4_step(snapshot, i, &forces)));
        }

        // Phase 2: commit.
        for (body, (position, velocity)) in bodies.iter_mut().zip(&staged) {
            body.position = *position;
            body.velocity = *velocity;
        }

        elapsed_seconds += 1;
        if clock.tick() {
            for (i, body) in bodies.iter().enumerate() {
                sink.record(i, elapsed_seconds, &body.position)?;
            }
        }
    }

    sink.close()?;
    info!("single-threaded simulation complete");
    Ok(())
}
