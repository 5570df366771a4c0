use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Barrier, PoisonError, RwLock};
use std::thread;

use anyhow::{anyhow, ensure, Result};
use log::info;

use super::{rk4_step, Clock};
use crate::body::Body;
use crate::consts::SECONDS_PER_MINUTE;
use crate::forces::ForceModel;
use crate::sink::SampleSink;

// TODO: one OS thread per body stops scaling somewhere in the hundreds of
// bodies; a fixed worker pool with the same two-phase rendezvous would lift
// that without changing observable behavior.

/// Everything the workers and the timekeeper rendezvous on. Owned by one
/// engine invocation; nothing here outlives the run.
struct SyncContext {
    /// N workers plus the timekeeper.
    barrier: Barrier,
    /// The shutdown handshake flag. Workers read it only at the top of
    /// their loop; the timekeeper clears it between the two rendezvous of
    /// the final cycle.
    running: AtomicBool,
}

/// Advances all bodies using one worker thread per body plus a timekeeper
/// thread, all synchronized on a reusable barrier of `bodies.len() + 1`
/// parties.
///
/// Each simulated second is one barrier cycle:
/// - compute phase: every worker evaluates its own RK4 stages against the
///   shared state, which nobody is writing;
/// - first rendezvous: all reads of the previous step are done;
/// - commit phase: each worker writes its own index only, and samples its
///   newly committed position to its own sink on minute boundaries;
/// - second rendezvous: all writes are visible before the next compute.
///
/// Because every cross-body read happens against state fully committed in
/// the previous cycle, the result is step-for-step identical to the
/// single-threaded engine regardless of scheduling.
///
/// Consumes one sink per body; each worker closes its own on the way out.
/// Returns the final body list.
pub fn run<S>(bodies: Vec<Body>, days: u32, sinks: Vec<S>) -> Result<Vec<Body>>
where
    S: SampleSink + Send,
{
    ensure!(
        sinks.len() == bodies.len(),
        "expected one sink per body: {} bodies but {} sinks",
        bodies.len(),
        sinks.len()
    );

    let body_count = bodies.len();
    info!(
        "beginning simulation on {} threads ({} workers + timekeeper)",
        body_count + 1,
        body_count
    );

    let forces = ForceModel::new();
    let context = SyncContext {
        barrier: Barrier::new(body_count + 1),
        running: AtomicBool::new(true),
    };
    let shared = RwLock::new(bodies);

    thread::scope(|scope| -> Result<()> {
        let mut workers = Vec::with_capacity(body_count);
        for (index, sink) in sinks.into_iter().enumerate() {
            let context = &context;
            let shared = &shared;
            let forces = &forces;
            workers.push(scope.spawn(move || worker(index, sink, context, shared, forces)));
        }
        let time_thread = scope.spawn(|| timekeeper(days, &context));

        for (index, handle) in workers.into_iter().enumerate() {
            handle
                .join()
                .map_err(|_| anyhow!("worker thread {index} panicked"))??;
        }
        time_thread
            .join()
            .map_err(|_| anyhow!("timekeeper thread panicked"))?;
        Ok(())
    })?;

    info!("multithreaded simulation complete");
    Ok(shared.into_inner().unwrap_or_else(PoisonError::into_inner))
}

/// One body's integration loop.
fn worker<S: SampleSink>(
    index: usize,
    mut sink: S,
    context: &SyncContext,
    shared: &RwLock<Vec<Body>>,
    forces: &ForceModel,
) -> Result<()> {
    let mut elapsed_seconds: u64 = 0;
    let mut seconds_this_minute: u32 = 0;
    // A failed sample write cannot abort the loop early: walking away would
    // strand every other party at the barrier. Remember it, stop sampling,
    // and report once the run winds down.
    let mut sink_error: Option<anyhow::Error> = None;

    while context.running.load(Ordering::Acquire) {
        // Compute phase: shared reads only. The guard is dropped before the
        // rendezvous so nobody holds the lock across a barrier wait.
        let (position, velocity) = {
            let snapshot = shared.read().unwrap_or_else(PoisonError::into_inner);
            rk4_step(&snapshot, index, forces)
        };

        context.barrier.wait();

        // Commit phase: this worker owns exactly its own index.
        {
            let mut state = shared.write().unwrap_or_else(PoisonError::into_inner);
            state[index].position = position;
            state[index].velocity = velocity;
        }

        elapsed_seconds += 1;
        seconds_this_minute += 1;
        if seconds_this_minute == SECONDS_PER_MINUTE {
            seconds_this_minute = 0;
            if sink_error.is_none() {
                if let Err(error) = sink.record(index, elapsed_seconds, &position) {
                    sink_error = Some(error);
                }
            }
        }

        context.barrier.wait();
    }

    match sink_error {
        Some(error) => Err(error),
        None => sink.close(),
    }
}

/// Counts simulated time and runs the shutdown handshake. Participates in
/// both rendezvous of every cycle but never touches body state.
fn timekeeper(days: u32, context: &SyncContext) {
    let mut clock = Clock::new(days);

    loop {
        clock.tick();
        if clock.finished() {
            break;
        }
        context.barrier.wait();
        context.barrier.wait();
    }

    // Final cycle: clearing the flag between the two rendezvous guarantees
    // every worker commits exactly one more full step before it can observe
    // the shutdown, and nobody is left waiting on a missing party.
    context.barrier.wait();
    context.running.store(false, Ordering::Release);
    context.barrier.wait();
}
