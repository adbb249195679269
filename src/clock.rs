//! Fixed-rate simulation thread
//!
//! The worker is moved onto a dedicated thread and ticked once per period:
//! `advance_tick` then `sync_presentation`, then sleep for whatever is left of
//! the period. Stopping clears the `running` latch; the thread finishes its
//! current tick, exits, and hands the worker back through a channel.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use crate::error::LifecycleError;

/// Work done once per clock period
pub trait TickWorker: Send + 'static {
    fn advance_tick(&mut self);
    fn sync_presentation(&mut self);
}

/// Counters shared with the clock thread
#[derive(Debug, Default)]
pub struct ClockStats {
    ticks: AtomicU64,
    overruns: AtomicU64,
}

impl ClockStats {
    pub fn ticks(&self) -> u64 {
        self.ticks.load(Ordering::Relaxed)
    }

    /// Iterations that used up the whole period
    pub fn overruns(&self) -> u64 {
        self.overruns.load(Ordering::Relaxed)
    }
}

pub struct SimulationClock<W: TickWorker> {
    name: String,
    running: Arc<AtomicBool>,
    stats: Arc<ClockStats>,
    done: Receiver<W>,
    handle: Option<JoinHandle<()>>,
}

impl<W: TickWorker> SimulationClock<W> {
    /// Spawn the clock thread and start ticking `worker` every `period`
    pub fn start(name: &str, period: Duration, worker: W) -> Result<Self, LifecycleError> {
        let running = Arc::new(AtomicBool::new(true));
        let stats = Arc::new(ClockStats::default());
        let (done_tx, done) = mpsc::sync_channel(1);

        let handle = thread::Builder::new()
            .name(name.to_owned())
            .spawn({
                let running = running.clone();
                let stats = stats.clone();
                move || {
                    let mut worker = worker;
                    run(&running, period, &stats, &mut worker);
                    // Receiver may be gone if the clock was dropped without stop()
                    let _ = done_tx.send(worker);
                }
            })
            .map_err(LifecycleError::Spawn)?;

        log::debug!("{} clock started ({:?} period)", name, period);
        Ok(Self {
            name: name.to_owned(),
            running,
            stats,
            done,
            handle: Some(handle),
        })
    }

    pub fn is_running(&self) -> bool {
        self.handle.is_some()
    }

    pub fn stats(&self) -> &Arc<ClockStats> {
        &self.stats
    }

    /// Stop the thread and take the worker back.
    ///
    /// Waits at most `timeout` for the in-flight tick to finish. On
    /// `ShutdownTimeout` the thread may still be ticking; the clock stays
    /// valid and `stop` can be retried.
    pub fn stop(&mut self, timeout: Duration) -> Result<W, LifecycleError> {
        if self.handle.is_none() {
            return Err(LifecycleError::NotRunning);
        }
        self.running.store(false, Ordering::Release);

        match self.done.recv_timeout(timeout) {
            Ok(worker) => {
                if let Some(handle) = self.handle.take() {
                    let _ = handle.join();
                }
                log::debug!(
                    "{} clock stopped after {} ticks ({} overruns)",
                    self.name,
                    self.stats.ticks(),
                    self.stats.overruns()
                );
                Ok(worker)
            }
            Err(RecvTimeoutError::Timeout) => Err(LifecycleError::ShutdownTimeout {
                timeout_ms: timeout.as_millis() as u64,
            }),
            Err(RecvTimeoutError::Disconnected) => {
                if let Some(handle) = self.handle.take() {
                    let _ = handle.join();
                }
                Err(LifecycleError::WorkerPanicked)
            }
        }
    }
}

impl<W: TickWorker> Drop for SimulationClock<W> {
    fn drop(&mut self) {
        if self.handle.is_some() {
            log::warn!("{} clock dropped while running, detaching thread", self.name);
            self.running.store(false, Ordering::Release);
        }
    }
}

fn run<W: TickWorker>(running: &AtomicBool, period: Duration, stats: &ClockStats, worker: &mut W) {
    while running.load(Ordering::Acquire) {
        let start = Instant::now();

        worker.advance_tick();
        worker.sync_presentation();
        stats.ticks.fetch_add(1, Ordering::Relaxed);

        match period.checked_sub(start.elapsed()) {
            Some(rest) if !rest.is_zero() => thread::sleep(rest),
            _ => {
                stats.overruns.fetch_add(1, Ordering::Relaxed);
                log::trace!("tick overran {:?} budget", period);
            }
        }
    }
}
