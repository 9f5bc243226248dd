//! Cron-driven dispatch of dump runs.
//!
//! [`Scheduler::start`] spawns a dispatcher thread that sleeps until the next
//! trigger of a [`cron::Schedule`] (in local time) and then hands the job to
//! a worker thread.  The dispatcher never runs the job itself, so a slow dump
//! cannot delay the clock.
//!
//! At most one run is in flight: a trigger that fires while the previous run
//! is still going is skipped and reported as [`TriggerOutcome::Skipped`].
//! Every trigger's result goes to a [`TriggerSink`]; a failed run is reported
//! there and the schedule carries on.

use std::{
    io,
    str::FromStr,
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
        mpsc::{self, RecvTimeoutError},
    },
    thread::{self, JoinHandle},
};

use chrono::{DateTime, Local};
use cron::Schedule;

use crate::error::DumpError;

// ─── Parsing ──────────────────────────────────────────────────────────────────

/// Parse a cron expression.
///
/// Accepts the seconds-first six/seven field form (`0 30 2 * * *`), the
/// `@daily`-style shorthands, and classic five-field expressions, which run
/// at second zero.
pub fn parse_schedule(expression: &str) -> Result<Schedule, DumpError> {
    let trimmed = expression.trim();
    let normalized = if trimmed.split_whitespace().count() == 5 {
        format!("0 {trimmed}")
    } else {
        trimmed.to_string()
    };

    Schedule::from_str(&normalized).map_err(|e| DumpError::InvalidSchedule {
        expression: expression.to_string(),
        reason: e.to_string(),
    })
}

// ─── Trigger results ──────────────────────────────────────────────────────────

/// What happened when the schedule fired.
#[derive(Debug)]
pub enum TriggerOutcome {
    Completed,
    Failed(DumpError),
    /// The previous run was still in progress.
    Skipped,
}

/// Receives the outcome of every trigger.
pub trait TriggerSink: Send + Sync {
    fn record(&self, outcome: TriggerOutcome);
}

/// Logs trigger outcomes through `tracing`.
pub struct TracingSink;

impl TriggerSink for TracingSink {
    fn record(&self, outcome: TriggerOutcome) {
        match outcome {
            TriggerOutcome::Completed => tracing::info!("scheduled dump completed"),
            TriggerOutcome::Failed(e) => tracing::error!(error = %e, "scheduled dump failed"),
            TriggerOutcome::Skipped => {
                tracing::warn!("previous dump still running, trigger skipped");
            },
        }
    }
}

// ─── Overlap guard ────────────────────────────────────────────────────────────

/// Non-reentrancy flag shared by the dispatcher and its workers.
#[derive(Debug, Default, Clone)]
pub struct JobGuard {
    running: Arc<AtomicBool>,
}

impl JobGuard {
    /// Claim the guard.  `None` while another permit is alive.
    pub fn try_acquire(&self) -> Option<RunPermit> {
        self.running
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| RunPermit {
                running: Arc::clone(&self.running),
            })
    }

    #[cfg(test)]
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }
}

/// Releases the [`JobGuard`] when dropped, including on panic.
#[derive(Debug)]
pub struct RunPermit {
    running: Arc<AtomicBool>,
}

impl Drop for RunPermit {
    fn drop(&mut self) {
        self.running.store(false, Ordering::Release);
    }
}

// ─── Scheduler ────────────────────────────────────────────────────────────────

/// The work done on each trigger.
pub type Job = Arc<dyn Fn() -> Result<(), DumpError> + Send + Sync>;

pub struct Scheduler;

impl Scheduler {
    /// Start dispatching `job` on `schedule`.  Returns once the dispatcher
    /// thread is running.
    pub fn start(
        schedule: Schedule,
        job: Job,
        sink: Arc<dyn TriggerSink>,
    ) -> io::Result<ScheduleHandle> {
        let (stop_tx, stop_rx) = mpsc::channel();
        let guard = JobGuard::default();
        let dispatcher_guard = guard.clone();

        let thread = thread::Builder::new()
            .name("dump-scheduler".into())
            .spawn(move || dispatch(&schedule, &job, &sink, &dispatcher_guard, &stop_rx))?;

        Ok(ScheduleHandle {
            stop: stop_tx,
            thread,
            #[cfg(test)]
            guard,
        })
    }
}

/// Owner of a running dispatcher.  Dropping it stops the dispatcher.
pub struct ScheduleHandle {
    stop: mpsc::Sender<()>,
    thread: JoinHandle<()>,
    #[cfg(test)]
    guard: JobGuard,
}

impl ScheduleHandle {
    /// Block until the dispatcher exits, which only happens if the schedule
    /// runs out of upcoming triggers.
    pub fn wait(self) -> thread::Result<()> {
        let _stop = self.stop;
        self.thread.join()
    }

    /// Stop the dispatcher and wait for it.  A run already in flight is left
    /// to finish on its own thread.
    #[cfg(test)]
    pub fn stop(self) -> thread::Result<()> {
        // A send error means the dispatcher is already gone.
        let _ = self.stop.send(());
        self.thread.join()
    }

    #[cfg(test)]
    pub fn is_finished(&self) -> bool {
        self.thread.is_finished()
    }

    /// Whether a dump started by this schedule is currently running.
    #[cfg(test)]
    pub fn job_running(&self) -> bool {
        self.guard.is_running()
    }
}

fn dispatch(
    schedule: &Schedule,
    job: &Job,
    sink: &Arc<dyn TriggerSink>,
    guard: &JobGuard,
    stop: &mpsc::Receiver<()>,
) {
    let mut last_fired: Option<DateTime<Local>> = None;

    loop {
        let now = Local::now();
        // Never hand out the same trigger twice, even if we woke a hair early.
        let from = match last_fired {
            Some(last) if last > now => last,
            _ => now,
        };
        let Some(next) = schedule.after(&from).next() else {
            tracing::warn!("schedule has no upcoming triggers, dispatcher exiting");
            return;
        };
        tracing::debug!(%next, "next dump scheduled");

        let wait = (next - Local::now()).to_std().unwrap_or_default();
        match stop.recv_timeout(wait) {
            Err(RecvTimeoutError::Timeout) => {
                last_fired = Some(next);
                fire(job, sink, guard);
            },
            Ok(()) | Err(RecvTimeoutError::Disconnected) => {
                tracing::debug!("dispatcher stopping");
                return;
            },
        }
    }
}

fn fire(job: &Job, sink: &Arc<dyn TriggerSink>, guard: &JobGuard) {
    let Some(permit) = guard.try_acquire() else {
        sink.record(TriggerOutcome::Skipped);
        return;
    };

    let job = Arc::clone(job);
    let worker_sink = Arc::clone(sink);
    let spawned = thread::Builder::new()
        .name("dump-run".into())
        .spawn(move || {
            let _permit = permit;
            let outcome = match job() {
                Ok(()) => TriggerOutcome::Completed,
                Err(e) => TriggerOutcome::Failed(e),
            };
            worker_sink.record(outcome);
        });

    // The closure, and the permit with it, is dropped if the spawn fails.
    if let Err(e) = spawned {
        tracing::error!(error = %e, "could not start dump worker thread");
    }
}

// ─── Tests ────────────────────────────────────────────────────────────────────
