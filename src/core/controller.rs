//! # Phase controller: the two sweeps over the registry.
//!
//! The [`PhaseController`] drives every subsystem through the five-phase
//! state machine, sequentially in the resolved order:
//!
//! ```text
//! Startup sweep (start order):
//!   Inactive ──launch_check go──► LaunchChecked ──start──► Starting ──ok──► Running
//!       │             └─no-go──► Failed                        └─err──► Failed
//!       └─(dependency not Running)──► Failed
//!
//! Shutdown sweep (stop order = exact reverse):
//!   Running ──land_check go──► LandingChecked ──stop──► Stopping ──done──► Stopped
//!                └─no-go──► retry per LandingPolicy ──exhausted──► escalation
//! ```
//!
//! ## Rules
//! - The controller never proceeds to subsystem N+1 in the start sweep until
//!   subsystem N's `launch_check` + `start` have both completed (success or
//!   recorded failure); no overlapping starts across dependency boundaries.
//! - A non-critical failure is recorded and the sweep continues; a critical
//!   failure ends the sweep, and the caller tears down whatever already
//!   reached `Running`, in reverse order.
//! - A shutdown trigger observed between two starts aborts the remaining
//!   starts; partial startup is never left running unsupervised.
//! - The shutdown sweep is error-tolerant by construction: landing refusals,
//!   stop errors, worker panics, and join timeouts are recorded and the
//!   sweep continues.
//! - Every state transition publishes exactly one event.

use tokio::time;

use crate::config::Config;
use crate::core::registry::{Registry, SubsystemState};
use crate::core::shutdown::ShutdownLatch;
use crate::core::workers::{JoinOutcome, WorkerPool};
use crate::error::SubsystemError;
use crate::events::{Bus, Event, EventKind};
use crate::policies::LandingEscalation;
use crate::report::{RunReport, StopOutcome};
use crate::subsystems::Gate;

/// How the startup sweep ended.
pub(crate) enum SweepEnd {
    /// Every subsystem was processed; all critical ones are `Running`.
    Completed,
    /// A shutdown trigger fired mid-sweep; remaining starts were skipped.
    Aborted,
    /// A critical subsystem failed; remaining starts were skipped.
    CriticalFailed { subsystem: String, reason: String },
}

/// Drives the startup and shutdown sweeps for one run.
pub(crate) struct PhaseController<'a> {
    pub registry: &'a Registry,
    pub pool: &'a WorkerPool,
    pub bus: &'a Bus,
    pub cfg: &'a Config,
}

impl PhaseController<'_> {
    /// Runs the startup sweep over `order` (dependencies first).
    pub async fn startup_sweep(&self, order: &[String], latch: &ShutdownLatch) -> SweepEnd {
        for name in order {
            if latch.is_triggered() {
                self.bus.publish(
                    Event::new(EventKind::StartupAborted)
                        .with_reason("shutdown triggered during startup"),
                );
                return SweepEnd::Aborted;
            }
            if let Some(end) = self.start_one(name).await {
                self.bus.publish(
                    Event::new(EventKind::StartupAborted)
                        .with_subsystem(name.as_str())
                        .with_reason("critical subsystem failed"),
                );
                return end;
            }
        }
        self.bus.publish(Event::new(EventKind::StartupComplete));
        SweepEnd::Completed
    }

    /// Launch-checks and starts one subsystem.
    ///
    /// Returns `Some(SweepEnd::CriticalFailed { .. })` when the failure must
    /// abort the whole sweep, `None` otherwise.
    async fn start_one(&self, name: &str) -> Option<SweepEnd> {
        let subsystem = self.registry.subsystem(name)?;

        // Dependency guard: every listed dependency must be Running. A
        // dependency that failed non-critically takes its dependents down
        // with it, before their launch_check is even asked.
        let missing = self
            .registry
            .dependencies_of(name)
            .into_iter()
            .find(|dep| self.registry.state_of(dep) != Some(SubsystemState::Running));
        if let Some(dep) = missing {
            let err = SubsystemError::LaunchRejected {
                reason: format!("dependency '{dep}' is not running"),
            };
            return self.record_launch_failure(name, err);
        }

        // Gate 1: launch check, side-effect free, bounded.
        let gate = match bounded(self.cfg.check_bound(), subsystem.launch_check()).await {
            Ok(gate) => gate,
            Err(_elapsed) => Gate::no_go("launch check timed out"),
        };
        match gate {
            Gate::Go => {
                self.registry.set_state(name, SubsystemState::LaunchChecked);
                self.bus
                    .publish(Event::new(EventKind::LaunchCheckPassed).with_subsystem(name));
            }
            Gate::NoGo(reason) => {
                let err = SubsystemError::LaunchRejected { reason };
                return self.record_launch_failure(name, err);
            }
        }

        // Start, bounded. The token handed to the subsystem is the worker's
        // cooperative cancellation signal for the rest of the run.
        self.registry.set_state(name, SubsystemState::Starting);
        self.bus
            .publish(Event::new(EventKind::SubsystemStarting).with_subsystem(name));

        let cancel = tokio_util::sync::CancellationToken::new();
        let started = bounded(self.cfg.start_bound(), subsystem.start(cancel.clone())).await;
        match started {
            Ok(Ok(worker)) => {
                if let Some(handle) = worker {
                    self.pool.adopt(name, handle, cancel);
                }
                self.registry.set_state(name, SubsystemState::Running);
                self.bus
                    .publish(Event::new(EventKind::SubsystemRunning).with_subsystem(name));
                None
            }
            Ok(Err(err)) => {
                cancel.cancel();
                self.record_launch_failure(name, err)
            }
            Err(_elapsed) => {
                cancel.cancel();
                let err = SubsystemError::StartFailed {
                    reason: format!("start timed out after {:?}", self.cfg.start_timeout),
                };
                self.record_launch_failure(name, err)
            }
        }
    }

    /// Records a startup-side failure; escalates if the subsystem is critical.
    fn record_launch_failure(&self, name: &str, err: SubsystemError) -> Option<SweepEnd> {
        let reason = err.to_string();
        self.registry.fail(name, reason.clone());
        let kind = match err {
            SubsystemError::LaunchRejected { .. } => EventKind::LaunchRejected,
            _ => EventKind::SubsystemFailed,
        };
        self.bus.publish(
            Event::new(kind)
                .with_subsystem(name)
                .with_reason(reason.clone()),
        );
        if self.registry.is_critical(name) {
            Some(SweepEnd::CriticalFailed {
                subsystem: name.to_string(),
                reason,
            })
        } else {
            None
        }
    }

    /// Runs the shutdown sweep over `order` (dependents first).
    ///
    /// Subsystems not `Running` are skipped. Always runs to completion; its
    /// job is resource reclamation, not a business decision.
    pub async fn shutdown_sweep(&self, order: &[String]) -> RunReport {
        let mut entries = Vec::with_capacity(order.len());
        for name in order {
            let outcome = self.stop_one(name).await;
            entries.push((name.clone(), outcome));
        }
        RunReport::new(entries)
    }

    /// Landing-checks and stops one subsystem.
    async fn stop_one(&self, name: &str) -> StopOutcome {
        let state = self.registry.state_of(name);
        if state != Some(SubsystemState::Running) {
            return StopOutcome::Skipped(state.unwrap_or(SubsystemState::Inactive));
        }
        let subsystem = match self.registry.subsystem(name) {
            Some(s) => s,
            None => return StopOutcome::Skipped(SubsystemState::Inactive),
        };

        // Gate 2: landing check, retried per policy.
        let mut last_refusal = String::new();
        let mut approved = false;
        let attempts = self.cfg.landing.attempts_clamped();
        for attempt in 1..=attempts {
            let gate = match bounded(self.cfg.check_bound(), subsystem.land_check()).await {
                Ok(gate) => gate,
                Err(_elapsed) => Gate::no_go("landing check timed out"),
            };
            match gate {
                Gate::Go => {
                    self.registry
                        .set_state(name, SubsystemState::LandingChecked);
                    self.bus.publish(
                        Event::new(EventKind::LandingCheckPassed)
                            .with_subsystem(name)
                            .with_attempt(attempt),
                    );
                    approved = true;
                    break;
                }
                Gate::NoGo(reason) => {
                    let mut ev = Event::new(EventKind::LandingDeferred)
                        .with_subsystem(name)
                        .with_attempt(attempt)
                        .with_reason(reason.clone());
                    let retrying = attempt < attempts;
                    if retrying {
                        ev = ev.with_delay(self.cfg.landing.retry_delay);
                    }
                    self.bus.publish(ev);
                    last_refusal = reason;
                    if retrying {
                        time::sleep(self.cfg.landing.retry_delay).await;
                    }
                }
            }
        }

        if !approved {
            match self.cfg.landing.escalation {
                LandingEscalation::ForceStop => {
                    self.registry
                        .set_state(name, SubsystemState::LandingChecked);
                    self.bus.publish(
                        Event::new(EventKind::LandingOverridden)
                            .with_subsystem(name)
                            .with_reason(last_refusal.clone()),
                    );
                }
                LandingEscalation::Abandon => {
                    let err = SubsystemError::LandingRejected {
                        reason: last_refusal.clone(),
                    };
                    self.registry.fail(name, err.to_string());
                    self.bus.publish(
                        Event::new(EventKind::SubsystemFailed)
                            .with_subsystem(name)
                            .with_reason(err.to_string()),
                    );
                    // The worker still dies with the process.
                    self.pool.cancel(name);
                    return StopOutcome::LandingAbandoned(last_refusal);
                }
            }
        }

        // Stop: cancel the worker first so the subsystem's own stop sees a
        // terminating service loop, then reclaim the worker bounded.
        self.registry.set_state(name, SubsystemState::Stopping);
        self.bus
            .publish(Event::new(EventKind::SubsystemStopping).with_subsystem(name));
        self.pool.cancel(name);

        let stop_bound = self.cfg.stop_bound();
        let stopped = bounded(stop_bound, subsystem.stop()).await;
        let stop_err = match stopped {
            Ok(Ok(())) => None,
            Ok(Err(err)) => Some(err),
            Err(_elapsed) => Some(SubsystemError::StopFailed {
                reason: format!("stop timed out after {:?}", self.cfg.stop_timeout),
            }),
        };
        if let Some(err) = stop_err {
            let reason = err.to_string();
            self.registry.fail(name, reason.clone());
            self.bus.publish(
                Event::new(EventKind::SubsystemFailed)
                    .with_subsystem(name)
                    .with_reason(reason.clone()),
            );
            // Still try to reclaim the worker before moving on.
            let _ = self.pool.join(name, stop_bound).await;
            return StopOutcome::Failed(reason);
        }

        match self.pool.join(name, stop_bound).await {
            JoinOutcome::Joined | JoinOutcome::NoWorker => {
                self.registry.set_state(name, SubsystemState::Stopped);
                self.bus
                    .publish(Event::new(EventKind::SubsystemStopped).with_subsystem(name));
                StopOutcome::Clean
            }
            JoinOutcome::Panicked => {
                let reason = "worker panicked".to_string();
                self.registry.fail(name, reason.clone());
                self.bus.publish(
                    Event::new(EventKind::SubsystemFailed)
                        .with_subsystem(name)
                        .with_reason(reason.clone()),
                );
                StopOutcome::Failed(reason)
            }
            JoinOutcome::TimedOut => {
                let err = SubsystemError::ShutdownTimeout {
                    timeout: self.cfg.stop_timeout,
                };
                // The record itself is stopped; only the worker is stuck.
                self.registry.set_state(name, SubsystemState::Stopped);
                self.registry.note_error(name, err.to_string());
                self.bus.publish(
                    Event::new(EventKind::ShutdownTimeout)
                        .with_subsystem(name)
                        .with_timeout(self.cfg.stop_timeout),
                );
                StopOutcome::TimedOut
            }
        }
    }
}

/// Awaits `fut` bounded by `limit` (`None` = unbounded).
async fn bounded<F>(limit: Option<std::time::Duration>, fut: F) -> Result<F::Output, time::error::Elapsed>
where
    F: std::future::Future,
{
    match limit {
        Some(d) => time::timeout(d, fut).await,
        None => Ok(fut.await),
    }
}
