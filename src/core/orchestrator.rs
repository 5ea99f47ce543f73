//! # Orchestrator: registry, sweeps, signals, and subscriber fan-out.
//!
//! The [`Orchestrator`] owns everything a run needs — the registry, the
//! event bus, the subscriber set, the worker pool, and the shutdown latch —
//! and drives one run end to end:
//!
//! ```text
//! register(...)* ──► run():
//!   1. freeze registry, resolve start/stop orders      (config errors stop here)
//!   2. startup sweep (PhaseController)                 (critical failure ⇒ 4)
//!   3. steady state: wait for the latch
//!        ├─ OS signal        (core::shutdown listener)
//!        ├─ ShutdownHandle::request()
//!        └─ (critical startup failure arrives as 2 ⇒ 4 directly)
//!   4. shutdown sweep (PhaseController) ──► RunReport
//! ```
//!
//! There is no ambient global state: every `Orchestrator` is a self-contained
//! value, and tests run several side by side.

use std::sync::Arc;

use crate::config::Config;
use crate::core::controller::{PhaseController, SweepEnd};
use crate::core::registry::{Registry, SubsystemState};
use crate::core::resolver;
use crate::core::shutdown::{self, ShutdownLatch};
use crate::core::workers::WorkerPool;
use crate::error::{RegistryError, RunError};
use crate::events::{Bus, Event, EventKind};
use crate::policies::RepeatSignalPolicy;
use crate::report::RunReport;
use crate::subscribers::{Subscribe, SubscriberSet};
use crate::subsystems::SubsystemRef;

/// Builder for constructing an [`Orchestrator`].
pub struct OrchestratorBuilder {
    cfg: Config,
    subscribers: Vec<Arc<dyn Subscribe>>,
}

impl OrchestratorBuilder {
    /// Creates a new builder with the given configuration.
    pub fn new(cfg: Config) -> Self {
        Self {
            cfg,
            subscribers: Vec::new(),
        }
    }

    /// Sets event subscribers for observability.
    ///
    /// Subscribers receive lifecycle events through dedicated workers with
    /// bounded queues; a slow subscriber never blocks the sweeps.
    pub fn with_subscribers(mut self, subscribers: Vec<Arc<dyn Subscribe>>) -> Self {
        self.subscribers = subscribers;
        self
    }

    /// Builds the orchestrator.
    pub fn build(self) -> Arc<Orchestrator> {
        let bus = Bus::new(self.cfg.bus_capacity_clamped());
        let subs = Arc::new(SubscriberSet::new(self.subscribers, bus.clone()));
        Arc::new(Orchestrator {
            cfg: self.cfg,
            registry: Arc::new(Registry::new()),
            bus,
            subs,
            pool: Arc::new(WorkerPool::new()),
            latch: Arc::new(ShutdownLatch::new()),
        })
    }
}

/// Cloneable handle for triggering shutdown and querying status.
///
/// This is the process-level surface: a signal handler equivalent for code,
/// plus the status snapshot.
#[derive(Clone)]
pub struct ShutdownHandle {
    latch: Arc<ShutdownLatch>,
    registry: Arc<Registry>,
}

impl ShutdownHandle {
    /// Requests shutdown. Returns true if this was the first trigger.
    ///
    /// Idempotent: repeated calls (from any thread) are no-ops after the
    /// first; the sweep runs exactly once per run.
    pub fn request(&self) -> bool {
        self.latch.trigger("shutdown requested")
    }

    /// Consistent name → state view of all subsystems, registration order.
    pub fn snapshot(&self) -> Vec<(String, SubsystemState)> {
        self.registry.snapshot()
    }
}

/// Coordinates the registry, the phase controller, signal handling, and
/// subscriber fan-out for one run.
pub struct Orchestrator {
    cfg: Config,
    registry: Arc<Registry>,
    bus: Bus,
    subs: Arc<SubscriberSet>,
    pool: Arc<WorkerPool>,
    latch: Arc<ShutdownLatch>,
}

impl Orchestrator {
    /// Starts a builder with the given configuration.
    pub fn builder(cfg: Config) -> OrchestratorBuilder {
        OrchestratorBuilder::new(cfg)
    }

    /// Registers a subsystem. Fails once the startup sweep has begun.
    pub fn register(&self, subsystem: SubsystemRef) -> Result<(), RegistryError> {
        self.registry.register(subsystem)
    }

    /// Returns a handle for triggering shutdown and querying status.
    pub fn handle(&self) -> ShutdownHandle {
        ShutdownHandle {
            latch: Arc::clone(&self.latch),
            registry: Arc::clone(&self.registry),
        }
    }

    /// Subscribes directly to the raw event stream.
    ///
    /// Prefer a [`Subscribe`] implementor for anything long-lived; this is
    /// for tests and ad-hoc listeners.
    pub fn events(&self) -> tokio::sync::broadcast::Receiver<Event> {
        self.bus.subscribe()
    }

    /// Runs the orchestrator: startup sweep, steady state, shutdown sweep.
    ///
    /// Returns `Ok(RunReport)` when the run reached steady state and was
    /// later shut down (or was aborted by an early trigger), and an error
    /// when the configuration was invalid or a critical subsystem failed —
    /// in the latter case everything already started has been torn down in
    /// reverse order before this returns.
    pub async fn run(&self) -> Result<RunReport, RunError> {
        self.registry.freeze();
        let start_order = resolver::compute_start_order(&self.registry.graph())
            .map_err(RunError::Config)?;
        let stop_order = resolver::compute_stop_order(&start_order);

        self.spawn_subscriber_listener();
        self.spawn_signal_listener();

        let controller = PhaseController {
            registry: &self.registry,
            pool: &self.pool,
            bus: &self.bus,
            cfg: &self.cfg,
        };

        match controller.startup_sweep(&start_order, &self.latch).await {
            SweepEnd::Completed => {
                self.latch.triggered().await;
                self.publish_shutdown_requested();
                let report = controller.shutdown_sweep(&stop_order).await;
                self.bus.publish(Event::new(EventKind::ShutdownComplete));
                Ok(report)
            }
            SweepEnd::Aborted => {
                // Trigger already fired; tear down whatever is Running.
                self.publish_shutdown_requested();
                let report = controller.shutdown_sweep(&stop_order).await;
                self.bus.publish(Event::new(EventKind::ShutdownComplete));
                Ok(report)
            }
            SweepEnd::CriticalFailed { subsystem, reason } => {
                self.latch.trigger("critical startup failure");
                self.publish_shutdown_requested();
                let report = controller.shutdown_sweep(&stop_order).await;
                self.bus.publish(Event::new(EventKind::ShutdownComplete));
                Err(RunError::StartupFailed {
                    subsystem,
                    reason,
                    report,
                })
            }
        }
    }

    fn publish_shutdown_requested(&self) {
        let reason = self.latch.reason().unwrap_or("shutdown requested");
        self.bus
            .publish(Event::new(EventKind::ShutdownRequested).with_reason(reason));
    }

    /// Forwards bus events to the subscriber set (fire-and-forget).
    fn spawn_subscriber_listener(&self) {
        let mut rx = self.bus.subscribe();
        let set = Arc::clone(&self.subs);
        tokio::spawn(async move {
            while let Ok(ev) = rx.recv().await {
                set.emit(&ev);
            }
        });
    }

    /// Routes OS signals into the latch; repeats follow the configured policy.
    fn spawn_signal_listener(&self) {
        let latch = Arc::clone(&self.latch);
        let pool = Arc::clone(&self.pool);
        let policy = self.cfg.on_repeat_signal;
        tokio::spawn(async move {
            loop {
                if shutdown::wait_for_shutdown_signal().await.is_err() {
                    return;
                }
                if latch.trigger("signal") {
                    continue;
                }
                // Repeat trigger while the sweep is running.
                match policy {
                    RepeatSignalPolicy::Ignore => continue,
                    RepeatSignalPolicy::Abort => {
                        pool.abort_all();
                        return;
                    }
                }
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
    use std::time::Duration;

    use tokio::sync::broadcast;

    use super::*;
    use crate::error::SubsystemError;
    use crate::policies::{LandingEscalation, LandingPolicy};
    use crate::report::StopOutcome;
    use crate::subsystems::{Gate, SubsystemFn};

    type Log = Arc<Mutex<Vec<String>>>;

    fn log() -> Log {
        Arc::new(Mutex::new(Vec::new()))
    }

    fn push(log: &Log, entry: impl Into<String>) {
        log.lock().unwrap().push(entry.into());
    }

    /// A subsystem that records its start/stop into a shared log.
    fn recorded(name: &'static str, deps: &[&str], ops: &Log) -> Arc<SubsystemFn> {
        let start_log = ops.clone();
        let stop_log = ops.clone();
        SubsystemFn::new(name)
            .depends_on(deps.iter().map(|d| d.to_string()))
            .on_start(move |_ctx| {
                let log = start_log.clone();
                async move {
                    push(&log, format!("start:{name}"));
                    Ok(None)
                }
            })
            .on_stop(move || {
                let log = stop_log.clone();
                async move {
                    push(&log, format!("stop:{name}"));
                    Ok(())
                }
            })
            .arc()
    }

    async fn wait_for(rx: &mut broadcast::Receiver<Event>, kind: EventKind) {
        loop {
            match rx.recv().await {
                Ok(ev) if ev.kind == kind => return,
                Ok(_) => continue,
                Err(broadcast::error::RecvError::Lagged(_)) => continue,
                Err(broadcast::error::RecvError::Closed) => {
                    panic!("bus closed before {kind:?}")
                }
            }
        }
    }

    fn quick_config() -> Config {
        Config {
            landing: LandingPolicy {
                retry_delay: Duration::from_millis(10),
                ..LandingPolicy::default()
            },
            stop_timeout: Duration::from_millis(200),
            ..Config::default()
        }
    }

    #[tokio::test]
    async fn test_scenario_a_start_and_stop_order() {
        let ops = log();
        let orch = Orchestrator::builder(quick_config()).build();
        orch.register(recorded("net", &[], &ops)).unwrap();
        orch.register(recorded("db", &["net"], &ops)).unwrap();
        orch.register(recorded("web", &["net", "db"], &ops)).unwrap();

        let mut rx = orch.events();
        let handle = orch.handle();
        let runner = {
            let orch = Arc::clone(&orch);
            tokio::spawn(async move { orch.run().await })
        };

        wait_for(&mut rx, EventKind::StartupComplete).await;

        // Steady state: everything Running, dependencies included.
        for (_, state) in handle.snapshot() {
            assert_eq!(state, SubsystemState::Running);
        }

        assert!(handle.request());
        let report = runner.await.unwrap().unwrap();

        assert!(report.all_clean());
        assert_eq!(
            *ops.lock().unwrap(),
            [
                "start:net",
                "start:db",
                "start:web",
                "stop:web",
                "stop:db",
                "stop:net"
            ]
        );
        for (_, state) in handle.snapshot() {
            assert_eq!(state, SubsystemState::Stopped);
        }
    }

    #[tokio::test]
    async fn test_scenario_b_critical_failure_tears_down_started() {
        let ops = log();
        let orch = Orchestrator::builder(quick_config()).build();
        orch.register(recorded("net", &[], &ops)).unwrap();
        orch.register(
            SubsystemFn::new("db")
                .depends_on(["net"])
                .critical()
                .on_start(|_ctx| async {
                    Err(SubsystemError::StartFailed {
                        reason: "disk on fire".into(),
                    })
                })
                .arc(),
        )
        .unwrap();
        orch.register(recorded("web", &["net", "db"], &ops)).unwrap();

        let err = orch.run().await.unwrap_err();
        match err {
            RunError::StartupFailed {
                subsystem,
                reason,
                report,
            } => {
                assert_eq!(subsystem, "db");
                assert!(reason.contains("disk on fire"));
                assert_eq!(report.outcome("net"), Some(&StopOutcome::Clean));
            }
            other => panic!("expected StartupFailed, got {other:?}"),
        }

        // Net was torn down; web never entered Starting.
        assert_eq!(
            *ops.lock().unwrap(),
            ["start:net", "stop:net"]
        );
        assert_eq!(
            orch.handle()
                .snapshot()
                .into_iter()
                .collect::<Vec<_>>(),
            [
                ("net".to_string(), SubsystemState::Stopped),
                ("db".to_string(), SubsystemState::Failed),
                ("web".to_string(), SubsystemState::Inactive),
            ]
        );
        assert!(orch.registry.last_error("db").unwrap().contains("disk on fire"));
    }

    #[tokio::test]
    async fn test_scenario_c_unknown_dependency_before_any_check() {
        let checked = Arc::new(AtomicBool::new(false));
        let orch = Orchestrator::builder(Config::default()).build();
        let flag = checked.clone();
        orch.register(
            SubsystemFn::new("web")
                .depends_on(["ghost"])
                .on_launch_check(move || {
                    let flag = flag.clone();
                    async move {
                        flag.store(true, Ordering::SeqCst);
                        Gate::Go
                    }
                })
                .arc(),
        )
        .unwrap();

        let err = orch.run().await.unwrap_err();
        match err {
            RunError::Config(RegistryError::UnknownDependency {
                subsystem,
                dependency,
            }) => {
                assert_eq!(subsystem, "web");
                assert_eq!(dependency, "ghost");
            }
            other => panic!("expected UnknownDependency, got {other:?}"),
        }
        assert!(!checked.load(Ordering::SeqCst), "launch_check must not run");
    }

    #[tokio::test(start_paused = true)]
    async fn test_scenario_d_join_timeout_does_not_block_sweep() {
        let ops = log();
        let orch = Orchestrator::builder(quick_config()).build();
        orch.register(recorded("net", &[], &ops)).unwrap();
        // The print worker ignores its cancellation token entirely.
        orch.register(
            SubsystemFn::new("print")
                .depends_on(["net"])
                .on_start(|_ctx| async {
                    Ok(Some(tokio::spawn(std::future::pending::<()>())))
                })
                .arc(),
        )
        .unwrap();

        let mut rx = orch.events();
        let handle = orch.handle();
        let runner = {
            let orch = Arc::clone(&orch);
            tokio::spawn(async move { orch.run().await })
        };
        wait_for(&mut rx, EventKind::StartupComplete).await;
        handle.request();
        let report = runner.await.unwrap().unwrap();

        assert_eq!(report.outcome("print"), Some(&StopOutcome::TimedOut));
        // The sweep continued past the stuck worker.
        assert_eq!(report.outcome("net"), Some(&StopOutcome::Clean));
        assert!(
            orch.registry
                .last_error("print")
                .unwrap()
                .contains("did not stop"),
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_stop_bound_applies_to_each_teardown_phase() {
        // stop() and the worker join each get the full stop_timeout (200ms
        // here): a teardown taking 150ms in each phase must stay clean.
        let orch = Orchestrator::builder(quick_config()).build();
        let gate = Arc::new(tokio::sync::Notify::new());
        let release = gate.clone();
        orch.register(
            SubsystemFn::new("mail")
                .on_start(move |_ctx| {
                    let gate = gate.clone();
                    async move {
                        Ok(Some(tokio::spawn(async move {
                            gate.notified().await;
                            tokio::time::sleep(Duration::from_millis(150)).await;
                        })))
                    }
                })
                .on_stop(move || {
                    let release = release.clone();
                    async move {
                        tokio::time::sleep(Duration::from_millis(150)).await;
                        release.notify_one();
                        Ok(())
                    }
                })
                .arc(),
        )
        .unwrap();

        let mut rx = orch.events();
        let handle = orch.handle();
        let runner = {
            let orch = Arc::clone(&orch);
            tokio::spawn(async move { orch.run().await })
        };
        wait_for(&mut rx, EventKind::StartupComplete).await;
        handle.request();
        let report = runner.await.unwrap().unwrap();

        assert_eq!(report.outcome("mail"), Some(&StopOutcome::Clean));
    }

    #[tokio::test]
    async fn test_shutdown_trigger_is_idempotent() {
        let stops = Arc::new(AtomicU32::new(0));
        let orch = Orchestrator::builder(quick_config()).build();
        let counter = stops.clone();
        orch.register(
            SubsystemFn::new("net")
                .on_stop(move || {
                    let counter = counter.clone();
                    async move {
                        counter.fetch_add(1, Ordering::SeqCst);
                        Ok(())
                    }
                })
                .arc(),
        )
        .unwrap();

        let mut rx = orch.events();
        let handle = orch.handle();
        let runner = {
            let orch = Arc::clone(&orch);
            tokio::spawn(async move { orch.run().await })
        };
        wait_for(&mut rx, EventKind::StartupComplete).await;

        assert!(handle.request());
        assert!(!handle.request(), "second trigger must be a no-op");
        let report = runner.await.unwrap().unwrap();

        assert!(report.all_clean());
        assert_eq!(stops.load(Ordering::SeqCst), 1, "stop ran exactly once");
    }

    #[tokio::test]
    async fn test_landing_check_retries_until_go() {
        let asked = Arc::new(AtomicU32::new(0));
        let orch = Orchestrator::builder(quick_config()).build();
        let counter = asked.clone();
        orch.register(
            SubsystemFn::new("mail")
                .on_land_check(move || {
                    let counter = counter.clone();
                    async move {
                        // Queue "drains" on the third ask.
                        if counter.fetch_add(1, Ordering::SeqCst) < 2 {
                            Gate::no_go("queue not drained")
                        } else {
                            Gate::Go
                        }
                    }
                })
                .arc(),
        )
        .unwrap();

        let mut rx = orch.events();
        let handle = orch.handle();
        let runner = {
            let orch = Arc::clone(&orch);
            tokio::spawn(async move { orch.run().await })
        };
        wait_for(&mut rx, EventKind::StartupComplete).await;
        handle.request();
        let report = runner.await.unwrap().unwrap();

        assert_eq!(report.outcome("mail"), Some(&StopOutcome::Clean));
        assert_eq!(asked.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_landing_abandon_skips_stop() {
        let stopped = Arc::new(AtomicBool::new(false));
        let mut cfg = quick_config();
        cfg.landing.max_attempts = 2;
        cfg.landing.escalation = LandingEscalation::Abandon;

        let orch = Orchestrator::builder(cfg).build();
        let flag = stopped.clone();
        orch.register(
            SubsystemFn::new("storage")
                .on_land_check(|| async { Gate::no_go("mid-write") })
                .on_stop(move || {
                    let flag = flag.clone();
                    async move {
                        flag.store(true, Ordering::SeqCst);
                        Ok(())
                    }
                })
                .arc(),
        )
        .unwrap();

        let mut rx = orch.events();
        let handle = orch.handle();
        let runner = {
            let orch = Arc::clone(&orch);
            tokio::spawn(async move { orch.run().await })
        };
        wait_for(&mut rx, EventKind::StartupComplete).await;
        handle.request();
        let report = runner.await.unwrap().unwrap();

        assert_eq!(
            report.outcome("storage"),
            Some(&StopOutcome::LandingAbandoned("mid-write".into()))
        );
        assert!(!stopped.load(Ordering::SeqCst), "stop must not run");
        assert_eq!(
            orch.handle().snapshot()[0].1,
            SubsystemState::Failed
        );
    }

    #[tokio::test]
    async fn test_noncritical_launch_rejection_continues_sweep() {
        let ops = log();
        let orch = Orchestrator::builder(quick_config()).build();
        orch.register(recorded("net", &[], &ops)).unwrap();
        orch.register(
            SubsystemFn::new("mdns")
                .on_launch_check(|| async { Gate::no_go("no multicast route") })
                .arc(),
        )
        .unwrap();
        // web depends on the rejected subsystem and must fail its guard;
        // terminal depends only on net and must still start.
        orch.register(recorded("web", &["mdns"], &ops)).unwrap();
        orch.register(recorded("terminal", &["net"], &ops)).unwrap();

        let mut rx = orch.events();
        let handle = orch.handle();
        let runner = {
            let orch = Arc::clone(&orch);
            tokio::spawn(async move { orch.run().await })
        };
        wait_for(&mut rx, EventKind::StartupComplete).await;

        let snapshot: Vec<_> = handle.snapshot();
        assert_eq!(snapshot[1], ("mdns".to_string(), SubsystemState::Failed));
        assert_eq!(snapshot[2], ("web".to_string(), SubsystemState::Failed));
        assert_eq!(
            snapshot[3],
            ("terminal".to_string(), SubsystemState::Running)
        );
        assert!(
            orch.registry
                .last_error("web")
                .unwrap()
                .contains("dependency 'mdns'"),
        );

        handle.request();
        let report = runner.await.unwrap().unwrap();
        assert_eq!(report.outcome("net"), Some(&StopOutcome::Clean));
        assert_eq!(
            report.outcome("web"),
            Some(&StopOutcome::Skipped(SubsystemState::Failed))
        );
    }

    #[tokio::test]
    async fn test_registry_frozen_once_run_begins() {
        let orch = Orchestrator::builder(quick_config()).build();
        orch.register(SubsystemFn::new("net").arc()).unwrap();

        let mut rx = orch.events();
        let handle = orch.handle();
        let runner = {
            let orch = Arc::clone(&orch);
            tokio::spawn(async move { orch.run().await })
        };
        wait_for(&mut rx, EventKind::StartupComplete).await;

        let err = orch.register(SubsystemFn::new("late").arc()).unwrap_err();
        assert_eq!(err, RegistryError::Frozen);

        handle.request();
        runner.await.unwrap().unwrap();
    }

    #[tokio::test]
    async fn test_worker_panic_surfaces_in_report() {
        let ops = log();
        let orch = Orchestrator::builder(quick_config()).build();
        orch.register(recorded("net", &[], &ops)).unwrap();
        orch.register(
            SubsystemFn::new("cache")
                .depends_on(["net"])
                .on_start(|ctx| async move {
                    Ok(Some(tokio::spawn(async move {
                        ctx.cancelled().await;
                        panic!("eviction bug");
                    })))
                })
                .arc(),
        )
        .unwrap();

        let mut rx = orch.events();
        let handle = orch.handle();
        let runner = {
            let orch = Arc::clone(&orch);
            tokio::spawn(async move { orch.run().await })
        };
        wait_for(&mut rx, EventKind::StartupComplete).await;
        handle.request();
        let report = runner.await.unwrap().unwrap();

        assert_eq!(
            report.outcome("cache"),
            Some(&StopOutcome::Failed("worker panicked".into()))
        );
        assert!(!report.all_clean());
        assert!(
            orch.registry
                .last_error("cache")
                .unwrap()
                .contains("panicked"),
        );
        // The panic never blocks the rest of the sweep.
        assert_eq!(report.outcome("net"), Some(&StopOutcome::Clean));
    }

    #[tokio::test]
    async fn test_worker_receives_cancellation_on_stop() {
        let cancelled = Arc::new(AtomicBool::new(false));
        let orch = Orchestrator::builder(quick_config()).build();
        let flag = cancelled.clone();
        orch.register(
            SubsystemFn::new("ws")
                .on_start(move |ctx| {
                    let flag = flag.clone();
                    async move {
                        Ok(Some(tokio::spawn(async move {
                            ctx.cancelled().await;
                            flag.store(true, Ordering::SeqCst);
                        })))
                    }
                })
                .arc(),
        )
        .unwrap();

        let mut rx = orch.events();
        let handle = orch.handle();
        let runner = {
            let orch = Arc::clone(&orch);
            tokio::spawn(async move { orch.run().await })
        };
        wait_for(&mut rx, EventKind::StartupComplete).await;
        handle.request();
        let report = runner.await.unwrap().unwrap();

        assert_eq!(report.outcome("ws"), Some(&StopOutcome::Clean));
        assert!(cancelled.load(Ordering::SeqCst));
    }
}
