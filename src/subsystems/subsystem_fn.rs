//! # Closure-backed subsystem (`SubsystemFn`)
//!
//! [`SubsystemFn`] implements the [`Subsystem`] contract from plain closures,
//! producing a fresh future per call. Callbacks not supplied fall back to the
//! trait defaults (checks pass, start spawns nothing, stop is a no-op), so a
//! test double is a one-liner.
//!
//! ## Example
//! ```rust
//! use flightdeck::{Gate, Subsystem, SubsystemFn, SubsystemRef};
//!
//! let db: SubsystemRef = SubsystemFn::new("database")
//!     .depends_on(["network"])
//!     .critical()
//!     .on_launch_check(|| async { Gate::Go })
//!     .arc();
//!
//! assert_eq!(db.name(), "database");
//! assert!(db.is_critical());
//! ```

use std::borrow::Cow;
use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;
use futures::future::BoxFuture;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::error::SubsystemError;
use crate::subsystems::subsystem::{Gate, Subsystem};

type CheckFn = Box<dyn Fn() -> BoxFuture<'static, Gate> + Send + Sync>;
type StartFn = Box<
    dyn Fn(CancellationToken) -> BoxFuture<'static, Result<Option<JoinHandle<()>>, SubsystemError>>
        + Send
        + Sync,
>;
type StopFn = Box<dyn Fn() -> BoxFuture<'static, Result<(), SubsystemError>> + Send + Sync>;

/// Closure-backed subsystem implementation.
///
/// Builder-style: construct with [`SubsystemFn::new`], attach what you need,
/// finish with [`SubsystemFn::arc`].
pub struct SubsystemFn {
    name: Cow<'static, str>,
    dependencies: Vec<String>,
    critical: bool,
    launch_check: Option<CheckFn>,
    start: Option<StartFn>,
    land_check: Option<CheckFn>,
    stop: Option<StopFn>,
}

impl SubsystemFn {
    /// Creates a subsystem with no dependencies, no callbacks, not critical.
    pub fn new(name: impl Into<Cow<'static, str>>) -> Self {
        Self {
            name: name.into(),
            dependencies: Vec::new(),
            critical: false,
            launch_check: None,
            start: None,
            land_check: None,
            stop: None,
        }
    }

    /// Declares dependencies by name.
    pub fn depends_on<I, S>(mut self, deps: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.dependencies = deps.into_iter().map(Into::into).collect();
        self
    }

    /// Marks this subsystem as critical: its startup failure aborts the run.
    pub fn critical(mut self) -> Self {
        self.critical = true;
        self
    }

    /// Sets the launch check callback.
    pub fn on_launch_check<F, Fut>(mut self, f: F) -> Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Gate> + Send + 'static,
    {
        self.launch_check = Some(Box::new(move || Box::pin(f())));
        self
    }

    /// Sets the start callback.
    pub fn on_start<F, Fut>(mut self, f: F) -> Self
    where
        F: Fn(CancellationToken) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Option<JoinHandle<()>>, SubsystemError>> + Send + 'static,
    {
        self.start = Some(Box::new(move |ctx| Box::pin(f(ctx))));
        self
    }

    /// Sets the landing check callback.
    pub fn on_land_check<F, Fut>(mut self, f: F) -> Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Gate> + Send + 'static,
    {
        self.land_check = Some(Box::new(move || Box::pin(f())));
        self
    }

    /// Sets the stop callback.
    pub fn on_stop<F, Fut>(mut self, f: F) -> Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<(), SubsystemError>> + Send + 'static,
    {
        self.stop = Some(Box::new(move || Box::pin(f())));
        self
    }

    /// Finishes the builder as a shared handle (`Arc<dyn Subsystem>`).
    pub fn arc(self) -> Arc<Self> {
        Arc::new(self)
    }
}

#[async_trait]
impl Subsystem for SubsystemFn {
    fn name(&self) -> &str {
        &self.name
    }

    fn dependencies(&self) -> Vec<String> {
        self.dependencies.clone()
    }

    fn is_critical(&self) -> bool {
        self.critical
    }

    async fn launch_check(&self) -> Gate {
        match &self.launch_check {
            Some(f) => f().await,
            None => Gate::Go,
        }
    }

    async fn start(
        &self,
        ctx: CancellationToken,
    ) -> Result<Option<JoinHandle<()>>, SubsystemError> {
        match &self.start {
            Some(f) => f(ctx).await,
            None => Ok(None),
        }
    }

    async fn land_check(&self) -> Gate {
        match &self.land_check {
            Some(f) => f().await,
            None => Gate::Go,
        }
    }

    async fn stop(&self) -> Result<(), SubsystemError> {
        match &self.stop {
            Some(f) => f().await,
            None => Ok(()),
        }
    }
}
