//! Error types used by the flightdeck orchestrator and subsystems.
//!
//! This module defines three error enums:
//!
//! - [`RegistryError`] — configuration-time errors (bad registration, bad
//!   dependency graph). These are fatal and are reported before any subsystem
//!   starts.
//! - [`SubsystemError`] — per-subsystem failures during launch or landing.
//!   These are absorbed into the subsystem's record (`last_error`) and only
//!   abort the run when the subsystem is critical.
//! - [`RunError`] — the overall outcome of a failed run.
//!
//! All types provide helper methods (`as_label`, `as_message`) for
//! logging/metrics.

use std::time::Duration;

use thiserror::Error;

use crate::report::RunReport;

/// # Configuration-time errors.
///
/// Produced while registering subsystems or resolving the dependency graph.
/// Any of these aborts the run before a single `launch_check` is invoked.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    /// A subsystem with this name is already registered.
    #[error("subsystem '{name}' is already registered")]
    DuplicateName {
        /// The conflicting name.
        name: String,
    },

    /// A declared dependency does not match any registered subsystem.
    #[error("subsystem '{subsystem}' depends on unknown subsystem '{dependency}'")]
    UnknownDependency {
        /// The subsystem declaring the dependency.
        subsystem: String,
        /// The name that could not be resolved.
        dependency: String,
    },

    /// The dependency graph contains a cycle.
    #[error("cyclic dependency: {}", cycle.join(" -> "))]
    CyclicDependency {
        /// Names along one cycle, in dependency order.
        cycle: Vec<String>,
    },

    /// Registration was attempted after the startup sweep began.
    #[error("registry is frozen: startup has already begun")]
    Frozen,
}

impl RegistryError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    ///
    /// # Example
    /// ```
    /// use flightdeck::RegistryError;
    ///
    /// let err = RegistryError::Frozen;
    /// assert_eq!(err.as_label(), "registry_frozen");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            RegistryError::DuplicateName { .. } => "registry_duplicate_name",
            RegistryError::UnknownDependency { .. } => "registry_unknown_dependency",
            RegistryError::CyclicDependency { .. } => "registry_cyclic_dependency",
            RegistryError::Frozen => "registry_frozen",
        }
    }
}

/// # Per-subsystem lifecycle errors.
///
/// Produced by subsystem callbacks (or by the orchestrator's bounds around
/// them). Recorded in the subsystem's `last_error`; never unwinds the
/// orchestrator on its own.
#[non_exhaustive]
#[derive(Error, Debug, Clone)]
pub enum SubsystemError {
    /// `launch_check` returned no-go (or exceeded its bound).
    #[error("launch rejected: {reason}")]
    LaunchRejected {
        /// Why the subsystem refused to launch.
        reason: String,
    },

    /// `start` failed (or exceeded its bound).
    #[error("start failed: {reason}")]
    StartFailed {
        /// The underlying error message.
        reason: String,
    },

    /// `land_check` still refused after the landing policy was exhausted.
    #[error("landing rejected: {reason}")]
    LandingRejected {
        /// Why the subsystem refused to land.
        reason: String,
    },

    /// `stop` failed (or exceeded its bound).
    #[error("stop failed: {reason}")]
    StopFailed {
        /// The underlying error message.
        reason: String,
    },

    /// The subsystem's worker did not finish within the shutdown timeout.
    #[error("worker did not stop within {timeout:?}")]
    ShutdownTimeout {
        /// The configured join timeout that was exceeded.
        timeout: Duration,
    },
}

impl SubsystemError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    ///
    /// # Example
    /// ```
    /// use flightdeck::SubsystemError;
    ///
    /// let err = SubsystemError::StartFailed { reason: "boom".into() };
    /// assert_eq!(err.as_label(), "subsystem_start_failed");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            SubsystemError::LaunchRejected { .. } => "subsystem_launch_rejected",
            SubsystemError::StartFailed { .. } => "subsystem_start_failed",
            SubsystemError::LandingRejected { .. } => "subsystem_landing_rejected",
            SubsystemError::StopFailed { .. } => "subsystem_stop_failed",
            SubsystemError::ShutdownTimeout { .. } => "subsystem_shutdown_timeout",
        }
    }

    /// True if the error occurred on the way down rather than the way up.
    ///
    /// Teardown errors never abort the run; they are logged and the sweep
    /// continues.
    pub fn is_teardown(&self) -> bool {
        matches!(
            self,
            SubsystemError::LandingRejected { .. }
                | SubsystemError::StopFailed { .. }
                | SubsystemError::ShutdownTimeout { .. }
        )
    }
}

/// # Overall run failure.
///
/// Returned by [`Orchestrator::run`](crate::Orchestrator::run) when the run
/// could not reach steady state. The shutdown sweep has already completed by
/// the time this is returned.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum RunError {
    /// The dependency graph was invalid; nothing was started.
    #[error(transparent)]
    Config(#[from] RegistryError),

    /// A critical subsystem failed during the startup sweep.
    ///
    /// Everything that had already reached `Running` was torn down in reverse
    /// order before this was returned; `report` describes that teardown.
    #[error("critical subsystem '{subsystem}' failed to start: {reason}")]
    StartupFailed {
        /// The critical subsystem that failed.
        subsystem: String,
        /// The recorded failure reason.
        reason: String,
        /// Teardown summary for the partially started run.
        report: RunReport,
    },
}

impl RunError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    pub fn as_label(&self) -> &'static str {
        match self {
            RunError::Config(e) => e.as_label(),
            RunError::StartupFailed { .. } => "run_startup_failed",
        }
    }
}
