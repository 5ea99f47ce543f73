//! # Per-run shutdown summary.
//!
//! [`RunReport`] is produced by the shutdown sweep and records, for every
//! subsystem in stop order, how its teardown went. It is returned from
//! [`Orchestrator::run`](crate::Orchestrator::run) on success and carried
//! inside [`RunError::StartupFailed`](crate::RunError::StartupFailed) when a
//! critical failure forced an early teardown.

use std::fmt;

use crate::core::SubsystemState;

/// How one subsystem's teardown ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StopOutcome {
    /// Landing check passed (or was overridden) and `stop` + worker join
    /// completed within bounds.
    Clean,
    /// `stop` completed but the worker did not join within the stop bound.
    TimedOut,
    /// `stop` returned an error; the sweep continued.
    Failed(String),
    /// Landing was rejected and policy chose not to force the stop.
    LandingAbandoned(String),
    /// The subsystem was not `Running` when the sweep reached it.
    Skipped(SubsystemState),
}

impl StopOutcome {
    /// True for outcomes that count against a clean shutdown.
    pub fn is_clean(&self) -> bool {
        matches!(self, StopOutcome::Clean | StopOutcome::Skipped(_))
    }
}

/// Summary of one shutdown sweep, in stop order.
#[derive(Debug, Clone, Default)]
pub struct RunReport {
    entries: Vec<(String, StopOutcome)>,
}

impl RunReport {
    pub(crate) fn new(entries: Vec<(String, StopOutcome)>) -> Self {
        Self { entries }
    }

    /// Per-subsystem outcomes, in stop order.
    pub fn entries(&self) -> &[(String, StopOutcome)] {
        &self.entries
    }

    /// Outcome for one subsystem, if it appears in the report.
    pub fn outcome(&self, name: &str) -> Option<&StopOutcome> {
        self.entries
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, o)| o)
    }

    /// True if every subsystem stopped cleanly (skips do not count against).
    pub fn all_clean(&self) -> bool {
        self.entries.iter().all(|(_, o)| o.is_clean())
    }
}

impl fmt::Display for RunReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (name, outcome) in &self.entries {
            match outcome {
                StopOutcome::Clean => writeln!(f, "{name}: stopped cleanly")?,
                StopOutcome::TimedOut => writeln!(f, "{name}: worker join timed out")?,
                StopOutcome::Failed(reason) => writeln!(f, "{name}: stop failed ({reason})")?,
                StopOutcome::LandingAbandoned(reason) => {
                    writeln!(f, "{name}: landing abandoned ({reason})")?
                }
                StopOutcome::Skipped(state) => {
                    writeln!(f, "{name}: skipped (was {})", state.as_str())?
                }
            }
        }
        Ok(())
    }
}
