//! # Repeat-signal policy.
//!
//! The first shutdown trigger — OS signal, explicit request, or critical
//! startup failure — fires the one-shot latch and drives the sweep. This
//! policy decides what any *later* trigger does.

/// Behavior of a second shutdown trigger while the sweep is in progress.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum RepeatSignalPolicy {
    /// Ignore repeated triggers; the sweep runs to completion (default).
    #[default]
    Ignore,

    /// Abort the remaining worker joins immediately.
    ///
    /// Lifecycle callbacks already in flight still finish; only workers
    /// still tracked by the pool are aborted. This is the "second Ctrl-C
    /// means now" convention for interactive binaries.
    Abort,
}
