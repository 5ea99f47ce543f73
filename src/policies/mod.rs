//! Landing and signal policies.
//!
//! This module groups the knobs that control **how teardown behaves** when a
//! subsystem is not ready to stop, and what a repeated interrupt does while
//! the shutdown sweep is already running.
//!
//! ## Contents
//! - [`LandingPolicy`] how many landing-check attempts, how far apart, and
//!   what happens when they are exhausted
//! - [`LandingEscalation`] force-stop vs. abandon after exhausted attempts
//! - [`RepeatSignalPolicy`] ignore vs. abort on a second shutdown trigger
//!
//! ## Quick wiring
//! ```text
//! Config { landing: LandingPolicy, on_repeat_signal: RepeatSignalPolicy }
//!      └─► core::controller shutdown sweep uses:
//!           - landing.max_attempts / retry_delay between land_check calls
//!           - landing.escalation once attempts are exhausted
//!      └─► core::orchestrator signal listener uses:
//!           - on_repeat_signal when the latch has already fired
//! ```
//!
//! ## Defaults
//! - `LandingPolicy::default()` → 3 attempts, 250ms apart, then `ForceStop`.
//! - `RepeatSignalPolicy::Ignore` by default; `Abort` for binaries that must
//!   not hang on a stuck worker.

mod landing;
mod signal;

pub use landing::{LandingEscalation, LandingPolicy};
pub use signal::RepeatSignalPolicy;
