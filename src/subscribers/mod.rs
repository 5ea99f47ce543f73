//! # Event subscribers for the orchestrator.
//!
//! This module provides the [`Subscribe`] trait and the fan-out machinery
//! for observing lifecycle events broadcast through the
//! [`Bus`](crate::events::Bus).
//!
//! ## Architecture
//! ```text
//! Event flow:
//!   PhaseController ── publish(Event) ──► Bus ──► orchestrator listener
//!                                                      │
//!                                                      ▼
//!                                              SubscriberSet::emit
//!                                                      │
//!                                         ┌────────────┼────────────┐
//!                                         ▼            ▼            ▼
//!                                     LogWriter     Metrics      Custom...
//! ```
//!
//! ## Contents
//! - [`Subscribe`] the handler trait (async, queue capacity per subscriber)
//! - [`SubscriberSet`] bounded-queue fan-out with panic isolation
//! - [`LogWriter`] stdout logger (behind the `logging` feature)

#[cfg(feature = "logging")]
mod log;
mod set;
mod subscribe;

#[cfg(feature = "logging")]
pub use log::LogWriter;
pub use set::SubscriberSet;
pub use subscribe::Subscribe;
