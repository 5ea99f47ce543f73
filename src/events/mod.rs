//! Lifecycle events: types and broadcast bus.
//!
//! This module groups the event **data model** and the **bus** used to
//! publish/subscribe to lifecycle events emitted by the phase controller and
//! the orchestrator.
//!
//! ## Contents
//! - [`EventKind`], [`Event`] event classification and payload metadata
//! - [`Bus`] thin wrapper over `tokio::sync::broadcast`
//!
//! ## Quick reference
//! - **Publishers**: `core::controller` (every state transition),
//!   `core::orchestrator` (shutdown request, sweep completion),
//!   `SubscriberSet` workers (overflow/panic).
//! - **Consumer**: `Orchestrator`'s listener, which fans out to the
//!   [`SubscriberSet`](crate::SubscriberSet).

mod bus;
mod event;

pub use bus::Bus;
pub use event::{Event, EventKind};
