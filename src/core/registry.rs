//! # Subsystem registry: the record table the whole run revolves around.
//!
//! The [`Registry`] owns one [`SubsystemRecord`] per registered subsystem:
//! identity, capability handle, cached dependency list, current state, and
//! the last failure reason. Insertion order is preserved and is the
//! deterministic tie-break whenever dependencies do not disambiguate.
//!
//! ## Rules
//! - Registration happens at configuration time only; once the startup sweep
//!   begins the registry is **frozen** and further `register` calls fail.
//! - All mutation is internally serialized; locks are held briefly and never
//!   across an `.await`.
//! - [`Registry::snapshot`] returns a consistent view of all (name, state)
//!   pairs, never a stale partial view under concurrent mutation.
//! - Records are created once and live until the orchestrator is dropped;
//!   there is no dynamic remove.

use std::collections::HashMap;
use std::sync::RwLock;
use std::sync::atomic::{AtomicBool, Ordering as AtomicOrdering};

use crate::error::RegistryError;
use crate::subsystems::SubsystemRef;

/// Phase of one subsystem within a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubsystemState {
    /// Registered but not yet touched by a sweep.
    Inactive,
    /// Launch check returned go; start not yet invoked.
    LaunchChecked,
    /// `start` is in flight.
    Starting,
    /// Started successfully; steady state.
    Running,
    /// Landing check returned go (or was overridden); stop not yet invoked.
    LandingChecked,
    /// `stop` is in flight.
    Stopping,
    /// Stopped (terminal).
    Stopped,
    /// Failed at some point of the lifecycle (terminal).
    Failed,
}

impl SubsystemState {
    /// Human-readable state name for logs and status output.
    pub fn as_str(&self) -> &'static str {
        match self {
            SubsystemState::Inactive => "Inactive",
            SubsystemState::LaunchChecked => "LaunchChecked",
            SubsystemState::Starting => "Starting",
            SubsystemState::Running => "Running",
            SubsystemState::LandingChecked => "LandingChecked",
            SubsystemState::Stopping => "Stopping",
            SubsystemState::Stopped => "Stopped",
            SubsystemState::Failed => "Failed",
        }
    }

    /// True for the two terminal states.
    pub fn is_terminal(&self) -> bool {
        matches!(self, SubsystemState::Stopped | SubsystemState::Failed)
    }
}

/// One registered subsystem: the unit the orchestrator manages.
pub(crate) struct SubsystemRecord {
    /// Capability handle; the orchestrator only ever calls the trait.
    pub subsystem: SubsystemRef,
    /// Dependency names, cached at registration time.
    pub dependencies: Vec<String>,
    /// Failure policy, cached at registration time.
    pub critical: bool,
    /// Current lifecycle state.
    pub state: SubsystemState,
    /// Last failure reason; cleared on every successful transition.
    pub last_error: Option<String>,
}

/// Insertion-ordered map guarded by one lock.
struct Table {
    records: Vec<(String, SubsystemRecord)>,
    index: HashMap<String, usize>,
}

/// Thread-safe collection of subsystem records.
pub struct Registry {
    table: RwLock<Table>,
    frozen: AtomicBool,
}

impl Registry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self {
            table: RwLock::new(Table {
                records: Vec::new(),
                index: HashMap::new(),
            }),
            frozen: AtomicBool::new(false),
        }
    }

    /// Registers a subsystem.
    ///
    /// Dependencies may name subsystems that are not registered *yet*;
    /// existence is verified when the dependency graph is resolved, before
    /// anything starts.
    pub fn register(&self, subsystem: SubsystemRef) -> Result<(), RegistryError> {
        let name = subsystem.name().to_string();
        let dependencies = subsystem.dependencies();
        let critical = subsystem.is_critical();

        // The frozen flag is checked under the table lock: a register already
        // waiting on the lock when freeze() fires must still fail, and one
        // that wins the lock first finishes inserting before the startup
        // sweep reads the graph.
        let mut table = self.table.write().unwrap_or_else(|e| e.into_inner());
        if self.is_frozen() {
            return Err(RegistryError::Frozen);
        }
        if table.index.contains_key(&name) {
            return Err(RegistryError::DuplicateName { name });
        }
        let idx = table.records.len();
        table.index.insert(name.clone(), idx);
        table.records.push((
            name,
            SubsystemRecord {
                subsystem,
                dependencies,
                critical,
                state: SubsystemState::Inactive,
                last_error: None,
            },
        ));
        Ok(())
    }

    /// Freezes the registry; called once when the startup sweep begins.
    pub fn freeze(&self) {
        self.frozen.store(true, AtomicOrdering::SeqCst);
    }

    /// True once the startup sweep has begun.
    pub fn is_frozen(&self) -> bool {
        self.frozen.load(AtomicOrdering::SeqCst)
    }

    /// Number of registered subsystems.
    pub fn len(&self) -> usize {
        self.read().records.len()
    }

    /// True if nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The dependency graph, in registration order: (name, dependencies).
    pub(crate) fn graph(&self) -> Vec<(String, Vec<String>)> {
        self.read()
            .records
            .iter()
            .map(|(name, rec)| (name.clone(), rec.dependencies.clone()))
            .collect()
    }

    /// Capability handle for one subsystem.
    pub(crate) fn subsystem(&self, name: &str) -> Option<SubsystemRef> {
        let table = self.read();
        let idx = *table.index.get(name)?;
        Some(table.records[idx].1.subsystem.clone())
    }

    /// Cached dependency names for one subsystem.
    pub(crate) fn dependencies_of(&self, name: &str) -> Vec<String> {
        let table = self.read();
        match table.index.get(name) {
            Some(&idx) => table.records[idx].1.dependencies.clone(),
            None => Vec::new(),
        }
    }

    /// Cached criticality flag for one subsystem.
    pub(crate) fn is_critical(&self, name: &str) -> bool {
        let table = self.read();
        table
            .index
            .get(name)
            .map(|&idx| table.records[idx].1.critical)
            .unwrap_or(false)
    }

    /// Current state of one subsystem.
    pub fn state_of(&self, name: &str) -> Option<SubsystemState> {
        let table = self.read();
        table
            .index
            .get(name)
            .map(|&idx| table.records[idx].1.state)
    }

    /// Last recorded failure reason for one subsystem.
    pub fn last_error(&self, name: &str) -> Option<String> {
        let table = self.read();
        let idx = *table.index.get(name)?;
        table.records[idx].1.last_error.clone()
    }

    /// Records a successful transition; clears `last_error`.
    pub(crate) fn set_state(&self, name: &str, state: SubsystemState) {
        let mut table = self.table.write().unwrap_or_else(|e| e.into_inner());
        if let Some(&idx) = table.index.get(name) {
            let rec = &mut table.records[idx].1;
            rec.state = state;
            rec.last_error = None;
        }
    }

    /// Records a failure: state becomes `Failed`, reason is kept.
    pub(crate) fn fail(&self, name: &str, reason: impl Into<String>) {
        let mut table = self.table.write().unwrap_or_else(|e| e.into_inner());
        if let Some(&idx) = table.index.get(name) {
            let rec = &mut table.records[idx].1;
            rec.state = SubsystemState::Failed;
            rec.last_error = Some(reason.into());
        }
    }

    /// Records a non-fatal teardown error without changing state.
    ///
    /// Used for `ShutdownTimeout`: the record is already `Stopped` but the
    /// stuck worker is worth keeping on file.
    pub(crate) fn note_error(&self, name: &str, reason: impl Into<String>) {
        let mut table = self.table.write().unwrap_or_else(|e| e.into_inner());
        if let Some(&idx) = table.index.get(name) {
            table.records[idx].1.last_error = Some(reason.into());
        }
    }

    /// Consistent (name, state) view of all records, in registration order.
    pub fn snapshot(&self) -> Vec<(String, SubsystemState)> {
        self.read()
            .records
            .iter()
            .map(|(name, rec)| (name.clone(), rec.state))
            .collect()
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, Table> {
        self.table.read().unwrap_or_else(|e| e.into_inner())
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}
