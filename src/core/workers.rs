//! # Worker pool: centralized ownership of subsystem background work.
//!
//! A subsystem's `start` may spawn a background execution unit (its service
//! loop). The [`WorkerPool`] adopts that unit's [`JoinHandle`] together with
//! its cooperative [`CancellationToken`], keyed by subsystem name, so that
//! cancellation signaling and join-with-timeout live in one place instead of
//! being scattered per subsystem.
//!
//! ## Rules
//! - One worker per subsystem at most; a subsystem with no worker is a no-op
//!   for this component.
//! - [`WorkerPool::join`] removes the worker from the pool; a join that times
//!   out leaves the task running detached (the orchestrator records
//!   `ShutdownTimeout` and moves on).
//! - [`WorkerPool::abort_all`] is the escalation path for a repeated
//!   interrupt: everything still in the pool is aborted outright.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// Background execution unit owned on behalf of one subsystem.
struct Worker {
    join: JoinHandle<()>,
    cancel: CancellationToken,
}

/// How a worker join ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum JoinOutcome {
    /// Worker finished within the bound (or had already finished).
    Joined,
    /// Worker finished within the bound, but by panicking.
    Panicked,
    /// The bound elapsed; the worker was left running detached.
    TimedOut,
    /// The subsystem had no worker registered.
    NoWorker,
}

impl JoinOutcome {
    /// Maps a finished join: a panic is its own outcome; an abort (only ever
    /// issued by the pool itself) counts as joined.
    fn from_result(result: Result<(), tokio::task::JoinError>) -> Self {
        match result {
            Ok(()) => JoinOutcome::Joined,
            Err(e) if e.is_panic() => JoinOutcome::Panicked,
            Err(_) => JoinOutcome::Joined,
        }
    }
}

/// Name-keyed collection of subsystem workers.
pub(crate) struct WorkerPool {
    workers: Mutex<HashMap<String, Worker>>,
}

impl WorkerPool {
    pub fn new() -> Self {
        Self {
            workers: Mutex::new(HashMap::new()),
        }
    }

    /// Adopts a worker spawned by a subsystem's `start`.
    ///
    /// A stale entry under the same name is cancelled and replaced; with the
    /// frozen registry this can only happen across runs, not within one.
    pub fn adopt(&self, name: &str, join: JoinHandle<()>, cancel: CancellationToken) {
        let mut workers = self.workers.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(stale) = workers.insert(name.to_string(), Worker { join, cancel }) {
            stale.cancel.cancel();
            stale.join.abort();
        }
    }

    /// Requests cooperative termination of one subsystem's worker.
    pub fn cancel(&self, name: &str) {
        let workers = self.workers.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(worker) = workers.get(name) {
            worker.cancel.cancel();
        }
    }

    /// Waits for one subsystem's worker to finish, bounded by `timeout`
    /// (`None` = unbounded). The worker is removed from the pool either way.
    pub async fn join(&self, name: &str, timeout: Option<Duration>) -> JoinOutcome {
        let worker = {
            let mut workers = self.workers.lock().unwrap_or_else(|e| e.into_inner());
            workers.remove(name)
        };
        let worker = match worker {
            Some(w) => w,
            None => return JoinOutcome::NoWorker,
        };

        worker.cancel.cancel();
        match timeout {
            Some(limit) => match tokio::time::timeout(limit, worker.join).await {
                Ok(join_result) => JoinOutcome::from_result(join_result),
                Err(_elapsed) => JoinOutcome::TimedOut,
            },
            None => JoinOutcome::from_result(worker.join.await),
        }
    }

    /// Aborts every worker still in the pool (repeat-signal escalation).
    pub fn abort_all(&self) {
        let mut workers = self.workers.lock().unwrap_or_else(|e| e.into_inner());
        for (_, worker) in workers.drain() {
            worker.cancel.cancel();
            worker.join.abort();
        }
    }

    #[cfg(test)]
    fn len(&self) -> usize {
        self.workers.lock().unwrap().len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_join_cooperative_worker() {
        let pool = WorkerPool::new();
        let token = CancellationToken::new();
        let ctx = token.clone();
        let handle = tokio::spawn(async move { ctx.cancelled().await });
        pool.adopt("net", handle, token);

        let outcome = pool.join("net", Some(Duration::from_secs(1))).await;
        assert_eq!(outcome, JoinOutcome::Joined);
        assert_eq!(pool.len(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_join_times_out_on_stuck_worker() {
        let pool = WorkerPool::new();
        let token = CancellationToken::new();
        let handle = tokio::spawn(std::future::pending::<()>());
        pool.adopt("print", handle, token);

        let outcome = pool.join("print", Some(Duration::from_millis(100))).await;
        assert_eq!(outcome, JoinOutcome::TimedOut);
    }

    #[tokio::test]
    async fn test_join_reports_worker_panic() {
        let pool = WorkerPool::new();
        let token = CancellationToken::new();
        let handle = tokio::spawn(async { panic!("worker bug") });
        pool.adopt("cache", handle, token);

        let outcome = pool.join("cache", Some(Duration::from_secs(1))).await;
        assert_eq!(outcome, JoinOutcome::Panicked);
        assert_eq!(pool.len(), 0);
    }

    #[tokio::test]
    async fn test_join_without_worker_is_noop() {
        let pool = WorkerPool::new();
        let outcome = pool.join("mdns", Some(Duration::from_millis(10))).await;
        assert_eq!(outcome, JoinOutcome::NoWorker);
    }

    #[tokio::test]
    async fn test_abort_all_clears_pool() {
        let pool = WorkerPool::new();
        for name in ["a", "b"] {
            let token = CancellationToken::new();
            pool.adopt(name, tokio::spawn(std::future::pending::<()>()), token);
        }
        assert_eq!(pool.len(), 2);
        pool.abort_all();
        assert_eq!(pool.len(), 0);
    }
}
