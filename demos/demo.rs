//! # Example: three-subsystem server skeleton
//!
//! Wires a network layer, a database on top of it, and a web frontend on top
//! of both, runs the orchestrator, and shuts down after a short while (or on
//! Ctrl-C, whichever comes first).
//!
//! Run with: `cargo run --example demo --features logging`

use std::sync::Arc;
use std::time::Duration;

use flightdeck::{Config, Gate, LogWriter, Orchestrator, Subscribe, SubsystemFn, SubsystemRef};

fn network() -> SubsystemRef {
    SubsystemFn::new("network")
        .critical()
        .on_start(|ctx| async move {
            println!("[network] binding listeners");
            let worker = tokio::spawn(async move {
                // accept loop stand-in
                ctx.cancelled().await;
                println!("[network] accept loop closed");
            });
            Ok(Some(worker))
        })
        .arc()
}

fn database() -> SubsystemRef {
    SubsystemFn::new("database")
        .depends_on(["network"])
        .critical()
        .on_launch_check(|| async {
            // pretend to probe the data directory
            Gate::Go
        })
        .on_start(|_ctx| async {
            println!("[database] opening store");
            Ok(None)
        })
        .on_stop(|| async {
            println!("[database] flushing and closing store");
            Ok(())
        })
        .arc()
}

fn web() -> SubsystemRef {
    SubsystemFn::new("web")
        .depends_on(["network", "database"])
        .on_start(|ctx| async move {
            println!("[web] serving");
            let worker = tokio::spawn(async move {
                ctx.cancelled().await;
                println!("[web] drained");
            });
            Ok(Some(worker))
        })
        .on_land_check(|| async {
            // a real frontend would check for in-flight requests here
            Gate::Go
        })
        .arc()
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let subs: Vec<Arc<dyn Subscribe>> = vec![Arc::new(LogWriter)];
    let orch = Orchestrator::builder(Config::default())
        .with_subscribers(subs)
        .build();

    orch.register(network())?;
    orch.register(database())?;
    orch.register(web())?;

    // Shut down after 2 seconds unless a signal arrives first.
    let handle = orch.handle();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_secs(2)).await;
        handle.request();
    });

    let report = orch.run().await?;
    println!("--- shutdown report ---");
    print!("{report}");
    Ok(())
}
