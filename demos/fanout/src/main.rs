mod config;
mod jobs;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use pacer_core::{
    Controller, Subscribe, batch_execute_with, retry_with, spawn_with_timeout, with_timeout,
};
use pacer_model::TaskResult;
use pacer_observe::{Journal, LoggerConfig, logger_init};
use tokio::time::sleep;
use tracing::{info, warn};

use crate::config::DemoConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    logger_init(&LoggerConfig::from_env()?)?;

    let path = std::env::args().nth(1).map(PathBuf::from);
    let cfg = DemoConfig::load(path.as_deref())?;
    info!(?cfg, "fanout demo starting");

    let journal: Arc<dyn Subscribe> = Arc::new(Journal::new());
    let ctrl = Controller::builder(cfg.controller.clone())
        .with_subscriber(journal)
        .build();

    // Settle-all through the shared controller.
    let results = ctrl.execute_all((0..cfg.jobs).map(jobs::fetch)).await;
    report("controller", &results);

    // Backpressure: fill the controller past its bounded queue.
    let mut held = Vec::new();
    let mut refused = 0usize;
    for id in 0..cfg.jobs {
        match ctrl.try_spawn(jobs::fetch(id)) {
            Ok(handle) => held.push(handle),
            Err(e) => {
                refused += 1;
                warn!(job = id, error = %e, "job refused");
            }
        }
    }
    info!(accepted = held.len(), refused, "bounded submission");
    // Spawned work runs on its own; handles settle in any await order.
    for handle in held.into_iter().rev() {
        if let Err(e) = handle.await {
            warn!(error = %e, "accepted job failed");
        }
    }

    let results = batch_execute_with((0..cfg.jobs).map(jobs::fetch), &cfg.batch).await;
    report("batches", &results);

    match retry_with(jobs::flaky(2), &cfg.retry).await {
        Ok(attempts) => info!(attempts, "flaky job recovered"),
        Err(e) => warn!(error = %e, "flaky job gave up"),
    }

    let slow = cfg.timeout() * 2;
    match with_timeout(
        move || async move {
            sleep(slow).await;
            Ok::<_, String>("slow job finished")
        },
        cfg.timeout(),
    )
    .await
    {
        Ok(msg) => info!(msg, "slow job finished in time"),
        Err(e) => warn!(error = %e, "slow job timed out"),
    }

    let res = spawn_with_timeout(
        move |token| async move {
            tokio::select! {
                _ = token.cancelled() => Err("cancelled after deadline".to_string()),
                _ = sleep(slow) => Ok(()),
            }
        },
        cfg.timeout(),
    )
    .await;
    if let Err(e) = res {
        warn!(error = %e, "detached job timed out");
    }
    // Give the detached job a moment to observe cancellation.
    sleep(Duration::from_millis(10)).await;

    info!("fanout demo finished");
    Ok(())
}

fn report(label: &str, results: &[TaskResult<String, String>]) {
    let failed = results.iter().filter(|r| r.is_rejected()).count();
    info!(label, total = results.len(), failed, "run summary");
    for r in results.iter().filter(|r| r.is_rejected()) {
        if let Some(reason) = r.reason() {
            warn!(label, index = r.index(), reason = %reason, "job failed");
        }
    }
}
