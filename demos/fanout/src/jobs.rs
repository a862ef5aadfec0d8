use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;

use tokio::time::sleep;

type Job<T> = Pin<Box<dyn Future<Output = Result<T, String>> + Send>>;

/// Simulated fetch with a deterministic latency; every fifth job fails.
pub fn fetch(id: usize) -> impl FnOnce() -> Job<String> {
    move || -> Job<String> {
        Box::pin(async move {
            sleep(latency(id)).await;
            if id % 5 == 4 {
                Err(format!("job {id}: upstream returned 503"))
            } else {
                Ok(format!("job {id}: {} bytes", 512 + id * 64))
            }
        })
    }
}

pub fn latency(id: usize) -> Duration {
    Duration::from_millis(20 + (id as u64 * 37) % 120)
}

/// Job that fails `failures` times before succeeding.
pub fn flaky(failures: u32) -> impl FnMut() -> Job<u32> {
    let calls = Arc::new(AtomicU32::new(0));
    move || -> Job<u32> {
        let calls = Arc::clone(&calls);
        Box::pin(async move {
            let n = calls.fetch_add(1, Ordering::SeqCst) + 1;
            if n <= failures {
                Err(format!("attempt {n}: connection reset"))
            } else {
                Ok(n)
            }
        })
    }
}
