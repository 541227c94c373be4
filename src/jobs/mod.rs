//! Scheduled job module
//!
//! Runs jobs on fixed intervals in the Tokio runtime until shutdown.

mod hello;

use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use crate::logger;

pub use hello::HelloJob;

/// Per-job data handed to every execution
#[derive(Debug, Clone)]
pub struct JobContext {
    name: String,
    data: HashMap<String, String>,
    fire_count: u64,
}

impl JobContext {
    pub fn new(name: impl Into<String>, data: HashMap<String, String>) -> Self {
        Self {
            name: name.into(),
            data,
            fire_count: 0,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.data.get(key).map(String::as_str)
    }

    /// Number of the current execution, starting at 1
    pub const fn fire_count(&self) -> u64 {
        self.fire_count
    }
}

/// A unit of scheduled work
pub trait Job: Send + Sync + 'static {
    fn name(&self) -> &str;

    fn execute(&self, ctx: &JobContext) -> impl Future<Output = ()> + Send;
}

/// Interval scheduler
///
/// Executions of one job never overlap: a tick that fires while the previous
/// run is still going is skipped.
pub struct Scheduler {
    stop_tx: watch::Sender<bool>,
    handles: Vec<(String, JoinHandle<()>)>,
}

impl Default for Scheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl Scheduler {
    pub fn new() -> Self {
        let (stop_tx, _) = watch::channel(false);
        Self {
            stop_tx,
            handles: Vec::new(),
        }
    }

    /// Start running `job` every `every`, first run immediately
    ///
    /// Returns false when the interval is zero.
    pub fn schedule<J: Job>(&mut self, job: J, data: HashMap<String, String>, every: Duration) -> bool {
        if every.is_zero() {
            logger::log_warning(&format!("Job '{}' has a zero interval, not scheduled", job.name()));
            return false;
        }

        let job = Arc::new(job);
        let name = job.name().to_string();
        let mut stop_rx = self.stop_tx.subscribe();
        let mut ctx = JobContext::new(name.clone(), data);

        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(every);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
            loop {
                if *stop_rx.borrow() {
                    break;
                }
                tokio::select! {
                    _ = ticker.tick() => {
                        ctx.fire_count += 1;
                        job.execute(&ctx).await;
                    }
                    _ = stop_rx.changed() => break,
                }
            }
        });

        logger::log_info(&format!("[Jobs] Scheduled '{name}' every {}ms", every.as_millis()));
        self.handles.push((name, handle));
        true
    }

    pub fn len(&self) -> usize {
        self.handles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }

    /// Stop every job, waiting for running executions to finish
    pub async fn shutdown(self) {
        let _ = self.stop_tx.send(true);
        for (name, handle) in self.handles {
            if let Err(e) = handle.await {
                logger::log_error(&format!("Job '{name}' ended abnormally: {e}"));
            }
        }
        logger::log_info("[Jobs] Scheduler stopped");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU64, Ordering};

    struct Recorder {
        last_fire: Arc<AtomicU64>,
    }

    impl Job for Recorder {
        fn name(&self) -> &str {
            "recorder"
        }

        async fn execute(&self, ctx: &JobContext) {
            assert_eq!(ctx.name(), "recorder");
            assert_eq!(ctx.get("k"), Some("v"));
            self.last_fire.store(ctx.fire_count(), Ordering::SeqCst);
        }
    }

    #[tokio::test]
    async fn test_job_runs_until_shutdown() {
        let last_fire = Arc::new(AtomicU64::new(0));
        let mut scheduler = Scheduler::new();
        let data = HashMap::from([("k".to_string(), "v".to_string())]);

        assert!(scheduler.schedule(
            Recorder { last_fire: Arc::clone(&last_fire) },
            data,
            Duration::from_millis(10),
        ));
        tokio::time::sleep(Duration::from_millis(100)).await;
        scheduler.shutdown().await;

        let fired = last_fire.load(Ordering::SeqCst);
        assert!(fired >= 2, "expected several runs, got {fired}");

        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(last_fire.load(Ordering::SeqCst), fired);
    }

    #[tokio::test]
    async fn test_zero_interval_rejected() {
        let mut scheduler = Scheduler::new();
        let job = Recorder { last_fire: Arc::new(AtomicU64::new(0)) };
        assert!(!scheduler.schedule(job, HashMap::new(), Duration::ZERO));
        assert!(scheduler.is_empty());
        scheduler.shutdown().await;
    }
}
