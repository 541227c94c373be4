// Hello job
// Greets on every run and counts executions

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use super::{Job, JobContext};
use crate::logger;

/// Simulated work per run
const WORK_DURATION: Duration = Duration::from_millis(200);

/// Logs `Hello World! - <id>` and bumps a shared counter
pub struct HelloJob {
    counter: Arc<AtomicUsize>,
}

impl HelloJob {
    pub const NAME: &'static str = "hello";

    pub const fn new(counter: Arc<AtomicUsize>) -> Self {
        Self { counter }
    }
}

impl Job for HelloJob {
    fn name(&self) -> &str {
        Self::NAME
    }

    async fn execute(&self, ctx: &JobContext) {
        logger::log_info(&format!("Hello World! - {}", ctx.get("id").unwrap_or("-")));
        self.counter.fetch_add(1, Ordering::SeqCst);
        tokio::time::sleep(WORK_DURATION).await;
    }
}
