use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use webtools::config::{AppState, Config};
use webtools::handler::ContentStore;
use webtools::jobs::{HelloJob, Scheduler};
use webtools::{logger, server};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cfg = Config::load()?;
    logger::init(&cfg)?;

    // Size the runtime from the workers setting
    let mut runtime_builder = tokio::runtime::Builder::new_multi_thread();
    runtime_builder.enable_all();

    if let Some(workers) = cfg.server.workers {
        runtime_builder.worker_threads(workers);
        logger::log_info(&format!("[CONFIG] Using {workers} worker threads"));
    } else {
        logger::log_info("[CONFIG] Using default worker threads (CPU cores)");
    }

    let runtime = runtime_builder.build()?;

    runtime.block_on(async_main(cfg))
}

async fn async_main(cfg: Config) -> Result<(), Box<dyn std::error::Error>> {
    let addr = cfg.get_socket_addr()?;
    let listener = server::bind_listener(addr)?;

    let content = ContentStore::load(&cfg.content.files, &cfg.http.charset).await;
    let hello_runs = Arc::new(AtomicUsize::new(0));
    let scheduler = start_jobs(&cfg, &hello_runs);

    logger::log_server_start(&addr, &cfg);
    let state = Arc::new(AppState::new(cfg, content));

    server::run(listener, Arc::clone(&state), server::shutdown_signal()).await;

    scheduler.shutdown().await;
    logger::log_info(&format!(
        "[JOBS] {} ran {} times",
        HelloJob::NAME,
        hello_runs.load(Ordering::SeqCst)
    ));
    state.teardown();
    logger::log_server_stop();
    Ok(())
}

fn start_jobs(cfg: &Config, hello_runs: &Arc<AtomicUsize>) -> Scheduler {
    let mut scheduler = Scheduler::new();

    if let Some(secs) = cfg.jobs.hello_interval_secs.filter(|&s| s > 0) {
        let data = HashMap::from([("id".to_string(), cfg.jobs.hello_id.clone())]);
        let job = HelloJob::new(Arc::clone(hello_runs));
        if scheduler.schedule(job, data, Duration::from_secs(secs)) {
            logger::log_info(&format!("[JOBS] {} scheduled every {secs}s", HelloJob::NAME));
        }
    }

    scheduler
}
