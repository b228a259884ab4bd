#[macro_use]
extern crate log;

use std::time::Duration;

use backcast::{FetchConfig, HttpFetcher, Scheduler, SchedulerConfig};
use clap::Parser;
use tokio_util::sync::CancellationToken;

#[derive(Parser, Debug)]
#[command(name = "backcast", about = "Poll web resources and keep their edit history")]
struct Args {
    /// Database to keep resources and edit chains in.
    #[arg(long, env = "DB_URL")]
    db_url: String,

    /// Seconds between stale sweeps.
    #[arg(long, env = "BACKCAST_POLL_INTERVAL", default_value_t = 60)]
    poll_interval: u64,

    /// Seconds after which a resource counts as stale.
    #[arg(long, env = "BACKCAST_STALE_AFTER", default_value_t = 60 * 60)]
    stale_after: u64,

    /// Most resources polled by a single sweep.
    #[arg(long, env = "BACKCAST_SWEEP_LIMIT", default_value_t = 5)]
    sweep_limit: u64,

    /// Seconds before a fetch is abandoned.
    #[arg(long, env = "BACKCAST_FETCH_TIMEOUT", default_value_t = 30)]
    fetch_timeout: u64,
}

#[tokio::main]
async fn main() {
    pretty_env_logger::init();

    let args = Args::parse();

    let db = backcast::db::connect(&args.db_url)
        .await
        .expect("Unable to connect to database");

    let fetcher = HttpFetcher::new(&FetchConfig {
        timeout: Duration::from_secs(args.fetch_timeout),
        ..FetchConfig::default()
    })
    .expect("Unable to setup HTTP client");

    let config = SchedulerConfig {
        poll_interval: Duration::from_secs(args.poll_interval),
        stale_after: Duration::from_secs(args.stale_after),
        sweep_limit: args.sweep_limit,
    };
    let (scheduler, _handle) = Scheduler::new(db, fetcher, config);

    let shutdown = CancellationToken::new();
    let worker = tokio::task::spawn(scheduler.run(shutdown.clone()));

    tokio::signal::ctrl_c()
        .await
        .expect("Unable to listen for shutdown signal");
    info!("Shutting down");
    shutdown.cancel();

    if let Err(e) = worker.await {
        error!("Scheduler task failed: {}", e);
    }
}
