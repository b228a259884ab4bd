use std::time::Duration;

#[derive(Clone, Debug)]
pub struct SchedulerConfig {
    /// How often the stale sweep runs.
    pub poll_interval: Duration,
    /// Resources not polled for this long are picked up by the sweep.
    pub stale_after: Duration,
    /// Upper bound on resources polled per sweep.
    pub sweep_limit: u64,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        SchedulerConfig {
            poll_interval: Duration::from_secs(60),
            stale_after: Duration::from_secs(60 * 60),
            sweep_limit: 5,
        }
    }
}

#[derive(Clone, Debug)]
pub struct FetchConfig {
    pub timeout: Duration,
    pub user_agent: String,
}

impl Default for FetchConfig {
    fn default() -> Self {
        FetchConfig {
            timeout: Duration::from_secs(30),
            user_agent: format!("Backcast {}", env!("CARGO_PKG_VERSION")),
        }
    }
}
