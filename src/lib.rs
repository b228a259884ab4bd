#[macro_use]
extern crate log;

pub mod config;
pub mod db;
pub mod error;
pub mod fetch;
pub mod fingerprint;
pub mod patch;
pub mod registry;
pub mod revision;
pub mod scheduler;
pub mod service;

pub use config::{FetchConfig, SchedulerConfig};
pub use error::{Error, ErrorClass, ErrorResponse, Result};
pub use fetch::{FetchError, FetchOutcome, Fetcher, HttpFetcher};
pub use registry::Resource;
pub use revision::{HistoryEntry, ResponseMeta, Revision};
pub use scheduler::{PollOutcome, Poller, Scheduler, SchedulerHandle, SweepSummary};
pub use service::Backcast;
