//! Speedprobe
//!
//! A concurrent internet speed test engine that measures round-trip latency,
//! download throughput and upload throughput against a catalog of remote
//! probe endpoints supplied by an external service.

pub mod aggregate;
pub mod catalog;
pub mod cli;
pub mod client;
pub mod config;
pub mod error;
pub mod logging;
pub mod models;
pub mod orchestrator;
pub mod output;

// Re-export commonly used types
pub use catalog::CatalogService;
pub use client::MeterClient;
pub use config::Config;
pub use error::{AppError, Result};
pub use models::{Probe, ProbeCatalog, ProbeGroup, SpeedResult, TransferSample};
pub use orchestrator::SpeedTest;

/// Application version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const PKG_NAME: &str = env!("CARGO_PKG_NAME");
pub const PKG_DESCRIPTION: &str = env!("CARGO_PKG_DESCRIPTION");

/// Default configuration values
pub mod defaults {
    use std::time::Duration;

    /// Number of measurement rounds per run
    pub const DEFAULT_ROUND_COUNT: u32 = 1;
    /// Per-probe connect timeout when the catalog does not supply one
    pub const DEFAULT_PROBE_TIMEOUT: Duration = Duration::from_secs(10);
    /// Catalog service the probe set is fetched from
    pub const DEFAULT_BASE_URL: &str = "https://yandex.ru";
    /// Path of the probe catalog endpoint under the base URL
    pub const CATALOG_PATH: &str = "/internet/api/v0/get-probes";
    /// Latency attempts per probe and round
    pub const DEFAULT_LATENCY_ATTEMPTS: u32 = 5;
    /// Recorded in place of a failed latency attempt, in milliseconds
    pub const LATENCY_PENALTY_MS: f64 = 10_000.0;
    /// Pause between latency attempts
    pub const LATENCY_ATTEMPT_GAP: Duration = Duration::from_millis(50);
    /// Chunk size for streamed transfers
    pub const TRANSFER_CHUNK_SIZE: usize = 64 * 1024;
    pub const DEFAULT_ENABLE_COLOR: bool = true;
}
