//! Measurement run orchestration
//!
//! Fans one measurement task out per probe and category, round by round,
//! and feeds the raw samples to the aggregation rules. Probes within a
//! category run concurrently so the link is saturated the way a real
//! multi-connection speed test saturates it; a failed probe resolves to its
//! sentinel without disturbing its siblings.

use crate::aggregate;
use crate::catalog::CatalogService;
use crate::client::MeterClient;
use crate::config::Config;
use crate::defaults;
use crate::error::{AppError, Result};
use crate::logging::Logger;
use crate::models::{Probe, ProbeCatalog, RoundResult, SpeedResult};
use futures::future::join_all;
use std::time::Duration;

/// Speed test engine bound to one probe catalog
///
/// The catalog is acquired once, at construction, and is immutable for the
/// engine's lifetime.
pub struct SpeedTest {
    catalog: ProbeCatalog,
    client: MeterClient,
    latency_attempts: u32,
    timeout_override: Option<Duration>,
    logger: Logger,
}

impl SpeedTest {
    /// Bootstrap an engine by fetching the catalog from the external service
    ///
    /// This is the fatal path: without a catalog there is nothing to
    /// measure, so fetch and parse errors propagate to the caller.
    pub async fn connect(config: &Config) -> Result<Self> {
        let logger = config.logger();
        let service = CatalogService::new(&config.base_url);
        logger.info(
            "catalog",
            &format!("fetching probe catalog from {}", service.catalog_url()),
        );

        let catalog = service.fetch().await?;
        logger.info(
            "catalog",
            &format!(
                "catalog ready: {} download, {} upload, {} latency probes (mid={})",
                catalog.download.len(),
                catalog.upload.len(),
                catalog.latency.len(),
                catalog.mid
            ),
        );

        Ok(Self {
            catalog,
            client: MeterClient::new(),
            latency_attempts: config.latency_attempts,
            timeout_override: config.probe_timeout(),
            logger,
        })
    }

    /// Build an engine around an already-parsed catalog
    pub fn from_catalog(catalog: ProbeCatalog) -> Self {
        Self {
            catalog,
            client: MeterClient::new(),
            latency_attempts: defaults::DEFAULT_LATENCY_ATTEMPTS,
            timeout_override: None,
            logger: Logger::disabled(),
        }
    }

    /// Replace the logger
    pub fn with_logger(mut self, logger: Logger) -> Self {
        self.logger = logger;
        self
    }

    /// Override the per-probe latency attempt count
    pub fn with_latency_attempts(mut self, attempts: u32) -> Self {
        self.latency_attempts = attempts;
        self
    }

    /// Apply one timeout to every probe, ignoring catalog-supplied values
    pub fn with_probe_timeout(mut self, timeout: Duration) -> Self {
        self.timeout_override = Some(timeout);
        self
    }

    /// Effective timeout for a probe, honoring the global override
    fn probe_timeout(&self, probe: &Probe) -> Duration {
        self.timeout_override.unwrap_or_else(|| probe.timeout())
    }

    /// The catalog this engine measures against
    pub fn catalog(&self) -> &ProbeCatalog {
        &self.catalog
    }

    /// Execute `count` measurement rounds and reduce them to one result
    ///
    /// Every round runs all three categories; per-round triples are averaged
    /// across rounds with no round excluded, so persistent failures show up
    /// in the final numbers instead of being masked.
    pub async fn run(&self, count: u32) -> Result<SpeedResult> {
        if count == 0 {
            return Err(AppError::validation("round count must be positive"));
        }

        let mut rounds = Vec::with_capacity(count as usize);
        for round in 1..=count {
            self.logger
                .info("orchestrator", &format!("round {}/{}", round, count));

            let result = self.run_round().await;
            self.logger.debug(
                "orchestrator",
                &format!(
                    "round {} -> ping {:.2} ms, down {:.2} Mbps, up {:.2} Mbps",
                    round, result.ping_ms, result.download_mbps, result.upload_mbps
                ),
            );
            rounds.push(result);
        }

        Ok(aggregate::reduce_rounds(&rounds))
    }

    /// Run one round: concurrent fan-out per category, then per-round reduction
    async fn run_round(&self) -> RoundResult {
        let downloads = join_all(
            self.catalog
                .download
                .probes
                .iter()
                .map(|probe| {
                    self.client
                        .measure_download(&probe.url, self.probe_timeout(probe))
                }),
        )
        .await;

        let uploads = join_all(self.catalog.upload.probes.iter().map(|probe| {
            self.client
                .measure_upload(&probe.url, probe.size.unwrap_or(0), self.probe_timeout(probe))
        }))
        .await;

        let latencies = join_all(self.catalog.latency.probes.iter().map(|probe| {
            self.client
                .measure_latency(&probe.url, self.probe_timeout(probe), self.latency_attempts)
        }))
        .await;

        let failed_transfers = downloads
            .iter()
            .chain(uploads.iter())
            .filter(|sample| sample.is_failure())
            .count();
        if failed_transfers > 0 {
            self.logger.warn(
                "orchestrator",
                &format!("{} transfer probe(s) failed this round", failed_transfers),
            );
        }

        aggregate::reduce_round(&downloads, &uploads, &latencies)
    }
}
