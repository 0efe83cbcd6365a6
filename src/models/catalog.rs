//! Probe catalog data model
//!
//! The catalog is fetched once per client lifetime from the external probe
//! service and is immutable thereafter. Parsing is strictly typed: a document
//! with missing or malformed required fields is rejected with an
//! invalid-catalog error rather than a generic runtime failure.

use crate::defaults;
use crate::error::{AppError, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// A single measurement endpoint with its per-probe parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Probe {
    /// Endpoint URL this probe measures against
    pub url: String,

    /// Per-probe connect timeout in seconds; absent or null means 10 s
    #[serde(default)]
    pub timeout: Option<f64>,

    /// Declared payload size in bytes; required for upload probes
    #[serde(default)]
    pub size: Option<u64>,
}

impl Probe {
    /// Effective connect timeout, applying the catalog default
    ///
    /// Values a `Duration` cannot represent (non-finite, negative, absurdly
    /// large) fall back to the default; catalog data must never panic the
    /// measurement path.
    pub fn timeout(&self) -> Duration {
        match self.timeout {
            Some(secs) if secs > 0.0 => Duration::try_from_secs_f64(secs)
                .unwrap_or(defaults::DEFAULT_PROBE_TIMEOUT),
            _ => defaults::DEFAULT_PROBE_TIMEOUT,
        }
    }
}

/// Ordered set of probes for one measurement category
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProbeGroup {
    pub probes: Vec<Probe>,
}

impl ProbeGroup {
    pub fn len(&self) -> usize {
        self.probes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.probes.is_empty()
    }
}

/// The full probe catalog returned by the external service
///
/// `mid` and `lid` are opaque correlation tokens forwarded to the service;
/// the engine never interprets them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProbeCatalog {
    pub mid: String,
    pub lid: String,
    pub download: ProbeGroup,
    pub upload: ProbeGroup,
    pub latency: ProbeGroup,
}

impl ProbeCatalog {
    /// Parse a catalog document, enforcing the semantic constraints the
    /// wire schema cannot express
    pub fn from_json(body: &str) -> Result<Self> {
        let catalog: ProbeCatalog = serde_json::from_str(body)
            .map_err(|e| AppError::invalid_catalog(format!("malformed document: {}", e)))?;
        catalog.validate()?;
        Ok(catalog)
    }

    /// Validate probe URLs and the upload size requirement
    pub fn validate(&self) -> Result<()> {
        for (category, group) in [
            ("download", &self.download),
            ("upload", &self.upload),
            ("latency", &self.latency),
        ] {
            for probe in &group.probes {
                url::Url::parse(&probe.url).map_err(|e| {
                    AppError::invalid_catalog(format!(
                        "{} probe has invalid URL {:?}: {}",
                        category, probe.url, e
                    ))
                })?;
            }
        }

        for probe in &self.upload.probes {
            if probe.size.is_none() {
                return Err(AppError::invalid_catalog(format!(
                    "upload probe {} is missing its payload size",
                    probe.url
                )));
            }
        }

        Ok(())
    }

    /// Total probe count across all categories
    pub fn probe_count(&self) -> usize {
        self.download.len() + self.upload.len() + self.latency.len()
    }
}
