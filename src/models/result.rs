//! Measurement sample and result data models

use serde::{Deserialize, Serialize};

/// Raw outcome of one timed transfer against one probe endpoint
///
/// A failed transfer is represented by the sentinel `{elapsed_secs:
/// +infinity, bytes: 0}` instead of an error, so the aggregation layer can
/// fold failures in uniformly. Invariant: `bytes == 0` iff the sample is the
/// sentinel; a successful sample always has `bytes > 0` and finite elapsed.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TransferSample {
    /// Wall-clock seconds from request issue to full body consumption
    pub elapsed_secs: f64,

    /// Bytes moved over the link
    pub bytes: u64,
}

impl TransferSample {
    /// Create a successful sample
    pub fn success(elapsed_secs: f64, bytes: u64) -> Self {
        debug_assert!(elapsed_secs.is_finite() && elapsed_secs >= 0.0);
        debug_assert!(bytes > 0);
        Self {
            elapsed_secs,
            bytes,
        }
    }

    /// Create the failure sentinel
    pub fn failed() -> Self {
        Self {
            elapsed_secs: f64::INFINITY,
            bytes: 0,
        }
    }

    /// Whether this sample is the failure sentinel
    pub fn is_failure(&self) -> bool {
        self.bytes == 0
    }
}

/// One round's aggregated `(ping, download, upload)` triple
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RoundResult {
    pub ping_ms: f64,
    pub download_mbps: f64,
    pub upload_mbps: f64,
}

/// Final result of an orchestrated measurement run
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpeedResult {
    /// Median round-trip latency in milliseconds
    pub ping_ms: f64,

    /// Download throughput in megabits per second
    pub download_mbps: f64,

    /// Upload throughput in megabits per second
    pub upload_mbps: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transfer_sample_success() {
        let sample = TransferSample::success(1.5, 10_000_000);
        assert!(!sample.is_failure());
        assert_eq!(sample.bytes, 10_000_000);
        assert_eq!(sample.elapsed_secs, 1.5);
    }

    #[test]
    fn test_transfer_sample_sentinel() {
        let sample = TransferSample::failed();
        assert!(sample.is_failure());
        assert_eq!(sample.bytes, 0);
        assert!(sample.elapsed_secs.is_infinite());
    }

    #[test]
    fn test_speed_result_json_shape() {
        let result = SpeedResult {
            ping_ms: 21.0,
            download_mbps: 80.0,
            upload_mbps: 80.0,
        };

        let json = serde_json::to_value(result).unwrap();
        assert_eq!(json["ping_ms"], 21.0);
        assert_eq!(json["download_mbps"], 80.0);
        assert_eq!(json["upload_mbps"], 80.0);
    }
}
