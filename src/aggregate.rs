//! Aggregation rules for raw measurement samples
//!
//! Turns per-probe samples into per-round `(ping, download, upload)` triples
//! and per-round triples into the final result. Concurrent transfers in one
//! category share the physical link, so a round's effective duration is that
//! of its slowest completing probe: throughput is sum-of-bytes over
//! max-elapsed, not a sum of per-probe rates.

use crate::models::{RoundResult, SpeedResult, TransferSample};

/// Median of a set of values; `+infinity` when the set is empty
///
/// Failed latency attempts arrive here as the fixed penalty value, which the
/// median is robust to as long as most attempts succeed.
pub fn median(values: &[f64]) -> f64 {
    if values.is_empty() {
        return f64::INFINITY;
    }

    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);

    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 1 {
        sorted[mid]
    } else {
        (sorted[mid - 1] + sorted[mid]) / 2.0
    }
}

/// Arithmetic mean; `0.0` for an empty set
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Throughput in Mbps for one category's concurrent samples within a round
///
/// Failure sentinels contribute zero bytes and are excluded from the elapsed
/// maximum. A category where every sample failed yields `0.0`, never
/// `inf` or `NaN`.
pub fn category_throughput_mbps(samples: &[TransferSample]) -> f64 {
    let total_bytes: u64 = samples.iter().map(|s| s.bytes).sum();

    let max_elapsed = samples
        .iter()
        .filter(|s| !s.is_failure())
        .map(|s| s.elapsed_secs)
        .fold(0.0_f64, f64::max);

    if total_bytes == 0 || max_elapsed <= 0.0 {
        return 0.0;
    }

    (total_bytes as f64) * 8.0 / 1_000_000.0 / max_elapsed
}

/// Reduce one round's raw samples into its `(ping, download, upload)` triple
///
/// `latency_medians` holds one per-probe median for each latency probe; they
/// are combined by a second median when more than one probe exists.
pub fn reduce_round(
    download: &[TransferSample],
    upload: &[TransferSample],
    latency_medians: &[f64],
) -> RoundResult {
    RoundResult {
        ping_ms: median(latency_medians),
        download_mbps: category_throughput_mbps(download),
        upload_mbps: category_throughput_mbps(upload),
    }
}

/// Cross-round reduction: per-metric arithmetic mean over every round
///
/// No round is excluded. A fully failed round contributes its zeros and
/// penalty-derived latency, pulling the averages down so persistent failures
/// stay visible in the final numbers.
pub fn reduce_rounds(rounds: &[RoundResult]) -> SpeedResult {
    let pings: Vec<f64> = rounds.iter().map(|r| r.ping_ms).collect();
    let downloads: Vec<f64> = rounds.iter().map(|r| r.download_mbps).collect();
    let uploads: Vec<f64> = rounds.iter().map(|r| r.upload_mbps).collect();

    SpeedResult {
        ping_ms: mean(&pings),
        download_mbps: mean(&downloads),
        upload_mbps: mean(&uploads),
    }
}
