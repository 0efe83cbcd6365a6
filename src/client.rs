//! Measurement primitives: timed transfers and latency probing
//!
//! Every operation here converts transport failure into a sentinel value
//! instead of an error. A flaky probe must never abort its siblings, so
//! nothing in this module returns `Err` on the measurement path.

use crate::aggregate;
use crate::defaults;
use crate::models::TransferSample;
use futures::StreamExt;
use reqwest::header::{HeaderMap, HeaderValue};
use reqwest::Client;
use std::convert::Infallible;
use std::time::{Duration, Instant};

/// Read-inactivity bound for download bodies
const DOWNLOAD_READ_TIMEOUT: Duration = Duration::from_secs(60);
/// Read-inactivity bound for upload responses
const UPLOAD_READ_TIMEOUT: Duration = Duration::from_secs(120);
/// Per-request bound for latency round trips
const LATENCY_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Browser-like header set sent with every measurement request
///
/// Kept as an immutable value injected into each client rather than
/// process-wide state.
pub fn default_headers() -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(
        "User-Agent",
        HeaderValue::from_static(
            "Mozilla/5.0 (Windows NT 6.1; Win64; x64) AppleWebKit/537.36 \
             (KHTML, like Gecko) Chrome/86.0.4240.198 Safari/537.36 OPR/72.0.3815.459",
        ),
    );
    headers.insert("Accept", HeaderValue::from_static("*/*"));
    headers.insert("Referer", HeaderValue::from_static("https://yandex.ru/internet"));
    headers.insert(
        "sec-ch-ua",
        HeaderValue::from_static(
            "\"Google Chrome\";v=\"143\", \"Chromium\";v=\"143\", \"Not A(Brand\";v=\"24\"",
        ),
    );
    headers.insert("Sec-Fetch-Mode", HeaderValue::from_static("cors"));
    headers.insert("Sec-Fetch-Dest", HeaderValue::from_static("empty"));
    headers.insert("sec-fetch-site", HeaderValue::from_static("cross-site"));
    headers
}

/// HTTP measurement client
///
/// Holds only the immutable header configuration; each measurement call
/// builds an isolated `reqwest::Client` scoped to that call, so concurrent
/// probes never share connection state and every socket is released on every
/// exit path when the client drops.
#[derive(Debug, Clone)]
pub struct MeterClient {
    headers: HeaderMap,
}

impl Default for MeterClient {
    fn default() -> Self {
        Self::new()
    }
}

impl MeterClient {
    /// Create a client with the default header set
    pub fn new() -> Self {
        Self {
            headers: default_headers(),
        }
    }

    /// Create a client with a custom header set
    pub fn with_headers(headers: HeaderMap) -> Self {
        Self { headers }
    }

    fn transfer_client(&self, connect_timeout: Duration, read_timeout: Duration) -> Option<Client> {
        Client::builder()
            .default_headers(self.headers.clone())
            .connect_timeout(connect_timeout)
            .read_timeout(read_timeout)
            .build()
            .ok()
    }

    /// Time a streaming download of `url`
    ///
    /// The timing window opens immediately before the request is issued and
    /// closes after the last body byte is consumed. The body is streamed
    /// chunk by chunk so memory stays bounded regardless of payload size.
    /// Non-2xx status, connect errors and timeouts all yield the sentinel.
    pub async fn measure_download(&self, url: &str, timeout: Duration) -> TransferSample {
        let client = match self.transfer_client(timeout, DOWNLOAD_READ_TIMEOUT) {
            Some(client) => client,
            None => return TransferSample::failed(),
        };

        let start = Instant::now();

        let response = match client.get(url).send().await {
            Ok(response) => response,
            Err(_) => return TransferSample::failed(),
        };
        if !response.status().is_success() {
            return TransferSample::failed();
        }

        let mut total_bytes: u64 = 0;
        let mut body = response.bytes_stream();
        while let Some(chunk) = body.next().await {
            match chunk {
                Ok(chunk) => total_bytes += chunk.len() as u64,
                Err(_) => return TransferSample::failed(),
            }
        }
        let elapsed = start.elapsed().as_secs_f64();

        if total_bytes == 0 {
            // An empty body is indistinguishable from the sentinel
            return TransferSample::failed();
        }
        TransferSample::success(elapsed, total_bytes)
    }

    /// Time a streaming upload of exactly `size` zero-filled bytes to `url`
    ///
    /// The payload is synthesized as a chunk stream and never materialized
    /// whole. The timing window covers connect through full response
    /// consumption. On success the sample reports the declared `size`; the
    /// stream is exact by construction so no recount is needed.
    pub async fn measure_upload(&self, url: &str, size: u64, timeout: Duration) -> TransferSample {
        if size == 0 {
            // A zero-byte payload measures nothing
            return TransferSample::failed();
        }

        let client = match self.transfer_client(timeout, UPLOAD_READ_TIMEOUT) {
            Some(client) => client,
            None => return TransferSample::failed(),
        };

        let start = Instant::now();

        let body = reqwest::Body::wrap_stream(upload_payload(size));
        let response = match client.post(url).body(body).send().await {
            Ok(response) => response,
            Err(_) => return TransferSample::failed(),
        };
        if !response.status().is_success() {
            return TransferSample::failed();
        }
        if response.bytes().await.is_err() {
            return TransferSample::failed();
        }

        TransferSample::success(start.elapsed().as_secs_f64(), size)
    }

    /// Median round-trip latency to `url` in milliseconds
    ///
    /// Performs `attempts` sequential GETs over one reused client, timing
    /// each from request issue to full body consumption. A transport failure
    /// records the fixed penalty instead of being dropped, biasing the median
    /// against unreachable endpoints; non-2xx responses are timed like any
    /// other round trip. Returns `+infinity` when nothing was recorded.
    pub async fn measure_latency(&self, url: &str, timeout: Duration, attempts: u32) -> f64 {
        let connect_timeout = timeout.min(LATENCY_REQUEST_TIMEOUT);
        let client = match Client::builder()
            .default_headers(self.headers.clone())
            .connect_timeout(connect_timeout)
            .timeout(LATENCY_REQUEST_TIMEOUT)
            .build()
        {
            Ok(client) => client,
            Err(_) => return f64::INFINITY,
        };

        let mut times_ms = Vec::with_capacity(attempts as usize);
        for _ in 0..attempts {
            let start = Instant::now();
            match client.get(url).send().await {
                Ok(response) => match response.bytes().await {
                    Ok(_) => times_ms.push(start.elapsed().as_secs_f64() * 1000.0),
                    Err(_) => times_ms.push(defaults::LATENCY_PENALTY_MS),
                },
                Err(_) => times_ms.push(defaults::LATENCY_PENALTY_MS),
            }
            // Brief gap so connection reuse does not skew consecutive attempts
            tokio::time::sleep(defaults::LATENCY_ATTEMPT_GAP).await;
        }

        if times_ms.is_empty() {
            return f64::INFINITY;
        }
        aggregate::median(&times_ms)
    }
}

/// Stream of zero-filled chunks totalling exactly `size` bytes
///
/// `size / 65536` full chunks followed by one `size % 65536` byte tail,
/// omitted when the remainder is zero.
fn upload_payload(
    size: u64,
) -> impl futures::Stream<Item = std::result::Result<Vec<u8>, Infallible>> {
    futures::stream::iter(payload_chunk_lens(size).map(|len| Ok(vec![0u8; len])))
}

/// Chunk lengths making up an upload payload of `size` bytes
fn payload_chunk_lens(size: u64) -> impl Iterator<Item = usize> {
    let chunk = defaults::TRANSFER_CHUNK_SIZE as u64;
    let full_chunks = size / chunk;
    let tail = (size % chunk) as usize;

    (0..full_chunks)
        .map(|_| defaults::TRANSFER_CHUNK_SIZE)
        .chain(std::iter::once(tail).filter(|&len| len > 0))
}
