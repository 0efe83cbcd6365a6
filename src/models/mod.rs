//! Data models for probes, samples and results

pub mod catalog;
pub mod result;

pub use catalog::{Probe, ProbeCatalog, ProbeGroup};
pub use result::{RoundResult, SpeedResult, TransferSample};
