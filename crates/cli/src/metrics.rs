//! Prometheus text exposition of the core metrics.

use anyhow::Result;
use prometheus::{Encoder, Registry, TextEncoder};
use std::path::Path;

/// Encode all core metrics as Prometheus text format.
pub fn encode_metrics() -> Result<String> {
    let registry = Registry::new();
    for metric in audiobatch_core::metrics::all_metrics() {
        registry.register(metric)?;
    }

    let encoder = TextEncoder::new();
    let mut buffer = Vec::new();
    encoder.encode(&registry.gather(), &mut buffer)?;
    Ok(String::from_utf8(buffer)?)
}

pub fn write_metrics(path: &Path) -> Result<()> {
    std::fs::write(path, encode_metrics()?)?;
    Ok(())
}
