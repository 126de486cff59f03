//! Prometheus metrics for the Launchpad services.
//!
//! This module provides:
//! - Cache lookup metrics (hit/miss per cache)
//! - Seat traffic metrics (seats taken and released)
//!
//! All recorders go through the `metrics` facade and are fire-and-forget:
//! without an installed recorder they are no-ops.

use metrics::counter;
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use std::sync::OnceLock;

use crate::cache::CacheKind;

/// Global Prometheus handle for rendering metrics.
static PROMETHEUS_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

/// Metric names as constants for consistency.
pub mod names {
    // Cache metrics
    pub const CACHE_LOOKUPS_TOTAL: &str = "cache_lookups_total";

    // Seat metrics
    pub const SEAT_TRAFFIC_TOTAL: &str = "seat_traffic_total";
}

/// Outcome label of a cache lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LookupOutcome {
    Hit,
    Miss,
}

impl LookupOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            LookupOutcome::Hit => "hit",
            LookupOutcome::Miss => "miss",
        }
    }
}

/// Direction label of a seat transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeatTraffic {
    /// An empty seat became occupied.
    In,
    /// An occupied seat became empty.
    Out,
}

impl SeatTraffic {
    pub fn as_str(&self) -> &'static str {
        match self {
            SeatTraffic::In => "in",
            SeatTraffic::Out => "out",
        }
    }
}

/// Initialize the Prometheus metrics exporter.
///
/// This should be called once at startup.
/// Returns `true` if initialization succeeded, `false` if already initialized.
pub fn init_metrics() -> bool {
    if PROMETHEUS_HANDLE.get().is_some() {
        tracing::debug!("Prometheus metrics already initialized");
        return false;
    }

    match PrometheusBuilder::new().install_recorder() {
        Ok(handle) => {
            if PROMETHEUS_HANDLE.set(handle).is_err() {
                tracing::warn!("Failed to store Prometheus handle (already set)");
                return false;
            }

            tracing::info!("Prometheus metrics initialized");
            true
        }
        Err(e) => {
            tracing::error!(error = %e, "Failed to install Prometheus recorder");
            false
        }
    }
}

/// Render all metrics in Prometheus text format.
///
/// Returns `None` if metrics were not initialized.
pub fn render_metrics() -> Option<String> {
    PROMETHEUS_HANDLE.get().map(|handle| handle.render())
}

/// Record the outcome of a cache lookup.
pub fn record_cache_lookup(cache: CacheKind, outcome: LookupOutcome) {
    counter!(
        names::CACHE_LOOKUPS_TOTAL,
        "cache" => cache.as_str(),
        "outcome" => outcome.as_str()
    )
    .increment(1);
}

/// Record a seat occupancy transition.
pub fn record_seat_traffic(direction: SeatTraffic) {
    counter!(names::SEAT_TRAFFIC_TOTAL, "direction" => direction.as_str()).increment(1);
}
