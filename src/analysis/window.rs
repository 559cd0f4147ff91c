//! Time and hop windowing for the analysis batch.
//!
//! Two distinct filter profiles exist and must not be merged:
//!
//! - the **route profile** applies only the recency cutoff, so long
//!   routes still contribute to the topology picture;
//! - the **node profile** applies the recency cutoff AND the hop cap,
//!   and is used for node churn analysis.

use chrono::{Duration, NaiveDateTime};

use super::types::{NodeRecord, RouteObservation};

/// Filter route observations to the recency window. Hop counts are
/// deliberately not consulted here.
pub fn filter_routes_by_window<'a>(
    observations: &'a [RouteObservation],
    now: NaiveDateTime,
    window_hours: i64,
) -> Vec<&'a RouteObservation> {
    let cutoff = now - Duration::hours(window_hours);
    observations
        .iter()
        .filter(|obs| obs.timestamp >= cutoff)
        .collect()
}

/// Filter node attribute records to the recency window and hop cap.
/// Records without a timestamp are treated as observed "now" and are
/// never recency-filtered; this default is deliberate.
pub fn filter_nodes_by_window<'a>(
    nodes: &'a [NodeRecord],
    now: NaiveDateTime,
    window_hours: i64,
    max_hops: u32,
) -> Vec<&'a NodeRecord> {
    let cutoff = now - Duration::hours(window_hours);
    nodes
        .iter()
        .filter(|node| match node.timestamp {
            Some(ts) => ts >= cutoff,
            None => true,
        })
        .filter(|node| node.hops <= max_hops)
        .collect()
}
