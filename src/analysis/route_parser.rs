//! Route record parsing and validation.
//!
//! Turns one raw traceroute row into a validated [`RouteObservation`]
//! or a typed rejection. Parsing is pure: the only inputs are the raw
//! record and the configured exclusion set, and a rejected record never
//! aborts the batch.

use std::collections::HashSet;

use chrono::{DateTime, NaiveDateTime};

use super::types::*;

/// Hop-field values that mark a failed probe rather than a path.
/// Records carrying one of these contribute no edges and no history.
pub const SENTINEL_VALUES: [&str; 4] = ["NO_ROUTE", "TIMEOUT", "ERROR", "PARSE_ERROR"];

/// Parse an ISO-8601 timestamp tolerantly, normalizing to a naive
/// datetime. A trailing `Z` or an explicit offset is accepted; the
/// offset is dropped after parsing so all comparisons within a batch
/// are against the same naive clock.
pub fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    // Offset-aware forms first ("...Z", "...+02:00")
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.naive_local());
    }

    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(dt);
        }
    }

    None
}

/// Split a hop field into trimmed NodeIDs. Commas are the storage
/// delimiter; arrow glyphs appear in display-formatted fields and are
/// accepted too. Empty tokens are dropped.
pub fn tokenize_hops(raw: &str) -> Vec<String> {
    raw.replace("->", ",")
        .replace('→', ",")
        .split(',')
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect()
}

fn is_sentinel(value: &str) -> bool {
    value.is_empty() || SENTINEL_VALUES.contains(&value)
}

/// Validate one raw record against the exclusion set.
///
/// Rejection never aborts the batch; callers skip the record and
/// continue. An excluded node anywhere in the record (destination,
/// source, or hop chain) drops the whole observation.
pub fn parse_route_record(
    row: &RawRouteRecord,
    excluded: &HashSet<String>,
) -> Result<RouteObservation, RejectReason> {
    let destination = row.destination.trim().to_string();
    let source = row.source.trim();
    if excluded.contains(&destination) || excluded.contains(source) {
        return Err(RejectReason::ExcludedNode);
    }

    let direction: Direction = row.direction.parse()?;

    let hop_field = row.route_hops.trim();
    if is_sentinel(hop_field) {
        return Err(RejectReason::SentinelValue);
    }

    let hops = tokenize_hops(hop_field);
    if hops.iter().any(|h| is_sentinel(h)) {
        return Err(RejectReason::SentinelValue);
    }
    if hops.iter().any(|h| excluded.contains(h)) {
        return Err(RejectReason::ExcludedNode);
    }

    let timestamp = parse_timestamp(&row.timestamp).ok_or(RejectReason::MalformedTimestamp)?;

    let hop_count = if row.hop_count.trim().is_empty() {
        0
    } else {
        row.hop_count
            .trim()
            .parse::<u32>()
            .map_err(|_| RejectReason::InvalidHopField)?
    };

    let signal = row.signal_strengths.trim();
    let signal_annotations = if signal.is_empty() {
        None
    } else {
        Some(signal.to_string())
    };

    Ok(RouteObservation {
        destination,
        direction,
        hops,
        timestamp,
        success: row.success.trim() == "true",
        hop_count,
        signal_annotations,
    })
}
