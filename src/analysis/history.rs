//! Route history tracking, change detection, and forward/return
//! symmetry classification.
//!
//! History is keyed by (destination, direction) and rebuilt from the
//! windowed observation set on every run; nothing survives between
//! invocations. Entries for a key are kept timestamp-ascending at all
//! times.

use std::collections::BTreeMap;

use chrono::NaiveDateTime;

use super::types::{ChangeEvent, Direction, RouteObservation, RouteSymmetry};

/// One recorded path for a destination/direction
#[derive(Debug, Clone)]
pub struct HistoryEntry {
    pub timestamp: NaiveDateTime,
    pub hops: Vec<String>,
    pub hop_string: String,
    pub hop_count: u32,
    pub success: bool,
}

/// Time-ordered path history per (destination, direction)
#[derive(Debug, Clone, Default)]
pub struct RouteHistory {
    entries: BTreeMap<(String, Direction), Vec<HistoryEntry>>,
}

/// True when the newest path matches none of the prior paths. Kept as
/// a separate function so the comparison rule (against all priors, not
/// just the immediately preceding one) stays swappable.
fn path_is_novel<'a>(newest: &str, mut priors: impl Iterator<Item = &'a str>) -> bool {
    !priors.any(|prior| prior == newest)
}

/// True when the return path, reversed as a hop list, equals the
/// forward path. This is genuine sequence reversal of the tokens, not
/// a directional-glyph substitution on the display string.
pub fn paths_symmetric(forward: &[String], ret: &[String]) -> bool {
    forward.len() == ret.len() && forward.iter().eq(ret.iter().rev())
}

impl RouteHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one observation, inserting in timestamp order.
    pub fn record(&mut self, obs: &RouteObservation) {
        let entry = HistoryEntry {
            timestamp: obs.timestamp,
            hops: obs.hops.clone(),
            hop_string: obs.hop_string(),
            hop_count: obs.hop_count,
            success: obs.success,
        };

        let entries = self
            .entries
            .entry((obs.destination.clone(), obs.direction))
            .or_default();
        let pos = entries.partition_point(|e| e.timestamp <= entry.timestamp);
        entries.insert(pos, entry);
    }

    pub fn entries(&self, destination: &str, direction: Direction) -> Option<&[HistoryEntry]> {
        self.entries
            .get(&(destination.to_string(), direction))
            .map(Vec::as_slice)
    }

    /// Detect route changes: for each key with at least two entries,
    /// compare the newest path against every prior path; if it matches
    /// none of them, emit a change event whose `previous_path` is the
    /// immediately prior entry's path.
    pub fn detect_changes(&self) -> Vec<ChangeEvent> {
        let mut changes = Vec::new();

        for ((destination, direction), entries) in &self.entries {
            if entries.len() < 2 {
                continue;
            }

            let (priors, newest) = entries.split_at(entries.len() - 1);
            let newest = &newest[0];

            if path_is_novel(&newest.hop_string, priors.iter().map(|e| e.hop_string.as_str())) {
                changes.push(ChangeEvent {
                    destination: destination.clone(),
                    direction: *direction,
                    current_path: newest.hop_string.clone(),
                    previous_path: priors[priors.len() - 1].hop_string.clone(),
                    changed_at: newest.timestamp,
                });
            }
        }

        changes
    }

    /// Classify each destination's forward/return relationship from the
    /// latest successful observation per direction. Re-evaluated from
    /// the full windowed history on every run.
    pub fn classify_symmetry(&self) -> BTreeMap<String, RouteSymmetry> {
        let mut result = BTreeMap::new();

        for (destination, _) in self.entries.keys() {
            if result.contains_key(destination) {
                continue;
            }
            let forward = self.latest_successful(destination, Direction::Forward);
            let ret = self.latest_successful(destination, Direction::Return);

            let symmetry = match (forward, ret) {
                (Some(f), Some(r)) => {
                    if paths_symmetric(&f.hops, &r.hops) {
                        RouteSymmetry::Symmetric
                    } else {
                        RouteSymmetry::Asymmetric
                    }
                }
                (Some(_), None) | (None, Some(_)) => RouteSymmetry::Partial,
                (None, None) => RouteSymmetry::Failed,
            };

            result.insert(destination.clone(), symmetry);
        }

        result
    }

    fn latest_successful(&self, destination: &str, direction: Direction) -> Option<&HistoryEntry> {
        self.entries(destination, direction)
            .and_then(|entries| entries.iter().rev().find(|e| e.success))
    }
}
