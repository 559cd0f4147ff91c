//! CSV ingestion for traceroute and node attribute logs.
//!
//! Each file is read to EOF exactly once per run, so a collector
//! appending to the same file mid-run cannot inject rows into an
//! analysis already underway. A missing input source degrades to an
//! empty set with a warning; only row-level problems are skipped.

use std::collections::HashMap;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use std::sync::LazyLock;

use chrono::{Duration, NaiveDateTime};
use color_eyre::eyre::{Context, Result};
use regex::Regex;

use super::route_parser::parse_timestamp;
use super::types::{NodeRecord, RawRouteRecord};

/// Match relative durations like "2 hours ago" in the Since column
static SINCE_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\d+)\s*(second|minute|hour|day)s?(\s+ago)?$").expect("Invalid since regex")
});

/// Split one CSV line into fields, honoring double-quoted fields and
/// doubled quote escapes. The hop list is comma-delimited inside a
/// quoted field, so a plain split would shred it.
pub fn split_csv_line(line: &str) -> Vec<String> {
    let mut fields = Vec::new();
    let mut field = String::new();
    let mut in_quotes = false;
    let mut chars = line.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '"' if in_quotes => {
                if chars.peek() == Some(&'"') {
                    chars.next();
                    field.push('"');
                } else {
                    in_quotes = false;
                }
            }
            '"' if field.is_empty() => in_quotes = true,
            ',' if !in_quotes => fields.push(std::mem::take(&mut field)),
            _ => field.push(c),
        }
    }
    fields.push(field);
    fields
}

/// Column name -> index map from a header line, lowercased.
fn header_index(line: &str) -> HashMap<String, usize> {
    split_csv_line(line)
        .iter()
        .enumerate()
        .map(|(i, name)| (name.trim().to_ascii_lowercase(), i))
        .collect()
}

fn field(fields: &[String], idx: Option<&usize>) -> String {
    idx.and_then(|&i| fields.get(i))
        .map(|s| s.trim().to_string())
        .unwrap_or_default()
}

/// Load raw traceroute rows. Column order is taken from the header;
/// the legacy column names `target`/`hops` are accepted as aliases for
/// `destination`/`route_hops`.
pub fn load_route_records(path: &Path) -> Result<Vec<RawRouteRecord>> {
    if !path.exists() {
        log::warn!("Traceroute log not found: {}", path.display());
        return Ok(Vec::new());
    }

    let file = File::open(path)
        .with_context(|| format!("Failed to open traceroute log: {}", path.display()))?;
    let mut lines = BufReader::new(file).lines();

    let header = match lines.next() {
        Some(line) => header_index(&line.context("Failed to read traceroute header")?),
        None => return Ok(Vec::new()),
    };

    let ts_idx = header.get("timestamp");
    let dest_idx = header.get("destination").or_else(|| header.get("target"));
    let hops_idx = header.get("route_hops").or_else(|| header.get("hops"));
    if ts_idx.is_none() || dest_idx.is_none() || hops_idx.is_none() {
        log::warn!(
            "Traceroute log {} is missing required columns; treating as empty",
            path.display()
        );
        return Ok(Vec::new());
    }

    let mut records = Vec::new();
    let mut skipped = 0usize;

    for line in lines {
        let line = match line {
            Ok(l) => l,
            Err(_) => {
                skipped += 1;
                continue;
            }
        };
        if line.trim().is_empty() {
            continue;
        }

        let fields = split_csv_line(&line);
        if fields.len() < header.len() {
            skipped += 1;
            continue;
        }

        records.push(RawRouteRecord {
            timestamp: field(&fields, ts_idx),
            destination: field(&fields, dest_idx),
            source: field(&fields, header.get("source")),
            direction: field(&fields, header.get("direction")),
            route_hops: field(&fields, hops_idx),
            signal_strengths: field(&fields, header.get("signal_strengths")),
            hop_count: field(&fields, header.get("hop_count")),
            success: field(&fields, header.get("success")),
        });
    }

    if skipped > 0 {
        log::warn!("Skipped {} malformed traceroute rows", skipped);
    }
    log::info!(
        "Loaded {} traceroute rows from {}",
        records.len(),
        path.display()
    );

    Ok(records)
}

/// Parse a relative "Since" duration ("45 minutes ago") into an
/// absolute time against the batch's single "now".
pub fn parse_since_duration(raw: &str, now: NaiveDateTime) -> Option<NaiveDateTime> {
    let caps = SINCE_PATTERN.captures(raw.trim())?;
    let value: i64 = caps.get(1)?.as_str().parse().ok()?;
    let duration = match caps.get(2)?.as_str() {
        "second" => Duration::seconds(value),
        "minute" => Duration::minutes(value),
        "hour" => Duration::hours(value),
        "day" => Duration::days(value),
        _ => return None,
    };
    Some(now - duration)
}

/// Load node attribute rows. A row's timestamp is its LastHeard if
/// parseable, else its Since duration relative to `now`, else None
/// (treated as observed now by the window filter).
pub fn load_node_records(path: &Path, now: NaiveDateTime) -> Result<Vec<NodeRecord>> {
    if !path.exists() {
        log::warn!("Nodes log not found: {}", path.display());
        return Ok(Vec::new());
    }

    let file = File::open(path)
        .with_context(|| format!("Failed to open nodes log: {}", path.display()))?;
    let mut lines = BufReader::new(file).lines();

    let header = match lines.next() {
        Some(line) => header_index(&line.context("Failed to read nodes header")?),
        None => return Ok(Vec::new()),
    };

    if !header.contains_key("id") {
        log::warn!(
            "Nodes log {} has no ID column; treating as empty",
            path.display()
        );
        return Ok(Vec::new());
    }

    let mut records = Vec::new();

    for line in lines {
        let line = match line {
            Ok(l) => l,
            Err(_) => continue,
        };
        if line.trim().is_empty() {
            continue;
        }

        let fields = split_csv_line(&line);
        let id = field(&fields, header.get("id"));
        if id.is_empty() {
            continue;
        }

        let last_heard = field(&fields, header.get("lastheard"));
        let since = field(&fields, header.get("since"));
        let timestamp =
            parse_timestamp(&last_heard).or_else(|| parse_since_duration(&since, now));

        records.push(NodeRecord {
            id,
            user: field(&fields, header.get("user")),
            aka: field(&fields, header.get("aka")),
            hardware: field(&fields, header.get("hardware")),
            role: field(&fields, header.get("role")),
            hops: field(&fields, header.get("hops")).parse().unwrap_or(0),
            channel: field(&fields, header.get("channel")).parse().unwrap_or(0),
            timestamp,
            last_heard,
            since,
            battery: field(&fields, header.get("battery")),
        });
    }

    log::info!("Loaded {} node rows from {}", records.len(), path.display());
    Ok(records)
}

/// Node ID -> friendly name map: AKA when present and not "N/A",
/// else User. Nodes with neither are left out; display falls back to
/// the raw ID.
pub fn node_name_map(nodes: &[NodeRecord]) -> HashMap<String, String> {
    let mut names = HashMap::new();
    for node in nodes {
        let usable = |s: &str| !s.is_empty() && !s.eq_ignore_ascii_case("n/a");
        let name = if usable(&node.aka) {
            node.aka.clone()
        } else if usable(&node.user) {
            node.user.clone()
        } else {
            continue;
        };
        names.insert(node.id.clone(), name);
    }
    names
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_split_csv_line_quoted_commas() {
        let fields = split_csv_line(r#"2025-06-01T10:00:00,!d,forward,"!a,!b,!c",true"#);
        assert_eq!(fields.len(), 5);
        assert_eq!(fields[3], "!a,!b,!c");
    }

    #[test]
    fn test_split_csv_line_escaped_quotes() {
        let fields = split_csv_line(r#"a,"say ""hi""",c"#);
        assert_eq!(fields, vec!["a", r#"say "hi""#, "c"]);
    }

    #[test]
    fn test_load_route_records_roundtrip() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(
            file,
            "timestamp,destination,source,direction,route_hops,signal_strengths,hop_count,success"
        )
        .unwrap();
        writeln!(
            file,
            r#"2025-06-01T10:00:00,!d,!s,forward,"!a,!b,!d",-80dBm,2,true"#
        )
        .unwrap();
        writeln!(file, "not,enough").unwrap();

        let records = load_route_records(file.path()).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].route_hops, "!a,!b,!d");
        assert_eq!(records[0].success, "true");
    }

    #[test]
    fn test_missing_file_is_empty_not_error() {
        let records = load_route_records(Path::new("/nonexistent/traceroute.csv")).unwrap();
        assert!(records.is_empty());
    }

    #[test]
    fn test_parse_since_duration() {
        let now = NaiveDateTime::parse_from_str("2025-06-01T12:00:00", "%Y-%m-%dT%H:%M:%S")
            .unwrap();
        let two_hours = parse_since_duration("2 hours ago", now).unwrap();
        assert_eq!(now - two_hours, Duration::hours(2));

        assert!(parse_since_duration("yesterday", now).is_none());
        assert!(parse_since_duration("", now).is_none());
    }

    #[test]
    fn test_load_node_records_and_names() {
        let now = NaiveDateTime::parse_from_str("2025-06-01T12:00:00", "%Y-%m-%dT%H:%M:%S")
            .unwrap();
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "User,ID,AKA,Hardware,Role,Hops,Channel,LastHeard,Since").unwrap();
        writeln!(
            file,
            "Alpha Node,!aaaa0001,ALFA,TBEAM,CLIENT,1,0,2025-06-01 11:30:00,"
        )
        .unwrap();
        writeln!(file, "Beta Node,!bbbb0002,N/A,HELTEC,ROUTER,2,0,,30 minutes ago").unwrap();
        writeln!(file, ",!cccc0003,N/A,,,0,0,,").unwrap();

        let nodes = load_node_records(file.path(), now).unwrap();
        assert_eq!(nodes.len(), 3);
        assert!(nodes[0].timestamp.is_some());
        assert_eq!(
            now - nodes[1].timestamp.unwrap(),
            Duration::minutes(30)
        );
        assert!(nodes[2].timestamp.is_none());

        let names = node_name_map(&nodes);
        assert_eq!(names["!aaaa0001"], "ALFA");
        assert_eq!(names["!bbbb0002"], "Beta Node");
        assert!(!names.contains_key("!cccc0003"));
    }
}
