//! End-to-end pipeline tests: CSV fixtures through parsing, windowing,
//! graph construction, and report rendering.

use std::collections::HashMap;
use std::fs;
use std::io::Write;

use chrono::NaiveDateTime;
use tempfile::{tempdir, NamedTempFile};

use meshtrace::analysis::{
    analyze_churn, build_report, build_snapshot, filter_nodes_by_window, generate_json_report,
    generate_text_report, load_node_records, load_route_records, node_name_map,
    parse_route_record, RouteObservation, RouteSymmetry, Snapshot, TopologyReport,
};
use meshtrace::config::AnalyzerConfig;

fn ts(s: &str) -> NaiveDateTime {
    NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S").unwrap()
}

const TRACEROUTE_HEADER: &str =
    "timestamp,destination,source,direction,route_hops,signal_strengths,hop_count,success";

fn parse_all(path: &std::path::Path, config: &AnalyzerConfig) -> (Vec<RouteObservation>, usize) {
    let raw = load_route_records(path).unwrap();
    let excluded = config.excluded_set();
    let mut observations = Vec::new();
    let mut rejected = 0;
    for row in &raw {
        match parse_route_record(row, &excluded) {
            Ok(obs) => observations.push(obs),
            Err(_) => rejected += 1,
        }
    }
    (observations, rejected)
}

#[test]
fn full_pipeline_from_csv_to_report() {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "{}", TRACEROUTE_HEADER).unwrap();
    // A stable route probed twice, then a path change
    writeln!(file, r#"2025-06-01T08:00:00,!c,!a,forward,"!a,!b,!c",,2,true"#).unwrap();
    writeln!(file, r#"2025-06-01T09:00:00,!c,!a,forward,"!a,!b,!c",,2,true"#).unwrap();
    writeln!(file, r#"2025-06-01T10:00:00,!c,!a,forward,"!a,!d,!c",,2,true"#).unwrap();
    // Symmetric return for the original path
    writeln!(file, r#"2025-06-01T08:01:00,!c,!a,return,"!c,!b,!a",,2,true"#).unwrap();
    // Sentinel and excluded rows must be rejected
    writeln!(file, r#"2025-06-01T10:30:00,!c,!a,forward,NO_ROUTE,,0,false"#).unwrap();
    writeln!(file, r#"2025-06-01T10:31:00,!ab123456,!a,forward,"!a,!b",,1,true"#).unwrap();
    // Stale row, outside the window
    writeln!(file, r#"2025-05-01T10:00:00,!c,!a,forward,"!a,!z,!c",,2,true"#).unwrap();

    let config = AnalyzerConfig::default();
    let (observations, rejected) = parse_all(file.path(), &config);
    assert_eq!(observations.len(), 5);
    assert_eq!(rejected, 2);

    let now = ts("2025-06-01T12:00:00");
    let report = build_report(
        &observations,
        &HashMap::new(),
        now,
        config.time_window_hours,
        config.max_hops,
        rejected,
        None,
    );

    // Stale !z row was windowed out
    assert_eq!(report.metadata.routes_analyzed, 4);
    let ids: Vec<&str> = report.nodes.iter().map(|n| n.id.as_str()).collect();
    assert!(!ids.contains(&"!z"));

    // !b: in from !a and !c, out to !c and !a -> total degree 4, hub
    let b = report.nodes.iter().find(|n| n.id == "!b").unwrap();
    assert_eq!(b.total_degree, 4);
    assert_eq!(b.role.to_string(), "HUB");

    // The repeated !a->!b link carries weight 2
    let ab = report
        .edges
        .iter()
        .find(|e| e.from == "!a" && e.to == "!b")
        .unwrap();
    assert_eq!(ab.weight, 2);

    // Newest forward path differs from both priors
    assert_eq!(report.route_changes.len(), 1);
    assert_eq!(report.route_changes[0].previous_path, "!a,!b,!c");
    assert_eq!(report.route_changes[0].current_path, "!a,!d,!c");
    assert_eq!(report.route_changes[0].changed_at, ts("2025-06-01T10:00:00"));

    // Latest forward is !a,!d,!c but return still reverses !a,!b,!c
    assert_eq!(report.asymmetry["!c"], RouteSymmetry::Asymmetric);
}

#[test]
fn report_files_round_trip() {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "{}", TRACEROUTE_HEADER).unwrap();
    writeln!(file, r#"2025-06-01T08:00:00,!c,!a,forward,"!a,!b,!c",,2,true"#).unwrap();
    writeln!(file, r#"2025-06-01T08:01:00,!c,!a,return,"!c,!b,!a",,2,true"#).unwrap();

    let config = AnalyzerConfig::default();
    let (observations, rejected) = parse_all(file.path(), &config);
    let report = build_report(
        &observations,
        &HashMap::new(),
        ts("2025-06-01T12:00:00"),
        config.time_window_hours,
        config.max_hops,
        rejected,
        None,
    );

    let dir = tempdir().unwrap();
    let json_path = dir.path().join("topology_report.json");
    let text_path = dir.path().join("topology_report.txt");
    generate_json_report(&report, &json_path).unwrap();
    generate_text_report(&report, &text_path).unwrap();

    let parsed: TopologyReport =
        serde_json::from_str(&fs::read_to_string(&json_path).unwrap()).unwrap();
    assert_eq!(parsed.nodes.len(), 3);
    assert_eq!(parsed.edges.len(), 4);
    assert!(parsed.connectivity.is_connected);
    assert_eq!(parsed.network_depth, 2);
    assert_eq!(parsed.asymmetry["!c"], RouteSymmetry::Symmetric);
    assert!(parsed.churn.is_none());

    let text = fs::read_to_string(&text_path).unwrap();
    assert!(text.contains("MESH NETWORK TOPOLOGY ANALYSIS"));
    assert!(text.contains("Symmetric"));
}

#[test]
fn node_churn_across_runs() {
    let now = ts("2025-06-01T12:00:00");

    let mut first = NamedTempFile::new().unwrap();
    writeln!(first, "User,ID,AKA,Hardware,Role,Hops,Channel,LastHeard,Since").unwrap();
    writeln!(first, "Alpha,!a,ALFA,TBEAM,CLIENT,1,0,2025-06-01 11:00:00,").unwrap();
    writeln!(first, "Beta,!b,,HELTEC,ROUTER,2,0,2025-06-01 11:30:00,").unwrap();

    let nodes = load_node_records(first.path(), now).unwrap();
    let active = filter_nodes_by_window(&nodes, now, 24, 2);
    assert_eq!(active.len(), 2);

    let first_churn = analyze_churn(&active, &Snapshot::new());
    assert_eq!(first_churn.stats.new_count, 2);

    let snapshot = build_snapshot(&active);

    // Second run: !b gone, !a changed role, !c arrived
    let mut second = NamedTempFile::new().unwrap();
    writeln!(second, "User,ID,AKA,Hardware,Role,Hops,Channel,LastHeard,Since").unwrap();
    writeln!(second, "Alpha,!a,ALFA,TBEAM,ROUTER,1,0,2025-06-01 13:00:00,").unwrap();
    writeln!(second, "Gamma,!c,,RAK4631,CLIENT,2,0,,30 minutes ago").unwrap();

    let later = ts("2025-06-01T14:00:00");
    let nodes = load_node_records(second.path(), later).unwrap();
    let active = filter_nodes_by_window(&nodes, later, 24, 2);

    let churn = analyze_churn(&active, &snapshot);
    assert_eq!(churn.stats.new_count, 1);
    assert_eq!(churn.new_nodes[0].id, "!c");
    assert_eq!(churn.stats.lost_count, 1);
    assert_eq!(churn.lost_nodes[0].id, "!b");
    assert_eq!(churn.role_changes.len(), 1);
    assert_eq!(churn.role_changes[0].previous, "CLIENT");

    // Names survive into display labels
    let names = node_name_map(&nodes);
    assert_eq!(names["!a"], "ALFA");
    assert_eq!(names["!c"], "Gamma");
}

#[test]
fn disconnected_topology_reports_sentinels() {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "{}", TRACEROUTE_HEADER).unwrap();
    writeln!(file, r#"2025-06-01T08:00:00,!b,!a,forward,"!a,!b",,1,true"#).unwrap();
    writeln!(file, r#"2025-06-01T09:00:00,!d,!c,forward,"!c,!d",,1,true"#).unwrap();

    let config = AnalyzerConfig::default();
    let (observations, rejected) = parse_all(file.path(), &config);
    let report = build_report(
        &observations,
        &HashMap::new(),
        ts("2025-06-01T12:00:00"),
        config.time_window_hours,
        config.max_hops,
        rejected,
        None,
    );

    assert!(!report.connectivity.is_connected);
    assert_eq!(report.connectivity.component_count, 2);

    let json = serde_json::to_string(&report).unwrap();
    assert!(json.contains(r#""diameter":"Disconnected""#));
    assert!(json.contains(r#""avg_path_length":"Disconnected""#));
}
