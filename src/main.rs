use clap::Parser;
use color_eyre::eyre::WrapErr;
use color_eyre::Result;
use env_logger::Env;
use log::{debug, info, warn};
use std::fs;
use std::path::PathBuf;

use meshtrace::analysis::{
    analyze_churn, build_report, build_snapshot, filter_nodes_by_window, generate_json_report,
    generate_text_report, load_node_records, load_route_records, node_name_map,
    parse_route_record, print_summary, RouteObservation, Snapshot,
};
use meshtrace::config::AnalyzerConfig;

/// Topology and route-stability analyzer for mesh radio traceroute logs
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the traceroute CSV log
    #[arg(long, default_value = "traceroute_log.csv")]
    traceroute_csv: PathBuf,

    /// Path to the node attribute CSV log
    #[arg(long, default_value = "nodes_log.csv")]
    nodes_csv: PathBuf,

    /// Path to the analyzer configuration YAML file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Output directory for generated reports
    #[arg(short, long, default_value = "analysis_output")]
    output: PathBuf,

    /// Override the configured time window (hours)
    #[arg(long)]
    hours: Option<i64>,

    /// Override the configured maximum hop distance for active nodes
    #[arg(long)]
    max_hops: Option<u32>,

    /// Where the node snapshot for churn comparison is persisted
    #[arg(long, default_value = "network_state.json")]
    state_file: PathBuf,

    /// Skip churn analysis and snapshot persistence
    #[arg(long)]
    no_churn: bool,

    /// Log level filter (error, warn, info, debug, trace)
    #[arg(long, default_value = "info")]
    log_level: String,
}

fn load_snapshot(path: &std::path::Path) -> Snapshot {
    match fs::read_to_string(path) {
        Ok(content) => match serde_json::from_str(&content) {
            Ok(snapshot) => snapshot,
            Err(e) => {
                warn!("Ignoring unreadable snapshot {}: {}", path.display(), e);
                Snapshot::new()
            }
        },
        Err(_) => {
            info!("No prior snapshot at {}, treating all nodes as new", path.display());
            Snapshot::new()
        }
    }
}

fn main() -> Result<()> {
    color_eyre::install()?;

    let args = Args::parse();

    env_logger::Builder::from_env(Env::default().default_filter_or(args.log_level.as_str()))
        .init();

    info!("Starting mesh topology analysis");
    info!("Traceroute log: {:?}", args.traceroute_csv);
    info!("Nodes log: {:?}", args.nodes_csv);

    let mut config = match &args.config {
        Some(path) => AnalyzerConfig::load(path)
            .wrap_err_with(|| format!("Failed to load config from {}", path.display()))?,
        None => AnalyzerConfig::default(),
    };
    if let Some(hours) = args.hours {
        config.time_window_hours = hours;
    }
    if let Some(max_hops) = args.max_hops {
        config.max_hops = max_hops;
    }
    config.validate()?;
    info!(
        "Window: {}h, max hops: {}, excluded nodes: {}",
        config.time_window_hours,
        config.max_hops,
        config.excluded_nodes.join(", ")
    );

    // One clock reading for the whole run; every window decision and
    // the persisted snapshot use it.
    let now = chrono::Local::now().naive_local();

    let raw_records = load_route_records(&args.traceroute_csv)?;
    let excluded = config.excluded_set();

    let mut observations: Vec<RouteObservation> = Vec::with_capacity(raw_records.len());
    let mut rejected = 0usize;
    for raw in &raw_records {
        match parse_route_record(raw, &excluded) {
            Ok(obs) => observations.push(obs),
            Err(reason) => {
                debug!("Rejected route record for {:?}: {}", raw.destination, reason);
                rejected += 1;
            }
        }
    }
    info!(
        "Validated {} route observations ({} rejected)",
        observations.len(),
        rejected
    );

    let node_records = load_node_records(&args.nodes_csv, now)?;
    let active_nodes =
        filter_nodes_by_window(&node_records, now, config.time_window_hours, config.max_hops);
    let names = node_name_map(&node_records);
    info!(
        "{} of {} known nodes are active within the window",
        active_nodes.len(),
        node_records.len()
    );

    let churn = if args.no_churn {
        None
    } else {
        let previous = load_snapshot(&args.state_file);
        let report = analyze_churn(&active_nodes, &previous);

        let snapshot = build_snapshot(&active_nodes);
        let json = serde_json::to_string_pretty(&snapshot)
            .wrap_err("Failed to serialize node snapshot")?;
        fs::write(&args.state_file, json).wrap_err_with(|| {
            format!("Failed to write snapshot to {}", args.state_file.display())
        })?;

        Some(report)
    };

    let report = build_report(
        &observations,
        &names,
        now,
        config.time_window_hours,
        config.max_hops,
        rejected,
        churn,
    );

    fs::create_dir_all(&args.output).wrap_err_with(|| {
        format!("Failed to create output directory '{}'", args.output.display())
    })?;

    generate_json_report(&report, &args.output.join("topology_report.json"))?;
    generate_text_report(&report, &args.output.join("topology_report.txt"))?;

    print_summary(&report);

    info!("Analysis completed successfully");
    Ok(())
}
