//! Report generation for mesh topology analysis.
//!
//! Assembles the full report from the windowed observation set and
//! renders it as JSON and human-readable text.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use chrono::NaiveDateTime;
use color_eyre::eyre::{Context, Result};

use super::connectivity::{analyze_centrality, analyze_connectivity};
use super::depth::network_depth;
use super::graph::TopologyGraph;
use super::history::RouteHistory;
use super::roles::classify_nodes;
use super::types::*;
use super::window::filter_routes_by_window;

/// Paths are stored comma-joined; reports display them with arrows.
fn display_path(path: &str) -> String {
    path.split(',').collect::<Vec<_>>().join(" → ")
}

/// Build the complete topology report from validated observations.
///
/// The time window is applied here; only successful probes contribute
/// edges, but every windowed probe (failed included) enters the route
/// history so symmetry classification can distinguish Partial from
/// Failed destinations.
pub fn build_report(
    observations: &[RouteObservation],
    names: &HashMap<String, String>,
    now: NaiveDateTime,
    time_window_hours: i64,
    max_hops: u32,
    routes_rejected: usize,
    churn: Option<ChurnReport>,
) -> TopologyReport {
    let windowed = filter_routes_by_window(observations, now, time_window_hours);

    let mut graph = TopologyGraph::new();
    let mut history = RouteHistory::new();

    for obs in &windowed {
        if obs.success {
            graph.add_route(&obs.hops);
        }
        history.record(obs);
    }

    let nodes = classify_nodes(&graph, names);
    let edges = graph.edge_reports();
    let connectivity = analyze_connectivity(&graph);
    let centrality = analyze_centrality(&graph);
    let network_depth = network_depth(&graph);
    let route_changes = history.detect_changes();
    let asymmetry = history.classify_symmetry();

    TopologyReport {
        metadata: AnalysisMetadata {
            generated_at: now.format("%Y-%m-%dT%H:%M:%S").to_string(),
            routes_analyzed: windowed.len(),
            routes_rejected,
            time_window_hours,
            max_hops,
        },
        nodes,
        edges,
        connectivity,
        centrality,
        network_depth,
        route_changes,
        asymmetry,
        churn,
    }
}

/// Generate JSON report
pub fn generate_json_report(report: &TopologyReport, output_path: &Path) -> Result<()> {
    let json = serde_json::to_string_pretty(report)
        .context("Failed to serialize report to JSON")?;

    fs::write(output_path, json)
        .with_context(|| format!("Failed to write JSON report to {}", output_path.display()))?;

    log::info!("JSON report written to {}", output_path.display());
    Ok(())
}

/// Generate human-readable text report
pub fn generate_text_report(report: &TopologyReport, output_path: &Path) -> Result<()> {
    let mut lines: Vec<String> = Vec::new();

    // Header
    lines.push("=".repeat(80));
    lines.push("                      MESH NETWORK TOPOLOGY ANALYSIS".to_string());
    lines.push("=".repeat(80));
    lines.push(String::new());

    // Metadata
    lines.push(format!("Generated: {}", report.metadata.generated_at));
    lines.push(format!(
        "Time Window: last {} hours",
        report.metadata.time_window_hours
    ));
    lines.push(format!(
        "Routes Analyzed: {} ({} rejected)",
        report.metadata.routes_analyzed, report.metadata.routes_rejected
    ));
    lines.push(String::new());

    // Nodes
    lines.push("=".repeat(80));
    lines.push("                              NODES AND ROLES".to_string());
    lines.push("=".repeat(80));
    lines.push(String::new());

    lines.push(format!("Total nodes: {}", report.nodes.len()));
    for node in &report.nodes {
        lines.push(format!(
            "  {:<6} {} (in: {}, out: {}, total: {})",
            report_role_tag(node),
            node.display_name,
            node.in_degree,
            node.out_degree,
            node.total_degree
        ));
    }
    lines.push(String::new());

    // Edges
    if !report.edges.is_empty() {
        lines.push("Observed links (by probe count):".to_string());
        for edge in report.edges.iter().take(20) {
            lines.push(format!(
                "  {} → {} ({} probes)",
                edge.from, edge.to, edge.weight
            ));
        }
        lines.push(String::new());
    }

    // Connectivity
    lines.push("=".repeat(80));
    lines.push("                         CONNECTIVITY AND REACH".to_string());
    lines.push("=".repeat(80));
    lines.push(String::new());

    lines.push(format!(
        "Connected: {} ({} component{})",
        if report.connectivity.is_connected { "yes" } else { "no" },
        report.connectivity.component_count,
        if report.connectivity.component_count == 1 { "" } else { "s" }
    ));
    lines.push(format!("Diameter: {}", report.connectivity.diameter));
    lines.push(format!(
        "Average path length: {}",
        report.connectivity.avg_path_length
    ));
    lines.push(format!("Network depth: {} hops", report.network_depth));
    match &report.centrality.most_central_node {
        Some(node) => lines.push(format!(
            "Most central node: {} (betweenness {:.3})",
            node, report.centrality.score
        )),
        None => lines.push("Most central node: n/a".to_string()),
    }
    lines.push(String::new());

    // Route changes
    lines.push("=".repeat(80));
    lines.push("                       ROUTE CHANGES AND SYMMETRY".to_string());
    lines.push("=".repeat(80));
    lines.push(String::new());

    if report.route_changes.is_empty() {
        lines.push("No route changes detected within the window.".to_string());
    } else {
        lines.push(format!(
            "{} route change{} detected:",
            report.route_changes.len(),
            if report.route_changes.len() == 1 { "" } else { "s" }
        ));
        for change in &report.route_changes {
            lines.push(format!(
                "  {} ({}) at {}",
                change.destination, change.direction, change.changed_at
            ));
            lines.push(format!("    was: {}", display_path(&change.previous_path)));
            lines.push(format!("    now: {}", display_path(&change.current_path)));
        }
    }
    lines.push(String::new());

    if !report.asymmetry.is_empty() {
        lines.push("Forward/return symmetry:".to_string());
        for (destination, symmetry) in &report.asymmetry {
            lines.push(format!("  {}: {}", destination, symmetry));
        }
        lines.push(String::new());
    }

    // Churn
    if let Some(ref churn) = report.churn {
        lines.push("=".repeat(80));
        lines.push("                             NETWORK ACTIVITY".to_string());
        lines.push("=".repeat(80));
        lines.push(String::new());

        lines.push(format!("Active nodes: {}", churn.stats.total_active_nodes));
        if !churn.new_nodes.is_empty() {
            lines.push(format!("New nodes ({}):", churn.new_nodes.len()));
            for node in &churn.new_nodes {
                lines.push(format!("  {} {}", node.id, node.user));
            }
        }
        if !churn.lost_nodes.is_empty() {
            lines.push(format!("Lost nodes ({}):", churn.lost_nodes.len()));
            for node in &churn.lost_nodes {
                lines.push(format!("  {} {}", node.id, node.user));
            }
        }
        for change in churn
            .name_changes
            .iter()
            .chain(&churn.role_changes)
            .chain(&churn.hardware_changes)
        {
            lines.push(format!(
                "  {} {} changed: {} -> {}",
                change.id, change.field, change.previous, change.current
            ));
        }
        lines.push(String::new());
    }

    // Footer
    lines.push("=".repeat(80));

    let content = lines.join("\n");
    fs::write(output_path, content)
        .with_context(|| format!("Failed to write text report to {}", output_path.display()))?;

    log::info!("Text report written to {}", output_path.display());
    Ok(())
}

fn report_role_tag(node: &NodeReport) -> String {
    format!("[{}]", node.role)
}

/// Print a summary to stdout
pub fn print_summary(report: &TopologyReport) {
    println!("\n=== MESH TOPOLOGY ANALYSIS SUMMARY ===\n");
    println!("Nodes: {}", report.nodes.len());
    println!("Links: {}", report.edges.len());
    println!(
        "Routes analyzed: {} ({} rejected)",
        report.metadata.routes_analyzed, report.metadata.routes_rejected
    );

    println!("\nConnectivity:");
    println!(
        "  Connected: {} ({} components)",
        report.connectivity.is_connected, report.connectivity.component_count
    );
    println!("  Diameter: {}", report.connectivity.diameter);
    println!("  Network depth: {} hops", report.network_depth);
    if let Some(ref node) = report.centrality.most_central_node {
        println!(
            "  Most central: {} ({:.3})",
            node, report.centrality.score
        );
    }

    println!("\nRoute changes: {}", report.route_changes.len());
    let asymmetric = report
        .asymmetry
        .values()
        .filter(|s| **s == RouteSymmetry::Asymmetric)
        .count();
    if asymmetric > 0 {
        println!("Asymmetric destinations: {}", asymmetric);
    }

    if let Some(ref churn) = report.churn {
        println!("\nNetwork activity:");
        println!("  New nodes: {}", churn.stats.new_count);
        println!("  Lost nodes: {}", churn.stats.lost_count);
        println!("  Attribute changes: {}", churn.stats.changed_count);
    }

    println!();
}
