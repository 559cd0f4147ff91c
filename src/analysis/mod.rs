//! Traceroute topology analysis for Meshtastic-style mesh networks.
//!
//! This module provides tools for building a directed topology graph
//! from traceroute logs, classifying node roles, measuring connectivity
//! and centrality, and tracking route changes over time.

pub mod types;
pub mod ingest;
pub mod route_parser;
pub mod window;
pub mod graph;
pub mod roles;
pub mod connectivity;
pub mod depth;
pub mod history;
pub mod churn;
pub mod report;

pub use types::*;
pub use ingest::{load_node_records, load_route_records, node_name_map};
pub use route_parser::parse_route_record;
pub use window::{filter_nodes_by_window, filter_routes_by_window};
pub use graph::TopologyGraph;
pub use history::RouteHistory;
pub use churn::{analyze_churn, build_snapshot};
pub use report::{build_report, generate_json_report, generate_text_report, print_summary};
