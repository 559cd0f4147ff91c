//! # Meshtrace - Traceroute topology analysis for mesh radio networks
//!
//! This library builds a directed topology picture of a Meshtastic-style
//! mesh from periodically collected traceroute logs and reports on its
//! structure and stability.
//!
//! ## Overview
//!
//! A logger node probes its neighborhood with traceroutes and appends
//! the observed forward and return paths to a CSV log. Meshtrace parses
//! those logs, keeps the observations inside a recency window, and
//! derives:
//!
//! - **Topology**: directed edges between consecutive hops, weighted by
//!   how often each link was observed
//! - **Roles**: hub / relay classification from unweighted node degree
//! - **Connectivity**: weak components, diameter, and average path
//!   length, with betweenness centrality on small graphs
//! - **Stability**: route-change events per destination and direction,
//!   and forward/return symmetry
//! - **Churn**: node arrivals, departures, and attribute changes
//!   relative to the previous run's snapshot
//!
//! ## Architecture
//!
//! - `config`: analyzer configuration and YAML parsing
//! - `analysis::ingest`: CSV loading for traceroute and node logs
//! - `analysis::route_parser`: record validation and hop tokenizing
//! - `analysis::graph`: the directed weighted topology graph
//! - `analysis::connectivity` / `analysis::depth`: graph metrics
//! - `analysis::history`: route-change detection and symmetry
//! - `analysis::churn`: snapshot comparison between runs
//! - `analysis::report`: report assembly and rendering

pub mod analysis;
pub mod config;
