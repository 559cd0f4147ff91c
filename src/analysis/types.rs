//! Core data types for traceroute topology analysis.

use std::collections::BTreeMap;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Probe direction as recorded in the traceroute log
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    /// Probe from the logger toward the destination
    Forward,
    /// Reply path from the destination back to the logger
    Return,
}

impl std::fmt::Display for Direction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Direction::Forward => write!(f, "forward"),
            Direction::Return => write!(f, "return"),
        }
    }
}

impl std::str::FromStr for Direction {
    type Err = RejectReason;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "forward" => Ok(Direction::Forward),
            "return" => Ok(Direction::Return),
            _ => Err(RejectReason::InvalidDirection),
        }
    }
}

/// Why a raw route record was rejected by the parser
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, thiserror::Error)]
pub enum RejectReason {
    #[error("timestamp could not be parsed")]
    MalformedTimestamp,
    #[error("hop field or hop count is unparseable")]
    InvalidHopField,
    #[error("direction is neither forward nor return")]
    InvalidDirection,
    #[error("record references an excluded node")]
    ExcludedNode,
    #[error("hop field holds a sentinel value")]
    SentinelValue,
}

/// One validated, immutable traceroute observation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteObservation {
    pub destination: String,
    pub direction: Direction,
    /// Ordered hop sequence, already trimmed; may be empty
    pub hops: Vec<String>,
    pub timestamp: NaiveDateTime,
    pub success: bool,
    pub hop_count: u32,
    pub signal_annotations: Option<String>,
}

impl RouteObservation {
    /// Canonical comma-joined form of the hop sequence, used as the
    /// path identity for route-change detection.
    pub fn hop_string(&self) -> String {
        self.hops.join(",")
    }
}

/// A raw traceroute CSV row before validation
#[derive(Debug, Clone, Default)]
pub struct RawRouteRecord {
    pub timestamp: String,
    pub destination: String,
    pub source: String,
    pub direction: String,
    pub route_hops: String,
    pub signal_strengths: String,
    pub hop_count: String,
    pub success: String,
}

/// A node attribute row from the nodes CSV
#[derive(Debug, Clone, Default)]
pub struct NodeRecord {
    pub id: String,
    pub user: String,
    pub aka: String,
    pub hardware: String,
    pub role: String,
    pub hops: u32,
    pub channel: u32,
    /// Best available observation time (LastHeard, else Since).
    /// None means the row carries no usable timestamp and is treated
    /// as observed "now" by the window filter.
    pub timestamp: Option<NaiveDateTime>,
    pub last_heard: String,
    pub since: String,
    pub battery: String,
}

/// Structural role derived from unweighted total degree
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Role {
    /// More than two distinct neighbors
    Hub,
    /// One or two distinct neighbors
    Relay,
    /// No neighbors; unreachable for nodes that enter the graph via edges
    End,
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Role::Hub => write!(f, "HUB"),
            Role::Relay => write!(f, "RELAY"),
            Role::End => write!(f, "END"),
        }
    }
}

/// Per-node entry in the topology report
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeReport {
    pub id: String,
    pub display_name: String,
    pub out_degree: usize,
    pub in_degree: usize,
    pub total_degree: usize,
    pub role: Role,
}

/// Per-edge entry in the topology report
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EdgeReport {
    pub from: String,
    pub to: String,
    pub weight: u32,
}

/// A path metric that degrades to a sentinel string on disconnected graphs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum GraphMetric {
    Hops(u32),
    Mean(f64),
    Sentinel(String),
}

impl GraphMetric {
    pub fn disconnected() -> Self {
        GraphMetric::Sentinel("Disconnected".to_string())
    }
}

impl std::fmt::Display for GraphMetric {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GraphMetric::Hops(h) => write!(f, "{}", h),
            GraphMetric::Mean(m) => write!(f, "{:.2}", m),
            GraphMetric::Sentinel(s) => write!(f, "{}", s),
        }
    }
}

/// Weak-connectivity and path-length metrics
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConnectivityReport {
    pub is_connected: bool,
    pub component_count: usize,
    pub diameter: GraphMetric,
    pub avg_path_length: GraphMetric,
}

/// Bounded betweenness centrality result
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CentralityReport {
    /// None when the 50-node guard trips or the graph is empty
    pub most_central_node: Option<String>,
    pub score: f64,
}

/// Emitted when the newest path for a destination/direction differs
/// from every prior path recorded within the window
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChangeEvent {
    pub destination: String,
    pub direction: Direction,
    pub current_path: String,
    /// The immediately prior entry's path, not necessarily the one the
    /// newest path mismatched
    pub previous_path: String,
    pub changed_at: NaiveDateTime,
}

/// Forward/return path relationship for one destination
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RouteSymmetry {
    /// The reversed return hop list equals the forward hop list
    Symmetric,
    Asymmetric,
    /// Only one direction observed successfully
    Partial,
    /// Neither direction succeeded
    Failed,
}

impl std::fmt::Display for RouteSymmetry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RouteSymmetry::Symmetric => write!(f, "Symmetric"),
            RouteSymmetry::Asymmetric => write!(f, "Asymmetric"),
            RouteSymmetry::Partial => write!(f, "Partial"),
            RouteSymmetry::Failed => write!(f, "Failed"),
        }
    }
}

/// Per-node attribute snapshot persisted between runs by the caller
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeSnapshot {
    pub user: String,
    pub aka: String,
    pub hardware: String,
    pub role: String,
    pub hops: u32,
    pub timestamp: Option<String>,
}

/// Prior network state, keyed by node ID. Loaded and saved by the
/// binary and passed into churn analysis as a plain value.
pub type Snapshot = BTreeMap<String, NodeSnapshot>;

/// A node mentioned in the churn report
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChurnNode {
    pub id: String,
    pub user: String,
    pub aka: String,
    pub hardware: String,
    pub role: String,
    pub hops: u32,
}

/// An attribute that changed between the snapshot and the current run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttributeChange {
    pub id: String,
    pub field: String,
    pub previous: String,
    pub current: String,
}

/// Aggregate churn counters
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ChurnStats {
    pub total_active_nodes: usize,
    pub new_count: usize,
    pub lost_count: usize,
    pub changed_count: usize,
}

/// Network activity relative to the prior snapshot
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ChurnReport {
    pub new_nodes: Vec<ChurnNode>,
    pub lost_nodes: Vec<ChurnNode>,
    pub name_changes: Vec<AttributeChange>,
    pub role_changes: Vec<AttributeChange>,
    pub hardware_changes: Vec<AttributeChange>,
    pub stats: ChurnStats,
}

/// Report metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisMetadata {
    pub generated_at: String,
    pub routes_analyzed: usize,
    pub routes_rejected: usize,
    pub time_window_hours: i64,
    pub max_hops: u32,
}

/// Complete analysis report. This is the contract boundary toward
/// rendering consumers; field names are stable.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TopologyReport {
    pub metadata: AnalysisMetadata,
    pub nodes: Vec<NodeReport>,
    pub edges: Vec<EdgeReport>,
    pub connectivity: ConnectivityReport,
    pub centrality: CentralityReport,
    pub network_depth: usize,
    pub route_changes: Vec<ChangeEvent>,
    pub asymmetry: BTreeMap<String, RouteSymmetry>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub churn: Option<ChurnReport>,
}
