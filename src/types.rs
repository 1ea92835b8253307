//! Core data model: nodes, components, points, and the error/report types
//! shared by every other module.

use std::fmt;
use std::time::Duration;

// ============================================================================
// Identifiers
// ============================================================================

/// Dense node id in `[0, N)`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(pub u32);

/// Dense strongly-connected-component id in `[0, M)`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ComponentId(pub u32);

impl NodeId {
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl ComponentId {
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

// ============================================================================
// Geometry
// ============================================================================

/// A single-precision 2D point.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    #[inline]
    pub fn in_box(&self, b: &BBox) -> bool {
        self.x >= b.lo.x && self.x <= b.hi.x && self.y >= b.lo.y && self.y <= b.hi.y
    }
}

/// A closed axis-aligned query rectangle, built directly from the four
/// query-line coordinates (lower-left, upper-right) with no reordering.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BBox {
    pub lo: Point,
    pub hi: Point,
}

// ============================================================================
// Graph data model
// ============================================================================

/// A node in the original graph. A spatial node carries exactly one point;
/// a non-spatial node carries none — encoded by `Option` rather than a
/// separate `isSpatial` flag so the two states can't drift out of sync.
#[derive(Clone, Debug, PartialEq)]
pub struct Node {
    pub cid: ComponentId,
    pub point: Option<Point>,
}

impl Node {
    #[inline]
    pub fn is_spatial(&self) -> bool {
        self.point.is_some()
    }
}

/// A strongly-connected component of the original graph.
#[derive(Clone, Debug)]
pub struct Component {
    pub id: ComponentId,
    pub indegree: u32,
    pub is_spatial: bool,
    pub members: Vec<NodeId>,
}

// ============================================================================
// Errors
// ============================================================================

/// Error kinds surfaced by loading, indexing, or serving.
///
/// `MalformedQueryLine` is deliberately not a variant here: per the query
/// driver's contract, a malformed tuple ends the query stream cleanly and
/// is handled in the parse loop, not propagated as an error.
#[derive(Debug)]
pub enum ReachError {
    Usage(String),
    Io { path: String, source: std::io::Error },
    CorruptInput(String),
    InvalidQuery(String),
}

impl fmt::Display for ReachError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReachError::Usage(msg) => write!(f, "{}", msg),
            ReachError::Io { path, source } => write!(f, "{}: {}", path, source),
            ReachError::CorruptInput(msg) => write!(f, "{}", msg),
            ReachError::InvalidQuery(msg) => write!(f, "{}", msg),
        }
    }
}

impl std::error::Error for ReachError {}

impl From<std::io::Error> for ReachError {
    fn from(e: std::io::Error) -> Self {
        ReachError::Io {
            path: String::new(),
            source: e,
        }
    }
}

// ============================================================================
// Report
// ============================================================================

/// Fixed-order summary printed to stdout after the query stream ends.
pub struct Report {
    pub prefix: String,
    pub query_file: String,
    pub method: &'static str,
    pub indexing_time: Duration,
    pub total_index_bytes: usize,
    pub num_components: usize,
    pub total_points: usize,
    pub num_queries: usize,
    pub num_true: usize,
    pub total_query_time: Duration,
}

impl Report {
    pub fn avg_query_time_secs(&self) -> f64 {
        if self.num_queries == 0 {
            0.0
        } else {
            self.total_query_time.as_secs_f64() / self.num_queries as f64
        }
    }
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f)?;
        writeln!(f, "Report")?;
        writeln!(f, "======")?;
        writeln!(f)?;
        writeln!(f, "Input prefix             : {}", self.prefix)?;
        writeln!(f, "Query file               : {}", self.query_file)?;
        writeln!(f, "Method                   : {}", self.method)?;
        writeln!(f)?;
        writeln!(
            f,
            "Indexing time [secs]     : {:.10}",
            self.indexing_time.as_secs_f64()
        )?;
        writeln!(f, "Index size [Bytes]       : {}", self.total_index_bytes)?;
        writeln!(f, "Num of SCCs              : {}", self.num_components)?;
        writeln!(f, "Total stored points      : {}", self.total_points)?;
        writeln!(f)?;
        writeln!(f, "Num of queries           : {}", self.num_queries)?;
        writeln!(f, "Num of true results      : {}", self.num_true)?;
        if self.num_queries > 0 {
            writeln!(
                f,
                "Avg query time [secs]    : {:.10}",
                self.avg_query_time_secs()
            )?;
        } else {
            writeln!(f, "Avg query time [secs]    : 0")?;
        }
        writeln!(f)
    }
}
