pub mod aggregate;
pub mod base;
pub mod condensation;
pub mod loader;
pub mod query;
pub mod shared;
pub mod spatial;
pub mod toposort;
pub mod types;

pub use condensation::Condensation;
pub use query::{run_queries, Engine, QueryStats};
pub use types::{BBox, Component, ComponentId, Node, NodeId, Point, ReachError, Report};
