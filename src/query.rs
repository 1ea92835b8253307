//! Query driver (C7): parses `nid xlo ylo xhi yhi` tuples, dispatches to
//! the lookup fabric built by whichever engine variant is active, and
//! accumulates query count, true-result count, and wall-time.

use std::time::{Duration, Instant};

use crate::base::BaseEngine;
use crate::condensation::Condensation;
use crate::shared::SharedEngine;
use crate::types::{BBox, NodeId, Point, ReachError};

pub enum Engine {
    Base(BaseEngine),
    Shared(SharedEngine),
}

impl Engine {
    pub fn method_name(&self) -> &'static str {
        match self {
            Engine::Base(_) => "2DReach",
            Engine::Shared(_) => "2DReach-Pointer",
        }
    }

    pub fn indexing_time(&self) -> Duration {
        match self {
            Engine::Base(e) => e.indexing_time,
            Engine::Shared(e) => e.indexing_time,
        }
    }

    pub fn total_index_bytes(&self) -> usize {
        match self {
            Engine::Base(e) => e.total_index_bytes,
            Engine::Shared(e) => e.total_index_bytes,
        }
    }

    pub fn total_points(&self) -> usize {
        match self {
            Engine::Base(e) => e.total_points,
            Engine::Shared(e) => e.total_points,
        }
    }
}

pub struct QueryStats {
    pub num_queries: usize,
    pub num_true: usize,
    pub total_query_time: Duration,
}

/// Runs the full query stream and returns its aggregate statistics.
/// A malformed or truncated trailing tuple ends the stream cleanly; an
/// out-of-range node id is fatal under both variants, since a stale or
/// corrupt query file should surface as an error rather than silently
/// answering `false`.
pub fn run_queries(
    cond: &Condensation,
    engine: &Engine,
    query_text: &str,
) -> Result<QueryStats, ReachError> {
    let mut num_queries = 0usize;
    let mut num_true = 0usize;
    let mut total_query_time = Duration::ZERO;

    let mut tokens = query_text.split_whitespace();
    loop {
        let nid_tok = match tokens.next() {
            Some(t) => t,
            None => break,
        };
        let (xlo_tok, ylo_tok, xhi_tok, yhi_tok) =
            match (tokens.next(), tokens.next(), tokens.next(), tokens.next()) {
                (Some(a), Some(b), Some(c), Some(d)) => (a, b, c, d),
                _ => break,
            };

        let nid: u32 = match nid_tok.parse() {
            Ok(v) => v,
            Err(_) => break,
        };
        let coords: Option<Vec<f64>> = [xlo_tok, ylo_tok, xhi_tok, yhi_tok]
            .iter()
            .map(|t| t.parse::<f64>().ok())
            .collect();
        let (xlo, ylo, xhi, yhi) = match coords.as_deref() {
            Some([a, b, c, d]) => (*a, *b, *c, *d),
            _ => break,
        };

        if nid as usize >= cond.num_nodes() {
            return Err(ReachError::InvalidQuery(format!(
                "query references invalid node identifier {}",
                nid
            )));
        }

        let t0 = Instant::now();
        let bbox = BBox {
            lo: Point {
                x: xlo as f32,
                y: ylo as f32,
            },
            hi: Point {
                x: xhi as f32,
                y: yhi as f32,
            },
        };
        let node = cond.node(NodeId(nid));

        let qres = match engine {
            Engine::Base(base) => match base.resolve(NodeId(nid)) {
                Some(idx) => idx.has_intersection(&bbox),
                None => false,
            },
            Engine::Shared(shared) => match shared.resolve(node.cid) {
                Some(idx) => idx.has_intersection(&bbox),
                None => node.point.map_or(false, |p| p.in_box(&bbox)),
            },
        };
        total_query_time += t0.elapsed();

        num_queries += 1;
        if qres {
            num_true += 1;
        }
    }

    Ok(QueryStats {
        num_queries,
        num_true,
        total_query_time,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Component, ComponentId, Node};
    use crate::{base, shared};

    fn single_spatial_node_condensation() -> Condensation {
        let nodes = vec![Node {
            cid: ComponentId(0),
            point: Some(Point { x: 5.0, y: 5.0 }),
        }];
        let components = vec![Component {
            id: ComponentId(0),
            indegree: 0,
            is_spatial: true,
            members: Vec::new(),
        }];
        Condensation::from_parts(nodes, components, vec![vec![]])
    }

    #[test]
    fn self_reachability_scenario() {
        let cond = single_spatial_node_condensation();
        let engine = Engine::Base(base::build(&cond).unwrap());
        let stats = run_queries(&cond, &engine, "0 0 0 10 10\n0 6 6 10 10\n").unwrap();
        assert_eq!(stats.num_queries, 2);
        assert_eq!(stats.num_true, 1);
    }

    #[test]
    fn variants_agree_on_diamond_scenario() {
        // A -> B, A -> C, B -> D, C -> D; D holds the only spatial point.
        let nodes = vec![
            Node {
                cid: ComponentId(0),
                point: None,
            },
            Node {
                cid: ComponentId(1),
                point: None,
            },
            Node {
                cid: ComponentId(2),
                point: None,
            },
            Node {
                cid: ComponentId(3),
                point: Some(Point { x: 0.0, y: 0.0 }),
            },
        ];
        let components = vec![
            Component {
                id: ComponentId(0),
                indegree: 0,
                is_spatial: false,
                members: Vec::new(),
            },
            Component {
                id: ComponentId(1),
                indegree: 1,
                is_spatial: false,
                members: Vec::new(),
            },
            Component {
                id: ComponentId(2),
                indegree: 1,
                is_spatial: false,
                members: Vec::new(),
            },
            Component {
                id: ComponentId(3),
                indegree: 2,
                is_spatial: true,
                members: Vec::new(),
            },
        ];
        let children = vec![
            vec![ComponentId(1), ComponentId(2)],
            vec![ComponentId(3)],
            vec![ComponentId(3)],
            vec![],
        ];
        let cond = Condensation::from_parts(nodes, components, children);

        let base_engine = Engine::Base(base::build(&cond).unwrap());
        let shared_engine = Engine::Shared(shared::build(&cond).unwrap());

        for line in ["0 -1 -1 1 1", "0 5 5 6 6"] {
            let b = run_queries(&cond, &base_engine, line).unwrap();
            let s = run_queries(&cond, &shared_engine, line).unwrap();
            assert_eq!(b.num_true, s.num_true, "mismatch on query {line}");
        }
    }

    #[test]
    fn malformed_trailing_line_ends_stream_cleanly() {
        let cond = single_spatial_node_condensation();
        let engine = Engine::Base(base::build(&cond).unwrap());
        let stats = run_queries(&cond, &engine, "0 0 0 10 10\nnotanumber\n").unwrap();
        assert_eq!(stats.num_queries, 1);
    }

    #[test]
    fn out_of_range_node_id_is_fatal() {
        let cond = single_spatial_node_condensation();
        let engine = Engine::Base(base::build(&cond).unwrap());
        let err = run_queries(&cond, &engine, "7 0 0 1 1\n");
        assert!(matches!(err, Err(ReachError::InvalidQuery(_))));
    }
}
