//! V-Base engine: every component that owns any spatial descendant gets
//! its own freshly built spatial index; no sharing (C5/C6, base variant).

use std::rc::Rc;
use std::time::Instant;

use crate::aggregate::aggregate_base;
use crate::condensation::Condensation;
use crate::spatial::SpatialIndex;
use crate::toposort::kahn_order;
use crate::types::{ComponentId, NodeId, ReachError};

pub struct BaseEngine {
    /// `lookup[n]` is the index responsible for node `n`, or `None` if `n`'s
    /// component has no spatial descendants at all.
    lookup: Vec<Option<Rc<SpatialIndex>>>,
    pub total_index_bytes: usize,
    pub total_points: usize,
    pub indexing_time: std::time::Duration,
}

impl BaseEngine {
    pub fn resolve(&self, node: NodeId) -> Option<&Rc<SpatialIndex>> {
        self.lookup[node.index()].as_ref()
    }
}

pub fn build(cond: &Condensation) -> Result<BaseEngine, ReachError> {
    let t0 = Instant::now();
    let m = cond.num_components();

    let indegree: Vec<u32> = (0..m)
        .map(|c| cond.component(ComponentId(c as u32)).indegree)
        .collect();
    let children: Vec<Vec<usize>> = (0..m)
        .map(|c| {
            cond.children(ComponentId(c as u32))
                .iter()
                .map(|x| x.index())
                .collect()
        })
        .collect();

    let source_first = kahn_order(&indegree, &children)?;
    let sink_first: Vec<usize> = source_first.into_iter().rev().collect();

    let mut sets = aggregate_base(cond, &sink_first);

    let mut indexes: Vec<Option<Rc<SpatialIndex>>> = vec![None; m];
    for &cid in &sink_first {
        if !sets[cid].is_empty() {
            let points = std::mem::take(&mut sets[cid]);
            indexes[cid] = Some(Rc::new(SpatialIndex::build(points)));
        }
    }

    let mut lookup: Vec<Option<Rc<SpatialIndex>>> = vec![None; cond.num_nodes()];
    for nid in 0..cond.num_nodes() {
        let cid = cond.node(NodeId(nid as u32)).cid;
        lookup[nid] = indexes[cid.index()].clone();
    }

    let total_points: usize = indexes.iter().flatten().map(|i| i.len()).sum();
    let total_index_bytes = indexes.iter().flatten().map(|i| i.byte_footprint()).sum::<usize>()
        + lookup.len() * std::mem::size_of::<Option<Rc<SpatialIndex>>>();

    Ok(BaseEngine {
        lookup,
        total_index_bytes,
        total_points,
        indexing_time: t0.elapsed(),
    })
}
