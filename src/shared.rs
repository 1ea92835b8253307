//! V-Shared engine: spatial singletons are elided from the index set and
//! answered directly; non-spatial components that inherit their entire
//! aggregated set from one child share that child's index by reference.
//! The lookup fabric is a bitmap over component ids plus a word-granular
//! rank prefix, per §4.6.

use std::rc::Rc;
use std::time::Instant;

use crate::aggregate::seed_sets;
use crate::condensation::Condensation;
use crate::spatial::SpatialIndex;
use crate::toposort::kahn_order;
use crate::types::{ComponentId, ReachError};

pub struct SharedEngine {
    bitmap: Vec<u64>,
    rank_prefix: Vec<u32>,
    handles: Vec<Option<Rc<SpatialIndex>>>,
    pub total_index_bytes: usize,
    pub total_points: usize,
    pub indexing_time: std::time::Duration,
}

impl SharedEngine {
    /// Resolves a component to its spatial index. `None` means the
    /// component is a spatial singleton (answer via the node's own
    /// coordinate) — or, in principle, a non-spatial component with no
    /// spatial descendants at all, which also has nothing to search.
    pub fn resolve(&self, cid: ComponentId) -> Option<Rc<SpatialIndex>> {
        let c = cid.index();
        let word = c >> 6;
        let bit = c & 63;
        if self.bitmap[word] & (1u64 << bit) == 0 {
            return None;
        }
        let below = self.bitmap[word] & ((1u64 << bit) - 1);
        let rank = self.rank_prefix[word] as usize + below.count_ones() as usize;
        self.handles[rank].clone()
    }
}

pub fn build(cond: &Condensation) -> Result<SharedEngine, ReachError> {
    let t0 = Instant::now();
    let m = cond.num_components();

    // Subgraph over non-spatial components only: determines processing
    // order, but aggregation below still reads every child (spatial
    // children included) from the full condensation.
    let mut non_spatial_ids: Vec<usize> = Vec::new();
    let mut comp_to_sub: Vec<Option<usize>> = vec![None; m];
    for c in 0..m {
        if !cond.component(ComponentId(c as u32)).is_spatial {
            comp_to_sub[c] = Some(non_spatial_ids.len());
            non_spatial_ids.push(c);
        }
    }
    let k = non_spatial_ids.len();

    let mut sub_children: Vec<Vec<usize>> = vec![Vec::new(); k];
    let mut sub_indegree: Vec<u32> = vec![0; k];
    for &c in &non_spatial_ids {
        let sub_c = comp_to_sub[c].unwrap();
        for child in cond.children(ComponentId(c as u32)) {
            if !cond.component(*child).is_spatial {
                let sub_child = comp_to_sub[child.index()].unwrap();
                sub_children[sub_c].push(sub_child);
                sub_indegree[sub_child] += 1;
            }
        }
    }

    let sub_source_first = kahn_order(&sub_indegree, &sub_children)?;
    let sub_sink_first: Vec<usize> = sub_source_first.into_iter().rev().collect();

    let mut sets = seed_sets(cond);
    let mut handles: Vec<Option<Rc<SpatialIndex>>> = vec![None; k];

    for &sub_cid in &sub_sink_first {
        let cid = non_spatial_ids[sub_cid];
        let mut dominant: Option<(usize, usize)> = None; // (child component idx, point count)

        let children: Vec<ComponentId> = cond.children(ComponentId(cid as u32)).to_vec();
        for child in children {
            let cidx = child.index();
            if sets[cidx].is_empty() {
                continue;
            }
            if !cond.component(child).is_spatial {
                let sz = sets[cidx].len();
                if dominant.map_or(true, |(_, best)| sz > best) {
                    dominant = Some((cidx, sz));
                }
            }
            let copied = sets[cidx].clone();
            sets[cid].extend(copied);
        }

        if let Some((dom_cidx, dom_size)) = dominant {
            if dom_size == sets[cid].len() {
                let dom_sub = comp_to_sub[dom_cidx].unwrap();
                handles[sub_cid] = handles[dom_sub].clone();
                continue;
            }
        }
        if !sets[cid].is_empty() {
            // Built from a copy, not a take: `cid`'s own parent(s), visited
            // later in this sink-first sweep, still need to read `sets[cid]`
            // at the `extend` above.
            handles[sub_cid] = Some(Rc::new(SpatialIndex::build(sets[cid].clone())));
        }
    }

    let num_words = m.div_ceil(64);
    let mut bitmap = vec![0u64; num_words];
    for &c in &non_spatial_ids {
        bitmap[c >> 6] |= 1u64 << (c & 63);
    }
    let mut rank_prefix = vec![0u32; num_words];
    let mut running = 0u32;
    for w in 0..num_words {
        rank_prefix[w] = running;
        running += bitmap[w].count_ones();
    }

    let mut seen_ptrs: Vec<*const SpatialIndex> = Vec::new();
    let mut total_index_bytes = 0usize;
    let mut total_points = 0usize;
    for h in handles.iter().flatten() {
        let ptr = Rc::as_ptr(h);
        if !seen_ptrs.contains(&ptr) {
            seen_ptrs.push(ptr);
            total_index_bytes += h.byte_footprint();
            total_points += h.len();
        }
    }
    total_index_bytes += k * std::mem::size_of::<Option<Rc<SpatialIndex>>>()
        + bitmap.len() * std::mem::size_of::<u64>()
        + rank_prefix.len() * std::mem::size_of::<u32>();

    Ok(SharedEngine {
        bitmap,
        rank_prefix,
        handles,
        total_index_bytes,
        total_points,
        indexing_time: t0.elapsed(),
    })
}
