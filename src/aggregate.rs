//! Aggregation engine (C4): builds each component's aggregated point set
//! `A(c)` by a reverse-topological sweep, reusing moved-from buffers along
//! single-parent chains to bound total append work.

use crate::condensation::Condensation;
use crate::types::{ComponentId, Point};

/// Seed `A(c)` for every component with the points of its own spatial
/// members, pre-sized to the exact spatial-member count.
pub fn seed_sets(cond: &Condensation) -> Vec<Vec<Point>> {
    let m = cond.num_components();
    let mut counts = vec![0usize; m];
    for node in cond.nodes() {
        if node.point.is_some() {
            counts[node.cid.index()] += 1;
        }
    }
    let mut sets: Vec<Vec<Point>> = counts.iter().map(|&c| Vec::with_capacity(c)).collect();
    for node in cond.nodes() {
        if let Some(p) = node.point {
            sets[node.cid.index()].push(p);
        }
    }
    sets
}

/// Descendant-count pre-pass (§4.4): an allocation hint, not a correctness
/// requirement. `sink_first` must visit every child before its parent.
fn descendant_counts(cond: &Condensation, own_counts: &[usize], sink_first: &[usize]) -> Vec<usize> {
    let mut counts = own_counts.to_vec();
    for &cid in sink_first {
        let mut total = counts[cid];
        for child in cond.children(ComponentId(cid as u32)) {
            total += counts[child.index()];
        }
        counts[cid] = total;
    }
    counts
}

/// V-Base merge policy: single-parent children are moved (and the larger of
/// the two buffers is kept as the accumulator to bound total copying);
/// multi-parent children are copied, since their buffer must stay intact
/// for other parents still to read.
pub fn aggregate_base(cond: &Condensation, sink_first: &[usize]) -> Vec<Vec<Point>> {
    let mut sets = seed_sets(cond);
    let own_counts: Vec<usize> = sets.iter().map(Vec::len).collect();
    let descendants = descendant_counts(cond, &own_counts, sink_first);

    for &cid in sink_first {
        if descendants[cid] > sets[cid].capacity() {
            sets[cid].reserve(descendants[cid] - sets[cid].len());
        }

        let children: Vec<ComponentId> = cond.children(ComponentId(cid as u32)).to_vec();
        for child in children {
            let cidx = child.index();
            if sets[cidx].is_empty() {
                continue;
            }

            if cond.component(child).indegree == 1 {
                let taken = std::mem::take(&mut sets[cidx]);
                if sets[cid].is_empty() {
                    sets[cid] = taken;
                } else if sets[cid].len() < taken.len() {
                    let mut bigger = taken;
                    std::mem::swap(&mut sets[cid], &mut bigger);
                    sets[cid].append(&mut bigger);
                } else {
                    let mut taken = taken;
                    sets[cid].append(&mut taken);
                }
                if descendants[cid] > sets[cid].capacity() {
                    sets[cid].reserve(descendants[cid] - sets[cid].len());
                }
            } else {
                let copied = sets[cidx].clone();
                sets[cid].extend(copied);
            }
        }
    }

    sets
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Component, Node};

    fn node(cid: u32, point: Option<Point>) -> Node {
        Node {
            cid: ComponentId(cid),
            point,
        }
    }

    fn component(indegree: u32) -> Component {
        Component {
            id: ComponentId(0),
            indegree,
            is_spatial: false,
            members: Vec::new(),
        }
    }

    #[test]
    fn diamond_accumulates_descendant_points_with_duplication() {
        // A -> B, A -> C, B -> D, C -> D; D holds the only spatial point.
        let nodes = vec![
            node(0, None),
            node(1, None),
            node(2, None),
            node(3, Some(Point { x: 0.0, y: 0.0 })),
        ];
        let components = vec![
            component(0), // A
            component(1), // B
            component(1), // C
            component(2), // D: two parents
        ];
        let children = vec![
            vec![ComponentId(1), ComponentId(2)],
            vec![ComponentId(3)],
            vec![ComponentId(3)],
            vec![],
        ];
        let cond = Condensation::from_parts(nodes, components, children);
        // Sink-first: D, then B/C, then A.
        let sink_first = vec![3, 1, 2, 0];
        let sets = aggregate_base(&cond, &sink_first);
        assert_eq!(sets[0].len(), 2); // both paths through the diamond
        assert_eq!(sets[3].len(), 1);
    }

    #[test]
    fn single_parent_chain_moves_without_losing_points() {
        // A -> B -> C, C has the point, B has indegree 1.
        let nodes = vec![node(0, None), node(1, None), node(2, Some(Point { x: 9.0, y: 9.0 }))];
        let components = vec![component(0), component(1), component(1)];
        let children = vec![vec![ComponentId(1)], vec![ComponentId(2)], vec![]];
        let cond = Condensation::from_parts(nodes, components, children);
        let sink_first = vec![2, 1, 0];
        let sets = aggregate_base(&cond, &sink_first);
        assert_eq!(sets[0], vec![Point { x: 9.0, y: 9.0 }]);
    }
}
