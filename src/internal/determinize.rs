//! Interval-based subset construction (component G): turns a state whose outgoing intervals may
//! overlap into one where they are pairwise disjoint, merging NFA states into superstates keyed
//! by their sorted index set.

use std::collections::VecDeque;

use rustc_hash::FxHashMap;

use super::ids::StateID;
use super::state::{Edge, StatePool};
use crate::pattern::CharRange;

/// Determinize every state reachable from a mode start state, in place. Must run after
/// [`super::closure::remove_epsilons`] — this pass does not look at ε-edges at all.
pub(crate) fn determinize(pool: &mut StatePool) {
    for i in 0..pool.len() {
        pool.get_mut(StateID::new(i as u32)).is_reachable = false;
    }

    let mut superstates: FxHashMap<Vec<StateID>, StateID> = FxHashMap::default();
    let mut worklist: VecDeque<StateID> = pool.start_states().iter().copied().collect();

    while let Some(s) = worklist.pop_front() {
        if pool.get(s).is_reachable {
            continue;
        }
        pool.get_mut(s).is_reachable = true;

        let mut sorted_edges = pool.get(s).edges.clone();
        sorted_edges.sort_by_key(|e| e.range.first);
        let mut edges: VecDeque<Edge> = sorted_edges.into();

        let mut new_edges = Vec::new();
        while let Some(front) = edges.front().copied() {
            let group_first = front.range.first;
            let mut group = Vec::new();
            while matches!(edges.front(), Some(e) if e.range.first == group_first) {
                group.push(edges.pop_front().unwrap());
            }

            let mut hi = group.iter().map(|e| e.range.last).min().unwrap();
            if let Some(next) = edges.front() {
                if next.range.first <= hi {
                    hi = next.range.first - 1;
                }
            }

            let mut targets: Vec<StateID> = group.iter().map(|e| e.target).collect();
            targets.sort_unstable();
            targets.dedup();

            let resolved = resolve_target(pool, &mut superstates, &targets);

            new_edges.push(Edge {
                range: CharRange::new(group_first, hi),
                target: resolved,
            });
            worklist.push_back(resolved);

            for e in group {
                if e.range.last == hi {
                    continue;
                }
                edges.push_front(Edge {
                    range: CharRange::new(hi + 1, e.range.last),
                    target: e.target,
                });
            }
        }

        pool.get_mut(s).edges = new_edges;
    }
}

/// Resolve a (sorted, deduplicated) target-state set to a single state: the lone member if the
/// set has cardinality 1, otherwise a cached or freshly materialized superstate.
fn resolve_target(
    pool: &mut StatePool,
    superstates: &mut FxHashMap<Vec<StateID>, StateID>,
    targets: &[StateID],
) -> StateID {
    if targets.len() == 1 {
        return targets[0];
    }
    if let Some(&cached) = superstates.get(targets) {
        return cached;
    }
    let new_state = pool.new_state();
    pool.get_mut(new_state).is_reachable = false;
    for &t in targets {
        pool.merge_states(new_state, t);
        let raw_edges = pool.get(t).edges.clone();
        for e in raw_edges {
            pool.add_edge(new_state, e.range, e.target);
        }
    }
    superstates.insert(targets.to_vec(), new_state);
    new_state
}
