//! ε-closure collapse (component F): for each state, pulls the ε-closure's completions, PPATs
//! and non-ε edges back onto the state itself, then clears its ε-edge list.

use super::ids::StateID;
use super::state::StatePool;

/// Collapse ε-transitions across the whole pool, in place, in pool order.
pub(crate) fn remove_epsilons(pool: &mut StatePool) {
    let state_count = pool.len();
    for i in 0..state_count {
        let s = StateID::new(i as u32);
        let closure = epsilon_closure(pool, s);
        for &t in &closure {
            if t != s {
                pool.merge_states(s, t);
            }
            let edges = pool.get(t).edges.clone();
            for e in edges {
                pool.add_edge_if_absent(s, e.range, e.target);
            }
        }
        pool.get_mut(s).epsilons.clear();
    }
}

/// The ε-closure of `start`: the smallest set of states reachable from it via zero or more
/// ε-edges, in stable discovery order (breadth-first over the worklist), with `start` itself
/// always the first element.
fn epsilon_closure(pool: &StatePool, start: StateID) -> Vec<StateID> {
    let mut closure = vec![start];
    let mut i = 0;
    while i < closure.len() {
        let s = closure[i];
        i += 1;
        for &eps in &pool.get(s).epsilons {
            if !closure.contains(&eps) {
                closure.push(eps);
            }
        }
    }
    closure
}
