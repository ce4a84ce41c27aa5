//! Module with the NFA/DFA state graph (component D): an append-only pool of states shared by
//! the builder, the ε-closure collapse and the determinizer.

use super::ids::StateID;
use crate::ids::TokenDefID;
use crate::pattern::CharRange;

/// A partial-pattern position: a cursor inside a specific token definition's pattern. Used only
/// for diagnostics — the partial-matches block of the debug dump, and pretty-printing a pattern
/// with a caret at this position. Never consulted for matching correctness.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[allow(dead_code)]
pub(crate) struct Ppat {
    pub(crate) token_def: TokenDefID,
    pub(crate) position: u32,
}

/// A non-ε edge: an interval label and the state it leads to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Edge {
    pub(crate) range: CharRange,
    pub(crate) target: StateID,
}

/// One state in the global pool. See the data model's `State` record for field semantics.
#[derive(Debug, Clone, Default)]
pub(crate) struct State {
    pub(crate) index: StateID,
    pub(crate) start_for_mode: Option<String>,
    pub(crate) is_reachable: bool,
    pub(crate) completed_match: Option<TokenDefID>,
    pub(crate) completed_match_bol: Option<TokenDefID>,
    pub(crate) completed_match_eol: Option<TokenDefID>,
    pub(crate) completed_match_beol: Option<TokenDefID>,
    pub(crate) ppats: Vec<Ppat>,
    pub(crate) edges: Vec<Edge>,
    pub(crate) epsilons: Vec<StateID>,
}

/// `merge_completion(m1, m2)`: the better of two completion ordinals, where "better" is "smaller,
/// with `None` losing to anything". This is the "first-declared-wins" primitive every merge in
/// the engine is built from.
pub(crate) fn merge_completion(
    a: Option<TokenDefID>,
    b: Option<TokenDefID>,
) -> Option<TokenDefID> {
    match (a, b) {
        (None, x) => x,
        (x, None) => x,
        (Some(x), Some(y)) => Some(if x.as_usize() <= y.as_usize() { x } else { y }),
    }
}

/// Reduce the four completion slots on `s` so each one implies strictly more specific context
/// than the slots it dominates. Must run after the four fields have already been independently
/// merged — each step below reads the current (possibly already-nulled-by-an-earlier-step) value
/// of the field it inspects.
fn canonicalize_completion(s: &mut State) {
    let best_bol = merge_completion(s.completed_match, s.completed_match_bol);
    if best_bol == s.completed_match {
        s.completed_match_bol = None;
    }
    let best_eol = merge_completion(s.completed_match, s.completed_match_eol);
    if best_eol == s.completed_match {
        s.completed_match_eol = None;
    }
    let best_beol = merge_completion(s.completed_match_beol, merge_completion(best_bol, best_eol));
    if best_beol == s.completed_match
        || (best_beol == s.completed_match_bol && best_beol == s.completed_match_eol)
    {
        s.completed_match_beol = None;
    } else {
        s.completed_match_beol = best_beol;
    }
}

/// The append-only global state pool. States are referenced by stable [`StateID`] and are never
/// removed — only ever marked unreachable.
#[derive(Debug, Clone, Default)]
pub(crate) struct StatePool {
    states: Vec<State>,
    start_states: Vec<StateID>,
}

impl StatePool {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Allocate a fresh state and return its id.
    pub(crate) fn new_state(&mut self) -> StateID {
        let id = StateID::new(self.states.len() as u32);
        self.states.push(State {
            index: id,
            ..Default::default()
        });
        id
    }

    /// Register `id` as a mode start state.
    pub(crate) fn add_start_state(&mut self, id: StateID) {
        self.start_states.push(id);
    }

    /// All registered mode start states, in registration order.
    pub(crate) fn start_states(&self) -> &[StateID] {
        &self.start_states
    }

    /// Number of states in the pool.
    pub(crate) fn len(&self) -> usize {
        self.states.len()
    }

    pub(crate) fn get(&self, id: StateID) -> &State {
        &self.states[id.as_usize()]
    }

    pub(crate) fn get_mut(&mut self, id: StateID) -> &mut State {
        &mut self.states[id.as_usize()]
    }

    /// Iterate all states in pool order.
    pub(crate) fn iter(&self) -> impl Iterator<Item = &State> {
        self.states.iter()
    }

    pub(crate) fn add_edge(&mut self, from: StateID, range: CharRange, to: StateID) {
        self.states[from.as_usize()].edges.push(Edge {
            range,
            target: to,
        });
    }

    pub(crate) fn add_epsilon(&mut self, from: StateID, to: StateID) {
        self.states[from.as_usize()].epsilons.push(to);
    }

    /// Whether `from` already has a non-ε edge structurally equal to `(range, to)` — same target
    /// and exactly the same interval. No coalescing of adjacent/overlapping ranges happens here.
    pub(crate) fn has_edge(&self, from: StateID, range: CharRange, to: StateID) -> bool {
        self.states[from.as_usize()]
            .edges
            .iter()
            .any(|e| e.target == to && e.range == range)
    }

    /// Add `(range, to)` as an outgoing edge of `from` unless structurally present already.
    pub(crate) fn add_edge_if_absent(&mut self, from: StateID, range: CharRange, to: StateID) {
        if !self.has_edge(from, range, to) {
            self.add_edge(from, range, to);
        }
    }

    /// Merge `src`'s PPATs and completion slots into `dst`, deduplicating PPATs and applying the
    /// completion canonicalization rule. Does not touch edges — callers decide how (or whether)
    /// to copy edges, since the ε-closure collapse and the determinizer's superstate
    /// construction each have a different rule for that.
    pub(crate) fn merge_states(&mut self, dst: StateID, src: StateID) {
        let src_ppats = self.states[src.as_usize()].ppats.clone();
        let dst_state = &mut self.states[dst.as_usize()];
        for p in src_ppats {
            if !dst_state.ppats.contains(&p) {
                dst_state.ppats.push(p);
            }
        }
        let src_completions = {
            let s = &self.states[src.as_usize()];
            (
                s.completed_match,
                s.completed_match_bol,
                s.completed_match_eol,
                s.completed_match_beol,
            )
        };
        let dst_state = &mut self.states[dst.as_usize()];
        dst_state.completed_match = merge_completion(dst_state.completed_match, src_completions.0);
        dst_state.completed_match_bol =
            merge_completion(dst_state.completed_match_bol, src_completions.1);
        dst_state.completed_match_eol =
            merge_completion(dst_state.completed_match_eol, src_completions.2);
        dst_state.completed_match_beol =
            merge_completion(dst_state.completed_match_beol, src_completions.3);
        canonicalize_completion(dst_state);
    }
}
