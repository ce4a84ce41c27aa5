//! Thompson-style NFA construction (component E): walks every reachable mode's admitted token
//! definitions and extends the shared state pool with one subgraph per definition.

use super::ids::StateID;
use super::state::{Ppat, StatePool};
use crate::mode::ModeRegistry;
use crate::pattern::{CharRange, Pattern, LEX_CHAR_MAX};
use crate::token_def::TokenDefTable;

const LF: u32 = 0x0A;
const CR: u32 = 0x0D;

/// Build the NFA: one start state per reachable mode, and for every token definition active in
/// that mode, a subgraph reachable from the mode's start state by a single ε, in declaration
/// order. Updates `mode_registry`'s `start_state` field for every reachable mode as a side
/// effect.
pub(crate) fn build_nfa(mode_registry: &mut ModeRegistry, table: &TokenDefTable) -> StatePool {
    let mut pool = StatePool::new();
    let reachable_modes: Vec<_> = mode_registry
        .modes()
        .iter()
        .filter(|m| m.is_reachable)
        .map(|m| m.index)
        .collect();

    for mode in reachable_modes {
        let mode_name = mode_registry.get(mode).name.clone();
        let s_mode = pool.new_state();
        pool.get_mut(s_mode).start_for_mode = Some(mode_name);
        pool.add_start_state(s_mode);
        mode_registry.modes_mut()[mode.as_usize()].start_state = Some(s_mode.id());

        for (token_id, def) in table.iter() {
            if !def.modes.contains(mode) {
                continue;
            }
            let s_tok = pool.new_state();
            pool.add_epsilon(s_mode, s_tok);
            let mut ppat = Ppat {
                token_def: token_id,
                position: 0,
            };
            pool.get_mut(s_tok).ppats.push(ppat);

            let tail = build_node(&mut pool, s_tok, &def.anchored_pattern.pattern, &mut ppat);

            match (def.anchored_pattern.bol, def.anchored_pattern.eol) {
                (true, true) => pool.get_mut(tail).completed_match_beol = Some(token_id),
                (true, false) => pool.get_mut(tail).completed_match_bol = Some(token_id),
                (false, true) => pool.get_mut(tail).completed_match_eol = Some(token_id),
                (false, false) => pool.get_mut(tail).completed_match = Some(token_id),
            }
        }
    }
    pool
}

/// Recursively extend the graph from `state` per `node`, returning the tail state. `ppat`'s
/// position is bumped at the syntactic points named in the construction table; its (token,
/// position) snapshot is pushed onto a state's `ppats` at every junction point the table calls
/// out explicitly — the token's entry state, every fresh state reached by a new ε-edge
/// (`STAR`/`PLUS`'s loop head, `STAR`/`PLUS`/`OPTIONAL`'s exit, `ALTERNATE`'s join state) —
/// everywhere else the ε-closure collapse is what propagates partial-match information forward.
fn build_node(pool: &mut StatePool, state: StateID, node: &Pattern, ppat: &mut Ppat) -> StateID {
    match node {
        Pattern::Literal(codepoints) => {
            let mut cur = state;
            for &cp in codepoints {
                ppat.position += 1;
                let next = pool.new_state();
                pool.add_edge(cur, CharRange::single(cp), next);
                cur = next;
            }
            cur
        }
        Pattern::Dot => {
            ppat.position += 1;
            let next = pool.new_state();
            pool.add_edge(state, CharRange::new(1, LF - 1), next);
            pool.add_edge(state, CharRange::new(LF + 1, CR - 1), next);
            pool.add_edge(state, CharRange::new(CR + 1, LEX_CHAR_MAX), next);
            next
        }
        Pattern::CharClass { .. } => {
            let ranges = node.resolved_ranges();
            ppat.position += 1;
            let next = pool.new_state();
            for r in ranges {
                pool.add_edge(state, r, next);
            }
            next
        }
        Pattern::Sequence(first, second) => {
            let mid = build_node(pool, state, first, ppat);
            build_node(pool, mid, second, ppat)
        }
        Pattern::Star(child) => {
            let loop_head = pool.new_state();
            pool.add_epsilon(state, loop_head);
            pool.get_mut(loop_head).ppats.push(*ppat);
            let body_tail = build_node(pool, loop_head, child, ppat);
            pool.add_epsilon(body_tail, loop_head);
            ppat.position += 1;
            let exit = pool.new_state();
            pool.add_epsilon(body_tail, exit);
            pool.add_epsilon(loop_head, exit);
            pool.get_mut(exit).ppats.push(*ppat);
            exit
        }
        Pattern::Plus(child) => {
            let loop_head = pool.new_state();
            pool.add_epsilon(state, loop_head);
            pool.get_mut(loop_head).ppats.push(*ppat);
            let body_tail = build_node(pool, loop_head, child, ppat);
            pool.add_epsilon(body_tail, loop_head);
            ppat.position += 1;
            let exit = pool.new_state();
            pool.add_epsilon(body_tail, exit);
            pool.get_mut(exit).ppats.push(*ppat);
            exit
        }
        Pattern::Optional(child) => {
            let body_tail = build_node(pool, state, child, ppat);
            ppat.position += 1;
            let exit = pool.new_state();
            pool.add_epsilon(body_tail, exit);
            pool.add_epsilon(state, exit);
            pool.get_mut(exit).ppats.push(*ppat);
            exit
        }
        Pattern::Alternate(first, second) => {
            let join = pool.new_state();
            let tail1 = build_node(pool, state, first, ppat);
            pool.add_epsilon(tail1, join);
            ppat.position += 1;
            let tail2 = build_node(pool, state, second, ppat);
            pool.add_epsilon(tail2, join);
            pool.get_mut(join).ppats.push(*ppat);
            join
        }
    }
}
