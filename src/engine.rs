//! The engine façade (component K): the single public entry type a grammar parser drives to turn
//! admitted token definitions into a compiled automaton. Mirrors the builder-configuration idiom
//! used elsewhere in this crate rather than scattering boolean parameters across call sites.

use log::{debug, trace};

use crate::errors::{EngineError, EngineErrorKind, Result, SourceLocation, Warning};
use crate::ids::{ModeID, TokenDefID};
use crate::internal::closure::remove_epsilons;
use crate::internal::determinize::determinize;
use crate::internal::dump::{dump_state_pool, dump_token_defs};
use crate::internal::nfa_builder::build_nfa;
use crate::internal::state::StatePool;
use crate::internal::validator;
use crate::mode::{ModeRegistry, ModeSet};
use crate::pattern::AnchoredPattern;
use crate::token_def::{Action, TokenDef, TokenDefTable};

/// Which phases dump their state pool through the `log` facade when [`Engine::build`]/
/// [`Engine::check`] run. All flags default to `false`; tracing is strictly opt-in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct EngineConfig {
    trace_token_defs: bool,
    trace_nfa: bool,
    trace_closure: bool,
    trace_dfa: bool,
}

impl EngineConfig {
    /// The default configuration: no tracing.
    pub fn new() -> Self {
        Self::default()
    }

    /// Dump the admitted token-definition table (grouped by mode set) when [`Engine::check`] runs.
    pub fn with_trace_token_defs(mut self, value: bool) -> Self {
        self.trace_token_defs = value;
        self
    }

    /// Dump the state pool right after NFA construction.
    pub fn with_trace_nfa(mut self, value: bool) -> Self {
        self.trace_nfa = value;
        self
    }

    /// Dump the state pool right after ε-closure collapse.
    pub fn with_trace_closure(mut self, value: bool) -> Self {
        self.trace_closure = value;
        self
    }

    /// Dump the state pool right after determinization.
    pub fn with_trace_dfa(mut self, value: bool) -> Self {
        self.trace_dfa = value;
        self
    }
}

/// One outgoing transition of a [`CompiledState`]: a disjoint code-point interval and the state it
/// leads to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompiledEdge {
    /// First code point in the interval, inclusive.
    pub first: u32,
    /// Last code point in the interval, inclusive.
    pub last: u32,
    /// The state this edge leads to.
    pub target: u32,
}

/// A read-only view of one state of the compiled automaton. Exposes exactly the fields the state
/// graph's data model names — nothing about matching or execution, which stay out of scope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompiledState {
    /// This state's index in the pool.
    pub index: u32,
    /// Set if this state is the start state of some mode, naming that mode.
    pub start_for_mode: Option<String>,
    /// Whether this state is reachable from any mode's start state.
    pub is_reachable: bool,
    /// The token definition that completes on reaching this state with no anchor context.
    pub completed_match: Option<TokenDefID>,
    /// The token definition that completes under beginning-of-line context.
    pub completed_match_bol: Option<TokenDefID>,
    /// The token definition that completes under end-of-line context.
    pub completed_match_eol: Option<TokenDefID>,
    /// The token definition that completes under both anchors at once.
    pub completed_match_beol: Option<TokenDefID>,
    /// Outgoing transitions, pairwise disjoint and sorted by `first`.
    pub edges: Vec<CompiledEdge>,
}

/// The finished product of [`Engine::build`]: a determinized, ε-free automaton. This is what the
/// crate builds and exposes — the scanner that walks it over input text is an external collaborator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompiledAutomaton {
    /// Every state in the pool, in construction order.
    pub states: Vec<CompiledState>,
    /// The start state of every reachable mode, in mode-registration order.
    pub start_states: Vec<u32>,
}

impl CompiledAutomaton {
    fn from_pool(pool: &StatePool) -> Self {
        let states = pool
            .iter()
            .map(|s| CompiledState {
                index: s.index.id(),
                start_for_mode: s.start_for_mode.clone(),
                is_reachable: s.is_reachable,
                completed_match: s.completed_match,
                completed_match_bol: s.completed_match_bol,
                completed_match_eol: s.completed_match_eol,
                completed_match_beol: s.completed_match_beol,
                edges: s
                    .edges
                    .iter()
                    .map(|e| CompiledEdge {
                        first: e.range.first,
                        last: e.range.last,
                        target: e.target.id(),
                    })
                    .collect(),
            })
            .collect();
        let start_states = pool.start_states().iter().map(|s| s.id()).collect();
        CompiledAutomaton { states, start_states }
    }
}

/// The crate's single public façade. Owns the mode registry and token-definition table; a
/// grammar parser admits definitions through it, then drives `check()` and `build()` in sequence.
/// Dropping an `Engine` drops everything it owns — there is no explicit teardown method.
pub struct Engine {
    config: EngineConfig,
    modes: ModeRegistry,
    table: TokenDefTable,
}

impl Engine {
    /// Create a fresh engine. Each grammar file gets its own — there is no cross-run cache.
    pub fn new(config: EngineConfig) -> Self {
        Self {
            config,
            modes: ModeRegistry::new(),
            table: TokenDefTable::new(),
        }
    }

    /// Intern a mode by name, creating it on first reference.
    pub fn mode_lookup(&mut self, name: &str) -> ModeID {
        self.modes.lookup(name)
    }

    /// Record that `mode` was named by an explicit rule stanza in the grammar.
    pub fn rule_stanza_mode_refs_add(&mut self, mode: ModeID) {
        self.modes.rule_stanza_mode_refs_add(mode);
    }

    /// Admit a new token definition. Checks patterns that can match the empty string (other than
    /// LITERAL/CHARCLASS, whose empty cases are diagnosed elsewhere) and action combinations that
    /// violate the exclusivity invariants, but the definition is appended to the table
    /// unconditionally — even when one of those checks fails — so a single admission pass
    /// surfaces as many problems as exist rather than stopping downstream passes at the first
    /// one found. Returns the first validation failure encountered, if any.
    pub fn add_tokendef(
        &mut self,
        symbol: impl Into<String>,
        anchored_pattern: AnchoredPattern,
        action: Option<Action>,
        modes: ModeSet,
        loc_symbol: SourceLocation,
        loc_pattern: SourceLocation,
    ) -> Result<TokenDefID> {
        let symbol = symbol.into();
        trace!("add_tokendef {symbol} at {loc_pattern}");

        let mut first_error: Option<EngineError> = None;
        if let Err(e) = validator::validate_pattern_emptiness(&anchored_pattern.pattern, loc_pattern)
        {
            first_error.get_or_insert(e);
        }
        if anchored_pattern.pattern.is_empty_literal() {
            first_error.get_or_insert(EngineError::new(EngineErrorKind::EmptyLiteral(loc_pattern)));
        }
        if let Some(action) = &action {
            if let Err(e) = action.validate(loc_pattern) {
                first_error.get_or_insert(e);
            }
        }

        let id = self.table.push(TokenDef {
            symbol,
            anchored_pattern,
            action,
            modes,
            loc_symbol,
            loc_pattern,
        });

        match first_error {
            Some(e) => Err(e),
            None => Ok(id),
        }
    }

    /// Signal the end of the token section. Fails if no token definitions were ever admitted.
    pub fn section_finished(&self, loc: SourceLocation) -> Result<()> {
        if self.table.is_empty() {
            return Err(EngineError::new(EngineErrorKind::NoTokens(loc)));
        }
        debug!("token section closed with {} definitions", self.table.len());
        Ok(())
    }

    /// Run the action validator: mode-reference checks (fatal) and mode-reachability (producing
    /// non-fatal warnings for modes with a rule stanza that mode 0 can never reach).
    pub fn check(&mut self) -> Result<Vec<Warning>> {
        if self.config.trace_token_defs {
            debug!("{}", dump_token_defs(&self.table, &self.modes));
        }
        validator::check(&mut self.modes, &self.table)
    }

    /// Build the automaton: NFA construction, ε-closure collapse, then determinization, in that
    /// order. `check()` should be called first so mode reachability is already computed — the
    /// builder only emits subgraphs for modes already marked reachable.
    pub fn build(&mut self) -> Result<CompiledAutomaton> {
        let mut pool = build_nfa(&mut self.modes, &self.table);
        trace!("NFA built: {} states", pool.len());
        if self.config.trace_nfa {
            debug!("{}", dump_state_pool(&pool, &self.modes, &self.table));
        }

        remove_epsilons(&mut pool);
        trace!("epsilons removed");
        if self.config.trace_closure {
            debug!("{}", dump_state_pool(&pool, &self.modes, &self.table));
        }

        determinize(&mut pool);
        trace!("determinized: {} states", pool.len());
        if self.config.trace_dfa {
            debug!("{}", dump_state_pool(&pool, &self.modes, &self.table));
        }

        Ok(CompiledAutomaton::from_pool(&pool))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pattern::Pattern;

    fn loc() -> SourceLocation {
        SourceLocation::default()
    }

    #[test]
    fn scenario_s1_single_literal_end_to_end() {
        let mut engine = Engine::new(EngineConfig::new());
        let root = engine.mode_lookup("INITIAL");
        engine.rule_stanza_mode_refs_add(root);
        engine
            .add_tokendef(
                "LIT",
                AnchoredPattern::unanchored(Pattern::literal_str("abc")),
                None,
                ModeSet::from_modes([root]),
                loc(),
                loc(),
            )
            .unwrap();
        engine.section_finished(loc()).unwrap();
        let warnings = engine.check().unwrap();
        assert!(warnings.is_empty());
        let automaton = engine.build().unwrap();
        let tail = automaton
            .states
            .iter()
            .find(|s| s.completed_match == Some(TokenDefID::new(0)))
            .unwrap();
        assert_eq!(tail.completed_match_bol, None);
        assert_eq!(tail.completed_match_eol, None);
        assert_eq!(tail.completed_match_beol, None);
    }

    #[test]
    fn scenario_s4_star_can_be_empty_is_rejected() {
        let mut engine = Engine::new(EngineConfig::new());
        let root = engine.mode_lookup("INITIAL");
        engine.rule_stanza_mode_refs_add(root);
        let err = engine
            .add_tokendef(
                "STARRED",
                AnchoredPattern::unanchored(Pattern::star(Pattern::literal_str("a"))),
                None,
                ModeSet::from_modes([root]),
                loc(),
                loc(),
            )
            .unwrap_err();
        assert!(matches!(*err.source, EngineErrorKind::PatternCanBeEmpty(_)));
    }

    #[test]
    fn rejected_definition_is_still_appended_to_the_table() {
        let mut engine = Engine::new(EngineConfig::new());
        let root = engine.mode_lookup("INITIAL");
        engine.rule_stanza_mode_refs_add(root);
        assert!(engine
            .add_tokendef(
                "STARRED",
                AnchoredPattern::unanchored(Pattern::star(Pattern::literal_str("a"))),
                None,
                ModeSet::from_modes([root]),
                loc(),
                loc(),
            )
            .is_err());
        // Rejected at admission, but still recorded: a later pass should be able to find it.
        assert_eq!(engine.table.len(), 1);
        assert_eq!(engine.table.get(TokenDefID::new(0)).symbol, "STARRED");
    }

    #[test]
    fn scenario_s6_error_combined_with_mode_push_is_rejected() {
        let mut engine = Engine::new(EngineConfig::new());
        let root = engine.mode_lookup("INITIAL");
        let other = engine.mode_lookup("OTHER");
        engine.rule_stanza_mode_refs_add(root);
        engine.rule_stanza_mode_refs_add(other);
        let mut action = Action::error("bad");
        action.merge(Action::mode_push(other), loc()).unwrap();
        let err = engine
            .add_tokendef(
                "BAD",
                AnchoredPattern::unanchored(Pattern::literal_str("x")),
                Some(action),
                ModeSet::from_modes([root]),
                loc(),
                loc(),
            )
            .unwrap_err();
        assert!(matches!(
            *err.source,
            EngineErrorKind::ErrorCombinedWithOtherActions(_)
        ));
    }

    #[test]
    fn section_finished_rejects_empty_token_table() {
        let engine = Engine::new(EngineConfig::new());
        assert!(engine.section_finished(loc()).is_err());
    }
}
