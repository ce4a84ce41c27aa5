//! End-to-end coverage of §8's concrete scenarios, driven entirely through the public `Engine`
//! API the way a grammar parser would use it.

use lexmach::{
    AnchoredPattern, CharRange, Engine, EngineConfig, ModeSet, Pattern, TokenDefID,
};

fn loc() -> lexmach::SourceLocation {
    lexmach::SourceLocation::default()
}

fn init_log() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// S1: single literal `"abc"` in mode 0, no anchors — the tail state of the 4-state chain
/// completes with no anchor, and only it.
#[test]
fn s1_single_literal_no_anchors() {
    init_log();
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
    engine.check().unwrap();
    let automaton = engine.build().unwrap();

    let completing: Vec<_> = automaton
        .states
        .iter()
        .filter(|s| s.completed_match.is_some())
        .collect();
    assert_eq!(completing.len(), 1);
    let tail = completing[0];
    assert_eq!(tail.completed_match, Some(TokenDefID::new(0)));
    assert_eq!(tail.completed_match_bol, None);
    assert_eq!(tail.completed_match_eol, None);
    assert_eq!(tail.completed_match_beol, None);
}

/// S2: `"if"` declared before `[a-z]+` — the keyword wins at the state reached by `"if"` even
/// though the character class also matches there, because it was declared first; `"ifx"` only
/// the character class reaches.
#[test]
fn s2_first_declared_wins_on_keyword_vs_class() {
    init_log();
    let mut engine = Engine::new(EngineConfig::new());
    let root = engine.mode_lookup("INITIAL");
    engine.rule_stanza_mode_refs_add(root);
    let if_id = engine
        .add_tokendef(
            "IF",
            AnchoredPattern::unanchored(Pattern::literal_str("if")),
            None,
            ModeSet::from_modes([root]),
            loc(),
            loc(),
        )
        .unwrap();
    let ident_id = engine
        .add_tokendef(
            "IDENT",
            AnchoredPattern::unanchored(Pattern::plus(Pattern::charclass(vec![CharRange::new(
                b'a' as u32,
                b'z' as u32,
            )]))),
            None,
            ModeSet::from_modes([root]),
            loc(),
            loc(),
        )
        .unwrap();
    engine.section_finished(loc()).unwrap();
    engine.check().unwrap();
    let automaton = engine.build().unwrap();

    // Walk "if": start -> 'i' -> 'f'.
    let start = automaton.start_states[0];
    let mut cur = start;
    for ch in "if".chars() {
        let state = automaton.states.iter().find(|s| s.index == cur).unwrap();
        let edge = state
            .edges
            .iter()
            .find(|e| e.first <= ch as u32 && ch as u32 <= e.last)
            .unwrap();
        cur = edge.target;
    }
    let after_if = automaton.states.iter().find(|s| s.index == cur).unwrap();
    assert_eq!(after_if.completed_match, Some(if_id));

    // Walk "ifx": one more transition from the "if" state, on the IDENT class.
    let state = automaton.states.iter().find(|s| s.index == cur).unwrap();
    let edge = state
        .edges
        .iter()
        .find(|e| e.first <= b'x' as u32 && b'x' as u32 <= e.last)
        .unwrap();
    let after_ifx = automaton
        .states
        .iter()
        .find(|s| s.index == edge.target)
        .unwrap();
    assert_eq!(after_ifx.completed_match, Some(ident_id));
}

/// S3: overlapping declarations `[a-f]` and `[c-z]` determinize into three disjoint intervals,
/// the middle one a superstate where the first-declared token wins.
#[test]
fn s3_overlapping_charclasses_determinize_disjoint() {
    init_log();
    let mut engine = Engine::new(EngineConfig::new());
    let root = engine.mode_lookup("INITIAL");
    engine.rule_stanza_mode_refs_add(root);
    let t0 = engine
        .add_tokendef(
            "T0",
            AnchoredPattern::unanchored(Pattern::charclass(vec![CharRange::new(
                b'a' as u32,
                b'f' as u32,
            )])),
            None,
            ModeSet::from_modes([root]),
            loc(),
            loc(),
        )
        .unwrap();
    let t1 = engine
        .add_tokendef(
            "T1",
            AnchoredPattern::unanchored(Pattern::charclass(vec![CharRange::new(
                b'c' as u32,
                b'z' as u32,
            )])),
            None,
            ModeSet::from_modes([root]),
            loc(),
            loc(),
        )
        .unwrap();
    engine.section_finished(loc()).unwrap();
    engine.check().unwrap();
    let automaton = engine.build().unwrap();

    let start = automaton.start_states[0];
    let start_state = automaton.states.iter().find(|s| s.index == start).unwrap();
    let mut edges = start_state.edges.clone();
    edges.sort_by_key(|e| e.first);
    assert_eq!(edges.len(), 3);

    assert_eq!(edges[0].first, b'a' as u32);
    assert_eq!(edges[0].last, b'b' as u32);
    assert_eq!(edges[1].first, b'c' as u32);
    assert_eq!(edges[1].last, b'f' as u32);
    assert_eq!(edges[2].first, b'g' as u32);
    assert_eq!(edges[2].last, b'z' as u32);

    let ab_target = automaton
        .states
        .iter()
        .find(|s| s.index == edges[0].target)
        .unwrap();
    assert_eq!(ab_target.completed_match, Some(t0));

    let cf_target = automaton
        .states
        .iter()
        .find(|s| s.index == edges[1].target)
        .unwrap();
    assert_eq!(cf_target.completed_match, Some(t0));

    let gz_target = automaton
        .states
        .iter()
        .find(|s| s.index == edges[2].target)
        .unwrap();
    assert_eq!(gz_target.completed_match, Some(t1));
}

/// S4: `a*` can match the empty string and must be rejected at admission.
#[test]
fn s4_star_pattern_rejected_as_emptiable() {
    init_log();
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
    assert!(err.to_string().contains("pattern can be empty"));
}

/// S5: `^abc$` produces a tail state whose sole completion slot is `completed_match_beol`.
#[test]
fn s5_both_anchors_set_beol_only() {
    init_log();
    let mut engine = Engine::new(EngineConfig::new());
    let root = engine.mode_lookup("INITIAL");
    engine.rule_stanza_mode_refs_add(root);
    engine
        .add_tokendef(
            "LIT",
            AnchoredPattern::new(Pattern::literal_str("abc"), true, true),
            None,
            ModeSet::from_modes([root]),
            loc(),
            loc(),
        )
        .unwrap();
    engine.section_finished(loc()).unwrap();
    engine.check().unwrap();
    let automaton = engine.build().unwrap();

    let completing: Vec<_> = automaton
        .states
        .iter()
        .filter(|s| {
            s.completed_match.is_some()
                || s.completed_match_bol.is_some()
                || s.completed_match_eol.is_some()
                || s.completed_match_beol.is_some()
        })
        .collect();
    assert_eq!(completing.len(), 1);
    let tail = completing[0];
    assert_eq!(tail.completed_match, None);
    assert_eq!(tail.completed_match_bol, None);
    assert_eq!(tail.completed_match_eol, None);
    assert_eq!(tail.completed_match_beol, Some(TokenDefID::new(0)));
}

/// S6: an `error` action combined with `mode-push` is rejected at admission.
#[test]
fn s6_error_action_combined_with_mode_push_rejected() {
    init_log();
    let mut engine = Engine::new(EngineConfig::new());
    let root = engine.mode_lookup("INITIAL");
    let other = engine.mode_lookup("OTHER");
    engine.rule_stanza_mode_refs_add(root);
    engine.rule_stanza_mode_refs_add(other);

    let mut action = lexmach::Action::error("bad token");
    action.merge(lexmach::Action::mode_push(other), loc()).unwrap();

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
    assert!(err.to_string().contains("cannot combine error actions"));
}

/// A mode declared with a rule stanza but never reached by any `mode-push`/`mode-change` chain
/// from mode 0 produces a warning, not a failure.
#[test]
fn unreachable_mode_is_a_warning_not_a_failure() {
    init_log();
    let mut engine = Engine::new(EngineConfig::new());
    let root = engine.mode_lookup("INITIAL");
    let dead = engine.mode_lookup("DEAD");
    engine.rule_stanza_mode_refs_add(root);
    engine.rule_stanza_mode_refs_add(dead);
    engine
        .add_tokendef(
            "LIT",
            AnchoredPattern::unanchored(Pattern::literal_str("x")),
            None,
            ModeSet::from_modes([root]),
            loc(),
            loc(),
        )
        .unwrap();
    engine.section_finished(loc()).unwrap();
    let warnings = engine.check().unwrap();
    assert_eq!(warnings.len(), 1);
    assert!(warnings[0].message.contains("DEAD"));
    // Warnings do not prevent a subsequent build.
    engine.build().unwrap();
}

/// Zero token definitions at section close is a hard failure.
#[test]
fn section_finished_with_no_tokens_fails() {
    init_log();
    let engine = Engine::new(EngineConfig::new());
    assert!(engine.section_finished(loc()).is_err());
}
