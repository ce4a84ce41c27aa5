//! Human-readable textual dump of a state pool (component I), gated behind a trace flag and
//! emitted through the `log` facade by the engine façade. Also renders the admitted
//! token-definition table, grouped by mode set, for tracing the input to the builder rather than
//! its output.

use std::fmt::Write;

use super::state::StatePool;
use crate::mode::ModeRegistry;
use crate::token_def::{Action, TokenDefTable};

/// Render a full dump of `pool`: a `Start states: ...` header followed by one block per state.
pub(crate) fn dump_state_pool(
    pool: &StatePool,
    mode_registry: &ModeRegistry,
    table: &TokenDefTable,
) -> String {
    let mut out = String::new();

    let starts: Vec<String> = mode_registry
        .modes()
        .iter()
        .filter_map(|m| m.start_state.map(|s| s.to_string()))
        .collect();
    writeln!(out, "Start states: {}", starts.join(", ")).unwrap();
    writeln!(out).unwrap();

    for state in pool.iter() {
        writeln!(out, "=== Lexical state {} ===", state.index).unwrap();
        if !state.is_reachable {
            writeln!(out, "(Unreachable)").unwrap();
            writeln!(out).unwrap();
            continue;
        }

        if let Some(name) = &state.start_for_mode {
            writeln!(out, "Start state for: {name}").unwrap();
        }
        if let Some(t) = state.completed_match {
            writeln!(out, "Completed match: {t}").unwrap();
        }
        if let Some(t) = state.completed_match_bol {
            writeln!(out, "Completed match (beginning of line): {t}").unwrap();
        }
        if let Some(t) = state.completed_match_eol {
            writeln!(out, "Completed match (end of line): {t}").unwrap();
        }
        if let Some(t) = state.completed_match_beol {
            writeln!(out, "Completed match (entire line): {t}").unwrap();
        }

        if !state.ppats.is_empty() {
            writeln!(out, "Partial matches:").unwrap();
            for ppat in &state.ppats {
                let def = table.get(ppat.token_def);
                let rendered = def
                    .anchored_pattern
                    .pattern
                    .pretty_print_at(Some(ppat.position));
                writeln!(
                    out,
                    "    {rendered} (Pattern index #{})",
                    ppat.token_def
                )
                .unwrap();
            }
            writeln!(out).unwrap();
        }

        writeln!(out, "Outgoing edges:").unwrap();
        for edge in &state.edges {
            writeln!(out, "    Consume {} and go to state {}", edge.range, edge.target).unwrap();
        }
        for eps in &state.epsilons {
            writeln!(out, "    Jump to state {eps}").unwrap();
        }
        writeln!(out).unwrap();
    }

    out
}

/// Render a one-line summary of an action's active fields, e.g. `skip, mode-push(COMMENT)`.
fn format_action(action: &Action, mode_registry: &ModeRegistry) -> String {
    let mut parts = Vec::new();
    if let Some(message) = &action.error {
        parts.push(format!("error(\"{message}\")"));
    }
    if action.skip {
        parts.push("skip".to_string());
    }
    if action.mode_pop {
        parts.push("mode-pop".to_string());
    }
    if let Some(target) = action.mode_push {
        parts.push(format!("mode-push({})", mode_registry.get(target).name));
    }
    if let Some(target) = action.mode_change {
        parts.push(format!("mode-change({})", mode_registry.get(target).name));
    }
    if action.expect_mode_pop {
        parts.push("expect-mode-pop".to_string());
    }
    parts.join(", ")
}

/// Render the admitted token-definition table, grouping consecutive definitions that share an
/// identical (set-equal) mode set under one `%in-modes` header.
pub(crate) fn dump_token_defs(table: &TokenDefTable, mode_registry: &ModeRegistry) -> String {
    let mut out = String::new();
    let mut previous_modes: Option<&crate::mode::ModeSet> = None;

    for (id, def) in table.iter() {
        if previous_modes.map(|m| !m.same(&def.modes)).unwrap_or(true) {
            let names: Vec<&str> = def
                .modes
                .iter()
                .map(|m| mode_registry.get(m).name.as_str())
                .collect();
            writeln!(out, "%in-modes {}", names.join(" ")).unwrap();
        }
        previous_modes = Some(&def.modes);

        write!(out, "{}: {}", def.symbol, def.anchored_pattern).unwrap();
        if let Some(action) = &def.action {
            writeln!(out, " -> {}", format_action(action, mode_registry)).unwrap();
        } else {
            writeln!(out).unwrap();
        }
        let _ = id;
    }

    out
}
