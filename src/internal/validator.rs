//! Action validator (component H): admission-time pattern/action checks plus the mode-reachability
//! fixed point run by `check()`.

use crate::errors::{internal, EngineError, EngineErrorKind, Result, SourceLocation, Warning};
use crate::ids::{ModeID, ROOT_MODE};
use crate::mode::ModeRegistry;
use crate::pattern::Pattern;
use crate::token_def::TokenDefTable;

/// `pattern_can_be_empty` is suppressed for `LITERAL`/`CHARCLASS` at admission: those kinds'
/// empty cases are reported by their own dedicated diagnostics rather than this generic check.
pub(crate) fn validate_pattern_emptiness(pattern: &Pattern, loc: SourceLocation) -> Result<()> {
    let suppressed = matches!(pattern, Pattern::Literal(_) | Pattern::CharClass { .. });
    if !suppressed && pattern.can_be_empty() {
        return Err(EngineError::new(EngineErrorKind::PatternCanBeEmpty(loc)));
    }
    Ok(())
}

/// Build the one-step mode graph: an edge `mode -> target` for every (mode in a definition's mode
/// set) x (that definition's `mode-push`/`mode-change` target), then mark every mode reachable
/// from [`ROOT_MODE`] via a fixed-point traversal.
pub(crate) fn compute_mode_reachability(mode_registry: &mut ModeRegistry, table: &TokenDefTable) {
    let mode_count = mode_registry.len();
    let mut adjacency: Vec<Vec<ModeID>> = vec![Vec::new(); mode_count];
    for (_, def) in table.iter() {
        let Some(action) = &def.action else {
            continue;
        };
        let target = action.mode_change.or(action.mode_push);
        let Some(target) = target else {
            continue;
        };
        for mode in def.modes.iter() {
            adjacency[mode.as_usize()].push(target);
        }
    }

    let mut visited = vec![false; mode_count];
    let mut stack = vec![ROOT_MODE];
    while let Some(m) = stack.pop() {
        if visited[m.as_usize()] {
            continue;
        }
        visited[m.as_usize()] = true;
        for &next in &adjacency[m.as_usize()] {
            if !visited[next.as_usize()] {
                stack.push(next);
            }
        }
    }

    for (i, reachable) in visited.into_iter().enumerate() {
        mode_registry.modes_mut()[i].is_reachable = reachable;
    }
}

/// Run the full `check()` pass: verify every mode an action refers to was declared with a rule
/// stanza (fatal on the first violation found — mirrors `add_tokendef`'s fail-on-first-structural-
/// error admission path), compute mode reachability, then collect a non-fatal warning for every
/// mode that has a rule stanza but mode 0 can never reach.
pub(crate) fn check(
    mode_registry: &mut ModeRegistry,
    table: &TokenDefTable,
) -> Result<Vec<Warning>> {
    for (_, def) in table.iter() {
        for mode in def.modes.iter() {
            if mode.as_usize() >= mode_registry.len() {
                return Err(internal!(
                    "token definition '{}' references mode {} outside the registry (len {})",
                    def.symbol,
                    mode,
                    mode_registry.len()
                ));
            }
        }
        let Some(action) = &def.action else {
            continue;
        };
        for target in [action.mode_change, action.mode_push].into_iter().flatten() {
            if !mode_registry.get(target).has_rule_stanza {
                return Err(EngineError::new(EngineErrorKind::UnrecognizedMode(
                    def.loc_pattern,
                    mode_registry.get(target).name.clone(),
                )));
            }
        }
    }

    compute_mode_reachability(mode_registry, table);

    let warnings = mode_registry
        .modes()
        .iter()
        .filter(|m| m.has_rule_stanza && !m.is_reachable)
        .map(|m| Warning {
            location: SourceLocation::default(),
            message: format!("Mode {} is unreachable", m.name),
        })
        .collect();
    Ok(warnings)
}
