//! Module with actions and the token-definition table (component C): the ordered list of
//! `(symbol, anchored pattern, mode set, action)` tuples that is the source of truth for match
//! priority.

use crate::errors::{EngineError, EngineErrorKind, Result, SourceLocation};
use crate::ids::{ModeID, TokenDefID};
use crate::mode::ModeSet;
use crate::pattern::AnchoredPattern;

/// A single action fragment or the fully merged action record for a token definition. The
/// grammar admits actions incrementally (e.g. `skip`, then separately `mode-push X`); [`merge`]
/// folds one fragment into the accumulated record, checking the exclusivity invariants as it
/// goes.
///
/// [`merge`]: Action::merge
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Action {
    /// Skip the matched token: do not emit it to the parser.
    pub skip: bool,
    /// Pop the current mode off the mode stack.
    pub mode_pop: bool,
    /// Require a later `mode-pop` before this rule's mode may itself be popped. Only meaningful
    /// combined with `mode_push`.
    pub expect_mode_pop: bool,
    /// Switch to a different mode without pushing (no corresponding pop is implied).
    pub mode_change: Option<ModeID>,
    /// Push a new mode onto the mode stack.
    pub mode_push: Option<ModeID>,
    /// Fail lexing with the given message.
    pub error: Option<String>,
}

impl Action {
    /// An action fragment consisting only of `skip`.
    pub fn skip() -> Self {
        Self {
            skip: true,
            ..Default::default()
        }
    }

    /// An action fragment consisting only of `mode-pop`.
    pub fn mode_pop() -> Self {
        Self {
            mode_pop: true,
            ..Default::default()
        }
    }

    /// An action fragment consisting only of `expect-mode-pop`.
    pub fn expect_mode_pop() -> Self {
        Self {
            expect_mode_pop: true,
            ..Default::default()
        }
    }

    /// An action fragment consisting only of `mode-change(target)`.
    pub fn mode_change(target: ModeID) -> Self {
        Self {
            mode_change: Some(target),
            ..Default::default()
        }
    }

    /// An action fragment consisting only of `mode-push(target)`.
    pub fn mode_push(target: ModeID) -> Self {
        Self {
            mode_push: Some(target),
            ..Default::default()
        }
    }

    /// An action fragment consisting only of `error(message)`.
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            error: Some(message.into()),
            ..Default::default()
        }
    }

    /// Whether any of the three mode-transition fields is set.
    fn has_mode_transition(&self) -> bool {
        self.mode_change.is_some() || self.mode_pop || self.mode_push.is_some()
    }

    /// Fold `other` into `self`, field by field, reporting a conflict on the first field whose
    /// invariant the merge would violate. Each of the five diagnosable fields is checked
    /// independently — see `§4.H` for the exact rule per field.
    pub fn merge(&mut self, other: Action, loc: SourceLocation) -> Result<()> {
        if let Some(message) = other.error {
            if self.error.is_some() {
                return Err(EngineError::new(EngineErrorKind::MultipleErrorActions(loc)));
            }
            self.error = Some(message);
        }
        if let Some(target) = other.mode_change {
            if self.has_mode_transition() {
                return Err(EngineError::new(EngineErrorKind::MultipleModeActions(loc)));
            }
            self.mode_change = Some(target);
        }
        if other.mode_pop {
            if self.has_mode_transition() {
                return Err(EngineError::new(EngineErrorKind::MultipleModeActions(loc)));
            }
            self.mode_pop = true;
        }
        if let Some(target) = other.mode_push {
            if self.has_mode_transition() {
                return Err(EngineError::new(EngineErrorKind::MultipleModeActions(loc)));
            }
            self.mode_push = Some(target);
        }
        if other.expect_mode_pop {
            self.expect_mode_pop = true;
        }
        if other.skip {
            self.skip = true;
        }
        Ok(())
    }

    /// Validate the whole-record invariants that a merge alone cannot enforce: `error` must be
    /// exclusive of every other field, and `expect-mode-pop` requires `mode-push`.
    pub fn validate(&self, loc: SourceLocation) -> Result<()> {
        if self.error.is_some()
            && (self.has_mode_transition() || self.expect_mode_pop || self.skip)
        {
            return Err(EngineError::new(
                EngineErrorKind::ErrorCombinedWithOtherActions(loc),
            ));
        }
        if self.expect_mode_pop && self.mode_push.is_none() {
            return Err(EngineError::new(
                EngineErrorKind::ExpectModePopWithoutModePush(loc),
            ));
        }
        Ok(())
    }
}

/// One admitted token definition. The field order mirrors the tuple named in the data model:
/// `(symbol, anchored pattern, action?, mode set, source location)`.
#[derive(Debug, Clone)]
pub struct TokenDef {
    /// The token's declared name.
    pub symbol: String,
    /// The pattern this definition matches, plus its line anchors.
    pub anchored_pattern: AnchoredPattern,
    /// The (possibly absent) action triggered on a match.
    pub action: Option<Action>,
    /// The modes in which this definition is a candidate.
    pub modes: ModeSet,
    /// Where the symbol was declared.
    pub loc_symbol: SourceLocation,
    /// Where the pattern was declared.
    pub loc_pattern: SourceLocation,
}

/// The ordered table of admitted token definitions. Declaration order is preserved exactly — it
/// is the table's whole reason for existing: a definition's index doubles as its match priority.
#[derive(Debug, Clone, Default)]
pub struct TokenDefTable {
    defs: Vec<TokenDef>,
}

impl TokenDefTable {
    /// An empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a definition, returning the index it was admitted at.
    pub fn push(&mut self, def: TokenDef) -> TokenDefID {
        let id = TokenDefID::new(self.defs.len());
        self.defs.push(def);
        id
    }

    /// Look up a definition by its index.
    pub fn get(&self, id: TokenDefID) -> &TokenDef {
        &self.defs[id.as_usize()]
    }

    /// Iterate definitions in declaration order, paired with their index.
    pub fn iter(&self) -> impl Iterator<Item = (TokenDefID, &TokenDef)> {
        self.defs
            .iter()
            .enumerate()
            .map(|(i, d)| (TokenDefID::new(i), d))
    }

    /// Number of admitted definitions.
    pub fn len(&self) -> usize {
        self.defs.len()
    }

    /// Whether no definitions have been admitted.
    pub fn is_empty(&self) -> bool {
        self.defs.is_empty()
    }
}
