use thiserror::Error;

/// The result type for the `lexmach` crate.
pub type Result<T> = std::result::Result<T, EngineError>;

/// A location in the grammar source that a diagnostic can be anchored to.
///
/// The engine never reads source text itself; the grammar parser hands in whatever location it
/// already tracks, and the engine only carries it along for reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SourceLocation {
    /// One-based line number.
    pub line: u32,
    /// One-based column number.
    pub column: u32,
}

impl SourceLocation {
    /// Create a new source location.
    pub fn new(line: u32, column: u32) -> Self {
        Self { line, column }
    }
}

impl std::fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// The error type for the `lexmach` crate.
#[derive(Error, Debug)]
pub struct EngineError {
    /// The source of the error.
    pub source: Box<EngineErrorKind>,
}

impl EngineError {
    /// Create a new `EngineError`.
    pub fn new(kind: EngineErrorKind) -> Self {
        EngineError {
            source: Box::new(kind),
        }
    }
}

impl std::fmt::Display for EngineError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.source)
    }
}

/// The error kind type. Every admission-time, check-time and build-time diagnostic the engine
/// can raise is a variant here; see the doc comment on each for the phase it belongs to.
#[derive(Error, Debug)]
pub enum EngineErrorKind {
    /// A LITERAL pattern with an empty byte sequence was admitted.
    #[error("{0}: empty string literal pattern")]
    EmptyLiteral(SourceLocation),

    /// A pattern that is not LITERAL/CHARCLASS can match the empty string.
    #[error("{0}: pattern can be empty")]
    PatternCanBeEmpty(SourceLocation),

    /// More than one `error` action was combined onto the same token definition.
    #[error("{0}: multiple error actions")]
    MultipleErrorActions(SourceLocation),

    /// More than one of `{mode-change, mode-pop, mode-push}` was combined onto the same token
    /// definition.
    #[error("{0}: multiple mode actions")]
    MultipleModeActions(SourceLocation),

    /// An `error` action was combined with any other action.
    #[error("{0}: cannot combine error actions with other actions")]
    ErrorCombinedWithOtherActions(SourceLocation),

    /// `expect-mode-pop` was specified without `mode-push`.
    #[error("{0}: expect-mode-pop can only be used along with mode-push")]
    ExpectModePopWithoutModePush(SourceLocation),

    /// An action referenced a mode that was never declared with a rule stanza.
    #[error("{0}: unrecognized mode '{1}'")]
    UnrecognizedMode(SourceLocation, String),

    /// No token definitions were admitted before the token section was closed.
    #[error("{0}: lexer has no tokens")]
    NoTokens(SourceLocation),

    /// An invariant the engine relies on internally was violated; this is a logic error in the
    /// engine itself, never something a grammar author can trigger.
    #[error("internal error: {0}")]
    Internal(String),
}

/// Construct an [`EngineError`] with an [`EngineErrorKind::Internal`] variant, with a message
/// built the same way `format!` would build one.
macro_rules! internal {
    ($($arg:tt)*) => {
        $crate::errors::EngineError::new($crate::errors::EngineErrorKind::Internal(format!($($arg)*)))
    };
}
pub(crate) use internal;

/// A non-fatal notice produced by [`crate::Engine::check`]. Unlike [`EngineError`], collecting
/// one of these does not mark the overall run as failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Warning {
    /// Where the warning applies.
    pub location: SourceLocation,
    /// The human-readable message.
    pub message: String,
}

impl std::fmt::Display for Warning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.location, self.message)
    }
}
