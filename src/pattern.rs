//! Module with the pattern AST and its methods: the immutable tree every token definition's
//! anchored pattern is built from (component A).

/// The largest code point a pattern may reference; one below the conventional Unicode ceiling so
/// that `LEX_CHAR_MAX + 1` never overflows an edge boundary computation.
pub const LEX_CHAR_MAX: u32 = 0x10_FFFD;

/// An inclusive code-point interval. The atomic label on every NFA/DFA edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CharRange {
    /// First code point in the interval, inclusive.
    pub first: u32,
    /// Last code point in the interval, inclusive.
    pub last: u32,
}

impl CharRange {
    /// Create a new interval. `first` must be `<= last`.
    pub fn new(first: u32, last: u32) -> Self {
        debug_assert!(first <= last);
        Self { first, last }
    }

    /// Create a single-code-point interval.
    pub fn single(c: u32) -> Self {
        Self::new(c, c)
    }

    /// Whether `c` lies within this interval.
    pub fn contains(&self, c: u32) -> bool {
        self.first <= c && c <= self.last
    }
}

impl std::fmt::Display for CharRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.first == self.last {
            write!(f, "'{}'", EscapedCodePoint::new(self.first, true))
        } else {
            write!(
                f,
                "'{}'-'{}'",
                EscapedCodePoint::new(self.first, true),
                EscapedCodePoint::new(self.last, true)
            )
        }
    }
}

/// A pattern node. Patterns are trees; a node owns its children and, for `CharClass`, its
/// interval buffer.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Pattern {
    /// A literal sequence of code points, matched back to back.
    Literal(Vec<u32>),
    /// Matches any code point except LF and CR.
    Dot,
    /// A set of code-point intervals, optionally inverted.
    CharClass {
        /// The intervals as declared; not coalesced, may overlap.
        ranges: Vec<CharRange>,
        /// Whether the class should be read as its complement.
        inverted: bool,
    },
    /// Concatenation of two patterns.
    Sequence(Box<Pattern>, Box<Pattern>),
    /// Zero or more repetitions.
    Star(Box<Pattern>),
    /// One or more repetitions.
    Plus(Box<Pattern>),
    /// Zero or one repetition.
    Optional(Box<Pattern>),
    /// Alternation between two patterns.
    Alternate(Box<Pattern>, Box<Pattern>),
}

impl Pattern {
    /// Create a literal pattern from a sequence of code points. A literal with no code points is
    /// a valid (if unusual) AST node — whether it is an admissible token definition is decided by
    /// the action validator, not here.
    pub fn literal(codepoints: impl Into<Vec<u32>>) -> Self {
        Pattern::Literal(codepoints.into())
    }

    /// Create a literal pattern from a `str`, decoding it to code points.
    pub fn literal_str(s: &str) -> Self {
        Pattern::Literal(s.chars().map(|c| c as u32).collect())
    }

    /// The `.` pattern.
    pub fn dot() -> Self {
        Pattern::Dot
    }

    /// Create a (non-inverted) character class from the given ranges. Ranges are stored exactly
    /// as given — not sorted, not coalesced.
    pub fn charclass(ranges: Vec<CharRange>) -> Self {
        Pattern::CharClass {
            ranges,
            inverted: false,
        }
    }

    /// Append an interval to a `CharClass` pattern in place. Panics if called on any other kind —
    /// this is a builder helper only ever invoked by code that already knows it is extending a
    /// char class.
    pub fn extend_charclass(&mut self, lo: u32, hi: u32) {
        match self {
            Pattern::CharClass { ranges, .. } => ranges.push(CharRange::new(lo, hi)),
            _ => panic!("extend_charclass called on a non-CharClass pattern"),
        }
    }

    /// Produce the complement of a `CharClass` pattern: sort its intervals by start, then walk
    /// them emitting the gaps up to [`LEX_CHAR_MAX`]. The result is not guaranteed minimal when
    /// the input intervals overlap — that is fine, the NFA builder emits one edge per interval
    /// and the determinizer resolves any resulting overlap.
    pub fn invert_charclass(&self) -> Self {
        let ranges = match self {
            Pattern::CharClass { ranges, inverted } => {
                if *inverted {
                    // Double inversion: invert the already-inverted set by inverting its
                    // complement once more, rather than special-casing — re-use the same walk.
                    let plain = Pattern::CharClass {
                        ranges: ranges.clone(),
                        inverted: false,
                    };
                    return plain.invert_charclass().invert_charclass();
                }
                ranges
            }
            _ => panic!("invert_charclass called on a non-CharClass pattern"),
        };
        let mut sorted = ranges.clone();
        // A correct comparator: order by start, then by end. (The original source's comparator
        // returned -1 for both the less-than and greater-than cases; this port does not carry
        // that bug forward.)
        sorted.sort_by(|a, b| a.first.cmp(&b.first).then(a.last.cmp(&b.last)));
        let mut complement = Vec::new();
        let mut next_lo: u32 = 0;
        for r in &sorted {
            if r.first > next_lo {
                complement.push(CharRange::new(next_lo, r.first - 1));
            }
            if r.last >= next_lo {
                next_lo = r.last.saturating_add(1);
            }
        }
        if next_lo <= LEX_CHAR_MAX {
            complement.push(CharRange::new(next_lo, LEX_CHAR_MAX));
        }
        Pattern::CharClass {
            ranges: complement,
            inverted: false,
        }
    }

    /// Concatenate two patterns.
    pub fn sequence(a: Pattern, b: Pattern) -> Self {
        Pattern::Sequence(Box::new(a), Box::new(b))
    }

    /// Zero-or-more repetition.
    pub fn star(p: Pattern) -> Self {
        Pattern::Star(Box::new(p))
    }

    /// One-or-more repetition.
    pub fn plus(p: Pattern) -> Self {
        Pattern::Plus(Box::new(p))
    }

    /// Zero-or-one repetition.
    pub fn optional(p: Pattern) -> Self {
        Pattern::Optional(Box::new(p))
    }

    /// Alternation between two patterns.
    pub fn alternate(a: Pattern, b: Pattern) -> Self {
        Pattern::Alternate(Box::new(a), Box::new(b))
    }

    /// The intervals this `CharClass` matches, resolving inversion if set. Panics on any other
    /// kind — only the NFA builder calls this, and only on a `CharClass` node.
    pub(crate) fn resolved_ranges(&self) -> Vec<CharRange> {
        match self {
            Pattern::CharClass { ranges, inverted } => {
                if *inverted {
                    match self.invert_charclass() {
                        Pattern::CharClass { ranges, .. } => ranges,
                        _ => unreachable!(),
                    }
                } else {
                    ranges.clone()
                }
            }
            _ => panic!("resolved_ranges called on a non-CharClass pattern"),
        }
    }

    /// Whether this is a `Literal` with no code points.
    pub fn is_empty_literal(&self) -> bool {
        matches!(self, Pattern::Literal(cps) if cps.is_empty())
    }

    /// Whether this is a `CharClass` with no intervals (before inversion).
    pub fn is_empty_charclass(&self) -> bool {
        matches!(self, Pattern::CharClass { ranges, .. } if ranges.is_empty())
    }

    /// Decide, recursively, whether this pattern can match the empty string.
    pub fn can_be_empty(&self) -> bool {
        match self {
            Pattern::Literal(cps) => cps.is_empty(),
            Pattern::Dot => false,
            Pattern::CharClass { ranges, .. } => ranges.is_empty(),
            Pattern::Sequence(a, b) => a.can_be_empty() && b.can_be_empty(),
            Pattern::Star(_) | Pattern::Optional(_) => true,
            Pattern::Plus(p) => p.can_be_empty(),
            Pattern::Alternate(a, b) => a.can_be_empty() || b.can_be_empty(),
        }
    }

    /// Binding precedence used by the pretty-printer: 1 for atoms and quantified/parenthesized
    /// forms, 2 for sequence, 3 for alternate.
    fn precedence(&self) -> u8 {
        match self {
            Pattern::Sequence(..) => 2,
            Pattern::Alternate(..) => 3,
            _ => 1,
        }
    }

    /// Render this pattern with a caret `<:>` marking the given cursor position (matching the
    /// cursor the NFA builder would have reached at that PPAT), or no caret at all if `cursor` is
    /// `None`.
    pub fn pretty_print_at(&self, cursor: Option<u32>) -> String {
        let mut out = String::new();
        let mut counter: i64 = cursor.map(|c| c as i64).unwrap_or(-1);
        render(self, 3, &mut counter, &mut out);
        out
    }
}

impl std::fmt::Display for Pattern {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.pretty_print_at(None))
    }
}

/// Decrement the caret counter, inserting the caret marker into `out` when it reaches zero. This
/// mirrors the NFA builder's cursor-bump points one-for-one so the marker lands exactly where
/// that PPAT's position would have been recorded.
fn maybe_caret(out: &mut String, counter: &mut i64) {
    if *counter == 0 {
        out.push_str("<:>");
    }
    *counter -= 1;
}

fn render(p: &Pattern, max_allowed_prec: u8, counter: &mut i64, out: &mut String) {
    let needs_parens = p.precedence() > max_allowed_prec;
    if needs_parens {
        out.push('(');
    }
    match p {
        Pattern::Literal(cps) => {
            for &cp in cps {
                maybe_caret(out, counter);
                write!(out, "{}", EscapedCodePoint::new(cp, false)).unwrap();
            }
        }
        Pattern::Dot => {
            maybe_caret(out, counter);
            out.push('.');
        }
        Pattern::CharClass { ranges, inverted } => {
            maybe_caret(out, counter);
            out.push('[');
            if *inverted {
                out.push('^');
            }
            for r in ranges {
                write!(out, "{}", EscapedCodePoint::new(r.first, true)).unwrap();
                if r.first != r.last {
                    out.push('-');
                    write!(out, "{}", EscapedCodePoint::new(r.last, true)).unwrap();
                }
            }
            out.push(']');
        }
        Pattern::Sequence(a, b) => {
            render(a, 2, counter, out);
            render(b, 2, counter, out);
        }
        Pattern::Star(c) => {
            render(c, 1, counter, out);
            maybe_caret(out, counter);
            out.push('*');
        }
        Pattern::Plus(c) => {
            render(c, 1, counter, out);
            maybe_caret(out, counter);
            out.push('+');
        }
        Pattern::Optional(c) => {
            render(c, 1, counter, out);
            maybe_caret(out, counter);
            out.push('?');
        }
        Pattern::Alternate(a, b) => {
            render(a, 3, counter, out);
            maybe_caret(out, counter);
            out.push('|');
            render(b, 3, counter, out);
        }
    }
    if needs_parens {
        out.push(')');
    }
}

use std::fmt::Write;

/// A code point rendered with the engine's C-style escaping rules: printable ASCII literal
/// (escaping `\` and `"`), the common control codes via their named escapes, otherwise `\uXXXX`
/// below `0x10000` or `\UXXXXXXXX` above. Inside a character class, `-` and `]` are escaped too.
pub(crate) struct EscapedCodePoint {
    cp: u32,
    in_charclass: bool,
}

impl EscapedCodePoint {
    pub(crate) fn new(cp: u32, in_charclass: bool) -> Self {
        Self { cp, in_charclass }
    }
}

impl std::fmt::Display for EscapedCodePoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let cp = self.cp;
        match cp {
            0x5C => write!(f, "\\\\"),             // '\'
            0x22 => write!(f, "\\\""),              // '"'
            0x2D if self.in_charclass => write!(f, "\\-"), // '-'
            0x5D if self.in_charclass => write!(f, "\\]"), // ']'
            0x20..=0x7E => write!(f, "{}", char::from_u32(cp).unwrap()),
            0x07 => write!(f, "\\a"),
            0x08 => write!(f, "\\b"),
            0x09 => write!(f, "\\t"),
            0x0A => write!(f, "\\n"),
            0x0B => write!(f, "\\v"),
            0x0C => write!(f, "\\f"),
            0x0D => write!(f, "\\r"),
            _ if cp < 0x10000 => write!(f, "\\u{:04X}", cp),
            _ => write!(f, "\\U{:08X}", cp),
        }
    }
}

/// A pattern plus its optional `^`/`$` line-anchors.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AnchoredPattern {
    /// The underlying pattern tree.
    pub pattern: Pattern,
    /// Whether the pattern is anchored at beginning-of-line (`^`).
    pub bol: bool,
    /// Whether the pattern is anchored at end-of-line (`$`).
    pub eol: bool,
}

impl AnchoredPattern {
    /// Create an anchored pattern.
    pub fn new(pattern: Pattern, bol: bool, eol: bool) -> Self {
        Self { pattern, bol, eol }
    }

    /// Create an anchored pattern with no anchors.
    pub fn unanchored(pattern: Pattern) -> Self {
        Self::new(pattern, false, false)
    }
}

impl std::fmt::Display for AnchoredPattern {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.bol {
            write!(f, "^")?;
        }
        write!(f, "{}", self.pattern)?;
        if self.eol {
            write!(f, "$")?;
        }
        Ok(())
    }
}
