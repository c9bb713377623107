//! Source provenance for parsed nodes.

use std::fmt;
use std::hash::{Hash, Hasher};

use crate::lexer::Token;
use crate::source::{Position, Source};

// ============================================================================
// SPAN
// ============================================================================

/// The token range `[begin, end)` a node was parsed from, plus the source
/// that owns those tokens.
///
/// `begin <= end` always holds: an `end` before `begin` is clamped to an
/// empty span at `begin`.
#[derive(Clone, Copy)]
pub struct Span<'src> {
    begin: Position,
    end: Position,
    owner: &'src Source,
}

impl<'src> Span<'src> {
    pub(crate) fn new(begin: Position, end: Position, owner: &'src Source) -> Self {
        Self {
            begin,
            end: end.max(begin),
            owner,
        }
    }

    pub fn begin(&self) -> Position {
        self.begin
    }

    pub fn end(&self) -> Position {
        self.end
    }

    pub fn filename(&self) -> &'src str {
        self.owner.filename()
    }

    pub fn is_empty(&self) -> bool {
        self.begin == self.end
    }

    /// Number of tokens covered, comments included.
    pub fn len(&self) -> usize {
        self.end.index() - self.begin.index()
    }

    /// The covered tokens, comments included.
    pub fn tokens(&self) -> &'src [Token] {
        self.owner.slice(self.begin, self.end)
    }

    /// The covered source text; see [`crate::lexer::to_text`] for `dedent`.
    pub fn text(&self, dedent: isize) -> String {
        self.owner.to_text(self.tokens(), dedent)
    }
}

impl PartialEq for Span<'_> {
    fn eq(&self, other: &Self) -> bool {
        self.begin == other.begin && self.end == other.end && std::ptr::eq(self.owner, other.owner)
    }
}

impl Eq for Span<'_> {}

impl fmt::Debug for Span<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<{}: {}-{}>", self.owner.filename(), self.begin, self.end)
    }
}

// ============================================================================
// PROVENANCE
// ============================================================================

/// The optional span slot every node embeds.
///
/// Empty means the node was built programmatically or is an intermediate the
/// parser assembled without running it through a rule wrapper. A provenance
/// always compares equal and hashes to nothing, so nodes that derive
/// `PartialEq`/`Hash` compare by content only.
#[derive(Clone, Copy, Default)]
pub struct Provenance<'src>(Option<Span<'src>>);

impl<'src> Provenance<'src> {
    /// A provenance with no span.
    pub const fn none() -> Self {
        Provenance(None)
    }

    pub fn get(&self) -> Option<Span<'src>> {
        self.0
    }

    /// Attach `span`, replacing any previous one.
    pub fn set(&mut self, span: Span<'src>) {
        self.0 = Some(span);
    }

    pub fn clear(&mut self) {
        self.0 = None;
    }
}

impl<'src> From<Span<'src>> for Provenance<'src> {
    fn from(span: Span<'src>) -> Self {
        Provenance(Some(span))
    }
}

impl PartialEq for Provenance<'_> {
    fn eq(&self, _other: &Self) -> bool {
        true
    }
}

impl Eq for Provenance<'_> {}

impl Hash for Provenance<'_> {
    fn hash<H: Hasher>(&self, _state: &mut H) {}
}

impl fmt::Debug for Provenance<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.0 {
            Some(span) => span.fmt(f),
            None => f.write_str("<synthetic>"),
        }
    }
}
