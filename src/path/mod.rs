//! Memory path expressions
//!
//! Parses dotted/indexed addresses such as `a.b[2].c` into an ordered
//! sequence of access steps consumed by the memory contexts. Path syntax is
//! deliberately literal-only: no arithmetic or sub-expressions inside
//! brackets, that capability belongs to the external expression grammar.

#![warn(missing_docs)]

mod parser;

use std::fmt;
use std::str::FromStr;

use smallvec::SmallVec;
use thiserror::Error;

/// Result type for path parsing.
pub type PathResult<T> = Result<T, PathError>;

/// Errors raised by [`PathExpr::parse`] for malformed path strings.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PathError {
    /// The path string was empty.
    #[error("empty path")]
    Empty,

    /// The path began with an index; an index must follow an identifier.
    #[error("path cannot begin with an index (offset {offset})")]
    LeadingIndex {
        /// Byte offset of the opening bracket.
        offset: usize,
    },

    /// An identifier segment between two dots (or at the end) was empty.
    #[error("empty segment (offset {offset})")]
    EmptySegment {
        /// Byte offset where the segment was expected.
        offset: usize,
    },

    /// An opening bracket was never closed, or a stray `]` appeared.
    #[error("unbalanced bracket (offset {offset})")]
    UnbalancedBracket {
        /// Byte offset of the offending bracket.
        offset: usize,
    },

    /// A bracket pair contained nothing.
    #[error("empty index (offset {offset})")]
    EmptyIndex {
        /// Byte offset of the opening bracket.
        offset: usize,
    },

    /// A quoted index key was never terminated.
    #[error("unterminated quoted key (offset {offset})")]
    UnterminatedQuote {
        /// Byte offset of the opening quote.
        offset: usize,
    },

    /// A character that fits no production was encountered.
    #[error("unexpected character {found:?} (offset {offset})")]
    UnexpectedChar {
        /// The offending character.
        found: char,
        /// Byte offset of the character.
        offset: usize,
    },
}

/// A single access step of a path, applied left to right.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    /// A named field looked up in a mapping node.
    Field(String),
    /// An integer position in a sequence node (or a stringified mapping key).
    Index(i64),
    /// A string key looked up in a mapping node.
    Key(String),
}

/// A parsed, immutable path expression.
///
/// Segment order is resolution order. Paths are short in practice, so the
/// segment list is inline up to four steps.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathExpr {
    segments: SmallVec<[Segment; 4]>,
}

impl PathExpr {
    /// Parse a raw path string such as `a.b[2].c` or `items['first name']`.
    pub fn parse(input: &str) -> PathResult<Self> {
        parser::parse(input).map(|segments| Self { segments })
    }

    /// The ordered access steps.
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }
}

impl FromStr for PathExpr {
    type Err = PathError;

    fn from_str(s: &str) -> PathResult<Self> {
        Self::parse(s)
    }
}

impl fmt::Display for PathExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, segment) in self.segments.iter().enumerate() {
            match segment {
                Segment::Field(name) => {
                    if i > 0 {
                        f.write_str(".")?;
                    }
                    f.write_str(name)?;
                }
                Segment::Index(index) => write!(f, "[{index}]")?,
                Segment::Key(key) => {
                    write!(f, "['{}']", key.replace('\\', "\\\\").replace('\'', "\\'"))?;
                }
            }
        }
        Ok(())
    }
}
