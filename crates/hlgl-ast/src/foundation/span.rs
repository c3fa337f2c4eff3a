//! Source location tracking for diagnostics.
//!
//! Locations are compact value types attached to every IR node. The parser
//! produces them; the IR layer only propagates and occasionally merges them.
//!
//! # Design
//!
//! - `Span` holds a file id, a 1-based line number and a byte range.
//! - A span with line 0 is "unknown". Factory methods that receive an unknown
//!   span fall back to the span of one of their operands, so nodes synthesized
//!   far from the source text still point at something useful.

use serde::{Deserialize, Serialize};

/// Compact source location reference.
///
/// Points to a byte range in a source file with a cached line number.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Span {
    /// Index of the source file in the driver's file table
    pub file_id: u16,
    /// 1-based line number; 0 means the location is unknown
    pub line: u32,
    /// Byte offset of the start position
    pub start: u32,
    /// Byte offset of the end position (exclusive)
    pub end: u32,
}

impl Span {
    /// Create a new span.
    pub fn new(file_id: u16, line: u32, start: u32, end: u32) -> Self {
        Self {
            file_id,
            line,
            start,
            end,
        }
    }

    /// Create a span that carries only a line number.
    pub fn at_line(line: u32) -> Self {
        Self {
            file_id: 0,
            line,
            start: 0,
            end: 0,
        }
    }

    /// The unknown location.
    pub fn unknown() -> Self {
        Self::default()
    }

    /// True when no real location is attached.
    pub fn is_unknown(&self) -> bool {
        self.line == 0
    }

    /// Return `self`, or `other` when `self` is unknown.
    ///
    /// This is the fallback rule used throughout the node factories.
    pub fn or(self, other: Span) -> Span {
        if self.is_unknown() { other } else { self }
    }

    /// Merge two spans into one covering both.
    ///
    /// Spans from different files cannot be merged; the left span wins.
    pub fn merge(&self, other: &Span) -> Span {
        if self.file_id != other.file_id || other.is_unknown() {
            return *self;
        }
        if self.is_unknown() {
            return *other;
        }
        Span {
            file_id: self.file_id,
            line: self.line.min(other.line),
            start: self.start.min(other.start),
            end: self.end.max(other.end),
        }
    }
}
