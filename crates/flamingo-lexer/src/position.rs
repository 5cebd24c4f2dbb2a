use std::fmt;
use std::ops::{Add, Sub};

/// A byte offset into a single source file.
///
/// Positions are only comparable within the file that produced them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Pos(usize);

impl Pos {
    pub const fn new(offset: usize) -> Self {
        Self(offset)
    }

    pub const fn offset(self) -> usize {
        self.0
    }
}

impl Add<usize> for Pos {
    type Output = Pos;

    fn add(self, rhs: usize) -> Pos {
        Pos(self.0 + rhs)
    }
}

impl Sub for Pos {
    type Output = usize;

    fn sub(self, rhs: Pos) -> usize {
        self.0 - rhs.0
    }
}

impl fmt::Display for Pos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A 1-based line and column. Columns count bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Location {
    pub line: usize,
    pub column: usize,
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// Line table for one input file.
///
/// Line starts are appended while the lexer consumes newlines, so a
/// position can be resolved to a line and column without rescanning.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    name: String,
    len: usize,
    lines: Vec<usize>,
}

impl SourceFile {
    pub fn new(name: impl Into<String>, len: usize) -> Self {
        Self {
            name: name.into(),
            len,
            lines: vec![0],
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Number of lines discovered so far.
    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    /// Record that a new line begins at `offset`.
    ///
    /// Offsets must arrive in increasing order; an offset at or before the
    /// last recorded line start is ignored.
    pub fn add_line(&mut self, offset: usize) {
        let last = self.lines.last().copied().unwrap_or(0);
        if offset > last && offset <= self.len {
            self.lines.push(offset);
        }
    }

    /// Resolve a position to its line and column.
    pub fn location(&self, pos: Pos) -> Location {
        let offset = pos.offset().min(self.len);
        let line = match self.lines.binary_search(&offset) {
            Ok(idx) => idx,
            Err(idx) => idx - 1,
        };
        Location {
            line: line + 1,
            column: offset - self.lines[line] + 1,
        }
    }
}
