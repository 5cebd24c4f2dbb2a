use std::fmt;

use crate::position::Pos;

/// Token classification for Flamingo source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    // Tag punctuation
    LeftChevron,
    RightChevron,
    Slash,

    // Names and attribute values
    Ident,
    Assign,
    Quote,
    Text,

    // Raw code block
    CodeFence,
    RawCode,

    // Scanning halted; literal carries the message
    Error,

    EndOfInput,
}

impl TokenKind {
    /// True for the kinds after which the lexer produces nothing further.
    pub fn is_terminal(self) -> bool {
        matches!(self, TokenKind::Error | TokenKind::EndOfInput)
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// A token produced by the Flamingo lexer.
///
/// `literal` is the exact matched source text, except for `Error` tokens
/// where it holds the diagnostic message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub pos: Pos,
    pub literal: String,
}

impl Token {
    pub fn new(kind: TokenKind, pos: Pos, literal: impl Into<String>) -> Self {
        Self {
            kind,
            pos,
            literal: literal.into(),
        }
    }

    /// Position one past the last byte of the token.
    pub fn end(&self) -> Pos {
        match self.kind {
            TokenKind::Error => self.pos,
            _ => self.pos + self.literal.len(),
        }
    }

    pub fn is(&self, kind: TokenKind) -> bool {
        self.kind == kind
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            TokenKind::EndOfInput => write!(f, "EndOfInput"),
            TokenKind::Error => write!(f, "Error({})", self.literal),
            kind if self.literal.chars().count() > 10 => {
                let short: String = self.literal.chars().take(10).collect();
                write!(f, "{kind} {short:?}...")
            }
            kind => write!(f, "{kind} {:?}", self.literal),
        }
    }
}
