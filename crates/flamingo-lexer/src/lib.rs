//! Flamingo Lexer
//!
//! Turns `.flamingo` component source into tokens on demand.
//! Scanning is a small state machine (text, tag, attribute, plus an optional
//! leading `---` fenced code block). Malformed input yields a single `Error`
//! token and scanning stops; the lexer never fails any other way.
//!
//! # Example
//!
//! ```
//! use flamingo_lexer::{Lexer, TokenKind};
//!
//! let mut lexer = Lexer::new("<div>mino</div>");
//! assert_eq!(lexer.next_token().kind, TokenKind::LeftChevron);
//! assert_eq!(lexer.next_token().literal, "div");
//! ```

pub mod lexer;
pub mod position;
pub mod token;

pub use lexer::{Lexer, State};
pub use position::{Location, Pos, SourceFile};
pub use token::{Token, TokenKind};
