//! Flamingo Parser
//!
//! Parses component markup into a positioned AST and provides a generic
//! pre-order walker over it. Parsing never aborts: problems are collected
//! as [`ParseError`]s next to a best-effort tree.
//!
//! ```
//! let (file, errors) = flamingo_parser::parse("<div>mino</div>");
//! assert!(errors.is_empty());
//! assert_eq!(file.fragment.nodes.len(), 1);
//! ```

pub mod ast;
pub mod parser;
pub mod walk;

pub use ast::{File, Node, RenderNode};
pub use parser::Parser;
pub use walk::{inspect, walk, Visit, Visitor};

use flamingo_lexer::Lexer;

/// Parser error with position information.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Parse error at line {line}, column {column}: {message}")]
pub struct ParseError {
    pub message: String,
    pub line: usize,
    pub column: usize,
}

/// Parse anonymous source text.
pub fn parse(source: &str) -> (File, Vec<ParseError>) {
    Parser::new(Lexer::new(source)).parse()
}

/// Parse source text read from `name`.
pub fn parse_file(name: &str, source: &str) -> (File, Vec<ParseError>) {
    Parser::new(Lexer::new(source).with_file_name(name)).parse()
}
