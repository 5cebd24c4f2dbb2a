//! Flamingo Code Generator
//!
//! Turns a parsed component into Rust source: one generic function per unit
//! that drives a rendering runtime through four calls.
//!
//! ```text
//! source → parse() → File → Generator::generate() → Rust source
//! ```
//!
//! The runtime trait named by [`CodegenOptions::runtime_path`] is expected
//! to look like:
//!
//! ```text
//! pub trait Renderer {
//!     type Node;
//!     fn new_node(&mut self, tag: &str) -> Self::Node;
//!     fn set_attribute(&mut self, node: &Self::Node, name: &str, value: &str);
//!     fn append_child(&mut self, parent: &Self::Node, child: &Self::Node);
//!     fn render_root(&mut self, node: &Self::Node);
//! }
//! ```

pub mod generator;

pub use generator::Generator;

use flamingo_parser::ParseError;
use log::debug;

/// Attribute that carries an element's text content.
pub const INNER_TEXT: &str = "innerText";

pub const DEFAULT_RUNTIME_PATH: &str = "flamingo_runtime::Renderer";

/// Code generation error.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CodegenError {
    #[error("Codegen error: invalid unit name {0:?}: not a Rust identifier")]
    InvalidUnitName(String),
    #[error("Codegen error: text {text:?} at byte {offset} is outside any element")]
    TextOutsideElement { text: String, offset: usize },
}

/// Failure of the whole source-to-source pipeline.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CompileError {
    #[error("{}", join_errors(.0))]
    Parse(Vec<ParseError>),
    #[error(transparent)]
    Codegen(#[from] CodegenError),
}

fn join_errors(errors: &[ParseError]) -> String {
    errors
        .iter()
        .map(|e| e.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodegenOptions {
    /// Path of the runtime trait, imported at the top of the output.
    pub runtime_path: String,
    /// Emit the "do not edit" banner.
    pub header: bool,
}

impl Default for CodegenOptions {
    fn default() -> Self {
        Self {
            runtime_path: DEFAULT_RUNTIME_PATH.to_string(),
            header: true,
        }
    }
}

impl CodegenOptions {
    /// Last path segment of `runtime_path`, used as the generic bound.
    pub fn trait_name(&self) -> &str {
        self.runtime_path
            .rsplit("::")
            .next()
            .unwrap_or(&self.runtime_path)
    }
}

/// Compile anonymous source text with default options.
pub fn compile(source: &str, unit_name: &str) -> Result<String, CompileError> {
    compile_file("<input>", source, unit_name, &CodegenOptions::default())
}

/// Parse `source` and generate the render function `unit_name`.
///
/// Any parse diagnostic rejects the unit; the generator never sees a tree
/// with outstanding errors.
pub fn compile_file(
    name: &str,
    source: &str,
    unit_name: &str,
    options: &CodegenOptions,
) -> Result<String, CompileError> {
    let (file, errors) = flamingo_parser::parse_file(name, source);
    if !errors.is_empty() {
        debug!("{name}: rejected with {} parse errors", errors.len());
        return Err(CompileError::Parse(errors));
    }
    let code = Generator::with_options(options.clone()).generate(&file, unit_name)?;
    Ok(code)
}

/// Whether `name` can be used as a Rust function name.
pub fn is_rust_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    let Some(first) = chars.next() else {
        return false;
    };
    if !(first.is_ascii_alphabetic() || first == '_') {
        return false;
    }
    if !chars.all(|c| c.is_ascii_alphanumeric() || c == '_') {
        return false;
    }
    name != "_" && !RESERVED.contains(&name)
}

/// Derive a unit name from a file stem, e.g. `my-card` → `my_card`.
pub fn unit_name_from_stem(stem: &str) -> String {
    let mut name = fold_ident(stem);
    if !is_rust_identifier(&name) {
        name.push('_');
    }
    name
}

/// Lower-case `s` and replace anything that cannot appear in an identifier.
pub(crate) fn fold_ident(s: &str) -> String {
    let mut id: String = s
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '_' {
                c.to_ascii_lowercase()
            } else {
                '_'
            }
        })
        .collect();
    if id.is_empty() || id.starts_with(|c: char| c.is_ascii_digit()) {
        id.insert(0, '_');
    }
    id
}

const RESERVED: &[&str] = &[
    "as", "async", "await", "break", "const", "continue", "crate", "dyn", "else", "enum",
    "extern", "false", "fn", "for", "gen", "if", "impl", "in", "let", "loop", "match", "mod",
    "move", "mut", "pub", "ref", "return", "self", "Self", "static", "struct", "super", "trait",
    "true", "try", "type", "unsafe", "use", "where", "while", "yield", "abstract", "become",
    "box", "do", "final", "macro", "override", "priv", "typeof", "unsized", "virtual",
];
