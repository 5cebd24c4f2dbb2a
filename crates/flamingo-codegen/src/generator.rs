//! Render-function generator.
//!
//! Walks the markup of a parsed file and emits one construction statement
//! per element plus attribute statements, then the append/render statements
//! that wire the nodes together.

use flamingo_parser::ast::{Element, File, Node};
use flamingo_parser::{walk, Visit, Visitor};
use log::{debug, trace};

use crate::{fold_ident, is_rust_identifier, CodegenError, CodegenOptions, INNER_TEXT};

/// Generates the render function for one compiled unit.
///
/// A generator is consumed by [`Generator::generate`], so identifier
/// counters never carry over from one file to the next.
#[derive(Debug, Default)]
pub struct Generator {
    options: CodegenOptions,
    counter: usize,
    ancestors: Vec<String>,
    statements: Vec<String>,
    attachments: Vec<String>,
    error: Option<CodegenError>,
}

impl Generator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_options(options: CodegenOptions) -> Self {
        Self {
            options,
            ..Self::default()
        }
    }

    /// Generate target source for `file` as a function named `unit_name`.
    ///
    /// `file` must come from a parse that reported no errors.
    pub fn generate(mut self, file: &File, unit_name: &str) -> Result<String, CodegenError> {
        if !is_rust_identifier(unit_name) {
            return Err(CodegenError::InvalidUnitName(unit_name.to_string()));
        }

        walk(&mut self, Node::Fragment(&file.fragment));
        if let Some(err) = self.error.take() {
            return Err(err);
        }

        debug!(
            "generated {unit_name}: {} nodes, {} statements",
            self.counter,
            self.statements.len() + self.attachments.len()
        );
        Ok(self.render(file, unit_name))
    }

    fn enter_element(&mut self, el: &Element) {
        self.counter += 1;
        let id = synthetic_ident(&el.name.name, self.counter);
        self.push_statement(format!(
            "let {id} = renderer.new_node({});",
            rust_str(&el.name.name)
        ));
        self.ancestors.push(id);
    }

    fn leave_element(&mut self) {
        let Some(id) = self.ancestors.pop() else {
            return;
        };
        let stmt = match self.ancestors.last() {
            Some(parent) => format!("renderer.append_child(&{parent}, &{id});"),
            None => format!("renderer.render_root(&{id});"),
        };
        trace!("{stmt}");
        self.attachments.push(stmt);
    }

    fn set_attribute(&mut self, name: &str, value: &str) {
        let Some(id) = self.ancestors.last() else {
            return;
        };
        let stmt = format!(
            "renderer.set_attribute(&{id}, {}, {});",
            rust_str(name),
            rust_str(value)
        );
        self.push_statement(stmt);
    }

    fn push_statement(&mut self, stmt: String) {
        trace!("{stmt}");
        self.statements.push(stmt);
    }

    fn render(&self, file: &File, unit_name: &str) -> String {
        let mut out = String::new();

        if self.options.header {
            out.push_str("// Code generated by flamingo. DO NOT EDIT.\n\n");
        }
        out.push_str(&format!("use {};\n", self.options.runtime_path));

        if let Some(block) = &file.code_block {
            let code = block.code.trim_matches(|c| c == '\n' || c == '\r');
            if !code.trim().is_empty() {
                out.push('\n');
                out.push_str(code);
                out.push('\n');
            }
        }

        let param = if self.statements.is_empty() {
            "_renderer"
        } else {
            "renderer"
        };
        out.push_str(&format!(
            "\npub fn {unit_name}<R: {}>({param}: &mut R) {{\n",
            self.options.trait_name()
        ));
        for stmt in self.statements.iter().chain(&self.attachments) {
            out.push_str("    ");
            out.push_str(stmt);
            out.push('\n');
        }
        out.push_str("}\n");
        out
    }
}

impl<'ast> Visitor<'ast> for Generator {
    fn visit(&mut self, node: Node<'ast>) -> Visit<Self> {
        match node {
            Node::Element(el) => {
                self.enter_element(el);
                Visit::Continue
            }
            Node::Attribute(attr) => {
                self.set_attribute(&attr.name.name, &attr.value);
                Visit::Skip
            }
            Node::Text(text) => {
                if self.ancestors.is_empty() {
                    self.error.get_or_insert(CodegenError::TextOutsideElement {
                        text: text.literal.clone(),
                        offset: text.pos.offset(),
                    });
                } else {
                    self.set_attribute(INNER_TEXT, &text.literal);
                }
                Visit::Skip
            }
            Node::Ident(_) | Node::CodeBlock(_) => Visit::Skip,
            Node::File(_) | Node::Fragment(_) => Visit::Continue,
        }
    }

    fn leave(&mut self, node: Node<'ast>) {
        if let Node::Element(_) = node {
            self.leave_element();
        }
    }
}

/// `{tag}{n}`, with the tag folded into a valid lower-case identifier.
/// Tags ending in a digit get a `_` before the counter (`h1_2`).
pub fn synthetic_ident(tag: &str, n: usize) -> String {
    let base = fold_ident(tag);
    if base.ends_with(|c: char| c.is_ascii_digit()) {
        format!("{base}_{n}")
    } else {
        format!("{base}{n}")
    }
}

/// Quote `s` as a Rust string literal.
fn rust_str(s: &str) -> String {
    format!("{s:?}")
}
