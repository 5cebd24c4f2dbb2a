//! Document parser for Flamingo.
//!
//! Recursive descent over tokens pulled from a [`Lexer`], with two tokens of
//! lookahead (`cur` and `peek`). Structural problems are recorded and parsing
//! carries on; the caller decides what a non-empty error list means.

use flamingo_lexer::{Lexer, Pos, State, Token, TokenKind};
use log::debug;

use crate::ast::{Attribute, CodeBlock, Element, File, Fragment, Ident, RenderNode, Text};
use crate::ParseError;

/// Literal value given to attributes written without `="..."`.
pub const BOOLEAN_ATTRIBUTE_VALUE: &str = "true";

/// Flamingo document parser.
pub struct Parser<'a> {
    lexer: Lexer<'a>,
    cur: Token,
    peek: Token,
    errors: Vec<ParseError>,
    lexer_failed: bool,
}

impl<'a> Parser<'a> {
    /// Create a parser and prime `cur` and `peek`.
    pub fn new(lexer: Lexer<'a>) -> Self {
        let empty = Token::new(TokenKind::EndOfInput, Pos::default(), "");
        let mut parser = Self {
            lexer,
            cur: empty.clone(),
            peek: empty,
            errors: Vec::new(),
            lexer_failed: false,
        };
        parser.next_token();
        parser.next_token();
        parser
    }

    /// Parse one element on its own, e.g. `<button type="submit"/>`.
    pub fn parse_element_source(source: &str) -> Result<Element, Vec<ParseError>> {
        // Skips fence detection at the top of input
        let mut parser = Parser::new(Lexer::new(source).with_state(State::Text));

        if !parser.cur.is(TokenKind::LeftChevron) {
            let message = format!("expected an element, got {} instead", parser.cur.kind);
            parser.error_at(parser.cur.pos, message);
            return Err(parser.errors);
        }

        let el = parser.parse_element();
        if el.is_some() && !parser.peek.kind.is_terminal() {
            let message = format!(
                "expected end of input after element, got {} instead",
                parser.peek.kind
            );
            parser.error_at(parser.peek.pos, message);
        }

        match el {
            Some(el) if parser.errors.is_empty() => Ok(el),
            _ => Err(parser.errors),
        }
    }

    /// Parse the whole input.
    pub fn parse(mut self) -> (File, Vec<ParseError>) {
        let file = self.parse_file();
        debug!(
            "parsed {}: {} top-level nodes, {} errors",
            self.lexer.source_file().name(),
            file.fragment.nodes.len(),
            self.errors.len()
        );
        (file, self.errors)
    }

    fn parse_file(&mut self) -> File {
        let code_block = if self.cur.is(TokenKind::CodeFence) {
            let block = self.parse_code_block();
            self.next_token();
            block
        } else {
            None
        };

        let mut nodes = Vec::new();
        while !self.cur.kind.is_terminal() {
            if self.cur.is(TokenKind::LeftChevron) && self.peek.is(TokenKind::Slash) {
                self.skip_stray_closing_tag();
            } else if let Some(node) = self.parse_render_node() {
                nodes.push(node);
            }
            self.next_token();
        }

        let (start, end) = match (nodes.first(), nodes.last()) {
            (Some(first), Some(last)) => (first.start(), last.end()),
            _ => (self.cur.pos, self.cur.pos),
        };

        File {
            code_block,
            fragment: Fragment { start, end, nodes },
        }
    }

    /// `--- raw code ---` at the top of the file.
    fn parse_code_block(&mut self) -> Option<CodeBlock> {
        let top_fence = self.cur.pos;

        let code = if self.try_advance_if(TokenKind::RawCode) {
            self.cur.literal.clone()
        } else {
            String::new()
        };

        if !self.expect_advance(TokenKind::CodeFence) {
            return None;
        }

        Some(CodeBlock {
            top_fence,
            bottom_fence: self.cur.end(),
            code,
        })
    }

    /// Parse `cur` into a render node.
    ///
    /// Returns `None` at a closing tag (`<` followed by `/`) without
    /// consuming it, so the enclosing element can check it.
    fn parse_render_node(&mut self) -> Option<RenderNode> {
        match self.cur.kind {
            TokenKind::Text => self.parse_text().map(RenderNode::Text),
            TokenKind::LeftChevron if self.peek.is(TokenKind::Slash) => None,
            TokenKind::LeftChevron => self.parse_element().map(RenderNode::Element),
            _ => None,
        }
    }

    fn parse_text(&mut self) -> Option<Text> {
        let raw = &self.cur.literal;
        let literal = raw.trim();
        if literal.is_empty() {
            return None;
        }
        let leading = raw.len() - raw.trim_start().len();
        Some(Text {
            pos: self.cur.pos + leading,
            literal: literal.to_string(),
        })
    }

    fn parse_element(&mut self) -> Option<Element> {
        debug_assert!(self.cur.is(TokenKind::LeftChevron), "expected left chevron");
        let start = self.cur.pos;

        if !self.expect_advance(TokenKind::Ident) {
            return None;
        }
        let name = self.cur_ident();

        let mut attributes = Vec::new();
        while self.try_advance_if(TokenKind::Ident) {
            if let Some(attr) = self.parse_attribute() {
                attributes.push(attr);
            }
        }

        // Self-closing: no children, no closing tag
        if self.try_advance_if(TokenKind::Slash) {
            if !self.expect_advance(TokenKind::RightChevron) {
                return None;
            }
            return Some(Element {
                start,
                end: self.cur.end(),
                name,
                attributes,
                children: Vec::new(),
            });
        }

        if !self.expect_advance(TokenKind::RightChevron) {
            return None;
        }

        let children = self.parse_children();

        if !self.expect_advance(TokenKind::Slash) {
            return None;
        }
        if !self.expect_advance(TokenKind::Ident) {
            return None;
        }
        if self.cur.literal != name.name {
            let message = format!(
                "unexpected closing tag </{}>, expected </{}>",
                self.cur.literal, name.name
            );
            self.error_at(self.cur.pos, message);
        }
        if !self.expect_advance(TokenKind::RightChevron) {
            return None;
        }

        Some(Element {
            start,
            end: self.cur.end(),
            name,
            attributes,
            children,
        })
    }

    /// Collect children until something that is not a child shows up.
    /// On return `cur` is the `<` of the closing tag when the input is well formed.
    fn parse_children(&mut self) -> Vec<RenderNode> {
        let mut children = Vec::new();
        loop {
            self.next_token();
            match self.cur.kind {
                TokenKind::Text => {
                    if let Some(text) = self.parse_text() {
                        children.push(RenderNode::Text(text));
                    }
                }
                TokenKind::LeftChevron if !self.peek.is(TokenKind::Slash) => {
                    if let Some(el) = self.parse_element() {
                        children.push(RenderNode::Element(el));
                    }
                }
                _ => return children,
            }
        }
    }

    fn parse_attribute(&mut self) -> Option<Attribute> {
        debug_assert!(self.cur.is(TokenKind::Ident), "expected attribute name");
        let name = self.cur_ident();

        if !self.try_advance_if(TokenKind::Assign) {
            return Some(Attribute {
                end: name.end(),
                name,
                value: BOOLEAN_ATTRIBUTE_VALUE.to_string(),
            });
        }

        if !self.expect_advance(TokenKind::Quote) {
            return None;
        }

        let value = if self.try_advance_if(TokenKind::Text) {
            self.cur.literal.clone()
        } else {
            String::new()
        };

        if !self.expect_advance(TokenKind::Quote) {
            return None;
        }

        Some(Attribute {
            name,
            value,
            end: self.cur.end(),
        })
    }

    /// Report `</name>` found where no element is open and step over it.
    fn skip_stray_closing_tag(&mut self) {
        let pos = self.cur.pos;
        self.next_token(); // consume `<`
        let name = if self.try_advance_if(TokenKind::Ident) {
            self.cur.literal.clone()
        } else {
            String::new()
        };
        self.try_advance_if(TokenKind::RightChevron);
        self.error_at(
            pos,
            format!("unexpected closing tag </{name}> with no open element"),
        );
    }

    // =========================================================================
    // Token navigation helpers
    // =========================================================================

    fn next_token(&mut self) {
        let next = self.lexer.next_token();
        if next.is(TokenKind::Error) {
            self.lexer_failed = true;
            let message = format!("lexical error: {}", next.literal);
            self.error_at(next.pos, message);
        }
        self.cur = std::mem::replace(&mut self.peek, next);
    }

    fn cur_ident(&self) -> Ident {
        Ident {
            pos: self.cur.pos,
            name: self.cur.literal.clone(),
        }
    }

    /// Advance if `peek` is `kind`; otherwise leave everything as is.
    fn try_advance_if(&mut self, kind: TokenKind) -> bool {
        if self.peek.is(kind) {
            self.next_token();
            true
        } else {
            false
        }
    }

    /// Like `try_advance_if`, but records an error on mismatch.
    fn expect_advance(&mut self, kind: TokenKind) -> bool {
        if self.try_advance_if(kind) {
            return true;
        }
        self.peek_error(kind);
        false
    }

    fn peek_error(&mut self, kind: TokenKind) {
        // Once scanning failed, every later expectation fails too
        if self.lexer_failed {
            return;
        }
        let message = format!(
            "expected next token to be {kind}, got {} instead",
            self.peek.kind
        );
        self.error_at(self.peek.pos, message);
    }

    fn error_at(&mut self, pos: Pos, message: String) {
        let location = self.lexer.source_file().location(pos);
        self.errors.push(ParseError {
            message,
            line: location.line,
            column: location.column,
        });
    }
}
