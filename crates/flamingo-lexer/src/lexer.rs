use std::collections::VecDeque;

use log::trace;

use crate::position::{Pos, SourceFile};
use crate::token::{Token, TokenKind};

/// Largest number of tokens a single state step can emit.
///
/// The longest step is a valued attribute closing a self-closing tag:
/// `Ident Assign Quote Text Quote Slash RightChevron`.
pub const MAX_TOKENS_PER_STEP: usize = 8;

/// Marker opening and closing a raw code block at the top of a file.
pub const FENCE: &str = "---";

/// Lexer state. Each state scans forward, emits tokens, and names the next state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum State {
    /// Start of input: decides between a code fence and markup.
    Prelude,
    /// Between the fences of a raw code block.
    RawCode,
    /// Character data outside any tag.
    Text,
    /// Right after `<`: optional `/`, then the tag name.
    Tag,
    /// Inside an opening tag, after the tag name.
    Attribute,
}

/// Flamingo source lexer.
///
/// A pull-based state machine: `next_token` pops from an internal queue and
/// runs state steps until the queue has something to hand out. A step may
/// emit several tokens at once (`<`, `/`, name) so they are buffered.
///
/// Scanning stops for good at the first `Error` or `EndOfInput` token;
/// every later call returns `EndOfInput`.
pub struct Lexer<'a> {
    input: &'a str,
    file: SourceFile,
    state: Option<State>,
    queue: VecDeque<Token>,
    start: usize,
    pos: usize,
}

impl<'a> Lexer<'a> {
    /// Create a lexer over an anonymous input.
    pub fn new(input: &'a str) -> Self {
        Self {
            input,
            file: SourceFile::new("<input>", input.len()),
            state: Some(State::Prelude),
            queue: VecDeque::with_capacity(MAX_TOKENS_PER_STEP),
            start: 0,
            pos: 0,
        }
    }

    /// Name the input file, used when reporting diagnostics.
    pub fn with_file_name(mut self, name: impl Into<String>) -> Self {
        self.file = SourceFile::new(name, self.input.len());
        self
    }

    /// Start scanning in a given state instead of at the top of a file.
    pub fn with_state(mut self, state: State) -> Self {
        self.state = Some(state);
        self
    }

    /// Collect every token up to and including the terminating
    /// `EndOfInput` or `Error` token.
    pub fn tokenize(input: &str) -> Vec<Token> {
        let mut lexer = Lexer::new(input);
        let mut tokens = Vec::new();
        loop {
            let tok = lexer.next_token();
            let done = tok.kind.is_terminal();
            tokens.push(tok);
            if done {
                return tokens;
            }
        }
    }

    /// Line table for the input, filled in as far as scanning has progressed.
    pub fn source_file(&self) -> &SourceFile {
        &self.file
    }

    /// Produce the next token.
    pub fn next_token(&mut self) -> Token {
        loop {
            if let Some(tok) = self.queue.pop_front() {
                return tok;
            }
            match self.state {
                Some(state) => {
                    self.state = self.step(state);
                    trace!("lexer {:?} -> {:?} at {}", state, self.state, self.pos);
                }
                None => {
                    return Token::new(TokenKind::EndOfInput, Pos::new(self.input.len()), "");
                }
            }
        }
    }

    fn step(&mut self, state: State) -> Option<State> {
        match state {
            State::Prelude => self.lex_prelude(),
            State::RawCode => self.lex_raw_code(),
            State::Text => self.lex_text(),
            State::Tag => self.lex_tag(),
            State::Attribute => self.lex_attribute(),
        }
    }

    // =========================================================================
    // States
    // =========================================================================

    fn lex_prelude(&mut self) -> Option<State> {
        self.skip_whitespace();
        if self.rest().starts_with(FENCE) {
            for _ in 0..FENCE.len() {
                self.next();
            }
            self.emit(TokenKind::CodeFence);
            return Some(State::RawCode);
        }
        Some(State::Text)
    }

    /// Copy everything up to the next line that is exactly `---` verbatim.
    fn lex_raw_code(&mut self) -> Option<State> {
        let closing = format!("\n{FENCE}");
        let rest = self.rest();
        let found = rest.match_indices(&closing).map(|(i, _)| i).find(|&i| {
            let after = &rest[i + closing.len()..];
            after.is_empty() || after.starts_with('\n') || after.starts_with("\r\n")
        });
        let Some(idx) = found else {
            return self.errorf(format!("unterminated code block: expected closing {FENCE}"));
        };

        let fence_at = self.pos + idx + 1;
        while self.pos < fence_at {
            self.next();
        }
        if self.pos > self.start {
            self.emit(TokenKind::RawCode);
        }

        for _ in 0..FENCE.len() {
            self.next();
        }
        self.emit(TokenKind::CodeFence);
        Some(State::Text)
    }

    fn lex_text(&mut self) -> Option<State> {
        self.skip_whitespace();
        self.run_until(|c| c == '<');

        if self.peek().is_none() {
            if self.pos > self.start {
                self.emit(TokenKind::Text);
            }
            self.emit_end();
            return None;
        }

        if self.pos > self.start {
            self.emit(TokenKind::Text);
        }
        Some(State::Tag)
    }

    fn lex_tag(&mut self) -> Option<State> {
        match self.next() {
            Some('<') => self.emit(TokenKind::LeftChevron),
            Some(c) => return self.errorf(format!("expected '<' to start a tag, found {c:?}")),
            None => return self.errorf("unterminated tag: unexpected end of input".into()),
        }

        if self.accept('/') {
            self.emit(TokenKind::Slash);
        }

        self.run_until(|c| c.is_whitespace() || matches!(c, '>' | '/' | '<'));
        match self.peek() {
            None => return self.errorf("unterminated tag: unexpected end of input".into()),
            Some(c) if self.pos == self.start => {
                return self.errorf(format!("expected tag name after '<', found {c:?}"));
            }
            Some(_) => self.emit(TokenKind::Ident),
        }

        self.skip_whitespace();
        self.close_tag_or(State::Attribute)
    }

    fn lex_attribute(&mut self) -> Option<State> {
        debug_assert!(
            !self.peek().is_some_and(char::is_whitespace),
            "attribute state entered with leading whitespace"
        );

        // Attributes may be split across lines
        self.skip_whitespace();
        self.run_until(|c| c.is_whitespace() || matches!(c, '=' | '>' | '/' | '"' | '<'));
        match self.peek() {
            None => return self.errorf("unterminated tag: unexpected end of input".into()),
            Some(c) if self.pos == self.start => {
                return self.errorf(format!("expected attribute name, found {c:?}"));
            }
            Some(_) => self.emit(TokenKind::Ident),
        }

        if self.accept('=') {
            self.emit(TokenKind::Assign);

            if !self.accept('"') {
                return self.errorf(r#"expected quote(") to start attribute value"#.into());
            }
            self.emit(TokenKind::Quote);

            self.run_until(|c| c == '"');
            if self.peek().is_none() {
                return self.errorf(r#"expected quote(") to end attribute value"#.into());
            }
            // Empty values still get a Text token
            self.emit(TokenKind::Text);

            self.next();
            self.emit(TokenKind::Quote);
        } else if self.peek() == Some('"') {
            return self.errorf("expected assignment(=) after attribute identifier".into());
        }

        self.skip_whitespace();
        self.close_tag_or(State::Attribute)
    }

    /// Finish the tag on `>` or `/>`, otherwise continue in `next`.
    fn close_tag_or(&mut self, next: State) -> Option<State> {
        match self.peek() {
            None => self.errorf("unterminated tag: unexpected end of input".into()),
            Some('>') => {
                self.next();
                self.emit(TokenKind::RightChevron);
                Some(State::Text)
            }
            Some('/') => {
                self.next();
                self.emit(TokenKind::Slash);
                if !self.accept('>') {
                    return self.errorf("expected '>' after '/' in tag".into());
                }
                self.emit(TokenKind::RightChevron);
                Some(State::Text)
            }
            Some(_) => Some(next),
        }
    }

    // =========================================================================
    // Helpers
    // =========================================================================

    fn rest(&self) -> &'a str {
        &self.input[self.pos..]
    }

    fn next(&mut self) -> Option<char> {
        let ch = self.rest().chars().next()?;
        self.pos += ch.len_utf8();
        if ch == '\n' {
            self.file.add_line(self.pos);
        }
        Some(ch)
    }

    fn peek(&self) -> Option<char> {
        self.rest().chars().next()
    }

    fn accept(&mut self, ch: char) -> bool {
        if self.peek() == Some(ch) {
            self.next();
            true
        } else {
            false
        }
    }

    fn run_until(&mut self, stop: impl Fn(char) -> bool) {
        while let Some(c) = self.peek() {
            if stop(c) {
                break;
            }
            self.next();
        }
    }

    fn skip_whitespace(&mut self) {
        self.run_until(|c| !c.is_whitespace());
        self.start = self.pos;
    }

    fn emit(&mut self, kind: TokenKind) {
        debug_assert!(
            self.queue.len() < MAX_TOKENS_PER_STEP,
            "token queue overflow"
        );
        let literal = &self.input[self.start..self.pos];
        self.queue
            .push_back(Token::new(kind, Pos::new(self.start), literal));
        self.start = self.pos;
    }

    fn emit_end(&mut self) {
        self.queue
            .push_back(Token::new(TokenKind::EndOfInput, Pos::new(self.pos), ""));
        self.start = self.pos;
    }

    fn errorf(&mut self, message: String) -> Option<State> {
        self.queue
            .push_back(Token::new(TokenKind::Error, Pos::new(self.pos), message));
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::position::Location;
    use pretty_assertions::assert_eq;
    use TokenKind::*;

    /// Helper: tokenize and return token kinds.
    fn kinds(source: &str) -> Vec<TokenKind> {
        Lexer::tokenize(source).into_iter().map(|t| t.kind).collect()
    }

    /// Helper: tokenize and return literals of the given kind.
    fn literals(source: &str, kind: TokenKind) -> Vec<String> {
        Lexer::tokenize(source)
            .into_iter()
            .filter(|t| t.kind == kind)
            .map(|t| t.literal)
            .collect()
    }

    fn error_message(source: &str) -> String {
        let last = Lexer::tokenize(source).pop().unwrap();
        assert_eq!(last.kind, Error, "expected an error token for {source:?}");
        last.literal
    }

    // =========================================================================
    // Text and end of input
    // =========================================================================

    #[test]
    fn test_empty_source() {
        assert_eq!(kinds(""), vec![EndOfInput]);
    }

    #[test]
    fn test_whitespace_only_source() {
        assert_eq!(kinds("  \n\t \n"), vec![EndOfInput]);
    }

    #[test]
    fn test_plain_text() {
        assert_eq!(kinds("hello"), vec![Text, EndOfInput]);
        assert_eq!(literals("  hello world ", Text), vec!["hello world "]);
    }

    #[test]
    fn test_end_of_input_repeats() {
        let mut lexer = Lexer::new("<a>");
        for _ in 0..3 {
            lexer.next_token();
        }
        assert_eq!(lexer.next_token().kind, EndOfInput);
        assert_eq!(lexer.next_token().kind, EndOfInput);
        assert_eq!(lexer.next_token().kind, EndOfInput);
    }

    #[test]
    fn test_end_of_input_is_at_input_length() {
        let tokens = Lexer::tokenize("<a></a>  ");
        let eof = tokens.last().unwrap();
        assert_eq!(eof.kind, EndOfInput);
        assert_eq!(eof.pos, Pos::new(9));
    }

    // =========================================================================
    // Tags
    // =========================================================================

    #[test]
    fn test_open_tag() {
        assert_eq!(kinds("<div>"), vec![LeftChevron, Ident, RightChevron, EndOfInput]);
    }

    #[test]
    fn test_element_with_attribute_and_text() {
        assert_eq!(
            kinds(r#"<div class="p-4">mino</div>"#),
            vec![
                LeftChevron,
                Ident,
                Ident,
                Assign,
                Quote,
                Text,
                Quote,
                RightChevron,
                Text,
                LeftChevron,
                Slash,
                Ident,
                RightChevron,
                EndOfInput,
            ]
        );
    }

    #[test]
    fn test_literals_are_exact() {
        let tokens = Lexer::tokenize(r#"<div class="p-4">mino</div>"#);
        let lits: Vec<&str> = tokens.iter().map(|t| t.literal.as_str()).collect();
        assert_eq!(
            lits,
            vec!["<", "div", "class", "=", "\"", "p-4", "\"", ">", "mino", "<", "/", "div", ">", ""]
        );
    }

    #[test]
    fn test_token_positions() {
        let tokens = Lexer::tokenize(r#"<a b="c">"#);
        let positions: Vec<usize> = tokens.iter().map(|t| t.pos.offset()).collect();
        assert_eq!(positions, vec![0, 1, 3, 4, 5, 6, 7, 8, 9]);
    }

    #[test]
    fn test_whitespace_between_tags_is_skipped() {
        assert_eq!(
            kinds("<a>\n  \n</a>"),
            vec![LeftChevron, Ident, RightChevron, LeftChevron, Slash, Ident, RightChevron, EndOfInput]
        );
    }

    #[test]
    fn test_whitespace_after_tag_name() {
        assert_eq!(kinds("<a   >"), vec![LeftChevron, Ident, RightChevron, EndOfInput]);
    }

    #[test]
    fn test_self_closing_with_space() {
        assert_eq!(
            kinds("<self />"),
            vec![LeftChevron, Ident, Slash, RightChevron, EndOfInput]
        );
    }

    #[test]
    fn test_self_closing_without_space() {
        assert_eq!(kinds("<br/>"), vec![LeftChevron, Ident, Slash, RightChevron, EndOfInput]);
        assert_eq!(literals("<br/>", Ident), vec!["br"]);
    }

    #[test]
    fn test_unicode_text() {
        assert_eq!(literals("<p>héllo wörld</p>", Text), vec!["héllo wörld"]);
    }

    // =========================================================================
    // Attributes
    // =========================================================================

    #[test]
    fn test_boolean_attribute() {
        assert_eq!(
            kinds("<test isTrue/>"),
            vec![LeftChevron, Ident, Ident, Slash, RightChevron, EndOfInput]
        );
    }

    #[test]
    fn test_boolean_then_valued_attribute() {
        assert_eq!(
            kinds(r#"<input disabled type="text">"#),
            vec![LeftChevron, Ident, Ident, Ident, Assign, Quote, Text, Quote, RightChevron, EndOfInput]
        );
    }

    #[test]
    fn test_empty_attribute_value_emits_empty_text() {
        let tokens = Lexer::tokenize(r#"<test isTrue=""/>"#);
        let k: Vec<TokenKind> = tokens.iter().map(|t| t.kind).collect();
        assert_eq!(
            k,
            vec![LeftChevron, Ident, Ident, Assign, Quote, Text, Quote, Slash, RightChevron, EndOfInput]
        );
        assert_eq!(tokens[5].literal, "");
    }

    #[test]
    fn test_attribute_value_keeps_whitespace() {
        assert_eq!(literals(r#"<a title="  x y ">"#, Text), vec!["  x y "]);
    }

    #[test]
    fn test_attributes_across_lines() {
        let src = "<a\n  href=\"/\"\n  target=\"_blank\"\n>";
        assert_eq!(literals(src, Ident), vec!["a", "href", "target"]);
        assert_eq!(*kinds(src).last().unwrap(), EndOfInput);
    }

    #[test]
    fn test_longest_step_fits_queue() {
        assert_eq!(
            kinds(r#"<img src="a.png"/>"#),
            vec![LeftChevron, Ident, Ident, Assign, Quote, Text, Quote, Slash, RightChevron, EndOfInput]
        );
    }

    // =========================================================================
    // Lexical errors
    // =========================================================================

    #[test]
    fn test_missing_closing_quote() {
        assert!(error_message(r#"<a href="/about>"#).contains("end attribute value"));
    }

    #[test]
    fn test_missing_opening_quote() {
        assert!(error_message("<a href=/about>").contains("start attribute value"));
    }

    #[test]
    fn test_missing_assign() {
        assert!(error_message(r#"<a href"/">"#).contains("assignment(=)"));
    }

    #[test]
    fn test_unterminated_tag() {
        assert!(error_message("<div").contains("unterminated tag"));
        assert!(error_message("<div class").contains("unterminated tag"));
        assert!(error_message("<div class=\"x\"").contains("unterminated tag"));
    }

    #[test]
    fn test_empty_tag_name() {
        assert!(error_message("<>").contains("expected tag name"));
        assert!(error_message("< div>").contains("expected tag name"));
    }

    #[test]
    fn test_slash_without_chevron() {
        assert!(error_message("<a / b>").contains("expected '>'"));
    }

    #[test]
    fn test_nothing_follows_error() {
        let mut lexer = Lexer::new("<a href=x> <b></b>");
        let mut seen = Vec::new();
        loop {
            let tok = lexer.next_token();
            let done = tok.kind.is_terminal();
            seen.push(tok.kind);
            if done {
                break;
            }
        }
        assert_eq!(seen, vec![LeftChevron, Ident, Ident, Assign, Error]);
        assert_eq!(lexer.next_token().kind, EndOfInput);
    }

    // =========================================================================
    // Code fences
    // =========================================================================

    #[test]
    fn test_code_fence() {
        let src = "---\nlet x = 1;\n---\n<div></div>";
        assert_eq!(
            kinds(src),
            vec![
                CodeFence,
                RawCode,
                CodeFence,
                LeftChevron,
                Ident,
                RightChevron,
                LeftChevron,
                Slash,
                Ident,
                RightChevron,
                EndOfInput,
            ]
        );
        assert_eq!(literals(src, RawCode), vec!["\nlet x = 1;\n"]);
    }

    #[test]
    fn test_code_fence_keeps_markup_verbatim() {
        let src = "---\nconst TAG: &str = \"<div>\";\n---\n";
        assert_eq!(literals(src, RawCode), vec!["\nconst TAG: &str = \"<div>\";\n"]);
    }

    #[test]
    fn test_fence_only_at_start() {
        assert_eq!(literals("<p>a</p>\n---\n", Text), vec!["a", "---\n"]);
    }

    #[test]
    fn test_closing_fence_must_stand_alone() {
        let src = "---\nlet x = 1;\n---oops\n---\n<p>hi</p>";
        assert_eq!(literals(src, RawCode), vec!["\nlet x = 1;\n---oops\n"]);
        assert_eq!(literals(src, Text), vec!["hi"]);
    }

    #[test]
    fn test_closing_fence_at_end_of_input() {
        assert_eq!(kinds("---\nlet x = 1;\n---"), vec![CodeFence, RawCode, CodeFence, EndOfInput]);
        assert_eq!(kinds("---\r\nlet x = 1;\r\n---\r\n"), vec![CodeFence, RawCode, CodeFence, EndOfInput]);
    }

    #[test]
    fn test_fence_prefix_does_not_close() {
        assert!(error_message("---\nlet x = 1;\n---oops\n<p>hi</p>").contains("unterminated code block"));
    }

    #[test]
    fn test_unterminated_fence() {
        assert!(error_message("---\nfn main() {}\n").contains("unterminated code block"));
    }

    // =========================================================================
    // Positions and states
    // =========================================================================

    #[test]
    fn test_line_table_tracks_newlines() {
        let mut lexer = Lexer::new("<a>\n  <b>\n    hi\n  </b>\n</a>").with_file_name("page.flamingo");
        let mut text = None;
        loop {
            let tok = lexer.next_token();
            if tok.kind == Text {
                text = Some(tok.clone());
            }
            if tok.kind.is_terminal() {
                break;
            }
        }
        let text = text.unwrap();
        let file = lexer.source_file();
        assert_eq!(file.name(), "page.flamingo");
        assert_eq!(file.location(text.pos), Location { line: 3, column: 5 });
        assert_eq!(file.line_count(), 5);
    }

    #[test]
    fn test_start_in_tag_state() {
        let mut lexer = Lexer::new("<item key=\"1\"/>").with_state(State::Tag);
        let mut seen = Vec::new();
        loop {
            let tok = lexer.next_token();
            seen.push(tok.kind);
            if tok.kind.is_terminal() {
                break;
            }
        }
        assert_eq!(
            seen,
            vec![LeftChevron, Ident, Ident, Assign, Quote, Text, Quote, Slash, RightChevron, EndOfInput]
        );
    }

    #[test]
    fn test_tag_state_requires_chevron() {
        let mut lexer = Lexer::new(" <a/>").with_state(State::Tag);
        let tok = lexer.next_token();
        assert_eq!(tok.kind, Error);
        assert!(tok.literal.contains("expected '<' to start a tag"));
        assert_eq!(lexer.next_token().kind, EndOfInput);
    }

    #[test]
    fn test_tag_state_on_empty_input() {
        let tok = Lexer::new("").with_state(State::Tag).next_token();
        assert_eq!(tok.kind, Error);
        assert!(tok.literal.contains("unterminated tag"));
    }
}
