//! WASM bindings for the Flamingo compiler.
//!
//! Exposes `compile()`, `tokenize()` and `version()` to JavaScript via
//! wasm-bindgen for the browser playground.

use flamingo_codegen::{CodegenError, Generator};
use flamingo_lexer::{Lexer, Pos, SourceFile};
use serde::Serialize;
use wasm_bindgen::prelude::*;

/// Result of a playground compile, serialized as `{ code, errors }`.
#[derive(Debug, Serialize, PartialEq)]
pub struct CompileOutput {
    /// Generated Rust source, absent when any error was reported.
    pub code: Option<String>,
    pub errors: Vec<Diagnostic>,
}

#[derive(Debug, Serialize, PartialEq)]
pub struct Diagnostic {
    pub message: String,
    pub line: usize,
    pub column: usize,
}

/// Compile Flamingo source to a Rust render function named `unit_name`.
///
/// Returns a JS object `{ code: string | undefined, errors: Diagnostic[] }`.
/// Diagnostics are data, not exceptions; only a serialization failure throws.
#[wasm_bindgen]
pub fn compile(source: &str, unit_name: &str) -> Result<JsValue, JsError> {
    let output = compile_native(source, unit_name);
    serde_wasm_bindgen::to_value(&output).map_err(|e| JsError::new(&e.to_string()))
}

/// Token stream of `source`, one display string per token.
#[wasm_bindgen]
pub fn tokenize(source: &str) -> js_sys::Array {
    token_strings(source)
        .into_iter()
        .map(|t| JsValue::from_str(&t))
        .collect()
}

/// Get the compiler version.
#[wasm_bindgen]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

fn compile_native(source: &str, unit_name: &str) -> CompileOutput {
    let (file, errors) = flamingo_parser::parse(source);
    if !errors.is_empty() {
        return CompileOutput {
            code: None,
            errors: errors
                .into_iter()
                .map(|e| Diagnostic {
                    message: e.message,
                    line: e.line,
                    column: e.column,
                })
                .collect(),
        };
    }

    match Generator::new().generate(&file, unit_name) {
        Ok(code) => CompileOutput {
            code: Some(code),
            errors: Vec::new(),
        },
        Err(err) => {
            let offset = match &err {
                CodegenError::TextOutsideElement { offset, .. } => *offset,
                CodegenError::InvalidUnitName(_) => 0,
            };
            let loc = line_map(source).location(Pos::new(offset));
            CompileOutput {
                code: None,
                errors: vec![Diagnostic {
                    message: err.to_string(),
                    line: loc.line,
                    column: loc.column,
                }],
            }
        }
    }
}

/// Codegen errors carry byte offsets only.
fn line_map(source: &str) -> SourceFile {
    let mut file = SourceFile::new("<input>", source.len());
    for (i, _) in source.match_indices('\n') {
        file.add_line(i + 1);
    }
    file
}

fn token_strings(source: &str) -> Vec<String> {
    Lexer::tokenize(source)
        .iter()
        .map(|t| t.to_string())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    // =========================================================================
    // Native tests (non-WASM): verify the pipeline behind the bindings
    // =========================================================================

    #[test]
    fn test_compile_component() {
        let out = compile_native(r#"<div class="bg-rose-500"><span>mino</span></div>"#, "mino");
        assert!(out.errors.is_empty());
        let code = out.code.unwrap();
        assert!(code.contains("pub fn mino<R: Renderer>(renderer: &mut R) {"));
        assert!(code.contains(r#"renderer.set_attribute(&span2, "innerText", "mino");"#));
    }

    #[test]
    fn test_empty_source() {
        let out = compile_native("", "empty");
        assert!(out.code.unwrap().contains("pub fn empty"));
    }

    #[test]
    fn test_parse_errors_are_data() {
        let out = compile_native("<a>\n<b></a>", "broken");
        assert_eq!(out.code, None);
        assert!(!out.errors.is_empty());
        assert_eq!(out.errors[0].line, 2);
    }

    #[test]
    fn test_codegen_error_located() {
        let out = compile_native("<a/>\n  loose", "component");
        assert_eq!(out.code, None);
        assert_eq!(out.errors.len(), 1);
        assert_eq!((out.errors[0].line, out.errors[0].column), (2, 3));
        assert!(out.errors[0].message.contains("outside any element"));
    }

    #[test]
    fn test_invalid_unit_name() {
        let out = compile_native("<a/>", "not a name");
        assert_eq!(out.code, None);
        assert!(out.errors[0].message.contains("invalid unit name"));
    }

    #[test]
    fn test_token_strings() {
        assert_eq!(
            token_strings("<a>hi</a>"),
            vec![
                "LeftChevron \"<\"",
                "Ident \"a\"",
                "RightChevron \">\"",
                "Text \"hi\"",
                "LeftChevron \"<\"",
                "Slash \"/\"",
                "Ident \"a\"",
                "RightChevron \">\"",
                "EndOfInput",
            ]
        );
    }

    #[test]
    fn test_version() {
        let v = version();
        assert!(!v.is_empty());
        assert!(v.contains('.'));
    }

    #[test]
    fn test_multiple_compiles() {
        // Identifier counters start over for every compile
        let first = compile_native("<a/><b/>", "first").code.unwrap();
        let second = compile_native("<c/>", "second").code.unwrap();
        assert!(first.contains("let b2 ="));
        assert!(second.contains("let c1 ="));
    }
}
