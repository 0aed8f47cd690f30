//! `compile(source, options) -> {code, diagnostics}` (`spec.md` §6).

use somon_common::{codes, Category, Diagnostic};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target {
    Es5,
    Es2015,
    Es2020,
    EsNext,
}

impl Default for Target {
    fn default() -> Self {
        Target::Es2020
    }
}

#[derive(Debug, Clone)]
pub struct CompileOptions {
    pub type_check: bool,
    pub strict: bool,
    pub target: Target,
    pub source_map: bool,
    pub minify: bool,
}

impl Default for CompileOptions {
    fn default() -> Self {
        Self { type_check: true, strict: false, target: Target::default(), source_map: false, minify: false }
    }
}

#[derive(Debug, Clone)]
pub struct CompileResult {
    /// `None` only when `strict` is set and type errors were found, or when
    /// lexing/parsing failed outright.
    pub code: Option<String>,
    pub diagnostics: Vec<Diagnostic>,
}

/// Targets other than [`Target::Es2020`] are accepted but not yet honored --
/// the core emits ES2020-flavored JS regardless (`spec.md` §6: "may be
/// delegated to a separate transpiler").
pub fn compile(source: &str, options: &CompileOptions) -> CompileResult {
    let source = strip_bom(source);

    let tokens = match somon_lexer::tokenize(source) {
        Ok(tokens) => tokens,
        Err(e) => {
            return CompileResult { code: None, diagnostics: vec![lex_diagnostic(&e, source)] };
        }
    };

    let program = match somon_parser::parse(tokens) {
        Ok(program) => program,
        Err(errors) => {
            let diagnostics = errors.iter().map(|e| parse_diagnostic(e, source)).collect();
            return CompileResult { code: None, diagnostics };
        }
    };

    let mut diagnostics = Vec::new();
    let mut has_type_errors = false;
    if options.type_check {
        let result = somon_typeck::check(&program);
        has_type_errors = !result.errors.is_empty();
        for error in &result.errors {
            diagnostics.push(error.to_diagnostic(None, snippet_at(source, error.position().line)));
        }
        for warning in &result.warnings {
            diagnostics.push(warning.to_diagnostic(None, snippet_at(source, warning.position().line)));
        }
    }

    if options.strict && has_type_errors {
        return CompileResult { code: None, diagnostics };
    }

    let code = somon_codegen::generate(&program);
    CompileResult { code: Some(code), diagnostics }
}

fn strip_bom(source: &str) -> &str {
    source.strip_prefix('\u{feff}').unwrap_or(source)
}

fn snippet_at(source: &str, line: u32) -> String {
    source.lines().nth((line.saturating_sub(1)) as usize).unwrap_or_default().to_string()
}

fn lex_diagnostic(error: &somon_lexer::LexError, source: &str) -> Diagnostic {
    let code = if error.message.contains("decimal point") {
        codes::INVALID_NUMBER_LITERAL
    } else if error.message.contains("unterminated string") {
        codes::UNTERMINATED_STRING
    } else if error.message.contains("unterminated") {
        codes::UNTERMINATED_CONSTRUCT
    } else {
        codes::UNEXPECTED_CHARACTER
    };
    Diagnostic::error(code, error.message.clone(), error.position, snippet_at(source, error.position.line), Category::Syntax)
}

fn parse_diagnostic(error: &somon_parser::ParseError, source: &str) -> Diagnostic {
    Diagnostic::error(
        codes::UNEXPECTED_TOKEN,
        error.to_string(),
        error.position,
        snippet_at(source, error.position.line),
        Category::Syntax,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn simple_variable_compiles_to_expected_js() {
        let result = compile("собит PI = 3.14;", &CompileOptions::default());
        assert_eq!(result.code.as_deref(), Some("const PI = 3.14;\n"));
        assert!(result.diagnostics.is_empty());
    }

    #[test]
    fn union_assignment_error_is_reported_with_the_right_code() {
        let src = "собит x: сатр | рақам = дуруст;";
        let result = compile(src, &CompileOptions::default());
        assert!(result.diagnostics.iter().any(|d| d.code == codes::TYPE_NOT_ASSIGNABLE));
    }

    #[test]
    fn strict_mode_suppresses_codegen_on_type_errors() {
        let src = "собит x: сатр | рақам = дуруст;";
        let options = CompileOptions { strict: true, ..CompileOptions::default() };
        let result = compile(src, &options);
        assert!(result.code.is_none());
    }

    #[test]
    fn empty_source_compiles_to_empty_output() {
        let result = compile("", &CompileOptions::default());
        assert_eq!(result.code.as_deref(), Some(""));
    }

    #[test]
    fn bom_prefixed_source_compiles_like_its_stripped_form() {
        let with_bom = compile("\u{feff}собит PI = 3.14;", &CompileOptions::default());
        let without_bom = compile("собит PI = 3.14;", &CompileOptions::default());
        assert_eq!(with_bom.code, without_bom.code);
    }
}
