use crate::position::Position;
use ariadne::{Label, Report, ReportKind, Source};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Stable error/warning codes. Changing the spelling of any of these is a
/// breaking change to the external diagnostics contract.
pub mod codes {
    pub const TYPE_NOT_ASSIGNABLE: &str = "TYPE_NOT_ASSIGNABLE";
    pub const CLASS_NOT_FOUND: &str = "CLASS_NOT_FOUND";
    pub const INVALID_EXTENDS: &str = "INVALID_EXTENDS";
    pub const CIRCULAR_INHERITANCE: &str = "CIRCULAR_INHERITANCE";
    pub const UNEXPECTED_TOKEN: &str = "UNEXPECTED_TOKEN";
    pub const UNTERMINATED_CONSTRUCT: &str = "UNTERMINATED_CONSTRUCT";
    pub const UNEXPECTED_CHARACTER: &str = "UNEXPECTED_CHARACTER";
    pub const UNTERMINATED_STRING: &str = "UNTERMINATED_STRING";
    pub const INVALID_NUMBER_LITERAL: &str = "INVALID_NUMBER_LITERAL";
    pub const MODULE_NOT_FOUND: &str = "MODULE_NOT_FOUND";
    pub const CIRCULAR_DEPENDENCY: &str = "CIRCULAR_DEPENDENCY";
    pub const UNUSED_IMPORT: &str = "UNUSED_IMPORT";
    pub const UNREACHABLE_CODE: &str = "UNREACHABLE_CODE";
}

/// Orthogonal to the component of origin -- see `spec.md` §7.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Severity {
    Error,
    Warning,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Error => write!(f, "error"),
            Severity::Warning => write!(f, "warning"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Category {
    Syntax,
    Type,
    Resolution,
    System,
    Validation,
    Runtime,
    Unknown,
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Category::Syntax => "syntax",
            Category::Type => "type",
            Category::Resolution => "resolution",
            Category::System => "system",
            Category::Validation => "validation",
            Category::Runtime => "runtime",
            Category::Unknown => "unknown",
        };
        write!(f, "{s}")
    }
}

/// A structured, serializable diagnostic -- the external contract of
/// `spec.md` §6/§7. Distinct from the internal `std::error::Error` types each
/// stage uses for propagation: a `Diagnostic` is what callers see.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Diagnostic {
    pub code: String,
    pub message: String,
    pub file: Option<String>,
    pub line: u32,
    pub column: u32,
    pub snippet: String,
    pub severity: Severity,
    pub category: Category,
}

impl Diagnostic {
    pub fn error(
        code: &str,
        message: impl Into<String>,
        position: Position,
        snippet: impl Into<String>,
        category: Category,
    ) -> Self {
        Self {
            code: code.to_string(),
            message: message.into(),
            file: None,
            line: position.line,
            column: position.column,
            snippet: snippet.into(),
            severity: Severity::Error,
            category,
        }
    }

    pub fn warning(
        code: &str,
        message: impl Into<String>,
        position: Position,
        snippet: impl Into<String>,
        category: Category,
    ) -> Self {
        Self {
            code: code.to_string(),
            message: message.into(),
            file: None,
            line: position.line,
            column: position.column,
            snippet: snippet.into(),
            severity: Severity::Warning,
            category,
        }
    }

    pub fn with_file(mut self, file: impl Into<String>) -> Self {
        self.file = Some(file.into());
        self
    }

    /// Render this diagnostic against the originating source text using
    /// `ariadne`, returning the formatted report as a string.
    pub fn render(&self, source: &str) -> String {
        let file_name = self.file.clone().unwrap_or_else(|| "<source>".to_string());
        let offset = byte_offset_for(source, self.line, self.column);
        let kind = match self.severity {
            Severity::Error => ReportKind::Error,
            Severity::Warning => ReportKind::Warning,
        };
        let mut out = Vec::new();
        let report = Report::build(kind, (file_name.clone(), offset..offset + 1))
            .with_code(&self.code)
            .with_message(&self.message)
            .with_label(Label::new((file_name.clone(), offset..offset + 1)).with_message(&self.snippet))
            .finish();
        let _ = report.write((file_name, Source::from(source)), &mut out);
        String::from_utf8_lossy(&out).into_owned()
    }
}

fn byte_offset_for(source: &str, line: u32, column: u32) -> usize {
    let mut cur_line = 1u32;
    let mut offset = 0usize;
    for ch in source.chars() {
        if cur_line == line {
            break;
        }
        if ch == '\n' {
            cur_line += 1;
        }
        offset += ch.len_utf8();
    }
    let mut cur_col = 1u32;
    for ch in source[offset..].chars() {
        if cur_col == column || ch == '\n' {
            break;
        }
        cur_col += 1;
        offset += ch.len_utf8();
    }
    offset
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_has_error_severity() {
        let d = Diagnostic::error(
            codes::TYPE_NOT_ASSIGNABLE,
            "boolean is not assignable to string | number",
            Position::new(1, 5),
            "const x: string | number = true;",
            Category::Type,
        );
        assert_eq!(d.severity, Severity::Error);
        assert_eq!(d.code, "TYPE_NOT_ASSIGNABLE");
    }

    #[test]
    fn warning_has_warning_severity() {
        let d = Diagnostic::warning(
            codes::UNUSED_IMPORT,
            "imported name is never used",
            Position::new(2, 1),
            "import { x } from \"./a\";",
            Category::Validation,
        );
        assert_eq!(d.severity, Severity::Warning);
    }

    #[test]
    fn render_does_not_panic_on_first_line() {
        let d = Diagnostic::error(
            codes::UNEXPECTED_TOKEN,
            "unexpected token",
            Position::new(1, 1),
            "агар",
            Category::Syntax,
        );
        let rendered = d.render("агар (дуруст) {}");
        assert!(rendered.contains("UNEXPECTED_TOKEN"));
    }
}
