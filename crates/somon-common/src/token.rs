use crate::position::Position;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A single lexical token: its kind, the original source slice, and position.
///
/// Lexemes preserve original casing even though keyword classification is
/// case-insensitive.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Token {
    pub kind: TokenKind,
    pub lexeme: String,
    pub position: Position,
}

impl Token {
    pub fn new(kind: TokenKind, lexeme: impl Into<String>, position: Position) -> Self {
        Self {
            kind,
            lexeme: lexeme.into(),
            position,
        }
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?} {:?} at {}", self.kind, self.lexeme, self.position)
    }
}

/// The closed set of token kinds produced by the lexer.
///
/// Keywords are grouped by rough purpose (declaration, control flow, module,
/// type). Built-in namespace identifiers (`console`, `Math`, `Array`,
/// `String`, `Object`) get their own kinds because the grammar treats them as
/// reserved receivers in specific positions; their *methods* (`log`, `push`,
/// `map`, ...) stay ordinary identifiers and are recognized later, by name,
/// during code generation -- see `somon-codegen`'s builtin remap table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TokenKind {
    // ---- literals & identifiers ----
    Number,
    StringLit,
    TemplateString,
    Identifier,

    // ---- declaration keywords ----
    Mutable,
    Const,
    Function,
    Class,
    Interface,
    TypeKw,
    Namespace,
    Extends,
    Implements,
    Constructor,
    Private,
    Protected,
    Public,
    Static,
    Abstract,
    Super,
    This,
    New,

    // ---- control-flow keywords ----
    If,
    Else,
    While,
    For,
    Return,
    Break,
    Continue,
    Switch,
    Case,
    Throw,
    Try,
    Catch,
    Finally,

    // ---- module keywords ----
    Import,
    Export,
    From,
    As,
    Default,
    Of,

    // ---- async ----
    Async,
    Await,

    // ---- value-literal keywords ----
    True,
    False,
    Null,
    Undefined,

    // ---- operator-shaped keywords ----
    In,
    Instanceof,
    Typeof,
    Keyof,
    Readonly,
    Unique,

    // ---- primitive type keywords ----
    StringType,
    NumberType,
    BooleanType,
    AnyType,
    UnknownType,
    NeverType,
    VoidType,
    ObjectType,

    // ---- built-in namespace identifiers ----
    Console,
    MathNs,
    ArrayNs,
    StringNs,
    ObjectNs,

    // ---- operators (70+ variants) ----
    Plus,
    Minus,
    Star,
    Slash,
    Percent,
    StarStar,
    PlusPlus,
    MinusMinus,
    Eq,
    EqEq,
    EqEqEq,
    Bang,
    BangEq,
    BangEqEq,
    Lt,
    LtEq,
    Gt,
    GtEq,
    AmpAmp,
    PipePipe,
    QuestionQuestion,
    Amp,
    Pipe,
    Caret,
    Tilde,
    LtLt,
    GtGt,
    GtGtGt,
    PlusEq,
    MinusEq,
    StarEq,
    SlashEq,
    PercentEq,
    StarStarEq,
    AmpAmpEq,
    PipePipeEq,
    QuestionQuestionEq,
    AmpEq,
    PipeEq,
    CaretEq,
    LtLtEq,
    GtGtEq,
    GtGtGtEq,
    FatArrow,
    Question,
    QuestionDot,
    DotDotDot,

    // ---- punctuation / delimiters ----
    LParen,
    RParen,
    LBrace,
    RBrace,
    LBracket,
    RBracket,
    Comma,
    Semicolon,
    Colon,
    Dot,

    // ---- terminals ----
    Newline,
    Eof,
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

/// Map a lowercased identifier lexeme to its reserved keyword kind, if any.
///
/// Classification is case-insensitive: callers lowercase the scanned lexeme
/// before calling this, then keep the original-cased lexeme for the token.
pub fn keyword_from_str(lowered: &str) -> Option<TokenKind> {
    use TokenKind::*;
    Some(match lowered {
        "тағйирёбанда" => Mutable,
        "собит" => Const,
        "функсия" => Function,
        "синф" => Class,
        "интерфейс" => Interface,
        "навъ" => TypeKw,
        "фазо" => Namespace,
        "густариш" => Extends,
        "татбиқ" => Implements,
        "созанда" => Constructor,
        "хусусӣ" => Private,
        "ҳифзшуда" => Protected,
        "ҷамъиятӣ" => Public,
        "статикӣ" => Static,
        "абстрактӣ" => Abstract,
        "супер" => Super,
        "ин" => This,
        "нав" => New,

        "агар" => If,
        "вагарна" => Else,
        "то" => While,
        "барои" => For,
        "баргардон" => Return,
        "шикастан" => Break,
        "идома" => Continue,
        "интихоб" => Switch,
        "ҳолат" => Case,
        "партофтан" => Throw,
        "кӯшиш" => Try,
        "гирифтан" => Catch,
        "ниҳоят" => Finally,

        "содир" => Import,
        "содирот" => Export,
        "аз" => From,
        "чун" => As,
        "пешфарз" => Default,
        "дарун" => Of,

        "ҳамзамон" => Async,
        "интизор" => Await,

        "дуруст" => True,
        "нодуруст" => False,
        "холӣ" => Null,
        "номуайян" => Undefined,

        "дар" => In,
        "намуна" => Instanceof,
        "навъи" => Typeof,
        "калиди" => Keyof,
        "фақатхон" => Readonly,
        "ягона" => Unique,

        "сатр" => StringType,
        "рақам" => NumberType,
        "мантиқӣ" => BooleanType,
        "ҳарвақта" => AnyType,
        "номаълум" => UnknownType,
        "ҳеҷ" => NeverType,
        "холигӣ" => VoidType,
        "объект" => ObjectType,

        "console" => Console,
        "math" => MathNs,
        "array" => ArrayNs,
        "string" => StringNs,
        "object" => ObjectNs,

        _ => return None,
    })
}

/// All keyword lexemes, for exhaustive lexer tests.
#[cfg(test)]
pub(crate) const ALL_KEYWORD_LEXEMES: &[&str] = &[
    "тағйирёбанда",
    "собит",
    "функсия",
    "синф",
    "интерфейс",
    "навъ",
    "фазо",
    "густариш",
    "татбиқ",
    "созанда",
    "хусусӣ",
    "ҳифзшуда",
    "ҷамъиятӣ",
    "статикӣ",
    "абстрактӣ",
    "супер",
    "ин",
    "нав",
    "агар",
    "вагарна",
    "то",
    "барои",
    "баргардон",
    "шикастан",
    "идома",
    "интихоб",
    "ҳолат",
    "партофтан",
    "кӯшиш",
    "гирифтан",
    "ниҳоят",
    "содир",
    "содирот",
    "аз",
    "чун",
    "пешфарз",
    "дарун",
    "ҳамзамон",
    "интизор",
    "дуруст",
    "нодуруст",
    "холӣ",
    "номуайян",
    "дар",
    "намуна",
    "навъи",
    "калиди",
    "фақатхон",
    "ягона",
    "сатр",
    "рақам",
    "мантиқӣ",
    "ҳарвақта",
    "номаълум",
    "ҳеҷ",
    "холигӣ",
    "объект",
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_keyword_lexeme_resolves() {
        for lexeme in ALL_KEYWORD_LEXEMES {
            assert!(
                keyword_from_str(lexeme).is_some(),
                "expected {lexeme} to be a keyword"
            );
        }
    }

    #[test]
    fn unknown_word_is_not_a_keyword() {
        assert_eq!(keyword_from_str("салом"), None);
    }

    #[test]
    fn builtin_namespace_is_case_sensitive_lookup_but_lowercased_first() {
        assert_eq!(keyword_from_str("console"), Some(TokenKind::Console));
        assert_eq!(keyword_from_str("math"), Some(TokenKind::MathNs));
    }

    #[test]
    fn token_display_includes_kind_and_lexeme() {
        let tok = Token::new(TokenKind::Const, "собит", Position::start());
        let rendered = tok.to_string();
        assert!(rendered.contains("Const"));
        assert!(rendered.contains("собит"));
    }
}
