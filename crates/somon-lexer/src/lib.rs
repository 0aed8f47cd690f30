//! Tokenizer for SomonScript (`spec.md` §4.1, C2).
//!
//! `tokenize` turns a source string into a token sequence ending in `Eof`,
//! or fails on the first unterminated string/template, doubled decimal
//! point, or unknown character.

mod cursor;
mod error;

use cursor::Cursor;
pub use error::LexError;
use somon_common::{keyword_from_str, Position, Token, TokenKind};

const BOM: char = '\u{FEFF}';

pub fn tokenize(source: &str) -> Result<Vec<Token>, LexError> {
    let source = source.strip_prefix(BOM).unwrap_or(source);
    Lexer::new(source).run()
}

fn is_cyrillic(c: char) -> bool {
    ('\u{0400}'..='\u{052F}').contains(&c)
}

fn is_ident_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_' || is_cyrillic(c)
}

fn is_ident_continue(c: char) -> bool {
    is_ident_start(c) || c.is_ascii_digit()
}

struct Lexer<'src> {
    cursor: Cursor<'src>,
    tokens: Vec<Token>,
}

impl<'src> Lexer<'src> {
    fn new(source: &'src str) -> Self {
        Self {
            cursor: Cursor::new(source),
            tokens: Vec::new(),
        }
    }

    fn run(mut self) -> Result<Vec<Token>, LexError> {
        loop {
            let Some(c) = self.cursor.peek() else {
                break;
            };
            match c {
                ' ' | '\t' | '\r' => {
                    self.cursor.advance();
                }
                '\n' => {
                    let pos = self.cursor.position();
                    self.cursor.advance();
                    self.tokens.push(Token::new(TokenKind::Newline, "\n", pos));
                }
                '/' if self.cursor.peek_next() == Some('/') => {
                    self.cursor.eat_while(|ch| ch != '\n');
                }
                c if is_ident_start(c) => {
                    let tok = self.lex_identifier();
                    self.tokens.push(tok);
                }
                c if c.is_ascii_digit() => {
                    let tok = self.lex_number()?;
                    self.tokens.push(tok);
                }
                '"' | '\'' => {
                    let tok = self.lex_string(c)?;
                    self.tokens.push(tok);
                }
                '`' => {
                    let tok = self.lex_template()?;
                    self.tokens.push(tok);
                }
                _ => {
                    let tok = self.lex_operator_or_punct()?;
                    self.tokens.push(tok);
                }
            }
        }
        self.tokens.push(Token::new(TokenKind::Eof, "", self.cursor.position()));
        Ok(self.tokens)
    }

    fn lex_identifier(&mut self) -> Token {
        let start_byte = self.cursor.byte_pos();
        let start_pos = self.cursor.position();
        self.cursor.eat_while(is_ident_continue);
        let lexeme = self.cursor.slice(start_byte, self.cursor.byte_pos()).to_string();
        let lowered = lexeme.to_lowercase();
        let kind = keyword_from_str(&lowered).unwrap_or(TokenKind::Identifier);
        Token::new(kind, lexeme, start_pos)
    }

    fn lex_number(&mut self) -> Result<Token, LexError> {
        let start_byte = self.cursor.byte_pos();
        let start_pos = self.cursor.position();
        self.cursor.eat_while(|c| c.is_ascii_digit());
        if self.cursor.peek() == Some('.') {
            self.cursor.advance();
            self.cursor.eat_while(|c| c.is_ascii_digit());
            if self.cursor.peek() == Some('.') {
                return Err(LexError::new(
                    self.cursor.position(),
                    "number literal has more than one decimal point",
                ));
            }
        }
        let lexeme = self.cursor.slice(start_byte, self.cursor.byte_pos()).to_string();
        Ok(Token::new(TokenKind::Number, lexeme, start_pos))
    }

    /// Scan a `"`/`'` delimited string. The stored lexeme is the raw
    /// interior text (unprocessed escapes) -- escape resolution is an AST
    /// concern (`Literal.value` vs `Literal.raw`), not the lexer's.
    fn lex_string(&mut self, quote: char) -> Result<Token, LexError> {
        let open_pos = self.cursor.position();
        self.cursor.advance();
        let content_start = self.cursor.byte_pos();
        loop {
            match self.cursor.peek() {
                None => return Err(LexError::new(open_pos, "unterminated string literal")),
                Some(c) if c == quote => {
                    let content_end = self.cursor.byte_pos();
                    self.cursor.advance();
                    let lexeme = self.cursor.slice(content_start, content_end).to_string();
                    return Ok(Token::new(TokenKind::StringLit, lexeme, open_pos));
                }
                Some('\\') => {
                    self.cursor.advance();
                    if self.cursor.peek().is_some() {
                        self.cursor.advance();
                    }
                }
                Some(_) => {
                    self.cursor.advance();
                }
            }
        }
    }

    /// Scan a backtick-delimited template literal. `${...}` interpolations
    /// are captured verbatim inside the raw lexeme; splitting them into
    /// quasis and expressions happens in the parser (`spec.md` §4.1's
    /// deferred "second lexer pass").
    fn lex_template(&mut self) -> Result<Token, LexError> {
        let open_pos = self.cursor.position();
        self.cursor.advance();
        let content_start = self.cursor.byte_pos();
        loop {
            match self.cursor.peek() {
                None => return Err(LexError::new(open_pos, "unterminated template literal")),
                Some('`') => {
                    let content_end = self.cursor.byte_pos();
                    self.cursor.advance();
                    let lexeme = self.cursor.slice(content_start, content_end).to_string();
                    return Ok(Token::new(TokenKind::TemplateString, lexeme, open_pos));
                }
                Some('\\') => {
                    self.cursor.advance();
                    if self.cursor.peek().is_some() {
                        self.cursor.advance();
                    }
                }
                Some(_) => {
                    self.cursor.advance();
                }
            }
        }
    }

    fn lex_operator_or_punct(&mut self) -> Result<Token, LexError> {
        use TokenKind::*;
        let pos = self.cursor.position();
        let c = self.cursor.advance().expect("checked by caller");
        let kind = match c {
            '(' => LParen,
            ')' => RParen,
            '{' => LBrace,
            '}' => RBrace,
            '[' => LBracket,
            ']' => RBracket,
            ',' => Comma,
            ';' => Semicolon,
            ':' => Colon,
            '~' => Tilde,
            '.' => {
                if self.cursor.peek() == Some('.') && self.cursor.peek_next() == Some('.') {
                    self.cursor.advance();
                    self.cursor.advance();
                    DotDotDot
                } else {
                    Dot
                }
            }
            '+' => {
                if self.eat('+') {
                    PlusPlus
                } else if self.eat('=') {
                    PlusEq
                } else {
                    Plus
                }
            }
            '-' => {
                if self.eat('-') {
                    MinusMinus
                } else if self.eat('=') {
                    MinusEq
                } else {
                    Minus
                }
            }
            '*' => {
                if self.eat('*') {
                    if self.eat('=') {
                        StarStarEq
                    } else {
                        StarStar
                    }
                } else if self.eat('=') {
                    StarEq
                } else {
                    Star
                }
            }
            '/' => {
                if self.eat('=') {
                    SlashEq
                } else {
                    Slash
                }
            }
            '%' => {
                if self.eat('=') {
                    PercentEq
                } else {
                    Percent
                }
            }
            '=' => {
                if self.eat('=') {
                    if self.eat('=') {
                        EqEqEq
                    } else {
                        EqEq
                    }
                } else if self.eat('>') {
                    FatArrow
                } else {
                    Eq
                }
            }
            '!' => {
                if self.eat('=') {
                    if self.eat('=') {
                        BangEqEq
                    } else {
                        BangEq
                    }
                } else {
                    Bang
                }
            }
            '<' => {
                if self.eat('<') {
                    if self.eat('=') {
                        LtLtEq
                    } else {
                        LtLt
                    }
                } else if self.eat('=') {
                    LtEq
                } else {
                    Lt
                }
            }
            '>' => {
                if self.eat('>') {
                    if self.eat('>') {
                        if self.eat('=') {
                            GtGtGtEq
                        } else {
                            GtGtGt
                        }
                    } else if self.eat('=') {
                        GtGtEq
                    } else {
                        GtGt
                    }
                } else if self.eat('=') {
                    GtEq
                } else {
                    Gt
                }
            }
            '&' => {
                if self.eat('&') {
                    if self.eat('=') {
                        AmpAmpEq
                    } else {
                        AmpAmp
                    }
                } else if self.eat('=') {
                    AmpEq
                } else {
                    Amp
                }
            }
            '|' => {
                if self.eat('|') {
                    if self.eat('=') {
                        PipePipeEq
                    } else {
                        PipePipe
                    }
                } else if self.eat('=') {
                    PipeEq
                } else {
                    Pipe
                }
            }
            '^' => {
                if self.eat('=') {
                    CaretEq
                } else {
                    Caret
                }
            }
            '?' => {
                if self.eat('?') {
                    if self.eat('=') {
                        QuestionQuestionEq
                    } else {
                        QuestionQuestion
                    }
                } else if self.eat('.') {
                    QuestionDot
                } else {
                    Question
                }
            }
            other => {
                return Err(LexError::new(pos, format!("unexpected character '{other}'")));
            }
        };
        let lexeme = Self::lexeme_for(kind, c);
        Ok(Token::new(kind, lexeme, pos))
    }

    fn eat(&mut self, expected: char) -> bool {
        if self.cursor.peek() == Some(expected) {
            self.cursor.advance();
            true
        } else {
            false
        }
    }

    fn lexeme_for(kind: TokenKind, first: char) -> &'static str {
        use TokenKind::*;
        match kind {
            LParen => "(",
            RParen => ")",
            LBrace => "{",
            RBrace => "}",
            LBracket => "[",
            RBracket => "]",
            Comma => ",",
            Semicolon => ";",
            Colon => ":",
            Tilde => "~",
            Dot => ".",
            DotDotDot => "...",
            Plus => "+",
            PlusPlus => "++",
            PlusEq => "+=",
            Minus => "-",
            MinusMinus => "--",
            MinusEq => "-=",
            Star => "*",
            StarStar => "**",
            StarEq => "*=",
            StarStarEq => "**=",
            Slash => "/",
            SlashEq => "/=",
            Percent => "%",
            PercentEq => "%=",
            Eq => "=",
            EqEq => "==",
            EqEqEq => "===",
            FatArrow => "=>",
            Bang => "!",
            BangEq => "!=",
            BangEqEq => "!==",
            Lt => "<",
            LtLt => "<<",
            LtLtEq => "<<=",
            LtEq => "<=",
            Gt => ">",
            GtGt => ">>",
            GtGtEq => ">>=",
            GtGtGt => ">>>",
            GtGtGtEq => ">>>=",
            GtEq => ">=",
            Amp => "&",
            AmpAmp => "&&",
            AmpAmpEq => "&&=",
            AmpEq => "&=",
            Pipe => "|",
            PipePipe => "||",
            PipePipeEq => "||=",
            PipeEq => "|=",
            Caret => "^",
            CaretEq => "^=",
            Question => "?",
            QuestionQuestion => "??",
            QuestionQuestionEq => "??=",
            QuestionDot => "?.",
            _ => unreachable!("non-operator kind {kind:?} for char {first:?}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use somon_common::TokenKind::*;

    fn kinds(source: &str) -> Vec<TokenKind> {
        tokenize(source).unwrap().into_iter().map(|t| t.kind).collect()
    }

    #[test]
    fn empty_source_is_just_eof() {
        assert_eq!(kinds(""), vec![Eof]);
    }

    #[test]
    fn bom_is_stripped() {
        let with_bom = format!("{BOM}собит x = 1;");
        assert_eq!(kinds(&with_bom), kinds("собит x = 1;"));
    }

    #[test]
    fn simple_declaration() {
        assert_eq!(
            kinds("собит PI = 3.14;"),
            vec![Const, Identifier, Eq, Number, Semicolon, Eof]
        );
    }

    #[test]
    fn identifier_case_insensitive_keyword_match() {
        assert_eq!(kinds("СОБИТ x;"), vec![Const, Identifier, Semicolon, Eof]);
    }

    #[test]
    fn number_with_two_dots_is_an_error() {
        let err = tokenize("1.2.3").unwrap_err();
        assert_eq!(err.position, Position::new(1, 4));
    }

    #[test]
    fn unterminated_string_errors_at_opening_quote() {
        let err = tokenize("\"abc").unwrap_err();
        assert_eq!(err.position, Position::new(1, 1));
    }

    #[test]
    fn unterminated_template_errors_at_opening_backtick() {
        let err = tokenize("`abc").unwrap_err();
        assert_eq!(err.position, Position::new(1, 1));
    }

    #[test]
    fn string_with_escaped_quote_is_not_terminated_early() {
        let toks = tokenize(r#""a\"b""#).unwrap();
        assert_eq!(toks[0].kind, StringLit);
        assert_eq!(toks[0].lexeme, r#"a\"b"#);
    }

    #[test]
    fn template_literal_captures_interpolation_verbatim() {
        let toks = tokenize("`hi ${ad + 1}!`").unwrap();
        assert_eq!(toks[0].kind, TemplateString);
        assert_eq!(toks[0].lexeme, "hi ${ad + 1}!");
    }

    #[test]
    fn newline_is_emitted_as_a_token() {
        assert_eq!(kinds("а\nб"), vec![Identifier, Newline, Identifier, Eof]);
    }

    #[test]
    fn line_comment_consumed_to_end_of_line() {
        assert_eq!(kinds("а // comment\nб"), vec![Identifier, Newline, Identifier, Eof]);
    }

    #[test]
    fn unknown_character_is_an_error() {
        let err = tokenize("@").unwrap_err();
        assert_eq!(err.position, Position::new(1, 1));
    }

    #[test]
    fn operator_longest_match_plus_family() {
        assert_eq!(kinds("+ ++ +="), vec![Plus, PlusPlus, PlusEq, Eof]);
    }

    #[test]
    fn operator_longest_match_star_family() {
        assert_eq!(kinds("* ** **= *="), vec![Star, StarStar, StarStarEq, StarEq, Eof]);
    }

    #[test]
    fn operator_longest_match_shift_family() {
        assert_eq!(
            kinds(">> >>> >>>= >>= >="),
            vec![GtGt, GtGtGt, GtGtGtEq, GtGtEq, GtEq, Eof]
        );
    }

    #[test]
    fn operator_longest_match_question_family() {
        assert_eq!(
            kinds("?? ??= ?. ?"),
            vec![QuestionQuestion, QuestionQuestionEq, QuestionDot, Question, Eof]
        );
    }

    #[test]
    fn operator_longest_match_dot_family() {
        assert_eq!(kinds("... ."), vec![DotDotDot, Dot, Eof]);
    }

    #[test]
    fn cyrillic_identifier_with_trailing_digit() {
        assert_eq!(kinds("ном1"), vec![Identifier, Eof]);
    }

    #[test]
    fn builtin_namespace_tokens() {
        assert_eq!(kinds("console.log"), vec![Console, Dot, Identifier, Eof]);
    }

    #[test]
    fn positions_are_in_source_bounds_for_every_token() {
        let toks = tokenize("собит x = \"ҳи\" + 1;\n").unwrap();
        for tok in &toks {
            assert!(tok.position.line >= 1 && tok.position.column >= 1);
        }
    }
}
