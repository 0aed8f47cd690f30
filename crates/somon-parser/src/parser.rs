//! Recursive-descent parser with precedence climbing (`spec.md` §4.2).
//!
//! Produces the tagged AST directly -- no intermediate lossless tree. On a
//! statement-level failure the parser records a `ParseError` and
//! synchronizes to the next statement boundary, so one `parse()` call can
//! surface several independent errors.

use crate::ast::*;
use crate::error::ParseError;
use somon_common::{Position, Token, TokenKind};

pub fn parse(tokens: Vec<Token>) -> Result<Program, Vec<ParseError>> {
    let mut parser = Parser::new(tokens);
    let body = parser.parse_program_body();
    if parser.errors.is_empty() {
        Ok(Program { body })
    } else {
        Err(parser.errors)
    }
}

/// Statement-starting keywords, used both for statement dispatch and as
/// synchronization points after a parse error.
fn starts_statement(kind: TokenKind) -> bool {
    use TokenKind::*;
    matches!(
        kind,
        Import
            | Export
            | Interface
            | TypeKw
            | Namespace
            | Mutable
            | Const
            | Function
            | Async
            | Try
            | Throw
            | If
            | While
            | For
            | Return
            | Switch
            | Break
            | Continue
            | Class
            | LBrace
            | Eof
    )
}

pub struct Parser {
    tokens: Vec<Token>,
    pos: usize,
    errors: Vec<ParseError>,
}

impl Parser {
    pub fn new(tokens: Vec<Token>) -> Self {
        let mut p = Self {
            tokens,
            pos: 0,
            errors: Vec::new(),
        };
        p.skip_newlines();
        p
    }

    // ---- token stream plumbing ----

    fn skip_newlines(&mut self) {
        while self.tokens[self.pos].kind == TokenKind::Newline {
            self.pos += 1;
        }
    }

    fn current(&self) -> &Token {
        &self.tokens[self.pos]
    }

    fn current_kind(&self) -> TokenKind {
        self.tokens[self.pos].kind
    }

    /// Look `n` tokens ahead, skipping newlines, without consuming anything.
    fn nth(&self, n: usize) -> &Token {
        let mut idx = self.pos;
        let mut seen = 0;
        loop {
            if self.tokens[idx].kind != TokenKind::Newline {
                if seen == n {
                    return &self.tokens[idx];
                }
                seen += 1;
            }
            if self.tokens[idx].kind == TokenKind::Eof {
                return &self.tokens[idx];
            }
            idx += 1;
        }
    }

    fn advance(&mut self) -> Token {
        let tok = self.tokens[self.pos].clone();
        if tok.kind != TokenKind::Eof {
            self.pos += 1;
        }
        self.skip_newlines();
        tok
    }

    fn at(&self, kind: TokenKind) -> bool {
        self.current_kind() == kind
    }

    fn eat(&mut self, kind: TokenKind) -> bool {
        if self.at(kind) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn expect(&mut self, kind: TokenKind) -> Result<Token, ParseError> {
        if self.at(kind) {
            Ok(self.advance())
        } else {
            Err(self.error_expected(&format!("{kind:?}")))
        }
    }

    fn eat_semicolon(&mut self) {
        self.eat(TokenKind::Semicolon);
    }

    fn error_expected(&self, expected: &str) -> ParseError {
        let found = self.current();
        ParseError::new(
            found.position,
            expected.to_string(),
            format!("{:?} {:?}", found.kind, found.lexeme),
        )
    }

    /// Panic-mode recovery: discard tokens until the next statement-starting
    /// keyword or a semicolon (`spec.md` §4.2).
    fn synchronize(&mut self) {
        loop {
            if self.at(TokenKind::Semicolon) {
                self.advance();
                return;
            }
            if starts_statement(self.current_kind()) {
                return;
            }
            self.advance();
        }
    }

    // ---- program / statements ----

    fn parse_program_body(&mut self) -> Vec<Stmt> {
        let mut body = Vec::new();
        while !self.at(TokenKind::Eof) {
            match self.parse_statement() {
                Ok(stmt) => body.push(stmt),
                Err(err) => {
                    self.errors.push(err);
                    self.synchronize();
                }
            }
        }
        body
    }

    fn parse_statement(&mut self) -> Result<Stmt, ParseError> {
        use TokenKind::*;
        match self.current_kind() {
            Import => self.parse_import(),
            Export => self.parse_export(),
            Interface => self.parse_interface(),
            TypeKw => self.parse_type_alias(),
            Namespace => self.parse_namespace(),
            Mutable | Const => self.parse_variable_declaration(),
            Function => self.parse_function_declaration(false),
            Async if self.nth(1).kind == Function => {
                self.advance();
                self.parse_function_declaration(true)
            }
            Class => self.parse_class_declaration(),
            Try => self.parse_try(),
            Throw => self.parse_throw(),
            If => self.parse_if(),
            While => self.parse_while(),
            For => self.parse_for(),
            Return => self.parse_return(),
            Switch => self.parse_switch(),
            Break => {
                let pos = self.advance().position;
                self.eat_semicolon();
                Ok(Stmt::new(StmtKind::Break, pos))
            }
            Continue => {
                let pos = self.advance().position;
                self.eat_semicolon();
                Ok(Stmt::new(StmtKind::Continue, pos))
            }
            LBrace => {
                let block = self.parse_block()?;
                let pos = block.position;
                Ok(Stmt::new(StmtKind::Block(block), pos))
            }
            _ => self.parse_expression_statement(),
        }
    }

    fn parse_block(&mut self) -> Result<Block, ParseError> {
        let open = self.expect(TokenKind::LBrace)?;
        let mut body = Vec::new();
        while !self.at(TokenKind::RBrace) && !self.at(TokenKind::Eof) {
            match self.parse_statement() {
                Ok(stmt) => body.push(stmt),
                Err(err) => {
                    self.errors.push(err);
                    self.synchronize();
                }
            }
        }
        self.expect(TokenKind::RBrace)?;
        Ok(Block {
            body,
            position: open.position,
        })
    }

    fn var_kind_from(kind: TokenKind) -> VarKind {
        if kind == TokenKind::Const {
            VarKind::Const
        } else {
            VarKind::Mutable
        }
    }

    fn parse_variable_declaration(&mut self) -> Result<Stmt, ParseError> {
        let kw = self.advance();
        let var_kind = Self::var_kind_from(kw.kind);
        let pattern = self.parse_binding_target()?;
        let type_annotation = if self.eat(TokenKind::Colon) {
            Some(self.parse_type()?)
        } else {
            None
        };
        let init = if self.eat(TokenKind::Eq) {
            Some(self.parse_assignment_expr()?)
        } else {
            None
        };
        self.eat_semicolon();
        Ok(Stmt::new(
            StmtKind::VariableDeclaration {
                kind: var_kind,
                pattern,
                type_annotation,
                init,
            },
            kw.position,
        ))
    }

    /// Identifier, a built-in namespace name used as a binding, or a
    /// destructuring pattern.
    fn parse_binding_target(&mut self) -> Result<Pattern, ParseError> {
        match self.current_kind() {
            TokenKind::LBracket => self.parse_array_pattern(),
            TokenKind::LBrace => self.parse_object_pattern(),
            _ => {
                let tok = self.expect_binding_name()?;
                Ok(Pattern::identifier(tok.lexeme, tok.position))
            }
        }
    }

    fn expect_binding_name(&mut self) -> Result<Token, ParseError> {
        use TokenKind::*;
        match self.current_kind() {
            Identifier | Console | MathNs | ArrayNs | StringNs | ObjectNs => Ok(self.advance()),
            _ => Err(self.error_expected("identifier")),
        }
    }

    fn parse_array_pattern(&mut self) -> Result<Pattern, ParseError> {
        let open = self.expect(TokenKind::LBracket)?;
        let mut elements = Vec::new();
        while !self.at(TokenKind::RBracket) && !self.at(TokenKind::Eof) {
            if self.at(TokenKind::Comma) {
                elements.push(None);
                self.advance();
                continue;
            }
            if self.at(TokenKind::DotDotDot) {
                let pos = self.advance().position;
                let argument = self.parse_binding_target()?;
                elements.push(Some(Pattern::new(
                    PatternKind::RestElement { argument: Box::new(argument) },
                    pos,
                )));
            } else {
                elements.push(Some(self.parse_binding_target()?));
            }
            if !self.at(TokenKind::RBracket) {
                self.eat(TokenKind::Comma);
            }
        }
        self.expect(TokenKind::RBracket)?;
        Ok(Pattern::new(PatternKind::ArrayPattern { elements }, open.position))
    }

    fn parse_object_pattern(&mut self) -> Result<Pattern, ParseError> {
        let open = self.expect(TokenKind::LBrace)?;
        let mut properties = Vec::new();
        while !self.at(TokenKind::RBrace) && !self.at(TokenKind::Eof) {
            let key_tok = self.expect_binding_name()?;
            if self.eat(TokenKind::Colon) {
                let value = self.parse_binding_target()?;
                properties.push(PropertyPattern {
                    key: key_tok.lexeme,
                    value,
                    computed: false,
                    shorthand: false,
                });
            } else {
                properties.push(PropertyPattern {
                    key: key_tok.lexeme.clone(),
                    value: Pattern::identifier(key_tok.lexeme, key_tok.position),
                    computed: false,
                    shorthand: true,
                });
            }
            if !self.at(TokenKind::RBrace) {
                self.eat(TokenKind::Comma);
            }
        }
        self.expect(TokenKind::RBrace)?;
        Ok(Pattern::new(PatternKind::ObjectPattern { properties }, open.position))
    }

    fn parse_function_declaration(&mut self, is_async: bool) -> Result<Stmt, ParseError> {
        let kw = self.expect(TokenKind::Function)?;
        let name = self.expect_binding_name()?.lexeme;
        let params = self.parse_param_list()?;
        let return_type = if self.eat(TokenKind::Colon) {
            Some(self.parse_type()?)
        } else {
            None
        };
        let body = self.parse_block()?;
        Ok(Stmt::new(
            StmtKind::FunctionDeclaration {
                name,
                params,
                return_type,
                body,
                is_async,
            },
            kw.position,
        ))
    }

    fn parse_param_list(&mut self) -> Result<Vec<Param>, ParseError> {
        self.expect(TokenKind::LParen)?;
        let mut params = Vec::new();
        while !self.at(TokenKind::RParen) && !self.at(TokenKind::Eof) {
            params.push(self.parse_param()?);
            if !self.at(TokenKind::RParen) {
                self.eat(TokenKind::Comma);
            }
        }
        self.expect(TokenKind::RParen)?;
        Ok(params)
    }

    fn parse_param(&mut self) -> Result<Param, ParseError> {
        let pattern = self.parse_binding_target()?;
        let type_annotation = if self.eat(TokenKind::Colon) {
            Some(self.parse_type()?)
        } else {
            None
        };
        let default = if self.eat(TokenKind::Eq) {
            Some(self.parse_assignment_expr()?)
        } else {
            None
        };
        Ok(Param {
            pattern,
            type_annotation,
            default,
        })
    }

    fn parse_class_declaration(&mut self) -> Result<Stmt, ParseError> {
        let kw = self.expect(TokenKind::Class)?;
        let name = self.expect_binding_name()?.lexeme;
        let super_class = if self.eat(TokenKind::Extends) {
            Some(self.expect_binding_name()?.lexeme)
        } else {
            None
        };
        let mut implements = Vec::new();
        if self.eat(TokenKind::Implements) {
            implements.push(self.expect_binding_name()?.lexeme);
            while self.eat(TokenKind::Comma) {
                implements.push(self.expect_binding_name()?.lexeme);
            }
        }
        self.expect(TokenKind::LBrace)?;
        let mut body = Vec::new();
        while !self.at(TokenKind::RBrace) && !self.at(TokenKind::Eof) {
            body.push(self.parse_class_member()?);
        }
        self.expect(TokenKind::RBrace)?;
        Ok(Stmt::new(
            StmtKind::ClassDeclaration {
                name,
                super_class,
                implements,
                body,
            },
            kw.position,
        ))
    }

    fn parse_class_member(&mut self) -> Result<ClassMember, ParseError> {
        use TokenKind::*;
        let mut modifiers = Modifiers::default();
        loop {
            match self.current_kind() {
                Public => {
                    modifiers.visibility = Visibility::Public;
                    self.advance();
                }
                Private => {
                    modifiers.visibility = Visibility::Private;
                    self.advance();
                }
                Protected => {
                    modifiers.visibility = Visibility::Protected;
                    self.advance();
                }
                Static => {
                    modifiers.is_static = true;
                    self.advance();
                }
                Abstract => {
                    modifiers.is_abstract = true;
                    self.advance();
                }
                Readonly => {
                    modifiers.is_readonly = true;
                    self.advance();
                }
                _ => break,
            }
        }
        let is_async = self.eat(TokenKind::Async);
        if self.at(TokenKind::Constructor) {
            self.advance();
            let params = self.parse_param_list()?;
            let body = Some(self.parse_block()?);
            return Ok(ClassMember::Method {
                name: "constructor".to_string(),
                params,
                return_type: None,
                body,
                modifiers,
                is_async: false,
                is_constructor: true,
            });
        }
        let name_tok = self.expect_binding_name()?;
        if self.at(TokenKind::LParen) {
            let params = self.parse_param_list()?;
            let return_type = if self.eat(TokenKind::Colon) {
                Some(self.parse_type()?)
            } else {
                None
            };
            let body = if modifiers.is_abstract {
                self.eat_semicolon();
                None
            } else {
                Some(self.parse_block()?)
            };
            Ok(ClassMember::Method {
                name: name_tok.lexeme,
                params,
                return_type,
                body,
                modifiers,
                is_async,
                is_constructor: false,
            })
        } else {
            let type_annotation = if self.eat(TokenKind::Colon) {
                Some(self.parse_type()?)
            } else {
                None
            };
            let initializer = if self.eat(TokenKind::Eq) {
                Some(self.parse_assignment_expr()?)
            } else {
                None
            };
            self.eat_semicolon();
            Ok(ClassMember::Property {
                name: name_tok.lexeme,
                type_annotation,
                initializer,
                modifiers,
            })
        }
    }

    fn parse_interface(&mut self) -> Result<Stmt, ParseError> {
        let kw = self.expect(TokenKind::Interface)?;
        let name = self.expect_binding_name()?.lexeme;
        let type_parameters = self.parse_optional_type_param_list()?;
        self.expect(TokenKind::LBrace)?;
        let mut body = Vec::new();
        while !self.at(TokenKind::RBrace) && !self.at(TokenKind::Eof) {
            body.push(self.parse_interface_member()?);
        }
        self.expect(TokenKind::RBrace)?;
        Ok(Stmt::new(
            StmtKind::InterfaceDeclaration {
                name,
                type_parameters,
                body,
            },
            kw.position,
        ))
    }

    fn parse_interface_member(&mut self) -> Result<InterfaceMember, ParseError> {
        let readonly = self.eat(TokenKind::Readonly);
        let name = self.expect_binding_name()?.lexeme;
        if self.at(TokenKind::LParen) {
            let params = self.parse_param_list()?;
            let return_type = if self.eat(TokenKind::Colon) {
                Some(self.parse_type()?)
            } else {
                None
            };
            self.eat_semicolon();
            Ok(InterfaceMember::Method {
                name,
                params,
                return_type,
            })
        } else {
            let optional = self.eat(TokenKind::Question);
            self.expect(TokenKind::Colon)?;
            let type_annotation = self.parse_type()?;
            self.eat_semicolon();
            Ok(InterfaceMember::Property {
                name,
                type_annotation,
                optional,
                readonly,
            })
        }
    }

    fn parse_type_alias(&mut self) -> Result<Stmt, ParseError> {
        let kw = self.expect(TokenKind::TypeKw)?;
        let name = self.expect_binding_name()?.lexeme;
        let type_parameters = self.parse_optional_type_param_list()?;
        self.expect(TokenKind::Eq)?;
        let annotation = self.parse_type()?;
        self.eat_semicolon();
        Ok(Stmt::new(
            StmtKind::TypeAlias {
                name,
                type_parameters,
                annotation,
            },
            kw.position,
        ))
    }

    fn parse_optional_type_param_list(&mut self) -> Result<Vec<String>, ParseError> {
        if !self.eat(TokenKind::Lt) {
            return Ok(Vec::new());
        }
        let mut params = vec![self.expect_binding_name()?.lexeme];
        while self.eat(TokenKind::Comma) {
            params.push(self.expect_binding_name()?.lexeme);
        }
        self.consume_closing_angle()?;
        Ok(params)
    }

    fn parse_namespace(&mut self) -> Result<Stmt, ParseError> {
        let kw = self.expect(TokenKind::Namespace)?;
        let name = self.expect_binding_name()?.lexeme;
        self.expect(TokenKind::LBrace)?;
        let mut body = Vec::new();
        while !self.at(TokenKind::RBrace) && !self.at(TokenKind::Eof) {
            match self.parse_statement() {
                Ok(stmt) => body.push(stmt),
                Err(err) => {
                    self.errors.push(err);
                    self.synchronize();
                }
            }
        }
        self.expect(TokenKind::RBrace)?;
        Ok(Stmt::new(
            StmtKind::NamespaceDeclaration {
                name,
                body,
                exported: false,
            },
            kw.position,
        ))
    }

    fn parse_import(&mut self) -> Result<Stmt, ParseError> {
        let kw = self.expect(TokenKind::Import)?;
        let mut specifiers = Vec::new();
        self.parse_import_clause(&mut specifiers)?;
        self.expect(TokenKind::From)?;
        let source = self.expect(TokenKind::StringLit)?.lexeme;
        self.eat_semicolon();
        Ok(Stmt::new(StmtKind::Import { specifiers, source }, kw.position))
    }

    fn parse_import_clause(&mut self, specifiers: &mut Vec<ImportSpecifier>) -> Result<(), ParseError> {
        // `* as ns` is lexed as Star (bitwise-xor-free: '*' is TokenKind::Star)
        if self.at(TokenKind::Star) {
            self.advance();
            self.expect(TokenKind::As)?;
            let local = self.expect_binding_name()?.lexeme;
            specifiers.push(ImportSpecifier::Namespace(local));
            return Ok(());
        }
        if self.at(TokenKind::LBrace) {
            self.parse_named_import_list(specifiers)?;
            return Ok(());
        }
        // default import, optionally followed by `, { ... }`
        let default_name = self.expect_binding_name()?.lexeme;
        specifiers.push(ImportSpecifier::Default(default_name));
        if self.eat(TokenKind::Comma) {
            if self.at(TokenKind::LBrace) {
                self.parse_named_import_list(specifiers)?;
            } else if self.eat(TokenKind::Star) {
                self.expect(TokenKind::As)?;
                let local = self.expect_binding_name()?.lexeme;
                specifiers.push(ImportSpecifier::Namespace(local));
            }
        }
        Ok(())
    }

    fn parse_named_import_list(&mut self, specifiers: &mut Vec<ImportSpecifier>) -> Result<(), ParseError> {
        self.expect(TokenKind::LBrace)?;
        while !self.at(TokenKind::RBrace) && !self.at(TokenKind::Eof) {
            let imported = self.expect_binding_name()?.lexeme;
            let local = if self.eat(TokenKind::As) {
                self.expect_binding_name()?.lexeme
            } else {
                imported.clone()
            };
            specifiers.push(ImportSpecifier::Named { imported, local });
            if !self.at(TokenKind::RBrace) {
                self.eat(TokenKind::Comma);
            }
        }
        self.expect(TokenKind::RBrace)?;
        Ok(())
    }

    fn parse_export(&mut self) -> Result<Stmt, ParseError> {
        let kw = self.expect(TokenKind::Export)?;
        if self.eat(TokenKind::Default) {
            let expr = self.parse_assignment_expr()?;
            self.eat_semicolon();
            return Ok(Stmt::new(
                StmtKind::Export(ExportKind::Default(Box::new(expr))),
                kw.position,
            ));
        }
        if self.at(TokenKind::Star) {
            self.advance();
            self.expect(TokenKind::From)?;
            let source = self.expect(TokenKind::StringLit)?.lexeme;
            self.eat_semicolon();
            return Ok(Stmt::new(StmtKind::Export(ExportKind::Wildcard { source }), kw.position));
        }
        if self.at(TokenKind::LBrace) {
            self.advance();
            let mut specifiers = Vec::new();
            while !self.at(TokenKind::RBrace) && !self.at(TokenKind::Eof) {
                let local = self.expect_binding_name()?.lexeme;
                let exported = if self.eat(TokenKind::As) {
                    self.expect_binding_name()?.lexeme
                } else {
                    local.clone()
                };
                specifiers.push(ExportSpecifier { local, exported });
                if !self.at(TokenKind::RBrace) {
                    self.eat(TokenKind::Comma);
                }
            }
            self.expect(TokenKind::RBrace)?;
            let source = if self.eat(TokenKind::From) {
                Some(self.expect(TokenKind::StringLit)?.lexeme)
            } else {
                None
            };
            self.eat_semicolon();
            return Ok(Stmt::new(
                StmtKind::Export(ExportKind::Named { specifiers, source }),
                kw.position,
            ));
        }
        let decl = self.parse_statement()?;
        Ok(Stmt::new(
            StmtKind::Export(ExportKind::Declaration(Box::new(decl))),
            kw.position,
        ))
    }

    fn parse_if(&mut self) -> Result<Stmt, ParseError> {
        let kw = self.expect(TokenKind::If)?;
        self.expect(TokenKind::LParen)?;
        let test = self.parse_expression()?;
        self.expect(TokenKind::RParen)?;
        let consequent = Box::new(self.parse_statement()?);
        let alternate = if self.eat(TokenKind::Else) {
            Some(Box::new(self.parse_statement()?))
        } else {
            None
        };
        Ok(Stmt::new(
            StmtKind::If {
                test,
                consequent,
                alternate,
            },
            kw.position,
        ))
    }

    fn parse_while(&mut self) -> Result<Stmt, ParseError> {
        let kw = self.expect(TokenKind::While)?;
        self.expect(TokenKind::LParen)?;
        let test = self.parse_expression()?;
        self.expect(TokenKind::RParen)?;
        let body = Box::new(self.parse_statement()?);
        Ok(Stmt::new(StmtKind::While { test, body }, kw.position))
    }

    fn parse_for(&mut self) -> Result<Stmt, ParseError> {
        let kw = self.expect(TokenKind::For)?;
        self.expect(TokenKind::LParen)?;

        if (self.at(TokenKind::Mutable) || self.at(TokenKind::Const)) {
            let checkpoint = self.pos;
            let var_kw = self.advance();
            let pattern = self.parse_binding_target()?;
            if self.eat(TokenKind::In) {
                let right = self.parse_expression()?;
                self.expect(TokenKind::RParen)?;
                let body = Box::new(self.parse_statement()?);
                return Ok(Stmt::new(StmtKind::ForIn { left: pattern, right, body }, kw.position));
            }
            if self.at(TokenKind::Of) {
                self.advance();
                let right = self.parse_expression()?;
                self.expect(TokenKind::RParen)?;
                let body = Box::new(self.parse_statement()?);
                return Ok(Stmt::new(StmtKind::ForOf { left: pattern, right, body }, kw.position));
            }
            // classical C-style for: rewind and parse as a full variable declaration.
            self.pos = checkpoint;
            let _ = var_kw;
        }

        let init = if self.at(TokenKind::Semicolon) {
            self.advance();
            None
        } else if self.at(TokenKind::Mutable) || self.at(TokenKind::Const) {
            Some(Box::new(self.parse_variable_declaration()?))
        } else {
            let expr = self.parse_expression()?;
            self.expect(TokenKind::Semicolon)?;
            let pos = expr.position;
            Some(Box::new(Stmt::new(StmtKind::ExpressionStatement(expr), pos)))
        };
        let test = if self.at(TokenKind::Semicolon) {
            None
        } else {
            Some(self.parse_expression()?)
        };
        self.expect(TokenKind::Semicolon)?;
        let update = if self.at(TokenKind::RParen) {
            None
        } else {
            Some(self.parse_expression()?)
        };
        self.expect(TokenKind::RParen)?;
        let body = Box::new(self.parse_statement()?);
        Ok(Stmt::new(
            StmtKind::For {
                init,
                test,
                update,
                body,
            },
            kw.position,
        ))
    }

    fn parse_return(&mut self) -> Result<Stmt, ParseError> {
        let kw = self.expect(TokenKind::Return)?;
        let argument = if self.at(TokenKind::Semicolon) || self.at(TokenKind::RBrace) || self.at(TokenKind::Eof) {
            None
        } else {
            Some(self.parse_expression()?)
        };
        self.eat_semicolon();
        Ok(Stmt::new(StmtKind::Return { argument }, kw.position))
    }

    fn parse_throw(&mut self) -> Result<Stmt, ParseError> {
        let kw = self.expect(TokenKind::Throw)?;
        let argument = self.parse_expression()?;
        self.eat_semicolon();
        Ok(Stmt::new(StmtKind::Throw { argument }, kw.position))
    }

    fn parse_try(&mut self) -> Result<Stmt, ParseError> {
        let kw = self.expect(TokenKind::Try)?;
        let block = self.parse_block()?;
        let handler = if self.eat(TokenKind::Catch) {
            let param = if self.eat(TokenKind::LParen) {
                let p = self.parse_binding_target()?;
                self.expect(TokenKind::RParen)?;
                Some(p)
            } else {
                None
            };
            let body = self.parse_block()?;
            Some(CatchClause { param, body })
        } else {
            None
        };
        let finalizer = if self.eat(TokenKind::Finally) {
            Some(self.parse_block()?)
        } else {
            None
        };
        Ok(Stmt::new(
            StmtKind::Try {
                block,
                handler,
                finalizer,
            },
            kw.position,
        ))
    }

    fn parse_switch(&mut self) -> Result<Stmt, ParseError> {
        let kw = self.expect(TokenKind::Switch)?;
        self.expect(TokenKind::LParen)?;
        let discriminant = self.parse_expression()?;
        self.expect(TokenKind::RParen)?;
        self.expect(TokenKind::LBrace)?;
        let mut cases = Vec::new();
        while !self.at(TokenKind::RBrace) && !self.at(TokenKind::Eof) {
            let test = if self.eat(TokenKind::Case) {
                let e = self.parse_expression()?;
                self.expect(TokenKind::Colon)?;
                Some(e)
            } else {
                self.expect(TokenKind::Default)?;
                self.expect(TokenKind::Colon)?;
                None
            };
            let mut consequent = Vec::new();
            while !self.at(TokenKind::Case)
                && !self.at(TokenKind::Default)
                && !self.at(TokenKind::RBrace)
                && !self.at(TokenKind::Eof)
            {
                consequent.push(self.parse_statement()?);
            }
            cases.push(SwitchCase { test, consequent });
        }
        self.expect(TokenKind::RBrace)?;
        Ok(Stmt::new(StmtKind::Switch { discriminant, cases }, kw.position))
    }

    fn parse_expression_statement(&mut self) -> Result<Stmt, ParseError> {
        let expr = self.parse_expression()?;
        let pos = expr.position;
        self.eat_semicolon();
        Ok(Stmt::new(StmtKind::ExpressionStatement(expr), pos))
    }

    // ---- expressions: precedence climbing (spec.md §4.2) ----

    pub fn parse_expression(&mut self) -> Result<Expr, ParseError> {
        self.parse_assignment_expr()
    }

    fn parse_assignment_expr(&mut self) -> Result<Expr, ParseError> {
        let left = self.parse_logical_or()?;
        let op = match self.current_kind() {
            TokenKind::Eq => AssignOp::Assign,
            TokenKind::PlusEq => AssignOp::AddAssign,
            TokenKind::MinusEq => AssignOp::SubAssign,
            TokenKind::StarEq => AssignOp::MulAssign,
            TokenKind::SlashEq => AssignOp::DivAssign,
            TokenKind::PercentEq => AssignOp::RemAssign,
            TokenKind::StarStarEq => AssignOp::ExpAssign,
            TokenKind::AmpAmpEq => AssignOp::AndAssign,
            TokenKind::PipePipeEq => AssignOp::OrAssign,
            TokenKind::QuestionQuestionEq => AssignOp::NullishAssign,
            TokenKind::AmpEq => AssignOp::BitAndAssign,
            TokenKind::PipeEq => AssignOp::BitOrAssign,
            TokenKind::CaretEq => AssignOp::BitXorAssign,
            TokenKind::LtLtEq => AssignOp::ShlAssign,
            TokenKind::GtGtEq => AssignOp::ShrAssign,
            TokenKind::GtGtGtEq => AssignOp::UShrAssign,
            _ => return Ok(left),
        };
        let pos = left.position;
        self.advance();
        let value = self.parse_assignment_expr()?;
        Ok(Expr::new(
            ExprKind::Assignment {
                op,
                target: Box::new(left),
                value: Box::new(value),
            },
            pos,
        ))
    }

    fn parse_logical_or(&mut self) -> Result<Expr, ParseError> {
        let mut left = self.parse_logical_and()?;
        loop {
            let op = match self.current_kind() {
                TokenKind::PipePipe => BinaryOp::LogicalOr,
                TokenKind::QuestionQuestion => BinaryOp::NullishCoalesce,
                _ => break,
            };
            let pos = left.position;
            self.advance();
            let right = self.parse_logical_and()?;
            left = Expr::new(
                ExprKind::Binary { op, left: Box::new(left), right: Box::new(right) },
                pos,
            );
        }
        Ok(left)
    }

    fn parse_logical_and(&mut self) -> Result<Expr, ParseError> {
        let mut left = self.parse_bitor()?;
        while self.at(TokenKind::AmpAmp) {
            let pos = left.position;
            self.advance();
            let right = self.parse_bitor()?;
            left = Expr::new(
                ExprKind::Binary { op: BinaryOp::LogicalAnd, left: Box::new(left), right: Box::new(right) },
                pos,
            );
        }
        Ok(left)
    }

    fn parse_bitor(&mut self) -> Result<Expr, ParseError> {
        let mut left = self.parse_bitxor()?;
        while self.at(TokenKind::Pipe) {
            let pos = left.position;
            self.advance();
            let right = self.parse_bitxor()?;
            left = Expr::new(
                ExprKind::Binary { op: BinaryOp::BitOr, left: Box::new(left), right: Box::new(right) },
                pos,
            );
        }
        Ok(left)
    }

    fn parse_bitxor(&mut self) -> Result<Expr, ParseError> {
        let mut left = self.parse_bitand()?;
        while self.at(TokenKind::Caret) {
            let pos = left.position;
            self.advance();
            let right = self.parse_bitand()?;
            left = Expr::new(
                ExprKind::Binary { op: BinaryOp::BitXor, left: Box::new(left), right: Box::new(right) },
                pos,
            );
        }
        Ok(left)
    }

    fn parse_bitand(&mut self) -> Result<Expr, ParseError> {
        let mut left = self.parse_equality()?;
        while self.at(TokenKind::Amp) {
            let pos = left.position;
            self.advance();
            let right = self.parse_equality()?;
            left = Expr::new(
                ExprKind::Binary { op: BinaryOp::BitAnd, left: Box::new(left), right: Box::new(right) },
                pos,
            );
        }
        Ok(left)
    }

    fn parse_equality(&mut self) -> Result<Expr, ParseError> {
        let mut left = self.parse_relational()?;
        loop {
            let op = match self.current_kind() {
                TokenKind::EqEq => BinaryOp::Eq,
                TokenKind::EqEqEq => BinaryOp::StrictEq,
                TokenKind::BangEq => BinaryOp::NotEq,
                TokenKind::BangEqEq => BinaryOp::StrictNotEq,
                _ => break,
            };
            let pos = left.position;
            self.advance();
            let right = self.parse_relational()?;
            left = Expr::new(ExprKind::Binary { op, left: Box::new(left), right: Box::new(right) }, pos);
        }
        Ok(left)
    }

    fn parse_relational(&mut self) -> Result<Expr, ParseError> {
        let mut left = self.parse_shift()?;
        loop {
            let op = match self.current_kind() {
                TokenKind::Lt => BinaryOp::Lt,
                TokenKind::LtEq => BinaryOp::LtEq,
                TokenKind::Gt => BinaryOp::Gt,
                TokenKind::GtEq => BinaryOp::GtEq,
                TokenKind::In => BinaryOp::In,
                TokenKind::Instanceof => BinaryOp::Instanceof,
                _ => break,
            };
            let pos = left.position;
            self.advance();
            let right = self.parse_shift()?;
            left = Expr::new(ExprKind::Binary { op, left: Box::new(left), right: Box::new(right) }, pos);
        }
        Ok(left)
    }

    fn parse_shift(&mut self) -> Result<Expr, ParseError> {
        let mut left = self.parse_additive()?;
        loop {
            let op = match self.current_kind() {
                TokenKind::LtLt => BinaryOp::Shl,
                TokenKind::GtGt => BinaryOp::Shr,
                TokenKind::GtGtGt => BinaryOp::UShr,
                _ => break,
            };
            let pos = left.position;
            self.advance();
            let right = self.parse_additive()?;
            left = Expr::new(ExprKind::Binary { op, left: Box::new(left), right: Box::new(right) }, pos);
        }
        Ok(left)
    }

    fn parse_additive(&mut self) -> Result<Expr, ParseError> {
        let mut left = self.parse_multiplicative()?;
        loop {
            let op = match self.current_kind() {
                TokenKind::Plus => BinaryOp::Add,
                TokenKind::Minus => BinaryOp::Sub,
                _ => break,
            };
            let pos = left.position;
            self.advance();
            let right = self.parse_multiplicative()?;
            left = Expr::new(ExprKind::Binary { op, left: Box::new(left), right: Box::new(right) }, pos);
        }
        Ok(left)
    }

    fn parse_multiplicative(&mut self) -> Result<Expr, ParseError> {
        let mut left = self.parse_exponent()?;
        loop {
            let op = match self.current_kind() {
                TokenKind::Star => BinaryOp::Mul,
                TokenKind::Slash => BinaryOp::Div,
                TokenKind::Percent => BinaryOp::Rem,
                _ => break,
            };
            let pos = left.position;
            self.advance();
            let right = self.parse_exponent()?;
            left = Expr::new(ExprKind::Binary { op, left: Box::new(left), right: Box::new(right) }, pos);
        }
        Ok(left)
    }

    /// Right-associative: `a ** b ** c` is `a ** (b ** c)`.
    fn parse_exponent(&mut self) -> Result<Expr, ParseError> {
        let base = self.parse_unary()?;
        if self.at(TokenKind::StarStar) {
            let pos = base.position;
            self.advance();
            let right = self.parse_exponent()?;
            return Ok(Expr::new(
                ExprKind::Binary { op: BinaryOp::Exp, left: Box::new(base), right: Box::new(right) },
                pos,
            ));
        }
        Ok(base)
    }

    fn parse_unary(&mut self) -> Result<Expr, ParseError> {
        let pos = self.current().position;
        match self.current_kind() {
            TokenKind::Bang => {
                self.advance();
                let argument = self.parse_unary()?;
                Ok(Expr::new(ExprKind::Unary { op: UnaryOp::Not, argument: Box::new(argument) }, pos))
            }
            TokenKind::Minus => {
                self.advance();
                let argument = self.parse_unary()?;
                Ok(Expr::new(ExprKind::Unary { op: UnaryOp::Neg, argument: Box::new(argument) }, pos))
            }
            TokenKind::Plus => {
                self.advance();
                let argument = self.parse_unary()?;
                Ok(Expr::new(ExprKind::Unary { op: UnaryOp::Plus, argument: Box::new(argument) }, pos))
            }
            TokenKind::Tilde => {
                self.advance();
                let argument = self.parse_unary()?;
                Ok(Expr::new(ExprKind::Unary { op: UnaryOp::BitNot, argument: Box::new(argument) }, pos))
            }
            TokenKind::Typeof => {
                self.advance();
                let argument = self.parse_unary()?;
                Ok(Expr::new(ExprKind::Unary { op: UnaryOp::Typeof, argument: Box::new(argument) }, pos))
            }
            TokenKind::Await => {
                self.advance();
                let argument = self.parse_unary()?;
                Ok(Expr::new(ExprKind::Await { argument: Box::new(argument) }, pos))
            }
            TokenKind::PlusPlus | TokenKind::MinusMinus => {
                let op = if self.current_kind() == TokenKind::PlusPlus {
                    UpdateOp::Increment
                } else {
                    UpdateOp::Decrement
                };
                self.advance();
                let argument = self.parse_unary()?;
                Ok(Expr::new(ExprKind::Update { op, argument: Box::new(argument), prefix: true }, pos))
            }
            TokenKind::New => self.parse_new_expression(),
            _ => self.parse_postfix(),
        }
    }

    fn parse_new_expression(&mut self) -> Result<Expr, ParseError> {
        let pos = self.expect(TokenKind::New)?.position;
        let callee = self.parse_member_chain_no_call(self.parse_primary()?)?;
        let arguments = if self.at(TokenKind::LParen) {
            self.parse_arguments()?
        } else {
            Vec::new()
        };
        let new_expr = Expr::new(ExprKind::New { callee: Box::new(callee), arguments }, pos);
        self.parse_postfix_from(new_expr)
    }

    fn parse_member_chain_no_call(&mut self, mut base: Expr) -> Result<Expr, ParseError> {
        loop {
            if self.at(TokenKind::Dot) {
                self.advance();
                let name = self.expect_property_name()?;
                let pos = base.position;
                base = Expr::new(
                    ExprKind::Member {
                        object: Box::new(base),
                        property: Box::new(Expr::new(ExprKind::Identifier(name), pos)),
                        computed: false,
                        optional: false,
                    },
                    pos,
                );
            } else {
                break;
            }
        }
        Ok(base)
    }

    fn parse_postfix(&mut self) -> Result<Expr, ParseError> {
        let primary = self.parse_primary()?;
        self.parse_postfix_from(primary)
    }

    fn parse_postfix_from(&mut self, mut expr: Expr) -> Result<Expr, ParseError> {
        loop {
            match self.current_kind() {
                TokenKind::Dot => {
                    self.advance();
                    let name = self.expect_property_name()?;
                    let pos = expr.position;
                    expr = Expr::new(
                        ExprKind::Member {
                            object: Box::new(expr),
                            property: Box::new(Expr::new(ExprKind::Identifier(name), pos)),
                            computed: false,
                            optional: false,
                        },
                        pos,
                    );
                }
                TokenKind::QuestionDot => {
                    self.advance();
                    if self.at(TokenKind::LParen) {
                        let pos = expr.position;
                        let arguments = self.parse_arguments()?;
                        expr = Expr::new(
                            ExprKind::Call { callee: Box::new(expr), arguments, optional: true },
                            pos,
                        );
                    } else {
                        let name = self.expect_property_name()?;
                        let pos = expr.position;
                        expr = Expr::new(
                            ExprKind::Member {
                                object: Box::new(expr),
                                property: Box::new(Expr::new(ExprKind::Identifier(name), pos)),
                                computed: false,
                                optional: true,
                            },
                            pos,
                        );
                    }
                }
                TokenKind::LBracket => {
                    self.advance();
                    let index = self.parse_expression()?;
                    self.expect(TokenKind::RBracket)?;
                    let pos = expr.position;
                    expr = Expr::new(
                        ExprKind::Member { object: Box::new(expr), property: Box::new(index), computed: true, optional: false },
                        pos,
                    );
                }
                TokenKind::LParen => {
                    let pos = expr.position;
                    let arguments = self.parse_arguments()?;
                    expr = Expr::new(ExprKind::Call { callee: Box::new(expr), arguments, optional: false }, pos);
                }
                TokenKind::PlusPlus | TokenKind::MinusMinus => {
                    let op = if self.current_kind() == TokenKind::PlusPlus {
                        UpdateOp::Increment
                    } else {
                        UpdateOp::Decrement
                    };
                    let pos = expr.position;
                    self.advance();
                    expr = Expr::new(ExprKind::Update { op, argument: Box::new(expr), prefix: false }, pos);
                }
                _ => break,
            }
        }
        Ok(expr)
    }

    fn expect_property_name(&mut self) -> Result<String, ParseError> {
        // Property names may legitimately be any reserved word (e.g. `.log`,
        // `.type`) -- accept the raw lexeme of whatever token sits here,
        // since it is always a single identifier-shaped token.
        let tok = self.advance();
        Ok(tok.lexeme)
    }

    fn parse_arguments(&mut self) -> Result<Vec<Expr>, ParseError> {
        self.expect(TokenKind::LParen)?;
        let mut args = Vec::new();
        while !self.at(TokenKind::RParen) && !self.at(TokenKind::Eof) {
            if self.at(TokenKind::DotDotDot) {
                let pos = self.advance().position;
                let argument = self.parse_assignment_expr()?;
                args.push(Expr::new(ExprKind::Spread { argument: Box::new(argument) }, pos));
            } else {
                args.push(self.parse_assignment_expr()?);
            }
            if !self.at(TokenKind::RParen) {
                self.eat(TokenKind::Comma);
            }
        }
        self.expect(TokenKind::RParen)?;
        Ok(args)
    }

    fn parse_primary(&mut self) -> Result<Expr, ParseError> {
        use TokenKind::*;
        let pos = self.current().position;
        match self.current_kind() {
            Number => {
                let tok = self.advance();
                let value = tok.lexeme.parse::<f64>().unwrap_or(f64::NAN);
                Ok(Expr::new(ExprKind::Literal { value: LiteralValue::Number(value), raw: tok.lexeme }, pos))
            }
            StringLit => {
                let tok = self.advance();
                Ok(Expr::new(
                    ExprKind::Literal { value: LiteralValue::String(tok.lexeme.clone()), raw: tok.lexeme },
                    pos,
                ))
            }
            TemplateString => {
                let tok = self.advance();
                self.parse_template_literal(&tok)
            }
            True => {
                self.advance();
                Ok(Expr::new(ExprKind::Literal { value: LiteralValue::Bool(true), raw: "дуруст".into() }, pos))
            }
            False => {
                self.advance();
                Ok(Expr::new(ExprKind::Literal { value: LiteralValue::Bool(false), raw: "нодуруст".into() }, pos))
            }
            Null => {
                self.advance();
                Ok(Expr::new(ExprKind::Literal { value: LiteralValue::Null, raw: "холӣ".into() }, pos))
            }
            Undefined => {
                self.advance();
                Ok(Expr::new(ExprKind::Literal { value: LiteralValue::Undefined, raw: "номуайян".into() }, pos))
            }
            This => {
                self.advance();
                Ok(Expr::new(ExprKind::This, pos))
            }
            Super => {
                self.advance();
                Ok(Expr::new(ExprKind::Super, pos))
            }
            Import if self.nth(1).kind == LParen => {
                self.advance();
                let arguments = self.parse_arguments()?;
                let source = arguments.into_iter().next().ok_or_else(|| {
                    ParseError::new(pos, "import specifier".to_string(), "()".to_string())
                })?;
                Ok(Expr::new(ExprKind::ImportExpression { source: Box::new(source) }, pos))
            }
            Identifier | Console | MathNs | ArrayNs | StringNs | ObjectNs => {
                if self.nth(1).kind == FatArrow {
                    let tok = self.advance();
                    self.advance(); // =>
                    let param = Param {
                        pattern: Pattern::identifier(tok.lexeme, tok.position),
                        type_annotation: None,
                        default: None,
                    };
                    return self.parse_arrow_body(vec![param], false, pos);
                }
                let tok = self.advance();
                Ok(Expr::new(ExprKind::Identifier(tok.lexeme), pos))
            }
            Async if self.nth(1).kind == LParen || self.nth(1).kind == Identifier => {
                self.advance();
                self.parse_arrow_or_paren(true)
            }
            LParen => self.parse_arrow_or_paren(false),
            LBracket => self.parse_array_literal(),
            LBrace => self.parse_object_literal(),
            DotDotDot => {
                self.advance();
                let argument = self.parse_assignment_expr()?;
                Ok(Expr::new(ExprKind::Spread { argument: Box::new(argument) }, pos))
            }
            _ => Err(self.error_expected("expression")),
        }
    }

    fn parse_template_literal(&mut self, token: &Token) -> Result<Expr, ParseError> {
        let mut content_start = token.position;
        content_start.advance_column();
        let (quasis, expr_srcs) = split_template(&token.lexeme, content_start);
        let mut expressions = Vec::new();
        for (src, epos) in expr_srcs {
            let sub_tokens = somon_lexer::tokenize(&src)
                .map_err(|e| ParseError::new(epos, "expression".to_string(), e.message))?;
            let expr = Parser::new(sub_tokens).parse_expression()?;
            expressions.push(expr);
        }
        Ok(Expr::new(ExprKind::TemplateLiteral { quasis, expressions }, token.position))
    }

    /// One-token lookahead: a `(` begins an arrow parameter list iff the
    /// matching `)` is followed by `=>` (`spec.md` §4.2).
    fn parse_arrow_or_paren(&mut self, is_async: bool) -> Result<Expr, ParseError> {
        let pos = self.current().position;
        if self.at(TokenKind::LParen) && self.arrow_follows_paren() {
            let params = self.parse_param_list()?;
            self.expect(TokenKind::FatArrow)?;
            return self.parse_arrow_body(params, is_async, pos);
        }
        if is_async && self.at(TokenKind::Identifier) {
            let tok = self.advance();
            self.expect(TokenKind::FatArrow)?;
            let param = Param {
                pattern: Pattern::identifier(tok.lexeme, tok.position),
                type_annotation: None,
                default: None,
            };
            return self.parse_arrow_body(vec![param], true, pos);
        }
        self.expect(TokenKind::LParen)?;
        let inner = self.parse_assignment_expr()?;
        self.expect(TokenKind::RParen)?;
        self.parse_postfix_from(inner)
    }

    fn arrow_follows_paren(&self) -> bool {
        let mut idx = self.pos;
        let mut depth = 0i32;
        loop {
            match self.tokens[idx].kind {
                TokenKind::LParen => depth += 1,
                TokenKind::RParen => {
                    depth -= 1;
                    if depth == 0 {
                        let mut j = idx + 1;
                        while self.tokens[j].kind == TokenKind::Newline {
                            j += 1;
                        }
                        return self.tokens[j].kind == TokenKind::FatArrow;
                    }
                }
                TokenKind::Eof => return false,
                _ => {}
            }
            idx += 1;
        }
    }

    fn parse_arrow_body(&mut self, params: Vec<Param>, is_async: bool, pos: Position) -> Result<Expr, ParseError> {
        let body = if self.at(TokenKind::LBrace) {
            ArrowBody::Block(self.parse_block()?)
        } else {
            ArrowBody::Expr(Box::new(self.parse_assignment_expr()?))
        };
        Ok(Expr::new(ExprKind::Arrow { params, body, is_async }, pos))
    }

    fn parse_array_literal(&mut self) -> Result<Expr, ParseError> {
        let open = self.expect(TokenKind::LBracket)?;
        let mut elements = Vec::new();
        while !self.at(TokenKind::RBracket) && !self.at(TokenKind::Eof) {
            if self.at(TokenKind::DotDotDot) {
                let pos = self.advance().position;
                let argument = self.parse_assignment_expr()?;
                elements.push(Expr::new(ExprKind::Spread { argument: Box::new(argument) }, pos));
            } else {
                elements.push(self.parse_assignment_expr()?);
            }
            if !self.at(TokenKind::RBracket) {
                self.eat(TokenKind::Comma);
            }
        }
        self.expect(TokenKind::RBracket)?;
        Ok(Expr::new(ExprKind::Array { elements }, open.position))
    }

    fn parse_object_literal(&mut self) -> Result<Expr, ParseError> {
        let open = self.expect(TokenKind::LBrace)?;
        let mut properties = Vec::new();
        while !self.at(TokenKind::RBrace) && !self.at(TokenKind::Eof) {
            properties.push(self.parse_object_property()?);
            if !self.at(TokenKind::RBrace) {
                self.eat(TokenKind::Comma);
            }
        }
        self.expect(TokenKind::RBrace)?;
        Ok(Expr::new(ExprKind::Object { properties }, open.position))
    }

    fn parse_object_property(&mut self) -> Result<ObjectProperty, ParseError> {
        if self.at(TokenKind::LBracket) {
            self.advance();
            let key_expr = self.parse_assignment_expr()?;
            self.expect(TokenKind::RBracket)?;
            self.expect(TokenKind::Colon)?;
            let value = self.parse_assignment_expr()?;
            return Ok(ObjectProperty {
                key: PropertyKey::Computed(Box::new(key_expr)),
                value,
                computed: true,
                shorthand: false,
            });
        }
        if self.at(TokenKind::StringLit) {
            let tok = self.advance();
            self.expect(TokenKind::Colon)?;
            let value = self.parse_assignment_expr()?;
            return Ok(ObjectProperty {
                key: PropertyKey::StringLiteral(tok.lexeme),
                value,
                computed: false,
                shorthand: false,
            });
        }
        let name_tok = self.expect_binding_name()?;
        if self.eat(TokenKind::Colon) {
            let value = self.parse_assignment_expr()?;
            Ok(ObjectProperty {
                key: PropertyKey::Identifier(name_tok.lexeme),
                value,
                computed: false,
                shorthand: false,
            })
        } else if self.at(TokenKind::LParen) {
            // method shorthand: `name(params) { body }`
            let params = self.parse_param_list()?;
            let return_type = if self.eat(TokenKind::Colon) { Some(self.parse_type()?) } else { None };
            let body = self.parse_block()?;
            let pos = body.position;
            let value = Expr::new(
                ExprKind::Arrow { params, body: ArrowBody::Block(body), is_async: false },
                pos,
            );
            let _ = return_type;
            Ok(ObjectProperty {
                key: PropertyKey::Identifier(name_tok.lexeme),
                value,
                computed: false,
                shorthand: false,
            })
        } else {
            let value = Expr::new(ExprKind::Identifier(name_tok.lexeme.clone()), name_tok.position);
            Ok(ObjectProperty {
                key: PropertyKey::Identifier(name_tok.lexeme),
                value,
                computed: false,
                shorthand: true,
            })
        }
    }

    // ---- type grammar (spec.md §4.2) ----

    pub fn parse_type(&mut self) -> Result<TypeNode, ParseError> {
        let pos = self.current().position;
        let check = self.parse_union_type()?;
        if self.at(TokenKind::Extends) {
            self.advance();
            let extends = self.parse_union_type()?;
            self.expect(TokenKind::Question)?;
            let true_type = self.parse_type()?;
            self.expect(TokenKind::Colon)?;
            let false_type = self.parse_type()?;
            return Ok(TypeNode::new(
                TypeKind::ConditionalType {
                    check: Box::new(check),
                    extends: Box::new(extends),
                    true_type: Box::new(true_type),
                    false_type: Box::new(false_type),
                },
                pos,
            ));
        }
        Ok(check)
    }

    fn parse_union_type(&mut self) -> Result<TypeNode, ParseError> {
        let pos = self.current().position;
        self.eat(TokenKind::Pipe); // tolerate a leading `|`
        let mut types = vec![self.parse_intersection_type()?];
        while self.eat(TokenKind::Pipe) {
            types.push(self.parse_intersection_type()?);
        }
        if types.len() == 1 {
            Ok(types.pop().unwrap())
        } else {
            Ok(TypeNode::new(TypeKind::UnionType { types }, pos))
        }
    }

    fn parse_intersection_type(&mut self) -> Result<TypeNode, ParseError> {
        let pos = self.current().position;
        let mut types = vec![self.parse_array_suffixed_type()?];
        while self.eat(TokenKind::Amp) {
            types.push(self.parse_array_suffixed_type()?);
        }
        if types.len() == 1 {
            Ok(types.pop().unwrap())
        } else {
            Ok(TypeNode::new(TypeKind::IntersectionType { types }, pos))
        }
    }

    fn parse_array_suffixed_type(&mut self) -> Result<TypeNode, ParseError> {
        let mut ty = self.parse_primary_type()?;
        loop {
            if self.at(TokenKind::LBracket) {
                let pos = ty.position;
                self.advance();
                if self.eat(TokenKind::RBracket) {
                    ty = TypeNode::new(TypeKind::ArrayType { element: Box::new(ty) }, pos);
                } else {
                    let index = self.parse_type()?;
                    self.expect(TokenKind::RBracket)?;
                    ty = TypeNode::new(
                        TypeKind::IndexedAccessType { object: Box::new(ty), index: Box::new(index) },
                        pos,
                    );
                }
            } else {
                break;
            }
        }
        Ok(ty)
    }

    fn parse_primary_type(&mut self) -> Result<TypeNode, ParseError> {
        use TokenKind::*;
        let pos = self.current().position;
        match self.current_kind() {
            StringType => {
                self.advance();
                Ok(TypeNode::new(TypeKind::PrimitiveType { name: PrimitiveName::String }, pos))
            }
            NumberType => {
                self.advance();
                Ok(TypeNode::new(TypeKind::PrimitiveType { name: PrimitiveName::Number }, pos))
            }
            BooleanType => {
                self.advance();
                Ok(TypeNode::new(TypeKind::PrimitiveType { name: PrimitiveName::Boolean }, pos))
            }
            AnyType => {
                self.advance();
                Ok(TypeNode::new(TypeKind::PrimitiveType { name: PrimitiveName::Any }, pos))
            }
            UnknownType => {
                self.advance();
                Ok(TypeNode::new(TypeKind::PrimitiveType { name: PrimitiveName::Unknown }, pos))
            }
            NeverType => {
                self.advance();
                Ok(TypeNode::new(TypeKind::PrimitiveType { name: PrimitiveName::Never }, pos))
            }
            VoidType => {
                self.advance();
                Ok(TypeNode::new(TypeKind::PrimitiveType { name: PrimitiveName::Void }, pos))
            }
            ObjectType => {
                self.advance();
                Ok(TypeNode::new(TypeKind::PrimitiveType { name: PrimitiveName::Object }, pos))
            }
            Null => {
                self.advance();
                Ok(TypeNode::new(TypeKind::PrimitiveType { name: PrimitiveName::Null }, pos))
            }
            Undefined => {
                self.advance();
                Ok(TypeNode::new(TypeKind::PrimitiveType { name: PrimitiveName::Undefined }, pos))
            }
            StringLit => {
                let tok = self.advance();
                Ok(TypeNode::new(TypeKind::LiteralType { value: LiteralValue::String(tok.lexeme) }, pos))
            }
            Number => {
                let tok = self.advance();
                let v = tok.lexeme.parse::<f64>().unwrap_or(f64::NAN);
                Ok(TypeNode::new(TypeKind::LiteralType { value: LiteralValue::Number(v) }, pos))
            }
            True => {
                self.advance();
                Ok(TypeNode::new(TypeKind::LiteralType { value: LiteralValue::Bool(true) }, pos))
            }
            False => {
                self.advance();
                Ok(TypeNode::new(TypeKind::LiteralType { value: LiteralValue::Bool(false) }, pos))
            }
            Unique => {
                self.advance();
                let base = self.parse_primary_type()?;
                Ok(TypeNode::new(TypeKind::UniqueType { base: Box::new(base) }, pos))
            }
            Keyof => {
                self.advance();
                let base = self.parse_primary_type()?;
                Ok(TypeNode::new(TypeKind::KeyofType { base: Box::new(base) }, pos))
            }
            Readonly => {
                self.advance();
                self.parse_primary_type()
            }
            LBracket => {
                self.advance();
                let mut elements = Vec::new();
                while !self.at(TokenKind::RBracket) && !self.at(TokenKind::Eof) {
                    elements.push(self.parse_type()?);
                    if !self.at(TokenKind::RBracket) {
                        self.eat(TokenKind::Comma);
                    }
                }
                self.expect(TokenKind::RBracket)?;
                Ok(TypeNode::new(TypeKind::TupleType { elements }, pos))
            }
            LParen => {
                self.advance();
                let inner = self.parse_type()?;
                self.expect(TokenKind::RParen)?;
                Ok(inner)
            }
            LBrace => self.parse_mapped_type(),
            Identifier | Console | MathNs | ArrayNs | StringNs | ObjectNs => {
                let name = self.advance().lexeme;
                let type_parameters = if self.eat(TokenKind::Lt) {
                    let mut args = vec![self.parse_type()?];
                    while self.eat(TokenKind::Comma) {
                        args.push(self.parse_type()?);
                    }
                    self.consume_closing_angle()?;
                    args
                } else {
                    Vec::new()
                };
                Ok(TypeNode::new(TypeKind::GenericType { name, type_parameters }, pos))
            }
            _ => Err(self.error_expected("type")),
        }
    }

    fn parse_mapped_type(&mut self) -> Result<TypeNode, ParseError> {
        let pos = self.expect(TokenKind::LBrace)?.position;
        let readonly = self.eat(TokenKind::Readonly);
        self.expect(TokenKind::LBracket)?;
        let type_parameter = self.expect_binding_name()?.lexeme;
        self.expect(TokenKind::In)?;
        let constraint = self.parse_type()?;
        self.expect(TokenKind::RBracket)?;
        let optional = self.eat(TokenKind::Question);
        self.expect(TokenKind::Colon)?;
        let value_type = self.parse_type()?;
        self.eat_semicolon();
        self.expect(TokenKind::RBrace)?;
        Ok(TypeNode::new(
            TypeKind::MappedType {
                type_parameter,
                constraint: Box::new(constraint),
                value_type: Box::new(value_type),
                readonly,
                optional,
            },
            pos,
        ))
    }

    /// Consume a single closing `>`, splitting it out of a `>>`/`>>>` token
    /// produced by the lexer for nested generics (`Map<K, Array<V>>`).
    fn consume_closing_angle(&mut self) -> Result<(), ParseError> {
        match self.current_kind() {
            TokenKind::Gt => {
                self.advance();
                Ok(())
            }
            TokenKind::GtGt => {
                let p = self.tokens[self.pos].position;
                self.tokens[self.pos] = Token::new(TokenKind::Gt, ">", Position::new(p.line, p.column + 1));
                Ok(())
            }
            TokenKind::GtGtGt => {
                let p = self.tokens[self.pos].position;
                self.tokens[self.pos] = Token::new(TokenKind::GtGt, ">>", Position::new(p.line, p.column + 1));
                Ok(())
            }
            _ => Err(self.error_expected(">")),
        }
    }
}

fn advance_pos(pos: &mut Position, c: char) {
    if c == '\n' {
        pos.advance_line();
    } else {
        pos.advance_column();
    }
}

/// Split a raw template-literal body into text quasis and the raw source of
/// each `${...}` interpolation (with its starting position), tracking brace
/// depth so nested object/block literals inside an interpolation don't
/// terminate it early.
fn split_template(raw: &str, start: Position) -> (Vec<String>, Vec<(String, Position)>) {
    let mut quasis = Vec::new();
    let mut exprs = Vec::new();
    let mut quasi = String::new();
    let mut pos = start;
    let mut chars = raw.chars().peekable();
    while let Some(c) = chars.next() {
        if c == '\\' {
            quasi.push(c);
            advance_pos(&mut pos, c);
            if let Some(next) = chars.next() {
                quasi.push(next);
                advance_pos(&mut pos, next);
            }
            continue;
        }
        if c == '$' && chars.peek() == Some(&'{') {
            chars.next();
            advance_pos(&mut pos, '$');
            advance_pos(&mut pos, '{');
            quasis.push(std::mem::take(&mut quasi));
            let expr_start = pos;
            let mut depth = 1;
            let mut expr_src = String::new();
            for ec in chars.by_ref() {
                if ec == '{' {
                    depth += 1;
                } else if ec == '}' {
                    depth -= 1;
                    if depth == 0 {
                        advance_pos(&mut pos, ec);
                        break;
                    }
                }
                expr_src.push(ec);
                advance_pos(&mut pos, ec);
            }
            exprs.push((expr_src, expr_start));
            continue;
        }
        quasi.push(c);
        advance_pos(&mut pos, c);
    }
    quasis.push(quasi);
    (quasis, exprs)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_ok(source: &str) -> Program {
        let tokens = somon_lexer::tokenize(source).expect("lex ok");
        parse(tokens).expect("parse ok")
    }

    #[test]
    fn empty_source_is_empty_program() {
        let program = parse_ok("");
        assert!(program.body.is_empty());
    }

    #[test]
    fn simple_variable_declaration() {
        let program = parse_ok("собит PI = 3.14;");
        assert_eq!(program.body.len(), 1);
        match &program.body[0].kind {
            StmtKind::VariableDeclaration { kind, init, .. } => {
                assert_eq!(*kind, VarKind::Const);
                assert!(init.is_some());
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn function_with_typed_params() {
        let program = parse_ok(
            "функсия ҷамъ(а: рақам, б: рақам): рақам { баргардон а + б; }",
        );
        match &program.body[0].kind {
            StmtKind::FunctionDeclaration { name, params, return_type, .. } => {
                assert_eq!(name, "ҷамъ");
                assert_eq!(params.len(), 2);
                assert!(return_type.is_some());
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn arrow_function_with_parens_is_detected() {
        let program = parse_ok("собит f = (a, b) => a + b;");
        match &program.body[0].kind {
            StmtKind::VariableDeclaration { init: Some(expr), .. } => match &expr.kind {
                ExprKind::Arrow { params, .. } => assert_eq!(params.len(), 2),
                other => panic!("unexpected {other:?}"),
            },
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn bare_identifier_arrow() {
        let program = parse_ok("собит f = x => x;");
        match &program.body[0].kind {
            StmtKind::VariableDeclaration { init: Some(expr), .. } => {
                assert!(matches!(expr.kind, ExprKind::Arrow { .. }));
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn parenthesized_expression_is_not_an_arrow() {
        let program = parse_ok("собит f = (a + b);");
        match &program.body[0].kind {
            StmtKind::VariableDeclaration { init: Some(expr), .. } => {
                assert!(matches!(expr.kind, ExprKind::Binary { .. }));
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn precedence_multiplication_binds_tighter_than_addition() {
        let program = parse_ok("собит x = 1 + 2 * 3;");
        match &program.body[0].kind {
            StmtKind::VariableDeclaration { init: Some(expr), .. } => match &expr.kind {
                ExprKind::Binary { op: BinaryOp::Add, right, .. } => {
                    assert!(matches!(right.kind, ExprKind::Binary { op: BinaryOp::Mul, .. }));
                }
                other => panic!("unexpected {other:?}"),
            },
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn exponent_is_right_associative() {
        let program = parse_ok("собит x = 2 ** 3 ** 2;");
        match &program.body[0].kind {
            StmtKind::VariableDeclaration { init: Some(expr), .. } => match &expr.kind {
                ExprKind::Binary { op: BinaryOp::Exp, right, .. } => {
                    assert!(matches!(right.kind, ExprKind::Binary { op: BinaryOp::Exp, .. }));
                }
                other => panic!("unexpected {other:?}"),
            },
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn union_and_intersection_types() {
        let program = parse_ok("собит x: сатр | рақам = 1;");
        match &program.body[0].kind {
            StmtKind::VariableDeclaration { type_annotation: Some(ty), .. } => {
                assert!(matches!(ty.kind, TypeKind::UnionType { .. }));
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn generic_type_with_nested_closing_angle_brackets() {
        let program = parse_ok("собит x: Масол<сатр, Масол<рақам>> = нав Масол();");
        match &program.body[0].kind {
            StmtKind::VariableDeclaration { type_annotation: Some(ty), .. } => match &ty.kind {
                TypeKind::GenericType { type_parameters, .. } => assert_eq!(type_parameters.len(), 2),
                other => panic!("unexpected {other:?}"),
            },
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn array_type_suffix() {
        let program = parse_ok("собит x: рақам[] = [];");
        match &program.body[0].kind {
            StmtKind::VariableDeclaration { type_annotation: Some(ty), .. } => {
                assert!(matches!(ty.kind, TypeKind::ArrayType { .. }));
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn class_with_extends_and_member() {
        let program = parse_ok(
            "синф Б густариш А { хусусӣ ном: сатр; созанда() {} }",
        );
        match &program.body[0].kind {
            StmtKind::ClassDeclaration { super_class, body, .. } => {
                assert_eq!(super_class.as_deref(), Some("А"));
                assert_eq!(body.len(), 2);
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn import_named_and_default() {
        let program = parse_ok("содир А, { б чун в } аз \"./мод\";");
        match &program.body[0].kind {
            StmtKind::Import { specifiers, source } => {
                assert_eq!(specifiers.len(), 2);
                assert_eq!(source, "./мод");
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn export_wildcard() {
        let program = parse_ok("содирот * аз \"./мод\";");
        assert!(matches!(
            &program.body[0].kind,
            StmtKind::Export(ExportKind::Wildcard { .. })
        ));
    }

    #[test]
    fn template_literal_splits_quasis_and_expressions() {
        let program = parse_ok("собит x = `салом ${ном}!`;");
        match &program.body[0].kind {
            StmtKind::VariableDeclaration { init: Some(expr), .. } => match &expr.kind {
                ExprKind::TemplateLiteral { quasis, expressions } => {
                    assert_eq!(quasis, &vec!["салом ".to_string(), "!".to_string()]);
                    assert_eq!(expressions.len(), 1);
                }
                other => panic!("unexpected {other:?}"),
            },
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn parse_error_recovers_and_collects_multiple() {
        let tokens = somon_lexer::tokenize("собит = ; собит д = 1;").unwrap();
        let errs = parse(tokens).unwrap_err();
        assert!(!errs.is_empty());
    }

    #[test]
    fn array_pattern_allows_holes() {
        let program = parse_ok("собит [a, , b] = x;");
        match &program.body[0].kind {
            StmtKind::VariableDeclaration { pattern, .. } => match &pattern.kind {
                PatternKind::ArrayPattern { elements } => {
                    assert_eq!(elements.len(), 3);
                    assert!(elements[1].is_none());
                }
                other => panic!("unexpected {other:?}"),
            },
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn for_of_and_for_in_are_distinguished() {
        let program = parse_ok("барои (собит x дар у) {}");
        assert!(matches!(&program.body[0].kind, StmtKind::ForIn { .. }));

        let program = parse_ok("барои (собит x дарун у) {}");
        assert!(matches!(&program.body[0].kind, StmtKind::ForOf { .. }));
    }
}
