//! Statement/expression emission (`spec.md` §4.4). Free functions building
//! into a `String` with an explicit depth counter, in the style of a
//! text-emitting backend rather than a builder-object-per-node visitor.

use crate::builtins;
use somon_parser::*;
use std::fmt::Write as _;

const INDENT: &str = "  ";

pub struct Generator {
    out: String,
    depth: usize,
    import_counter: u32,
    /// Where a top-level `export` assigns to -- `module.exports` at the
    /// module root, or a namespace's accumulator object inside a
    /// `NamespaceDeclaration` IIFE.
    export_target: String,
}

impl Generator {
    pub fn new() -> Self {
        Self {
            out: String::new(),
            depth: 0,
            import_counter: 0,
            export_target: "module.exports".to_string(),
        }
    }

    pub fn finish(self) -> String {
        self.out
    }

    fn pad(&self) -> String {
        INDENT.repeat(self.depth)
    }

    fn line(&mut self, text: &str) {
        let pad = self.pad();
        let _ = writeln!(self.out, "{pad}{text}");
    }

    fn next_import_temp(&mut self) -> String {
        let name = format!("__somon_import_{}", self.import_counter);
        self.import_counter += 1;
        name
    }

    pub fn emit_program(&mut self, program: &Program) {
        self.emit_body(&program.body);
    }

    fn emit_body(&mut self, body: &[Stmt]) {
        for stmt in body {
            self.emit_stmt(stmt);
        }
    }

    fn emit_braced_body(&mut self, body: &[Stmt]) {
        self.depth += 1;
        self.emit_body(body);
        self.depth -= 1;
    }

    // ---- statements ----

    fn emit_stmt(&mut self, stmt: &Stmt) {
        match &stmt.kind {
            StmtKind::VariableDeclaration { kind, pattern, init, .. } => {
                let keyword = match kind {
                    VarKind::Const => "const",
                    VarKind::Mutable => "let",
                };
                let target = emit_pattern(pattern);
                match init {
                    Some(expr) => {
                        let value = self.emit_expr(expr);
                        self.line(&format!("{keyword} {target} = {value};"));
                    }
                    None => self.line(&format!("{keyword} {target};")),
                }
            }
            StmtKind::FunctionDeclaration { name, params, body, is_async, .. } => {
                let prefix = if *is_async { "async function" } else { "function" };
                let param_list = emit_param_list(params, self);
                self.line(&format!("{prefix} {name}({param_list}) {{"));
                self.emit_braced_body(&body.body);
                self.line("}");
            }
            StmtKind::ClassDeclaration { name, super_class, body, .. } => {
                match super_class {
                    Some(base) => self.line(&format!("class {name} extends {base} {{")),
                    None => self.line(&format!("class {name} {{")),
                }
                self.depth += 1;
                for member in body {
                    self.emit_class_member(member);
                }
                self.depth -= 1;
                self.line("}");
            }
            StmtKind::InterfaceDeclaration { name, .. } => {
                self.line(&format!("// Interface: {name}"));
            }
            StmtKind::TypeAlias { name, .. } => {
                self.line(&format!("// Type: {name}"));
            }
            StmtKind::NamespaceDeclaration { name, body, .. } => {
                self.line(&format!("const {name} = (function () {{"));
                self.depth += 1;
                self.line("const __ns = {};");
                let saved = std::mem::replace(&mut self.export_target, "__ns".to_string());
                self.emit_body(body);
                self.export_target = saved;
                self.line("return __ns;");
                self.depth -= 1;
                self.line("})();");
            }
            StmtKind::If { test, consequent, alternate } => {
                let cond = self.emit_expr(test);
                self.line(&format!("if ({cond}) {{"));
                self.emit_braced_stmt(consequent);
                match alternate {
                    Some(alt) => match &alt.kind {
                        StmtKind::If { .. } => {
                            self.line("} else");
                            self.depth += 1;
                            self.emit_stmt(alt);
                            self.depth -= 1;
                        }
                        _ => {
                            self.line("} else {");
                            self.emit_braced_stmt(alt);
                            self.line("}");
                        }
                    },
                    None => self.line("}"),
                }
            }
            StmtKind::While { test, body } => {
                let cond = self.emit_expr(test);
                self.line(&format!("while ({cond}) {{"));
                self.emit_braced_stmt(body);
                self.line("}");
            }
            StmtKind::For { init, test, update, body } => {
                let init_text = init.as_ref().map(|s| self.emit_for_init(s)).unwrap_or_default();
                let test_text = test.as_ref().map(|e| self.emit_expr(e)).unwrap_or_default();
                let update_text = update.as_ref().map(|e| self.emit_expr(e)).unwrap_or_default();
                self.line(&format!("for ({init_text}; {test_text}; {update_text}) {{"));
                self.emit_braced_stmt(body);
                self.line("}");
            }
            StmtKind::ForIn { left, right, body } => {
                let target = emit_pattern(left);
                let iterable = self.emit_expr(right);
                self.line(&format!("for (const {target} in {iterable}) {{"));
                self.emit_braced_stmt(body);
                self.line("}");
            }
            StmtKind::ForOf { left, right, body } => {
                let target = emit_pattern(left);
                let iterable = self.emit_expr(right);
                self.line(&format!("for (const {target} of {iterable}) {{"));
                self.emit_braced_stmt(body);
                self.line("}");
            }
            StmtKind::Return { argument } => match argument {
                Some(expr) => {
                    let value = self.emit_expr(expr);
                    self.line(&format!("return {value};"));
                }
                None => self.line("return;"),
            },
            StmtKind::Throw { argument } => {
                let value = self.emit_expr(argument);
                self.line(&format!("throw {value};"));
            }
            StmtKind::Try { block, handler, finalizer } => {
                self.line("try {");
                self.emit_braced_body(&block.body);
                if let Some(handler) = handler {
                    let param = handler.param.as_ref().map(|p| emit_pattern(p)).unwrap_or_default();
                    if param.is_empty() {
                        self.line("} catch {");
                    } else {
                        self.line(&format!("}} catch ({param}) {{"));
                    }
                    self.emit_braced_body(&handler.body.body);
                }
                if let Some(finalizer) = finalizer {
                    self.line("} finally {");
                    self.emit_braced_body(&finalizer.body);
                }
                self.line("}");
            }
            StmtKind::Switch { discriminant, cases } => {
                let value = self.emit_expr(discriminant);
                self.line(&format!("switch ({value}) {{"));
                self.depth += 1;
                for case in cases {
                    match &case.test {
                        Some(test) => {
                            let test = self.emit_expr(test);
                            self.line(&format!("case {test}:"));
                        }
                        None => self.line("default:"),
                    }
                    self.emit_braced_body(&case.consequent);
                }
                self.depth -= 1;
                self.line("}");
            }
            StmtKind::Break => self.line("break;"),
            StmtKind::Continue => self.line("continue;"),
            StmtKind::Import { specifiers, source } => self.emit_import(specifiers, source),
            StmtKind::Export(export) => self.emit_export(export),
            StmtKind::Block(block) => {
                self.line("{");
                self.emit_braced_body(&block.body);
                self.line("}");
            }
            StmtKind::ExpressionStatement(expr) => {
                let text = self.emit_expr(expr);
                self.line(&format!("{text};"));
            }
        }
    }

    fn emit_braced_stmt(&mut self, stmt: &Stmt) {
        match &stmt.kind {
            StmtKind::Block(block) => self.emit_braced_body(&block.body),
            other => {
                self.depth += 1;
                self.emit_stmt(&Stmt::new(other.clone(), stmt.position));
                self.depth -= 1;
            }
        }
    }

    fn emit_for_init(&mut self, stmt: &Stmt) -> String {
        match &stmt.kind {
            StmtKind::VariableDeclaration { kind, pattern, init, .. } => {
                let keyword = match kind {
                    VarKind::Const => "const",
                    VarKind::Mutable => "let",
                };
                let target = emit_pattern(pattern);
                match init {
                    Some(expr) => {
                        let value = self.emit_expr(expr);
                        format!("{keyword} {target} = {value}")
                    }
                    None => format!("{keyword} {target}"),
                }
            }
            StmtKind::ExpressionStatement(expr) => self.emit_expr(expr),
            _ => String::new(),
        }
    }

    fn emit_class_member(&mut self, member: &ClassMember) {
        match member {
            ClassMember::Property { name, initializer, modifiers, .. } => {
                let prefix = if modifiers.is_static { "static " } else { "" };
                match initializer {
                    Some(expr) => {
                        let value = self.emit_expr(expr);
                        self.line(&format!("{prefix}{name} = {value};"));
                    }
                    None => self.line(&format!("{prefix}{name};")),
                }
            }
            ClassMember::Method { name, params, body, modifiers, is_async, is_constructor, .. } => {
                let static_prefix = if modifiers.is_static { "static " } else { "" };
                let async_prefix = if *is_async { "async " } else { "" };
                let method_name = if *is_constructor { "constructor" } else { name.as_str() };
                let param_list = emit_param_list(params, self);
                match body {
                    Some(block) => {
                        self.line(&format!("{static_prefix}{async_prefix}{method_name}({param_list}) {{"));
                        self.emit_braced_body(&block.body);
                        self.line("}");
                    }
                    None => self.line(&format!("{static_prefix}{async_prefix}{method_name}({param_list});")),
                }
            }
        }
    }

    fn emit_import(&mut self, specifiers: &[ImportSpecifier], source: &str) {
        let temp = self.next_import_temp();
        let js_source = rewrite_source_extension(source);
        self.line(&format!("const {temp} = require(\"{js_source}\");"));
        let mut named = Vec::new();
        for spec in specifiers {
            match spec {
                ImportSpecifier::Default(name) => {
                    self.line(&format!("const {name} = {temp}.default;"));
                }
                ImportSpecifier::Namespace(name) => {
                    self.line(&format!("const {name} = {temp};"));
                }
                ImportSpecifier::Named { imported, local } => named.push((imported.clone(), local.clone())),
            }
        }
        if !named.is_empty() {
            let parts: Vec<String> = named
                .iter()
                .map(|(imported, local)| if imported == local { imported.clone() } else { format!("{imported}: {local}") })
                .collect();
            self.line(&format!("const {{ {} }} = {temp};", parts.join(", ")));
        }
    }

    fn emit_export(&mut self, export: &ExportKind) {
        let sink = self.export_target.clone();
        match export {
            ExportKind::Declaration(inner) => {
                self.emit_stmt(inner);
                match &inner.kind {
                    StmtKind::FunctionDeclaration { name, .. }
                    | StmtKind::ClassDeclaration { name, .. }
                    | StmtKind::InterfaceDeclaration { name, .. }
                    | StmtKind::TypeAlias { name, .. } => {
                        self.line(&format!("{sink}.{name} = {name};"));
                    }
                    StmtKind::VariableDeclaration { pattern: Pattern { kind: PatternKind::Identifier(name), .. }, .. } => {
                        self.line(&format!("{sink}.{name} = {name};"));
                    }
                    StmtKind::NamespaceDeclaration { name, .. } => {
                        self.line(&format!("{sink}.{name} = {name};"));
                    }
                    _ => {}
                }
            }
            ExportKind::Default(expr) => {
                let value = self.emit_expr(expr);
                self.line(&format!("{sink}.default = {value};"));
            }
            ExportKind::Named { specifiers, source: None } => {
                for spec in specifiers {
                    self.line(&format!("{sink}.{} = {};", spec.exported, spec.local));
                }
            }
            ExportKind::Named { specifiers, source: Some(source) } => {
                let temp = self.next_import_temp();
                let js_source = rewrite_source_extension(source);
                self.line(&format!("const {temp} = require(\"{js_source}\");"));
                for spec in specifiers {
                    self.line(&format!("{sink}.{} = {temp}.{};", spec.exported, spec.local));
                }
            }
            ExportKind::Wildcard { source } => {
                let temp = self.next_import_temp();
                let js_source = rewrite_source_extension(source);
                self.line(&format!("const {temp} = require(\"{js_source}\");"));
                self.line(&format!("Object.keys({temp}).forEach(function (key) {{"));
                self.depth += 1;
                self.line(&format!("{sink}[key] = {temp}[key];"));
                self.depth -= 1;
                self.line("});");
            }
        }
    }

    // ---- expressions ----

    fn emit_expr(&mut self, expr: &Expr) -> String {
        match &expr.kind {
            ExprKind::Identifier(name) => name.clone(),
            ExprKind::This => "this".to_string(),
            ExprKind::Super => "super".to_string(),
            ExprKind::Literal { value, raw } => emit_literal(value, raw),
            ExprKind::TemplateLiteral { quasis, expressions } => self.emit_template(quasis, expressions),
            ExprKind::Binary { op, left, right } => {
                let left = self.emit_operand(left);
                let right = self.emit_operand(right);
                format!("{left} {} {right}", binary_op_text(*op))
            }
            ExprKind::Unary { op, argument } => self.emit_unary(*op, argument),
            ExprKind::Update { op, argument, prefix } => {
                let arg = self.emit_expr(argument);
                let op_text = match op {
                    UpdateOp::Increment => "++",
                    UpdateOp::Decrement => "--",
                };
                if *prefix {
                    format!("{op_text}{arg}")
                } else {
                    format!("{arg}{op_text}")
                }
            }
            ExprKind::Assignment { op, target, value } => {
                let target = self.emit_expr(target);
                let value = self.emit_expr(value);
                format!("{target} {} {value}", assign_op_text(*op))
            }
            ExprKind::Call { callee, arguments, optional } => {
                let callee = self.emit_operand(callee);
                let args = self.emit_arguments(arguments);
                let dot = if *optional { "?." } else { "" };
                format!("{callee}{dot}({args})")
            }
            ExprKind::New { callee, arguments } => {
                let callee = self.emit_operand(callee);
                let args = self.emit_arguments(arguments);
                format!("new {callee}({args})")
            }
            ExprKind::Member { object, property, computed, optional } => {
                self.emit_member(object, property, *computed, *optional)
            }
            ExprKind::Array { elements } => {
                let items: Vec<String> = elements.iter().map(|e| self.emit_expr(e)).collect();
                format!("[{}]", items.join(", "))
            }
            ExprKind::Object { properties } => self.emit_object(properties),
            ExprKind::Arrow { params, body, is_async } => self.emit_arrow(params, body, *is_async),
            ExprKind::Await { argument } => {
                let arg = self.emit_expr(argument);
                format!("await {arg}")
            }
            ExprKind::ImportExpression { source } => {
                let arg = self.emit_expr(source);
                format!("require({arg})")
            }
            ExprKind::Spread { argument } => {
                let arg = self.emit_expr(argument);
                format!("...{arg}")
            }
        }
    }

    /// Binary operands always get parenthesized -- conservative by design
    /// (`spec.md` §4.4).
    fn emit_operand(&mut self, expr: &Expr) -> String {
        let text = self.emit_expr(expr);
        if matches!(expr.kind, ExprKind::Binary { .. }) {
            format!("({text})")
        } else {
            text
        }
    }

    fn emit_unary(&mut self, op: UnaryOp, argument: &Expr) -> String {
        let arg = self.emit_operand(argument);
        match op {
            UnaryOp::Not => format!("!{arg}"),
            UnaryOp::Neg => format!("-{arg}"),
            UnaryOp::Plus => format!("+{arg}"),
            UnaryOp::BitNot => format!("~{arg}"),
            UnaryOp::Typeof => format!("typeof {arg}"),
            UnaryOp::Await => format!("await {arg}"),
        }
    }

    fn emit_member(&mut self, object: &Expr, property: &Expr, computed: bool, optional: bool) -> String {
        let mut object_text = self.emit_operand(object);
        if let ExprKind::Identifier(name) = &object.kind {
            if let Some(remapped) = builtins::remapped_namespace(name) {
                object_text = remapped.to_string();
            }
        }
        if computed {
            let prop = self.emit_expr(property);
            let dot = if optional { "?." } else { "" };
            format!("{object_text}{dot}[{prop}]")
        } else {
            let mut name = match &property.kind {
                ExprKind::Identifier(n) => n.clone(),
                other => panic!("non-computed member property must be an identifier, got {other:?}"),
            };
            if let ExprKind::Identifier(obj_name) = &object.kind {
                if builtins::remapped_namespace(obj_name) == Some("console") {
                    name = builtins::remap_console_member(&name).to_string();
                } else if !builtins::looks_user_defined(obj_name) {
                    // Ordinary receiver (not a remapped namespace, not a
                    // user-defined one by the uppercase-Cyrillic heuristic):
                    // a case-only mismatch against the Array/String whitelist
                    // is corrected the same way `console.Error` is.
                    if let Some(canonical) = builtins::canonical_builtin_member(&name) {
                        name = canonical.to_string();
                    }
                }
            }
            let dot = if optional { "?." } else { "." };
            format!("{object_text}{dot}{name}")
        }
    }

    fn emit_arguments(&mut self, arguments: &[Expr]) -> String {
        arguments.iter().map(|a| self.emit_expr(a)).collect::<Vec<_>>().join(", ")
    }

    fn emit_object(&mut self, properties: &[ObjectProperty]) -> String {
        if properties.is_empty() {
            return "{}".to_string();
        }
        let parts: Vec<String> = properties
            .iter()
            .map(|p| {
                let value = self.emit_expr(&p.value);
                match &p.key {
                    PropertyKey::Identifier(key) if p.shorthand => key.clone(),
                    PropertyKey::Identifier(key) => format!("{key}: {value}"),
                    PropertyKey::StringLiteral(key) => format!("{key:?}: {value}"),
                    PropertyKey::Computed(key_expr) => {
                        let key = self.emit_expr(key_expr);
                        format!("[{key}]: {value}")
                    }
                }
            })
            .collect();
        format!("{{ {} }}", parts.join(", "))
    }

    fn emit_arrow(&mut self, params: &[Param], body: &ArrowBody, is_async: bool) -> String {
        let prefix = if is_async { "async " } else { "" };
        let param_list = emit_param_list(params, self);
        match body {
            ArrowBody::Expr(expr) => {
                let value = self.emit_expr(expr);
                if matches!(expr.kind, ExprKind::Object { .. }) {
                    format!("{prefix}({param_list}) => ({value})")
                } else {
                    format!("{prefix}({param_list}) => {value}")
                }
            }
            ArrowBody::Block(block) => {
                let pad = self.pad();
                let header = format!("{prefix}({param_list}) => {{\n");
                let saved = std::mem::take(&mut self.out);
                self.depth += 1;
                for stmt in &block.body {
                    self.emit_stmt(stmt);
                }
                self.depth -= 1;
                let rendered = std::mem::replace(&mut self.out, saved);
                format!("{header}{rendered}{pad}}}")
            }
        }
    }

    fn emit_template(&mut self, quasis: &[String], expressions: &[Expr]) -> String {
        let mut text = String::from("`");
        for (i, quasi) in quasis.iter().enumerate() {
            text.push_str(quasi);
            if let Some(expr) = expressions.get(i) {
                text.push_str("${");
                text.push_str(&self.emit_expr(expr));
                text.push('}');
            }
        }
        text.push('`');
        text
    }
}

impl Default for Generator {
    fn default() -> Self {
        Self::new()
    }
}

fn emit_param_list(params: &[Param], gen: &mut Generator) -> String {
    params
        .iter()
        .map(|p| {
            let target = emit_pattern(&p.pattern);
            match &p.default {
                Some(expr) => {
                    let value = gen.emit_expr(expr);
                    format!("{target} = {value}")
                }
                None => target,
            }
        })
        .collect::<Vec<_>>()
        .join(", ")
}

fn emit_pattern(pattern: &Pattern) -> String {
    match &pattern.kind {
        PatternKind::Identifier(name) => name.clone(),
        PatternKind::ArrayPattern { elements } => {
            let items: Vec<String> = elements.iter().map(|e| e.as_ref().map(emit_pattern).unwrap_or_default()).collect();
            format!("[{}]", items.join(", "))
        }
        PatternKind::ObjectPattern { properties } => {
            let items: Vec<String> = properties
                .iter()
                .map(|p| {
                    let value = emit_pattern(&p.value);
                    if p.shorthand {
                        value
                    } else {
                        format!("{}: {value}", p.key)
                    }
                })
                .collect();
            format!("{{ {} }}", items.join(", "))
        }
        PatternKind::RestElement { argument } => format!("...{}", emit_pattern(argument)),
    }
}

fn emit_literal(value: &LiteralValue, raw: &str) -> String {
    match value {
        LiteralValue::Number(_) | LiteralValue::String(_) => raw.to_string(),
        LiteralValue::Bool(true) => "true".to_string(),
        LiteralValue::Bool(false) => "false".to_string(),
        LiteralValue::Null => "null".to_string(),
        LiteralValue::Undefined => "undefined".to_string(),
    }
}

fn binary_op_text(op: BinaryOp) -> &'static str {
    match op {
        BinaryOp::Add => "+",
        BinaryOp::Sub => "-",
        BinaryOp::Mul => "*",
        BinaryOp::Div => "/",
        BinaryOp::Rem => "%",
        BinaryOp::Exp => "**",
        BinaryOp::Eq => "==",
        BinaryOp::StrictEq => "===",
        BinaryOp::NotEq => "!=",
        BinaryOp::StrictNotEq => "!==",
        BinaryOp::Lt => "<",
        BinaryOp::LtEq => "<=",
        BinaryOp::Gt => ">",
        BinaryOp::GtEq => ">=",
        BinaryOp::In => "in",
        BinaryOp::Instanceof => "instanceof",
        BinaryOp::Shl => "<<",
        BinaryOp::Shr => ">>",
        BinaryOp::UShr => ">>>",
        BinaryOp::BitAnd => "&",
        BinaryOp::BitOr => "|",
        BinaryOp::BitXor => "^",
        BinaryOp::LogicalAnd => "&&",
        BinaryOp::LogicalOr => "||",
        BinaryOp::NullishCoalesce => "??",
    }
}

fn assign_op_text(op: AssignOp) -> &'static str {
    match op {
        AssignOp::Assign => "=",
        AssignOp::AddAssign => "+=",
        AssignOp::SubAssign => "-=",
        AssignOp::MulAssign => "*=",
        AssignOp::DivAssign => "/=",
        AssignOp::RemAssign => "%=",
        AssignOp::ExpAssign => "**=",
        AssignOp::AndAssign => "&&=",
        AssignOp::OrAssign => "||=",
        AssignOp::NullishAssign => "??=",
        AssignOp::BitAndAssign => "&=",
        AssignOp::BitOrAssign => "|=",
        AssignOp::BitXorAssign => "^=",
        AssignOp::ShlAssign => "<<=",
        AssignOp::ShrAssign => ">>=",
        AssignOp::UShrAssign => ">>>=",
    }
}

/// `./x.som` -> `./x.js`; anything else passes through untouched
/// (`spec.md` §4.4, "Import sources ending in `.som` are rewritten").
fn rewrite_source_extension(source: &str) -> String {
    match source.strip_suffix(".som") {
        Some(stem) => format!("{stem}.js"),
        None => source.to_string(),
    }
}
