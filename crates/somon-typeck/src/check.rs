//! The structural/bidirectional type checker (`spec.md` §4.3).
//!
//! Two passes: `collect` walks top-level declarations into the interface/
//! class/type-alias tables (so forward references resolve), then `check`
//! walks statement bodies sequentially against a lexical `SymbolTable`.

use crate::env::SymbolTable;
use crate::error::{TypeError, TypeWarning};
use crate::ty::{Member, MethodSig, Primitive, Property, Type};
use rustc_hash::FxHashMap;
use somon_common::Position;
use somon_parser::*;

pub struct CheckResult {
    pub errors: Vec<TypeError>,
    pub warnings: Vec<TypeWarning>,
}

/// `check(program) → {errors[], warnings[]}` -- never mutates `program`.
pub fn check(program: &Program) -> CheckResult {
    let mut checker = Checker::new();
    checker.collect(&program.body);
    checker.validate_class_hierarchy();
    checker.check_block_body(&program.body);
    checker.warnings.extend(collect_unused_imports(&program.body));
    CheckResult {
        errors: checker.errors,
        warnings: checker.warnings,
    }
}

/// Flags import bindings that no identifier in the module ever references.
/// Deliberately simple: it tracks *names*, not scopes, so a shadowing local
/// with the same spelling as an import will hide a real unused import.
fn collect_unused_imports(body: &[Stmt]) -> Vec<TypeWarning> {
    let mut imports = Vec::new();
    for stmt in body {
        if let StmtKind::Import { specifiers, .. } = &stmt.kind {
            for spec in specifiers {
                let name = match spec {
                    ImportSpecifier::Default(name) => name.clone(),
                    ImportSpecifier::Named { local, .. } => local.clone(),
                    ImportSpecifier::Namespace(name) => name.clone(),
                };
                imports.push((name, stmt.position));
            }
        }
    }
    if imports.is_empty() {
        return Vec::new();
    }
    let mut used = rustc_hash::FxHashSet::default();
    for stmt in body {
        if !matches!(stmt.kind, StmtKind::Import { .. }) {
            used_names_in_stmt(stmt, &mut used);
        }
    }
    imports
        .into_iter()
        .filter(|(name, _)| !used.contains(name))
        .map(|(name, position)| TypeWarning::UnusedImport { name, position })
        .collect()
}

fn used_names_in_stmt(stmt: &Stmt, used: &mut rustc_hash::FxHashSet<String>) {
    match &stmt.kind {
        StmtKind::VariableDeclaration { init, .. } => {
            if let Some(init) = init {
                used_names_in_expr(init, used);
            }
        }
        StmtKind::FunctionDeclaration { body, .. } => body.body.iter().for_each(|s| used_names_in_stmt(s, used)),
        StmtKind::ClassDeclaration { super_class, implements, body, .. } => {
            if let Some(name) = super_class {
                used.insert(name.clone());
            }
            used.extend(implements.iter().cloned());
            for member in body {
                match member {
                    ClassMember::Property { initializer: Some(e), .. } => used_names_in_expr(e, used),
                    ClassMember::Method { body: Some(block), .. } => {
                        block.body.iter().for_each(|s| used_names_in_stmt(s, used))
                    }
                    _ => {}
                }
            }
        }
        StmtKind::NamespaceDeclaration { body, .. } => body.iter().for_each(|s| used_names_in_stmt(s, used)),
        StmtKind::If { test, consequent, alternate } => {
            used_names_in_expr(test, used);
            used_names_in_stmt(consequent, used);
            if let Some(alt) = alternate {
                used_names_in_stmt(alt, used);
            }
        }
        StmtKind::While { test, body } => {
            used_names_in_expr(test, used);
            used_names_in_stmt(body, used);
        }
        StmtKind::For { init, test, update, body } => {
            if let Some(init) = init {
                used_names_in_stmt(init, used);
            }
            if let Some(test) = test {
                used_names_in_expr(test, used);
            }
            if let Some(update) = update {
                used_names_in_expr(update, used);
            }
            used_names_in_stmt(body, used);
        }
        StmtKind::ForIn { right, body, .. } | StmtKind::ForOf { right, body, .. } => {
            used_names_in_expr(right, used);
            used_names_in_stmt(body, used);
        }
        StmtKind::Return { argument: Some(e) } => used_names_in_expr(e, used),
        StmtKind::Throw { argument } => used_names_in_expr(argument, used),
        StmtKind::Try { block, handler, finalizer } => {
            block.body.iter().for_each(|s| used_names_in_stmt(s, used));
            if let Some(handler) = handler {
                handler.body.body.iter().for_each(|s| used_names_in_stmt(s, used));
            }
            if let Some(finalizer) = finalizer {
                finalizer.body.iter().for_each(|s| used_names_in_stmt(s, used));
            }
        }
        StmtKind::Switch { discriminant, cases } => {
            used_names_in_expr(discriminant, used);
            for case in cases {
                if let Some(test) = &case.test {
                    used_names_in_expr(test, used);
                }
                case.consequent.iter().for_each(|s| used_names_in_stmt(s, used));
            }
        }
        StmtKind::Block(block) => block.body.iter().for_each(|s| used_names_in_stmt(s, used)),
        StmtKind::ExpressionStatement(expr) => used_names_in_expr(expr, used),
        StmtKind::Export(ExportKind::Declaration(inner)) => used_names_in_stmt(inner, used),
        StmtKind::Export(ExportKind::Default(expr)) => used_names_in_expr(expr, used),
        StmtKind::Export(ExportKind::Named { specifiers, .. }) => {
            used.extend(specifiers.iter().map(|s| s.local.clone()));
        }
        _ => {}
    }
}

fn used_names_in_expr(expr: &Expr, used: &mut rustc_hash::FxHashSet<String>) {
    match &expr.kind {
        ExprKind::Identifier(name) => {
            used.insert(name.clone());
        }
        ExprKind::TemplateLiteral { expressions, .. } => expressions.iter().for_each(|e| used_names_in_expr(e, used)),
        ExprKind::Binary { left, right, .. } => {
            used_names_in_expr(left, used);
            used_names_in_expr(right, used);
        }
        ExprKind::Unary { argument, .. } | ExprKind::Update { argument, .. } | ExprKind::Await { argument } => {
            used_names_in_expr(argument, used)
        }
        ExprKind::Call { callee, arguments, .. } => {
            used_names_in_expr(callee, used);
            arguments.iter().for_each(|a| used_names_in_expr(a, used));
        }
        ExprKind::New { callee, arguments } => {
            used_names_in_expr(callee, used);
            arguments.iter().for_each(|a| used_names_in_expr(a, used));
        }
        ExprKind::Member { object, property, computed, .. } => {
            used_names_in_expr(object, used);
            if *computed {
                used_names_in_expr(property, used);
            }
        }
        ExprKind::Assignment { target, value, .. } => {
            used_names_in_expr(target, used);
            used_names_in_expr(value, used);
        }
        ExprKind::Array { elements } => elements.iter().for_each(|e| used_names_in_expr(e, used)),
        ExprKind::Object { properties } => {
            for prop in properties {
                if let PropertyKey::Computed(key) = &prop.key {
                    used_names_in_expr(key, used);
                }
                used_names_in_expr(&prop.value, used);
            }
        }
        ExprKind::Arrow { body, .. } => match body {
            ArrowBody::Expr(e) => used_names_in_expr(e, used),
            ArrowBody::Block(b) => b.body.iter().for_each(|s| used_names_in_stmt(s, used)),
        },
        ExprKind::ImportExpression { source } => used_names_in_expr(source, used),
        ExprKind::Spread { argument } => used_names_in_expr(argument, used),
        ExprKind::Literal { .. } | ExprKind::This | ExprKind::Super => {}
    }
}

struct Checker {
    interfaces: FxHashMap<String, Type>,
    classes: FxHashMap<String, Type>,
    type_aliases: FxHashMap<String, TypeNode>,
    env: SymbolTable,
    errors: Vec<TypeError>,
    warnings: Vec<TypeWarning>,
}

impl Checker {
    fn new() -> Self {
        Self {
            interfaces: FxHashMap::default(),
            classes: FxHashMap::default(),
            type_aliases: FxHashMap::default(),
            env: SymbolTable::new(),
            errors: Vec::new(),
            warnings: Vec::new(),
        }
    }

    // ---- pass 1: collection ----

    fn collect(&mut self, body: &[Stmt]) {
        for stmt in body {
            self.collect_stmt(stmt);
        }
    }

    fn collect_stmt(&mut self, stmt: &Stmt) {
        match &stmt.kind {
            StmtKind::InterfaceDeclaration { name, body, .. } => {
                let members = body.iter().map(|m| self.resolve_interface_member(m)).collect();
                self.interfaces.insert(name.clone(), Type::Interface { name: name.clone(), members });
            }
            StmtKind::TypeAlias { name, annotation, .. } => {
                self.type_aliases.insert(name.clone(), annotation.clone());
            }
            StmtKind::ClassDeclaration { name, super_class, body, .. } => {
                let members = body.iter().filter_map(|m| self.resolve_class_member(m)).collect();
                self.classes.insert(
                    name.clone(),
                    Type::Class {
                        name: name.clone(),
                        base_class: super_class.clone(),
                        members,
                    },
                );
            }
            StmtKind::Export(ExportKind::Declaration(inner)) => self.collect_stmt(inner),
            StmtKind::NamespaceDeclaration { body, .. } => self.collect(body),
            _ => {}
        }
    }

    fn resolve_interface_member(&self, member: &InterfaceMember) -> Member {
        match member {
            InterfaceMember::Property { name, type_annotation, optional, .. } => Member::Property(Property {
                name: name.clone(),
                ty: self.resolve_type(type_annotation),
                optional: *optional,
            }),
            InterfaceMember::Method { name, params, return_type } => Member::Method(MethodSig {
                name: name.clone(),
                params: params
                    .iter()
                    .map(|p| p.type_annotation.as_ref().map(|t| self.resolve_type(t)).unwrap_or_else(Type::any))
                    .collect(),
                return_type: Box::new(
                    return_type.as_ref().map(|t| self.resolve_type(t)).unwrap_or(Type::Primitive(Primitive::Void)),
                ),
            }),
        }
    }

    fn resolve_class_member(&self, member: &ClassMember) -> Option<Member> {
        match member {
            ClassMember::Property { name, type_annotation, .. } => Some(Member::Property(Property {
                name: name.clone(),
                ty: type_annotation.as_ref().map(|t| self.resolve_type(t)).unwrap_or_else(Type::any),
                optional: false,
            })),
            ClassMember::Method { name, params, return_type, is_constructor, .. } => {
                if *is_constructor {
                    return None;
                }
                Some(Member::Method(MethodSig {
                    name: name.clone(),
                    params: params
                        .iter()
                        .map(|p| p.type_annotation.as_ref().map(|t| self.resolve_type(t)).unwrap_or_else(Type::any))
                        .collect(),
                    return_type: Box::new(
                        return_type.as_ref().map(|t| self.resolve_type(t)).unwrap_or(Type::Primitive(Primitive::Void)),
                    ),
                }))
            }
        }
    }

    /// Walk each class's `base_class` chain, detecting cycles and invalid
    /// `extends` targets (`spec.md` §4.3, "Class validation").
    fn validate_class_hierarchy(&mut self) {
        let names: Vec<String> = self.classes.keys().cloned().collect();
        for name in names {
            let mut visited = vec![name.clone()];
            let mut current = name.clone();
            loop {
                let base = match self.classes.get(&current) {
                    Some(Type::Class { base_class: Some(base), .. }) => base.clone(),
                    _ => break,
                };
                if visited.contains(&base) {
                    self.errors.push(TypeError::CircularInheritance {
                        cycle: {
                            let mut cycle = visited.clone();
                            cycle.push(base);
                            cycle
                        },
                        position: Position::start(),
                    });
                    break;
                }
                if !self.classes.contains_key(&base) {
                    if self.interfaces.contains_key(&base) {
                        self.errors.push(TypeError::InvalidExtends { name: base, position: Position::start() });
                    } else {
                        self.errors.push(TypeError::ClassNotFound { name: base, position: Position::start() });
                    }
                    break;
                }
                visited.push(base.clone());
                current = base;
            }
        }
    }

    // ---- type resolution ----

    fn resolve_type(&self, node: &TypeNode) -> Type {
        match &node.kind {
            TypeKind::PrimitiveType { name } => Type::Primitive(match name {
                PrimitiveName::String => Primitive::String,
                PrimitiveName::Number => Primitive::Number,
                PrimitiveName::Boolean => Primitive::Boolean,
                PrimitiveName::Null => Primitive::Null,
                PrimitiveName::Undefined => Primitive::Undefined,
                PrimitiveName::Any => Primitive::Any,
                PrimitiveName::Unknown => Primitive::Unknown,
                PrimitiveName::Never => Primitive::Never,
                PrimitiveName::Void => Primitive::Void,
                PrimitiveName::Object => Primitive::Object,
            }),
            TypeKind::ArrayType { element } => Type::Array(Box::new(self.resolve_type(element))),
            TypeKind::TupleType { elements } => Type::Tuple(elements.iter().map(|e| self.resolve_type(e)).collect()),
            TypeKind::UnionType { types } => Type::Union(types.iter().map(|t| self.resolve_type(t)).collect()),
            TypeKind::IntersectionType { types } => {
                Type::Intersection(types.iter().map(|t| self.resolve_type(t)).collect())
            }
            TypeKind::LiteralType { value } => Type::Literal(value.clone()),
            TypeKind::UniqueType { base } => Type::Unique(Box::new(self.resolve_type(base))),
            TypeKind::GenericType { name, type_parameters } => self.resolve_named_type(name, type_parameters),
            TypeKind::ConditionalType { check, extends, true_type, false_type } => {
                let check_ty = self.resolve_type(check);
                let extends_ty = self.resolve_type(extends);
                if is_assignable(&check_ty, &extends_ty) {
                    self.resolve_type(true_type)
                } else {
                    self.resolve_type(false_type)
                }
            }
            // Mapped types would require enumerating a type's keys at the
            // type level; approximated as an opaque object (documented in
            // DESIGN.md as a deliberate simplification).
            TypeKind::MappedType { .. } => Type::Object { properties: Vec::new() },
            TypeKind::IndexedAccessType { object, index } => {
                let object_ty = self.resolve_type(object);
                if let TypeKind::LiteralType { value: LiteralValue::String(key) } = &index.kind {
                    if let Some(members) = object_ty.members() {
                        if let Some(Member::Property(p)) = members.iter().find(|m| m.name() == key) {
                            return p.ty.clone();
                        }
                    }
                    if let Some(props) = object_ty.properties() {
                        if let Some(p) = props.iter().find(|p| &p.name == key) {
                            return p.ty.clone();
                        }
                    }
                }
                Type::unknown()
            }
            TypeKind::KeyofType { base } => {
                let base_ty = self.resolve_type(base);
                let keys: Vec<Type> = base_ty
                    .members()
                    .map(|members| members.iter().map(|m| Type::Literal(LiteralValue::String(m.name().to_string()))).collect())
                    .or_else(|| {
                        base_ty
                            .properties()
                            .map(|props| props.iter().map(|p| Type::Literal(LiteralValue::String(p.name.clone()))).collect())
                    })
                    .unwrap_or_default();
                if keys.is_empty() {
                    Type::unknown()
                } else {
                    Type::Union(keys)
                }
            }
        }
    }

    fn resolve_named_type(&self, name: &str, type_parameters: &[TypeNode]) -> Type {
        if !type_parameters.is_empty() {
            return Type::Generic {
                name: name.to_string(),
                type_parameters: type_parameters.iter().map(|t| self.resolve_type(t)).collect(),
            };
        }
        if let Some(iface) = self.interfaces.get(name) {
            return iface.clone();
        }
        if let Some(class) = self.classes.get(name) {
            return class.clone();
        }
        if let Some(alias) = self.type_aliases.get(name) {
            return self.resolve_type(alias);
        }
        Type::Unknown { name: Some(name.to_string()) }
    }

    // ---- pass 2: checking ----

    fn check_block_body(&mut self, body: &[Stmt]) {
        let mut terminated = false;
        for stmt in body {
            if terminated {
                self.warnings.push(TypeWarning::UnreachableCode { position: stmt.position });
            }
            self.check_stmt(stmt);
            if matches!(stmt.kind, StmtKind::Return { .. } | StmtKind::Throw { .. } | StmtKind::Break | StmtKind::Continue) {
                terminated = true;
            }
        }
    }

    fn check_stmt(&mut self, stmt: &Stmt) {
        match &stmt.kind {
            StmtKind::VariableDeclaration { pattern, type_annotation, init, .. } => {
                let declared = type_annotation.as_ref().map(|t| self.resolve_type(t));
                let inferred = init.as_ref().map(|e| self.infer_expr(e, declared.as_ref()));
                if let (Some(declared), Some(inferred)) = (&declared, &inferred) {
                    if !is_assignable(inferred, declared) {
                        self.errors.push(TypeError::NotAssignable {
                            source: inferred.clone(),
                            target: declared.clone(),
                            position: stmt.position,
                        });
                    }
                }
                let bound = declared.or(inferred).unwrap_or_else(Type::any);
                self.bind_pattern(pattern, &bound);
            }
            StmtKind::FunctionDeclaration { name, params, return_type, body, .. } => {
                let return_ty = return_type.as_ref().map(|t| self.resolve_type(t)).unwrap_or_else(Type::any);
                self.env.define(
                    name.clone(),
                    Type::Function {
                        params: params
                            .iter()
                            .map(|p| p.type_annotation.as_ref().map(|t| self.resolve_type(t)).unwrap_or_else(Type::any))
                            .collect(),
                        return_type: Box::new(return_ty),
                    },
                );
                self.env.enter_scope();
                for param in params {
                    let ty = param.type_annotation.as_ref().map(|t| self.resolve_type(t)).unwrap_or_else(Type::any);
                    self.bind_pattern(&param.pattern, &ty);
                }
                self.check_block_body(&body.body);
                self.env.exit_scope();
            }
            StmtKind::ClassDeclaration { name, body, .. } => {
                self.env.define(name.clone(), self.classes.get(name).cloned().unwrap_or_else(Type::any));
                self.env.enter_scope();
                self.env.define("ин", Type::any());
                for member in body {
                    self.check_class_member(member);
                }
                self.env.exit_scope();
            }
            StmtKind::If { test, consequent, alternate } => {
                self.infer_expr(test, None);
                self.check_stmt(consequent);
                if let Some(alt) = alternate {
                    self.check_stmt(alt);
                }
            }
            StmtKind::While { test, body } => {
                self.infer_expr(test, None);
                self.check_stmt(body);
            }
            StmtKind::For { init, test, update, body } => {
                self.env.enter_scope();
                if let Some(init) = init {
                    self.check_stmt(init);
                }
                if let Some(test) = test {
                    self.infer_expr(test, None);
                }
                if let Some(update) = update {
                    self.infer_expr(update, None);
                }
                self.check_stmt(body);
                self.env.exit_scope();
            }
            StmtKind::ForIn { left, right, body } | StmtKind::ForOf { left, right, body } => {
                self.infer_expr(right, None);
                self.env.enter_scope();
                self.bind_pattern(left, &Type::any());
                self.check_stmt(body);
                self.env.exit_scope();
            }
            StmtKind::Return { argument } => {
                if let Some(arg) = argument {
                    self.infer_expr(arg, None);
                }
            }
            StmtKind::Throw { argument } => {
                self.infer_expr(argument, None);
            }
            StmtKind::Try { block, handler, finalizer } => {
                self.check_block_body(&block.body);
                if let Some(handler) = handler {
                    self.env.enter_scope();
                    if let Some(param) = &handler.param {
                        self.bind_pattern(param, &Type::any());
                    }
                    self.check_block_body(&handler.body.body);
                    self.env.exit_scope();
                }
                if let Some(finalizer) = finalizer {
                    self.check_block_body(&finalizer.body);
                }
            }
            StmtKind::Switch { discriminant, cases } => {
                self.infer_expr(discriminant, None);
                for case in cases {
                    if let Some(test) = &case.test {
                        self.infer_expr(test, None);
                    }
                    self.check_block_body(&case.consequent);
                }
            }
            StmtKind::Block(block) => {
                self.env.enter_scope();
                self.check_block_body(&block.body);
                self.env.exit_scope();
            }
            StmtKind::Export(ExportKind::Declaration(inner)) => self.check_stmt(inner),
            StmtKind::Export(ExportKind::Default(expr)) => {
                self.infer_expr(expr, None);
            }
            StmtKind::NamespaceDeclaration { body, .. } => {
                self.env.enter_scope();
                self.check_block_body(body);
                self.env.exit_scope();
            }
            StmtKind::ExpressionStatement(expr) => {
                self.infer_expr(expr, None);
            }
            StmtKind::InterfaceDeclaration { .. }
            | StmtKind::TypeAlias { .. }
            | StmtKind::Import { .. }
            | StmtKind::Export(ExportKind::Named { .. })
            | StmtKind::Export(ExportKind::Wildcard { .. })
            | StmtKind::Break
            | StmtKind::Continue => {}
        }
    }

    fn check_class_member(&mut self, member: &ClassMember) {
        match member {
            ClassMember::Property { type_annotation, initializer, .. } => {
                if let (Some(annotation), Some(init)) = (type_annotation, initializer) {
                    let declared = self.resolve_type(annotation);
                    let inferred = self.infer_expr(init, Some(&declared));
                    if !is_assignable(&inferred, &declared) {
                        self.errors.push(TypeError::NotAssignable {
                            source: inferred,
                            target: declared,
                            position: init.position,
                        });
                    }
                }
            }
            ClassMember::Method { params, body, return_type, .. } => {
                if let Some(body) = body {
                    self.env.enter_scope();
                    for param in params {
                        let ty = param.type_annotation.as_ref().map(|t| self.resolve_type(t)).unwrap_or_else(Type::any);
                        self.bind_pattern(&param.pattern, &ty);
                    }
                    let _ = return_type;
                    self.check_block_body(&body.body);
                    self.env.exit_scope();
                }
            }
        }
    }

    fn bind_pattern(&mut self, pattern: &Pattern, ty: &Type) {
        match &pattern.kind {
            PatternKind::Identifier(name) => self.env.define(name.clone(), ty.clone()),
            PatternKind::ArrayPattern { elements } => {
                let element_ty = match ty {
                    Type::Array(e) => (**e).clone(),
                    Type::Tuple(ts) => ts.first().cloned().unwrap_or_else(Type::any),
                    _ => Type::any(),
                };
                for element in elements.iter().flatten() {
                    self.bind_pattern(element, &element_ty);
                }
            }
            PatternKind::ObjectPattern { properties } => {
                for prop in properties {
                    let prop_ty = ty
                        .properties()
                        .and_then(|props| props.iter().find(|p| p.name == prop.key))
                        .map(|p| p.ty.clone())
                        .or_else(|| {
                            ty.members().and_then(|members| {
                                members.iter().find_map(|m| match m {
                                    Member::Property(p) if p.name == prop.key => Some(p.ty.clone()),
                                    _ => None,
                                })
                            })
                        })
                        .unwrap_or_else(Type::any);
                    self.bind_pattern(&prop.value, &prop_ty);
                }
            }
            PatternKind::RestElement { argument } => self.bind_pattern(argument, ty),
        }
    }

    // ---- inference (bidirectional where the target is known) ----

    fn infer_expr(&mut self, expr: &Expr, target: Option<&Type>) -> Type {
        match &expr.kind {
            ExprKind::Literal { value, .. } => Type::Literal(value.clone()),
            ExprKind::TemplateLiteral { expressions, .. } => {
                for e in expressions {
                    self.infer_expr(e, None);
                }
                Type::string()
            }
            ExprKind::Identifier(name) => self.env.lookup(name).cloned().unwrap_or_else(Type::unknown),
            ExprKind::This => Type::any(),
            ExprKind::Super => Type::any(),
            ExprKind::Array { elements } => self.infer_array(elements, target),
            ExprKind::Object { properties } => self.infer_object(properties, target),
            ExprKind::Binary { op, left, right } => self.infer_binary(*op, left, right),
            ExprKind::Unary { op, argument } => self.infer_unary(*op, argument),
            ExprKind::Update { argument, .. } => {
                self.infer_expr(argument, None);
                Type::number()
            }
            ExprKind::Assignment { target: lhs, value, .. } => {
                let value_ty = self.infer_expr(value, None);
                self.infer_expr(lhs, None);
                value_ty
            }
            ExprKind::Call { callee, arguments, .. } => {
                let callee_ty = self.infer_expr(callee, None);
                for arg in arguments {
                    self.infer_expr(arg, None);
                }
                match callee_ty {
                    Type::Function { return_type, .. } => *return_type,
                    _ => Type::unknown(),
                }
            }
            ExprKind::New { callee, arguments } => {
                for arg in arguments {
                    self.infer_expr(arg, None);
                }
                match &callee.kind {
                    ExprKind::Identifier(name) if name == "Масол" || name == "Маҷмӯа" => Type::Generic {
                        name: name.clone(),
                        type_parameters: vec![Type::any(), Type::any()],
                    },
                    ExprKind::Identifier(name) => {
                        self.classes.get(name).cloned().unwrap_or_else(|| Type::Unknown { name: Some(name.clone()) })
                    }
                    _ => Type::unknown(),
                }
            }
            ExprKind::Member { object, property, computed, .. } => {
                let object_ty = self.infer_expr(object, None);
                if !*computed {
                    if let ExprKind::Identifier(key) = &property.kind {
                        if let Some(members) = object_ty.members() {
                            if let Some(m) = members.iter().find(|m| m.name() == key) {
                                return match m {
                                    Member::Property(p) => p.ty.clone(),
                                    Member::Method(m) => {
                                        Type::Function { params: m.params.clone(), return_type: m.return_type.clone() }
                                    }
                                };
                            }
                        }
                    }
                } else {
                    self.infer_expr(property, None);
                }
                Type::unknown()
            }
            ExprKind::Arrow { params, body, .. } => {
                self.env.enter_scope();
                for param in params {
                    let ty = param.type_annotation.as_ref().map(|t| self.resolve_type(t)).unwrap_or_else(Type::any);
                    self.bind_pattern(&param.pattern, &ty);
                }
                let return_type = match body {
                    ArrowBody::Expr(e) => self.infer_expr(e, None),
                    ArrowBody::Block(b) => {
                        self.check_block_body(&b.body);
                        Type::any()
                    }
                };
                self.env.exit_scope();
                Type::Function {
                    params: params
                        .iter()
                        .map(|p| p.type_annotation.as_ref().map(|t| self.resolve_type(t)).unwrap_or_else(Type::any))
                        .collect(),
                    return_type: Box::new(return_type),
                }
            }
            ExprKind::Await { argument } => self.infer_expr(argument, None),
            ExprKind::ImportExpression { source } => {
                self.infer_expr(source, None);
                Type::any()
            }
            ExprKind::Spread { argument } => self.infer_expr(argument, None),
        }
    }

    fn infer_array(&mut self, elements: &[Expr], target: Option<&Type>) -> Type {
        match target {
            Some(Type::Tuple(slots)) => {
                let slots = slots.clone();
                Type::Tuple(elements.iter().enumerate().map(|(i, e)| self.infer_expr(e, slots.get(i))).collect())
            }
            Some(Type::Array(element_ty)) => {
                let element_ty = (**element_ty).clone();
                for element in elements {
                    self.infer_expr(element, Some(&element_ty));
                }
                Type::Array(Box::new(element_ty))
            }
            _ => {
                let widened: Vec<Type> = elements.iter().map(|e| self.infer_expr(e, None).widen()).collect();
                let element_ty = match widened.split_first() {
                    None => Type::any(),
                    Some((first, rest)) if rest.iter().all(|t| t == first) => first.clone(),
                    Some(_) => Type::Union(dedup(widened)),
                };
                Type::Array(Box::new(element_ty))
            }
        }
    }

    fn infer_object(&mut self, properties: &[ObjectProperty], target: Option<&Type>) -> Type {
        if let Some(iface @ Type::Interface { .. }) = target {
            for prop in properties {
                self.infer_expr(&prop.value, None);
            }
            return iface.clone();
        }
        let properties = properties
            .iter()
            .filter_map(|p| match &p.key {
                PropertyKey::Identifier(name) | PropertyKey::StringLiteral(name) => {
                    Some(Property { name: name.clone(), ty: self.infer_expr(&p.value, None), optional: false })
                }
                PropertyKey::Computed(key_expr) => {
                    self.infer_expr(key_expr, None);
                    self.infer_expr(&p.value, None);
                    None
                }
            })
            .collect();
        Type::Object { properties }
    }

    fn infer_binary(&mut self, op: BinaryOp, left: &Expr, right: &Expr) -> Type {
        let left_ty = self.infer_expr(left, None);
        let right_ty = self.infer_expr(right, None);
        match op {
            BinaryOp::Add => {
                if left_ty.widen() == Type::string() || right_ty.widen() == Type::string() {
                    Type::string()
                } else {
                    Type::number()
                }
            }
            BinaryOp::Sub
            | BinaryOp::Mul
            | BinaryOp::Div
            | BinaryOp::Rem
            | BinaryOp::Exp
            | BinaryOp::Shl
            | BinaryOp::Shr
            | BinaryOp::UShr
            | BinaryOp::BitAnd
            | BinaryOp::BitOr
            | BinaryOp::BitXor => Type::number(),
            BinaryOp::Eq
            | BinaryOp::StrictEq
            | BinaryOp::NotEq
            | BinaryOp::StrictNotEq
            | BinaryOp::Lt
            | BinaryOp::LtEq
            | BinaryOp::Gt
            | BinaryOp::GtEq
            | BinaryOp::In
            | BinaryOp::Instanceof => Type::boolean(),
            BinaryOp::LogicalAnd | BinaryOp::LogicalOr | BinaryOp::NullishCoalesce => right_ty,
        }
    }

    fn infer_unary(&mut self, op: UnaryOp, argument: &Expr) -> Type {
        let argument_ty = self.infer_expr(argument, None);
        match op {
            UnaryOp::Not => Type::boolean(),
            UnaryOp::Neg | UnaryOp::Plus | UnaryOp::BitNot => Type::number(),
            UnaryOp::Typeof => Type::string(),
            UnaryOp::Await => argument_ty,
        }
    }
}

fn dedup(types: Vec<Type>) -> Vec<Type> {
    let mut out: Vec<Type> = Vec::new();
    for ty in types {
        if !out.contains(&ty) {
            out.push(ty);
        }
    }
    out
}

/// `source ⇒ target`, the twelve ordered rules of `spec.md` §4.3.
pub fn is_assignable(source: &Type, target: &Type) -> bool {
    use Type::*;

    // 1. exact match
    if source == target {
        return true;
    }
    // 2. anything ⇒ any
    if matches!(target, Primitive(Primitive::Any)) {
        return true;
    }
    // 3. literal ⇒ primitive, by widened base
    if let Literal(_) = source {
        if let Primitive(_) = target {
            return &source.widen() == target;
        }
    }
    match (source, target) {
        // 4. array(E) ⇒ array(F)
        (Array(e), Array(f)) => is_assignable(e, f),
        // 5. tuple ⇒ tuple, same length
        (Tuple(ts), Tuple(us)) => ts.len() == us.len() && ts.iter().zip(us).all(|(t, u)| is_assignable(t, u)),
        // 6. array(E) ⇒ tuple(U...)
        (Array(e), Tuple(us)) => us.iter().all(|u| is_assignable(e, u)),
        // 12. tuple ⇒ interface (relaxation)
        (Tuple(_), Interface { .. }) => true,
        // 7. union target/source
        (_, Union(members)) => members.iter().any(|m| is_assignable(source, m)),
        (Union(members), _) => members.iter().all(|m| is_assignable(m, target)),
        // 8. intersection target/source
        (_, Intersection(members)) => members.iter().all(|m| is_assignable(source, m)),
        (Intersection(members), _) => members.iter().any(|m| is_assignable(m, target)),
        // 9. interface/object targets: structural
        (_, Interface { members, .. }) => members.iter().all(|m| match m {
            Member::Property(p) => p.optional || has_assignable_property(source, &p.name, &p.ty),
            Member::Method(m) => has_assignable_property(
                source,
                &m.name,
                &Type::Function { params: m.params.clone(), return_type: m.return_type.clone() },
            ),
        }),
        (_, Object { properties }) => {
            properties.iter().all(|p| p.optional || has_assignable_property(source, &p.name, &p.ty))
        }
        // 10. class ⇒ class: nominal
        (Class { name: a, .. }, Class { name: b, .. }) => a == b,
        // 11. unique ⇒ unique
        (Unique(a), Unique(b)) => is_assignable(a, b),
        // 12. object/interface/tuple ⇒ named unknown
        (Object { .. } | Interface { .. } | Tuple(_), Unknown { name: Some(_) }) => true,
        // anything ⇒ unnamed unknown (structural hole)
        (_, Unknown { name: None }) => true,
        _ => false,
    }
}

fn has_assignable_property(source: &Type, name: &str, target_ty: &Type) -> bool {
    let found = source
        .properties()
        .and_then(|props| props.iter().find(|p| p.name == name).map(|p| p.ty.clone()))
        .or_else(|| {
            source.members().and_then(|members| {
                members.iter().find_map(|m| match m {
                    Member::Property(p) if p.name == name => Some(p.ty.clone()),
                    Member::Method(m) if m.name == name => {
                        Some(Type::Function { params: m.params.clone(), return_type: m.return_type.clone() })
                    }
                    _ => None,
                })
            })
        });
    match found {
        Some(found_ty) => is_assignable(&found_ty, target_ty),
        None => matches!(source, Type::Unknown { .. }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(source: &str) -> CheckResult {
        let tokens = somon_lexer::tokenize(source).expect("lex");
        let program = somon_parser::parse(tokens).expect("parse");
        check(&program)
    }

    #[test]
    fn assignable_is_reflexive() {
        assert!(is_assignable(&Type::number(), &Type::number()));
        assert!(is_assignable(&Type::Array(Box::new(Type::string())), &Type::Array(Box::new(Type::string()))));
    }

    #[test]
    fn literal_widens_for_assignability() {
        assert!(is_assignable(&Type::Literal(LiteralValue::String("x".into())), &Type::string()));
    }

    #[test]
    fn union_assignment_error_is_reported() {
        let result = run("собит x: сатр | рақам = дуруст;");
        assert_eq!(result.errors.len(), 1);
        assert_eq!(result.errors[0].code(), "TYPE_NOT_ASSIGNABLE");
    }

    #[test]
    fn matching_primitive_annotation_has_no_error() {
        let result = run("собит x: рақам = 1;");
        assert!(result.errors.is_empty());
    }

    #[test]
    fn self_extending_class_is_circular_inheritance() {
        let result = run("синф А густариш А { созанда() {} }");
        assert!(result.errors.iter().any(|e| e.code() == "CIRCULAR_INHERITANCE"));
    }

    #[test]
    fn extending_unknown_class_is_class_not_found() {
        let result = run("синф А густариш Ношинос { созанда() {} }");
        assert!(result.errors.iter().any(|e| e.code() == "CLASS_NOT_FOUND"));
    }

    #[test]
    fn extending_an_interface_is_invalid_extends() {
        let result = run("интерфейс I {} синф А густариш I { созанда() {} }");
        assert!(result.errors.iter().any(|e| e.code() == "INVALID_EXTENDS"));
    }

    #[test]
    fn unreachable_code_after_return_is_a_warning() {
        let result = run("функсия f() { баргардон 1; собит x = 2; }");
        assert!(result.warnings.iter().any(|w| w.code() == "UNREACHABLE_CODE"));
    }

    #[test]
    fn tuple_target_infers_array_literal_elementwise() {
        let result = run("собит x: [сатр, рақам] = [\"a\", 1];");
        assert!(result.errors.is_empty());
    }

    #[test]
    fn heterogeneous_array_literal_widens_to_union() {
        let result = run("собит x = [1, \"a\"];");
        assert!(result.errors.is_empty());
    }
}
