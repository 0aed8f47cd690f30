//! The tagged AST (`spec.md` §3). Every node is a `{kind, position}` pair;
//! `kind` is a closed enum, matched exhaustively everywhere it's consumed
//! (the type checker, the code generator). There is no open node hierarchy.

use serde::{Deserialize, Serialize};
use somon_common::Position;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Program {
    pub body: Vec<Stmt>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Block {
    pub body: Vec<Stmt>,
    pub position: Position,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum VarKind {
    Mutable,
    Const,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stmt {
    pub kind: StmtKind,
    pub position: Position,
}

impl Stmt {
    pub fn new(kind: StmtKind, position: Position) -> Self {
        Self { kind, position }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum StmtKind {
    VariableDeclaration {
        kind: VarKind,
        pattern: Pattern,
        type_annotation: Option<TypeNode>,
        init: Option<Expr>,
    },
    FunctionDeclaration {
        name: String,
        params: Vec<Param>,
        return_type: Option<TypeNode>,
        body: Block,
        is_async: bool,
    },
    ClassDeclaration {
        name: String,
        super_class: Option<String>,
        implements: Vec<String>,
        body: Vec<ClassMember>,
    },
    InterfaceDeclaration {
        name: String,
        type_parameters: Vec<String>,
        body: Vec<InterfaceMember>,
    },
    TypeAlias {
        name: String,
        type_parameters: Vec<String>,
        annotation: TypeNode,
    },
    NamespaceDeclaration {
        name: String,
        body: Vec<Stmt>,
        exported: bool,
    },
    If {
        test: Expr,
        consequent: Box<Stmt>,
        alternate: Option<Box<Stmt>>,
    },
    While {
        test: Expr,
        body: Box<Stmt>,
    },
    For {
        init: Option<Box<Stmt>>,
        test: Option<Expr>,
        update: Option<Expr>,
        body: Box<Stmt>,
    },
    ForIn {
        left: Pattern,
        right: Expr,
        body: Box<Stmt>,
    },
    ForOf {
        left: Pattern,
        right: Expr,
        body: Box<Stmt>,
    },
    Return {
        argument: Option<Expr>,
    },
    Throw {
        argument: Expr,
    },
    Try {
        block: Block,
        handler: Option<CatchClause>,
        finalizer: Option<Block>,
    },
    Switch {
        discriminant: Expr,
        cases: Vec<SwitchCase>,
    },
    Break,
    Continue,
    Import {
        specifiers: Vec<ImportSpecifier>,
        source: String,
    },
    Export(ExportKind),
    Block(Block),
    ExpressionStatement(Expr),
}

/// Invariant 4 (`spec.md` §3): an export has exactly one of
/// {declaration, specifiers, wildcard source}. Modeled as a sum type so the
/// invalid combinations aren't representable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ExportKind {
    Declaration(Box<Stmt>),
    Named {
        specifiers: Vec<ExportSpecifier>,
        source: Option<String>,
    },
    Wildcard {
        source: String,
    },
    Default(Box<Expr>),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatchClause {
    pub param: Option<Pattern>,
    pub body: Block,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SwitchCase {
    pub test: Option<Expr>,
    pub consequent: Vec<Stmt>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ImportSpecifier {
    Default(String),
    Named { imported: String, local: String },
    Namespace(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportSpecifier {
    pub local: String,
    pub exported: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Visibility {
    Public,
    Private,
    Protected,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Modifiers {
    pub visibility: Visibility,
    pub is_static: bool,
    pub is_abstract: bool,
    pub is_readonly: bool,
}

impl Default for Modifiers {
    fn default() -> Self {
        Self {
            visibility: Visibility::Public,
            is_static: false,
            is_abstract: false,
            is_readonly: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ClassMember {
    Property {
        name: String,
        type_annotation: Option<TypeNode>,
        initializer: Option<Expr>,
        modifiers: Modifiers,
    },
    Method {
        name: String,
        params: Vec<Param>,
        return_type: Option<TypeNode>,
        body: Option<Block>,
        modifiers: Modifiers,
        is_async: bool,
        is_constructor: bool,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum InterfaceMember {
    Property {
        name: String,
        type_annotation: TypeNode,
        optional: bool,
        readonly: bool,
    },
    Method {
        name: String,
        params: Vec<Param>,
        return_type: Option<TypeNode>,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Param {
    pub pattern: Pattern,
    pub type_annotation: Option<TypeNode>,
    pub default: Option<Expr>,
}

// ---- expressions ----

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Expr {
    pub kind: ExprKind,
    pub position: Position,
}

impl Expr {
    pub fn new(kind: ExprKind, position: Position) -> Self {
        Self { kind, position }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum LiteralValue {
    Number(f64),
    String(String),
    Bool(bool),
    Null,
    Undefined,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Rem,
    Exp,
    Eq,
    StrictEq,
    NotEq,
    StrictNotEq,
    Lt,
    LtEq,
    Gt,
    GtEq,
    In,
    Instanceof,
    Shl,
    Shr,
    UShr,
    BitAnd,
    BitOr,
    BitXor,
    LogicalAnd,
    LogicalOr,
    NullishCoalesce,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UnaryOp {
    Not,
    Neg,
    Plus,
    BitNot,
    Typeof,
    Await,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UpdateOp {
    Increment,
    Decrement,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AssignOp {
    Assign,
    AddAssign,
    SubAssign,
    MulAssign,
    DivAssign,
    RemAssign,
    ExpAssign,
    AndAssign,
    OrAssign,
    NullishAssign,
    BitAndAssign,
    BitOrAssign,
    BitXorAssign,
    ShlAssign,
    ShrAssign,
    UShrAssign,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObjectProperty {
    pub key: PropertyKey,
    pub value: Expr,
    pub computed: bool,
    pub shorthand: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum PropertyKey {
    Identifier(String),
    StringLiteral(String),
    Computed(Box<Expr>),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ArrowBody {
    Block(Block),
    Expr(Box<Expr>),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ExprKind {
    Identifier(String),
    Literal { value: LiteralValue, raw: String },
    TemplateLiteral { quasis: Vec<String>, expressions: Vec<Expr> },
    Binary { op: BinaryOp, left: Box<Expr>, right: Box<Expr> },
    Unary { op: UnaryOp, argument: Box<Expr> },
    Update { op: UpdateOp, argument: Box<Expr>, prefix: bool },
    Call { callee: Box<Expr>, arguments: Vec<Expr>, optional: bool },
    New { callee: Box<Expr>, arguments: Vec<Expr> },
    Member { object: Box<Expr>, property: Box<Expr>, computed: bool, optional: bool },
    Assignment { op: AssignOp, target: Box<Expr>, value: Box<Expr> },
    Array { elements: Vec<Expr> },
    Object { properties: Vec<ObjectProperty> },
    Arrow { params: Vec<Param>, body: ArrowBody, is_async: bool },
    Await { argument: Box<Expr> },
    ImportExpression { source: Box<Expr> },
    This,
    Super,
    Spread { argument: Box<Expr> },
}

// ---- patterns ----

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pattern {
    pub kind: PatternKind,
    pub position: Position,
}

impl Pattern {
    pub fn new(kind: PatternKind, position: Position) -> Self {
        Self { kind, position }
    }

    pub fn identifier(name: impl Into<String>, position: Position) -> Self {
        Self::new(PatternKind::Identifier(name.into()), position)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum PatternKind {
    Identifier(String),
    /// Elided slots (holes) are `None` -- invariant 3 (`spec.md` §3).
    ArrayPattern { elements: Vec<Option<Pattern>> },
    /// No holes permitted -- invariant 3.
    ObjectPattern { properties: Vec<PropertyPattern> },
    RestElement { argument: Box<Pattern> },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PropertyPattern {
    pub key: String,
    pub value: Pattern,
    pub computed: bool,
    pub shorthand: bool,
}

// ---- type nodes ----

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PrimitiveName {
    String,
    Number,
    Boolean,
    Null,
    Undefined,
    Any,
    Unknown,
    Never,
    Void,
    Object,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TypeNode {
    pub kind: TypeKind,
    pub position: Position,
}

impl TypeNode {
    pub fn new(kind: TypeKind, position: Position) -> Self {
        Self { kind, position }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum TypeKind {
    PrimitiveType { name: PrimitiveName },
    ArrayType { element: Box<TypeNode> },
    TupleType { elements: Vec<TypeNode> },
    UnionType { types: Vec<TypeNode> },
    IntersectionType { types: Vec<TypeNode> },
    GenericType { name: String, type_parameters: Vec<TypeNode> },
    LiteralType { value: LiteralValue },
    UniqueType { base: Box<TypeNode> },
    ConditionalType {
        check: Box<TypeNode>,
        extends: Box<TypeNode>,
        true_type: Box<TypeNode>,
        false_type: Box<TypeNode>,
    },
    MappedType {
        type_parameter: String,
        constraint: Box<TypeNode>,
        value_type: Box<TypeNode>,
        readonly: bool,
        optional: bool,
    },
    IndexedAccessType { object: Box<TypeNode>, index: Box<TypeNode> },
    KeyofType { base: Box<TypeNode> },
}
