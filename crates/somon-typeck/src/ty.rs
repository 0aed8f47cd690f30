//! The internal `Type` representation (`spec.md` §4.3).
//!
//! Modeled as a tagged sum rather than the spec's literal
//! `{kind, name?, value?, ...}` record: each variant only carries the fields
//! that kind actually has, so there is no possibility of a `literal` type
//! with a `returnType` field hanging off it. Backreferences between class and
//! interface types go through the checker's tables by name, never by
//! pointer -- see `spec.md` §9, "Backreferences in the type graph".

use somon_parser::LiteralValue;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Primitive {
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

impl fmt::Display for Primitive {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Primitive::String => "string",
            Primitive::Number => "number",
            Primitive::Boolean => "boolean",
            Primitive::Null => "null",
            Primitive::Undefined => "undefined",
            Primitive::Any => "any",
            Primitive::Unknown => "unknown",
            Primitive::Never => "never",
            Primitive::Void => "void",
            Primitive::Object => "object",
        };
        write!(f, "{name}")
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Property {
    pub name: String,
    pub ty: Type,
    pub optional: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MethodSig {
    pub name: String,
    pub params: Vec<Type>,
    pub return_type: Box<Type>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Member {
    Property(Property),
    Method(MethodSig),
}

impl Member {
    pub fn name(&self) -> &str {
        match self {
            Member::Property(p) => &p.name,
            Member::Method(m) => &m.name,
        }
    }
}

/// The checker's value type. Cheap to clone: the AST is never referenced
/// from here, only names and other `Type` values.
#[derive(Debug, Clone, PartialEq)]
pub enum Type {
    Primitive(Primitive),
    Literal(LiteralValue),
    Array(Box<Type>),
    Tuple(Vec<Type>),
    Union(Vec<Type>),
    Intersection(Vec<Type>),
    Interface { name: String, members: Vec<Member> },
    Object { properties: Vec<Property> },
    Class {
        name: String,
        base_class: Option<String>,
        members: Vec<Member>,
    },
    Function { params: Vec<Type>, return_type: Box<Type> },
    Generic { name: String, type_parameters: Vec<Type> },
    Unique(Box<Type>),
    /// An unresolved named type -- still structurally assignable into
    /// interface/object holes (`spec.md` §4.3, "Type resolution").
    Unknown { name: Option<String> },
}

impl Type {
    pub fn any() -> Self {
        Type::Primitive(Primitive::Any)
    }

    pub fn unknown() -> Self {
        Type::Unknown { name: None }
    }

    pub fn string() -> Self {
        Type::Primitive(Primitive::String)
    }

    pub fn number() -> Self {
        Type::Primitive(Primitive::Number)
    }

    pub fn boolean() -> Self {
        Type::Primitive(Primitive::Boolean)
    }

    /// Literal types widen to their base primitive when required by context
    /// (`spec.md` §4.3, assignability rule 3).
    pub fn widen(&self) -> Type {
        match self {
            Type::Literal(LiteralValue::String(_)) => Type::string(),
            Type::Literal(LiteralValue::Number(_)) => Type::number(),
            Type::Literal(LiteralValue::Bool(_)) => Type::boolean(),
            Type::Literal(LiteralValue::Null) => Type::Primitive(Primitive::Null),
            Type::Literal(LiteralValue::Undefined) => Type::Primitive(Primitive::Undefined),
            other => other.clone(),
        }
    }

    pub fn properties(&self) -> Option<&[Property]> {
        match self {
            Type::Object { properties } => Some(properties),
            _ => None,
        }
    }

    pub fn members(&self) -> Option<&[Member]> {
        match self {
            Type::Interface { members, .. } | Type::Class { members, .. } => Some(members),
            _ => None,
        }
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Type::Primitive(p) => write!(f, "{p}"),
            Type::Literal(LiteralValue::String(s)) => write!(f, "{s:?}"),
            Type::Literal(LiteralValue::Number(n)) => write!(f, "{n}"),
            Type::Literal(LiteralValue::Bool(b)) => write!(f, "{b}"),
            Type::Literal(LiteralValue::Null) => write!(f, "null"),
            Type::Literal(LiteralValue::Undefined) => write!(f, "undefined"),
            Type::Array(e) => write!(f, "{e}[]"),
            Type::Tuple(ts) => {
                write!(f, "[")?;
                for (i, t) in ts.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{t}")?;
                }
                write!(f, "]")
            }
            Type::Union(ts) => write!(f, "{}", join(ts, " | ")),
            Type::Intersection(ts) => write!(f, "{}", join(ts, " & ")),
            Type::Interface { name, .. } => write!(f, "{name}"),
            Type::Object { .. } => write!(f, "object"),
            Type::Class { name, .. } => write!(f, "{name}"),
            Type::Function { .. } => write!(f, "function"),
            Type::Generic { name, type_parameters } => {
                write!(f, "{name}<{}>", join(type_parameters, ", "))
            }
            Type::Unique(inner) => write!(f, "unique {inner}"),
            Type::Unknown { name: Some(name) } => write!(f, "{name}"),
            Type::Unknown { name: None } => write!(f, "unknown"),
        }
    }
}

fn join(types: &[Type], sep: &str) -> String {
    types
        .iter()
        .map(|t| t.to_string())
        .collect::<Vec<_>>()
        .join(sep)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn literal_widens_to_matching_primitive() {
        assert_eq!(Type::Literal(LiteralValue::String("x".into())).widen(), Type::string());
        assert_eq!(Type::Literal(LiteralValue::Number(1.0)).widen(), Type::number());
    }

    #[test]
    fn non_literal_widen_is_identity() {
        assert_eq!(Type::number().widen(), Type::number());
    }

    #[test]
    fn display_renders_union() {
        let ty = Type::Union(vec![Type::string(), Type::number()]);
        assert_eq!(ty.to_string(), "string | number");
    }
}
