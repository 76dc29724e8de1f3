//! Declaration model supplied by the driver
//!
//! The core never walks source code itself. A driver hands it a
//! [`DeclarationGraph`]: class-like declarations, their members, and the
//! annotated types of those members.

use crate::catalog::Qualifier;
use crate::error::{ClassificationError, Result};
use indexmap::map::Entry;
use indexmap::IndexMap;

/// Structure of an annotated type below its top-level qualifier
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeShape {
    /// Primitive or otherwise opaque type
    Leaf,
    /// Array of the element type
    Array(Box<AnnotatedType>),
    /// Named declared type, possibly generic
    Declared { name: String, args: Vec<AnnotatedType> },
}

/// A type with an optional qualifier at every nesting level
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnnotatedType {
    pub qualifier: Option<Qualifier>,
    pub shape: TypeShape,
}

impl AnnotatedType {
    pub fn leaf(qualifier: Option<Qualifier>) -> Self {
        Self {
            qualifier,
            shape: TypeShape::Leaf,
        }
    }

    pub fn array(qualifier: Option<Qualifier>, element: AnnotatedType) -> Self {
        Self {
            qualifier,
            shape: TypeShape::Array(Box::new(element)),
        }
    }

    pub fn declared(name: impl Into<String>, qualifier: Option<Qualifier>, args: Vec<AnnotatedType>) -> Self {
        Self {
            qualifier,
            shape: TypeShape::Declared { name: name.into(), args },
        }
    }

    /// Same type with its top-level qualifier replaced
    pub fn with_qualifier(mut self, qualifier: Option<Qualifier>) -> Self {
        self.qualifier = qualifier;
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MemberKind {
    Field,
    Method,
}

/// A field or method of a declaration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Member {
    pub name: String,
    pub kind: MemberKind,
    pub is_static: bool,
    /// Field type, or method return type (`None` for `void` and constructors)
    pub ty: Option<AnnotatedType>,
}

impl Member {
    pub fn field(name: impl Into<String>, ty: AnnotatedType) -> Self {
        Self {
            name: name.into(),
            kind: MemberKind::Field,
            is_static: false,
            ty: Some(ty),
        }
    }

    pub fn method(name: impl Into<String>, return_type: Option<AnnotatedType>) -> Self {
        Self {
            name: name.into(),
            kind: MemberKind::Method,
            is_static: false,
            ty: return_type,
        }
    }

    pub fn into_static(mut self) -> Self {
        self.is_static = true;
        self
    }
}

/// A class-like declaration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Declaration {
    pub name: String,
    /// Qualifier written on the declaration itself
    pub qualifier: Option<Qualifier>,
    pub members: Vec<Member>,
}

impl Declaration {
    pub fn new(name: impl Into<String>, qualifier: Option<Qualifier>) -> Self {
        Self {
            name: name.into(),
            qualifier,
            members: Vec::new(),
        }
    }

    pub fn with_member(mut self, member: Member) -> Self {
        self.members.push(member);
        self
    }
}

/// Identity of a declaration within its graph
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DeclId(usize);

impl DeclId {
    pub fn index(self) -> usize {
        self.0
    }
}

/// All declarations of one analysis run, in insertion order
#[derive(Debug, Clone, Default)]
pub struct DeclarationGraph {
    decls: IndexMap<String, Declaration>,
}

impl DeclarationGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a declaration; names are unique within a graph
    pub fn insert(&mut self, decl: Declaration) -> Result<DeclId> {
        match self.decls.entry(decl.name.clone()) {
            Entry::Occupied(_) => Err(ClassificationError::DuplicateDeclaration { name: decl.name }),
            Entry::Vacant(slot) => {
                let id = DeclId(slot.index());
                slot.insert(decl);
                Ok(id)
            }
        }
    }

    pub fn get(&self, id: DeclId) -> Option<&Declaration> {
        self.decls.get_index(id.0).map(|(_, decl)| decl)
    }

    pub fn id_of(&self, name: &str) -> Option<DeclId> {
        self.decls.get_index_of(name).map(DeclId)
    }

    pub fn require(&self, name: &str) -> Result<DeclId> {
        self.id_of(name).ok_or_else(|| ClassificationError::UnknownDeclaration { name: name.to_string() })
    }

    pub fn len(&self) -> usize {
        self.decls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.decls.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (DeclId, &Declaration)> {
        self.decls.values().enumerate().map(|(i, decl)| (DeclId(i), decl))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_graph_ids_follow_insertion_order() {
        let mut graph = DeclarationGraph::new();
        let a = graph.insert(Declaration::new("A", None)).unwrap();
        let b = graph.insert(Declaration::new("B", None)).unwrap();

        assert_eq!(a.index(), 0);
        assert_eq!(b.index(), 1);
        assert_eq!(graph.id_of("B"), Some(b));
        assert_eq!(graph.get(a).map(|d| d.name.as_str()), Some("A"));
    }

    #[test]
    fn test_duplicate_declaration_rejected() {
        let mut graph = DeclarationGraph::new();
        let first = graph
            .insert(Declaration::new("A", None).with_member(Member::method("run", None)))
            .unwrap();
        let err = graph.insert(Declaration::new("A", None)).unwrap_err();

        assert_eq!(err, ClassificationError::DuplicateDeclaration { name: "A".into() });
        assert_eq!(graph.len(), 1);
        assert_eq!(graph.get(first).unwrap().members.len(), 1);
    }

    #[test]
    fn test_require_unknown_declaration() {
        let graph = DeclarationGraph::new();
        assert_eq!(
            graph.require("Missing"),
            Err(ClassificationError::UnknownDeclaration { name: "Missing".into() })
        );
    }

    #[test]
    fn test_member_constructors() {
        let field = Member::field("id", AnnotatedType::leaf(None)).into_static();
        assert!(field.is_static);
        assert_eq!(field.kind, MemberKind::Field);

        let method = Member::method("close", None);
        assert!(method.ty.is_none());
        assert_eq!(method.kind, MemberKind::Method);
    }
}
