//! Use-site resolution of polymorphic qualifiers
//!
//! Only the top-level qualifier slot of a type is rewritten by
//! [`ClassificationPolymorphism::resolve`]. Callers that want every nesting
//! level rewritten use [`ClassificationPolymorphism::resolve_nested`].

use crate::catalog::{Placeholder, Qualifier};
use crate::error::{ClassificationError, Result};
use crate::hierarchy::QualifierHierarchy;
use crate::model::{AnnotatedType, TypeShape};
use indexmap::IndexMap;
use tracing::debug;

/// Placeholder bindings for one resolution call
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Substitution {
    bindings: IndexMap<Qualifier, Qualifier>,
}

impl Substitution {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn bind(mut self, placeholder: Qualifier, concrete: Qualifier) -> Self {
        self.insert(placeholder, concrete);
        self
    }

    pub fn insert(&mut self, placeholder: Qualifier, concrete: Qualifier) -> Option<Qualifier> {
        self.bindings.insert(placeholder, concrete)
    }

    pub fn get(&self, placeholder: &Qualifier) -> Option<&Qualifier> {
        self.bindings.get(placeholder)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Qualifier, &Qualifier)> {
        self.bindings.iter()
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }
}

impl FromIterator<(Qualifier, Qualifier)> for Substitution {
    fn from_iter<I: IntoIterator<Item = (Qualifier, Qualifier)>>(iter: I) -> Self {
        Self {
            bindings: iter.into_iter().collect(),
        }
    }
}

/// Replaces placeholders with the qualifiers bound at a use site
#[derive(Debug, Clone, Copy)]
pub struct ClassificationPolymorphism<'h> {
    hierarchy: &'h QualifierHierarchy,
}

impl<'h> ClassificationPolymorphism<'h> {
    pub fn new(hierarchy: &'h QualifierHierarchy) -> Self {
        Self { hierarchy }
    }

    /// Rewrite the top-level qualifier of `ty` under `substitution`
    ///
    /// - `Poly` is replaced by its binding, which must exist
    /// - `PolyUse` is replaced only when its binding is the bare `Poly`
    ///   placeholder; any other binding leaves it for a later site
    /// - any other qualifier is replaced by the first binding keyed on it
    pub fn resolve(&self, ty: &AnnotatedType, substitution: &Substitution) -> Result<AnnotatedType> {
        let Some(current) = &ty.qualifier else {
            return Ok(ty.clone());
        };
        let catalog = self.hierarchy.catalog();

        let replacement = match catalog.is_placeholder(current.kind()) {
            Placeholder::Poly => {
                let bound = substitution
                    .get(current)
                    .ok_or_else(|| ClassificationError::MissingSubstitution {
                        placeholder: catalog.describe(current),
                    })?;
                Some(bound.clone())
            }
            Placeholder::PolyUse => substitution
                .get(current)
                .filter(|bound| **bound == self.hierarchy.poly())
                .cloned(),
            Placeholder::None => substitution
                .iter()
                .find(|(placeholder, _)| *placeholder == current)
                .map(|(_, concrete)| concrete.clone()),
        };

        match replacement {
            Some(qualifier) => {
                debug!(
                    from = %catalog.describe(current),
                    to = %catalog.describe(&qualifier),
                    "substituted placeholder"
                );
                Ok(ty.clone().with_qualifier(Some(qualifier)))
            }
            None => Ok(ty.clone()),
        }
    }

    /// Apply [`resolve`](Self::resolve) to every nesting level of `ty`
    pub fn resolve_nested(&self, ty: &AnnotatedType, substitution: &Substitution) -> Result<AnnotatedType> {
        let mut resolved = self.resolve(ty, substitution)?;
        resolved.shape = match &ty.shape {
            TypeShape::Leaf => TypeShape::Leaf,
            TypeShape::Array(element) => TypeShape::Array(Box::new(self.resolve_nested(element, substitution)?)),
            TypeShape::Declared { name, args } => TypeShape::Declared {
                name: name.clone(),
                args: args
                    .iter()
                    .map(|arg| self.resolve_nested(arg, substitution))
                    .collect::<Result<Vec<_>>>()?,
            },
        };
        Ok(resolved)
    }
}
