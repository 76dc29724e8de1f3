//! Subtype, least upper bound and greatest lower bound over qualifiers
//!
//! Kinds are compared through the catalog's base order. Tags only matter
//! when both operands share the same tag-bearing kind:
//! - subtype: the side with *more* tags is lower
//! - lub: tag union
//! - glb: tag intersection

use crate::catalog::{Catalog, Qualifier};
use crate::error::{BoundOp, ClassificationError, Result};
use tracing::trace;

/// Relational operations over the qualifiers of one catalog
#[derive(Debug, Clone)]
pub struct QualifierHierarchy {
    catalog: Catalog,
}

impl QualifierHierarchy {
    pub fn new(catalog: Catalog) -> Self {
        Self { catalog }
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Bottom of the hierarchy
    pub fn bottom(&self) -> Qualifier {
        Qualifier::from_parts(self.catalog.bottom(), Default::default())
    }

    /// Top of the hierarchy
    pub fn top(&self) -> Qualifier {
        Qualifier::from_parts(self.catalog.top(), Default::default())
    }

    /// Unbound poly placeholder
    pub fn poly(&self) -> Qualifier {
        Qualifier::from_parts(self.catalog.poly(), Default::default())
    }

    /// Use-site poly placeholder
    pub fn poly_use(&self) -> Qualifier {
        Qualifier::from_parts(self.catalog.poly_use(), Default::default())
    }

    pub fn is_subtype(&self, sub: &Qualifier, sup: &Qualifier) -> bool {
        if sub.kind() == sup.kind() && self.catalog.is_tag_bearing(sub.kind()) {
            let result = sub.tags().is_superset(sup.tags());
            trace!(
                sub = %self.catalog.describe(sub),
                sup = %self.catalog.describe(sup),
                result,
                "tag subtype check"
            );
            return result;
        }
        self.catalog.base_order(sub.kind()) <= self.catalog.base_order(sup.kind())
    }

    pub fn least_upper_bound(&self, a: &Qualifier, b: &Qualifier) -> Result<Qualifier> {
        self.bound(BoundOp::Lub, a, b)
    }

    pub fn greatest_lower_bound(&self, a: &Qualifier, b: &Qualifier) -> Result<Qualifier> {
        self.bound(BoundOp::Glb, a, b)
    }

    fn bound(&self, op: BoundOp, a: &Qualifier, b: &Qualifier) -> Result<Qualifier> {
        if a.kind() == b.kind() && self.catalog.is_tag_bearing(a.kind()) {
            let tags = match op {
                BoundOp::Lub => a.tags().union(b.tags()),
                BoundOp::Glb => a.tags().intersection(b.tags()),
            };
            let result = Qualifier::from_parts(a.kind(), tags);
            trace!(
                %op,
                left = %self.catalog.describe(a),
                right = %self.catalog.describe(b),
                result = %self.catalog.describe(&result),
                "tag bound"
            );
            return Ok(result);
        }

        let kind = match op {
            BoundOp::Lub => self.catalog.lub_kind(a.kind(), b.kind()),
            BoundOp::Glb => self.catalog.glb_kind(a.kind(), b.kind()),
        };
        if kind == a.kind() {
            Ok(a.clone())
        } else if kind == b.kind() {
            Ok(b.clone())
        } else {
            Err(ClassificationError::InconsistentBound {
                op,
                left: self.catalog.describe(a),
                right: self.catalog.describe(b),
                result: self.catalog.describe_kind(kind),
            })
        }
    }

    /// The placeholder qualifier associated with `qualifier`'s hierarchy
    /// position, or `None` when its kind has no polymorphic counterpart
    pub fn polymorphic_annotation(&self, qualifier: &Qualifier) -> Result<Option<Qualifier>> {
        let Some(counterpart) = self.catalog.polymorphic_counterpart(qualifier.kind()) else {
            return Ok(None);
        };
        match self.catalog.representative(counterpart) {
            Some(poly) => Ok(Some(poly)),
            None => Err(ClassificationError::MissingPolymorphicQualifier {
                kind: self.catalog.describe_kind(qualifier.kind()),
                counterpart: self.catalog.describe_kind(counterpart),
            }),
        }
    }
}

impl Default for QualifierHierarchy {
    fn default() -> Self {
        Self::new(Catalog::standard())
    }
}
