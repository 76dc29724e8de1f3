//! # DCC Core
//!
//! Decision core of a static data-classification checker. Given the
//! declarations of a program, each optionally labelled with a
//! confidentiality qualifier, it decides how those qualifiers relate and
//! which qualifier each declaration effectively carries.
//!
//! ## Modules
//!
//! - **[`catalog`]** - registered classification kinds, their total order, tag sets
//! - **[`hierarchy`]** - subtype, least upper bound, greatest lower bound
//! - **[`polymorphism`]** - use-site substitution of polymorphic placeholders
//! - **[`inference`]** - aggregate qualifier of a declaration from its members
//!
//! ## Quick Start
//!
//! ```rust
//! use dcc_core::prelude::*;
//!
//! let hierarchy = QualifierHierarchy::new(Catalog::standard());
//! let secret = hierarchy.catalog().parse_qualifier("HighlyConfidential").unwrap();
//!
//! let mut graph = DeclarationGraph::new();
//! let account = graph.insert(
//!     Declaration::new("Account", None)
//!         .with_member(Member::field("ssn", AnnotatedType::leaf(Some(secret.clone())))),
//! )?;
//!
//! let mut inference = EntityInference::new(&hierarchy, &AnalysisConfig::default())?;
//! assert_eq!(inference.resolve_entity_qualifier(&graph, account)?, secret);
//! # Ok::<(), dcc_core::ClassificationError>(())
//! ```

pub mod cache;
pub mod catalog;
pub mod config;
pub mod error;
pub mod hierarchy;
pub mod inference;
pub mod model;
pub mod polymorphism;

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::catalog::{Catalog, CatalogBuilder, KindId, Placeholder, Qualifier, TagSet};
    pub use crate::config::AnalysisConfig;
    pub use crate::error::{ClassificationError, Result};
    pub use crate::hierarchy::QualifierHierarchy;
    pub use crate::inference::{CacheStats, EntityInference};
    pub use crate::model::{AnnotatedType, DeclId, Declaration, DeclarationGraph, Member, MemberKind, TypeShape};
    pub use crate::polymorphism::{ClassificationPolymorphism, Substitution};
}

pub use catalog::{Catalog, Qualifier, TagSet};
pub use config::AnalysisConfig;
pub use error::{ClassificationError, Result};
pub use hierarchy::QualifierHierarchy;
pub use inference::EntityInference;
pub use polymorphism::{ClassificationPolymorphism, Substitution};
