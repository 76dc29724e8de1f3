//! Error types for the classification core
//!
//! None of these are recoverable: each one means a catalog was assembled
//! inconsistently or the driver broke a precondition. Callers propagate them
//! with `?` and abort the analysis run.

use thiserror::Error;

/// Which bound operation produced an inconsistent result
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoundOp {
    Lub,
    Glb,
}

impl std::fmt::Display for BoundOp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BoundOp::Lub => write!(f, "least upper bound"),
            BoundOp::Glb => write!(f, "greatest lower bound"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ClassificationError {
    /// A kind names a polymorphic counterpart that has no elementless qualifier
    #[error(
        "kind {kind} claims polymorphic counterpart {counterpart}, but no representative qualifier is registered for it"
    )]
    MissingPolymorphicQualifier { kind: String, counterpart: String },

    /// The kind-level bound table resolved two different kinds to a third
    #[error("{op} of {left} and {right} resolved to unrelated kind {result}")]
    InconsistentBound {
        op: BoundOp,
        left: String,
        right: String,
        result: String,
    },

    /// `resolve` was handed a placeholder the substitution does not bind
    #[error("no substitution bound for placeholder {placeholder}")]
    MissingSubstitution { placeholder: String },

    #[error("kind {kind} does not carry tags")]
    NotTagBearing { kind: String },

    #[error("kind {kind} requires a tag set")]
    TagsRequired { kind: String },

    #[error("unknown classification kind '{name}'")]
    UnknownKind { name: String },

    #[error("unknown declaration '{name}'")]
    UnknownDeclaration { name: String },

    #[error("declaration '{name}' defined more than once")]
    DuplicateDeclaration { name: String },

    #[error("kind '{name}' registered twice")]
    DuplicateKind { name: String },

    #[error("alias '{alias}' already names a kind")]
    DuplicateAlias { alias: String },

    #[error("invalid catalog: {reason}")]
    InvalidCatalog { reason: String },

    #[error("invalid configuration: {reason}")]
    InvalidConfig { reason: String },
}

pub type Result<T> = std::result::Result<T, ClassificationError>;
