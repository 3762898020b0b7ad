use crate::delta::VersionPair;
use thiserror::Error;

/// Errors surfaced by the tree library itself.
///
/// The engine maps these into its own status taxonomy; nothing here carries
/// transport or handler semantics.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TreeError {
    #[error("unknown section: {name:?}")]
    UnknownSection { name: String },

    #[error("element {tag:?} is not a document root")]
    NotADocument { tag: String },

    #[error("delta expects version {expected}, document is at {found}")]
    DeltaMismatch {
        expected: VersionPair,
        found: VersionPair,
    },

    #[error("delta target missing: {path}")]
    DeltaTargetMissing { path: String },
}
