use canopy_tree::{TreeError, VersionPair};
use thiserror::Error;

/// Engine status taxonomy.
///
/// Lookup errors fire before any mutation; everything else fires on the
/// scratch copy only, which the engine discards. The committed document is
/// observable in exactly two states: pre-apply, or fully validated
/// post-commit. Programming-fatal conditions (handler aliasing, cleanup
/// post-condition breaches) are debug assertions, not variants here.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum EngineError {
    #[error("operation {op:?} is not valid")]
    OperationNotFound { op: String },

    #[error("invalid section: {section:?}")]
    InvalidSection { section: String },

    #[error("id collision: {id:?} is carried by more than one element")]
    IdCollision { id: String },

    #[error("operation requires an operand and none was supplied")]
    NoInput,

    #[error("target element not found")]
    NotFound,

    #[error("element {id:?} already exists")]
    ExistsAlready { id: String },

    #[error("diff did not apply cleanly: expected {expected}, found {found}")]
    DeltaMismatch {
        expected: VersionPair,
        found: VersionPair,
    },

    #[error("operation is only valid on the primary instance")]
    NotPrimary,

    #[error("malformed operand: {detail}")]
    MalformedInput { detail: String },
}

impl From<TreeError> for EngineError {
    fn from(err: TreeError) -> Self {
        match err {
            TreeError::UnknownSection { name } => EngineError::InvalidSection { section: name },
            TreeError::DeltaMismatch { expected, found } => {
                EngineError::DeltaMismatch { expected, found }
            }
            TreeError::NotADocument { tag } => EngineError::MalformedInput {
                detail: format!("{tag:?} is not a document root"),
            },
            TreeError::DeltaTargetMissing { path } => EngineError::MalformedInput {
                detail: format!("delta target missing: {path}"),
            },
        }
    }
}
