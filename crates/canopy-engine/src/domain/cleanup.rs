//! Result cleanup, symmetric to preparation.
//!
//! Prepared operands and output payloads are owned values released at scope
//! exit, so the five cleanup strategies survive only as structural
//! post-conditions: which of the two values an operation kind is allowed to
//! have produced. A violation is an internal contract breach, checked in
//! debug builds.

use crate::domain::prepare::PreparedInput;
use canopy_tree::Element;

/// Which post-condition a descriptor asserts at the end of a request.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CleanupKind {
    /// Queries never materialize an input artifact.
    Query,
    /// Operand and output both materialized; dropped by ownership.
    Data,
    /// Output only; no operand was ever extracted.
    Output,
    /// Neither value may be present.
    None,
    /// Operand aliases the caller's request and is not released here;
    /// no output is produced.
    Sync,
}

impl CleanupKind {
    /// Assert the per-kind post-conditions. Release itself is the caller's
    /// drop of both values.
    pub fn finish(self, input: &PreparedInput, output: Option<&Element>) {
        match self {
            CleanupKind::Query => {
                debug_assert!(input.is_none(), "query operations must not carry an operand");
            }
            CleanupKind::None => {
                debug_assert!(input.is_none(), "operation must not carry an operand");
                debug_assert!(output.is_none(), "operation must not produce output");
            }
            CleanupKind::Sync => {
                // Operand aliases the caller's request; only the output
                // post-condition is ours to assert.
                debug_assert!(output.is_none(), "sync operations must not produce output");
            }
            CleanupKind::Data | CleanupKind::Output => {}
        }
    }
}
