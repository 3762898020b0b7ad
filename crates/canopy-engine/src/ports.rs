//! Traits at the seams to external collaborators.

use crate::messages::CallOptions;
use canopy_tree::{Document, Element};

/// Outcome of a revision-compatibility check.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RevisionCheck {
    Ok,
    Mismatch,
}

/// Compatibility gate consulted when a data operand narrows to a named
/// section: an incoming full document whose revision baseline is behind the
/// current one must not be sliced up, it is used whole instead.
pub trait RevisionChecker {
    fn check(&self, incoming: &Element, current: &Document, options: CallOptions) -> RevisionCheck;
}

/// Default checker: every revision is compatible.
#[derive(Clone, Copy, Debug, Default)]
pub struct AcceptAllRevisions;

impl RevisionChecker for AcceptAllRevisions {
    fn check(&self, _: &Element, _: &Document, _: CallOptions) -> RevisionCheck {
        RevisionCheck::Ok
    }
}
