//! Request preparation: extract the operand and target section from an
//! inbound request, per the strategy the resolved descriptor selects.
//!
//! Preparation never mutates the current document; a data operand is always
//! deep-copied so later mutation of the scratch cannot reach back into the
//! caller's request.

use crate::domain::errors::EngineError;
use crate::domain::registry::PrepareKind;
use crate::messages::{CallOptions, CallPayload, Request};
use crate::ports::{RevisionCheck, RevisionChecker};
use canopy_tree::{Document, Element, SectionTarget, TreeDelta, ROOT_TAG};
use tracing::{debug, warn};

/// Envelope tags a fragment operand may arrive wrapped in.
const FRAGMENT_TAG: &str = "fragment";
const CALL_DATA_TAG: &str = "call_data";

/// The operand handed to the execution engine.
///
/// `Whole` marks the sync strategies: the request itself is the operand and
/// stays owned by the caller; nothing is extracted or copied.
#[derive(Clone, Debug, PartialEq)]
pub enum PreparedInput {
    None,
    Fragment(Element),
    Delta(TreeDelta),
    Whole,
}

impl PreparedInput {
    pub fn fragment(&self) -> Option<&Element> {
        match self {
            PreparedInput::Fragment(el) => Some(el),
            _ => None,
        }
    }

    pub fn delta(&self) -> Option<&TreeDelta> {
        match self {
            PreparedInput::Delta(delta) => Some(delta),
            _ => None,
        }
    }

    pub fn is_none(&self) -> bool {
        matches!(self, PreparedInput::None)
    }
}

/// Run the preparation strategy for one request.
pub fn prepare(
    kind: PrepareKind,
    request: &Request,
    current: &Document,
    checker: &dyn RevisionChecker,
) -> Result<(PreparedInput, SectionTarget), EngineError> {
    match kind {
        PrepareKind::None => {
            let section = SectionTarget::parse(request.section.as_deref())?;
            Ok((PreparedInput::None, section))
        }
        PrepareKind::Data => {
            let section = SectionTarget::parse(request.section.as_deref())?;
            let fragment = match &request.call_data {
                Some(CallPayload::Fragment(el)) => Some(el),
                Some(CallPayload::Delta(_)) => {
                    warn!("delta payload on a data operation, treating as no input");
                    None
                }
                None => None,
            };
            let input = match extract_operand(fragment, section, current, checker, request.call_options) {
                Some(el) => PreparedInput::Fragment(el),
                None => PreparedInput::None,
            };
            Ok((input, section))
        }
        PrepareKind::Sync => {
            let section = SectionTarget::parse(request.section.as_deref())?;
            Ok((PreparedInput::Whole, section))
        }
        PrepareKind::Diff => {
            // A diff always targets the whole tree, whatever the request's
            // section field says.
            let delta = if request.global_update {
                request.update_diff.clone()
            } else {
                match &request.call_data {
                    Some(CallPayload::Delta(delta)) => Some(delta.clone()),
                    _ => None,
                }
            };
            let input = match delta {
                Some(delta) => PreparedInput::Delta(delta),
                None => {
                    // Not an error here; execution rejects a null diff.
                    warn!(
                        request_id = %request.request_id,
                        global_update = request.global_update,
                        "diff operation carries no operand"
                    );
                    PreparedInput::None
                }
            };
            Ok((input, SectionTarget::Whole))
        }
    }
}

/// Unwrap the operand envelope, narrow a full document to the requested
/// section, and deep-copy the result.
fn extract_operand(
    fragment: Option<&Element>,
    target: SectionTarget,
    current: &Document,
    checker: &dyn RevisionChecker,
    options: CallOptions,
) -> Option<Element> {
    let root = fragment?;

    let data = if root.tag == FRAGMENT_TAG || root.tag == CALL_DATA_TAG {
        match root.child(ROOT_TAG) {
            Some(inner) => inner,
            None => {
                debug!(envelope = %root.tag, "envelope carries no document");
                return None;
            }
        }
    } else {
        root
    };

    let data = match target {
        SectionTarget::Section(section) if data.tag == ROOT_TAG => {
            match checker.check(data, current, options) {
                RevisionCheck::Ok => match data.child(section.tag()) {
                    Some(subtree) => subtree,
                    None => {
                        debug!(%section, "operand carries no such section");
                        return None;
                    }
                },
                RevisionCheck::Mismatch => {
                    // Incompatible baseline: skip the narrowing and use the
                    // full document instead.
                    debug!(%section, "revision check failed, keeping full document");
                    data
                }
            }
        }
        _ => data,
    };

    Some(data.clone())
}
