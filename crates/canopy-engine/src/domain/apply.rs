//! The execution engine: copy-on-write application of one operation to the
//! committed document.

use crate::domain::errors::EngineError;
use crate::domain::handlers;
use crate::domain::prepare::PreparedInput;
use crate::domain::registry;
use crate::messages::CallOptions;
use canopy_tree::{
    config_changed, expand_increments, Document, Element, SectionTarget, EPOCH_ATTR,
    NUM_UPDATES_ATTR,
};
use tracing::{debug, error, warn};

/// Replication role of this instance. Consumed by the readwrite operations
/// and the sync gate; election itself belongs to the cluster layer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Role {
    Primary,
    Replica,
}

/// What a successful apply hands back.
///
/// `candidate` is the fully validated new document for mutating operations
/// (`None` for read-only ones); committing it is a separate, explicit step.
#[derive(Debug)]
pub struct ApplyOutcome {
    pub candidate: Option<Document>,
    pub output: Option<Element>,
    pub config_changed: bool,
}

/// Owns the committed document plus the instance-local role and shutdown
/// state the control operations touch.
///
/// Logically single-threaded per document: `apply` runs to completion with
/// exclusive access, and the caller serializes `commit`. Readers of a
/// previously committed document are never invalidated mid-apply; that is
/// what the scratch copy exists for.
#[derive(Debug)]
pub struct Engine {
    committed: Document,
    role: Role,
    shutdown_requested: bool,
}

impl Engine {
    /// Fresh instance: empty document skeleton, replica role.
    pub fn new() -> Self {
        Self::with_document(Document::new())
    }

    pub fn with_document(committed: Document) -> Self {
        Self {
            committed,
            role: Role::Replica,
            shutdown_requested: false,
        }
    }

    pub fn document(&self) -> &Document {
        &self.committed
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub(crate) fn set_role(&mut self, role: Role) {
        if self.role != role {
            debug!(?role, "replication role changed");
        }
        self.role = role;
    }

    pub fn shutdown_requested(&self) -> bool {
        self.shutdown_requested
    }

    pub(crate) fn request_shutdown(&mut self) {
        self.shutdown_requested = true;
    }

    /// Swap in a validated candidate as the committed document.
    pub fn commit(&mut self, candidate: Document) {
        self.committed = candidate;
    }

    /// Apply one operation.
    ///
    /// Read-only operations run directly against the committed document and
    /// never allocate a scratch copy. Mutating operations run against a deep
    /// copy, which is validated (id uniqueness), annotated (shorthand
    /// expansion, change detection, counters) and returned as the candidate;
    /// on any error the scratch is dropped and the committed document is
    /// untouched.
    pub fn apply(
        &mut self,
        op: Option<&str>,
        call_options: CallOptions,
        section: SectionTarget,
        input: &PreparedInput,
        manage_counters: bool,
    ) -> Result<ApplyOutcome, EngineError> {
        let desc = registry::resolve(op)?;

        if !desc.modifies {
            let output = handlers::execute_readonly(self, desc.kind, section, input)?;
            return Ok(ApplyOutcome {
                candidate: None,
                output,
                config_changed: false,
            });
        }

        let mut scratch = self.committed.clone();
        // Handlers must never mutate the committed document through the
        // scratch borrow.
        debug_assert!(!std::ptr::eq(&self.committed, &scratch));

        let output =
            handlers::execute_mutating(desc.kind, section, input, &self.committed, &mut scratch)?;

        if let Some(id) = scratch.duplicate_ids().into_iter().next() {
            if call_options.contains(CallOptions::FORCE_DIFF) {
                // A forced global update carrying a collision means the
                // replicas have diverged, not that a client authored bad
                // configuration.
                error!(op = desc.name, %id, "global update introduces id collision");
            } else {
                warn!(op = desc.name, %id, "operation introduces id collision");
            }
            return Err(EngineError::IdCollision { id });
        }

        expand_increments(scratch.root_mut());

        let changed = config_changed(&self.committed, &scratch);
        if manage_counters {
            if changed {
                scratch.increment_counter(NUM_UPDATES_ATTR);
                scratch.ensure_counter(EPOCH_ATTR);
            } else {
                scratch.ensure_counter(NUM_UPDATES_ATTR);
            }
        }

        Ok(ApplyOutcome {
            candidate: Some(scratch),
            output,
            config_changed: changed,
        })
    }
}

impl Default for Engine {
    fn default() -> Self {
        Self::new()
    }
}
