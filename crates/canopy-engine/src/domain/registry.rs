//! The operation registry: one fixed ordered table mapping operation names
//! to descriptors.
//!
//! The table is the single source of truth for which operations exist,
//! whether they mutate, and their privilege/quorum requirements. It is
//! deliberately a small static slice with linear lookup: exhaustively
//! enumerable for authorization and documentation, extended only by editing
//! this file, and exercised through the exhaustive [`OperationKind`] match
//! in the handler dispatch, so a new row without a handler fails to compile.

use crate::domain::cleanup::CleanupKind;
use crate::domain::errors::EngineError;
use tracing::error;

/// Every operation the engine serves, the default (empty-name) entry
/// included.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum OperationKind {
    Default,
    Query,
    Modify,
    Update,
    ApplyDiff,
    Replica,
    ReplicaAll,
    SyncOne,
    Primary,
    IsPrimary,
    Bump,
    Replace,
    Create,
    Delete,
    DeleteAlt,
    Sync,
    Quit,
    Ping,
    Erase,
    Noop,
    ShutdownReq,
}

/// Which request-preparation strategy a descriptor selects.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PrepareKind {
    None,
    Data,
    Sync,
    Diff,
}

/// Immutable per-operation record. Privilege and quorum flags are consumed
/// by the authorization collaborator before `apply` is invoked; the engine
/// itself does not enforce them.
#[derive(Debug)]
pub struct OperationDescriptor {
    pub name: &'static str,
    pub kind: OperationKind,
    pub modifies: bool,
    pub needs_privileges: bool,
    pub needs_quorum: bool,
    pub prepare: PrepareKind,
    pub cleanup: CleanupKind,
}

const fn op(
    name: &'static str,
    kind: OperationKind,
    modifies: bool,
    needs_privileges: bool,
    needs_quorum: bool,
    prepare: PrepareKind,
    cleanup: CleanupKind,
) -> OperationDescriptor {
    OperationDescriptor {
        name,
        kind,
        modifies,
        needs_privileges,
        needs_quorum,
        prepare,
        cleanup,
    }
}

use CleanupKind as C;
use OperationKind as K;
use PrepareKind as P;

/// Slot 0 is the catch-all default for null/empty operation names.
pub static OPERATIONS: &[OperationDescriptor] = &[
    op("", K::Default, false, false, false, P::None, C::None),
    op("query", K::Query, false, false, false, P::None, C::Query),
    op("modify", K::Modify, true, true, true, P::Data, C::Data),
    op("update", K::Update, true, true, true, P::Data, C::Data),
    op("apply_diff", K::ApplyDiff, true, true, true, P::Diff, C::Data),
    op("replica", K::Replica, false, true, false, P::None, C::None),
    op("replica_all", K::ReplicaAll, false, true, false, P::None, C::None),
    op("sync_one", K::SyncOne, false, true, false, P::Sync, C::Sync),
    op("primary", K::Primary, false, true, false, P::None, C::None),
    op("is_primary", K::IsPrimary, false, true, false, P::None, C::None),
    op("bump", K::Bump, true, true, true, P::None, C::Output),
    op("replace", K::Replace, true, true, true, P::Data, C::Data),
    op("create", K::Create, true, true, true, P::Data, C::Data),
    op("delete", K::Delete, true, true, true, P::Data, C::Data),
    op("delete_alt", K::DeleteAlt, true, true, true, P::Data, C::Data),
    op("sync", K::Sync, false, true, false, P::Sync, C::Sync),
    op("quit", K::Quit, false, true, false, P::None, C::None),
    op("ping", K::Ping, false, false, false, P::None, C::Output),
    op("erase", K::Erase, true, true, true, P::None, C::Output),
    op("noop", K::Noop, false, false, false, P::None, C::None),
    op("shutdown_req", K::ShutdownReq, false, true, false, P::Sync, C::Sync),
];

/// Resolve an operation name to its descriptor.
///
/// A null or empty name resolves to the default passthrough entry; an
/// unknown name is a hard error, never silently defaulted.
pub fn resolve(name: Option<&str>) -> Result<&'static OperationDescriptor, EngineError> {
    let name = name.unwrap_or("");
    if name.is_empty() {
        return Ok(&OPERATIONS[0]);
    }
    OPERATIONS
        .iter()
        .find(|desc| desc.name == name)
        .ok_or_else(|| {
            error!(op = name, "operation is not valid");
            EngineError::OperationNotFound {
                op: name.to_string(),
            }
        })
}
