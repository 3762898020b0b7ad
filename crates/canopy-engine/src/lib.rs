//! # Canopy Engine
//!
//! Operation dispatch and transactional-apply engine for the cluster
//! configuration document.
//!
//! ## Role in System
//!
//! - **Single Point of Mutation**: every change to the replicated document
//!   goes through [`Engine::apply`]; nothing else writes the committed tree.
//! - **Copy-on-Write Discipline**: mutating operations run against a scratch
//!   copy and either hand back a fully validated candidate or nothing.
//!   Partial states are never observable.
//! - **Table-Driven Dispatch**: the operation registry is the single source
//!   of truth for which operations exist, whether they mutate, and what
//!   privilege/quorum gating the caller must perform.
//!
//! Transport, persistence, quorum, and notification fan-out are external
//! collaborators; this crate applies one operation to one document on one
//! node.

pub mod domain;
pub mod messages;
pub mod ports;
pub mod process;

pub use domain::apply::{ApplyOutcome, Engine, Role};
pub use domain::cleanup::CleanupKind;
pub use domain::errors::EngineError;
pub use domain::prepare::{prepare, PreparedInput};
pub use domain::registry::{resolve, OperationDescriptor, OperationKind, PrepareKind};
pub use messages::{CallOptions, CallPayload, Reply, Request, StatusCode};
pub use ports::{AcceptAllRevisions, RevisionCheck, RevisionChecker};
pub use process::process_request;
