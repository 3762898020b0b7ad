//! The request loop: one inbound request, one reply.
//!
//! Glue between the transport layer and the core pipeline — resolve,
//! prepare, apply, commit, reply — with the cleanup post-conditions asserted
//! on every exit path.

use crate::domain::apply::Engine;
use crate::domain::prepare::prepare;
use crate::domain::registry::{self, OperationKind};
use crate::messages::{Reply, Request};
use crate::ports::RevisionChecker;
use tracing::debug;

/// Serve one request against the engine, committing the candidate document
/// on success.
pub fn process_request(
    engine: &mut Engine,
    checker: &dyn RevisionChecker,
    request: &Request,
) -> Reply {
    let desc = match registry::resolve(request.operation.as_deref()) {
        Ok(desc) => desc,
        Err(err) => return Reply::failure(request, (&err).into()),
    };

    let (input, section) = match prepare(desc.prepare, request, engine.document(), checker) {
        Ok(prepared) => prepared,
        Err(err) => return Reply::failure(request, (&err).into()),
    };

    // A global update carries its version bookkeeping inside the diff, and
    // bump owns its counter effects outright; neither goes through the
    // generic counter step.
    let manage_counters = !request.global_update && desc.kind != OperationKind::Bump;

    let result = engine.apply(
        request.operation.as_deref(),
        request.call_options,
        section,
        &input,
        manage_counters,
    );

    match result {
        Ok(outcome) => {
            desc.cleanup.finish(&input, outcome.output.as_ref());
            if let Some(candidate) = outcome.candidate {
                debug!(
                    op = desc.name,
                    config_changed = outcome.config_changed,
                    version = %candidate.version(),
                    "committing candidate document"
                );
                engine.commit(candidate);
            }
            Reply::success(request, outcome.output, outcome.config_changed)
        }
        Err(err) => {
            desc.cleanup.finish(&input, None);
            debug!(op = desc.name, %err, "operation failed, document unchanged");
            Reply::failure(request, (&err).into())
        }
    }
}
