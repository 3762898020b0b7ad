//! Core pipeline: registry, preparation, apply, handlers, cleanup.

pub mod apply;
pub mod cleanup;
pub mod errors;
pub mod handlers;
pub mod prepare;
pub mod registry;
