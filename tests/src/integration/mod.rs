//! Cross-crate integration scenarios.

mod operations;
mod replication;
