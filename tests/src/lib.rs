//! # Canopy Test Suite
//!
//! Unified test crate for cross-crate scenarios.
//!
//! ## Structure
//!
//! ```text
//! tests/src/
//! └── integration/      # Full request→prepare→apply→reply scenarios
//!     ├── operations.rs   # Operation semantics through the request loop
//!     └── replication.rs  # Versioning, deltas, role and sync behavior
//! ```
//!
//! ## Running Tests
//!
//! ```bash
//! # All tests
//! cargo test -p canopy-tests
//!
//! # By category
//! cargo test -p canopy-tests integration::
//! ```

#[cfg(test)]
mod integration;

use std::sync::Once;

static INIT: Once = Once::new();

/// Install a subscriber once so failing tests carry the engine's tracing
/// output. Honors `RUST_LOG`.
pub fn init_tracing() {
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
            )
            .with_test_writer()
            .try_init();
    });
}
