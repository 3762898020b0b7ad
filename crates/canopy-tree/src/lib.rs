//! # Canopy Tree
//!
//! The hierarchical document tree shared by every Canopy crate.
//!
//! ## Design Principles
//!
//! - **Single Source of Truth**: All cross-crate document types are defined
//!   here — elements, the document wrapper, sections, and structural deltas.
//! - **Deterministic Shape**: Attribute order is insertion order and child
//!   order is document order, so serialization and diffing are stable.
//! - **Value Semantics**: Deep copy is `Clone`, structural equality is
//!   `PartialEq`; nothing in this crate holds interior mutability.

pub mod delta;
pub mod document;
pub mod element;
pub mod errors;
pub mod expand;
pub mod section;

pub use delta::{config_changed, DeltaOp, PathStep, TreeDelta, VersionPair};
pub use document::{Document, EPOCH_ATTR, NUM_UPDATES_ATTR, ROOT_TAG};
pub use element::{Element, ID_ATTR};
pub use errors::TreeError;
pub use expand::{expand_increments, expand_shorthand};
pub use section::{Section, SectionTarget};
