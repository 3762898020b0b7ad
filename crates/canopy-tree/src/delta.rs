//! Structural deltas between document versions.
//!
//! A delta is the unit the replication layer ships between nodes: a list of
//! path-addressed edits guarded by the version pair it was computed against.
//! Applying a delta to a document at any other version is refused outright;
//! "almost applies" is not a state this system recognizes.

use crate::document::Document;
use crate::element::Element;
use crate::errors::TreeError;
use crate::section::Section;
use serde::{Deserialize, Serialize};
use std::fmt;

/// (epoch, num_updates) — the document version a delta is anchored to.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct VersionPair {
    pub epoch: u64,
    pub num_updates: u64,
}

impl fmt::Display for VersionPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.epoch, self.num_updates)
    }
}

/// One step in a root-relative element path. Identifier disambiguates
/// siblings sharing a tag; the id-uniqueness invariant makes this exact.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PathStep {
    pub tag: String,
    pub id: Option<String>,
}

impl PathStep {
    fn of(element: &Element) -> Self {
        PathStep {
            tag: element.tag.clone(),
            id: element.id().map(str::to_string),
        }
    }
}

/// A single edit within a delta.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum DeltaOp {
    SetAttribute {
        path: Vec<PathStep>,
        name: String,
        value: String,
    },
    RemoveAttribute {
        path: Vec<PathStep>,
        name: String,
    },
    AddChild {
        path: Vec<PathStep>,
        element: Element,
    },
    RemoveChild {
        path: Vec<PathStep>,
        tag: String,
        id: Option<String>,
    },
}

/// A structural delta between two document versions.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TreeDelta {
    pub source: VersionPair,
    pub target: VersionPair,
    pub ops: Vec<DeltaOp>,
}

impl TreeDelta {
    /// Compute the delta that turns `old` into `new`.
    pub fn between(old: &Document, new: &Document) -> TreeDelta {
        let mut ops = Vec::new();
        diff_element(&mut Vec::new(), old.root(), new.root(), &mut ops);
        TreeDelta {
            source: old.version(),
            target: new.version(),
            ops,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    /// Apply this delta in place.
    ///
    /// Refuses when the document is not at the delta's source version, and
    /// verifies afterwards that the edits landed the document on the target
    /// version; either failure leaves "did not apply cleanly" semantics to
    /// the caller, who discards the mutated copy.
    pub fn apply_to(&self, doc: &mut Document) -> Result<(), TreeError> {
        let found = doc.version();
        if found != self.source {
            return Err(TreeError::DeltaMismatch {
                expected: self.source,
                found,
            });
        }

        for op in &self.ops {
            apply_op(doc.root_mut(), op)?;
        }

        let landed = doc.version();
        if landed != self.target {
            return Err(TreeError::DeltaMismatch {
                expected: self.target,
                found: landed,
            });
        }
        Ok(())
    }
}

fn display_path(path: &[PathStep]) -> String {
    let mut out = String::from("/");
    for step in path {
        out.push_str(&step.tag);
        if let Some(id) = &step.id {
            out.push('(');
            out.push_str(id);
            out.push(')');
        }
        out.push('/');
    }
    out
}

fn resolve_path<'a>(root: &'a mut Element, path: &[PathStep]) -> Option<&'a mut Element> {
    let mut current = root;
    for step in path {
        current = current.find_child_mut(&step.tag, step.id.as_deref())?;
    }
    Some(current)
}

fn apply_op(root: &mut Element, op: &DeltaOp) -> Result<(), TreeError> {
    let path: &[PathStep] = match op {
        DeltaOp::SetAttribute { path, .. }
        | DeltaOp::RemoveAttribute { path, .. }
        | DeltaOp::AddChild { path, .. }
        | DeltaOp::RemoveChild { path, .. } => path.as_slice(),
    };
    let target = resolve_path(root, path).ok_or_else(|| TreeError::DeltaTargetMissing {
        path: display_path(path),
    })?;

    match op {
        DeltaOp::SetAttribute { name, value, .. } => {
            target.set_attr(name.clone(), value.clone());
        }
        DeltaOp::RemoveAttribute { name, .. } => {
            target.remove_attr(name);
        }
        DeltaOp::AddChild { element, .. } => {
            target.append_child(element.clone());
        }
        DeltaOp::RemoveChild { path, tag, id, .. } => {
            if target.remove_child(tag, id.as_deref()).is_none() {
                return Err(TreeError::DeltaTargetMissing {
                    path: format!("{}{}", display_path(path), tag),
                });
            }
        }
    }
    Ok(())
}

fn diff_element(path: &mut Vec<PathStep>, old: &Element, new: &Element, ops: &mut Vec<DeltaOp>) {
    for (name, value) in &new.attributes {
        if old.attr(name) != Some(value.as_str()) {
            ops.push(DeltaOp::SetAttribute {
                path: path.clone(),
                name: name.clone(),
                value: value.clone(),
            });
        }
    }
    for name in old.attributes.keys() {
        if !new.attributes.contains_key(name) {
            ops.push(DeltaOp::RemoveAttribute {
                path: path.clone(),
                name: name.clone(),
            });
        }
    }

    // Children match by (tag, id); unmatched old children are removals,
    // unmatched new children are additions carried whole.
    let mut consumed = vec![false; new.children.len()];
    for old_child in &old.children {
        let matched = new.children.iter().enumerate().find(|(idx, candidate)| {
            !consumed[*idx] && candidate.tag == old_child.tag && candidate.id() == old_child.id()
        });
        match matched {
            Some((idx, new_child)) => {
                consumed[idx] = true;
                path.push(PathStep::of(old_child));
                diff_element(path, old_child, new_child, ops);
                path.pop();
            }
            None => ops.push(DeltaOp::RemoveChild {
                path: path.clone(),
                tag: old_child.tag.clone(),
                id: old_child.id().map(str::to_string),
            }),
        }
    }
    for (idx, new_child) in new.children.iter().enumerate() {
        if !consumed[idx] {
            ops.push(DeltaOp::AddChild {
                path: path.clone(),
                element: new_child.clone(),
            });
        }
    }
}

/// True iff the trees differ anywhere outside the status section.
///
/// Root attributes count (they carry cluster-wide configuration); the status
/// subtree is masked out on both sides, so node-liveness churn alone never
/// registers as a configuration change.
pub fn config_changed(old: &Document, new: &Document) -> bool {
    if old.root().attributes != new.root().attributes {
        return true;
    }
    fn non_status(doc: &Document) -> Vec<&Element> {
        doc.root()
            .children
            .iter()
            .filter(|c| c.tag != Section::Status.tag())
            .collect()
    }
    non_status(old) != non_status(new)
}
