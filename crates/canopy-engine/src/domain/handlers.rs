//! Per-operation execute functions.
//!
//! Read-only handlers run against the committed document (and the engine's
//! role/shutdown state); mutating handlers receive the committed document
//! read-only plus an exclusively borrowed scratch copy, so a handler cannot
//! alias the two even by accident.

use crate::domain::apply::{Engine, Role};
use crate::domain::errors::EngineError;
use crate::domain::prepare::PreparedInput;
use crate::domain::registry::OperationKind;
use canopy_tree::{
    expand_shorthand, Document, Element, SectionTarget, EPOCH_ATTR, NUM_UPDATES_ATTR, ROOT_TAG,
};

pub(crate) fn execute_readonly(
    engine: &mut Engine,
    kind: OperationKind,
    section: SectionTarget,
    _input: &PreparedInput,
) -> Result<Option<Element>, EngineError> {
    match kind {
        OperationKind::Default | OperationKind::Noop => Ok(None),

        OperationKind::Query => engine
            .document()
            .subtree(section)
            .cloned()
            .map(Some)
            .ok_or(EngineError::NotFound),

        OperationKind::Replica | OperationKind::ReplicaAll => {
            engine.set_role(Role::Replica);
            Ok(None)
        }
        OperationKind::Primary => {
            engine.set_role(Role::Primary);
            Ok(None)
        }
        OperationKind::IsPrimary => match engine.role() {
            Role::Primary => Ok(None),
            Role::Replica => Err(EngineError::NotPrimary),
        },

        // Success here is the signal for the replication layer to read the
        // committed document and ship it; fan-out is not this crate's job.
        OperationKind::Sync | OperationKind::SyncOne => match engine.role() {
            Role::Primary => Ok(None),
            Role::Replica => Err(EngineError::NotPrimary),
        },

        OperationKind::Ping => {
            let version = engine.document().version();
            Ok(Some(
                Element::new("ping_response")
                    .with_attr(EPOCH_ATTR, version.epoch.to_string())
                    .with_attr(NUM_UPDATES_ATTR, version.num_updates.to_string()),
            ))
        }

        OperationKind::Quit | OperationKind::ShutdownReq => {
            engine.request_shutdown();
            Ok(None)
        }

        OperationKind::Modify
        | OperationKind::Update
        | OperationKind::ApplyDiff
        | OperationKind::Bump
        | OperationKind::Replace
        | OperationKind::Create
        | OperationKind::Delete
        | OperationKind::DeleteAlt
        | OperationKind::Erase => {
            unreachable!("{kind:?} is registered as mutating")
        }
    }
}

pub(crate) fn execute_mutating(
    kind: OperationKind,
    section: SectionTarget,
    input: &PreparedInput,
    _current: &Document,
    scratch: &mut Document,
) -> Result<Option<Element>, EngineError> {
    match kind {
        OperationKind::Modify | OperationKind::Update => {
            let fragment = input.fragment().ok_or(EngineError::NoInput)?;
            let target = scratch.subtree_mut(section);
            if fragment.tag == target.tag {
                merge_into(target, fragment);
            } else {
                match target.find_child_mut(&fragment.tag, fragment.id()) {
                    Some(existing) => merge_into(existing, fragment),
                    None => target.append_child(fragment.clone()),
                }
            }
            Ok(None)
        }

        OperationKind::Create => {
            let fragment = input.fragment().ok_or(EngineError::NoInput)?;
            let target = scratch.subtree_mut(section);
            let items = operand_items(fragment, &target.tag);
            for item in &items {
                if target.find_child(&item.tag, item.id()).is_some() {
                    return Err(EngineError::ExistsAlready {
                        id: item.id().unwrap_or(&item.tag).to_string(),
                    });
                }
            }
            for item in items {
                target.append_child(item.clone());
            }
            Ok(None)
        }

        OperationKind::Delete => {
            let fragment = input.fragment().ok_or(EngineError::NoInput)?;
            let target = scratch.subtree_mut(section);
            let mut removed_any = false;
            for item in operand_items(fragment, &target.tag) {
                removed_any |= target.remove_descendant(&item.tag, item.id()).is_some();
            }
            if removed_any {
                Ok(None)
            } else {
                Err(EngineError::NotFound)
            }
        }

        // Alternate delete surface: direct children of the target only.
        OperationKind::DeleteAlt => {
            let fragment = input.fragment().ok_or(EngineError::NoInput)?;
            let target = scratch.subtree_mut(section);
            let mut removed_any = false;
            for item in operand_items(fragment, &target.tag) {
                removed_any |= target.remove_child(&item.tag, item.id()).is_some();
            }
            if removed_any {
                Ok(None)
            } else {
                Err(EngineError::NotFound)
            }
        }

        OperationKind::Replace => {
            let fragment = input.fragment().ok_or(EngineError::NoInput)?;
            match section {
                SectionTarget::Whole => {
                    *scratch = Document::from_root(fragment.clone())?;
                }
                SectionTarget::Section(s) => {
                    if fragment.tag != s.tag() {
                        return Err(EngineError::MalformedInput {
                            detail: format!(
                                "replace of {} given a {:?} element",
                                s.tag(),
                                fragment.tag
                            ),
                        });
                    }
                    let root = scratch.root_mut();
                    match root.children.iter().position(|c| c.tag == s.tag()) {
                        Some(idx) => root.children[idx] = fragment.clone(),
                        None => root.append_child(fragment.clone()),
                    }
                }
            }
            Ok(None)
        }

        OperationKind::Erase => {
            let version = scratch.version();
            *scratch = Document::new();
            scratch.set_counter(EPOCH_ATTR, version.epoch);
            scratch.set_counter(NUM_UPDATES_ATTR, version.num_updates);
            Ok(Some(scratch.root().clone()))
        }

        // Bump owns its counter effects entirely; the request loop keeps it
        // out of the generic manage-counters path.
        OperationKind::Bump => {
            scratch.increment_counter(EPOCH_ATTR);
            scratch.set_counter(NUM_UPDATES_ATTR, 0);
            let mut version = Element::new(ROOT_TAG);
            version.attributes = scratch.root().attributes.clone();
            Ok(Some(version))
        }

        OperationKind::ApplyDiff => {
            let delta = input.delta().ok_or(EngineError::NoInput)?;
            delta.apply_to(scratch)?;
            Ok(None)
        }

        OperationKind::Default
        | OperationKind::Query
        | OperationKind::Replica
        | OperationKind::ReplicaAll
        | OperationKind::SyncOne
        | OperationKind::Primary
        | OperationKind::IsPrimary
        | OperationKind::Sync
        | OperationKind::Quit
        | OperationKind::Ping
        | OperationKind::Noop
        | OperationKind::ShutdownReq => {
            unreachable!("{kind:?} is registered as read-only")
        }
    }
}

/// Merge a fragment into an existing element: attributes overwrite (with
/// eager shorthand expansion against the pre-merge value), children match by
/// (tag, id) and recurse, unmatched children append.
fn merge_into(target: &mut Element, incoming: &Element) {
    for (name, value) in &incoming.attributes {
        let resolved = expand_shorthand(name, value, target.attr(name))
            .unwrap_or_else(|| value.clone());
        target.set_attr(name.clone(), resolved);
    }
    for child in &incoming.children {
        match target.find_child_mut(&child.tag, child.id()) {
            Some(existing) => merge_into(existing, child),
            None => target.append_child(child.clone()),
        }
    }
}

/// A fragment whose tag matches the target is a container of items;
/// anything else is a single item itself.
fn operand_items<'a>(fragment: &'a Element, target_tag: &str) -> Vec<&'a Element> {
    if fragment.tag == target_tag {
        fragment.children.iter().collect()
    } else {
        vec![fragment]
    }
}
