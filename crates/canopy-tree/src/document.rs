use crate::delta::VersionPair;
use crate::element::Element;
use crate::errors::TreeError;
use crate::section::{Section, SectionTarget};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Fixed tag of the document root.
pub const ROOT_TAG: &str = "cluster";

/// Major generation counter, advanced only by the dedicated bump operation.
pub const EPOCH_ATTR: &str = "epoch";

/// Sequence counter, advanced on configuration-affecting changes within an
/// epoch.
pub const NUM_UPDATES_ATTR: &str = "num_updates";

/// The full configuration document: a root element with the five fixed
/// sections as children and the version counters as root attributes.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Document {
    root: Element,
}

impl Document {
    /// Empty skeleton: all five sections present, counters absent until
    /// first touched.
    pub fn new() -> Self {
        let mut root = Element::new(ROOT_TAG);
        for section in Section::ALL {
            root.append_child(Element::new(section.tag()));
        }
        Self { root }
    }

    /// Wrap an externally supplied root element, e.g. a replace operand or a
    /// synced peer document. Only the root tag is validated; a replace is
    /// allowed to carry a sparse document.
    pub fn from_root(root: Element) -> Result<Self, TreeError> {
        if root.tag != ROOT_TAG {
            return Err(TreeError::NotADocument { tag: root.tag });
        }
        Ok(Self { root })
    }

    pub fn root(&self) -> &Element {
        &self.root
    }

    pub fn root_mut(&mut self) -> &mut Element {
        &mut self.root
    }

    pub fn section(&self, section: Section) -> Option<&Element> {
        self.root.child(section.tag())
    }

    /// Mutable section access, creating the section element if a sparse
    /// replace dropped it.
    pub fn section_mut(&mut self, section: Section) -> &mut Element {
        let tag = section.tag();
        let idx = match self.root.children.iter().position(|c| c.tag == tag) {
            Some(idx) => idx,
            None => {
                self.root.append_child(Element::new(tag));
                self.root.children.len() - 1
            }
        };
        &mut self.root.children[idx]
    }

    pub fn subtree(&self, target: SectionTarget) -> Option<&Element> {
        match target {
            SectionTarget::Whole => Some(&self.root),
            SectionTarget::Section(s) => self.section(s),
        }
    }

    pub fn subtree_mut(&mut self, target: SectionTarget) -> &mut Element {
        match target {
            SectionTarget::Whole => &mut self.root,
            SectionTarget::Section(s) => self.section_mut(s),
        }
    }

    fn counter(&self, name: &str) -> u64 {
        self.root
            .attr(name)
            .and_then(|v| v.parse().ok())
            .unwrap_or(0)
    }

    pub fn epoch(&self) -> u64 {
        self.counter(EPOCH_ATTR)
    }

    pub fn num_updates(&self) -> u64 {
        self.counter(NUM_UPDATES_ATTR)
    }

    pub fn version(&self) -> VersionPair {
        VersionPair {
            epoch: self.epoch(),
            num_updates: self.num_updates(),
        }
    }

    pub fn set_counter(&mut self, name: &str, value: u64) {
        self.root.set_attr(name, value.to_string());
    }

    /// Advance a counter by one, creating it at 1 when absent or unparsable.
    pub fn increment_counter(&mut self, name: &str) {
        let next = self.counter(name) + 1;
        self.set_counter(name, next);
    }

    /// Make a counter attribute present without advancing it.
    pub fn ensure_counter(&mut self, name: &str) {
        let current = self.counter(name);
        self.set_counter(name, current);
    }

    /// Scan the whole tree for identifier values carried by more than one
    /// element. Returns each offending id once, in first-seen order.
    pub fn duplicate_ids(&self) -> Vec<String> {
        let mut seen: HashMap<&str, u32> = HashMap::new();
        let mut duplicates = Vec::new();
        self.root.walk(&mut |el| {
            if let Some(id) = el.id() {
                let count = seen.entry(id).or_insert(0);
                *count += 1;
                if *count == 2 {
                    duplicates.push(id.to_string());
                }
            }
        });
        duplicates
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}
