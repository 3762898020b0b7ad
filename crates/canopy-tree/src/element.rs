use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Attribute carrying an element's document-wide unique identifier.
pub const ID_ATTR: &str = "id";

/// A node in the configuration document: a named tag, string attributes in
/// insertion order, and ordered children.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Element {
    pub tag: String,
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub attributes: IndexMap<String, String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<Element>,
}

impl Element {
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            attributes: IndexMap::new(),
            children: Vec::new(),
        }
    }

    /// Builder-style attribute setter, used heavily by tests and fixtures.
    #[must_use]
    pub fn with_attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(name.into(), value.into());
        self
    }

    #[must_use]
    pub fn with_child(mut self, child: Element) -> Self {
        self.children.push(child);
        self
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }

    pub fn set_attr(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.attributes.insert(name.into(), value.into());
    }

    pub fn remove_attr(&mut self, name: &str) -> Option<String> {
        self.attributes.shift_remove(name)
    }

    pub fn id(&self) -> Option<&str> {
        self.attr(ID_ATTR)
    }

    /// First direct child with the given tag.
    pub fn child(&self, tag: &str) -> Option<&Element> {
        self.children.iter().find(|c| c.tag == tag)
    }

    pub fn child_mut(&mut self, tag: &str) -> Option<&mut Element> {
        self.children.iter_mut().find(|c| c.tag == tag)
    }

    /// Direct child matched by tag and, when given, by identifier.
    pub fn find_child(&self, tag: &str, id: Option<&str>) -> Option<&Element> {
        self.children
            .iter()
            .find(|c| c.tag == tag && (id.is_none() || c.id() == id))
    }

    pub fn find_child_mut(&mut self, tag: &str, id: Option<&str>) -> Option<&mut Element> {
        self.children
            .iter_mut()
            .find(|c| c.tag == tag && (id.is_none() || c.id() == id))
    }

    pub fn append_child(&mut self, child: Element) {
        self.children.push(child);
    }

    /// Remove the first direct child matched by tag and optional identifier,
    /// returning it.
    pub fn remove_child(&mut self, tag: &str, id: Option<&str>) -> Option<Element> {
        let idx = self
            .children
            .iter()
            .position(|c| c.tag == tag && (id.is_none() || c.id() == id))?;
        Some(self.children.remove(idx))
    }

    /// Remove the first matching element anywhere in the subtree, depth-first.
    pub fn remove_descendant(&mut self, tag: &str, id: Option<&str>) -> Option<Element> {
        if let Some(found) = self.remove_child(tag, id) {
            return Some(found);
        }
        for child in &mut self.children {
            if let Some(found) = child.remove_descendant(tag, id) {
                return Some(found);
            }
        }
        None
    }

    /// Depth-first visit of this element and every descendant.
    pub fn walk<'a>(&'a self, visit: &mut impl FnMut(&'a Element)) {
        visit(self);
        for child in &self.children {
            child.walk(visit);
        }
    }
}
