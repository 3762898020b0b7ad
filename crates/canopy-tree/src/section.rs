use crate::document::ROOT_TAG;
use crate::errors::TreeError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// The fixed top-level subtrees of the document.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Section {
    Status,
    CrmConfig,
    Nodes,
    Resources,
    Constraints,
}

impl Section {
    pub const ALL: [Section; 5] = [
        Section::Status,
        Section::CrmConfig,
        Section::Nodes,
        Section::Resources,
        Section::Constraints,
    ];

    pub fn tag(self) -> &'static str {
        match self {
            Section::Status => "status",
            Section::CrmConfig => "crm_config",
            Section::Nodes => "nodes",
            Section::Resources => "resources",
            Section::Constraints => "constraints",
        }
    }

    pub fn from_tag(tag: &str) -> Option<Section> {
        Section::ALL.into_iter().find(|s| s.tag() == tag)
    }
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// What a request's section field targets.
///
/// A missing section and the literal root tag both mean the whole document.
/// This is deliberately a two-variant enum rather than an `Option<String>`:
/// "no section" is a valid target, never to be conflated with an empty or
/// unknown name, which fail parsing outright.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum SectionTarget {
    Whole,
    Section(Section),
}

impl SectionTarget {
    pub fn parse(name: Option<&str>) -> Result<SectionTarget, TreeError> {
        match name {
            None => Ok(SectionTarget::Whole),
            Some(ROOT_TAG) => Ok(SectionTarget::Whole),
            Some(tag) => Section::from_tag(tag)
                .map(SectionTarget::Section)
                .ok_or_else(|| TreeError::UnknownSection {
                    name: tag.to_string(),
                }),
        }
    }

    pub fn section(self) -> Option<Section> {
        match self {
            SectionTarget::Whole => None,
            SectionTarget::Section(s) => Some(s),
        }
    }
}

impl fmt::Display for SectionTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SectionTarget::Whole => f.write_str(ROOT_TAG),
            SectionTarget::Section(s) => f.write_str(s.tag()),
        }
    }
}
