//! Section model of a report artifact.
//!
//! A report is a sequence of named sections introduced by bold headings
//! (`**Name:**`). Text before the first heading is the company-info preamble.

use serde::{Deserialize, Serialize};

pub const COMPANY_INFO: &str = "Company Info";
pub const RECOMMENDATIONS: &str = "Recommendations";
pub const MATURITY_FOOTER: &str = "AI Maturity Levels";

/// The ten sections every finished report must contain, in report order.
pub const MANDATORY_SECTIONS: [&str; 10] = [
    "AI Maturity Level",
    "Current Solution Development Stage",
    "Validity of Concept and Authenticity of Problem Addressed",
    "Integration and Importance of AI in the Idea",
    "Identified Target Market and Customer Segments",
    "Data Requirement Assessment",
    "Data Collection Strategy",
    "Technical Expertise and Capability",
    "Expectations from FAIR Services",
    RECOMMENDATIONS,
];

/// Full reassembly order: preamble, mandatory sections, footer.
pub const CANONICAL_ORDER: [&str; 12] = [
    COMPANY_INFO,
    "AI Maturity Level",
    "Current Solution Development Stage",
    "Validity of Concept and Authenticity of Problem Addressed",
    "Integration and Importance of AI in the Idea",
    "Identified Target Market and Customer Segments",
    "Data Requirement Assessment",
    "Data Collection Strategy",
    "Technical Expertise and Capability",
    "Expectations from FAIR Services",
    RECOMMENDATIONS,
    MATURITY_FOOTER,
];

const COMPOSITE_SEPARATOR: &str = " / ";

/// Split a possibly composite section name (`"A / B"`) into its components.
pub fn section_targets(name: &str) -> Vec<String> {
    if name.contains(COMPOSITE_SEPARATOR) {
        name.split(COMPOSITE_SEPARATOR)
            .map(|part| part.trim().to_string())
            .filter(|part| !part.is_empty())
            .collect()
    } else {
        vec![name.to_string()]
    }
}

pub fn is_mandatory(name: &str) -> bool {
    MANDATORY_SECTIONS.contains(&name)
}

/// Returns the section name if `line` is a section heading.
pub fn heading_name(line: &str) -> Option<String> {
    let trimmed = line.trim();
    if trimmed.starts_with("**") && trimmed.ends_with(":**") {
        Some(trimmed.replace("**", "").replace(':', ""))
    } else {
        None
    }
}

/// Placeholder text used to backfill a missing mandatory section.
pub fn placeholder(name: &str) -> String {
    let body = if name == RECOMMENDATIONS {
        "No specific recommendations could be made based on the available information."
    } else {
        "Information not available from the consultation transcript."
    };
    format!("**{name}:**\n{body}")
}

/// Make sure `text` opens with the `**name:**` heading.
///
/// A missing heading is prepended and a heading naming another section is
/// replaced. The preamble carries no heading and is returned as is.
pub fn ensure_heading(name: &str, text: &str) -> String {
    let text = text.trim();
    if name == COMPANY_INFO {
        return text.to_string();
    }
    let heading = format!("**{name}:**");
    let (first, rest) = text.split_once('\n').unwrap_or((text, ""));
    match heading_name(first) {
        Some(found) if found.trim() == name => text.to_string(),
        Some(_) if rest.trim().is_empty() => heading,
        Some(_) => format!("{heading}\n{}", rest.trim_start_matches('\n')),
        None => format!("{heading}\n{text}"),
    }
}

/// One named block of the artifact, heading line included.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Section {
    pub name: String,
    pub content: String,
}

/// An artifact split into sections, kept in encounter order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SectionMap {
    sections: Vec<Section>,
}

impl SectionMap {
    /// Parse an artifact. A repeated heading replaces the earlier content but
    /// keeps its first position.
    pub fn parse(artifact: &str) -> Self {
        let mut map = Self::default();
        let mut preamble: Option<String> = None;
        let mut current: Option<(String, Vec<&str>)> = None;

        for line in artifact.split('\n') {
            if let Some(name) = heading_name(line) {
                if let Some((prev, lines)) = current.take() {
                    map.insert(prev, lines.join("\n").trim().to_string());
                }
                current = Some((name, vec![line]));
            } else if let Some((_, lines)) = current.as_mut() {
                lines.push(line);
            } else {
                match preamble.as_mut() {
                    Some(text) => {
                        text.push('\n');
                        text.push_str(line);
                    }
                    None => preamble = Some(line.to_string()),
                }
            }
        }

        if let Some((name, lines)) = current {
            map.insert(name, lines.join("\n").trim().to_string());
        }
        if let Some(text) = preamble {
            map.sections.insert(
                0,
                Section {
                    name: COMPANY_INFO.to_string(),
                    content: text,
                },
            );
        }
        map
    }

    /// Insert or replace a section's content.
    pub fn insert(&mut self, name: impl Into<String>, content: impl Into<String>) {
        let name = name.into();
        let content = content.into();
        match self.sections.iter_mut().find(|s| s.name == name) {
            Some(existing) => existing.content = content,
            None => self.sections.push(Section { name, content }),
        }
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.sections
            .iter()
            .find(|s| s.name == name)
            .map(|s| s.content.as_str())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Section> {
        self.sections.iter()
    }

    pub fn names(&self) -> Vec<&str> {
        self.sections.iter().map(|s| s.name.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.sections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }

    /// Mandatory sections with no non-empty content, in canonical order.
    pub fn missing_mandatory(&self) -> Vec<&'static str> {
        MANDATORY_SECTIONS
            .iter()
            .copied()
            .filter(|name| self.get(name).is_none_or(|c| c.trim().is_empty()))
            .collect()
    }

    /// Fill every missing mandatory section with its placeholder.
    /// Returns the names that were added.
    pub fn backfill_mandatory(&mut self) -> Vec<&'static str> {
        let missing = self.missing_mandatory();
        for name in &missing {
            tracing::debug!(section = name, "backfilling missing mandatory section");
            self.insert(*name, placeholder(name));
        }
        missing
    }

    /// Join sections back into an artifact: canonical sections first, then
    /// the rest in encounter order. Empty sections are dropped.
    pub fn reassemble(&self) -> String {
        let canonical = CANONICAL_ORDER
            .iter()
            .filter_map(|name| self.get(name));
        let extras = self
            .sections
            .iter()
            .filter(|s| !CANONICAL_ORDER.contains(&s.name.as_str()))
            .map(|s| s.content.as_str());

        canonical
            .chain(extras)
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .collect::<Vec<_>>()
            .join("\n\n")
    }
}

/// Split an artifact into its company-info preamble and the remainder,
/// which starts at the first line whose trimmed form begins with `**`.
pub fn split_company_preamble(artifact: &str) -> (&str, &str) {
    let mut offset = 0;
    for line in artifact.split_inclusive('\n') {
        if line.trim().starts_with("**") {
            return (&artifact[..offset], &artifact[offset..]);
        }
        offset += line.len();
    }
    (artifact, "")
}
