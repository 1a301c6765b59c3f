//! Raw block placement. Operators can append whole sections verbatim; the
//! unnamed `global` and `defaults` blocks merge into the generated sections,
//! every other kind renders as its own section after the generated ones.

use crate::config::models::{RawBlockValue, RawBlocks};
use crate::core::Section;

/// Known kinds render before unrecognized ones, in this order.
const KIND_ORDER: [&str; 6] = [
    "listen",
    "frontend",
    "backend",
    "resolvers",
    "peers",
    "mailers",
];

/// Body lines of the unnamed `global` or `defaults` block.
pub fn top_level_lines<'a>(raw: &'a RawBlocks, kind: &str) -> Option<&'a [String]> {
    raw.0.iter().find_map(|(k, value)| match value {
        RawBlockValue::Lines(lines) if k == kind => Some(lines.as_slice()),
        _ => None,
    })
}

/// All named raw blocks as sections, known kinds first in their canonical
/// order, then the rest in declaration order.
pub fn grouped_sections(raw: &RawBlocks) -> Vec<Section> {
    let mut sections = Vec::new();
    for kind in KIND_ORDER {
        for (k, value) in &raw.0 {
            if k == kind {
                push_kind(&mut sections, k, value);
            }
        }
    }
    for (k, value) in &raw.0 {
        if k == "global" || k == "defaults" || KIND_ORDER.contains(&k.as_str()) {
            continue;
        }
        push_kind(&mut sections, k, value);
    }
    sections
}

fn push_kind(sections: &mut Vec<Section>, kind: &str, value: &RawBlockValue) {
    match value {
        RawBlockValue::Lines(lines) => {
            let mut section = Section::new(kind);
            section.extend(lines.iter().cloned());
            sections.push(section);
        }
        RawBlockValue::Named(blocks) => {
            for (id, lines) in blocks {
                let mut section = Section::new(format!("{kind} {id}"));
                section.extend(lines.iter().cloned());
                sections.push(section);
            }
        }
    }
}
