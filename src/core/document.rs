//! Section-based assembly of the generated config document.

use std::fmt::Write as _;

/// One named section of the document: a header line plus indented body lines.
#[derive(Debug, Clone, PartialEq)]
pub struct Section {
    pub header: String,
    pub lines: Vec<String>,
}

impl Section {
    pub fn new(header: impl Into<String>) -> Self {
        Section {
            header: header.into(),
            lines: Vec::new(),
        }
    }

    pub fn push(&mut self, line: impl Into<String>) {
        self.lines.push(line.into());
    }

    pub fn extend<I, S>(&mut self, lines: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for line in lines {
            self.lines.push(line.into());
        }
    }

    /// Render the section: header, then each body line indented two spaces.
    /// Trailing whitespace on body lines is dropped.
    pub fn render(&self) -> String {
        let mut out = String::new();
        out.push_str(&self.header);
        out.push('\n');
        for line in &self.lines {
            let line = format!("  {line}");
            let _ = writeln!(out, "{}", line.trim_end());
        }
        out
    }
}

/// Render a list of sections separated by blank lines, with a trailing
/// newline after the last section.
pub fn render_sections(sections: &[Section]) -> String {
    sections
        .iter()
        .map(Section::render)
        .collect::<Vec<_>>()
        .join("\n")
}
