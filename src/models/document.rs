//! Typed representation of a generated printer configuration.
//!
//! Generators build [`ConfigBlock`]s, group them into [`GeneratedSection`]s
//! tagged with a [`SectionKind`], and the assembler orders the sections by
//! kind. Text only exists after [`ConfigurationDocument::render`].

use serde::{Deserialize, Serialize};
use std::fmt::{self, Display, Write as _};

/// Indentation used for macro bodies.
const SCRIPT_INDENT: &str = "    ";

/// One line inside a config block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Line {
    /// `key: value`
    KeyValue {
        /// Option name
        key: String,
        /// Rendered value
        value: String,
    },
    /// Multi-line value, e.g. a G-code macro body or a point list.
    Multiline {
        /// Option name
        key: String,
        /// Value lines, indented on output
        lines: Vec<String>,
    },
    /// `#` comment
    Comment(String),
    /// Blank line
    Blank,
}

impl Line {
    fn render_into(&self, out: &mut String) {
        match self {
            Self::KeyValue { key, value } => {
                let _ = writeln!(out, "{key}: {value}");
            }
            Self::Multiline { key, lines } => {
                let _ = writeln!(out, "{key}:");
                for line in lines {
                    if line.is_empty() {
                        out.push('\n');
                    } else {
                        let _ = writeln!(out, "{SCRIPT_INDENT}{line}");
                    }
                }
            }
            Self::Comment(text) => {
                let _ = writeln!(out, "# {text}");
            }
            Self::Blank => out.push('\n'),
        }
    }
}

/// A `[header]` block with its options.
///
/// A block without a header renders its comment lines only; those are used
/// for notes appended to the document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigBlock {
    header: Option<String>,
    preamble: Vec<String>,
    lines: Vec<Line>,
}

impl ConfigBlock {
    /// Starts a block with the given header (without brackets).
    pub fn new(header: impl Into<String>) -> Self {
        Self {
            header: Some(header.into()),
            preamble: Vec::new(),
            lines: Vec::new(),
        }
    }

    /// Starts a header-less block of comment lines.
    #[must_use]
    pub fn notes<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            header: None,
            preamble: Vec::new(),
            lines: lines.into_iter().map(|l| Line::Comment(l.into())).collect(),
        }
    }

    /// Adds a `##` comment printed above the header.
    #[must_use]
    pub fn preamble(mut self, text: impl Into<String>) -> Self {
        self.preamble.push(text.into());
        self
    }

    /// Adds a `key: value` option.
    #[must_use]
    pub fn kv(mut self, key: impl Into<String>, value: impl Display) -> Self {
        self.lines.push(Line::KeyValue {
            key: key.into(),
            value: value.to_string(),
        });
        self
    }

    /// Adds a multi-line option.
    #[must_use]
    pub fn multiline<I, S>(mut self, key: impl Into<String>, lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.lines.push(Line::Multiline {
            key: key.into(),
            lines: lines.into_iter().map(Into::into).collect(),
        });
        self
    }

    /// Adds a `#` comment line inside the block.
    #[must_use]
    pub fn comment(mut self, text: impl Into<String>) -> Self {
        self.lines.push(Line::Comment(text.into()));
        self
    }

    /// Header text without brackets, if any.
    #[must_use]
    pub fn header(&self) -> Option<&str> {
        self.header.as_deref()
    }

    /// Lines of the block.
    #[must_use]
    pub fn lines(&self) -> &[Line] {
        &self.lines
    }

    /// Value of a single-line option.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.lines.iter().find_map(|line| match line {
            Line::KeyValue { key: k, value } if k == key => Some(value.as_str()),
            _ => None,
        })
    }

    /// Value lines of a multi-line option.
    #[must_use]
    pub fn get_lines(&self, key: &str) -> Option<&[String]> {
        self.lines.iter().find_map(|line| match line {
            Line::Multiline { key: k, lines } if k == key => Some(lines.as_slice()),
            _ => None,
        })
    }

    /// Whether any line (option or comment) mentions `needle`.
    #[must_use]
    pub fn mentions(&self, needle: &str) -> bool {
        self.lines.iter().any(|line| match line {
            Line::KeyValue { key, value } => key.contains(needle) || value.contains(needle),
            Line::Multiline { key, lines } => {
                key.contains(needle) || lines.iter().any(|l| l.contains(needle))
            }
            Line::Comment(text) => text.contains(needle),
            Line::Blank => false,
        })
    }

    /// Renders the block followed by a blank separator line.
    pub fn render_into(&self, out: &mut String) {
        for text in &self.preamble {
            let _ = writeln!(out, "## {text}");
        }
        if let Some(header) = &self.header {
            let _ = writeln!(out, "[{header}]");
        }
        for line in &self.lines {
            line.render_into(out);
        }
        out.push('\n');
    }
}

/// Functional area of the document, in output order.
///
/// The derived ordering is the document order; the assembler relies on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SectionKind {
    /// MCU and board declarations
    Mcu,
    /// `[printer]` kinematics and limits
    Kinematics,
    /// X and Y steppers
    XyAxes,
    /// Z steppers and leveling
    ZAxes,
    /// Extruder
    Extruder,
    /// Heated bed
    BedHeater,
    /// Probe and bed mesh
    Probe,
    /// Fans and temperature sensors
    Thermal,
    /// Homing and idle timeout
    Homing,
    /// G-code macros
    Macros,
    /// Accelerometer and resonance testing
    AccelerometerAppendix,
    /// CAN bus setup notes
    CanBusAppendix,
}

impl SectionKind {
    /// Title printed in the section banner.
    #[must_use]
    pub const fn title(self) -> &'static str {
        match self {
            Self::Mcu => "MCU",
            Self::Kinematics => "Printer kinematics",
            Self::XyAxes => "X/Y steppers",
            Self::ZAxes => "Z steppers and leveling",
            Self::Extruder => "Extruder",
            Self::BedHeater => "Bed heater",
            Self::Probe => "Probe and bed mesh",
            Self::Thermal => "Fans and temperature sensors",
            Self::Homing => "Homing",
            Self::Macros => "Macros",
            Self::AccelerometerAppendix => "Accelerometer",
            Self::CanBusAppendix => "CAN bus notes",
        }
    }

    /// Whether the section is a conditional appendix.
    #[must_use]
    pub const fn is_appendix(self) -> bool {
        matches!(self, Self::AccelerometerAppendix | Self::CanBusAppendix)
    }
}

impl Display for SectionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.title())
    }
}

/// Ordered group of blocks produced by one generator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedSection {
    /// Functional area
    pub kind: SectionKind,
    /// Blocks in output order
    pub blocks: Vec<ConfigBlock>,
}

impl GeneratedSection {
    /// Creates a section.
    #[must_use]
    pub fn new(kind: SectionKind, blocks: Vec<ConfigBlock>) -> Self {
        Self { kind, blocks }
    }

    /// Headers of every block the section defines.
    #[must_use]
    pub fn defines(&self) -> Vec<&str> {
        self.blocks.iter().filter_map(ConfigBlock::header).collect()
    }

    /// Finds a block by exact header.
    #[must_use]
    pub fn block(&self, header: &str) -> Option<&ConfigBlock> {
        self.blocks.iter().find(|b| b.header() == Some(header))
    }

    /// Renders the banner and every block.
    pub fn render_into(&self, out: &mut String) {
        let rule = "#".repeat(60);
        let _ = writeln!(out, "{rule}");
        let _ = writeln!(out, "## {}", self.kind.title());
        let _ = writeln!(out, "{rule}");
        out.push('\n');
        for block in &self.blocks {
            block.render_into(out);
        }
    }
}

/// Human-readable record of what a document was generated from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentMetadata {
    /// Printer model name
    pub printer_model: String,
    /// Bed size name
    pub bed_size: String,
    /// Control board name
    pub control_board: String,
    /// Toolhead board name
    pub toolhead_board: String,
    /// Motor kit name
    pub motor_kit: String,
    /// Probe name
    pub probe_type: String,
    /// Macro style name
    pub macro_style: String,
    /// Extruder name
    pub extruder_model: String,
    /// RFC 3339 generation timestamp
    pub generated_at: String,
    /// Catalog version the document was built from
    pub catalog_version: String,
    /// Categories that fell back to their default
    #[serde(default)]
    pub defaulted: Vec<String>,
}

/// Fully assembled configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigurationDocument {
    sections: Vec<GeneratedSection>,
    metadata: DocumentMetadata,
}

impl ConfigurationDocument {
    /// Wraps already-ordered sections. Use the assembler to build one.
    #[must_use]
    pub(crate) fn from_ordered(
        sections: Vec<GeneratedSection>,
        metadata: DocumentMetadata,
    ) -> Self {
        Self { sections, metadata }
    }

    /// Sections in output order.
    #[must_use]
    pub fn sections(&self) -> &[GeneratedSection] {
        &self.sections
    }

    /// Generation metadata.
    #[must_use]
    pub fn metadata(&self) -> &DocumentMetadata {
        &self.metadata
    }

    /// Replaces the timestamp with a fixed value for reproducible output.
    pub fn normalize_for_deterministic(&mut self) {
        self.metadata.generated_at = crate::constants::DETERMINISTIC_TIMESTAMP.to_string();
    }

    /// The section of a given kind, if present.
    #[must_use]
    pub fn section(&self, kind: SectionKind) -> Option<&GeneratedSection> {
        self.sections.iter().find(|s| s.kind == kind)
    }

    /// Every block across all sections, in output order.
    pub fn blocks(&self) -> impl Iterator<Item = &ConfigBlock> {
        self.sections.iter().flat_map(|s| s.blocks.iter())
    }

    /// Finds a block by exact header anywhere in the document.
    #[must_use]
    pub fn block(&self, header: &str) -> Option<&ConfigBlock> {
        self.blocks().find(|b| b.header() == Some(header))
    }

    /// Counts blocks whose header satisfies the predicate.
    pub fn count_blocks(&self, mut predicate: impl FnMut(&str) -> bool) -> usize {
        self.blocks()
            .filter_map(ConfigBlock::header)
            .filter(|h| predicate(h))
            .count()
    }

    /// Renders the complete `printer.cfg` text.
    #[must_use]
    pub fn render(&self) -> String {
        let m = &self.metadata;
        let mut out = String::with_capacity(16 * 1024);
        let _ = writeln!(out, "## {} {} configuration", m.printer_model, m.bed_size);
        let _ = writeln!(
            out,
            "## Generated by {} v{}",
            crate::constants::APP_NAME,
            env!("CARGO_PKG_VERSION")
        );
        let _ = writeln!(out, "## Generated at: {}", m.generated_at);
        let _ = writeln!(out, "## Catalog version: {}", m.catalog_version);
        let _ = writeln!(out, "##");
        let _ = writeln!(out, "## Control board: {}", m.control_board);
        let _ = writeln!(out, "## Toolhead board: {}", m.toolhead_board);
        let _ = writeln!(out, "## Motors: {}", m.motor_kit);
        let _ = writeln!(out, "## Extruder: {}", m.extruder_model);
        let _ = writeln!(out, "## Probe: {}", m.probe_type);
        let _ = writeln!(out, "## Macros: {}", m.macro_style);
        out.push('\n');
        for section in &self.sections {
            section.render_into(&mut out);
        }
        while out.ends_with("\n\n") {
            out.pop();
        }
        out
    }
}
