//! Section records: a typed, positioned account of the preprocessed buffer
//!
//! Sections at each nesting level are strictly increasing and
//! non-overlapping, and the top-level list covers the whole buffer. A
//! container section (region or conditional branch) spans its directive line
//! plus its subsections; a region also includes its closing directive line.

use crate::parser::parse::SuppressionEvent;

/// Target of a `#line` directive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineTarget {
    /// `#line <number> ["file"]`
    Remap { line: usize, file: Option<String> },
    /// `#line default`
    Default,
    /// `#line hidden`
    Hidden,
}

#[derive(Debug, Clone)]
pub enum SectionKind {
    /// Run of ordinary source lines.
    SourceCode,
    Define {
        symbol: String,
    },
    Undef {
        symbol: String,
    },
    /// `#region` through its matching `#endregion`.
    Region {
        name: String,
        close_message: String,
        subsections: Vec<Section>,
    },
    ErrorDirective {
        message: String,
    },
    WarningDirective {
        message: String,
    },
    Line {
        target: LineTarget,
    },
    /// `#pragma warning disable|restore [codes]`; empty codes means all.
    Pragma {
        disable: bool,
        codes: Vec<u32>,
    },
    /// `#if` branch: the directive line plus the branch content.
    If {
        condition: String,
        /// Whether the condition was actually evaluated. False once an
        /// earlier branch was taken, and everywhere inside skipped content.
        evaluated: bool,
        /// True when the branch content was excluded from the output.
        skipped: bool,
        subsections: Vec<Section>,
    },
    Elif {
        condition: String,
        evaluated: bool,
        skipped: bool,
        subsections: Vec<Section>,
    },
    Else {
        skipped: bool,
        subsections: Vec<Section>,
    },
    /// The `#endif` line closing a conditional group.
    Endif,
}

/// One span of the buffer, in character offsets.
#[derive(Debug, Clone)]
pub struct Section {
    pub start: usize,
    pub length: usize,
    /// 1-based line of the section's first character.
    pub line: usize,
    pub kind: SectionKind,
}

impl Section {
    pub fn end(&self) -> usize {
        self.start + self.length
    }

    pub fn subsections(&self) -> &[Section] {
        match &self.kind {
            SectionKind::Region { subsections, .. }
            | SectionKind::If { subsections, .. }
            | SectionKind::Elif { subsections, .. }
            | SectionKind::Else { subsections, .. } => subsections,
            _ => &[],
        }
    }
}

/// Extracts the `#pragma warning` boundaries the parser needs, in buffer
/// order. Pragmas inside skipped conditional branches have no effect.
pub fn suppression_events(sections: &[Section]) -> Vec<SuppressionEvent> {
    let mut events = Vec::new();
    collect_suppressions(sections, &mut events);
    events
}

fn collect_suppressions(sections: &[Section], events: &mut Vec<SuppressionEvent>) {
    for section in sections {
        match &section.kind {
            SectionKind::Pragma { disable, codes } => events.push(SuppressionEvent {
                offset: section.start,
                disable: *disable,
                codes: codes.clone(),
            }),
            SectionKind::If { skipped, subsections, .. }
            | SectionKind::Elif { skipped, subsections, .. }
            | SectionKind::Else { skipped, subsections, .. } => {
                if !skipped {
                    collect_suppressions(subsections, events);
                }
            }
            SectionKind::Region { subsections, .. } => {
                collect_suppressions(subsections, events);
            }
            _ => {}
        }
    }
}
