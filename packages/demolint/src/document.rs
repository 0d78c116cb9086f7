//! Demo documents: sections, steps, and their action lines.
//!
//! A demo is plain text laid out like this:
//!
//! ```text
//! TASK: Open Notepad and type a greeting
//! DOMAIN: notepad
//!
//! STEPS:
//! 1. Open the start menu
//!    ACTION: CLICK(x=0.02, y=0.98)
//! 2. Type the greeting
//!    ACTION: TYPE("hello")
//! 3. Finish
//!    ACTION: DONE()
//!
//! EXPECTED_OUTCOME: Notepad shows "hello"
//! ```
//!
//! Parsing is deliberately lenient: [`Demo::parse`] never fails, it records
//! what it finds so that [`crate::validate`] can report everything at once.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Serialize, Serializer};

use crate::action::{Action, ActionError};
use crate::snippet::Span;

static STEP_LABEL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^\s*(?:step\s+)?([0-9]+)\s*[.):](?:\s+|$)").expect("valid regex")
});

static ACTION_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*(?:[-*]\s*)?ACTION:[ \t]*(.*)$").expect("valid regex")
});

/// The top-level sections of a demo, in their expected order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Section {
    Task,
    Domain,
    Steps,
    ExpectedOutcome,
}

impl Section {
    /// All sections in expected document order.
    pub const ALL: [Section; 4] = [
        Section::Task,
        Section::Domain,
        Section::Steps,
        Section::ExpectedOutcome,
    ];

    /// Sections whose absence makes a demo invalid.
    pub const REQUIRED: [Section; 3] = [Section::Task, Section::Domain, Section::Steps];

    /// The header marker that opens the section.
    pub fn marker(self) -> &'static str {
        match self {
            Section::Task => "TASK:",
            Section::Domain => "DOMAIN:",
            Section::Steps => "STEPS:",
            Section::ExpectedOutcome => "EXPECTED_OUTCOME:",
        }
    }

    /// Whether the section must be present.
    pub fn is_required(self) -> bool {
        Self::REQUIRED.contains(&self)
    }

    fn detect(line: &str) -> Option<Self> {
        let trimmed = line.trim_start();
        Self::ALL
            .into_iter()
            .find(|section| trimmed.starts_with(section.marker()))
    }
}

/// One occurrence of a section header and the text it introduces.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SectionBlock {
    pub section: Section,

    /// 1-indexed line of the header.
    pub line: usize,

    /// The header line, trimmed.
    #[serde(skip)]
    pub span: Span,

    /// Text after the marker, continuing until the next header.
    pub body: String,
}

/// A numbered (or implicit) step in the `STEPS:` section.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Step {
    /// The step number as written, if the step was written with one.
    pub label: Option<String>,

    /// 1-indexed line where the step starts.
    pub line: usize,

    #[serde(skip)]
    pub span: Span,

    /// The `ACTION:` lines that belong to the step.
    pub actions: Vec<ActionLine>,
}

/// A single `ACTION:` line.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ActionLine {
    /// 1-indexed line number.
    pub line: usize,

    /// The full source line, trimmed, for diagnostics.
    pub line_text: String,

    /// The text after `ACTION:`.
    pub text: String,

    /// The byte range of the action text, or of the whole line if the action
    /// text is empty.
    #[serde(skip)]
    pub span: Span,

    /// The parse result for `text`.
    #[serde(serialize_with = "serialize_parsed")]
    pub parsed: Result<Action, ActionError>,
}

impl ActionLine {
    /// The parsed action, if it parsed.
    pub fn action(&self) -> Option<&Action> {
        self.parsed.as_ref().ok()
    }
}

/// A parsed demo document.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Demo {
    #[serde(skip)]
    source: String,

    /// Every section header, in document order.
    pub sections: Vec<SectionBlock>,

    /// Steps in document order.
    pub steps: Vec<Step>,
}

impl Step {
    /// The step label as a number. `None` if unlabelled or too large to count.
    pub fn number(&self) -> Option<usize> {
        self.label.as_deref().and_then(|label| label.parse().ok())
    }
}

impl Demo {
    /// Parse a demo document.
    #[tracing::instrument(skip_all)]
    pub fn parse(source: impl Into<String>) -> Self {
        let source = source.into();
        let lines = lines_with_offsets(&source);

        // Without a STEPS: header, action lines anywhere still get collected.
        let has_steps_header = lines
            .iter()
            .any(|(_, text)| Section::detect(text) == Some(Section::Steps));

        let mut sections = Vec::<SectionBlock>::new();
        let mut steps = Vec::<Step>::new();
        let mut in_steps = !has_steps_header;

        for (index, &(offset, text)) in lines.iter().enumerate() {
            let line = index + 1;

            if let Some(section) = Section::detect(text) {
                let marker_at = text.find(section.marker()).unwrap_or_default();
                let body = text[marker_at + section.marker().len()..].trim();
                sections.push(SectionBlock {
                    section,
                    line,
                    span: trimmed_span(offset, text),
                    body: body.to_string(),
                });
                in_steps = !has_steps_header || section == Section::Steps;
                continue;
            }

            if let Some(current) = sections.last_mut() {
                if current.section != Section::Steps && !text.trim().is_empty() {
                    if !current.body.is_empty() {
                        current.body.push('\n');
                    }
                    current.body.push_str(text.trim());
                }
            }

            if !in_steps {
                continue;
            }

            let mut rest = text;
            let mut rest_offset = offset;
            if let Some(captures) = STEP_LABEL.captures(text) {
                let whole = captures.get(0).map_or(0, |m| m.end());
                steps.push(Step {
                    label: Some(captures[1].to_string()),
                    line,
                    span: trimmed_span(offset, text),
                    actions: Vec::new(),
                });
                rest = &text[whole..];
                rest_offset = offset + whole;
            }

            let Some(captures) = ACTION_LINE.captures(rest) else {
                continue;
            };
            let action_text = captures.get(1).map_or("", |m| m.as_str());
            let action_start = rest_offset + captures.get(1).map_or(0, |m| m.start());
            let trimmed = action_text.trim_end();
            let span = if trimmed.is_empty() {
                trimmed_span(offset, text)
            } else {
                Span::from(action_start..action_start + trimmed.len())
            };

            let action = ActionLine {
                line,
                line_text: text.trim().to_string(),
                text: trimmed.to_string(),
                span,
                parsed: Action::parse(trimmed),
            };

            match steps.last_mut() {
                Some(step) if step.label.is_some() => step.actions.push(action),
                _ => steps.push(Step {
                    label: None,
                    line,
                    span: trimmed_span(offset, text),
                    actions: vec![action],
                }),
            }
        }

        tracing::debug!(sections = sections.len(), steps = steps.len(), "parsed demo");
        Self {
            source,
            sections,
            steps,
        }
    }

    /// The original document text.
    pub fn source(&self) -> &str {
        &self.source
    }

    /// The first occurrence of a section.
    pub fn section(&self, section: Section) -> Option<&SectionBlock> {
        self.sections.iter().find(|block| block.section == section)
    }

    /// Every occurrence of a section.
    pub fn occurrences(&self, section: Section) -> impl Iterator<Item = &SectionBlock> {
        self.sections
            .iter()
            .filter(move |block| block.section == section)
    }

    /// The task description, if present.
    pub fn task(&self) -> Option<&str> {
        self.section(Section::Task).map(|block| block.body.as_str())
    }

    /// The domain, if present.
    pub fn domain(&self) -> Option<&str> {
        self.section(Section::Domain).map(|block| block.body.as_str())
    }

    /// Every action line across all steps, in document order.
    pub fn actions(&self) -> impl Iterator<Item = &ActionLine> {
        self.steps.iter().flat_map(|step| step.actions.iter())
    }
}

/// Split text into lines, keeping the byte offset of each line start.
/// Line terminators (`\n` or `\r\n`) are not part of the returned text.
fn lines_with_offsets(source: &str) -> Vec<(usize, &str)> {
    let mut offset = 0;
    source
        .split_inclusive('\n')
        .map(|raw| {
            let start = offset;
            offset += raw.len();
            let text = raw.strip_suffix('\n').unwrap_or(raw);
            let text = text.strip_suffix('\r').unwrap_or(text);
            (start, text)
        })
        .collect()
}

/// The span of a line with surrounding whitespace removed.
fn trimmed_span(offset: usize, text: &str) -> Span {
    let leading = text.len() - text.trim_start().len();
    let start = offset + leading;
    Span::builder()
        .start(start)
        .end(start + text.trim().len())
        .build()
}

fn serialize_parsed<S: Serializer>(
    parsed: &Result<Action, ActionError>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    #[derive(Serialize)]
    #[serde(untagged)]
    enum Parsed<'a> {
        Action(&'a Action),
        Error { error: String },
    }

    match parsed {
        Ok(action) => Parsed::Action(action).serialize(serializer),
        Err(error) => Parsed::Error {
            error: error.to_string(),
        }
        .serialize(serializer),
    }
}
