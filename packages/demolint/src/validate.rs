//! Validation of demo documents against the action grammar.
//!
//! Validation collects every problem it finds into a [`Report`] rather than
//! stopping at the first one. Errors make a demo invalid; warnings are
//! informational and never affect validity.

use std::fmt;

use itertools::Itertools;
use serde::Serialize;

use crate::action::{Action, ActionError};
use crate::document::{ActionLine, Demo, Section};
use crate::settings::Settings;
use crate::snippet::Span;

/// How serious a diagnostic is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Error,
    Warning,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Error => f.write_str("error"),
            Severity::Warning => f.write_str("warning"),
        }
    }
}

/// The check that produced a diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Check {
    MissingSection,
    DuplicateSection,
    SectionOrder,
    EmptySection,
    StepSequence,
    StepAction,
    NoActions,
    UnknownAction,
    MalformedAction,
    CoordinateRange,
    LongWait,
    EmptyText,
    MissingDone,
    DoneNotLast,
    FailNotLast,
    Unreadable,
}

impl Check {
    /// The snake_case code used in serialized output.
    pub fn code(self) -> &'static str {
        match self {
            Check::MissingSection => "missing_section",
            Check::DuplicateSection => "duplicate_section",
            Check::SectionOrder => "section_order",
            Check::EmptySection => "empty_section",
            Check::StepSequence => "step_sequence",
            Check::StepAction => "step_action",
            Check::NoActions => "no_actions",
            Check::UnknownAction => "unknown_action",
            Check::MalformedAction => "malformed_action",
            Check::CoordinateRange => "coordinate_range",
            Check::LongWait => "long_wait",
            Check::EmptyText => "empty_text",
            Check::MissingDone => "missing_done",
            Check::DoneNotLast => "done_not_last",
            Check::FailNotLast => "fail_not_last",
            Check::Unreadable => "unreadable",
        }
    }
}

impl fmt::Display for Check {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// A single problem found in a demo.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Diagnostic {
    pub check: Check,

    pub severity: Severity,

    pub message: String,

    /// 1-indexed line the diagnostic refers to, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line: Option<usize>,

    /// Byte range in the source the diagnostic refers to, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub span: Option<Span>,
}

impl Diagnostic {
    pub fn error(check: Check, message: impl Into<String>) -> Self {
        Self::new(Severity::Error, check, message)
    }

    pub fn warning(check: Check, message: impl Into<String>) -> Self {
        Self::new(Severity::Warning, check, message)
    }

    fn new(severity: Severity, check: Check, message: impl Into<String>) -> Self {
        Self {
            check,
            severity,
            message: message.into(),
            line: None,
            span: None,
        }
    }

    /// Attach a source location.
    pub fn at(mut self, line: usize, span: impl Into<Span>) -> Self {
        self.line = Some(line);
        self.span = Some(span.into());
        self
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.line {
            Some(line) => write!(f, "line {line}: {}", self.message),
            None => f.write_str(&self.message),
        }
    }
}

/// The result of validating one demo.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Report {
    pub is_valid: bool,
    pub errors: Vec<Diagnostic>,
    pub warnings: Vec<Diagnostic>,
}

impl Report {
    /// A report for a document that couldn't be read.
    pub fn unreadable(message: impl Into<String>) -> Self {
        Diagnostics::default()
            .with(Diagnostic::error(Check::Unreadable, message))
            .into_report()
    }

    /// Error messages, in the order they were found.
    pub fn error_messages(&self) -> Vec<String> {
        self.errors.iter().map(ToString::to_string).collect()
    }

    /// Warning messages, in the order they were found.
    pub fn warning_messages(&self) -> Vec<String> {
        self.warnings.iter().map(ToString::to_string).collect()
    }

    /// All diagnostics ordered by line; diagnostics without a line come first.
    pub fn diagnostics(&self) -> impl Iterator<Item = &Diagnostic> {
        self.errors
            .iter()
            .chain(self.warnings.iter())
            .sorted_by_key(|d| (d.line, d.severity))
    }

    /// Whether any diagnostic came from the given check.
    pub fn has(&self, check: Check) -> bool {
        self.errors
            .iter()
            .chain(self.warnings.iter())
            .any(|d| d.check == check)
    }
}

/// Per-call accumulator; a fresh one is created for every validation.
#[derive(Debug, Default)]
struct Diagnostics {
    errors: Vec<Diagnostic>,
    warnings: Vec<Diagnostic>,
}

impl Diagnostics {
    fn push(&mut self, diagnostic: Diagnostic) {
        match diagnostic.severity {
            Severity::Error => self.errors.push(diagnostic),
            Severity::Warning => self.warnings.push(diagnostic),
        }
    }

    fn with(mut self, diagnostic: Diagnostic) -> Self {
        self.push(diagnostic);
        self
    }

    fn into_report(self) -> Report {
        Report {
            is_valid: self.errors.is_empty(),
            errors: self.errors,
            warnings: self.warnings,
        }
    }
}

/// Validate a demo document with default settings.
pub fn validate(document: &str) -> Report {
    Validator::default().validate(document)
}

/// Validates demo documents with a fixed set of settings.
#[derive(Debug, Clone, Default)]
pub struct Validator {
    settings: Settings,
}

impl Validator {
    pub fn new(settings: Settings) -> Self {
        Self { settings }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Parse and validate a demo document.
    pub fn validate(&self, document: &str) -> Report {
        self.validate_demo(&Demo::parse(document))
    }

    /// Validate an already parsed demo.
    #[tracing::instrument(skip_all)]
    pub fn validate_demo(&self, demo: &Demo) -> Report {
        let mut diagnostics = Diagnostics::default();

        check_sections(demo, &mut diagnostics);
        check_steps(demo, &mut diagnostics);
        for action in demo.actions() {
            self.check_action(action, &mut diagnostics);
        }
        check_termination(demo, &mut diagnostics);

        let report = diagnostics.into_report();
        tracing::debug!(
            errors = report.errors.len(),
            warnings = report.warnings.len(),
            "validated demo"
        );
        report
    }

    fn check_action(&self, line: &ActionLine, diagnostics: &mut Diagnostics) {
        let verbatim = &line.line_text;
        let action = match &line.parsed {
            Ok(action) => action,
            Err(error @ ActionError::UnknownKeyword(_)) => {
                diagnostics.push(
                    Diagnostic::error(Check::UnknownAction, format!("{error}: `{verbatim}`"))
                        .at(line.line, line.span.clone()),
                );
                return;
            }
            Err(error) => {
                diagnostics.push(
                    Diagnostic::error(Check::MalformedAction, format!("{error}: `{verbatim}`"))
                        .at(line.line, line.span.clone()),
                );
                return;
            }
        };

        for (label, point) in action.points() {
            if !point.is_normalized() {
                diagnostics.push(
                    Diagnostic::warning(
                        Check::CoordinateRange,
                        format!(
                            "{} {label} {point} outside normalized range [0, 1]: `{verbatim}`",
                            action.kind()
                        ),
                    )
                    .at(line.line, line.span.clone()),
                );
            }
        }

        match action {
            Action::Wait { seconds } if *seconds > self.settings.max_wait_seconds => {
                diagnostics.push(
                    Diagnostic::warning(
                        Check::LongWait,
                        format!(
                            "WAIT of {seconds}s exceeds {}s: `{verbatim}`",
                            self.settings.max_wait_seconds
                        ),
                    )
                    .at(line.line, line.span.clone()),
                );
            }
            Action::Type { text } if text.is_empty() => {
                diagnostics.push(
                    Diagnostic::warning(Check::EmptyText, format!("TYPE with empty text: `{verbatim}`"))
                        .at(line.line, line.span.clone()),
                );
            }
            _ => {}
        }
    }
}

fn check_sections(demo: &Demo, diagnostics: &mut Diagnostics) {
    for section in Section::ALL {
        let mut occurrences = demo.occurrences(section);
        let Some(first) = occurrences.next() else {
            let diagnostic = if section.is_required() {
                Diagnostic::error(
                    Check::MissingSection,
                    format!("missing required section {}", section.marker()),
                )
            } else {
                Diagnostic::warning(
                    Check::MissingSection,
                    format!("missing optional section {}", section.marker()),
                )
            };
            diagnostics.push(diagnostic);
            continue;
        };

        for duplicate in occurrences {
            diagnostics.push(
                Diagnostic::warning(
                    Check::DuplicateSection,
                    format!(
                        "section {} appears again (first on line {})",
                        section.marker(),
                        first.line
                    ),
                )
                .at(duplicate.line, duplicate.span.clone()),
            );
        }

        if matches!(section, Section::Task | Section::Domain) && first.body.is_empty() {
            diagnostics.push(
                Diagnostic::warning(
                    Check::EmptySection,
                    format!("section {} is empty", section.marker()),
                )
                .at(first.line, first.span.clone()),
            );
        }
    }

    let found = Section::ALL
        .into_iter()
        .filter_map(|section| demo.section(section))
        .sorted_by_key(|block| block.line)
        .collect_vec();
    let out_of_order = found
        .iter()
        .tuple_windows()
        .find(|(a, b)| a.section > b.section);
    if let Some((_, misplaced)) = out_of_order {
        let found = found.iter().map(|block| block.section.marker()).join(", ");
        let expected = Section::ALL.iter().map(|s| s.marker()).join(", ");
        diagnostics.push(
            Diagnostic::warning(
                Check::SectionOrder,
                format!("sections out of order: found {found}; expected {expected}"),
            )
            .at(misplaced.line, misplaced.span.clone()),
        );
    }
}

fn check_steps(demo: &Demo, diagnostics: &mut Diagnostics) {
    let labeled = demo
        .steps
        .iter()
        .filter_map(|step| step.label.as_deref().map(|label| (label, step)))
        .collect_vec();

    let expected = 1..=labeled.len();
    let first_mismatch = labeled
        .iter()
        .zip(expected.clone())
        .find(|((_, step), want)| step.number() != Some(*want));
    if let Some(((_, misplaced), _)) = first_mismatch {
        let found = labeled.iter().map(|(label, _)| label).join(", ");
        let expected = expected.map(|n| n.to_string()).join(", ");
        diagnostics.push(
            Diagnostic::error(
                Check::StepSequence,
                format!("step numbers are not sequential: found [{found}], expected [{expected}]"),
            )
            .at(misplaced.line, misplaced.span.clone()),
        );
    }

    for (label, step) in labeled {
        match step.actions.as_slice() {
            [] => diagnostics.push(
                Diagnostic::error(Check::StepAction, format!("step {label} has no ACTION line"))
                    .at(step.line, step.span.clone()),
            ),
            [_] => {}
            [_, extra, ..] => diagnostics.push(
                Diagnostic::error(
                    Check::StepAction,
                    format!(
                        "step {label} has {} ACTION lines, expected exactly one",
                        step.actions.len()
                    ),
                )
                .at(extra.line, extra.span.clone()),
            ),
        }
    }

    if demo.actions().next().is_none() {
        diagnostics.push(Diagnostic::error(Check::NoActions, "no ACTION lines found"));
    }
}

fn check_termination(demo: &Demo, diagnostics: &mut Diagnostics) {
    let actions = demo.actions().collect_vec();
    let last = actions.len().saturating_sub(1);

    let ends_with_done = actions
        .last()
        .is_some_and(|line| line.action() == Some(&Action::Done));
    let has_done = actions.iter().any(|line| line.action() == Some(&Action::Done));
    if !has_done {
        diagnostics.push(Diagnostic::error(
            Check::MissingDone,
            "demo must end with DONE()",
        ));
    }

    for (index, line) in actions.iter().enumerate() {
        if index == last {
            continue;
        }
        match line.action() {
            Some(Action::Done) => diagnostics.push(
                Diagnostic::warning(
                    Check::DoneNotLast,
                    if ends_with_done {
                        "DONE() appears before the final action".to_string()
                    } else {
                        "DONE() is not the last action".to_string()
                    },
                )
                .at(line.line, line.span.clone()),
            ),
            Some(Action::Fail) => diagnostics.push(
                Diagnostic::warning(Check::FailNotLast, "FAIL() is not the last action")
                    .at(line.line, line.span.clone()),
            ),
            _ => {}
        }
    }
}
