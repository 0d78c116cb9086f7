//! Source snippet rendering for validation diagnostics.
//!
//! Uses `annotate-snippets` to render compiler-like diagnostic output,
//! pointing to the exact location of problems in a demo document.

use std::ops::Range;

use annotate_snippets::{Level, Message, Renderer, Snippet};
use bon::Builder;
use derive_more::AsRef;
use serde::Serialize;

use crate::validate::{Report, Severity};

/// Demo source to be annotated.
#[derive(Debug, Clone, PartialEq, Eq, AsRef)]
pub struct Source(String);

impl Source {
    /// Annotate the source with the diagnostics in a report.
    ///
    /// Diagnostics with a location point into the source; the rest are listed
    /// as footers.
    ///
    /// # Examples
    ///
    /// Produces output similar to Rust compiler diagnostics:
    ///
    /// ```text
    /// error: 1 error, 1 warning
    ///   --> demos/notepad.txt:7:12
    ///    |
    ///  7 |    ACTION: CLICK(x=abc, y=0.5)
    ///    |            ^^^^^^^^^^^^^^^^^^^ invalid CLICK format, ...
    ///    |
    ///    = warning: missing optional section EXPECTED_OUTCOME:
    /// ```
    pub fn annotate(&self, origin: &str, report: &Report, styled: bool) -> String {
        let diagnostics = report.diagnostics().collect::<Vec<_>>();
        let title = summary(report);
        let level = if report.errors.is_empty() {
            Level::Warning
        } else {
            Level::Error
        };

        let annotations = diagnostics
            .iter()
            .filter_map(|d| d.span.as_ref().map(|span| (d, span)))
            .filter(|(_, span)| span.end <= self.0.len())
            .map(|(d, span)| level_of(d.severity).span(span.range()).label(&d.message));

        let footers = diagnostics
            .iter()
            .filter(|d| d.span.as_ref().is_none_or(|span| span.end > self.0.len()))
            .map(|d| level_of(d.severity).title(&d.message));

        let mut message: Message<'_> = level.title(&title);
        if diagnostics.iter().any(|d| d.span.is_some()) {
            let snippet = Snippet::source(self.0.as_ref())
                .origin(origin)
                .fold(true)
                .annotations(annotations);
            message = message.snippet(snippet);
        }
        let message = message.footers(footers);

        let renderer = if styled {
            Renderer::styled()
        } else {
            Renderer::plain()
        };
        renderer.render(message).to_string()
    }
}

impl<S: Into<String>> From<S> for Source {
    fn from(source: S) -> Self {
        Self(source.into())
    }
}

fn level_of(severity: Severity) -> Level {
    match severity {
        Severity::Error => Level::Error,
        Severity::Warning => Level::Warning,
    }
}

fn summary(report: &Report) -> String {
    let plural = |n: usize, word: &str| {
        if n == 1 {
            format!("{n} {word}")
        } else {
            format!("{n} {word}s")
        }
    };
    format!(
        "{}, {}",
        plural(report.errors.len(), "error"),
        plural(report.warnings.len(), "warning")
    )
}

/// A byte range in source content.
#[derive(Debug, Clone, PartialEq, Eq, Builder, Serialize)]
pub struct Span {
    /// Start byte offset.
    pub start: usize,

    /// End byte offset.
    pub end: usize,
}

impl Span {
    /// View the span as a `Range<usize>`.
    pub fn range(&self) -> Range<usize> {
        self.start..self.end
    }
}

impl From<Range<usize>> for Span {
    fn from(range: Range<usize>) -> Self {
        Self {
            start: range.start,
            end: range.end,
        }
    }
}
