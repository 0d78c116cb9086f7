//! Validation for scripted GUI-automation demos, used by the `demolint` CLI.
//!
//! A demo is a plain-text walkthrough (`TASK:`, `DOMAIN:`, `STEPS:`,
//! `EXPECTED_OUTCOME:`) whose steps each carry one action from a small
//! grammar such as `CLICK(x=0.5, y=0.5)` or `TYPE("hello")`. Agents replay
//! demos as conditioning context, so malformed demos are caught here first.

pub mod action;
pub mod batch;
pub mod document;
pub mod settings;
pub mod snippet;
pub mod validate;

pub use crate::action::{Action, ActionError, ActionKind};
pub use crate::batch::{BatchReport, DocumentReport, validate_dir, validate_paths};
pub use crate::document::{Demo, Section};
pub use crate::settings::Settings;
pub use crate::validate::{Check, Diagnostic, Report, Severity, Validator, validate};
