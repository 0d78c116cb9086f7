//! Validating many demo documents at once.
//!
//! Each document is validated independently; a document that fails to read or
//! validate never affects the others.

use std::collections::BTreeMap;
use std::fs::read_to_string;
use std::path::{Path, PathBuf};

use color_eyre::eyre::{Context, Result};
use glob::Pattern;
use itertools::Itertools;
use rayon::prelude::*;
use serde::Serialize;
use walkdir::WalkDir;

use crate::settings::Settings;
use crate::validate::{Report, Validator};

/// The validation result for one document in a batch.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DocumentReport {
    pub path: PathBuf,

    /// The document text, if it could be read.
    #[serde(skip)]
    pub source: Option<String>,

    #[serde(flatten)]
    pub report: Report,
}

/// The results of validating a batch of documents.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BatchReport {
    documents: BTreeMap<String, DocumentReport>,
    passed: usize,
    failed: usize,
}

impl BatchReport {
    fn from_documents(documents: BTreeMap<String, DocumentReport>) -> Self {
        let passed = documents.values().filter(|d| d.report.is_valid).count();
        let failed = documents.len() - passed;
        Self {
            documents,
            passed,
            failed,
        }
    }

    /// Per-document results keyed by document identifier, sorted.
    pub fn documents(&self) -> &BTreeMap<String, DocumentReport> {
        &self.documents
    }

    /// Look up a document by identifier.
    pub fn get(&self, id: &str) -> Option<&DocumentReport> {
        self.documents.get(id)
    }

    pub fn passed(&self) -> usize {
        self.passed
    }

    pub fn failed(&self) -> usize {
        self.failed
    }

    pub fn total(&self) -> usize {
        self.documents.len()
    }

    /// Whether every document in the batch is valid.
    pub fn is_valid(&self) -> bool {
        self.failed == 0
    }
}

/// A document scheduled for validation.
#[derive(Debug, Clone)]
struct Entry {
    id: String,
    path: PathBuf,
}

/// Validate every matching document in a directory.
#[tracing::instrument(skip(settings))]
pub fn validate_dir(dir: &Path, settings: &Settings) -> Result<BatchReport> {
    let entries = collect_dir(dir, settings)?;
    Ok(run(entries, settings))
}

/// Validate a mix of files and directories as a single batch.
///
/// Directories are expanded like [`validate_dir`]. Files are validated
/// regardless of the pattern and are identified by their file stem. Paths
/// that don't exist show up as unreadable documents.
#[tracing::instrument(skip(settings))]
pub fn validate_paths(paths: &[PathBuf], settings: &Settings) -> Result<BatchReport> {
    let mut entries = Vec::new();
    for path in paths {
        if path.is_dir() {
            entries.extend(collect_dir(path, settings)?);
        } else {
            if !path.exists() {
                tracing::warn!(?path, "path does not exist");
            }
            entries.push(Entry {
                id: stem(path),
                path: path.clone(),
            });
        }
    }
    Ok(run(entries, settings))
}

/// Validate one file on disk. Read failures become an unreadable report.
#[tracing::instrument(skip(validator))]
pub fn validate_file(validator: &Validator, path: &Path) -> Report {
    read_and_validate(validator, path).1
}

fn read_and_validate(validator: &Validator, path: &Path) -> (Option<String>, Report) {
    match read_to_string(path) {
        Ok(content) => {
            let report = validator.validate(&content);
            (Some(content), report)
        }
        Err(error) => {
            tracing::warn!(?path, %error, "could not read document");
            let report = Report::unreadable(format!("could not read {}: {error}", path.display()));
            (None, report)
        }
    }
}

fn run(entries: Vec<Entry>, settings: &Settings) -> BatchReport {
    let validator = Validator::new(settings.clone());
    let reports = entries
        .into_par_iter()
        .map(|entry| {
            let (source, report) = read_and_validate(&validator, &entry.path);
            (entry, source, report)
        })
        .collect::<Vec<_>>();

    let mut documents = BTreeMap::new();
    for (entry, source, report) in reports {
        let id = unique_id(&documents, entry.id, &entry.path);
        documents.insert(
            id,
            DocumentReport {
                path: entry.path,
                source,
                report,
            },
        );
    }

    let batch = BatchReport::from_documents(documents);
    tracing::info!(
        total = batch.total(),
        passed = batch.passed(),
        failed = batch.failed(),
        "validated batch"
    );
    batch
}

/// Identifiers drop the extension. If that makes two documents collide, the
/// later one falls back to its full path, then to a numbered full path.
fn unique_id(documents: &BTreeMap<String, DocumentReport>, id: String, path: &Path) -> String {
    if !documents.contains_key(&id) {
        return id;
    }
    let full = path.to_string_lossy().replace('\\', "/");
    if !documents.contains_key(&full) {
        return full;
    }
    (2..)
        .map(|n| format!("{full}#{n}"))
        .find(|candidate| !documents.contains_key(candidate))
        .unwrap_or(full)
}

/// Find the documents in a directory that match the configured pattern.
fn collect_dir(dir: &Path, settings: &Settings) -> Result<Vec<Entry>> {
    let pattern = Pattern::new(&settings.pattern)
        .with_context(|| format!("invalid glob pattern: {}", settings.pattern))?;
    let max_depth = if settings.recursive { usize::MAX } else { 1 };

    let mut entries = Vec::new();
    for entry in WalkDir::new(dir)
        .min_depth(1)
        .max_depth(max_depth)
        .sort_by_file_name()
    {
        let entry = match entry {
            Ok(entry) => entry,
            Err(error) => {
                tracing::warn!(?error, ?dir, "walking directory");
                continue;
            }
        };

        if !entry.file_type().is_file() {
            continue;
        }
        let name = entry.file_name().to_string_lossy();
        if !pattern.matches(&name) {
            tracing::debug!(path = ?entry.path(), "skipping file (pattern mismatch)");
            continue;
        }

        let relative = entry.path().strip_prefix(dir).unwrap_or(entry.path());
        entries.push(Entry {
            id: identifier(relative),
            path: entry.into_path(),
        });
    }

    tracing::debug!(count = entries.len(), ?dir, "collected documents");
    Ok(entries)
}

/// A `/`-separated relative path without the file extension.
fn identifier(relative: &Path) -> String {
    let parent = relative
        .parent()
        .into_iter()
        .flat_map(|parent| parent.components())
        .map(|component| component.as_os_str().to_string_lossy().into_owned());
    parent.chain([stem(relative)]).join("/")
}

fn stem(path: &Path) -> String {
    path.file_stem()
        .unwrap_or(path.as_os_str())
        .to_string_lossy()
        .into_owned()
}
