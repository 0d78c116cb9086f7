//! Settings discovery and YAML parsing.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::{ffi::OsStr, fs::read_to_string};

use color_eyre::{
    SectionExt,
    eyre::{Context, Result},
};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use tap::Tap;

/// Name of the project-level settings file.
pub const PROJECT_FILE: &str = ".demolint.yaml";

/// Effective settings for validation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Settings {
    /// Glob matched against file names when validating a directory.
    pub pattern: String,

    /// Whether to descend into subdirectories when validating a directory.
    pub recursive: bool,

    /// `WAIT` actions longer than this many seconds produce a warning.
    pub max_wait_seconds: f64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            pattern: String::from("*.txt"),
            recursive: false,
            max_wait_seconds: 30.0,
        }
    }
}

/// A settings file; every field is optional and overrides what came before.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SettingsFile {
    pub pattern: Option<String>,
    pub recursive: Option<bool>,
    pub max_wait_seconds: Option<f64>,
}

impl Settings {
    /// Apply the fields set in a settings file on top of these settings.
    pub fn merge(mut self, file: SettingsFile) -> Self {
        if let Some(pattern) = file.pattern {
            self.pattern = pattern;
        }
        if let Some(recursive) = file.recursive {
            self.recursive = recursive;
        }
        if let Some(max_wait_seconds) = file.max_wait_seconds {
            self.max_wait_seconds = max_wait_seconds;
        }
        self
    }
}

/// Get the project directories for the application.
#[tracing::instrument]
pub fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("com", "demolint", "demolint")
}

/// The user-level settings file, if the platform has a config directory.
pub fn user_file() -> Option<PathBuf> {
    project_dirs().map(|dirs| dirs.config_dir().join("settings.yaml"))
}

/// Load settings from all sources.
///
/// Loading order (later files override earlier ones, field by field):
/// 1. Built-in defaults
/// 2. User-level settings from `ProjectDirs::config_dir()/settings.yaml`
/// 3. `.demolint.yaml` in the working directory
#[tracing::instrument]
pub fn load() -> Result<Settings> {
    let mut settings = Settings::default();

    if let Some(user_config) = user_file() {
        let file = load_from(&user_config)
            .with_context(|| format!("load settings from user config: {user_config:?}"))?;
        settings = settings.merge(file);
    }

    let project_config = Path::new(PROJECT_FILE);
    let file = load_from(project_config)
        .with_context(|| format!("load settings from project root: {project_config:?}"))?;
    Ok(settings.merge(file))
}

/// Load a single settings file. A missing file yields an empty override.
#[tracing::instrument]
pub fn load_from(path: &Path) -> Result<SettingsFile> {
    let extension = path.extension().and_then(OsStr::to_str);
    if !matches!(extension, Some("yaml" | "yml")) {
        tracing::debug!("skipping non-yaml file");
        return Ok(SettingsFile::default());
    }

    let content = match read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(SettingsFile::default()),
        Err(e) => return Err(e).context(format!("read settings file: {path:?}")),
    };

    // An empty file is a valid "no overrides" file.
    if content.trim().is_empty() {
        return Ok(SettingsFile::default());
    }

    serde_yaml::from_str::<SettingsFile>(&content)
        .with_context(|| format!("parse settings file: {path:?}"))
        .with_context(|| content.header("File content:"))
        .tap(|file| tracing::debug!(?file, "parsed settings file"))
}
