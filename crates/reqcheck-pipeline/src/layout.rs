//! On-disk layout of subjects and their checkpoints.
//!
//! ```text
//! <root>/<subject>/guideline
//! <root>/<subject>/requirements/<name>
//! <root>/<subject>/<model>_criteria.json
//! <root>/<subject>/<model>_criteria_filtered.json
//! <root>/<subject>/analysis/<model>/<name>_feedback.json
//! <root>/<subject>/analysis/<model>/<name>_improved
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use reqcheck_core::{ReqcheckError, Result};

/// A requirement input file.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct RequirementFile {
    /// File name, used to key the requirement's checkpoints.
    pub name: String,
    pub path: PathBuf,
}

/// Deterministic checkpoint paths keyed by (subject, model[, requirement]).
#[derive(Debug, Clone)]
pub struct CheckpointLayout {
    root: PathBuf,
}

impl CheckpointLayout {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn subject_dir(&self, subject: &str) -> PathBuf {
        self.root.join(subject)
    }

    pub fn guideline(&self, subject: &str) -> PathBuf {
        self.subject_dir(subject).join("guideline")
    }

    pub fn requirements_dir(&self, subject: &str) -> PathBuf {
        self.subject_dir(subject).join("requirements")
    }

    pub fn criteria(&self, subject: &str, model: &str) -> PathBuf {
        self.subject_dir(subject)
            .join(format!("{}_criteria.json", model_slug(model)))
    }

    pub fn filtered_criteria(&self, subject: &str, model: &str) -> PathBuf {
        self.subject_dir(subject)
            .join(format!("{}_criteria_filtered.json", model_slug(model)))
    }

    pub fn analysis_dir(&self, subject: &str, model: &str) -> PathBuf {
        self.subject_dir(subject)
            .join("analysis")
            .join(model_slug(model))
    }

    pub fn feedback(&self, subject: &str, model: &str, requirement: &str) -> PathBuf {
        self.analysis_dir(subject, model)
            .join(format!("{requirement}_feedback.json"))
    }

    pub fn improved(&self, subject: &str, model: &str, requirement: &str) -> PathBuf {
        self.analysis_dir(subject, model)
            .join(format!("{requirement}_improved"))
    }

    /// Regular files in the subject's requirement directory, sorted by name.
    pub fn list_requirements(&self, subject: &str) -> Result<Vec<RequirementFile>> {
        let dir = self.requirements_dir(subject);
        let entries = fs::read_dir(&dir).map_err(|e| ReqcheckError::io(&dir, e))?;

        let mut files = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| ReqcheckError::io(&dir, e))?;
            let path = entry.path();
            // follows symlinks
            if !path.is_file() {
                continue;
            }
            files.push(RequirementFile {
                name: entry.file_name().to_string_lossy().into_owned(),
                path,
            });
        }
        files.sort();
        Ok(files)
    }
}

/// Make a model identifier usable as a single path component.
///
/// Percent-escapes `%`, `/`, `\` and `:`, so distinct identifiers never share
/// a slug.
pub fn model_slug(model: &str) -> String {
    let mut slug = String::with_capacity(model.len());
    for c in model.chars() {
        match c {
            '%' => slug.push_str("%25"),
            '/' => slug.push_str("%2F"),
            '\\' => slug.push_str("%5C"),
            ':' => slug.push_str("%3A"),
            c => slug.push(c),
        }
    }
    slug
}
