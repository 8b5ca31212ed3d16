use crate::utils::error::{PatchError, Result};
use crate::utils::validation::{self, Validate};
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

/// Which edit a job performs on the source document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditSpec {
    /// Replace everything from the start marker (inclusive) up to the end
    /// marker (exclusive) with the replacement block.
    Splice {
        start_marker: String,
        end_marker: String,
    },
    /// Insert the replacement block directly after the anchor.
    InsertAfter { marker: String },
    /// Insert the replacement block directly before the anchor.
    InsertBefore { marker: String },
    /// Replace the first match of a regular expression with the replacement
    /// block, taken literally.
    Pattern { pattern: String },
}

impl EditSpec {
    pub fn mode_name(&self) -> &'static str {
        match self {
            EditSpec::Splice { .. } => "splice",
            EditSpec::InsertAfter { .. } => "insert-after",
            EditSpec::InsertBefore { .. } => "insert-before",
            EditSpec::Pattern { .. } => "pattern",
        }
    }
}

/// Where the replacement block comes from. Content is opaque to the patcher;
/// no validation of the payload is ever performed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplacementSource {
    File(PathBuf),
    Literal(String),
}

impl ReplacementSource {
    /// Loads the replacement text, optionally trimming surrounding
    /// whitespace (payload files tend to carry a trailing newline).
    pub fn resolve(&self, trim: bool) -> Result<String> {
        let raw = match self {
            ReplacementSource::File(path) => {
                fs::read_to_string(path).map_err(|source| PatchError::ReplacementReadError {
                    path: path.clone(),
                    source,
                })?
            }
            ReplacementSource::Literal(text) => text.clone(),
        };
        if trim {
            Ok(raw.trim().to_string())
        } else {
            Ok(raw)
        }
    }
}

/// One unit of patch work: read `input`, apply `edit`, write `output`.
#[derive(Debug, Clone)]
pub struct PatchJob {
    pub name: String,
    pub input: PathBuf,
    pub output: PathBuf,
    pub edit: EditSpec,
    pub replacement: ReplacementSource,
    pub trim_replacement: bool,
    pub backup: bool,
    /// Disabled jobs are kept in the plan but skipped at run time.
    pub enabled: bool,
}

impl Validate for PatchJob {
    fn validate(&self) -> Result<()> {
        validation::validate_path("input", &self.input.to_string_lossy())?;
        validation::validate_path("output", &self.output.to_string_lossy())?;
        match &self.edit {
            EditSpec::Splice {
                start_marker,
                end_marker,
            } => {
                validation::validate_non_empty_string("start_marker", start_marker)?;
                validation::validate_non_empty_string("end_marker", end_marker)?;
            }
            EditSpec::InsertAfter { marker } | EditSpec::InsertBefore { marker } => {
                validation::validate_non_empty_string("marker", marker)?;
            }
            EditSpec::Pattern { pattern } => {
                validation::validate_non_empty_string("pattern", pattern)?;
            }
        }
        if let ReplacementSource::File(path) = &self.replacement {
            validation::validate_path("replacement_file", &path.to_string_lossy())?;
        }
        Ok(())
    }
}

/// Success record for a single applied (or dry-run) job.
#[derive(Debug, Clone)]
pub struct PatchOutcome {
    pub job: String,
    pub mode: &'static str,
    pub input: PathBuf,
    pub output: PathBuf,
    pub bytes_read: usize,
    pub bytes_written: usize,
    /// Byte offset in the input where the edit begins.
    pub edit_offset: usize,
    /// How many input bytes the edit removed (zero for inserts).
    pub removed_len: usize,
    pub replacement_len: usize,
    pub backup: Option<PathBuf>,
    pub dry_run: bool,
    pub duration: Duration,
}
