use crate::core::splice::MarkerScan;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PatchError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("failed to read input file '{}': {source}", path.display())]
    InputReadError {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to read replacement file '{}': {source}", path.display())]
    ReplacementReadError {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("could not find markers in '{}': {scan}", path.display())]
    MarkerNotFoundError { path: PathBuf, scan: MarkerScan },

    #[error(
        "markers out of order in '{}': end marker at byte {end_index} precedes start marker at byte {start_index}",
        path.display()
    )]
    MarkerOrderError {
        path: PathBuf,
        start_index: usize,
        end_index: usize,
    },

    #[error("anchor '{marker}' not found in '{}'", path.display())]
    AnchorNotFoundError { path: PathBuf, marker: String },

    #[error("pattern '{pattern}' matched nothing in '{}'", path.display())]
    PatternNotFoundError { path: PathBuf, pattern: String },

    #[error("invalid pattern: {0}")]
    RegexError(#[from] regex::Error),

    #[error("failed to write output file '{}': {source}", path.display())]
    WriteError {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("configuration error in '{field}': {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("invalid value '{value}' for '{field}': {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("missing required configuration field: {field}")]
    MissingConfigError { field: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Configuration,
    Input,
    Patch,
    Output,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl PatchError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            PatchError::InputReadError { .. } | PatchError::ReplacementReadError { .. } => {
                ErrorCategory::Input
            }
            PatchError::MarkerNotFoundError { .. }
            | PatchError::MarkerOrderError { .. }
            | PatchError::AnchorNotFoundError { .. }
            | PatchError::PatternNotFoundError { .. } => ErrorCategory::Patch,
            PatchError::WriteError { .. } | PatchError::IoError(_) => ErrorCategory::Output,
            PatchError::RegexError(_)
            | PatchError::ConfigValidationError { .. }
            | PatchError::InvalidConfigValueError { .. }
            | PatchError::MissingConfigError { .. } => ErrorCategory::Configuration,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            ErrorCategory::Output => ErrorSeverity::Medium,
            ErrorCategory::Configuration | ErrorCategory::Input | ErrorCategory::Patch => {
                ErrorSeverity::High
            }
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            PatchError::InputReadError { path, source }
                if source.kind() == std::io::ErrorKind::NotFound =>
            {
                format!("Input file does not exist: {}", path.display())
            }
            PatchError::InputReadError { path, source }
                if source.kind() == std::io::ErrorKind::InvalidData =>
            {
                format!("Input file is not valid UTF-8 text: {}", path.display())
            }
            PatchError::ReplacementReadError { path, source }
                if source.kind() == std::io::ErrorKind::NotFound =>
            {
                format!("Replacement file does not exist: {}", path.display())
            }
            other => other.to_string(),
        }
    }

    pub fn recovery_suggestion(&self) -> String {
        match self {
            PatchError::InputReadError { .. } => {
                "Check that the input path is correct and the file is readable UTF-8 text"
                    .to_string()
            }
            PatchError::ReplacementReadError { .. } => {
                "Check that the replacement file path is correct and readable".to_string()
            }
            PatchError::MarkerNotFoundError { .. } | PatchError::AnchorNotFoundError { .. } => {
                "Inspect the source file: the generated markup may have drifted since the markers were recorded"
                    .to_string()
            }
            PatchError::MarkerOrderError { .. } => {
                "The end marker occurs before the start marker; swap them or pick anchors that bracket the region"
                    .to_string()
            }
            PatchError::PatternNotFoundError { .. } => {
                "Verify the regular expression against the current file contents".to_string()
            }
            PatchError::RegexError(_) => {
                "Fix the regular expression syntax (see the regex crate docs)".to_string()
            }
            PatchError::WriteError { .. } | PatchError::IoError(_) => {
                "Check permissions and free space on the output directory, then re-run".to_string()
            }
            PatchError::ConfigValidationError { .. }
            | PatchError::InvalidConfigValueError { .. }
            | PatchError::MissingConfigError { .. } => {
                "Fix the flagged configuration field and re-run".to_string()
            }
        }
    }
}

pub type Result<T> = std::result::Result<T, PatchError>;
