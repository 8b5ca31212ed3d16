pub mod plan;

use crate::core::{EditSpec, PatchJob, ReplacementSource};
use crate::utils::error::{PatchError, Result};
use crate::utils::validation::{self, Validate};
use clap::Parser;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Serialize, Deserialize, Parser)]
#[command(name = "marker-patch")]
#[command(about = "Splice a replacement block between two markers in a text file")]
pub struct CliConfig {
    #[arg(long)]
    pub input: PathBuf,

    #[arg(long)]
    pub output: PathBuf,

    #[arg(long)]
    pub start_marker: String,

    #[arg(long)]
    pub end_marker: String,

    #[arg(long, help = "File whose contents replace the marked region")]
    pub replacement_file: Option<PathBuf>,

    #[arg(long, help = "Inline literal that replaces the marked region")]
    pub replacement: Option<String>,

    #[arg(long, help = "Trim surrounding whitespace from the replacement")]
    pub trim_replacement: bool,

    #[arg(long, help = "Copy an existing output file to <output>.bak first")]
    pub backup: bool,

    #[arg(long, help = "Report what would change without writing anything")]
    pub dry_run: bool,

    #[arg(long, help = "Enable verbose output")]
    pub verbose: bool,
}

impl CliConfig {
    /// 將命令列參數轉換為單一修補工作
    pub fn to_job(&self) -> Result<PatchJob> {
        let replacement = match &self.replacement_file {
            Some(path) => ReplacementSource::File(path.clone()),
            None => {
                let text = validation::validate_required_field(
                    "replacement_file (or replacement)",
                    &self.replacement,
                )?;
                ReplacementSource::Literal(text.clone())
            }
        };

        let name = self
            .output
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "patch".to_string());

        Ok(PatchJob {
            name,
            input: self.input.clone(),
            output: self.output.clone(),
            edit: EditSpec::Splice {
                start_marker: self.start_marker.clone(),
                end_marker: self.end_marker.clone(),
            },
            replacement,
            trim_replacement: self.trim_replacement,
            backup: self.backup,
            enabled: true,
        })
    }
}

impl Validate for CliConfig {
    fn validate(&self) -> Result<()> {
        validation::validate_path("input", &self.input.to_string_lossy())?;
        validation::validate_path("output", &self.output.to_string_lossy())?;
        validation::validate_non_empty_string("start_marker", &self.start_marker)?;
        validation::validate_non_empty_string("end_marker", &self.end_marker)?;

        if self.replacement_file.is_some() && self.replacement.is_some() {
            return Err(PatchError::ConfigValidationError {
                field: "replacement".to_string(),
                message: "--replacement-file and --replacement are mutually exclusive".to_string(),
            });
        }
        if self.replacement_file.is_none() && self.replacement.is_none() {
            return Err(PatchError::MissingConfigError {
                field: "replacement_file (or replacement)".to_string(),
            });
        }

        if let Some(path) = &self.replacement_file {
            validation::validate_path("replacement_file", &path.to_string_lossy())?;
        }

        Ok(())
    }
}
