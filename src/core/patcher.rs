use crate::core::job::{EditSpec, PatchJob, PatchOutcome};
use crate::core::splice::{self, SpliceSpan};
use crate::utils::error::{PatchError, Result};
use regex::Regex;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tempfile::NamedTempFile;

#[derive(Debug, Clone, Copy, Default)]
pub struct PatcherOptions {
    /// Scan and splice, but never touch the filesystem on the way out.
    pub dry_run: bool,
}

/// Applies a single [`PatchJob`] to the filesystem: one whole-file read, one
/// atomic whole-file write. Never leaves a half-spliced output behind.
pub struct Patcher {
    options: PatcherOptions,
}

impl Patcher {
    pub fn new(options: PatcherOptions) -> Self {
        Self { options }
    }

    pub fn is_dry_run(&self) -> bool {
        self.options.dry_run
    }

    pub fn apply(&self, job: &PatchJob) -> Result<PatchOutcome> {
        let started = Instant::now();

        let text = fs::read_to_string(&job.input).map_err(|source| PatchError::InputReadError {
            path: job.input.clone(),
            source,
        })?;
        tracing::debug!("Read {} bytes from {}", text.len(), job.input.display());

        let replacement = job.replacement.resolve(job.trim_replacement)?;

        let span = self.locate_span(job, &text)?;
        tracing::debug!(
            "Edit span for job '{}': bytes {}..{} ({} removed, {} inserted)",
            job.name,
            span.start,
            span.end,
            span.end - span.start,
            replacement.len()
        );
        let patched = splice::splice(&text, span, &replacement);

        let mut backup = None;
        if !self.options.dry_run {
            if job.backup && job.output.exists() {
                backup = Some(self.write_backup(&job.output)?);
            }
            write_atomic(&job.output, &patched)?;
            tracing::debug!("Wrote {} bytes to {}", patched.len(), job.output.display());
        }

        Ok(PatchOutcome {
            job: job.name.clone(),
            mode: job.edit.mode_name(),
            input: job.input.clone(),
            output: job.output.clone(),
            bytes_read: text.len(),
            bytes_written: patched.len(),
            edit_offset: span.start,
            removed_len: span.end - span.start,
            replacement_len: replacement.len(),
            backup,
            dry_run: self.options.dry_run,
            duration: started.elapsed(),
        })
    }

    /// Resolves the job's edit mode to the byte span the splice will replace.
    /// Inserts are degenerate spans (`start == end`).
    fn locate_span(&self, job: &PatchJob, text: &str) -> Result<SpliceSpan> {
        match &job.edit {
            EditSpec::Splice {
                start_marker,
                end_marker,
            } => {
                let scan = splice::scan_markers(text, start_marker, end_marker);
                tracing::debug!("Marker scan of {}: {}", job.input.display(), scan);
                let (start_index, end_index) = match (scan.start_index, scan.end_index) {
                    (Some(start), Some(end)) => (start, end),
                    _ => {
                        return Err(PatchError::MarkerNotFoundError {
                            path: job.input.clone(),
                            scan,
                        })
                    }
                };
                if end_index < start_index {
                    return Err(PatchError::MarkerOrderError {
                        path: job.input.clone(),
                        start_index,
                        end_index,
                    });
                }
                Ok(SpliceSpan {
                    start: start_index,
                    end: end_index,
                })
            }
            EditSpec::InsertAfter { marker } => {
                splice::span_after(text, marker).ok_or_else(|| PatchError::AnchorNotFoundError {
                    path: job.input.clone(),
                    marker: marker.clone(),
                })
            }
            EditSpec::InsertBefore { marker } => {
                splice::span_before(text, marker).ok_or_else(|| PatchError::AnchorNotFoundError {
                    path: job.input.clone(),
                    marker: marker.clone(),
                })
            }
            EditSpec::Pattern { pattern } => {
                let regex = Regex::new(pattern)?;
                splice::pattern_span(text, &regex).ok_or_else(|| {
                    PatchError::PatternNotFoundError {
                        path: job.input.clone(),
                        pattern: pattern.clone(),
                    }
                })
            }
        }
    }

    fn write_backup(&self, output: &Path) -> Result<PathBuf> {
        let backup_path = backup_path_for(output);
        fs::copy(output, &backup_path).map_err(|source| write_error(&backup_path, source))?;
        tracing::info!(
            "💾 Backed up {} to {}",
            output.display(),
            backup_path.display()
        );
        Ok(backup_path)
    }
}

/// `ui.html` becomes `ui.html.bak`, keeping the original extension visible.
pub fn backup_path_for(output: &Path) -> PathBuf {
    let mut name = output
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(".bak");
    output.with_file_name(name)
}

/// Writes the whole document to a temp file in the target directory, then
/// renames it over the output path. A crash or error mid-write leaves any
/// previous output byte-identical; the temp file is cleaned up on drop.
fn write_atomic(path: &Path, contents: &str) -> Result<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let mut temp = NamedTempFile::new_in(dir).map_err(|source| write_error(path, source))?;
    temp.write_all(contents.as_bytes())
        .map_err(|source| write_error(path, source))?;
    temp.persist(path)
        .map_err(|persist| write_error(path, persist.error))?;
    Ok(())
}

fn write_error(path: &Path, source: std::io::Error) -> PatchError {
    PatchError::WriteError {
        path: path.to_path_buf(),
        source,
    }
}
