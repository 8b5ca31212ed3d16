pub mod engine;
pub mod job;
pub mod patcher;
pub mod splice;

pub use crate::core::engine::{FailurePolicy, JobFailure, PatchEngine, PatchSummary};
pub use crate::core::job::{EditSpec, PatchJob, PatchOutcome, ReplacementSource};
pub use crate::core::patcher::{Patcher, PatcherOptions};
pub use crate::core::splice::{MarkerScan, SpliceSpan};
pub use crate::utils::error::Result;
