pub mod config;
pub mod core;
pub mod utils;

pub use crate::config::plan::PatchPlan;
pub use crate::config::CliConfig;
pub use crate::core::{FailurePolicy, PatchEngine, PatchSummary, Patcher, PatcherOptions};
pub use crate::utils::error::{PatchError, Result};
