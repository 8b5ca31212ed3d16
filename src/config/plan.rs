use crate::core::{EditSpec, FailurePolicy, PatchJob, ReplacementSource};
use crate::utils::error::{PatchError, Result};
use crate::utils::validation::{self, Validate};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PatchPlan {
    pub plan: PlanInfo,
    pub defaults: Option<PlanDefaults>,
    /// 省略 [[jobs]] 表時視為空計畫
    #[serde(default)]
    pub jobs: Vec<JobConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlanInfo {
    pub name: String,
    pub description: String,
    pub version: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlanDefaults {
    pub backup: Option<bool>,
    pub on_failure: Option<String>, // "stop" or "continue"
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobConfig {
    pub name: String,
    pub description: Option<String>,
    pub enabled: Option<bool>,
    pub input: String,
    pub output: Option<String>, // 省略時就地覆寫 input
    pub mode: Option<String>,   // splice | insert-after | insert-before | pattern
    pub start_marker: Option<String>,
    pub end_marker: Option<String>,
    pub marker: Option<String>,
    pub pattern: Option<String>,
    pub replacement_file: Option<String>,
    pub replacement: Option<String>,
    pub trim: Option<bool>,
    pub backup: Option<bool>,
}

impl PatchPlan {
    /// 從 TOML 檔案載入修補計畫
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(PatchError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析修補計畫
    pub fn from_toml_str(content: &str) -> Result<Self> {
        // 處理環境變數替換
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| PatchError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${BUILD_DIR})
    fn substitute_env_vars(content: &str) -> Result<String> {
        use regex::Regex;
        // 使用正規表達式匹配 ${VAR_NAME} 格式
        let re = Regex::new(r"\$\{([^}]+)\}").unwrap();

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    /// 驗證計畫的合理性
    pub fn validate_config(&self) -> Result<()> {
        validation::validate_non_empty_string("plan.name", &self.plan.name)?;
        self.on_failure()?;

        // 重複的工作名稱會讓報告無法對應
        let mut seen = std::collections::HashSet::new();
        for job in &self.jobs {
            if !seen.insert(job.name.as_str()) {
                return Err(PatchError::ConfigValidationError {
                    field: "jobs.name".to_string(),
                    message: format!("Duplicate job name '{}'", job.name),
                });
            }
        }

        // 每個工作都要能組成合法的 PatchJob
        self.get_jobs()?;

        Ok(())
    }

    /// 取得失敗處理策略（預設 stop）
    pub fn on_failure(&self) -> Result<FailurePolicy> {
        let value = self
            .defaults
            .as_ref()
            .and_then(|d| d.on_failure.as_deref())
            .unwrap_or("stop");

        match value {
            "stop" => Ok(FailurePolicy::Stop),
            "continue" => Ok(FailurePolicy::Continue),
            other => Err(PatchError::InvalidConfigValueError {
                field: "defaults.on_failure".to_string(),
                value: other.to_string(),
                reason: "Supported values: stop, continue".to_string(),
            }),
        }
    }

    /// 取得計畫中的所有修補工作（含停用的，由引擎負責跳過）
    pub fn get_jobs(&self) -> Result<Vec<PatchJob>> {
        self.jobs.iter().map(|job| self.build_job(job)).collect()
    }

    fn build_job(&self, cfg: &JobConfig) -> Result<PatchJob> {
        validation::validate_non_empty_string("jobs.name", &cfg.name)?;
        validation::validate_path(&format!("jobs.{}.input", cfg.name), &cfg.input)?;

        let mode = cfg.mode.as_deref().unwrap_or("splice");
        let edit = match mode {
            "splice" => {
                let start = validation::validate_required_field(
                    &format!("jobs.{}.start_marker", cfg.name),
                    &cfg.start_marker,
                )?;
                let end = validation::validate_required_field(
                    &format!("jobs.{}.end_marker", cfg.name),
                    &cfg.end_marker,
                )?;
                EditSpec::Splice {
                    start_marker: start.clone(),
                    end_marker: end.clone(),
                }
            }
            "insert-after" => {
                let marker = validation::validate_required_field(
                    &format!("jobs.{}.marker", cfg.name),
                    &cfg.marker,
                )?;
                EditSpec::InsertAfter {
                    marker: marker.clone(),
                }
            }
            "insert-before" => {
                let marker = validation::validate_required_field(
                    &format!("jobs.{}.marker", cfg.name),
                    &cfg.marker,
                )?;
                EditSpec::InsertBefore {
                    marker: marker.clone(),
                }
            }
            "pattern" => {
                let pattern = validation::validate_required_field(
                    &format!("jobs.{}.pattern", cfg.name),
                    &cfg.pattern,
                )?;
                EditSpec::Pattern {
                    pattern: pattern.clone(),
                }
            }
            other => {
                return Err(PatchError::InvalidConfigValueError {
                    field: format!("jobs.{}.mode", cfg.name),
                    value: other.to_string(),
                    reason: "Supported modes: splice, insert-after, insert-before, pattern"
                        .to_string(),
                })
            }
        };

        let replacement = match (&cfg.replacement_file, &cfg.replacement) {
            (Some(path), None) => ReplacementSource::File(PathBuf::from(path)),
            (None, Some(text)) => ReplacementSource::Literal(text.clone()),
            (Some(_), Some(_)) => {
                return Err(PatchError::ConfigValidationError {
                    field: format!("jobs.{}.replacement", cfg.name),
                    message: "replacement_file and replacement are mutually exclusive".to_string(),
                })
            }
            (None, None) => {
                return Err(PatchError::MissingConfigError {
                    field: format!("jobs.{}.replacement_file (or replacement)", cfg.name),
                })
            }
        };

        // 省略 output 時就地覆寫 input
        let output = match &cfg.output {
            Some(path) => PathBuf::from(path),
            None => PathBuf::from(&cfg.input),
        };

        let default_backup = self
            .defaults
            .as_ref()
            .and_then(|d| d.backup)
            .unwrap_or(false);

        Ok(PatchJob {
            name: cfg.name.clone(),
            input: PathBuf::from(&cfg.input),
            output,
            edit,
            replacement,
            trim_replacement: cfg.trim.unwrap_or(false),
            backup: cfg.backup.unwrap_or(default_backup),
            enabled: cfg.enabled.unwrap_or(true),
        })
    }
}

impl Validate for PatchPlan {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}
