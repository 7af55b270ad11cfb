use bridge_core::model::contract::{Contract, Vulnerability};
use bridge_core::model::seat::Seat;
use bridge_bot::EvalWeights;
use serde::Deserialize;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::Level;

const DEFAULT_SEARCH_DEPTH: u8 = 6;
const RUN_ID_ALLOWED: &str = "abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789._-";

/// Root harness configuration loaded from YAML.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct BenchConfig {
    pub run_id: String,
    pub deals: DealConfig,
    pub contract: ContractConfig,
    #[serde(default)]
    pub search: SearchConfig,
    pub outputs: OutputsConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl BenchConfig {
    /// Load configuration from a YAML file on disk.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let path_buf = path.to_path_buf();
        let file = File::open(path).map_err(|source| ConfigError::Read {
            source,
            path: path_buf.clone(),
        })?;
        let reader = BufReader::new(file);
        let mut cfg: BenchConfig =
            serde_yaml::from_reader(reader).map_err(|source| ConfigError::Parse {
                source,
                path: path_buf.clone(),
            })?;
        cfg.validate().map_err(|source| ConfigError::Invalid {
            path: path_buf,
            source,
        })?;
        Ok(cfg)
    }

    /// Validate the configuration without performing I/O.
    pub fn validate(&mut self) -> Result<(), ValidationError> {
        validate_run_id(&self.run_id)?;
        self.deals.validate()?;
        self.contract.to_contract()?;
        self.search.validate()?;
        self.outputs.validate()?;
        Ok(())
    }

    /// Resolve output templates (e.g. `{run_id}` placeholders) into paths.
    pub fn resolved_outputs(&self) -> ResolvedOutputs {
        ResolvedOutputs {
            jsonl: resolve_template(&self.run_id, &self.outputs.jsonl),
            summary_md: resolve_template(&self.run_id, &self.outputs.summary_md),
        }
    }
}

/// Deal sampling configuration block.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct DealConfig {
    pub seed: Option<u64>,
    pub boards: usize,
}

impl DealConfig {
    fn validate(&self) -> Result<(), ValidationError> {
        if self.boards == 0 {
            return Err(ValidationError::InvalidField {
                field: "deals.boards".to_string(),
                message: "number of boards must be greater than zero".to_string(),
            });
        }
        Ok(())
    }
}

/// The fixed contract every dealt board is played under.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct ContractConfig {
    /// Call text such as "3NT", "4S" or "4S X".
    pub call: String,
    pub declarer: Seat,
    #[serde(default)]
    pub vulnerability: Vulnerability,
}

impl ContractConfig {
    pub fn to_contract(&self) -> Result<Contract, ValidationError> {
        Contract::parse(&self.call, self.declarer).map_err(|err| ValidationError::InvalidField {
            field: "contract.call".to_string(),
            message: err.to_string(),
        })
    }
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct SearchConfig {
    pub depth: u8,
    pub weights: WeightsConfig,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            depth: DEFAULT_SEARCH_DEPTH,
            weights: WeightsConfig::default(),
        }
    }
}

impl SearchConfig {
    fn validate(&self) -> Result<(), ValidationError> {
        if self.depth == 0 {
            return Err(ValidationError::InvalidField {
                field: "search.depth".to_string(),
                message: "search depth must be at least 1".to_string(),
            });
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, Deserialize, PartialEq)]
#[serde(default)]
pub struct WeightsConfig {
    pub tricks_won: f32,
    pub sure_winners: f32,
}

impl Default for WeightsConfig {
    fn default() -> Self {
        let defaults = EvalWeights::default();
        Self {
            tricks_won: defaults.tricks_won,
            sure_winners: defaults.sure_winners,
        }
    }
}

impl WeightsConfig {
    pub fn eval_weights(&self) -> EvalWeights {
        EvalWeights {
            tricks_won: self.tricks_won,
            sure_winners: self.sure_winners,
            ..EvalWeights::default()
        }
    }
}

/// Output artifact configuration.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct OutputsConfig {
    pub jsonl: String,
    pub summary_md: String,
}

impl OutputsConfig {
    fn validate(&self) -> Result<(), ValidationError> {
        for (field, value) in [("outputs.jsonl", &self.jsonl), ("outputs.summary_md", &self.summary_md)] {
            if value.trim().is_empty() {
                return Err(ValidationError::InvalidField {
                    field: field.to_string(),
                    message: "path must not be empty".to_string(),
                });
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct LoggingConfig {
    pub enable_structured: bool,
    pub level: Option<String>,
}

impl LoggingConfig {
    pub fn level(&self) -> Option<Level> {
        self.level.as_deref().and_then(|raw| raw.parse().ok())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedOutputs {
    pub jsonl: PathBuf,
    pub summary_md: PathBuf,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read configuration at {path}")]
    Read {
        source: std::io::Error,
        path: PathBuf,
    },
    #[error("failed to parse configuration at {path}")]
    Parse {
        source: serde_yaml::Error,
        path: PathBuf,
    },
    #[error("invalid configuration at {path}")]
    Invalid {
        path: PathBuf,
        source: ValidationError,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{field}: {message}")]
    InvalidField { field: String, message: String },
}

fn validate_run_id(run_id: &str) -> Result<(), ValidationError> {
    if run_id.is_empty() {
        return Err(ValidationError::InvalidField {
            field: "run_id".to_string(),
            message: "run identifier must not be empty".to_string(),
        });
    }
    if let Some(bad) = run_id.chars().find(|c| !RUN_ID_ALLOWED.contains(*c)) {
        return Err(ValidationError::InvalidField {
            field: "run_id".to_string(),
            message: format!("character {bad:?} is not allowed"),
        });
    }
    Ok(())
}

fn resolve_template(run_id: &str, template: &str) -> PathBuf {
    PathBuf::from(template.replace("{run_id}", run_id))
}
