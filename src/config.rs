use crate::ledger::{CorrectionPolicy, Project, SeedReading};
use crate::models::ProjectInfo;
use chrono::NaiveDate;
use serde::Deserialize;
use std::collections::{BTreeMap, HashSet};
use std::{env, path::Path, path::PathBuf};
use thiserror::Error;
use tokio::fs;
use tracing::{info, warn};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("project '{id}': {reason}")]
    InvalidProject { id: String, reason: String },

    #[error("no projects configured")]
    Empty,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub correction_policy: CorrectionPolicy,
    pub projects: Vec<ProjectConfig>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ProjectConfig {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub contractor: String,
    #[serde(default)]
    pub supervision_contract_amount: Option<f64>,
    pub contract_total_amount: f64,
    pub contract_start: NaiveDate,
    #[serde(default)]
    pub seed: SeedReading,
}

impl AppConfig {
    /// Checks the static figures every ledger relies on.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.projects.is_empty() {
            return Err(ConfigError::Empty);
        }

        let mut seen = HashSet::new();
        for project in &self.projects {
            let invalid = |reason: &str| ConfigError::InvalidProject {
                id: project.id.clone(),
                reason: reason.to_string(),
            };

            if project.id.trim().is_empty() {
                return Err(invalid("id must not be empty"));
            }
            if !seen.insert(project.id.as_str()) {
                return Err(invalid("duplicate project id"));
            }
            if !project.contract_total_amount.is_finite() || project.contract_total_amount <= 0.0 {
                return Err(invalid("contract_total_amount must be positive"));
            }
            let seed = project.seed;
            if !(0.0..=100.0).contains(&seed.cumulative_physical_pct)
                || !seed.cumulative_financial_amount.is_finite()
                || seed.cumulative_financial_amount < 0.0
            {
                return Err(invalid("seed readings out of range"));
            }
        }

        Ok(())
    }

    /// Builds one empty ledger per configured project, keyed by id.
    pub fn into_projects(self) -> BTreeMap<String, Project> {
        let policy = self.correction_policy;
        self.projects
            .into_iter()
            .map(|project| {
                let info = ProjectInfo {
                    id: project.id.clone(),
                    name: project.name,
                    contractor: project.contractor,
                    supervision_contract_amount: project.supervision_contract_amount,
                    contract_total_amount: project.contract_total_amount,
                    contract_start: project.contract_start,
                };
                (project.id, Project::new(info, project.seed, policy))
            })
            .collect()
    }
}

impl Default for AppConfig {
    /// The two camaronero-sector zones the supervision contract covers.
    fn default() -> Self {
        let contract_start = NaiveDate::from_ymd_opt(2025, 1, 1).unwrap_or_default();
        let zone = |id: &str, name: &str, total: f64| ProjectConfig {
            id: id.to_string(),
            name: name.to_string(),
            contractor: "Consorcio Fiscalred".to_string(),
            supervision_contract_amount: Some(67_490.10),
            contract_total_amount: total,
            contract_start,
            seed: SeedReading::default(),
        };

        Self {
            correction_policy: CorrectionPolicy::default(),
            projects: vec![
                zone("zona-1", "ZONA 1 - SECTOR CAMARONERO", 1_500_000.00),
                zone("zona-2", "ZONA 2 - SECTOR CAMARONERO", 1_450_000.00),
            ],
        }
    }
}

pub fn resolve_config_path() -> PathBuf {
    if let Ok(path) = env::var("RDO_CONFIG_PATH") {
        return PathBuf::from(path);
    }

    PathBuf::from("config/projects.json")
}

/// Reads the project file, falling back to the built-in zones when it does
/// not exist. A file that exists but cannot be read or parsed is an error.
pub async fn load_config(path: &Path) -> Result<AppConfig, ConfigError> {
    let config = match fs::read(path).await {
        Ok(bytes) => serde_json::from_slice(&bytes).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            warn!(path = %path.display(), "config file not found, using built-in projects");
            AppConfig::default()
        }
        Err(source) => {
            return Err(ConfigError::Io {
                path: path.to_path_buf(),
                source,
            });
        }
    };

    config.validate()?;
    info!(
        projects = config.projects.len(),
        policy = ?config.correction_policy,
        "configuration loaded"
    );
    Ok(config)
}
