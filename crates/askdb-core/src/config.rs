//! Runtime configuration.
//!
//! Sources, lowest to highest precedence: built-in defaults, an optional
//! YAML file, environment variables. Binaries layer CLI flags on top.
//!
//! ```yaml
//! database:
//!   path: "${ASKDB_DB_PATH:-company.db}"
//!   sample_rows: 3
//!   max_rows: 100
//!   tables: [employees, departments]
//!
//! coder:
//!   adapter: ollama
//!   base_url: "${OLLAMA_BASE_URL:-http://localhost:11434}"
//!   model: "sqlcoder:7b"
//!   temperature: 0
//!
//! explainer:
//!   model: "llama3"
//!   temperature: 0.7
//!
//! workflow:
//!   max_attempts: 3
//!
//! server:
//!   request_timeout_secs: 120
//! ```

use serde::{Deserialize, Serialize};

use crate::error::ServerError;
use crate::llm::http::DEFAULT_CALL_TIMEOUT_SECS;
use crate::llm::{Adapter, ModelProfile};
use crate::query::DEFAULT_MAX_ROWS;
use crate::schema::DEFAULT_SAMPLE_ROWS;
use crate::workflow::DEFAULT_MAX_ATTEMPTS;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AskConfig {
    #[serde(default)]
    pub database: DatabaseConfig,

    #[serde(default = "ModelProfile::coder")]
    pub coder: ModelProfile,

    #[serde(default = "ModelProfile::explainer")]
    pub explainer: ModelProfile,

    #[serde(default)]
    pub workflow: WorkflowConfig,

    #[serde(default)]
    pub server: ServerSection,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatabaseConfig {
    #[serde(default = "default_db_path")]
    pub path: String,

    /// Example rows shown per table in the schema description
    #[serde(default = "default_sample_rows")]
    pub sample_rows: usize,

    /// Rows rendered per query result
    #[serde(default = "default_max_rows")]
    pub max_rows: usize,

    /// Tables exposed to the generator (empty = all)
    #[serde(default)]
    pub tables: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkflowConfig {
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServerSection {
    /// Upper bound for one request, all retries included
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,

    /// Per-call timeout for the generation backend
    #[serde(default = "default_call_timeout")]
    pub generation_timeout_secs: u64,
}

fn default_db_path() -> String {
    "askdb.db".to_string()
}

fn default_sample_rows() -> usize {
    DEFAULT_SAMPLE_ROWS
}

fn default_max_rows() -> usize {
    DEFAULT_MAX_ROWS
}

fn default_max_attempts() -> u32 {
    DEFAULT_MAX_ATTEMPTS
}

fn default_request_timeout() -> u64 {
    120
}

fn default_call_timeout() -> u64 {
    DEFAULT_CALL_TIMEOUT_SECS
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_db_path(),
            sample_rows: default_sample_rows(),
            max_rows: default_max_rows(),
            tables: Vec::new(),
        }
    }
}

impl Default for WorkflowConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
        }
    }
}

impl Default for ServerSection {
    fn default() -> Self {
        Self {
            request_timeout_secs: default_request_timeout(),
            generation_timeout_secs: default_call_timeout(),
        }
    }
}

impl Default for AskConfig {
    fn default() -> Self {
        Self {
            database: DatabaseConfig::default(),
            coder: ModelProfile::coder(),
            explainer: ModelProfile::explainer(),
            workflow: WorkflowConfig::default(),
            server: ServerSection::default(),
        }
    }
}

impl AskConfig {
    /// Parse a config from YAML, expanding `${VAR}` references first.
    pub fn from_yaml(yaml: &str) -> Result<Self, ServerError> {
        serde_yaml::from_str(&resolve_env_vars(yaml))
            .map_err(|e| ServerError::Config(format!("Failed to parse config YAML: {}", e)))
    }

    /// Load a config from a file path.
    pub fn from_file(path: &str) -> Result<Self, ServerError> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            ServerError::Config(format!("Failed to read config file '{}': {}", path, e))
        })?;
        Self::from_yaml(&content)
    }

    /// Defaults or the given file, then environment overrides, validated.
    pub fn load(path: Option<&str>) -> Result<Self, ServerError> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        config.apply_env();
        config.validate()?;
        Ok(config)
    }

    /// Apply environment variable overrides.
    pub fn apply_env(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(path) = lookup("ASKDB_DB_PATH") {
            self.database.path = path;
        }
        if let Some(base_url) = lookup("OLLAMA_BASE_URL") {
            self.coder.base_url = base_url.clone();
            self.explainer.base_url = base_url;
        }
        if let Some(adapter) = lookup("ASKDB_LLM_ADAPTER").and_then(|a| a.parse::<Adapter>().ok()) {
            self.coder.adapter = adapter;
            self.explainer.adapter = adapter;
        }
        if let Some(key) = lookup("ASKDB_LLM_API_KEY") {
            self.coder.api_key = Some(key.clone());
            self.explainer.api_key = Some(key);
        }
        if let Some(model) = lookup("ASKDB_CODER_MODEL") {
            self.coder.model = model;
        }
        if let Some(model) = lookup("ASKDB_EXPLAINER_MODEL") {
            self.explainer.model = model;
        }
    }

    pub fn validate(&self) -> Result<(), ServerError> {
        if self.workflow.max_attempts == 0 {
            return Err(ServerError::Config(
                "workflow.max_attempts must be at least 1".to_string(),
            ));
        }
        for (name, profile) in [("coder", &self.coder), ("explainer", &self.explainer)] {
            if profile.model.trim().is_empty() {
                return Err(ServerError::Config(format!("{}.model must not be empty", name)));
            }
            if profile.base_url.trim().is_empty() {
                return Err(ServerError::Config(format!(
                    "{}.base_url must not be empty",
                    name
                )));
            }
        }
        if self.database.max_rows == 0 {
            return Err(ServerError::Config(
                "database.max_rows must be at least 1".to_string(),
            ));
        }
        if !self.coder.temperature.is_finite() || self.coder.temperature != 0.0 {
            return Err(ServerError::Config(format!(
                "coder.temperature must be 0 for deterministic SQL (got {})",
                self.coder.temperature
            )));
        }
        if !(self.explainer.temperature > 0.0 && self.explainer.temperature.is_finite()) {
            return Err(ServerError::Config(format!(
                "explainer.temperature must be a positive number (got {})",
                self.explainer.temperature
            )));
        }
        Ok(())
    }
}

/// Resolve environment variable references in a string.
/// Supports `${ENV_VAR}` and `${ENV_VAR:-default}` syntax.
pub fn resolve_env_vars(input: &str) -> String {
    resolve_with(input, |key| std::env::var(key).ok())
}

fn resolve_with<F>(input: &str, lookup: F) -> String
where
    F: Fn(&str) -> Option<String>,
{
    let re = match regex::Regex::new(r"\$\{([^}]+)\}") {
        Ok(re) => re,
        Err(_) => return input.to_string(),
    };
    re.replace_all(input, |caps: &regex::Captures| {
        let var_expr = &caps[1];
        // Support default value syntax: ${VAR:-default}
        if let Some(idx) = var_expr.find(":-") {
            let var_name = &var_expr[..idx];
            let default_val = &var_expr[idx + 2..];
            lookup(var_name).unwrap_or_else(|| default_val.to_string())
        } else {
            lookup(var_expr).unwrap_or_else(|| format!("${{{}}}", var_expr))
        }
    })
    .to_string()
}
