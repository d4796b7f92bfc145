// ABOUTME: Configuration management for the harbinger application
// ABOUTME: Loads YAML configuration from standard locations and merges environment overrides

use anyhow::{Context, Result};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::agents::{default_agents, AgentSpec};
use crate::engine::orchestrator::{default_output_root, DEFAULT_SKIP_AGENTS};
use crate::engine::{DEFAULT_DISPATCH_TIMEOUT, DEFAULT_MAX_RETRIES};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub planner: PlannerConfig,

    /// Worker fleet by agent name; replaces the built-in fleet when present
    #[serde(default = "default_agents")]
    pub agents: IndexMap<String, AgentSpec>,

    #[serde(default)]
    pub execution: ExecutionConfig,

    #[serde(default)]
    pub routing: RoutingConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PlannerConfig {
    pub base_url: String,
    pub model: String,
    pub api_key: Option<String>,
    #[serde(with = "humantime_serde")]
    pub timeout: Duration,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExecutionConfig {
    pub max_retries: u32,
    #[serde(with = "humantime_serde")]
    pub dispatch_timeout: Duration,
    #[serde(with = "humantime_serde")]
    pub health_timeout: Duration,
    pub strict_validation: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RoutingConfig {
    pub output_root: Option<PathBuf>,
    pub skip_agents: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub format: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            planner: PlannerConfig::default(),
            agents: default_agents(),
            execution: ExecutionConfig::default(),
            routing: RoutingConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.groq.com/openai/v1".to_string(),
            model: "llama-3.3-70b-versatile".to_string(),
            api_key: None,
            timeout: Duration::from_secs(60),
        }
    }
}

impl Default for ExecutionConfig {
    fn default() -> Self {
        Self {
            max_retries: DEFAULT_MAX_RETRIES,
            dispatch_timeout: DEFAULT_DISPATCH_TIMEOUT,
            health_timeout: Duration::from_secs(2),
            strict_validation: false,
        }
    }
}

impl Default for RoutingConfig {
    fn default() -> Self {
        Self {
            output_root: None,
            skip_agents: DEFAULT_SKIP_AGENTS.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}

impl RoutingConfig {
    pub fn output_root(&self) -> PathBuf {
        self.output_root.clone().unwrap_or_else(default_output_root)
    }
}

impl Config {
    /// Load configuration from a file path or the default locations
    pub fn load(path: Option<PathBuf>) -> Result<Self> {
        let mut config = match path.or_else(Self::find_config_file) {
            Some(config_path) if config_path.exists() => Self::from_file(&config_path)?,
            _ => Config::default(),
        };

        config.merge_env()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        Self::from_yaml(&contents)
            .with_context(|| format!("Invalid config file {}", path.display()))
    }

    pub fn from_yaml(contents: &str) -> Result<Self> {
        // An empty file is a valid, all-defaults config
        if contents.trim().is_empty() {
            return Ok(Config::default());
        }
        Ok(serde_yaml::from_str(contents)?)
    }

    /// Find a configuration file in the working directory, then the home directory
    fn find_config_file() -> Option<PathBuf> {
        let local = ["harbinger.yaml", "harbinger.yml", ".harbinger.yaml", ".harbinger.yml"]
            .into_iter()
            .map(PathBuf::from)
            .find(|p| p.exists());
        if local.is_some() {
            return local;
        }

        dirs::home_dir()
            .map(|home| home.join(".harbinger").join("config.yaml"))
            .filter(|p| p.exists())
    }

    /// Merge environment variables into configuration
    fn merge_env(&mut self) -> Result<()> {
        self.merge_vars(|key| std::env::var(key).ok())
    }

    fn merge_vars<F>(&mut self, var: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = var("HARBINGER_PLANNER_URL") {
            self.planner.base_url = url;
        }
        if let Some(model) = var("HARBINGER_PLANNER_MODEL") {
            self.planner.model = model;
        }
        if let Some(key) = var("HARBINGER_PLANNER_API_KEY") {
            self.planner.api_key = Some(key);
        } else if self.planner.api_key.is_none() {
            self.planner.api_key = var("GROQ_API_KEY");
        }

        if let Some(root) = var("HARBINGER_OUTPUT_ROOT") {
            self.routing.output_root = Some(PathBuf::from(root));
        }
        if let Some(timeout) = var("HARBINGER_DISPATCH_TIMEOUT") {
            self.execution.dispatch_timeout = humantime::parse_duration(&timeout)
                .with_context(|| format!("Invalid HARBINGER_DISPATCH_TIMEOUT '{}'", timeout))?;
        }

        if let Some(level) = var("HARBINGER_LOG_LEVEL") {
            self.logging.level = level;
        }
        if let Some(format) = var("HARBINGER_LOG_FORMAT") {
            self.logging.format = format;
        }

        Ok(())
    }
}
