// fil-fuzzing/src/config.rs
//! Run configuration
//!
//! Settings are layered: built-in defaults, then an optional TOML file, then
//! `FIL_FUZZING_*` environment variables, then command line flags.

use fil_rpc::RetryConfig;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use crate::constants::{self, DEFAULT_DELAY_MS, DEFAULT_RPC_URL, DEFAULT_TIMEOUT_SECS, DEFAULT_TOKEN_PATH};
use crate::errors::ConfigError;
use crate::harness::HarnessConfig;
use crate::mutators::CatalogOptions;
use crate::utils;

/// Node software behind an RPC endpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Implementation {
    #[default]
    Lotus,
    Forest,
}

impl fmt::Display for Implementation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Implementation::Lotus => write!(f, "lotus"),
            Implementation::Forest => write!(f, "forest"),
        }
    }
}

/// One node of the cluster under test
///
/// Nodes listed in a settings file must name their endpoint; a node without
/// a `token` entry is called unauthenticated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeSettings {
    /// Name used to select the node
    pub id: String,
    /// JSON-RPC endpoint
    pub rpc: String,
    /// File holding the bearer token
    #[serde(default)]
    pub token: Option<PathBuf>,
    #[serde(default)]
    pub implementation: Implementation,
}

impl Default for NodeSettings {
    fn default() -> Self {
        Self {
            id: "lotus0".to_string(),
            rpc: DEFAULT_RPC_URL.to_string(),
            token: Some(PathBuf::from(DEFAULT_TOKEN_PATH)),
            implementation: Implementation::Lotus,
        }
    }
}

/// Pacing, catalog toggles and retry policy
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FuzzerSettings {
    /// RPC timeout in seconds
    pub timeout_secs: u64,
    /// Pause between cases in milliseconds
    pub delay_ms: u64,
    /// Register large payload cases; unset follows the mode preset
    pub enable_large_data: Option<bool>,
    /// Register numeric extreme cases; unset follows the mode preset
    pub enable_overflow: Option<bool>,
    /// Number of random blocks; unset follows the mode preset
    pub random_blocks: Option<usize>,
    /// Only run the named cases
    pub only: Vec<String>,
    /// Retry policy for the version probe
    pub retry: RetryConfig,
    /// Where to write `<target>_results.txt`
    pub artifacts_dir: Option<PathBuf>,
}

impl Default for FuzzerSettings {
    fn default() -> Self {
        Self {
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            delay_ms: DEFAULT_DELAY_MS,
            enable_large_data: None,
            enable_overflow: None,
            random_blocks: None,
            only: Vec::new(),
            retry: RetryConfig::default(),
            artifacts_dir: None,
        }
    }
}

/// Endpoint and token overrides that apply to whichever node is selected
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NodeOverrides {
    pub rpc: Option<String>,
    pub token: Option<PathBuf>,
}

/// Complete settings for a fuzzing run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Fuzzing mode (quick, standard, thorough, ci, debug)
    pub mode: String,
    /// Nodes that can be targeted; the first one is the default
    pub nodes: Vec<NodeSettings>,
    pub fuzzer: FuzzerSettings,
    #[serde(skip)]
    pub overrides: NodeOverrides,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            mode: constants::modes::STANDARD.to_string(),
            nodes: vec![NodeSettings::default()],
            fuzzer: FuzzerSettings::default(),
            overrides: NodeOverrides::default(),
        }
    }
}

fn parse_override<T: FromStr>(name: &str, raw: Option<String>) -> Option<T> {
    let raw = raw?;
    match raw.parse::<T>() {
        Ok(v) => Some(v),
        Err(_) => {
            log::warn!("Ignoring unparseable {}{}={}", constants::ENV_PREFIX, name, raw);
            None
        }
    }
}

impl Settings {
    /// Defaults, overlaid by `path` when given, then by the environment
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut settings = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        settings.apply_env();
        Ok(settings)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml(&contents, &path.display().to_string())
    }

    /// Parse TOML; `origin` only labels errors
    pub fn from_toml(contents: &str, origin: &str) -> Result<Self, ConfigError> {
        let mut settings: Settings = toml::from_str(contents).map_err(|source| ConfigError::Parse {
            path: origin.to_string(),
            source,
        })?;
        if settings.nodes.is_empty() {
            settings.nodes.push(NodeSettings::default());
        }
        Ok(settings)
    }

    /// Apply `FIL_FUZZING_*` variables
    pub fn apply_env(&mut self) {
        self.apply_overrides(utils::env_var);
    }

    /// Apply overrides from `lookup`, which maps an unprefixed variable name
    /// (`RPC_URL`, `DELAY_MS`, ...) to its value
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(mode) = lookup("MODE") {
            self.mode = mode;
        }
        if let Some(rpc) = lookup("RPC_URL") {
            self.overrides.rpc = Some(rpc);
        }
        if let Some(token) = lookup("TOKEN_PATH") {
            self.overrides.token = Some(PathBuf::from(token));
        }
        if let Some(delay) = parse_override("DELAY_MS", lookup("DELAY_MS")) {
            self.fuzzer.delay_ms = delay;
        }
        if let Some(timeout) = parse_override("TIMEOUT_SECS", lookup("TIMEOUT_SECS")) {
            self.fuzzer.timeout_secs = timeout;
        }
        if let Some(dir) = lookup("ARTIFACTS_DIR") {
            self.fuzzer.artifacts_dir = Some(PathBuf::from(dir));
        }
    }

    /// The node named `id`, or the first configured node, with endpoint and
    /// token overrides applied
    pub fn node(&self, id: Option<&str>) -> Result<NodeSettings, ConfigError> {
        let node = match id {
            Some(id) => self
                .nodes
                .iter()
                .find(|n| n.id == id)
                .ok_or_else(|| ConfigError::UnknownNode(id.to_string()))?,
            None => self
                .nodes
                .first()
                .ok_or_else(|| ConfigError::UnknownNode("<none configured>".to_string()))?,
        };

        let mut node = node.clone();
        if let Some(rpc) = &self.overrides.rpc {
            node.rpc = rpc.clone();
        }
        if let Some(token) = &self.overrides.token {
            node.token = Some(token.clone());
        }
        Ok(node)
    }

    /// Mode preset with explicit toggles on top
    pub fn catalog_options(&self) -> CatalogOptions {
        let preset = CatalogOptions::for_mode(&self.mode);
        CatalogOptions {
            enable_overflow: self.fuzzer.enable_overflow.unwrap_or(preset.enable_overflow),
            enable_large_data: self.fuzzer.enable_large_data.unwrap_or(preset.enable_large_data),
            random_blocks: self.fuzzer.random_blocks.unwrap_or(preset.random_blocks),
        }
    }

    pub fn harness_config(&self) -> HarnessConfig {
        HarnessConfig {
            delay: Duration::from_millis(self.fuzzer.delay_ms),
            timeout: Duration::from_secs(self.fuzzer.timeout_secs),
            artifact_dir: self.fuzzer.artifacts_dir.clone(),
        }
    }
}
