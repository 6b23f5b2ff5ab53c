// fil-fuzzing/src/cli.rs
//! Command line flags shared by the fuzzing binaries

use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;

use crate::config::{NodeSettings, Settings};
use crate::errors::ConfigError;

#[derive(Debug, Clone, Default, Parser)]
#[command(version, about)]
pub struct FuzzArgs {
    /// TOML settings file
    #[arg(long, short)]
    pub config: Option<PathBuf>,

    /// Node id from the settings file (defaults to the first node)
    #[arg(long, short)]
    pub node: Option<String>,

    /// RPC endpoint, overriding the selected node
    #[arg(long)]
    pub rpc_url: Option<String>,

    /// Bearer token file, overriding the selected node
    #[arg(long)]
    pub token_path: Option<PathBuf>,

    /// Pause between cases, e.g. `250ms` or `1s`
    #[arg(long, value_parser = humantime::parse_duration)]
    pub delay: Option<Duration>,

    /// RPC timeout in seconds
    #[arg(long)]
    pub timeout: Option<u64>,

    /// Fuzzing mode: quick, standard, thorough, ci or debug
    #[arg(long)]
    pub mode: Option<String>,

    /// Directory for the results file
    #[arg(long)]
    pub artifacts_dir: Option<PathBuf>,

    /// Skip megabyte payloads and very long lists
    #[arg(long)]
    pub no_large_data: bool,

    /// Skip numeric extreme cases
    #[arg(long)]
    pub no_overflow: bool,

    /// Number of random blocks to append to the block catalog
    #[arg(long)]
    pub random_blocks: Option<usize>,

    /// Only run the named case (repeatable)
    #[arg(long = "case")]
    pub cases: Vec<String>,
}

impl FuzzArgs {
    /// Apply the flags on top of already loaded settings
    pub fn apply(&self, settings: &mut Settings) {
        if let Some(mode) = &self.mode {
            settings.mode = mode.clone();
        }
        if let Some(rpc) = &self.rpc_url {
            settings.overrides.rpc = Some(rpc.clone());
        }
        if let Some(token) = &self.token_path {
            settings.overrides.token = Some(token.clone());
        }
        if let Some(delay) = self.delay {
            settings.fuzzer.delay_ms = delay.as_millis() as u64;
        }
        if let Some(timeout) = self.timeout {
            settings.fuzzer.timeout_secs = timeout;
        }
        if let Some(dir) = &self.artifacts_dir {
            settings.fuzzer.artifacts_dir = Some(dir.clone());
        }
        if self.no_large_data {
            settings.fuzzer.enable_large_data = Some(false);
        }
        if self.no_overflow {
            settings.fuzzer.enable_overflow = Some(false);
        }
        if let Some(n) = self.random_blocks {
            settings.fuzzer.random_blocks = Some(n);
        }
        if !self.cases.is_empty() {
            settings.fuzzer.only = self.cases.clone();
        }
    }

    /// Load every configuration layer and pick the target node
    pub fn resolve(&self) -> Result<(Settings, NodeSettings), ConfigError> {
        let mut settings = Settings::load(self.config.as_deref())?;
        self.apply(&mut settings);
        let node = settings.node(self.node.as_deref())?;
        Ok((settings, node))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_flags() {
        let args = FuzzArgs::parse_from([
            "fuzz_block",
            "--rpc-url",
            "http://127.0.0.1:1234/rpc/v0",
            "--delay",
            "1s 500ms",
            "--no-large-data",
            "--case",
            "wrong_type_epoch",
            "--case",
            "empty_message",
        ]);
        assert_eq!(args.delay, Some(Duration::from_millis(1500)));
        assert_eq!(args.cases, vec!["wrong_type_epoch", "empty_message"]);

        let mut settings = Settings::default();
        args.apply(&mut settings);
        assert_eq!(settings.fuzzer.delay_ms, 1500);
        assert_eq!(settings.fuzzer.only.len(), 2);
        assert!(!settings.catalog_options().enable_large_data);
        assert_eq!(settings.node(None).unwrap().rpc, "http://127.0.0.1:1234/rpc/v0");
    }

    #[test]
    fn test_resolve_takes_mode_from_settings_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("fuzz.toml");
        std::fs::write(&path, "mode = \"debug\"\n").unwrap();

        let args = FuzzArgs::parse_from(["fuzz_block", "--config", path.to_str().unwrap()]);
        let (settings, _) = args.resolve().unwrap();
        assert_eq!(settings.mode, "debug");
        assert_eq!(crate::utils::log_filter_for_mode(&settings.mode), "debug");

        let args = FuzzArgs::parse_from(["fuzz_block", "--config", path.to_str().unwrap(), "--mode", "ci"]);
        assert_eq!(args.resolve().unwrap().0.mode, "ci");
    }

    #[test]
    fn test_rejects_bad_duration() {
        assert!(FuzzArgs::try_parse_from(["fuzz_block", "--delay", "soon"]).is_err());
    }
}
