// fil-fuzzing/src/utils.rs
//! Utility functions for the fuzzing harness

use crate::constants;
use std::env;
use std::time::{Duration, SystemTime};

/// Default log filter for a fuzzing mode
pub fn log_filter_for_mode(mode: &str) -> &'static str {
    match mode {
        constants::modes::DEBUG => "debug",
        constants::modes::CI => "warn",
        _ => "info",
    }
}

/// Read a `FIL_FUZZING_*` variable, treating empty values as unset
pub fn env_var(name: &str) -> Option<String> {
    env::var(format!("{}{}", constants::ENV_PREFIX, name))
        .ok()
        .filter(|v| !v.trim().is_empty())
}

/// Get a timestamp string for file naming
pub fn get_timestamp_string() -> String {
    let now = SystemTime::now()
        .duration_since(SystemTime::UNIX_EPOCH)
        .unwrap_or(Duration::from_secs(0))
        .as_secs();

    format!("{}", now)
}

/// Size of a JSON value once serialized
pub fn serialized_len(value: &serde_json::Value) -> usize {
    serde_json::to_vec(value).map(|v| v.len()).unwrap_or(0)
}
