// Filecoin Node Fuzzing Harness
// Core library definition

pub mod cli;
pub mod config;
pub mod constants;
pub mod errors;
pub mod path;
pub mod utils;

// Core modules
pub mod generators;
pub mod harness;
pub mod mutators;
pub mod reporters;

// Re-exports for convenience
pub use config::{NodeSettings, Settings};
pub use errors::{ConfigError, HarnessError, MutationError};
pub use harness::{classify, run_target, Classification, FuzzDriver, FuzzTarget, RunSummary, Verdict};
pub use mutators::{Catalog, CatalogOptions, MutationCase, MutationCategory};
pub use path::FieldPath;

/// Initialize the fuzzing infrastructure
///
/// Sets up logging for `mode`. `RUST_LOG` takes precedence over the mode's
/// default filter. Should be called at the start of each fuzzing binary.
pub fn init(mode: &str) {
    let env = env_logger::Env::default().default_filter_or(utils::log_filter_for_mode(mode));
    if env_logger::Builder::from_env(env).try_init().is_err() {
        log::debug!("Logger already initialized");
    }

    log::info!("Fuzzing mode: {}", mode);
}

/// Finalize the fuzzing process
///
/// Should be called at the end of each fuzzing binary.
pub fn finalize(summary: &RunSummary) {
    if summary.accepted() > 0 {
        log::warn!(
            "{} of {} {} cases were accepted by {}",
            summary.accepted(),
            summary.total(),
            summary.target,
            summary.endpoint
        );
    }
    log::info!("Fuzzing run finished at {}", utils::get_timestamp_string());
}
