// fil-fuzzing/src/constants.rs
//! Shared constants for the fuzzing harness

/// Default Lotus RPC endpoint inside the test network
pub const DEFAULT_RPC_URL: &str = "http://10.20.20.24:1234/rpc/v0";

/// Default location of the Lotus JWT
pub const DEFAULT_TOKEN_PATH: &str = "/root/devgen/lotus/jwt";

/// Default RPC timeout (in seconds)
pub const DEFAULT_TIMEOUT_SECS: u64 = 5;

/// Default pause between two submitted cases (in milliseconds)
pub const DEFAULT_DELAY_MS: u64 = 250;

/// Default number of fully randomized blocks appended to the block catalog
pub const DEFAULT_RANDOM_BLOCKS: usize = 5;

/// Environment variable prefix for overrides
pub const ENV_PREFIX: &str = "FIL_FUZZING_";

/// RPC methods used by the harness
pub mod methods {
    /// Submit a candidate block for validation and gossip
    pub const SYNC_SUBMIT_BLOCK: &str = "Filecoin.SyncSubmitBlock";
    /// Push a signed message into the message pool
    pub const MPOOL_PUSH: &str = "Filecoin.MpoolPush";
    /// Read-only version probe, used before a run
    pub const VERSION: &str = "Filecoin.Version";
}

/// Fuzzing modes
pub mod modes {
    /// Standard fuzzing mode
    pub const STANDARD: &str = "standard";
    /// Quick mode (no large payloads, no random blocks)
    pub const QUICK: &str = "quick";
    /// Thorough mode (more random blocks)
    pub const THOROUGH: &str = "thorough";
    /// CI mode (optimized for continuous integration)
    pub const CI: &str = "ci";
    /// Debug mode (extra logging)
    pub const DEBUG: &str = "debug";
}

/// Filecoin signature type tags accepted on the wire
pub mod sig_types {
    pub const SECP256K1: u8 = 1;
    pub const BLS: u8 = 2;
    pub const DELEGATED: u8 = 3;
}
