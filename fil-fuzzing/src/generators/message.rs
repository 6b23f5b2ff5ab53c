// fil-fuzzing/src/generators/message.rs

//! Generators for signed pool messages as submitted through `MpoolPush`

use rand::Rng;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::constants::sig_types;
use crate::generators::block::Signature;
use crate::generators::common::{random_base64, random_id_address};
use crate::generators::{to_json, BaselineBuilder, Generator};

/// 0.0001 FIL in attoFIL
const BASE_VALUE: &str = "100000000000000";

/// 1 nanoFIL in attoFIL
const BASE_GAS_PRICE: &str = "1000000000";

const BASE_GAS_LIMIT: i64 = 1_000_000;

/// Recoverable secp256k1 signature length
const SECP_SIG_LEN: usize = 65;

/// Unsigned message body (`types.Message`)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Message {
    pub version: u64,
    pub to: String,
    pub from: String,
    pub nonce: u64,
    pub value: String,
    pub gas_limit: i64,
    pub gas_fee_cap: String,
    pub gas_premium: String,
    pub method: u64,
    pub params: Option<String>,
}

/// Message plus the sender's signature (`types.SignedMessage`)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct SignedMessage {
    pub message: Message,
    pub signature: Signature,
}

/// Generator for plain value transfers with a well-formed secp256k1 signature
#[derive(Debug, Clone, Default)]
pub struct SignedMessageGenerator;

impl SignedMessageGenerator {
    pub fn new() -> Self {
        Self
    }
}

impl Generator<SignedMessage> for SignedMessageGenerator {
    fn generate(&self) -> SignedMessage {
        let mut rng = rand::thread_rng();

        let from = random_id_address();
        let mut to = random_id_address();
        while to == from {
            to = random_id_address();
        }

        SignedMessage {
            message: Message {
                version: 0,
                to,
                from,
                nonce: rng.gen_range(0..10_000),
                value: BASE_VALUE.to_string(),
                gas_limit: BASE_GAS_LIMIT,
                gas_fee_cap: BASE_GAS_PRICE.to_string(),
                gas_premium: BASE_GAS_PRICE.to_string(),
                method: 0,
                params: None,
            },
            signature: Signature {
                sig_type: sig_types::SECP256K1,
                data: random_base64(SECP_SIG_LEN),
            },
        }
    }
}

impl BaselineBuilder for SignedMessageGenerator {
    fn build_baseline(&self) -> Value {
        to_json(&self.generate())
    }

    fn kind(&self) -> &'static str {
        "signed message"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_baseline_has_wire_shape() {
        let msg = SignedMessageGenerator::new().build_baseline();

        assert_eq!(msg["Message"]["Version"], 0);
        assert_eq!(msg["Message"]["Method"], 0);
        assert!(msg["Message"]["Params"].is_null());
        assert!(msg["Message"]["GasLimit"].is_i64());
        assert_eq!(msg["Message"]["Value"], BASE_VALUE);
        assert_eq!(msg["Signature"]["Type"], 1);
        assert_ne!(msg["Message"]["To"], msg["Message"]["From"]);
    }

    #[test]
    fn test_baselines_are_independent() {
        let generator = SignedMessageGenerator::new();
        let mut first = generator.build_baseline();
        let second = generator.build_baseline();
        let snapshot = second.clone();

        first["Message"]["GasLimit"] = Value::from(-1);
        assert_eq!(second, snapshot);
    }
}
