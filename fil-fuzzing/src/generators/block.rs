// fil-fuzzing/src/generators/block.rs

//! Generators for chain blocks as submitted through `SyncSubmitBlock`

use rand::Rng;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::{SystemTime, UNIX_EPOCH};

use crate::constants::sig_types;
use crate::generators::common::{
    random_base64, random_base64_range, random_big_int, random_cid_links, random_id_address,
    CidLink,
};
use crate::generators::{to_json, BaselineBuilder, Generator};

/// Length of a BLS signature / drand beacon signature
const BLS_SIG_LEN: usize = 96;

/// Length of a winning PoSt proof
const WINNING_POST_PROOF_LEN: usize = 192;

/// Registered winning PoSt proof types (StackedDrgWinning2KiB..64GiB)
const WINNING_POST_PROOF_TYPES: std::ops::RangeInclusive<i64> = 0..=4;

/// Lotus encoding of `address.Undef`
const UNDEFINED_ADDRESS: &str = "<empty>";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ticket {
    #[serde(rename = "VRFProof")]
    pub vrf_proof: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ElectionProof {
    pub win_count: i64,
    #[serde(rename = "VRFProof")]
    pub vrf_proof: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct BeaconEntry {
    pub round: u64,
    pub data: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct PoStProof {
    #[serde(rename = "PoStProof")]
    pub post_proof: i64,
    pub proof_bytes: String,
}

/// `crypto.Signature`: a type tag plus base64 payload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Signature {
    #[serde(rename = "Type")]
    pub sig_type: u8,
    #[serde(rename = "Data")]
    pub data: String,
}

impl Signature {
    pub fn bls() -> Self {
        Self {
            sig_type: sig_types::BLS,
            data: random_base64(BLS_SIG_LEN),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct BlockHeader {
    pub miner: String,
    pub ticket: Ticket,
    pub election_proof: ElectionProof,
    pub beacon_entries: Vec<BeaconEntry>,
    #[serde(rename = "WinPoStProof")]
    pub win_post_proof: Vec<PoStProof>,
    pub parents: Vec<CidLink>,
    pub parent_weight: String,
    pub height: i64,
    pub parent_state_root: CidLink,
    pub parent_message_receipts: CidLink,
    pub messages: CidLink,
    #[serde(rename = "BLSAggregate")]
    pub bls_aggregate: Signature,
    pub timestamp: u64,
    pub block_sig: Signature,
    pub fork_signaling: u64,
    pub parent_base_fee: String,
}

/// Block plus the CIDs of the messages it carries
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct BlockMsg {
    pub header: BlockHeader,
    pub bls_messages: Vec<CidLink>,
    pub secpk_messages: Vec<CidLink>,
}

fn now_secs() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}

pub fn beacon_entry(round: u64) -> BeaconEntry {
    BeaconEntry {
        round,
        data: random_base64(BLS_SIG_LEN),
    }
}

pub fn winning_post_proof() -> PoStProof {
    PoStProof {
        post_proof: rand::thread_rng().gen_range(WINNING_POST_PROOF_TYPES),
        proof_bytes: random_base64(WINNING_POST_PROOF_LEN),
    }
}

/// Generator for structurally valid blocks
///
/// Values are random but type-correct: signatures and proofs do not verify,
/// every field a node decodes is present with the right JSON shape.
#[derive(Debug, Clone, Default)]
pub struct BlockGenerator;

impl BlockGenerator {
    pub fn new() -> Self {
        Self
    }
}

impl Generator<BlockMsg> for BlockGenerator {
    fn generate(&self) -> BlockMsg {
        let mut rng = rand::thread_rng();
        let height = rng.gen_range(1_000i64..1_000_000);
        let beacon_round = rng.gen_range(1_000_000u64..10_000_000);

        let header = BlockHeader {
            miner: random_id_address(),
            ticket: Ticket {
                vrf_proof: random_base64(BLS_SIG_LEN),
            },
            election_proof: ElectionProof {
                win_count: rng.gen_range(1..5),
                vrf_proof: random_base64(BLS_SIG_LEN),
            },
            beacon_entries: (0..rng.gen_range(1u64..3))
                .map(|i| beacon_entry(beacon_round + i))
                .collect(),
            win_post_proof: vec![winning_post_proof()],
            parents: random_cid_links(rng.gen_range(1..4)),
            parent_weight: random_big_int(1 << 40),
            height,
            parent_state_root: CidLink::random(),
            parent_message_receipts: CidLink::random(),
            messages: CidLink::random(),
            bls_aggregate: Signature::bls(),
            timestamp: now_secs(),
            block_sig: Signature::bls(),
            fork_signaling: 0,
            parent_base_fee: random_big_int(1_000),
        };

        BlockMsg {
            header,
            bls_messages: random_cid_links(rng.gen_range(1..4)),
            secpk_messages: random_cid_links(rng.gen_range(1..4)),
        }
    }
}

impl BaselineBuilder for BlockGenerator {
    fn build_baseline(&self) -> Value {
        to_json(&self.generate())
    }

    fn kind(&self) -> &'static str {
        "block"
    }
}

/// Generator for blocks with random, frequently invalid, contents
///
/// Signature tags are drawn from `0..3`, half of the CIDs are empty and a
/// third of the miner addresses are undefined.
#[derive(Debug, Clone, Default)]
pub struct RandomBlockGenerator;

impl RandomBlockGenerator {
    pub fn new() -> Self {
        Self
    }

    fn maybe_cid() -> CidLink {
        if rand::thread_rng().gen_bool(0.5) {
            CidLink::new("")
        } else {
            CidLink::random()
        }
    }

    fn random_signature() -> Signature {
        let mut rng = rand::thread_rng();
        Signature {
            sig_type: rng.gen_range(0..3),
            data: random_base64_range(0, 1000),
        }
    }
}

impl Generator<BlockMsg> for RandomBlockGenerator {
    fn generate(&self) -> BlockMsg {
        let mut rng = rand::thread_rng();

        let miner = if rng.gen_bool(0.3) {
            UNDEFINED_ADDRESS.to_string()
        } else {
            random_id_address()
        };

        let header = BlockHeader {
            miner,
            ticket: Ticket {
                vrf_proof: random_base64_range(0, 1000),
            },
            election_proof: ElectionProof {
                win_count: rng.gen_range(0..i32::MAX as i64),
                vrf_proof: random_base64_range(0, 1000),
            },
            beacon_entries: vec![BeaconEntry {
                round: rng.gen_range(0..i64::MAX as u64),
                data: random_base64_range(0, 1000),
            }],
            win_post_proof: vec![PoStProof {
                post_proof: 0,
                proof_bytes: random_base64(1),
            }],
            parents: vec![Self::maybe_cid()],
            parent_weight: rng.gen_range(0..i64::MAX).to_string(),
            height: rng.gen_range(0..i64::MAX),
            parent_state_root: Self::maybe_cid(),
            parent_message_receipts: Self::maybe_cid(),
            messages: Self::maybe_cid(),
            bls_aggregate: Self::random_signature(),
            timestamp: rng.gen_range(0..i64::MAX as u64),
            block_sig: Self::random_signature(),
            fork_signaling: rng.gen_range(0..i32::MAX as u64),
            parent_base_fee: rng.gen_range(0..i64::MAX).to_string(),
        };

        BlockMsg {
            header,
            bls_messages: vec![Self::maybe_cid()],
            secpk_messages: vec![Self::maybe_cid()],
        }
    }
}

impl BaselineBuilder for RandomBlockGenerator {
    fn build_baseline(&self) -> Value {
        to_json(&self.generate())
    }

    fn kind(&self) -> &'static str {
        "random block"
    }
}
