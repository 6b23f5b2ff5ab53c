// fil-fuzzing/src/mutators/block.rs
//! Mutations of `BlockMsg` payloads for `SyncSubmitBlock`

use serde_json::{json, Value};

use super::MutationCategory::*;
use super::{replace, replace_all, strip, CaseSpec, Catalog, CatalogOptions, MutationCase};
use crate::generators::block::{beacon_entry, winning_post_proof, RandomBlockGenerator};
use crate::generators::common::{
    non_base64_string, random_alphanumeric, random_base64_range, random_cid, random_cid_links,
};
use crate::generators::{to_json, BaselineBuilder};

const MIB: usize = 1024 * 1024;

/// A weight far beyond any 256-bit integer
fn huge_decimal() -> String {
    format!("1{}", "0".repeat(200))
}

fn cid_list(count: usize) -> Value {
    to_json(&random_cid_links(count))
}

fn beacon_list(count: u64) -> Value {
    to_json(&(0..count).map(beacon_entry).collect::<Vec<_>>())
}

fn post_proof_list(count: usize) -> Value {
    to_json(&(0..count).map(|_| winning_post_proof()).collect::<Vec<_>>())
}

/// Printable junk that is neither base64 nor a valid proof
fn garbage_proof() -> String {
    format!("{}!@#$%^&*(){}", random_alphanumeric(16), random_alphanumeric(16))
}

fn random_block(_: Value) -> Result<Value, crate::errors::MutationError> {
    Ok(RandomBlockGenerator::new().build_baseline())
}

static BLOCK_CASES: &[CaseSpec] = &[
    // type confusion
    ("wrong_type_epoch", TypeConfusion, |m| replace(m, "Header.Height", json!("not_an_int"))),
    ("float_epoch", TypeConfusion, |m| replace(m, "Header.Height", json!(1.5))),
    ("wrong_type_timestamp", TypeConfusion, |m| {
        replace(m, "Header.Timestamp", json!("2024-01-01T00:00:00Z"))
    }),
    ("wrong_type_parent_weight", TypeConfusion, |m| {
        replace(m, "Header.ParentWeight", json!([1, 2, 3]))
    }),
    ("wrong_type_parents", TypeConfusion, |m| replace(m, "Header.Parents", json!(42))),
    ("wrong_type_bls_messages", TypeConfusion, |m| replace(m, "BlsMessages", json!("not_a_list"))),
    ("wrong_type_secpk_messages", TypeConfusion, |m| {
        replace(m, "SecpkMessages", json!({"/": random_cid()}))
    }),
    ("wrong_type_win_count", TypeConfusion, |m| {
        replace(m, "Header.ElectionProof.WinCount", json!(true))
    }),
    ("wrong_type_miner", TypeConfusion, |m| replace(m, "Header.Miner", json!(1234))),
    ("wrong_type_beacon_entries", TypeConfusion, |m| {
        replace(m, "Header.BeaconEntries", json!({"Round": 1, "Data": ""}))
    }),
    ("wrong_type_ticket", TypeConfusion, |m| replace(m, "Header.Ticket", json!("ticket"))),
    ("wrong_type_header", TypeConfusion, |m| replace(m, "Header", json!("header"))),
    // malformed references
    ("malformed_cid_parent_state_root", MalformedReference, |m| {
        replace(m, "Header.ParentStateRoot", json!({"/": "not-a-cid"}))
    }),
    ("bare_string_parent_state_root", MalformedReference, |m| {
        replace(m, "Header.ParentStateRoot", json!(random_cid()))
    }),
    ("null_parent_message_receipts", MalformedReference, |m| {
        replace(m, "Header.ParentMessageReceipts", Value::Null)
    }),
    ("wrong_key_cid_messages", MalformedReference, |m| {
        replace(m, "Header.Messages", json!({"cid": random_cid()}))
    }),
    ("empty_cid_messages", MalformedReference, |m| replace(m, "Header.Messages", json!({"/": ""}))),
    ("malformed_cid_parent_entry", MalformedReference, |m| {
        replace(m, "Header.Parents.0", json!({"/": "zzzz"}))
    }),
    ("null_parent_entry", MalformedReference, |m| replace(m, "Header.Parents.0", Value::Null)),
    ("empty_cid_bls_message", MalformedReference, |m| replace(m, "BlsMessages.0", json!({"/": ""}))),
    ("bare_string_secpk_message", MalformedReference, |m| {
        replace(m, "SecpkMessages.0", json!(random_cid()))
    }),
    ("malformed_miner_address", MalformedReference, |m| replace(m, "Header.Miner", json!("x9zzz"))),
    ("undefined_miner_address", MalformedReference, |m| replace(m, "Header.Miner", json!("<empty>"))),
    // malformed encodings
    ("invalid_sig_type_block_sig", MalformedEncoding, |m| replace(m, "Header.BlockSig.Type", json!(99))),
    ("negative_sig_type_block_sig", MalformedEncoding, |m| {
        replace(m, "Header.BlockSig.Type", json!(-1))
    }),
    ("invalid_sig_type_bls_aggregate", MalformedEncoding, |m| {
        replace(m, "Header.BLSAggregate.Type", json!(255))
    }),
    ("corrupt_base64_block_sig", MalformedEncoding, |m| {
        replace(m, "Header.BlockSig.Data", json!(non_base64_string(64)))
    }),
    ("corrupt_base64_ticket", MalformedEncoding, |m| {
        replace(m, "Header.Ticket.VRFProof", json!(non_base64_string(64)))
    }),
    ("corrupt_base64_election_proof", MalformedEncoding, |m| {
        replace(m, "Header.ElectionProof.VRFProof", json!(non_base64_string(64)))
    }),
    ("corrupt_base64_beacon_data", MalformedEncoding, |m| {
        replace(m, "Header.BeaconEntries.0.Data", json!(non_base64_string(64)))
    }),
    ("corrupt_base64_post_proof", MalformedEncoding, |m| {
        replace(m, "Header.WinPoStProof.0.ProofBytes", json!(non_base64_string(64)))
    }),
    ("garbage_vrf_proof", MalformedEncoding, |m| {
        replace(m, "Header.Ticket.VRFProof", json!(garbage_proof()))
    }),
    ("invalid_post_proof_type", MalformedEncoding, |m| {
        replace(m, "Header.WinPoStProof.0.PoStProof", json!(9999))
    }),
    ("non_numeric_parent_weight", MalformedEncoding, |m| {
        replace(m, "Header.ParentWeight", json!("heavy"))
    }),
    ("non_numeric_parent_base_fee", MalformedEncoding, |m| {
        replace(m, "Header.ParentBaseFee", json!("lots"))
    }),
    // missing fields
    ("missing_header", MissingField, |m| strip(m, "Header")),
    ("missing_miner", MissingField, |m| strip(m, "Header.Miner")),
    ("missing_ticket", MissingField, |m| strip(m, "Header.Ticket")),
    ("missing_election_proof", MissingField, |m| strip(m, "Header.ElectionProof")),
    ("missing_block_sig", MissingField, |m| strip(m, "Header.BlockSig")),
    ("missing_bls_aggregate", MissingField, |m| strip(m, "Header.BLSAggregate")),
    ("missing_parents", MissingField, |m| strip(m, "Header.Parents")),
    ("missing_height", MissingField, |m| strip(m, "Header.Height")),
    ("missing_parent_state_root", MissingField, |m| strip(m, "Header.ParentStateRoot")),
    ("missing_bls_messages", MissingField, |m| strip(m, "BlsMessages")),
    ("missing_secpk_messages", MissingField, |m| strip(m, "SecpkMessages")),
    ("missing_beacon_data", MissingField, |m| strip(m, "Header.BeaconEntries.0.Data")),
    ("missing_block_sig_type", MissingField, |m| strip(m, "Header.BlockSig.Type")),
    // boundaries
    ("negative_epoch", Boundary, |m| replace(m, "Header.Height", json!(-1))),
    ("negative_timestamp", Boundary, |m| replace(m, "Header.Timestamp", json!(-1))),
    ("negative_win_count", Boundary, |m| replace(m, "Header.ElectionProof.WinCount", json!(-1))),
    ("zero_win_count", Boundary, |m| replace(m, "Header.ElectionProof.WinCount", json!(0))),
    ("negative_parent_weight", Boundary, |m| replace(m, "Header.ParentWeight", json!("-1"))),
    ("negative_beacon_round", Boundary, |m| replace(m, "Header.BeaconEntries.0.Round", json!(-1))),
    ("empty_parents", Boundary, |m| replace(m, "Header.Parents", json!([]))),
    ("empty_beacon_entries", Boundary, |m| replace(m, "Header.BeaconEntries", json!([]))),
    ("empty_win_post_proof", Boundary, |m| replace(m, "Header.WinPoStProof", json!([]))),
    ("empty_block_sig_data", Boundary, |m| replace(m, "Header.BlockSig.Data", json!(""))),
    ("empty_arrays", Boundary, |m| {
        replace_all(
            m,
            &[
                ("Header.Parents", json!([])),
                ("Header.BeaconEntries", json!([])),
                ("Header.WinPoStProof", json!([])),
                ("BlsMessages", json!([])),
                ("SecpkMessages", json!([])),
            ],
        )
    }),
    // numeric extremes
    ("max_epoch", Overflow, |m| replace(m, "Header.Height", json!(i64::MAX))),
    ("min_epoch", Overflow, |m| replace(m, "Header.Height", json!(i64::MIN))),
    ("epoch_beyond_i64", Overflow, |m| replace(m, "Header.Height", json!(u64::MAX))),
    ("max_timestamp", Overflow, |m| replace(m, "Header.Timestamp", json!(u64::MAX))),
    ("max_fork_signaling", Overflow, |m| replace(m, "Header.ForkSignaling", json!(u64::MAX))),
    ("max_win_count", Overflow, |m| replace(m, "Header.ElectionProof.WinCount", json!(i64::MAX))),
    ("max_beacon_round", Overflow, |m| {
        replace(m, "Header.BeaconEntries.0.Round", json!(u64::MAX))
    }),
    ("huge_parent_weight", Overflow, |m| replace(m, "Header.ParentWeight", json!(huge_decimal()))),
    ("huge_parent_base_fee", Overflow, |m| {
        replace(m, "Header.ParentBaseFee", json!(huge_decimal()))
    }),
    ("overflow_all_scalars", Overflow, |m| {
        replace_all(
            m,
            &[
                ("Header.Height", json!(i64::MAX)),
                ("Header.Timestamp", json!(u64::MAX)),
                ("Header.ForkSignaling", json!(u64::MAX)),
                ("Header.ElectionProof.WinCount", json!(i64::MAX)),
                ("Header.ParentWeight", json!(u64::MAX.to_string())),
            ],
        )
    }),
    // oversized
    ("huge_bls_messages", Oversized, |m| replace(m, "BlsMessages", cid_list(2000))),
    ("huge_secpk_messages", Oversized, |m| replace(m, "SecpkMessages", cid_list(2000))),
    ("huge_parents", Oversized, |m| replace(m, "Header.Parents", cid_list(1000))),
    ("many_beacon_entries", Oversized, |m| replace(m, "Header.BeaconEntries", beacon_list(5000))),
    ("many_post_proofs", Oversized, |m| replace(m, "Header.WinPoStProof", post_proof_list(1000))),
    ("large_vrf_proof", Oversized, |m| {
        replace(m, "Header.Ticket.VRFProof", json!(random_base64_range(MIB, 2 * MIB)))
    }),
    ("large_block_sig", Oversized, |m| {
        replace(m, "Header.BlockSig.Data", json!(random_base64_range(2 * MIB, 3 * MIB)))
    }),
    ("large_beacon_data", Oversized, |m| {
        replace(m, "Header.BeaconEntries.0.Data", json!(random_base64_range(3 * MIB, 4 * MIB)))
    }),
    ("large_post_proof", Oversized, |m| {
        replace(m, "Header.WinPoStProof.0.ProofBytes", json!(random_base64_range(MIB, 2 * MIB)))
    }),
    // degenerate
    ("empty_message", Degenerate, |_| Ok(json!({}))),
    ("null_message", Degenerate, |_| Ok(Value::Null)),
    ("scalar_message", Degenerate, |_| Ok(json!("block"))),
    ("array_message", Degenerate, |_| Ok(json!([]))),
    ("null_header", Degenerate, |m| replace(m, "Header", Value::Null)),
];

/// Full block catalog: the static table plus the requested number of
/// fully random blocks
pub fn catalog(options: &CatalogOptions) -> Catalog {
    let mut catalog = Catalog::from_table("block", BLOCK_CASES, options);
    for i in 1..=options.random_blocks {
        catalog.push(MutationCase::new(format!("random_block_{}", i), Randomized, random_block));
    }
    catalog
}
