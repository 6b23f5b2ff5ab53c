// fil-fuzzing/src/mutators/message.rs
//! Mutations of `SignedMessage` payloads for `MpoolPush`

use serde_json::{json, Value};

use super::MutationCategory::*;
use super::{read, replace, replace_all, strip, update, CaseSpec, Catalog, CatalogOptions};
use crate::constants::sig_types;
use crate::generators::common::{encode_base64, non_base64_string, random_base64, random_base64_range};

const MIB: usize = 1024 * 1024;

/// Method number of a self-call into an arbitrary actor method
const SELF_CALL_METHOD: u64 = 12;

/// Bytes that open a CBOR map and then stop mid-item
const TRUNCATED_CBOR: &[u8] = &[0xa5, 0x01, 0x02, 0x03, 0xff];

/// Reserved CBOR simple values and break codes with no enclosing item
const CBOR_JUNK: &[u8] = &[0xff, 0xfe, 0xfd, 0xfc, 0xf8, 0x00, 0x1c, 0x5f, 0xff];

/// The empty CBOR array
const EMPTY_CBOR_ARRAY: &[u8] = &[0x80];

/// A one-entry CBOR map keyed by a text string that claims one byte but
/// holds a control character
const PLAUSIBLE_CBOR: &[u8] = &[0xa1, 0x61, 0x01, 0x01];

/// One attoFIL more than a freshly funded test account holds
const OVER_BALANCE: &str = "1000000000000001";

/// One attoFIL more than the 2 billion FIL total supply
const OVER_SUPPLY: &str = "2000000000000000000000000001";

/// Nonce distance well past any pending-message window
const NONCE_GAP: u64 = 1_000_000;

static MESSAGE_CASES: &[CaseSpec] = &[
    // type confusion
    ("wrong_type_nonce", TypeConfusion, |m| replace(m, "Message.Nonce", json!("one"))),
    ("wrong_type_gas_limit", TypeConfusion, |m| replace(m, "Message.GasLimit", json!("lots"))),
    ("wrong_type_value", TypeConfusion, |m| replace(m, "Message.Value", json!(100))),
    ("wrong_type_method", TypeConfusion, |m| replace(m, "Message.Method", json!("send"))),
    ("wrong_type_params", TypeConfusion, |m| replace(m, "Message.Params", json!([1, 2]))),
    ("wrong_type_signature", TypeConfusion, |m| replace(m, "Signature", json!("signed"))),
    ("wrong_type_message", TypeConfusion, |m| replace(m, "Message", json!("message"))),
    // malformed references
    ("malformed_to_address", MalformedReference, |m| replace(m, "Message.To", json!("t0zz"))),
    ("malformed_from_address", MalformedReference, |m| {
        replace(m, "Message.From", json!("not-an-address"))
    }),
    ("null_to_address", MalformedReference, |m| replace(m, "Message.To", Value::Null)),
    ("empty_from_address", MalformedReference, |m| replace(m, "Message.From", json!(""))),
    ("undefined_to_address", MalformedReference, |m| replace(m, "Message.To", json!("<empty>"))),
    // malformed encodings
    ("invalid_sig_type", MalformedEncoding, |m| replace(m, "Signature.Type", json!(99))),
    ("negative_sig_type", MalformedEncoding, |m| replace(m, "Signature.Type", json!(-1))),
    ("corrupt_base64_signature", MalformedEncoding, |m| {
        replace(m, "Signature.Data", json!(non_base64_string(65)))
    }),
    ("corrupt_base64_params", MalformedEncoding, |m| {
        replace(m, "Message.Params", json!(non_base64_string(32)))
    }),
    ("unicode_params", MalformedEncoding, |m| {
        replace(m, "Message.Params", json!("\u{2622}\u{fe0f}\u{1f4a5}\u{1f525}"))
    }),
    ("malformed_cbor_params", MalformedEncoding, |m| {
        replace_all(
            m,
            &[
                ("Message.Method", json!(2)),
                ("Message.Params", json!(encode_base64(TRUNCATED_CBOR))),
            ],
        )
    }),
    ("cbor_junk_params", MalformedEncoding, |m| {
        replace_all(
            m,
            &[
                ("Message.Method", json!(2)),
                ("Message.Params", json!(encode_base64(CBOR_JUNK))),
            ],
        )
    }),
    ("non_numeric_value", MalformedEncoding, |m| replace(m, "Message.Value", json!("much"))),
    ("non_numeric_gas_fee_cap", MalformedEncoding, |m| {
        replace(m, "Message.GasFeeCap", json!("cheap"))
    }),
    // missing fields
    ("missing_message", MissingField, |m| strip(m, "Message")),
    ("missing_signature", MissingField, |m| strip(m, "Signature")),
    ("missing_from", MissingField, |m| strip(m, "Message.From")),
    ("missing_to", MissingField, |m| strip(m, "Message.To")),
    ("missing_nonce", MissingField, |m| strip(m, "Message.Nonce")),
    ("missing_gas_limit", MissingField, |m| strip(m, "Message.GasLimit")),
    ("missing_signature_data", MissingField, |m| strip(m, "Signature.Data")),
    // boundaries and semantic edge cases
    ("gas_premium_exceeds_fee_cap", Boundary, |m| {
        replace_all(
            m,
            &[
                ("Message.GasFeeCap", json!("1")),
                ("Message.GasPremium", json!("100")),
            ],
        )
    }),
    ("negative_gas_limit", Boundary, |m| replace(m, "Message.GasLimit", json!(-1000))),
    ("zero_gas_limit", Boundary, |m| replace(m, "Message.GasLimit", json!(0))),
    ("negative_value", Boundary, |m| replace(m, "Message.Value", json!("-1"))),
    ("negative_nonce", Boundary, |m| replace(m, "Message.Nonce", json!(-1))),
    ("unsupported_version", Boundary, |m| replace(m, "Message.Version", json!(2))),
    ("reserved_to_address", Boundary, |m| replace(m, "Message.To", json!("t00"))),
    ("self_reference", Boundary, |m| {
        let from = read(&m, "Message.From")?;
        replace_all(
            m,
            &[
                ("Message.To", from),
                ("Message.Method", json!(SELF_CALL_METHOD)),
            ],
        )
    }),
    ("garbage_params_unknown_method", Boundary, |m| {
        replace_all(
            m,
            &[
                ("Message.Method", json!(99)),
                ("Message.Params", json!(random_base64(128))),
            ],
        )
    }),
    ("empty_params_nonzero_method", Boundary, |m| {
        replace_all(
            m,
            &[("Message.Method", json!(5)), ("Message.Params", json!(""))],
        )
    }),
    ("empty_signature_data", Boundary, |m| replace(m, "Signature.Data", json!(""))),
    ("minimal_cbor_unexpected_method", Boundary, |m| {
        replace_all(
            m,
            &[
                ("Message.Method", json!(6)),
                ("Message.Params", json!(encode_base64(EMPTY_CBOR_ARRAY))),
            ],
        )
    }),
    ("minimal_gas", Boundary, |m| {
        replace_all(
            m,
            &[
                ("Message.GasFeeCap", json!("1")),
                ("Message.GasPremium", json!("1")),
                ("Message.GasLimit", json!(1)),
            ],
        )
    }),
    ("zero_nonce_transfer", Boundary, |m| {
        replace_all(
            m,
            &[
                ("Message.Nonce", json!(0)),
                ("Message.Method", json!(0)),
                ("Message.Params", json!("")),
                ("Message.GasLimit", json!(1_000_000)),
            ],
        )
    }),
    // plausible but wrong
    ("transfer_with_params", Plausible, |m| {
        replace(m, "Message.Params", json!(encode_base64(&[0x00])))
    }),
    ("minimal_gas_limit", Plausible, |m| replace(m, "Message.GasLimit", json!(21_000))),
    ("excessive_value", Plausible, |m| replace(m, "Message.Value", json!(OVER_BALANCE))),
    ("constructor_method", Plausible, |m| {
        replace_all(
            m,
            &[("Message.Method", json!(1)), ("Message.Params", json!(""))],
        )
    }),
    ("minimal_value", Plausible, |m| replace(m, "Message.Value", json!("1"))),
    ("plausible_cbor_params", Plausible, |m| {
        replace_all(
            m,
            &[
                ("Message.Method", json!(2)),
                ("Message.Params", json!(encode_base64(PLAUSIBLE_CBOR))),
            ],
        )
    }),
    ("excessive_gas_price", Plausible, |m| {
        replace_all(
            m,
            &[
                ("Message.GasFeeCap", json!("1000000000000")),
                ("Message.GasPremium", json!("100000000000")),
            ],
        )
    }),
    ("self_transfer", Plausible, |m| {
        let from = read(&m, "Message.From")?;
        replace(m, "Message.To", from)
    }),
    ("params_for_wrong_method", Plausible, |m| {
        replace_all(
            m,
            &[
                ("Message.Method", json!(3)),
                ("Message.Params", json!(encode_base64(EMPTY_CBOR_ARRAY))),
            ],
        )
    }),
    ("value_exceeds_supply", Plausible, |m| replace(m, "Message.Value", json!(OVER_SUPPLY))),
    ("nonce_gap", Plausible, |m| {
        update(m, "Message.Nonce", |nonce| {
            *nonce = json!(nonce.as_u64().unwrap_or(0).saturating_add(NONCE_GAP))
        })
    }),
    ("delegated_sig_type_secp_sender", Plausible, |m| {
        replace(m, "Signature.Type", json!(sig_types::DELEGATED))
    }),
    // numeric extremes
    ("high_gas_limit", Overflow, |m| replace(m, "Message.GasLimit", json!(1i64 << 60))),
    ("max_gas_limit", Overflow, |m| replace(m, "Message.GasLimit", json!(i64::MAX))),
    ("max_value", Overflow, |m| replace(m, "Message.Value", json!(u64::MAX.to_string()))),
    ("max_nonce", Overflow, |m| replace(m, "Message.Nonce", json!(u64::MAX))),
    ("method_overflow", Overflow, |m| replace(m, "Message.Method", json!(u64::MAX))),
    ("method_past_u32", Overflow, |m| {
        replace(m, "Message.Method", json!(u64::from(u32::MAX) + 1))
    }),
    ("integer_overflow_gas", Overflow, |m| {
        replace_all(
            m,
            &[
                ("Message.GasLimit", json!(i64::MAX)),
                ("Message.GasFeeCap", json!(i64::MAX.to_string())),
                ("Message.GasPremium", json!(i64::MAX.to_string())),
            ],
        )
    }),
    // oversized
    ("oversized_params", Oversized, |m| replace(m, "Message.Params", json!(random_base64(2048)))),
    ("enormous_params", Oversized, |m| {
        replace(m, "Message.Params", json!(random_base64_range(MIB, 2 * MIB)))
    }),
    ("large_signature", Oversized, |m| {
        replace(m, "Signature.Data", json!(random_base64_range(MIB, 2 * MIB)))
    }),
    // degenerate
    ("empty_message", Degenerate, |_| Ok(json!({}))),
    ("null_message", Degenerate, |_| Ok(Value::Null)),
    ("scalar_message", Degenerate, |_| Ok(json!(0))),
    ("array_message", Degenerate, |_| Ok(json!([]))),
];

pub fn catalog(options: &CatalogOptions) -> Catalog {
    Catalog::from_table("message", MESSAGE_CASES, options)
}
