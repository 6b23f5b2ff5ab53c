// fil-fuzzing/src/generators/common.rs
//! Random primitives shared by the message generators

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use rand::distributions::Alphanumeric;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Lower-case RFC 4648 base32 alphabet used by CIDv1 strings
const BASE32_ALPHABET: &[u8] = b"abcdefghijklmnopqrstuvwxyz234567";

/// Prefix of a CIDv1 dag-cbor blake2b-256 in base32
const CID_PREFIX: &str = "bafy2bzace";

/// Characters that are not part of the base64 alphabet
const NON_BASE64_CHARS: &[u8] = b"!@#$%^&*()_-[]{}|;:,.<>? ~`";

/// IPLD link as Lotus encodes it in JSON: `{"/": "<cid>"}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CidLink {
    #[serde(rename = "/")]
    pub cid: String,
}

impl CidLink {
    pub fn new(cid: impl Into<String>) -> Self {
        Self { cid: cid.into() }
    }

    pub fn random() -> Self {
        Self::new(random_cid())
    }
}

/// Generate `min..max` random bytes (`min` bytes when the range is empty)
pub fn random_bytes(min: usize, max: usize) -> Vec<u8> {
    let mut rng = rand::thread_rng();
    let len = if max > min { rng.gen_range(min..max) } else { min };
    let mut bytes = vec![0u8; len];
    rng.fill(bytes.as_mut_slice());
    bytes
}

/// Random bytes of exactly `len`, base64 encoded
pub fn random_base64(len: usize) -> String {
    STANDARD.encode(random_bytes(len, len))
}

/// Base64 of `min..max` random bytes
pub fn random_base64_range(min: usize, max: usize) -> String {
    STANDARD.encode(random_bytes(min, max))
}

pub fn encode_base64(bytes: &[u8]) -> String {
    STANDARD.encode(bytes)
}

/// A well-formed looking CIDv1 string
pub fn random_cid() -> String {
    let mut rng = rand::thread_rng();
    let body: String = (0..52)
        .map(|_| BASE32_ALPHABET[rng.gen_range(0..BASE32_ALPHABET.len())] as char)
        .collect();
    format!("{}{}", CID_PREFIX, body)
}

pub fn random_cid_links(count: usize) -> Vec<CidLink> {
    (0..count).map(|_| CidLink::random()).collect()
}

/// ID address on the test network (`t0<actor id>`)
pub fn random_id_address() -> String {
    format!("t0{}", rand::thread_rng().gen_range(1000u64..10_000_000))
}

/// Attofil amount or chain weight encoded as a decimal string
pub fn random_big_int(max: u64) -> String {
    rand::thread_rng().gen_range(1..max.max(2)).to_string()
}

pub fn random_alphanumeric(len: usize) -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(len)
        .map(char::from)
        .collect()
}

/// A string guaranteed not to decode as base64
pub fn non_base64_string(len: usize) -> String {
    let mut rng = rand::thread_rng();
    (0..len.max(1))
        .map(|_| NON_BASE64_CHARS[rng.gen_range(0..NON_BASE64_CHARS.len())] as char)
        .collect()
}
