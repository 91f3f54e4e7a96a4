//! Base64 payload normalization.
//!
//! Clients send audio as base64 text that is frequently not quite canonical:
//! a `data:audio/mpeg;base64,` prefix, line-wrapped output from command line
//! encoders, or stripped `=` padding. [`normalize`] repairs these before
//! [`decode`] hands the text to the base64 engine.

use base64::alphabet;
use base64::engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig};
use base64::Engine as _;

use crate::AudioError;

/// Standard alphabet, tolerant of non-zero trailing bits and of either padded
/// or unpadded input.
const LENIENT: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new()
        .with_decode_allow_trailing_bits(true)
        .with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

/// Returns the canonical base64 text of `payload`.
///
/// 1. Everything up to and including the first `,` is dropped (data URI prefix).
/// 2. All whitespace is removed.
/// 3. `=` is appended until the length is a multiple of 4.
pub fn normalize(payload: &str) -> String {
    let body = match payload.split_once(',') {
        Some((_, rest)) => rest,
        None => payload,
    };

    let mut out: String = body.chars().filter(|c| !c.is_whitespace()).collect();
    let rem = out.len() % 4;
    if rem != 0 {
        out.extend(std::iter::repeat_n('=', 4 - rem));
    }
    out
}

/// Normalizes and decodes `payload` into raw bytes.
pub fn decode(payload: &str) -> Result<Vec<u8>, AudioError> {
    let text = normalize(payload);
    Ok(LENIENT.decode(text.as_bytes())?)
}

/// Encodes raw bytes as padded standard base64.
pub fn encode(data: &[u8]) -> String {
    base64::engine::general_purpose::STANDARD.encode(data)
}
