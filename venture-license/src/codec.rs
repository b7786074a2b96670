//! URL-safe base64 codec for the two token segments.
//!
//! Output carries no `=` padding. On input the padding is restored to the
//! next multiple of four before decoding, so both padded and unpadded
//! segments are accepted.

use crate::error::{LicenseError, LicenseResult};
use base64::{
    alphabet,
    engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig},
    Engine,
};

/// URL-safe alphabet, unpadded output, lenient about trailing bits on input.
const SEGMENT_ENGINE: GeneralPurpose = GeneralPurpose::new(
    &alphabet::URL_SAFE,
    GeneralPurposeConfig::new()
        .with_encode_padding(false)
        .with_decode_padding_mode(DecodePaddingMode::RequireCanonical)
        .with_decode_allow_trailing_bits(true),
);

/// Encodes bytes as URL-safe base64 with trailing padding removed.
#[must_use]
pub fn encode(bytes: &[u8]) -> String {
    SEGMENT_ENGINE.encode(bytes)
}

/// Decodes a URL-safe base64 segment, restoring any stripped padding.
///
/// # Errors
///
/// Returns [`LicenseError::InvalidTokenFormat`] if the padded text is not
/// valid URL-safe base64.
pub fn decode(text: &str) -> LicenseResult<Vec<u8>> {
    let pad = (4 - text.len() % 4) % 4;
    let mut padded = String::with_capacity(text.len() + pad);
    padded.push_str(text);
    padded.extend(std::iter::repeat_n('=', pad));

    SEGMENT_ENGINE
        .decode(padded.as_bytes())
        .map_err(|e| LicenseError::InvalidTokenFormat(format!("invalid base64url segment: {e}")))
}
