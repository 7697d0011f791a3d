//! # Confidential Values — Credibility Codec
//!
//! Wraps a plaintext credibility score (0–100) in an opaque token that can
//! be stored, compared for contradictions, and revealed only through an
//! explicit decode.
//!
//! ## Token Format
//!
//! `FHE-` followed by the padded standard base64 of the shortest decimal
//! rendering of the number: `50` → `FHE-NTA=`, `62.5` → `FHE-NjIuNQ==`.
//! Tokens without the marker are legacy plaintext and decode by parsing the
//! raw text as a number.
//!
//! Decoding is lenient in the same places browser clients are: padding is
//! optional, whitespace inside the payload is ignored, and only the leading
//! numeric prefix of the text is read.
//!
//! ## Security Invariant
//!
//! There is none. [`MarkerCodec`] is a placeholder: the payload is encoded,
//! not encrypted. Callers must go through [`ConfidentialCodec`] so that a
//! real scheme can replace it without touching the repository, analyzer, or
//! authorizer.
//!
//! ## Contradiction Predicate
//!
//! Two values are contradictory when `|a - b| < tolerance`. This is a
//! closeness test: equal values are contradictory under any positive
//! tolerance.

use base64::alphabet;
use base64::engine::general_purpose::{
    GeneralPurpose, GeneralPurposeConfig, STANDARD as BASE64_STANDARD,
};
use base64::engine::DecodePaddingMode;
use base64::Engine;
use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use witness_core::CodecError;

/// Decoder that accepts payloads with or without trailing `=` padding.
const LENIENT_DECODER: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

/// Marker prefix distinguishing encoded tokens from legacy plaintext.
pub const TOKEN_MARKER: &str = "FHE-";

/// Default contradiction tolerance, in percentage points.
pub const DEFAULT_TOLERANCE: f64 = 10.0;

/// An opaque credibility token as stored in a testimony record.
///
/// Serializes as a JSON string. Deserializes from a string or, for legacy
/// records, from a bare JSON number.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ConfidentialValue(String);

impl ConfidentialValue {
    /// Wrap raw token text without validating it. Decoding validates.
    pub fn from_token(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// The token text.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether the token carries the encoding marker.
    pub fn is_marked(&self) -> bool {
        self.0.starts_with(TOKEN_MARKER)
    }
}

impl std::fmt::Display for ConfidentialValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl Serialize for ConfidentialValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for ConfidentialValue {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(TokenVisitor)
    }
}

struct TokenVisitor;

impl<'de> Visitor<'de> for TokenVisitor {
    type Value = ConfidentialValue;

    fn expecting(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("a credibility token string or a legacy numeric score")
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> {
        Ok(ConfidentialValue(v.to_string()))
    }

    fn visit_string<E: de::Error>(self, v: String) -> Result<Self::Value, E> {
        Ok(ConfidentialValue(v))
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<Self::Value, E> {
        Ok(ConfidentialValue(v.to_string()))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<Self::Value, E> {
        Ok(ConfidentialValue(v.to_string()))
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<Self::Value, E> {
        Ok(ConfidentialValue(render_number(v)))
    }
}

/// The encode / decode / compare contract every confidentiality scheme
/// must satisfy.
///
/// Laws, on the valid domain: `decode(encode(p)) == p`, `encode` is
/// deterministic, and `is_contradictory` is symmetric.
pub trait ConfidentialCodec: Send + Sync {
    /// Encode a plaintext score.
    fn encode(&self, plaintext: f64) -> Result<ConfidentialValue, CodecError>;

    /// Recover the plaintext score.
    fn decode(&self, token: &ConfidentialValue) -> Result<f64, CodecError>;

    /// Whether two tokens are within `tolerance` of each other.
    fn is_contradictory(
        &self,
        a: &ConfidentialValue,
        b: &ConfidentialValue,
        tolerance: f64,
    ) -> Result<bool, CodecError> {
        let a = self.decode(a)?;
        let b = self.decode(b)?;
        Ok((a - b).abs() < tolerance)
    }
}

/// The placeholder `FHE-` + base64 scheme.
#[derive(Debug, Clone, Copy, Default)]
pub struct MarkerCodec;

impl ConfidentialCodec for MarkerCodec {
    fn encode(&self, plaintext: f64) -> Result<ConfidentialValue, CodecError> {
        if !plaintext.is_finite() {
            return Err(CodecError::NonFinite(plaintext));
        }
        let payload = BASE64_STANDARD.encode(render_number(plaintext));
        Ok(ConfidentialValue(format!("{TOKEN_MARKER}{payload}")))
    }

    fn decode(&self, token: &ConfidentialValue) -> Result<f64, CodecError> {
        match token.as_str().strip_prefix(TOKEN_MARKER) {
            Some(payload) => {
                let payload: String = payload
                    .chars()
                    .filter(|c| !c.is_ascii_whitespace())
                    .collect();
                let bytes = LENIENT_DECODER.decode(payload).map_err(|e| {
                    CodecError::InvalidPayload {
                        token: token.as_str().to_string(),
                        reason: e.to_string(),
                    }
                })?;
                let text = String::from_utf8(bytes).map_err(|_| CodecError::InvalidPayload {
                    token: token.as_str().to_string(),
                    reason: "payload is not UTF-8".to_string(),
                })?;
                parse_number(&text).ok_or_else(|| CodecError::NotANumber(token.as_str().to_string()))
            }
            None => parse_number(token.as_str())
                .ok_or_else(|| CodecError::NotANumber(token.as_str().to_string())),
        }
    }
}

/// Shortest decimal rendering. Magnitudes from `1e-6` up to `1e21` print
/// positionally; anything outside switches to exponent form (`1e-7`,
/// `1.5e+21`).
fn render_number(value: f64) -> String {
    if value == 0.0 {
        // Folds -0 into 0.
        return "0".to_string();
    }
    let magnitude = value.abs();
    if (1e-6..1e21).contains(&magnitude) {
        return format!("{value}");
    }
    let exp = format!("{value:e}");
    match exp.split_once('e') {
        Some((mantissa, power)) if !power.starts_with('-') => format!("{mantissa}e+{power}"),
        _ => exp,
    }
}

/// Reads the longest numeric prefix after leading whitespace, so `"75%"`
/// yields 75 and `"abc"` yields nothing. Non-finite results are rejected.
fn parse_number(text: &str) -> Option<f64> {
    let text = text.trim_start();
    let bytes = text.as_bytes();
    let digits_from = |mut i: usize| {
        while i < bytes.len() && bytes[i].is_ascii_digit() {
            i += 1;
        }
        i
    };

    let mut end = 0;
    if matches!(bytes.first(), Some(b'+' | b'-')) {
        end = 1;
    }
    let int_end = digits_from(end);
    let mut mantissa_digits = int_end - end;
    end = int_end;
    if bytes.get(end) == Some(&b'.') {
        let frac_end = digits_from(end + 1);
        mantissa_digits += frac_end - (end + 1);
        end = frac_end;
    }
    if mantissa_digits == 0 {
        return None;
    }
    if matches!(bytes.get(end), Some(b'e' | b'E')) {
        let mut exp_start = end + 1;
        if matches!(bytes.get(exp_start), Some(b'+' | b'-')) {
            exp_start += 1;
        }
        let exp_end = digits_from(exp_start);
        if exp_end > exp_start {
            end = exp_end;
        }
    }

    text[..end].parse::<f64>().ok().filter(|v| v.is_finite())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn enc(v: f64) -> ConfidentialValue {
        MarkerCodec.encode(v).unwrap()
    }

    #[test]
    fn encode_is_marked_base64() {
        assert_eq!(enc(50.0).as_str(), "FHE-NTA=");
        assert_eq!(enc(62.5).as_str(), "FHE-NjIuNQ==");
        assert_eq!(enc(0.0).as_str(), "FHE-MA==");
        assert!(enc(100.0).is_marked());
    }

    #[test]
    fn encode_is_deterministic() {
        assert_eq!(enc(73.0), enc(73.0));
    }

    #[test]
    fn encode_rejects_non_finite() {
        assert!(matches!(
            MarkerCodec.encode(f64::NAN),
            Err(CodecError::NonFinite(_))
        ));
        assert!(MarkerCodec.encode(f64::INFINITY).is_err());
    }

    #[test]
    fn negative_zero_encodes_as_zero() {
        assert_eq!(enc(-0.0), enc(0.0));
    }

    #[test]
    fn decode_unmarked_falls_back_to_parse() {
        let raw = ConfidentialValue::from_token("42.5");
        assert_eq!(MarkerCodec.decode(&raw).unwrap(), 42.5);
        let raw = ConfidentialValue::from_token("70");
        assert_eq!(MarkerCodec.decode(&raw).unwrap(), 70.0);
    }

    #[test]
    fn decode_errors_are_reported() {
        let bad_payload = ConfidentialValue::from_token("FHE-@@@");
        assert!(matches!(
            MarkerCodec.decode(&bad_payload),
            Err(CodecError::InvalidPayload { .. })
        ));

        // "abc" in base64
        let not_number = ConfidentialValue::from_token("FHE-YWJj");
        assert!(matches!(
            MarkerCodec.decode(&not_number),
            Err(CodecError::NotANumber(_))
        ));

        let garbage = ConfidentialValue::from_token("high");
        assert!(MarkerCodec.decode(&garbage).is_err());

        let nan = ConfidentialValue::from_token("NaN");
        assert!(MarkerCodec.decode(&nan).is_err());

        assert!(MarkerCodec.decode(&ConfidentialValue::from_token("")).is_err());
    }

    #[test]
    fn extreme_magnitudes_use_exponent_form() {
        assert_eq!(render_number(1e-7), "1e-7");
        assert_eq!(render_number(0.000001), "0.000001");
        assert_eq!(render_number(1.5e21), "1.5e+21");
        assert_eq!(render_number(-2e-9), "-2e-9");
        assert_eq!(render_number(1e20), "100000000000000000000");
        assert_eq!(enc(1e-7).as_str(), "FHE-MWUtNw==");
        assert_eq!(MarkerCodec.decode(&enc(1e-7)).unwrap(), 1e-7);
        assert_eq!(MarkerCodec.decode(&enc(1.5e21)).unwrap(), 1.5e21);
    }

    #[test]
    fn unpadded_and_spaced_payloads_decode() {
        let unpadded = ConfidentialValue::from_token("FHE-NTA");
        assert_eq!(MarkerCodec.decode(&unpadded).unwrap(), 50.0);
        let spaced = ConfidentialValue::from_token("FHE-Nj Iu\nNQ==");
        assert_eq!(MarkerCodec.decode(&spaced).unwrap(), 62.5);
    }

    #[test]
    fn numeric_prefix_is_read() {
        assert_eq!(parse_number("75%"), Some(75.0));
        assert_eq!(parse_number("  12.5 points"), Some(12.5));
        assert_eq!(parse_number(".5"), Some(0.5));
        assert_eq!(parse_number("-3e2x"), Some(-300.0));
        assert_eq!(parse_number("4e"), Some(4.0));
        assert_eq!(parse_number("7."), Some(7.0));
        assert_eq!(parse_number("."), None);
        assert_eq!(parse_number("-"), None);
        assert_eq!(parse_number("Infinity"), None);
        assert_eq!(parse_number("1e999"), None);

        // "75%" in base64
        let token = ConfidentialValue::from_token("FHE-NzUl");
        assert_eq!(MarkerCodec.decode(&token).unwrap(), 75.0);
        let legacy = ConfidentialValue::from_token("80 (est.)");
        assert_eq!(MarkerCodec.decode(&legacy).unwrap(), 80.0);
    }

    #[test]
    fn contradiction_threshold() {
        let codec = MarkerCodec;
        assert!(codec
            .is_contradictory(&enc(60.0), &enc(65.0), DEFAULT_TOLERANCE)
            .unwrap());
        assert!(!codec
            .is_contradictory(&enc(60.0), &enc(80.0), DEFAULT_TOLERANCE)
            .unwrap());
        // Exactly at the tolerance is not contradictory.
        assert!(!codec
            .is_contradictory(&enc(60.0), &enc(70.0), DEFAULT_TOLERANCE)
            .unwrap());
    }

    #[test]
    fn equal_values_are_contradictory() {
        assert!(MarkerCodec
            .is_contradictory(&enc(50.0), &enc(50.0), DEFAULT_TOLERANCE)
            .unwrap());
        assert!(!MarkerCodec
            .is_contradictory(&enc(50.0), &enc(50.0), 0.0)
            .unwrap());
    }

    #[test]
    fn contradiction_mixes_marked_and_legacy() {
        let legacy = ConfidentialValue::from_token("58");
        assert!(MarkerCodec
            .is_contradictory(&enc(60.0), &legacy, DEFAULT_TOLERANCE)
            .unwrap());
    }

    #[test]
    fn contradiction_propagates_decode_error() {
        let bad = ConfidentialValue::from_token("FHE-!!");
        assert!(MarkerCodec
            .is_contradictory(&enc(60.0), &bad, DEFAULT_TOLERANCE)
            .is_err());
    }

    #[test]
    fn serde_accepts_string_and_legacy_number() {
        let token: ConfidentialValue = serde_json::from_str("\"FHE-NTA=\"").unwrap();
        assert_eq!(token.as_str(), "FHE-NTA=");

        let legacy: ConfidentialValue = serde_json::from_str("75").unwrap();
        assert_eq!(legacy.as_str(), "75");
        assert_eq!(MarkerCodec.decode(&legacy).unwrap(), 75.0);

        let legacy_float: ConfidentialValue = serde_json::from_str("75.5").unwrap();
        assert_eq!(MarkerCodec.decode(&legacy_float).unwrap(), 75.5);

        assert!(serde_json::from_str::<ConfidentialValue>("null").is_err());
        assert!(serde_json::from_str::<ConfidentialValue>("[1]").is_err());
    }

    #[test]
    fn serializes_as_string() {
        let json = serde_json::to_string(&enc(50.0)).unwrap();
        assert_eq!(json, "\"FHE-NTA=\"");
    }
}
