//! Payload content: byte entropy and integer value. Both are pure functions
//! of the payload text and never fail a row.

use super::{FeatureComputation, FeatureKind, FeatureLookup, FeatureValue};
use crate::timeline::{FrameKey, TimelineIndex};
use num_bigint::BigUint;

/// Payload read as one base-16 integer of any width; `0` when empty or not
/// hex.
pub fn payload_decimal(payload: &str) -> BigUint {
    if payload.is_empty() || !payload.bytes().all(|b| b.is_ascii_hexdigit()) {
        return BigUint::default();
    }
    BigUint::parse_bytes(payload.as_bytes(), 16).unwrap_or_default()
}

/// Shannon entropy (nats) of the payload's byte histogram. Empty,
/// odd-length and non-hex payloads give `0.0`.
pub fn payload_entropy(payload: &str) -> f64 {
    let bytes = match hex::decode(payload) {
        Ok(b) if !b.is_empty() => b,
        _ => return 0.0,
    };
    let mut histogram = [0u32; 256];
    for b in &bytes {
        histogram[*b as usize] += 1;
    }
    let n = bytes.len() as f64;
    let mut h = 0.0;
    for &count in histogram.iter().filter(|&&c| c > 0) {
        let p = count as f64 / n;
        h -= p * p.ln();
    }
    h
}

#[derive(Debug, Clone, PartialEq)]
pub struct PayloadFeatures {
    pub entropy: f64,
    pub decimal: BigUint,
}

impl PayloadFeatures {
    pub fn of(payload: &str) -> Self {
        Self {
            entropy: payload_entropy(payload),
            decimal: payload_decimal(payload),
        }
    }
}

pub struct PayloadContent {
    entropy_decimals: usize,
}

impl PayloadContent {
    pub fn new(entropy_decimals: usize) -> Self {
        Self { entropy_decimals }
    }
}

#[derive(Debug, Clone)]
pub struct PayloadTable {
    features: Vec<Vec<PayloadFeatures>>,
    entropy_decimals: usize,
}

impl PayloadTable {
    pub fn features(&self, key: FrameKey) -> Option<&PayloadFeatures> {
        self.features.get(key.stream.0)?.get(key.ordinal)
    }
}

impl FeatureComputation for PayloadContent {
    type Output = PayloadTable;

    fn provides(&self) -> &'static [FeatureKind] {
        &[FeatureKind::PayloadEntropy, FeatureKind::PayloadDecimal]
    }

    fn compute(&self, index: &TimelineIndex) -> PayloadTable {
        let mut features = vec![Vec::new(); index.streams().len()];
        for (key, frame) in index.iter() {
            features[key.stream.0].push(PayloadFeatures::of(&frame.payload));
        }
        PayloadTable {
            features,
            entropy_decimals: self.entropy_decimals,
        }
    }
}

impl FeatureLookup for PayloadTable {
    fn get(&self, kind: FeatureKind, key: FrameKey) -> Option<FeatureValue> {
        let f = self.features(key)?;
        match kind {
            FeatureKind::PayloadEntropy => Some(FeatureValue::Real {
                value: f.entropy,
                decimals: Some(self.entropy_decimals),
            }),
            FeatureKind::PayloadDecimal => Some(FeatureValue::Integer(f.decimal.clone())),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entropy_edge_cases() {
        assert_eq!(payload_entropy(""), 0.0);
        assert_eq!(payload_entropy("00"), 0.0);
        assert!((payload_entropy("00FF") - std::f64::consts::LN_2).abs() < 1e-12);
    }

    #[test]
    fn entropy_of_single_repeated_byte_is_positive_zero() {
        let h = payload_entropy("AAAAAAAA");
        assert_eq!(h, 0.0);
        assert!(h.is_sign_positive());
    }

    #[test]
    fn entropy_of_distinct_bytes_is_ln_n() {
        let h = payload_entropy("0011223344556677");
        assert!((h - 8f64.ln()).abs() < 1e-12);
        let lower = payload_entropy("deadbeef");
        let upper = payload_entropy("DEADBEEF");
        assert_eq!(lower, upper);
        assert!((upper - 4f64.ln()).abs() < 1e-12);
    }

    #[test]
    fn malformed_payload_entropy_is_zero() {
        assert_eq!(payload_entropy("ABC"), 0.0);
        assert_eq!(payload_entropy("ZZ"), 0.0);
        assert_eq!(payload_entropy("R"), 0.0);
    }

    #[test]
    fn decimal_values() {
        assert_eq!(payload_decimal(""), BigUint::from(0u32));
        assert_eq!(payload_decimal("1A"), BigUint::from(26u32));
        assert_eq!(payload_decimal("1a"), BigUint::from(26u32));
        assert_eq!(payload_decimal("GG"), BigUint::from(0u32));
        assert_eq!(payload_decimal("+1A"), BigUint::from(0u32));
        assert_eq!(payload_decimal("1_A"), BigUint::from(0u32));
        assert_eq!(payload_decimal("DEADBEEF"), BigUint::from(3_735_928_559u32));
        assert_eq!(payload_decimal("FFFFFFFFFFFFFFFF"), BigUint::from(u64::MAX));
    }

    #[test]
    fn decimal_of_can_fd_payloads_is_exact() {
        // 17 bytes of 0xFF is 2^136 - 1
        let seventeen = payload_decimal(&"FF".repeat(17));
        assert_eq!(seventeen, (BigUint::from(1u32) << 136usize) - 1u32);

        let payload = "11".repeat(64);
        let value = payload_decimal(&payload);
        assert_eq!(value.bits(), 509);
        assert_eq!(value.to_bytes_be(), vec![0x11u8; 64]);
        assert_eq!(format!("{:X}", value), payload);
        assert_eq!(value.to_str_radix(16).len(), 128);
    }
}
