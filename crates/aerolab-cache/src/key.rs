//! Content-based cache keys.

use std::fmt;

use aerolab_core::{CanonicalAirfoil, FlowCondition};
use sha2::{Digest, Sha256};

/// SHA-256 digest of a canonical airfoil and a flow condition.
///
/// Hashes the exact bit patterns, so two submissions share a key only when
/// they normalize to identical points. Signed zeros are folded together.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct CacheKey([u8; 32]);

impl CacheKey {
    /// Compute the key for one analysis request.
    #[must_use]
    pub fn new(airfoil: &CanonicalAirfoil, flow: &FlowCondition) -> Self {
        let mut hasher = Sha256::new();

        hasher.update((airfoil.len() as u64).to_le_bytes());
        for point in airfoil.points() {
            hasher.update(bits(point.x));
            hasher.update(bits(point.y));
        }
        hasher.update(bits(flow.reynolds()));
        hasher.update(bits(flow.alpha()));

        Self(hasher.finalize().into())
    }

    /// Raw digest bytes.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

fn bits(value: f64) -> [u8; 8] {
    // -0.0 + 0.0 == +0.0
    (value + 0.0).to_bits().to_le_bytes()
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for byte in &self.0 {
            write!(f, "{byte:02x}")?;
        }
        Ok(())
    }
}

impl fmt::Debug for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Short form is enough to tell entries apart in logs.
        write!(f, "CacheKey({})", &self.to_string()[..12])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DIAMOND: &str = "D\n1 0.001\n0.75 0.04\n0.5 0.06\n0.25 0.05\n0 0\n\
                           0.25 -0.05\n0.5 -0.06\n0.75 -0.04\n0.9 -0.02\n1 -0.002\n";

    fn flow(re: f64, alpha: f64) -> FlowCondition {
        FlowCondition::new(re, alpha).unwrap()
    }

    #[test]
    fn identical_inputs_share_a_key() {
        let a = aerolab_core::normalize(DIAMOND).unwrap();
        let b = aerolab_core::normalize(DIAMOND).unwrap();
        assert_eq!(CacheKey::new(&a, &flow(5e5, 5.0)), CacheKey::new(&b, &flow(5e5, 5.0)));
    }

    #[test]
    fn flow_condition_changes_key() {
        let a = aerolab_core::normalize(DIAMOND).unwrap();
        assert_ne!(CacheKey::new(&a, &flow(5e5, 5.0)), CacheKey::new(&a, &flow(5e5, 5.5)));
        assert_ne!(CacheKey::new(&a, &flow(5e5, 5.0)), CacheKey::new(&a, &flow(6e5, 5.0)));
    }

    #[test]
    fn signed_zero_alpha_shares_key() {
        let a = aerolab_core::normalize(DIAMOND).unwrap();
        assert_eq!(CacheKey::new(&a, &flow(5e5, 0.0)), CacheKey::new(&a, &flow(5e5, -0.0)));
    }

    #[test]
    fn geometry_changes_key() {
        let a = aerolab_core::normalize(DIAMOND).unwrap();
        let b = aerolab_core::normalize(&DIAMOND.replace("0.5 0.06", "0.5 0.061")).unwrap();
        assert_ne!(CacheKey::new(&a, &flow(5e5, 5.0)), CacheKey::new(&b, &flow(5e5, 5.0)));
    }

    #[test]
    fn display_is_hex() {
        let a = aerolab_core::normalize(DIAMOND).unwrap();
        let key = CacheKey::new(&a, &flow(5e5, 5.0));
        let hex = key.to_string();
        assert_eq!(hex.len(), 64);
        assert!(hex.chars().all(|c| c.is_ascii_hexdigit()));
        assert!(format!("{key:?}").starts_with("CacheKey("));
    }
}
