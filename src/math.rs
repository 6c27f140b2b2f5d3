use serde::{Deserialize, Serialize};

/// A rational trust level, e.g. 1/3 for light-client provisional trust.
/// Callers are expected to keep `numerator <= denominator`; verification
/// only rejects a zero denominator.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fraction {
    pub numerator: u64,
    pub denominator: u64,
}

impl Fraction {
    pub const fn new(numerator: u64, denominator: u64) -> Self {
        Self { numerator, denominator }
    }
}

impl std::fmt::Display for Fraction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.numerator, self.denominator)
    }
}

/// Multiplies two voting powers, reporting overflow instead of wrapping.
pub(crate) fn safe_mul(a: i64, b: i64) -> (i64, bool) {
    match a.checked_mul(b) {
        Some(product) => (product, false),
        None => (0, true),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn safe_mul_in_range() {
        assert_eq!(safe_mul(100, 3), (300, false));
        assert_eq!(safe_mul(-4, 5), (-20, false));
        assert_eq!(safe_mul(0, i64::MAX), (0, false));
    }

    #[test]
    fn safe_mul_overflow() {
        assert_eq!(safe_mul(i64::MAX, 2), (0, true));
        assert_eq!(safe_mul(i64::MAX / 8, 9), (0, true));
        assert_eq!(safe_mul(i64::MIN, -1), (0, true));
    }
}
