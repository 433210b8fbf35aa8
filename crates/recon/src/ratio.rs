//! Ratio policies.
//!
//! Row-level and campaign-level ratios are null on a zero or null
//! denominator. Overall ratios fall back to 0.0 instead. Neither policy ever
//! yields an infinite or NaN value.

/// `num / den`, or `None` when either side is null, the denominator is zero,
/// or the quotient is not finite.
pub fn ratio(num: Option<f64>, den: Option<f64>) -> Option<f64> {
    let (num, den) = (num?, den?);
    if den == 0.0 {
        return None;
    }
    Some(num / den).filter(|q| q.is_finite())
}

/// Integer-operand convenience over [`ratio`].
pub fn ratio_i(num: Option<i64>, den: Option<i64>) -> Option<f64> {
    ratio(num.map(|n| n as f64), den.map(|d| d as f64))
}

/// `num / den`, or 0.0 when the denominator is zero.
pub fn ratio_or_zero(num: f64, den: f64) -> f64 {
    ratio(Some(num), Some(den)).unwrap_or(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_denominator_is_null() {
        assert_eq!(ratio(Some(5.0), Some(0.0)), None);
        assert_eq!(ratio(Some(0.0), Some(0.0)), None);
        assert_eq!(ratio_i(Some(3), Some(0)), None);
    }

    #[test]
    fn null_operand_is_null() {
        assert_eq!(ratio(None, Some(2.0)), None);
        assert_eq!(ratio(Some(2.0), None), None);
    }

    #[test]
    fn regular_division() {
        assert_eq!(ratio_i(Some(50), Some(1000)), Some(0.05));
        assert_eq!(ratio(Some(100.0), Some(50.0)), Some(2.0));
    }

    #[test]
    fn overflowing_quotient_is_null() {
        assert_eq!(ratio(Some(f64::MAX), Some(1e-300)), None);
    }

    #[test]
    fn overall_policy_defaults_to_zero() {
        assert_eq!(ratio_or_zero(10.0, 0.0), 0.0);
        assert_eq!(ratio_or_zero(10.0, 4.0), 2.5);
    }
}
