//! Currency scaling helpers

/// Raw USD per billion
pub const USD_PER_BILLION: f64 = 1e9;

/// Round to 2 decimal places, ties to even (same result as numpy's `round(2)`)
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round_ties_even() / 100.0
}

/// Scale raw USD into billions rounded to 2 decimal places
pub fn to_billions(usd: f64) -> f64 {
    round2(usd / USD_PER_BILLION)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_billions_rounds_to_cents_of_a_billion() {
        assert_eq!(to_billions(1_234_567_890.0), 1.23);
        assert_eq!(to_billions(999_999_999.0), 1.0);
        assert_eq!(to_billions(0.0), 0.0);
        assert_eq!(to_billions(4_000_000.0), 0.0);
    }

    #[test]
    fn test_round2_keeps_two_decimals() {
        assert_eq!(round2(12.3456), 12.35);
        assert_eq!(round2(-3.14159), -3.14);
        assert_eq!(round2(7.0), 7.0);
    }
}
