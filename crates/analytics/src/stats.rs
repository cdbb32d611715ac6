//! Small statistics helpers shared by the stores.
//!
//! Empty inputs never produce NaN: mean and median of nothing are `0.0`, and
//! the sample variance of fewer than two observations is `0.0`.

/// Arithmetic mean, `0.0` for an empty slice
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Median, averaging the two middle values for even lengths
pub fn median(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        (sorted[mid - 1] + sorted[mid]) / 2.0
    } else {
        sorted[mid]
    }
}

/// Sample variance with Bessel's correction (divides by n - 1)
pub fn variance(values: &[f64]) -> f64 {
    let n = values.len();
    if n < 2 {
        return 0.0;
    }
    let avg = mean(values);
    values.iter().map(|x| (x - avg).powi(2)).sum::<f64>() / (n - 1) as f64
}

/// Round to `decimals` places, ties to even (3.125 -> 3.12, 3.135 -> 3.13).
///
/// Rounds the exact binary value: 3.135 is stored just below the tie, so it
/// goes down. Scaling by a power of ten first would round twice.
pub fn round_to(value: f64, decimals: u32) -> f64 {
    format!("{:.*}", decimals as usize, value)
        .parse()
        .unwrap_or(value)
}

/// Integer key for a value on a 0.1 grid, so ratings can be grouped and
/// ordered without comparing floats
pub(crate) fn tenths(value: f64) -> i64 {
    (value * 10.0).round() as i64
}

pub(crate) fn from_tenths(key: i64) -> f64 {
    key as f64 / 10.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mean() {
        assert_eq!(mean(&[1.0, 2.0, 3.0, 4.0, 5.0]), 3.0);
        assert_eq!(mean(&[]), 0.0);
    }

    #[test]
    fn test_median() {
        assert_eq!(median(&[1.0, 3.0, 2.0]), 2.0);
        assert_eq!(median(&[1.0, 3.0, 2.0, 4.0]), 2.5);
        assert_eq!(median(&[]), 0.0);
    }

    #[test]
    fn test_variance() {
        assert!((variance(&[1.0, 2.0, 3.0, 4.0, 5.0]) - 2.5).abs() < 1e-12);
        assert_eq!(variance(&[]), 0.0);
        assert_eq!(variance(&[4.5]), 0.0);
    }

    #[test]
    fn test_round_to() {
        assert_eq!(round_to(3.0333, 2), 3.03);
        assert_eq!(round_to(10.125, 2), 10.12);
        assert_eq!(round_to(3.25, 1), 3.2);
        assert_eq!(round_to(3.75, 1), 3.8);
        assert_eq!(round_to(4.0909, 2), 4.09);
    }

    #[test]
    fn test_round_to_uses_exact_binary_value() {
        // Both sit just below the decimal tie
        assert_eq!(round_to(1.075, 2), 1.07);
        assert_eq!(round_to(3.135, 2), 3.13);
        assert_eq!(round_to(0.35, 1), 0.3);
        assert_eq!(round_to(-2.5, 0), -2.0);
    }

    #[test]
    fn test_tenths_round_trip() {
        assert_eq!(tenths(3.5), 35);
        assert_eq!(tenths(0.5), 5);
        assert_eq!(from_tenths(35), 3.5);
    }
}
