//! Exponential Moving Average indicator.
//!
//! k = 2/(n+1), seeded with the first price (no bias correction), then
//! EMA[i] = EMA[i-1] + k*(C[i] - EMA[i-1]). No warmup: every point is defined.

pub fn calculate_ema(values: &[f64], period: usize) -> Vec<f64> {
    if period == 0 || values.is_empty() {
        return Vec::new();
    }

    let k = 2.0 / (period as f64 + 1.0);
    let mut out = Vec::with_capacity(values.len());
    let mut ema = values[0];
    out.push(ema);

    for &price in &values[1..] {
        ema += k * (price - ema);
        out.push(ema);
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ema_seed_is_first_price() {
        let series = calculate_ema(&[10.0, 20.0, 30.0], 3);
        assert_eq!(series.len(), 3);
        assert!((series[0] - 10.0).abs() < f64::EPSILON);
    }

    #[test]
    fn ema_recursive_calculation() {
        let series = calculate_ema(&[10.0, 20.0, 30.0, 40.0], 3);
        let k = 2.0 / 4.0;

        let e1 = 10.0 + k * (20.0 - 10.0);
        let e2 = e1 + k * (30.0 - e1);
        let e3 = e2 + k * (40.0 - e2);

        assert!((series[1] - e1).abs() < 1e-12);
        assert!((series[2] - e2).abs() < 1e-12);
        assert!((series[3] - e3).abs() < 1e-12);
    }

    #[test]
    fn ema_matches_blend_form() {
        let prices = [44.0, 44.5, 43.9, 45.1, 46.3, 45.8, 47.0];
        let series = calculate_ema(&prices, 5);
        let alpha = 2.0 / 6.0;

        let mut expected = prices[0];
        for (i, &p) in prices.iter().enumerate().skip(1) {
            expected = alpha * p + (1.0 - alpha) * expected;
            approx::assert_relative_eq!(series[i], expected, epsilon = 1e-9);
        }
    }

    #[test]
    fn ema_constant_series_is_exact() {
        let series = calculate_ema(&[100.0; 40], 12);
        assert!(series.iter().all(|&v| v == 100.0));
    }

    #[test]
    fn ema_period_1_tracks_price() {
        let series = calculate_ema(&[10.0, 20.0, 30.0], 1);
        assert_eq!(series, vec![10.0, 20.0, 30.0]);
    }

    #[test]
    fn ema_prefix_is_stable() {
        let prices: Vec<f64> = (0..30).map(|i| 100.0 + (i as f64 * 0.7).sin()).collect();
        let full = calculate_ema(&prices, 8);
        let prefix = calculate_ema(&prices[..17], 8);
        assert_eq!(&full[..17], &prefix[..]);
    }

    #[test]
    fn ema_empty_values() {
        assert!(calculate_ema(&[], 3).is_empty());
    }

    #[test]
    fn ema_period_0() {
        assert!(calculate_ema(&[10.0, 20.0], 0).is_empty());
    }
}
