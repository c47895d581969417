//! RSI (Relative Strength Index) indicator.
//!
//! Wilder-style smoothing of gains and losses, seeded with the first price change:
//! avg[t] = avg[t-1] + (x[t] - avg[t-1]) / n
//!
//! Formula: RSI = 100 - (100 / (1 + avg_gain / avg_loss))
//! If avg_loss == 0: RSI = 50 (neutral). Index 0 has no change and is also 50.

pub const NEUTRAL_RSI: f64 = 50.0;

pub fn calculate_rsi(closes: &[f64], period: usize) -> Vec<f64> {
    if closes.is_empty() {
        return Vec::new();
    }
    if period == 0 {
        return vec![NEUTRAL_RSI; closes.len()];
    }

    let n = period as f64;
    let mut values = Vec::with_capacity(closes.len());
    values.push(NEUTRAL_RSI);

    let mut averages: Option<(f64, f64)> = None;

    for pair in closes.windows(2) {
        let change = pair[1] - pair[0];
        let gain = change.max(0.0);
        let loss = (-change).max(0.0);

        let (avg_gain, avg_loss) = match averages {
            None => (gain, loss),
            Some((g, l)) => (g + (gain - g) / n, l + (loss - l) / n),
        };
        averages = Some((avg_gain, avg_loss));

        let rsi = if avg_loss == 0.0 {
            NEUTRAL_RSI
        } else {
            100.0 - (100.0 / (1.0 + avg_gain / avg_loss))
        };
        values.push(rsi);
    }

    values
}
