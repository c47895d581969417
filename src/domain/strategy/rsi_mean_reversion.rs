//! RSI mean reversion: buy when the last RSI is oversold, sell when overbought.

use crate::domain::indicator::rsi::calculate_rsi;
use crate::domain::ohlcv::PriceWindow;
use crate::domain::signal::{Side, Signal};
use crate::domain::strategy::SignalEvaluator;

pub const NAME: &str = "rsi_mean_reversion";
pub const OVERSOLD: &str = "rsi_oversold";
pub const OVERBOUGHT: &str = "rsi_overbought";

#[derive(Debug, Clone, PartialEq)]
pub struct RsiParams {
    pub rsi_period: usize,
    pub oversold: f64,
    pub overbought: f64,
}

impl Default for RsiParams {
    fn default() -> Self {
        RsiParams {
            rsi_period: 14,
            oversold: 30.0,
            overbought: 70.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RsiMeanReversion {
    params: RsiParams,
}

impl RsiMeanReversion {
    pub fn new(params: RsiParams) -> Self {
        RsiMeanReversion { params }
    }

    pub fn params(&self) -> &RsiParams {
        &self.params
    }
}

impl SignalEvaluator for RsiMeanReversion {
    fn name(&self) -> &'static str {
        NAME
    }

    fn min_bars(&self) -> usize {
        self.params.rsi_period + 2
    }

    fn evaluate(&self, symbol: &str, window: &PriceWindow<'_>) -> Vec<Signal> {
        if window.len() < self.min_bars() {
            return Vec::new();
        }
        let Some(last) = window.last() else {
            return Vec::new();
        };

        let rsi = match calculate_rsi(&window.closes(), self.params.rsi_period).last() {
            Some(&v) => v,
            None => return Vec::new(),
        };

        let (side, reason) = if rsi <= self.params.oversold {
            (Side::Buy, OVERSOLD)
        } else if rsi >= self.params.overbought {
            (Side::Sell, OVERBOUGHT)
        } else {
            return Vec::new();
        };

        vec![Signal::new(symbol, side, reason, Some(last.close), last.timestamp)]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ohlcv::PriceBar;
    use chrono::DateTime;

    fn make_bars(closes: &[f64]) -> Vec<PriceBar> {
        closes
            .iter()
            .enumerate()
            .map(|(i, &close)| PriceBar {
                symbol: "TEST".into(),
                timestamp: DateTime::from_timestamp(1_704_067_200 + i as i64 * 3_600, 0).unwrap(),
                open: close,
                high: close,
                low: close,
                close,
                volume: 500.0,
            })
            .collect()
    }

    fn default_strategy() -> RsiMeanReversion {
        RsiMeanReversion::new(RsiParams::default())
    }

    /// +1 per bar for 30 bars (RSI stays neutral), then -1 per bar for 40 bars.
    fn rise_then_decline() -> Vec<f64> {
        let mut closes: Vec<f64> = (0..=30).map(|i| 100.0 + i as f64).collect();
        closes.extend((1..=40).map(|k| 130.0 - k as f64));
        closes
    }

    fn first_signal_index(
        strategy: &RsiMeanReversion,
        bars: &[PriceBar],
        side: Side,
    ) -> Option<(usize, Signal)> {
        (0..bars.len()).find_map(|i| {
            strategy
                .evaluate("TEST", &PriceWindow::up_to(bars, i))
                .into_iter()
                .find(|s| s.side == side)
                .map(|s| (i, s))
        })
    }

    #[test]
    fn min_bars_is_period_plus_two() {
        assert_eq!(default_strategy().min_bars(), 16);
    }

    #[test]
    fn insufficient_history_is_silent() {
        // 15 falling bars give RSI 0, but 15 < 16
        let closes: Vec<f64> = (0..15).map(|i| 100.0 - i as f64).collect();
        let bars = make_bars(&closes);
        assert!(default_strategy()
            .evaluate("TEST", &PriceWindow::new(&bars))
            .is_empty());
    }

    #[test]
    fn declining_series_buys_on_first_oversold_bar() {
        let bars = make_bars(&rise_then_decline());
        let (idx, signal) = first_signal_index(&default_strategy(), &bars, Side::Buy).unwrap();

        // RSI = 100 * (13/14)^k after k declines: 30.55 at k = 16, 28.37 at k = 17
        assert_eq!(idx, 47);
        assert_eq!(signal.side, Side::Buy);
        assert_eq!(signal.reason, OVERSOLD);
        assert_eq!(signal.price, Some(113.0));
    }

    #[test]
    fn strictly_declining_series_is_oversold_at_first_eligible_bar() {
        let closes: Vec<f64> = (0..30).map(|i| 100.0 - i as f64 * 0.5).collect();
        let bars = make_bars(&closes);
        let (idx, signal) = first_signal_index(&default_strategy(), &bars, Side::Buy).unwrap();
        assert_eq!(idx, 15);
        assert_eq!(signal.side, Side::Buy);
    }

    #[test]
    fn first_decline_after_gains_is_overbought() {
        // one loss after a winning run: RSI = 100 * 13/14
        let bars = make_bars(&rise_then_decline()[..32]);
        let signals = default_strategy().evaluate("TEST", &PriceWindow::new(&bars));
        assert_eq!(signals.len(), 1);
        assert_eq!(signals[0].side, Side::Sell);
        assert_eq!(signals[0].reason, OVERBOUGHT);
    }

    #[test]
    fn rising_series_is_neutral() {
        let closes: Vec<f64> = (0..40).map(|i| 100.0 + i as f64).collect();
        let bars = make_bars(&closes);
        assert!(first_signal_index(&default_strategy(), &bars, Side::Buy).is_none());
        assert!(first_signal_index(&default_strategy(), &bars, Side::Sell).is_none());
    }

    #[test]
    fn decline_then_rally_sells_when_overbought() {
        // k rallies after a losing run give RSI = 100 * (1 - (13/14)^k)
        let mut closes: Vec<f64> = (0..=30).map(|i| 200.0 - i as f64).collect();
        closes.extend((1..=30).map(|k| 170.0 + k as f64));
        let bars = make_bars(&closes);

        let signals: Vec<(usize, Side)> = (0..bars.len())
            .flat_map(|i| {
                default_strategy()
                    .evaluate("TEST", &PriceWindow::up_to(&bars, i))
                    .into_iter()
                    .map(move |s| (i, s.side))
            })
            .collect();

        // the losing run itself is deeply oversold
        assert!(signals.iter().any(|&(i, side)| i <= 30 && side == Side::Buy));
        let first_sell = signals.iter().find(|(_, side)| *side == Side::Sell).unwrap();
        // 1 - (13/14)^16 = 0.6945, 1 - (13/14)^17 = 0.7163
        assert_eq!(first_sell.0, 47);
    }

    #[test]
    fn thresholds_are_configurable() {
        let strict = RsiMeanReversion::new(RsiParams {
            rsi_period: 14,
            oversold: 10.0,
            overbought: 90.0,
        });
        let bars = make_bars(&rise_then_decline());
        let (idx, _) = first_signal_index(&strict, &bars, Side::Buy).unwrap();
        // (13/14)^k <= 0.10 first holds at k = 32
        assert_eq!(idx, 62);
    }
}
