//! EMA crossover: buy when the fast EMA moves above the slow EMA, sell when it moves
//! below. Only the transition at the last bar of the window counts.

use crate::domain::indicator::ema::calculate_ema;
use crate::domain::indicator::sign;
use crate::domain::ohlcv::PriceWindow;
use crate::domain::signal::{Side, Signal};
use crate::domain::strategy::SignalEvaluator;

pub const NAME: &str = "ema_crossover";
pub const BULLISH_CROSS: &str = "ema_bullish_cross";
pub const BEARISH_CROSS: &str = "ema_bearish_cross";

#[derive(Debug, Clone, PartialEq)]
pub struct EmaCrossoverParams {
    pub fast_period: usize,
    pub slow_period: usize,
}

impl Default for EmaCrossoverParams {
    fn default() -> Self {
        EmaCrossoverParams {
            fast_period: 12,
            slow_period: 26,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct EmaCrossover {
    params: EmaCrossoverParams,
}

impl EmaCrossover {
    pub fn new(params: EmaCrossoverParams) -> Self {
        EmaCrossover { params }
    }

    pub fn params(&self) -> &EmaCrossoverParams {
        &self.params
    }
}

impl SignalEvaluator for EmaCrossover {
    fn name(&self) -> &'static str {
        NAME
    }

    fn min_bars(&self) -> usize {
        self.params.fast_period.max(self.params.slow_period) + 2
    }

    fn evaluate(&self, symbol: &str, window: &PriceWindow<'_>) -> Vec<Signal> {
        if window.len() < self.min_bars() {
            return Vec::new();
        }
        let Some(last) = window.last() else {
            return Vec::new();
        };

        let closes = window.closes();
        let fast = calculate_ema(&closes, self.params.fast_period);
        let slow = calculate_ema(&closes, self.params.slow_period);
        if fast.len() < 2 || slow.len() < 2 {
            return Vec::new();
        }

        let n = closes.len();
        let prev = sign(fast[n - 2] - slow[n - 2]);
        let curr = sign(fast[n - 1] - slow[n - 1]);

        let side = if prev <= 0 && curr > 0 {
            Side::Buy
        } else if prev >= 0 && curr < 0 {
            Side::Sell
        } else {
            return Vec::new();
        };
        let reason = match side {
            Side::Buy => BULLISH_CROSS,
            Side::Sell => BEARISH_CROSS,
        };

        vec![Signal::new(symbol, side, reason, Some(last.close), last.timestamp)]
    }
}
