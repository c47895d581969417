//! OHLCV bar representation and the look-ahead-free price window.

use chrono::{DateTime, Utc};

#[derive(Debug, Clone, PartialEq)]
pub struct PriceBar {
    pub symbol: String,
    pub timestamp: DateTime<Utc>,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

impl PriceBar {
    /// False when any OHLCV field is missing (NaN) or otherwise non-finite.
    pub fn is_complete(&self) -> bool {
        [self.open, self.high, self.low, self.close, self.volume]
            .iter()
            .all(|v| v.is_finite())
    }
}

/// Drop incomplete bars, keeping the original order.
pub fn drop_incomplete(bars: &[PriceBar]) -> Vec<PriceBar> {
    bars.iter().filter(|b| b.is_complete()).cloned().collect()
}

/// The bars visible at one simulation step: a prefix of the symbol's series ending
/// at the current bar. Strategies never see anything past `last()`.
#[derive(Debug, Clone, Copy)]
pub struct PriceWindow<'a> {
    bars: &'a [PriceBar],
}

impl<'a> PriceWindow<'a> {
    pub fn new(bars: &'a [PriceBar]) -> Self {
        PriceWindow { bars }
    }

    /// Window over `bars[0..=index]`.
    pub fn up_to(bars: &'a [PriceBar], index: usize) -> Self {
        PriceWindow {
            bars: &bars[..=index],
        }
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    pub fn last(&self) -> Option<&'a PriceBar> {
        self.bars.last()
    }

    pub fn closes(&self) -> Vec<f64> {
        self.bars.iter().map(|b| b.close).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn bar(day: u32, close: f64) -> PriceBar {
        PriceBar {
            symbol: "AAPL".into(),
            timestamp: NaiveDate::from_ymd_opt(2024, 1, day)
                .unwrap()
                .and_hms_opt(0, 0, 0)
                .unwrap()
                .and_utc(),
            open: close,
            high: close + 1.0,
            low: close - 1.0,
            close,
            volume: 1_000.0,
        }
    }

    #[test]
    fn complete_bar() {
        assert!(bar(1, 100.0).is_complete());
    }

    #[test]
    fn nan_close_is_incomplete() {
        let mut b = bar(1, 100.0);
        b.close = f64::NAN;
        assert!(!b.is_complete());
    }

    #[test]
    fn nan_volume_is_incomplete() {
        let mut b = bar(1, 100.0);
        b.volume = f64::NAN;
        assert!(!b.is_complete());
    }

    #[test]
    fn drop_incomplete_keeps_order() {
        let mut missing = bar(2, 101.0);
        missing.open = f64::NAN;
        let bars = vec![bar(1, 100.0), missing, bar(3, 102.0)];

        let cleaned = drop_incomplete(&bars);
        assert_eq!(cleaned.len(), 2);
        assert_eq!(cleaned[0].close, 100.0);
        assert_eq!(cleaned[1].close, 102.0);
    }

    #[test]
    fn window_up_to_includes_current_bar() {
        let bars = vec![bar(1, 100.0), bar(2, 101.0), bar(3, 102.0)];
        let window = PriceWindow::up_to(&bars, 1);

        assert_eq!(window.len(), 2);
        assert_eq!(window.last().unwrap().close, 101.0);
        assert_eq!(window.closes(), vec![100.0, 101.0]);
    }

    #[test]
    fn empty_window() {
        let window = PriceWindow::new(&[]);
        assert!(window.is_empty());
        assert!(window.last().is_none());
    }
}
