#![allow(dead_code)]

use chrono::{DateTime, NaiveDate, Utc};
use std::collections::HashMap;
use std::process::ExitCode;
use tradesim::domain::error::TradesimError;
pub use tradesim::domain::ohlcv::PriceBar;
use tradesim::ports::data_port::DataPort;

pub struct MockDataPort {
    pub data: HashMap<String, Vec<PriceBar>>,
    pub errors: HashMap<String, String>,
}

impl MockDataPort {
    pub fn new() -> Self {
        Self {
            data: HashMap::new(),
            errors: HashMap::new(),
        }
    }

    pub fn with_bars(mut self, symbol: &str, bars: Vec<PriceBar>) -> Self {
        self.data.insert(symbol.to_string(), bars);
        self
    }

    pub fn with_error(mut self, symbol: &str, reason: &str) -> Self {
        self.errors.insert(symbol.to_string(), reason.to_string());
        self
    }
}

impl DataPort for MockDataPort {
    fn fetch_bars(
        &self,
        symbol: &str,
        start_date: Option<NaiveDate>,
        end_date: Option<NaiveDate>,
    ) -> Result<Vec<PriceBar>, TradesimError> {
        if let Some(reason) = self.errors.get(symbol) {
            return Err(TradesimError::Data {
                reason: reason.clone(),
            });
        }
        Ok(self
            .data
            .get(symbol)
            .cloned()
            .unwrap_or_default()
            .into_iter()
            .filter(|b| {
                let d = b.timestamp.date_naive();
                start_date.is_none_or(|s| d >= s) && end_date.is_none_or(|e| d <= e)
            })
            .collect())
    }

    fn list_symbols(&self) -> Result<Vec<String>, TradesimError> {
        let mut symbols: Vec<String> = self.data.keys().cloned().collect();
        symbols.sort();
        Ok(symbols)
    }
}

pub fn day(i: usize) -> DateTime<Utc> {
    let start = NaiveDate::from_ymd_opt(2020, 1, 1)
        .unwrap()
        .and_hms_opt(0, 0, 0)
        .unwrap()
        .and_utc();
    start + chrono::Duration::days(i as i64)
}

/// One bar per day from 2020-01-01 with open = high = low = close.
pub fn bars_from_closes(symbol: &str, closes: &[f64]) -> Vec<PriceBar> {
    closes
        .iter()
        .enumerate()
        .map(|(i, &close)| PriceBar {
            symbol: symbol.to_string(),
            timestamp: day(i),
            open: close,
            high: close,
            low: close,
            close,
            volume: 1_000.0,
        })
        .collect()
}

/// `flat_len` bars at 100, then +0.5 per bar up to `total` bars.
pub fn flat_then_rising(flat_len: usize, total: usize) -> Vec<f64> {
    (0..total)
        .map(|i| {
            if i < flat_len {
                100.0
            } else {
                100.0 + 0.5 * (i - flat_len + 1) as f64
            }
        })
        .collect()
}

/// Deterministic zig-zag series that produces several EMA crossings.
pub fn zigzag(total: usize, leg: usize) -> Vec<f64> {
    (0..total)
        .map(|i| {
            let phase = i % (2 * leg);
            if phase < leg {
                100.0 + phase as f64
            } else {
                100.0 + (2 * leg - phase) as f64
            }
        })
        .collect()
}

pub fn is_success(code: ExitCode) -> bool {
    format!("{code:?}") == format!("{:?}", ExitCode::SUCCESS)
}

pub fn same_exit_code(a: ExitCode, b: ExitCode) -> bool {
    format!("{a:?}") == format!("{b:?}")
}
