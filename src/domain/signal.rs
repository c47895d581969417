//! Trade direction and the per-bar signal a strategy emits.

use chrono::{DateTime, Utc};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Side {
    Buy,
    Sell,
}

impl Side {
    pub fn as_str(&self) -> &'static str {
        match self {
            Side::Buy => "buy",
            Side::Sell => "sell",
        }
    }

    /// +1 for buys, -1 for sells.
    pub fn direction(&self) -> f64 {
        match self {
            Side::Buy => 1.0,
            Side::Sell => -1.0,
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Signal {
    pub symbol: String,
    pub side: Side,
    pub reason: &'static str,
    pub price: Option<f64>,
    pub timestamp: DateTime<Utc>,
    pub stop_loss: Option<f64>,
    pub take_profit: Option<f64>,
    pub quantity: Option<f64>,
}

impl Signal {
    /// A signal without stop/target/quantity hints.
    pub fn new(
        symbol: &str,
        side: Side,
        reason: &'static str,
        price: Option<f64>,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Signal {
            symbol: symbol.to_string(),
            side,
            reason,
            price,
            timestamp,
            stop_loss: None,
            take_profit: None,
            quantity: None,
        }
    }
}
