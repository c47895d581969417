//! Portfolio ledger: cash, positions and mark-to-market equity.
//!
//! No negative-cash or negative-quantity guard: overspending and over-selling are
//! both allowed and simply show up in the numbers.

use chrono::{DateTime, Utc};
use std::collections::{BTreeMap, HashMap};

use super::execution::Fill;
use super::position::Position;
use super::signal::Side;

#[derive(Debug, Clone, PartialEq)]
pub struct EquityPoint {
    pub timestamp: DateTime<Utc>,
    pub symbol: String,
    pub equity: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Portfolio {
    pub cash: f64,
    pub initial_capital: f64,
    pub positions: BTreeMap<String, Position>,
}

impl Portfolio {
    pub fn new(initial_capital: f64) -> Self {
        Portfolio {
            cash: initial_capital,
            initial_capital,
            positions: BTreeMap::new(),
        }
    }

    pub fn get_position(&self, symbol: &str) -> Option<&Position> {
        self.positions.get(symbol)
    }

    pub fn position_count(&self) -> usize {
        self.positions.values().filter(|p| p.quantity != 0.0).count()
    }

    /// Buy: size-weighted average price, cash -= qty * price.
    /// Sell: cash += qty * price, average resets once the position is flat or short.
    pub fn apply_fill(&mut self, symbol: &str, side: Side, quantity: f64, price: f64) {
        let pos = self
            .positions
            .entry(symbol.to_string())
            .or_insert_with(|| Position::flat(symbol));

        match side {
            Side::Buy => {
                let new_qty = pos.quantity + quantity;
                if new_qty > 0.0 {
                    pos.avg_price = (pos.quantity * pos.avg_price + quantity * price) / new_qty;
                }
                pos.quantity = new_qty;
                self.cash -= quantity * price;
            }
            Side::Sell => {
                pos.quantity -= quantity;
                self.cash += quantity * price;
                if pos.quantity <= 0.0 {
                    pos.avg_price = 0.0;
                }
            }
        }

        tracing::debug!(
            symbol,
            quantity = pos.quantity,
            avg_price = pos.avg_price,
            cash = self.cash,
            "updated position"
        );
    }

    pub fn apply(&mut self, fill: &Fill) {
        self.apply_fill(&fill.symbol, fill.side, fill.quantity, fill.price);
    }

    /// cash + sum(quantity * mark), marking at the average price when `prices` has
    /// no entry for a symbol.
    pub fn equity(&self, prices: &HashMap<String, f64>) -> f64 {
        let position_value: f64 = self
            .positions
            .values()
            .map(|pos| {
                let mark = prices.get(&pos.symbol).copied().unwrap_or(pos.avg_price);
                pos.market_value(mark)
            })
            .sum();
        self.cash + position_value
    }
}
