//! Per-symbol position held by the ledger.

#[derive(Debug, Clone, PartialEq)]
pub struct Position {
    pub symbol: String,
    pub quantity: f64,
    pub avg_price: f64,
}

impl Position {
    pub fn flat(symbol: &str) -> Self {
        Position {
            symbol: symbol.to_string(),
            quantity: 0.0,
            avg_price: 0.0,
        }
    }

    pub fn market_value(&self, price: f64) -> f64 {
        self.quantity * price
    }
}
