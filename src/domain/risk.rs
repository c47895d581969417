//! Risk gate: position sizing, stop-loss and take-profit for approved orders.
//!
//! The gate turns a raw trading intent into a sized [`OrderRequest`] or rejects it.
//! Rejection is not an error; the caller simply drops the signal.

use crate::domain::signal::Side;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderType {
    Market,
}

impl OrderType {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderType::Market => "market",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeInForce {
    Day,
}

impl TimeInForce {
    pub fn as_str(&self) -> &'static str {
        match self {
            TimeInForce::Day => "day",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct OrderRequest {
    pub symbol: String,
    pub side: Side,
    pub order_type: OrderType,
    pub quantity: f64,
    pub limit_price: Option<f64>,
    pub stop_loss: Option<f64>,
    pub take_profit: Option<f64>,
    pub time_in_force: TimeInForce,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopLossMethod {
    Percent,
}

impl StopLossMethod {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "percent" => Some(StopLossMethod::Percent),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TakeProfitMethod {
    RewardRisk,
}

impl TakeProfitMethod {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "reward:risk" => Some(TakeProfitMethod::RewardRisk),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct StopLossConfig {
    pub enabled: bool,
    pub method: Option<StopLossMethod>,
    /// Distance from the entry price in percent (1.5 = 1.5%).
    pub value_pct: f64,
}

impl Default for StopLossConfig {
    fn default() -> Self {
        StopLossConfig {
            enabled: true,
            method: Some(StopLossMethod::Percent),
            value_pct: 1.5,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TakeProfitConfig {
    pub enabled: bool,
    pub method: Option<TakeProfitMethod>,
    pub rr_ratio: f64,
}

impl Default for TakeProfitConfig {
    fn default() -> Self {
        TakeProfitConfig {
            enabled: true,
            method: Some(TakeProfitMethod::RewardRisk),
            rr_ratio: 2.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RiskConfig {
    /// Share of equity one order may commit, in percent (10 = 10%).
    pub max_position_pct_of_capital: f64,
    /// Optional hard cap on the dollar value of one order.
    pub fixed_risk_dollars: Option<f64>,
    pub stop_loss: StopLossConfig,
    pub take_profit: TakeProfitConfig,
}

impl Default for RiskConfig {
    fn default() -> Self {
        RiskConfig {
            max_position_pct_of_capital: 10.0,
            fixed_risk_dollars: None,
            stop_loss: StopLossConfig::default(),
            take_profit: TakeProfitConfig::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RiskGate {
    config: RiskConfig,
}

impl RiskGate {
    pub fn new(config: RiskConfig) -> Self {
        RiskGate { config }
    }

    /// max_dollars = equity * pct / 100, capped by fixed_risk_dollars; qty = max_dollars / price.
    pub fn position_size(&self, reference_price: f64, account_equity: f64) -> f64 {
        let mut max_dollars = account_equity * self.config.max_position_pct_of_capital / 100.0;
        if let Some(cap) = self.config.fixed_risk_dollars {
            max_dollars = max_dollars.min(cap);
        }
        if reference_price <= 0.0 {
            return 0.0;
        }
        (max_dollars / reference_price).max(0.0)
    }

    /// Stop-loss and take-profit levels for an entry at `entry_price`.
    /// No take-profit is produced without a stop-loss.
    pub fn stops(&self, side: Side, entry_price: f64) -> (Option<f64>, Option<f64>) {
        let sl = &self.config.stop_loss;
        let stop_loss = match (sl.enabled, sl.method) {
            (true, Some(StopLossMethod::Percent)) => {
                let pct = sl.value_pct / 100.0;
                Some(entry_price * (1.0 - side.direction() * pct))
            }
            _ => None,
        };

        let tp = &self.config.take_profit;
        let take_profit = match (tp.enabled, tp.method, stop_loss) {
            (true, Some(TakeProfitMethod::RewardRisk), Some(stop)) => {
                let risk_per_unit = (entry_price - stop).abs();
                let reward = risk_per_unit * tp.rr_ratio;
                Some(entry_price + side.direction() * reward)
            }
            _ => None,
        };

        (stop_loss, take_profit)
    }

    pub fn approve(
        &self,
        symbol: &str,
        side: Side,
        reference_price: f64,
        account_equity: f64,
    ) -> Option<OrderRequest> {
        let quantity = self.position_size(reference_price, account_equity);
        if quantity <= 0.0 || !quantity.is_finite() {
            tracing::info!(
                symbol,
                %side,
                reference_price,
                account_equity,
                "risk blocked order: zero position size"
            );
            return None;
        }

        let (stop_loss, take_profit) = self.stops(side, reference_price);

        Some(OrderRequest {
            symbol: symbol.to_string(),
            side,
            order_type: OrderType::Market,
            quantity,
            limit_price: None,
            stop_loss,
            take_profit,
            time_in_force: TimeInForce::Day,
        })
    }
}
