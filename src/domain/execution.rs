//! Fill simulation for approved orders.
//!
//! Every submitted order fills exactly once on the paper venue at the reference
//! price moved against the trader by the slippage fraction. Commission is carried as
//! configuration and never folded into the fill price.

use chrono::{DateTime, Utc};
use std::fmt;

use super::error::TradesimError;
use super::risk::OrderRequest;
use super::signal::Side;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecutionMode {
    Paper,
    Live,
}

impl ExecutionMode {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "paper" => Some(ExecutionMode::Paper),
            "live" => Some(ExecutionMode::Live),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ExecutionMode::Paper => "paper",
            ExecutionMode::Live => "live",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SlippageModel {
    None,
    /// Slippage in percent of the reference price (0.05 = 0.05%).
    Percent(f64),
}

impl SlippageModel {
    /// Slippage as a fraction of price.
    pub fn fraction(&self) -> f64 {
        match self {
            SlippageModel::None => 0.0,
            SlippageModel::Percent(pct) => pct / 100.0,
        }
    }
}

/// Configuration for the execution venue.
#[derive(Debug, Clone, PartialEq)]
pub struct ExecutionConfig {
    pub mode: ExecutionMode,
    /// Lets `Live` run on the paper venue instead of failing.
    pub allow_paper_fallback: bool,
    pub slippage: SlippageModel,
    pub commission_per_trade: f64,
}

impl Default for ExecutionConfig {
    fn default() -> Self {
        ExecutionConfig {
            mode: ExecutionMode::Paper,
            allow_paper_fallback: false,
            slippage: SlippageModel::None,
            commission_per_trade: 0.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Venue {
    Paper,
}

impl fmt::Display for Venue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Venue::Paper => f.write_str("paper"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Fill {
    pub symbol: String,
    pub side: Side,
    pub quantity: f64,
    pub price: f64,
    pub timestamp: DateTime<Utc>,
    pub venue: Venue,
}

/// Buy fills above the reference price, sell fills below it.
pub fn apply_slippage(reference_price: f64, side: Side, slippage_pct: f64) -> f64 {
    reference_price * (1.0 + side.direction() * slippage_pct)
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExecutionSimulator {
    slippage_pct: f64,
    commission_per_trade: f64,
    degraded_from_live: bool,
}

impl ExecutionSimulator {
    /// Build a simulator from configuration. `Live` without an explicit
    /// `allow_paper_fallback` fails instead of silently simulating.
    pub fn new(config: &ExecutionConfig) -> Result<Self, TradesimError> {
        let degraded_from_live = match config.mode {
            ExecutionMode::Paper => false,
            ExecutionMode::Live if config.allow_paper_fallback => {
                tracing::warn!("live execution not implemented; routing to paper");
                true
            }
            ExecutionMode::Live => {
                return Err(TradesimError::UnsupportedExecutionMode {
                    mode: config.mode.as_str().to_string(),
                });
            }
        };

        Ok(ExecutionSimulator {
            slippage_pct: config.slippage.fraction(),
            commission_per_trade: config.commission_per_trade,
            degraded_from_live,
        })
    }

    /// Paper simulator with `slippage_pct` given as a fraction (0.01 = 1%).
    pub fn paper(slippage_pct: f64, commission_per_trade: f64) -> Self {
        ExecutionSimulator {
            slippage_pct,
            commission_per_trade,
            degraded_from_live: false,
        }
    }

    pub fn slippage_pct(&self) -> f64 {
        self.slippage_pct
    }

    pub fn commission_per_trade(&self) -> f64 {
        self.commission_per_trade
    }

    pub fn is_degraded_from_live(&self) -> bool {
        self.degraded_from_live
    }

    pub fn submit(
        &self,
        order: &OrderRequest,
        reference_price: f64,
        timestamp: DateTime<Utc>,
    ) -> Fill {
        if self.degraded_from_live {
            tracing::warn!(symbol = %order.symbol, "live execution not implemented; routing to paper");
        }

        let price = apply_slippage(reference_price, order.side, self.slippage_pct);
        tracing::debug!(
            symbol = %order.symbol,
            side = %order.side,
            quantity = order.quantity,
            price,
            "paper fill"
        );

        Fill {
            symbol: order.symbol.clone(),
            side: order.side,
            quantity: order.quantity,
            price,
            timestamp,
            venue: Venue::Paper,
        }
    }
}
