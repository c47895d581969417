//! Strategy evaluators and the name registry.
//!
//! Each strategy is a pure function of a [`PriceWindow`]: it only sees bars up to and
//! including the current one. The set of strategies is closed ([`Strategy`]) and
//! resolved from configuration names through [`REGISTRY`].

pub mod ema_crossover;
pub mod rsi_mean_reversion;

pub use ema_crossover::{EmaCrossover, EmaCrossoverParams};
pub use rsi_mean_reversion::{RsiMeanReversion, RsiParams};

use crate::domain::ohlcv::PriceWindow;
use crate::domain::signal::Signal;

pub trait SignalEvaluator {
    /// Configuration name, also written to the trade log.
    fn name(&self) -> &'static str;

    /// Minimum window length before any signal can be emitted.
    fn min_bars(&self) -> usize;

    fn evaluate(&self, symbol: &str, window: &PriceWindow<'_>) -> Vec<Signal>;
}

#[derive(Debug, Clone, PartialEq)]
pub enum Strategy {
    EmaCrossover(EmaCrossover),
    RsiMeanReversion(RsiMeanReversion),
}

impl SignalEvaluator for Strategy {
    fn name(&self) -> &'static str {
        match self {
            Strategy::EmaCrossover(s) => s.name(),
            Strategy::RsiMeanReversion(s) => s.name(),
        }
    }

    fn min_bars(&self) -> usize {
        match self {
            Strategy::EmaCrossover(s) => s.min_bars(),
            Strategy::RsiMeanReversion(s) => s.min_bars(),
        }
    }

    fn evaluate(&self, symbol: &str, window: &PriceWindow<'_>) -> Vec<Signal> {
        match self {
            Strategy::EmaCrossover(s) => s.evaluate(symbol, window),
            Strategy::RsiMeanReversion(s) => s.evaluate(symbol, window),
        }
    }
}

/// Per-strategy parameter blocks, one per known strategy.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StrategySettings {
    pub ema_crossover: EmaCrossoverParams,
    pub rsi_mean_reversion: RsiParams,
}

type Constructor = fn(&StrategySettings) -> Strategy;

fn build_ema_crossover(settings: &StrategySettings) -> Strategy {
    Strategy::EmaCrossover(EmaCrossover::new(settings.ema_crossover.clone()))
}

fn build_rsi_mean_reversion(settings: &StrategySettings) -> Strategy {
    Strategy::RsiMeanReversion(RsiMeanReversion::new(settings.rsi_mean_reversion.clone()))
}

pub const REGISTRY: &[(&str, Constructor)] = &[
    (ema_crossover::NAME, build_ema_crossover),
    (rsi_mean_reversion::NAME, build_rsi_mean_reversion),
];

pub fn is_known(name: &str) -> bool {
    REGISTRY.iter().any(|(n, _)| *n == name)
}

/// Build the active strategies in configured order. Unknown names are logged and
/// skipped for the whole run.
pub fn resolve_strategies(active: &[String], settings: &StrategySettings) -> Vec<Strategy> {
    let mut strategies = Vec::with_capacity(active.len());
    for name in active {
        let name = name.trim();
        match REGISTRY.iter().find(|(n, _)| *n == name) {
            Some((_, build)) => strategies.push(build(settings)),
            None => tracing::warn!(strategy = %name, "unknown strategy in config, skipping"),
        }
    }
    strategies
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(strategies: &[Strategy]) -> Vec<&'static str> {
        strategies.iter().map(|s| s.name()).collect()
    }

    #[test]
    fn resolve_keeps_configured_order() {
        let active = vec!["rsi_mean_reversion".to_string(), "ema_crossover".to_string()];
        let strategies = resolve_strategies(&active, &StrategySettings::default());
        assert_eq!(names(&strategies), vec!["rsi_mean_reversion", "ema_crossover"]);
    }

    #[test]
    fn resolve_skips_unknown_names() {
        let active = vec![
            "ema_crossover".to_string(),
            "macd_divergence".to_string(),
            "rsi_mean_reversion".to_string(),
        ];
        let strategies = resolve_strategies(&active, &StrategySettings::default());
        assert_eq!(names(&strategies), vec!["ema_crossover", "rsi_mean_reversion"]);
    }

    #[test]
    fn resolve_trims_whitespace() {
        let active = vec![" ema_crossover ".to_string()];
        let strategies = resolve_strategies(&active, &StrategySettings::default());
        assert_eq!(names(&strategies), vec!["ema_crossover"]);
    }

    #[test]
    fn resolve_empty_list() {
        assert!(resolve_strategies(&[], &StrategySettings::default()).is_empty());
    }

    #[test]
    fn resolve_applies_parameters() {
        let settings = StrategySettings {
            ema_crossover: EmaCrossoverParams {
                fast_period: 5,
                slow_period: 20,
            },
            ..Default::default()
        };
        let strategies = resolve_strategies(&["ema_crossover".to_string()], &settings);
        assert_eq!(strategies[0].min_bars(), 22);
    }

    #[test]
    fn known_names() {
        assert!(is_known("ema_crossover"));
        assert!(is_known("rsi_mean_reversion"));
        assert!(!is_known("sma_crossover"));
    }
}
