//! Backtest engine and event loop.
//!
//! Symbols are replayed one after another in lexicographic order against a single
//! shared portfolio, so the order in which fills draw on cash is fixed. Within a
//! symbol, bar `i` only ever exposes `bars[0..=i]` to the strategies.

use chrono::{DateTime, NaiveDate, Utc};
use std::collections::{BTreeMap, HashMap};

use super::error::TradesimError;
use super::execution::ExecutionSimulator;
use super::ohlcv::{drop_incomplete, PriceBar, PriceWindow};
use super::portfolio::{EquityPoint, Portfolio};
use super::risk::RiskGate;
use super::signal::Side;
use super::strategy::{SignalEvaluator, Strategy};

/// Bars skipped before the first evaluated step.
pub const WARMUP_BARS: usize = 50;

/// Trade log column order.
pub const TRADE_LOG_COLUMNS: [&str; 6] =
    ["timestamp", "symbol", "side", "quantity", "price", "strategy"];

/// Bars per symbol, iterated in symbol order.
pub type PriceSeries = BTreeMap<String, Vec<PriceBar>>;

/// Run parameters. An empty `symbols` replays every series given to the engine;
/// the date bounds are inclusive.
#[derive(Debug, Clone, PartialEq)]
pub struct BacktestConfig {
    pub starting_capital: f64,
    pub symbols: Vec<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

impl Default for BacktestConfig {
    fn default() -> Self {
        BacktestConfig {
            starting_capital: 100_000.0,
            symbols: Vec::new(),
            start_date: None,
            end_date: None,
        }
    }
}

impl BacktestConfig {
    fn in_date_range(&self, bar: &PriceBar) -> bool {
        let date = bar.timestamp.date_naive();
        self.start_date.is_none_or(|start| date >= start)
            && self.end_date.is_none_or(|end| date <= end)
    }

    /// The series to replay, keyed in symbol order. A configured symbol with no
    /// series maps to no bars.
    fn select<'a>(&self, series: &'a PriceSeries) -> BTreeMap<String, &'a [PriceBar]> {
        if self.symbols.is_empty() {
            return series
                .iter()
                .map(|(symbol, bars)| (symbol.clone(), bars.as_slice()))
                .collect();
        }
        self.symbols
            .iter()
            .map(|symbol| {
                let bars = series.get(symbol).map(Vec::as_slice).unwrap_or(&[]);
                (symbol.clone(), bars)
            })
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TradeLogRow {
    pub timestamp: DateTime<Utc>,
    pub symbol: String,
    pub side: Side,
    pub quantity: f64,
    pub price: f64,
    pub strategy: String,
}

impl TradeLogRow {
    /// Row cells in [`TRADE_LOG_COLUMNS`] order.
    pub fn to_record(&self) -> [String; 6] {
        [
            self.timestamp.to_rfc3339(),
            self.symbol.clone(),
            self.side.to_string(),
            self.quantity.to_string(),
            self.price.to_string(),
            self.strategy.clone(),
        ]
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct BacktestResult {
    pub portfolio: Portfolio,
    pub trade_log: Vec<TradeLogRow>,
    pub equity_curve: Vec<EquityPoint>,
    pub final_equity: f64,
    /// Commission per trade times fill count. Reported only, never charged to cash.
    pub commission_accrued: f64,
}

pub fn run_backtest(
    series: &PriceSeries,
    strategies: &[Strategy],
    risk_gate: &RiskGate,
    executor: &ExecutionSimulator,
    config: &BacktestConfig,
) -> Result<BacktestResult, TradesimError> {
    let selected = config.select(series);
    let _span = tracing::info_span!(
        "run_backtest",
        symbols = selected.len(),
        strategies = strategies.len(),
        starting_capital = config.starting_capital
    )
    .entered();
    tracing::info!("starting backtest");

    let mut portfolio = Portfolio::new(config.starting_capital);
    let mut trade_log = Vec::new();
    let mut equity_curve = Vec::new();
    let mut last_closes: HashMap<String, f64> = HashMap::with_capacity(selected.len());

    for (symbol, raw_bars) in &selected {
        let complete = drop_incomplete(raw_bars);
        if complete.len() < raw_bars.len() {
            tracing::warn!(
                symbol = %symbol,
                dropped = raw_bars.len() - complete.len(),
                "dropped bars with missing values"
            );
        }
        let bars: Vec<PriceBar> = complete
            .into_iter()
            .filter(|bar| config.in_date_range(bar))
            .collect();

        if let Some(last) = bars.last() {
            last_closes.insert(symbol.clone(), last.close);
        }
        if bars.len() <= WARMUP_BARS {
            tracing::warn!(
                symbol = %symbol,
                bars = bars.len(),
                warmup = WARMUP_BARS,
                "not enough bars to simulate past warm-up"
            );
            continue;
        }

        for i in WARMUP_BARS..bars.len() {
            let window = PriceWindow::up_to(&bars, i);
            let bar = &bars[i];
            let mark = bar.close;
            let prices_now = HashMap::from([(symbol.clone(), mark)]);
            let equity = portfolio.equity(&prices_now);

            for strategy in strategies {
                for signal in strategy.evaluate(symbol, &window) {
                    let reference_price = signal.price.unwrap_or(mark);
                    let Some(order) =
                        risk_gate.approve(&signal.symbol, signal.side, reference_price, equity)
                    else {
                        continue;
                    };

                    let fill = executor.submit(&order, reference_price, bar.timestamp);
                    portfolio.apply(&fill);
                    trade_log.push(TradeLogRow {
                        timestamp: fill.timestamp,
                        symbol: fill.symbol,
                        side: fill.side,
                        quantity: fill.quantity,
                        price: fill.price,
                        strategy: strategy.name().to_string(),
                    });
                }
            }

            equity_curve.push(EquityPoint {
                timestamp: bar.timestamp,
                symbol: symbol.clone(),
                equity: portfolio.equity(&prices_now),
            });
        }
    }

    for symbol in selected.keys() {
        if !last_closes.contains_key(symbol) {
            return Err(TradesimError::MissingPriceData {
                symbol: symbol.clone(),
            });
        }
    }

    let final_equity = portfolio.equity(&last_closes);
    let commission_accrued = executor.commission_per_trade() * trade_log.len() as f64;
    tracing::info!(final_equity, trades = trade_log.len(), "backtest finished");

    Ok(BacktestResult {
        portfolio,
        trade_log,
        equity_curve,
        final_equity,
        commission_accrued,
    })
}
