//! Summary statistics over a finished backtest.

use super::backtest::BacktestResult;
use super::portfolio::EquityPoint;
use super::signal::Side;

const TRADING_DAYS_PER_YEAR: f64 = 252.0;

#[derive(Debug, Clone, PartialEq)]
pub struct Metrics {
    pub starting_capital: f64,
    pub final_equity: f64,
    pub total_return: f64,
    pub max_drawdown: f64,
    pub sharpe_ratio: f64,
    pub buy_fills: usize,
    pub sell_fills: usize,
    pub total_fills: usize,
    /// Symbols still holding a non-zero quantity at the end of the run.
    pub open_positions: usize,
    pub commission_accrued: f64,
}

impl Metrics {
    pub fn compute(result: &BacktestResult) -> Self {
        let starting_capital = result.portfolio.initial_capital;
        let final_equity = result.final_equity;

        let total_return = if starting_capital > 0.0 {
            (final_equity - starting_capital) / starting_capital
        } else {
            0.0
        };

        let buy_fills = result
            .trade_log
            .iter()
            .filter(|row| row.side == Side::Buy)
            .count();
        let total_fills = result.trade_log.len();

        Metrics {
            starting_capital,
            final_equity,
            total_return,
            max_drawdown: compute_drawdown(&result.equity_curve),
            sharpe_ratio: compute_sharpe(&result.equity_curve),
            buy_fills,
            sell_fills: total_fills - buy_fills,
            total_fills,
            open_positions: result.portfolio.position_count(),
            commission_accrued: result.commission_accrued,
        }
    }
}

/// Each symbol replays its own stretch of the curve, and points across a symbol
/// boundary are marked against different prices, so statistics never span one.
fn symbol_segments(equity_curve: &[EquityPoint]) -> impl Iterator<Item = &[EquityPoint]> {
    equity_curve.chunk_by(|a, b| a.symbol == b.symbol)
}

/// Largest peak-to-trough decline as a fraction of the peak, over any one
/// symbol's segment.
fn compute_drawdown(equity_curve: &[EquityPoint]) -> f64 {
    symbol_segments(equity_curve)
        .map(segment_drawdown)
        .fold(0.0_f64, f64::max)
}

fn segment_drawdown(segment: &[EquityPoint]) -> f64 {
    let Some(first) = segment.first() else {
        return 0.0;
    };

    let mut peak = first.equity;
    let mut max_dd = 0.0_f64;
    for point in segment {
        if point.equity > peak {
            peak = point.equity;
        } else if peak > 0.0 {
            max_dd = max_dd.max((peak - point.equity) / peak);
        }
    }
    max_dd
}

/// Annualised Sharpe ratio of step-to-step returns within each symbol segment,
/// pooled, with a zero risk-free rate.
fn compute_sharpe(equity_curve: &[EquityPoint]) -> f64 {
    let returns: Vec<f64> = symbol_segments(equity_curve)
        .flat_map(|segment| segment.windows(2))
        .map(|w| {
            let prev = w[0].equity;
            if prev > 0.0 {
                (w[1].equity - prev) / prev
            } else {
                0.0
            }
        })
        .collect();

    if returns.is_empty() {
        return 0.0;
    }

    let n = returns.len() as f64;
    let mean = returns.iter().sum::<f64>() / n;
    let variance = returns.iter().map(|r| (r - mean).powi(2)).sum::<f64>() / n;
    let stddev = variance.sqrt();

    if stddev > 0.0 {
        mean / stddev * TRADING_DAYS_PER_YEAR.sqrt()
    } else {
        0.0
    }
}
