//! Configuration validation.
//!
//! Every value a run depends on is checked here before any data is loaded.

use crate::domain::error::TradesimError;
use crate::domain::execution::ExecutionMode;
use crate::domain::risk::{StopLossMethod, TakeProfitMethod};
use crate::ports::config_port::ConfigPort;
use chrono::NaiveDate;

pub const EMA_SECTION: &str = "strategy.ema_crossover";
pub const RSI_SECTION: &str = "strategy.rsi_mean_reversion";

pub const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];
pub const LOG_FORMATS: &[&str] = &["text", "json"];

/// Run every check. Symbols are checked separately because the CLI may override them.
pub fn validate_config(config: &dyn ConfigPort) -> Result<(), TradesimError> {
    validate_backtest_config(config)?;
    validate_strategy_config(config)?;
    validate_risk_config(config)?;
    validate_execution_config(config)?;
    validate_logging_config(config)?;
    Ok(())
}

pub fn validate_backtest_config(config: &dyn ConfigPort) -> Result<(), TradesimError> {
    let capital = require_number(config, "backtest", "starting_capital", 100_000.0)?;
    if capital <= 0.0 {
        return Err(TradesimError::invalid(
            "backtest",
            "starting_capital",
            "starting_capital must be positive",
        ));
    }
    validate_dates(config)
}

pub fn validate_symbols(config: &dyn ConfigPort) -> Result<(), TradesimError> {
    let symbols = config.get_string("backtest", "symbols").unwrap_or_default();
    if parse_list(&symbols).is_empty() {
        return Err(TradesimError::ConfigMissing {
            section: "backtest".to_string(),
            key: "symbols".to_string(),
        });
    }
    Ok(())
}

fn validate_dates(config: &dyn ConfigPort) -> Result<(), TradesimError> {
    let start = parse_optional_date(config, "start_date")?;
    let end = parse_optional_date(config, "end_date")?;

    if let (Some(start), Some(end)) = (start, end) {
        if start > end {
            return Err(TradesimError::invalid(
                "backtest",
                "start_date",
                "start_date must not be after end_date",
            ));
        }
    }
    Ok(())
}

/// Optional `[backtest]` date in YYYY-MM-DD. Blank counts as absent.
pub fn parse_optional_date(
    config: &dyn ConfigPort,
    key: &str,
) -> Result<Option<NaiveDate>, TradesimError> {
    match config.get_string("backtest", key) {
        Some(s) if !s.trim().is_empty() => NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
            .map(Some)
            .map_err(|_| {
                TradesimError::invalid(
                    "backtest",
                    key,
                    format!("invalid {key} format, expected YYYY-MM-DD"),
                )
            }),
        _ => Ok(None),
    }
}

pub fn validate_strategy_config(config: &dyn ConfigPort) -> Result<(), TradesimError> {
    for key in ["fast_period", "slow_period"] {
        if require_integer(config, EMA_SECTION, key, 1)? < 1 {
            return Err(TradesimError::invalid(
                EMA_SECTION,
                key,
                format!("{key} must be at least 1"),
            ));
        }
    }

    if require_integer(config, RSI_SECTION, "rsi_period", 14)? < 1 {
        return Err(TradesimError::invalid(
            RSI_SECTION,
            "rsi_period",
            "rsi_period must be at least 1",
        ));
    }

    let oversold = require_number(config, RSI_SECTION, "oversold", 30.0)?;
    let overbought = require_number(config, RSI_SECTION, "overbought", 70.0)?;
    if !(0.0..=100.0).contains(&oversold) {
        return Err(TradesimError::invalid(
            RSI_SECTION,
            "oversold",
            "oversold must be between 0 and 100",
        ));
    }
    if !(0.0..=100.0).contains(&overbought) {
        return Err(TradesimError::invalid(
            RSI_SECTION,
            "overbought",
            "overbought must be between 0 and 100",
        ));
    }
    if oversold >= overbought {
        return Err(TradesimError::invalid(
            RSI_SECTION,
            "oversold",
            "oversold must be below overbought",
        ));
    }
    Ok(())
}

pub fn validate_risk_config(config: &dyn ConfigPort) -> Result<(), TradesimError> {
    let pct = require_number(config, "risk", "max_position_pct_of_capital", 10.0)?;
    if pct <= 0.0 || pct > 100.0 {
        return Err(TradesimError::invalid(
            "risk",
            "max_position_pct_of_capital",
            "max_position_pct_of_capital must be in (0, 100]",
        ));
    }

    if is_set(config, "risk", "fixed_risk_dollars")
        && require_number(config, "risk", "fixed_risk_dollars", 0.0)? <= 0.0
    {
        return Err(TradesimError::invalid(
            "risk",
            "fixed_risk_dollars",
            "fixed_risk_dollars must be a positive number",
        ));
    }

    if config.get_bool("risk", "stop_loss_enabled", true) {
        let method = config
            .get_string("risk", "stop_loss_method")
            .unwrap_or_else(|| "percent".to_string());
        if StopLossMethod::parse(&method).is_none() {
            return Err(TradesimError::invalid(
                "risk",
                "stop_loss_method",
                format!("unknown method '{method}'"),
            ));
        }
        if require_number(config, "risk", "stop_loss_value_pct", 1.5)? < 0.0 {
            return Err(TradesimError::invalid(
                "risk",
                "stop_loss_value_pct",
                "stop_loss_value_pct must be non-negative",
            ));
        }
    }

    if config.get_bool("risk", "take_profit_enabled", true) {
        let method = config
            .get_string("risk", "take_profit_method")
            .unwrap_or_else(|| "reward:risk".to_string());
        if TakeProfitMethod::parse(&method).is_none() {
            return Err(TradesimError::invalid(
                "risk",
                "take_profit_method",
                format!("unknown method '{method}'"),
            ));
        }
        if require_number(config, "risk", "take_profit_rr_ratio", 2.0)? < 0.0 {
            return Err(TradesimError::invalid(
                "risk",
                "take_profit_rr_ratio",
                "take_profit_rr_ratio must be non-negative",
            ));
        }
    }
    Ok(())
}

pub fn validate_execution_config(config: &dyn ConfigPort) -> Result<(), TradesimError> {
    let mode = config
        .get_string("execution", "mode")
        .unwrap_or_else(|| "paper".to_string());
    if ExecutionMode::parse(&mode).is_none() {
        return Err(TradesimError::invalid(
            "execution",
            "mode",
            format!("unknown mode '{mode}', expected paper or live"),
        ));
    }

    let model = config
        .get_string("execution", "slippage_model")
        .unwrap_or_else(|| "none".to_string());
    if !matches!(model.trim().to_lowercase().as_str(), "none" | "percent") {
        return Err(TradesimError::invalid(
            "execution",
            "slippage_model",
            format!("unknown slippage model '{model}', expected none or percent"),
        ));
    }

    if require_number(config, "execution", "slippage_value", 0.0)? < 0.0 {
        return Err(TradesimError::invalid(
            "execution",
            "slippage_value",
            "slippage_value must be non-negative",
        ));
    }
    if require_number(config, "execution", "commission_per_trade", 0.0)? < 0.0 {
        return Err(TradesimError::invalid(
            "execution",
            "commission_per_trade",
            "commission_per_trade must be non-negative",
        ));
    }
    Ok(())
}

pub fn validate_logging_config(config: &dyn ConfigPort) -> Result<(), TradesimError> {
    if let Some(level) = config.get_string("logging", "level") {
        if !LOG_LEVELS.contains(&level.trim().to_lowercase().as_str()) {
            return Err(TradesimError::invalid(
                "logging",
                "level",
                format!("unknown level '{level}'"),
            ));
        }
    }
    if let Some(format) = config.get_string("logging", "format") {
        if !LOG_FORMATS.contains(&format.trim().to_lowercase().as_str()) {
            return Err(TradesimError::invalid(
                "logging",
                "format",
                format!("unknown format '{format}', expected text or json"),
            ));
        }
    }
    Ok(())
}

fn is_set(config: &dyn ConfigPort, section: &str, key: &str) -> bool {
    config
        .get_string(section, key)
        .is_some_and(|s| !s.trim().is_empty())
}

/// Read a numeric key strictly. Absent or blank gives `default`; anything that is
/// not a finite number is rejected instead of falling back.
fn require_number(
    config: &dyn ConfigPort,
    section: &str,
    key: &str,
    default: f64,
) -> Result<f64, TradesimError> {
    let Some(raw) = config.get_string(section, key).filter(|s| !s.trim().is_empty()) else {
        return Ok(default);
    };
    let value: f64 = raw
        .trim()
        .parse()
        .map_err(|_| TradesimError::invalid(section, key, format!("'{raw}' is not a number")))?;
    if !value.is_finite() {
        return Err(TradesimError::invalid(
            section,
            key,
            format!("{key} must be a finite number"),
        ));
    }
    Ok(value)
}

fn require_integer(
    config: &dyn ConfigPort,
    section: &str,
    key: &str,
    default: i64,
) -> Result<i64, TradesimError> {
    match config.get_string(section, key).filter(|s| !s.trim().is_empty()) {
        Some(raw) => raw.trim().parse().map_err(|_| {
            TradesimError::invalid(section, key, format!("'{raw}' is not an integer"))
        }),
        None => Ok(default),
    }
}

/// Split a comma list, trimming entries and dropping blanks.
pub fn parse_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}
