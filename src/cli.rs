//! CLI definition and dispatch.

use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use crate::adapters::csv_adapter::CsvAdapter;
use crate::adapters::csv_trade_log_adapter::CsvTradeLogAdapter;
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::domain::backtest::{self as backtest_engine, BacktestConfig, BacktestResult, PriceSeries};
use crate::domain::config_validation::{
    parse_list, parse_optional_date, validate_config, validate_symbols, EMA_SECTION, RSI_SECTION,
};
use crate::domain::error::TradesimError;
use crate::domain::execution::{ExecutionConfig, ExecutionMode, ExecutionSimulator, SlippageModel};
use crate::domain::metrics::Metrics;
use crate::domain::risk::{
    RiskConfig, RiskGate, StopLossConfig, StopLossMethod, TakeProfitConfig, TakeProfitMethod,
};
use crate::domain::strategy::{
    resolve_strategies, EmaCrossoverParams, RsiParams, SignalEvaluator, StrategySettings,
};
use crate::logging::init_tracing;
use crate::ports::config_port::ConfigPort;
use crate::ports::data_port::DataPort;
use crate::ports::trade_log_port::TradeLogPort;

#[derive(Parser, Debug)]
#[command(name = "tradesim", about = "Deterministic bar-by-bar strategy backtester")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Replay historical bars through the configured strategies
    Backtest {
        #[arg(short, long)]
        config: PathBuf,
        #[arg(short, long)]
        data_dir: PathBuf,
        /// Trade log CSV, overrides [backtest] trade_log_file
        #[arg(short, long)]
        trade_log: Option<PathBuf>,
        /// Comma-separated symbols, overrides [backtest] symbols
        #[arg(long)]
        symbols: Option<String>,
    },
    /// Validate a configuration file
    Validate {
        #[arg(short, long)]
        config: PathBuf,
    },
    /// List symbols with a CSV file in the data directory
    ListSymbols {
        #[arg(short, long)]
        data_dir: PathBuf,
    },
}

pub fn run(cli: Cli) -> ExitCode {
    match cli.command {
        Command::Backtest {
            config,
            data_dir,
            trade_log,
            symbols,
        } => run_backtest(&config, &data_dir, trade_log, symbols.as_deref()),
        Command::Validate { config } => run_validate(&config),
        Command::ListSymbols { data_dir } => run_list_symbols(&data_dir),
    }
}

fn fail(err: &TradesimError) -> ExitCode {
    eprintln!("error: {err}");
    err.into()
}

pub fn load_config(path: &Path) -> Result<FileConfigAdapter, ExitCode> {
    FileConfigAdapter::from_file(path).map_err(|e| fail(&e))
}

fn init_logging(config: &dyn ConfigPort) {
    let level = config
        .get_string("logging", "level")
        .unwrap_or_else(|| "info".to_string());
    let format = config
        .get_string("logging", "format")
        .unwrap_or_else(|| "text".to_string());
    if let Err(e) = init_tracing(&level, &format) {
        eprintln!("warning: {e}");
    }
}

pub fn run_backtest(
    config_path: &Path,
    data_dir: &Path,
    trade_log_override: Option<PathBuf>,
    symbols_override: Option<&str>,
) -> ExitCode {
    eprintln!("Loading config from {}", config_path.display());
    let adapter = match load_config(config_path) {
        Ok(a) => a,
        Err(code) => return code,
    };
    init_logging(&adapter);

    let data_port = CsvAdapter::new(data_dir.to_path_buf());
    let result = match run_pipeline(&adapter, &data_port, symbols_override) {
        Ok(r) => r,
        Err(e) => return fail(&e),
    };

    print_summary(&Metrics::compute(&result));

    if let Some(path) = trade_log_path(&adapter, trade_log_override) {
        let writer = CsvTradeLogAdapter::new(path.clone());
        if let Err(e) = writer.write(&result.trade_log) {
            return fail(&e);
        }
        eprintln!("\nTrade log written to: {}", path.display());
    }

    ExitCode::SUCCESS
}

/// `--trade-log` wins over `[backtest] trade_log_file`; blank means no log.
pub fn trade_log_path(config: &dyn ConfigPort, cli_override: Option<PathBuf>) -> Option<PathBuf> {
    cli_override.or_else(|| {
        config
            .get_string("backtest", "trade_log_file")
            .filter(|s| !s.trim().is_empty())
            .map(PathBuf::from)
    })
}

/// Validate, build every component from `config`, load bars and replay them.
pub fn run_pipeline(
    config: &dyn ConfigPort,
    data_port: &dyn DataPort,
    symbols_override: Option<&str>,
) -> Result<BacktestResult, TradesimError> {
    validate_config(config)?;
    if symbols_override.is_none() {
        validate_symbols(config)?;
    }

    let bt_config = build_backtest_config(config, symbols_override)?;
    if bt_config.symbols.is_empty() {
        return Err(TradesimError::ConfigMissing {
            section: "backtest".to_string(),
            key: "symbols".to_string(),
        });
    }

    let executor = ExecutionSimulator::new(&build_execution_config(config)?)?;
    let risk_gate = RiskGate::new(build_risk_config(config)?);
    let strategies = resolve_strategies(
        &active_strategy_names(config),
        &build_strategy_settings(config),
    );
    if strategies.is_empty() {
        tracing::warn!("no active strategies; the run will not trade");
    }

    let mut series = PriceSeries::new();
    for symbol in &bt_config.symbols {
        let bars = data_port.fetch_bars(symbol, bt_config.start_date, bt_config.end_date)?;
        series.insert(symbol.clone(), bars);
    }

    eprintln!(
        "Running backtest: {} symbols, strategies [{}]",
        series.len(),
        strategies
            .iter()
            .map(|s| s.name())
            .collect::<Vec<_>>()
            .join(", ")
    );

    backtest_engine::run_backtest(&series, &strategies, &risk_gate, &executor, &bt_config)
}

pub fn build_backtest_config(
    config: &dyn ConfigPort,
    symbols_override: Option<&str>,
) -> Result<BacktestConfig, TradesimError> {
    let symbols = match symbols_override {
        Some(s) => parse_list(s),
        None => parse_list(&config.get_string("backtest", "symbols").unwrap_or_default()),
    };

    Ok(BacktestConfig {
        starting_capital: config.get_double("backtest", "starting_capital", 100_000.0),
        symbols,
        start_date: parse_optional_date(config, "start_date")?,
        end_date: parse_optional_date(config, "end_date")?,
    })
}

pub fn active_strategy_names(config: &dyn ConfigPort) -> Vec<String> {
    parse_list(&config.get_string("strategies", "active").unwrap_or_default())
}

pub fn build_strategy_settings(config: &dyn ConfigPort) -> StrategySettings {
    let ema = EmaCrossoverParams::default();
    let rsi = RsiParams::default();
    StrategySettings {
        ema_crossover: EmaCrossoverParams {
            fast_period: config.get_int(EMA_SECTION, "fast_period", ema.fast_period as i64).max(1)
                as usize,
            slow_period: config.get_int(EMA_SECTION, "slow_period", ema.slow_period as i64).max(1)
                as usize,
        },
        rsi_mean_reversion: RsiParams {
            rsi_period: config.get_int(RSI_SECTION, "rsi_period", rsi.rsi_period as i64).max(1)
                as usize,
            oversold: config.get_double(RSI_SECTION, "oversold", rsi.oversold),
            overbought: config.get_double(RSI_SECTION, "overbought", rsi.overbought),
        },
    }
}

pub fn build_risk_config(config: &dyn ConfigPort) -> Result<RiskConfig, TradesimError> {
    let defaults = RiskConfig::default();

    let fixed_risk_dollars = config
        .get_string("risk", "fixed_risk_dollars")
        .filter(|s| !s.trim().is_empty())
        .map(|_| config.get_double("risk", "fixed_risk_dollars", 0.0))
        .filter(|v| *v > 0.0);

    let stop_method = config
        .get_string("risk", "stop_loss_method")
        .unwrap_or_else(|| "percent".to_string());
    let tp_method = config
        .get_string("risk", "take_profit_method")
        .unwrap_or_else(|| "reward:risk".to_string());

    let stop_loss_enabled = config.get_bool("risk", "stop_loss_enabled", true);
    let stop_method = StopLossMethod::parse(&stop_method);
    if stop_loss_enabled && stop_method.is_none() {
        return Err(TradesimError::invalid("risk", "stop_loss_method", "unknown method"));
    }

    let take_profit_enabled = config.get_bool("risk", "take_profit_enabled", true);
    let tp_method = TakeProfitMethod::parse(&tp_method);
    if take_profit_enabled && tp_method.is_none() {
        return Err(TradesimError::invalid("risk", "take_profit_method", "unknown method"));
    }

    Ok(RiskConfig {
        max_position_pct_of_capital: config.get_double(
            "risk",
            "max_position_pct_of_capital",
            defaults.max_position_pct_of_capital,
        ),
        fixed_risk_dollars,
        stop_loss: StopLossConfig {
            enabled: stop_loss_enabled,
            method: stop_method,
            value_pct: config.get_double(
                "risk",
                "stop_loss_value_pct",
                defaults.stop_loss.value_pct,
            ),
        },
        take_profit: TakeProfitConfig {
            enabled: take_profit_enabled,
            method: tp_method,
            rr_ratio: config.get_double(
                "risk",
                "take_profit_rr_ratio",
                defaults.take_profit.rr_ratio,
            ),
        },
    })
}

pub fn build_execution_config(config: &dyn ConfigPort) -> Result<ExecutionConfig, TradesimError> {
    let mode_str = config
        .get_string("execution", "mode")
        .unwrap_or_else(|| "paper".to_string());
    let mode = ExecutionMode::parse(&mode_str).ok_or_else(|| {
        TradesimError::invalid("execution", "mode", format!("unknown mode '{mode_str}'"))
    })?;

    let model = config
        .get_string("execution", "slippage_model")
        .unwrap_or_else(|| "none".to_string());
    let slippage = match model.trim().to_lowercase().as_str() {
        "none" => SlippageModel::None,
        "percent" => SlippageModel::Percent(config.get_double("execution", "slippage_value", 0.0)),
        _ => {
            return Err(TradesimError::invalid(
                "execution",
                "slippage_model",
                format!("unknown slippage model '{model}'"),
            ));
        }
    };

    Ok(ExecutionConfig {
        mode,
        allow_paper_fallback: config.get_bool("execution", "allow_paper_fallback", false),
        slippage,
        commission_per_trade: config.get_double("execution", "commission_per_trade", 0.0),
    })
}

fn print_summary(metrics: &Metrics) {
    eprintln!("\n=== Backtest Results ===");
    eprintln!("Starting Capital: {:.2}", metrics.starting_capital);
    eprintln!("Final Equity:     {:.2}", metrics.final_equity);
    eprintln!("Total Return:     {:.2}%", metrics.total_return * 100.0);
    eprintln!("Sharpe Ratio:     {:.2}", metrics.sharpe_ratio);
    eprintln!("Max Drawdown:     -{:.1}%", metrics.max_drawdown * 100.0);
    eprintln!(
        "Fills:            {} ({} buy, {} sell)",
        metrics.total_fills, metrics.buy_fills, metrics.sell_fills
    );
    eprintln!("Open Positions:   {}", metrics.open_positions);
    eprintln!("Commission:       {:.2} (accrued, not charged)", metrics.commission_accrued);
}

pub fn run_validate(config_path: &Path) -> ExitCode {
    eprintln!("Validating config: {}", config_path.display());
    let adapter = match load_config(config_path) {
        Ok(a) => a,
        Err(code) => return code,
    };

    if let Err(e) = validate_config(&adapter).and_then(|()| validate_symbols(&adapter)) {
        return fail(&e);
    }

    let names = active_strategy_names(&adapter);
    eprintln!("\nActive strategies:");
    for name in &names {
        let marker = if crate::domain::strategy::is_known(name) {
            ""
        } else {
            "  (unknown, will be skipped)"
        };
        eprintln!("  {name}{marker}");
    }

    eprintln!("\nConfiguration is valid.");
    ExitCode::SUCCESS
}

pub fn run_list_symbols(data_dir: &Path) -> ExitCode {
    let adapter = CsvAdapter::new(data_dir.to_path_buf());
    let symbols = match adapter.list_symbols() {
        Ok(s) => s,
        Err(e) => return fail(&e),
    };

    if symbols.is_empty() {
        eprintln!("No symbols found in {}", data_dir.display());
    } else {
        for symbol in &symbols {
            println!("{symbol}");
        }
        eprintln!("{} symbols found", symbols.len());
    }
    ExitCode::SUCCESS
}
