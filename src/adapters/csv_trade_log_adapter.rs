//! CSV trade log writer.

use crate::domain::backtest::{TradeLogRow, TRADE_LOG_COLUMNS};
use crate::domain::error::TradesimError;
use crate::ports::trade_log_port::TradeLogPort;
use std::path::PathBuf;

pub struct CsvTradeLogAdapter {
    path: PathBuf,
}

impl CsvTradeLogAdapter {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }
}

fn csv_error(e: csv::Error) -> TradesimError {
    match e.into_kind() {
        csv::ErrorKind::Io(io) => TradesimError::Io(io),
        other => TradesimError::Data {
            reason: format!("failed to write trade log: {other:?}"),
        },
    }
}

impl TradeLogPort for CsvTradeLogAdapter {
    fn write(&self, rows: &[TradeLogRow]) -> Result<(), TradesimError> {
        let mut writer = csv::Writer::from_path(&self.path).map_err(csv_error)?;
        writer.write_record(TRADE_LOG_COLUMNS).map_err(csv_error)?;
        for row in rows {
            writer.write_record(row.to_record()).map_err(csv_error)?;
        }
        writer.flush()?;
        tracing::info!(path = %self.path.display(), rows = rows.len(), "wrote trade log");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::signal::Side;
    use chrono::DateTime;
    use std::fs;
    use tempfile::TempDir;

    fn row(side: Side, price: f64) -> TradeLogRow {
        TradeLogRow {
            timestamp: DateTime::from_timestamp(1_704_067_200, 0).unwrap(),
            symbol: "AAPL".into(),
            side,
            quantity: 10.0,
            price,
            strategy: "ema_crossover".into(),
        }
    }

    #[test]
    fn writes_header_and_rows_in_order() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("trades.csv");
        let adapter = CsvTradeLogAdapter::new(path.clone());

        adapter
            .write(&[row(Side::Buy, 100.5), row(Side::Sell, 99.0)])
            .unwrap();

        let content = fs::read_to_string(path).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines[0], "timestamp,symbol,side,quantity,price,strategy");
        assert_eq!(
            lines[1],
            "2024-01-01T00:00:00+00:00,AAPL,buy,10,100.5,ema_crossover"
        );
        assert_eq!(lines[2], "2024-01-01T00:00:00+00:00,AAPL,sell,10,99,ema_crossover");
        assert_eq!(lines.len(), 3);
    }

    #[test]
    fn empty_log_has_header_only() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("trades.csv");
        CsvTradeLogAdapter::new(path.clone()).write(&[]).unwrap();
        assert_eq!(
            fs::read_to_string(path).unwrap().trim_end(),
            "timestamp,symbol,side,quantity,price,strategy"
        );
    }

    #[test]
    fn unwritable_path_fails() {
        let adapter = CsvTradeLogAdapter::new(PathBuf::from("/nonexistent/dir/trades.csv"));
        assert!(adapter.write(&[]).is_err());
    }
}
