//! Trade log output port.

use crate::domain::backtest::TradeLogRow;
use crate::domain::error::TradesimError;

pub trait TradeLogPort {
    /// Write every row, in order, under the fixed column header.
    fn write(&self, rows: &[TradeLogRow]) -> Result<(), TradesimError>;
}
