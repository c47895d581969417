//! tradesim: deterministic bar-by-bar strategy backtester.
//!
//! Hexagonal architecture: simulation core in [`domain`], port traits in [`ports`],
//! concrete implementations in [`adapters`].

pub mod domain;
pub mod ports;
pub mod adapters;
pub mod cli;
pub mod logging;
