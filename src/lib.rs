//! Core library for the dexter-charts project.
//!
//! Turns Uniswap swap history into daily OHLC candles with idle days filled
//! in, and computes the safety-order / take-profit levels a DCA bot would
//! place around the latest price.

pub mod chart;
pub mod config;
pub mod errors;
pub mod models;
pub mod monitor;
pub mod pipeline;
pub mod subgraph;
pub mod utils;
