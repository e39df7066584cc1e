//! Unit price trend analysis for government pay items.
//!
//! Loads an `item -> region -> year -> price` dataset once, then answers
//! analysis requests: trend fitting, short-horizon forecasts, volatility,
//! regional differentials, chart descriptors, CSV export and text reports.

pub mod analyzer;
pub mod chart;
pub mod config;
pub mod error;
pub mod export;
pub mod model;
pub mod normalizer;
pub mod report;
pub mod source;
pub mod storage;
pub mod utils;

pub use error::{Error, Result};
