// Analyzer module: trend fitting, forecasting, volatility and regional differentials.

pub mod trend;
pub mod prediction;
pub mod volatility;
pub mod differential;
pub mod orchestrator;

// Re-export the main entry points for ease of use.
pub use differential::DifferentialAnalyzer;
pub use orchestrator::AnalysisOrchestrator;
pub use prediction::Predictor;
pub use trend::{Curve, TrendFitter};
pub use volatility::VolatilityEstimator;
