use serde::Deserialize;
use std::fs;
use std::path::Path;
use std::time::Duration;

use crate::error::{Error, Result};
use crate::model::{AnalysisOptions, BandPolicy, ChartType, TrendType, REFERENCE_REGION};

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct AppConfig {
    /// Path or http(s) URL of the dataset JSON.
    pub dataset: String,
    pub reference_region: String,
    /// Alternate spellings of the reference region found in the dataset.
    pub reference_aliases: Vec<String>,
    pub default_regions: Vec<String>,
    pub trend_line: TrendType,
    pub chart_type: ChartType,
    pub show_predictions: bool,
    pub show_differentials: bool,
    pub confidence_band: BandPolicy,
    /// Items without any year at or after this one are hidden from listings by default.
    pub recent_year_cutoff: i32,
    pub request_timeout_seconds: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            dataset: "unit_price_trends_with_price.json".to_string(),
            reference_region: REFERENCE_REGION.to_string(),
            reference_aliases: vec!["STATE".to_string()],
            default_regions: vec![
                REFERENCE_REGION.to_string(),
                "1".to_string(),
                "2".to_string(),
                "3".to_string(),
                "4".to_string(),
            ],
            trend_line: TrendType::Linear,
            chart_type: ChartType::Line,
            show_predictions: false,
            show_differentials: false,
            confidence_band: BandPolicy::Fixed,
            recent_year_cutoff: 2020,
            request_timeout_seconds: 30,
        }
    }
}

impl AppConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_seconds)
    }

    /// Analysis options seeded from the configured defaults.
    pub fn analysis_options(&self) -> AnalysisOptions {
        AnalysisOptions {
            selected_regions: self.default_regions.clone(),
            trend_line: self.trend_line,
            chart_type: self.chart_type,
            show_predictions: self.show_predictions,
            show_differentials: self.show_differentials,
            band: self.confidence_band,
        }
    }

    fn validate(self) -> Result<Self> {
        if self.reference_region.trim().is_empty() {
            return Err(Error::Config("reference_region must not be empty".into()));
        }
        if self.dataset.trim().is_empty() {
            return Err(Error::Config("dataset must not be empty".into()));
        }
        Ok(self)
    }
}

pub fn load_config(path: impl AsRef<Path>) -> Result<AppConfig> {
    let content = fs::read_to_string(path)?;
    let config: AppConfig = serde_json::from_str(&content)?;
    config.validate()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let cfg = AppConfig::default();
        assert_eq!(cfg.reference_region, "statewide");
        assert_eq!(cfg.reference_aliases, vec!["STATE"]);
        assert_eq!(cfg.recent_year_cutoff, 2020);
        assert_eq!(cfg.confidence_band, BandPolicy::Fixed);

        let opts = cfg.analysis_options();
        assert_eq!(opts.selected_regions.len(), 5);
        assert_eq!(opts.trend_line, TrendType::Linear);
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"dataset": "https://example.com/prices.json", "trend_line": "polynomial", "confidence_band": "volatility"}}"#
        )
        .unwrap();

        let cfg = load_config(file.path()).unwrap();
        assert_eq!(cfg.dataset, "https://example.com/prices.json");
        assert_eq!(cfg.trend_line, TrendType::Polynomial);
        assert_eq!(cfg.confidence_band, BandPolicy::Volatility);
        assert_eq!(cfg.reference_region, "statewide");
        assert_eq!(cfg.request_timeout(), Duration::from_secs(30));
    }

    #[test]
    fn test_invalid_values_are_rejected() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"reference_region": "  "}}"#).unwrap();
        assert!(matches!(load_config(file.path()), Err(Error::Config(_))));

        let mut bad = tempfile::NamedTempFile::new().unwrap();
        write!(bad, r#"{{"trend_line": "cubic"}}"#).unwrap();
        assert!(matches!(load_config(bad.path()), Err(Error::Json(_))));
    }
}
