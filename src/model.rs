// Core structs: price tables, fitted points, predictions, analysis results
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::utils::region_sort_key;

/// Canonical key of the reference ("statewide") series.
pub const REFERENCE_REGION: &str = "statewide";

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    pub year: i32,
    pub price: f64,
}

/// Ascending-by-year price points of one region of one item.
pub type Series = Vec<PricePoint>;

/// One year's record for a region, as found in the dataset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct YearEntry {
    pub price: f64,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub unit: String,
}

/// Item-level description and unit.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ItemMetadata {
    pub description: String,
    pub unit: String,
}

/// All region/year prices of a single pay item.
#[derive(Debug, Clone, PartialEq)]
pub struct ItemPriceTable {
    item_id: String,
    reference_region: String,
    regions: BTreeMap<String, BTreeMap<i32, YearEntry>>,
}

impl ItemPriceTable {
    pub fn new(item_id: impl Into<String>, reference_region: impl Into<String>) -> Self {
        Self {
            item_id: item_id.into(),
            reference_region: reference_region.into(),
            regions: BTreeMap::new(),
        }
    }

    /// Inserts a year entry. A later insert for the same region and year replaces the earlier one.
    pub fn insert(&mut self, region: impl Into<String>, year: i32, entry: YearEntry) -> Option<YearEntry> {
        self.regions.entry(region.into()).or_default().insert(year, entry)
    }

    pub fn item_id(&self) -> &str {
        &self.item_id
    }

    pub fn reference_region(&self) -> &str {
        &self.reference_region
    }

    pub fn contains_region(&self, region: &str) -> bool {
        self.regions.contains_key(region)
    }

    /// Region keys with the reference region first, then numeric codes ascending.
    pub fn regions(&self) -> Vec<&str> {
        let mut keys: Vec<&str> = self.regions.keys().map(String::as_str).collect();
        keys.sort_by_key(|k| region_sort_key(k, &self.reference_region));
        keys
    }

    pub fn entries(&self, region: &str) -> Option<&BTreeMap<i32, YearEntry>> {
        self.regions.get(region)
    }

    pub fn price(&self, region: &str, year: i32) -> Option<f64> {
        self.regions.get(region)?.get(&year).map(|e| e.price)
    }

    /// Ascending series for a region, or `None` if the region is absent.
    pub fn series(&self, region: &str) -> Option<Series> {
        self.regions.get(region).map(|years| {
            years
                .iter()
                .map(|(&year, entry)| PricePoint { year, price: entry.price })
                .collect()
        })
    }

    /// Description and unit taken from the reference region's earliest year,
    /// falling back to the earliest year of the first region in region order.
    pub fn metadata(&self) -> ItemMetadata {
        let reference = self
            .regions
            .get(&self.reference_region)
            .and_then(|years| years.values().next());
        let entry = reference.or_else(|| {
            self.regions()
                .into_iter()
                .find_map(|r| self.regions.get(r).and_then(|years| years.values().next()))
        });

        entry
            .map(|e| ItemMetadata {
                description: e.description.clone(),
                unit: e.unit.clone(),
            })
            .unwrap_or_default()
    }

    /// True when any region has a year at or after `year`.
    pub fn has_data_since(&self, year: i32) -> bool {
        self.regions
            .values()
            .any(|years| years.range(year..).next().is_some())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrendType {
    None,
    #[default]
    Linear,
    Exponential,
    Polynomial,
    Moving,
}

impl TrendType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TrendType::None => "none",
            TrendType::Linear => "linear",
            TrendType::Exponential => "exponential",
            TrendType::Polynomial => "polynomial",
            TrendType::Moving => "moving",
        }
    }
}

impl fmt::Display for TrendType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TrendType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "none" => Ok(TrendType::None),
            "linear" => Ok(TrendType::Linear),
            "exponential" => Ok(TrendType::Exponential),
            "polynomial" => Ok(TrendType::Polynomial),
            "moving" => Ok(TrendType::Moving),
            other => Err(format!("unknown trend type: {}", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChartType {
    #[default]
    Line,
    Bar,
}

impl FromStr for ChartType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "line" => Ok(ChartType::Line),
            "bar" => Ok(ChartType::Bar),
            other => Err(format!("unknown chart type: {}", other)),
        }
    }
}

/// How prediction bounds are derived from a point forecast.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BandPolicy {
    /// Fixed ±10% around the forecast.
    #[default]
    Fixed,
    /// Band widened by the series' return volatility and the forecast horizon.
    Volatility,
}

impl FromStr for BandPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "fixed" => Ok(BandPolicy::Fixed),
            "volatility" => Ok(BandPolicy::Volatility),
            other => Err(format!("unknown confidence band policy: {}", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FittedPoint {
    pub x: i32,
    pub y: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    pub year: i32,
    pub value: f64,
    pub lower: f64,
    pub upper: f64,
}

/// region -> year -> percent deviation from the reference series.
pub type Differentials = BTreeMap<String, BTreeMap<i32, f64>>;

/// Per-request analysis configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisOptions {
    pub selected_regions: Vec<String>,
    pub trend_line: TrendType,
    pub chart_type: ChartType,
    pub show_predictions: bool,
    pub show_differentials: bool,
    pub band: BandPolicy,
}

impl Default for AnalysisOptions {
    fn default() -> Self {
        Self {
            selected_regions: vec![REFERENCE_REGION.to_string()],
            trend_line: TrendType::default(),
            chart_type: ChartType::default(),
            show_predictions: false,
            show_differentials: false,
            band: BandPolicy::default(),
        }
    }
}

/// Summary figures consumed by the chart, CSV and report collaborators.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub current_price: f64,
    pub price_change_percent: f64,
    pub volatility: f64,
    pub regional_variation: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub predictions: Option<BTreeMap<String, Vec<Prediction>>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub differentials: Option<Differentials>,
}

/// Observed series of one selected region and its fitted trend, if any.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegionAnalysis {
    pub region: String,
    pub series: Series,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trend: Option<Vec<FittedPoint>>,
}

/// Everything computed for one item under one set of options.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisBundle {
    pub item_id: String,
    pub reference_region: String,
    pub metadata: ItemMetadata,
    pub options: AnalysisOptions,
    pub regions: Vec<RegionAnalysis>,
    pub result: AnalysisResult,
}

impl AnalysisBundle {
    /// Min and max observed year over the analyzed regions.
    pub fn year_bounds(&self) -> Option<(i32, i32)> {
        self.regions
            .iter()
            .flat_map(|r| r.series.iter().map(|p| p.year))
            .fold(None, |acc, y| match acc {
                None => Some((y, y)),
                Some((lo, hi)) => Some((lo.min(y), hi.max(y))),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(price: f64, description: &str) -> YearEntry {
        YearEntry {
            price,
            description: description.to_string(),
            unit: "LF".to_string(),
        }
    }

    #[test]
    fn test_series_is_sorted_by_year() {
        let mut table = ItemPriceTable::new("303-01", REFERENCE_REGION);
        table.insert("1", 2022, entry(118.0, "a"));
        table.insert("1", 2020, entry(90.0, "a"));
        table.insert("1", 2021, entry(105.0, "a"));

        let years: Vec<i32> = table.series("1").unwrap().iter().map(|p| p.year).collect();
        assert_eq!(years, vec![2020, 2021, 2022]);
        assert!(table.series("2").is_none());
    }

    #[test]
    fn test_duplicate_year_last_wins() {
        let mut table = ItemPriceTable::new("x", REFERENCE_REGION);
        assert!(table.insert("1", 2020, entry(1.0, "first")).is_none());
        let replaced = table.insert("1", 2020, entry(2.0, "second"));
        assert_eq!(replaced.map(|e| e.price), Some(1.0));
        assert_eq!(table.price("1", 2020), Some(2.0));
    }

    #[test]
    fn test_metadata_prefers_reference_earliest_year() {
        let mut table = ItemPriceTable::new("x", REFERENCE_REGION);
        table.insert("1", 2015, entry(5.0, "regional text"));
        table.insert(REFERENCE_REGION, 2021, entry(7.0, "late statewide"));
        table.insert(REFERENCE_REGION, 2019, entry(6.0, "early statewide"));

        assert_eq!(table.metadata().description, "early statewide");
    }

    #[test]
    fn test_metadata_falls_back_to_first_region() {
        let mut table = ItemPriceTable::new("x", REFERENCE_REGION);
        table.insert("2", 2010, entry(5.0, "region two"));
        table.insert("1", 2018, entry(5.0, "region one"));

        assert_eq!(table.metadata().description, "region one");
        assert_eq!(ItemPriceTable::new("y", REFERENCE_REGION).metadata(), ItemMetadata::default());
    }

    #[test]
    fn test_region_order_reference_first() {
        let mut table = ItemPriceTable::new("x", REFERENCE_REGION);
        for r in ["10", "2", REFERENCE_REGION, "1"] {
            table.insert(r, 2020, entry(1.0, ""));
        }
        assert_eq!(table.regions(), vec![REFERENCE_REGION, "1", "2", "10"]);
    }

    #[test]
    fn test_year_bounds_and_recency() {
        let mut table = ItemPriceTable::new("x", REFERENCE_REGION);
        table.insert("1", 2012, entry(1.0, ""));
        table.insert("2", 2019, entry(1.0, ""));
        table.insert("3", 2021, entry(1.0, ""));

        let region = |name: &str| RegionAnalysis {
            region: name.to_string(),
            series: table.series(name).unwrap_or_default(),
            trend: None,
        };
        let mut bundle = AnalysisBundle {
            item_id: "x".to_string(),
            reference_region: REFERENCE_REGION.to_string(),
            metadata: ItemMetadata::default(),
            options: AnalysisOptions::default(),
            regions: vec![region("2"), region("1")],
            result: AnalysisResult {
                current_price: 0.0,
                price_change_percent: 0.0,
                volatility: 0.0,
                regional_variation: 0.0,
                predictions: None,
                differentials: None,
            },
        };
        assert_eq!(bundle.year_bounds(), Some((2012, 2019)));
        bundle.regions.clear();
        assert_eq!(bundle.year_bounds(), None);

        assert!(table.has_data_since(2020));
        assert!(!table.has_data_since(2022));
    }

    #[test]
    fn test_enum_parsing() {
        assert_eq!("Exponential".parse::<TrendType>(), Ok(TrendType::Exponential));
        assert_eq!("none".parse::<TrendType>(), Ok(TrendType::None));
        assert!("cubic".parse::<TrendType>().is_err());
        assert_eq!("bar".parse::<ChartType>(), Ok(ChartType::Bar));
        assert_eq!("volatility".parse::<BandPolicy>(), Ok(BandPolicy::Volatility));
    }
}
