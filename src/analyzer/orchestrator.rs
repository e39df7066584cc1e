use std::collections::BTreeMap;
use tracing::{debug, warn};

use crate::analyzer::differential::DifferentialAnalyzer;
use crate::analyzer::prediction::Predictor;
use crate::analyzer::trend::TrendFitter;
use crate::analyzer::volatility::VolatilityEstimator;
use crate::model::{
    AnalysisBundle, AnalysisOptions, AnalysisResult, ItemPriceTable, PricePoint, RegionAnalysis,
    TrendType,
};

/// Runs the fitting, forecasting, volatility and differential steps for one
/// item under one set of options. Holds no state between requests.
pub struct AnalysisOrchestrator;

impl AnalysisOrchestrator {
    pub fn analyze(table: &ItemPriceTable, options: &AnalysisOptions) -> AnalysisBundle {
        let selected = Self::dedup_regions(&options.selected_regions);
        debug!(
            "Analyzing item {} for regions {:?} (trend: {})",
            table.item_id(),
            selected,
            options.trend_line
        );

        for region in selected.iter().filter(|r| !table.contains_region(r)) {
            warn!("Item {} has no data for region {:?}", table.item_id(), region);
        }

        // Series and trend per selected region present in the table.
        let regions: Vec<RegionAnalysis> = selected
            .iter()
            .filter_map(|region| {
                let series = table.series(region)?;
                let trend = if options.trend_line != TrendType::None && series.len() >= 2 {
                    Some(TrendFitter::fit(&series, options.trend_line))
                } else {
                    None
                };
                Some(RegionAnalysis {
                    region: region.clone(),
                    series,
                    trend,
                })
            })
            .collect();

        let predictions = if options.show_predictions {
            let per_region: BTreeMap<String, Vec<_>> = regions
                .iter()
                .filter(|r| r.trend.as_ref().is_some_and(|t| !t.is_empty()))
                .filter_map(|r| {
                    Predictor::predict(&r.series, options.trend_line, options.band)
                        .map(|p| (r.region.clone(), p))
                })
                .collect();
            (!per_region.is_empty()).then_some(per_region)
        } else {
            None
        };

        let differentials = if options.show_differentials {
            DifferentialAnalyzer::compute(table, table.reference_region(), &selected)
        } else {
            None
        };
        if options.show_differentials && differentials.is_none() {
            debug!("Differentials skipped: reference region not present or not selected");
        }

        let combined = Self::combined_points(&regions);
        let regional_variation = differentials
            .as_ref()
            .map(DifferentialAnalyzer::regional_variation)
            .unwrap_or(0.0);

        let result = AnalysisResult {
            current_price: Self::current_price(&combined),
            price_change_percent: Self::price_change_percent(&combined),
            volatility: VolatilityEstimator::estimate(&combined),
            regional_variation,
            predictions,
            differentials,
        };
        debug!(
            "Item {}: current {:.2}, change {:.2}%, volatility {:.4}, variation {:.2}",
            table.item_id(),
            result.current_price,
            result.price_change_percent,
            result.volatility,
            result.regional_variation
        );

        AnalysisBundle {
            item_id: table.item_id().to_string(),
            reference_region: table.reference_region().to_string(),
            metadata: table.metadata(),
            options: options.clone(),
            regions,
            result,
        }
    }

    /// All selected regions' points in one sequence, stably sorted by year so
    /// that points of the same year keep selection order.
    pub fn combined_points(regions: &[RegionAnalysis]) -> Vec<PricePoint> {
        let mut points: Vec<PricePoint> = regions.iter().flat_map(|r| r.series.iter().copied()).collect();
        points.sort_by_key(|p| p.year);
        points
    }

    /// Price of the first point, in selection order, at the latest year.
    pub fn current_price(combined: &[PricePoint]) -> f64 {
        let Some(latest) = combined.iter().map(|p| p.year).max() else {
            return 0.0;
        };
        combined
            .iter()
            .find(|p| p.year == latest)
            .map(|p| p.price)
            .unwrap_or(0.0)
    }

    /// Percent change from the first to the last combined point; 0 below 2 points.
    pub fn price_change_percent(combined: &[PricePoint]) -> f64 {
        match (combined.first(), combined.last()) {
            (Some(first), Some(last)) if combined.len() >= 2 => {
                (last.price - first.price) / first.price * 100.0
            }
            _ => 0.0,
        }
    }

    fn dedup_regions(selected: &[String]) -> Vec<String> {
        let mut seen = Vec::with_capacity(selected.len());
        for region in selected {
            if !seen.contains(region) {
                seen.push(region.clone());
            }
        }
        seen
    }
}
