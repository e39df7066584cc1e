//! Dataset descriptors handed to the chart renderer.
//!
//! Nothing here draws; the output is a serializable description of which
//! series to plot, how to style them and what range the year axis spans.

use serde::Serialize;

use crate::model::{AnalysisBundle, ChartType, FittedPoint};
use crate::utils::region_label;

const FALLBACK_COLOR: &str = "#6b7280";

/// Line color of a region.
pub fn region_color(region: &str, reference: &str) -> &'static str {
    if region == reference {
        return "#000000";
    }
    match region {
        "1" => "#2563eb",
        "2" => "#16a34a",
        "3" => "#dc2626",
        "4" => "#9333ea",
        _ => FALLBACK_COLOR,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DatasetKind {
    Observed,
    Trend,
    Prediction,
    Differential,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum YAxis {
    Price,
    Differential,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StyleHints {
    pub color: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dash: Option<[u8; 2]>,
    pub fill: bool,
    pub render_as: ChartType,
    pub y_axis: YAxis,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartDataset {
    pub label: String,
    pub kind: DatasetKind,
    pub points: Vec<FittedPoint>,
    pub style: StyleHints,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AxisBounds {
    pub min_year: i32,
    pub max_year: i32,
}

impl AxisBounds {
    /// Bounds from the observed year range, widened by one year on each side
    /// when only a single year is present.
    pub fn from_years(min_year: i32, max_year: i32) -> Self {
        if min_year == max_year {
            Self {
                min_year: min_year - 1,
                max_year: max_year + 1,
            }
        } else {
            Self { min_year, max_year }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartSpec {
    pub chart_type: ChartType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub axis: Option<AxisBounds>,
    pub datasets: Vec<ChartDataset>,
}

/// Builds the renderer input for an analysis bundle: per selected region the
/// observed, trend and prediction datasets, followed by one differential
/// dataset per region when differentials were computed.
pub fn build_chart(bundle: &AnalysisBundle) -> ChartSpec {
    let reference = bundle.reference_region.as_str();
    let chart_type = bundle.options.chart_type;
    let mut datasets = Vec::new();

    for region in &bundle.regions {
        if region.series.is_empty() {
            continue;
        }
        let label = region_label(&region.region, reference);
        let color = region_color(&region.region, reference);

        datasets.push(ChartDataset {
            label: label.clone(),
            kind: DatasetKind::Observed,
            points: region
                .series
                .iter()
                .map(|p| FittedPoint { x: p.year, y: p.price })
                .collect(),
            style: StyleHints {
                color,
                dash: None,
                fill: chart_type == ChartType::Bar,
                render_as: chart_type,
                y_axis: YAxis::Price,
            },
        });

        let Some(trend) = region.trend.as_ref().filter(|t| !t.is_empty()) else {
            continue;
        };
        datasets.push(ChartDataset {
            label: format!("{} Trend", label),
            kind: DatasetKind::Trend,
            points: trend.clone(),
            style: StyleHints {
                color,
                dash: Some([5, 5]),
                fill: false,
                render_as: ChartType::Line,
                y_axis: YAxis::Price,
            },
        });

        let predictions = bundle
            .result
            .predictions
            .as_ref()
            .and_then(|p| p.get(&region.region))
            .filter(|p| !p.is_empty());
        if let Some(predictions) = predictions {
            datasets.push(ChartDataset {
                label: format!("{} Prediction", label),
                kind: DatasetKind::Prediction,
                points: predictions
                    .iter()
                    .map(|p| FittedPoint { x: p.year, y: p.value })
                    .collect(),
                style: StyleHints {
                    color,
                    dash: None,
                    fill: true,
                    render_as: ChartType::Line,
                    y_axis: YAxis::Price,
                },
            });
        }
    }

    if let Some(differentials) = &bundle.result.differentials {
        for (region, years) in differentials {
            if years.is_empty() {
                continue;
            }
            datasets.push(ChartDataset {
                label: format!("{} Differential", region_label(region, reference)),
                kind: DatasetKind::Differential,
                points: years.iter().map(|(&x, &y)| FittedPoint { x, y }).collect(),
                style: StyleHints {
                    color: region_color(region, reference),
                    dash: Some([2, 2]),
                    fill: false,
                    render_as: ChartType::Line,
                    y_axis: YAxis::Differential,
                },
            });
        }
    }

    let axis = bundle
        .year_bounds()
        .map(|(lo, hi)| AxisBounds::from_years(lo, hi));

    ChartSpec {
        chart_type,
        axis,
        datasets,
    }
}
