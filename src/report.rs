// Plain-text analysis report: summary, forecasting methodology, predictions, differentials
use chrono::NaiveDate;
use std::collections::BTreeSet;

use crate::analyzer::prediction::BAND_Z;
use crate::model::{AnalysisBundle, BandPolicy};
use crate::utils::{format_currency, format_percent, region_label};

pub const REPORT_TITLE: &str = "Unit Price Analysis Report";

/// File name used when saving a report for an item.
pub fn report_file_name(item_id: &str) -> String {
    format!("{}_analysis_report.txt", item_id)
}

/// Renders rows as an aligned grid with a header separator.
fn render_table(headers: &[String], rows: &[Vec<String>]) -> String {
    let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
    for row in rows {
        for (i, cell) in row.iter().enumerate() {
            if let Some(w) = widths.get_mut(i) {
                *w = (*w).max(cell.chars().count());
            }
        }
    }

    let line = |cells: &[String]| {
        let padded: Vec<String> = cells
            .iter()
            .zip(&widths)
            .map(|(c, &w)| format!("{:<width$}", c, width = w))
            .collect();
        format!("| {} |\n", padded.join(" | "))
    };
    let separator: Vec<String> = widths.iter().map(|&w| "-".repeat(w)).collect();

    let mut out = line(headers);
    out.push_str(&format!("|-{}-|\n", separator.join("-|-")));
    for row in rows {
        out.push_str(&line(row));
    }
    out
}

fn heading(out: &mut String, title: &str) {
    out.push_str(&format!("{}\n{}\n", title, "-".repeat(title.chars().count())));
}

fn push_line(out: &mut String, line: &str) {
    out.push_str(line);
    out.push('\n');
}

fn forecasting_methodology(band: BandPolicy) -> Vec<String> {
    let mut lines: Vec<String> = [
        "Price predictions extend the selected trend line three years past the last observed year.",
        "",
        "1. Linear Regression:",
        "   - Formula: y = mx + b, where y is the predicted price and x the year",
        "   - Slope (m) = (n*Sum(xy) - Sum(x)*Sum(y)) / (n*Sum(x^2) - Sum(x)^2)",
        "   - Intercept (b) = (Sum(y) - m*Sum(x)) / n",
        "",
        "2. Exponential Growth:",
        "   - Formula: y = a*e^(bx), linearized as ln(y) = ln(a) + bx",
        "   - Fitted by linear regression on log-transformed prices",
        "",
        "3. Polynomial (Quadratic):",
        "   - Formula: y = ax^2 + bx + c",
        "   - Coefficients solved from the 3x3 normal equations",
        "",
        "4. Moving Average:",
        "   - Trend: y_t = (y_(t-1) + y_t + y_(t+1)) / 3, truncated at the series ends",
        "   - Forecast: mean of the last three observations, held flat",
        "",
        "Confidence Intervals:",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect();

    match band {
        BandPolicy::Fixed => {
            lines.push("   - Upper and lower bounds are a fixed +/-10% around the predicted price".into());
            lines.push("   - They are not derived from historical volatility".into());
        }
        BandPolicy::Volatility => {
            lines.push(format!(
                "   - Bounds are +/-{} * sigma * sqrt(h) of the predicted price",
                BAND_Z
            ));
            lines.push("   - sigma is the historical return volatility, h the number of years ahead".into());
        }
    }

    lines.extend(
        [
            "",
            "Volatility Calculation:",
            "   - Standard deviation of year-over-year price returns",
            "   - Formula: sigma = sqrt(Sum((r - mu)^2) / n), r = returns, mu = mean return",
        ]
        .iter()
        .map(|s| s.to_string()),
    );
    lines
}

const DIFFERENTIAL_METHODOLOGY: &[&str] = &[
    "   - Percentage difference from the statewide price in the same year",
    "   - Formula: ((Regional Price - Statewide Price) / Statewide Price) * 100",
    "   - Positive values are above the statewide price, negative below",
    "",
    "Regional Variation Index:",
    "   - Standard deviation of all regional differentials",
    "   - Measures overall price dispersion across regions",
];

/// Renders the full report for an analysis bundle.
pub fn render_report(bundle: &AnalysisBundle, date: NaiveDate) -> String {
    let reference = bundle.reference_region.as_str();
    let result = &bundle.result;
    let mut out = String::new();

    push_line(&mut out, REPORT_TITLE);
    push_line(&mut out, &"=".repeat(REPORT_TITLE.len()));
    out.push('\n');
    push_line(&mut out, &format!("Item Number: {}", bundle.item_id));
    push_line(&mut out, &format!("Description: {}", bundle.metadata.description));
    push_line(&mut out, &format!("Unit: {}", bundle.metadata.unit));
    push_line(&mut out, &format!("Report Date: {}", date.format("%-m/%-d/%Y")));
    out.push('\n');

    heading(&mut out, "Price Summary");
    let summary = vec![
        vec!["Current Price".to_string(), format_currency(result.current_price)],
        vec!["Price Change".to_string(), format_percent(result.price_change_percent)],
        vec!["Volatility".to_string(), format_percent(result.volatility * 100.0)],
        vec!["Regional Variation".to_string(), format_percent(result.regional_variation)],
    ];
    out.push_str(&render_table(&["Metric".to_string(), "Value".to_string()], &summary));

    if let Some(predictions) = &result.predictions {
        out.push('\n');
        heading(&mut out, "Price Predictions and Methodology");
        push_line(&mut out, &format!("Forecasting Methodology ({} trend):", bundle.options.trend_line));
        for line in forecasting_methodology(bundle.options.band) {
            push_line(&mut out, &line);
        }

        let headers: Vec<String> = ["Year", "Predicted Price", "Lower Bound", "Upper Bound"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        for region in bundle.regions.iter().map(|r| &r.region) {
            let Some(rows) = predictions.get(region) else {
                continue;
            };
            out.push('\n');
            push_line(&mut out, &format!("Prediction Results: {}", region_label(region, reference)));
            let rows: Vec<Vec<String>> = rows
                .iter()
                .map(|p| {
                    vec![
                        p.year.to_string(),
                        format_currency(p.value),
                        format_currency(p.lower),
                        format_currency(p.upper),
                    ]
                })
                .collect();
            out.push_str(&render_table(&headers, &rows));
        }
    }

    if let Some(differentials) = &result.differentials {
        out.push('\n');
        heading(&mut out, "Regional Price Differentials");
        push_line(&mut out, "Regional Differential Calculation:");
        for line in DIFFERENTIAL_METHODOLOGY {
            push_line(&mut out, line);
        }
        out.push('\n');

        if differentials.is_empty() {
            push_line(&mut out, "No regional prices share a year with the statewide series.");
        } else {
            let years: BTreeSet<i32> = differentials.values().flat_map(|y| y.keys().copied()).collect();
            let mut headers = vec!["Region".to_string()];
            headers.extend(years.iter().map(|y| y.to_string()));

            let rows: Vec<Vec<String>> = differentials
                .iter()
                .map(|(region, values)| {
                    let mut row = vec![region_label(region, reference)];
                    row.extend(years.iter().map(|y| {
                        values
                            .get(y)
                            .map(|v| format_percent(*v))
                            .unwrap_or_else(|| "-".to_string())
                    }));
                    row
                })
                .collect();
            out.push_str(&render_table(&headers, &rows));
        }
    }

    out
}
