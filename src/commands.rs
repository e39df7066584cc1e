use chrono::Local;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use unit_price_trends::analyzer::AnalysisOrchestrator;
use unit_price_trends::chart::build_chart;
use unit_price_trends::config::AppConfig;
use unit_price_trends::error::{Error, Result};
use unit_price_trends::export::{REGIONS_CSV_FILE, export_item_csv, export_regions_csv, item_csv_file_name};
use unit_price_trends::model::{AnalysisBundle, ItemPriceTable};
use unit_price_trends::report::{render_report, report_file_name};
use unit_price_trends::storage::{DataStore, ItemFilter};
use unit_price_trends::utils::{format_currency, format_percent, region_label};

use crate::cli::AnalysisArgs;

fn find_item<'a>(store: &'a DataStore, item_id: &str) -> Result<&'a ItemPriceTable> {
    store
        .get_item(item_id.trim())
        .ok_or_else(|| Error::ItemNotFound(item_id.to_string()))
}

fn analyze(store: &DataStore, config: &AppConfig, args: &AnalysisArgs) -> Result<AnalysisBundle> {
    let table = find_item(store, &args.item)?;
    Ok(AnalysisOrchestrator::analyze(table, &args.options(config)))
}

/// Writes `content` to `out`, or to `default_name` in the working directory.
fn write_output(content: &str, out: Option<&Path>, default_name: &str) -> Result<PathBuf> {
    let path = out.map(Path::to_path_buf).unwrap_or_else(|| PathBuf::from(default_name));
    std::fs::write(&path, content)?;
    info!("Wrote {}", path.display());
    Ok(path)
}

pub fn list_lines(store: &DataStore, filter: &ItemFilter) -> Vec<String> {
    store
        .list_items(filter)
        .into_iter()
        .map(|id| {
            let description = store
                .get_item(id)
                .map(|t| t.metadata().description)
                .unwrap_or_default();
            format!("{} - {}", id, description)
        })
        .collect()
}

pub fn cmd_list(store: &DataStore, config: &AppConfig, all: bool, query: Option<&str>) -> Result<()> {
    let filter = ItemFilter {
        query: query.unwrap_or_default().to_string(),
        show_old_items: all,
        recent_since: config.recent_year_cutoff,
    };
    let lines = list_lines(store, &filter);
    if lines.is_empty() {
        warn!("No items match");
    }
    for line in lines {
        println!("{}", line);
    }
    Ok(())
}

pub fn cmd_search(store: &DataStore, query: &str) -> Result<()> {
    let hits = store.search(query);
    if hits.is_empty() {
        println!("No items found for {:?}", query);
    }
    for hit in hits {
        println!("{} - {}", hit.id, hit.description);
    }
    Ok(())
}

/// Human-readable summary of an analysis.
pub fn analysis_summary(bundle: &AnalysisBundle) -> String {
    let reference = bundle.reference_region.as_str();
    let result = &bundle.result;

    let mut lines = vec![format!(
        "{} - {} ({})",
        bundle.item_id, bundle.metadata.description, bundle.metadata.unit
    )];
    if bundle.regions.is_empty() {
        lines.push("No data for the selected regions.".to_string());
        return lines.join("\n") + "\n";
    }

    lines.push(format!("Current Price:      {}", format_currency(result.current_price)));
    lines.push(format!("Price Change:       {}", format_percent(result.price_change_percent)));
    lines.push(format!("Volatility:         {}", format_percent(result.volatility * 100.0)));
    lines.push(format!("Regional Variation: {}", format_percent(result.regional_variation)));

    for region in &bundle.regions {
        lines.push(String::new());
        lines.push(format!("{}:", region_label(&region.region, reference)));
        lines.extend(
            region
                .series
                .iter()
                .map(|point| format!("  {}  {}", point.year, format_currency(point.price))),
        );
        let predictions = result.predictions.as_ref().and_then(|p| p.get(&region.region));
        lines.extend(predictions.into_iter().flatten().map(|p| {
            format!(
                "  {}* {} ({} - {})",
                p.year,
                format_currency(p.value),
                format_currency(p.lower),
                format_currency(p.upper)
            )
        }));
    }
    lines.join("\n") + "\n"
}

pub fn cmd_analyze(store: &DataStore, config: &AppConfig, args: &AnalysisArgs, json: bool) -> Result<()> {
    let bundle = analyze(store, config, args)?;
    if json {
        println!("{}", serde_json::to_string_pretty(&bundle)?);
    } else {
        print!("{}", analysis_summary(&bundle));
    }
    Ok(())
}

pub fn cmd_chart(store: &DataStore, config: &AppConfig, args: &AnalysisArgs) -> Result<()> {
    let bundle = analyze(store, config, args)?;
    println!("{}", serde_json::to_string_pretty(&build_chart(&bundle))?);
    Ok(())
}

/// CSV text and default file name for an export request.
pub fn export_csv(store: &DataStore, item_id: &str, regions: Option<&[String]>) -> Result<(String, String)> {
    let table = find_item(store, item_id)?;
    match regions {
        Some(regions) => Ok((export_regions_csv(table, regions)?, REGIONS_CSV_FILE.to_string())),
        None => Ok((export_item_csv(table)?, item_csv_file_name(table.item_id()))),
    }
}

pub fn cmd_export(
    store: &DataStore,
    item_id: &str,
    regions: Option<&[String]>,
    out: Option<&Path>,
    print: bool,
) -> Result<()> {
    let (csv, default_name) = export_csv(store, item_id, regions)?;
    if print {
        print!("{}", csv);
    } else {
        write_output(&csv, out, &default_name)?;
    }
    Ok(())
}

pub fn cmd_report(
    store: &DataStore,
    config: &AppConfig,
    args: &AnalysisArgs,
    out: Option<&Path>,
    print: bool,
) -> Result<()> {
    let bundle = analyze(store, config, args)?;
    let report = render_report(&bundle, Local::now().date_naive());
    if print {
        print!("{}", report);
    } else {
        write_output(&report, out, &report_file_name(&bundle.item_id))?;
    }
    Ok(())
}
