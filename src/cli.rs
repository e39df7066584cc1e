use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use unit_price_trends::config::AppConfig;
use unit_price_trends::model::{AnalysisOptions, BandPolicy, ChartType, TrendType};
use unit_price_trends::normalizer::normalize_selection;

#[derive(Parser, Debug)]
#[command(name = "price-trends", version, about = "Historical unit price trends for pay items")]
pub struct Cli {
    /// Path to config.json (defaults to ./config.json when present)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Dataset path or http(s) URL, overriding the config
    #[arg(long, global = true)]
    pub dataset: Option<String>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List pay items
    List {
        /// Include items without recent data
        #[arg(long)]
        all: bool,

        /// Filter by item number or description
        #[arg(short, long)]
        query: Option<String>,
    },

    /// Search items by number or description
    Search { query: String },

    /// Print the analysis summary for an item
    Analyze {
        #[command(flatten)]
        args: AnalysisArgs,

        /// Print the full analysis as JSON
        #[arg(long)]
        json: bool,
    },

    /// Print chart dataset descriptors as JSON
    Chart {
        #[command(flatten)]
        args: AnalysisArgs,
    },

    /// Export prices as CSV
    Export {
        item: String,

        /// Export these regions as columns instead of the whole table
        #[arg(long, value_delimiter = ',')]
        regions: Option<Vec<String>>,

        /// Output file (defaults to <item>_unit_price.csv or price_data.csv)
        #[arg(short, long)]
        out: Option<PathBuf>,

        /// Print to stdout instead of writing a file
        #[arg(long, conflicts_with = "out")]
        print: bool,
    },

    /// Generate a text analysis report
    Report {
        #[command(flatten)]
        args: AnalysisArgs,

        /// Output file (defaults to <item>_analysis_report.txt)
        #[arg(short, long)]
        out: Option<PathBuf>,

        /// Print to stdout instead of writing a file
        #[arg(long, conflicts_with = "out")]
        print: bool,
    },
}

#[derive(Args, Debug, Clone)]
pub struct AnalysisArgs {
    /// Pay item number
    pub item: String,

    /// Regions to analyze, e.g. statewide,1,2
    #[arg(long, value_delimiter = ',')]
    pub regions: Option<Vec<String>>,

    /// Trend line: none, linear, exponential, polynomial, moving
    #[arg(long)]
    pub trend: Option<TrendType>,

    /// Chart type: line or bar
    #[arg(long)]
    pub chart: Option<ChartType>,

    /// Forecast the next three years
    #[arg(long)]
    pub predictions: bool,

    /// Compute differentials against the statewide series
    #[arg(long)]
    pub differentials: bool,

    /// Confidence band: fixed or volatility
    #[arg(long)]
    pub band: Option<BandPolicy>,
}

impl AnalysisArgs {
    /// Config defaults overridden by whatever was given on the command line.
    pub fn options(&self, config: &AppConfig) -> AnalysisOptions {
        let mut options = config.analysis_options();
        if let Some(regions) = &self.regions {
            options.selected_regions =
                normalize_selection(regions, &config.reference_region, &config.reference_aliases);
        }
        if let Some(trend) = self.trend {
            options.trend_line = trend;
        }
        if let Some(chart) = self.chart {
            options.chart_type = chart;
        }
        if let Some(band) = self.band {
            options.band = band;
        }
        options.show_predictions |= self.predictions;
        options.show_differentials |= self.differentials;
        options
    }
}
