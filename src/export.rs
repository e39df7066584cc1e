//! CSV export of an item's price table.
//!
//! Two layouts:
//! - whole table: one `Year,Region,Unit Price` row per region and year
//! - selected regions: one row per year, one column per region

use csv::{Terminator, Writer, WriterBuilder};

use crate::error::{Error, Result};
use crate::model::ItemPriceTable;
use crate::utils::region_label;

/// File name used for the selected-regions export.
pub const REGIONS_CSV_FILE: &str = "price_data.csv";

/// File name used for the whole-table export of an item.
pub fn item_csv_file_name(item_id: &str) -> String {
    format!("{}_unit_price.csv", item_id)
}

fn writer() -> Writer<Vec<u8>> {
    WriterBuilder::new()
        .terminator(Terminator::Any(b'\n'))
        .from_writer(Vec::new())
}

fn finish(writer: Writer<Vec<u8>>) -> Result<String> {
    let bytes = writer.into_inner().map_err(|e| Error::Io(e.into_error()))?;
    Ok(String::from_utf8(bytes)?)
}

/// Whole-table export. Rows are sorted by year; rows of the same year follow
/// region order (reference first). Zero and non-finite prices are left out.
pub fn export_item_csv(table: &ItemPriceTable) -> Result<String> {
    let reference = table.reference_region();
    let mut rows: Vec<(i32, String, f64)> = Vec::new();

    for region in table.regions() {
        let Some(years) = table.entries(region) else {
            continue;
        };
        let label = region_label(region, reference);
        rows.extend(
            years
                .iter()
                .filter(|(_, e)| e.price != 0.0 && e.price.is_finite())
                .map(|(&year, e)| (year, label.clone(), e.price)),
        );
    }
    rows.sort_by_key(|(year, _, _)| *year);

    let mut wtr = writer();
    wtr.write_record(["Year", "Region", "Unit Price"])?;
    for (year, label, price) in rows {
        wtr.write_record([year.to_string(), label, price.to_string()])?;
    }
    finish(wtr)
}

/// Selected-regions export: a `Year` column plus one column per region, over
/// the union of years of the regions. Missing cells are empty.
pub fn export_regions_csv<S: AsRef<str>>(table: &ItemPriceTable, regions: &[S]) -> Result<String> {
    let reference = table.reference_region();

    let mut years: Vec<i32> = regions
        .iter()
        .filter_map(|r| table.entries(r.as_ref()))
        .flat_map(|entries| entries.keys().copied())
        .collect();
    years.sort_unstable();
    years.dedup();

    let mut wtr = writer();
    let mut header = vec!["Year".to_string()];
    header.extend(regions.iter().map(|r| region_label(r.as_ref(), reference)));
    wtr.write_record(&header)?;

    for year in years {
        let mut row = vec![year.to_string()];
        row.extend(regions.iter().map(|r| {
            table
                .price(r.as_ref(), year)
                .map(|p| p.to_string())
                .unwrap_or_default()
        }));
        wtr.write_record(&row)?;
    }
    finish(wtr)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{YearEntry, REFERENCE_REGION};

    fn table(rows: &[(&str, i32, f64)]) -> ItemPriceTable {
        let mut t = ItemPriceTable::new("303-01.01", REFERENCE_REGION);
        for &(region, year, price) in rows {
            t.insert(
                region,
                year,
                YearEntry {
                    price,
                    description: String::new(),
                    unit: String::new(),
                },
            );
        }
        t
    }

    #[test]
    fn test_statewide_export_exact() {
        let t = table(&[("statewide", 2021, 110.0), ("statewide", 2020, 100.0), ("statewide", 2022, 121.0)]);
        assert_eq!(
            export_item_csv(&t).unwrap(),
            "Year,Region,Unit Price\n2020,Statewide,100\n2021,Statewide,110\n2022,Statewide,121\n"
        );
    }

    #[test]
    fn test_whole_table_sorted_by_year_then_region() {
        let t = table(&[
            ("2", 2020, 95.5),
            ("statewide", 2021, 110.0),
            ("1", 2020, 90.0),
            ("statewide", 2020, 100.0),
            ("1", 2021, 0.0),
        ]);
        assert_eq!(
            export_item_csv(&t).unwrap(),
            "Year,Region,Unit Price\n\
             2020,Statewide,100\n\
             2020,Region 1,90\n\
             2020,Region 2,95.5\n\
             2021,Statewide,110\n"
        );
    }

    #[test]
    fn test_regions_export_with_gaps() {
        let t = table(&[
            ("statewide", 2020, 100.0),
            ("statewide", 2021, 110.0),
            ("1", 2021, 105.25),
            ("1", 2022, 118.0),
        ]);
        let csv = export_regions_csv(&t, &["statewide", "1", "4"]).unwrap();
        assert_eq!(
            csv,
            "Year,Statewide,Region 1,Region 4\n\
             2020,100,,\n\
             2021,110,105.25,\n\
             2022,,118,\n"
        );
    }

    #[test]
    fn test_empty_table_has_header_only() {
        let t = table(&[]);
        assert_eq!(export_item_csv(&t).unwrap(), "Year,Region,Unit Price\n");
        assert_eq!(export_regions_csv(&t, &["1"]).unwrap(), "Year,Region 1\n");
    }

    #[test]
    fn test_file_names() {
        assert_eq!(item_csv_file_name("303-01.01"), "303-01.01_unit_price.csv");
        assert_eq!(REGIONS_CSV_FILE, "price_data.csv");
    }
}
