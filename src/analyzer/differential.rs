use std::collections::BTreeMap;

use crate::analyzer::volatility::population_std_dev;
use crate::model::{Differentials, ItemPriceTable};

pub struct DifferentialAnalyzer;

impl DifferentialAnalyzer {
    /// Percentage deviation of every selected region from the reference
    /// series, for years present in both.
    ///
    /// Returns `None` unless the reference region exists in the table and is
    /// part of the selection. Regions sharing no year with the reference are
    /// left out of the result.
    pub fn compute<S: AsRef<str>>(
        table: &ItemPriceTable,
        reference: &str,
        selected: &[S],
    ) -> Option<Differentials> {
        let reference_years = table.entries(reference)?;
        if !selected.iter().any(|r| r.as_ref() == reference) {
            return None;
        }

        let mut differentials = Differentials::new();
        for region in selected.iter().map(AsRef::as_ref) {
            if region == reference {
                continue;
            }
            let Some(years) = table.entries(region) else {
                continue;
            };

            let per_year: BTreeMap<i32, f64> = years
                .iter()
                .filter_map(|(year, entry)| {
                    let reference_price = reference_years.get(year)?.price;
                    Some((*year, (entry.price - reference_price) / reference_price * 100.0))
                })
                .collect();

            if !per_year.is_empty() {
                differentials.insert(region.to_string(), per_year);
            }
        }
        Some(differentials)
    }

    /// Population standard deviation of all differential values across
    /// regions and years; 0 when there are none.
    pub fn regional_variation(differentials: &Differentials) -> f64 {
        let values: Vec<f64> = differentials
            .values()
            .flat_map(|years| years.values().copied())
            .collect();
        population_std_dev(&values)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{YearEntry, REFERENCE_REGION};

    fn table(rows: &[(&str, i32, f64)]) -> ItemPriceTable {
        let mut t = ItemPriceTable::new("402-01", REFERENCE_REGION);
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

    fn scenario() -> ItemPriceTable {
        table(&[
            ("statewide", 2020, 100.0),
            ("statewide", 2021, 110.0),
            ("statewide", 2022, 121.0),
            ("1", 2020, 90.0),
            ("1", 2021, 105.0),
            ("1", 2022, 118.0),
        ])
    }

    #[test]
    fn test_requires_reference_in_table_and_selection() {
        let t = scenario();
        assert!(DifferentialAnalyzer::compute(&t, "statewide", &["1"]).is_none());

        let no_reference = table(&[("1", 2020, 90.0), ("2", 2020, 95.0)]);
        assert!(DifferentialAnalyzer::compute(&no_reference, "statewide", &["statewide", "1"]).is_none());
    }

    #[test]
    fn test_scenario_differentials() {
        let t = scenario();
        let diffs = DifferentialAnalyzer::compute(&t, "statewide", &["statewide", "1"]).unwrap();
        let region = &diffs["1"];
        assert_eq!(region.len(), 3);
        assert!((region[&2020] - -10.0).abs() < 1e-9);
        assert!((region[&2022] - (118.0 - 121.0) / 121.0 * 100.0).abs() < 1e-12);
        assert!((region[&2022] - -2.479_338).abs() < 1e-5);
        assert!(!diffs.contains_key("statewide"));
    }

    #[test]
    fn test_only_shared_years_are_emitted() {
        let t = table(&[
            ("statewide", 2019, 50.0),
            ("statewide", 2020, 100.0),
            ("2", 2020, 120.0),
            ("2", 2021, 130.0),
            ("3", 2018, 10.0),
        ]);
        let diffs = DifferentialAnalyzer::compute(&t, "statewide", &["statewide", "2", "3", "4"]).unwrap();
        assert_eq!(diffs.len(), 1);
        assert_eq!(diffs["2"].keys().copied().collect::<Vec<_>>(), vec![2020]);
        assert!((diffs["2"][&2020] - 20.0).abs() < 1e-12);
    }

    #[test]
    fn test_unselected_regions_are_ignored() {
        let t = table(&[("statewide", 2020, 100.0), ("1", 2020, 80.0), ("2", 2020, 120.0)]);
        let diffs = DifferentialAnalyzer::compute(&t, "statewide", &["statewide", "2"]).unwrap();
        assert_eq!(diffs.keys().collect::<Vec<_>>(), vec!["2"]);
    }

    #[test]
    fn test_regional_variation() {
        assert_eq!(DifferentialAnalyzer::regional_variation(&Differentials::new()), 0.0);

        let t = table(&[("statewide", 2020, 100.0), ("1", 2020, 80.0), ("2", 2020, 120.0)]);
        let diffs = DifferentialAnalyzer::compute(&t, "statewide", &["statewide", "1", "2"]).unwrap();
        // values -20 and +20
        assert!((DifferentialAnalyzer::regional_variation(&diffs) - 20.0).abs() < 1e-9);
    }
}
