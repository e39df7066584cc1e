// Utility functions

/// Sort key placing the reference region first, then numeric region codes
/// in numeric order, then any other keys alphabetically.
pub fn region_sort_key(region: &str, reference: &str) -> (u8, u64, String) {
    if region == reference {
        return (0, 0, String::new());
    }
    match region.parse::<u64>() {
        Ok(code) => (1, code, String::new()),
        Err(_) => (2, 0, region.to_string()),
    }
}

/// Display label of a region: "Statewide" for the reference, "Region N" otherwise.
pub fn region_label(region: &str, reference: &str) -> String {
    if region == reference {
        "Statewide".to_string()
    } else {
        format!("Region {}", region)
    }
}

/// Formats a value as US dollars with thousands separators, e.g. `$1,234.50`.
pub fn format_currency(value: f64) -> String {
    if !value.is_finite() {
        return format!("${}", value);
    }
    let cents = (value.abs() * 100.0).round() as u64;
    let whole = (cents / 100).to_string();
    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, ch) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    let sign = if value < 0.0 && cents > 0 { "-" } else { "" };
    format!("{}${}.{:02}", sign, grouped, cents % 100)
}

/// Formats a percentage with two decimals.
pub fn format_percent(value: f64) -> String {
    format!("{:.2}%", value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_region_label() {
        assert_eq!(region_label("statewide", "statewide"), "Statewide");
        assert_eq!(region_label("3", "statewide"), "Region 3");
    }

    #[test]
    fn test_region_sort_key_order() {
        let mut keys = vec!["west", "10", "statewide", "2"];
        keys.sort_by_key(|k| region_sort_key(k, "statewide"));
        assert_eq!(keys, vec!["statewide", "2", "10", "west"]);
    }

    #[test]
    fn test_format_currency() {
        assert_eq!(format_currency(0.0), "$0.00");
        assert_eq!(format_currency(121.0), "$121.00");
        assert_eq!(format_currency(1234567.891), "$1,234,567.89");
        assert_eq!(format_currency(-45.5), "-$45.50");
        assert_eq!(format_currency(999.999), "$1,000.00");
    }

    #[test]
    fn test_format_percent() {
        assert_eq!(format_percent(-2.479338), "-2.48%");
        assert_eq!(format_percent(10.0), "10.00%");
    }
}
