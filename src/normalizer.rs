use std::collections::BTreeMap;

/// Canonical form of a region name: aliases of the reference region (e.g.
/// "STATE") and case variants of the reference key become the reference key;
/// anything else is trimmed.
pub fn canonical_region(name: &str, reference: &str, aliases: &[String]) -> String {
    let trimmed = name.trim();
    if trimmed.eq_ignore_ascii_case(reference) || aliases.iter().any(|a| a.eq_ignore_ascii_case(trimmed)) {
        reference.to_string()
    } else {
        trimmed.to_string()
    }
}

fn is_alias(name: &str, aliases: &[String]) -> bool {
    aliases.iter().any(|a| a.eq_ignore_ascii_case(name.trim()))
}

/// Renames region keys to their canonical form.
///
/// When an alias and the canonical reference key are both present, the alias
/// data replaces the canonical entry.
pub fn normalize_regions<V>(
    regions: BTreeMap<String, V>,
    reference: &str,
    aliases: &[String],
) -> BTreeMap<String, V> {
    let mut normalized = BTreeMap::new();
    let mut from_alias = None;

    for (key, value) in regions {
        if is_alias(&key, aliases) {
            from_alias = Some(value);
            continue;
        }
        normalized.insert(canonical_region(&key, reference, aliases), value);
    }

    if let Some(value) = from_alias {
        normalized.insert(reference.to_string(), value);
    }
    normalized
}

/// Canonical forms of user-selected region names, keeping their order.
pub fn normalize_selection(selected: &[String], reference: &str, aliases: &[String]) -> Vec<String> {
    selected
        .iter()
        .map(|r| canonical_region(r, reference, aliases))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn map(entries: &[(&str, i32)]) -> BTreeMap<String, i32> {
        entries.iter().map(|(k, v)| (k.to_string(), *v)).collect()
    }

    #[test]
    fn test_alias_becomes_reference() {
        let out = normalize_regions(map(&[("STATE", 1), ("1", 2)]), "statewide", &["STATE".to_string()]);
        assert_eq!(out, map(&[("statewide", 1), ("1", 2)]));
    }

    #[test]
    fn test_alias_replaces_existing_reference() {
        let out = normalize_regions(
            map(&[("statewide", 1), ("State", 9)]),
            "statewide",
            &["STATE".to_string()],
        );
        assert_eq!(out, map(&[("statewide", 9)]));
    }

    #[test]
    fn test_case_and_whitespace() {
        let out = normalize_regions(map(&[("Statewide", 1), (" 3 ", 3)]), "statewide", &[]);
        assert_eq!(out, map(&[("statewide", 1), ("3", 3)]));
    }

    #[test]
    fn test_selection_uses_same_folding() {
        let aliases = vec!["STATE".to_string()];
        let selected: Vec<String> = ["STATE", "Statewide", " 1 ", "2"].iter().map(|s| s.to_string()).collect();
        assert_eq!(
            normalize_selection(&selected, "statewide", &aliases),
            vec!["statewide", "statewide", "1", "2"]
        );
        assert_eq!(canonical_region("state", "statewide", &aliases), "statewide");
        assert_eq!(canonical_region("north", "statewide", &aliases), "north");
    }
}
