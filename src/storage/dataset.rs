use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::{debug, info, warn};

use crate::config::AppConfig;
use crate::error::Result;
use crate::model::{ItemPriceTable, YearEntry};
use crate::normalizer::normalize_regions;
use crate::source::DataSource;

#[derive(Debug, Deserialize)]
struct RawEntry {
    price: Option<f64>,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    unit: Option<String>,
}

type RawRegions = BTreeMap<String, BTreeMap<String, RawEntry>>;
type RawDataset = BTreeMap<String, RawRegions>;

/// Listing criteria for pay items.
#[derive(Debug, Clone, PartialEq)]
pub struct ItemFilter {
    /// Case-insensitive substring of the item id or description; empty matches all.
    pub query: String,
    /// Include items with no data at or after `recent_since`.
    pub show_old_items: bool,
    pub recent_since: i32,
}

impl Default for ItemFilter {
    fn default() -> Self {
        Self {
            query: String::new(),
            show_old_items: false,
            recent_since: 2020,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchHit {
    pub id: String,
    pub description: String,
}

/// Immutable snapshot of every pay item's price table.
#[derive(Debug, Clone)]
pub struct DataStore {
    items: BTreeMap<String, ItemPriceTable>,
}

impl DataStore {
    /// Fetches and parses the dataset in one shot. Any failure is fatal to
    /// the session; there is no partial fallback.
    pub async fn load(source: &dyn DataSource, config: &AppConfig) -> Result<Self> {
        let text = source.fetch().await?;
        let store = Self::from_json(&text, config)?;
        info!("Loaded {} pay items from {}", store.len(), source.describe());
        Ok(store)
    }

    /// Parses the nested `item -> region -> year -> {price, description, unit}` mapping.
    ///
    /// Year keys that do not parse as integers and entries without a finite
    /// price are skipped. If two year keys parse to the same integer, the one
    /// later in key order wins.
    pub fn from_json(text: &str, config: &AppConfig) -> Result<Self> {
        let raw: RawDataset = serde_json::from_str(text)?;
        let reference = config.reference_region.as_str();

        let mut items = BTreeMap::new();
        for (item_id, regions) in raw {
            let regions = normalize_regions(regions, reference, &config.reference_aliases);
            let mut table = ItemPriceTable::new(item_id.clone(), reference);

            for (region, years) in regions {
                for (year_key, entry) in years {
                    let Ok(year) = year_key.trim().parse::<i32>() else {
                        warn!("Item {} region {}: skipping non-numeric year {:?}", item_id, region, year_key);
                        continue;
                    };
                    let Some(price) = entry.price.filter(|p| p.is_finite()) else {
                        debug!("Item {} region {} year {}: no price", item_id, region, year);
                        continue;
                    };
                    let replaced = table.insert(
                        region.clone(),
                        year,
                        YearEntry {
                            price,
                            description: entry.description.unwrap_or_default(),
                            unit: entry.unit.unwrap_or_default(),
                        },
                    );
                    if replaced.is_some() {
                        debug!("Item {} region {}: duplicate year {}, keeping {:?}", item_id, region, year, year_key);
                    }
                }
            }
            items.insert(item_id, table);
        }

        Ok(Self { items })
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn get_item(&self, item_id: &str) -> Option<&ItemPriceTable> {
        self.items.get(item_id)
    }

    /// Item ids matching the filter, ascending.
    pub fn list_items(&self, filter: &ItemFilter) -> Vec<&str> {
        let query = filter.query.trim().to_lowercase();
        self.items
            .iter()
            .filter(|(_, table)| filter.show_old_items || table.has_data_since(filter.recent_since))
            .filter(|(id, table)| query.is_empty() || Self::matches(id, table, &query))
            .map(|(id, _)| id.as_str())
            .collect()
    }

    /// Items whose id or description contains `query`, case-insensitively.
    /// A blank query yields no hits.
    pub fn search(&self, query: &str) -> Vec<SearchHit> {
        let query = query.trim().to_lowercase();
        if query.is_empty() {
            return Vec::new();
        }
        self.items
            .iter()
            .filter(|(id, table)| Self::matches(id, table, &query))
            .map(|(id, table)| SearchHit {
                id: id.clone(),
                description: table.metadata().description,
            })
            .collect()
    }

    fn matches(id: &str, table: &ItemPriceTable, query_lower: &str) -> bool {
        id.to_lowercase().contains(query_lower)
            || table.metadata().description.to_lowercase().contains(query_lower)
    }
}
