use serde::Serialize;

use super::CatalogItem;

/// Items whose category equals `category`, ignoring ASCII case.
pub fn by_category<'a>(items: &'a [CatalogItem], category: &str) -> Vec<&'a CatalogItem> {
    items
        .iter()
        .filter(|item| {
            item.category()
                .is_some_and(|c| c.trim().eq_ignore_ascii_case(category.trim()))
        })
        .collect()
}

/// Items whose title contains `needle`, case-insensitively.
pub fn by_title<'a>(items: &'a [CatalogItem], needle: &str) -> Vec<&'a CatalogItem> {
    let needle = needle.to_lowercase();
    items
        .iter()
        .filter(|item| {
            item.title()
                .is_some_and(|t| t.to_lowercase().contains(&needle))
        })
        .collect()
}

/// Items rated at least `rate`. Unrated items never match.
pub fn min_rating(items: &[CatalogItem], rate: f64) -> Vec<&CatalogItem> {
    items
        .iter()
        .filter(|item| item.rating_rate().is_some_and(|r| r >= rate))
        .collect()
}

/// Summary figures over a set of items. Price figures only consider items
/// whose price is numeric.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CatalogStats {
    pub total: usize,
    pub priced: usize,
    pub average: Option<f64>,
    pub max: Option<f64>,
    pub min: Option<f64>,
}

impl CatalogStats {
    pub fn from_items(items: &[CatalogItem]) -> Self {
        let prices: Vec<f64> = items.iter().filter_map(CatalogItem::price_value).collect();
        let (average, max, min) = if prices.is_empty() {
            (None, None, None)
        } else {
            let sum: f64 = prices.iter().sum();
            (
                Some(sum / prices.len() as f64),
                prices.iter().copied().reduce(f64::max),
                prices.iter().copied().reduce(f64::min),
            )
        };
        Self {
            total: items.len(),
            priced: prices.len(),
            average,
            max,
            min,
        }
    }
}
