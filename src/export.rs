use std::path::{Path, PathBuf};

use serde_json::Value;
use tracing::info;

use crate::catalog::CatalogItem;
use crate::error::{CatalogError, Result};

const HEADER: [&str; 8] = [
    "id",
    "title",
    "price",
    "category",
    "description",
    "image",
    "rating_rate",
    "rating_count",
];

/// `products_<UTC timestamp>.csv` in the working directory.
pub fn default_export_path() -> PathBuf {
    let ts = chrono::Utc::now().format("%Y%m%d_%H%M%S");
    PathBuf::from(format!("products_{}.csv", ts))
}

fn price_cell(price: Option<&Value>) -> String {
    match price {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}

/// Write `items` as CSV to `path`; returns the number of data rows.
pub fn write_csv(items: &[CatalogItem], path: &Path) -> Result<usize> {
    let csv_err = |source: csv::Error| CatalogError::Csv {
        path: path.to_path_buf(),
        source,
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|err| CatalogError::io(parent, err))?;
    }

    let mut wtr = csv::Writer::from_path(path).map_err(csv_err)?;
    wtr.write_record(HEADER).map_err(csv_err)?;
    for item in items {
        wtr.write_record([
            item.id().to_string().as_str(),
            item.title().unwrap_or(""),
            price_cell(item.price()).as_str(),
            item.category().unwrap_or(""),
            item.description().unwrap_or(""),
            item.image().unwrap_or(""),
            item.rating_rate()
                .map(|v| v.to_string())
                .unwrap_or_default()
                .as_str(),
            item.rating_count()
                .map(|v| v.to_string())
                .unwrap_or_default()
                .as_str(),
        ])
        .map_err(csv_err)?;
    }
    wtr.flush().map_err(|err| CatalogError::io(path, err))?;

    info!(path = %path.display(), rows = items.len(), "catalog exported to CSV");
    Ok(items.len())
}
