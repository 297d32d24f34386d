//! Environment helpers: centralized dotenv loading and the resolved
//! [`CatalogConfig`].
//! Call `init_env()` once early in each binary (or rely on lazy Once).
use std::path::PathBuf;
use std::sync::Once;

use anyhow::{anyhow, Context};
use tracing::info;
use url::Url;

use crate::remote::provider::DEFAULT_BASE_URL;

static INIT: Once = Once::new();

pub const API_BASE_VAR: &str = "CATALOG_API_BASE";
pub const STORE_PATH_VAR: &str = "CATALOG_STORE_PATH";
pub const TIMEOUT_VAR: &str = "CATALOG_HTTP_TIMEOUT_SECS";
pub const LIST_LIMIT_VAR: &str = "CATALOG_LIST_LIMIT";
pub const PRICE_CEILING_VAR: &str = "CATALOG_PRICE_CEILING";
pub const STEP_DELAY_VAR: &str = "CATALOG_STEP_DELAY_MS";
pub const EXPORT_PATH_VAR: &str = "CATALOG_EXPORT_PATH";

/// Load .env exactly once. Safe to call many times.
pub fn init_env() {
    INIT.call_once(|| {
        if dotenv::dotenv().is_err() {
            // Fallback to the crate root when run from elsewhere via cargo.
            let candidate = format!("{}/.env", env!("CARGO_MANIFEST_DIR"));
            let _ = dotenv::from_filename(candidate);
        }
    });
}

/// Get optional env var (None if unset or empty).
pub fn env_opt(key: &str) -> Option<String> {
    init_env();
    match std::env::var(key) {
        Ok(v) if !v.trim().is_empty() => Some(v),
        _ => None,
    }
}

/// Settings shared by the binaries. CLI flags override these after resolution.
#[derive(Debug, Clone, PartialEq)]
pub struct CatalogConfig {
    pub api_base: Url,
    pub store_path: PathBuf,
    pub timeout_secs: u64,
    pub list_limit: u32,
    pub price_ceiling: f64,
    pub step_delay_ms: u64,
    pub export_path: Option<PathBuf>,
}

impl CatalogConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        init_env();
        Self::from_lookup(env_opt)
    }

    /// Resolve from an arbitrary key lookup (the process env in production).
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let parse_or = |key: &str, default: &str| -> String {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
                .unwrap_or_else(|| default.to_string())
        };

        let api_base = parse_api_base(&parse_or(API_BASE_VAR, DEFAULT_BASE_URL))?;
        let timeout_secs = parse_or(TIMEOUT_VAR, "15")
            .parse::<u64>()
            .with_context(|| format!("{TIMEOUT_VAR} must be a whole number of seconds"))?;
        let list_limit = parse_or(LIST_LIMIT_VAR, "5")
            .parse::<u32>()
            .with_context(|| format!("{LIST_LIMIT_VAR} must be a non-negative integer"))?;
        let price_ceiling = parse_or(PRICE_CEILING_VAR, "30")
            .parse::<f64>()
            .ok()
            .filter(|v| v.is_finite())
            .ok_or_else(|| anyhow!("{PRICE_CEILING_VAR} must be a finite number"))?;
        let step_delay_ms = parse_or(STEP_DELAY_VAR, "0")
            .parse::<u64>()
            .with_context(|| format!("{STEP_DELAY_VAR} must be a whole number of milliseconds"))?;

        let cfg = Self {
            api_base,
            store_path: PathBuf::from(parse_or(STORE_PATH_VAR, "products.json")),
            timeout_secs,
            list_limit,
            price_ceiling,
            step_delay_ms,
            export_path: lookup(EXPORT_PATH_VAR)
                .filter(|v| !v.trim().is_empty())
                .map(PathBuf::from),
        };
        info!(
            target = "env",
            api_base = %cfg.api_base,
            store = %cfg.store_path.display(),
            "catalog configuration resolved"
        );
        Ok(cfg)
    }

    /// Base URL without a trailing slash, ready for path joins.
    pub fn api_base_str(&self) -> &str {
        self.api_base.as_str().trim_end_matches('/')
    }
}

/// Validate an http(s) base URL.
pub fn parse_api_base(raw: &str) -> anyhow::Result<Url> {
    let url = Url::parse(raw.trim()).with_context(|| format!("invalid API base URL {raw:?}"))?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(anyhow!("API base URL must be http or https, got {other:?}")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_when_nothing_is_set() {
        let cfg = CatalogConfig::from_lookup(|_| None).unwrap();
        assert_eq!(cfg.api_base_str(), "https://fakestoreapi.com");
        assert_eq!(cfg.store_path, PathBuf::from("products.json"));
        assert_eq!(cfg.timeout_secs, 15);
        assert_eq!(cfg.list_limit, 5);
        assert_eq!(cfg.price_ceiling, 30.0);
        assert_eq!(cfg.step_delay_ms, 0);
        assert_eq!(cfg.export_path, None);
    }

    #[test]
    fn overrides_are_applied() {
        let cfg = CatalogConfig::from_lookup(lookup_from(&[
            (API_BASE_VAR, "http://localhost:3000/api/"),
            (STORE_PATH_VAR, "data/catalog.json"),
            (LIST_LIMIT_VAR, "3"),
            (PRICE_CEILING_VAR, "99.5"),
            (EXPORT_PATH_VAR, "out.csv"),
        ]))
        .unwrap();
        assert_eq!(cfg.api_base_str(), "http://localhost:3000/api");
        assert_eq!(cfg.store_path, PathBuf::from("data/catalog.json"));
        assert_eq!(cfg.list_limit, 3);
        assert_eq!(cfg.price_ceiling, 99.5);
        assert_eq!(cfg.export_path, Some(PathBuf::from("out.csv")));
    }

    #[test]
    fn rejects_bad_values() {
        assert!(CatalogConfig::from_lookup(lookup_from(&[(API_BASE_VAR, "ftp://x")])).is_err());
        assert!(CatalogConfig::from_lookup(lookup_from(&[(API_BASE_VAR, "not a url")])).is_err());
        assert!(CatalogConfig::from_lookup(lookup_from(&[(TIMEOUT_VAR, "soon")])).is_err());
        assert!(CatalogConfig::from_lookup(lookup_from(&[(PRICE_CEILING_VAR, "NaN")])).is_err());
    }

    #[test]
    fn blank_values_fall_back_to_defaults() {
        let cfg = CatalogConfig::from_lookup(lookup_from(&[(STORE_PATH_VAR, "  ")])).unwrap();
        assert_eq!(cfg.store_path, PathBuf::from("products.json"));
    }
}
