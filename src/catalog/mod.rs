//! Catalog item model and the pure queries run over item lists.

pub mod item;
pub mod query;

pub use item::{CatalogItem, ItemDraft};
pub use query::CatalogStats;
