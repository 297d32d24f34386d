pub mod catalog;
pub mod cli;
pub mod error;
pub mod export;
pub mod orchestrator;
pub mod remote;
pub mod report;
pub mod store;
pub mod tracing;

pub mod util {
    pub mod env;
}

pub use catalog::{CatalogItem, ItemDraft};
pub use error::{CatalogError, Result};
pub use remote::{CatalogApi, StoreApiProvider};
pub use store::CatalogStore;
