pub mod local;
pub mod remote;
pub mod walkthrough;

use clap::Args;
use serde_json::Value;

use crate::catalog::ItemDraft;

/// Item fields accepted on the command line.
#[derive(Args, Debug, Clone, Default)]
pub struct ItemFields {
    #[arg(long)]
    pub title: Option<String>,
    /// Numeric values are stored as JSON numbers, anything else verbatim as text
    #[arg(long)]
    pub price: Option<String>,
    #[arg(long)]
    pub description: Option<String>,
    #[arg(long)]
    pub category: Option<String>,
    #[arg(long)]
    pub image: Option<String>,
}

impl ItemFields {
    pub fn into_draft(self) -> ItemDraft {
        ItemDraft {
            title: self.title,
            price: self.price.as_deref().map(price_value),
            description: self.description,
            category: self.category,
            image: self.image,
            ..ItemDraft::default()
        }
    }
}

fn price_value(raw: &str) -> Value {
    match serde_json::from_str::<Value>(raw.trim()) {
        Ok(v @ Value::Number(_)) => v,
        _ => Value::String(raw.to_string()),
    }
}
