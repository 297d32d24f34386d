//! Console rendering of operation outcomes.
//!
//! Operations hand back [`StepReport`] values; nothing in here talks to the
//! network or the disk, it only turns reports into text.

use std::fmt::Write as _;
use std::path::PathBuf;

use crate::catalog::{CatalogItem, CatalogStats};
use crate::error::CatalogError;
use crate::store::PruneOutcome;

const LISTING_WIDTH: usize = 60;
const TITLE_MAX_CHARS: usize = 35;

#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    Items(Vec<CatalogItem>),
    Item(CatalogItem),
    Saved { path: PathBuf, count: usize },
    Pruned { threshold: f64, outcome: PruneOutcome },
    Stats { stats: CatalogStats, items: Vec<CatalogItem> },
    Exported { path: PathBuf, rows: usize },
}

#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Success(Payload),
    Failure { kind: &'static str, message: String },
}

#[derive(Debug, Clone, PartialEq)]
pub struct StepReport {
    pub operation: String,
    pub detail: String,
    pub outcome: Outcome,
}

impl StepReport {
    pub fn success(operation: impl Into<String>, detail: impl Into<String>, payload: Payload) -> Self {
        Self {
            operation: operation.into(),
            detail: detail.into(),
            outcome: Outcome::Success(payload),
        }
    }

    pub fn failure(operation: impl Into<String>, err: &CatalogError) -> Self {
        Self {
            operation: operation.into(),
            detail: String::new(),
            outcome: Outcome::Failure {
                kind: err.kind(),
                message: err.to_string(),
            },
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self.outcome, Outcome::Success(_))
    }

    pub fn payload(&self) -> Option<&Payload> {
        match &self.outcome {
            Outcome::Success(payload) => Some(payload),
            Outcome::Failure { .. } => None,
        }
    }
}

/// `==== title ====` centred in `width` columns, or a plain rule without a title.
pub fn separator(title: &str, symbol: char, width: usize) -> String {
    if title.is_empty() {
        return symbol.to_string().repeat(width);
    }
    let pad = width.saturating_sub(title.chars().count() + 2) / 2;
    let side = symbol.to_string().repeat(pad);
    format!("{side} {title} {side}")
}

fn money(value: f64) -> String {
    format!("${value:.2}")
}

fn price_cell(item: &CatalogItem) -> String {
    item.price_value().map(money).unwrap_or_else(|| "N/A".to_string())
}

fn short_title(item: &CatalogItem) -> String {
    let title = item.title_or_na();
    if title.chars().count() > TITLE_MAX_CHARS {
        let head: String = title.chars().take(TITLE_MAX_CHARS).collect();
        format!("{head}...")
    } else {
        title.to_string()
    }
}

fn write_item_summary(out: &mut String, item: &CatalogItem) {
    let _ = writeln!(out, "   id: {}", item.id());
    if let Some(title) = item.title() {
        let _ = writeln!(out, "   title: {title}");
    }
    if item.price().is_some() {
        let _ = writeln!(out, "   price: {}", price_cell(item));
    }
}

pub fn render_step(report: &StepReport) -> String {
    let mut out = String::new();
    match &report.outcome {
        Outcome::Success(payload) => {
            let _ = writeln!(out, "[OK] {}", report.operation);
            if !report.detail.is_empty() {
                let _ = writeln!(out, "   {}", report.detail);
            }
            match payload {
                Payload::Items(items) => {
                    let _ = writeln!(out, "   count: {} items", items.len());
                }
                Payload::Item(item) => write_item_summary(&mut out, item),
                Payload::Saved { path, count } => {
                    let _ = writeln!(out, "   {count} items written to {}", path.display());
                }
                Payload::Pruned { threshold, outcome } => {
                    let _ = writeln!(
                        out,
                        "   removed {} items, {} remaining (max price {})",
                        outcome.removed,
                        outcome.remaining,
                        money(*threshold)
                    );
                }
                Payload::Stats { stats, items } => out.push_str(&render_stats(stats, items)),
                Payload::Exported { path, rows } => {
                    let _ = writeln!(out, "   {rows} rows exported to {}", path.display());
                }
            }
        }
        Outcome::Failure { kind, message } => {
            let _ = writeln!(out, "[ERROR] {} ({kind})", report.operation);
            let _ = writeln!(out, "   {message}");
        }
    }
    out
}

/// Summary figures followed by a numbered listing of every item.
pub fn render_stats(stats: &CatalogStats, items: &[CatalogItem]) -> String {
    let mut out = String::new();
    if items.is_empty() {
        out.push_str("   the local store is empty or missing\n");
        return out;
    }

    let _ = writeln!(out, "   total products: {}", stats.total);
    if let (Some(avg), Some(max), Some(min)) = (stats.average, stats.max, stats.min) {
        let _ = writeln!(out, "   average price: {}", money(avg));
        let _ = writeln!(out, "   highest price: {}", money(max));
        let _ = writeln!(out, "   lowest price: {}", money(min));
    }
    out.push_str(&render_listing(items));
    out
}

pub fn render_listing(items: &[CatalogItem]) -> String {
    let rule = "─".repeat(LISTING_WIDTH);
    let mut out = String::new();
    let _ = writeln!(out, "{rule}");
    for (index, item) in items.iter().enumerate() {
        let _ = writeln!(
            out,
            "{:02}. {:<38} {:>8}",
            index + 1,
            short_title(item),
            price_cell(item)
        );
    }
    let _ = writeln!(out, "{rule}");
    out
}
