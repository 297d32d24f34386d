use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// One product record, as served by the catalog API and as stored locally.
///
/// The record is kept as the JSON value it arrived as, key order included, so
/// a load/save cycle writes back exactly what was read. Accessors interpret
/// the well-known fields and answer `None` when one is missing or mistyped.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CatalogItem(Value);

impl CatalogItem {
    /// Integer `id`, or 0 when the record has none.
    pub fn id(&self) -> i64 {
        self.get("id").and_then(Value::as_i64).unwrap_or(0)
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    fn text(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(Value::as_str)
    }

    pub fn title(&self) -> Option<&str> {
        self.text("title")
    }

    pub fn description(&self) -> Option<&str> {
        self.text("description")
    }

    pub fn category(&self) -> Option<&str> {
        self.text("category")
    }

    pub fn image(&self) -> Option<&str> {
        self.text("image")
    }

    /// Raw price value; `null` counts as absent.
    pub fn price(&self) -> Option<&Value> {
        self.get("price").filter(|v| !v.is_null())
    }

    /// Price as a number: JSON numbers directly, strings by their leading
    /// numeric literal (`"12 USD"` is 12, `"$5"` is none).
    pub fn price_value(&self) -> Option<f64> {
        self.price().and_then(value_as_f64).filter(|p| !p.is_nan())
    }

    /// `rating.rate` when the item carries a catalog rating object.
    pub fn rating_rate(&self) -> Option<f64> {
        self.get("rating")
            .and_then(|r| r.get("rate"))
            .and_then(value_as_f64)
    }

    pub fn rating_count(&self) -> Option<u64> {
        self.get("rating")
            .and_then(|r| r.get("count"))
            .and_then(Value::as_u64)
    }

    pub fn title_or_na(&self) -> &str {
        self.title().unwrap_or("N/A")
    }
}

/// Caller-supplied fields for a new or updated item. Never carries an id.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ItemDraft {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(flatten)]
    pub extra: IndexMap<String, Value>,
}

impl ItemDraft {
    pub fn titled(title: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            ..Self::default()
        }
    }

    pub fn with_price(mut self, price: impl Into<Value>) -> Self {
        self.price = Some(price.into());
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn with_image(mut self, image: impl Into<String>) -> Self {
        self.image = Some(image.into());
        self
    }

    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.price.is_none()
            && self.description.is_none()
            && self.category.is_none()
            && self.image.is_none()
            && self.extra.is_empty()
    }

    /// Combine the draft with a store-assigned id, which comes first. An `id`
    /// key in the passthrough fields is dropped.
    pub fn into_item(self, id: i64) -> CatalogItem {
        let mut record = Map::new();
        record.insert("id".to_string(), Value::from(id));
        let named = [
            ("title", self.title.map(Value::String)),
            ("price", self.price),
            ("description", self.description.map(Value::String)),
            ("category", self.category.map(Value::String)),
            ("image", self.image.map(Value::String)),
        ];
        for (key, value) in named {
            if let Some(value) = value {
                record.insert(key.to_string(), value);
            }
        }
        for (key, value) in self.extra {
            if key != "id" {
                record.insert(key, value);
            }
        }
        CatalogItem(Value::Object(record))
    }
}

fn value_as_f64(v: &Value) -> Option<f64> {
    match v {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => leading_number(s),
        _ => None,
    }
}

/// Longest decimal literal at the start of `s` after leading whitespace:
/// `[+-]digits[.[digits]][e[+-]digits]`, or a signed `Infinity`. Trailing text
/// is ignored; no digits means no number.
fn leading_number(s: &str) -> Option<f64> {
    let s = s.trim_start();
    let bytes = s.as_bytes();
    let digits_from = |from: usize| bytes[from..].iter().take_while(|b| b.is_ascii_digit()).count();

    let mut end = usize::from(matches!(bytes.first(), Some(b'+' | b'-')));
    if s[end..].starts_with("Infinity") {
        return Some(if bytes[0] == b'-' {
            f64::NEG_INFINITY
        } else {
            f64::INFINITY
        });
    }

    let int_digits = digits_from(end);
    end += int_digits;
    let mut frac_digits = 0;
    if bytes.get(end) == Some(&b'.') {
        frac_digits = digits_from(end + 1);
        if int_digits > 0 || frac_digits > 0 {
            end += 1 + frac_digits;
        }
    }
    if int_digits == 0 && frac_digits == 0 {
        return None;
    }

    if matches!(bytes.get(end), Some(b'e' | b'E')) {
        let mut exp = end + 1;
        if matches!(bytes.get(exp), Some(b'+' | b'-')) {
            exp += 1;
        }
        let exp_digits = digits_from(exp);
        if exp_digits > 0 {
            end = exp + exp_digits;
        }
    }
    s[..end].parse::<f64>().ok()
}
