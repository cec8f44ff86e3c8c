//! Normalized Browse API replies.
//!
//! Every decoded reply is wrapped in a [`BrowseResponse`] tagged with the
//! operation that produced it. Business-level `warnings` and `errors`
//! reported inside a JSON document are surfaced as fields, not raised.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::api::Operation;

/// A monetary amount as reported by the API (value is a decimal string).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Amount {
    /// Decimal value, e.g. `"12.99"`
    #[serde(default, deserialize_with = "lenient")]
    pub value: Option<String>,
    /// ISO 4217 currency code
    #[serde(default, deserialize_with = "lenient")]
    pub currency: Option<String>,
}

impl Amount {
    /// Parse the value as a float.
    pub fn as_f64(&self) -> Option<f64> {
        self.value.as_deref().and_then(|v| v.parse().ok())
    }
}

/// Listing image reference.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Image {
    /// Image URL
    #[serde(default, deserialize_with = "lenient")]
    pub image_url: Option<String>,
}

/// Seller summary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Seller {
    /// Seller user name
    #[serde(default, deserialize_with = "lenient")]
    pub username: Option<String>,
    /// Positive feedback percentage, e.g. `"99.4"`
    #[serde(default, deserialize_with = "lenient")]
    pub feedback_percentage: Option<String>,
    /// Feedback score
    #[serde(default, deserialize_with = "lenient")]
    pub feedback_score: Option<i64>,
}

/// One shipping option of a listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShippingOption {
    /// Shipping cost
    #[serde(default, deserialize_with = "lenient")]
    pub shipping_cost: Option<Amount>,
    /// `FIXED`, `CALCULATED`, ...
    #[serde(default, deserialize_with = "lenient")]
    pub shipping_cost_type: Option<String>,
}

/// An item summary (search results) or item detail (item lookups).
///
/// Only the commonly used fields are typed; the full document stays
/// available through [`BrowseResponse::raw`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemSummary {
    /// RESTful item id
    #[serde(default, deserialize_with = "lenient")]
    pub item_id: Option<String>,
    /// Listing title
    #[serde(default, deserialize_with = "lenient")]
    pub title: Option<String>,
    /// Current price
    #[serde(default, deserialize_with = "lenient")]
    pub price: Option<Amount>,
    /// Condition text, e.g. `Used`
    #[serde(default, deserialize_with = "lenient")]
    pub condition: Option<String>,
    /// Condition id
    #[serde(default, deserialize_with = "lenient")]
    pub condition_id: Option<String>,
    /// Listing page URL
    #[serde(default, deserialize_with = "lenient")]
    pub item_web_url: Option<String>,
    /// Primary image
    #[serde(default, deserialize_with = "lenient")]
    pub image: Option<Image>,
    /// Seller summary
    #[serde(default, deserialize_with = "lenient")]
    pub seller: Option<Seller>,
    /// Shipping options
    #[serde(default, deserialize_with = "lenient_list")]
    pub shipping_options: Vec<ShippingOption>,
    /// `FIXED_PRICE`, `AUCTION`, ...
    #[serde(default, deserialize_with = "lenient_list")]
    pub buying_options: Vec<String>,
}

impl ItemSummary {
    /// Cost of the first shipping option, if any.
    pub fn shipping_cost(&self) -> Option<f64> {
        self.shipping_options
            .first()
            .and_then(|option| option.shipping_cost.as_ref())
            .and_then(Amount::as_f64)
    }
}

/// A parameter attached to an [`ApiMessage`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MessageParameter {
    /// Parameter name
    #[serde(default, deserialize_with = "lenient")]
    pub name: Option<String>,
    /// Parameter value
    #[serde(default, deserialize_with = "lenient")]
    pub value: Option<String>,
}

/// A warning or error entry reported by the remote side.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiMessage {
    /// Numeric error id
    #[serde(default, deserialize_with = "lenient")]
    pub error_id: Option<i64>,
    /// Domain, e.g. `API_BROWSE`
    #[serde(default, deserialize_with = "lenient")]
    pub domain: Option<String>,
    /// `REQUEST`, `APPLICATION`, `BUSINESS`
    #[serde(default, deserialize_with = "lenient")]
    pub category: Option<String>,
    /// Short message
    #[serde(default, deserialize_with = "lenient")]
    pub message: Option<String>,
    /// Detailed message
    #[serde(default, deserialize_with = "lenient")]
    pub long_message: Option<String>,
    /// Offending parameters
    #[serde(default, deserialize_with = "lenient_list")]
    pub parameters: Vec<MessageParameter>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct WireResponse {
    #[serde(deserialize_with = "lenient")]
    total: Option<u64>,
    #[serde(deserialize_with = "lenient")]
    href: Option<String>,
    #[serde(deserialize_with = "lenient")]
    next: Option<String>,
    #[serde(deserialize_with = "lenient")]
    prev: Option<String>,
    #[serde(deserialize_with = "lenient")]
    limit: Option<u64>,
    #[serde(deserialize_with = "lenient")]
    offset: Option<u64>,
    #[serde(deserialize_with = "lenient_list")]
    item_summaries: Vec<ItemSummary>,
    #[serde(deserialize_with = "lenient_list")]
    items: Vec<ItemSummary>,
    #[serde(deserialize_with = "lenient_list")]
    warnings: Vec<ApiMessage>,
    #[serde(deserialize_with = "lenient_list")]
    errors: Vec<ApiMessage>,
    #[serde(deserialize_with = "lenient")]
    compatibility_status: Option<String>,
}

/// A decoded reply for one request.
///
/// A `BrowseResponse` always means the HTTP exchange produced a JSON
/// document. Whether the remote side accepted the request is visible through
/// [`status`](Self::status), [`errors`](Self::errors) and
/// [`warnings`](Self::warnings).
#[derive(Debug, Clone, PartialEq)]
pub struct BrowseResponse {
    /// Operation that produced this reply
    pub operation: Operation,
    /// HTTP status code
    pub status: u16,
    /// Total number of matches (search operations)
    pub total: Option<u64>,
    /// Search result page
    pub item_summaries: Vec<ItemSummary>,
    /// Items of a group lookup, or the single item of an item lookup
    pub items: Vec<ItemSummary>,
    /// Business-level warnings
    pub warnings: Vec<ApiMessage>,
    /// Business-level errors
    pub errors: Vec<ApiMessage>,
    /// `COMPATIBLE`, `NOT_COMPATIBLE`, `UNDETERMINED` (compatibility checks)
    pub compatibility_status: Option<String>,
    /// Link to this page
    pub href: Option<String>,
    /// Link to the next page
    pub next: Option<String>,
    /// Link to the previous page
    pub prev: Option<String>,
    /// Page size
    pub limit: Option<u64>,
    /// Page offset
    pub offset: Option<u64>,
    /// Full decoded document
    pub raw: Value,
}

impl BrowseResponse {
    /// Normalize a decoded JSON document.
    ///
    /// Typed fields with an unexpected shape are left empty; the document
    /// itself is always kept in [`raw`](Self::raw).
    pub fn from_json(operation: Operation, status: u16, raw: Value) -> Self {
        let wire: WireResponse = serde_json::from_value(raw.clone()).unwrap_or_default();

        let mut items = wire.items;
        if operation.returns_single_item() && raw.get("itemId").is_some() {
            if let Ok(item) = serde_json::from_value(raw.clone()) {
                items.push(item);
            }
        }

        Self {
            operation,
            status,
            total: wire.total,
            item_summaries: wire.item_summaries,
            items,
            warnings: wire.warnings,
            errors: wire.errors,
            compatibility_status: wire.compatibility_status,
            href: wire.href,
            next: wire.next,
            prev: wire.prev,
            limit: wire.limit,
            offset: wire.offset,
            raw,
        }
    }

    /// Items carried by this reply, whatever the operation.
    pub fn all_items(&self) -> &[ItemSummary] {
        if self.item_summaries.is_empty() {
            &self.items
        } else {
            &self.item_summaries
        }
    }

    /// Total match count, falling back to the number of returned items.
    pub fn total_count(&self) -> u64 {
        self.total.unwrap_or(self.all_items().len() as u64)
    }

    /// Returns `true` if the remote side reported warnings.
    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }

    /// Returns `true` if the remote side reported errors.
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    /// Returns `true` for a 2xx reply without reported errors.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status) && !self.has_errors()
    }
}

/// Decode a field, treating a value of the wrong shape as absent.
fn lenient<'de, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned + Default,
{
    let value = Value::deserialize(deserializer)?;
    Ok(serde_json::from_value(value).unwrap_or_default())
}

/// Decode a list, skipping entries that do not decode.
fn lenient_list<'de, D, T>(deserializer: D) -> std::result::Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Array(entries) => entries
            .into_iter()
            .filter_map(|entry| serde_json::from_value(entry).ok())
            .collect(),
        _ => Vec::new(),
    })
}
