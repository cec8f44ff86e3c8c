//! Request parameter sets.
//!
//! Each call takes a [`Params`] map of field name to JSON value. The typed
//! builders in this module produce such maps for every supported operation
//! and are the preferred way to construct them.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::primitives::ItemId;
use crate::{Error, Result};

/// One caller-supplied parameter set.
///
/// Absent and `null` fields are treated the same way.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Params(Map<String, Value>);

impl Params {
    /// Create an empty parameter set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a field, replacing any previous value.
    pub fn with(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.0.insert(name.into(), value.into());
        self
    }

    /// Add a field only when a value is present.
    pub fn with_opt<V: Into<Value>>(self, name: impl Into<String>, value: Option<V>) -> Self {
        match value {
            Some(value) => self.with(name, value),
            None => self,
        }
    }

    /// Look up a field. `null` values are reported as absent.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.0.get(name).filter(|value| !value.is_null())
    }

    /// Iterate over the present (non-null) fields.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.0
            .iter()
            .filter(|(_, value)| !value.is_null())
            .map(|(name, value)| (name.as_str(), value))
    }
}

impl From<Map<String, Value>> for Params {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

impl TryFrom<Value> for Params {
    type Error = Error;

    fn try_from(value: Value) -> Result<Self> {
        match value {
            Value::Object(map) => Ok(Self(map)),
            Value::Null => Ok(Self::default()),
            other => Err(Error::Param(format!(
                "request parameters must be an object, got {other}"
            ))),
        }
    }
}

/// Parameters for `search`.
///
/// # Example
///
/// ```
/// use browse_batch::SearchParams;
///
/// let params = SearchParams::keywords("vintage camera")
///     .category_ids("625")
///     .limit(50)
///     .into_params();
///
/// assert_eq!(params.get("q").and_then(|v| v.as_str()), Some("vintage camera"));
/// ```
#[derive(Debug, Clone, Default)]
pub struct SearchParams {
    q: Option<String>,
    gtin: Option<String>,
    charity_ids: Option<String>,
    compatibility_filter: Option<String>,
    category_ids: Option<String>,
    filter: Option<String>,
    sort: Option<String>,
    fieldgroups: Option<String>,
    aspect_filter: Option<String>,
    epid: Option<String>,
    limit: Option<u32>,
    offset: Option<u32>,
}

impl SearchParams {
    /// Keyword search.
    pub fn keywords(q: impl Into<String>) -> Self {
        Self {
            q: Some(q.into()),
            ..Default::default()
        }
    }

    /// Search by Global Trade Item Number.
    pub fn gtin(gtin: impl Into<String>) -> Self {
        Self {
            gtin: Some(gtin.into()),
            ..Default::default()
        }
    }

    /// Restrict to items benefiting one or more comma-separated charity ids.
    pub fn charity_ids(mut self, ids: impl Into<String>) -> Self {
        self.charity_ids = Some(ids.into());
        self
    }

    /// Product compatibility expression (e.g. `Year:2018;Make:Honda`).
    pub fn compatibility_filter(mut self, filter: impl Into<String>) -> Self {
        self.compatibility_filter = Some(filter.into());
        self
    }

    /// Restrict to one or more comma-separated category ids.
    pub fn category_ids(mut self, ids: impl Into<String>) -> Self {
        self.category_ids = Some(ids.into());
        self
    }

    /// Field filter expression (e.g. `price:[10..50],priceCurrency:USD`).
    pub fn filter(mut self, filter: impl Into<String>) -> Self {
        self.filter = Some(filter.into());
        self
    }

    /// Sort order (e.g. `price`, `-price`, `newlyListed`).
    pub fn sort(mut self, sort: impl Into<String>) -> Self {
        self.sort = Some(sort.into());
        self
    }

    /// Response field groups (e.g. `MATCHING_ITEMS,EXTENDED`).
    pub fn fieldgroups(mut self, fieldgroups: impl Into<String>) -> Self {
        self.fieldgroups = Some(fieldgroups.into());
        self
    }

    /// Aspect filter expression.
    pub fn aspect_filter(mut self, aspect_filter: impl Into<String>) -> Self {
        self.aspect_filter = Some(aspect_filter.into());
        self
    }

    /// Catalog product id.
    pub fn epid(mut self, epid: impl Into<String>) -> Self {
        self.epid = Some(epid.into());
        self
    }

    /// Page size (the API caps this at 200).
    pub fn limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Number of results to skip.
    pub fn offset(mut self, offset: u32) -> Self {
        self.offset = Some(offset);
        self
    }

    /// Convert into a generic parameter set.
    pub fn into_params(self) -> Params {
        Params::new()
            .with_opt("q", self.q)
            .with_opt("gtin", self.gtin)
            .with_opt("charity_ids", self.charity_ids)
            .with_opt("compatibility_filter", self.compatibility_filter)
            .with_opt("category_ids", self.category_ids)
            .with_opt("filter", self.filter)
            .with_opt("sort", self.sort)
            .with_opt("fieldgroups", self.fieldgroups)
            .with_opt("aspect_filter", self.aspect_filter)
            .with_opt("epid", self.epid)
            .with_opt("limit", self.limit)
            .with_opt("offset", self.offset)
    }
}

/// Parameters for `search_by_image`.
#[derive(Debug, Clone)]
pub struct SearchByImageParams {
    image: String,
    category_ids: Option<String>,
    filter: Option<String>,
    sort: Option<String>,
    aspect_filter: Option<String>,
    epid: Option<String>,
    limit: Option<u32>,
    offset: Option<u32>,
}

impl SearchByImageParams {
    /// Use an already base64-encoded image.
    pub fn new(image_base64: impl Into<String>) -> Self {
        Self {
            image: image_base64.into(),
            category_ids: None,
            filter: None,
            sort: None,
            aspect_filter: None,
            epid: None,
            limit: None,
            offset: None,
        }
    }

    /// Encode raw image bytes (JPEG, PNG, ...) as base64.
    pub fn from_image_bytes(bytes: &[u8]) -> Self {
        Self::new(STANDARD.encode(bytes))
    }

    /// Restrict to one or more comma-separated category ids.
    pub fn category_ids(mut self, ids: impl Into<String>) -> Self {
        self.category_ids = Some(ids.into());
        self
    }

    /// Field filter expression.
    pub fn filter(mut self, filter: impl Into<String>) -> Self {
        self.filter = Some(filter.into());
        self
    }

    /// Sort order.
    pub fn sort(mut self, sort: impl Into<String>) -> Self {
        self.sort = Some(sort.into());
        self
    }

    /// Aspect filter expression.
    pub fn aspect_filter(mut self, aspect_filter: impl Into<String>) -> Self {
        self.aspect_filter = Some(aspect_filter.into());
        self
    }

    /// Catalog product id.
    pub fn epid(mut self, epid: impl Into<String>) -> Self {
        self.epid = Some(epid.into());
        self
    }

    /// Page size.
    pub fn limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Number of results to skip.
    pub fn offset(mut self, offset: u32) -> Self {
        self.offset = Some(offset);
        self
    }

    /// Convert into a generic parameter set.
    pub fn into_params(self) -> Params {
        Params::new()
            .with("image", self.image)
            .with_opt("category_ids", self.category_ids)
            .with_opt("filter", self.filter)
            .with_opt("sort", self.sort)
            .with_opt("aspect_filter", self.aspect_filter)
            .with_opt("epid", self.epid)
            .with_opt("limit", self.limit)
            .with_opt("offset", self.offset)
    }
}

/// Parameters for `get_item`.
#[derive(Debug, Clone)]
pub struct GetItemParams {
    item_id: ItemId,
    fieldgroups: Option<String>,
}

impl GetItemParams {
    /// Look up a single item by RESTful id.
    pub fn new(item_id: impl Into<ItemId>) -> Self {
        Self {
            item_id: item_id.into(),
            fieldgroups: None,
        }
    }

    /// Response field groups (e.g. `PRODUCT`).
    pub fn fieldgroups(mut self, fieldgroups: impl Into<String>) -> Self {
        self.fieldgroups = Some(fieldgroups.into());
        self
    }

    /// Convert into a generic parameter set.
    pub fn into_params(self) -> Params {
        Params::new()
            .with("item_id", self.item_id.as_str())
            .with_opt("fieldgroups", self.fieldgroups)
    }
}

/// Parameters for `get_item_by_legacy_id`.
#[derive(Debug, Clone)]
pub struct LegacyItemParams {
    legacy_item_id: String,
    legacy_variation_id: Option<String>,
    legacy_variation_sku: Option<String>,
    fieldgroups: Option<String>,
}

impl LegacyItemParams {
    /// Look up an item by its legacy (Trading API) id.
    pub fn new(legacy_item_id: impl Into<String>) -> Self {
        Self {
            legacy_item_id: legacy_item_id.into(),
            legacy_variation_id: None,
            legacy_variation_sku: None,
            fieldgroups: None,
        }
    }

    /// Select a variation within a multi-variation listing.
    pub fn variation_id(mut self, id: impl Into<String>) -> Self {
        self.legacy_variation_id = Some(id.into());
        self
    }

    /// Select a variation by seller SKU.
    pub fn variation_sku(mut self, sku: impl Into<String>) -> Self {
        self.legacy_variation_sku = Some(sku.into());
        self
    }

    /// Response field groups.
    pub fn fieldgroups(mut self, fieldgroups: impl Into<String>) -> Self {
        self.fieldgroups = Some(fieldgroups.into());
        self
    }

    /// Convert into a generic parameter set.
    pub fn into_params(self) -> Params {
        Params::new()
            .with("legacy_item_id", self.legacy_item_id)
            .with_opt("legacy_variation_id", self.legacy_variation_id)
            .with_opt("legacy_variation_sku", self.legacy_variation_sku)
            .with_opt("fieldgroups", self.fieldgroups)
    }
}

/// Parameters for `get_items_by_item_group`.
#[derive(Debug, Clone)]
pub struct ItemGroupParams {
    item_group_id: String,
}

impl ItemGroupParams {
    /// Look up every item in a variation group.
    pub fn new(item_group_id: impl Into<String>) -> Self {
        Self {
            item_group_id: item_group_id.into(),
        }
    }

    /// Convert into a generic parameter set.
    pub fn into_params(self) -> Params {
        Params::new().with("item_group_id", self.item_group_id)
    }
}

/// A name/value attribute pair used by `check_compatibility`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompatibilityProperty {
    /// Attribute name (e.g. `Make`)
    pub name: String,
    /// Attribute value (e.g. `Toyota`)
    pub value: String,
}

/// Parameters for `check_compatibility`.
///
/// # Example
///
/// ```
/// use browse_batch::CompatibilityParams;
///
/// let params = CompatibilityParams::new("v1|2200077988|0")
///     .property("Make", "Toyota")
///     .property("Model", "Camry")
///     .property("Year", "2016")
///     .into_params();
///
/// assert_eq!(
///     params.get("compatibility_properties").and_then(|v| v.as_array()).map(Vec::len),
///     Some(3)
/// );
/// ```
#[derive(Debug, Clone)]
pub struct CompatibilityParams {
    item_id: ItemId,
    properties: Vec<CompatibilityProperty>,
}

impl CompatibilityParams {
    /// Check compatibility of the given item.
    pub fn new(item_id: impl Into<ItemId>) -> Self {
        Self {
            item_id: item_id.into(),
            properties: Vec::new(),
        }
    }

    /// Add an attribute pair.
    pub fn property(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.properties.push(CompatibilityProperty {
            name: name.into(),
            value: value.into(),
        });
        self
    }

    /// Convert into a generic parameter set.
    pub fn into_params(self) -> Params {
        let properties = self
            .properties
            .into_iter()
            .map(|p| serde_json::json!({"name": p.name, "value": p.value}))
            .collect::<Vec<_>>();

        Params::new()
            .with("item_id", self.item_id.as_str())
            .with("compatibility_properties", properties)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_params_from_value() {
        let params = Params::try_from(json!({"q": "lens", "limit": 10, "sort": null})).unwrap();
        assert_eq!(params.get("q"), Some(&json!("lens")));
        assert_eq!(params.get("sort"), None);
        assert_eq!(params.iter().count(), 2);
    }

    #[test]
    fn test_params_from_non_object() {
        let err = Params::try_from(json!(["q", "lens"])).unwrap_err();
        assert!(matches!(err, Error::Param(_)));
        assert_eq!(Params::try_from(Value::Null).unwrap(), Params::new());
    }

    #[test]
    fn test_search_params_skip_unset_fields() {
        let params = SearchParams::keywords("lens").limit(20).into_params();
        let names: Vec<&str> = params.iter().map(|(name, _)| name).collect();
        assert_eq!(names.len(), 2);
        assert!(names.contains(&"q"));
        assert!(names.contains(&"limit"));
    }

    #[test]
    fn test_image_bytes_are_base64_encoded() {
        let params = SearchByImageParams::from_image_bytes(b"\x89PNG").into_params();
        assert_eq!(params.get("image"), Some(&json!("iVBORw==")));
    }

    #[test]
    fn test_builders_only_emit_accepted_fields() {
        use crate::api::Operation;

        let search = SearchParams::keywords("brake pads")
            .charity_ids("13-1788491")
            .compatibility_filter("Year:2018;Make:Honda")
            .category_ids("33559")
            .filter("price:[10..50]")
            .sort("price")
            .fieldgroups("ASPECT_REFINEMENTS")
            .aspect_filter("categoryId:33559")
            .epid("241042291")
            .limit(10)
            .offset(20)
            .into_params();
        assert_eq!(search.iter().count(), 11);
        assert!(Operation::Search.prepare(&search).is_ok());

        let image = SearchByImageParams::new("aGVsbG8=")
            .category_ids("625")
            .filter("conditions:{NEW}")
            .sort("-price")
            .aspect_filter("categoryId:625")
            .epid("241042291")
            .limit(5)
            .offset(0)
            .into_params();
        assert_eq!(image.get("epid"), Some(&json!("241042291")));
        assert!(Operation::SearchByImage.prepare(&image).is_ok());
    }

    #[test]
    fn test_legacy_params() {
        let params = LegacyItemParams::new("110552191234")
            .variation_sku("SKU-1")
            .into_params();
        assert_eq!(params.get("legacy_item_id"), Some(&json!("110552191234")));
        assert_eq!(params.get("legacy_variation_sku"), Some(&json!("SKU-1")));
        assert_eq!(params.get("legacy_variation_id"), None);
    }
}
