//! Browse API operations and request construction.

use std::fmt;
use std::str::FromStr;

use reqwest::Method;
use serde_json::{json, Value};

use crate::models::Params;
use crate::{Error, Result};

/// One of the supported Browse API methods.
///
/// # Example
///
/// ```
/// use browse_batch::api::Operation;
///
/// let op: Operation = "search_by_image".parse()?;
/// assert_eq!(op, Operation::SearchByImage);
/// assert_eq!("search-by-image".parse::<Operation>()?, op);
/// assert!("buy_item".parse::<Operation>().is_err());
/// # Ok::<(), browse_batch::Error>(())
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    /// Keyword/GTIN/category search
    Search,
    /// Search by base64-encoded image
    SearchByImage,
    /// Item by RESTful id
    GetItem,
    /// Item by legacy id
    GetItemByLegacyId,
    /// Items of a variation group
    GetItemsByItemGroup,
    /// Compatibility of an item with a product
    CheckCompatibility,
}

impl Operation {
    /// Every supported operation.
    pub const ALL: [Operation; 6] = [
        Operation::Search,
        Operation::SearchByImage,
        Operation::GetItem,
        Operation::GetItemByLegacyId,
        Operation::GetItemsByItemGroup,
        Operation::CheckCompatibility,
    ];

    /// Canonical method name.
    pub fn name(&self) -> &'static str {
        match self {
            Operation::Search => "search",
            Operation::SearchByImage => "search_by_image",
            Operation::GetItem => "get_item",
            Operation::GetItemByLegacyId => "get_item_by_legacy_id",
            Operation::GetItemsByItemGroup => "get_items_by_item_group",
            Operation::CheckCompatibility => "check_compatibility",
        }
    }

    /// HTTP verb used by this operation.
    pub fn method(&self) -> Method {
        match self {
            Operation::SearchByImage | Operation::CheckCompatibility => Method::POST,
            _ => Method::GET,
        }
    }

    /// Fields that must be present.
    pub fn required_fields(&self) -> &'static [&'static str] {
        match self {
            Operation::Search => &[],
            Operation::SearchByImage => &["image"],
            Operation::GetItem => &["item_id"],
            Operation::GetItemByLegacyId => &["legacy_item_id"],
            Operation::GetItemsByItemGroup => &["item_group_id"],
            Operation::CheckCompatibility => &["item_id", "compatibility_properties"],
        }
    }

    /// Every field this operation accepts.
    pub fn accepted_fields(&self) -> &'static [&'static str] {
        match self {
            Operation::Search => &[
                "q",
                "gtin",
                "charity_ids",
                "fieldgroups",
                "compatibility_filter",
                "category_ids",
                "filter",
                "sort",
                "limit",
                "offset",
                "aspect_filter",
                "epid",
            ],
            Operation::SearchByImage => &[
                "image",
                "category_ids",
                "filter",
                "sort",
                "limit",
                "offset",
                "aspect_filter",
                "epid",
            ],
            Operation::GetItem => &["item_id", "fieldgroups"],
            Operation::GetItemByLegacyId => &[
                "legacy_item_id",
                "legacy_variation_id",
                "legacy_variation_sku",
                "fieldgroups",
            ],
            Operation::GetItemsByItemGroup => &["item_group_id"],
            Operation::CheckCompatibility => &["item_id", "compatibility_properties"],
        }
    }

    /// Query values sent when the caller leaves the field unset.
    ///
    /// Searches request the largest page the API allows.
    pub fn default_fields(&self) -> &'static [(&'static str, &'static str)] {
        match self {
            Operation::Search => &[
                ("fieldgroups", "MATCHING_ITEMS"),
                ("limit", "200"),
                ("offset", "0"),
            ],
            Operation::SearchByImage => &[("limit", "200"), ("offset", "0")],
            _ => &[],
        }
    }

    pub(crate) fn returns_single_item(&self) -> bool {
        matches!(self, Operation::GetItem | Operation::GetItemByLegacyId)
    }

    /// Build the request for one parameter set.
    ///
    /// This is pure: nothing is sent, and the same parameters always yield
    /// the same request.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Param`] if a required field is missing, a field is
    /// not accepted by this operation, or a field has the wrong shape.
    pub fn prepare(&self, params: &Params) -> Result<PreparedRequest> {
        for (name, _) in params.iter() {
            if !self.accepted_fields().iter().any(|field| *field == name) {
                return Err(Error::Param(format!(
                    "{name} is not a parameter of {}",
                    self.name()
                )));
            }
        }
        for name in self.required_fields() {
            if params.get(name).is_none() {
                return Err(Error::Param(format!(
                    "{name} is required for {}",
                    self.name()
                )));
            }
        }

        let request = match self {
            Operation::Search => self.get(
                "/item_summary/search",
                query(params, &[], self.default_fields()),
            ),
            Operation::SearchByImage => PreparedRequest {
                operation: *self,
                method: self.method(),
                path: "/item_summary/search_by_image".to_string(),
                query: query(params, &["image"], self.default_fields()),
                body: Some(json!({"image": field_string(params, "image")?})),
            },
            Operation::GetItem => self.get(
                &format!("/item/{}", path_segment(params, "item_id")?),
                query(params, &["item_id"], &[]),
            ),
            Operation::GetItemByLegacyId => {
                self.get("/item/get_item_by_legacy_id", query(params, &[], &[]))
            }
            Operation::GetItemsByItemGroup => {
                self.get("/item/get_items_by_item_group", query(params, &[], &[]))
            }
            Operation::CheckCompatibility => PreparedRequest {
                operation: *self,
                method: self.method(),
                path: format!(
                    "/item/{}/check_compatibility",
                    path_segment(params, "item_id")?
                ),
                query: Vec::new(),
                body: Some(json!({
                    "compatibilityProperties": compatibility_properties(params)?
                })),
            },
        };

        Ok(request)
    }

    fn get(&self, path: &str, query: Vec<(String, String)>) -> PreparedRequest {
        PreparedRequest {
            operation: *self,
            method: Method::GET,
            path: path.to_string(),
            query,
            body: None,
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Operation {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.replace('-', "_").as_str() {
            "search" => Ok(Operation::Search),
            "search_by_image" => Ok(Operation::SearchByImage),
            "get_item" => Ok(Operation::GetItem),
            "get_item_by_legacy_id" => Ok(Operation::GetItemByLegacyId),
            "get_items_by_item_group" | "get_items_by_group" => {
                Ok(Operation::GetItemsByItemGroup)
            }
            "check_compatibility" => Ok(Operation::CheckCompatibility),
            _ => Err(Error::Method(s.to_string())),
        }
    }
}

/// A fully built request, independent of any token.
///
/// The bearer token is attached only when the request is sent, so a
/// `PreparedRequest` can be reused across token refreshes.
#[derive(Debug, Clone, PartialEq)]
pub struct PreparedRequest {
    /// Operation that built this request
    pub operation: Operation,
    /// HTTP verb
    pub method: Method,
    /// Path relative to the Browse API base URL
    pub path: String,
    /// Query pairs in key order
    pub query: Vec<(String, String)>,
    /// JSON body for write-style operations
    pub body: Option<Value>,
}

/// Stringify every present field except `exclude`, fill in unset
/// `defaults`, sorted by name.
fn query(
    params: &Params,
    exclude: &[&str],
    defaults: &[(&str, &str)],
) -> Vec<(String, String)> {
    let mut pairs: Vec<(String, String)> = params
        .iter()
        .filter(|(name, _)| !exclude.iter().any(|excluded| excluded == name))
        .map(|(name, value)| (name.to_string(), stringify(value)))
        .collect();
    for (name, value) in defaults {
        if params.get(name).is_none() {
            pairs.push((name.to_string(), value.to_string()));
        }
    }
    pairs.sort();
    pairs
}

fn stringify(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn field_string(params: &Params, name: &str) -> Result<String> {
    match params.get(name) {
        Some(Value::String(s)) if !s.is_empty() => Ok(s.clone()),
        Some(Value::Number(n)) => Ok(n.to_string()),
        _ => Err(Error::Param(format!("{name} must be a non-empty string"))),
    }
}

fn path_segment(params: &Params, name: &str) -> Result<String> {
    field_string(params, name).map(|value| urlencoding::encode(&value).into_owned())
}

fn compatibility_properties(params: &Params) -> Result<Vec<Value>> {
    let invalid = || {
        Error::Param(
            "compatibility_properties must be a list of {name, value} pairs".to_string(),
        )
    };

    let entries = params
        .get("compatibility_properties")
        .and_then(Value::as_array)
        .ok_or_else(invalid)?;

    entries
        .iter()
        .map(|entry| {
            let name = entry.get("name").and_then(Value::as_str).ok_or_else(invalid)?;
            let value = entry.get("value").and_then(Value::as_str).ok_or_else(invalid)?;
            Ok(json!({"name": name, "value": value}))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{CompatibilityParams, GetItemParams, SearchByImageParams, SearchParams};

    fn params(value: Value) -> Params {
        Params::try_from(value).unwrap()
    }

    #[test]
    fn test_operation_names_round_trip() {
        for op in Operation::ALL {
            assert_eq!(op.name().parse::<Operation>().unwrap(), op);
        }
        assert_eq!(
            "get-items-by-group".parse::<Operation>().unwrap(),
            Operation::GetItemsByItemGroup
        );
    }

    #[test]
    fn test_unknown_operation_is_method_error() {
        let err = "place_offer".parse::<Operation>().unwrap_err();
        assert!(matches!(err, Error::Method(ref name) if name == "place_offer"));
        assert!(err.is_fatal());
        assert_eq!(err.to_string(), "This method is not supported: place_offer");
    }

    #[test]
    fn test_search_query_drops_null_and_stringifies() {
        let request = Operation::Search
            .prepare(&params(json!({
                "q": "drone",
                "limit": 50,
                "sort": null,
                "fieldgroups": "MATCHING_ITEMS"
            })))
            .unwrap();

        assert_eq!(request.method, Method::GET);
        assert_eq!(request.path, "/item_summary/search");
        assert_eq!(
            request.query,
            vec![
                ("fieldgroups".to_string(), "MATCHING_ITEMS".to_string()),
                ("limit".to_string(), "50".to_string()),
                ("offset".to_string(), "0".to_string()),
                ("q".to_string(), "drone".to_string()),
            ]
        );
        assert!(request.body.is_none());
    }

    #[test]
    fn test_search_by_image_body_excludes_image_from_query() {
        let request = Operation::SearchByImage
            .prepare(
                &SearchByImageParams::new("aGVsbG8=")
                    .limit(20)
                    .sort("price")
                    .into_params(),
            )
            .unwrap();

        assert_eq!(request.method, Method::POST);
        assert_eq!(request.body, Some(json!({"image": "aGVsbG8="})));
        assert!(request.query.iter().all(|(name, _)| name != "image"));
        assert_eq!(
            request.query,
            vec![
                ("limit".to_string(), "20".to_string()),
                ("offset".to_string(), "0".to_string()),
                ("sort".to_string(), "price".to_string()),
            ]
        );
    }

    #[test]
    fn test_search_defaults_fill_unset_fields() {
        let request = Operation::Search
            .prepare(&SearchParams::keywords("x").into_params())
            .unwrap();
        assert_eq!(
            request.query,
            vec![
                ("fieldgroups".to_string(), "MATCHING_ITEMS".to_string()),
                ("limit".to_string(), "200".to_string()),
                ("offset".to_string(), "0".to_string()),
                ("q".to_string(), "x".to_string()),
            ]
        );

        let request = Operation::SearchByImage
            .prepare(&params(json!({"image": "aGVsbG8=", "limit": null})))
            .unwrap();
        assert_eq!(
            request.query,
            vec![
                ("limit".to_string(), "200".to_string()),
                ("offset".to_string(), "0".to_string()),
            ]
        );
    }

    #[test]
    fn test_lookups_have_no_defaults() {
        let request = Operation::GetItem
            .prepare(&GetItemParams::new("v1|1|0").into_params())
            .unwrap();
        assert!(request.query.is_empty());
    }

    #[test]
    fn test_get_item_path_is_encoded() {
        let request = Operation::GetItem
            .prepare(&GetItemParams::new("v1|110552191234|0").fieldgroups("PRODUCT").into_params())
            .unwrap();

        assert_eq!(request.path, "/item/v1%7C110552191234%7C0");
        assert_eq!(
            request.query,
            vec![("fieldgroups".to_string(), "PRODUCT".to_string())]
        );
    }

    #[test]
    fn test_check_compatibility_shape() {
        let request = Operation::CheckCompatibility
            .prepare(
                &CompatibilityParams::new("v1|2200077988|0")
                    .property("Make", "Toyota")
                    .property("Year", "2016")
                    .into_params(),
            )
            .unwrap();

        assert_eq!(request.method, Method::POST);
        assert_eq!(request.path, "/item/v1%7C2200077988%7C0/check_compatibility");
        assert!(request.query.is_empty());
        assert_eq!(
            request.body,
            Some(json!({"compatibilityProperties": [
                {"name": "Make", "value": "Toyota"},
                {"name": "Year", "value": "2016"}
            ]}))
        );
    }

    #[test]
    fn test_missing_required_field() {
        for (op, value) in [
            (Operation::SearchByImage, json!({"limit": 10})),
            (Operation::GetItem, json!({"fieldgroups": "PRODUCT"})),
            (Operation::GetItemByLegacyId, json!({})),
            (Operation::GetItemsByItemGroup, json!({"item_group_id": null})),
            (Operation::CheckCompatibility, json!({"item_id": "v1|1|0"})),
        ] {
            let err = op.prepare(&params(value)).unwrap_err();
            assert!(matches!(err, Error::Param(_)), "{op}: {err:?}");
        }
    }

    #[test]
    fn test_unknown_field_rejected() {
        let err = Operation::GetItem
            .prepare(&params(json!({"item_id": "v1|1|0", "q": "lens"})))
            .unwrap_err();
        assert!(matches!(err, Error::Param(ref msg) if msg.contains("q")));
    }

    #[test]
    fn test_malformed_compatibility_properties() {
        let err = Operation::CheckCompatibility
            .prepare(&params(json!({
                "item_id": "v1|1|0",
                "compatibility_properties": [{"name": "Make"}]
            })))
            .unwrap_err();
        assert!(matches!(err, Error::Param(_)));
    }

    #[test]
    fn test_search_without_fields_is_valid() {
        let request = Operation::Search.prepare(&SearchParams::default().into_params());
        assert!(request.is_ok());
    }
}
