//! List query normalization.
//!
//! Raw query-string values are validated and coerced into typed fields. `filter`, `tags`
//! and `sortBy` arrive percent-encoded a second time (the pagination links encode them as
//! URI components before building the query string), so they are decoded once more here.
//!
//! Lenient fields (`offset`, `limit`) silently fall back to defaults; strict fields
//! (`order`, `filter`, `tags`, `pub`) reject malformed input with a validation error naming
//! the parameter.

use percent_encoding::percent_decode_str;
use serde::Deserialize;
use serde_json::{Map, Value};
use utoipa::IntoParams;

use crate::error::AppError;
use crate::models::{SortOrder, DEFAULT_LIMIT, MAX_LIMIT};

/// Query-string parameters of the list endpoint, before normalization.
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct RawListParams {
    /// Number of records to skip
    pub offset: Option<String>,
    /// Page size (1-100, default 10)
    pub limit: Option<String>,
    /// ASC or DESC (default DESC)
    pub order: Option<String>,
    /// Field to sort by
    pub sort_by: Option<String>,
    /// URI-encoded JSON object of filter conditions
    pub filter: Option<String>,
    /// URI-encoded JSON array of tags
    pub tags: Option<String>,
    /// Owner alias or username to scope the listing to
    pub owner: Option<String>,
    /// Public-only flag: 1 or 0
    #[serde(rename = "pub")]
    pub public: Option<String>,
}

/// Normalized list parameters before the visibility scope is applied.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedListParams {
    pub order: SortOrder,
    pub offset: Option<u64>,
    pub limit: u32,
    pub filter: Map<String, Value>,
    pub sort_by: Option<String>,
    pub tags: Option<Vec<String>>,
    pub requested_owner: Option<String>,
    pub requested_public: Option<bool>,
}

/// Normalize raw list parameters. Pure; the only failure is a validation error.
pub fn normalize(raw: &RawListParams) -> Result<NormalizedListParams, AppError> {
    Ok(NormalizedListParams {
        order: parse_order(raw.order.as_deref())?,
        offset: parse_offset(raw.offset.as_deref()),
        limit: parse_limit(raw.limit.as_deref()),
        filter: parse_filter(raw.filter.as_deref())?,
        sort_by: parse_sort_by(raw.sort_by.as_deref())?,
        tags: parse_tags(raw.tags.as_deref())?,
        requested_owner: non_empty(raw.owner.as_deref()),
        requested_public: parse_public_flag(raw.public.as_deref())?,
    })
}

fn non_empty(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

/// Zero, negative and non-numeric offsets all mean "from the start".
pub fn parse_offset(value: Option<&str>) -> Option<u64> {
    value
        .and_then(|v| v.trim().parse::<u64>().ok())
        .filter(|&v| v > 0)
}

pub fn parse_limit(value: Option<&str>) -> u32 {
    value
        .and_then(|v| v.trim().parse::<i64>().ok())
        .filter(|v| (1..=MAX_LIMIT as i64).contains(v))
        .map(|v| v as u32)
        .unwrap_or(DEFAULT_LIMIT)
}

pub fn parse_order(value: Option<&str>) -> Result<SortOrder, AppError> {
    let Some(value) = value.map(str::trim).filter(|v| !v.is_empty()) else {
        return Ok(SortOrder::Desc);
    };

    match value.to_ascii_uppercase().as_str() {
        "ASC" => Ok(SortOrder::Asc),
        "DESC" => Ok(SortOrder::Desc),
        _ => Err(AppError::validation("order", "must be ASC or DESC")),
    }
}

fn decode_component(param: &str, raw: &str) -> Result<String, AppError> {
    percent_decode_str(raw)
        .decode_utf8()
        .map(|s| s.into_owned())
        .map_err(|_| AppError::validation(param, "is not valid UTF-8 once decoded"))
}

pub fn parse_sort_by(value: Option<&str>) -> Result<Option<String>, AppError> {
    match value.filter(|v| !v.is_empty()) {
        None => Ok(None),
        Some(raw) => Ok(non_empty(Some(&decode_component("sortBy", raw)?))),
    }
}

pub fn parse_filter(value: Option<&str>) -> Result<Map<String, Value>, AppError> {
    let Some(raw) = value.filter(|v| !v.is_empty()) else {
        return Ok(Map::new());
    };

    let decoded = decode_component("filter", raw)?;
    match serde_json::from_str::<Value>(&decoded) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(_) => Err(AppError::validation("filter", "must be a JSON object")),
        Err(e) => Err(AppError::validation("filter", format!("is not valid JSON: {}", e))),
    }
}

/// An empty tag array is treated the same as no tags at all.
pub fn parse_tags(value: Option<&str>) -> Result<Option<Vec<String>>, AppError> {
    let Some(raw) = value.filter(|v| !v.is_empty()) else {
        return Ok(None);
    };

    let decoded = decode_component("tags", raw)?;
    let tags: Vec<String> = serde_json::from_str(&decoded)
        .map_err(|_| AppError::validation("tags", "must be a JSON array of strings"))?;

    Ok(Some(tags).filter(|t| !t.is_empty()))
}

/// `pub` accepts integers (0 is false) and the literals `true`/`false`.
pub fn parse_public_flag(value: Option<&str>) -> Result<Option<bool>, AppError> {
    let Some(value) = value.map(str::trim).filter(|v| !v.is_empty()) else {
        return Ok(None);
    };

    match value {
        "true" => Ok(Some(true)),
        "false" => Ok(Some(false)),
        other => other
            .parse::<i64>()
            .map(|n| Some(n != 0))
            .map_err(|_| AppError::validation("pub", "must be 1 or 0")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn raw() -> RawListParams {
        RawListParams::default()
    }

    #[test]
    fn empty_query_uses_defaults() {
        let params = normalize(&raw()).unwrap();
        assert_eq!(params.order, SortOrder::Desc);
        assert_eq!(params.offset, None);
        assert_eq!(params.limit, 10);
        assert!(params.filter.is_empty());
        assert_eq!(params.sort_by, None);
        assert_eq!(params.tags, None);
        assert_eq!(params.requested_public, None);
    }

    #[test]
    fn limit_out_of_range_falls_back_to_default() {
        assert_eq!(parse_limit(Some("0")), 10);
        assert_eq!(parse_limit(Some("101")), 10);
        assert_eq!(parse_limit(Some("-5")), 10);
        assert_eq!(parse_limit(Some("abc")), 10);
        assert_eq!(parse_limit(Some("100")), 100);
        assert_eq!(parse_limit(Some("1")), 1);
    }

    #[test]
    fn zero_or_invalid_offset_is_absent() {
        assert_eq!(parse_offset(Some("0")), None);
        assert_eq!(parse_offset(Some("-3")), None);
        assert_eq!(parse_offset(Some("x")), None);
        assert_eq!(parse_offset(Some("20")), Some(20));
    }

    #[test]
    fn order_is_case_insensitive_and_strict() {
        assert_eq!(parse_order(Some("asc")).unwrap(), SortOrder::Asc);
        assert_eq!(parse_order(Some("Desc")).unwrap(), SortOrder::Desc);
        let err = parse_order(Some("sideways")).unwrap_err();
        assert!(matches!(err, AppError::Validation { ref param, .. } if param == "order"));
    }

    #[test]
    fn filter_is_decoded_twice() {
        // what axum hands over after its own decoding pass
        let once_decoded = "%7B%22name%22%3A%22chair%22%7D";
        let filter = parse_filter(Some(once_decoded)).unwrap();
        assert_eq!(Value::Object(filter), json!({"name": "chair"}));

        let plain = parse_filter(Some(r#"{"status":"processed"}"#)).unwrap();
        assert_eq!(Value::Object(plain), json!({"status": "processed"}));
    }

    #[test]
    fn malformed_filter_names_the_parameter() {
        for bad in ["%7Bnope", "[1,2]", "42"] {
            let err = parse_filter(Some(bad)).unwrap_err();
            assert!(matches!(err, AppError::Validation { ref param, .. } if param == "filter"));
        }
    }

    #[test]
    fn tags_must_be_string_array() {
        assert_eq!(
            parse_tags(Some("%5B%22wood%22%5D")).unwrap(),
            Some(vec!["wood".to_string()])
        );
        assert_eq!(parse_tags(Some("[]")).unwrap(), None);
        let err = parse_tags(Some("[1]")).unwrap_err();
        assert!(matches!(err, AppError::Validation { ref param, .. } if param == "tags"));
    }

    #[test]
    fn public_flag_parsing() {
        assert_eq!(parse_public_flag(None).unwrap(), None);
        assert_eq!(parse_public_flag(Some("1")).unwrap(), Some(true));
        assert_eq!(parse_public_flag(Some("0")).unwrap(), Some(false));
        assert_eq!(parse_public_flag(Some("true")).unwrap(), Some(true));
        assert!(parse_public_flag(Some("yes")).is_err());
    }

    #[test]
    fn owner_is_trimmed() {
        let params = normalize(&RawListParams {
            owner: Some("  ".to_string()),
            ..raw()
        })
        .unwrap();
        assert_eq!(params.requested_owner, None);
    }
}
