//! `self` and `next` links for list responses.
//!
//! Query keys are written in a fixed order so links are stable. `filter` and `tags` are
//! URI-component-encoded JSON that is then encoded again as a query value; the list
//! endpoint decodes them twice, so following a link reproduces the same query.

use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use serde::Serialize;
use utoipa::ToSchema;

use crate::models::{ListQuery, PageInfo};

/// Characters left alone by JavaScript's `encodeURIComponent`.
const URI_COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct PageLinks {
    #[serde(rename = "self")]
    pub self_link: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next: Option<String>,
}

fn encode(value: &str) -> String {
    utf8_percent_encode(value, URI_COMPONENT).to_string()
}

/// Ordered query pairs describing `query` starting at `offset`. Absent fields are skipped.
fn query_pairs(query: &ListQuery, offset: u64) -> Vec<(&'static str, String)> {
    let mut pairs = vec![
        ("order", query.order.as_str().to_string()),
        ("limit", query.limit.to_string()),
        ("offset", offset.to_string()),
    ];

    if let Some(sort_by) = &query.sort_by {
        pairs.push(("sortBy", encode(sort_by)));
    }

    // Map serializes infallibly; the fallback keeps links well-formed regardless.
    let filter = serde_json::to_string(&query.filter).unwrap_or_else(|_| "{}".to_string());
    pairs.push(("filter", encode(&filter)));

    if let Some(public) = query.public {
        pairs.push(("pub", if public { "1" } else { "0" }.to_string()));
    }
    if let Some(owner) = &query.owner {
        pairs.push(("owner", owner.clone()));
    }
    if let Some(tags) = &query.tags {
        let tags = serde_json::to_string(tags).unwrap_or_else(|_| "[]".to_string());
        pairs.push(("tags", encode(&tags)));
    }

    pairs
}

fn to_url(base_url: &str, pairs: &[(&'static str, String)]) -> String {
    let qs = pairs
        .iter()
        .map(|(key, value)| format!("{}={}", key, encode(value)))
        .collect::<Vec<_>>()
        .join("&");
    format!("{}?{}", base_url, qs)
}

/// Build pagination links. `next` is present only while `page < pages` and the backend
/// supplied a cursor; it differs from `self` only in its offset, which is that cursor.
pub fn build_links(base_url: &str, query: &ListQuery, page: &PageInfo) -> PageLinks {
    let self_link = to_url(base_url, &query_pairs(query, query.offset.unwrap_or(0)));
    let next = page
        .cursor
        .filter(|_| page.has_next())
        .map(|cursor| to_url(base_url, &query_pairs(query, cursor)));

    PageLinks { self_link, next }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::SortOrder;
    use crate::query::{normalize, RawListParams};
    use percent_encoding::percent_decode_str;
    use serde_json::{json, Map, Value};

    const BASE: &str = "https://api.example.com/api/files";

    fn query() -> ListQuery {
        let mut filter = Map::new();
        filter.insert("name".to_string(), json!("old chair & co"));
        ListQuery {
            order: SortOrder::Asc,
            offset: Some(20),
            limit: 5,
            filter,
            sort_by: Some("uploadedAt".to_string()),
            owner: Some("bob".to_string()),
            public: Some(true),
            tags: Some(vec!["wood".to_string()]),
        }
    }

    /// Parse a link the way the HTTP layer would: split pairs and decode each value once.
    fn parse_link(link: &str) -> RawListParams {
        let (_, qs) = link.split_once('?').unwrap();
        let mut raw = RawListParams::default();
        for pair in qs.split('&') {
            let (key, value) = pair.split_once('=').unwrap();
            let value = percent_decode_str(value).decode_utf8().unwrap().into_owned();
            match key {
                "order" => raw.order = Some(value),
                "limit" => raw.limit = Some(value),
                "offset" => raw.offset = Some(value),
                "sortBy" => raw.sort_by = Some(value),
                "filter" => raw.filter = Some(value),
                "pub" => raw.public = Some(value),
                "owner" => raw.owner = Some(value),
                "tags" => raw.tags = Some(value),
                other => panic!("unexpected key {}", other),
            }
        }
        raw
    }

    #[test]
    fn keys_are_in_fixed_order() {
        let links = build_links(BASE, &query(), &PageInfo { page: 1, pages: 1, cursor: Some(0) });
        let (_, qs) = links.self_link.split_once('?').unwrap();
        let keys: Vec<&str> = qs.split('&').map(|p| p.split('=').next().unwrap()).collect();
        assert_eq!(
            keys,
            vec!["order", "limit", "offset", "sortBy", "filter", "pub", "owner", "tags"]
        );
        assert!(links.self_link.starts_with(BASE));
    }

    #[test]
    fn no_next_on_last_page() {
        let links = build_links(BASE, &query(), &PageInfo { page: 3, pages: 3, cursor: Some(30) });
        assert!(links.next.is_none());
    }

    #[test]
    fn next_differs_only_by_offset() {
        let links = build_links(BASE, &query(), &PageInfo { page: 1, pages: 3, cursor: Some(25) });
        let next = links.next.unwrap();
        assert!(next.contains("offset=25"));
        assert!(links.self_link.contains("offset=20"));
        assert_eq!(
            next.replace("offset=25", "offset=20"),
            links.self_link
        );
    }

    #[test]
    fn no_next_without_cursor() {
        let links = build_links(BASE, &query(), &PageInfo { page: 1, pages: 3, cursor: None });
        assert!(links.next.is_none());
    }

    #[test]
    fn self_link_round_trips_through_normalizer() {
        let original = query();
        let links = build_links(BASE, &original, &PageInfo { page: 1, pages: 1, cursor: Some(0) });
        let reparsed = normalize(&parse_link(&links.self_link)).unwrap();

        assert_eq!(reparsed.order, original.order);
        assert_eq!(reparsed.limit, original.limit);
        assert_eq!(reparsed.offset, original.offset);
        assert_eq!(reparsed.filter, original.filter);
        assert_eq!(reparsed.sort_by, original.sort_by);
        assert_eq!(reparsed.tags, original.tags);
        assert_eq!(reparsed.requested_owner, original.owner);
        assert_eq!(reparsed.requested_public, original.public);
    }

    #[test]
    fn absent_fields_are_skipped_and_offset_defaults_to_zero() {
        let links = build_links(BASE, &ListQuery::default(), &PageInfo { page: 1, pages: 1, cursor: Some(0) });
        assert_eq!(
            links.self_link,
            format!("{}?order=DESC&limit=10&offset=0&filter=%257B%257D", BASE)
        );
        let raw = parse_link(&links.self_link);
        let filter = normalize(&raw).unwrap().filter;
        assert_eq!(Value::Object(filter), json!({}));
    }
}
