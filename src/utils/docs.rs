//! Small accessors for loosely-typed BSON documents. The clubs collection
//! mixes rows written by this service with rows written by the mock seed
//! and older deployments, so field presence and value shapes vary.

use mongodb::bson::{Bson, Document};

pub fn str_field(doc: &Document, key: &str) -> String {
    doc.get_str(key).unwrap_or_default().to_string()
}

pub fn opt_str_field(doc: &Document, key: &str) -> Option<String> {
    match doc.get(key) {
        Some(Bson::String(s)) => Some(s.clone()),
        _ => None,
    }
}

pub fn bool_field(doc: &Document, key: &str) -> bool {
    doc.get_bool(key).unwrap_or(false)
}

pub fn string_array_field(doc: &Document, key: &str) -> Vec<String> {
    match doc.get(key) {
        Some(Bson::Array(items)) => items
            .iter()
            .filter_map(|item| item.as_str().map(str::to_string))
            .collect(),
        _ => Vec::new(),
    }
}

pub fn doc_array_field(doc: &Document, key: &str) -> Vec<Document> {
    match doc.get(key) {
        Some(Bson::Array(items)) => items
            .iter()
            .filter_map(|item| item.as_document().cloned())
            .collect(),
        _ => Vec::new(),
    }
}

/// Timestamps are stored as BSON datetimes by this service but older rows
/// carry ISO strings. Either way the API serves RFC 3339 strings.
pub fn iso_field(doc: &Document, key: &str) -> Option<String> {
    match doc.get(key) {
        Some(Bson::DateTime(dt)) => dt.try_to_rfc3339_string().ok(),
        Some(Bson::String(s)) => Some(s.clone()),
        _ => None,
    }
}

pub fn iso_from_bson(value: Option<&Bson>) -> Option<String> {
    match value {
        Some(Bson::DateTime(dt)) => dt.try_to_rfc3339_string().ok(),
        Some(Bson::String(s)) => Some(s.clone()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mongodb::bson::{doc, DateTime};

    #[test]
    fn iso_field_accepts_datetimes_and_strings() {
        let d = doc! { "dt": DateTime::now(), "s": "2025-01-01T00:00:00Z" };
        assert!(iso_field(&d, "dt").is_some());
        assert_eq!(iso_field(&d, "s").as_deref(), Some("2025-01-01T00:00:00Z"));
        assert_eq!(iso_field(&d, "missing"), None);
    }

    #[test]
    fn string_arrays_skip_non_string_entries() {
        let d = doc! { "links": ["a", 1, "b"] };
        assert_eq!(string_array_field(&d, "links"), vec!["a", "b"]);
    }
}
