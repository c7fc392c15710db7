//! Identifier reconciliation helpers.
//!
//! The same logical club or request can be keyed three different ways
//! depending on where it was created: a native ObjectId (real MongoDB),
//! an opaque string `_id` (mock store), or a duplicate `id` field kept by
//! legacy mock documents. Clubs can additionally be located by their
//! contact email. Callers build an ordered list of candidate filters and
//! try them until one matches.

use mongodb::bson::{doc, oid::ObjectId, Bson, Document};

/// Ordered filters to try when a caller hands us an opaque identifier.
pub fn id_filter_candidates(raw: &str) -> Vec<Document> {
    let mut filters = Vec::new();
    if let Ok(oid) = ObjectId::parse_str(raw) {
        filters.push(doc! { "_id": oid });
    }
    filters.push(doc! { "_id": raw });
    filters.push(doc! { "id": raw });
    filters
}

/// Candidate filters for a club: id candidates first, then email fallback.
pub fn club_filter_candidates(club_id: Option<&str>, email: Option<&str>) -> Vec<Document> {
    let mut filters = Vec::new();
    if let Some(id) = club_id {
        filters.extend(id_filter_candidates(id));
    }
    if let Some(email) = email {
        filters.push(doc! { "email": email.to_lowercase() });
    }
    filters
}

/// Canonical string form of a BSON identifier value.
pub fn bson_id_string(value: &Bson) -> String {
    match value {
        Bson::ObjectId(oid) => oid.to_hex(),
        Bson::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Canonical string form of a document's `_id`.
pub fn doc_id_string(doc: &Document) -> String {
    doc.get("_id").map(bson_id_string).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn object_id_strings_produce_three_candidates() {
        let oid = ObjectId::new();
        let hex = oid.to_hex();
        let filters = id_filter_candidates(&hex);
        assert_eq!(filters.len(), 3);
        assert_eq!(filters[0], doc! { "_id": oid });
        assert_eq!(filters[1], doc! { "_id": &hex });
        assert_eq!(filters[2], doc! { "id": &hex });
    }

    #[test]
    fn opaque_strings_skip_the_object_id_filter() {
        let filters = id_filter_candidates("mock-abc");
        assert_eq!(filters.len(), 2);
        assert_eq!(filters[0], doc! { "_id": "mock-abc" });
        assert_eq!(filters[1], doc! { "id": "mock-abc" });
    }

    #[test]
    fn club_candidates_append_lowercased_email() {
        let filters = club_filter_candidates(Some("pending-1"), Some("Arts@MITWPU.edu.in"));
        assert_eq!(filters.len(), 3);
        assert_eq!(filters[2], doc! { "email": "arts@mitwpu.edu.in" });
    }

    #[test]
    fn doc_id_string_handles_both_id_shapes() {
        let oid = ObjectId::new();
        assert_eq!(doc_id_string(&doc! { "_id": oid }), oid.to_hex());
        assert_eq!(doc_id_string(&doc! { "_id": "pending-1" }), "pending-1");
        assert_eq!(doc_id_string(&doc! {}), "");
    }
}
