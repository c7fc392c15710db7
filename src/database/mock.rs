//! In-memory fallback store for development without a running MongoDB.
//!
//! Imitates the minimal collection surface the services rely on:
//! `find_one`, `find`, `count_documents`, `insert_one`, `update_one` with
//! `$set`/`$push`/`$pull`, `delete_one` and `delete_many`. Rows are plain
//! BSON documents keyed by opaque `mock-*` string ids, stored under both
//! `_id` and a duplicate `id` field the way older mock rows were.

use mongodb::bson::{Bson, Document};
use std::collections::HashMap;
use std::sync::Mutex;
use uuid::Uuid;

use super::UpdateOutcome;
use crate::seeds;
use crate::utils::ident::bson_id_string;

pub struct MockStore {
    collections: Mutex<HashMap<String, Vec<Document>>>,
}

impl MockStore {
    pub fn new() -> Self {
        Self {
            collections: Mutex::new(seed_collections()),
        }
    }

    /// Restore the seed state (dev reset endpoint).
    pub fn reset(&self) {
        let mut collections = self.collections.lock().unwrap();
        *collections = seed_collections();
    }

    pub fn find_one(&self, collection: &str, filter: &Document) -> Option<Document> {
        let collections = self.collections.lock().unwrap();
        collections
            .get(collection)?
            .iter()
            .find(|row| matches_filter(row, filter))
            .cloned()
    }

    pub fn find(&self, collection: &str, filter: &Document) -> Vec<Document> {
        let collections = self.collections.lock().unwrap();
        collections
            .get(collection)
            .map(|rows| {
                rows.iter()
                    .filter(|row| matches_filter(row, filter))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn count_documents(&self, collection: &str, filter: &Document) -> u64 {
        let collections = self.collections.lock().unwrap();
        collections
            .get(collection)
            .map(|rows| rows.iter().filter(|row| matches_filter(row, filter)).count() as u64)
            .unwrap_or(0)
    }

    /// Inserts the document and returns the assigned id. The id lands in
    /// both `_id` and `id`, matching the legacy mock row shape.
    pub fn insert_one(&self, collection: &str, mut doc: Document) -> String {
        let id = format!("mock-{}", Uuid::new_v4());
        doc.insert("_id", id.clone());
        doc.insert("id", id.clone());

        let mut collections = self.collections.lock().unwrap();
        collections.entry(collection.to_string()).or_default().push(doc);
        id
    }

    pub fn update_one(
        &self,
        collection: &str,
        filter: &Document,
        update: &Document,
    ) -> UpdateOutcome {
        let mut collections = self.collections.lock().unwrap();
        let rows = match collections.get_mut(collection) {
            Some(rows) => rows,
            None => return UpdateOutcome::default(),
        };

        let index = match rows.iter().position(|row| matches_filter(row, filter)) {
            Some(index) => index,
            None => return UpdateOutcome::default(),
        };

        apply_update(&mut rows[index], update);
        log::debug!("Mock DB: updated {}[{}]", collection, index);

        UpdateOutcome {
            matched_count: 1,
            modified_count: 1,
        }
    }

    pub fn delete_one(&self, collection: &str, filter: &Document) -> u64 {
        let mut collections = self.collections.lock().unwrap();
        let rows = match collections.get_mut(collection) {
            Some(rows) => rows,
            None => return 0,
        };

        match rows.iter().position(|row| matches_filter(row, filter)) {
            Some(index) => {
                rows.remove(index);
                1
            }
            None => 0,
        }
    }

    pub fn delete_many(&self, collection: &str, filter: &Document) -> u64 {
        let mut collections = self.collections.lock().unwrap();
        let rows = match collections.get_mut(collection) {
            Some(rows) => rows,
            None => return 0,
        };

        let before = rows.len();
        rows.retain(|row| !matches_filter(row, filter));
        (before - rows.len()) as u64
    }
}

impl Default for MockStore {
    fn default() -> Self {
        Self::new()
    }
}

fn seed_collections() -> HashMap<String, Vec<Document>> {
    let mut collections = HashMap::new();
    collections.insert("clubs".to_string(), vec![seeds::stock_club_with_mock_id()]);
    collections.insert("users".to_string(), Vec::new());
    collections.insert("budget_requests".to_string(), Vec::new());
    collections.insert("reports".to_string(), Vec::new());
    collections
}

/// Filter matcher. An empty filter matches everything. `_id` matches the
/// row's `_id` or its duplicate `id` field, compared canonically so a hex
/// string matches an ObjectId. `email` compares case-insensitively. Other
/// keys use plain BSON equality.
fn matches_filter(row: &Document, filter: &Document) -> bool {
    filter.iter().all(|(key, value)| match key.as_str() {
        "$or" => match value {
            Bson::Array(branches) => branches.iter().any(|branch| {
                branch
                    .as_document()
                    .map(|sub| matches_filter(row, sub))
                    .unwrap_or(false)
            }),
            _ => false,
        },
        "_id" => {
            let wanted = bson_id_string(value);
            row.get("_id").map(bson_id_string) == Some(wanted.clone())
                || row.get("id").map(bson_id_string) == Some(wanted)
        }
        "email" => match (row.get_str("email"), value.as_str()) {
            (Ok(have), Some(want)) => have.eq_ignore_ascii_case(want),
            _ => false,
        },
        _ => row.get(key) == Some(value),
    })
}

fn apply_update(row: &mut Document, update: &Document) {
    if let Ok(set) = update.get_document("$set") {
        for (key, value) in set {
            row.insert(key.clone(), value.clone());
        }
    }

    if let Ok(push) = update.get_document("$push") {
        for (key, value) in push {
            match row.get_mut(key) {
                Some(Bson::Array(items)) => items.push(value.clone()),
                _ => {
                    row.insert(key.clone(), Bson::Array(vec![value.clone()]));
                }
            }
        }
    }

    if let Ok(pull) = update.get_document("$pull") {
        for (key, criteria) in pull {
            if let Some(Bson::Array(items)) = row.get_mut(key) {
                items.retain(|item| !matches_pull(item, criteria));
            }
        }
    }
}

/// `$pull` element match: a document criterion matches elements whose
/// listed fields are all equal; anything else is whole-value equality.
fn matches_pull(item: &Bson, criteria: &Bson) -> bool {
    match (item, criteria) {
        (Bson::Document(item), Bson::Document(criteria)) => criteria
            .iter()
            .all(|(key, value)| item.get(key) == Some(value)),
        (item, criteria) => item == criteria,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mongodb::bson::{doc, oid::ObjectId};

    #[test]
    fn seed_contains_the_pending_arts_club() {
        let store = MockStore::new();
        let club = store
            .find_one("clubs", &doc! { "_id": "pending-1" })
            .expect("seed club");
        assert_eq!(club.get_str("name").unwrap(), "Arts Club");
        assert_eq!(club.get_bool("approved").unwrap(), false);
    }

    #[test]
    fn find_one_matches_id_email_and_duplicate_id_field() {
        let store = MockStore::new();

        assert!(store.find_one("clubs", &doc! { "id": "pending-1" }).is_some());
        assert!(store
            .find_one("clubs", &doc! { "email": "ARTS@mitwpu.edu.in" })
            .is_some());
        assert!(store.find_one("clubs", &doc! { "_id": "nope" }).is_none());
    }

    #[test]
    fn object_id_filters_compare_canonically() {
        let store = MockStore::new();
        let oid = ObjectId::new();
        let mut collections = store.collections.lock().unwrap();
        collections
            .get_mut("clubs")
            .unwrap()
            .push(doc! { "_id": oid, "name": "Robotics" });
        drop(collections);

        // A hex string filter should find the ObjectId row and vice versa
        let by_hex = store.find_one("clubs", &doc! { "_id": oid.to_hex() });
        assert!(by_hex.is_some());
        let by_oid = store.find_one("clubs", &doc! { "_id": oid });
        assert_eq!(by_oid.unwrap().get_str("name").unwrap(), "Robotics");
    }

    #[test]
    fn insert_assigns_mock_id_in_both_fields() {
        let store = MockStore::new();
        let id = store.insert_one("reports", doc! { "title": "annual" });
        assert!(id.starts_with("mock-"));

        let row = store.find_one("reports", &doc! { "_id": &id }).unwrap();
        assert_eq!(row.get_str("id").unwrap(), id);
    }

    #[test]
    fn find_and_count_filter_by_plain_equality() {
        let store = MockStore::new();
        store.insert_one("budget_requests", doc! { "status": "pending" });
        store.insert_one("budget_requests", doc! { "status": "approved" });
        store.insert_one("budget_requests", doc! { "status": "pending" });

        assert_eq!(
            store.find("budget_requests", &doc! { "status": "pending" }).len(),
            2
        );
        assert_eq!(store.count_documents("budget_requests", &doc! {}), 3);
        assert_eq!(
            store.count_documents("budget_requests", &doc! { "status": "approved" }),
            1
        );
    }

    #[test]
    fn or_filters_match_any_branch() {
        let store = MockStore::new();
        store.insert_one("reports", doc! { "club_id": "a" });
        store.insert_one("reports", doc! { "club_id": "b" });
        store.insert_one("reports", doc! { "club_id": "c" });

        let filter = doc! { "$or": [ { "club_id": "a" }, { "club_id": "c" } ] };
        assert_eq!(store.find("reports", &filter).len(), 2);
    }

    #[test]
    fn update_applies_set_push_and_pull() {
        let store = MockStore::new();

        let outcome = store.update_one(
            "clubs",
            &doc! { "_id": "pending-1" },
            &doc! { "$set": { "approved": true, "color": "#e57373" } },
        );
        assert_eq!(outcome.matched_count, 1);

        store.update_one(
            "clubs",
            &doc! { "_id": "pending-1" },
            &doc! { "$push": { "members": { "name": "Asha", "designation": "Lead" } } },
        );
        store.update_one(
            "clubs",
            &doc! { "_id": "pending-1" },
            &doc! { "$push": { "members": { "name": "Ravi", "designation": "Member" } } },
        );

        let club = store.find_one("clubs", &doc! { "_id": "pending-1" }).unwrap();
        assert_eq!(club.get_bool("approved").unwrap(), true);
        assert_eq!(club.get_array("members").unwrap().len(), 2);

        store.update_one(
            "clubs",
            &doc! { "_id": "pending-1" },
            &doc! { "$pull": { "members": { "name": "Asha", "designation": "Lead" } } },
        );
        let club = store.find_one("clubs", &doc! { "_id": "pending-1" }).unwrap();
        let members = club.get_array("members").unwrap();
        assert_eq!(members.len(), 1);
        assert_eq!(
            members[0].as_document().unwrap().get_str("name").unwrap(),
            "Ravi"
        );
    }

    #[test]
    fn update_against_missing_row_reports_no_match() {
        let store = MockStore::new();
        let outcome = store.update_one(
            "clubs",
            &doc! { "_id": "missing" },
            &doc! { "$set": { "approved": true } },
        );
        assert_eq!(outcome.matched_count, 0);
        assert_eq!(outcome.modified_count, 0);
    }

    #[test]
    fn delete_one_and_many() {
        let store = MockStore::new();
        store.insert_one("users", doc! { "email": "a@mitwpu.edu.in", "role": "club" });
        store.insert_one("users", doc! { "email": "b@mitwpu.edu.in", "role": "club" });

        assert_eq!(
            store.delete_one("users", &doc! { "email": "a@mitwpu.edu.in" }),
            1
        );
        assert_eq!(
            store.delete_one("users", &doc! { "email": "a@mitwpu.edu.in" }),
            0
        );
        assert_eq!(store.delete_many("users", &doc! {}), 1);
    }

    #[test]
    fn reset_restores_seed_state() {
        let store = MockStore::new();
        store.insert_one("users", doc! { "email": "x@mitwpu.edu.in" });
        store.delete_one("clubs", &doc! { "_id": "pending-1" });

        store.reset();

        assert_eq!(store.count_documents("users", &doc! {}), 0);
        assert!(store.find_one("clubs", &doc! { "_id": "pending-1" }).is_some());
    }
}
