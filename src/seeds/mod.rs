use mongodb::bson::{doc, Bson, DateTime, Document};

/// The stock pending club present in a freshly seeded database.
/// Mongo assigns its own `_id` on insert; the mock store keys it with the
/// well-known "pending-1" string so fallback logins stay predictable.
pub fn stock_club() -> Document {
    doc! {
        "name": "Arts Club",
        "head": "Jane Smith",
        "description": "Creative arts and culture",
        "email": "arts@mitwpu.edu.in",
        "approved": false,
        "color": Bson::Null,
        "contact_links": Bson::Array(vec![]),
        "members": Bson::Array(vec![]),
        "events": Bson::Array(vec![]),
        "createdAt": DateTime::now(),
        "approvedAt": Bson::Null,
    }
}

pub fn stock_club_with_mock_id() -> Document {
    let mut club = stock_club();
    club.insert("_id", "pending-1");
    club.insert("id", "pending-1");
    club
}
