use crate::database::DataStore;
use crate::models::club::EVENT_STATUS_PENDING;
use crate::services::auth_service::Claims;
use crate::utils::ident::{club_filter_candidates, doc_id_string};
use crate::utils::AppError;
use mongodb::bson::{doc, Bson, DateTime as BsonDateTime, Document};
use serde::Deserialize;

#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct MemberRequest {
    pub name: String,
    pub designation: String,
}

#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct AddEventRequest {
    pub title: String,
    pub date: String,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct EditEventRequest {
    #[serde(rename = "originalTitle")]
    pub original_title: String,
    #[serde(rename = "originalDate")]
    pub original_date: String,
    pub title: String,
    pub date: String,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct DeleteEventRequest {
    pub title: String,
    pub date: String,
}

/// Candidate filters for the club referenced by a token: id first
/// (ObjectId, string `_id`, duplicate `id` field), then contact email.
pub fn claims_club_filters(claims: &Claims) -> Vec<Document> {
    club_filter_candidates(claims.club_id.as_deref(), Some(&claims.email))
}

/// Resolve the caller's club document.
pub async fn find_club(store: &DataStore, claims: &Claims) -> Result<Document, AppError> {
    store
        .find_one_any("clubs", &claims_club_filters(claims))
        .await?
        .ok_or_else(|| AppError::NotFound("Club not found".to_string()))
}

/// Canonical string id of the caller's club, falling back to the raw
/// token id when the club row cannot be resolved.
pub async fn canonical_club_id(store: &DataStore, claims: &Claims) -> Result<String, AppError> {
    let resolved = store
        .find_one_any("clubs", &claims_club_filters(claims))
        .await?;
    Ok(match resolved {
        Some(club) => doc_id_string(&club),
        None => claims.club_id.clone().unwrap_or_default(),
    })
}

pub async fn add_member(
    store: &DataStore,
    claims: &Claims,
    request: &MemberRequest,
) -> Result<(), AppError> {
    if request.name.trim().is_empty() || request.designation.trim().is_empty() {
        return Err(AppError::BadRequest(
            "Name and designation are required".to_string(),
        ));
    }

    let member = doc! {
        "name": request.name.trim(),
        "designation": request.designation.trim(),
        "addedAt": BsonDateTime::now(),
    };

    let outcome = store
        .update_one_any(
            "clubs",
            &claims_club_filters(claims),
            doc! { "$push": { "members": member } },
        )
        .await?;

    if outcome.matched_count == 0 {
        return Err(AppError::NotFound("Club not found".to_string()));
    }
    Ok(())
}

pub async fn remove_member(
    store: &DataStore,
    claims: &Claims,
    request: &MemberRequest,
) -> Result<(), AppError> {
    if request.name.trim().is_empty() || request.designation.trim().is_empty() {
        return Err(AppError::BadRequest(
            "Name and designation are required".to_string(),
        ));
    }

    let outcome = store
        .update_one_any(
            "clubs",
            &claims_club_filters(claims),
            doc! {
                "$pull": {
                    "members": {
                        "name": request.name.trim(),
                        "designation": request.designation.trim(),
                    }
                }
            },
        )
        .await?;

    if outcome.matched_count == 0 {
        return Err(AppError::NotFound("Club not found".to_string()));
    }
    Ok(())
}

pub async fn add_event(
    store: &DataStore,
    claims: &Claims,
    request: &AddEventRequest,
) -> Result<(), AppError> {
    if request.title.trim().is_empty() || request.date.is_empty() {
        return Err(AppError::BadRequest("Title and date are required".to_string()));
    }

    let event = doc! {
        "title": request.title.trim(),
        "date": &request.date,
        "description": request.description.as_deref().unwrap_or("").trim(),
        "status": EVENT_STATUS_PENDING,
        "createdAt": BsonDateTime::now(),
    };

    let outcome = store
        .update_one_any(
            "clubs",
            &claims_club_filters(claims),
            doc! { "$push": { "events": event } },
        )
        .await?;

    if outcome.matched_count == 0 {
        return Err(AppError::NotFound("Club not found".to_string()));
    }
    Ok(())
}

pub async fn edit_event(
    store: &DataStore,
    claims: &Claims,
    request: &EditEventRequest,
) -> Result<(), AppError> {
    if request.original_title.is_empty()
        || request.original_date.is_empty()
        || request.title.trim().is_empty()
        || request.date.is_empty()
    {
        return Err(AppError::BadRequest(
            "All required fields must be provided".to_string(),
        ));
    }

    let club = find_club(store, claims).await?;

    let mut events: Vec<Bson> = club
        .get_array("events")
        .map(|items| items.to_vec())
        .unwrap_or_default();

    let index = events
        .iter()
        .position(|event| {
            event
                .as_document()
                .map(|e| {
                    e.get_str("title") == Ok(request.original_title.as_str())
                        && e.get_str("date") == Ok(request.original_date.as_str())
                })
                .unwrap_or(false)
        })
        .ok_or_else(|| AppError::NotFound("Event not found".to_string()))?;

    // Rewrite in place; edits go back through review
    if let Some(Bson::Document(event)) = events.get_mut(index) {
        event.insert("title", request.title.trim());
        event.insert("date", request.date.as_str());
        event.insert(
            "description",
            request.description.as_deref().unwrap_or("").trim(),
        );
        event.insert("status", EVENT_STATUS_PENDING);
        event.insert("updatedAt", BsonDateTime::now());
    }

    let id = club
        .get("_id")
        .cloned()
        .ok_or_else(|| AppError::NotFound("Club not found".to_string()))?;
    store
        .update_one("clubs", doc! { "_id": id }, doc! { "$set": { "events": events } })
        .await?;

    Ok(())
}

pub async fn delete_event(
    store: &DataStore,
    claims: &Claims,
    request: &DeleteEventRequest,
) -> Result<(), AppError> {
    if request.title.trim().is_empty() || request.date.is_empty() {
        return Err(AppError::BadRequest("Title and date are required".to_string()));
    }

    let outcome = store
        .update_one_any(
            "clubs",
            &claims_club_filters(claims),
            doc! {
                "$pull": {
                    "events": {
                        "title": request.title.trim(),
                        "date": &request.date,
                    }
                }
            },
        )
        .await?;

    if outcome.matched_count == 0 {
        return Err(AppError::NotFound("Club not found".to_string()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Role;

    fn club_claims(club_id: &str, email: &str) -> Claims {
        Claims {
            sub: "user-1".to_string(),
            email: email.to_string(),
            role: Role::Club,
            club_id: Some(club_id.to_string()),
            iat: 0,
            exp: usize::MAX,
        }
    }

    #[tokio::test]
    async fn members_can_be_added_and_removed() {
        let store = DataStore::mock();
        let claims = club_claims("pending-1", "arts@mitwpu.edu.in");

        add_member(
            &store,
            &claims,
            &MemberRequest {
                name: "  Asha  ".to_string(),
                designation: "Lead".to_string(),
            },
        )
        .await
        .expect("add member");

        let club = find_club(&store, &claims).await.unwrap();
        let members = club.get_array("members").unwrap();
        assert_eq!(members.len(), 1);
        // Names are trimmed before storage
        assert_eq!(
            members[0].as_document().unwrap().get_str("name").unwrap(),
            "Asha"
        );

        remove_member(
            &store,
            &claims,
            &MemberRequest {
                name: "Asha".to_string(),
                designation: "Lead".to_string(),
            },
        )
        .await
        .expect("remove member");

        let club = find_club(&store, &claims).await.unwrap();
        assert!(club.get_array("members").unwrap().is_empty());
    }

    #[tokio::test]
    async fn stale_token_ids_fall_back_to_email_lookup() {
        let store = DataStore::mock();
        let claims = club_claims("gone-id", "arts@mitwpu.edu.in");

        add_member(
            &store,
            &claims,
            &MemberRequest {
                name: "Ravi".to_string(),
                designation: "Member".to_string(),
            },
        )
        .await
        .expect("email fallback");

        let club = find_club(&store, &claims).await.unwrap();
        assert_eq!(club.get_array("members").unwrap().len(), 1);
    }

    #[tokio::test]
    async fn events_are_edited_in_place_and_reset_to_pending() {
        let store = DataStore::mock();
        let claims = club_claims("pending-1", "arts@mitwpu.edu.in");

        // Seed an already-approved event, then edit it
        store
            .update_one(
                "clubs",
                doc! { "_id": "pending-1" },
                doc! { "$push": { "events": {
                    "title": "Art Expo",
                    "date": "2026-09-12",
                    "description": "Annual exhibition",
                    "status": "approved",
                    "createdAt": BsonDateTime::now(),
                } } },
            )
            .await
            .expect("seed event");

        edit_event(
            &store,
            &claims,
            &EditEventRequest {
                original_title: "Art Expo".to_string(),
                original_date: "2026-09-12".to_string(),
                title: "Art Expo 2026".to_string(),
                date: "2026-09-19".to_string(),
                description: None,
            },
        )
        .await
        .expect("edit event");

        let club = find_club(&store, &claims).await.unwrap();
        let events = club.get_array("events").unwrap();
        let event = events[0].as_document().unwrap();
        assert_eq!(event.get_str("title").unwrap(), "Art Expo 2026");
        assert_eq!(event.get_str("status").unwrap(), EVENT_STATUS_PENDING);
        assert!(event.contains_key("updatedAt"));
    }

    #[tokio::test]
    async fn added_events_start_pending_and_can_be_deleted() {
        let store = DataStore::mock();
        let claims = club_claims("pending-1", "arts@mitwpu.edu.in");

        add_event(
            &store,
            &claims,
            &AddEventRequest {
                title: "Hack Night".to_string(),
                date: "2026-11-02".to_string(),
                description: None,
            },
        )
        .await
        .expect("add event");

        let club = find_club(&store, &claims).await.unwrap();
        let events = club.get_array("events").unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(
            events[0].as_document().unwrap().get_str("status").unwrap(),
            EVENT_STATUS_PENDING
        );

        delete_event(
            &store,
            &claims,
            &DeleteEventRequest {
                title: "Hack Night".to_string(),
                date: "2026-11-02".to_string(),
            },
        )
        .await
        .expect("delete event");

        let club = find_club(&store, &claims).await.unwrap();
        assert!(club.get_array("events").unwrap().is_empty());
    }

    #[tokio::test]
    async fn deleting_a_missing_event_still_matches_the_club() {
        let store = DataStore::mock();
        let claims = club_claims("pending-1", "arts@mitwpu.edu.in");

        // $pull with no matching element is a successful no-op
        delete_event(
            &store,
            &claims,
            &DeleteEventRequest {
                title: "Nothing".to_string(),
                date: "2026-01-01".to_string(),
            },
        )
        .await
        .expect("no-op pull");
    }

    #[tokio::test]
    async fn unknown_club_is_a_not_found() {
        let store = DataStore::mock();
        let claims = club_claims("missing", "nobody@mitwpu.edu.in");

        let err = add_member(
            &store,
            &claims,
            &MemberRequest {
                name: "X".to_string(),
                designation: "Y".to_string(),
            },
        )
        .await
        .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }
}
