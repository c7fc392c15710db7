use crate::database::DataStore;
use crate::models::club::{EVENT_STATUS_APPROVED, EVENT_STATUS_REJECTED};
use crate::utils::ident::{club_filter_candidates, doc_id_string};
use crate::utils::AppError;
use mongodb::bson::{doc, Bson, DateTime as BsonDateTime, Document};
use serde::Deserialize;

/// Colors cycle as clubs are approved so adjacent calendars stay distinct.
const COLOR_PALETTE: [&str; 9] = [
    "#e57373", "#64b5f6", "#81c784", "#ffd54f", "#ba68c8", "#4dd0e1", "#f06292", "#a1887f",
    "#90a4ae",
];

#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct ClubActionRequest {
    #[serde(rename = "clubId", default)]
    pub club_id: Option<String>,
    #[serde(rename = "clubEmail", default)]
    pub club_email: Option<String>,
}

#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct UpdateEventStatusRequest {
    #[serde(rename = "clubId")]
    pub club_id: String,
    #[serde(rename = "eventId")]
    pub event_id: String,
    pub status: String,
    #[serde(default)]
    pub note: Option<String>,
}

fn club_action_filters(request: &ClubActionRequest) -> Result<Vec<Document>, AppError> {
    if request.club_id.is_none() && request.club_email.is_none() {
        return Err(AppError::BadRequest(
            "Club identifier is required".to_string(),
        ));
    }
    Ok(club_filter_candidates(
        request.club_id.as_deref(),
        request.club_email.as_deref(),
    ))
}

/// Approve a registration: mark approved, stamp the time and hand the club
/// the next palette color.
pub async fn approve_club(store: &DataStore, request: &ClubActionRequest) -> Result<(), AppError> {
    let filters = club_action_filters(request)?;

    let approved_count = store
        .count_documents("clubs", doc! { "approved": true })
        .await?;
    let color = COLOR_PALETTE[(approved_count as usize) % COLOR_PALETTE.len()];

    let outcome = store
        .update_one_any(
            "clubs",
            &filters,
            doc! { "$set": {
                "approved": true,
                "color": color,
                "approvedAt": BsonDateTime::now(),
            } },
        )
        .await?;

    if outcome.matched_count == 0 {
        log::warn!(
            "❌ No club matched for approval - clubId: {:?}, clubEmail: {:?}",
            request.club_id,
            request.club_email
        );
        return Err(AppError::NotFound("Club not found".to_string()));
    }

    log::info!("✅ Club approved with color {}", color);
    Ok(())
}

/// Reject a registration: remove the club row and its login.
pub async fn reject_club(store: &DataStore, request: &ClubActionRequest) -> Result<(), AppError> {
    let filters = club_action_filters(request)?;

    // Resolve first so the login can be removed even when only an id was sent
    let club = store.find_one_any("clubs", &filters).await?;
    let email = request
        .club_email
        .as_deref()
        .map(str::to_lowercase)
        .or_else(|| {
            club.as_ref()
                .and_then(|c| c.get_str("email").ok())
                .map(str::to_lowercase)
        });

    let deleted = store.delete_one_any("clubs", &filters).await?;
    if deleted == 0 && !store.is_mock() {
        return Err(AppError::NotFound("Club not found".to_string()));
    }

    if let Some(email) = email {
        store
            .delete_one(
                "users",
                doc! { "email": &email, "role": crate::models::Role::Club.as_str() },
            )
            .await?;
        log::info!("🗑️ Removed rejected club and login for {}", email);
    }

    Ok(())
}

/// Approve or reject a single embedded event, addressed by its synthetic
/// `"<club-id>-<index>"` id.
pub async fn update_event_status(
    store: &DataStore,
    request: &UpdateEventStatusRequest,
) -> Result<(), AppError> {
    if request.club_id.is_empty() || request.event_id.is_empty() || request.status.is_empty() {
        return Err(AppError::BadRequest(
            "clubId, eventId and status are required".to_string(),
        ));
    }
    if request.status != EVENT_STATUS_APPROVED && request.status != EVENT_STATUS_REJECTED {
        return Err(AppError::BadRequest("Invalid status".to_string()));
    }

    let filters = club_filter_candidates(Some(request.club_id.as_str()), None);
    let club = store
        .find_one_any("clubs", &filters)
        .await?
        .ok_or_else(|| AppError::NotFound("Club not found".to_string()))?;

    let club_id = doc_id_string(&club);
    let mut events: Vec<Bson> = club
        .get_array("events")
        .map(|items| items.to_vec())
        .unwrap_or_default();

    let index = (0..events.len())
        .position(|i| format!("{}-{}", club_id, i) == request.event_id)
        .ok_or_else(|| AppError::NotFound("Event not found".to_string()))?;

    if let Some(Bson::Document(event)) = events.get_mut(index) {
        let note = request
            .note
            .as_deref()
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .map(str::to_string)
            .or_else(|| event.get_str("directorNote").ok().map(str::to_string))
            .unwrap_or_default();
        event.insert("status", request.status.as_str());
        event.insert("reviewedAt", BsonDateTime::now());
        event.insert("directorNote", note);
    }

    let id = club
        .get("_id")
        .cloned()
        .ok_or_else(|| AppError::NotFound("Club not found".to_string()))?;
    store
        .update_one(
            "clubs",
            doc! { "_id": id },
            doc! { "$set": { "events": events } },
        )
        .await?;

    log::info!("✅ Event {} {}", request.event_id, request.status);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn by_id(id: &str) -> ClubActionRequest {
        ClubActionRequest {
            club_id: Some(id.to_string()),
            club_email: None,
        }
    }

    #[tokio::test]
    async fn approval_assigns_the_next_palette_color() {
        let store = DataStore::mock();

        approve_club(&store, &by_id("pending-1")).await.expect("approve");

        let club = store
            .find_one("clubs", doc! { "_id": "pending-1" })
            .await
            .unwrap()
            .unwrap();
        assert!(club.get_bool("approved").unwrap());
        // First approval takes the first palette entry
        assert_eq!(club.get_str("color").unwrap(), COLOR_PALETTE[0]);
        assert!(club.contains_key("approvedAt"));

        // A second club wraps forward through the palette
        store
            .insert_one(
                "clubs",
                doc! { "name": "Chess Club", "email": "chess@mitwpu.edu.in", "approved": false },
            )
            .await
            .unwrap();
        approve_club(
            &store,
            &ClubActionRequest {
                club_id: None,
                club_email: Some("Chess@mitwpu.edu.in".to_string()),
            },
        )
        .await
        .expect("approve second");

        let second = store
            .find_one("clubs", doc! { "email": "chess@mitwpu.edu.in" })
            .await
            .unwrap()
            .unwrap();
        assert_eq!(second.get_str("color").unwrap(), COLOR_PALETTE[1]);
    }

    #[tokio::test]
    async fn approval_requires_an_identifier() {
        let store = DataStore::mock();
        let err = approve_club(
            &store,
            &ClubActionRequest {
                club_id: None,
                club_email: None,
            },
        )
        .await
        .unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));
    }

    #[tokio::test]
    async fn rejection_removes_club_and_login() {
        let store = DataStore::mock();
        store
            .insert_one(
                "users",
                doc! { "email": "arts@mitwpu.edu.in", "password": "x", "role": "club" },
            )
            .await
            .unwrap();

        reject_club(&store, &by_id("pending-1")).await.expect("reject");

        assert!(store
            .find_one("clubs", doc! { "_id": "pending-1" })
            .await
            .unwrap()
            .is_none());
        assert!(store
            .find_one("users", doc! { "email": "arts@mitwpu.edu.in" })
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn rejecting_a_missing_club_is_tolerated_in_mock_mode() {
        let store = DataStore::mock();
        reject_club(&store, &by_id("never-existed"))
            .await
            .expect("tolerated");
    }

    #[tokio::test]
    async fn event_review_rewrites_status_and_note() {
        let store = DataStore::mock();
        store
            .update_one(
                "clubs",
                doc! { "_id": "pending-1" },
                doc! { "$push": { "events": {
                    "title": "Expo",
                    "date": "2026-09-12",
                    "status": "pending",
                    "createdAt": BsonDateTime::now(),
                } } },
            )
            .await
            .unwrap();

        update_event_status(
            &store,
            &UpdateEventStatusRequest {
                club_id: "pending-1".to_string(),
                event_id: "pending-1-0".to_string(),
                status: "approved".to_string(),
                note: Some("  Looks good  ".to_string()),
            },
        )
        .await
        .expect("review");

        let club = store
            .find_one("clubs", doc! { "_id": "pending-1" })
            .await
            .unwrap()
            .unwrap();
        let event = club.get_array("events").unwrap()[0].as_document().unwrap();
        assert_eq!(event.get_str("status").unwrap(), "approved");
        assert_eq!(event.get_str("directorNote").unwrap(), "Looks good");
        assert!(event.contains_key("reviewedAt"));
    }

    #[tokio::test]
    async fn event_review_rejects_unknown_statuses_and_ids() {
        let store = DataStore::mock();

        let err = update_event_status(
            &store,
            &UpdateEventStatusRequest {
                club_id: "pending-1".to_string(),
                event_id: "pending-1-0".to_string(),
                status: "archived".to_string(),
                note: None,
            },
        )
        .await
        .unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));

        let err = update_event_status(
            &store,
            &UpdateEventStatusRequest {
                club_id: "pending-1".to_string(),
                event_id: "pending-1-5".to_string(),
                status: "rejected".to_string(),
                note: None,
            },
        )
        .await
        .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }
}
