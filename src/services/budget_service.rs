use crate::database::DataStore;
use crate::models::budget_request::{
    BudgetRequest, BUDGET_STATUS_APPROVED, BUDGET_STATUS_COUNTERED, BUDGET_STATUS_PENDING,
    BUDGET_STATUS_REJECTED,
};
use crate::services::auth_service::Claims;
use crate::services::club_service;
use crate::utils::docs::iso_from_bson;
use crate::utils::ident::id_filter_candidates;
use crate::utils::AppError;
use mongodb::bson::{doc, from_document, DateTime as BsonDateTime, Document};
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct SubmitBudgetRequest {
    pub event_name: String,
    #[serde(default)]
    pub organisers: Option<String>,
    pub expected_budget: f64,
    pub tentative_month: String,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum BudgetAction {
    Approve,
    Reject,
    Counter,
}

#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct UpdateBudgetRequest {
    #[serde(rename = "requestId")]
    pub request_id: String,
    pub action: BudgetAction,
    #[serde(rename = "finalBudget", default)]
    pub final_budget: Option<f64>,
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct BudgetRequestView {
    pub id: String,
    #[serde(rename = "clubId")]
    pub club_id: String,
    pub event_name: String,
    pub organisers: String,
    pub expected_budget: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub final_budget: Option<f64>,
    pub tentative_month: String,
    pub status: String,
    #[serde(rename = "createdAt")]
    pub created_at: Option<String>,
}

pub fn budget_request_view(row: &Document) -> Result<BudgetRequestView, AppError> {
    let created_at = iso_from_bson(row.get("createdAt"));
    let request: BudgetRequest =
        from_document(row.clone()).map_err(|e| AppError::Database(e.to_string()))?;
    Ok(BudgetRequestView {
        id: request.id_string(),
        club_id: request.club_id,
        event_name: request.event_name,
        organisers: request.organisers,
        expected_budget: request.expected_budget,
        final_budget: request.final_budget,
        tentative_month: request.tentative_month,
        status: request.status,
        created_at,
    })
}

/// Submit a funding ask for the caller's club.
pub async fn submit_request(
    store: &DataStore,
    claims: &Claims,
    request: &SubmitBudgetRequest,
) -> Result<BudgetRequestView, AppError> {
    if request.event_name.is_empty()
        || request.tentative_month.is_empty()
        || request.expected_budget <= 0.0
    {
        return Err(AppError::BadRequest("Missing required fields".to_string()));
    }

    let club_id = match claims.club_id.clone() {
        Some(id) => id,
        // Tokens issued before approval carry no club id
        None => club_service::canonical_club_id(store, claims).await?,
    };

    let row = doc! {
        "club_id": &club_id,
        "event_name": &request.event_name,
        "organisers": request.organisers.as_deref().unwrap_or(""),
        "expected_budget": request.expected_budget,
        "tentative_month": &request.tentative_month,
        "description": request.description.as_deref().unwrap_or(""),
        "status": BUDGET_STATUS_PENDING,
        "createdAt": BsonDateTime::now(),
    };

    let id = store.insert_one("budget_requests", row.clone()).await?;

    let mut inserted = row;
    inserted.insert("_id", id);
    budget_request_view(&inserted)
}

/// The caller's own budget requests, matching rows written under either
/// the raw token id or the canonical club id.
pub async fn list_requests(
    store: &DataStore,
    claims: &Claims,
) -> Result<Vec<BudgetRequestView>, AppError> {
    let canonical = club_service::canonical_club_id(store, claims).await?;
    let raw = claims.club_id.clone().unwrap_or_else(|| canonical.clone());

    let rows = store
        .find(
            "budget_requests",
            doc! { "$or": [ { "club_id": &canonical }, { "club_id": &raw } ] },
        )
        .await?;

    rows.iter().map(budget_request_view).collect()
}

/// Director adjudication: approve, reject or counter with a final figure.
pub async fn update_request(
    store: &DataStore,
    request: &UpdateBudgetRequest,
) -> Result<(), AppError> {
    if request.request_id.is_empty() {
        return Err(AppError::BadRequest(
            "requestId and action are required".to_string(),
        ));
    }

    let update = match request.action {
        BudgetAction::Approve => {
            let mut set = doc! { "status": BUDGET_STATUS_APPROVED };
            if let Some(final_budget) = request.final_budget {
                if final_budget > 0.0 {
                    set.insert("final_budget", final_budget);
                }
            }
            doc! { "$set": set }
        }
        BudgetAction::Reject => doc! { "$set": { "status": BUDGET_STATUS_REJECTED } },
        BudgetAction::Counter => {
            let final_budget = request.final_budget.ok_or_else(|| {
                AppError::BadRequest("finalBudget is required for counter".to_string())
            })?;
            doc! { "$set": { "status": BUDGET_STATUS_COUNTERED, "final_budget": final_budget } }
        }
    };

    let outcome = store
        .update_one_any(
            "budget_requests",
            &id_filter_candidates(&request.request_id),
            update,
        )
        .await?;

    // The mock seed holds no requests; tolerate a miss there
    if outcome.matched_count == 0 && !store.is_mock() {
        return Err(AppError::NotFound("Budget request not found".to_string()));
    }

    Ok(())
}
