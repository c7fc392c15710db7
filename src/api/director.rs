use crate::database::DataStore;
use crate::models::Role;
use crate::services::auth_service::require_role;
use crate::services::budget_service::{self, UpdateBudgetRequest};
use crate::services::director_service::{self, ClubActionRequest, UpdateEventStatusRequest};
use crate::services::report_service;
use crate::utils::AppError;
use actix_web::{web, HttpRequest, HttpResponse};

fn success(message: &str) -> HttpResponse {
    HttpResponse::Ok().json(serde_json::json!({ "message": message, "success": true }))
}

#[utoipa::path(
    post,
    path = "/api/director/approve-club",
    tag = "Director",
    request_body = ClubActionRequest,
    responses(
        (status = 200, description = "Club approved"),
        (status = 400, description = "Club identifier is required"),
        (status = 404, description = "Club not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn approve_club(
    req: HttpRequest,
    store: web::Data<DataStore>,
    request: web::Json<ClubActionRequest>,
) -> Result<HttpResponse, AppError> {
    require_role(&req, Role::Director)?;
    log::info!(
        "✅ POST /api/director/approve-club - clubId: {:?}, clubEmail: {:?}",
        request.club_id,
        request.club_email
    );

    director_service::approve_club(&store, &request).await?;
    Ok(success("Club approved successfully"))
}

pub async fn reject_club(
    req: HttpRequest,
    store: web::Data<DataStore>,
    request: web::Json<ClubActionRequest>,
) -> Result<HttpResponse, AppError> {
    require_role(&req, Role::Director)?;
    log::info!(
        "🚫 POST /api/director/reject-club - clubId: {:?}, clubEmail: {:?}",
        request.club_id,
        request.club_email
    );

    director_service::reject_club(&store, &request).await?;
    Ok(success("Club rejected and removed successfully"))
}

pub async fn update_event_status(
    req: HttpRequest,
    store: web::Data<DataStore>,
    request: web::Json<UpdateEventStatusRequest>,
) -> Result<HttpResponse, AppError> {
    require_role(&req, Role::Director)?;
    log::info!(
        "📅 POST /api/director/update-event-status - {} -> {}",
        request.event_id,
        request.status
    );

    director_service::update_event_status(&store, &request).await?;
    Ok(success(&format!("Event {} successfully", request.status)))
}

#[utoipa::path(
    post,
    path = "/api/director/update-budget-request",
    tag = "Director",
    request_body = UpdateBudgetRequest,
    responses(
        (status = 200, description = "Budget request updated"),
        (status = 400, description = "Missing action or finalBudget"),
        (status = 404, description = "Budget request not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn update_budget_request(
    req: HttpRequest,
    store: web::Data<DataStore>,
    request: web::Json<UpdateBudgetRequest>,
) -> Result<HttpResponse, AppError> {
    require_role(&req, Role::Director)?;
    log::info!(
        "💰 POST /api/director/update-budget-request - {}",
        request.request_id
    );

    budget_service::update_request(&store, &request).await?;
    Ok(success("Budget request updated successfully"))
}

pub async fn reports(
    req: HttpRequest,
    store: web::Data<DataStore>,
) -> Result<HttpResponse, AppError> {
    require_role(&req, Role::Director)?;
    log::info!("📄 GET /api/director/reports");

    let response = report_service::director_reports(&store).await?;
    Ok(HttpResponse::Ok().json(response))
}
