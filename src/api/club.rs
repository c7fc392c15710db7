use crate::database::DataStore;
use crate::models::Role;
use crate::services::auth_service::require_role;
use crate::services::budget_service::{self, SubmitBudgetRequest};
use crate::services::club_service::{
    self, AddEventRequest, DeleteEventRequest, EditEventRequest, MemberRequest,
};
use crate::services::report_service::{self, CreateReportRequest, DeleteReportRequest};
use crate::utils::AppError;
use actix_web::{web, HttpRequest, HttpResponse};
use serde::Deserialize;

fn success(message: &str) -> HttpResponse {
    HttpResponse::Ok().json(serde_json::json!({ "message": message, "success": true }))
}

#[utoipa::path(
    post,
    path = "/api/club/add-member",
    tag = "Club",
    request_body = MemberRequest,
    responses(
        (status = 200, description = "Member added"),
        (status = 404, description = "Club not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn add_member(
    req: HttpRequest,
    store: web::Data<DataStore>,
    request: web::Json<MemberRequest>,
) -> Result<HttpResponse, AppError> {
    let claims = require_role(&req, Role::Club)?;
    log::info!("👥 POST /api/club/add-member - {}", request.name);

    club_service::add_member(&store, &claims, &request).await?;
    Ok(success("Member added successfully"))
}

pub async fn remove_member(
    req: HttpRequest,
    store: web::Data<DataStore>,
    request: web::Json<MemberRequest>,
) -> Result<HttpResponse, AppError> {
    let claims = require_role(&req, Role::Club)?;
    log::info!("👥 POST /api/club/remove-member - {}", request.name);

    club_service::remove_member(&store, &claims, &request).await?;
    Ok(success("Member removed successfully"))
}

#[utoipa::path(
    post,
    path = "/api/club/add-event",
    tag = "Club",
    request_body = AddEventRequest,
    responses(
        (status = 200, description = "Event submitted for review"),
        (status = 404, description = "Club not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn add_event(
    req: HttpRequest,
    store: web::Data<DataStore>,
    request: web::Json<AddEventRequest>,
) -> Result<HttpResponse, AppError> {
    let claims = require_role(&req, Role::Club)?;
    log::info!("📅 POST /api/club/add-event - {}", request.title);

    club_service::add_event(&store, &claims, &request).await?;
    Ok(success("Event added successfully"))
}

pub async fn edit_event(
    req: HttpRequest,
    store: web::Data<DataStore>,
    request: web::Json<EditEventRequest>,
) -> Result<HttpResponse, AppError> {
    let claims = require_role(&req, Role::Club)?;
    log::info!("📅 POST /api/club/edit-event - {}", request.original_title);

    club_service::edit_event(&store, &claims, &request).await?;
    Ok(success("Event updated successfully"))
}

pub async fn delete_event(
    req: HttpRequest,
    store: web::Data<DataStore>,
    request: web::Json<DeleteEventRequest>,
) -> Result<HttpResponse, AppError> {
    let claims = require_role(&req, Role::Club)?;
    log::info!("🗑️ POST /api/club/delete-event - {}", request.title);

    club_service::delete_event(&store, &claims, &request).await?;
    Ok(success("Event deleted successfully"))
}

#[utoipa::path(
    post,
    path = "/api/club/budget-requests",
    tag = "Club",
    request_body = SubmitBudgetRequest,
    responses(
        (status = 200, description = "Budget request submitted"),
        (status = 400, description = "Missing required fields")
    ),
    security(("bearer_auth" = []))
)]
pub async fn submit_budget_request(
    req: HttpRequest,
    store: web::Data<DataStore>,
    request: web::Json<SubmitBudgetRequest>,
) -> Result<HttpResponse, AppError> {
    let claims = require_role(&req, Role::Club)?;
    log::info!(
        "💰 POST /api/club/budget-request - {} ({})",
        request.event_name,
        request.expected_budget
    );

    let view = budget_service::submit_request(&store, &claims, &request).await?;
    Ok(HttpResponse::Ok().json(serde_json::json!({
        "message": "Budget request submitted successfully",
        "success": true,
        "request": view,
    })))
}

pub async fn list_budget_requests(
    req: HttpRequest,
    store: web::Data<DataStore>,
) -> Result<HttpResponse, AppError> {
    let claims = require_role(&req, Role::Club)?;
    log::info!("💰 GET /api/club/budget-requests");

    let requests = budget_service::list_requests(&store, &claims).await?;
    Ok(HttpResponse::Ok().json(serde_json::json!({ "requests": requests })))
}

pub async fn list_reports(
    req: HttpRequest,
    store: web::Data<DataStore>,
) -> Result<HttpResponse, AppError> {
    let claims = require_role(&req, Role::Club)?;
    log::info!("📄 GET /api/club/reports");

    let reports = report_service::list_reports(&store, &claims).await?;
    Ok(HttpResponse::Ok().json(serde_json::json!({ "reports": reports })))
}

pub async fn create_report(
    req: HttpRequest,
    store: web::Data<DataStore>,
    request: web::Json<CreateReportRequest>,
) -> Result<HttpResponse, AppError> {
    let claims = require_role(&req, Role::Club)?;
    log::info!("📄 POST /api/club/reports - {}", request.original_name);

    let report = report_service::create_report(&store, &claims, &request).await?;
    Ok(HttpResponse::Ok().json(serde_json::json!({
        "message": "Report saved successfully",
        "success": true,
        "report": report,
    })))
}

#[derive(Debug, Deserialize)]
pub struct DeleteReportQuery {
    #[serde(default)]
    pub id: Option<String>,
}

// Older clients send the id in the body, newer ones as a query param
pub async fn delete_report(
    req: HttpRequest,
    store: web::Data<DataStore>,
    query: web::Query<DeleteReportQuery>,
    body: Option<web::Json<DeleteReportRequest>>,
) -> Result<HttpResponse, AppError> {
    let claims = require_role(&req, Role::Club)?;

    let report_id = body
        .as_ref()
        .and_then(|b| b.id.clone())
        .or_else(|| query.id.clone())
        .ok_or_else(|| AppError::BadRequest("Report id is required".to_string()))?;
    log::info!("🗑️ DELETE /api/club/reports - {}", report_id);

    report_service::delete_report(&store, &claims, &report_id).await?;
    Ok(success("Report deleted successfully"))
}
