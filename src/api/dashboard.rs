use crate::database::DataStore;
use crate::models::Role;
use crate::services::auth_service::require_role;
use crate::services::dashboard_service::{self, ClubDashboardResponse, DirectorDashboardResponse};
use crate::utils::AppError;
use actix_web::{web, HttpRequest, HttpResponse};

#[utoipa::path(
    get,
    path = "/api/dashboard/club",
    tag = "Dashboard",
    responses(
        (status = 200, description = "Club profile with budget stats", body = ClubDashboardResponse),
        (status = 404, description = "Club not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn club_dashboard(
    req: HttpRequest,
    store: web::Data<DataStore>,
) -> Result<HttpResponse, AppError> {
    let claims = require_role(&req, Role::Club)?;
    log::info!("📊 GET /api/dashboard/club - {}", claims.email);

    let response = dashboard_service::club_dashboard(&store, &claims).await?;
    Ok(HttpResponse::Ok().json(response))
}

#[utoipa::path(
    get,
    path = "/api/dashboard/director",
    tag = "Dashboard",
    responses(
        (status = 200, description = "Aggregate view for the director", body = DirectorDashboardResponse)
    ),
    security(("bearer_auth" = []))
)]
pub async fn director_dashboard(
    req: HttpRequest,
    store: web::Data<DataStore>,
) -> Result<HttpResponse, AppError> {
    require_role(&req, Role::Director)?;
    log::info!("📊 GET /api/dashboard/director");

    let response = dashboard_service::director_dashboard(&store).await?;
    Ok(HttpResponse::Ok().json(response))
}
