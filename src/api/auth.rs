use crate::database::DataStore;
use crate::services::auth_service;
use crate::services::auth_service::{LoginRequest, LoginResponse, RegisterRequest, RegisterResponse};
use crate::utils::AppError;
use actix_web::{web, HttpResponse};

#[utoipa::path(
    post,
    path = "/api/auth/login",
    tag = "Auth",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful", body = LoginResponse),
        (status = 401, description = "Invalid credentials"),
        (status = 403, description = "Club not approved yet")
    )
)]
pub async fn login(
    store: web::Data<DataStore>,
    request: web::Json<LoginRequest>,
) -> Result<HttpResponse, AppError> {
    log::info!("🔐 POST /api/auth/login - email: {}", request.email);

    let response = auth_service::login(&store, &request).await?;
    log::info!("✅ Login successful: {}", request.email);
    Ok(HttpResponse::Ok().json(response))
}

#[utoipa::path(
    post,
    path = "/api/auth/register",
    tag = "Auth",
    request_body = RegisterRequest,
    responses(
        (status = 200, description = "Registration submitted", body = RegisterResponse),
        (status = 400, description = "Invalid request or duplicate club/email")
    )
)]
pub async fn register(
    store: web::Data<DataStore>,
    request: web::Json<RegisterRequest>,
) -> Result<HttpResponse, AppError> {
    log::info!(
        "📝 POST /api/auth/register - club: {}, email: {}",
        request.club_name,
        request.email
    );

    let response = auth_service::register(&store, &request).await?;
    Ok(HttpResponse::Ok().json(response))
}
