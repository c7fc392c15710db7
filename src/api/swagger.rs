use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "ClubSync Service API",
        version = "1.0.0",
        description = "Club management backend for college clubs. \n\n**Authentication:** All `/api/club`, `/api/dashboard` and `/api/director` endpoints require a JWT Bearer token issued by `/api/auth/login`.\n\n**Roles:** club accounts manage their own members, events, budget requests and reports; the director account approves clubs, reviews events and adjudicates budget requests.",
        contact(
            name = "ClubSync Team"
        )
    ),
    paths(
        // Auth
        crate::api::auth::login,
        crate::api::auth::register,

        // Health & dev
        crate::api::health::health_check,
        crate::api::dev::db_status,

        // Club self-service
        crate::api::club::add_member,
        crate::api::club::add_event,
        crate::api::club::submit_budget_request,

        // Dashboards
        crate::api::dashboard::club_dashboard,
        crate::api::dashboard::director_dashboard,

        // Director
        crate::api::director::approve_club,
        crate::api::director::update_budget_request,
    ),
    components(
        schemas(
            crate::services::auth_service::LoginRequest,
            crate::services::auth_service::RegisterRequest,
            crate::services::auth_service::LoginResponse,
            crate::services::auth_service::RegisterResponse,
            crate::services::auth_service::UserInfo,

            crate::services::club_service::MemberRequest,
            crate::services::club_service::AddEventRequest,
            crate::services::budget_service::SubmitBudgetRequest,
            crate::services::budget_service::UpdateBudgetRequest,
            crate::services::director_service::ClubActionRequest,

            crate::services::dashboard_service::ClubDashboardResponse,
            crate::services::dashboard_service::DirectorDashboardResponse,

            crate::api::health::HealthResponse,
            crate::api::dev::DbStatusResponse,
        )
    ),
    tags(
        (name = "Auth", description = "Login and club registration. Club logins stay blocked until the director approves the club."),
        (name = "Club", description = "Self-service endpoints for approved clubs: members, events, budget requests and reports."),
        (name = "Dashboard", description = "Read models for the club profile page and the director overview."),
        (name = "Director", description = "Approval workflows: club registrations, event review and budget adjudication."),
        (name = "Health", description = "Health check endpoint for monitoring."),
        (name = "Dev", description = "Development-only helpers, disabled in production."),
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .description(Some("Enter your JWT token"))
                        .build(),
                ),
            );
        }
    }
}
