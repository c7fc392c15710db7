mod api;
mod database;
mod middleware;
mod models;
mod seeds;
mod services;
mod utils;

use actix_cors::Cors;
use actix_web::{middleware::Logger, web, App, HttpServer};
use dotenv::dotenv;
use std::env;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Load environment variables
    dotenv().ok();

    // Initialize logger
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    // Get configuration from environment
    let host = env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
    let port = env::var("PORT").unwrap_or_else(|_| "3001".to_string());
    let mongodb_uri =
        env::var("MONGODB_URI").unwrap_or_else(|_| "mongodb://localhost:27017".to_string());
    let mongodb_db = env::var("MONGODB_DB").unwrap_or_else(|_| "clubsync".to_string());

    log::info!("🚀 Starting ClubSync Service...");
    log::info!("📊 Database: {} ({})", mongodb_uri, mongodb_db);

    // Connect to MongoDB, or fall back to the in-process mock
    let store = database::DataStore::connect(&mongodb_uri, &mongodb_db).await;
    if store.is_mock() {
        log::info!("🧪 Running against the mock store - data resets on restart");
    }
    let store_data = web::Data::new(store);

    log::info!("🌐 Server starting on {}:{}", host, port);
    log::info!("📚 Swagger UI available at: http://{}:{}/swagger-ui/", host, port);
    log::info!("📄 OpenAPI spec at: http://{}:{}/api-docs/openapi.json", host, port);

    // Start HTTP server
    HttpServer::new(move || {
        let cors = Cors::default()
            .allowed_origin("http://localhost:3000") // Frontend dev server
            .allowed_origin("http://127.0.0.1:3000")
            .allowed_origin("http://localhost:3001")
            .allowed_origin("http://127.0.0.1:3001")
            .allowed_methods(vec!["GET", "POST", "PUT", "DELETE", "OPTIONS"])
            .allowed_headers(vec![
                actix_web::http::header::AUTHORIZATION,
                actix_web::http::header::CONTENT_TYPE,
                actix_web::http::header::ACCEPT,
            ])
            .supports_credentials()
            .max_age(3600);

        // Generate OpenAPI specification
        let openapi = api::swagger::ApiDoc::openapi();

        App::new()
            .app_data(store_data.clone())
            .wrap(cors)
            .wrap(middleware::SecurityHeaders)
            .wrap(Logger::default())
            // Swagger UI
            .service(
                SwaggerUi::new("/swagger-ui/{_:.*}").url("/api-docs/openapi.json", openapi.clone()),
            )
            // Health check
            .route("/health", web::get().to(api::health::health_check))
            // Auth endpoints (public)
            .service(
                web::scope("/api/auth")
                    .route("/login", web::post().to(api::auth::login))
                    .route("/register", web::post().to(api::auth::register)),
            )
            // Club self-service - requires JWT
            .service(
                web::scope("/api/club")
                    .wrap(middleware::AuthMiddleware)
                    .route("/add-member", web::post().to(api::club::add_member))
                    .route("/remove-member", web::post().to(api::club::remove_member))
                    .route("/add-event", web::post().to(api::club::add_event))
                    .route("/edit-event", web::post().to(api::club::edit_event))
                    .route("/delete-event", web::post().to(api::club::delete_event))
                    .route(
                        "/budget-requests",
                        web::post().to(api::club::submit_budget_request),
                    )
                    .route(
                        "/budget-requests",
                        web::get().to(api::club::list_budget_requests),
                    )
                    .route("/reports", web::get().to(api::club::list_reports))
                    .route("/reports", web::post().to(api::club::create_report))
                    .route("/reports", web::delete().to(api::club::delete_report)),
            )
            // Dashboards - requires JWT
            .service(
                web::scope("/api/dashboard")
                    .wrap(middleware::AuthMiddleware)
                    .route("/club", web::get().to(api::dashboard::club_dashboard))
                    .route(
                        "/director",
                        web::get().to(api::dashboard::director_dashboard),
                    ),
            )
            // Director workflows - requires JWT
            .service(
                web::scope("/api/director")
                    .wrap(middleware::AuthMiddleware)
                    .route("/approve-club", web::post().to(api::director::approve_club))
                    .route("/reject-club", web::post().to(api::director::reject_club))
                    .route(
                        "/update-event-status",
                        web::post().to(api::director::update_event_status),
                    )
                    .route(
                        "/update-budget-request",
                        web::post().to(api::director::update_budget_request),
                    )
                    .route("/reports", web::get().to(api::director::reports)),
            )
            // Development helpers (disabled in production)
            .service(
                web::scope("/api/dev")
                    .route("/db-status", web::get().to(api::dev::db_status))
                    .route("/reset", web::post().to(api::dev::reset)),
            )
    })
    .bind(format!("{}:{}", host, port))?
    .run()
    .await
}
