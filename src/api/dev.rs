use crate::database::DataStore;
use crate::seeds;
use crate::utils::AppError;
use actix_web::{web, HttpResponse};
use serde::Serialize;

const RESETTABLE_COLLECTIONS: [&str; 4] = ["clubs", "users", "budget_requests", "reports"];

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct DbStatusResponse {
    pub mode: String,
    #[serde(rename = "mongoUriPresent")]
    pub mongo_uri_present: bool,
    #[serde(rename = "dbName")]
    pub db_name: String,
    pub ping: String,
}

fn is_production() -> bool {
    std::env::var("APP_ENV")
        .map(|env| env == "production")
        .unwrap_or(false)
}

#[utoipa::path(
    get,
    path = "/api/dev/db-status",
    tag = "Dev",
    responses(
        (status = 200, description = "Backing store mode and reachability", body = DbStatusResponse),
        (status = 404, description = "Disabled in production")
    )
)]
pub async fn db_status(store: web::Data<DataStore>) -> Result<HttpResponse, AppError> {
    if is_production() {
        return Err(AppError::NotFound("Not found".to_string()));
    }

    let ping = if store.is_mock() {
        "skipped".to_string()
    } else {
        match store.ping().await {
            Ok(()) => "ok".to_string(),
            Err(_) => "failed".to_string(),
        }
    };

    Ok(HttpResponse::Ok().json(DbStatusResponse {
        mode: if store.is_mock() { "mock" } else { "mongo" }.to_string(),
        mongo_uri_present: std::env::var("MONGODB_URI").is_ok(),
        db_name: std::env::var("MONGODB_DB").unwrap_or_else(|_| "clubsync".to_string()),
        ping,
    }))
}

/// Wipe every collection and restore the stock pending club. Mock mode
/// just reseeds in place.
pub async fn reset(store: web::Data<DataStore>) -> Result<HttpResponse, AppError> {
    if is_production() {
        return Err(AppError::NotFound("Not found".to_string()));
    }

    if store.reset_mock() {
        log::info!("🔄 Mock database reset to seed state");
        return Ok(HttpResponse::Ok().json(serde_json::json!({ "mode": "mock", "reset": true })));
    }

    for collection in RESETTABLE_COLLECTIONS {
        store
            .delete_many(collection, mongodb::bson::doc! {})
            .await?;
    }
    store.insert_one("clubs", seeds::stock_club()).await?;

    log::info!("🔄 Database wiped and reseeded");
    Ok(HttpResponse::Ok().json(serde_json::json!({ "mode": "mongo", "reset": true })))
}
