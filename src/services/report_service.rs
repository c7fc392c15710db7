use crate::database::DataStore;
use crate::models::report::{Report, ALLOWED_REPORT_MIMES};
use crate::services::auth_service::Claims;
use crate::services::club_service;
use crate::utils::docs::{iso_from_bson, opt_str_field, str_field};
use crate::utils::ident::{doc_id_string, id_filter_candidates};
use crate::utils::AppError;
use mongodb::bson::{doc, from_document, DateTime as BsonDateTime, Document};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct CreateReportRequest {
    #[serde(default)]
    pub title: Option<String>,
    pub original_name: String,
    pub mime: String,
    #[serde(default)]
    pub size: Option<i64>,
    pub url: String,
}

#[derive(Debug, Deserialize)]
pub struct DeleteReportRequest {
    #[serde(default, alias = "reportId")]
    pub id: Option<String>,
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct ReportView {
    pub id: String,
    pub club_id: String,
    pub title: String,
    pub original_name: String,
    pub mime: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<i64>,
    pub url: String,
    #[serde(rename = "uploadedAt")]
    pub uploaded_at: Option<String>,
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct ClubRef {
    pub id: String,
    pub name: String,
    pub color: String,
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct DirectorReportsResponse {
    pub clubs: Vec<ClubRef>,
    #[serde(rename = "reportsByClub")]
    pub reports_by_club: HashMap<String, Vec<ReportView>>,
}

/// Strip anything that could smuggle path separators or spaces.
pub fn sanitize_file_name(name: &str) -> String {
    name.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') {
                c
            } else {
                '_'
            }
        })
        .collect()
}

fn report_view(row: &Document) -> Result<ReportView, AppError> {
    // Older rows used `createdAt` and may miss `title`
    let uploaded_at =
        iso_from_bson(row.get("uploadedAt")).or_else(|| iso_from_bson(row.get("createdAt")));
    let report: Report =
        from_document(row.clone()).map_err(|e| AppError::Database(e.to_string()))?;

    let title = if report.title.is_empty() {
        report.original_name.clone()
    } else {
        report.title.clone()
    };

    Ok(ReportView {
        id: report.id_string(),
        club_id: report.club_id,
        title,
        original_name: report.original_name,
        mime: report.mime,
        size: report.size,
        url: report.url,
        uploaded_at,
    })
}

/// Filter covering rows written under the canonical club id as well as
/// legacy rows keyed by the raw token id.
fn own_reports_filter(canonical: &str, raw: &str) -> Document {
    doc! { "$or": [ { "club_id": canonical }, { "club_id": raw } ] }
}

pub async fn list_reports(
    store: &DataStore,
    claims: &Claims,
) -> Result<Vec<ReportView>, AppError> {
    let canonical = club_service::canonical_club_id(store, claims).await?;
    let raw = claims.club_id.clone().unwrap_or_else(|| canonical.clone());

    let rows = store
        .find("reports", own_reports_filter(&canonical, &raw))
        .await?;
    rows.iter().map(report_view).collect()
}

pub async fn create_report(
    store: &DataStore,
    claims: &Claims,
    request: &CreateReportRequest,
) -> Result<ReportView, AppError> {
    if !ALLOWED_REPORT_MIMES.contains(&request.mime.as_str()) {
        return Err(AppError::BadRequest("Unsupported file type".to_string()));
    }
    if request.url.is_empty() {
        return Err(AppError::BadRequest("No file provided".to_string()));
    }

    let canonical = club_service::canonical_club_id(store, claims).await?;

    let original_name = sanitize_file_name(&request.original_name);
    let base = original_name
        .rsplit_once('.')
        .map(|(base, _)| base)
        .unwrap_or(original_name.as_str());
    let title = request
        .title
        .as_deref()
        .filter(|t| !t.is_empty())
        .unwrap_or(base);

    let row = doc! {
        "club_id": &canonical,
        "title": title,
        "original_name": &request.original_name,
        "mime": &request.mime,
        "size": request.size,
        "url": &request.url,
        "uploadedAt": BsonDateTime::now(),
    };

    let id = store.insert_one("reports", row.clone()).await?;
    let mut inserted = row;
    inserted.insert("_id", id);
    report_view(&inserted)
}

pub async fn delete_report(
    store: &DataStore,
    claims: &Claims,
    report_id: &str,
) -> Result<(), AppError> {
    if report_id.is_empty() {
        return Err(AppError::BadRequest("Report id is required".to_string()));
    }

    let canonical = club_service::canonical_club_id(store, claims).await?;
    let raw = claims.club_id.clone().unwrap_or_else(|| canonical.clone());

    let candidates = id_filter_candidates(report_id);
    let report = store
        .find_one_any("reports", &candidates)
        .await?
        .ok_or_else(|| AppError::NotFound("Not found".to_string()))?;

    // Ownership check before deleting
    let owner = str_field(&report, "club_id");
    if owner != canonical && owner != raw {
        return Err(AppError::NotFound("Not found".to_string()));
    }

    let deleted = store.delete_one_any("reports", &candidates).await?;
    if deleted == 0 {
        return Err(AppError::Database("report delete failed".to_string()));
    }

    Ok(())
}

/// Director read model: every club plus its report records.
pub async fn director_reports(store: &DataStore) -> Result<DirectorReportsResponse, AppError> {
    let clubs_raw = store.find("clubs", doc! {}).await?;
    let reports_raw = store.find("reports", doc! {}).await?;

    let clubs = clubs_raw
        .iter()
        .map(|club| ClubRef {
            id: doc_id_string(club),
            name: str_field(club, "name"),
            color: opt_str_field(club, "color").unwrap_or_else(|| "#ffffff".to_string()),
        })
        .collect();

    let mut reports_by_club: HashMap<String, Vec<ReportView>> = HashMap::new();
    for row in &reports_raw {
        let view = report_view(row)?;
        reports_by_club
            .entry(view.club_id.clone())
            .or_default()
            .push(view);
    }

    Ok(DirectorReportsResponse {
        clubs,
        reports_by_club,
    })
}
