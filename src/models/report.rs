use mongodb::bson::{Bson, DateTime};
use serde::{Deserialize, Serialize};

use crate::utils::ident::bson_id_string;

/// MIME types accepted for uploaded reports (pdf, doc, docx).
pub const ALLOWED_REPORT_MIMES: [&str; 3] = [
    "application/pdf",
    "application/msword",
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
];

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Report {
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Bson>,
    pub club_id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub original_name: String,
    #[serde(default)]
    pub mime: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<i64>,
    #[serde(default)]
    pub url: String,
    #[serde(rename = "uploadedAt", default, skip_serializing_if = "Option::is_none")]
    pub uploaded_at: Option<DateTime>,
}

impl Report {
    pub fn id_string(&self) -> String {
        self.id.as_ref().map(bson_id_string).unwrap_or_default()
    }
}
