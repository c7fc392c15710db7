use mongodb::bson::{Bson, DateTime};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::utils::ident::bson_id_string;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Director,
    Club,
    Faculty,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Director => "director",
            Role::Club => "club",
            Role::Faculty => "faculty",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct User {
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Bson>,
    pub email: String,
    pub password: String,
    pub role: Role,
    #[serde(rename = "clubId", default, skip_serializing_if = "Option::is_none")]
    pub club_id: Option<String>,
    #[serde(rename = "createdAt", default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime>,
}

impl User {
    pub fn id_string(&self) -> String {
        self.id.as_ref().map(bson_id_string).unwrap_or_default()
    }
}
