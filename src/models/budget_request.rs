use mongodb::bson::{Bson, DateTime};
use serde::{Deserialize, Serialize};

use crate::utils::ident::bson_id_string;

pub const BUDGET_STATUS_PENDING: &str = "pending";
pub const BUDGET_STATUS_APPROVED: &str = "approved";
pub const BUDGET_STATUS_REJECTED: &str = "rejected";
pub const BUDGET_STATUS_COUNTERED: &str = "countered";

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct BudgetRequest {
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Bson>,
    pub club_id: String,
    pub event_name: String,
    #[serde(default)]
    pub organisers: String,
    pub expected_budget: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub final_budget: Option<f64>,
    pub tentative_month: String,
    #[serde(default)]
    pub description: String,
    pub status: String,
    #[serde(rename = "createdAt", default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime>,
}

impl BudgetRequest {
    pub fn id_string(&self) -> String {
        self.id.as_ref().map(bson_id_string).unwrap_or_default()
    }

    /// Amount that counts against the annual budget: the director's final
    /// figure when set, the asked amount otherwise.
    pub fn effective_budget(&self) -> f64 {
        self.final_budget.unwrap_or(self.expected_budget)
    }

    pub fn counts_as_spent(&self) -> bool {
        self.status == BUDGET_STATUS_APPROVED || self.status == BUDGET_STATUS_COUNTERED
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mongodb::bson::{doc, from_document};

    #[test]
    fn effective_budget_prefers_final() {
        let row = doc! {
            "_id": "mock-1",
            "club_id": "pending-1",
            "event_name": "Annual Fest",
            "expected_budget": 50000,
            "final_budget": 30000.0,
            "tentative_month": "March",
            "status": "countered",
        };
        let request: BudgetRequest = from_document(row).unwrap();
        assert_eq!(request.effective_budget(), 30000.0);
        assert!(request.counts_as_spent());
    }

    #[test]
    fn integer_amounts_deserialize_into_f64() {
        let row = doc! {
            "club_id": "pending-1",
            "event_name": "Workshop",
            "expected_budget": 1200_i32,
            "tentative_month": "July",
            "status": "pending",
        };
        let request: BudgetRequest = from_document(row).unwrap();
        assert_eq!(request.expected_budget, 1200.0);
        assert_eq!(request.effective_budget(), 1200.0);
        assert!(!request.counts_as_spent());
    }
}
