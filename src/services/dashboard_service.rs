use crate::database::DataStore;
use crate::models::budget_request::{BudgetRequest, BUDGET_STATUS_PENDING};
use crate::models::club::{
    is_pending_event_status, DEFAULT_CLUB_COLOR, EVENT_STATUS_APPROVED, EVENT_STATUS_PENDING,
};
use crate::services::auth_service::Claims;
use crate::services::budget_service::{budget_request_view, BudgetRequestView};
use crate::services::club_service;
use crate::utils::docs::{
    bool_field, doc_array_field, iso_field, opt_str_field, str_field, string_array_field,
};
use crate::utils::ident::doc_id_string;
use crate::utils::AppError;
use chrono::DateTime;
use mongodb::bson::{doc, from_document, Document};
use serde::Serialize;

pub const TOTAL_ANNUAL_BUDGET: f64 = 1_000_000.0;
pub const RUPEE_SYMBOL: &str = "₹";

#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
pub struct EventView {
    pub id: String,
    pub title: String,
    pub date: String,
    pub description: String,
    pub status: String,
    #[serde(rename = "createdAt")]
    pub created_at: Option<String>,
    pub color: String,
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct MemberView {
    pub name: String,
    pub designation: String,
    #[serde(rename = "addedAt")]
    pub added_at: Option<String>,
}

/// Club as served to the director: embedded events plus counts, no
/// member roster.
#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct ClubView {
    pub id: String,
    pub name: String,
    pub head: String,
    pub description: String,
    pub email: String,
    pub approved: bool,
    pub color: String,
    pub contact_links: Vec<String>,
    #[serde(rename = "createdAt")]
    pub created_at: Option<String>,
    #[serde(rename = "approvedAt")]
    pub approved_at: Option<String>,
    #[serde(rename = "membersCount")]
    pub members_count: usize,
    #[serde(rename = "eventsCount")]
    pub events_count: usize,
    pub events: Vec<EventView>,
}

/// Club as served to itself: full member roster instead of counts.
#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct ClubProfile {
    pub id: String,
    pub name: String,
    pub head: String,
    pub description: String,
    pub email: String,
    pub approved: bool,
    pub color: Option<String>,
    pub contact_links: Vec<String>,
    #[serde(rename = "createdAt")]
    pub created_at: Option<String>,
    #[serde(rename = "approvedAt")]
    pub approved_at: Option<String>,
    pub members: Vec<MemberView>,
    pub events: Vec<EventView>,
}

#[derive(Debug, Default, Serialize, utoipa::ToSchema)]
pub struct BudgetStats {
    pub approved_count: usize,
    pub pending_count: usize,
    pub rejected_count: usize,
    pub approved_total: f64,
    pub pending_total: f64,
    pub rejected_total: f64,
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct ClubDashboardResponse {
    pub club: ClubProfile,
    #[serde(rename = "budgetStats")]
    pub budget_stats: BudgetStats,
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct CalendarEventView {
    #[serde(flatten)]
    pub event: EventView,
    #[serde(rename = "clubId")]
    pub club_id: String,
    #[serde(rename = "clubName")]
    pub club_name: String,
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct Notification {
    #[serde(rename = "type")]
    pub kind: String,
    pub message: String,
    pub timestamp: Option<String>,
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct DirectorStats {
    #[serde(rename = "totalClubs")]
    pub total_clubs: usize,
    #[serde(rename = "remainingBudget")]
    pub remaining_budget: f64,
    #[serde(rename = "totalBudget")]
    pub total_budget: f64,
    #[serde(rename = "usedBudget")]
    pub used_budget: f64,
    #[serde(rename = "scheduledEvents")]
    pub scheduled_events: usize,
    #[serde(rename = "pendingApprovals")]
    pub pending_approvals: usize,
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct DirectorDashboardResponse {
    pub clubs: Vec<ClubView>,
    #[serde(rename = "pendingClubs")]
    pub pending_clubs: Vec<ClubView>,
    #[serde(rename = "budgetRequests")]
    pub budget_requests: Vec<BudgetRequestView>,
    #[serde(rename = "budgetRequestsAll")]
    pub budget_requests_all: Vec<BudgetRequestView>,
    #[serde(rename = "calendarEvents")]
    pub calendar_events: Vec<CalendarEventView>,
    pub notifications: Vec<Notification>,
    pub stats: DirectorStats,
}

/// Events embedded in a club document carry no id of their own; views
/// synthesize one from the club id and array position.
pub fn event_views(club: &Document) -> Vec<EventView> {
    let club_id = doc_id_string(club);
    let color = opt_str_field(club, "color").unwrap_or_else(|| DEFAULT_CLUB_COLOR.to_string());

    doc_array_field(club, "events")
        .iter()
        .enumerate()
        .map(|(index, event)| EventView {
            id: format!("{}-{}", club_id, index),
            title: str_field(event, "title"),
            date: str_field(event, "date"),
            description: str_field(event, "description"),
            status: event
                .get_str("status")
                .unwrap_or(EVENT_STATUS_PENDING)
                .to_string(),
            created_at: iso_field(event, "createdAt"),
            color: color.clone(),
        })
        .collect()
}

fn club_view(club: &Document) -> ClubView {
    ClubView {
        id: doc_id_string(club),
        name: str_field(club, "name"),
        head: str_field(club, "head"),
        description: str_field(club, "description"),
        email: str_field(club, "email"),
        approved: bool_field(club, "approved"),
        color: opt_str_field(club, "color").unwrap_or_else(|| DEFAULT_CLUB_COLOR.to_string()),
        contact_links: string_array_field(club, "contact_links"),
        created_at: iso_field(club, "createdAt"),
        approved_at: iso_field(club, "approvedAt"),
        members_count: doc_array_field(club, "members").len(),
        events_count: doc_array_field(club, "events").len(),
        events: event_views(club),
    }
}

fn club_profile(club: &Document) -> ClubProfile {
    let members = doc_array_field(club, "members")
        .iter()
        .map(|member| MemberView {
            name: str_field(member, "name"),
            designation: str_field(member, "designation"),
            added_at: iso_field(member, "addedAt"),
        })
        .collect();

    ClubProfile {
        id: doc_id_string(club),
        name: str_field(club, "name"),
        head: str_field(club, "head"),
        description: str_field(club, "description"),
        email: str_field(club, "email"),
        approved: bool_field(club, "approved"),
        color: opt_str_field(club, "color"),
        contact_links: string_array_field(club, "contact_links"),
        created_at: iso_field(club, "createdAt"),
        approved_at: iso_field(club, "approvedAt"),
        members,
        events: event_views(club),
    }
}

/// "50000" -> "50,000"; fractional paise kept to two places.
pub fn format_amount(amount: f64) -> String {
    let negative = amount < 0.0;
    let abs = amount.abs();
    let whole = abs.trunc() as u64;
    let digits = whole.to_string();

    let mut grouped = String::new();
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }

    let fraction = abs.fract();
    if fraction > f64::EPSILON {
        // `{:.2}` prints a leading "0." we do not want after the groups
        let frac = format!("{:.2}", fraction);
        grouped.push_str(frac.trim_start_matches('0'));
    }
    if negative {
        format!("-{}", grouped)
    } else {
        grouped
    }
}

fn sort_key(timestamp: &Option<String>) -> i64 {
    timestamp
        .as_deref()
        .and_then(|t| DateTime::parse_from_rfc3339(t).ok())
        .map(|dt| dt.timestamp_millis())
        .unwrap_or(0)
}

pub async fn club_dashboard(
    store: &DataStore,
    claims: &Claims,
) -> Result<ClubDashboardResponse, AppError> {
    let club = club_service::find_club(store, claims).await?;
    let canonical = doc_id_string(&club);
    let raw = claims.club_id.clone().unwrap_or_else(|| canonical.clone());

    let rows = store
        .find(
            "budget_requests",
            doc! { "$or": [ { "club_id": &canonical }, { "club_id": &raw } ] },
        )
        .await?;

    let mut stats = BudgetStats::default();
    for row in &rows {
        let request: BudgetRequest =
            from_document(row.clone()).map_err(|e| AppError::Database(e.to_string()))?;
        match request.status.as_str() {
            "approved" => {
                stats.approved_count += 1;
                stats.approved_total += request.final_budget.unwrap_or(0.0);
            }
            "pending" => {
                stats.pending_count += 1;
                stats.pending_total += request.expected_budget;
            }
            "rejected" => {
                stats.rejected_count += 1;
                stats.rejected_total += request.expected_budget;
            }
            _ => {}
        }
    }

    Ok(ClubDashboardResponse {
        club: club_profile(&club),
        budget_stats: stats,
    })
}

pub async fn director_dashboard(store: &DataStore) -> Result<DirectorDashboardResponse, AppError> {
    let approved_raw = store.find("clubs", doc! { "approved": true }).await?;
    let pending_raw = store.find("clubs", doc! { "approved": false }).await?;
    let pending_budget_raw = store
        .find("budget_requests", doc! { "status": BUDGET_STATUS_PENDING })
        .await?;
    let all_budget_raw = store.find("budget_requests", doc! {}).await?;

    log::info!(
        "📊 Director dashboard: {} approved clubs, {} pending clubs, {} open budget requests",
        approved_raw.len(),
        pending_raw.len(),
        pending_budget_raw.len()
    );

    let clubs: Vec<ClubView> = approved_raw.iter().map(club_view).collect();
    let pending_clubs: Vec<ClubView> = pending_raw.iter().map(club_view).collect();

    let budget_requests = pending_budget_raw
        .iter()
        .map(budget_request_view)
        .collect::<Result<Vec<_>, _>>()?;
    let budget_requests_all = all_budget_raw
        .iter()
        .map(budget_request_view)
        .collect::<Result<Vec<_>, _>>()?;

    let used_budget: f64 = all_budget_raw
        .iter()
        .filter_map(|row| from_document::<BudgetRequest>(row.clone()).ok())
        .filter(BudgetRequest::counts_as_spent)
        .map(|request| request.effective_budget())
        .sum();
    let remaining_budget = (TOTAL_ANNUAL_BUDGET - used_budget).max(0.0);

    let scheduled_events = clubs
        .iter()
        .flat_map(|club| &club.events)
        .filter(|event| event.status == EVENT_STATUS_APPROVED)
        .count();

    let calendar_events: Vec<CalendarEventView> = clubs
        .iter()
        .flat_map(|club| {
            club.events.iter().map(|event| CalendarEventView {
                event: event.clone(),
                club_id: club.id.clone(),
                club_name: club.name.clone(),
            })
        })
        .collect();

    let mut notifications: Vec<Notification> = Vec::new();
    for club in &pending_clubs {
        notifications.push(Notification {
            kind: "club-approval".to_string(),
            message: format!("{} is waiting for approval", club.name),
            timestamp: club.created_at.clone(),
        });
    }
    for club in &clubs {
        for event in club.events.iter().filter(|e| is_pending_event_status(&e.status)) {
            notifications.push(Notification {
                kind: "event-approval".to_string(),
                message: format!("{} from {} is pending approval", event.title, club.name),
                timestamp: event.created_at.clone(),
            });
        }
    }
    for request in &budget_requests {
        notifications.push(Notification {
            kind: "budget-request".to_string(),
            message: format!(
                "{} submitted a budget request of {}{}",
                request.event_name,
                RUPEE_SYMBOL,
                format_amount(request.expected_budget)
            ),
            timestamp: request.created_at.clone(),
        });
    }
    notifications.sort_by_key(|n| std::cmp::Reverse(sort_key(&n.timestamp)));

    let pending_events = clubs
        .iter()
        .flat_map(|club| &club.events)
        .filter(|event| is_pending_event_status(&event.status))
        .count();

    let stats = DirectorStats {
        total_clubs: clubs.len(),
        remaining_budget,
        total_budget: TOTAL_ANNUAL_BUDGET,
        used_budget,
        scheduled_events,
        pending_approvals: pending_clubs.len() + budget_requests.len() + pending_events,
    };

    Ok(DirectorDashboardResponse {
        clubs,
        pending_clubs,
        budget_requests,
        budget_requests_all,
        calendar_events,
        notifications,
        stats,
    })
}
