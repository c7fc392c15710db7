pub mod auth_service;
pub mod budget_service;
pub mod club_service;
pub mod dashboard_service;
pub mod director_service;
pub mod report_service;
