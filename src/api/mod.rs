pub mod auth;
pub mod club;
pub mod dashboard;
pub mod dev;
pub mod director;
pub mod health;
pub mod swagger;
