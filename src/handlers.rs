pub mod auth;
pub mod clients;
pub mod dashboard;
pub mod messages;
pub mod reports;
