pub mod auth;
pub mod client;
pub mod dashboard;
pub mod message;
pub mod report;
