pub mod auth;
pub mod client_service;
pub mod contact_service;
pub mod dashboard_service;
pub mod external_auth;
pub mod inbox_service;
pub mod report_service;
