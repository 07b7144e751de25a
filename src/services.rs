pub mod auth;
pub mod messaging_service;
pub mod notification_service;
pub mod permission_service;
pub mod trial_service;
