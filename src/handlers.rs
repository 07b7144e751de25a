pub mod auth;
pub mod notifications;
pub mod rbac;
pub mod relay;
pub mod tenancy;
