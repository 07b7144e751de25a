pub mod auth;
pub mod notifications;
pub mod rbac;
pub mod tenancy;
pub mod trial;
