pub mod auth;
pub mod i18n;
pub mod rbac;
pub mod tenancy;
pub mod trial;
