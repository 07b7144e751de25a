pub mod user_repo;
pub use user_repo::UserRepository;
pub mod tenancy_repo;
pub use tenancy_repo::TenantRepository;
pub mod rbac_repo;
pub use rbac_repo::RbacRepository;
pub mod notification_repo;
pub use notification_repo::NotificationRepository;
