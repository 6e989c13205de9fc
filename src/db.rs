// src/db.rs

pub mod announcement_repo;
pub mod crm_repo;
pub mod dashboard_repo;
pub mod inventory_repo;
pub mod sales_repo;
pub mod team_repo;
pub mod tenancy_repo;
pub mod user_repo;

pub use announcement_repo::AnnouncementRepository;
pub use crm_repo::CrmRepository;
pub use dashboard_repo::DashboardRepository;
pub use inventory_repo::InventoryRepository;
pub use sales_repo::SalesRepository;
pub use team_repo::TeamRepository;
pub use tenancy_repo::TenantRepository;
pub use user_repo::UserRepository;

/// "Nome Sobrenome" de um alias de `users`, ou NULL se ambos vazios.
pub(crate) fn full_name_sql(alias: &str) -> String {
    format!("NULLIF(TRIM(CONCAT_WS(' ', {alias}.first_name, {alias}.last_name)), '')")
}
