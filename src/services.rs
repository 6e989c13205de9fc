// src/services.rs

pub mod announcement_service;
pub mod auth;
pub mod crm_service;
pub mod dashboard_service;
pub mod inventory_service;
pub mod sales_service;
pub mod team_service;
pub mod user_service;

use uuid::Uuid;

use crate::{common::error::AppError, scope::Actor};

/// Tenant em que o ator grava registros novos.
pub(crate) fn require_tenant(actor: &Actor) -> Result<Uuid, AppError> {
    actor
        .tenant_id
        .ok_or_else(|| AppError::Forbidden("Usuário sem tenant associado.".into()))
}
