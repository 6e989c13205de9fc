// src/middleware/rbac.rs

use axum::{extract::FromRequestParts, http::request::Parts};
use std::marker::PhantomData;

use crate::{common::error::AppError, models::auth::Role, scope::Actor};

/// 1. O Trait que define quais papéis passam por um portão
pub trait RolePolicy: Send + Sync + 'static {
    const DESCRIPTION: &'static str;

    fn allows(role: Role) -> bool;
}

/// 2. O Extractor (Guardião). Deve vir depois do `auth_guard`.
pub struct RequireRole<P>(PhantomData<P>);

impl<P, S> FromRequestParts<S> for RequireRole<P>
where
    P: RolePolicy,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let actor = parts
            .extensions
            .get::<Actor>()
            .ok_or(AppError::InvalidToken)?;

        match actor.role {
            Some(role) if P::allows(role) => Ok(RequireRole(PhantomData)),
            _ => Err(AppError::Forbidden(format!(
                "Acesso restrito: {}.",
                P::DESCRIPTION
            ))),
        }
    }
}

// ---
// DEFINIÇÃO DAS POLÍTICAS (TIPOS)
// ---

/// Leitura de catálogo: qualquer papel de tenant.
pub struct CatalogReaders;
impl RolePolicy for CatalogReaders {
    const DESCRIPTION: &'static str = "papéis de tenant";

    fn allows(role: Role) -> bool {
        role != Role::PlatformAdmin
    }
}

pub struct CatalogEditors;
impl RolePolicy for CatalogEditors {
    const DESCRIPTION: &'static str = "administradores do negócio e gerentes";

    fn allows(role: Role) -> bool {
        matches!(role, Role::BusinessAdmin | Role::Manager)
    }
}

pub struct UserManagers;
impl RolePolicy for UserManagers {
    const DESCRIPTION: &'static str = "administradores e gerentes";

    fn allows(role: Role) -> bool {
        matches!(
            role,
            Role::PlatformAdmin | Role::BusinessAdmin | Role::Manager
        )
    }
}

/// Exclusão de vendas e negócios do funil.
pub struct Supervisors;
impl RolePolicy for Supervisors {
    const DESCRIPTION: &'static str = "administradores do negócio e gerentes";

    fn allows(role: Role) -> bool {
        matches!(role, Role::BusinessAdmin | Role::Manager)
    }
}

pub struct ManagersOnly;
impl RolePolicy for ManagersOnly {
    const DESCRIPTION: &'static str = "gerentes";

    fn allows(role: Role) -> bool {
        role == Role::Manager
    }
}
