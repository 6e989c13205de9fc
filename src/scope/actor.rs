// src/scope/actor.rs

use uuid::Uuid;

use crate::models::auth::{Role, User};

/// Quem está fazendo a requisição. Construído pelo middleware de autenticação
/// e passado explicitamente para o escopo e para as agregações.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Actor {
    pub user_id: Uuid,
    pub role: Option<Role>,
    pub tenant_id: Option<Uuid>,
    pub store_id: Option<Uuid>,
}

impl Actor {
    pub fn has_role(&self, role: Role) -> bool {
        self.role == Some(role)
    }

    pub fn is_platform_admin(&self) -> bool {
        self.has_role(Role::PlatformAdmin)
    }
}

impl From<&User> for Actor {
    fn from(user: &User) -> Self {
        Self {
            user_id: user.id,
            role: user.role,
            tenant_id: user.tenant_id,
            store_id: user.store_id,
        }
    }
}
