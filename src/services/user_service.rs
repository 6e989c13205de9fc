// src/services/user_service.rs

use sqlx::{PgConnection, PgPool};
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::error::AppError,
    db::{TenantRepository, UserRepository, user_repo::NewUser},
    models::auth::{CreateUserPayload, Role, UpdateUserPayload, User, UserRecord},
    scope::{Actor, EntityKind, ListFilters, Predicate, resolve},
};

/// Dados de um usuário a criar, vindos de qualquer payload de cadastro.
#[derive(Debug, Clone)]
pub struct UserDraft<'a> {
    pub role: Role,
    pub tenant_id: Option<Uuid>,
    pub store_id: Option<Uuid>,
    pub username: &'a str,
    pub email: &'a str,
    pub first_name: &'a str,
    pub last_name: &'a str,
    pub phone: Option<&'a str>,
}

impl<'a> From<&'a CreateUserPayload> for UserDraft<'a> {
    fn from(payload: &'a CreateUserPayload) -> Self {
        Self {
            role: payload.role,
            tenant_id: payload.tenant_id,
            store_id: payload.store_id,
            username: payload.username.trim(),
            email: payload.email.trim(),
            first_name: payload.first_name.trim(),
            last_name: payload.last_name.trim(),
            phone: payload.phone.as_deref(),
        }
    }
}

/// Tenant em que `actor` pode criar um usuário com `role`.
///
/// Administradores da plataforma escolhem o tenant (e só eles criam outros
/// administradores da plataforma, que podem ficar sem tenant). Administradores
/// do negócio e gerentes criam sempre no próprio tenant.
pub fn creation_tenant(
    actor: &Actor,
    role: Role,
    requested: Option<Uuid>,
) -> Result<Option<Uuid>, AppError> {
    match actor.role {
        Some(Role::PlatformAdmin) => {
            if role == Role::PlatformAdmin {
                Ok(requested)
            } else {
                requested
                    .map(Some)
                    .ok_or(AppError::MissingReference { field: "tenantId" })
            }
        }
        Some(Role::BusinessAdmin) if role != Role::PlatformAdmin => own_tenant(actor),
        Some(Role::Manager) if role.manager_can_create() => own_tenant(actor),
        Some(Role::Manager) => Err(AppError::Forbidden(
            "Gerentes só podem cadastrar vendedores internos, marketing ou televendas.".into(),
        )),
        _ => Err(AppError::Forbidden(
            "Você não pode cadastrar usuários com este papel.".into(),
        )),
    }
}

/// Confere se `actor` pode passar `target` para `role`. Ninguém troca o
/// próprio papel; para os demais valem as mesmas regras do cadastro.
pub fn check_role_change(actor: &Actor, target: &User, role: Role) -> Result<(), AppError> {
    if target.role == Some(role) {
        return Ok(());
    }
    if target.id == actor.user_id {
        return Err(AppError::Forbidden(
            "Você não pode alterar o próprio papel.".into(),
        ));
    }
    creation_tenant(actor, role, target.tenant_id).map(|_| ())
}

fn own_tenant(actor: &Actor) -> Result<Option<Uuid>, AppError> {
    actor
        .tenant_id
        .map(Some)
        .ok_or_else(|| AppError::Forbidden("Usuário sem tenant associado.".into()))
}

#[derive(Clone)]
pub struct UserService {
    pool: PgPool,
    user_repo: UserRepository,
    tenant_repo: TenantRepository,
}

impl UserService {
    pub fn new(pool: PgPool, user_repo: UserRepository, tenant_repo: TenantRepository) -> Self {
        Self {
            pool,
            user_repo,
            tenant_repo,
        }
    }

    pub async fn list(&self, actor: &Actor, filters: &ListFilters) -> Result<Vec<UserRecord>, AppError> {
        let predicate = filters.scoped(actor, EntityKind::User);
        if predicate.is_nothing() {
            return Ok(Vec::new());
        }
        self.user_repo.list_scoped(&self.pool, &predicate).await
    }

    pub async fn get(&self, actor: &Actor, id: Uuid) -> Result<UserRecord, AppError> {
        self.user_repo
            .find_visible(&self.pool, &resolve(actor, EntityKind::User), id)
            .await?
            .ok_or(AppError::NotFound)
    }

    pub async fn update(
        &self,
        actor: &Actor,
        id: Uuid,
        changes: &UpdateUserPayload,
    ) -> Result<UserRecord, AppError> {
        changes.validate()?;

        let mut tx = self.pool.begin().await?;

        let current = self
            .user_repo
            .find_visible(&mut *tx, &resolve(actor, EntityKind::User), id)
            .await?
            .ok_or(AppError::NotFound)?;

        if let Some(role) = changes.role {
            check_role_change(actor, &current.user, role)?;
        }
        if let Some(Some(store)) = changes.store_id {
            let tenant = current
                .user
                .tenant_id
                .ok_or(AppError::MissingReference { field: "storeId" })?;
            self.tenant_repo
                .find_store_in_tenant(&mut *tx, tenant, store)
                .await?
                .ok_or(AppError::MissingReference { field: "storeId" })?;
        }

        self.user_repo.update_user(&mut *tx, id, changes).await?;
        let record = self
            .user_repo
            .find_visible(&mut *tx, &Predicate::All, id)
            .await?
            .ok_or(AppError::NotFound)?;
        tx.commit().await?;

        tracing::info!(user_id = %id, updated_by = %actor.user_id, "Usuário atualizado");
        Ok(record)
    }

    /// Remove o usuário; o cadastro de equipe sai junto.
    pub async fn delete(&self, actor: &Actor, id: Uuid) -> Result<(), AppError> {
        if id == actor.user_id {
            return Err(AppError::BadRequest(
                "Você não pode remover o próprio cadastro.".into(),
            ));
        }

        let mut tx = self.pool.begin().await?;
        self.user_repo
            .find_visible(&mut *tx, &resolve(actor, EntityKind::User), id)
            .await?
            .ok_or(AppError::NotFound)?;
        self.user_repo.delete_user(&mut *tx, id).await?;
        tx.commit().await?;

        tracing::info!(user_id = %id, removed_by = %actor.user_id, "Usuário removido");
        Ok(())
    }

    pub async fn create(&self, actor: &Actor, payload: &CreateUserPayload) -> Result<User, AppError> {
        payload.validate()?;

        let mut tx = self.pool.begin().await?;
        let user = self
            .insert_user(&mut *tx, actor, &UserDraft::from(payload))
            .await?;
        tx.commit().await?;

        tracing::info!(
            user_id = %user.id,
            created_by = %actor.user_id,
            "Usuário '{}' criado",
            user.username
        );
        Ok(user)
    }

    /// Aplica as regras de papel, tenant e loja e insere o usuário na conexão
    /// (ou transação) recebida.
    pub(crate) async fn insert_user(
        &self,
        conn: &mut PgConnection,
        actor: &Actor,
        draft: &UserDraft<'_>,
    ) -> Result<User, AppError> {
        let tenant_id = creation_tenant(actor, draft.role, draft.tenant_id)?;

        if let (Some(tenant), true) = (tenant_id, actor.is_platform_admin()) {
            self.tenant_repo
                .find_tenant(&mut *conn, tenant)
                .await?
                .ok_or(AppError::MissingReference { field: "tenantId" })?;
        }

        // Gerente cadastra na própria loja, salvo indicação em contrário.
        let store_id = match (draft.store_id, actor.role) {
            (Some(store), _) => Some(store),
            (None, Some(Role::Manager)) => actor.store_id,
            (None, _) => None,
        };
        if let Some(store) = store_id {
            let tenant = tenant_id.ok_or(AppError::MissingReference { field: "storeId" })?;
            self.tenant_repo
                .find_store_in_tenant(&mut *conn, tenant, store)
                .await?
                .ok_or(AppError::MissingReference { field: "storeId" })?;
        }

        let new_user = NewUser {
            tenant_id,
            store_id,
            role: draft.role,
            username: draft.username,
            email: draft.email,
            first_name: draft.first_name,
            last_name: draft.last_name,
            phone: draft.phone,
        };
        self.user_repo.create_user(&mut *conn, &new_user).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn actor(role: Role, tenant: Option<Uuid>) -> Actor {
        Actor {
            user_id: Uuid::new_v4(),
            role: Some(role),
            tenant_id: tenant,
            store_id: None,
        }
    }

    #[test]
    fn business_admin_creates_in_own_tenant_only() {
        let tenant = Uuid::new_v4();
        let admin = actor(Role::BusinessAdmin, Some(tenant));
        let requested = Some(Uuid::new_v4());

        assert_eq!(
            creation_tenant(&admin, Role::Manager, requested).expect("allowed"),
            Some(tenant)
        );
        assert!(matches!(
            creation_tenant(&admin, Role::PlatformAdmin, None),
            Err(AppError::Forbidden(_))
        ));
    }

    #[test]
    fn manager_is_limited_to_front_line_roles() {
        let tenant = Uuid::new_v4();
        let manager = actor(Role::Manager, Some(tenant));

        assert_eq!(
            creation_tenant(&manager, Role::TeleCalling, None).expect("allowed"),
            Some(tenant)
        );
        assert!(matches!(
            creation_tenant(&manager, Role::Manager, None),
            Err(AppError::Forbidden(_))
        ));
        assert!(matches!(
            creation_tenant(&manager, Role::BusinessAdmin, None),
            Err(AppError::Forbidden(_))
        ));
    }

    #[test]
    fn platform_admin_must_name_a_tenant_for_tenant_roles() {
        let admin = actor(Role::PlatformAdmin, None);
        let tenant = Uuid::new_v4();

        assert_eq!(
            creation_tenant(&admin, Role::InhouseSales, Some(tenant)).expect("allowed"),
            Some(tenant)
        );
        assert!(matches!(
            creation_tenant(&admin, Role::InhouseSales, None),
            Err(AppError::MissingReference { field: "tenantId" })
        ));
        assert_eq!(
            creation_tenant(&admin, Role::PlatformAdmin, None).expect("allowed"),
            None
        );
    }

    #[test]
    fn front_line_roles_cannot_create_users() {
        let tenant = Some(Uuid::new_v4());
        for role in [Role::InhouseSales, Role::TeleCalling, Role::Marketing] {
            assert!(matches!(
                creation_tenant(&actor(role, tenant), Role::Marketing, tenant),
                Err(AppError::Forbidden(_))
            ));
        }
    }

    fn user(id: Uuid, role: Role, tenant: Option<Uuid>) -> User {
        let now = chrono::Utc::now();
        User {
            id,
            tenant_id: tenant,
            store_id: None,
            role: Some(role),
            username: "paula.lima".into(),
            email: "paula@joias.example".into(),
            first_name: "Paula".into(),
            last_name: "Lima".into(),
            phone: None,
            is_active: true,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn nobody_changes_their_own_role() {
        let tenant = Some(Uuid::new_v4());
        let admin = actor(Role::BusinessAdmin, tenant);
        let me = user(admin.user_id, Role::BusinessAdmin, tenant);

        assert!(matches!(
            check_role_change(&admin, &me, Role::Manager),
            Err(AppError::Forbidden(_))
        ));
        // Mesmo papel não é troca.
        assert!(check_role_change(&admin, &me, Role::BusinessAdmin).is_ok());
    }

    #[test]
    fn role_changes_follow_the_creation_rules() {
        let tenant = Some(Uuid::new_v4());
        let manager = actor(Role::Manager, tenant);
        let seller = user(Uuid::new_v4(), Role::InhouseSales, tenant);

        assert!(check_role_change(&manager, &seller, Role::TeleCalling).is_ok());
        assert!(matches!(
            check_role_change(&manager, &seller, Role::Manager),
            Err(AppError::Forbidden(_))
        ));

        let admin = actor(Role::BusinessAdmin, tenant);
        assert!(check_role_change(&admin, &seller, Role::Manager).is_ok());
        assert!(matches!(
            check_role_change(&admin, &seller, Role::PlatformAdmin),
            Err(AppError::Forbidden(_))
        ));
    }
}
