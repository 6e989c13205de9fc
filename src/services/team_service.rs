// src/services/team_service.rs

use std::collections::{HashMap, HashSet};

use chrono::Utc;
use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::error::AppError,
    db::{TeamRepository, UserRepository, team_repo::NewTeamMember},
    models::{
        auth::Role,
        team::{
            ActivityType, CreateTeamMemberPayload, TeamMemberActivity, TeamMemberRecord,
            UpdateTeamMemberPayload,
        },
    },
    scope::{Actor, EntityKind, Field, ListFilters, Predicate, resolve},
    services::user_service::{UserDraft, UserService},
};

/// Confere se `manager_id` pode gerenciar `member_id` sem formar ciclo.
///
/// `links` mapeia cada membro do tenant ao seu gerente atual. A subida pela
/// cadeia para em ciclos já existentes no banco.
pub fn check_manager_assignment(
    links: &HashMap<Uuid, Option<Uuid>>,
    member_id: Uuid,
    manager_id: Uuid,
) -> Result<(), AppError> {
    let mut visited = HashSet::new();
    let mut cursor = Some(manager_id);

    while let Some(current) = cursor {
        if current == member_id {
            return Err(AppError::HierarchyCycle);
        }
        if !visited.insert(current) {
            break;
        }
        cursor = links.get(&current).copied().flatten();
    }
    Ok(())
}

fn employee_id() -> String {
    let id = Uuid::new_v4().simple().to_string().to_uppercase();
    format!("EMP{}", &id[..8])
}

#[derive(Clone)]
pub struct TeamService {
    pool: PgPool,
    team_repo: TeamRepository,
    user_repo: UserRepository,
    user_service: UserService,
}

impl TeamService {
    pub fn new(
        pool: PgPool,
        team_repo: TeamRepository,
        user_repo: UserRepository,
        user_service: UserService,
    ) -> Self {
        Self {
            pool,
            team_repo,
            user_repo,
            user_service,
        }
    }

    pub async fn list(
        &self,
        actor: &Actor,
        filters: &ListFilters,
    ) -> Result<Vec<TeamMemberRecord>, AppError> {
        let predicate = filters.scoped(actor, EntityKind::TeamMember);
        if predicate.is_nothing() {
            return Ok(Vec::new());
        }
        self.team_repo.list_scoped(&self.pool, &predicate).await
    }

    /// Busca por nome, e-mail, usuário ou papel dentro do que o ator enxerga.
    pub async fn search(&self, actor: &Actor, term: &str) -> Result<Vec<TeamMemberRecord>, AppError> {
        if term.trim().is_empty() {
            return Err(AppError::BadRequest("Informe o termo de busca.".into()));
        }
        self.list(actor, &ListFilters::search(term)).await
    }

    pub async fn get(&self, actor: &Actor, id: Uuid) -> Result<TeamMemberRecord, AppError> {
        self.team_repo
            .find_visible(&self.pool, &resolve(actor, EntityKind::TeamMember), id)
            .await?
            .ok_or(AppError::NotFound)
    }

    /// Histórico do membro, mais recente primeiro.
    pub async fn activities(
        &self,
        actor: &Actor,
        id: Uuid,
    ) -> Result<Vec<TeamMemberActivity>, AppError> {
        let member = self.get(actor, id).await?;
        self.team_repo
            .list_activities(&self.pool, member.member.id)
            .await
    }

    pub async fn create(
        &self,
        actor: &Actor,
        payload: &CreateTeamMemberPayload,
    ) -> Result<TeamMemberRecord, AppError> {
        payload.validate()?;

        let mut tx = self.pool.begin().await?;

        let draft = UserDraft {
            role: payload.role,
            tenant_id: payload.tenant_id,
            store_id: payload.store_id,
            username: payload.username.trim(),
            email: payload.email.trim(),
            first_name: payload.first_name.trim(),
            last_name: payload.last_name.trim(),
            phone: payload.phone.as_deref(),
        };
        let user = self.user_service.insert_user(&mut *tx, actor, &draft).await?;
        let tenant_id = user.tenant_id.ok_or_else(|| {
            AppError::BadRequest("Membros da equipe precisam pertencer a um tenant.".into())
        })?;

        let manager_id = match payload.manager_id {
            Some(manager_id) => {
                if !self
                    .team_repo
                    .exists_in_tenant(&mut *tx, tenant_id, manager_id)
                    .await?
                {
                    return Err(AppError::MissingReference { field: "managerId" });
                }
                Some(manager_id)
            }
            // Gerente que cadastra vira o gerente do novo membro.
            None if actor.has_role(Role::Manager) => self
                .team_repo
                .find_by_user(&mut *tx, actor.user_id)
                .await?
                .map(|m| m.id),
            None => None,
        };

        let employee_id = employee_id();
        let member = self
            .team_repo
            .create(
                &mut *tx,
                &NewTeamMember {
                    tenant_id,
                    user_id: user.id,
                    manager_id,
                    employee_id: &employee_id,
                    department: payload.department.as_deref(),
                    position: payload.position.as_deref(),
                    hire_date: payload.hire_date.unwrap_or_else(|| Utc::now().date_naive()),
                    sales_target: payload.sales_target,
                    notes: payload.notes.as_deref(),
                },
            )
            .await?;

        self.team_repo
            .log_activity(
                &mut *tx,
                member.id,
                ActivityType::TaskCompleted,
                &format!("Membro {} adicionado à equipe", user.full_name()),
            )
            .await?;

        let record = self.reload(&mut tx, tenant_id, member.id).await?;
        tx.commit().await?;

        tracing::info!(member_id = %member.id, "Membro da equipe criado");
        Ok(record)
    }

    pub async fn update(
        &self,
        actor: &Actor,
        id: Uuid,
        changes: &UpdateTeamMemberPayload,
    ) -> Result<TeamMemberRecord, AppError> {
        changes.validate()?;

        let mut tx = self.pool.begin().await?;

        let current = self
            .team_repo
            .find_visible(&mut *tx, &resolve(actor, EntityKind::TeamMember), id)
            .await?
            .ok_or(AppError::NotFound)?;

        if let Some(Some(manager_id)) = changes.manager_id {
            let tenant_id = current.member.tenant_id;
            // Duas trocas cruzadas (a -> b, b -> a) não podem ler o mesmo mapa.
            self.team_repo.lock_hierarchy(&mut *tx, tenant_id).await?;
            let links = self.team_repo.manager_links(&mut *tx, tenant_id).await?;
            if !links.contains_key(&manager_id) {
                return Err(AppError::MissingReference { field: "managerId" });
            }
            check_manager_assignment(&links, id, manager_id)?;
        }

        let member = self.team_repo.update(&mut *tx, id, changes).await?;
        self.team_repo
            .log_activity(
                &mut *tx,
                member.id,
                ActivityType::TaskCompleted,
                &format!("Perfil do membro {} atualizado", current.user_name),
            )
            .await?;

        let record = self.reload(&mut tx, member.tenant_id, id).await?;
        tx.commit().await?;

        Ok(record)
    }

    // Relê o registro completo dentro da transação, só pelo tenant: depois de
    // uma troca de gerente ele pode sair do escopo de quem editou.
    async fn reload(
        &self,
        tx: &mut Transaction<'static, Postgres>,
        tenant_id: Uuid,
        id: Uuid,
    ) -> Result<TeamMemberRecord, AppError> {
        self.team_repo
            .find_visible(&mut **tx, &Predicate::eq(Field::Tenant, tenant_id), id)
            .await?
            .ok_or(AppError::NotFound)
    }

    /// Remove o membro junto com o usuário.
    pub async fn delete(&self, actor: &Actor, id: Uuid) -> Result<(), AppError> {
        let mut tx = self.pool.begin().await?;

        let member = self
            .team_repo
            .find_visible(&mut *tx, &resolve(actor, EntityKind::TeamMember), id)
            .await?
            .ok_or(AppError::NotFound)?;

        if member.member.user_id == actor.user_id {
            return Err(AppError::BadRequest(
                "Você não pode remover o próprio cadastro.".into(),
            ));
        }

        self.user_repo.delete_user(&mut *tx, member.member.user_id).await?;
        tx.commit().await?;

        tracing::info!(member_id = %id, removed_by = %actor.user_id, "Membro da equipe removido");
        Ok(())
    }
}
