// src/db/team_repo.rs

use std::collections::HashMap;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use sqlx::{Executor, Postgres};
use uuid::Uuid;

use super::full_name_sql;
use crate::{
    common::error::AppError,
    metrics::team::sales_percentage,
    models::team::{
        ActivityType, TeamMember, TeamMemberActivity, TeamMemberRecord, UpdateTeamMemberPayload,
    },
    scope::{EntityKind, Predicate, scoped_query},
};

const MANAGER_USER_JOIN: &str = "LEFT JOIN users mu ON mu.id = mgr.user_id";

#[derive(Debug, Clone)]
pub struct NewTeamMember<'a> {
    pub tenant_id: Uuid,
    pub user_id: Uuid,
    pub manager_id: Option<Uuid>,
    pub employee_id: &'a str,
    pub department: Option<&'a str>,
    pub position: Option<&'a str>,
    pub hire_date: NaiveDate,
    pub sales_target: Decimal,
    pub notes: Option<&'a str>,
}

#[derive(Clone, Default)]
pub struct TeamRepository;

impl TeamRepository {
    pub fn new() -> Self {
        Self
    }

    fn record_select() -> String {
        format!(
            "tm.*, u.username, COALESCE({user_name}, u.username) AS user_name, \
             u.email AS user_email, u.role AS user_role, st.name AS store_name, \
             {manager_name} AS manager_name, {ownership}",
            user_name = full_name_sql("u"),
            manager_name = full_name_sql("mu"),
            ownership = EntityKind::TeamMember.ownership_columns(),
        )
    }

    fn with_sales_percentage(mut record: TeamMemberRecord) -> TeamMemberRecord {
        record.sales_percentage =
            sales_percentage(record.member.current_sales, record.member.sales_target);
        record
    }

    pub async fn list_scoped<'e, E>(
        &self,
        executor: E,
        predicate: &Predicate,
    ) -> Result<Vec<TeamMemberRecord>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let select = Self::record_select();
        let mut qb = scoped_query(&select, EntityKind::TeamMember, MANAGER_USER_JOIN, predicate);
        qb.push(" ORDER BY tm.created_at DESC");

        let members = qb
            .build_query_as::<TeamMemberRecord>()
            .fetch_all(executor)
            .await?;
        Ok(members.into_iter().map(Self::with_sales_percentage).collect())
    }

    /// Busca pelo id, mas só se o registro estiver dentro de `predicate`.
    pub async fn find_visible<'e, E>(
        &self,
        executor: E,
        predicate: &Predicate,
        id: Uuid,
    ) -> Result<Option<TeamMemberRecord>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let select = Self::record_select();
        let mut qb = scoped_query(
            &select,
            EntityKind::TeamMember,
            MANAGER_USER_JOIN,
            predicate,
        );
        qb.push(" AND tm.id = ").push_bind(id);

        let member = qb
            .build_query_as::<TeamMemberRecord>()
            .fetch_optional(executor)
            .await?;
        Ok(member.map(Self::with_sales_percentage))
    }

    pub async fn find_by_user<'e, E>(
        &self,
        executor: E,
        user_id: Uuid,
    ) -> Result<Option<TeamMember>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let member =
            sqlx::query_as::<_, TeamMember>("SELECT * FROM team_members WHERE user_id = $1")
                .bind(user_id)
                .fetch_optional(executor)
                .await?;
        Ok(member)
    }

    pub async fn exists_in_tenant<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        id: Uuid,
    ) -> Result<bool, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS (SELECT 1 FROM team_members WHERE id = $1 AND tenant_id = $2)",
        )
        .bind(id)
        .bind(tenant_id)
        .fetch_one(executor)
        .await?;
        Ok(exists)
    }

    /// Trava a hierarquia do tenant até o fim da transação. Quem chega depois
    /// espera e, em READ COMMITTED, a próxima leitura já vê o que foi gravado.
    pub async fn lock_hierarchy<'e, E>(&self, executor: E, tenant_id: Uuid) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query("SELECT pg_advisory_xact_lock(hashtextextended($1, 0))")
            .bind(format!("team_hierarchy:{tenant_id}"))
            .execute(executor)
            .await?;
        Ok(())
    }

    /// Mapa membro -> gerente de todo o tenant, para checar ciclos.
    pub async fn manager_links<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
    ) -> Result<HashMap<Uuid, Option<Uuid>>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let rows = sqlx::query_as::<_, (Uuid, Option<Uuid>)>(
            "SELECT id, manager_id FROM team_members WHERE tenant_id = $1",
        )
        .bind(tenant_id)
        .fetch_all(executor)
        .await?;
        Ok(rows.into_iter().collect())
    }

    pub async fn create<'e, E>(
        &self,
        executor: E,
        new: &NewTeamMember<'_>,
    ) -> Result<TeamMember, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, TeamMember>(
            r#"
            INSERT INTO team_members (
                tenant_id, user_id, manager_id, employee_id, department, position,
                hire_date, sales_target, notes
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING *
            "#,
        )
        .bind(new.tenant_id)
        .bind(new.user_id)
        .bind(new.manager_id)
        .bind(new.employee_id)
        .bind(new.department)
        .bind(new.position)
        .bind(new.hire_date)
        .bind(new.sales_target)
        .bind(new.notes)
        .fetch_one(executor)
        .await
        .map_err(|e| AppError::from_unique_violation(e, "Este usuário já é membro da equipe."))
    }

    pub async fn update<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        changes: &UpdateTeamMemberPayload,
    ) -> Result<TeamMember, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let member = sqlx::query_as::<_, TeamMember>(
            r#"
            UPDATE team_members SET
                department = COALESCE($2, department),
                position = COALESCE($3, position),
                status = COALESCE($4, status),
                performance_rating = COALESCE($5, performance_rating),
                sales_target = COALESCE($6, sales_target),
                current_sales = COALESCE($7, current_sales),
                manager_id = CASE WHEN $8 THEN $9 ELSE manager_id END,
                notes = COALESCE($10, notes),
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(changes.department.as_deref())
        .bind(changes.position.as_deref())
        .bind(changes.status)
        .bind(changes.performance_rating)
        .bind(changes.sales_target)
        .bind(changes.current_sales)
        .bind(changes.manager_id.is_some())
        .bind(changes.manager_id.flatten())
        .bind(changes.notes.as_deref())
        .fetch_one(executor)
        .await?;
        Ok(member)
    }

    pub async fn list_activities<'e, E>(
        &self,
        executor: E,
        team_member_id: Uuid,
    ) -> Result<Vec<TeamMemberActivity>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let activities = sqlx::query_as::<_, TeamMemberActivity>(
            r#"
            SELECT * FROM team_member_activities
            WHERE team_member_id = $1
            ORDER BY created_at DESC
            "#,
        )
        .bind(team_member_id)
        .fetch_all(executor)
        .await?;
        Ok(activities)
    }

    pub async fn log_activity<'e, E>(
        &self,
        executor: E,
        team_member_id: Uuid,
        activity_type: ActivityType,
        description: &str,
    ) -> Result<TeamMemberActivity, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let activity = sqlx::query_as::<_, TeamMemberActivity>(
            r#"
            INSERT INTO team_member_activities (team_member_id, activity_type, description)
            VALUES ($1, $2, $3)
            RETURNING *
            "#,
        )
        .bind(team_member_id)
        .bind(activity_type)
        .bind(description)
        .fetch_one(executor)
        .await?;
        Ok(activity)
    }
}
