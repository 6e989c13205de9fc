// src/db/user_repo.rs

use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::auth::{Role, UpdateUserPayload, User, UserRecord},
    scope::{EntityKind, Predicate, scoped_query},
};

/// Campos de um usuário novo, já validados pelo serviço.
#[derive(Debug, Clone)]
pub struct NewUser<'a> {
    pub tenant_id: Option<Uuid>,
    pub store_id: Option<Uuid>,
    pub role: Role,
    pub username: &'a str,
    pub email: &'a str,
    pub first_name: &'a str,
    pub last_name: &'a str,
    pub phone: Option<&'a str>,
}

// O repositório de usuários, responsável por todas as interações com a tabela 'users'
#[derive(Clone)]
pub struct UserRepository {
    pool: PgPool,
}

impl UserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // Busca um usuário pelo seu ID (usado na autenticação)
    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, AppError> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    pub async fn find_in_tenant<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        id: Uuid,
    ) -> Result<Option<User>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let user = sqlx::query_as::<_, User>(
            "SELECT * FROM users WHERE id = $1 AND tenant_id = $2",
        )
        .bind(id)
        .bind(tenant_id)
        .fetch_optional(executor)
        .await?;
        Ok(user)
    }

    fn record_select() -> String {
        format!(
            "u.*, st.name AS store_name, {}",
            EntityKind::User.ownership_columns()
        )
    }

    /// Busca pelo id, mas só se o usuário estiver dentro de `predicate`.
    pub async fn find_visible<'e, E>(
        &self,
        executor: E,
        predicate: &Predicate,
        id: Uuid,
    ) -> Result<Option<UserRecord>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let select = Self::record_select();
        let mut qb = scoped_query(&select, EntityKind::User, "", predicate);
        qb.push(" AND u.id = ").push_bind(id);

        let user = qb
            .build_query_as::<UserRecord>()
            .fetch_optional(executor)
            .await?;
        Ok(user)
    }

    pub async fn list_scoped<'e, E>(
        &self,
        executor: E,
        predicate: &Predicate,
    ) -> Result<Vec<UserRecord>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let select = Self::record_select();
        let mut qb = scoped_query(&select, EntityKind::User, "", predicate);
        qb.push(" ORDER BY u.created_at DESC");

        let users = qb.build_query_as::<UserRecord>().fetch_all(executor).await?;
        Ok(users)
    }

    // Cria um novo usuário; e-mail ou usuário duplicado vira Conflict.
    pub async fn create_user<'e, E>(&self, executor: E, new: &NewUser<'_>) -> Result<User, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (tenant_id, store_id, role, username, email, first_name, last_name, phone)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING *
            "#,
        )
        .bind(new.tenant_id)
        .bind(new.store_id)
        .bind(new.role)
        .bind(new.username)
        .bind(new.email)
        .bind(new.first_name)
        .bind(new.last_name)
        .bind(new.phone)
        .fetch_one(executor)
        .await
        .map_err(|e| AppError::from_unique_violation(e, "Este usuário ou e-mail já está em uso."))
    }

    pub async fn update_user<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        changes: &UpdateUserPayload,
    ) -> Result<User, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, User>(
            r#"
            UPDATE users SET
                email = COALESCE($2, email),
                first_name = COALESCE($3, first_name),
                last_name = COALESCE($4, last_name),
                phone = COALESCE($5, phone),
                role = COALESCE($6, role),
                store_id = CASE WHEN $7 THEN $8 ELSE store_id END,
                is_active = COALESCE($9, is_active),
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(changes.email.as_deref().map(str::trim))
        .bind(changes.first_name.as_deref().map(str::trim))
        .bind(changes.last_name.as_deref().map(str::trim))
        .bind(changes.phone.as_deref())
        .bind(changes.role)
        .bind(changes.store_id.is_some())
        .bind(changes.store_id.flatten())
        .bind(changes.is_active)
        .fetch_one(executor)
        .await
        .map_err(|e| AppError::from_unique_violation(e, "Este e-mail já está em uso."))
    }

    pub async fn delete_user<'e, E>(&self, executor: E, id: Uuid) -> Result<u64, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(executor)
            .await?;
        Ok(result.rows_affected())
    }
}
