// src/db/crm_repo.rs

use rust_decimal::Decimal;
use sqlx::{Executor, Postgres};
use uuid::Uuid;

use super::full_name_sql;
use crate::{
    common::error::AppError,
    models::crm::{Client, ClientRecord, CreateClientPayload, Purchase},
    scope::{EntityKind, Predicate, scoped_query},
};

#[derive(Clone, Default)]
pub struct CrmRepository;

impl CrmRepository {
    pub fn new() -> Self {
        Self
    }

    fn record_select() -> String {
        format!(
            "c.*, {assignee} AS assigned_to_name, st.name AS store_name, {ownership}",
            assignee = full_name_sql("u"),
            ownership = EntityKind::Client.ownership_columns(),
        )
    }

    pub async fn list_scoped<'e, E>(
        &self,
        executor: E,
        predicate: &Predicate,
    ) -> Result<Vec<ClientRecord>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let select = Self::record_select();
        let mut qb = scoped_query(&select, EntityKind::Client, "", predicate);
        qb.push(" ORDER BY c.created_at DESC");

        let clients = qb.build_query_as::<ClientRecord>().fetch_all(executor).await?;
        Ok(clients)
    }

    pub async fn find_visible<'e, E>(
        &self,
        executor: E,
        predicate: &Predicate,
        id: Uuid,
    ) -> Result<Option<ClientRecord>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let select = Self::record_select();
        let mut qb = scoped_query(
            &select,
            EntityKind::Client,
            "",
            predicate,
        );
        qb.push(" AND c.id = ").push_bind(id);

        let client = qb
            .build_query_as::<ClientRecord>()
            .fetch_optional(executor)
            .await?;
        Ok(client)
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
            "SELECT EXISTS (SELECT 1 FROM clients WHERE id = $1 AND tenant_id = $2)",
        )
        .bind(id)
        .bind(tenant_id)
        .fetch_one(executor)
        .await?;
        Ok(exists)
    }

    pub async fn create_client<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        assigned_to_id: Option<Uuid>,
        payload: &CreateClientPayload,
    ) -> Result<Client, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let client = sqlx::query_as::<_, Client>(
            r#"
            INSERT INTO clients (tenant_id, assigned_to_id, first_name, last_name, email, phone, notes)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING *
            "#,
        )
        .bind(tenant_id)
        .bind(assigned_to_id)
        .bind(payload.first_name.trim())
        .bind(payload.last_name.trim())
        .bind(payload.email.as_deref())
        .bind(payload.phone.as_deref())
        .bind(payload.notes.as_deref())
        .fetch_one(executor)
        .await?;
        Ok(client)
    }

    pub async fn add_purchase<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        client_id: Uuid,
        amount: Decimal,
    ) -> Result<Purchase, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let purchase = sqlx::query_as::<_, Purchase>(
            r#"
            INSERT INTO purchases (tenant_id, client_id, amount)
            VALUES ($1, $2, $3)
            RETURNING *
            "#,
        )
        .bind(tenant_id)
        .bind(client_id)
        .bind(amount)
        .fetch_one(executor)
        .await?;
        Ok(purchase)
    }
}
