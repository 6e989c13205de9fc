// src/db/tenancy_repo.rs

use sqlx::{Executor, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::tenancy::{Store, Tenant},
};

#[derive(Clone, Default)]
pub struct TenantRepository;

impl TenantRepository {
    pub fn new() -> Self {
        Self
    }

    pub async fn find_tenant<'e, E>(&self, executor: E, id: Uuid) -> Result<Option<Tenant>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let tenant = sqlx::query_as::<_, Tenant>("SELECT * FROM tenants WHERE id = $1")
            .bind(id)
            .fetch_optional(executor)
            .await?;
        Ok(tenant)
    }

    /// A loja só serve se pertencer ao tenant informado.
    pub async fn find_store_in_tenant<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        store_id: Uuid,
    ) -> Result<Option<Store>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let store = sqlx::query_as::<_, Store>(
            "SELECT * FROM stores WHERE id = $1 AND tenant_id = $2",
        )
        .bind(store_id)
        .bind(tenant_id)
        .fetch_optional(executor)
        .await?;
        Ok(store)
    }
}
