// src/services/crm_service.rs

use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;
use validator::Validate;

use super::require_tenant;
use crate::{
    common::error::AppError,
    db::{CrmRepository, UserRepository},
    models::crm::{ClientRecord, CreateClientPayload, CreatePurchasePayload, Purchase},
    scope::{Actor, EntityKind, ListFilters, resolve},
};

#[derive(Clone)]
pub struct CrmService {
    pool: PgPool,
    repo: CrmRepository,
    user_repo: UserRepository,
}

impl CrmService {
    pub fn new(pool: PgPool, repo: CrmRepository, user_repo: UserRepository) -> Self {
        Self {
            pool,
            repo,
            user_repo,
        }
    }

    pub async fn list_clients(
        &self,
        actor: &Actor,
        filters: &ListFilters,
    ) -> Result<Vec<ClientRecord>, AppError> {
        let predicate = filters.scoped(actor, EntityKind::Client);
        if predicate.is_nothing() {
            return Ok(Vec::new());
        }
        self.repo.list_scoped(&self.pool, &predicate).await
    }

    pub async fn create_client(
        &self,
        actor: &Actor,
        payload: &CreateClientPayload,
    ) -> Result<ClientRecord, AppError> {
        payload.validate()?;
        let tenant_id = require_tenant(actor)?;

        let mut tx = self.pool.begin().await?;

        let assigned_to_id = match payload.assigned_to_id {
            Some(user_id) if user_id != actor.user_id => {
                self.user_repo
                    .find_in_tenant(&mut *tx, tenant_id, user_id)
                    .await?
                    .ok_or(AppError::MissingReference {
                        field: "assignedToId",
                    })?;
                user_id
            }
            _ => actor.user_id,
        };

        let client = self
            .repo
            .create_client(&mut *tx, tenant_id, Some(assigned_to_id), payload)
            .await?;
        let record = self
            .repo
            .find_visible(&mut *tx, &resolve(actor, EntityKind::Client), client.id)
            .await?;
        tx.commit().await?;

        tracing::info!(client_id = %client.id, "Cliente cadastrado");

        // Atribuído a alguém fora do escopo de quem cadastrou: devolve só o
        // básico, sem os dados de posse.
        Ok(record.unwrap_or(ClientRecord {
            client,
            assigned_to_name: None,
            store_name: None,
            ownership: Default::default(),
        }))
    }

    /// Registra uma compra de um cliente visível ao ator.
    pub async fn add_purchase(
        &self,
        actor: &Actor,
        client_id: Uuid,
        payload: &CreatePurchasePayload,
    ) -> Result<Purchase, AppError> {
        if payload.amount <= Decimal::ZERO {
            return Err(AppError::BadRequest(
                "O valor da compra deve ser maior que zero.".into(),
            ));
        }

        let mut tx = self.pool.begin().await?;

        let client = self
            .repo
            .find_visible(&mut *tx, &resolve(actor, EntityKind::Client), client_id)
            .await?
            .ok_or(AppError::NotFound)?;

        let purchase = self
            .repo
            .add_purchase(&mut *tx, client.client.tenant_id, client_id, payload.amount)
            .await?;
        tx.commit().await?;

        Ok(purchase)
    }
}
