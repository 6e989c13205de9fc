// src/services/sales_service.rs

use std::collections::HashMap;

use chrono::Utc;
use rust_decimal::Decimal;
use sqlx::{PgConnection, PgPool};
use uuid::Uuid;
use validator::Validate;

use super::require_tenant;
use crate::{
    common::error::AppError,
    db::{
        CrmRepository, InventoryRepository, SalesRepository, UserRepository,
        sales_repo::{NewDeal, NewSaleItem},
    },
    models::sales::{
        CreateDealPayload, CreateSalePayload, DealRecord, DealStage, SaleDetail, SaleItemPayload,
        SaleRecord, SaleStatus, TransitionDealPayload, UpdateDealPayload, UpdateSalePayload,
    },
    scope::{Actor, EntityKind, ListFilters, resolve},
};

/// Resolve o preço de cada item (o informado ou o de venda do produto) e
/// recusa produtos fora do tenant.
pub fn price_items(
    items: &[SaleItemPayload],
    selling_prices: &HashMap<Uuid, Decimal>,
) -> Result<Vec<NewSaleItem>, AppError> {
    items
        .iter()
        .map(|item| {
            let catalog_price = selling_prices
                .get(&item.product_id)
                .ok_or(AppError::MissingReference { field: "productId" })?;
            Ok(NewSaleItem {
                product_id: item.product_id,
                quantity: item.quantity,
                unit_price: item.unit_price.unwrap_or(*catalog_price),
            })
        })
        .collect()
}

#[derive(Clone)]
pub struct SalesService {
    pool: PgPool,
    repo: SalesRepository,
    crm_repo: CrmRepository,
    inventory_repo: InventoryRepository,
    user_repo: UserRepository,
}

impl SalesService {
    pub fn new(
        pool: PgPool,
        repo: SalesRepository,
        crm_repo: CrmRepository,
        inventory_repo: InventoryRepository,
        user_repo: UserRepository,
    ) -> Self {
        Self {
            pool,
            repo,
            crm_repo,
            inventory_repo,
            user_repo,
        }
    }

    async fn check_client(
        &self,
        conn: &mut PgConnection,
        tenant_id: Uuid,
        client_id: Option<Uuid>,
    ) -> Result<(), AppError> {
        if let Some(client_id) = client_id {
            if !self.crm_repo.exists_in_tenant(conn, tenant_id, client_id).await? {
                return Err(AppError::MissingReference { field: "clientId" });
            }
        }
        Ok(())
    }

    // =========================================================================
    //  FUNIL
    // =========================================================================

    pub async fn list_deals(
        &self,
        actor: &Actor,
        filters: &ListFilters,
    ) -> Result<Vec<DealRecord>, AppError> {
        let predicate = filters.scoped(actor, EntityKind::Deal);
        if predicate.is_nothing() {
            return Ok(Vec::new());
        }
        self.repo.list_deals(&self.pool, &predicate).await
    }

    pub async fn create_deal(
        &self,
        actor: &Actor,
        payload: &CreateDealPayload,
    ) -> Result<DealRecord, AppError> {
        payload.validate()?;
        let tenant_id = require_tenant(actor)?;

        let mut tx = self.pool.begin().await?;

        self.check_client(&mut *tx, tenant_id, payload.client_id).await?;

        let representative = match payload.sales_representative_id {
            Some(user_id) if user_id != actor.user_id => {
                self.user_repo
                    .find_in_tenant(&mut *tx, tenant_id, user_id)
                    .await?
                    .ok_or(AppError::MissingReference {
                        field: "salesRepresentativeId",
                    })?;
                user_id
            }
            _ => actor.user_id,
        };

        let stage = payload.stage.unwrap_or(DealStage::Lead);
        let closed_on = stage.is_closing().then(|| Utc::now().date_naive());
        let deal = self
            .repo
            .create_deal(
                &mut *tx,
                &NewDeal {
                    tenant_id,
                    client_id: payload.client_id,
                    sales_representative_id: Some(representative),
                    title: payload.title.trim(),
                    stage,
                    probability: payload.probability,
                    expected_value: payload.expected_value,
                    is_closed: closed_on.is_some(),
                    expected_close_date: payload.expected_close_date,
                    actual_close_date: closed_on,
                    notes: payload.notes.as_deref(),
                },
            )
            .await?;

        let record = self
            .repo
            .find_deal_visible(&mut *tx, &resolve(actor, EntityKind::Deal), deal.id)
            .await?;
        tx.commit().await?;

        tracing::info!(deal_id = %deal.id, stage = stage.as_str(), "Negócio criado no funil");

        Ok(record.unwrap_or(DealRecord {
            deal,
            client_name: None,
            sales_representative_name: None,
            ownership: Default::default(),
        }))
    }

    pub async fn get_deal(&self, actor: &Actor, id: Uuid) -> Result<DealRecord, AppError> {
        self.repo
            .find_deal_visible(&self.pool, &resolve(actor, EntityKind::Deal), id)
            .await?
            .ok_or(AppError::NotFound)
    }

    pub async fn update_deal(
        &self,
        actor: &Actor,
        id: Uuid,
        changes: &UpdateDealPayload,
    ) -> Result<DealRecord, AppError> {
        changes.validate()?;
        let visible = resolve(actor, EntityKind::Deal);

        let mut tx = self.pool.begin().await?;

        let current = self
            .repo
            .find_deal_visible(&mut *tx, &visible, id)
            .await?
            .ok_or(AppError::NotFound)?;
        self.check_client(&mut *tx, current.deal.tenant_id, changes.client_id.flatten())
            .await?;

        self.repo.update_deal(&mut *tx, id, changes).await?;
        // O vendedor não muda aqui, então o negócio continua no escopo.
        let record = self
            .repo
            .find_deal_visible(&mut *tx, &visible, id)
            .await?
            .ok_or(AppError::NotFound)?;
        tx.commit().await?;

        Ok(record)
    }

    pub async fn delete_deal(&self, actor: &Actor, id: Uuid) -> Result<(), AppError> {
        let mut tx = self.pool.begin().await?;
        self.repo
            .find_deal_visible(&mut *tx, &resolve(actor, EntityKind::Deal), id)
            .await?
            .ok_or(AppError::NotFound)?;
        self.repo.delete_deal(&mut *tx, id).await?;
        tx.commit().await?;

        tracing::info!(deal_id = %id, removed_by = %actor.user_id, "Negócio removido do funil");
        Ok(())
    }

    /// Move o negócio para outro estágio. Negócio fora do escopo do ator é
    /// tratado como inexistente.
    pub async fn transition_deal(
        &self,
        actor: &Actor,
        id: Uuid,
        payload: &TransitionDealPayload,
    ) -> Result<DealRecord, AppError> {
        let visible = resolve(actor, EntityKind::Deal);
        let mut tx = self.pool.begin().await?;

        let current = self
            .repo
            .find_deal_visible(&mut *tx, &visible, id)
            .await?
            .ok_or(AppError::NotFound)?;

        let deal = self
            .repo
            .transition_deal(
                &mut *tx,
                id,
                payload.stage,
                Utc::now().date_naive(),
                payload.actual_value,
            )
            .await?;
        tx.commit().await?;

        tracing::info!(
            deal_id = %id,
            from = current.deal.stage.as_str(),
            to = deal.stage.as_str(),
            "Negócio mudou de estágio"
        );

        Ok(DealRecord { deal, ..current })
    }

    // =========================================================================
    //  VENDAS
    // =========================================================================

    pub async fn list_sales(
        &self,
        actor: &Actor,
        filters: &ListFilters,
    ) -> Result<Vec<SaleRecord>, AppError> {
        let predicate = filters.scoped(actor, EntityKind::Sale);
        if predicate.is_nothing() {
            return Ok(Vec::new());
        }
        self.repo.list_sales(&self.pool, &predicate).await
    }

    /// Venda com os itens, se estiver no escopo do ator.
    pub async fn get_sale(&self, actor: &Actor, id: Uuid) -> Result<SaleDetail, AppError> {
        let record = self
            .repo
            .find_sale_visible(&self.pool, &resolve(actor, EntityKind::Sale), id)
            .await?
            .ok_or(AppError::NotFound)?;
        let items = self.repo.sale_items(&self.pool, id).await?;
        Ok(SaleDetail {
            sale: record.sale,
            items,
        })
    }

    pub async fn update_sale(
        &self,
        actor: &Actor,
        id: Uuid,
        changes: &UpdateSalePayload,
    ) -> Result<SaleDetail, AppError> {
        let mut tx = self.pool.begin().await?;

        let current = self
            .repo
            .find_sale_visible(&mut *tx, &resolve(actor, EntityKind::Sale), id)
            .await?
            .ok_or(AppError::NotFound)?;
        let sale = self.repo.update_sale(&mut *tx, id, changes).await?;
        let items = self.repo.sale_items(&mut *tx, id).await?;
        tx.commit().await?;

        if current.sale.status != sale.status {
            tracing::info!(
                sale_id = %id,
                from = current.sale.status.as_str(),
                to = sale.status.as_str(),
                "Status da venda alterado"
            );
        }
        Ok(SaleDetail { sale, items })
    }

    pub async fn delete_sale(&self, actor: &Actor, id: Uuid) -> Result<(), AppError> {
        let mut tx = self.pool.begin().await?;
        self.repo
            .find_sale_visible(&mut *tx, &resolve(actor, EntityKind::Sale), id)
            .await?
            .ok_or(AppError::NotFound)?;
        self.repo.delete_sale(&mut *tx, id).await?;
        tx.commit().await?;

        tracing::info!(sale_id = %id, removed_by = %actor.user_id, "Venda removida");
        Ok(())
    }

    pub async fn create_sale(
        &self,
        actor: &Actor,
        payload: &CreateSalePayload,
    ) -> Result<SaleDetail, AppError> {
        payload.validate()?;
        let tenant_id = require_tenant(actor)?;

        let mut tx = self.pool.begin().await?;

        self.check_client(&mut *tx, tenant_id, payload.client_id).await?;

        let product_ids: Vec<Uuid> = payload.items.iter().map(|i| i.product_id).collect();
        let prices = self
            .inventory_repo
            .selling_prices(&mut *tx, tenant_id, &product_ids)
            .await?;
        let lines = price_items(&payload.items, &prices)?;
        let total_amount: Decimal = lines.iter().map(NewSaleItem::total_price).sum();

        let sale = self
            .repo
            .create_sale(
                &mut *tx,
                tenant_id,
                payload.client_id,
                actor.user_id,
                payload.invoice_number.trim(),
                payload.status.unwrap_or(SaleStatus::Pending),
                total_amount,
                payload.notes.as_deref(),
            )
            .await?;

        let mut items = Vec::with_capacity(lines.len());
        for line in &lines {
            items.push(self.repo.add_sale_item(&mut *tx, sale.id, line).await?);
        }

        tx.commit().await?;
        tracing::info!(sale_id = %sale.id, total = %total_amount, "Venda registrada");

        Ok(SaleDetail { sale, items })
    }
}
