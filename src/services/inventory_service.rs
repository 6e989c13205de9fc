// src/services/inventory_service.rs

use sqlx::{PgConnection, PgPool};
use uuid::Uuid;
use validator::Validate;

use super::require_tenant;
use crate::{
    common::error::AppError,
    db::InventoryRepository,
    models::inventory::{
        Category, CreateCategoryPayload, CreateProductPayload, Product, ProductListEntry,
        UpdateCategoryPayload, UpdateProductPayload,
    },
    scope::{Actor, EntityKind, Field, ListFilters, Predicate, resolve},
};

#[derive(Clone)]
pub struct InventoryService {
    pool: PgPool,
    inventory_repo: InventoryRepository,
}

impl InventoryService {
    pub fn new(pool: PgPool, inventory_repo: InventoryRepository) -> Self {
        Self {
            pool,
            inventory_repo,
        }
    }

    /// Produtos do tenant com os filtros combináveis (busca, status,
    /// categoria, estoque).
    pub async fn list_products(
        &self,
        actor: &Actor,
        filters: &ListFilters,
    ) -> Result<Vec<ProductListEntry>, AppError> {
        let predicate = filters.scoped(actor, EntityKind::Product);
        if predicate.is_nothing() {
            return Ok(Vec::new());
        }
        self.inventory_repo.list_products(&self.pool, &predicate).await
    }

    async fn check_category(
        &self,
        conn: &mut PgConnection,
        tenant_id: Uuid,
        category_id: Option<Uuid>,
    ) -> Result<(), AppError> {
        if let Some(category_id) = category_id {
            if !self
                .inventory_repo
                .category_in_tenant(conn, tenant_id, category_id)
                .await?
            {
                return Err(AppError::MissingReference {
                    field: "categoryId",
                });
            }
        }
        Ok(())
    }

    pub async fn get_product(&self, actor: &Actor, id: Uuid) -> Result<ProductListEntry, AppError> {
        self.inventory_repo
            .find_product_visible(&self.pool, &resolve(actor, EntityKind::Product), id)
            .await?
            .ok_or(AppError::NotFound)
    }

    pub async fn create_product(
        &self,
        actor: &Actor,
        payload: &CreateProductPayload,
    ) -> Result<Product, AppError> {
        payload.validate()?;
        let tenant_id = require_tenant(actor)?;

        let mut tx = self.pool.begin().await?;

        self.check_category(&mut *tx, tenant_id, payload.category_id)
            .await?;

        let product = self
            .inventory_repo
            .create_product(&mut *tx, tenant_id, payload)
            .await?;
        tx.commit().await?;

        tracing::info!(product_id = %product.id, sku = %product.sku, "Produto cadastrado");
        Ok(product)
    }

    pub async fn update_product(
        &self,
        actor: &Actor,
        id: Uuid,
        changes: &UpdateProductPayload,
    ) -> Result<ProductListEntry, AppError> {
        changes.validate()?;
        let visible = resolve(actor, EntityKind::Product);

        let mut tx = self.pool.begin().await?;

        let current = self
            .inventory_repo
            .find_product_visible(&mut *tx, &visible, id)
            .await?
            .ok_or(AppError::NotFound)?;
        let tenant_id = current.product.tenant_id;

        self.check_category(&mut *tx, tenant_id, changes.category_id.flatten())
            .await?;

        self.inventory_repo
            .update_product(&mut *tx, id, changes)
            .await?;
        let record = self
            .inventory_repo
            .find_product_visible(&mut *tx, &Predicate::eq(Field::Tenant, tenant_id), id)
            .await?
            .ok_or(AppError::NotFound)?;
        tx.commit().await?;

        tracing::info!(product_id = %id, "Produto atualizado");
        Ok(record)
    }

    pub async fn delete_product(&self, actor: &Actor, id: Uuid) -> Result<(), AppError> {
        let mut tx = self.pool.begin().await?;

        self.inventory_repo
            .find_product_visible(&mut *tx, &resolve(actor, EntityKind::Product), id)
            .await?
            .ok_or(AppError::NotFound)?;
        self.inventory_repo.delete_product(&mut *tx, id).await?;
        tx.commit().await?;

        tracing::info!(product_id = %id, removed_by = %actor.user_id, "Produto removido");
        Ok(())
    }

    pub async fn list_categories(
        &self,
        actor: &Actor,
        filters: &ListFilters,
    ) -> Result<Vec<Category>, AppError> {
        let predicate = filters.scoped(actor, EntityKind::Category);
        if predicate.is_nothing() {
            return Ok(Vec::new());
        }
        self.inventory_repo
            .list_categories(&self.pool, &predicate)
            .await
    }

    pub async fn create_category(
        &self,
        actor: &Actor,
        payload: &CreateCategoryPayload,
    ) -> Result<Category, AppError> {
        payload.validate()?;
        let tenant_id = require_tenant(actor)?;

        self.inventory_repo
            .create_category(&self.pool, tenant_id, payload)
            .await
    }

    pub async fn get_category(&self, actor: &Actor, id: Uuid) -> Result<Category, AppError> {
        self.inventory_repo
            .find_category_visible(&self.pool, &resolve(actor, EntityKind::Category), id)
            .await?
            .ok_or(AppError::NotFound)
    }

    /// Produtos de uma categoria visível ao ator.
    pub async fn products_in_category(
        &self,
        actor: &Actor,
        id: Uuid,
    ) -> Result<Vec<ProductListEntry>, AppError> {
        let category = self.get_category(actor, id).await?;
        let predicate = resolve(actor, EntityKind::Product)
            .and(Predicate::eq(Field::Tenant, category.tenant_id))
            .and(Predicate::eq(Field::Category, category.id));
        self.inventory_repo.list_products(&self.pool, &predicate).await
    }

    pub async fn update_category(
        &self,
        actor: &Actor,
        id: Uuid,
        changes: &UpdateCategoryPayload,
    ) -> Result<Category, AppError> {
        changes.validate()?;

        let mut tx = self.pool.begin().await?;
        self.inventory_repo
            .find_category_visible(&mut *tx, &resolve(actor, EntityKind::Category), id)
            .await?
            .ok_or(AppError::NotFound)?;
        let category = self
            .inventory_repo
            .update_category(&mut *tx, id, changes)
            .await?;
        tx.commit().await?;

        Ok(category)
    }

    pub async fn delete_category(&self, actor: &Actor, id: Uuid) -> Result<(), AppError> {
        let mut tx = self.pool.begin().await?;
        self.inventory_repo
            .find_category_visible(&mut *tx, &resolve(actor, EntityKind::Category), id)
            .await?
            .ok_or(AppError::NotFound)?;
        self.inventory_repo.delete_category(&mut *tx, id).await?;
        tx.commit().await?;

        tracing::info!(category_id = %id, removed_by = %actor.user_id, "Categoria removida");
        Ok(())
    }
}
