// src/db/inventory_repo.rs

use std::collections::HashMap;

use rust_decimal::Decimal;
use sqlx::{Executor, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::inventory::{
        Category, CreateCategoryPayload, CreateProductPayload, Product, ProductListEntry,
        ProductStatus, UpdateCategoryPayload, UpdateProductPayload,
    },
    scope::{EntityKind, Predicate, scoped_query},
};

const CATEGORY_JOIN: &str = "LEFT JOIN categories pc ON pc.id = p.category_id";

#[derive(Clone, Default)]
pub struct InventoryRepository;

impl InventoryRepository {
    pub fn new() -> Self {
        Self
    }

    // =========================================================================
    //  CATEGORIAS
    // =========================================================================

    pub async fn list_categories<'e, E>(
        &self,
        executor: E,
        predicate: &Predicate,
    ) -> Result<Vec<Category>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let mut qb = scoped_query("cat.*", EntityKind::Category, "", predicate);
        qb.push(" ORDER BY cat.name ASC");

        let categories = qb.build_query_as::<Category>().fetch_all(executor).await?;
        Ok(categories)
    }

    pub async fn category_in_tenant<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        id: Uuid,
    ) -> Result<bool, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS (SELECT 1 FROM categories WHERE id = $1 AND tenant_id = $2)",
        )
        .bind(id)
        .bind(tenant_id)
        .fetch_one(executor)
        .await?;
        Ok(exists)
    }

    pub async fn create_category<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        payload: &CreateCategoryPayload,
    ) -> Result<Category, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, Category>(
            r#"
            INSERT INTO categories (tenant_id, name, description)
            VALUES ($1, $2, $3)
            RETURNING *
            "#,
        )
        .bind(tenant_id)
        .bind(payload.name.trim())
        .bind(payload.description.as_deref())
        .fetch_one(executor)
        .await
        .map_err(|e| AppError::from_unique_violation(e, "Já existe uma categoria com este nome."))
    }

    pub async fn find_category_visible<'e, E>(
        &self,
        executor: E,
        predicate: &Predicate,
        id: Uuid,
    ) -> Result<Option<Category>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let mut qb = scoped_query("cat.*", EntityKind::Category, "", predicate);
        qb.push(" AND cat.id = ").push_bind(id);

        let category = qb
            .build_query_as::<Category>()
            .fetch_optional(executor)
            .await?;
        Ok(category)
    }

    pub async fn update_category<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        changes: &UpdateCategoryPayload,
    ) -> Result<Category, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, Category>(
            r#"
            UPDATE categories SET
                name = COALESCE($2, name),
                description = COALESCE($3, description),
                is_active = COALESCE($4, is_active),
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(changes.name.as_deref().map(str::trim))
        .bind(changes.description.as_deref())
        .bind(changes.is_active)
        .fetch_one(executor)
        .await
        .map_err(|e| AppError::from_unique_violation(e, "Já existe uma categoria com este nome."))
    }

    /// Produtos da categoria ficam sem categoria (ON DELETE SET NULL).
    pub async fn delete_category<'e, E>(&self, executor: E, id: Uuid) -> Result<u64, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query("DELETE FROM categories WHERE id = $1")
            .bind(id)
            .execute(executor)
            .await?;
        Ok(result.rows_affected())
    }

    // =========================================================================
    //  PRODUTOS
    // =========================================================================

    pub async fn list_products<'e, E>(
        &self,
        executor: E,
        predicate: &Predicate,
    ) -> Result<Vec<ProductListEntry>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let mut qb = scoped_query(
            "p.*, pc.name AS category_name",
            EntityKind::Product,
            CATEGORY_JOIN,
            predicate,
        );
        qb.push(" ORDER BY p.name ASC");

        let products = qb
            .build_query_as::<ProductListEntry>()
            .fetch_all(executor)
            .await?;
        Ok(products)
    }

    pub async fn find_product_visible<'e, E>(
        &self,
        executor: E,
        predicate: &Predicate,
        id: Uuid,
    ) -> Result<Option<ProductListEntry>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let mut qb = scoped_query(
            "p.*, pc.name AS category_name",
            EntityKind::Product,
            CATEGORY_JOIN,
            predicate,
        );
        qb.push(" AND p.id = ").push_bind(id);

        let product = qb
            .build_query_as::<ProductListEntry>()
            .fetch_optional(executor)
            .await?;
        Ok(product)
    }

    pub async fn create_product<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        payload: &CreateProductPayload,
    ) -> Result<Product, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, Product>(
            r#"
            INSERT INTO products (
                tenant_id, category_id, name, sku, status, quantity, min_quantity,
                cost_price, selling_price, material
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            RETURNING *
            "#,
        )
        .bind(tenant_id)
        .bind(payload.category_id)
        .bind(payload.name.trim())
        .bind(payload.sku.trim())
        .bind(payload.status.unwrap_or(ProductStatus::Active))
        .bind(payload.quantity)
        .bind(payload.min_quantity)
        .bind(payload.cost_price)
        .bind(payload.selling_price)
        .bind(payload.material.as_deref())
        .fetch_one(executor)
        .await
        .map_err(|e| AppError::from_unique_violation(e, "Já existe um produto com este SKU."))
    }

    pub async fn update_product<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        changes: &UpdateProductPayload,
    ) -> Result<Product, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, Product>(
            r#"
            UPDATE products SET
                name = COALESCE($2, name),
                sku = COALESCE($3, sku),
                category_id = CASE WHEN $4 THEN $5 ELSE category_id END,
                status = COALESCE($6, status),
                quantity = COALESCE($7, quantity),
                min_quantity = COALESCE($8, min_quantity),
                cost_price = COALESCE($9, cost_price),
                selling_price = COALESCE($10, selling_price),
                material = COALESCE($11, material),
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(changes.name.as_deref().map(str::trim))
        .bind(changes.sku.as_deref().map(str::trim))
        .bind(changes.category_id.is_some())
        .bind(changes.category_id.flatten())
        .bind(changes.status)
        .bind(changes.quantity)
        .bind(changes.min_quantity)
        .bind(changes.cost_price)
        .bind(changes.selling_price)
        .bind(changes.material.as_deref())
        .fetch_one(executor)
        .await
        .map_err(|e| AppError::from_unique_violation(e, "Já existe um produto com este SKU."))
    }

    /// Produto que já aparece em itens de venda não pode ser apagado.
    pub async fn delete_product<'e, E>(&self, executor: E, id: Uuid) -> Result<u64, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query("DELETE FROM products WHERE id = $1")
            .bind(id)
            .execute(executor)
            .await
            .map_err(|e| {
                AppError::from_foreign_key_violation(
                    e,
                    "O produto já aparece em vendas; inative-o em vez de excluir.",
                )
            })?;
        Ok(result.rows_affected())
    }

    /// Preço de venda dos produtos pedidos que pertencem ao tenant. Ids de
    /// outros tenants simplesmente não aparecem no mapa.
    pub async fn selling_prices<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        ids: &[Uuid],
    ) -> Result<HashMap<Uuid, Decimal>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let rows = sqlx::query_as::<_, (Uuid, Decimal)>(
            "SELECT id, selling_price FROM products WHERE tenant_id = $1 AND id = ANY($2)",
        )
        .bind(tenant_id)
        .bind(ids)
        .fetch_all(executor)
        .await?;
        Ok(rows.into_iter().collect())
    }
}
