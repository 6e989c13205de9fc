// src/db/sales_repo.rs

use chrono::NaiveDate;
use rust_decimal::Decimal;
use sqlx::{Executor, Postgres};
use uuid::Uuid;

use super::full_name_sql;
use crate::{
    common::error::AppError,
    models::sales::{
        Deal, DealRecord, DealStage, Sale, SaleItem, SaleRecord, SaleStatus, UpdateDealPayload,
        UpdateSalePayload,
    },
    scope::{EntityKind, Predicate, scoped_query},
};

const CLIENT_JOIN_DEAL: &str = "LEFT JOIN clients cl ON cl.id = d.client_id";
const CLIENT_JOIN_SALE: &str = "LEFT JOIN clients cl ON cl.id = s.client_id";

#[derive(Debug, Clone)]
pub struct NewDeal<'a> {
    pub tenant_id: Uuid,
    pub client_id: Option<Uuid>,
    pub sales_representative_id: Option<Uuid>,
    pub title: &'a str,
    pub stage: DealStage,
    pub probability: i32,
    pub expected_value: Decimal,
    pub is_closed: bool,
    pub expected_close_date: Option<NaiveDate>,
    pub actual_close_date: Option<NaiveDate>,
    pub notes: Option<&'a str>,
}

#[derive(Debug, Clone)]
pub struct NewSaleItem {
    pub product_id: Uuid,
    pub quantity: i32,
    pub unit_price: Decimal,
}

impl NewSaleItem {
    pub fn total_price(&self) -> Decimal {
        Decimal::from(self.quantity) * self.unit_price
    }
}

#[derive(Clone, Default)]
pub struct SalesRepository;

impl SalesRepository {
    pub fn new() -> Self {
        Self
    }

    // =========================================================================
    //  FUNIL (sales_pipeline)
    // =========================================================================

    fn deal_select() -> String {
        format!(
            "d.*, {client} AS client_name, {rep} AS sales_representative_name, {ownership}",
            client = full_name_sql("cl"),
            rep = full_name_sql("u"),
            ownership = EntityKind::Deal.ownership_columns(),
        )
    }

    pub async fn list_deals<'e, E>(
        &self,
        executor: E,
        predicate: &Predicate,
    ) -> Result<Vec<DealRecord>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let select = Self::deal_select();
        let mut qb = scoped_query(&select, EntityKind::Deal, CLIENT_JOIN_DEAL, predicate);
        qb.push(" ORDER BY d.created_at DESC");

        let deals = qb.build_query_as::<DealRecord>().fetch_all(executor).await?;
        Ok(deals)
    }

    pub async fn find_deal_visible<'e, E>(
        &self,
        executor: E,
        predicate: &Predicate,
        id: Uuid,
    ) -> Result<Option<DealRecord>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let select = Self::deal_select();
        let mut qb = scoped_query(
            &select,
            EntityKind::Deal,
            CLIENT_JOIN_DEAL,
            predicate,
        );
        qb.push(" AND d.id = ").push_bind(id);

        let deal = qb
            .build_query_as::<DealRecord>()
            .fetch_optional(executor)
            .await?;
        Ok(deal)
    }

    pub async fn create_deal<'e, E>(&self, executor: E, new: &NewDeal<'_>) -> Result<Deal, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let deal = sqlx::query_as::<_, Deal>(
            r#"
            INSERT INTO sales_pipeline (
                tenant_id, client_id, sales_representative_id, title, stage, probability,
                expected_value, is_closed, expected_close_date, actual_close_date, notes
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            RETURNING *
            "#,
        )
        .bind(new.tenant_id)
        .bind(new.client_id)
        .bind(new.sales_representative_id)
        .bind(new.title)
        .bind(new.stage)
        .bind(new.probability)
        .bind(new.expected_value)
        .bind(new.is_closed)
        .bind(new.expected_close_date)
        .bind(new.actual_close_date)
        .bind(new.notes)
        .fetch_one(executor)
        .await?;
        Ok(deal)
    }

    /// Move o negócio de estágio. Ao fechar grava a data de fechamento, que só
    /// é preservada quando o estágio de fechamento não muda. Ao reabrir, limpa.
    pub async fn transition_deal<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        stage: DealStage,
        closed_on: NaiveDate,
        actual_value: Option<Decimal>,
    ) -> Result<Deal, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let deal = sqlx::query_as::<_, Deal>(
            r#"
            UPDATE sales_pipeline SET
                stage = $2,
                is_closed = $3,
                actual_close_date = CASE
                    WHEN NOT $3 THEN NULL
                    WHEN stage = $2 THEN COALESCE(actual_close_date, $4)
                    ELSE $4
                END,
                actual_value = COALESCE($5, actual_value),
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(stage)
        .bind(stage.is_closing())
        .bind(closed_on)
        .bind(actual_value)
        .fetch_one(executor)
        .await?;
        Ok(deal)
    }

    pub async fn update_deal<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        changes: &UpdateDealPayload,
    ) -> Result<Deal, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let deal = sqlx::query_as::<_, Deal>(
            r#"
            UPDATE sales_pipeline SET
                title = COALESCE($2, title),
                client_id = CASE WHEN $3 THEN $4 ELSE client_id END,
                probability = COALESCE($5, probability),
                expected_value = COALESCE($6, expected_value),
                expected_close_date = COALESCE($7, expected_close_date),
                notes = COALESCE($8, notes),
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(changes.title.as_deref().map(str::trim))
        .bind(changes.client_id.is_some())
        .bind(changes.client_id.flatten())
        .bind(changes.probability)
        .bind(changes.expected_value)
        .bind(changes.expected_close_date)
        .bind(changes.notes.as_deref())
        .fetch_one(executor)
        .await?;
        Ok(deal)
    }

    pub async fn delete_deal<'e, E>(&self, executor: E, id: Uuid) -> Result<u64, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query("DELETE FROM sales_pipeline WHERE id = $1")
            .bind(id)
            .execute(executor)
            .await?;
        Ok(result.rows_affected())
    }

    // =========================================================================
    //  VENDAS
    // =========================================================================

    fn sale_select() -> String {
        format!(
            "s.*, {client} AS client_name, {rep} AS sales_representative_name, {ownership}",
            client = full_name_sql("cl"),
            rep = full_name_sql("u"),
            ownership = EntityKind::Sale.ownership_columns(),
        )
    }

    pub async fn find_sale_visible<'e, E>(
        &self,
        executor: E,
        predicate: &Predicate,
        id: Uuid,
    ) -> Result<Option<SaleRecord>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let select = Self::sale_select();
        let mut qb = scoped_query(&select, EntityKind::Sale, CLIENT_JOIN_SALE, predicate);
        qb.push(" AND s.id = ").push_bind(id);

        let sale = qb
            .build_query_as::<SaleRecord>()
            .fetch_optional(executor)
            .await?;
        Ok(sale)
    }

    pub async fn list_sales<'e, E>(
        &self,
        executor: E,
        predicate: &Predicate,
    ) -> Result<Vec<SaleRecord>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let select = Self::sale_select();
        let mut qb = scoped_query(&select, EntityKind::Sale, CLIENT_JOIN_SALE, predicate);
        qb.push(" ORDER BY s.created_at DESC");

        let sales = qb.build_query_as::<SaleRecord>().fetch_all(executor).await?;
        Ok(sales)
    }

    #[allow(clippy::too_many_arguments)]
    pub async fn create_sale<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        client_id: Option<Uuid>,
        sales_representative_id: Uuid,
        invoice_number: &str,
        status: SaleStatus,
        total_amount: Decimal,
        notes: Option<&str>,
    ) -> Result<Sale, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, Sale>(
            r#"
            INSERT INTO sales (
                tenant_id, client_id, sales_representative_id, invoice_number, status,
                total_amount, notes
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING *
            "#,
        )
        .bind(tenant_id)
        .bind(client_id)
        .bind(sales_representative_id)
        .bind(invoice_number)
        .bind(status)
        .bind(total_amount)
        .bind(notes)
        .fetch_one(executor)
        .await
        .map_err(|e| AppError::from_unique_violation(e, "Já existe uma venda com este número de nota."))
    }

    pub async fn update_sale<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        changes: &UpdateSalePayload,
    ) -> Result<Sale, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sale = sqlx::query_as::<_, Sale>(
            r#"
            UPDATE sales SET
                status = COALESCE($2, status),
                notes = COALESCE($3, notes),
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(changes.status)
        .bind(changes.notes.as_deref())
        .fetch_one(executor)
        .await?;
        Ok(sale)
    }

    /// Os itens saem junto (ON DELETE CASCADE).
    pub async fn delete_sale<'e, E>(&self, executor: E, id: Uuid) -> Result<u64, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query("DELETE FROM sales WHERE id = $1")
            .bind(id)
            .execute(executor)
            .await?;
        Ok(result.rows_affected())
    }

    pub async fn sale_items<'e, E>(&self, executor: E, sale_id: Uuid) -> Result<Vec<SaleItem>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let items = sqlx::query_as::<_, SaleItem>(
            "SELECT * FROM sale_items WHERE sale_id = $1 ORDER BY created_at ASC",
        )
        .bind(sale_id)
        .fetch_all(executor)
        .await?;
        Ok(items)
    }

    pub async fn add_sale_item<'e, E>(
        &self,
        executor: E,
        sale_id: Uuid,
        item: &NewSaleItem,
    ) -> Result<SaleItem, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let item = sqlx::query_as::<_, SaleItem>(
            r#"
            INSERT INTO sale_items (sale_id, product_id, quantity, unit_price, total_price)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *
            "#,
        )
        .bind(sale_id)
        .bind(item.product_id)
        .bind(item.quantity)
        .bind(item.unit_price)
        .bind(item.total_price())
        .fetch_one(executor)
        .await?;
        Ok(item)
    }
}
