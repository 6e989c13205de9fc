// src/db/dashboard_repo.rs
//
// Leituras dos painéis. Todo método recebe um `TenantScope`: não existe
// agregação sem tenant concreto e sem as regras do ator aplicadas.

use sqlx::{Executor, Postgres};
use uuid::Uuid;

use super::full_name_sql;
use crate::{
    common::error::AppError,
    models::{
        dashboard::{ActivityEntry, RecentSale},
        figures::{ClientFigure, DealFigure, MemberFigure, ProductFigure, SaleFigure, SaleLineFigure},
    },
    scope::{EntityKind, Field, Predicate, TenantScope, scoped_query},
};

const SALE_LINE_JOINS: &str = "JOIN sale_items si ON si.sale_id = s.id \
     JOIN products sp ON sp.id = si.product_id \
     LEFT JOIN categories spc ON spc.id = sp.category_id";
const ACTIVITY_JOIN: &str = "JOIN team_member_activities act ON act.team_member_id = tm.id";
const PURCHASE_JOIN: &str = "LEFT JOIN purchases pu ON pu.client_id = c.id";

#[derive(Clone, Default)]
pub struct DashboardRepository;

impl DashboardRepository {
    pub fn new() -> Self {
        Self
    }

    // --- Vendas ---

    pub async fn sale_figures<'e, E>(
        &self,
        executor: E,
        scope: &TenantScope,
    ) -> Result<Vec<SaleFigure>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let select = format!(
            "s.status, s.total_amount, s.created_at, \
             COALESCE({rep}, u.username) AS rep_name, st.name AS store_name",
            rep = full_name_sql("u"),
        );
        let mut qb = scoped_query(&select, EntityKind::Sale, "", &scope.predicate(EntityKind::Sale));
        qb.push(" ORDER BY s.created_at");

        let rows = qb.build_query_as::<SaleFigure>().fetch_all(executor).await?;
        Ok(rows)
    }

    pub async fn sale_line_figures<'e, E>(
        &self,
        executor: E,
        scope: &TenantScope,
    ) -> Result<Vec<SaleLineFigure>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let mut qb = scoped_query(
            "s.status, s.created_at, sp.name AS product_name, spc.name AS category_name, \
             si.quantity, si.total_price",
            EntityKind::Sale,
            SALE_LINE_JOINS,
            &scope.predicate(EntityKind::Sale),
        );
        qb.push(" ORDER BY s.created_at");

        let rows = qb
            .build_query_as::<SaleLineFigure>()
            .fetch_all(executor)
            .await?;
        Ok(rows)
    }

    pub async fn recent_sales<'e, E>(
        &self,
        executor: E,
        scope: &TenantScope,
        limit: i64,
    ) -> Result<Vec<RecentSale>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let select = format!(
            "s.id, s.invoice_number, s.status, s.total_amount, {client} AS client_name, s.created_at",
            client = full_name_sql("cl"),
        );
        let mut qb = scoped_query(
            &select,
            EntityKind::Sale,
            "LEFT JOIN clients cl ON cl.id = s.client_id",
            &scope.predicate(EntityKind::Sale),
        );
        qb.push(" ORDER BY s.created_at DESC LIMIT ").push_bind(limit);

        let rows = qb.build_query_as::<RecentSale>().fetch_all(executor).await?;
        Ok(rows)
    }

    // --- Funil ---

    pub async fn deal_figures<'e, E>(
        &self,
        executor: E,
        scope: &TenantScope,
    ) -> Result<Vec<DealFigure>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let mut qb = scoped_query(
            "d.stage, d.expected_value, d.is_closed, d.created_at, d.updated_at, d.actual_close_date",
            EntityKind::Deal,
            "",
            &scope.predicate(EntityKind::Deal),
        );
        let rows = qb.build_query_as::<DealFigure>().fetch_all(executor).await?;
        Ok(rows)
    }

    // --- Equipe ---

    fn member_select() -> String {
        format!(
            "tm.id, COALESCE({name}, u.username) AS name, tm.status, tm.performance_rating, \
             tm.current_sales, tm.sales_target",
            name = full_name_sql("u"),
        )
    }

    fn activity_select() -> String {
        format!(
            "act.id, COALESCE({name}, u.username) AS member_name, act.activity_type, \
             act.description, act.created_at",
            name = full_name_sql("u"),
        )
    }

    /// Subordinados diretos do ator, dentro do que ele já enxerga.
    fn direct_reports(scope: &TenantScope) -> Predicate {
        scope
            .predicate(EntityKind::TeamMember)
            .and(Predicate::eq(Field::OwnerManager, scope.actor().user_id))
    }

    async fn members<'e, E>(&self, executor: E, predicate: &Predicate) -> Result<Vec<MemberFigure>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let select = Self::member_select();
        let mut qb = scoped_query(&select, EntityKind::TeamMember, "", predicate);
        let rows = qb.build_query_as::<MemberFigure>().fetch_all(executor).await?;
        Ok(rows)
    }

    async fn activities<'e, E>(
        &self,
        executor: E,
        predicate: &Predicate,
        limit: i64,
    ) -> Result<Vec<ActivityEntry>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let select = Self::activity_select();
        let mut qb = scoped_query(&select, EntityKind::TeamMember, ACTIVITY_JOIN, predicate);
        qb.push(" ORDER BY act.created_at DESC LIMIT ").push_bind(limit);

        let rows = qb.build_query_as::<ActivityEntry>().fetch_all(executor).await?;
        Ok(rows)
    }

    pub async fn member_figures<'e, E>(
        &self,
        executor: E,
        scope: &TenantScope,
    ) -> Result<Vec<MemberFigure>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        self.members(executor, &scope.predicate(EntityKind::TeamMember))
            .await
    }

    pub async fn direct_report_figures<'e, E>(
        &self,
        executor: E,
        scope: &TenantScope,
    ) -> Result<Vec<MemberFigure>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        self.members(executor, &Self::direct_reports(scope)).await
    }

    pub async fn recent_activities<'e, E>(
        &self,
        executor: E,
        scope: &TenantScope,
        limit: i64,
    ) -> Result<Vec<ActivityEntry>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        self.activities(executor, &scope.predicate(EntityKind::TeamMember), limit)
            .await
    }

    pub async fn direct_report_activities<'e, E>(
        &self,
        executor: E,
        scope: &TenantScope,
        limit: i64,
    ) -> Result<Vec<ActivityEntry>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        self.activities(executor, &Self::direct_reports(scope), limit)
            .await
    }

    // --- Clientes ---

    pub async fn client_count<'e, E>(&self, executor: E, scope: &TenantScope) -> Result<i64, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let mut qb = scoped_query(
            "COUNT(*)",
            EntityKind::Client,
            "",
            &scope.predicate(EntityKind::Client),
        );
        let count = qb.build_query_scalar::<i64>().fetch_one(executor).await?;
        Ok(count)
    }

    /// Um registro por cliente da loja, com a contagem e a soma das compras.
    pub async fn store_client_figures<'e, E>(
        &self,
        executor: E,
        scope: &TenantScope,
        store_id: Uuid,
    ) -> Result<Vec<ClientFigure>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let predicate = scope
            .predicate(EntityKind::Client)
            .and(Predicate::eq(Field::OwnerStore, store_id));
        let mut qb = scoped_query(
            "COUNT(pu.id) AS purchase_count, COALESCE(SUM(pu.amount), 0) AS purchase_total",
            EntityKind::Client,
            PURCHASE_JOIN,
            &predicate,
        );
        qb.push(" GROUP BY c.id");

        let rows = qb.build_query_as::<ClientFigure>().fetch_all(executor).await?;
        Ok(rows)
    }

    // --- Catálogo ---

    pub async fn product_figures<'e, E>(
        &self,
        executor: E,
        scope: &TenantScope,
    ) -> Result<Vec<ProductFigure>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let mut qb = scoped_query(
            "p.status, p.quantity, p.min_quantity, p.cost_price, p.created_at",
            EntityKind::Product,
            "",
            &scope.predicate(EntityKind::Product),
        );
        let rows = qb.build_query_as::<ProductFigure>().fetch_all(executor).await?;
        Ok(rows)
    }

    pub async fn category_count<'e, E>(&self, executor: E, scope: &TenantScope) -> Result<i64, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let mut qb = scoped_query(
            "COUNT(*)",
            EntityKind::Category,
            "",
            &scope.predicate(EntityKind::Category),
        );
        let count = qb.build_query_scalar::<i64>().fetch_one(executor).await?;
        Ok(count)
    }

    pub async fn active_announcement_count<'e, E>(
        &self,
        executor: E,
        scope: &TenantScope,
    ) -> Result<i64, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let mut qb = scoped_query(
            "COUNT(*)",
            EntityKind::Announcement,
            "",
            &scope.predicate(EntityKind::Announcement),
        );
        qb.push(" AND a.is_active");
        let count = qb.build_query_scalar::<i64>().fetch_one(executor).await?;
        Ok(count)
    }
}
