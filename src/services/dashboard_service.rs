// src/services/dashboard_service.rs

use chrono::{Duration, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::{db_utils::begin_read_snapshot, error::AppError},
    db::DashboardRepository,
    metrics::{
        Calendar, DateWindow,
        catalog::product_stats,
        pipeline::{conversion, pipeline_analytics, pipeline_overview},
        sales::{
            order_trend, revenue_by_product, revenue_by_rep, revenue_by_store, revenue_overview,
            revenue_total, revenue_trend, sales_summary,
        },
        team::{manager_dashboard, team_stats},
    },
    models::{
        auth::Role,
        dashboard::{
            DashboardOverview, DashboardStats, ManagerDashboard, PipelineAnalytics, ProductStats,
            RevenueAnalytics, TeamStats,
        },
    },
    scope::{Actor, TenantScope},
};

const RECENT_SALES: i64 = 5;
const RECENT_ACTIVITIES: i64 = 10;
const SALES_TREND_DAYS: u64 = 7;
const RECENT_PRODUCT_DAYS: i64 = 30;

// Cada painel lê tudo dentro de um único snapshot (ver `begin_read_snapshot`)
// e reduz em memória com as funções de `metrics`. Sem tenant para consultar,
// o painel sai zerado.
#[derive(Clone)]
pub struct DashboardService {
    pool: PgPool,
    repo: DashboardRepository,
}

impl DashboardService {
    pub fn new(pool: PgPool, repo: DashboardRepository) -> Self {
        Self { pool, repo }
    }

    pub async fn overview(
        &self,
        actor: &Actor,
        tenant: Option<Uuid>,
    ) -> Result<DashboardOverview, AppError> {
        let Some(scope) = TenantScope::for_actor(actor, tenant) else {
            return Ok(DashboardOverview::default());
        };

        let mut tx = begin_read_snapshot(&self.pool).await?;
        let sales = self.repo.sale_figures(&mut *tx, &scope).await?;
        let lines = self.repo.sale_line_figures(&mut *tx, &scope).await?;
        let deals = self.repo.deal_figures(&mut *tx, &scope).await?;
        tx.commit().await?;

        let calendar = Calendar::current();
        Ok(DashboardOverview {
            sales: sales_summary(&sales, &calendar),
            pipeline: pipeline_overview(&deals),
            conversion: conversion(&deals, &calendar),
            revenue: revenue_overview(&sales, &lines, &calendar),
        })
    }

    /// Painel simples do vendedor interno.
    pub async fn stats(&self, actor: &Actor, tenant: Option<Uuid>) -> Result<DashboardStats, AppError> {
        let Some(scope) = TenantScope::for_actor(actor, tenant) else {
            return Ok(DashboardStats::default());
        };

        let mut tx = begin_read_snapshot(&self.pool).await?;
        let sales = self.repo.sale_figures(&mut *tx, &scope).await?;
        let total_clients = self.repo.client_count(&mut *tx, &scope).await?;
        let active_announcements = self.repo.active_announcement_count(&mut *tx, &scope).await?;
        let recent_sales = self.repo.recent_sales(&mut *tx, &scope, RECENT_SALES).await?;
        tx.commit().await?;

        let calendar = Calendar::current();
        Ok(DashboardStats {
            total_revenue: revenue_total(&sales),
            total_clients,
            total_orders: sales.len(),
            active_announcements,
            recent_sales,
            sales_trend: order_trend(&sales, calendar.days_ago(SALES_TREND_DAYS)),
        })
    }

    pub async fn pipeline(
        &self,
        actor: &Actor,
        tenant: Option<Uuid>,
    ) -> Result<PipelineAnalytics, AppError> {
        let Some(scope) = TenantScope::for_actor(actor, tenant) else {
            return Ok(PipelineAnalytics::default());
        };

        let deals = self.repo.deal_figures(&self.pool, &scope).await?;
        Ok(pipeline_analytics(&deals))
    }

    /// Receita dentro de `window`. O período já chega validado.
    pub async fn revenue(
        &self,
        actor: &Actor,
        tenant: Option<Uuid>,
        window: DateWindow,
    ) -> Result<RevenueAnalytics, AppError> {
        let Some(scope) = TenantScope::for_actor(actor, tenant) else {
            return Ok(RevenueAnalytics {
                revenue_trends: Vec::new(),
                revenue_by_rep: Vec::new(),
                revenue_by_product: Vec::new(),
                revenue_by_store: Vec::new(),
                date_range: window,
            });
        };

        let mut tx = begin_read_snapshot(&self.pool).await?;
        let sales = self.repo.sale_figures(&mut *tx, &scope).await?;
        let lines = self.repo.sale_line_figures(&mut *tx, &scope).await?;
        tx.commit().await?;

        Ok(RevenueAnalytics {
            revenue_trends: revenue_trend(&sales, &window),
            revenue_by_rep: revenue_by_rep(&sales, &window),
            revenue_by_product: revenue_by_product(&lines, &window),
            revenue_by_store: revenue_by_store(&sales, &window),
            date_range: window,
        })
    }

    pub async fn team_stats(&self, actor: &Actor, tenant: Option<Uuid>) -> Result<TeamStats, AppError> {
        let Some(scope) = TenantScope::for_actor(actor, tenant) else {
            return Ok(TeamStats::default());
        };

        let mut tx = begin_read_snapshot(&self.pool).await?;
        let members = self.repo.member_figures(&mut *tx, &scope).await?;
        let activities = self
            .repo
            .recent_activities(&mut *tx, &scope, RECENT_ACTIVITIES)
            .await?;
        tx.commit().await?;

        Ok(team_stats(&members, activities))
    }

    /// Painel do gerente: só os subordinados diretos e os clientes da loja
    /// dele.
    pub async fn manager_dashboard(&self, actor: &Actor) -> Result<ManagerDashboard, AppError> {
        if !actor.has_role(Role::Manager) {
            return Err(AppError::Forbidden(
                "Apenas gerentes podem acessar este painel.".into(),
            ));
        }
        let Some(scope) = TenantScope::for_actor(actor, None) else {
            return Ok(ManagerDashboard::default());
        };

        let mut tx = begin_read_snapshot(&self.pool).await?;
        let reports = self.repo.direct_report_figures(&mut *tx, &scope).await?;
        let activities = self
            .repo
            .direct_report_activities(&mut *tx, &scope, RECENT_ACTIVITIES)
            .await?;
        let store_clients = match actor.store_id {
            Some(store) => Some(self.repo.store_client_figures(&mut *tx, &scope, store).await?),
            None => None,
        };
        tx.commit().await?;

        Ok(manager_dashboard(
            &reports,
            store_clients.as_deref(),
            activities,
        ))
    }

    pub async fn product_stats(
        &self,
        actor: &Actor,
        tenant: Option<Uuid>,
    ) -> Result<ProductStats, AppError> {
        let Some(scope) = TenantScope::for_actor(actor, tenant) else {
            return Ok(ProductStats::default());
        };

        let mut tx = begin_read_snapshot(&self.pool).await?;
        let products = self.repo.product_figures(&mut *tx, &scope).await?;
        let total_categories = self.repo.category_count(&mut *tx, &scope).await?;
        tx.commit().await?;

        let recent_since = Utc::now() - Duration::days(RECENT_PRODUCT_DAYS);
        Ok(product_stats(&products, total_categories, recent_since))
    }
}
