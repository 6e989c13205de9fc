// src/handlers/dashboard.rs

use axum::{
    Json,
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde::Deserialize;
use utoipa::IntoParams;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    config::AppState,
    metrics::{Calendar, DateWindow},
    models::dashboard::{DashboardOverview, DashboardStats, PipelineAnalytics, RevenueAnalytics},
    scope::Actor,
};

/// Tenant alvo dos painéis. Ignorado para quem já pertence a um tenant.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct TenantQuery {
    /// Só para administradores da plataforma
    pub tenant_id: Option<Uuid>,
}

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct AnalyticsQuery {
    /// AAAA-MM-DD
    pub start_date: Option<String>,
    /// AAAA-MM-DD
    pub end_date: Option<String>,
    pub tenant_id: Option<Uuid>,
}

impl AnalyticsQuery {
    pub fn window(&self, calendar: &Calendar) -> Result<DateWindow, AppError> {
        DateWindow::from_params(
            self.start_date.as_deref(),
            self.end_date.as_deref(),
            calendar.today,
        )
    }
}

// GET /api/analytics/dashboard
#[utoipa::path(
    get,
    path = "/api/analytics/dashboard",
    tag = "Dashboard",
    params(TenantQuery),
    responses(
        (status = 200, description = "Vendas, funil, conversão e receita do mês", body = DashboardOverview),
        (status = 401, description = "Não autorizado")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_overview(
    State(app_state): State<AppState>,
    actor: Actor,
    Query(query): Query<TenantQuery>,
) -> Result<impl IntoResponse, AppError> {
    let overview = app_state
        .dashboard_service
        .overview(&actor, query.tenant_id)
        .await?;
    Ok((StatusCode::OK, Json(overview)))
}

// GET /api/analytics/dashboard-stats
#[utoipa::path(
    get,
    path = "/api/analytics/dashboard-stats",
    tag = "Dashboard",
    params(TenantQuery),
    responses(
        (status = 200, description = "Totais e vendas recentes", body = DashboardStats)
    ),
    security(("api_jwt" = []))
)]
pub async fn get_stats(
    State(app_state): State<AppState>,
    actor: Actor,
    Query(query): Query<TenantQuery>,
) -> Result<impl IntoResponse, AppError> {
    let stats = app_state.dashboard_service.stats(&actor, query.tenant_id).await?;
    Ok((StatusCode::OK, Json(stats)))
}

// GET /api/analytics/pipeline
#[utoipa::path(
    get,
    path = "/api/analytics/pipeline",
    tag = "Dashboard",
    params(TenantQuery),
    responses(
        (status = 200, description = "Velocidade por estágio, ganhos/perdas e tamanho dos negócios", body = PipelineAnalytics)
    ),
    security(("api_jwt" = []))
)]
pub async fn get_pipeline_analytics(
    State(app_state): State<AppState>,
    actor: Actor,
    Query(query): Query<TenantQuery>,
) -> Result<impl IntoResponse, AppError> {
    let analytics = app_state
        .dashboard_service
        .pipeline(&actor, query.tenant_id)
        .await?;
    Ok((StatusCode::OK, Json(analytics)))
}

// GET /api/analytics/revenue
#[utoipa::path(
    get,
    path = "/api/analytics/revenue",
    tag = "Dashboard",
    params(AnalyticsQuery),
    responses(
        (status = 200, description = "Receita por dia, vendedor, produto e loja", body = RevenueAnalytics),
        (status = 400, description = "Data inválida")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_revenue_analytics(
    State(app_state): State<AppState>,
    actor: Actor,
    Query(query): Query<AnalyticsQuery>,
) -> Result<impl IntoResponse, AppError> {
    let window = query.window(&Calendar::current())?;

    let analytics = app_state
        .dashboard_service
        .revenue(&actor, query.tenant_id, window)
        .await?;
    Ok((StatusCode::OK, Json(analytics)))
}
