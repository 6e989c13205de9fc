// src/handlers/sales.rs

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::rbac::{RequireRole, Supervisors},
    models::sales::{
        CreateDealPayload, CreateSalePayload, DealRecord, SaleDetail, SaleRecord,
        TransitionDealPayload, UpdateDealPayload, UpdateSalePayload,
    },
    scope::{Actor, ListFilters},
};

// ===
// FUNIL
// ===

// GET /api/sales/pipeline
#[utoipa::path(
    get,
    path = "/api/sales/pipeline",
    tag = "Sales",
    params(ListFilters),
    responses(
        (status = 200, description = "Negócios visíveis ao chamador", body = Vec<DealRecord>)
    ),
    security(("api_jwt" = []))
)]
pub async fn list_deals(
    State(app_state): State<AppState>,
    actor: Actor,
    Query(filters): Query<ListFilters>,
) -> Result<impl IntoResponse, AppError> {
    let deals = app_state.sales_service.list_deals(&actor, &filters).await?;
    Ok((StatusCode::OK, Json(deals)))
}

// POST /api/sales/pipeline
#[utoipa::path(
    post,
    path = "/api/sales/pipeline",
    tag = "Sales",
    request_body = CreateDealPayload,
    responses(
        (status = 201, description = "Negócio criado", body = DealRecord),
        (status = 400, description = "Cliente ou vendedor fora do tenant")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_deal(
    State(app_state): State<AppState>,
    actor: Actor,
    Json(payload): Json<CreateDealPayload>,
) -> Result<impl IntoResponse, AppError> {
    let deal = app_state.sales_service.create_deal(&actor, &payload).await?;
    Ok((StatusCode::CREATED, Json(deal)))
}

// GET /api/sales/pipeline/{id}
#[utoipa::path(
    get,
    path = "/api/sales/pipeline/{id}",
    tag = "Sales",
    params(("id" = Uuid, Path, description = "ID do negócio")),
    responses(
        (status = 200, description = "Negócio encontrado", body = DealRecord),
        (status = 404, description = "Negócio inexistente ou fora do escopo")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_deal(
    State(app_state): State<AppState>,
    actor: Actor,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let deal = app_state.sales_service.get_deal(&actor, id).await?;
    Ok((StatusCode::OK, Json(deal)))
}

// PATCH /api/sales/pipeline/{id}
#[utoipa::path(
    patch,
    path = "/api/sales/pipeline/{id}",
    tag = "Sales",
    request_body = UpdateDealPayload,
    params(("id" = Uuid, Path, description = "ID do negócio")),
    responses(
        (status = 200, description = "Negócio atualizado", body = DealRecord),
        (status = 400, description = "Dados inválidos ou cliente fora do tenant"),
        (status = 404, description = "Negócio inexistente ou fora do escopo")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_deal(
    State(app_state): State<AppState>,
    actor: Actor,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateDealPayload>,
) -> Result<impl IntoResponse, AppError> {
    let deal = app_state
        .sales_service
        .update_deal(&actor, id, &payload)
        .await?;
    Ok((StatusCode::OK, Json(deal)))
}

// DELETE /api/sales/pipeline/{id}
#[utoipa::path(
    delete,
    path = "/api/sales/pipeline/{id}",
    tag = "Sales",
    params(("id" = Uuid, Path, description = "ID do negócio")),
    responses(
        (status = 204, description = "Negócio removido"),
        (status = 403, description = "Papel sem permissão"),
        (status = 404, description = "Negócio inexistente ou fora do escopo")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_deal(
    State(app_state): State<AppState>,
    _guard: RequireRole<Supervisors>,
    actor: Actor,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    app_state.sales_service.delete_deal(&actor, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// POST /api/sales/pipeline/{id}/transition
#[utoipa::path(
    post,
    path = "/api/sales/pipeline/{id}/transition",
    tag = "Sales",
    request_body = TransitionDealPayload,
    params(("id" = Uuid, Path, description = "ID do negócio")),
    responses(
        (status = 200, description = "Estágio atualizado", body = DealRecord),
        (status = 404, description = "Negócio inexistente ou fora do escopo")
    ),
    security(("api_jwt" = []))
)]
pub async fn transition_deal(
    State(app_state): State<AppState>,
    actor: Actor,
    Path(id): Path<Uuid>,
    Json(payload): Json<TransitionDealPayload>,
) -> Result<impl IntoResponse, AppError> {
    let deal = app_state
        .sales_service
        .transition_deal(&actor, id, &payload)
        .await?;
    Ok((StatusCode::OK, Json(deal)))
}

// ===
// VENDAS
// ===

// GET /api/sales
#[utoipa::path(
    get,
    path = "/api/sales",
    tag = "Sales",
    params(ListFilters),
    responses(
        (status = 200, description = "Vendas visíveis ao chamador", body = Vec<SaleRecord>)
    ),
    security(("api_jwt" = []))
)]
pub async fn list_sales(
    State(app_state): State<AppState>,
    actor: Actor,
    Query(filters): Query<ListFilters>,
) -> Result<impl IntoResponse, AppError> {
    let sales = app_state.sales_service.list_sales(&actor, &filters).await?;
    Ok((StatusCode::OK, Json(sales)))
}

// POST /api/sales
#[utoipa::path(
    post,
    path = "/api/sales",
    tag = "Sales",
    request_body = CreateSalePayload,
    responses(
        (status = 201, description = "Venda registrada com os itens", body = SaleDetail),
        (status = 400, description = "Produto ou cliente fora do tenant"),
        (status = 409, description = "Número de nota já usado")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_sale(
    State(app_state): State<AppState>,
    actor: Actor,
    Json(payload): Json<CreateSalePayload>,
) -> Result<impl IntoResponse, AppError> {
    let sale = app_state.sales_service.create_sale(&actor, &payload).await?;
    Ok((StatusCode::CREATED, Json(sale)))
}

// GET /api/sales/{id}
#[utoipa::path(
    get,
    path = "/api/sales/{id}",
    tag = "Sales",
    params(("id" = Uuid, Path, description = "ID da venda")),
    responses(
        (status = 200, description = "Venda com os itens", body = SaleDetail),
        (status = 404, description = "Venda inexistente ou fora do escopo")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_sale(
    State(app_state): State<AppState>,
    actor: Actor,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let sale = app_state.sales_service.get_sale(&actor, id).await?;
    Ok((StatusCode::OK, Json(sale)))
}

// PATCH /api/sales/{id}
#[utoipa::path(
    patch,
    path = "/api/sales/{id}",
    tag = "Sales",
    request_body = UpdateSalePayload,
    params(("id" = Uuid, Path, description = "ID da venda")),
    responses(
        (status = 200, description = "Venda atualizada", body = SaleDetail),
        (status = 404, description = "Venda inexistente ou fora do escopo")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_sale(
    State(app_state): State<AppState>,
    actor: Actor,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateSalePayload>,
) -> Result<impl IntoResponse, AppError> {
    let sale = app_state
        .sales_service
        .update_sale(&actor, id, &payload)
        .await?;
    Ok((StatusCode::OK, Json(sale)))
}

// DELETE /api/sales/{id}
#[utoipa::path(
    delete,
    path = "/api/sales/{id}",
    tag = "Sales",
    params(("id" = Uuid, Path, description = "ID da venda")),
    responses(
        (status = 204, description = "Venda e itens removidos"),
        (status = 403, description = "Papel sem permissão"),
        (status = 404, description = "Venda inexistente ou fora do escopo")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_sale(
    State(app_state): State<AppState>,
    _guard: RequireRole<Supervisors>,
    actor: Actor,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    app_state.sales_service.delete_sale(&actor, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
