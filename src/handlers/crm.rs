// src/handlers/crm.rs

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
    models::crm::{ClientRecord, CreateClientPayload, CreatePurchasePayload, Purchase},
    scope::{Actor, ListFilters},
};

// GET /api/clients
#[utoipa::path(
    get,
    path = "/api/clients",
    tag = "CRM",
    params(ListFilters),
    responses(
        (status = 200, description = "Clientes visíveis ao chamador", body = Vec<ClientRecord>)
    ),
    security(("api_jwt" = []))
)]
pub async fn list_clients(
    State(app_state): State<AppState>,
    actor: Actor,
    Query(filters): Query<ListFilters>,
) -> Result<impl IntoResponse, AppError> {
    let clients = app_state.crm_service.list_clients(&actor, &filters).await?;
    Ok((StatusCode::OK, Json(clients)))
}

// POST /api/clients
#[utoipa::path(
    post,
    path = "/api/clients",
    tag = "CRM",
    request_body = CreateClientPayload,
    responses(
        (status = 201, description = "Cliente criado", body = ClientRecord),
        (status = 400, description = "Responsável fora do tenant")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_client(
    State(app_state): State<AppState>,
    actor: Actor,
    Json(payload): Json<CreateClientPayload>,
) -> Result<impl IntoResponse, AppError> {
    let client = app_state.crm_service.create_client(&actor, &payload).await?;
    Ok((StatusCode::CREATED, Json(client)))
}

// POST /api/clients/{id}/purchases
#[utoipa::path(
    post,
    path = "/api/clients/{id}/purchases",
    tag = "CRM",
    request_body = CreatePurchasePayload,
    params(("id" = Uuid, Path, description = "ID do cliente")),
    responses(
        (status = 201, description = "Compra registrada", body = Purchase),
        (status = 400, description = "Valor inválido"),
        (status = 404, description = "Cliente inexistente ou fora do escopo")
    ),
    security(("api_jwt" = []))
)]
pub async fn add_purchase(
    State(app_state): State<AppState>,
    actor: Actor,
    Path(client_id): Path<Uuid>,
    Json(payload): Json<CreatePurchasePayload>,
) -> Result<impl IntoResponse, AppError> {
    let purchase = app_state
        .crm_service
        .add_purchase(&actor, client_id, &payload)
        .await?;
    Ok((StatusCode::CREATED, Json(purchase)))
}
