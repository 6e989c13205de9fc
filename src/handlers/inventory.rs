// src/handlers/inventory.rs

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};

use super::dashboard::TenantQuery;
use crate::{
    common::error::AppError,
    config::AppState,
    middleware::rbac::{CatalogEditors, CatalogReaders, RequireRole},
    models::{
        dashboard::ProductStats,
        inventory::{
            Category, CreateCategoryPayload, CreateProductPayload, Product, ProductListEntry,
            UpdateCategoryPayload, UpdateProductPayload,
        },
    },
    scope::{Actor, ListFilters},
};
use uuid::Uuid;

// GET /api/products
#[utoipa::path(
    get,
    path = "/api/products",
    tag = "Inventory",
    params(ListFilters),
    responses(
        (status = 200, description = "Produtos do tenant", body = Vec<ProductListEntry>),
        (status = 403, description = "Papel sem acesso ao catálogo")
    ),
    security(("api_jwt" = []))
)]
pub async fn list_products(
    State(app_state): State<AppState>,
    _guard: RequireRole<CatalogReaders>,
    actor: Actor,
    Query(filters): Query<ListFilters>,
) -> Result<impl IntoResponse, AppError> {
    let products = app_state
        .inventory_service
        .list_products(&actor, &filters)
        .await?;
    Ok((StatusCode::OK, Json(products)))
}

// POST /api/products
#[utoipa::path(
    post,
    path = "/api/products",
    tag = "Inventory",
    request_body = CreateProductPayload,
    responses(
        (status = 201, description = "Produto criado", body = Product),
        (status = 400, description = "Categoria fora do tenant"),
        (status = 409, description = "SKU já existe")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_product(
    State(app_state): State<AppState>,
    _guard: RequireRole<CatalogEditors>,
    actor: Actor,
    Json(payload): Json<CreateProductPayload>,
) -> Result<impl IntoResponse, AppError> {
    let product = app_state
        .inventory_service
        .create_product(&actor, &payload)
        .await?;
    Ok((StatusCode::CREATED, Json(product)))
}

// GET /api/products/categories
#[utoipa::path(
    get,
    path = "/api/products/categories",
    tag = "Inventory",
    params(ListFilters),
    responses(
        (status = 200, description = "Categorias do tenant", body = Vec<Category>)
    ),
    security(("api_jwt" = []))
)]
pub async fn list_categories(
    State(app_state): State<AppState>,
    _guard: RequireRole<CatalogReaders>,
    actor: Actor,
    Query(filters): Query<ListFilters>,
) -> Result<impl IntoResponse, AppError> {
    let categories = app_state
        .inventory_service
        .list_categories(&actor, &filters)
        .await?;
    Ok((StatusCode::OK, Json(categories)))
}

// POST /api/products/categories
#[utoipa::path(
    post,
    path = "/api/products/categories",
    tag = "Inventory",
    request_body = CreateCategoryPayload,
    responses(
        (status = 201, description = "Categoria criada", body = Category),
        (status = 409, description = "Categoria já existe")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_category(
    State(app_state): State<AppState>,
    _guard: RequireRole<CatalogEditors>,
    actor: Actor,
    Json(payload): Json<CreateCategoryPayload>,
) -> Result<impl IntoResponse, AppError> {
    let category = app_state
        .inventory_service
        .create_category(&actor, &payload)
        .await?;
    Ok((StatusCode::CREATED, Json(category)))
}

// GET /api/products/stats
#[utoipa::path(
    get,
    path = "/api/products/stats",
    tag = "Inventory",
    params(TenantQuery),
    responses(
        (status = 200, description = "Indicadores do catálogo", body = ProductStats)
    ),
    security(("api_jwt" = []))
)]
pub async fn get_product_stats(
    State(app_state): State<AppState>,
    _guard: RequireRole<CatalogReaders>,
    actor: Actor,
    Query(query): Query<TenantQuery>,
) -> Result<impl IntoResponse, AppError> {
    let stats = app_state
        .dashboard_service
        .product_stats(&actor, query.tenant_id)
        .await?;
    Ok((StatusCode::OK, Json(stats)))
}

// GET /api/products/{id}
#[utoipa::path(
    get,
    path = "/api/products/{id}",
    tag = "Inventory",
    params(("id" = Uuid, Path, description = "ID do produto")),
    responses(
        (status = 200, description = "Produto encontrado", body = ProductListEntry),
        (status = 404, description = "Produto inexistente ou de outro tenant")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_product(
    State(app_state): State<AppState>,
    _guard: RequireRole<CatalogReaders>,
    actor: Actor,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let product = app_state.inventory_service.get_product(&actor, id).await?;
    Ok((StatusCode::OK, Json(product)))
}

// PATCH /api/products/{id}
#[utoipa::path(
    patch,
    path = "/api/products/{id}",
    tag = "Inventory",
    request_body = UpdateProductPayload,
    params(("id" = Uuid, Path, description = "ID do produto")),
    responses(
        (status = 200, description = "Produto atualizado", body = ProductListEntry),
        (status = 400, description = "Dados inválidos ou categoria fora do tenant"),
        (status = 404, description = "Produto inexistente ou de outro tenant"),
        (status = 409, description = "SKU já existe")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_product(
    State(app_state): State<AppState>,
    _guard: RequireRole<CatalogEditors>,
    actor: Actor,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateProductPayload>,
) -> Result<impl IntoResponse, AppError> {
    let product = app_state
        .inventory_service
        .update_product(&actor, id, &payload)
        .await?;
    Ok((StatusCode::OK, Json(product)))
}

// DELETE /api/products/{id}
#[utoipa::path(
    delete,
    path = "/api/products/{id}",
    tag = "Inventory",
    params(("id" = Uuid, Path, description = "ID do produto")),
    responses(
        (status = 204, description = "Produto removido"),
        (status = 404, description = "Produto inexistente ou de outro tenant"),
        (status = 409, description = "Produto já vendido")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_product(
    State(app_state): State<AppState>,
    _guard: RequireRole<CatalogEditors>,
    actor: Actor,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    app_state.inventory_service.delete_product(&actor, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// GET /api/products/categories/{id}
#[utoipa::path(
    get,
    path = "/api/products/categories/{id}",
    tag = "Inventory",
    params(("id" = Uuid, Path, description = "ID da categoria")),
    responses(
        (status = 200, description = "Categoria encontrada", body = Category),
        (status = 404, description = "Categoria inexistente ou de outro tenant")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_category(
    State(app_state): State<AppState>,
    _guard: RequireRole<CatalogReaders>,
    actor: Actor,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let category = app_state.inventory_service.get_category(&actor, id).await?;
    Ok((StatusCode::OK, Json(category)))
}

// GET /api/products/categories/{id}/products
#[utoipa::path(
    get,
    path = "/api/products/categories/{id}/products",
    tag = "Inventory",
    params(("id" = Uuid, Path, description = "ID da categoria")),
    responses(
        (status = 200, description = "Produtos da categoria", body = Vec<ProductListEntry>),
        (status = 404, description = "Categoria inexistente ou de outro tenant")
    ),
    security(("api_jwt" = []))
)]
pub async fn list_category_products(
    State(app_state): State<AppState>,
    _guard: RequireRole<CatalogReaders>,
    actor: Actor,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let products = app_state
        .inventory_service
        .products_in_category(&actor, id)
        .await?;
    Ok((StatusCode::OK, Json(products)))
}

// PATCH /api/products/categories/{id}
#[utoipa::path(
    patch,
    path = "/api/products/categories/{id}",
    tag = "Inventory",
    request_body = UpdateCategoryPayload,
    params(("id" = Uuid, Path, description = "ID da categoria")),
    responses(
        (status = 200, description = "Categoria atualizada", body = Category),
        (status = 404, description = "Categoria inexistente ou de outro tenant"),
        (status = 409, description = "Categoria já existe")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_category(
    State(app_state): State<AppState>,
    _guard: RequireRole<CatalogEditors>,
    actor: Actor,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateCategoryPayload>,
) -> Result<impl IntoResponse, AppError> {
    let category = app_state
        .inventory_service
        .update_category(&actor, id, &payload)
        .await?;
    Ok((StatusCode::OK, Json(category)))
}

// DELETE /api/products/categories/{id}
#[utoipa::path(
    delete,
    path = "/api/products/categories/{id}",
    tag = "Inventory",
    params(("id" = Uuid, Path, description = "ID da categoria")),
    responses(
        (status = 204, description = "Categoria removida; os produtos ficam sem categoria"),
        (status = 404, description = "Categoria inexistente ou de outro tenant")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_category(
    State(app_state): State<AppState>,
    _guard: RequireRole<CatalogEditors>,
    actor: Actor,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    app_state
        .inventory_service
        .delete_category(&actor, id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
