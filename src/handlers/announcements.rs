// src/handlers/announcements.rs

use axum::{
    Json,
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
};

use crate::{
    common::error::AppError,
    config::AppState,
    models::announcements::{Announcement, CreateAnnouncementPayload},
    scope::{Actor, ListFilters},
};

// GET /api/announcements
#[utoipa::path(
    get,
    path = "/api/announcements",
    tag = "Announcements",
    params(ListFilters),
    responses(
        (status = 200, description = "Comunicados ativos", body = Vec<Announcement>)
    ),
    security(("api_jwt" = []))
)]
pub async fn list_announcements(
    State(app_state): State<AppState>,
    actor: Actor,
    Query(filters): Query<ListFilters>,
) -> Result<impl IntoResponse, AppError> {
    let announcements = app_state
        .announcement_service
        .list_active(&actor, &filters)
        .await?;
    Ok((StatusCode::OK, Json(announcements)))
}

// POST /api/announcements
#[utoipa::path(
    post,
    path = "/api/announcements",
    tag = "Announcements",
    request_body = CreateAnnouncementPayload,
    responses(
        (status = 201, description = "Comunicado publicado", body = Announcement),
        (status = 403, description = "Usuário sem tenant")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_announcement(
    State(app_state): State<AppState>,
    actor: Actor,
    Json(payload): Json<CreateAnnouncementPayload>,
) -> Result<impl IntoResponse, AppError> {
    let announcement = app_state
        .announcement_service
        .create(&actor, &payload)
        .await?;
    Ok((StatusCode::CREATED, Json(announcement)))
}
