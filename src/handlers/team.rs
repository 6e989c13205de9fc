// src/handlers/team.rs

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde::Deserialize;
use utoipa::IntoParams;
use uuid::Uuid;

use super::dashboard::TenantQuery;
use crate::{
    common::error::AppError,
    config::AppState,
    middleware::rbac::{ManagersOnly, RequireRole, UserManagers},
    models::{
        dashboard::{ManagerDashboard, TeamStats},
        team::{
            CreateTeamMemberPayload, TeamMemberActivity, TeamMemberRecord,
            UpdateTeamMemberPayload,
        },
    },
    scope::{Actor, ListFilters},
};

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct SearchQuery {
    /// Nome, usuário, e-mail, código ou cargo
    pub q: String,
}

// GET /api/team-members
#[utoipa::path(
    get,
    path = "/api/team-members",
    tag = "Team",
    params(ListFilters),
    responses(
        (status = 200, description = "Membros visíveis ao chamador", body = Vec<TeamMemberRecord>)
    ),
    security(("api_jwt" = []))
)]
pub async fn list_members(
    State(app_state): State<AppState>,
    actor: Actor,
    Query(filters): Query<ListFilters>,
) -> Result<impl IntoResponse, AppError> {
    let members = app_state.team_service.list(&actor, &filters).await?;
    Ok((StatusCode::OK, Json(members)))
}

// GET /api/team-members/search?q=
#[utoipa::path(
    get,
    path = "/api/team-members/search",
    tag = "Team",
    params(SearchQuery),
    responses(
        (status = 200, description = "Resultado da busca", body = Vec<TeamMemberRecord>),
        (status = 400, description = "Termo de busca vazio")
    ),
    security(("api_jwt" = []))
)]
pub async fn search_members(
    State(app_state): State<AppState>,
    actor: Actor,
    Query(query): Query<SearchQuery>,
) -> Result<impl IntoResponse, AppError> {
    let members = app_state.team_service.search(&actor, &query.q).await?;
    Ok((StatusCode::OK, Json(members)))
}

// GET /api/team-members/{id}
#[utoipa::path(
    get,
    path = "/api/team-members/{id}",
    tag = "Team",
    params(("id" = Uuid, Path, description = "ID do membro")),
    responses(
        (status = 200, description = "Membro encontrado", body = TeamMemberRecord),
        (status = 404, description = "Membro inexistente ou fora do escopo")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_member(
    State(app_state): State<AppState>,
    actor: Actor,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let member = app_state.team_service.get(&actor, id).await?;
    Ok((StatusCode::OK, Json(member)))
}

// GET /api/team-members/{id}/activities
#[utoipa::path(
    get,
    path = "/api/team-members/{id}/activities",
    tag = "Team",
    params(("id" = Uuid, Path, description = "ID do membro")),
    responses(
        (status = 200, description = "Histórico do membro", body = Vec<TeamMemberActivity>),
        (status = 404, description = "Membro inexistente ou fora do escopo")
    ),
    security(("api_jwt" = []))
)]
pub async fn list_member_activities(
    State(app_state): State<AppState>,
    actor: Actor,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let activities = app_state.team_service.activities(&actor, id).await?;
    Ok((StatusCode::OK, Json(activities)))
}

// POST /api/team-members
#[utoipa::path(
    post,
    path = "/api/team-members",
    tag = "Team",
    request_body = CreateTeamMemberPayload,
    responses(
        (status = 201, description = "Usuário e membro criados", body = TeamMemberRecord),
        (status = 400, description = "Dados inválidos ou gerente inexistente"),
        (status = 403, description = "Papel sem permissão")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_member(
    State(app_state): State<AppState>,
    _guard: RequireRole<UserManagers>,
    actor: Actor,
    Json(payload): Json<CreateTeamMemberPayload>,
) -> Result<impl IntoResponse, AppError> {
    let member = app_state.team_service.create(&actor, &payload).await?;
    Ok((StatusCode::CREATED, Json(member)))
}

// PATCH /api/team-members/{id}
#[utoipa::path(
    patch,
    path = "/api/team-members/{id}",
    tag = "Team",
    request_body = UpdateTeamMemberPayload,
    params(("id" = Uuid, Path, description = "ID do membro")),
    responses(
        (status = 200, description = "Membro atualizado", body = TeamMemberRecord),
        (status = 400, description = "Gerente inexistente ou ciclo na hierarquia"),
        (status = 404, description = "Membro inexistente ou fora do escopo")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_member(
    State(app_state): State<AppState>,
    _guard: RequireRole<UserManagers>,
    actor: Actor,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateTeamMemberPayload>,
) -> Result<impl IntoResponse, AppError> {
    let member = app_state.team_service.update(&actor, id, &payload).await?;
    Ok((StatusCode::OK, Json(member)))
}

// DELETE /api/team-members/{id}
#[utoipa::path(
    delete,
    path = "/api/team-members/{id}",
    tag = "Team",
    params(("id" = Uuid, Path, description = "ID do membro")),
    responses(
        (status = 204, description = "Membro e usuário removidos"),
        (status = 404, description = "Membro inexistente ou fora do escopo")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_member(
    State(app_state): State<AppState>,
    _guard: RequireRole<UserManagers>,
    actor: Actor,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    app_state.team_service.delete(&actor, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// GET /api/team-stats
#[utoipa::path(
    get,
    path = "/api/team-stats",
    tag = "Team",
    params(TenantQuery),
    responses(
        (status = 200, description = "Indicadores da equipe", body = TeamStats)
    ),
    security(("api_jwt" = []))
)]
pub async fn get_team_stats(
    State(app_state): State<AppState>,
    actor: Actor,
    Query(query): Query<TenantQuery>,
) -> Result<impl IntoResponse, AppError> {
    let stats = app_state
        .dashboard_service
        .team_stats(&actor, query.tenant_id)
        .await?;
    Ok((StatusCode::OK, Json(stats)))
}

// GET /api/managers/dashboard
#[utoipa::path(
    get,
    path = "/api/managers/dashboard",
    tag = "Team",
    responses(
        (status = 200, description = "Subordinados diretos e clientes da loja", body = ManagerDashboard),
        (status = 403, description = "Apenas gerentes")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_manager_dashboard(
    State(app_state): State<AppState>,
    _guard: RequireRole<ManagersOnly>,
    actor: Actor,
) -> Result<impl IntoResponse, AppError> {
    let dashboard = app_state.dashboard_service.manager_dashboard(&actor).await?;
    Ok((StatusCode::OK, Json(dashboard)))
}
