// src/models/announcements.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Announcement {
    pub id: Uuid,
    #[schema(ignore)]
    pub tenant_id: Uuid,
    pub author_id: Option<Uuid>,
    #[schema(example = "Nova coleção de outono")]
    pub title: String,
    pub content: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateAnnouncementPayload {
    #[validate(length(min = 1, max = 200, message = "O título é obrigatório."))]
    pub title: String,
    #[validate(length(min = 1, message = "O conteúdo é obrigatório."))]
    pub content: String,
}
