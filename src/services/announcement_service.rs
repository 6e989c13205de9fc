// src/services/announcement_service.rs

use sqlx::PgPool;
use validator::Validate;

use super::require_tenant;
use crate::{
    common::error::AppError,
    db::AnnouncementRepository,
    models::announcements::{Announcement, CreateAnnouncementPayload},
    scope::{Actor, EntityKind, ListFilters},
};

#[derive(Clone)]
pub struct AnnouncementService {
    pool: PgPool,
    repo: AnnouncementRepository,
}

impl AnnouncementService {
    pub fn new(pool: PgPool, repo: AnnouncementRepository) -> Self {
        Self { pool, repo }
    }

    pub async fn list_active(
        &self,
        actor: &Actor,
        filters: &ListFilters,
    ) -> Result<Vec<Announcement>, AppError> {
        let predicate = filters.scoped(actor, EntityKind::Announcement);
        if predicate.is_nothing() {
            return Ok(Vec::new());
        }
        self.repo.list_active(&self.pool, &predicate).await
    }

    pub async fn create(
        &self,
        actor: &Actor,
        payload: &CreateAnnouncementPayload,
    ) -> Result<Announcement, AppError> {
        payload.validate()?;
        let tenant_id = require_tenant(actor)?;

        let announcement = self
            .repo
            .create(&self.pool, tenant_id, actor.user_id, payload)
            .await?;

        tracing::info!(announcement_id = %announcement.id, "Comunicado publicado");
        Ok(announcement)
    }
}
