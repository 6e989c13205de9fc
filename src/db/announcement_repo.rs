// src/db/announcement_repo.rs

use sqlx::{Executor, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::announcements::{Announcement, CreateAnnouncementPayload},
    scope::{EntityKind, Predicate, scoped_query},
};

#[derive(Clone, Default)]
pub struct AnnouncementRepository;

impl AnnouncementRepository {
    pub fn new() -> Self {
        Self
    }

    pub async fn list_active<'e, E>(
        &self,
        executor: E,
        predicate: &Predicate,
    ) -> Result<Vec<Announcement>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let mut qb = scoped_query("a.*", EntityKind::Announcement, "", predicate);
        qb.push(" AND a.is_active ORDER BY a.created_at DESC");

        let announcements = qb
            .build_query_as::<Announcement>()
            .fetch_all(executor)
            .await?;
        Ok(announcements)
    }

    pub async fn create<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        author_id: Uuid,
        payload: &CreateAnnouncementPayload,
    ) -> Result<Announcement, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let announcement = sqlx::query_as::<_, Announcement>(
            r#"
            INSERT INTO announcements (tenant_id, author_id, title, content)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            "#,
        )
        .bind(tenant_id)
        .bind(author_id)
        .bind(payload.title.trim())
        .bind(&payload.content)
        .fetch_one(executor)
        .await?;
        Ok(announcement)
    }
}
