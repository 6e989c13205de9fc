// src/models.rs

pub mod announcements;
pub mod auth;
pub mod crm;
pub mod dashboard;
pub mod figures;
pub mod inventory;
pub mod sales;
pub mod team;
pub mod tenancy;

use serde::{Deserialize, Deserializer};

// Distingue "campo ausente" (None) de "campo null" (Some(None)) nos PATCH.
pub(crate) fn present<'de, T, D>(deserializer: D) -> Result<Option<T>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    T::deserialize(deserializer).map(Some)
}
