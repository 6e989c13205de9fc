// src/models/crm.rs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::scope::{Field, Ownership, ScopedRecord, Value};

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Client {
    pub id: Uuid,
    #[schema(ignore)]
    pub tenant_id: Uuid,
    pub assigned_to_id: Option<Uuid>,
    #[schema(example = "Ana")]
    pub first_name: String,
    #[schema(example = "Lima")]
    pub last_name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ClientRecord {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub client: Client,
    pub assigned_to_name: Option<String>,
    pub store_name: Option<String>,
    #[sqlx(flatten)]
    #[serde(skip)]
    pub ownership: Ownership,
}

impl ScopedRecord for ClientRecord {
    fn value_of(&self, field: Field) -> Option<Value> {
        self.ownership.value_of(field)
    }

    fn search_text(&self) -> Vec<&str> {
        let client = &self.client;
        let mut text = vec![client.first_name.as_str(), client.last_name.as_str()];
        text.extend(client.email.as_deref());
        text.extend(client.phone.as_deref());
        text
    }
}

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Purchase {
    pub id: Uuid,
    #[schema(ignore)]
    pub tenant_id: Uuid,
    pub client_id: Uuid,
    #[schema(example = 1890.5)]
    pub amount: Decimal,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateClientPayload {
    #[validate(length(min = 1, max = 100, message = "O nome é obrigatório."))]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[validate(email(message = "O e-mail fornecido é inválido."))]
    pub email: Option<String>,
    pub phone: Option<String>,
    pub notes: Option<String>,
    /// Vendedor responsável; padrão é quem cadastra.
    pub assigned_to_id: Option<Uuid>,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreatePurchasePayload {
    pub amount: Decimal,
}
