// src/models/sales.rs

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::scope::{Field, Ownership, ScopedRecord, Value};

// --- Enums ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "deal_stage", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum DealStage {
    Lead,
    Qualified,
    Proposal,
    Negotiation,
    ClosedWon,
    ClosedLost,
}

impl DealStage {
    /// Ordem fixa usada em todas as distribuições por estágio.
    pub const ALL: [DealStage; 6] = [
        DealStage::Lead,
        DealStage::Qualified,
        DealStage::Proposal,
        DealStage::Negotiation,
        DealStage::ClosedWon,
        DealStage::ClosedLost,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            DealStage::Lead => "lead",
            DealStage::Qualified => "qualified",
            DealStage::Proposal => "proposal",
            DealStage::Negotiation => "negotiation",
            DealStage::ClosedWon => "closed_won",
            DealStage::ClosedLost => "closed_lost",
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            DealStage::Lead => "Lead",
            DealStage::Qualified => "Qualified",
            DealStage::Proposal => "Proposal",
            DealStage::Negotiation => "Negotiation",
            DealStage::ClosedWon => "Closed Won",
            DealStage::ClosedLost => "Closed Lost",
        }
    }

    pub fn is_closing(self) -> bool {
        matches!(self, DealStage::ClosedWon | DealStage::ClosedLost)
    }

    /// Entra no valor do funil e em "negócios ativos". Ganhos continuam contando.
    pub fn counts_as_active(self) -> bool {
        self != DealStage::ClosedLost
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "sale_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum SaleStatus {
    Pending,
    Confirmed,
    Processing,
    Shipped,
    Delivered,
    Cancelled,
}

impl SaleStatus {
    pub const fn as_str(self) -> &'static str {
        match self {
            SaleStatus::Pending => "pending",
            SaleStatus::Confirmed => "confirmed",
            SaleStatus::Processing => "processing",
            SaleStatus::Shipped => "shipped",
            SaleStatus::Delivered => "delivered",
            SaleStatus::Cancelled => "cancelled",
        }
    }

    /// Pendentes e canceladas não entram na receita.
    pub fn counts_as_revenue(self) -> bool {
        !matches!(self, SaleStatus::Pending | SaleStatus::Cancelled)
    }
}

// --- Funil de vendas ---

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Deal {
    pub id: Uuid,
    #[schema(ignore)]
    pub tenant_id: Uuid,
    pub client_id: Option<Uuid>,
    pub sales_representative_id: Option<Uuid>,
    #[schema(example = "Colar de esmeraldas sob medida")]
    pub title: String,
    pub stage: DealStage,
    #[schema(example = 40)]
    pub probability: i32,
    pub expected_value: Decimal,
    pub actual_value: Option<Decimal>,
    pub is_closed: bool,
    pub expected_close_date: Option<NaiveDate>,
    pub actual_close_date: Option<NaiveDate>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DealRecord {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub deal: Deal,
    pub client_name: Option<String>,
    pub sales_representative_name: Option<String>,
    #[sqlx(flatten)]
    #[serde(skip)]
    pub ownership: Ownership,
}

impl ScopedRecord for DealRecord {
    fn value_of(&self, field: Field) -> Option<Value> {
        match field {
            Field::Status => Some(self.deal.stage.as_str().into()),
            _ => self.ownership.value_of(field),
        }
    }

    fn search_text(&self) -> Vec<&str> {
        let mut text = vec![self.deal.title.as_str()];
        text.extend(self.deal.notes.as_deref());
        text
    }
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateDealPayload {
    #[validate(length(min = 1, max = 200, message = "O título é obrigatório."))]
    pub title: String,
    pub client_id: Option<Uuid>,
    /// Padrão é quem cadastra.
    pub sales_representative_id: Option<Uuid>,
    pub stage: Option<DealStage>,
    #[validate(range(min = 0, max = 100, message = "A probabilidade vai de 0 a 100."))]
    #[serde(default)]
    pub probability: i32,
    #[serde(default)]
    pub expected_value: Decimal,
    pub expected_close_date: Option<NaiveDate>,
    pub notes: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TransitionDealPayload {
    pub stage: DealStage,
    pub actual_value: Option<Decimal>,
}

/// Campos editáveis do negócio. O estágio só muda pela transição.
#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateDealPayload {
    #[validate(length(min = 1, max = 200, message = "O título é obrigatório."))]
    pub title: Option<String>,
    /// `null` desvincula o cliente.
    #[serde(default, deserialize_with = "super::present")]
    #[schema(value_type = Option<Uuid>)]
    pub client_id: Option<Option<Uuid>>,
    #[validate(range(min = 0, max = 100, message = "A probabilidade vai de 0 a 100."))]
    pub probability: Option<i32>,
    pub expected_value: Option<Decimal>,
    pub expected_close_date: Option<NaiveDate>,
    pub notes: Option<String>,
}

// --- Vendas ---

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Sale {
    pub id: Uuid,
    #[schema(ignore)]
    pub tenant_id: Uuid,
    pub client_id: Option<Uuid>,
    pub sales_representative_id: Option<Uuid>,
    #[schema(example = "NF-000123")]
    pub invoice_number: String,
    pub status: SaleStatus,
    pub total_amount: Decimal,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SaleRecord {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub sale: Sale,
    pub client_name: Option<String>,
    pub sales_representative_name: Option<String>,
    #[sqlx(flatten)]
    #[serde(skip)]
    pub ownership: Ownership,
}

impl ScopedRecord for SaleRecord {
    fn value_of(&self, field: Field) -> Option<Value> {
        match field {
            Field::Status => Some(self.sale.status.as_str().into()),
            _ => self.ownership.value_of(field),
        }
    }

    fn search_text(&self) -> Vec<&str> {
        let mut text = vec![self.sale.invoice_number.as_str()];
        text.extend(self.sale.notes.as_deref());
        text
    }
}

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SaleItem {
    pub id: Uuid,
    pub sale_id: Uuid,
    pub product_id: Uuid,
    pub quantity: i32,
    pub unit_price: Decimal,
    pub total_price: Decimal,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SaleDetail {
    #[serde(flatten)]
    pub sale: Sale,
    pub items: Vec<SaleItem>,
}

#[derive(Debug, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SaleItemPayload {
    pub product_id: Uuid,
    #[validate(range(min = 1, message = "A quantidade deve ser maior que zero."))]
    pub quantity: i32,
    /// Padrão é o preço de venda do produto.
    pub unit_price: Option<Decimal>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateSalePayload {
    #[validate(length(min = 1, max = 50, message = "O número da nota é obrigatório."))]
    pub invoice_number: String,
    pub client_id: Option<Uuid>,
    pub status: Option<SaleStatus>,
    pub notes: Option<String>,
    #[validate(length(min = 1, message = "A venda precisa de ao menos um item."))]
    #[validate(nested)]
    pub items: Vec<SaleItemPayload>,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateSalePayload {
    pub status: Option<SaleStatus>,
    pub notes: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn only_settled_statuses_count_as_revenue() {
        let counted: Vec<_> = [
            SaleStatus::Pending,
            SaleStatus::Confirmed,
            SaleStatus::Processing,
            SaleStatus::Shipped,
            SaleStatus::Delivered,
            SaleStatus::Cancelled,
        ]
        .into_iter()
        .filter(|s| s.counts_as_revenue())
        .collect();

        assert_eq!(
            counted,
            vec![
                SaleStatus::Confirmed,
                SaleStatus::Processing,
                SaleStatus::Shipped,
                SaleStatus::Delivered
            ]
        );
    }

    #[test]
    fn won_deals_stay_active_lost_do_not() {
        assert!(DealStage::ClosedWon.counts_as_active());
        assert!(!DealStage::ClosedLost.counts_as_active());
        assert!(DealStage::ClosedWon.is_closing());
        assert!(!DealStage::Negotiation.is_closing());
    }

    #[test]
    fn sale_payload_validates_each_item() {
        let product = Uuid::new_v4();

        let valid: CreateSalePayload = serde_json::from_value(json!({
            "invoiceNumber": "NF-0001",
            "items": [{ "productId": product, "quantity": 2 }]
        }))
        .expect("payload");
        assert!(valid.validate().is_ok());
        let echoed = serde_json::to_value(&valid.items[0]).expect("item serializa");
        assert_eq!(echoed["quantity"], 2);
        assert_eq!(echoed["productId"], json!(product));

        let zero_quantity: CreateSalePayload = serde_json::from_value(json!({
            "invoiceNumber": "NF-0002",
            "items": [{ "productId": product, "quantity": 0 }]
        }))
        .expect("payload");
        let errors = zero_quantity.validate().expect_err("quantidade zero");
        assert!(errors.errors().contains_key("items"));

        let no_items: CreateSalePayload =
            serde_json::from_value(json!({ "invoiceNumber": "NF-0003", "items": [] }))
                .expect("payload");
        let errors = no_items.validate().expect_err("sem itens");
        assert!(errors.errors().contains_key("items"));
    }

    #[test]
    fn deal_update_keeps_absent_client_and_clears_null() {
        let untouched: UpdateDealPayload =
            serde_json::from_value(json!({ "probability": 70 })).expect("payload");
        assert_eq!(untouched.client_id, None);
        assert!(untouched.validate().is_ok());

        let cleared: UpdateDealPayload =
            serde_json::from_value(json!({ "clientId": null })).expect("payload");
        assert_eq!(cleared.client_id, Some(None));

        let out_of_range: UpdateDealPayload =
            serde_json::from_value(json!({ "probability": 120 })).expect("payload");
        assert!(out_of_range.validate().is_err());
    }
}
