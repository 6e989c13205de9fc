// src/models/figures.rs

// Linhas enxutas que os repositórios carregam para as agregações. Nunca saem
// na resposta; viram os resumos de `models::dashboard`.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use sqlx::FromRow;
use uuid::Uuid;

use crate::models::{
    inventory::ProductStatus,
    sales::{DealStage, SaleStatus},
    team::{MemberStatus, PerformanceRating},
};

#[derive(Debug, Clone, FromRow)]
pub struct SaleFigure {
    pub status: SaleStatus,
    pub total_amount: Decimal,
    pub created_at: DateTime<Utc>,
    pub rep_name: Option<String>,
    pub store_name: Option<String>,
}

#[derive(Debug, Clone, FromRow)]
pub struct SaleLineFigure {
    pub status: SaleStatus,
    pub created_at: DateTime<Utc>,
    pub product_name: String,
    pub category_name: Option<String>,
    pub quantity: i32,
    pub total_price: Decimal,
}

#[derive(Debug, Clone, FromRow)]
pub struct DealFigure {
    pub stage: DealStage,
    pub expected_value: Decimal,
    pub is_closed: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub actual_close_date: Option<NaiveDate>,
}

impl DealFigure {
    /// Dia em que o negócio foi fechado; sem data registrada, o da última
    /// atualização.
    pub fn closed_on(&self) -> NaiveDate {
        self.actual_close_date
            .unwrap_or_else(|| self.updated_at.date_naive())
    }
}

#[derive(Debug, Clone, FromRow)]
pub struct MemberFigure {
    pub id: Uuid,
    pub name: String,
    pub status: MemberStatus,
    pub performance_rating: Option<PerformanceRating>,
    pub current_sales: Decimal,
    pub sales_target: Decimal,
}

#[derive(Debug, Clone, FromRow)]
pub struct ProductFigure {
    pub status: ProductStatus,
    pub quantity: i32,
    pub min_quantity: i32,
    pub cost_price: Decimal,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, FromRow)]
pub struct ClientFigure {
    pub purchase_count: i64,
    pub purchase_total: Decimal,
}
