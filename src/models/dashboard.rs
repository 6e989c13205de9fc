// src/models/dashboard.rs

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{
    metrics::DateWindow,
    models::{
        sales::{DealStage, SaleStatus},
        team::{ActivityType, PerformanceRating},
    },
};

// --- 1. Visão geral (cards do topo) ---

#[derive(Debug, Clone, Default, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SalesSummary {
    pub total_sales: usize,
    pub monthly_sales: usize,
    pub total_revenue: Decimal,
    pub monthly_revenue: Decimal,
    pub avg_order_value: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StageBucket {
    pub stage: DealStage,
    pub name: String,
    pub count: usize,
    pub value: Decimal,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PipelineOverview {
    pub stages: Vec<StageBucket>,
    pub total_pipeline_value: Decimal,
    pub active_deals: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ConversionSummary {
    pub total_leads: usize,
    pub converted_leads: usize,
    pub conversion_rate: Decimal,
    pub monthly_leads: usize,
    pub monthly_converted: usize,
    pub monthly_conversion_rate: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CategoryRevenue {
    pub category_name: Option<String>,
    pub total_revenue: Decimal,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RevenueOverview {
    pub current_month: Decimal,
    pub last_month: Decimal,
    pub growth_rate: Decimal,
    pub top_categories: Vec<CategoryRevenue>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DashboardOverview {
    pub sales: SalesSummary,
    pub pipeline: PipelineOverview,
    pub conversion: ConversionSummary,
    pub revenue: RevenueOverview,
}

// --- 2. Análise do funil ---

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StageVelocity {
    pub stage: DealStage,
    pub name: String,
    pub avg_days: i64,
    pub deal_count: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct WinLossSummary {
    pub total_closed: usize,
    pub won: usize,
    pub lost: usize,
    pub win_rate: Decimal,
    pub loss_rate: Decimal,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DealSizeSummary {
    pub avg_deal_size: Decimal,
    pub max_deal_size: Decimal,
    pub min_deal_size: Decimal,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PipelineAnalytics {
    pub stage_distribution: Vec<StageBucket>,
    pub pipeline_velocity: Vec<StageVelocity>,
    pub win_loss_analysis: WinLossSummary,
    pub deal_size_analysis: DealSizeSummary,
}

// --- 3. Análise de receita ---

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DailyRevenue {
    pub date: NaiveDate,
    pub total: Decimal,
    pub sale_count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RevenueGroup {
    pub label: Option<String>,
    pub total_revenue: Decimal,
    pub sale_count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProductRevenue {
    pub product_name: String,
    pub total_revenue: Decimal,
    pub units_sold: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RevenueAnalytics {
    pub revenue_trends: Vec<DailyRevenue>,
    pub revenue_by_rep: Vec<RevenueGroup>,
    pub revenue_by_product: Vec<ProductRevenue>,
    pub revenue_by_store: Vec<RevenueGroup>,
    pub date_range: DateWindow,
}

// --- 4. Painel simples ---

#[derive(Debug, Clone, PartialEq, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RecentSale {
    pub id: Uuid,
    pub invoice_number: String,
    pub status: SaleStatus,
    pub total_amount: Decimal,
    pub client_name: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub total_revenue: Decimal,
    pub total_clients: i64,
    pub total_orders: usize,
    pub active_announcements: i64,
    pub recent_sales: Vec<RecentSale>,
    pub sales_trend: Vec<DailyRevenue>,
}

// --- 5. Equipe ---

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TopPerformer {
    pub id: Uuid,
    pub name: String,
    pub performance_rating: Option<PerformanceRating>,
    pub current_sales: Decimal,
    pub sales_percentage: Decimal,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RatingSummary {
    pub excellent: usize,
    pub good: usize,
    pub average: usize,
    pub below_average: usize,
    pub poor: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ActivityEntry {
    pub id: Uuid,
    pub member_name: String,
    pub activity_type: ActivityType,
    pub description: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TeamStats {
    pub total_members: usize,
    pub active_members: usize,
    pub total_sales: Decimal,
    pub avg_performance: Decimal,
    pub top_performers: Vec<TopPerformer>,
    pub performance_distribution: RatingSummary,
    pub recent_activities: Vec<ActivityEntry>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ManagerDashboard {
    pub team_members_count: usize,
    pub active_team_members: usize,
    pub team_sales: Decimal,
    pub performance_summary: RatingSummary,
    pub store_leads: usize,
    pub store_customers: usize,
    pub store_sales: Decimal,
    pub recent_activities: Vec<ActivityEntry>,
}

// --- 6. Catálogo ---

#[derive(Debug, Clone, Default, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProductStats {
    pub total_products: usize,
    pub active_products: usize,
    pub out_of_stock: usize,
    pub low_stock: usize,
    pub total_inventory_value: Decimal,
    pub total_categories: i64,
    pub recent_products: usize,
}
