// src/docs.rs

use utoipa::{
    OpenApi,
    openapi::security::{Http, HttpAuthScheme, SecurityScheme},
};

use crate::{handlers, metrics, models, scope};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "CRM Backend",
        description = "Equipe, clientes, funil de vendas, catálogo e painéis analíticos por tenant."
    ),
    paths(
        // Users
        handlers::users::get_me,
        handlers::users::list_users,
        handlers::users::create_user,
        handlers::users::get_user,
        handlers::users::update_user,
        handlers::users::delete_user,

        // Team
        handlers::team::list_members,
        handlers::team::search_members,
        handlers::team::get_member,
        handlers::team::create_member,
        handlers::team::update_member,
        handlers::team::delete_member,
        handlers::team::list_member_activities,
        handlers::team::get_team_stats,
        handlers::team::get_manager_dashboard,

        // CRM
        handlers::crm::list_clients,
        handlers::crm::create_client,
        handlers::crm::add_purchase,

        // Sales
        handlers::sales::list_deals,
        handlers::sales::create_deal,
        handlers::sales::get_deal,
        handlers::sales::update_deal,
        handlers::sales::delete_deal,
        handlers::sales::transition_deal,
        handlers::sales::list_sales,
        handlers::sales::create_sale,
        handlers::sales::get_sale,
        handlers::sales::update_sale,
        handlers::sales::delete_sale,

        // Inventory
        handlers::inventory::list_products,
        handlers::inventory::create_product,
        handlers::inventory::get_product,
        handlers::inventory::update_product,
        handlers::inventory::delete_product,
        handlers::inventory::list_categories,
        handlers::inventory::create_category,
        handlers::inventory::get_category,
        handlers::inventory::update_category,
        handlers::inventory::delete_category,
        handlers::inventory::list_category_products,
        handlers::inventory::get_product_stats,

        // Announcements
        handlers::announcements::list_announcements,
        handlers::announcements::create_announcement,

        // Dashboard
        handlers::dashboard::get_overview,
        handlers::dashboard::get_stats,
        handlers::dashboard::get_pipeline_analytics,
        handlers::dashboard::get_revenue_analytics,
    ),
    components(
        schemas(
            // --- Auth ---
            models::auth::Role,
            models::auth::User,
            models::auth::UserRecord,
            models::auth::CreateUserPayload,
            models::auth::UpdateUserPayload,

            // --- Team ---
            models::team::MemberStatus,
            models::team::PerformanceRating,
            models::team::ActivityType,
            models::team::TeamMember,
            models::team::TeamMemberRecord,
            models::team::TeamMemberActivity,
            models::team::CreateTeamMemberPayload,
            models::team::UpdateTeamMemberPayload,

            // --- CRM ---
            models::crm::Client,
            models::crm::ClientRecord,
            models::crm::Purchase,
            models::crm::CreateClientPayload,
            models::crm::CreatePurchasePayload,

            // --- Sales ---
            models::sales::DealStage,
            models::sales::SaleStatus,
            models::sales::Deal,
            models::sales::DealRecord,
            models::sales::CreateDealPayload,
            models::sales::TransitionDealPayload,
            models::sales::UpdateDealPayload,
            models::sales::Sale,
            models::sales::SaleRecord,
            models::sales::SaleItem,
            models::sales::SaleDetail,
            models::sales::SaleItemPayload,
            models::sales::CreateSalePayload,
            models::sales::UpdateSalePayload,

            // --- Inventory ---
            models::inventory::ProductStatus,
            models::inventory::Category,
            models::inventory::Product,
            models::inventory::ProductListEntry,
            models::inventory::CreateCategoryPayload,
            models::inventory::CreateProductPayload,
            models::inventory::UpdateCategoryPayload,
            models::inventory::UpdateProductPayload,

            // --- Announcements ---
            models::announcements::Announcement,
            models::announcements::CreateAnnouncementPayload,

            // --- Dashboard ---
            models::dashboard::SalesSummary,
            models::dashboard::StageBucket,
            models::dashboard::PipelineOverview,
            models::dashboard::ConversionSummary,
            models::dashboard::CategoryRevenue,
            models::dashboard::RevenueOverview,
            models::dashboard::DashboardOverview,
            models::dashboard::StageVelocity,
            models::dashboard::WinLossSummary,
            models::dashboard::DealSizeSummary,
            models::dashboard::PipelineAnalytics,
            models::dashboard::DailyRevenue,
            models::dashboard::RevenueGroup,
            models::dashboard::ProductRevenue,
            models::dashboard::RevenueAnalytics,
            models::dashboard::RecentSale,
            models::dashboard::DashboardStats,
            models::dashboard::TopPerformer,
            models::dashboard::RatingSummary,
            models::dashboard::ActivityEntry,
            models::dashboard::TeamStats,
            models::dashboard::ManagerDashboard,
            models::dashboard::ProductStats,
            metrics::DateWindow,
            scope::StockLevel,
        )
    ),
    tags(
        (name = "Users", description = "Dados do Usuário e Cadastro"),
        (name = "Team", description = "Equipe, Hierarquia e Desempenho"),
        (name = "CRM", description = "Clientes e Compras"),
        (name = "Sales", description = "Funil de Vendas e Pedidos"),
        (name = "Inventory", description = "Catálogo de Produtos"),
        (name = "Announcements", description = "Comunicados Internos"),
        (name = "Dashboard", description = "Indicadores e Gráficos Gerenciais")
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "api_jwt",
            SecurityScheme::Http(Http::new(HttpAuthScheme::Bearer)),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn document_lists_protected_paths_with_bearer_scheme() {
        let doc = ApiDoc::openapi();
        assert!(doc.paths.paths.contains_key("/api/analytics/revenue"));
        assert!(doc.paths.paths.contains_key("/api/team-members/{id}"));
        assert!(doc.paths.paths.contains_key("/api/team-members/{id}/activities"));
        assert!(doc.paths.paths.contains_key("/api/sales/pipeline/{id}"));
        assert!(doc.paths.paths.contains_key("/api/products/categories/{id}/products"));

        let components = doc.components.expect("components");
        assert!(components.security_schemes.contains_key("api_jwt"));
    }
}
