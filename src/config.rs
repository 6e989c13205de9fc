// src/config.rs

use anyhow::Context;
use sqlx::{PgPool, postgres::PgPoolOptions};
use std::{env, net::SocketAddr, time::Duration};

use crate::{
    db::{
        AnnouncementRepository, CrmRepository, DashboardRepository, InventoryRepository,
        SalesRepository, TeamRepository, TenantRepository, UserRepository,
    },
    services::{
        announcement_service::AnnouncementService, auth::AuthService, crm_service::CrmService,
        dashboard_service::DashboardService, inventory_service::InventoryService,
        sales_service::SalesService, team_service::TeamService, user_service::UserService,
    },
};

const DEFAULT_ADDR: &str = "0.0.0.0:3000";
const DEFAULT_MAX_CONNECTIONS: u32 = 5;

/// Configuração lida do ambiente (e do `.env`, se houver).
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub jwt_secret: String,
    pub addr: SocketAddr,
    pub max_connections: u32,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let database_url = env::var("DATABASE_URL").context("DATABASE_URL deve ser definida")?;
        let jwt_secret = env::var("JWT_SECRET").context("JWT_SECRET deve ser definido")?;

        let addr = env::var("APP_ADDR")
            .unwrap_or_else(|_| DEFAULT_ADDR.to_owned())
            .parse()
            .context("APP_ADDR inválido")?;

        let max_connections = match env::var("DB_MAX_CONNECTIONS") {
            Ok(value) => value.parse().context("DB_MAX_CONNECTIONS inválido")?,
            Err(_) => DEFAULT_MAX_CONNECTIONS,
        };

        Ok(Self {
            database_url,
            jwt_secret,
            addr,
            max_connections,
        })
    }
}

#[derive(Clone)]
pub struct AppState {
    pub db_pool: PgPool,
    pub auth_service: AuthService,
    pub user_service: UserService,
    pub team_service: TeamService,
    pub crm_service: CrmService,
    pub sales_service: SalesService,
    pub inventory_service: InventoryService,
    pub announcement_service: AnnouncementService,
    pub dashboard_service: DashboardService,
}

impl AppState {
    pub async fn new(config: &Config) -> anyhow::Result<Self> {
        // Conecta ao banco de dados, usando '?' para propagar erros
        let db_pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(Duration::from_secs(3))
            .connect(&config.database_url)
            .await
            .context("Falha ao conectar ao banco de dados")?;

        tracing::info!("✅ Conexão com o banco de dados estabelecida com sucesso!");

        Ok(Self::with_pool(db_pool, config.jwt_secret.clone()))
    }

    /// Monta o gráfico de dependências sobre um pool já existente.
    pub fn with_pool(db_pool: PgPool, jwt_secret: String) -> Self {
        let user_repo = UserRepository::new(db_pool.clone());
        let tenant_repo = TenantRepository::new();
        let team_repo = TeamRepository::new();
        let crm_repo = CrmRepository::new();
        let sales_repo = SalesRepository::new();
        let inventory_repo = InventoryRepository::new();

        let user_service = UserService::new(db_pool.clone(), user_repo.clone(), tenant_repo);

        Self {
            auth_service: AuthService::new(user_repo.clone(), jwt_secret),
            team_service: TeamService::new(
                db_pool.clone(),
                team_repo,
                user_repo.clone(),
                user_service.clone(),
            ),
            user_service,
            crm_service: CrmService::new(db_pool.clone(), crm_repo.clone(), user_repo.clone()),
            sales_service: SalesService::new(
                db_pool.clone(),
                sales_repo,
                crm_repo,
                inventory_repo.clone(),
                user_repo,
            ),
            inventory_service: InventoryService::new(db_pool.clone(), inventory_repo),
            announcement_service: AnnouncementService::new(
                db_pool.clone(),
                AnnouncementRepository::new(),
            ),
            dashboard_service: DashboardService::new(db_pool.clone(), DashboardRepository::new()),
            db_pool,
        }
    }
}
