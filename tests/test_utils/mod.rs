// tests/test_utils/mod.rs

//! Apoio aos testes que rodam contra um Postgres de verdade.
//!
//! Sem `DATABASE_URL` os testes são pulados com um aviso. Cada teste cria os
//! próprios tenants com slugs, usuários e e-mails aleatórios, então o mesmo
//! banco pode ser reaproveitado entre execuções.

#![allow(dead_code)]

use crm_backend::{
    config::AppState,
    models::{
        auth::Role,
        team::{CreateTeamMemberPayload, TeamMemberRecord},
    },
    scope::Actor,
};
use rust_decimal::Decimal;
use sqlx::{PgPool, postgres::PgPoolOptions};
use uuid::Uuid;

/// Pool já migrado, ou `None` quando não há banco configurado.
pub async fn database() -> Option<PgPool> {
    let Ok(url) = std::env::var("DATABASE_URL") else {
        eprintln!("⚠️  DATABASE_URL não definida; pulando teste com Postgres");
        return None;
    };

    let pool = PgPoolOptions::new()
        .max_connections(8)
        .connect(&url)
        .await
        .expect("conexão com o Postgres");
    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("migrações aplicadas");
    Some(pool)
}

pub fn app_state(pool: &PgPool) -> AppState {
    AppState::with_pool(pool.clone(), "segredo-de-teste".into())
}

pub fn unique(prefix: &str) -> String {
    format!("{prefix}-{}", Uuid::new_v4().simple())
}

/// Tenant com uma loja e um administrador do negócio.
pub struct TenantFixture {
    pub tenant_id: Uuid,
    pub store_id: Uuid,
    pub admin: Actor,
}

impl TenantFixture {
    pub async fn seed(pool: &PgPool, name: &str) -> Self {
        let tenant_id: Uuid =
            sqlx::query_scalar("INSERT INTO tenants (name, slug) VALUES ($1, $2) RETURNING id")
                .bind(name)
                .bind(unique("joalheria"))
                .fetch_one(pool)
                .await
                .expect("tenant");

        let store_id: Uuid =
            sqlx::query_scalar("INSERT INTO stores (tenant_id, name) VALUES ($1, $2) RETURNING id")
                .bind(tenant_id)
                .bind("Loja Centro")
                .fetch_one(pool)
                .await
                .expect("loja");

        let admin_id = insert_user(pool, Some(tenant_id), Some(store_id), Role::BusinessAdmin).await;

        Self {
            tenant_id,
            store_id,
            admin: Actor {
                user_id: admin_id,
                role: Some(Role::BusinessAdmin),
                tenant_id: Some(tenant_id),
                store_id: Some(store_id),
            },
        }
    }

    pub fn actor(&self, user_id: Uuid, role: Role) -> Actor {
        Actor {
            user_id,
            role: Some(role),
            tenant_id: Some(self.tenant_id),
            store_id: Some(self.store_id),
        }
    }

    /// Cadastra um membro pela camada de serviço, como o administrador.
    pub async fn add_member(
        &self,
        state: &AppState,
        role: Role,
        manager_id: Option<Uuid>,
    ) -> (TeamMemberRecord, Actor) {
        let username = unique("membro");
        let payload = CreateTeamMemberPayload {
            email: format!("{username}@joias.test"),
            username,
            first_name: "Membro".into(),
            last_name: "Teste".into(),
            phone: None,
            role,
            store_id: Some(self.store_id),
            tenant_id: None,
            manager_id,
            department: Some("Vendas".into()),
            position: None,
            hire_date: None,
            sales_target: Decimal::from(10_000),
            notes: None,
        };
        let record = state
            .team_service
            .create(&self.admin, &payload)
            .await
            .expect("membro criado");
        let actor = self.actor(record.member.user_id, role);
        (record, actor)
    }
}

/// Insere um usuário direto no banco (administradores não passam pela API).
pub async fn insert_user(
    pool: &PgPool,
    tenant_id: Option<Uuid>,
    store_id: Option<Uuid>,
    role: Role,
) -> Uuid {
    let username = unique(role.as_str());
    sqlx::query_scalar(
        r#"
        INSERT INTO users (tenant_id, store_id, role, username, email, first_name)
        VALUES ($1, $2, $3, $4, $5, 'Admin')
        RETURNING id
        "#,
    )
    .bind(tenant_id)
    .bind(store_id)
    .bind(role)
    .bind(&username)
    .bind(format!("{username}@joias.test"))
    .fetch_one(pool)
    .await
    .expect("usuário")
}

pub async fn platform_admin(pool: &PgPool) -> Actor {
    let user_id = insert_user(pool, None, None, Role::PlatformAdmin).await;
    Actor {
        user_id,
        role: Some(Role::PlatformAdmin),
        tenant_id: None,
        store_id: None,
    }
}
