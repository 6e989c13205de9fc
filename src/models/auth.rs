// src/models/auth.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::scope::{Field, Ownership, ScopedRecord, Value};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "user_role", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum Role {
    PlatformAdmin,
    BusinessAdmin,
    Manager,
    InhouseSales,
    // Alguns clientes antigos ainda mandam "tele_caller"
    #[serde(alias = "tele_caller")]
    TeleCalling,
    Marketing,
}

impl Role {
    pub const fn as_str(self) -> &'static str {
        match self {
            Role::PlatformAdmin => "platform_admin",
            Role::BusinessAdmin => "business_admin",
            Role::Manager => "manager",
            Role::InhouseSales => "inhouse_sales",
            Role::TeleCalling => "tele_calling",
            Role::Marketing => "marketing",
        }
    }

    /// Papéis que um gerente pode cadastrar na própria equipe.
    pub fn manager_can_create(self) -> bool {
        matches!(
            self,
            Role::InhouseSales | Role::Marketing | Role::TeleCalling
        )
    }
}

// Representa um usuário vindo do banco de dados
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: Uuid,
    pub tenant_id: Option<Uuid>,
    pub store_id: Option<Uuid>,
    pub role: Option<Role>,
    #[schema(example = "maria.souza")]
    pub username: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub phone: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    pub fn full_name(&self) -> String {
        let name = format!("{} {}", self.first_name, self.last_name);
        let name = name.trim();
        if name.is_empty() {
            self.username.clone()
        } else {
            name.to_owned()
        }
    }
}

/// Usuário na listagem, com a loja e os fatos de posse usados pelo escopo.
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserRecord {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub user: User,
    pub store_name: Option<String>,
    #[sqlx(flatten)]
    #[serde(skip)]
    pub ownership: Ownership,
}

impl ScopedRecord for UserRecord {
    fn value_of(&self, field: Field) -> Option<Value> {
        self.ownership.value_of(field)
    }

    fn search_text(&self) -> Vec<&str> {
        vec![
            self.user.username.as_str(),
            self.user.email.as_str(),
            self.user.first_name.as_str(),
            self.user.last_name.as_str(),
        ]
    }
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateUserPayload {
    #[validate(length(min = 3, max = 150, message = "O usuário deve ter entre 3 e 150 caracteres."))]
    pub username: String,
    #[validate(email(message = "O e-mail fornecido é inválido."))]
    pub email: String,
    #[validate(length(max = 150))]
    #[serde(default)]
    pub first_name: String,
    #[validate(length(max = 150))]
    #[serde(default)]
    pub last_name: String,
    pub phone: Option<String>,
    pub role: Role,
    pub store_id: Option<Uuid>,
    /// Considerado apenas quando quem cria é administrador da plataforma.
    pub tenant_id: Option<Uuid>,
}

#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUserPayload {
    #[validate(email(message = "O e-mail fornecido é inválido."))]
    pub email: Option<String>,
    #[validate(length(max = 150))]
    pub first_name: Option<String>,
    #[validate(length(max = 150))]
    pub last_name: Option<String>,
    pub phone: Option<String>,
    pub role: Option<Role>,
    /// `null` tira o usuário da loja.
    #[serde(default, deserialize_with = "super::present")]
    #[schema(value_type = Option<Uuid>)]
    pub store_id: Option<Option<Uuid>>,
    pub is_active: Option<bool>,
}

// Estrutura de dados ("claims") dentro do JWT
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,  // Subject (ID do usuário)
    pub exp: usize, // Expiration time (quando o token expira)
    pub iat: usize, // Issued At (quando o token foi criado)
}
