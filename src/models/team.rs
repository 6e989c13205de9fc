// src/models/team.rs

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::models::auth::Role;
use crate::scope::{Field, Ownership, ScopedRecord, Value};

// --- Enums ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "member_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum MemberStatus {
    Active,
    Inactive,
    Suspended,
    OnLeave,
}

impl MemberStatus {
    pub const fn as_str(self) -> &'static str {
        match self {
            MemberStatus::Active => "active",
            MemberStatus::Inactive => "inactive",
            MemberStatus::Suspended => "suspended",
            MemberStatus::OnLeave => "on_leave",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "performance_rating", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum PerformanceRating {
    Excellent,
    Good,
    Average,
    BelowAverage,
    Poor,
}

impl PerformanceRating {
    /// Nota numérica: excelente = 5 ... ruim = 1.
    pub const fn score(self) -> u8 {
        match self {
            PerformanceRating::Excellent => 5,
            PerformanceRating::Good => 4,
            PerformanceRating::Average => 3,
            PerformanceRating::BelowAverage => 2,
            PerformanceRating::Poor => 1,
        }
    }

    pub fn is_top(self) -> bool {
        matches!(self, PerformanceRating::Excellent | PerformanceRating::Good)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "activity_type", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ActivityType {
    Login,
    Logout,
    Sale,
    LeadCreated,
    CustomerContact,
    TaskCompleted,
    PerformanceReview,
}

// --- Registros ---

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TeamMember {
    pub id: Uuid,
    #[schema(ignore)]
    pub tenant_id: Uuid,
    pub user_id: Uuid,
    pub manager_id: Option<Uuid>,
    #[schema(example = "EMP3F9A21C0")]
    pub employee_id: String,
    pub department: Option<String>,
    pub position: Option<String>,
    pub hire_date: NaiveDate,
    pub status: MemberStatus,
    pub performance_rating: Option<PerformanceRating>,
    pub sales_target: Decimal,
    pub current_sales: Decimal,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Membro na listagem, com os dados do usuário e do gerente.
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TeamMemberRecord {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub member: TeamMember,
    pub username: String,
    pub user_name: String,
    pub user_email: String,
    pub user_role: Option<Role>,
    pub store_name: Option<String>,
    pub manager_name: Option<String>,
    #[sqlx(skip)]
    pub sales_percentage: Decimal,
    #[sqlx(flatten)]
    #[serde(skip)]
    pub ownership: Ownership,
}

impl ScopedRecord for TeamMemberRecord {
    fn value_of(&self, field: Field) -> Option<Value> {
        match field {
            Field::Status => Some(self.member.status.as_str().into()),
            _ => self.ownership.value_of(field),
        }
    }

    fn search_text(&self) -> Vec<&str> {
        vec![
            self.user_name.as_str(),
            self.user_email.as_str(),
            self.username.as_str(),
            self.member.employee_id.as_str(),
        ]
    }
}

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TeamMemberActivity {
    pub id: Uuid,
    pub team_member_id: Uuid,
    pub activity_type: ActivityType,
    pub description: String,
    pub created_at: DateTime<Utc>,
}

// --- Payloads ---

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateTeamMemberPayload {
    #[validate(length(min = 3, max = 150, message = "O usuário deve ter entre 3 e 150 caracteres."))]
    pub username: String,
    #[validate(email(message = "O e-mail fornecido é inválido."))]
    pub email: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    pub phone: Option<String>,
    pub role: Role,
    pub store_id: Option<Uuid>,
    pub tenant_id: Option<Uuid>,
    pub manager_id: Option<Uuid>,
    pub department: Option<String>,
    pub position: Option<String>,
    pub hire_date: Option<NaiveDate>,
    #[serde(default)]
    pub sales_target: Decimal,
    pub notes: Option<String>,
}

#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTeamMemberPayload {
    pub department: Option<String>,
    pub position: Option<String>,
    pub status: Option<MemberStatus>,
    pub performance_rating: Option<PerformanceRating>,
    pub sales_target: Option<Decimal>,
    pub current_sales: Option<Decimal>,
    /// `null` remove o gerente; ausente mantém o atual.
    #[serde(default, deserialize_with = "super::present")]
    #[schema(value_type = Option<Uuid>)]
    pub manager_id: Option<Option<Uuid>>,
    pub notes: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn manager_id_distinguishes_null_from_absent() {
        let cleared: UpdateTeamMemberPayload =
            serde_json::from_str(r#"{"managerId": null}"#).expect("payload");
        assert_eq!(cleared.manager_id, Some(None));

        let untouched: UpdateTeamMemberPayload =
            serde_json::from_str(r#"{"department": "Vendas"}"#).expect("payload");
        assert_eq!(untouched.manager_id, None);
    }

    #[test]
    fn rating_scores_run_from_five_to_one() {
        assert_eq!(PerformanceRating::Excellent.score(), 5);
        assert_eq!(PerformanceRating::Poor.score(), 1);
        assert!(PerformanceRating::Good.is_top());
        assert!(!PerformanceRating::Average.is_top());
    }
}
