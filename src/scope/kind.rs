// src/scope/kind.rs

use sqlx::{Postgres, QueryBuilder};

use super::predicate::{Field, Predicate};

// Junções que trazem o "dono" de um registro (usuário `u`), o membro de equipe
// dele (`tm`), o gerente desse membro (`mgr`) e a loja (`st`).
macro_rules! owner_joins {
    () => {
        " LEFT JOIN team_members tm ON tm.user_id = u.id \
          LEFT JOIN team_members mgr ON mgr.id = tm.manager_id \
          LEFT JOIN stores st ON st.id = u.store_id"
    };
}

/// Tipos de entidade que passam pelo escopo.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    User,
    TeamMember,
    Client,
    Sale,
    Deal,
    Product,
    Category,
    Announcement,
}

impl EntityKind {
    /// Cláusula FROM com os aliases que [`EntityKind::column`] referencia.
    pub fn source(self) -> &'static str {
        match self {
            EntityKind::User => concat!("users u", owner_joins!()),
            EntityKind::TeamMember => {
                "team_members tm \
                 JOIN users u ON u.id = tm.user_id \
                 LEFT JOIN team_members mgr ON mgr.id = tm.manager_id \
                 LEFT JOIN stores st ON st.id = u.store_id"
            }
            EntityKind::Client => concat!(
                "clients c LEFT JOIN users u ON u.id = c.assigned_to_id",
                owner_joins!()
            ),
            EntityKind::Sale => concat!(
                "sales s LEFT JOIN users u ON u.id = s.sales_representative_id",
                owner_joins!()
            ),
            EntityKind::Deal => concat!(
                "sales_pipeline d LEFT JOIN users u ON u.id = d.sales_representative_id",
                owner_joins!()
            ),
            EntityKind::Product => "products p",
            EntityKind::Category => "categories cat",
            EntityKind::Announcement => "announcements a",
        }
    }

    /// Colunas que alimentam [`super::Ownership`]. O `tenant_id` vem da própria
    /// tabela principal (`x.*`).
    pub fn ownership_columns(self) -> &'static str {
        match self {
            EntityKind::User => {
                "u.id AS owner_id, mgr.user_id AS owner_manager_id, \
                 u.store_id AS owner_store_id, u.role AS owner_role"
            }
            EntityKind::TeamMember => {
                "tm.user_id AS owner_id, mgr.user_id AS owner_manager_id, \
                 u.store_id AS owner_store_id, u.role AS owner_role"
            }
            EntityKind::Client => {
                "c.assigned_to_id AS owner_id, mgr.user_id AS owner_manager_id, \
                 u.store_id AS owner_store_id, u.role AS owner_role"
            }
            EntityKind::Sale => {
                "s.sales_representative_id AS owner_id, mgr.user_id AS owner_manager_id, \
                 u.store_id AS owner_store_id, u.role AS owner_role"
            }
            EntityKind::Deal => {
                "d.sales_representative_id AS owner_id, mgr.user_id AS owner_manager_id, \
                 u.store_id AS owner_store_id, u.role AS owner_role"
            }
            EntityKind::Product | EntityKind::Category | EntityKind::Announcement => {
                "NULL::uuid AS owner_id, NULL::uuid AS owner_manager_id, \
                 NULL::uuid AS owner_store_id, NULL::user_role AS owner_role"
            }
        }
    }

    /// Expressão SQL de um campo para este tipo. `None` quando o tipo não tem o
    /// campo; o predicado então não casa nada.
    pub fn column(self, field: Field) -> Option<&'static str> {
        use EntityKind as K;
        use Field as F;

        let owned = |owner: &'static str| match field {
            F::Owner => Some(owner),
            F::OwnerManager => Some("mgr.user_id"),
            F::OwnerStore => Some("u.store_id"),
            F::OwnerRole => Some("u.role::text"),
            _ => None,
        };

        match (self, field) {
            (K::User, F::Tenant) => Some("u.tenant_id"),
            (K::User, _) => owned("u.id"),

            (K::TeamMember, F::Tenant) => Some("tm.tenant_id"),
            (K::TeamMember, F::Status) => Some("tm.status::text"),
            (K::TeamMember, _) => owned("tm.user_id"),

            (K::Client, F::Tenant) => Some("c.tenant_id"),
            (K::Client, _) => owned("c.assigned_to_id"),

            (K::Sale, F::Tenant) => Some("s.tenant_id"),
            (K::Sale, F::Status) => Some("s.status::text"),
            (K::Sale, _) => owned("s.sales_representative_id"),

            (K::Deal, F::Tenant) => Some("d.tenant_id"),
            (K::Deal, F::Status) => Some("d.stage::text"),
            (K::Deal, _) => owned("d.sales_representative_id"),

            (K::Product, F::Tenant) => Some("p.tenant_id"),
            (K::Product, F::Status) => Some("p.status::text"),
            (K::Product, F::Category) => Some("p.category_id"),
            (K::Product, F::Quantity) => Some("p.quantity"),
            (K::Product, F::MinQuantity) => Some("p.min_quantity"),
            (K::Product, _) => None,

            (K::Category, F::Tenant) => Some("cat.tenant_id"),
            (K::Category, _) => None,

            (K::Announcement, F::Tenant) => Some("a.tenant_id"),
            (K::Announcement, _) => None,
        }
    }

    /// Colunas cobertas pela busca textual.
    pub fn search_columns(self) -> &'static [&'static str] {
        match self {
            EntityKind::User => &["u.username", "u.email", "u.first_name", "u.last_name"],
            EntityKind::TeamMember => &[
                "u.first_name",
                "u.last_name",
                "u.email",
                "u.username",
                "u.role::text",
                "tm.employee_id",
            ],
            EntityKind::Client => &["c.first_name", "c.last_name", "c.email", "c.phone"],
            EntityKind::Sale => &["s.invoice_number", "s.notes"],
            EntityKind::Deal => &["d.title", "d.notes"],
            EntityKind::Product => &["p.name", "p.sku", "p.material"],
            EntityKind::Category => &["cat.name"],
            EntityKind::Announcement => &["a.title", "a.content"],
        }
    }

    /// Tipos de catálogo não têm dono: todo ator do tenant enxerga as linhas.
    pub fn has_owner(self) -> bool {
        !matches!(
            self,
            EntityKind::Product | EntityKind::Category | EntityKind::Announcement
        )
    }

    /// Tipos em que o gerente só enxerga registros da própria loja.
    pub fn is_store_scoped(self) -> bool {
        matches!(self, EntityKind::Client)
    }
}

/// `SELECT {select} FROM {source} {joins} WHERE {predicate}`.
///
/// O chamador pode continuar empurrando `AND ...`, `ORDER BY` e `LIMIT` antes
/// de montar a query.
pub fn scoped_query<'args>(
    select: &str,
    kind: EntityKind,
    joins: &str,
    predicate: &Predicate,
) -> QueryBuilder<'args, Postgres> {
    let mut qb = QueryBuilder::new("SELECT ");
    qb.push(select).push(" FROM ").push(kind.source());
    if !joins.is_empty() {
        qb.push(" ").push(joins);
    }
    qb.push(" WHERE ");
    predicate.push_sql(kind, &mut qb);
    qb
}
