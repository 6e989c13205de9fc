// src/scope/filters.rs

use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use super::{
    actor::Actor,
    kind::EntityKind,
    predicate::{Field, Predicate},
    resolver::resolve,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum StockLevel {
    /// `quantity == 0`
    Out,
    /// `quantity <= min_quantity`
    Low,
}

/// Filtros opcionais de listagem, aplicados depois do escopo por papel.
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ListFilters {
    /// Busca textual (nome, e-mail, SKU...)
    pub search: Option<String>,
    pub status: Option<String>,
    /// Estágio do funil; `status` tem precedência quando vêm os dois
    pub stage: Option<String>,
    pub category: Option<Uuid>,
    pub store: Option<Uuid>,
    pub stock: Option<StockLevel>,
    /// Só para administradores da plataforma
    pub tenant_id: Option<Uuid>,
}

impl ListFilters {
    pub fn search(term: impl Into<String>) -> Self {
        Self {
            search: Some(term.into()),
            ..Default::default()
        }
    }

    pub fn predicate(&self) -> Predicate {
        let mut predicate = Predicate::All;

        if let Some(term) = non_blank(self.search.as_deref()) {
            predicate = predicate.and(Predicate::Search(term.to_owned()));
        }
        let status = non_blank(self.status.as_deref()).or(non_blank(self.stage.as_deref()));
        if let Some(status) = status {
            predicate = predicate.and(Predicate::eq(Field::Status, status));
        }
        if let Some(category) = self.category {
            predicate = predicate.and(Predicate::eq(Field::Category, category));
        }
        if let Some(store) = self.store {
            predicate = predicate.and(Predicate::eq(Field::OwnerStore, store));
        }
        match self.stock {
            Some(StockLevel::Out) => predicate.and(Predicate::eq(Field::Quantity, 0_i64)),
            Some(StockLevel::Low) => {
                predicate.and(Predicate::AtMost(Field::Quantity, Field::MinQuantity))
            }
            None => predicate,
        }
    }
}

impl ListFilters {
    /// Descarta os filtros sem coluna correspondente em `kind` (loja em
    /// produtos, estoque em clientes...).
    pub fn for_kind(&self, kind: EntityKind) -> Self {
        let applies = |field| kind.column(field).is_some();
        Self {
            search: self.search.clone(),
            status: self.status.clone().filter(|_| applies(Field::Status)),
            stage: self.stage.clone().filter(|_| applies(Field::Status)),
            category: self.category.filter(|_| applies(Field::Category)),
            store: self.store.filter(|_| applies(Field::OwnerStore)),
            stock: self
                .stock
                .filter(|_| applies(Field::Quantity) && applies(Field::MinQuantity)),
            tenant_id: self.tenant_id,
        }
    }

    /// Escopo do ator para `kind` mais os filtros. `tenant_id` só vale para
    /// administradores da plataforma; os demais já estão presos ao próprio.
    pub fn scoped(&self, actor: &Actor, kind: EntityKind) -> Predicate {
        let scoped = resolve(actor, kind).and(self.for_kind(kind).predicate());
        match self.tenant_id {
            Some(tenant) if actor.is_platform_admin() => {
                scoped.and(Predicate::eq(Field::Tenant, tenant))
            }
            _ => scoped,
        }
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_filters_select_everything() {
        assert_eq!(ListFilters::default().predicate(), Predicate::All);
    }

    #[test]
    fn blank_search_is_ignored() {
        let filters = ListFilters::search("   ");
        assert_eq!(filters.predicate(), Predicate::All);
    }

    #[test]
    fn filters_combine_with_and() {
        let category = Uuid::new_v4();
        let filters = ListFilters {
            search: Some(" anel ".into()),
            category: Some(category),
            stock: Some(StockLevel::Low),
            ..Default::default()
        };
        assert_eq!(
            filters.predicate(),
            Predicate::And(vec![
                Predicate::Search("anel".into()),
                Predicate::eq(Field::Category, category),
                Predicate::AtMost(Field::Quantity, Field::MinQuantity),
            ])
        );
    }

    #[test]
    fn tenant_filter_only_applies_to_platform_admins() {
        use crate::models::auth::Role;

        let tenant = Uuid::new_v4();
        let filters = ListFilters {
            tenant_id: Some(tenant),
            ..Default::default()
        };
        let admin = Actor {
            user_id: Uuid::new_v4(),
            role: Some(Role::PlatformAdmin),
            tenant_id: None,
            store_id: None,
        };
        assert_eq!(
            filters.scoped(&admin, EntityKind::Client),
            Predicate::eq(Field::Tenant, tenant)
        );

        let own_tenant = Uuid::new_v4();
        let business_admin = Actor {
            role: Some(Role::BusinessAdmin),
            tenant_id: Some(own_tenant),
            ..admin
        };
        assert_eq!(
            filters.scoped(&business_admin, EntityKind::Client),
            Predicate::eq(Field::Tenant, own_tenant)
        );
    }

    fn business_admin(tenant: Uuid) -> Actor {
        use crate::models::auth::Role;

        Actor {
            user_id: Uuid::new_v4(),
            role: Some(Role::BusinessAdmin),
            tenant_id: Some(tenant),
            store_id: None,
        }
    }

    #[test]
    fn status_and_stage_can_both_be_sent() {
        let uri: axum::http::Uri = "/api/sales/pipeline?status=lead&stage=qualified"
            .parse()
            .expect("uri");
        let axum::extract::Query(filters) =
            axum::extract::Query::<ListFilters>::try_from_uri(&uri).expect("query");
        assert_eq!(filters.predicate(), Predicate::eq(Field::Status, "lead"));

        let uri: axum::http::Uri = "/api/sales/pipeline?stage=qualified".parse().expect("uri");
        let axum::extract::Query(filters) =
            axum::extract::Query::<ListFilters>::try_from_uri(&uri).expect("query");
        assert_eq!(filters.predicate(), Predicate::eq(Field::Status, "qualified"));
    }

    #[test]
    fn filters_without_a_column_are_dropped() {
        let tenant = Uuid::new_v4();
        let store = Uuid::new_v4();
        let filters = ListFilters {
            store: Some(store),
            stock: Some(StockLevel::Out),
            ..Default::default()
        };
        let admin = business_admin(tenant);

        // Produto não tem dono nem loja: o filtro de loja não zera a lista.
        assert_eq!(
            filters.scoped(&admin, EntityKind::Product),
            Predicate::And(vec![
                Predicate::eq(Field::Tenant, tenant),
                Predicate::eq(Field::Quantity, 0_i64),
            ])
        );
        // Cliente não tem estoque.
        assert_eq!(
            filters.scoped(&admin, EntityKind::Client),
            Predicate::And(vec![
                Predicate::eq(Field::Tenant, tenant),
                Predicate::eq(Field::OwnerStore, store),
            ])
        );
    }

    #[test]
    fn status_filter_is_ignored_where_there_is_no_status() {
        let tenant = Uuid::new_v4();
        let filters = ListFilters {
            status: Some("active".into()),
            ..Default::default()
        };
        assert_eq!(
            filters.scoped(&business_admin(tenant), EntityKind::Category),
            Predicate::eq(Field::Tenant, tenant)
        );
    }
}
