// src/scope/resolver.rs

use uuid::Uuid;

use super::{
    actor::Actor,
    kind::EntityKind,
    predicate::{Field, Predicate},
};
use crate::models::auth::Role;

/// Regra de visibilidade derivada do papel do ator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Rule {
    Everything,
    Tenant(Uuid),
    Team {
        tenant: Uuid,
        user: Uuid,
        store: Option<Uuid>,
    },
    StorePeers {
        tenant: Uuid,
        store: Uuid,
    },
    OwnRecords {
        tenant: Uuid,
        user: Uuid,
    },
    Nothing,
}

impl Rule {
    fn for_actor(actor: &Actor) -> Rule {
        if actor.is_platform_admin() {
            return Rule::Everything;
        }
        // Sem tenant não há o que enxergar.
        let Some(tenant) = actor.tenant_id else {
            return Rule::Nothing;
        };

        match (actor.role, actor.store_id) {
            (Some(Role::BusinessAdmin), _) => Rule::Tenant(tenant),
            (Some(Role::Manager), store) => Rule::Team {
                tenant,
                user: actor.user_id,
                store,
            },
            (Some(Role::TeleCalling), Some(store)) => Rule::StorePeers { tenant, store },
            _ => Rule::OwnRecords {
                tenant,
                user: actor.user_id,
            },
        }
    }

    fn tenant(&self) -> Option<Uuid> {
        match *self {
            Rule::Tenant(tenant)
            | Rule::Team { tenant, .. }
            | Rule::StorePeers { tenant, .. }
            | Rule::OwnRecords { tenant, .. } => Some(tenant),
            Rule::Everything | Rule::Nothing => None,
        }
    }

    fn predicate(&self, kind: EntityKind) -> Predicate {
        match *self {
            Rule::Everything => return Predicate::All,
            Rule::Nothing => return Predicate::Nothing,
            _ => {}
        }

        let in_tenant = match self.tenant() {
            Some(tenant) => Predicate::eq(Field::Tenant, tenant),
            None => return Predicate::Nothing,
        };
        if !kind.has_owner() {
            return in_tenant;
        }

        match *self {
            Rule::Team { user, store, .. } => {
                let team = Predicate::eq(Field::Owner, user)
                    .or(Predicate::eq(Field::OwnerManager, user));
                let scoped = in_tenant.and(team);
                match store {
                    Some(store) if kind.is_store_scoped() => {
                        scoped.and(Predicate::eq(Field::OwnerStore, store))
                    }
                    _ => scoped,
                }
            }
            Rule::StorePeers { store, .. } => in_tenant
                .and(Predicate::eq(Field::OwnerStore, store))
                .and(Predicate::eq(Field::OwnerRole, Role::TeleCalling)),
            Rule::OwnRecords { user, .. } => in_tenant.and(Predicate::eq(Field::Owner, user)),
            Rule::Tenant(_) | Rule::Everything | Rule::Nothing => in_tenant,
        }
    }
}

/// Conjunto visível de `kind` para o ator.
pub fn resolve(actor: &Actor, kind: EntityKind) -> Predicate {
    Rule::for_actor(actor).predicate(kind)
}

/// Escopo obrigatório para consultas e agregações: um tenant concreto mais as
/// regras do ator. Só pode ser obtido por [`TenantScope::for_actor`].
#[derive(Debug, Clone)]
pub struct TenantScope {
    tenant_id: Uuid,
    actor: Actor,
}

impl TenantScope {
    /// Administradores da plataforma podem escolher o tenant; os demais ficam
    /// sempre no próprio. `None` quando não há tenant a consultar.
    pub fn for_actor(actor: &Actor, requested_tenant: Option<Uuid>) -> Option<TenantScope> {
        let tenant_id = if actor.is_platform_admin() {
            requested_tenant.or(actor.tenant_id)?
        } else {
            actor.tenant_id?
        };

        Some(TenantScope {
            tenant_id,
            actor: actor.clone(),
        })
    }

    pub fn tenant_id(&self) -> Uuid {
        self.tenant_id
    }

    pub fn actor(&self) -> &Actor {
        &self.actor
    }

    pub fn predicate(&self, kind: EntityKind) -> Predicate {
        Predicate::eq(Field::Tenant, self.tenant_id).and(resolve(&self.actor, kind))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scope::predicate::{Ownership, ScopedRecord, Value};

    struct Record(Ownership);

    impl ScopedRecord for Record {
        fn value_of(&self, field: Field) -> Option<Value> {
            self.0.value_of(field)
        }
    }

    fn actor(role: Option<Role>, tenant: Option<Uuid>, store: Option<Uuid>) -> Actor {
        Actor {
            user_id: Uuid::new_v4(),
            role,
            tenant_id: tenant,
            store_id: store,
        }
    }

    fn owned_by(
        tenant: Uuid,
        owner: Uuid,
        manager: Option<Uuid>,
        store: Option<Uuid>,
        role: Role,
    ) -> Record {
        Record(Ownership {
            tenant_id: Some(tenant),
            owner_id: Some(owner),
            owner_manager_id: manager,
            owner_store_id: store,
            owner_role: Some(role),
        })
    }

    #[test]
    fn non_admin_never_sees_other_tenants() {
        let tenant = Uuid::new_v4();
        let other = Uuid::new_v4();
        let store = Uuid::new_v4();

        for role in [
            Role::BusinessAdmin,
            Role::Manager,
            Role::InhouseSales,
            Role::TeleCalling,
            Role::Marketing,
        ] {
            let me = actor(Some(role), Some(tenant), Some(store));
            let foreign = owned_by(other, me.user_id, Some(me.user_id), Some(store), role);
            for kind in [EntityKind::Client, EntityKind::Sale, EntityKind::Product] {
                assert!(!resolve(&me, kind).matches(&foreign), "{role:?} {kind:?}");
            }
        }
    }

    #[test]
    fn manager_sees_self_and_direct_reports_only() {
        let tenant = Uuid::new_v4();
        let manager = actor(Some(Role::Manager), Some(tenant), None);
        let predicate = resolve(&manager, EntityKind::Deal);

        let own = owned_by(tenant, manager.user_id, None, None, Role::Manager);
        let report = owned_by(tenant, Uuid::new_v4(), Some(manager.user_id), None, Role::InhouseSales);
        let stranger = owned_by(tenant, Uuid::new_v4(), Some(Uuid::new_v4()), None, Role::InhouseSales);

        assert!(predicate.matches(&own));
        assert!(predicate.matches(&report));
        assert!(!predicate.matches(&stranger));
    }

    #[test]
    fn manager_with_store_is_narrowed_on_clients_only() {
        let tenant = Uuid::new_v4();
        let store = Uuid::new_v4();
        let manager = actor(Some(Role::Manager), Some(tenant), Some(store));
        let report_elsewhere = owned_by(
            tenant,
            Uuid::new_v4(),
            Some(manager.user_id),
            Some(Uuid::new_v4()),
            Role::InhouseSales,
        );

        assert!(!resolve(&manager, EntityKind::Client).matches(&report_elsewhere));
        assert!(resolve(&manager, EntityKind::Sale).matches(&report_elsewhere));
    }

    #[test]
    fn tele_calling_sees_store_peers_with_same_role() {
        let tenant = Uuid::new_v4();
        let store = Uuid::new_v4();
        let caller = actor(Some(Role::TeleCalling), Some(tenant), Some(store));
        let predicate = resolve(&caller, EntityKind::Client);

        let peer = owned_by(tenant, Uuid::new_v4(), None, Some(store), Role::TeleCalling);
        let seller = owned_by(tenant, Uuid::new_v4(), None, Some(store), Role::InhouseSales);

        assert!(predicate.matches(&peer));
        assert!(!predicate.matches(&seller));
    }

    #[test]
    fn tele_calling_without_store_falls_back_to_own_records() {
        let tenant = Uuid::new_v4();
        let caller = actor(Some(Role::TeleCalling), Some(tenant), None);
        assert_eq!(
            resolve(&caller, EntityKind::Client),
            Predicate::eq(Field::Tenant, tenant).and(Predicate::eq(Field::Owner, caller.user_id))
        );
    }

    #[test]
    fn actor_without_tenant_sees_nothing() {
        for role in [None, Some(Role::BusinessAdmin), Some(Role::Manager), Some(Role::Marketing)] {
            let lost = actor(role, None, None);
            assert!(resolve(&lost, EntityKind::Client).is_nothing());
            assert!(resolve(&lost, EntityKind::Product).is_nothing());
            assert!(TenantScope::for_actor(&lost, Some(Uuid::new_v4())).is_none());
        }
    }

    #[test]
    fn platform_admin_sees_everything_and_may_pick_a_tenant() {
        let admin = actor(Some(Role::PlatformAdmin), None, None);
        assert_eq!(resolve(&admin, EntityKind::Sale), Predicate::All);

        let target = Uuid::new_v4();
        let scope = TenantScope::for_actor(&admin, Some(target)).expect("tenant chosen");
        assert_eq!(scope.tenant_id(), target);
        assert_eq!(
            scope.predicate(EntityKind::Sale),
            Predicate::eq(Field::Tenant, target)
        );
    }

    #[test]
    fn requested_tenant_is_ignored_for_tenant_users() {
        let tenant = Uuid::new_v4();
        let admin = actor(Some(Role::BusinessAdmin), Some(tenant), None);
        let scope = TenantScope::for_actor(&admin, Some(Uuid::new_v4())).expect("own tenant");
        assert_eq!(scope.tenant_id(), tenant);
    }

    #[test]
    fn catalog_kinds_are_tenant_wide() {
        let tenant = Uuid::new_v4();
        let seller = actor(Some(Role::InhouseSales), Some(tenant), None);
        assert_eq!(
            resolve(&seller, EntityKind::Product),
            Predicate::eq(Field::Tenant, tenant)
        );
    }

    #[test]
    fn scoping_twice_selects_the_same_records() {
        let tenant = Uuid::new_v4();
        let manager = actor(Some(Role::Manager), Some(tenant), None);
        let once = resolve(&manager, EntityKind::Client);
        let twice = once.clone().and(once.clone());

        let records = [
            owned_by(tenant, manager.user_id, None, None, Role::Manager),
            owned_by(tenant, Uuid::new_v4(), Some(manager.user_id), None, Role::Marketing),
            owned_by(tenant, Uuid::new_v4(), None, None, Role::Marketing),
            owned_by(Uuid::new_v4(), manager.user_id, None, None, Role::Manager),
        ];
        for record in &records {
            assert_eq!(once.matches(record), twice.matches(record));
        }
    }
}
