// src/scope/predicate.rs

use sqlx::{FromRow, Postgres, QueryBuilder};
use uuid::Uuid;

use super::kind::EntityKind;
use crate::models::auth::Role;

/// Campos que um predicado pode comparar. Cada [`EntityKind`] sabe para qual
/// coluna cada um aponta.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    Tenant,
    /// Usuário dono do registro.
    Owner,
    /// Usuário que gerencia diretamente o dono.
    OwnerManager,
    OwnerStore,
    OwnerRole,
    Status,
    Category,
    Quantity,
    MinQuantity,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    Id(Uuid),
    Text(String),
    Int(i64),
}

impl From<Uuid> for Value {
    fn from(id: Uuid) -> Self {
        Value::Id(id)
    }
}

impl From<&str> for Value {
    fn from(text: &str) -> Self {
        Value::Text(text.to_owned())
    }
}

impl From<String> for Value {
    fn from(text: String) -> Self {
        Value::Text(text)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Int(n)
    }
}

impl From<Role> for Value {
    fn from(role: Role) -> Self {
        Value::Text(role.as_str().to_owned())
    }
}

/// Filtro composável sobre registros de um tipo de entidade.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Predicate {
    All,
    Nothing,
    Eq(Field, Value),
    /// `a <= b`, ambos campos inteiros do mesmo registro.
    AtMost(Field, Field),
    /// Substring sem diferenciar maiúsculas nas colunas de busca do tipo.
    Search(String),
    And(Vec<Predicate>),
    Or(Vec<Predicate>),
}

impl Predicate {
    pub fn eq(field: Field, value: impl Into<Value>) -> Self {
        Predicate::Eq(field, value.into())
    }

    pub fn and(self, other: Predicate) -> Predicate {
        match (self, other) {
            (Predicate::Nothing, _) | (_, Predicate::Nothing) => Predicate::Nothing,
            (Predicate::All, p) | (p, Predicate::All) => p,
            (Predicate::And(mut left), Predicate::And(right)) => {
                left.extend(right);
                Predicate::And(left)
            }
            (Predicate::And(mut left), p) => {
                left.push(p);
                Predicate::And(left)
            }
            (p, Predicate::And(mut right)) => {
                right.insert(0, p);
                Predicate::And(right)
            }
            (a, b) => Predicate::And(vec![a, b]),
        }
    }

    pub fn or(self, other: Predicate) -> Predicate {
        match (self, other) {
            (Predicate::All, _) | (_, Predicate::All) => Predicate::All,
            (Predicate::Nothing, p) | (p, Predicate::Nothing) => p,
            (Predicate::Or(mut left), Predicate::Or(right)) => {
                left.extend(right);
                Predicate::Or(left)
            }
            (Predicate::Or(mut left), p) => {
                left.push(p);
                Predicate::Or(left)
            }
            (p, Predicate::Or(mut right)) => {
                right.insert(0, p);
                Predicate::Or(right)
            }
            (a, b) => Predicate::Or(vec![a, b]),
        }
    }

    pub fn is_nothing(&self) -> bool {
        matches!(self, Predicate::Nothing)
    }

    /// Avalia o predicado sobre um registro já carregado. Segue a semântica do
    /// SQL gerado por [`Predicate::push_sql`]: campo ausente nunca casa.
    pub fn matches<R: ScopedRecord + ?Sized>(&self, record: &R) -> bool {
        match self {
            Predicate::All => true,
            Predicate::Nothing => false,
            Predicate::Eq(field, value) => record.value_of(*field).as_ref() == Some(value),
            Predicate::AtMost(a, b) => match (record.value_of(*a), record.value_of(*b)) {
                (Some(Value::Int(a)), Some(Value::Int(b))) => a <= b,
                _ => false,
            },
            Predicate::Search(term) => {
                let needle = term.to_lowercase();
                record
                    .search_text()
                    .iter()
                    .any(|text| text.to_lowercase().contains(&needle))
            }
            Predicate::And(parts) => parts.iter().all(|p| p.matches(record)),
            Predicate::Or(parts) => parts.iter().any(|p| p.matches(record)),
        }
    }

    /// Renderiza o predicado como fragmento de WHERE parametrizado.
    pub fn push_sql(&self, kind: EntityKind, qb: &mut QueryBuilder<'_, Postgres>) {
        match self {
            Predicate::All => {
                qb.push("TRUE");
            }
            Predicate::Nothing => {
                qb.push("FALSE");
            }
            Predicate::Eq(field, value) => match kind.column(*field) {
                Some(column) => {
                    qb.push(column).push(" = ");
                    match value {
                        Value::Id(id) => qb.push_bind(*id),
                        Value::Text(text) => qb.push_bind(text.clone()),
                        Value::Int(n) => qb.push_bind(*n),
                    };
                }
                None => {
                    qb.push("FALSE");
                }
            },
            Predicate::AtMost(a, b) => match (kind.column(*a), kind.column(*b)) {
                (Some(a), Some(b)) => {
                    qb.push(a).push(" <= ").push(b);
                }
                _ => {
                    qb.push("FALSE");
                }
            },
            Predicate::Search(term) => {
                let columns = kind.search_columns();
                if columns.is_empty() {
                    qb.push("FALSE");
                    return;
                }
                let pattern = format!("%{}%", escape_like(term));
                qb.push("(");
                for (i, column) in columns.iter().enumerate() {
                    if i > 0 {
                        qb.push(" OR ");
                    }
                    qb.push(*column).push(" ILIKE ").push_bind(pattern.clone());
                }
                qb.push(")");
            }
            Predicate::And(parts) => push_joined(parts, " AND ", "TRUE", kind, qb),
            Predicate::Or(parts) => push_joined(parts, " OR ", "FALSE", kind, qb),
        }
    }
}

fn push_joined(
    parts: &[Predicate],
    separator: &str,
    empty: &str,
    kind: EntityKind,
    qb: &mut QueryBuilder<'_, Postgres>,
) {
    if parts.is_empty() {
        qb.push(empty);
        return;
    }
    qb.push("(");
    for (i, part) in parts.iter().enumerate() {
        if i > 0 {
            qb.push(separator);
        }
        part.push_sql(kind, qb);
    }
    qb.push(")");
}

fn escape_like(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len());
    for ch in term.chars() {
        if matches!(ch, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped
}

/// Fatos de posse de um registro carregado junto com ele (ver
/// [`EntityKind::ownership_columns`]).
#[derive(Debug, Clone, Default, PartialEq, Eq, FromRow)]
pub struct Ownership {
    pub tenant_id: Option<Uuid>,
    pub owner_id: Option<Uuid>,
    pub owner_manager_id: Option<Uuid>,
    pub owner_store_id: Option<Uuid>,
    pub owner_role: Option<Role>,
}

impl Ownership {
    pub fn value_of(&self, field: Field) -> Option<Value> {
        match field {
            Field::Tenant => self.tenant_id.map(Value::Id),
            Field::Owner => self.owner_id.map(Value::Id),
            Field::OwnerManager => self.owner_manager_id.map(Value::Id),
            Field::OwnerStore => self.owner_store_id.map(Value::Id),
            Field::OwnerRole => self.owner_role.map(Value::from),
            _ => None,
        }
    }
}

/// Registro que pode ser testado contra um [`Predicate`] em memória.
pub trait ScopedRecord {
    fn value_of(&self, field: Field) -> Option<Value>;

    fn search_text(&self) -> Vec<&str> {
        Vec::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Row {
        ownership: Ownership,
        status: &'static str,
        name: &'static str,
    }

    impl ScopedRecord for Row {
        fn value_of(&self, field: Field) -> Option<Value> {
            match field {
                Field::Status => Some(self.status.into()),
                _ => self.ownership.value_of(field),
            }
        }

        fn search_text(&self) -> Vec<&str> {
            vec![self.name]
        }
    }

    fn row(tenant: Uuid, owner: Uuid) -> Row {
        Row {
            ownership: Ownership {
                tenant_id: Some(tenant),
                owner_id: Some(owner),
                ..Default::default()
            },
            status: "active",
            name: "Anel de Ouro 18k",
        }
    }

    #[test]
    fn and_or_simplify_identities() {
        let p = Predicate::eq(Field::Status, "active");
        assert_eq!(Predicate::All.and(p.clone()), p);
        assert_eq!(p.clone().and(Predicate::Nothing), Predicate::Nothing);
        assert_eq!(Predicate::Nothing.or(p.clone()), p);
        assert_eq!(p.clone().or(Predicate::All), Predicate::All);
    }

    #[test]
    fn and_flattens_nested_conjunctions() {
        let a = Predicate::eq(Field::Status, "a");
        let b = Predicate::eq(Field::Status, "b");
        let c = Predicate::eq(Field::Status, "c");
        let combined = a.clone().and(b.clone()).and(c.clone());
        assert_eq!(combined, Predicate::And(vec![a, b, c]));
    }

    #[test]
    fn missing_field_never_matches() {
        let tenant = Uuid::new_v4();
        let record = row(tenant, Uuid::new_v4());
        assert!(!Predicate::eq(Field::OwnerStore, Uuid::new_v4()).matches(&record));
        assert!(!Predicate::AtMost(Field::Quantity, Field::MinQuantity).matches(&record));
        assert!(Predicate::eq(Field::Tenant, tenant).matches(&record));
    }

    #[test]
    fn search_is_case_insensitive_substring() {
        let record = row(Uuid::new_v4(), Uuid::new_v4());
        assert!(Predicate::Search("ouro".into()).matches(&record));
        assert!(!Predicate::Search("prata".into()).matches(&record));
    }

    #[test]
    fn renders_tenant_as_bound_parameter() {
        let tenant = Uuid::new_v4();
        let predicate = Predicate::eq(Field::Tenant, tenant)
            .and(Predicate::eq(Field::Owner, Uuid::new_v4()).or(Predicate::eq(
                Field::OwnerManager,
                Uuid::new_v4(),
            )));

        let mut qb = QueryBuilder::<Postgres>::new("");
        predicate.push_sql(EntityKind::Client, &mut qb);

        assert_eq!(
            qb.sql(),
            "(c.tenant_id = $1 AND (c.assigned_to_id = $2 OR mgr.user_id = $3))"
        );
        assert!(!qb.sql().contains(&tenant.to_string()));
    }

    #[test]
    fn renders_search_over_every_column_with_escaped_pattern() {
        let mut qb = QueryBuilder::<Postgres>::new("");
        Predicate::Search("50%".into()).push_sql(EntityKind::Category, &mut qb);
        assert_eq!(qb.sql(), "(cat.name ILIKE $1)");
        assert_eq!(escape_like("50%_a\\"), "50\\%\\_a\\\\");
    }

    #[test]
    fn unknown_field_renders_false() {
        let mut qb = QueryBuilder::<Postgres>::new("");
        Predicate::eq(Field::Owner, Uuid::new_v4()).push_sql(EntityKind::Product, &mut qb);
        assert_eq!(qb.sql(), "FALSE");
    }
}
