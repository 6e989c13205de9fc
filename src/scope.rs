// src/scope.rs

//! Escopo de visibilidade por papel.
//!
//! Todo acesso a dados de um tenant passa por aqui: o [`Actor`] autenticado
//! vira um [`Predicate`] por tipo de entidade, que pode ser renderizado em SQL
//! ou avaliado em memória sobre um registro já carregado.

pub mod actor;
pub mod filters;
pub mod kind;
pub mod predicate;
pub mod resolver;

pub use actor::Actor;
pub use filters::{ListFilters, StockLevel};
pub use kind::{EntityKind, scoped_query};
pub use predicate::{Field, Ownership, Predicate, ScopedRecord, Value};
pub use resolver::{TenantScope, resolve};
