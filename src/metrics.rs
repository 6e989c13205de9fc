// src/metrics.rs

//! Reduções puras sobre conjuntos de registros já filtrados pelo escopo.
//!
//! Nada aqui acessa o banco: os serviços carregam as linhas com um
//! [`crate::scope::TenantScope`] e entregam para estas funções.

pub mod calendar;
pub mod catalog;
pub mod pipeline;
pub mod sales;
pub mod team;

pub use calendar::{Calendar, DateWindow};

use rust_decimal::Decimal;

/// `part / whole * 100` com duas casas; zero quando `whole` é zero.
pub fn percentage(part: Decimal, whole: Decimal) -> Decimal {
    if whole.is_zero() {
        return Decimal::ZERO;
    }
    (part / whole * Decimal::ONE_HUNDRED).round_dp(2)
}

pub fn count_rate(part: usize, whole: usize) -> Decimal {
    percentage(Decimal::from(part), Decimal::from(whole))
}

/// Média simples; zero para conjunto vazio.
pub fn mean(total: Decimal, count: usize) -> Decimal {
    if count == 0 {
        Decimal::ZERO
    } else {
        total / Decimal::from(count)
    }
}
