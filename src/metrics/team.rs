// src/metrics/team.rs

use rust_decimal::Decimal;

use super::{mean, percentage};
use crate::models::{
    dashboard::{ActivityEntry, ManagerDashboard, RatingSummary, TeamStats, TopPerformer},
    figures::{ClientFigure, MemberFigure},
    team::{MemberStatus, PerformanceRating},
};

const TOP_PERFORMERS: usize = 5;

/// Percentual da meta atingido; zero sem meta.
pub fn sales_percentage(current_sales: Decimal, sales_target: Decimal) -> Decimal {
    percentage(current_sales, sales_target)
}

/// Média das notas (excelente = 5 ... ruim = 1) dos membros avaliados.
pub fn average_performance(members: &[MemberFigure]) -> Decimal {
    let scores: Vec<Decimal> = members
        .iter()
        .filter_map(|m| m.performance_rating)
        .map(|rating| Decimal::from(rating.score()))
        .collect();
    mean(scores.iter().sum(), scores.len()).round_dp(2)
}

pub fn rating_summary(members: &[MemberFigure]) -> RatingSummary {
    let mut summary = RatingSummary::default();
    for rating in members.iter().filter_map(|m| m.performance_rating) {
        match rating {
            PerformanceRating::Excellent => summary.excellent += 1,
            PerformanceRating::Good => summary.good += 1,
            PerformanceRating::Average => summary.average += 1,
            PerformanceRating::BelowAverage => summary.below_average += 1,
            PerformanceRating::Poor => summary.poor += 1,
        }
    }
    summary
}

pub fn top_performers(members: &[MemberFigure]) -> Vec<TopPerformer> {
    let mut top: Vec<&MemberFigure> = members
        .iter()
        .filter(|m| m.performance_rating.is_some_and(PerformanceRating::is_top))
        .collect();
    top.sort_by(|a, b| b.current_sales.cmp(&a.current_sales));

    top.into_iter()
        .take(TOP_PERFORMERS)
        .map(|m| TopPerformer {
            id: m.id,
            name: m.name.clone(),
            performance_rating: m.performance_rating,
            current_sales: m.current_sales,
            sales_percentage: sales_percentage(m.current_sales, m.sales_target),
        })
        .collect()
}

fn active_count(members: &[MemberFigure]) -> usize {
    members
        .iter()
        .filter(|m| m.status == MemberStatus::Active)
        .count()
}

pub fn team_stats(members: &[MemberFigure], recent_activities: Vec<ActivityEntry>) -> TeamStats {
    TeamStats {
        total_members: members.len(),
        active_members: active_count(members),
        total_sales: members.iter().map(|m| m.current_sales).sum(),
        avg_performance: average_performance(members),
        top_performers: top_performers(members),
        performance_distribution: rating_summary(members),
        recent_activities,
    }
}

/// Painel do gerente: subordinados diretos e clientes da loja. Sem loja, os
/// números da loja ficam zerados.
pub fn manager_dashboard(
    reports: &[MemberFigure],
    store_clients: Option<&[ClientFigure]>,
    recent_activities: Vec<ActivityEntry>,
) -> ManagerDashboard {
    let clients = store_clients.unwrap_or_default();

    ManagerDashboard {
        team_members_count: reports.len(),
        active_team_members: active_count(reports),
        team_sales: reports.iter().map(|m| m.current_sales).sum(),
        performance_summary: rating_summary(reports),
        store_leads: clients.iter().filter(|c| c.purchase_count == 0).count(),
        store_customers: clients.iter().filter(|c| c.purchase_count > 0).count(),
        store_sales: clients.iter().map(|c| c.purchase_total).sum(),
        recent_activities,
    }
}
