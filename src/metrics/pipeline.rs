// src/metrics/pipeline.rs

use rust_decimal::Decimal;

use super::{Calendar, count_rate, mean};
use crate::models::{
    dashboard::{
        ConversionSummary, DealSizeSummary, PipelineAnalytics, PipelineOverview, StageBucket,
        StageVelocity, WinLossSummary,
    },
    figures::DealFigure,
    sales::DealStage,
};

const SECONDS_PER_DAY: i64 = 86_400;

/// Quantidade e valor esperado por estágio, sempre na ordem fixa dos estágios.
pub fn stage_distribution(deals: &[DealFigure]) -> Vec<StageBucket> {
    DealStage::ALL
        .iter()
        .map(|&stage| {
            let (count, value) = deals
                .iter()
                .filter(|d| d.stage == stage)
                .fold((0usize, Decimal::ZERO), |(count, value), deal| {
                    (count + 1, value + deal.expected_value)
                });
            StageBucket {
                stage,
                name: stage.label().to_owned(),
                count,
                value,
            }
        })
        .collect()
}

pub fn pipeline_overview(deals: &[DealFigure]) -> PipelineOverview {
    let active = deals.iter().filter(|d| d.stage.counts_as_active());

    PipelineOverview {
        stages: stage_distribution(deals),
        total_pipeline_value: active.clone().map(|d| d.expected_value).sum(),
        active_deals: active.count(),
    }
}

/// Tempo médio (dias inteiros, truncados) entre criação e última atualização,
/// só para estágios que têm negócios.
pub fn pipeline_velocity(deals: &[DealFigure]) -> Vec<StageVelocity> {
    DealStage::ALL
        .iter()
        .filter_map(|&stage| {
            let seconds: Vec<i64> = deals
                .iter()
                .filter(|d| d.stage == stage)
                .map(|d| (d.updated_at - d.created_at).num_seconds())
                .collect();
            if seconds.is_empty() {
                return None;
            }

            let avg_seconds = seconds.iter().sum::<i64>() / seconds.len() as i64;
            Some(StageVelocity {
                stage,
                name: stage.label().to_owned(),
                avg_days: (avg_seconds / SECONDS_PER_DAY).max(0),
                deal_count: seconds.len(),
            })
        })
        .collect()
}

pub fn conversion(deals: &[DealFigure], calendar: &Calendar) -> ConversionSummary {
    let leads = deals.iter().filter(|d| d.stage == DealStage::Lead);
    let won = deals.iter().filter(|d| d.stage == DealStage::ClosedWon);

    let total_leads = leads.clone().count();
    let converted_leads = won.clone().count();
    let monthly_leads = leads
        .filter(|d| calendar.in_current_month(d.created_at.date_naive()))
        .count();
    let monthly_converted = won
        .filter(|d| calendar.in_current_month(d.closed_on()))
        .count();

    ConversionSummary {
        total_leads,
        converted_leads,
        conversion_rate: count_rate(converted_leads, total_leads),
        monthly_leads,
        monthly_converted,
        monthly_conversion_rate: count_rate(monthly_converted, monthly_leads),
    }
}

pub fn win_loss(deals: &[DealFigure]) -> WinLossSummary {
    let total_closed = deals.iter().filter(|d| d.is_closed).count();
    let won = deals.iter().filter(|d| d.stage == DealStage::ClosedWon).count();
    let lost = deals.iter().filter(|d| d.stage == DealStage::ClosedLost).count();

    WinLossSummary {
        total_closed,
        won,
        lost,
        win_rate: count_rate(won, total_closed),
        loss_rate: count_rate(lost, total_closed),
    }
}

/// Estatísticas de `expected_value` dos negócios com valor positivo.
pub fn deal_size(deals: &[DealFigure]) -> DealSizeSummary {
    let values: Vec<Decimal> = deals
        .iter()
        .map(|d| d.expected_value)
        .filter(|v| *v > Decimal::ZERO)
        .collect();

    DealSizeSummary {
        avg_deal_size: mean(values.iter().sum(), values.len()),
        max_deal_size: values.iter().copied().max().unwrap_or(Decimal::ZERO),
        min_deal_size: values.iter().copied().min().unwrap_or(Decimal::ZERO),
    }
}

pub fn pipeline_analytics(deals: &[DealFigure]) -> PipelineAnalytics {
    PipelineAnalytics {
        stage_distribution: stage_distribution(deals),
        pipeline_velocity: pipeline_velocity(deals),
        win_loss_analysis: win_loss(deals),
        deal_size_analysis: deal_size(deals),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, Duration, NaiveDate, TimeZone, Utc};

    fn at(y: i32, m: u32, d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, 9, 0, 0).single().expect("valid time")
    }

    fn deal(stage: DealStage, value: i64, created_at: DateTime<Utc>) -> DealFigure {
        DealFigure {
            stage,
            expected_value: Decimal::from(value),
            is_closed: stage.is_closing(),
            created_at,
            updated_at: created_at,
            actual_close_date: None,
        }
    }

    #[test]
    fn distribution_covers_every_stage_in_order() {
        let now = at(2025, 5, 1);
        let deals = vec![
            deal(DealStage::Proposal, 300, now),
            deal(DealStage::Lead, 100, now),
            deal(DealStage::Lead, 50, now),
        ];

        let buckets = stage_distribution(&deals);
        let stages: Vec<DealStage> = buckets.iter().map(|b| b.stage).collect();
        assert_eq!(stages, DealStage::ALL.to_vec());
        assert_eq!(buckets[0].count, 2);
        assert_eq!(buckets[0].value, Decimal::from(150));
        assert_eq!(buckets[1].count, 0);
        assert_eq!(buckets[1].value, Decimal::ZERO);
    }

    #[test]
    fn won_deals_count_as_active_lost_deals_do_not() {
        let now = at(2025, 5, 1);
        let deals = vec![
            deal(DealStage::Negotiation, 1000, now),
            deal(DealStage::ClosedWon, 500, now),
            deal(DealStage::ClosedLost, 700, now),
        ];

        let overview = pipeline_overview(&deals);
        assert_eq!(overview.active_deals, 2);
        assert_eq!(overview.total_pipeline_value, Decimal::from(1500));
    }

    #[test]
    fn monthly_conversion_of_two_leads_and_one_win_is_fifty_percent() {
        let calendar = Calendar::new(NaiveDate::from_ymd_opt(2025, 5, 20).expect("date"));
        let this_month = at(2025, 5, 3);
        let deals = vec![
            deal(DealStage::Lead, 0, this_month),
            deal(DealStage::Lead, 0, this_month),
            deal(DealStage::ClosedWon, 900, this_month),
        ];

        let summary = conversion(&deals, &calendar);
        assert_eq!(summary.monthly_leads, 2);
        assert_eq!(summary.monthly_converted, 1);
        assert_eq!(summary.monthly_conversion_rate, Decimal::from(50));
        assert_eq!(summary.conversion_rate, Decimal::from(50));
    }

    #[test]
    fn conversion_without_leads_is_zero() {
        let calendar = Calendar::new(NaiveDate::from_ymd_opt(2025, 5, 20).expect("date"));
        let deals = vec![deal(DealStage::ClosedWon, 10, at(2025, 5, 2))];
        let summary = conversion(&deals, &calendar);
        assert_eq!(summary.conversion_rate, Decimal::ZERO);
        assert_eq!(summary.monthly_conversion_rate, Decimal::ZERO);
    }

    #[test]
    fn conversion_uses_close_date_for_wins() {
        let calendar = Calendar::new(NaiveDate::from_ymd_opt(2025, 5, 20).expect("date"));
        let mut old_win = deal(DealStage::ClosedWon, 10, at(2025, 4, 2));
        old_win.actual_close_date = NaiveDate::from_ymd_opt(2025, 4, 30);
        let mut fresh_win = deal(DealStage::ClosedWon, 10, at(2025, 3, 2));
        fresh_win.actual_close_date = NaiveDate::from_ymd_opt(2025, 5, 1);

        let summary = conversion(&[old_win, fresh_win], &calendar);
        assert_eq!(summary.converted_leads, 2);
        assert_eq!(summary.monthly_converted, 1);
    }

    #[test]
    fn win_loss_without_closed_deals_is_zero() {
        let deals = vec![deal(DealStage::Proposal, 10, at(2025, 5, 1))];
        assert_eq!(win_loss(&deals), WinLossSummary::default());
    }

    #[test]
    fn win_loss_rates_are_over_closed_deals() {
        let now = at(2025, 5, 1);
        let deals = vec![
            deal(DealStage::ClosedWon, 10, now),
            deal(DealStage::ClosedLost, 10, now),
            deal(DealStage::ClosedLost, 10, now),
            deal(DealStage::Lead, 10, now),
        ];
        let summary = win_loss(&deals);
        assert_eq!(summary.total_closed, 3);
        assert_eq!(summary.win_rate, Decimal::new(3333, 2));
        assert_eq!(summary.loss_rate, Decimal::new(6667, 2));
    }

    #[test]
    fn velocity_truncates_to_whole_days_and_skips_empty_stages() {
        let created = at(2025, 5, 1);
        let mut quick = deal(DealStage::Qualified, 10, created);
        quick.updated_at = created + Duration::hours(36);
        let mut slow = deal(DealStage::Qualified, 10, created);
        slow.updated_at = created + Duration::hours(60);

        let velocity = pipeline_velocity(&[quick, slow]);
        assert_eq!(velocity.len(), 1);
        assert_eq!(velocity[0].stage, DealStage::Qualified);
        // média de 48h
        assert_eq!(velocity[0].avg_days, 2);
        assert_eq!(velocity[0].deal_count, 2);
    }

    #[test]
    fn deal_size_ignores_zero_values() {
        let now = at(2025, 5, 1);
        let deals = vec![
            deal(DealStage::Lead, 0, now),
            deal(DealStage::Lead, 100, now),
            deal(DealStage::Proposal, 300, now),
        ];
        let size = deal_size(&deals);
        assert_eq!(size.avg_deal_size, Decimal::from(200));
        assert_eq!(size.max_deal_size, Decimal::from(300));
        assert_eq!(size.min_deal_size, Decimal::from(100));
        assert_eq!(deal_size(&[]), DealSizeSummary::default());
    }
}
