// src/metrics/sales.rs

use std::collections::{BTreeMap, HashMap};

use chrono::NaiveDate;
use rust_decimal::Decimal;

use super::{Calendar, DateWindow, mean, percentage};
use crate::models::{
    dashboard::{
        CategoryRevenue, DailyRevenue, ProductRevenue, RevenueGroup, RevenueOverview, SalesSummary,
    },
    figures::{SaleFigure, SaleLineFigure},
};

const TOP_CATEGORIES: usize = 5;

fn revenue_sales<'a>(
    sales: impl IntoIterator<Item = &'a SaleFigure>,
) -> impl Iterator<Item = &'a SaleFigure> {
    sales.into_iter().filter(|s| s.status.counts_as_revenue())
}

/// Soma de `total_amount` das vendas que contam como receita.
pub fn revenue_total<'a>(sales: impl IntoIterator<Item = &'a SaleFigure>) -> Decimal {
    revenue_sales(sales).map(|s| s.total_amount).sum()
}

/// Ticket médio das vendas que contam como receita.
pub fn average_order_value<'a>(sales: impl IntoIterator<Item = &'a SaleFigure>) -> Decimal {
    let (total, count) = revenue_sales(sales)
        .fold((Decimal::ZERO, 0usize), |(total, count), sale| {
            (total + sale.total_amount, count + 1)
        });
    mean(total, count)
}

/// Crescimento percentual sobre o mês anterior; zero se não houve receita.
pub fn revenue_growth(current: Decimal, last: Decimal) -> Decimal {
    if last <= Decimal::ZERO {
        return Decimal::ZERO;
    }
    percentage(current - last, last)
}

pub fn sales_summary(sales: &[SaleFigure], calendar: &Calendar) -> SalesSummary {
    let monthly: Vec<&SaleFigure> = sales
        .iter()
        .filter(|s| calendar.in_current_month(s.created_at.date_naive()))
        .collect();

    SalesSummary {
        total_sales: sales.len(),
        monthly_sales: monthly.len(),
        total_revenue: revenue_total(sales),
        monthly_revenue: revenue_total(monthly.iter().copied()),
        avg_order_value: average_order_value(sales),
    }
}

pub fn revenue_overview(
    sales: &[SaleFigure],
    lines: &[SaleLineFigure],
    calendar: &Calendar,
) -> RevenueOverview {
    let current_month = revenue_total(
        sales
            .iter()
            .filter(|s| calendar.in_current_month(s.created_at.date_naive())),
    );
    let last_month = revenue_total(
        sales
            .iter()
            .filter(|s| calendar.in_last_month(s.created_at.date_naive())),
    );

    let mut by_category: HashMap<Option<&str>, Decimal> = HashMap::new();
    for line in lines.iter().filter(|l| {
        l.status.counts_as_revenue() && calendar.in_current_month(l.created_at.date_naive())
    }) {
        *by_category
            .entry(line.category_name.as_deref())
            .or_default() += line.total_price;
    }

    let mut top_categories: Vec<CategoryRevenue> = by_category
        .into_iter()
        .map(|(name, total)| CategoryRevenue {
            category_name: name.map(str::to_owned),
            total_revenue: total,
        })
        .collect();
    top_categories.sort_by(|a, b| {
        b.total_revenue
            .cmp(&a.total_revenue)
            .then_with(|| a.category_name.cmp(&b.category_name))
    });
    top_categories.truncate(TOP_CATEGORIES);

    RevenueOverview {
        current_month,
        last_month,
        growth_rate: revenue_growth(current_month, last_month),
        top_categories,
    }
}

/// Receita diária dentro da janela, em ordem de data.
pub fn revenue_trend(sales: &[SaleFigure], window: &DateWindow) -> Vec<DailyRevenue> {
    daily_totals(
        revenue_sales(sales).filter(|s| window.contains(s.created_at.date_naive())),
    )
}

/// Volume diário de pedidos (qualquer status) a partir de `since`.
pub fn order_trend(sales: &[SaleFigure], since: NaiveDate) -> Vec<DailyRevenue> {
    daily_totals(sales.iter().filter(|s| s.created_at.date_naive() >= since))
}

fn daily_totals<'a>(sales: impl Iterator<Item = &'a SaleFigure>) -> Vec<DailyRevenue> {
    let mut days: BTreeMap<NaiveDate, (Decimal, usize)> = BTreeMap::new();
    for sale in sales {
        let entry = days.entry(sale.created_at.date_naive()).or_default();
        entry.0 += sale.total_amount;
        entry.1 += 1;
    }
    days.into_iter()
        .map(|(date, (total, sale_count))| DailyRevenue {
            date,
            total,
            sale_count,
        })
        .collect()
}

pub fn revenue_by_rep(sales: &[SaleFigure], window: &DateWindow) -> Vec<RevenueGroup> {
    group_revenue(sales, window, |s| s.rep_name.as_deref())
}

pub fn revenue_by_store(sales: &[SaleFigure], window: &DateWindow) -> Vec<RevenueGroup> {
    group_revenue(sales, window, |s| s.store_name.as_deref())
}

fn group_revenue<'a>(
    sales: &'a [SaleFigure],
    window: &DateWindow,
    key: impl Fn(&'a SaleFigure) -> Option<&'a str>,
) -> Vec<RevenueGroup> {
    let mut groups: HashMap<Option<&str>, (Decimal, usize)> = HashMap::new();
    for sale in revenue_sales(sales).filter(|s| window.contains(s.created_at.date_naive())) {
        let entry = groups.entry(key(sale)).or_default();
        entry.0 += sale.total_amount;
        entry.1 += 1;
    }

    let mut groups: Vec<RevenueGroup> = groups
        .into_iter()
        .map(|(label, (total_revenue, sale_count))| RevenueGroup {
            label: label.map(str::to_owned),
            total_revenue,
            sale_count,
        })
        .collect();
    groups.sort_by(|a, b| {
        b.total_revenue
            .cmp(&a.total_revenue)
            .then_with(|| a.label.cmp(&b.label))
    });
    groups
}

pub fn revenue_by_product(lines: &[SaleLineFigure], window: &DateWindow) -> Vec<ProductRevenue> {
    let mut products: HashMap<&str, (Decimal, i64)> = HashMap::new();
    for line in lines.iter().filter(|l| {
        l.status.counts_as_revenue() && window.contains(l.created_at.date_naive())
    }) {
        let entry = products.entry(line.product_name.as_str()).or_default();
        entry.0 += line.total_price;
        entry.1 += i64::from(line.quantity);
    }

    let mut products: Vec<ProductRevenue> = products
        .into_iter()
        .map(|(name, (total_revenue, units_sold))| ProductRevenue {
            product_name: name.to_owned(),
            total_revenue,
            units_sold,
        })
        .collect();
    products.sort_by(|a, b| {
        b.total_revenue
            .cmp(&a.total_revenue)
            .then_with(|| a.product_name.cmp(&b.product_name))
    });
    products
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::sales::SaleStatus;
    use chrono::{DateTime, TimeZone, Utc};

    fn at(y: i32, m: u32, d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, 12, 0, 0).single().expect("valid time")
    }

    fn sale(status: SaleStatus, amount: i64, created_at: DateTime<Utc>) -> SaleFigure {
        SaleFigure {
            status,
            total_amount: Decimal::from(amount),
            created_at,
            rep_name: Some("Ana Lima".into()),
            store_name: None,
        }
    }

    #[test]
    fn pending_and_cancelled_sales_are_not_revenue() {
        let now = at(2025, 5, 10);
        let sales = vec![
            sale(SaleStatus::Confirmed, 100, now),
            sale(SaleStatus::Pending, 50, now),
            sale(SaleStatus::Cancelled, 30, now),
        ];

        assert_eq!(revenue_total(&sales), Decimal::from(100));
        assert_eq!(average_order_value(&sales), Decimal::from(100));
    }

    #[test]
    fn average_order_value_of_nothing_is_zero() {
        let sales = vec![sale(SaleStatus::Pending, 80, at(2025, 5, 1))];
        assert_eq!(average_order_value(&sales), Decimal::ZERO);
        assert_eq!(average_order_value(&Vec::<SaleFigure>::new()), Decimal::ZERO);
    }

    #[test]
    fn growth_is_zero_without_last_month_revenue() {
        assert_eq!(revenue_growth(Decimal::from(500), Decimal::ZERO), Decimal::ZERO);
        assert_eq!(
            revenue_growth(Decimal::from(150), Decimal::from(100)),
            Decimal::from(50)
        );
        assert_eq!(
            revenue_growth(Decimal::from(50), Decimal::from(200)),
            Decimal::from(-75)
        );
    }

    #[test]
    fn summary_splits_month_from_all_time() {
        let calendar = Calendar::new(NaiveDate::from_ymd_opt(2025, 5, 20).expect("date"));
        let sales = vec![
            sale(SaleStatus::Delivered, 200, at(2025, 5, 2)),
            sale(SaleStatus::Delivered, 100, at(2025, 4, 28)),
            sale(SaleStatus::Pending, 70, at(2025, 5, 3)),
        ];

        let summary = sales_summary(&sales, &calendar);
        assert_eq!(summary.total_sales, 3);
        assert_eq!(summary.monthly_sales, 2);
        assert_eq!(summary.total_revenue, Decimal::from(300));
        assert_eq!(summary.monthly_revenue, Decimal::from(200));
        assert_eq!(summary.avg_order_value, Decimal::from(150));
    }

    #[test]
    fn trend_groups_by_day_inside_the_window() {
        let window = DateWindow {
            start_date: NaiveDate::from_ymd_opt(2025, 5, 1).expect("date"),
            end_date: NaiveDate::from_ymd_opt(2025, 5, 31).expect("date"),
        };
        let sales = vec![
            sale(SaleStatus::Confirmed, 10, at(2025, 5, 2)),
            sale(SaleStatus::Shipped, 15, at(2025, 5, 2)),
            sale(SaleStatus::Confirmed, 99, at(2025, 6, 1)),
            sale(SaleStatus::Confirmed, 5, at(2025, 5, 1)),
        ];

        let trend = revenue_trend(&sales, &window);
        assert_eq!(trend.len(), 2);
        assert_eq!(trend[0].date, window.start_date);
        assert_eq!(trend[1].total, Decimal::from(25));
        assert_eq!(trend[1].sale_count, 2);
    }

    #[test]
    fn rep_groups_are_sorted_by_revenue() {
        let window = DateWindow::last_days(NaiveDate::from_ymd_opt(2025, 5, 31).expect("date"), 30);
        let mut bruno = sale(SaleStatus::Confirmed, 400, at(2025, 5, 20));
        bruno.rep_name = Some("Bruno Reis".into());
        let sales = vec![
            sale(SaleStatus::Confirmed, 100, at(2025, 5, 20)),
            sale(SaleStatus::Confirmed, 100, at(2025, 5, 21)),
            bruno,
        ];

        let groups = revenue_by_rep(&sales, &window);
        assert_eq!(groups[0].label.as_deref(), Some("Bruno Reis"));
        assert_eq!(groups[1].total_revenue, Decimal::from(200));
        assert_eq!(groups[1].sale_count, 2);
    }
}
