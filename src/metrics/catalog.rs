// src/metrics/catalog.rs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use crate::models::{dashboard::ProductStats, figures::ProductFigure, inventory::ProductStatus};

/// Resumo do catálogo. `recent_since` marca a partir de quando um produto
/// conta como recente.
pub fn product_stats(
    products: &[ProductFigure],
    total_categories: i64,
    recent_since: DateTime<Utc>,
) -> ProductStats {
    ProductStats {
        total_products: products.len(),
        active_products: products
            .iter()
            .filter(|p| p.status == ProductStatus::Active)
            .count(),
        out_of_stock: products.iter().filter(|p| p.quantity == 0).count(),
        low_stock: products
            .iter()
            .filter(|p| p.quantity <= p.min_quantity)
            .count(),
        total_inventory_value: products
            .iter()
            .map(|p| Decimal::from(p.quantity) * p.cost_price)
            .sum(),
        total_categories,
        recent_products: products
            .iter()
            .filter(|p| p.created_at >= recent_since)
            .count(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn product(status: ProductStatus, quantity: i32, min_quantity: i32, cost: i64) -> ProductFigure {
        ProductFigure {
            status,
            quantity,
            min_quantity,
            cost_price: Decimal::from(cost),
            created_at: Utc::now() - Duration::days(90),
        }
    }

    #[test]
    fn inventory_value_is_quantity_times_cost() {
        let products = vec![
            product(ProductStatus::Active, 3, 1, 100),
            product(ProductStatus::Active, 0, 2, 500),
            product(ProductStatus::Discontinued, 2, 2, 40),
        ];
        let stats = product_stats(&products, 4, Utc::now() - Duration::days(30));

        assert_eq!(stats.total_products, 3);
        assert_eq!(stats.active_products, 2);
        assert_eq!(stats.out_of_stock, 1);
        assert_eq!(stats.low_stock, 2);
        assert_eq!(stats.total_inventory_value, Decimal::from(380));
        assert_eq!(stats.total_categories, 4);
        assert_eq!(stats.recent_products, 0);
    }

    #[test]
    fn empty_catalog_is_all_zero() {
        let stats = product_stats(&[], 0, Utc::now());
        assert_eq!(stats, ProductStats::default());
    }
}
