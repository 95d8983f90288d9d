//! Product revenue grouper.

use super::normalizer::monthly_contribution;
use crate::models::{LineItem, ProductRevenue, SubscriptionRecord};
use std::collections::HashMap;

/// Grouping key: product id, falling back to the price id.
fn group_key(item: &LineItem) -> &str {
    item.product_id.as_deref().unwrap_or(&item.price_id)
}

/// Display name: price nickname, then product name, then product id, then
/// price id.
fn display_name(item: &LineItem) -> String {
    item.nickname
        .as_ref()
        .or(item.product_name.as_ref())
        .or(item.product_id.as_ref())
        .unwrap_or(&item.price_id)
        .clone()
}

/// Group every line item of the active subscriptions by product and sum
/// each item's monthly contribution.
///
/// The result is unordered; callers that present it must sort.
pub fn group_by_product(active: &[SubscriptionRecord]) -> Vec<ProductRevenue> {
    let mut products: HashMap<String, ProductRevenue> = HashMap::new();

    for item in active.iter().flat_map(|sub| sub.items.iter()) {
        let contribution = monthly_contribution(item);
        products
            .entry(group_key(item).to_string())
            .and_modify(|product| {
                product.revenue += contribution;
                product.subscription_count += 1;
            })
            .or_insert_with(|| ProductRevenue {
                product_id: group_key(item).to_string(),
                product_name: display_name(item),
                revenue: contribution,
                subscription_count: 1,
            });
    }

    products.into_values().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{BillingInterval, SubscriptionStatus};
    use chrono::Utc;

    fn item(price: &str, product: Option<&str>, nickname: Option<&str>, amount: i64) -> LineItem {
        LineItem {
            price_id: price.to_string(),
            nickname: nickname.map(str::to_string),
            product_id: product.map(str::to_string),
            product_name: None,
            unit_amount: amount,
            quantity: 1,
            interval: Some(BillingInterval::Month),
        }
    }

    fn sub(id: &str, items: Vec<LineItem>) -> SubscriptionRecord {
        SubscriptionRecord {
            id: id.to_string(),
            status: SubscriptionStatus::Active,
            customer_id: "cus_1".to_string(),
            currency: "usd".to_string(),
            created: Utc::now(),
            canceled_at: None,
            items,
        }
    }

    fn find<'a>(products: &'a [ProductRevenue], id: &str) -> &'a ProductRevenue {
        products
            .iter()
            .find(|p| p.product_id == id)
            .unwrap_or_else(|| panic!("missing product {}", id))
    }

    #[test]
    fn shared_product_accumulates() {
        let subs = vec![
            sub("sub_1", vec![item("price_a", Some("prod_pro"), Some("Pro"), 1000)]),
            sub("sub_2", vec![item("price_b", Some("prod_pro"), None, 2500)]),
        ];

        let products = group_by_product(&subs);

        assert_eq!(products.len(), 1);
        let pro = find(&products, "prod_pro");
        assert_eq!(pro.revenue, 3500);
        assert_eq!(pro.subscription_count, 2);
        assert_eq!(pro.product_name, "Pro");
    }

    #[test]
    fn missing_product_falls_back_to_price() {
        let subs = vec![sub(
            "sub_1",
            vec![
                item("price_orphan", None, None, 800),
                item("price_x", Some("prod_x"), None, 200),
            ],
        )];

        let products = group_by_product(&subs);

        assert_eq!(products.len(), 2);
        let orphan = find(&products, "price_orphan");
        assert_eq!(orphan.product_name, "price_orphan");
        assert_eq!(orphan.revenue, 800);
        assert_eq!(find(&products, "prod_x").product_name, "prod_x");
    }

    #[test]
    fn each_item_contributes_its_own_revenue() {
        let mut yearly = item("price_y", Some("prod_y"), None, 12_000);
        yearly.interval = Some(BillingInterval::Year);
        let subs = vec![sub(
            "sub_1",
            vec![item("price_m", Some("prod_m"), None, 1000), yearly],
        )];

        let products = group_by_product(&subs);

        assert_eq!(find(&products, "prod_m").revenue, 1000);
        assert_eq!(find(&products, "prod_y").revenue, 1000);
    }

    #[test]
    fn product_name_preferred_over_id() {
        let mut named = item("price_n", Some("prod_n"), None, 100);
        named.product_name = Some("Starter".to_string());
        let products = group_by_product(&[sub("sub_1", vec![named])]);
        assert_eq!(products[0].product_name, "Starter");
    }

    #[test]
    fn no_subscriptions_no_products() {
        assert!(group_by_product(&[]).is_empty());
    }
}
