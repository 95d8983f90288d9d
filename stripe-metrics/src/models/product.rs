use serde::Serialize;

/// Normalized monthly revenue attributed to one product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProductRevenue {
    /// Product id, or the price id when the price has no product.
    pub product_id: String,
    pub product_name: String,
    /// Monthly revenue in smallest currency unit.
    pub revenue: i64,
    /// Number of subscription line items contributing.
    pub subscription_count: i64,
}
