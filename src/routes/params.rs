use serde::Deserialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::models::OrderStatus;

pub const DEFAULT_PER_PAGE: i64 = 20;
pub const PRODUCTS_PER_PAGE: i64 = 10;
pub const MAX_PER_PAGE: i64 = 100;
/// Keeps `(page - 1) * per_page` far from overflowing.
pub const MAX_PAGE: i64 = 1_000_000;

#[derive(Debug, Clone, Copy, Default, Deserialize, ToSchema)]
pub struct Pagination {
    pub page: Option<i64>,
    pub per_page: Option<i64>,
}

impl Pagination {
    pub fn new(page: i64, per_page: i64) -> Self {
        Self {
            page: Some(page),
            per_page: Some(per_page),
        }
    }

    /// Returns `(page, per_page, offset)`.
    pub fn normalize(&self) -> (i64, i64, i64) {
        self.normalize_with(DEFAULT_PER_PAGE)
    }

    pub fn normalize_with(&self, default_per_page: i64) -> (i64, i64, i64) {
        let page = self.page.unwrap_or(1).clamp(1, MAX_PAGE);
        let per_page = self.per_page.unwrap_or(default_per_page).clamp(1, MAX_PER_PAGE);
        let offset = (page - 1) * per_page;
        (page, per_page, offset)
    }
}

#[derive(Debug, Clone, Copy, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
    Asc,
    Desc,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, ToSchema)]
pub enum ProductOrdering {
    #[serde(rename = "name")]
    NameAsc,
    #[serde(rename = "-name")]
    NameDesc,
    #[serde(rename = "unit_price")]
    PriceAsc,
    #[serde(rename = "-unit_price")]
    PriceDesc,
}

/// Stock buckets for filtering product lists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum InventoryFilter {
    /// Fewer than 3 in stock.
    Low,
    /// 3 to 15 inclusive.
    Medium,
    /// 17 or more.
    High,
}

impl InventoryFilter {
    /// Inclusive `(min, max)` inventory for the bucket.
    pub fn bounds(self) -> (Option<i32>, Option<i32>) {
        match self {
            InventoryFilter::Low => (None, Some(2)),
            InventoryFilter::Medium => (Some(3), Some(15)),
            InventoryFilter::High => (Some(17), None),
        }
    }
}

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct ProductQuery {
    pub page: Option<i64>,
    pub per_page: Option<i64>,
    /// Case-insensitive match anywhere in the name.
    pub search: Option<String>,
    pub name_startswith: Option<String>,
    pub inventory_lt: Option<i32>,
    pub inventory_gt: Option<i32>,
    pub category_id: Option<Uuid>,
    pub inventory: Option<InventoryFilter>,
    pub ordering: Option<ProductOrdering>,
}

impl ProductQuery {
    pub fn pagination(&self) -> Pagination {
        Pagination {
            page: self.page,
            per_page: self.per_page,
        }
    }
}

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct OrderListQuery {
    pub page: Option<i64>,
    pub per_page: Option<i64>,
    pub status: Option<OrderStatus>,
    pub sort_order: Option<SortOrder>,
}

impl OrderListQuery {
    pub fn pagination(&self) -> Pagination {
        Pagination {
            page: self.page,
            per_page: self.per_page,
        }
    }
}

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct LowStockQuery {
    pub page: Option<i64>,
    pub per_page: Option<i64>,
    /// Products with inventory strictly below this value, default 3.
    pub threshold: Option<i32>,
}

impl LowStockQuery {
    pub fn pagination(&self) -> Pagination {
        Pagination {
            page: self.page,
            per_page: self.per_page,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pagination_defaults_and_clamps() {
        assert_eq!(Pagination::default().normalize(), (1, 20, 0));
        assert_eq!(Pagination::new(3, 10).normalize(), (3, 10, 20));
        assert_eq!(Pagination::new(0, 1000).normalize(), (1, 100, 0));
        assert_eq!(Pagination::default().normalize_with(PRODUCTS_PER_PAGE), (1, 10, 0));
    }

    #[test]
    fn huge_pages_are_capped_instead_of_overflowing() {
        let (page, per_page, offset) = Pagination::new(i64::MAX, 100).normalize();
        assert_eq!(page, MAX_PAGE);
        assert_eq!(per_page, 100);
        assert_eq!(offset, (MAX_PAGE - 1) * 100);

        let query = OrderListQuery {
            page: Some(i64::MAX / 50),
            per_page: Some(100),
            ..Default::default()
        };
        assert!(query.pagination().normalize().2 >= 0);
        assert_eq!(Pagination::new(i64::MIN, i64::MIN).normalize(), (1, 1, 0));
    }

    #[test]
    fn inventory_filter_buckets() {
        let query: ProductQuery = serde_json::from_str(r#"{"inventory": "medium"}"#).unwrap();
        assert_eq!(query.inventory, Some(InventoryFilter::Medium));
        assert_eq!(InventoryFilter::Low.bounds(), (None, Some(2)));
        assert_eq!(InventoryFilter::Medium.bounds(), (Some(3), Some(15)));
        assert_eq!(InventoryFilter::High.bounds(), (Some(17), None));
    }

    #[test]
    fn product_ordering_uses_signed_field_names() {
        let query: ProductQuery =
            serde_json::from_str(r#"{"ordering": "-unit_price", "inventory_lt": 5}"#).unwrap();
        assert_eq!(query.ordering, Some(ProductOrdering::PriceDesc));
        assert_eq!(query.inventory_lt, Some(5));
    }
}
