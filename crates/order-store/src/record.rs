//! Rows owned by the store: products, orders and their lines.

use chrono::{DateTime, Utc};
use common::{CarrierId, CustomerId, Money, OrderId, OrderStatus, ProductCategory, ProductId, Quantity};
use serde::{Deserialize, Serialize};

/// A catalog product together with its live stock level.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub category: ProductCategory,
    /// Price per whole unit (kilogram or piece) before scarcity pricing.
    pub base_price: Money,
    pub stock: Quantity,
    /// Once projected stock falls to or below this level the price doubles.
    pub restock_threshold: Quantity,
}

/// Fields of a product that has not been stored yet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewProduct {
    pub name: String,
    pub category: ProductCategory,
    pub base_price: Money,
    pub stock: Quantity,
    pub restock_threshold: Quantity,
}

impl NewProduct {
    pub(crate) fn validate(&self) -> Result<(), String> {
        if self.name.trim().is_empty() {
            return Err("product name must not be empty".to_string());
        }
        if !self.base_price.is_positive() {
            return Err(format!("base price must be positive, got {}", self.base_price));
        }
        if self.stock.milli() < 0 {
            return Err(format!("stock must not be negative, got {}", self.stock));
        }
        if !self.restock_threshold.is_positive() {
            return Err(format!(
                "restock threshold must be positive, got {}",
                self.restock_threshold
            ));
        }
        Ok(())
    }

    pub(crate) fn into_product(self, id: ProductId) -> Product {
        Product {
            id,
            name: self.name,
            category: self.category,
            base_price: self.base_price,
            stock: self.stock,
            restock_threshold: self.restock_threshold,
        }
    }
}

/// One line of a placed order. The unit price is frozen at checkout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderLine {
    pub product_id: ProductId,
    pub product_name: String,
    pub quantity: Quantity,
    pub unit_price: Money,
}

impl OrderLine {
    /// Returns the line total (unit price times quantity).
    pub fn line_total(&self) -> Money {
        self.unit_price.times_quantity(self.quantity)
    }
}

/// An order ready to be committed. The store assigns the id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewOrder {
    pub customer_id: CustomerId,
    pub lines: Vec<OrderLine>,
    pub subtotal: Money,
    pub coupon_code: Option<String>,
    pub coupon_discount: Money,
    pub loyalty_discount: Money,
    pub vat: Money,
    pub total: Money,
    pub delivery_date: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

impl NewOrder {
    pub(crate) fn into_order(self, id: OrderId) -> Order {
        Order {
            id,
            customer_id: self.customer_id,
            carrier_id: None,
            lines: self.lines,
            subtotal: self.subtotal,
            coupon_code: self.coupon_code,
            coupon_discount: self.coupon_discount,
            loyalty_discount: self.loyalty_discount,
            vat: self.vat,
            total: self.total,
            created_at: self.created_at,
            delivery_date: self.delivery_date,
            status: OrderStatus::Pending,
            carrier_rating: None,
        }
    }
}

/// A persisted order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    pub customer_id: CustomerId,
    /// Set while the order is `Selected` and kept once `Delivered`.
    pub carrier_id: Option<CarrierId>,
    pub lines: Vec<OrderLine>,
    pub subtotal: Money,
    pub coupon_code: Option<String>,
    pub coupon_discount: Money,
    pub loyalty_discount: Money,
    pub vat: Money,
    pub total: Money,
    pub created_at: DateTime<Utc>,
    /// Requested slot while open, actual hand-over time once delivered.
    pub delivery_date: DateTime<Utc>,
    pub status: OrderStatus,
    pub carrier_rating: Option<u8>,
}

/// Result of an atomic checkout commit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommitOutcome {
    /// The order row, its lines and every stock decrement were persisted.
    Committed(OrderId),
    /// Nothing was persisted; this product could not cover its line.
    InsufficientStock(ProductId),
}

/// Aggregate rating of a carrier across rated deliveries.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CarrierRating {
    /// The carrier has no rated deliveries yet.
    #[default]
    Unrated,
    Rated { average: f64, count: u64 },
}

impl CarrierRating {
    /// Builds a rating from a sum of scores and their count.
    pub fn from_scores(sum: u64, count: u64) -> Self {
        if count == 0 {
            CarrierRating::Unrated
        } else {
            CarrierRating::Rated {
                average: sum as f64 / count as f64,
                count,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn apples() -> NewProduct {
        NewProduct {
            name: "Apple".to_string(),
            category: ProductCategory::Fruit,
            base_price: Money::from_units(10),
            stock: Quantity::from_units(100),
            restock_threshold: Quantity::from_units(5),
        }
    }

    #[test]
    fn new_product_validation() {
        assert!(apples().validate().is_ok());

        let mut blank = apples();
        blank.name = "  ".to_string();
        assert!(blank.validate().is_err());

        let mut negative = apples();
        negative.stock = Quantity::from_milli(-1);
        assert!(negative.validate().is_err());

        let mut free = apples();
        free.base_price = Money::zero();
        assert!(free.validate().is_err());

        let mut no_threshold = apples();
        no_threshold.restock_threshold = Quantity::zero();
        assert!(no_threshold.validate().is_err());

        let mut sold_out = apples();
        sold_out.stock = Quantity::zero();
        assert!(sold_out.validate().is_ok());
    }

    #[test]
    fn line_total_uses_fractional_quantity() {
        let line = OrderLine {
            product_id: ProductId::new(1),
            product_name: "Tomato".to_string(),
            quantity: Quantity::from_milli(1_500),
            unit_price: Money::from_units(12),
        };
        assert_eq!(line.line_total(), Money::from_units(18));
    }

    #[test]
    fn rating_from_scores() {
        assert_eq!(CarrierRating::from_scores(0, 0), CarrierRating::Unrated);
        assert_eq!(
            CarrierRating::from_scores(9, 2),
            CarrierRating::Rated {
                average: 4.5,
                count: 2
            }
        );
    }
}
