use common::{Money, ProductId, Quantity};
use order_store::{OrderLine, Product};
use serde::{Deserialize, Serialize};

use crate::pricing::effective_price;

/// A product in the cart with the catalog values last seen for it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartLine {
    pub product: Product,
    pub quantity: Quantity,
}

impl CartLine {
    /// Returns the product id.
    pub fn product_id(&self) -> ProductId {
        self.product.id
    }

    /// Unit price for this line's quantity under the scarcity rule.
    pub fn unit_price(&self) -> Money {
        effective_price(&self.product, self.quantity)
    }

    /// Returns the line total.
    pub fn line_total(&self) -> Money {
        self.unit_price().times_quantity(self.quantity)
    }

    /// Compares the line quantity with the stock last seen for the product.
    pub fn stock_advisory(&self) -> StockAdvisory {
        if self.quantity > self.product.stock {
            StockAdvisory::ExceedsAvailable {
                requested: self.quantity,
                available: self.product.stock,
            }
        } else {
            StockAdvisory::WithinStock
        }
    }

    /// Freezes the line into an order line.
    pub fn to_order_line(&self) -> OrderLine {
        OrderLine {
            product_id: self.product.id,
            product_name: self.product.name.clone(),
            quantity: self.quantity,
            unit_price: self.unit_price(),
        }
    }
}

/// Add-time stock hint. Never blocks; checkout decides.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum StockAdvisory {
    WithinStock,
    /// The cart holds more than the catalog last reported in stock.
    ExceedsAvailable {
        requested: Quantity,
        available: Quantity,
    },
}

impl StockAdvisory {
    /// Returns true if the caller should warn the customer.
    pub fn is_warning(&self) -> bool {
        matches!(self, StockAdvisory::ExceedsAvailable { .. })
    }
}

/// What changed after adding to or editing a line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddLineOutcome {
    pub product_id: ProductId,
    /// Quantity on the line after the change.
    pub quantity: Quantity,
    /// Effective unit price for that quantity.
    pub unit_price: Money,
    pub advisory: StockAdvisory,
}

impl AddLineOutcome {
    pub(crate) fn for_line(line: &CartLine) -> Self {
        Self {
            product_id: line.product_id(),
            quantity: line.quantity,
            unit_price: line.unit_price(),
            advisory: line.stock_advisory(),
        }
    }
}
