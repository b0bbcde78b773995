//! Scarcity pricing.

use common::{Money, Quantity};
use order_store::Product;

/// Factor applied to the base price once stock runs low.
pub const SURCHARGE_FACTOR: i64 = 2;

/// Stock left once `projected` has been taken out of the product's current stock.
///
/// Negative when the projection over-commits the product.
pub fn remaining_after(product: &Product, projected: Quantity) -> Quantity {
    product.stock - projected
}

/// Returns true if taking `projected` leaves stock at or below the restock threshold.
pub fn is_scarce(product: &Product, projected: Quantity) -> bool {
    remaining_after(product, projected) <= product.restock_threshold
}

/// Unit price of a product given the quantity a customer is about to take.
///
/// While browsing, `projected` is what the customer already holds in the cart
/// for this product; at checkout it is the line quantity being frozen.
pub fn effective_price(product: &Product, projected: Quantity) -> Money {
    if is_scarce(product, projected) {
        product.base_price.multiply(SURCHARGE_FACTOR)
    } else {
        product.base_price
    }
}
