//! Per-customer cart sessions.

use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::sync::{Arc, Mutex, PoisonError};

use common::CustomerId;
use domain::{Cart, CheckoutPolicy};

/// Holds one cart per customer for the lifetime of their session.
///
/// Carts are created on first use and dropped on checkout, clear or logout.
#[derive(Debug, Clone)]
pub struct CartSessions {
    carts: Arc<Mutex<HashMap<CustomerId, Cart>>>,
    policy: CheckoutPolicy,
}

impl CartSessions {
    /// Creates an empty session map whose carts price with `policy`.
    pub fn new(policy: CheckoutPolicy) -> Self {
        Self {
            carts: Arc::new(Mutex::new(HashMap::new())),
            policy,
        }
    }

    /// Runs `f` against the customer's cart, creating it if needed.
    pub fn with_cart<T>(&self, customer: CustomerId, f: impl FnOnce(&mut Cart) -> T) -> T {
        let mut carts = self.carts.lock().unwrap_or_else(PoisonError::into_inner);
        let cart = carts
            .entry(customer)
            .or_insert_with(|| Cart::with_policy(customer, self.policy));
        f(cart)
    }

    /// Runs `f` against the customer's cart if one is open.
    pub fn with_existing_cart<T>(
        &self,
        customer: CustomerId,
        f: impl FnOnce(&mut Cart) -> T,
    ) -> Option<T> {
        let mut carts = self.carts.lock().unwrap_or_else(PoisonError::into_inner);
        carts.get_mut(&customer).map(f)
    }

    /// Takes the customer's cart out of the session, so that no other
    /// checkout can see it until it is restored.
    pub fn take(&self, customer: CustomerId) -> Option<Cart> {
        self.remove(customer)
    }

    /// Puts a taken cart back unless the customer opened a new one meanwhile.
    ///
    /// Returns false if a newer cart was kept instead.
    pub fn restore(&self, cart: Cart) -> bool {
        let mut carts = self.carts.lock().unwrap_or_else(PoisonError::into_inner);
        match carts.entry(cart.customer_id()) {
            Entry::Vacant(slot) => {
                slot.insert(cart);
                true
            }
            Entry::Occupied(_) => false,
        }
    }

    /// Returns a copy of the customer's cart.
    pub fn get(&self, customer: CustomerId) -> Option<Cart> {
        self.carts
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&customer)
            .cloned()
    }

    /// Drops the customer's cart (logout, checkout).
    pub fn remove(&self, customer: CustomerId) -> Option<Cart> {
        self.carts
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&customer)
    }

    /// Number of live carts.
    pub fn len(&self) -> usize {
        self.carts
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn policy(&self) -> &CheckoutPolicy {
        &self.policy
    }
}

impl Default for CartSessions {
    fn default() -> Self {
        Self::new(CheckoutPolicy::default())
    }
}
