use chrono::{DateTime, Utc};
use common::{CarrierId, CustomerId, OrderStatus};

/// Builder for constructing order queries.
///
/// Every filter is optional; an empty query matches every order. Results are
/// ordered by creation time (then id), oldest first unless `newest_first` is set.
#[derive(Debug, Clone, Default)]
pub struct OrderQuery {
    /// Filter by owning customer.
    pub customer_id: Option<CustomerId>,

    /// Filter by assigned carrier.
    pub carrier_id: Option<CarrierId>,

    /// Filter by status (any of these).
    pub statuses: Option<Vec<OrderStatus>>,

    /// Only orders with no carrier assigned.
    pub unclaimed_only: bool,

    /// Filter by orders created at or after this timestamp.
    pub created_from: Option<DateTime<Utc>>,

    /// Filter by orders created at or before this timestamp.
    pub created_to: Option<DateTime<Utc>>,

    /// Reverse the default ordering.
    pub newest_first: bool,

    /// Maximum number of orders to return.
    pub limit: Option<usize>,

    /// Number of orders to skip.
    pub offset: Option<usize>,
}

impl OrderQuery {
    /// Creates a new empty query.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a query for one customer's orders.
    pub fn for_customer(customer_id: CustomerId) -> Self {
        Self {
            customer_id: Some(customer_id),
            ..Default::default()
        }
    }

    /// Creates a query for one carrier's orders.
    pub fn for_carrier(carrier_id: CarrierId) -> Self {
        Self {
            carrier_id: Some(carrier_id),
            ..Default::default()
        }
    }

    /// Filters by customer.
    pub fn customer(mut self, customer_id: CustomerId) -> Self {
        self.customer_id = Some(customer_id);
        self
    }

    /// Filters by carrier.
    pub fn carrier(mut self, carrier_id: CarrierId) -> Self {
        self.carrier_id = Some(carrier_id);
        self
    }

    /// Filters by a single status.
    pub fn status(mut self, status: OrderStatus) -> Self {
        self.statuses = Some(vec![status]);
        self
    }

    /// Filters by multiple statuses (any of these).
    pub fn statuses(mut self, statuses: Vec<OrderStatus>) -> Self {
        self.statuses = Some(statuses);
        self
    }

    /// Restricts to orders no carrier holds.
    pub fn unclaimed(mut self) -> Self {
        self.unclaimed_only = true;
        self
    }

    /// Filters to orders created at or after this timestamp.
    pub fn created_from(mut self, timestamp: DateTime<Utc>) -> Self {
        self.created_from = Some(timestamp);
        self
    }

    /// Filters to orders created at or before this timestamp.
    pub fn created_to(mut self, timestamp: DateTime<Utc>) -> Self {
        self.created_to = Some(timestamp);
        self
    }

    /// Returns the most recent orders first.
    pub fn newest_first(mut self) -> Self {
        self.newest_first = true;
        self
    }

    /// Limits the number of orders returned.
    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Skips this many orders before returning results.
    pub fn offset(mut self, offset: usize) -> Self {
        self.offset = Some(offset);
        self
    }

    /// Returns true if an empty status set was requested, which matches nothing.
    pub(crate) fn matches_nothing(&self) -> bool {
        matches!(self.statuses, Some(ref statuses) if statuses.is_empty())
    }
}
