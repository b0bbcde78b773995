//! System-wide order listing for operators.

use chrono::{DateTime, Utc};
use common::OrderStatus;
use order_store::{Order, OrderQuery, OrderStore};
use serde::Deserialize;

use crate::read_model::ReadModel;

/// Default page size when none is requested.
pub const DEFAULT_PAGE_SIZE: usize = 50;

/// Filter for the status listing. Empty `statuses` means every status.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StatusFilter {
    #[serde(default)]
    pub statuses: Vec<OrderStatus>,
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
    pub limit: Option<usize>,
    pub offset: Option<usize>,
}

impl StatusFilter {
    fn to_query(&self) -> OrderQuery {
        let mut query = OrderQuery::new()
            .limit(self.limit.unwrap_or(DEFAULT_PAGE_SIZE))
            .offset(self.offset.unwrap_or(0));
        if !self.statuses.is_empty() {
            query = query.statuses(self.statuses.clone());
        }
        if let Some(from) = self.from {
            query = query.created_from(from);
        }
        if let Some(to) = self.to {
            query = query.created_to(to);
        }
        query
    }
}

/// Orders across all customers, filtered by status and creation date.
#[derive(Clone)]
pub struct StatusListingView<S> {
    store: S,
}

impl<S: OrderStore> StatusListingView<S> {
    /// Creates a new view over the given store.
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Lists one page of matching orders, oldest first.
    #[tracing::instrument(skip(self))]
    pub async fn list(&self, filter: &StatusFilter) -> Vec<Order> {
        self.or_default(self.store.query_orders(filter.to_query()).await)
    }
}

impl<S: OrderStore> ReadModel for StatusListingView<S> {
    fn name(&self) -> &'static str {
        "StatusListingView"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_filter_pages_everything() {
        let query = StatusFilter::default().to_query();
        assert!(query.statuses.is_none());
        assert_eq!(query.limit, Some(DEFAULT_PAGE_SIZE));
        assert_eq!(query.offset, Some(0));
    }

    #[test]
    fn filter_carries_statuses_and_range() {
        let from = Utc::now();
        let filter = StatusFilter {
            statuses: vec![OrderStatus::Delivered],
            from: Some(from),
            to: None,
            limit: Some(10),
            offset: Some(20),
        };
        let query = filter.to_query();
        assert_eq!(query.statuses, Some(vec![OrderStatus::Delivered]));
        assert_eq!(query.created_from, Some(from));
        assert_eq!(query.limit, Some(10));
        assert_eq!(query.offset, Some(20));
    }

    #[test]
    fn filter_deserializes_from_json() {
        let filter: StatusFilter =
            serde_json::from_str(r#"{"statuses":["Pending","Selected"],"limit":5}"#).unwrap();
        assert_eq!(filter.statuses, vec![OrderStatus::Pending, OrderStatus::Selected]);
        assert_eq!(filter.limit, Some(5));
    }
}
