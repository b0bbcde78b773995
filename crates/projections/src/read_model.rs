//! Read model trait for query-side views.

use order_store::StoreError;

/// A read-only view over persisted orders.
///
/// Reads have no side effects, so a failed read degrades to an empty answer
/// instead of failing the caller.
pub trait ReadModel: Send + Sync {
    /// Returns the name of this read model.
    fn name(&self) -> &'static str;

    /// Unwraps a store result, logging the failure and returning the default.
    fn or_default<T: Default>(&self, result: Result<T, StoreError>) -> T
    where
        Self: Sized,
    {
        match result {
            Ok(value) => value,
            Err(error) => {
                tracing::warn!(view = self.name(), %error, "read model query failed");
                metrics::counter!("projection_query_failures_total", "view" => self.name())
                    .increment(1);
                T::default()
            }
        }
    }
}
