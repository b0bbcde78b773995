use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use common::{CarrierId, CustomerId, Money, OrderId, OrderStatus, ProductId, Quantity};
use sqlx::{PgPool, Row, postgres::PgRow};

use crate::{
    CarrierRating, CommitOutcome, NewOrder, NewProduct, Order, OrderLine, OrderQuery, Product,
    Result, StoreError,
    store::{OrderStore, validate_new_order, validate_rating},
};

const ORDER_COLUMNS: &str = "id, customer_id, carrier_id, subtotal_cents, coupon_code, \
     coupon_discount_cents, loyalty_discount_cents, vat_cents, total_cents, created_at, \
     delivery_date, status, carrier_rating";

const PRODUCT_COLUMNS: &str =
    "id, name, category, base_price_cents, stock_milli, restock_threshold_milli";

/// PostgreSQL-backed order store.
///
/// Checkout runs in one transaction with a conditional stock decrement per
/// line; order transitions are single guarded `UPDATE` statements whose
/// affected-row count decides the outcome.
#[derive(Clone)]
pub struct PostgresOrderStore {
    pool: PgPool,
}

impl PostgresOrderStore {
    /// Creates a new PostgreSQL order store.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Gets a reference to the underlying connection pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Runs the database migrations.
    pub async fn run_migrations(&self) -> Result<()> {
        sqlx::migrate!("../../migrations").run(&self.pool).await?;
        Ok(())
    }

    /// Overwrites a product's stock level. Used by restocking.
    pub async fn set_stock(&self, id: ProductId, stock: Quantity) -> Result<bool> {
        if stock.milli() < 0 {
            return Err(StoreError::InvalidProduct(format!(
                "stock must not be negative, got {stock}"
            )));
        }
        let affected = sqlx::query("UPDATE products SET stock_milli = $1 WHERE id = $2")
            .bind(stock.milli())
            .bind(id.get())
            .execute(&self.pool)
            .await?
            .rows_affected();
        Ok(affected == 1)
    }

    fn row_to_product(row: PgRow) -> Result<Product> {
        let category: String = row.try_get("category")?;
        Ok(Product {
            id: ProductId::new(row.try_get("id")?),
            name: row.try_get("name")?,
            category: category.parse()?,
            base_price: Money::from_cents(row.try_get("base_price_cents")?),
            stock: Quantity::from_milli(row.try_get("stock_milli")?),
            restock_threshold: Quantity::from_milli(row.try_get("restock_threshold_milli")?),
        })
    }

    fn row_to_order(row: &PgRow, lines: Vec<OrderLine>) -> Result<Order> {
        let status: String = row.try_get("status")?;
        let rating: Option<i16> = row.try_get("carrier_rating")?;
        Ok(Order {
            id: OrderId::new(row.try_get("id")?),
            customer_id: CustomerId::new(row.try_get("customer_id")?),
            carrier_id: row.try_get::<Option<i64>, _>("carrier_id")?.map(CarrierId::new),
            lines,
            subtotal: Money::from_cents(row.try_get("subtotal_cents")?),
            coupon_code: row.try_get("coupon_code")?,
            coupon_discount: Money::from_cents(row.try_get("coupon_discount_cents")?),
            loyalty_discount: Money::from_cents(row.try_get("loyalty_discount_cents")?),
            vat: Money::from_cents(row.try_get("vat_cents")?),
            total: Money::from_cents(row.try_get("total_cents")?),
            created_at: row.try_get::<DateTime<Utc>, _>("created_at")?,
            delivery_date: row.try_get::<DateTime<Utc>, _>("delivery_date")?,
            status: status.parse::<OrderStatus>()?,
            carrier_rating: rating.and_then(|r| u8::try_from(r).ok()),
        })
    }

    /// Loads the lines of the given orders, grouped by order id.
    async fn load_lines(&self, order_ids: &[i64]) -> Result<HashMap<i64, Vec<OrderLine>>> {
        let rows = sqlx::query(
            r#"
            SELECT order_id, product_id, product_name, quantity_milli, unit_price_cents
            FROM order_lines
            WHERE order_id = ANY($1)
            ORDER BY order_id ASC, line_no ASC
            "#,
        )
        .bind(order_ids)
        .fetch_all(&self.pool)
        .await?;

        let mut lines: HashMap<i64, Vec<OrderLine>> = HashMap::new();
        for row in rows {
            let order_id: i64 = row.try_get("order_id")?;
            lines.entry(order_id).or_default().push(OrderLine {
                product_id: ProductId::new(row.try_get("product_id")?),
                product_name: row.try_get("product_name")?,
                quantity: Quantity::from_milli(row.try_get("quantity_milli")?),
                unit_price: Money::from_cents(row.try_get("unit_price_cents")?),
            });
        }
        Ok(lines)
    }

    async fn rows_to_orders(&self, rows: Vec<PgRow>) -> Result<Vec<Order>> {
        let ids = rows
            .iter()
            .map(|row| row.try_get::<i64, _>("id"))
            .collect::<std::result::Result<Vec<_>, _>>()?;
        let mut lines = self.load_lines(&ids).await?;

        rows.iter()
            .zip(ids)
            .map(|(row, id)| Self::row_to_order(row, lines.remove(&id).unwrap_or_default()))
            .collect()
    }
}

#[async_trait]
impl OrderStore for PostgresOrderStore {
    async fn insert_product(&self, product: NewProduct) -> Result<Product> {
        product.validate().map_err(StoreError::InvalidProduct)?;

        let id: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO products (name, category, base_price_cents, stock_milli, restock_threshold_milli)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id
            "#,
        )
        .bind(&product.name)
        .bind(product.category.as_str())
        .bind(product.base_price.cents())
        .bind(product.stock.milli())
        .bind(product.restock_threshold.milli())
        .fetch_one(&self.pool)
        .await?;

        Ok(product.into_product(ProductId::new(id)))
    }

    async fn get_product(&self, id: ProductId) -> Result<Option<Product>> {
        let row: Option<PgRow> =
            sqlx::query(&format!("SELECT {PRODUCT_COLUMNS} FROM products WHERE id = $1"))
                .bind(id.get())
                .fetch_optional(&self.pool)
                .await?;

        row.map(Self::row_to_product).transpose()
    }

    async fn list_products(&self) -> Result<Vec<Product>> {
        let rows = sqlx::query(&format!("SELECT {PRODUCT_COLUMNS} FROM products ORDER BY id ASC"))
            .fetch_all(&self.pool)
            .await?;

        rows.into_iter().map(Self::row_to_product).collect()
    }

    async fn commit_order(&self, order: NewOrder) -> Result<CommitOutcome> {
        validate_new_order(&order)?;

        let mut tx = self.pool.begin().await?;

        let order_id: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO orders (customer_id, subtotal_cents, coupon_code, coupon_discount_cents,
                                loyalty_discount_cents, vat_cents, total_cents, created_at,
                                delivery_date, status)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            RETURNING id
            "#,
        )
        .bind(order.customer_id.get())
        .bind(order.subtotal.cents())
        .bind(&order.coupon_code)
        .bind(order.coupon_discount.cents())
        .bind(order.loyalty_discount.cents())
        .bind(order.vat.cents())
        .bind(order.total.cents())
        .bind(order.created_at)
        .bind(order.delivery_date)
        .bind(OrderStatus::Pending.as_str())
        .fetch_one(&mut *tx)
        .await?;

        for (line_no, line) in order.lines.iter().enumerate() {
            // Conditional decrement: a concurrent checkout that already took the
            // stock leaves zero matching rows
            let decremented = sqlx::query(
                "UPDATE products SET stock_milli = stock_milli - $1 WHERE id = $2 AND stock_milli >= $1",
            )
            .bind(line.quantity.milli())
            .bind(line.product_id.get())
            .execute(&mut *tx)
            .await?
            .rows_affected();

            if decremented == 0 {
                tx.rollback().await?;
                tracing::warn!(
                    product_id = %line.product_id,
                    quantity = %line.quantity,
                    "checkout rolled back: insufficient stock"
                );
                return Ok(CommitOutcome::InsufficientStock(line.product_id));
            }

            sqlx::query(
                r#"
                INSERT INTO order_lines (order_id, line_no, product_id, product_name, quantity_milli, unit_price_cents)
                VALUES ($1, $2, $3, $4, $5, $6)
                "#,
            )
            .bind(order_id)
            .bind(line_no as i32)
            .bind(line.product_id.get())
            .bind(&line.product_name)
            .bind(line.quantity.milli())
            .bind(line.unit_price.cents())
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        tracing::debug!(order_id, lines = order.lines.len(), "order row committed");
        Ok(CommitOutcome::Committed(OrderId::new(order_id)))
    }

    async fn get_order(&self, id: OrderId) -> Result<Option<Order>> {
        let rows = sqlx::query(&format!("SELECT {ORDER_COLUMNS} FROM orders WHERE id = $1"))
            .bind(id.get())
            .fetch_all(&self.pool)
            .await?;

        Ok(self.rows_to_orders(rows).await?.pop())
    }

    async fn query_orders(&self, query: OrderQuery) -> Result<Vec<Order>> {
        if query.matches_nothing() {
            return Ok(Vec::new());
        }

        let mut sql = format!("SELECT {ORDER_COLUMNS} FROM orders WHERE 1=1");
        let mut param_count = 0;

        // Build dynamic query
        if query.customer_id.is_some() {
            param_count += 1;
            sql.push_str(&format!(" AND customer_id = ${param_count}"));
        }
        if query.carrier_id.is_some() {
            param_count += 1;
            sql.push_str(&format!(" AND carrier_id = ${param_count}"));
        }
        if query.statuses.is_some() {
            param_count += 1;
            sql.push_str(&format!(" AND status = ANY(${param_count})"));
        }
        if query.unclaimed_only {
            sql.push_str(" AND carrier_id IS NULL");
        }
        if query.created_from.is_some() {
            param_count += 1;
            sql.push_str(&format!(" AND created_at >= ${param_count}"));
        }
        if query.created_to.is_some() {
            param_count += 1;
            sql.push_str(&format!(" AND created_at <= ${param_count}"));
        }

        if query.newest_first {
            sql.push_str(" ORDER BY created_at DESC, id DESC");
        } else {
            sql.push_str(" ORDER BY created_at ASC, id ASC");
        }

        if query.limit.is_some() {
            param_count += 1;
            sql.push_str(&format!(" LIMIT ${param_count}"));
        }
        if query.offset.is_some() {
            param_count += 1;
            sql.push_str(&format!(" OFFSET ${param_count}"));
        }

        // Bind in the same order the placeholders were numbered
        let mut sqlx_query = sqlx::query(&sql);

        if let Some(customer) = query.customer_id {
            sqlx_query = sqlx_query.bind(customer.get());
        }
        if let Some(carrier) = query.carrier_id {
            sqlx_query = sqlx_query.bind(carrier.get());
        }
        if let Some(statuses) = query.statuses {
            let literals: Vec<&str> = statuses.iter().map(OrderStatus::as_str).collect();
            sqlx_query = sqlx_query.bind(literals);
        }
        if let Some(from) = query.created_from {
            sqlx_query = sqlx_query.bind(from);
        }
        if let Some(to) = query.created_to {
            sqlx_query = sqlx_query.bind(to);
        }
        if let Some(limit) = query.limit {
            sqlx_query = sqlx_query.bind(i64::try_from(limit).unwrap_or(i64::MAX));
        }
        if let Some(offset) = query.offset {
            sqlx_query = sqlx_query.bind(i64::try_from(offset).unwrap_or(i64::MAX));
        }

        let rows = sqlx_query.fetch_all(&self.pool).await?;
        self.rows_to_orders(rows).await
    }

    async fn claim_order(&self, id: OrderId, carrier: CarrierId) -> Result<bool> {
        let affected = sqlx::query(
            "UPDATE orders SET carrier_id = $1, status = $2 WHERE id = $3 AND status = $4",
        )
        .bind(carrier.get())
        .bind(OrderStatus::Selected.as_str())
        .bind(id.get())
        .bind(OrderStatus::Pending.as_str())
        .execute(&self.pool)
        .await?
        .rows_affected();

        Ok(affected == 1)
    }

    async fn release_order(&self, id: OrderId, carrier: CarrierId) -> Result<bool> {
        let affected = sqlx::query(
            "UPDATE orders SET carrier_id = NULL, status = $1 WHERE id = $2 AND status = $3 AND carrier_id = $4",
        )
        .bind(OrderStatus::Pending.as_str())
        .bind(id.get())
        .bind(OrderStatus::Selected.as_str())
        .bind(carrier.get())
        .execute(&self.pool)
        .await?
        .rows_affected();

        Ok(affected == 1)
    }

    async fn complete_order(
        &self,
        id: OrderId,
        carrier: CarrierId,
        delivered_at: DateTime<Utc>,
    ) -> Result<bool> {
        let affected = sqlx::query(
            "UPDATE orders SET status = $1, delivery_date = $2 WHERE id = $3 AND status = $4 AND carrier_id = $5",
        )
        .bind(OrderStatus::Delivered.as_str())
        .bind(delivered_at)
        .bind(id.get())
        .bind(OrderStatus::Selected.as_str())
        .bind(carrier.get())
        .execute(&self.pool)
        .await?
        .rows_affected();

        Ok(affected == 1)
    }

    async fn cancel_order(&self, id: OrderId, customer: CustomerId) -> Result<bool> {
        let affected = sqlx::query(
            "UPDATE orders SET status = $1 WHERE id = $2 AND status = $3 AND customer_id = $4",
        )
        .bind(OrderStatus::Cancelled.as_str())
        .bind(id.get())
        .bind(OrderStatus::Pending.as_str())
        .bind(customer.get())
        .execute(&self.pool)
        .await?
        .rows_affected();

        Ok(affected == 1)
    }

    async fn rate_order(&self, id: OrderId, customer: CustomerId, score: u8) -> Result<bool> {
        validate_rating(score)?;

        let affected = sqlx::query(
            r#"
            UPDATE orders SET carrier_rating = $1
            WHERE id = $2 AND status = $3 AND carrier_rating IS NULL AND customer_id = $4
            "#,
        )
        .bind(i16::from(score))
        .bind(id.get())
        .bind(OrderStatus::Delivered.as_str())
        .bind(customer.get())
        .execute(&self.pool)
        .await?
        .rows_affected();

        Ok(affected == 1)
    }

    async fn carrier_rating(&self, carrier: CarrierId) -> Result<CarrierRating> {
        let row = sqlx::query(
            r#"
            SELECT COALESCE(SUM(carrier_rating), 0)::BIGINT AS total, COUNT(carrier_rating) AS rated
            FROM orders
            WHERE carrier_id = $1
            "#,
        )
        .bind(carrier.get())
        .fetch_one(&self.pool)
        .await?;

        let total: i64 = row.try_get("total")?;
        let rated: i64 = row.try_get("rated")?;
        Ok(CarrierRating::from_scores(
            u64::try_from(total).unwrap_or(0),
            u64::try_from(rated).unwrap_or(0),
        ))
    }
}
