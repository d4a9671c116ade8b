use async_trait::async_trait;
use chrono::{DateTime, SubsecRound, Utc};
use common::{OrderId, Page, Version};
use domain::{
    NewOrder, Order, OrderRecord, OrderRepository, OrderState, OrderStatus, RepositoryError,
    Service,
};
use sqlx::types::Json;
use sqlx::{PgPool, Row, postgres::PgRow};
use uuid::Uuid;

const ORDER_COLUMNS: &str =
    "id, lab, patient, customer, state, status, services, version, created_at, updated_at";

/// PostgreSQL-backed order repository.
#[derive(Clone)]
pub struct PostgresOrderRepository {
    pool: PgPool,
}

impl PostgresOrderRepository {
    /// Creates a new PostgreSQL order repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Gets a reference to the underlying connection pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Runs the database migrations.
    pub async fn run_migrations(&self) -> Result<(), sqlx::migrate::MigrateError> {
        sqlx::migrate!("../../migrations").run(&self.pool).await
    }

    fn row_to_order(row: PgRow) -> Result<Order, RepositoryError> {
        let state: String = row.try_get("state").map_err(RepositoryError::backend)?;
        let status: String = row.try_get("status").map_err(RepositoryError::backend)?;
        let services: Json<Vec<Service>> =
            row.try_get("services").map_err(RepositoryError::backend)?;

        let record = OrderRecord {
            id: OrderId::from_uuid(row.try_get::<Uuid, _>("id").map_err(RepositoryError::backend)?),
            version: Version::new(row.try_get("version").map_err(RepositoryError::backend)?),
            lab: row.try_get("lab").map_err(RepositoryError::backend)?,
            patient: row.try_get("patient").map_err(RepositoryError::backend)?,
            customer: row.try_get("customer").map_err(RepositoryError::backend)?,
            state: state.parse::<OrderState>().map_err(RepositoryError::backend)?,
            status: status.parse::<OrderStatus>().map_err(RepositoryError::backend)?,
            services: services.0,
            created_at: row.try_get("created_at").map_err(RepositoryError::backend)?,
            updated_at: row.try_get("updated_at").map_err(RepositoryError::backend)?,
        };

        Ok(record.into())
    }

    /// Postgres keeps microsecond precision; truncate so stored and returned
    /// timestamps agree.
    fn now() -> DateTime<Utc> {
        Utc::now().trunc_subsecs(6)
    }
}

#[async_trait]
impl OrderRepository for PostgresOrderRepository {
    async fn create(&self, new_order: NewOrder) -> Result<Order, RepositoryError> {
        let order = Order::from_new(OrderId::new(), new_order, Self::now());

        sqlx::query(
            r#"
            INSERT INTO orders (id, lab, patient, customer, state, status, services, version, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            "#,
        )
        .bind(order.id().as_uuid())
        .bind(order.lab())
        .bind(order.patient())
        .bind(order.customer())
        .bind(order.state().as_str())
        .bind(order.status().as_str())
        .bind(Json(order.services()))
        .bind(order.version().as_i64())
        .bind(order.created_at())
        .bind(order.updated_at())
        .execute(&self.pool)
        .await
        .map_err(RepositoryError::backend)?;

        tracing::debug!(order_id = %order.id(), "order inserted");
        Ok(order)
    }

    async fn find_by_id(&self, id: OrderId) -> Result<Option<Order>, RepositoryError> {
        let row = sqlx::query(&format!("SELECT {ORDER_COLUMNS} FROM orders WHERE id = $1"))
            .bind(id.as_uuid())
            .fetch_optional(&self.pool)
            .await
            .map_err(RepositoryError::backend)?;

        row.map(Self::row_to_order).transpose()
    }

    async fn find(
        &self,
        state: Option<OrderState>,
        page: Page,
    ) -> Result<Vec<Order>, RepositoryError> {
        let rows = sqlx::query(&format!(
            r#"
            SELECT {ORDER_COLUMNS}
            FROM orders
            WHERE status = 'ACTIVE' AND ($1::TEXT IS NULL OR state = $1)
            ORDER BY created_at ASC, id ASC
            OFFSET $2
            LIMIT $3
            "#
        ))
        .bind(state.map(|s| s.as_str()))
        .bind(page.offset().max(0))
        .bind(page.limit.max(0))
        .fetch_all(&self.pool)
        .await
        .map_err(RepositoryError::backend)?;

        rows.into_iter().map(Self::row_to_order).collect()
    }

    async fn save(&self, order: &Order) -> Result<Order, RepositoryError> {
        let row = sqlx::query(&format!(
            r#"
            UPDATE orders
            SET state = $3, status = $4, services = $5, version = version + 1, updated_at = $6
            WHERE id = $1 AND version = $2
            RETURNING {ORDER_COLUMNS}
            "#
        ))
        .bind(order.id().as_uuid())
        .bind(order.version().as_i64())
        .bind(order.state().as_str())
        .bind(order.status().as_str())
        .bind(Json(order.services()))
        .bind(Self::now())
        .fetch_optional(&self.pool)
        .await
        .map_err(RepositoryError::backend)?;

        if let Some(row) = row {
            return Self::row_to_order(row);
        }

        // Nothing matched: either the order is gone or someone saved first.
        let actual: Option<i64> = sqlx::query_scalar("SELECT version FROM orders WHERE id = $1")
            .bind(order.id().as_uuid())
            .fetch_optional(&self.pool)
            .await
            .map_err(RepositoryError::backend)?;

        match actual {
            Some(actual) => Err(RepositoryError::ConcurrencyConflict {
                order_id: order.id(),
                expected: order.version(),
                actual: Version::new(actual),
            }),
            None => Err(RepositoryError::OrderMissing(order.id())),
        }
    }
}
