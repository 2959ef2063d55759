//! Visit repository
//!
//! Read-only access to visit records. The range filter widens the
//! operator-selected dates to whole days (00:00:00 through 23:59:59) and
//! deliberately does *not* join the rate ledger: the rate resolution runs
//! in the domain layer with explicit interval logic.

use async_trait::async_trait;
use chrono::NaiveDateTime;
use sqlx::PgPool;

use core_kernel::{CustomerId, DateRange, VisitId};
use domain_billing::{StoreError, Visit, VisitStore};

use crate::error::store_err;

/// PostgreSQL-backed visit reader
#[derive(Debug, Clone)]
pub struct PgVisitStore {
    pool: PgPool,
}

impl PgVisitStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct VisitRow {
    visit_id: i64,
    customer_id: i64,
    visited_at: NaiveDateTime,
    units: i32,
    note: Option<String>,
}

impl From<VisitRow> for Visit {
    fn from(row: VisitRow) -> Self {
        Visit {
            id: VisitId::new(row.visit_id),
            customer_id: CustomerId::new(row.customer_id),
            visited_at: row.visited_at,
            units: row.units,
            note: row.note,
        }
    }
}

#[async_trait]
impl VisitStore for PgVisitStore {
    async fn visits_in_range(
        &self,
        customer: CustomerId,
        range: DateRange,
    ) -> Result<Vec<Visit>, StoreError> {
        let rows = sqlx::query_as::<_, VisitRow>(
            r#"
            SELECT
                visit_id,
                customer_id,
                visited_at,
                units,
                note
            FROM visits
            WHERE customer_id = $1
              AND visited_at BETWEEN $2 AND $3
            ORDER BY visited_at, visit_id
            "#,
        )
        .bind(customer.value())
        .bind(range.start_of_first_day())
        .bind(range.end_of_last_day())
        .fetch_all(&self.pool)
        .await
        .map_err(store_err)?;

        Ok(rows.into_iter().map(Visit::from).collect())
    }
}
