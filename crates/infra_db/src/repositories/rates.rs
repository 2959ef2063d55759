//! Rate ledger repository
//!
//! Implements the versioning and correction protocols of the rate ledger.
//! Versioning is the only write path that creates history: it closes the
//! open condition the day before the successor starts and inserts the
//! successor inside one transaction, holding a row lock on the open
//! condition so concurrent versioning attempts serialize. A partial unique
//! index on `(customer_id) WHERE valid_until IS NULL` backs the
//! one-open-condition invariant in the schema itself.

use async_trait::async_trait;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use sqlx::PgPool;
use tracing::debug;

use core_kernel::{CustomerId, Money, RateConditionId, Validity};
use domain_billing::{RateCondition, RateStore, RateTerms, StoreError, VersionOutcome};

use crate::error::store_err;

/// PostgreSQL-backed rate ledger
#[derive(Debug, Clone)]
pub struct PgRateStore {
    pool: PgPool,
}

impl PgRateStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct RateConditionRow {
    rate_condition_id: i64,
    customer_id: i64,
    price_per_unit: Decimal,
    unit_duration_min: i32,
    travel_distance_km: Decimal,
    travel_rate_per_km: Decimal,
    valid_from: NaiveDate,
    valid_until: Option<NaiveDate>,
}

impl From<RateConditionRow> for RateCondition {
    fn from(row: RateConditionRow) -> Self {
        RateCondition {
            id: RateConditionId::new(row.rate_condition_id),
            customer_id: CustomerId::new(row.customer_id),
            terms: RateTerms {
                price_per_unit: Money::new(row.price_per_unit),
                unit_duration_min: row.unit_duration_min,
                travel_distance_km: row.travel_distance_km,
                travel_rate_per_km: Money::new(row.travel_rate_per_km),
            },
            validity: Validity {
                valid_from: row.valid_from,
                valid_until: row.valid_until,
            },
        }
    }
}

const CONDITION_COLUMNS: &str = r#"
    rate_condition_id,
    customer_id,
    price_per_unit,
    unit_duration_min,
    travel_distance_km,
    travel_rate_per_km,
    valid_from,
    valid_until
"#;

#[async_trait]
impl RateStore for PgRateStore {
    async fn conditions_for(
        &self,
        customer: CustomerId,
    ) -> Result<Vec<RateCondition>, StoreError> {
        let sql = format!(
            r#"
            SELECT {CONDITION_COLUMNS}
            FROM rate_conditions
            WHERE customer_id = $1
            ORDER BY valid_from, rate_condition_id
            "#
        );
        let rows = sqlx::query_as::<_, RateConditionRow>(&sql)
            .bind(customer.value())
            .fetch_all(&self.pool)
            .await
            .map_err(store_err)?;

        Ok(rows.into_iter().map(RateCondition::from).collect())
    }

    async fn version_rate(
        &self,
        customer: CustomerId,
        terms: RateTerms,
        valid_from: NaiveDate,
    ) -> Result<VersionOutcome, StoreError> {
        let mut tx = self.pool.begin().await.map_err(store_err)?;

        // Lock the open condition so a concurrent versioning attempt
        // waits behind this one instead of racing the close-and-insert
        let select_open = format!(
            r#"
            SELECT {CONDITION_COLUMNS}
            FROM rate_conditions
            WHERE customer_id = $1 AND valid_until IS NULL
            FOR UPDATE
            "#
        );
        let open = sqlx::query_as::<_, RateConditionRow>(&select_open)
            .bind(customer.value())
            .fetch_optional(&mut *tx)
            .await
            .map_err(store_err)?;

        if let Some(open) = &open {
            if valid_from <= open.valid_from {
                return Ok(VersionOutcome::Conflict {
                    open_from: open.valid_from,
                });
            }

            let close_on = valid_from.pred_opt().ok_or_else(|| {
                StoreError::internal("valid_from has no predecessor day")
            })?;

            sqlx::query(
                "UPDATE rate_conditions SET valid_until = $1 WHERE rate_condition_id = $2",
            )
            .bind(close_on)
            .bind(open.rate_condition_id)
            .execute(&mut *tx)
            .await
            .map_err(store_err)?;

            debug!(
                customer = %customer,
                predecessor = open.rate_condition_id,
                %close_on,
                "closed predecessor rate condition"
            );
        }

        let insert = format!(
            r#"
            INSERT INTO rate_conditions (
                customer_id,
                price_per_unit,
                unit_duration_min,
                travel_distance_km,
                travel_rate_per_km,
                valid_from,
                valid_until
            ) VALUES ($1, $2, $3, $4, $5, $6, NULL)
            RETURNING {CONDITION_COLUMNS}
            "#
        );
        let created = sqlx::query_as::<_, RateConditionRow>(&insert)
            .bind(customer.value())
            .bind(terms.price_per_unit.amount())
            .bind(terms.unit_duration_min)
            .bind(terms.travel_distance_km)
            .bind(terms.travel_rate_per_km.amount())
            .bind(valid_from)
            .fetch_one(&mut *tx)
            .await
            .map_err(store_err)?;

        tx.commit().await.map_err(store_err)?;

        Ok(VersionOutcome::Created(RateCondition::from(created)))
    }

    async fn correct_rate(
        &self,
        customer: CustomerId,
        terms: RateTerms,
    ) -> Result<Option<RateCondition>, StoreError> {
        // Single-statement update: only the numeric fields change, the
        // validity bounds stay untouched and no history row is created
        let update = format!(
            r#"
            UPDATE rate_conditions SET
                price_per_unit = $2,
                unit_duration_min = $3,
                travel_distance_km = $4,
                travel_rate_per_km = $5
            WHERE customer_id = $1 AND valid_until IS NULL
            RETURNING {CONDITION_COLUMNS}
            "#
        );
        let row = sqlx::query_as::<_, RateConditionRow>(&update)
            .bind(customer.value())
            .bind(terms.price_per_unit.amount())
            .bind(terms.unit_duration_min)
            .bind(terms.travel_distance_km)
            .bind(terms.travel_rate_per_km.amount())
            .fetch_optional(&self.pool)
            .await
            .map_err(store_err)?;

        Ok(row.map(RateCondition::from))
    }
}
