//! Invoice register and payment tracker
//!
//! The submit protocol is the paid-lock boundary of the whole system: the
//! paid-check and the upsert execute in one transaction with the invoice
//! row locked, so a payment marked between check and write cannot be
//! overwritten. `ON CONFLICT (invoice_number)` implements the documented
//! collision-as-upsert-key behavior of the derived invoice number.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;
use tracing::debug;

use core_kernel::{CustomerId, InvoiceNumber, Money, RateConditionId};
use domain_billing::{
    Invoice, InvoiceStatus, InvoiceStore, NewInvoice, OpenInvoice, StoreError, SubmitOutcome,
};

use crate::error::store_err;

/// PostgreSQL-backed invoice register
#[derive(Debug, Clone)]
pub struct PgInvoiceStore {
    pool: PgPool,
}

impl PgInvoiceStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct InvoiceRow {
    invoice_number: String,
    customer_id: i64,
    rate_condition_id: i64,
    issued_on: NaiveDate,
    total: Decimal,
    price_per_unit_snapshot: Decimal,
    unit_duration_min_snapshot: i32,
    travel_distance_km_snapshot: Decimal,
    travel_rate_per_km_snapshot: Decimal,
    paid: bool,
    created_at: DateTime<Utc>,
}

impl From<InvoiceRow> for Invoice {
    fn from(row: InvoiceRow) -> Self {
        Invoice {
            number: InvoiceNumber::from_raw(row.invoice_number),
            customer_id: CustomerId::new(row.customer_id),
            rate_condition_id: RateConditionId::new(row.rate_condition_id),
            issued_on: row.issued_on,
            total: Money::new(row.total),
            price_per_unit: Money::new(row.price_per_unit_snapshot),
            unit_duration_min: row.unit_duration_min_snapshot,
            travel_distance_km: row.travel_distance_km_snapshot,
            travel_rate_per_km: Money::new(row.travel_rate_per_km_snapshot),
            status: if row.paid {
                InvoiceStatus::Paid
            } else {
                InvoiceStatus::Draft
            },
            created_at: row.created_at,
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct OpenInvoiceRow {
    invoice_number: String,
    issued_on: NaiveDate,
    customer_name: String,
    total: Decimal,
}

#[async_trait]
impl InvoiceStore for PgInvoiceStore {
    async fn submit(&self, invoice: &NewInvoice) -> Result<SubmitOutcome, StoreError> {
        let mut tx = self.pool.begin().await.map_err(store_err)?;

        // Lock the row first: the paid-check and the overwrite must be
        // one atomic unit against a concurrent mark_paid
        let existing_paid = sqlx::query_scalar::<_, bool>(
            "SELECT paid FROM invoices WHERE invoice_number = $1 FOR UPDATE",
        )
        .bind(invoice.number.as_str())
        .fetch_optional(&mut *tx)
        .await
        .map_err(store_err)?;

        if existing_paid == Some(true) {
            debug!(number = %invoice.number, "submit rejected: invoice is paid");
            return Ok(SubmitOutcome::Locked);
        }

        sqlx::query(
            r#"
            INSERT INTO invoices (
                invoice_number,
                customer_id,
                rate_condition_id,
                issued_on,
                total,
                price_per_unit_snapshot,
                unit_duration_min_snapshot,
                travel_distance_km_snapshot,
                travel_rate_per_km_snapshot,
                paid
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, FALSE)
            ON CONFLICT (invoice_number) DO UPDATE SET
                rate_condition_id = EXCLUDED.rate_condition_id,
                issued_on = EXCLUDED.issued_on,
                total = EXCLUDED.total,
                price_per_unit_snapshot = EXCLUDED.price_per_unit_snapshot,
                unit_duration_min_snapshot = EXCLUDED.unit_duration_min_snapshot,
                travel_distance_km_snapshot = EXCLUDED.travel_distance_km_snapshot,
                travel_rate_per_km_snapshot = EXCLUDED.travel_rate_per_km_snapshot
            "#,
        )
        .bind(invoice.number.as_str())
        .bind(invoice.customer_id.value())
        .bind(invoice.rate_condition_id.value())
        .bind(invoice.issued_on)
        .bind(invoice.total.amount())
        .bind(invoice.price_per_unit.amount())
        .bind(invoice.unit_duration_min)
        .bind(invoice.travel_distance_km)
        .bind(invoice.travel_rate_per_km.amount())
        .execute(&mut *tx)
        .await
        .map_err(store_err)?;

        tx.commit().await.map_err(store_err)?;

        Ok(if existing_paid.is_some() {
            SubmitOutcome::Replaced
        } else {
            SubmitOutcome::Created
        })
    }

    async fn mark_paid(&self, number: &InvoiceNumber) -> Result<bool, StoreError> {
        let result = sqlx::query("UPDATE invoices SET paid = TRUE WHERE invoice_number = $1")
            .bind(number.as_str())
            .execute(&self.pool)
            .await
            .map_err(store_err)?;

        Ok(result.rows_affected() > 0)
    }

    async fn is_paid(&self, number: &InvoiceNumber) -> Result<bool, StoreError> {
        let paid = sqlx::query_scalar::<_, bool>(
            "SELECT paid FROM invoices WHERE invoice_number = $1",
        )
        .bind(number.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(store_err)?;

        Ok(paid.unwrap_or(false))
    }

    async fn list_unpaid(&self) -> Result<Vec<OpenInvoice>, StoreError> {
        let rows = sqlx::query_as::<_, OpenInvoiceRow>(
            r#"
            SELECT
                i.invoice_number,
                i.issued_on,
                c.name AS customer_name,
                i.total
            FROM invoices i
            JOIN customers c ON c.customer_id = i.customer_id
            WHERE i.paid = FALSE
            ORDER BY i.created_at DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(store_err)?;

        Ok(rows
            .into_iter()
            .map(|row| OpenInvoice {
                number: InvoiceNumber::from_raw(row.invoice_number),
                issued_on: row.issued_on,
                customer_name: row.customer_name,
                total: Money::new(row.total),
            })
            .collect())
    }

    async fn get(&self, number: &InvoiceNumber) -> Result<Option<Invoice>, StoreError> {
        let row = sqlx::query_as::<_, InvoiceRow>(
            r#"
            SELECT
                invoice_number,
                customer_id,
                rate_condition_id,
                issued_on,
                total,
                price_per_unit_snapshot,
                unit_duration_min_snapshot,
                travel_distance_km_snapshot,
                travel_rate_per_km_snapshot,
                paid,
                created_at
            FROM invoices
            WHERE invoice_number = $1
            "#,
        )
        .bind(number.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(store_err)?;

        Ok(row.map(Invoice::from))
    }
}
