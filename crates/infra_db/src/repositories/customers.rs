//! Customer repository
//!
//! Read-only access to customer master data; the rows are owned by the
//! surrounding CRUD surface.

use async_trait::async_trait;
use sqlx::PgPool;

use core_kernel::CustomerId;
use domain_billing::{Address, Customer, CustomerStore, StoreError};

use crate::error::store_err;

/// PostgreSQL-backed customer reader
#[derive(Debug, Clone)]
pub struct PgCustomerStore {
    pool: PgPool,
}

impl PgCustomerStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct CustomerRow {
    customer_id: i64,
    name: String,
    short_code: String,
    contact_person: Option<String>,
    street: String,
    house_number: String,
    postal_code: String,
    city: String,
}

impl From<CustomerRow> for Customer {
    fn from(row: CustomerRow) -> Self {
        Customer {
            id: CustomerId::new(row.customer_id),
            name: row.name,
            short_code: row.short_code,
            contact_person: row.contact_person,
            address: Address {
                street: row.street,
                house_number: row.house_number,
                postal_code: row.postal_code,
                city: row.city,
            },
        }
    }
}

#[async_trait]
impl CustomerStore for PgCustomerStore {
    async fn get(&self, id: CustomerId) -> Result<Option<Customer>, StoreError> {
        let row = sqlx::query_as::<_, CustomerRow>(
            r#"
            SELECT
                customer_id,
                name,
                short_code,
                contact_person,
                street,
                house_number,
                postal_code,
                city
            FROM customers
            WHERE customer_id = $1
            "#,
        )
        .bind(id.value())
        .fetch_optional(&self.pool)
        .await
        .map_err(store_err)?;

        Ok(row.map(Customer::from))
    }
}
