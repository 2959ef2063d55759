//! Customer read model
//!
//! Customers are owned by the surrounding CRUD surface; the engine only
//! reads them to stamp invoices and derive invoice numbers.

use core_kernel::CustomerId;
use serde::{Deserialize, Serialize};

/// Postal address of a customer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Address {
    pub street: String,
    pub house_number: String,
    pub postal_code: String,
    pub city: String,
}

/// A customer as seen by the billing engine
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Customer {
    pub id: CustomerId,
    /// Display name printed on invoices
    pub name: String,
    /// Short code used as the invoice number prefix
    pub short_code: String,
    pub contact_person: Option<String>,
    pub address: Address,
}
