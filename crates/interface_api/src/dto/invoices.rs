//! Invoice DTOs

use chrono::NaiveDate;
use serde::Serialize;

use core_kernel::Money;
use domain_billing::OpenInvoice;

/// One row of the unpaid-invoice listing
#[derive(Debug, Serialize)]
pub struct OpenInvoiceResponse {
    pub number: String,
    pub issued_on: NaiveDate,
    pub customer_name: String,
    pub total: Money,
}

impl From<OpenInvoice> for OpenInvoiceResponse {
    fn from(invoice: OpenInvoice) -> Self {
        Self {
            number: invoice.number.to_string(),
            issued_on: invoice.issued_on,
            customer_name: invoice.customer_name,
            total: invoice.total,
        }
    }
}

/// Confirmation of a recorded payment
#[derive(Debug, Serialize)]
pub struct MarkPaidResponse {
    pub number: String,
    pub paid: bool,
}
