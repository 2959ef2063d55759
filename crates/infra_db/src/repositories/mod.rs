//! Repository implementations of the billing store ports

pub mod customers;
pub mod invoices;
pub mod rates;
pub mod visits;

pub use customers::PgCustomerStore;
pub use invoices::PgInvoiceStore;
pub use rates::PgRateStore;
pub use visits::PgVisitStore;
