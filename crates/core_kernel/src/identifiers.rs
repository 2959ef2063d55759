//! Strongly-typed identifiers for domain entities
//!
//! Customer, rate condition and visit rows carry database-assigned numeric
//! keys; newtype wrappers prevent accidentally mixing them. The invoice
//! number is different: it is *derived*, not assigned, and its derivation
//! rule is part of the billing contract (see [`InvoiceNumber`]).

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::num::ParseIntError;
use std::str::FromStr;

macro_rules! define_numeric_id {
    ($name:ident) => {
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(i64);

        impl $name {
            /// Wraps a raw database key
            pub fn new(value: i64) -> Self {
                Self(value)
            }

            /// Returns the raw key
            pub fn value(&self) -> i64 {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl FromStr for $name {
            type Err = ParseIntError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Ok(Self(s.parse()?))
            }
        }

        impl From<i64> for $name {
            fn from(value: i64) -> Self {
                Self(value)
            }
        }

        impl From<$name> for i64 {
            fn from(id: $name) -> i64 {
                id.0
            }
        }
    };
}

define_numeric_id!(CustomerId);
define_numeric_id!(RateConditionId);
define_numeric_id!(VisitId);

/// A derived invoice identifier.
///
/// The number is the customer's short code followed by the *generation*
/// date formatted `%y-%m`, e.g. `AB25-01` for customer `AB` invoiced in
/// January 2025. Because the month of generation (not the billing period)
/// keys the number, regenerating an invoice for the same customer within
/// one calendar month produces the same number on purpose: the register
/// overwrites the unpaid draft instead of accumulating duplicates. The
/// collision is the upsert key of the submit workflow, not an accident.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InvoiceNumber(String);

impl InvoiceNumber {
    /// Derives the number for a customer short code and generation date.
    pub fn derive(short_code: &str, generated_on: NaiveDate) -> Self {
        Self(format!(
            "{}{:02}-{:02}",
            short_code,
            generated_on.year() % 100,
            generated_on.month()
        ))
    }

    /// Wraps an already-derived number, e.g. one read back from the store.
    pub fn from_raw(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for InvoiceNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for InvoiceNumber {
    fn from(raw: String) -> Self {
        Self(raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_numeric_id_roundtrip() {
        let id = CustomerId::new(10001);
        assert_eq!(id.value(), 10001);
        assert_eq!(id.to_string(), "10001");

        let parsed: CustomerId = "10001".parse().unwrap();
        assert_eq!(parsed, id);
    }

    #[test]
    fn test_ids_do_not_compare_across_types() {
        // Compile-time property; the wrappers only need to exist
        let customer = CustomerId::new(1);
        let visit = VisitId::new(1);
        assert_eq!(customer.value(), visit.value());
    }

    #[test]
    fn test_invoice_number_derivation() {
        let date = NaiveDate::from_ymd_opt(2025, 1, 17).unwrap();
        assert_eq!(InvoiceNumber::derive("AB", date).as_str(), "AB25-01");

        let december = NaiveDate::from_ymd_opt(2025, 12, 3).unwrap();
        assert_eq!(InvoiceNumber::derive("KK", december).as_str(), "KK25-12");
    }

    #[test]
    fn test_invoice_number_collides_within_generation_month() {
        let early = NaiveDate::from_ymd_opt(2025, 3, 1).unwrap();
        let late = NaiveDate::from_ymd_opt(2025, 3, 31).unwrap();

        // Same month, same number: the register upsert relies on this
        assert_eq!(
            InvoiceNumber::derive("AB", early),
            InvoiceNumber::derive("AB", late)
        );
    }
}
