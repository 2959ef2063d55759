//! Pre-built Test Fixtures
//!
//! Ready-to-use, predictable test data shared across the suite.

use chrono::{NaiveDate, NaiveDateTime};
use core_kernel::{CustomerId, DateRange, Money, RateConditionId, Validity};
use domain_billing::{Address, Customer, RateCondition, RateTerms};
use rust_decimal_macros::dec;

/// Fixture for rate test data
pub struct RateFixtures;

impl RateFixtures {
    /// The reference terms from the billing examples: 50 €/unit, 45 min
    /// units, 10 km travel at 0.50 €/km
    pub fn standard_terms() -> RateTerms {
        RateTerms {
            price_per_unit: Money::new(dec!(50)),
            unit_duration_min: 45,
            travel_distance_km: dec!(10),
            travel_rate_per_km: Money::new(dec!(0.5)),
        }
    }

    /// Raised terms used after a versioning: 60 €/unit, travel unchanged
    pub fn raised_terms() -> RateTerms {
        RateTerms {
            price_per_unit: Money::new(dec!(60)),
            ..Self::standard_terms()
        }
    }

    /// An open condition with the standard terms, valid from Jan 1, 2025
    pub fn open_condition(customer: CustomerId) -> RateCondition {
        RateCondition {
            id: RateConditionId::new(1),
            customer_id: customer,
            terms: Self::standard_terms(),
            validity: Validity::open(TemporalFixtures::rates_epoch()),
        }
    }
}

/// Fixture for temporal test data
pub struct TemporalFixtures;

impl TemporalFixtures {
    /// Start of the test rate history (Jan 1, 2025)
    pub fn rates_epoch() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 1, 1).unwrap()
    }

    /// The reference billing period: all of January 2025
    pub fn january_2025() -> DateRange {
        DateRange::new(
            NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
            NaiveDate::from_ymd_opt(2025, 1, 31).unwrap(),
        )
        .unwrap()
    }

    /// A morning appointment on the given day
    pub fn morning_visit(y: i32, m: u32, d: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(9, 0, 0)
            .unwrap()
    }

    /// An afternoon appointment on the given day
    pub fn afternoon_visit(y: i32, m: u32, d: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(15, 30, 0)
            .unwrap()
    }
}

/// Fixture for customer test data
pub struct CustomerFixtures;

impl CustomerFixtures {
    /// The reference customer with short code "AB"
    pub fn praxis_sonnenhof() -> Customer {
        Customer {
            id: CustomerId::new(10001),
            name: "Praxis Sonnenhof".to_string(),
            short_code: "AB".to_string(),
            contact_person: Some("Frau Berger".to_string()),
            address: Address {
                street: "Lindenweg".to_string(),
                house_number: "4".to_string(),
                postal_code: "79098".to_string(),
                city: "Freiburg".to_string(),
            },
        }
    }

    /// A second customer with short code "CD" for multi-customer tests
    pub fn werkhof_nord() -> Customer {
        Customer {
            id: CustomerId::new(10002),
            name: "Werkhof Nord".to_string(),
            short_code: "CD".to_string(),
            contact_person: None,
            address: Address {
                street: "Hafenstraße".to_string(),
                house_number: "12a".to_string(),
                postal_code: "20457".to_string(),
                city: "Hamburg".to_string(),
            },
        }
    }
}
