//! Test Data Builders
//!
//! Builder patterns for constructing test data with sensible defaults, so
//! tests only spell out the fields they actually care about.

use chrono::{NaiveDate, NaiveDateTime};
use fake::faker::address::en::CityName;
use fake::faker::company::en::CompanyName;
use fake::Fake;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use core_kernel::{CustomerId, Money, RateConditionId, Validity, VisitId};
use domain_billing::{Address, Customer, RateCondition, RateTerms, Visit};

/// Builder for test customers
pub struct CustomerBuilder {
    id: CustomerId,
    name: String,
    short_code: String,
    contact_person: Option<String>,
    city: String,
}

impl CustomerBuilder {
    /// Creates a builder with generated defaults
    pub fn new() -> Self {
        Self {
            id: CustomerId::new(10001),
            name: CompanyName().fake(),
            short_code: "AB".to_string(),
            contact_person: None,
            city: CityName().fake(),
        }
    }

    pub fn with_id(mut self, id: i64) -> Self {
        self.id = CustomerId::new(id);
        self
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_short_code(mut self, code: impl Into<String>) -> Self {
        self.short_code = code.into();
        self
    }

    pub fn with_contact(mut self, contact: impl Into<String>) -> Self {
        self.contact_person = Some(contact.into());
        self
    }

    pub fn build(self) -> Customer {
        Customer {
            id: self.id,
            name: self.name,
            short_code: self.short_code,
            contact_person: self.contact_person,
            address: Address {
                street: "Musterweg".to_string(),
                house_number: "1".to_string(),
                postal_code: "10115".to_string(),
                city: self.city,
            },
        }
    }
}

impl Default for CustomerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Builder for test rate conditions
pub struct RateConditionBuilder {
    id: RateConditionId,
    customer_id: CustomerId,
    price_per_unit: Decimal,
    unit_duration_min: i32,
    travel_distance_km: Decimal,
    travel_rate_per_km: Decimal,
    validity: Validity,
}

impl RateConditionBuilder {
    /// Creates a builder with the standard reference terms, open-ended
    /// from Jan 1, 2025
    pub fn new(customer_id: i64) -> Self {
        Self {
            id: RateConditionId::new(1),
            customer_id: CustomerId::new(customer_id),
            price_per_unit: dec!(50),
            unit_duration_min: 45,
            travel_distance_km: dec!(10),
            travel_rate_per_km: dec!(0.5),
            validity: Validity::open(NaiveDate::from_ymd_opt(2025, 1, 1).unwrap()),
        }
    }

    pub fn with_id(mut self, id: i64) -> Self {
        self.id = RateConditionId::new(id);
        self
    }

    pub fn with_price(mut self, price: Decimal) -> Self {
        self.price_per_unit = price;
        self
    }

    pub fn with_travel(mut self, distance_km: Decimal, rate_per_km: Decimal) -> Self {
        self.travel_distance_km = distance_km;
        self.travel_rate_per_km = rate_per_km;
        self
    }

    pub fn valid_from(mut self, date: NaiveDate) -> Self {
        self.validity = Validity {
            valid_from: date,
            valid_until: self.validity.valid_until,
        };
        self
    }

    pub fn closed_on(mut self, date: NaiveDate) -> Self {
        self.validity = Validity {
            valid_from: self.validity.valid_from,
            valid_until: Some(date),
        };
        self
    }

    pub fn build(self) -> RateCondition {
        RateCondition {
            id: self.id,
            customer_id: self.customer_id,
            terms: RateTerms {
                price_per_unit: Money::new(self.price_per_unit),
                unit_duration_min: self.unit_duration_min,
                travel_distance_km: self.travel_distance_km,
                travel_rate_per_km: Money::new(self.travel_rate_per_km),
            },
            validity: self.validity,
        }
    }
}

/// Builder for test visits
pub struct VisitBuilder {
    id: VisitId,
    customer_id: CustomerId,
    visited_at: NaiveDateTime,
    units: i32,
    note: Option<String>,
}

impl VisitBuilder {
    /// Creates a builder for a one-unit visit on Jan 5, 2025
    pub fn new(customer_id: i64) -> Self {
        Self {
            id: VisitId::new(1),
            customer_id: CustomerId::new(customer_id),
            visited_at: NaiveDate::from_ymd_opt(2025, 1, 5)
                .unwrap()
                .and_hms_opt(9, 0, 0)
                .unwrap(),
            units: 1,
            note: None,
        }
    }

    pub fn with_id(mut self, id: i64) -> Self {
        self.id = VisitId::new(id);
        self
    }

    pub fn at(mut self, visited_at: NaiveDateTime) -> Self {
        self.visited_at = visited_at;
        self
    }

    pub fn on_day(mut self, date: NaiveDate) -> Self {
        self.visited_at = date.and_hms_opt(9, 0, 0).unwrap();
        self
    }

    pub fn with_units(mut self, units: i32) -> Self {
        self.units = units;
        self
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.note = Some(note.into());
        self
    }

    pub fn build(self) -> Visit {
        Visit {
            id: self.id,
            customer_id: self.customer_id,
            visited_at: self.visited_at,
            units: self.units,
            note: self.note,
        }
    }
}
