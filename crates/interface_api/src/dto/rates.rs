//! Rate ledger DTOs

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use validator::Validate;

use core_kernel::Money;
use domain_billing::{RateCondition, RateTerms};

use crate::error::ApiError;

/// The numeric pricing fields of a condition, as submitted by the UI
#[derive(Debug, Deserialize, Validate)]
pub struct RateTermsDto {
    pub price_per_unit: Decimal,
    #[validate(range(min = 1, max = 480))]
    pub unit_duration_min: i32,
    pub travel_distance_km: Decimal,
    pub travel_rate_per_km: Decimal,
}

impl RateTermsDto {
    /// Converts into domain terms, rejecting negative amounts.
    ///
    /// `validator` has no range rule for decimals, so the sign checks are
    /// explicit here.
    pub fn into_terms(self) -> Result<RateTerms, ApiError> {
        if self.price_per_unit.is_sign_negative() {
            return Err(ApiError::Validation(
                "price_per_unit must not be negative".to_string(),
            ));
        }
        if self.travel_distance_km.is_sign_negative() {
            return Err(ApiError::Validation(
                "travel_distance_km must not be negative".to_string(),
            ));
        }
        if self.travel_rate_per_km.is_sign_negative() {
            return Err(ApiError::Validation(
                "travel_rate_per_km must not be negative".to_string(),
            ));
        }

        Ok(RateTerms {
            price_per_unit: Money::new(self.price_per_unit),
            unit_duration_min: self.unit_duration_min,
            travel_distance_km: self.travel_distance_km,
            travel_rate_per_km: Money::new(self.travel_rate_per_km),
        })
    }
}

/// Request to version a customer's rate
#[derive(Debug, Deserialize, Validate)]
pub struct VersionRateRequest {
    #[validate(nested)]
    pub terms: RateTermsDto,
    /// First day the new terms apply; must be strictly after the current
    /// open condition's start
    pub valid_from: NaiveDate,
}

/// Request to correct a typo in the current open condition
#[derive(Debug, Deserialize, Validate)]
pub struct CorrectRateRequest {
    #[validate(nested)]
    pub terms: RateTermsDto,
}

/// A rate condition as returned to the UI
#[derive(Debug, Serialize)]
pub struct RateConditionResponse {
    pub id: i64,
    pub customer_id: i64,
    pub price_per_unit: Money,
    pub unit_duration_min: i32,
    pub travel_distance_km: Decimal,
    pub travel_rate_per_km: Money,
    pub valid_from: NaiveDate,
    pub valid_until: Option<NaiveDate>,
}

impl From<RateCondition> for RateConditionResponse {
    fn from(condition: RateCondition) -> Self {
        Self {
            id: condition.id.value(),
            customer_id: condition.customer_id.value(),
            price_per_unit: condition.terms.price_per_unit,
            unit_duration_min: condition.terms.unit_duration_min,
            travel_distance_km: condition.terms.travel_distance_km,
            travel_rate_per_km: condition.terms.travel_rate_per_km,
            valid_from: condition.validity.valid_from,
            valid_until: condition.validity.valid_until,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_negative_price_is_rejected() {
        let dto = RateTermsDto {
            price_per_unit: dec!(-50),
            unit_duration_min: 45,
            travel_distance_km: dec!(10),
            travel_rate_per_km: dec!(0.5),
        };
        assert!(matches!(dto.into_terms(), Err(ApiError::Validation(_))));
    }

    #[test]
    fn test_valid_terms_convert() {
        let dto = RateTermsDto {
            price_per_unit: dec!(50),
            unit_duration_min: 45,
            travel_distance_km: dec!(10),
            travel_rate_per_km: dec!(0.5),
        };
        let terms = dto.into_terms().unwrap();
        assert_eq!(terms.price_per_unit, Money::new(dec!(50)));
        assert_eq!(terms.travel_distance_km, dec!(10));
    }
}
