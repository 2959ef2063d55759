//! Engine integration tests
//!
//! Exercise the full operation set of the billing engine against the
//! in-memory store adapters: the reference billing arithmetic, the
//! paid-lock protocol, rate versioning, and the bounded retry of
//! transient store faults.

use std::sync::Arc;
use std::time::Duration;

use rust_decimal_macros::dec;

use core_kernel::{CustomerId, DateRange, Money};
use domain_billing::{
    BillingEngine, BillingError, BillingOutcome, InvoiceStatus, InvoiceStore, RateStore,
    RetryPolicy, SubmitOutcome,
};
use test_utils::{
    CustomerFixtures, InMemoryCustomerStore, InMemoryInvoiceStore, InMemoryRateStore,
    InMemoryVisitStore, RateFixtures, TemporalFixtures, VisitBuilder,
};

struct Harness {
    customers: Arc<InMemoryCustomerStore>,
    visits: Arc<InMemoryVisitStore>,
    rates: Arc<InMemoryRateStore>,
    invoices: Arc<InMemoryInvoiceStore>,
    engine: BillingEngine,
}

fn harness() -> Harness {
    let customers = Arc::new(InMemoryCustomerStore::new());
    let visits = Arc::new(InMemoryVisitStore::new());
    let rates = Arc::new(InMemoryRateStore::new());
    let invoices = Arc::new(InMemoryInvoiceStore::new());

    let engine = BillingEngine::new(
        customers.clone(),
        visits.clone(),
        rates.clone(),
        invoices.clone(),
    )
    .with_retry_policy(RetryPolicy {
        max_attempts: 3,
        base_delay: Duration::from_millis(1),
    });

    Harness {
        customers,
        visits,
        rates,
        invoices,
        engine,
    }
}

/// Seeds the reference customer: short code "AB", standard terms open
/// from Jan 1, 2025, visits on Jan 5 (2 units) and Jan 6 (1 unit).
fn seed_reference_customer(h: &Harness) -> CustomerId {
    let customer = CustomerFixtures::praxis_sonnenhof();
    let id = customer.id;

    h.invoices.register_customer_name(id, customer.name.clone());
    h.customers.insert(customer);
    h.rates.seed(RateFixtures::open_condition(id));
    h.visits.insert(
        VisitBuilder::new(id.value())
            .with_id(1)
            .at(TemporalFixtures::morning_visit(2025, 1, 5))
            .with_units(2)
            .build(),
    );
    h.visits.insert(
        VisitBuilder::new(id.value())
            .with_id(2)
            .at(TemporalFixtures::morning_visit(2025, 1, 6))
            .with_units(1)
            .build(),
    );

    id
}

async fn reference_outcome(h: &Harness, customer: CustomerId) -> BillingOutcome {
    h.engine
        .compute_billing(customer, TemporalFixtures::january_2025())
        .await
        .unwrap()
}

// ============================================================================
// Billing computation
// ============================================================================

#[tokio::test]
async fn test_compute_billing_matches_reference_example() {
    let h = harness();
    let customer = seed_reference_customer(&h);

    let outcome = reference_outcome(&h, customer).await;
    let snapshot = &outcome.snapshot;

    // 2 units + 1 unit at 50 €, travel 10 km at 0.50 € on two days
    assert_eq!(snapshot.units_total(), Money::new(dec!(150)));
    assert_eq!(snapshot.travel_total(), Money::new(dec!(10)));
    assert_eq!(snapshot.total, Money::new(dec!(160)));
    assert!(snapshot.invoice_number.as_str().starts_with("AB"));
    assert!(outcome.has_full_coverage());
}

#[tokio::test]
async fn test_compute_billing_is_idempotent() {
    let h = harness();
    let customer = seed_reference_customer(&h);

    let first = reference_outcome(&h, customer).await;
    let second = reference_outcome(&h, customer).await;

    assert_eq!(first, second);
}

#[tokio::test]
async fn test_compute_billing_unknown_customer_is_not_found() {
    let h = harness();

    let result = h
        .engine
        .compute_billing(CustomerId::new(404), TemporalFixtures::january_2025())
        .await;

    assert!(matches!(result, Err(BillingError::NotFound(_))));
}

#[tokio::test]
async fn test_billing_across_version_boundary_prices_per_day() {
    let h = harness();
    let customer = seed_reference_customer(&h);
    h.visits.insert(
        VisitBuilder::new(customer.value())
            .with_id(3)
            .at(TemporalFixtures::morning_visit(2025, 2, 2))
            .with_units(1)
            .build(),
    );

    h.engine
        .version_rate(
            customer,
            RateFixtures::raised_terms(),
            chrono::NaiveDate::from_ymd_opt(2025, 2, 1).unwrap(),
        )
        .await
        .unwrap();

    let range = DateRange::new(
        chrono::NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
        chrono::NaiveDate::from_ymd_opt(2025, 2, 28).unwrap(),
    )
    .unwrap();
    let outcome = h.engine.compute_billing(customer, range).await.unwrap();

    // January visits at 50 €, the February visit at 60 €, travel on
    // three distinct days
    assert_eq!(outcome.snapshot.units_total(), Money::new(dec!(210)));
    assert_eq!(outcome.snapshot.travel_total(), Money::new(dec!(15)));
    assert_eq!(outcome.snapshot.total, Money::new(dec!(225)));
}

// ============================================================================
// Paid-lock protocol
// ============================================================================

#[tokio::test]
async fn test_submit_pay_resubmit_is_locked_and_total_unchanged() {
    let h = harness();
    let customer = seed_reference_customer(&h);
    let outcome = reference_outcome(&h, customer).await;
    let number = outcome.snapshot.invoice_number.clone();

    assert_eq!(
        h.engine.submit(&outcome.snapshot).await.unwrap(),
        SubmitOutcome::Created
    );
    h.engine.mark_paid(&number).await.unwrap();

    let result = h.engine.submit(&outcome.snapshot).await;
    assert!(matches!(result, Err(BillingError::Locked(_))));

    let stored = h.invoices.get(&number).await.unwrap().unwrap();
    assert_eq!(stored.status, InvoiceStatus::Paid);
    assert_eq!(stored.total, Money::new(dec!(160)));
}

#[tokio::test]
async fn test_resubmission_while_unpaid_overwrites_total() {
    let h = harness();
    let customer = seed_reference_customer(&h);

    let first = reference_outcome(&h, customer).await;
    assert_eq!(
        h.engine.submit(&first.snapshot).await.unwrap(),
        SubmitOutcome::Created
    );

    // A late-recorded visit changes the period's total; same generation
    // month, same invoice number
    h.visits.insert(
        VisitBuilder::new(customer.value())
            .with_id(3)
            .at(TemporalFixtures::afternoon_visit(2025, 1, 6))
            .with_units(2)
            .build(),
    );
    let second = reference_outcome(&h, customer).await;
    assert_eq!(second.snapshot.invoice_number, first.snapshot.invoice_number);

    assert_eq!(
        h.engine.submit(&second.snapshot).await.unwrap(),
        SubmitOutcome::Replaced
    );

    let stored = h
        .invoices
        .get(&first.snapshot.invoice_number)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored.total, second.snapshot.total);
    assert_ne!(first.snapshot.total, second.snapshot.total);
}

#[tokio::test]
async fn test_generate_invoice_combined_flow() {
    let h = harness();
    let customer = seed_reference_customer(&h);

    let outcome = h
        .engine
        .generate_invoice(customer, TemporalFixtures::january_2025())
        .await
        .unwrap();
    let number = outcome.snapshot.invoice_number.clone();

    let stored = h.invoices.get(&number).await.unwrap().unwrap();
    assert_eq!(stored.total, Money::new(dec!(160)));
    assert_eq!(stored.status, InvoiceStatus::Draft);

    h.engine.mark_paid(&number).await.unwrap();

    // The pre-flight check rejects before recomputation
    let locked = h
        .engine
        .generate_invoice(customer, TemporalFixtures::january_2025())
        .await;
    assert!(matches!(locked, Err(BillingError::Locked(_))));

    let untouched = h.invoices.get(&number).await.unwrap().unwrap();
    assert_eq!(untouched.total, Money::new(dec!(160)));
}

#[tokio::test]
async fn test_mark_paid_unknown_invoice_is_not_found() {
    let h = harness();
    seed_reference_customer(&h);

    let result = h
        .engine
        .mark_paid(&core_kernel::InvoiceNumber::from_raw("ZZ99-12"))
        .await;

    assert!(matches!(result, Err(BillingError::NotFound(_))));
}

#[tokio::test]
async fn test_is_paid_absent_invoice_is_false() {
    let h = harness();

    let paid = h
        .engine
        .is_paid(&core_kernel::InvoiceNumber::from_raw("ZZ99-12"))
        .await
        .unwrap();

    assert!(!paid);
}

#[tokio::test]
async fn test_list_unpaid_newest_first_and_excludes_paid() {
    let h = harness();
    let praxis = seed_reference_customer(&h);

    let werkhof = CustomerFixtures::werkhof_nord();
    let werkhof_id = werkhof.id;
    h.invoices
        .register_customer_name(werkhof_id, werkhof.name.clone());
    h.customers.insert(werkhof);
    h.rates.seed(
        test_utils::RateConditionBuilder::new(werkhof_id.value())
            .with_id(10)
            .with_price(dec!(80))
            .build(),
    );
    h.visits.insert(
        VisitBuilder::new(werkhof_id.value())
            .with_id(20)
            .at(TemporalFixtures::morning_visit(2025, 1, 10))
            .build(),
    );

    let praxis_outcome = h
        .engine
        .generate_invoice(praxis, TemporalFixtures::january_2025())
        .await
        .unwrap();
    let werkhof_outcome = h
        .engine
        .generate_invoice(werkhof_id, TemporalFixtures::january_2025())
        .await
        .unwrap();

    let unpaid = h.engine.list_unpaid().await.unwrap();
    assert_eq!(unpaid.len(), 2);
    // Newest first
    assert_eq!(unpaid[0].number, werkhof_outcome.snapshot.invoice_number);
    assert_eq!(unpaid[0].customer_name, "Werkhof Nord");
    assert_eq!(unpaid[1].number, praxis_outcome.snapshot.invoice_number);

    h.engine
        .mark_paid(&praxis_outcome.snapshot.invoice_number)
        .await
        .unwrap();

    let unpaid = h.engine.list_unpaid().await.unwrap();
    assert_eq!(unpaid.len(), 1);
    assert_eq!(unpaid[0].number, werkhof_outcome.snapshot.invoice_number);
}

// ============================================================================
// Rate versioning and correction
// ============================================================================

#[tokio::test]
async fn test_version_rate_keeps_exactly_one_open_condition() {
    let h = harness();
    let customer = seed_reference_customer(&h);

    let february = chrono::NaiveDate::from_ymd_opt(2025, 2, 1).unwrap();
    h.engine
        .version_rate(customer, RateFixtures::raised_terms(), february)
        .await
        .unwrap();

    let conditions = h.rates.conditions_for(customer).await.unwrap();
    assert_eq!(conditions.len(), 2);

    let open: Vec<_> = conditions.iter().filter(|c| c.is_open()).collect();
    assert_eq!(open.len(), 1);
    assert_eq!(open[0].validity.valid_from, february);
    assert_eq!(open[0].terms.price_per_unit, Money::new(dec!(60)));

    // The historical condition keeps its original start and is closed the
    // day before the successor
    let closed = conditions.iter().find(|c| !c.is_open()).unwrap();
    assert_eq!(
        closed.validity.valid_from,
        chrono::NaiveDate::from_ymd_opt(2025, 1, 1).unwrap()
    );
    assert_eq!(
        closed.validity.valid_until,
        Some(chrono::NaiveDate::from_ymd_opt(2025, 1, 31).unwrap())
    );
}

#[tokio::test]
async fn test_version_rate_twice_leaves_single_open_condition() {
    let h = harness();
    let customer = seed_reference_customer(&h);

    h.engine
        .version_rate(
            customer,
            RateFixtures::raised_terms(),
            chrono::NaiveDate::from_ymd_opt(2025, 2, 1).unwrap(),
        )
        .await
        .unwrap();
    h.engine
        .version_rate(
            customer,
            RateFixtures::standard_terms(),
            chrono::NaiveDate::from_ymd_opt(2025, 6, 1).unwrap(),
        )
        .await
        .unwrap();

    let conditions = h.rates.conditions_for(customer).await.unwrap();
    assert_eq!(conditions.len(), 3);
    assert_eq!(conditions.iter().filter(|c| c.is_open()).count(), 1);
}

#[tokio::test]
async fn test_version_rate_non_monotonic_valid_from_is_conflict() {
    let h = harness();
    let customer = seed_reference_customer(&h);

    // The open condition starts Jan 1, 2025; versioning on the same day
    // (or earlier) would overlap retroactively
    let result = h
        .engine
        .version_rate(
            customer,
            RateFixtures::raised_terms(),
            chrono::NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
        )
        .await;

    assert!(matches!(result, Err(BillingError::Conflict { .. })));

    let conditions = h.rates.conditions_for(customer).await.unwrap();
    assert_eq!(conditions.len(), 1);
    assert!(conditions[0].is_open());
}

#[tokio::test]
async fn test_version_rate_unknown_customer_is_not_found() {
    let h = harness();

    let result = h
        .engine
        .version_rate(
            CustomerId::new(404),
            RateFixtures::standard_terms(),
            chrono::NaiveDate::from_ymd_opt(2025, 2, 1).unwrap(),
        )
        .await;

    assert!(matches!(result, Err(BillingError::NotFound(_))));
}

#[tokio::test]
async fn test_correct_rate_updates_in_place_without_history() {
    let h = harness();
    let customer = seed_reference_customer(&h);

    let corrected = h
        .engine
        .correct_rate(customer, RateFixtures::raised_terms())
        .await
        .unwrap();

    // Same row, same validity, new numbers: a typo fix, not a version
    let conditions = h.rates.conditions_for(customer).await.unwrap();
    assert_eq!(conditions.len(), 1);
    assert_eq!(conditions[0].id, corrected.id);
    assert_eq!(
        conditions[0].validity.valid_from,
        chrono::NaiveDate::from_ymd_opt(2025, 1, 1).unwrap()
    );
    assert!(conditions[0].is_open());
    assert_eq!(conditions[0].terms.price_per_unit, Money::new(dec!(60)));
}

#[tokio::test]
async fn test_correct_rate_without_open_condition_is_not_found() {
    let h = harness();
    let customer = CustomerFixtures::praxis_sonnenhof();
    let id = customer.id;
    h.customers.insert(customer);

    let result = h
        .engine
        .correct_rate(id, RateFixtures::standard_terms())
        .await;

    assert!(matches!(result, Err(BillingError::NotFound(_))));
}

// ============================================================================
// Retry behavior
// ============================================================================

#[tokio::test]
async fn test_transient_store_faults_are_retried() {
    let h = harness();
    seed_reference_customer(&h);

    // Two injected faults, three attempts allowed: the call succeeds
    h.invoices.fail_next(2);
    let paid = h
        .engine
        .is_paid(&core_kernel::InvoiceNumber::from_raw("AB25-01"))
        .await
        .unwrap();

    assert!(!paid);
}

#[tokio::test]
async fn test_retries_are_bounded() {
    let h = harness();
    seed_reference_customer(&h);

    // More faults than attempts: the store error surfaces
    h.invoices.fail_next(5);
    let result = h
        .engine
        .is_paid(&core_kernel::InvoiceNumber::from_raw("AB25-01"))
        .await;

    assert!(matches!(result, Err(BillingError::Store(_))));
}

#[tokio::test]
async fn test_lock_still_rejects_after_transient_retries() {
    let h = harness();
    let customer = seed_reference_customer(&h);
    let outcome = reference_outcome(&h, customer).await;

    h.engine.submit(&outcome.snapshot).await.unwrap();
    h.engine
        .mark_paid(&outcome.snapshot.invoice_number)
        .await
        .unwrap();

    // Transient faults are retried; the lock verdict behind them is
    // terminal, not retried
    h.invoices.fail_next(2);
    let result = h.engine.submit(&outcome.snapshot).await;

    assert!(matches!(result, Err(BillingError::Locked(_))));
}
