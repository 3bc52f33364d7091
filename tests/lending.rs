// These tests drive the credit service against a live Postgres reachable
// at DATABASE_URL with the bank schema loaded. Run them with
// `cargo test -- --ignored --test-threads=1`.

mod common;

use std::str::FromStr;

use bigdecimal::{BigDecimal, Zero};
use chrono::NaiveDate;

use bank_service::*;

use crate::common::{FixedCalendar, Fixture};

#[test]
#[ignore]
fn credit_issues_a_full_annuity_schedule() {
	let f = Fixture::new();
	let bob = f.bob();
	let calendar = FixedCalendar(NaiveDate::from_ymd(2025, 1, 15));
	let service = Credits::new(f.pool.clone(), &calendar);

	let principal = BigDecimal::from(120_000);
	let rate = BigDecimal::from(12);
	let credit = service.create_credit(bob.id, &principal, &rate, 12).unwrap();

	assert_eq!(credit.user_id, bob.id);
	assert_eq!(credit.principal, principal);
	assert_eq!(credit.term_months, 12);

	let schedule = service.payment_schedules(bob.id, credit.id).unwrap();
	assert_eq!(schedule.len(), 12);

	let payment = BigDecimal::from_str("10661.85").unwrap();
	let mut total = BigDecimal::zero();
	for (i, row) in schedule.iter().enumerate() {
		assert_eq!(row.credit_id, credit.id);
		assert_eq!(row.amount, payment, "installment {}", i + 1);
		assert!(!row.paid);
		assert_eq!(row.penalty, BigDecimal::zero());
		assert_eq!(row.due_date, NaiveDate::from_ymd(2025, 1, 15).add_months(i as u32 + 1));
		total = total + &row.amount;
	}

	// first installment one month out, last one a year out
	assert_eq!(schedule[0].due_date, NaiveDate::from_ymd(2025, 2, 15));
	assert_eq!(schedule[11].due_date, NaiveDate::from_ymd(2026, 1, 15));

	// interest makes the plan cost more than the principal
	assert!(total.gt(&principal));
}

#[test]
#[ignore]
fn zero_rate_credit_splits_principal_evenly() {
	let f = Fixture::new();
	let bob = f.bob();
	let calendar = FixedCalendar(NaiveDate::from_ymd(2025, 3, 1));
	let service = Credits::new(f.pool.clone(), &calendar);

	let credit = service
		.create_credit(bob.id, &BigDecimal::from(120_000), &BigDecimal::zero(), 12)
		.unwrap();

	let schedule = service.payment_schedules(bob.id, credit.id).unwrap();
	assert_eq!(schedule.len(), 12);
	for row in &schedule {
		assert_eq!(row.amount, BigDecimal::from(10_000));
	}
}

#[test]
#[ignore]
fn due_dates_clamp_to_short_months() {
	let f = Fixture::new();
	let bob = f.bob();
	let calendar = FixedCalendar(NaiveDate::from_ymd(2025, 1, 31));
	let service = Credits::new(f.pool.clone(), &calendar);

	let credit = service
		.create_credit(bob.id, &BigDecimal::from(1_200), &BigDecimal::zero(), 3)
		.unwrap();

	let schedule = service.payment_schedules(bob.id, credit.id).unwrap();
	assert_eq!(schedule[0].due_date, NaiveDate::from_ymd(2025, 2, 28));
	assert_eq!(schedule[1].due_date, NaiveDate::from_ymd(2025, 3, 31));
	assert_eq!(schedule[2].due_date, NaiveDate::from_ymd(2025, 4, 30));
}

#[test]
#[ignore]
fn credit_validation_rejects_bad_terms() {
	let f = Fixture::new();
	let bob = f.bob();
	let calendar = FixedCalendar(NaiveDate::from_ymd(2025, 1, 15));
	let service = Credits::new(f.pool.clone(), &calendar);

	let principal = BigDecimal::from(1_000);
	let rate = BigDecimal::from(10);

	let err = service.create_credit(bob.id, &BigDecimal::zero(), &rate, 12).unwrap_err();
	assert_eq!(err, Error::validation("principal must be positive"));

	let err = service.create_credit(bob.id, &principal, &BigDecimal::from(101), 12).unwrap_err();
	assert_eq!(err, Error::validation("interest rate must be between 0 and 100"));

	let err = service.create_credit(bob.id, &principal, &BigDecimal::from(-1), 12).unwrap_err();
	assert_eq!(err, Error::validation("interest rate must be between 0 and 100"));

	let err = service.create_credit(bob.id, &principal, &rate, 0).unwrap_err();
	assert_eq!(err, Error::validation("term months must be positive"));

	let credits = service.credits(bob.id).unwrap();
	assert!(credits.is_empty());
}

#[test]
#[ignore]
fn credit_for_unknown_user_is_not_found() {
	let f = Fixture::new();
	let calendar = FixedCalendar(NaiveDate::from_ymd(2025, 1, 15));
	let service = Credits::new(f.pool.clone(), &calendar);

	let err = service
		.create_credit(404, &BigDecimal::from(1_000), &BigDecimal::from(10), 12)
		.unwrap_err();
	assert_eq!(err, Error::not_found(Entity::User));
}

#[test]
#[ignore]
fn credits_listing_is_per_user() {
	let f = Fixture::new();
	let bob = f.bob();
	let lucy = f.lucy();
	let calendar = FixedCalendar(NaiveDate::from_ymd(2025, 1, 15));
	let service = Credits::new(f.pool.clone(), &calendar);

	service.create_credit(bob.id, &BigDecimal::from(1_000), &BigDecimal::from(10), 6).unwrap();
	service.create_credit(bob.id, &BigDecimal::from(2_000), &BigDecimal::from(5), 12).unwrap();

	assert_eq!(service.credits(bob.id).unwrap().len(), 2);
	assert!(service.credits(lucy.id).unwrap().is_empty());
}

#[test]
#[ignore]
fn schedules_of_foreign_credit_are_unauthorized() {
	let f = Fixture::new();
	let bob = f.bob();
	let lucy = f.lucy();
	let calendar = FixedCalendar(NaiveDate::from_ymd(2025, 1, 15));
	let service = Credits::new(f.pool.clone(), &calendar);

	let credit = service
		.create_credit(bob.id, &BigDecimal::from(1_000), &BigDecimal::from(10), 6)
		.unwrap();

	let err = service.payment_schedules(lucy.id, credit.id).unwrap_err();
	assert_eq!(err, Error::new(ErrorKind::Unauthorized));

	let err = service.payment_schedules(bob.id, 404).unwrap_err();
	assert_eq!(err, Error::not_found(Entity::Credit));
}
