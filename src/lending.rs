use std::ops::{Div, Mul};

use bigdecimal::{BigDecimal, Zero};
use diesel::{Connection, PgConnection};

use crate::credit::{self, Credit, NewCredit, NewPayment, PaymentSchedule};
use crate::db;
use crate::error::{Entity, Error, ErrorKind, Result};
use crate::types::{Date, DateExt, Id};
use crate::user;

/// Source of the issue date for new credits
///
/// Stubbed in tests to pin schedules to a known date.
pub trait Calendar {
	fn current_date(&self) -> Date {
		chrono::Utc::today().naive_utc()
	}
}

/// The system clock calendar
pub struct Today;

impl Calendar for Today {}

// Fractional digits carried through intermediate annuity arithmetic.
// Truncation at this scale stays orders of magnitude below a cent over
// any plausible term.
const RATE_SCALE: i64 = 32;

/// Service issuing installment credits and their repayment plans
pub struct Credits<'a> {
	db: db::PgPool,
	users: user::Repo,
	credits: credit::Repo,
	payments: credit::PaymentRepo,
	calendar: &'a dyn Calendar,
}

impl<'a> Credits<'a> {
	pub fn new(db: db::PgPool, calendar: &'a dyn Calendar) -> Self {
		Credits {
			db,
			users: user::Repo,
			credits: credit::Repo,
			payments: credit::PaymentRepo,
			calendar,
		}
	}

	/// Issue a credit and persist its full repayment schedule
	///
	/// The credit row and all `term_months` schedule rows are written in
	/// one transaction; a failure on any row leaves nothing behind. The
	/// first installment falls due one month after the issue date, the
	/// rest at one-month increments, all for the same annuity amount.
	pub fn create_credit(
		&self,
		user_id: Id,
		principal: &BigDecimal,
		annual_rate_percent: &BigDecimal,
		term_months: i32,
	) -> Result<Credit> {
		if principal.le(&BigDecimal::zero()) {
			return Err(Error::validation("principal must be positive"));
		}
		if annual_rate_percent.lt(&BigDecimal::zero()) || annual_rate_percent.gt(&BigDecimal::from(100)) {
			return Err(Error::validation("interest rate must be between 0 and 100"));
		}
		if term_months <= 0 {
			return Err(Error::validation("term months must be positive"));
		}

		let conn = self.db.get()?;
		self.find_user(&conn, user_id)?;

		let payment = monthly_payment(principal, annual_rate_percent, term_months);
		let issue_date = self.calendar.current_date();

		conn.transaction::<Credit, Error, _>(|| {
			let credit = self.credits.create(&conn, NewCredit {
				user_id,
				principal,
				interest_rate: annual_rate_percent,
				term_months,
			})?;

			let rows: Vec<NewPayment> = (1..=term_months as u32)
				.map(|month| NewPayment {
					credit_id: credit.id,
					due_date: issue_date.add_months(month),
					amount: payment.clone(),
					paid: false,
					penalty: BigDecimal::zero(),
				})
				.collect();
			self.payments.create_batch(&conn, &rows)?;

			Ok(credit)
		})
	}

	pub fn credits(&self, user_id: Id) -> Result<Vec<Credit>> {
		let conn = self.db.get()?;
		self.find_user(&conn, user_id)?;

		self.credits.find_by_user(&conn, user_id).map_err(Into::into)
	}

	/// The repayment plan for one of the user's credits, earliest due
	/// date first
	pub fn payment_schedules(&self, user_id: Id, credit_id: Id) -> Result<Vec<PaymentSchedule>> {
		let conn = self.db.get()?;
		let credit = match self.credits.find_by_id(&conn, credit_id) {
			Err(db::Error::RecordNotFound) => return Err(Error::not_found(Entity::Credit)),
			other => other?,
		};
		if credit.user_id != user_id {
			return Err(Error::new(ErrorKind::Unauthorized));
		}

		self.payments.find_by_credit(&conn, credit_id).map_err(Into::into)
	}

	fn find_user(&self, conn: &PgConnection, user_id: Id) -> Result<user::User> {
		match self.users.find_by_id(conn, user_id) {
			Err(db::Error::RecordNotFound) => Err(Error::not_found(Entity::User)),
			other => other.map_err(Into::into),
		}
	}
}

/// Fixed monthly payment that fully amortizes `principal` over
/// `term_months` at the given annual percentage rate (standard annuity
/// formula), rounded to cents.
pub fn monthly_payment(principal: &BigDecimal, annual_rate_percent: &BigDecimal, term_months: i32) -> BigDecimal {
	let monthly_rate = annual_rate_percent
		.div(&BigDecimal::from(1200))
		.with_scale(RATE_SCALE);
	if monthly_rate.is_zero() {
		return round_to_cents(&principal.div(&BigDecimal::from(term_months)));
	}

	let one = BigDecimal::from(1);
	let growth = compound(&(&one + &monthly_rate), term_months);
	let numerator = principal.mul(&monthly_rate).mul(&growth);
	let denominator = &growth - &one;

	round_to_cents(&numerator.div(&denominator))
}

// (base)^exponent by repeated multiplication, truncating intermediate
// scale so the digit count stays bounded over long terms.
fn compound(base: &BigDecimal, exponent: i32) -> BigDecimal {
	let mut acc = BigDecimal::from(1);
	for _ in 0..exponent {
		acc = (&acc * base).with_scale(RATE_SCALE);
	}
	acc
}

/// Round to two decimal places, half-up: add half a cent, then truncate.
/// `with_scale` truncates toward zero and every scheduled amount is
/// positive, so ties round up. Every installment of a schedule carries
/// the identical rounded amount.
fn round_to_cents(amount: &BigDecimal) -> BigDecimal {
	let half_cent = BigDecimal::from(5).div(&BigDecimal::from(1000));
	(amount + &half_cent).with_scale(2)
}

#[cfg(test)]
mod tests {
	use std::str::FromStr;

	use super::*;

	#[test]
	fn annuity_payment_at_twelve_percent() {
		let principal = BigDecimal::from(120_000);
		let rate = BigDecimal::from(12);

		let got = monthly_payment(&principal, &rate, 12);
		assert_eq!(got, BigDecimal::from_str("10661.85").unwrap());
	}

	#[test]
	fn annuity_payments_cover_more_than_principal() {
		let principal = BigDecimal::from(120_000);
		let rate = BigDecimal::from(12);

		let payment = monthly_payment(&principal, &rate, 12);
		let total = payment.mul(&BigDecimal::from(12));
		assert!(total.gt(&principal), "total {} should exceed principal {}", total, principal);
	}

	#[test]
	fn zero_rate_splits_principal_evenly() {
		let principal = BigDecimal::from(120_000);

		let got = monthly_payment(&principal, &BigDecimal::zero(), 12);
		assert_eq!(got, BigDecimal::from(10_000));
	}

	#[test]
	fn zero_rate_rounds_uneven_split() {
		let principal = BigDecimal::from(100);

		let got = monthly_payment(&principal, &BigDecimal::zero(), 3);
		assert_eq!(got, BigDecimal::from_str("33.33").unwrap());
	}

	#[test]
	fn rounding_is_half_up_at_two_decimals() {
		let cases = vec![
			("10.004", "10.00"),
			("10.0049", "10.00"),
			("10.005", "10.01"),
			("10.0051", "10.01"),
			("10.999", "11.00"),
		];
		for (input, want) in cases {
			let got = round_to_cents(&BigDecimal::from_str(input).unwrap());
			assert_eq!(got, BigDecimal::from_str(want).unwrap(), "rounding {}", input);
		}
	}

	#[test]
	fn compound_growth_is_exact_for_short_terms() {
		let base = BigDecimal::from_str("1.01").unwrap();
		let got = compound(&base, 2);
		assert_eq!(got, BigDecimal::from_str("1.0201").unwrap());
	}
}
