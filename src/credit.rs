use bigdecimal::BigDecimal;
use diesel::prelude::*;
use diesel::PgConnection;

use crate::db;
use crate::schema::{credits, payment_schedules};
use crate::types::{Date, Id, Time};
use crate::user;

/// An installment credit issued to a user
///
/// Immutable once created; the repayment plan lives in payment_schedules.
#[derive(Queryable, Identifiable, Associations, PartialEq, Debug)]
#[belongs_to(user::User)]
pub struct Credit {
	pub id: Id,
	pub user_id: Id,
	pub principal: BigDecimal,
	/// Annual interest rate in percent, 0 to 100
	pub interest_rate: BigDecimal,
	pub term_months: i32,
	pub created_at: Time,
}

#[derive(Insertable)]
#[table_name = "credits"]
pub struct NewCredit<'a> {
	pub user_id: Id,
	pub principal: &'a BigDecimal,
	pub interest_rate: &'a BigDecimal,
	pub term_months: i32,
}

/// One month's installment on a credit
#[derive(Queryable, Identifiable, Associations, PartialEq, Debug)]
#[belongs_to(Credit)]
pub struct PaymentSchedule {
	pub id: Id,
	pub credit_id: Id,
	pub due_date: Date,
	pub amount: BigDecimal,
	pub paid: bool,
	pub penalty: BigDecimal,
	pub created_at: Time,
}

#[derive(Insertable)]
#[table_name = "payment_schedules"]
pub struct NewPayment {
	pub credit_id: Id,
	pub due_date: Date,
	pub amount: BigDecimal,
	pub paid: bool,
	pub penalty: BigDecimal,
}

pub struct Repo;

impl Repo {
	pub fn create(&self, conn: &PgConnection, new_credit: NewCredit) -> db::Result<Credit> {
		diesel::insert_into(credits::table)
			.values(&new_credit)
			.get_result(conn)
			.map_err(Into::into)
	}

	pub fn find_by_id(&self, conn: &PgConnection, id: Id) -> db::Result<Credit> {
		credits::table
			.find(id)
			.first(conn)
			.map_err(Into::into)
	}

	pub fn find_by_user(&self, conn: &PgConnection, user_id: Id) -> db::Result<Vec<Credit>> {
		credits::table
			.filter(credits::user_id.eq(user_id))
			.order(credits::id.asc())
			.load(conn)
			.map_err(Into::into)
	}
}

pub struct PaymentRepo;

impl PaymentRepo {
	/// Insert a full repayment plan in one statement; either every row
	/// lands or none does.
	pub fn create_batch(&self, conn: &PgConnection, new_payments: &[NewPayment]) -> db::Result<Vec<PaymentSchedule>> {
		diesel::insert_into(payment_schedules::table)
			.values(new_payments)
			.get_results(conn)
			.map_err(Into::into)
	}

	/// The credit's installments, earliest due date first
	pub fn find_by_credit(&self, conn: &PgConnection, credit_id: Id) -> db::Result<Vec<PaymentSchedule>> {
		payment_schedules::table
			.filter(payment_schedules::credit_id.eq(credit_id))
			.order(payment_schedules::due_date.asc())
			.load(conn)
			.map_err(Into::into)
	}
}
