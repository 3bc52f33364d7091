use bigdecimal::BigDecimal;
use diesel::prelude::*;
use diesel::PgConnection;

use crate::db;
use crate::schema::accounts;
use crate::types::{Id, Time};
use crate::user;

/// A customer account holding funds in a single currency
///
/// The balance is only ever mutated by the ledger service, together with
/// the transaction row that justifies the change.
#[derive(Queryable, Identifiable, Associations, PartialEq, Debug)]
#[belongs_to(user::User)]
pub struct Account {
	pub id: Id,
	pub user_id: Id,
	pub balance: BigDecimal,
	pub currency: String,
	pub created_at: Time,
	pub updated_at: Time,
}

#[derive(Insertable)]
#[table_name = "accounts"]
pub struct NewAccount<'a> {
	pub user_id: Id,
	pub balance: BigDecimal,
	pub currency: &'a str,
}

pub struct Repo;

impl Repo {
	pub fn create(&self, conn: &PgConnection, new_account: NewAccount) -> db::Result<Account> {
		diesel::insert_into(accounts::table)
			.values(&new_account)
			.get_result(conn)
			.map_err(Into::into)
	}

	pub fn find_by_id(&self, conn: &PgConnection, id: Id) -> db::Result<Account> {
		accounts::table
			.find(id)
			.first(conn)
			.map_err(Into::into)
	}

	pub fn find_by_user(&self, conn: &PgConnection, user_id: Id) -> db::Result<Vec<Account>> {
		accounts::table
			.filter(accounts::user_id.eq(user_id))
			.order(accounts::id.asc())
			.load(conn)
			.map_err(Into::into)
	}

	/// Read an account and hold a row lock on it until the enclosing
	/// transaction ends. Serializes every balance read-modify-write on
	/// the same account row.
	pub fn lock(&self, conn: &PgConnection, id: Id) -> db::Result<Account> {
		accounts::table
			.find(id)
			.for_update()
			.first(conn)
			.map_err(Into::into)
	}

	/// Apply a signed delta to the stored balance. Debits pass a
	/// negative delta; the funds check belongs to the caller, under the
	/// row lock.
	pub fn add_to_balance(&self, conn: &PgConnection, id: Id, delta: &BigDecimal) -> db::Result<Account> {
		diesel::update(accounts::table)
			.filter(accounts::id.eq(id))
			.set((
				accounts::balance.eq(accounts::balance + delta),
				accounts::updated_at.eq(diesel::dsl::now),
			))
			.get_result(conn)
			.map_err(Into::into)
	}
}
