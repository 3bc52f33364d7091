use diesel::prelude::*;
use diesel::PgConnection;

use crate::account;
use crate::db;
use crate::schema::cards;
use crate::types::{Id, Time};

/// A payment card attached to an account
///
/// Sensitive fields are written once by the vault service: the CVV only
/// as a one-way digest, number and expiry covered by a keyed integrity
/// tag that is re-verified on every read.
#[derive(Queryable, Identifiable, Associations, PartialEq, Debug)]
#[belongs_to(account::Account)]
pub struct Card {
	pub id: Id,
	pub account_id: Id,
	pub card_number: String,
	pub expiry_date: String,
	/// bcrypt digest; the raw CVV is never stored
	pub cvv_hash: String,
	/// hex-encoded keyed hash over card_number + expiry_date
	pub integrity_tag: String,
	pub created_at: Time,
}

#[derive(Insertable)]
#[table_name = "cards"]
pub struct NewCard<'a> {
	pub account_id: Id,
	pub card_number: &'a str,
	pub expiry_date: &'a str,
	pub cvv_hash: String,
	pub integrity_tag: String,
}

pub struct Repo;

impl Repo {
	pub fn create(&self, conn: &PgConnection, new_card: NewCard) -> db::Result<Card> {
		diesel::insert_into(cards::table)
			.values(&new_card)
			.get_result(conn)
			.map_err(Into::into)
	}

	pub fn find_by_account(&self, conn: &PgConnection, account_id: Id) -> db::Result<Vec<Card>> {
		cards::table
			.filter(cards::account_id.eq(account_id))
			.order(cards::id.asc())
			.load(conn)
			.map_err(Into::into)
	}
}
