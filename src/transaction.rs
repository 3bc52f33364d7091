use std::str::FromStr;

use bigdecimal::BigDecimal;
use diesel::pg::Pg;
use diesel::{
	deserialize::{self, FromSql},
	prelude::*,
	serialize,
	serialize::{Output, ToSql},
	sql_types::Varchar,
	PgConnection,
};
use strum_macros::{Display, EnumString};

use crate::account;
use crate::db;
use crate::schema::transactions;
use crate::types::{Id, Time};

/// A single entry in an account's append-only ledger
///
/// Positive amounts credit the account, negative amounts debit it. A row
/// is written in the same transaction as the balance change it records
/// and is never updated afterwards.
#[derive(Queryable, Identifiable, Associations, PartialEq, Debug)]
#[belongs_to(account::Account)]
pub struct Transaction {
	pub id: Id,
	pub account_id: Id,
	pub amount: BigDecimal,
	pub kind: TransactionKind,
	pub description: String,
	pub created_at: Time,
}

#[derive(AsExpression, FromSqlRow, Eq, PartialEq, EnumString, Display, Debug, Clone, Copy)]
#[sql_type = "Varchar"]
#[strum(serialize_all = "snake_case")]
pub enum TransactionKind {
	Deposit,
	Withdrawal,
	TransferIn,
	TransferOut,
}

impl ToSql<Varchar, Pg> for TransactionKind {
	fn to_sql<W: std::io::Write>(&self, out: &mut Output<W, Pg>) -> serialize::Result {
		ToSql::<Varchar, Pg>::to_sql(&self.to_string(), out)
	}
}

impl FromSql<Varchar, Pg> for TransactionKind {
	fn from_sql(bytes: Option<&[u8]>) -> deserialize::Result<Self> {
		let bytes = bytes.ok_or_else(|| "error deserializing from varchar")?;
		let s = std::str::from_utf8(bytes)?;

		TransactionKind::from_str(s)
			.map_err(|_| format!("unrecognized transaction kind: {}", s).into())
	}
}

#[derive(Insertable)]
#[table_name = "transactions"]
pub struct NewTransaction<'a> {
	pub account_id: Id,
	pub amount: &'a BigDecimal,
	pub kind: TransactionKind,
	pub description: String,
}

/// Data store for ledger entries
pub struct Repo;

impl Repo {
	pub fn create(&self, conn: &PgConnection, new_transaction: NewTransaction) -> db::Result<Transaction> {
		diesel::insert_into(transactions::table)
			.values(&new_transaction)
			.get_result(conn)
			.map_err(Into::into)
	}

	/// The account's ledger, newest entry first
	pub fn find_by_account(&self, conn: &PgConnection, account_id: Id) -> db::Result<Vec<Transaction>> {
		transactions::table
			.filter(transactions::account_id.eq(account_id))
			.order((transactions::created_at.desc(), transactions::id.desc()))
			.load(conn)
			.map_err(Into::into)
	}
}
