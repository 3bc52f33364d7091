use std::ops::Neg;

use bigdecimal::{BigDecimal, Zero};
use diesel::{Connection, PgConnection};

use crate::account::{self, Account, NewAccount};
use crate::db;
use crate::error::{Entity, Error, ErrorKind, Result};
use crate::transaction::{self, NewTransaction, Transaction, TransactionKind};
use crate::types::Id;
use crate::user;

/// Service enforcing the account ledger invariants
///
/// Every operation takes the authenticated user id and re-verifies it
/// against the stored row's owner; callers are never trusted to have
/// pre-filtered. A balance mutation and the transaction row recording it
/// are written in one database transaction, with the account row locked
/// for the duration of the read-modify-write.
pub struct Ledger {
	db: db::PgPool,
	users: user::Repo,
	accounts: account::Repo,
	transactions: transaction::Repo,
}

impl Ledger {
	pub fn new(db: db::PgPool) -> Self {
		Ledger {
			db,
			users: user::Repo,
			accounts: account::Repo,
			transactions: transaction::Repo,
		}
	}

	/// Open a zero-balance account for the user
	pub fn open_account(&self, user_id: Id, currency: &str) -> Result<Account> {
		let conn = self.db.get()?;
		self.find_user(&conn, user_id)?;

		self.accounts
			.create(&conn, NewAccount {
				user_id,
				balance: BigDecimal::zero(),
				currency,
			})
			.map_err(Into::into)
	}

	pub fn accounts(&self, user_id: Id) -> Result<Vec<Account>> {
		let conn = self.db.get()?;
		self.find_user(&conn, user_id)?;

		self.accounts.find_by_user(&conn, user_id).map_err(Into::into)
	}

	/// Credit funds to an account the user owns
	pub fn deposit(&self, user_id: Id, account_id: Id, amount: &BigDecimal) -> Result<Account> {
		validate_amount(amount)?;

		let conn = self.db.get()?;
		conn.transaction::<Account, Error, _>(|| {
			let account = self.own_account_for_update(&conn, user_id, account_id)?;

			let account = self.accounts.add_to_balance(&conn, account.id, amount)?;
			self.transactions.create(&conn, NewTransaction {
				account_id,
				amount,
				kind: TransactionKind::Deposit,
				description: String::from("Deposit"),
			})?;

			Ok(account)
		})
	}

	/// Debit funds from an account the user owns
	pub fn withdraw(&self, user_id: Id, account_id: Id, amount: &BigDecimal) -> Result<Account> {
		validate_amount(amount)?;

		let conn = self.db.get()?;
		conn.transaction::<Account, Error, _>(|| {
			let account = self.own_account_for_update(&conn, user_id, account_id)?;
			if account.balance.lt(amount) {
				return Err(Error::new(ErrorKind::InsufficientFunds));
			}

			let debit = amount.neg();
			let account = self.accounts.add_to_balance(&conn, account.id, &debit)?;
			self.transactions.create(&conn, NewTransaction {
				account_id,
				amount: &debit,
				kind: TransactionKind::Withdrawal,
				description: String::from("Withdrawal"),
			})?;

			Ok(account)
		})
	}

	/// Move funds from one of the user's accounts to another account
	///
	/// Both balance updates and both ledger rows commit as one unit; an
	/// error at any point leaves no trace of the transfer. The rows are
	/// locked in ascending id order so two opposite-direction transfers
	/// cannot deadlock.
	pub fn transfer(&self, user_id: Id, from_id: Id, to_id: Id, amount: &BigDecimal) -> Result<(Account, Account)> {
		validate_amount(amount)?;
		if from_id == to_id {
			return Err(Error::new(ErrorKind::SameAccount));
		}

		let conn = self.db.get()?;
		conn.transaction::<(Account, Account), Error, _>(|| {
			let (low, high) = if from_id < to_id { (from_id, to_id) } else { (to_id, from_id) };
			let first = self.account_for_update(&conn, low)?;
			let second = self.account_for_update(&conn, high)?;
			let (from, to) = if first.id == from_id { (first, second) } else { (second, first) };

			if from.user_id != user_id {
				return Err(Error::new(ErrorKind::Unauthorized));
			}
			if from.balance.lt(amount) {
				return Err(Error::new(ErrorKind::InsufficientFunds));
			}

			let debit = amount.neg();
			let from = self.accounts.add_to_balance(&conn, from.id, &debit)?;
			let to = self.accounts.add_to_balance(&conn, to.id, amount)?;

			self.transactions.create(&conn, NewTransaction {
				account_id: from.id,
				amount: &debit,
				kind: TransactionKind::TransferOut,
				description: format!("Transfer to account {}", to.id),
			})?;
			self.transactions.create(&conn, NewTransaction {
				account_id: to.id,
				amount,
				kind: TransactionKind::TransferIn,
				description: format!("Transfer from account {}", from.id),
			})?;

			Ok((from, to))
		})
	}

	/// The account's ledger entries, newest first
	pub fn transactions(&self, user_id: Id, account_id: Id) -> Result<Vec<Transaction>> {
		let conn = self.db.get()?;
		let account = self.find_account(&conn, account_id)?;
		if account.user_id != user_id {
			return Err(Error::new(ErrorKind::Unauthorized));
		}

		self.transactions.find_by_account(&conn, account_id).map_err(Into::into)
	}

	fn find_user(&self, conn: &PgConnection, user_id: Id) -> Result<user::User> {
		match self.users.find_by_id(conn, user_id) {
			Err(db::Error::RecordNotFound) => Err(Error::not_found(Entity::User)),
			other => other.map_err(Into::into),
		}
	}

	fn find_account(&self, conn: &PgConnection, account_id: Id) -> Result<Account> {
		match self.accounts.find_by_id(conn, account_id) {
			Err(db::Error::RecordNotFound) => Err(Error::not_found(Entity::Account)),
			other => other.map_err(Into::into),
		}
	}

	fn account_for_update(&self, conn: &PgConnection, account_id: Id) -> Result<Account> {
		match self.accounts.lock(conn, account_id) {
			Err(db::Error::RecordNotFound) => Err(Error::not_found(Entity::Account)),
			other => other.map_err(Into::into),
		}
	}

	fn own_account_for_update(&self, conn: &PgConnection, user_id: Id, account_id: Id) -> Result<Account> {
		let account = self.account_for_update(conn, account_id)?;
		if account.user_id != user_id {
			return Err(Error::new(ErrorKind::Unauthorized));
		}
		Ok(account)
	}
}

fn validate_amount(amount: &BigDecimal) -> Result<()> {
	if amount.le(&BigDecimal::zero()) {
		return Err(Error::validation("amount must be positive"));
	}
	Ok(())
}
