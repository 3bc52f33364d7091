use bigdecimal::BigDecimal;
use diesel::prelude::*;
use diesel::r2d2::ConnectionManager;
use diesel::PgConnection;
use r2d2::PooledConnection;

use bank_service::account::NewAccount;
use bank_service::schema::{accounts, users};
use bank_service::user::NewUser;
use bank_service::*;

/// Shared state for integration tests: a pool against the database named
/// by `DATABASE_URL`, plus factories for the rows most tests need.
///
/// Creating a fixture wipes every table, so tests must run with
/// `--test-threads=1`.
pub struct Fixture {
	pub pool: PgPool,
}

impl Fixture {
	pub fn new() -> Self {
		let fixture = Fixture { pool: pg_connection() };
		fixture.teardown();
		fixture
	}

	pub fn conn(&self) -> PooledConnection<ConnectionManager<PgConnection>> {
		self.pool.get().unwrap()
	}

	pub fn user(&self, username: &str, email: &str) -> User {
		diesel::insert_into(users::table)
			.values(NewUser {
				username,
				email,
				password_hash: "$2b$12$fixture-password-digest",
			})
			.get_result(&self.conn())
			.unwrap()
	}

	pub fn bob(&self) -> User {
		self.user("bob", "bob@gmail.com")
	}

	pub fn lucy(&self) -> User {
		self.user("lucy", "lucy@gmail.com")
	}

	pub fn account(&self, user_id: Id) -> Account {
		diesel::insert_into(accounts::table)
			.values(NewAccount {
				user_id,
				balance: BigDecimal::from(0),
				currency: "USD",
			})
			.get_result(&self.conn())
			.unwrap()
	}

	/// An account seeded with a balance directly, bypassing the ledger
	pub fn account_with_balance(&self, user_id: Id, balance: u32) -> Account {
		let account = self.account(user_id);
		diesel::update(accounts::table.find(account.id))
			.set(accounts::balance.eq(BigDecimal::from(balance)))
			.get_result(&self.conn())
			.unwrap()
	}

	pub fn teardown(&self) {
		let tables = vec![
			"payment_schedules",
			"credits",
			"cards",
			"transactions",
			"accounts",
			"users",
		];
		for table in tables {
			diesel::sql_query(format!("DELETE FROM {}", table))
				.execute(&self.conn())
				.expect("deleting db table");
		}
	}
}

/// Calendar pinned to a fixed date so schedules are deterministic
pub struct FixedCalendar(pub Date);

impl Calendar for FixedCalendar {
	fn current_date(&self) -> Date {
		self.0
	}
}
