use diesel::prelude::*;
use diesel::PgConnection;

use crate::db;
use crate::schema::users;
use crate::types::{Id, Time};

/// A registered customer
///
/// Registration and login live at the service boundary; the core only
/// reads users to verify existence and ownership.
#[derive(Queryable, Identifiable, PartialEq, Debug)]
pub struct User {
	pub id: Id,
	pub username: String,
	pub email: String,
	pub password_hash: String,
	pub created_at: Time,
	pub updated_at: Time,
}

#[derive(Insertable)]
#[table_name = "users"]
pub struct NewUser<'a> {
	pub username: &'a str,
	pub email: &'a str,
	pub password_hash: &'a str,
}

/// Data store for users
///
/// Methods take the caller's connection so the caller decides the
/// transaction boundary.
pub struct Repo;

impl Repo {
	pub fn create(&self, conn: &PgConnection, new_user: NewUser) -> db::Result<User> {
		diesel::insert_into(users::table)
			.values(&new_user)
			.get_result(conn)
			.map_err(Into::into)
	}

	pub fn find_by_id(&self, conn: &PgConnection, id: Id) -> db::Result<User> {
		users::table
			.find(id)
			.first(conn)
			.map_err(Into::into)
	}

	pub fn find_by_email(&self, conn: &PgConnection, email: &str) -> db::Result<User> {
		users::table
			.filter(users::email.eq(email))
			.first(conn)
			.map_err(Into::into)
	}
}
