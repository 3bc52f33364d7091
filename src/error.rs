use std::error;
use std::fmt;

use crate::db;
use crate::types::Id;

pub type Result<T> = std::result::Result<T, Error>;

/// An error that can occur while operating on the bank core
#[derive(Debug, PartialEq)]
pub struct Error {
	kind: ErrorKind,
}

impl Error {
	pub fn new(kind: ErrorKind) -> Error {
		Error { kind }
	}

	pub fn validation<S: Into<String>>(msg: S) -> Error {
		Error::new(ErrorKind::Validation(msg.into()))
	}

	pub fn not_found(entity: Entity) -> Error {
		Error::new(ErrorKind::NotFound(entity))
	}

	pub fn kind(&self) -> &ErrorKind {
		&self.kind
	}
}

/// The kind of an error that can occur.
#[derive(Debug, PartialEq)]
pub enum ErrorKind {
	/// Malformed input: non-positive amount, out-of-range rate or term,
	/// malformed card fields
	Validation(String),
	NotFound(Entity),
	/// The caller does not own the referenced resource
	Unauthorized,
	InsufficientFunds,
	/// Transfer where source and destination are the same account
	SameAccount,
	/// A stored card failed verification against its integrity tag
	Integrity(Id),
	/// Key or password-hashing failure in the card vault
	Crypto(String),
	Database(db::Error),
}

/// Resource referenced by a `NotFound` error
#[derive(Debug, PartialEq, Clone, Copy)]
pub enum Entity {
	User,
	Account,
	Credit,
	Card,
}

impl fmt::Display for Entity {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		let name = match self {
			Entity::User => "user",
			Entity::Account => "account",
			Entity::Credit => "credit",
			Entity::Card => "card",
		};
		f.write_str(name)
	}
}

impl fmt::Display for Error {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		match &self.kind {
			ErrorKind::Validation(msg) => write!(f, "{}", msg),
			ErrorKind::NotFound(entity) => write!(f, "{} does not exist", entity),
			ErrorKind::Unauthorized => write!(f, "caller does not own this resource"),
			ErrorKind::InsufficientFunds => write!(f, "not enough funds in account"),
			ErrorKind::SameAccount => write!(f, "transfer source and destination are the same account"),
			ErrorKind::Integrity(card_id) => write!(f, "integrity check failed for card {}", card_id),
			ErrorKind::Crypto(msg) => write!(f, "crypto failure: {}", msg),
			ErrorKind::Database(e) => write!(f, "db error: {}", e),
		}
	}
}

impl error::Error for Error {}

impl From<db::Error> for Error {
	fn from(e: db::Error) -> Self {
		Error::new(ErrorKind::Database(e))
	}
}

impl From<r2d2::Error> for Error {
	fn from(e: r2d2::Error) -> Self {
		Error::new(ErrorKind::Database(db::Error::from(e)))
	}
}

impl From<diesel::result::Error> for Error {
	fn from(e: diesel::result::Error) -> Self {
		Error::new(ErrorKind::Database(db::Error::from(e)))
	}
}
