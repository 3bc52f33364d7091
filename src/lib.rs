#[macro_use]
extern crate diesel;

pub mod schema;
pub mod types;
pub mod db;
pub mod error;
pub mod user;
pub mod account;
pub mod transaction;
pub mod credit;
pub mod card;
pub mod ledger;
pub mod lending;
pub mod vault;

pub use crate::account::Account;
pub use crate::card::Card;
pub use crate::credit::{Credit, PaymentSchedule};
pub use crate::db::{pg_connection, PgPool};
pub use crate::error::{Entity, Error, ErrorKind, Result};
pub use crate::ledger::Ledger;
pub use crate::lending::{Calendar, Credits, Today};
pub use crate::transaction::{Transaction, TransactionKind};
pub use crate::types::{Date, DateExt, Id, Time};
pub use crate::user::User;
pub use crate::vault::Vault;
