use diesel::PgConnection;
use hmac::{Hmac, Mac, NewMac};
use sha2::Sha256;

use crate::account::{self, Account};
use crate::card::{self, Card, NewCard};
use crate::db;
use crate::error::{Entity, Error, ErrorKind, Result};
use crate::types::Id;

type HmacSha256 = Hmac<Sha256>;

/// Integrity-protected storage for payment cards
///
/// Card number and expiry are covered by a keyed hash computed at write
/// time and re-verified on every read, so at-rest tampering or
/// corruption surfaces as an error instead of bad data. CVVs are stored
/// only as bcrypt digests.
pub struct Vault {
	db: db::PgPool,
	accounts: account::Repo,
	cards: card::Repo,
	key: Vec<u8>,
}

impl Vault {
	pub fn new(db: db::PgPool, key: &[u8]) -> Self {
		Vault {
			db,
			accounts: account::Repo,
			cards: card::Repo,
			key: key.to_vec(),
		}
	}

	/// Store a card on an account the user owns
	pub fn create_card(&self, user_id: Id, account_id: Id, number: &str, expiry: &str, cvv: &str) -> Result<Card> {
		validate_card_fields(number, expiry, cvv)?;

		let conn = self.db.get()?;
		self.own_account(&conn, user_id, account_id)?;

		let cvv_hash = bcrypt::hash(cvv, bcrypt::DEFAULT_COST)
			.map_err(|e| Error::new(ErrorKind::Crypto(e.to_string())))?;
		let integrity_tag = compute_tag(&self.key, number, expiry)?;

		self.cards
			.create(&conn, NewCard {
				account_id,
				card_number: number,
				expiry_date: expiry,
				cvv_hash,
				integrity_tag,
			})
			.map_err(Into::into)
	}

	/// The account's cards, each verified against its integrity tag
	///
	/// A single tampered row fails the whole read.
	pub fn cards(&self, user_id: Id, account_id: Id) -> Result<Vec<Card>> {
		let conn = self.db.get()?;
		self.own_account(&conn, user_id, account_id)?;

		let cards = self.cards.find_by_account(&conn, account_id)?;
		for card in &cards {
			verify_tag(&self.key, card)?;
		}
		Ok(cards)
	}

	fn own_account(&self, conn: &PgConnection, user_id: Id, account_id: Id) -> Result<Account> {
		let account = match self.accounts.find_by_id(conn, account_id) {
			Err(db::Error::RecordNotFound) => return Err(Error::not_found(Entity::Account)),
			other => other?,
		};
		if account.user_id != user_id {
			return Err(Error::new(ErrorKind::Unauthorized));
		}
		Ok(account)
	}
}

fn compute_tag(key: &[u8], number: &str, expiry: &str) -> Result<String> {
	let mut mac = new_mac(key)?;
	mac.update(number.as_bytes());
	mac.update(expiry.as_bytes());
	Ok(hex::encode(mac.finalize().into_bytes()))
}

// Constant-time comparison against the stored tag; an undecodable tag
// counts as tampering too.
fn verify_tag(key: &[u8], card: &Card) -> Result<()> {
	let stored = match hex::decode(&card.integrity_tag) {
		Ok(bytes) => bytes,
		Err(_) => return Err(Error::new(ErrorKind::Integrity(card.id))),
	};

	let mut mac = new_mac(key)?;
	mac.update(card.card_number.as_bytes());
	mac.update(card.expiry_date.as_bytes());
	mac.verify(&stored)
		.map_err(|_| Error::new(ErrorKind::Integrity(card.id)))
}

fn new_mac(key: &[u8]) -> Result<HmacSha256> {
	HmacSha256::new_varkey(key)
		.map_err(|_| Error::new(ErrorKind::Crypto(String::from("invalid vault key"))))
}

fn validate_card_fields(number: &str, expiry: &str, cvv: &str) -> Result<()> {
	if number.len() != 16 || !number.bytes().all(|b| b.is_ascii_digit()) {
		return Err(Error::validation("card number must be 16 digits"));
	}
	if !valid_expiry(expiry) {
		return Err(Error::validation("expiry date must be MM/YY"));
	}
	if cvv.len() != 3 || !cvv.bytes().all(|b| b.is_ascii_digit()) {
		return Err(Error::validation("cvv must be 3 digits"));
	}
	Ok(())
}

fn valid_expiry(expiry: &str) -> bool {
	let bytes = expiry.as_bytes();
	if bytes.len() != 5 || bytes[2] != b'/' {
		return false;
	}
	if !bytes[0].is_ascii_digit()
		|| !bytes[1].is_ascii_digit()
		|| !bytes[3].is_ascii_digit()
		|| !bytes[4].is_ascii_digit()
	{
		return false;
	}

	let month = (bytes[0] - b'0') * 10 + (bytes[1] - b'0');
	(1..=12).contains(&month)
}
