use chrono::{DateTime, Datelike, NaiveDate, Utc};

pub type Id = i64;
pub type Time = DateTime<Utc>;
pub type Date = NaiveDate;

pub trait DateExt {
	fn add_months(&self, num_months: u32) -> Date;
}

impl DateExt for Date {
	/// Step forward by whole months, clamping to the last day of the
	/// target month (Jan 31 + 1 month = Feb 28/29).
	fn add_months(&self, num_months: u32) -> Date {
		let total_months = self.month0() + num_months;
		let year = self.year() + (total_months / 12) as i32;
		let month = total_months % 12 + 1;

		let mut day = self.day();
		loop {
			match NaiveDate::from_ymd_opt(year, month, day) {
				Some(date) => return date,
				None => day -= 1,
			}
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn add_months_within_year() {
		let date = NaiveDate::from_ymd(2025, 1, 15);
		assert_eq!(date.add_months(1), NaiveDate::from_ymd(2025, 2, 15));
		assert_eq!(date.add_months(6), NaiveDate::from_ymd(2025, 7, 15));
	}

	#[test]
	fn add_months_across_year_boundary() {
		let date = NaiveDate::from_ymd(2025, 11, 5);
		assert_eq!(date.add_months(2), NaiveDate::from_ymd(2026, 1, 5));
		assert_eq!(date.add_months(14), NaiveDate::from_ymd(2027, 1, 5));
	}

	#[test]
	fn add_months_exactly_december() {
		let date = NaiveDate::from_ymd(2025, 11, 30);
		assert_eq!(date.add_months(1), NaiveDate::from_ymd(2025, 12, 30));
	}

	#[test]
	fn add_months_clamps_to_end_of_month() {
		let date = NaiveDate::from_ymd(2025, 1, 31);
		assert_eq!(date.add_months(1), NaiveDate::from_ymd(2025, 2, 28));
		assert_eq!(date.add_months(3), NaiveDate::from_ymd(2025, 4, 30));
	}

	#[test]
	fn add_months_keeps_leap_day() {
		let date = NaiveDate::from_ymd(2023, 12, 31);
		assert_eq!(date.add_months(2), NaiveDate::from_ymd(2024, 2, 29));
	}
}
