use std::sync::OnceLock;

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc};
use regex::Regex;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("Please enter your name")]
    EmptyName,

    #[error("Enter a valid phone (digits, optional +)")]
    InvalidPhone,

    #[error("Select a date")]
    MissingDate,

    #[error("Select a time")]
    MissingTime,

    #[error("Invalid date/time")]
    InvalidDateTime,

    #[error("Cannot book in the past")]
    InPast,
}

fn phone_pattern() -> &'static Regex {
    static PHONE: OnceLock<Regex> = OnceLock::new();
    PHONE.get_or_init(|| Regex::new(r"^\+?\d{7,15}$").expect("phone pattern is valid"))
}

pub fn validate_name(name: &str) -> Result<(), ValidationError> {
    if name.trim().is_empty() {
        return Err(ValidationError::EmptyName);
    }
    Ok(())
}

pub fn validate_phone(phone: &str) -> Result<(), ValidationError> {
    if !phone_pattern().is_match(phone.trim()) {
        return Err(ValidationError::InvalidPhone);
    }
    Ok(())
}

/// Combines a form date and time, read as wall-clock time at `offset`.
pub fn parse_appointment(
    date: &str,
    time: &str,
    offset: FixedOffset,
) -> Result<DateTime<Utc>, ValidationError> {
    let date = date.trim();
    let time = time.trim();
    if date.is_empty() {
        return Err(ValidationError::MissingDate);
    }
    if time.is_empty() {
        return Err(ValidationError::MissingTime);
    }

    let date = NaiveDate::parse_from_str(date, "%Y-%m-%d")
        .map_err(|_| ValidationError::InvalidDateTime)?;
    let time = NaiveTime::parse_from_str(time, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(time, "%H:%M:%S"))
        .map_err(|_| ValidationError::InvalidDateTime)?;

    offset
        .from_local_datetime(&NaiveDateTime::new(date, time))
        .single()
        .map(|dt| dt.with_timezone(&Utc))
        .ok_or(ValidationError::InvalidDateTime)
}

pub fn validate_not_past(
    datetime: &DateTime<Utc>,
    now: &DateTime<Utc>,
) -> Result<(), ValidationError> {
    if datetime < now {
        return Err(ValidationError::InPast);
    }
    Ok(())
}
