use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Booking {
    pub id: String,
    pub name: String,
    pub phone: String,
    pub datetime: DateTime<Utc>,
    pub service_id: String,
    /// Copied from the service when the booking was made.
    pub service_name: String,
    pub price: i64,
    #[serde(default)]
    pub notes: String,
    pub status: BookingStatus,
    pub created_at: DateTime<Utc>,
}

impl Booking {
    pub fn is_completed(&self) -> bool {
        self.status == BookingStatus::Completed
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum BookingStatus {
    Upcoming,
    Completed,
}

/// A booking request as submitted from the booking form.
///
/// `date` is `YYYY-MM-DD` and `time` is `HH:MM` (seconds optional), both in
/// the business's local time.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewBooking {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub date: String,
    #[serde(default)]
    pub time: String,
    #[serde(default)]
    pub service_id: String,
    #[serde(default)]
    pub notes: String,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum BookingFilter {
    #[default]
    All,
    Upcoming,
    Completed,
}

impl BookingFilter {
    pub fn parse(s: &str) -> Self {
        match s {
            "upcoming" => BookingFilter::Upcoming,
            "completed" => BookingFilter::Completed,
            _ => BookingFilter::All,
        }
    }

    pub fn matches(&self, booking: &Booking) -> bool {
        match self {
            BookingFilter::All => true,
            BookingFilter::Upcoming => booking.status == BookingStatus::Upcoming,
            BookingFilter::Completed => booking.status == BookingStatus::Completed,
        }
    }
}
