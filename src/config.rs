use std::env;

use chrono::{FixedOffset, Offset, Utc};

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub port: u16,
    pub bind_addr: String,
    pub database_url: String,
    /// Upstream that serves the web shell's static assets.
    pub shell_origin: String,
    /// WhatsApp number behind the "Book Now" button, digits only.
    pub business_phone: String,
    /// Offset of the shop's local time from UTC. Booking dates and times are
    /// entered in this zone.
    pub business_utc_offset_minutes: i32,
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self {
            port: env::var("PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(3000),
            bind_addr: env::var("BIND_ADDR").unwrap_or_else(|_| "127.0.0.1".to_string()),
            database_url: env::var("DATABASE_URL")
                .unwrap_or_else(|_| "fademaster.db".to_string()),
            shell_origin: env::var("SHELL_ORIGIN")
                .unwrap_or_else(|_| "http://localhost:5173".to_string()),
            business_phone: env::var("BUSINESS_PHONE")
                .unwrap_or_else(|_| "2349131493788".to_string()),
            business_utc_offset_minutes: env::var("BUSINESS_UTC_OFFSET_MINUTES")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(60),
        }
    }

    /// Out-of-range offsets fall back to UTC.
    pub fn utc_offset(&self) -> FixedOffset {
        self.business_utc_offset_minutes
            .checked_mul(60)
            .and_then(FixedOffset::east_opt)
            .unwrap_or_else(|| {
                tracing::warn!(
                    minutes = self.business_utc_offset_minutes,
                    "invalid business UTC offset, using UTC"
                );
                Utc.fix()
            })
    }
}
