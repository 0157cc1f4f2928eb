//! Deep links that hand a conversation off to WhatsApp. Nothing is tracked
//! once the link is opened.

use reqwest::Url;

const WA_BASE: &str = "https://wa.me/";

pub const BOOK_NOW_GREETING: &str = "Hi FadeMaster Pro, I want to book an appointment";

fn digits(phone: &str) -> String {
    phone.chars().filter(|c| c.is_ascii_digit()).collect()
}

/// Link for chatting with a client about their booking.
pub fn chat_link(phone: &str) -> String {
    format!("{WA_BASE}{}", digits(phone))
}

/// Link for the floating "Book Now" button, pre-filled with `text`.
pub fn book_now_link(business_phone: &str, text: &str) -> String {
    let base = chat_link(business_phone);
    match Url::parse_with_params(&base, &[("text", text)]) {
        Ok(url) => url.to_string(),
        Err(e) => {
            tracing::warn!(error = %e, "could not build book-now link, dropping text");
            base
        }
    }
}
