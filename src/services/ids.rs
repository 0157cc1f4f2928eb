use std::sync::atomic::{AtomicI64, Ordering};

use uuid::Uuid;

const RANDOM_LEN: usize = 6;

/// Generates `{prefix}{millis in base36}{random hex}` ids.
///
/// The time part never goes backwards: a timestamp at or before the last one
/// handed out is bumped past it.
#[derive(Debug, Default)]
pub struct IdGenerator {
    last_millis: AtomicI64,
}

impl IdGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn next(&self, prefix: &str, now_millis: i64) -> String {
        let millis = self.reserve(now_millis);
        let random = Uuid::new_v4().simple().to_string();
        format!("{prefix}{}{}", to_base36(millis), &random[..RANDOM_LEN])
    }

    fn reserve(&self, now_millis: i64) -> i64 {
        let mut last = self.last_millis.load(Ordering::SeqCst);
        loop {
            let next = if now_millis > last { now_millis } else { last + 1 };
            match self
                .last_millis
                .compare_exchange(last, next, Ordering::SeqCst, Ordering::SeqCst)
            {
                Ok(_) => return next,
                Err(actual) => last = actual,
            }
        }
    }
}

fn to_base36(mut n: i64) -> String {
    const DIGITS: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";
    if n <= 0 {
        return "0".to_string();
    }
    let mut out = Vec::new();
    while n > 0 {
        out.push(DIGITS[(n % 36) as usize]);
        n /= 36;
    }
    out.reverse();
    String::from_utf8_lossy(&out).into_owned()
}
