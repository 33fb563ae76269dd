use chrono::Utc;
use rand::Rng;
use std::sync::atomic::{AtomicI64, Ordering};

const ALPHABET: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";
const RANDOM_LEN: usize = 8;

static LAST_MILLIS: AtomicI64 = AtomicI64::new(0);

/// Booking reference of the form `BK-<millis>-<random>`, both parts base36.
///
/// Unique with overwhelming probability, not guaranteed: two calls in the
/// same millisecond differ only by the random suffix.
pub fn generate_booking_id() -> String {
    let millis = next_millis();
    let mut rng = rand::thread_rng();
    let suffix: String = (0..RANDOM_LEN)
        .map(|_| ALPHABET[rng.gen_range(0..ALPHABET.len())] as char)
        .collect();

    format!("BK-{}-{}", to_base36(millis as u64), suffix)
}

// Wall clock can step backwards; never hand out a smaller time component.
fn next_millis() -> i64 {
    let now = Utc::now().timestamp_millis().max(0);
    let previous = LAST_MILLIS.fetch_max(now, Ordering::SeqCst);
    previous.max(now)
}

fn to_base36(mut value: u64) -> String {
    if value == 0 {
        return "0".to_string();
    }
    let mut digits = Vec::new();
    while value > 0 {
        digits.push(ALPHABET[(value % 36) as usize]);
        value /= 36;
    }
    digits.reverse();
    String::from_utf8(digits).unwrap_or_default()
}
