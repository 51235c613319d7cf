use once_cell::sync::Lazy;
use std::sync::atomic::{AtomicU64, Ordering};

/// Process-wide request id counter, starting at 1. Zero is left for
/// responses to requests whose header could not be read.
static GLOBAL_REQUEST_ID: Lazy<AtomicU64> = Lazy::new(|| AtomicU64::new(1));

#[inline]
pub fn next_request_id() -> u64 {
    GLOBAL_REQUEST_ID.fetch_add(1, Ordering::Relaxed)
}
