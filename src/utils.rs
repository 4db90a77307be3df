use rand::{Rng, distr::Alphanumeric};
use reqwest::header::{HeaderMap, RETRY_AFTER};

/// Length of the anti-forgery `state` value sent through the authorization flow.
pub const STATE_LENGTH: usize = 16;

/// Seconds waited when a 429 response carries no usable `Retry-After`.
pub const DEFAULT_RETRY_AFTER_SECS: u64 = 1;

pub fn generate_state() -> String {
    generate_random_string(STATE_LENGTH)
}

pub fn generate_random_string(length: usize) -> String {
    rand::rng()
        .sample_iter(&Alphanumeric)
        .take(length)
        .map(char::from)
        .collect()
}

/// Joins key/value pairs into a percent-encoded `application/x-www-form-urlencoded` string.
pub fn encode_pairs(pairs: &[(&str, &str)]) -> String {
    pairs
        .iter()
        .map(|(k, v)| format!("{}={}", urlencoding::encode(k), urlencoding::encode(v)))
        .collect::<Vec<_>>()
        .join("&")
}

/// Web-root location carrying the pairs in its fragment, e.g. `/#error=state_mismatch`.
pub fn fragment_redirect(pairs: &[(&str, &str)]) -> String {
    format!("/#{}", encode_pairs(pairs))
}

/// Reads `Retry-After` as whole seconds.
pub fn retry_after_secs(headers: &HeaderMap) -> u64 {
    headers
        .get(RETRY_AFTER)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.trim().parse::<u64>().ok())
        .unwrap_or(DEFAULT_RETRY_AFTER_SECS)
}
