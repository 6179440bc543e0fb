// Public endpoints: auth, the read-side blog API, comments, RSS, the
// help center and legacy media serving. No JWT required; comment
// submission picks up an optional identity from the bearer token when
// present.
pub mod auth;
pub mod blog;
pub mod comments;
pub mod help;
pub mod media;
pub mod rss;

use axum::http::{header, HeaderMap, HeaderValue};

/// Cache header used on the public read side.
pub(crate) fn cache_for_minutes(minutes: u32) -> HeaderMap {
    let mut headers = HeaderMap::new();
    let value = format!("public, max-age={}", minutes * 60);
    if let Ok(value) = HeaderValue::from_str(&value) {
        headers.insert(header::CACHE_CONTROL, value);
    }
    headers
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cache_header_is_in_seconds() {
        let headers = cache_for_minutes(30);
        assert_eq!(
            headers.get(header::CACHE_CONTROL).unwrap(),
            "public, max-age=1800"
        );
    }
}
