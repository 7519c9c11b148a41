//! Authentication helpers for API requests

use crate::core::constants::API_KEY_ENV_VARS;

pub const API_KEY_HEADER: &str = "x-goog-api-key";

/// Attach the Gemini API key to a request.
///
/// The key travels in a header rather than the `key=` query parameter so it
/// never shows up in logged URLs.
pub fn add_auth_headers(request: reqwest::RequestBuilder, api_key: &str) -> reqwest::RequestBuilder {
    request.header(API_KEY_HEADER, api_key)
}

/// Read the API key from the environment, trying each known variable in
/// order. Blank values count as unset.
pub fn api_key_from_env() -> Option<String> {
    api_key_from_lookup(|name| std::env::var(name).ok())
}

pub(crate) fn api_key_from_lookup<F>(lookup: F) -> Option<String>
where
    F: Fn(&str) -> Option<String>,
{
    API_KEY_ENV_VARS
        .iter()
        .filter_map(|name| lookup(name))
        .map(|value| value.trim().to_string())
        .find(|value| !value.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn auth_header_is_attached() {
        let client = reqwest::Client::new();
        let request = add_auth_headers(client.get("https://example.com"), "test-key")
            .build()
            .unwrap();
        assert_eq!(
            request.headers().get(API_KEY_HEADER).unwrap(),
            "test-key"
        );
    }

    #[test]
    fn gemini_key_takes_precedence() {
        let lookup = lookup_from(&[("GEMINI_API_KEY", "primary"), ("API_KEY", "fallback")]);
        assert_eq!(api_key_from_lookup(lookup).as_deref(), Some("primary"));
    }

    #[test]
    fn blank_values_fall_through() {
        let lookup = lookup_from(&[("GEMINI_API_KEY", "   "), ("API_KEY", " fallback ")]);
        assert_eq!(api_key_from_lookup(lookup).as_deref(), Some("fallback"));

        let lookup = lookup_from(&[("GEMINI_API_KEY", "")]);
        assert_eq!(api_key_from_lookup(lookup), None);
    }
}
