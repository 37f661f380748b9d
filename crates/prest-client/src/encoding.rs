//! Percent-encoding of query string values.

use std::fmt::Display;

use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};

/// Characters escaped in a query component. Everything except alphanumerics
/// and `-_.!~*'()` is escaped, which is the set the gateway's reference
/// clients send.
pub const COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

/// Percent-encode a single query value.
///
/// # Examples
///
/// ```
/// use prest_client::encoding::encode_component;
///
/// assert_eq!(encode_component("fat & rat"), "fat%20%26%20rat");
/// assert_eq!(encode_component(7), "7");
/// ```
pub fn encode_component(value: impl Display) -> String {
    utf8_percent_encode(&value.to_string(), COMPONENT).to_string()
}

/// Render a `key=value` pair with the value encoded.
pub fn query_pair(key: &str, value: impl Display) -> String {
    format!("{key}={}", encode_component(value))
}
