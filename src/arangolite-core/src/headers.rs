//! Conditional request headers and per-call header merging.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, IF_MATCH, IF_NONE_MATCH};
use std::collections::BTreeMap;

use crate::error::{Error, Result};

/// Revision preconditions carried by per-call option structs.
///
/// Empty strings count as absent.
pub trait ConditionalHeaders {
    fn if_match(&self) -> Option<&str> {
        None
    }

    fn if_none_match(&self) -> Option<&str> {
        None
    }
}

/// Standalone precondition pair for calls without their own options type.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Conditional {
    pub if_match: Option<String>,
    pub if_none_match: Option<String>,
}

impl Conditional {
    pub fn matching(rev: impl Into<String>) -> Self {
        Self {
            if_match: Some(rev.into()),
            if_none_match: None,
        }
    }

    pub fn not_matching(rev: impl Into<String>) -> Self {
        Self {
            if_match: None,
            if_none_match: Some(rev.into()),
        }
    }
}

impl ConditionalHeaders for Conditional {
    fn if_match(&self) -> Option<&str> {
        self.if_match.as_deref()
    }

    fn if_none_match(&self) -> Option<&str> {
        self.if_none_match.as_deref()
    }
}

/// Build `if-match` / `if-none-match` for an optional configuration.
pub fn conditional_headers<T: ConditionalHeaders + ?Sized>(config: Option<&T>) -> Result<HeaderMap> {
    let mut headers = HeaderMap::new();
    let Some(config) = config else {
        return Ok(headers);
    };
    if let Some(rev) = config.if_match().filter(|rev| !rev.is_empty()) {
        headers.insert(IF_MATCH, header_value(IF_MATCH.as_str(), rev)?);
    }
    if let Some(rev) = config.if_none_match().filter(|rev| !rev.is_empty()) {
        headers.insert(IF_NONE_MATCH, header_value(IF_NONE_MATCH.as_str(), rev)?);
    }
    Ok(headers)
}

/// Defaults first, then per-call values appended under the same names.
pub fn merge_headers(defaults: &HeaderMap, per_call: &HeaderMap) -> HeaderMap {
    let mut merged = defaults.clone();
    for (name, value) in per_call {
        merged.append(name.clone(), value.clone());
    }
    merged
}

/// Parse configured default headers, rejecting invalid names or values.
pub fn default_headers(configured: &BTreeMap<String, Vec<String>>) -> Result<HeaderMap> {
    let mut headers = HeaderMap::new();
    for (name, values) in configured {
        let header = HeaderName::from_bytes(name.as_bytes())
            .map_err(|e| Error::Config(format!("header name {name:?}: {e}")))?;
        for value in values {
            let value = HeaderValue::from_str(value)
                .map_err(|e| Error::Config(format!("header {name:?} value: {e}")))?;
            headers.append(header.clone(), value);
        }
    }
    Ok(headers)
}

/// `Basic base64(user:pass)`, flagged sensitive.
pub fn basic_auth(username: &str, password: &str) -> Result<HeaderValue> {
    let encoded = STANDARD.encode(format!("{username}:{password}"));
    let mut value = HeaderValue::from_str(&format!("Basic {encoded}"))
        .map_err(|e| Error::Config(format!("credentials: {e}")))?;
    value.set_sensitive(true);
    Ok(value)
}

fn header_value(name: &str, value: &str) -> Result<HeaderValue> {
    HeaderValue::from_str(value).map_err(|e| Error::Encoding {
        what: "header",
        reason: format!("{name}: {e}"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_if_match_only() {
        let headers = conditional_headers(Some(&Conditional::matching("abc"))).unwrap();
        assert_eq!(headers.len(), 1);
        assert_eq!(headers.get("if-match").unwrap(), "abc");
        assert!(headers.get("if-none-match").is_none());
    }

    #[test]
    fn test_both_preconditions() {
        let config = Conditional {
            if_match: Some("r1".into()),
            if_none_match: Some("r2".into()),
        };
        let headers = conditional_headers(Some(&config)).unwrap();
        assert_eq!(headers.get(IF_MATCH).unwrap(), "r1");
        assert_eq!(headers.get(IF_NONE_MATCH).unwrap(), "r2");
    }

    #[test]
    fn test_none_and_empty_yield_no_headers() {
        assert!(conditional_headers::<Conditional>(None).unwrap().is_empty());

        let empty = Conditional {
            if_match: Some(String::new()),
            if_none_match: None,
        };
        assert!(conditional_headers(Some(&empty)).unwrap().is_empty());
    }

    #[test]
    fn test_invalid_revision_is_encoding_error() {
        let err = conditional_headers(Some(&Conditional::matching("bad\nrev"))).unwrap_err();
        assert!(matches!(err, Error::Encoding { what: "header", .. }));
    }

    #[test]
    fn test_merge_appends_without_touching_defaults() {
        let mut defaults = HeaderMap::new();
        defaults.insert("x-source", HeaderValue::from_static("default"));
        let mut per_call = HeaderMap::new();
        per_call.insert("x-source", HeaderValue::from_static("call"));
        per_call.insert(IF_MATCH, HeaderValue::from_static("r1"));

        let merged = merge_headers(&defaults, &per_call);
        let sources: Vec<_> = merged.get_all("x-source").iter().collect();
        assert_eq!(sources, vec!["default", "call"]);
        assert_eq!(merged.get(IF_MATCH).unwrap(), "r1");
        assert_eq!(defaults.get_all("x-source").iter().count(), 1);
        assert!(defaults.get(IF_MATCH).is_none());
    }

    #[test]
    fn test_default_headers_rejects_bad_name() {
        let mut configured = BTreeMap::new();
        configured.insert("bad header".to_string(), vec!["v".to_string()]);
        assert!(matches!(default_headers(&configured), Err(Error::Config(_))));
    }

    #[test]
    fn test_basic_auth_value() {
        let value = basic_auth("root", "secret").unwrap();
        assert_eq!(value, "Basic cm9vdDpzZWNyZXQ=");
        assert!(value.is_sensitive());
    }
}
