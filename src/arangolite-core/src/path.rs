//! Request path composition: database scope, template slots and query string.

use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use std::collections::BTreeMap;

use crate::config::defaults::SYSTEM_DATABASE_NAME;

/// Everything but RFC 3986 unreserved characters is escaped, so a parameter
/// can never split a path segment or terminate the query.
const COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

/// Slot marker inside path templates.
pub const SLOT: &str = "{}";

/// Query parameters, encoded in lexicographic key order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryParams(BTreeMap<String, Vec<String>>);

impl QueryParams {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace any values under `key`.
    pub fn set(&mut self, key: impl Into<String>, value: impl ToString) -> &mut Self {
        self.0.insert(key.into(), vec![value.to_string()]);
        self
    }

    pub fn append(&mut self, key: impl Into<String>, value: impl ToString) -> &mut Self {
        self.0.entry(key.into()).or_default().push(value.to_string());
        self
    }

    /// Set `key` to `true`/`false` when a value is given; no-op for `None`.
    pub fn set_bool(&mut self, key: &str, value: Option<bool>) -> &mut Self {
        if let Some(value) = value {
            self.set(key, value);
        }
        self
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, key: &str) -> Option<&[String]> {
        self.0.get(key).map(Vec::as_slice)
    }

    /// `k1=v1&k1=v2&k2=v3`, keys sorted, values in insertion order.
    pub fn encode(&self) -> String {
        let mut out = String::new();
        for (key, values) in &self.0 {
            for value in values {
                if !out.is_empty() {
                    out.push('&');
                }
                out.extend(utf8_percent_encode(key, COMPONENT));
                out.push('=');
                out.extend(utf8_percent_encode(value, COMPONENT));
            }
        }
        out
    }
}

/// Per-call option structs that contribute query parameters.
pub trait ToQuery {
    fn to_query(&self) -> QueryParams;
}

/// Query parameters of optional options; `None` contributes nothing.
pub fn query_of<T: ToQuery + ?Sized>(options: Option<&T>) -> QueryParams {
    options.map(ToQuery::to_query).unwrap_or_default()
}

/// Scope prefix for `db_name`: empty for the system database.
pub fn scope_prefix(db_name: &str) -> String {
    if db_name.is_empty() || db_name == SYSTEM_DATABASE_NAME {
        String::new()
    } else {
        let mut prefix = String::from("/_db/");
        prefix.extend(utf8_percent_encode(db_name, COMPONENT));
        prefix
    }
}

/// Compose `scope prefix + filled template [+ ?query]`.
///
/// Each `{}` slot in `template` is replaced, in order, by the next entry of
/// `params`, escaped as a single path segment.
///
/// # Panics
///
/// If the number of slots and `params` differ, in every build profile.
/// Templates are fixed strings, so a mismatch is a bug at the call site.
pub fn build_path(db_name: &str, template: &str, params: &[&str], query: &QueryParams) -> String {
    assert_eq!(
        template.matches(SLOT).count(),
        params.len(),
        "path template {template:?} slot count mismatch"
    );

    let mut path = scope_prefix(db_name);
    let mut params = params.iter();
    let mut rest = template;
    while let Some(pos) = rest.find(SLOT) {
        path.push_str(&rest[..pos]);
        if let Some(param) = params.next() {
            path.extend(utf8_percent_encode(param, COMPONENT));
        }
        rest = &rest[pos + SLOT.len()..];
    }
    path.push_str(rest);

    if !query.is_empty() {
        path.push('?');
        path.push_str(&query.encode());
    }
    path
}
