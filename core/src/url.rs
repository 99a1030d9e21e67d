//! URL builder: domain + path template + params.
//!
//! # Design
//! `{name}` placeholders in the path consume the matching param; everything
//! left over becomes the query string. A placeholder without a matching
//! param is left in place and recorded as unresolved. The URL is still
//! usable as a string, and the failure shows up when the request is sent,
//! the same way any other bad URL would.

use std::fmt;

use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};

use crate::types::Params;

const URI_COMPONENT_ENCODE_SET: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

/// A request URL, built once per request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Url {
    value: String,
    unresolved: Vec<String>,
}

impl Url {
    pub fn build(domain: &str, path: &str, params: &Params) -> Self {
        let mut consumed = Vec::new();
        let mut unresolved = Vec::new();
        let mut resolved_path = String::with_capacity(path.len());

        let mut rest = path;
        while let Some(open) = rest.find('{') {
            let Some(len) = rest[open..].find('}') else {
                break;
            };
            let name = &rest[open + 1..open + len];
            resolved_path.push_str(&rest[..open]);
            match params.get(name) {
                Some(value) => {
                    let value = value.to_string();
                    resolved_path.extend(utf8_percent_encode(&value, URI_COMPONENT_ENCODE_SET));
                    consumed.push(name);
                }
                None => {
                    resolved_path.push_str(&rest[open..=open + len]);
                    unresolved.push(name.to_string());
                }
            }
            rest = &rest[open + len + 1..];
        }
        resolved_path.push_str(rest);

        let domain = domain.trim_end_matches('/');
        let mut value = String::from(domain);
        if !domain.is_empty() && !resolved_path.is_empty() && !resolved_path.starts_with('/') {
            value.push('/');
        }
        value.push_str(&resolved_path);

        let query = params
            .iter()
            .filter(|(key, _)| !consumed.contains(&key.as_str()))
            .map(|(key, param)| {
                format!(
                    "{}={}",
                    utf8_percent_encode(key, URI_COMPONENT_ENCODE_SET),
                    utf8_percent_encode(&param.to_string(), URI_COMPONENT_ENCODE_SET)
                )
            })
            .collect::<Vec<_>>()
            .join("&");
        if !query.is_empty() {
            value.push(if value.contains('?') { '&' } else { '?' });
            value.push_str(&query);
        }

        Self { value, unresolved }
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    /// Placeholder names that had no matching param.
    pub fn unresolved(&self) -> &[String] {
        &self.unresolved
    }

    pub fn is_complete(&self) -> bool {
        self.unresolved.is_empty()
    }
}

impl fmt::Display for Url {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.value)
    }
}
