//! The request being signed.

use std::collections::BTreeMap;

use http::Method;

use super::encoding::sha256_hex;
use crate::domain::foundation::Timestamp;

/// Everything about one outbound HTTP request that participates in a
/// signature. Built per call and dropped once the signature is attached.
///
/// Query parameters and headers live in `BTreeMap`s so iteration is always
/// sorted byte-wise by key. Header names are stored lower-cased.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedRequest {
    method: Method,
    host: String,
    canonical_uri: String,
    query: BTreeMap<String, String>,
    headers: BTreeMap<String, String>,
    body: Vec<u8>,
    body_hash: String,
    timestamp: Timestamp,
}

impl SignedRequest {
    /// Starts a request with an empty body; `host` is also recorded as the
    /// `host` header.
    pub fn new(
        method: Method,
        host: impl Into<String>,
        canonical_uri: impl Into<String>,
        timestamp: Timestamp,
    ) -> Self {
        let host = host.into();
        let mut headers = BTreeMap::new();
        headers.insert("host".to_string(), host.clone());
        Self {
            method,
            host,
            canonical_uri: canonical_uri.into(),
            query: BTreeMap::new(),
            headers,
            body: Vec::new(),
            body_hash: sha256_hex(b""),
            timestamp,
        }
    }

    /// Adds (or replaces) a query parameter.
    pub fn with_query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.insert(key.into(), value.into());
        self
    }

    /// Adds (or replaces) a header. The name is lower-cased.
    pub fn with_header(mut self, name: impl AsRef<str>, value: impl Into<String>) -> Self {
        self.headers
            .insert(name.as_ref().to_ascii_lowercase(), value.into());
        self
    }

    /// Sets the body and recomputes its hash.
    pub fn with_body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body = body.into();
        self.body_hash = sha256_hex(&self.body);
        self
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn canonical_uri(&self) -> &str {
        &self.canonical_uri
    }

    pub fn query(&self) -> &BTreeMap<String, String> {
        &self.query
    }

    pub fn headers(&self) -> &BTreeMap<String, String> {
        &self.headers
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&name.to_ascii_lowercase())
            .map(String::as_str)
    }

    pub fn body(&self) -> &[u8] {
        &self.body
    }

    /// Lower-case hex SHA-256 of the body.
    pub fn body_hash(&self) -> &str {
        &self.body_hash
    }

    pub fn timestamp(&self) -> Timestamp {
        self.timestamp
    }

    /// Full request URL (`https://host/uri?query`) with RFC 3986 encoded query.
    pub fn url(&self) -> String {
        let uri = if self.canonical_uri.is_empty() {
            "/"
        } else {
            self.canonical_uri.as_str()
        };
        let query = super::canonical::canonical_query_string(&self.query);
        if query.is_empty() {
            format!("https://{}{}", self.host, uri)
        } else {
            format!("https://{}{}?{}", self.host, uri, query)
        }
    }
}
