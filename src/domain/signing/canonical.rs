//! Canonical request construction.
//!
//! The canonical request is the normalized text both sides hash before
//! signing:
//!
//! ```text
//! METHOD
//! URI
//! CanonicalQueryString
//! CanonicalHeaders        (each line "name:value\n", or a lone "\n")
//! SignedHeaderNames       (joined with ';')
//! HashedPayload
//! ```

use std::collections::BTreeMap;

use super::encoding::percent_encode;
use super::request::SignedRequest;

/// Which request headers a provider requires in the signature.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SigningProfile {
    /// Exact header names (lower-case) that are always signed when present.
    signed_headers: Vec<String>,
    /// Every header starting with this prefix (lower-case) is signed too.
    signed_header_prefix: Option<String>,
}

impl SigningProfile {
    /// Signs exactly the named headers.
    pub fn named<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            signed_headers: names
                .into_iter()
                .map(|n| n.as_ref().to_ascii_lowercase())
                .collect(),
            signed_header_prefix: None,
        }
    }

    /// Additionally signs every header starting with `prefix`.
    pub fn with_prefix(mut self, prefix: impl AsRef<str>) -> Self {
        self.signed_header_prefix = Some(prefix.as_ref().to_ascii_lowercase());
        self
    }

    /// Returns true if the (lower-case) header name must be signed.
    pub fn signs(&self, name: &str) -> bool {
        self.signed_headers.iter().any(|n| n == name)
            || self
                .signed_header_prefix
                .as_deref()
                .is_some_and(|prefix| name.starts_with(prefix))
    }
}

/// Output of [`CanonicalRequestBuilder::build`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CanonicalRequest {
    text: String,
    signed_header_names: Vec<String>,
}

impl CanonicalRequest {
    /// The canonical request text.
    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// Sorted lower-case names of the headers included in the signature.
    pub fn signed_header_names(&self) -> &[String] {
        &self.signed_header_names
    }

    /// Signed header names joined with `;`.
    pub fn signed_headers_joined(&self) -> String {
        self.signed_header_names.join(";")
    }
}

/// Builds canonical requests. Stateless; no I/O.
#[derive(Debug, Clone, Copy, Default)]
pub struct CanonicalRequestBuilder;

impl CanonicalRequestBuilder {
    pub fn new() -> Self {
        Self
    }

    pub fn build(&self, request: &SignedRequest, profile: &SigningProfile) -> CanonicalRequest {
        let uri = if request.canonical_uri().is_empty() {
            "/"
        } else {
            request.canonical_uri()
        };

        // BTreeMap iteration is already sorted by lower-case name.
        let signed: Vec<(&String, &String)> = request
            .headers()
            .iter()
            .filter(|(name, _)| profile.signs(name))
            .collect();

        let canonical_headers = if signed.is_empty() {
            "\n".to_string()
        } else {
            signed
                .iter()
                .map(|(name, value)| format!("{}:{}\n", name, value.trim()))
                .collect::<String>()
        };

        let signed_header_names: Vec<String> =
            signed.iter().map(|(name, _)| (*name).clone()).collect();

        let query = canonical_query_string(request.query());
        let signed_joined = signed_header_names.join(";");
        let text = [
            request.method().as_str(),
            uri,
            query.as_str(),
            canonical_headers.as_str(),
            signed_joined.as_str(),
            request.body_hash(),
        ]
        .join("\n");

        CanonicalRequest {
            text,
            signed_header_names,
        }
    }
}

/// Percent-encodes every key and value, sorts by encoded key (ties by encoded
/// value) and joins `k=v` pairs with `&`. Empty map yields an empty string.
pub fn canonical_query_string(query: &BTreeMap<String, String>) -> String {
    let mut pairs: Vec<(String, String)> = query
        .iter()
        .map(|(k, v)| (percent_encode(k), percent_encode(v)))
        .collect();
    pairs.sort();
    pairs
        .into_iter()
        .map(|(k, v)| format!("{}={}", k, v))
        .collect::<Vec<_>>()
        .join("&")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::Timestamp;
    use crate::domain::signing::encoding::sha256_hex;
    use http::Method;

    fn at() -> Timestamp {
        Timestamp::from_unix_secs(1705276800).unwrap()
    }

    // ══════════════════════════════════════════════════════════════
    // Query String Tests
    // ══════════════════════════════════════════════════════════════

    #[test]
    fn empty_query_is_empty_string() {
        assert_eq!(canonical_query_string(&BTreeMap::new()), "");
    }

    #[test]
    fn query_is_encoded_and_sorted() {
        let mut query = BTreeMap::new();
        query.insert("Value".to_string(), "1.2.3.4".to_string());
        query.insert("RR".to_string(), "www test".to_string());
        query.insert("Action".to_string(), "AddDomainRecord".to_string());

        assert_eq!(
            canonical_query_string(&query),
            "Action=AddDomainRecord&RR=www%20test&Value=1.2.3.4"
        );
    }

    #[test]
    fn query_sorts_by_encoded_key() {
        // '*' (0x2A) sorts before 'a', but its encoding "%2A" sorts before
        // both; sorting happens after encoding.
        let mut query = BTreeMap::new();
        query.insert("a".to_string(), "1".to_string());
        query.insert("*".to_string(), "2".to_string());

        assert_eq!(canonical_query_string(&query), "%2A=2&a=1");
    }

    // ══════════════════════════════════════════════════════════════
    // Header Selection Tests
    // ══════════════════════════════════════════════════════════════

    #[test]
    fn profile_signs_named_and_prefixed_headers() {
        let profile = SigningProfile::named(["Host", "content-type"]).with_prefix("x-acs-");

        assert!(profile.signs("host"));
        assert!(profile.signs("content-type"));
        assert!(profile.signs("x-acs-date"));
        assert!(!profile.signs("user-agent"));
    }

    #[test]
    fn no_signed_headers_emits_single_newline() {
        let request = SignedRequest::new(Method::GET, "h", "/", at());
        let profile = SigningProfile::named(Vec::<String>::new());

        let canonical = CanonicalRequestBuilder::new().build(&request, &profile);

        let expected = format!("GET\n/\n\n\n\n\n{}", sha256_hex(b""));
        assert_eq!(canonical.as_str(), expected);
        assert!(canonical.signed_header_names().is_empty());
    }

    // ══════════════════════════════════════════════════════════════
    // Full Canonical Request Tests
    // ══════════════════════════════════════════════════════════════

    #[test]
    fn builds_canonical_request_in_documented_layout() {
        let request = SignedRequest::new(Method::POST, "dnspod.tencentcloudapi.com", "/", at())
            .with_header("Content-Type", "application/json; charset=utf-8")
            .with_header("X-TC-Action", "DescribeRecordList")
            .with_body(r#"{"Domain":"example.com"}"#);
        let profile = SigningProfile::named(["content-type", "host"]);

        let canonical = CanonicalRequestBuilder::new().build(&request, &profile);

        let expected = format!(
            "POST\n/\n\ncontent-type:application/json; charset=utf-8\nhost:dnspod.tencentcloudapi.com\n\ncontent-type;host\n{}",
            sha256_hex(br#"{"Domain":"example.com"}"#)
        );
        assert_eq!(canonical.as_str(), expected);
        assert_eq!(canonical.signed_headers_joined(), "content-type;host");
    }

    #[test]
    fn header_values_are_trimmed() {
        let request = SignedRequest::new(Method::GET, "h", "/", at())
            .with_header("x-acs-action", "  DescribeDomainRecords  ");
        let profile = SigningProfile::named(Vec::<String>::new()).with_prefix("x-acs-");

        let canonical = CanonicalRequestBuilder::new().build(&request, &profile);

        assert!(canonical
            .as_str()
            .contains("\nx-acs-action:DescribeDomainRecords\n"));
    }

    #[test]
    fn empty_uri_canonicalizes_to_slash() {
        let request = SignedRequest::new(Method::GET, "h", "", at());
        let profile = SigningProfile::named(["host"]);

        let canonical = CanonicalRequestBuilder::new().build(&request, &profile);

        assert!(canonical.as_str().starts_with("GET\n/\n"));
    }

    #[test]
    fn build_is_deterministic() {
        let request = SignedRequest::new(Method::GET, "h", "/", at())
            .with_query("b", "2")
            .with_query("a", "1")
            .with_header("x-acs-date", "2024-01-15T00:00:00Z");
        let profile = SigningProfile::named(["host"]).with_prefix("x-acs-");
        let builder = CanonicalRequestBuilder::new();

        assert_eq!(builder.build(&request, &profile), builder.build(&request, &profile));
    }
}
