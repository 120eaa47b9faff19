//! Signature strategies.
//!
//! - [`DirectHmacSigner`] signs the hashed canonical request with the secret
//!   in one HMAC pass (ACS3 family).
//! - [`DerivedKeySigner`] derives a per-day, per-service signing key through
//!   an HMAC chain before signing (TC3 family), so a leaked signing key is
//!   only good for one UTC date and one service.
//!
//! Both are pure: same inputs, same digest.

use super::canonical::CanonicalRequest;
use super::credential::Credential;
use super::encoding::{hmac_sha256, hmac_sha256_hex, sha256_hex};
use super::errors::SigningError;
use crate::domain::foundation::Timestamp;

/// Per-call inputs a signer may need besides the canonical request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SigningContext {
    pub timestamp: Timestamp,
    /// Provider service name (e.g. `dnspod`). Required by derived-key signers.
    pub service: Option<String>,
}

impl SigningContext {
    pub fn new(timestamp: Timestamp) -> Self {
        Self {
            timestamp,
            service: None,
        }
    }

    pub fn with_service(mut self, service: impl Into<String>) -> Self {
        self.service = Some(service.into());
        self
    }
}

/// A computed signature.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Signature {
    pub algorithm: String,
    /// `date/service/suffix` for derived-key signatures, `None` otherwise.
    pub credential_scope: Option<String>,
    pub signed_header_names: Vec<String>,
    pub hex_digest: String,
}

impl Signature {
    /// Renders the `Authorization` header value:
    /// `Algorithm Credential=<id>[/<scope>],SignedHeaders=<a;b>,Signature=<hex>`.
    pub fn authorization(&self, secret_id: &str) -> String {
        let credential = match &self.credential_scope {
            Some(scope) => format!("{}/{}", secret_id, scope),
            None => secret_id.to_string(),
        };
        format!(
            "{} Credential={},SignedHeaders={},Signature={}",
            self.algorithm,
            credential,
            self.signed_header_names.join(";"),
            self.hex_digest
        )
    }
}

/// Shared interface of the signing strategies.
pub trait Signer: Send + Sync {
    /// Algorithm identifier placed in the string-to-sign and the
    /// `Authorization` header.
    fn algorithm(&self) -> &str;

    /// Signs the canonical request.
    ///
    /// # Errors
    ///
    /// Fails with a configuration error when the credential has no secret;
    /// never signs with an empty key.
    fn sign(
        &self,
        canonical: &CanonicalRequest,
        credential: &Credential,
        context: &SigningContext,
    ) -> Result<Signature, SigningError>;
}

/// Single-pass HMAC-SHA256 signer.
///
/// `stringToSign = algorithm + "\n" + hex(sha256(canonical))`
/// `digest = hex(hmac_sha256(secret, stringToSign))`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectHmacSigner {
    algorithm: String,
}

impl DirectHmacSigner {
    pub fn new(algorithm: impl Into<String>) -> Self {
        Self {
            algorithm: algorithm.into(),
        }
    }

    /// Aliyun-style `ACS3-HMAC-SHA256`.
    pub fn acs3() -> Self {
        Self::new("ACS3-HMAC-SHA256")
    }

    pub fn string_to_sign(&self, canonical: &CanonicalRequest) -> String {
        format!(
            "{}\n{}",
            self.algorithm,
            sha256_hex(canonical.as_str().as_bytes())
        )
    }
}

impl Signer for DirectHmacSigner {
    fn algorithm(&self) -> &str {
        &self.algorithm
    }

    fn sign(
        &self,
        canonical: &CanonicalRequest,
        credential: &Credential,
        _context: &SigningContext,
    ) -> Result<Signature, SigningError> {
        credential.ensure_usable()?;
        let secret = credential.secret_bytes()?;

        let hex_digest = hmac_sha256_hex(secret, self.string_to_sign(canonical).as_bytes())?;

        Ok(Signature {
            algorithm: self.algorithm.clone(),
            credential_scope: None,
            signed_header_names: canonical.signed_header_names().to_vec(),
            hex_digest,
        })
    }
}

/// Derived-key-chain signer.
///
/// ```text
/// kDate    = hmac(prefix + secret, date)
/// kService = hmac(kDate, service)
/// kSigning = hmac(kService, request_suffix)
/// stringToSign = algorithm \n unix_timestamp \n date/service/suffix \n hex(sha256(canonical))
/// digest   = hex(hmac(kSigning, stringToSign))
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DerivedKeySigner {
    algorithm: String,
    key_prefix: String,
    request_suffix: String,
}

impl DerivedKeySigner {
    pub fn new(
        algorithm: impl Into<String>,
        key_prefix: impl Into<String>,
        request_suffix: impl Into<String>,
    ) -> Self {
        Self {
            algorithm: algorithm.into(),
            key_prefix: key_prefix.into(),
            request_suffix: request_suffix.into(),
        }
    }

    /// Tencent-style `TC3-HMAC-SHA256`.
    pub fn tc3() -> Self {
        Self::new("TC3-HMAC-SHA256", "TC3", "tc3_request")
    }

    /// `date/service/request_suffix` for the given UTC date.
    pub fn credential_scope(&self, date: &str, service: &str) -> String {
        format!("{}/{}/{}", date, service, self.request_suffix)
    }

    /// Runs the date → service → request key derivation.
    pub fn signing_key(
        &self,
        credential: &Credential,
        date: &str,
        service: &str,
    ) -> Result<Vec<u8>, SigningError> {
        let secret = credential.secret_bytes()?;
        let mut date_key_material = self.key_prefix.as_bytes().to_vec();
        date_key_material.extend_from_slice(secret);

        let k_date = hmac_sha256(&date_key_material, date.as_bytes())?;
        let k_service = hmac_sha256(&k_date, service.as_bytes())?;
        hmac_sha256(&k_service, self.request_suffix.as_bytes())
    }

    pub fn string_to_sign(
        &self,
        canonical: &CanonicalRequest,
        timestamp: Timestamp,
        credential_scope: &str,
    ) -> String {
        format!(
            "{}\n{}\n{}\n{}",
            self.algorithm,
            timestamp.as_unix_secs(),
            credential_scope,
            sha256_hex(canonical.as_str().as_bytes())
        )
    }
}

impl Signer for DerivedKeySigner {
    fn algorithm(&self) -> &str {
        &self.algorithm
    }

    fn sign(
        &self,
        canonical: &CanonicalRequest,
        credential: &Credential,
        context: &SigningContext,
    ) -> Result<Signature, SigningError> {
        credential.ensure_usable()?;
        let service = context
            .service
            .as_deref()
            .filter(|s| !s.is_empty())
            .ok_or(SigningError::MissingService)?;

        let date = context.timestamp.utc_date();
        let scope = self.credential_scope(&date, service);
        let signing_key = self.signing_key(credential, &date, service)?;
        let string_to_sign = self.string_to_sign(canonical, context.timestamp, &scope);
        let hex_digest = hmac_sha256_hex(&signing_key, string_to_sign.as_bytes())?;

        Ok(Signature {
            algorithm: self.algorithm.clone(),
            credential_scope: Some(scope),
            signed_header_names: canonical.signed_header_names().to_vec(),
            hex_digest,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::signing::canonical::{CanonicalRequestBuilder, SigningProfile};
    use crate::domain::signing::request::SignedRequest;
    use http::Method;

    fn at() -> Timestamp {
        Timestamp::from_unix_secs(1705276800).unwrap()
    }

    fn canonical() -> CanonicalRequest {
        let request = SignedRequest::new(Method::POST, "dnspod.tencentcloudapi.com", "/", at())
            .with_header("content-type", "application/json; charset=utf-8")
            .with_body(r#"{"Domain":"example.com"}"#);
        CanonicalRequestBuilder::new().build(&request, &SigningProfile::named(["content-type", "host"]))
    }

    fn credential() -> Credential {
        Credential::new("test", "AKIDEXAMPLE", "secret-key", "test")
    }

    // ══════════════════════════════════════════════════════════════
    // Direct HMAC Tests
    // ══════════════════════════════════════════════════════════════

    #[test]
    fn direct_signer_matches_manual_computation() {
        let canonical = canonical();
        let signer = DirectHmacSigner::acs3();

        let signature = signer
            .sign(&canonical, &credential(), &SigningContext::new(at()))
            .unwrap();

        let string_to_sign = format!(
            "ACS3-HMAC-SHA256\n{}",
            sha256_hex(canonical.as_str().as_bytes())
        );
        let expected = hmac_sha256_hex(b"secret-key", string_to_sign.as_bytes()).unwrap();
        assert_eq!(signature.hex_digest, expected);
        assert_eq!(signature.credential_scope, None);
        assert_eq!(signature.signed_header_names, vec!["content-type", "host"]);
    }

    #[test]
    fn direct_signer_rejects_missing_secret() {
        let credential = Credential::new("aliyun-dns", "AKID", "", "aliyun");

        let result =
            DirectHmacSigner::acs3().sign(&canonical(), &credential, &SigningContext::new(at()));

        assert_eq!(
            result,
            Err(SigningError::MissingSecret("aliyun-dns".to_string()))
        );
    }

    #[test]
    fn direct_authorization_header_has_plain_credential() {
        let signature = DirectHmacSigner::acs3()
            .sign(&canonical(), &credential(), &SigningContext::new(at()))
            .unwrap();

        let header = signature.authorization("AKIDEXAMPLE");

        assert_eq!(
            header,
            format!(
                "ACS3-HMAC-SHA256 Credential=AKIDEXAMPLE,SignedHeaders=content-type;host,Signature={}",
                signature.hex_digest
            )
        );
    }

    // ══════════════════════════════════════════════════════════════
    // Derived Key Chain Tests
    // ══════════════════════════════════════════════════════════════

    #[test]
    fn derived_signer_matches_manual_key_chain() {
        let canonical = canonical();
        let signer = DerivedKeySigner::tc3();
        let context = SigningContext::new(at()).with_service("dnspod");

        let signature = signer.sign(&canonical, &credential(), &context).unwrap();

        let k_date = hmac_sha256(b"TC3secret-key", b"2024-01-15").unwrap();
        let k_service = hmac_sha256(&k_date, b"dnspod").unwrap();
        let k_signing = hmac_sha256(&k_service, b"tc3_request").unwrap();
        let string_to_sign = format!(
            "TC3-HMAC-SHA256\n1705276800\n2024-01-15/dnspod/tc3_request\n{}",
            sha256_hex(canonical.as_str().as_bytes())
        );
        let expected = hmac_sha256_hex(&k_signing, string_to_sign.as_bytes()).unwrap();

        assert_eq!(signature.hex_digest, expected);
        assert_eq!(
            signature.credential_scope.as_deref(),
            Some("2024-01-15/dnspod/tc3_request")
        );
    }

    #[test]
    fn derived_authorization_header_includes_scope() {
        let context = SigningContext::new(at()).with_service("dnspod");
        let signature = DerivedKeySigner::tc3()
            .sign(&canonical(), &credential(), &context)
            .unwrap();

        let header = signature.authorization("AKIDEXAMPLE");

        assert!(header.starts_with(
            "TC3-HMAC-SHA256 Credential=AKIDEXAMPLE/2024-01-15/dnspod/tc3_request,SignedHeaders=content-type;host,Signature="
        ));
    }

    #[test]
    fn derived_signer_requires_service() {
        let result =
            DerivedKeySigner::tc3().sign(&canonical(), &credential(), &SigningContext::new(at()));

        assert_eq!(result, Err(SigningError::MissingService));
    }

    #[test]
    fn derived_signer_rejects_missing_secret() {
        let credential = Credential::new("tencent-dns", "AKID", "", "tencent");
        let context = SigningContext::new(at()).with_service("dnspod");

        let result = DerivedKeySigner::tc3().sign(&canonical(), &credential, &context);

        assert_eq!(
            result,
            Err(SigningError::MissingSecret("tencent-dns".to_string()))
        );
    }

    #[test]
    fn derived_key_changes_with_utc_date() {
        let signer = DerivedKeySigner::tc3();
        let day_one = signer.signing_key(&credential(), "2024-01-15", "dnspod").unwrap();
        let day_two = signer.signing_key(&credential(), "2024-01-16", "dnspod").unwrap();

        assert_ne!(day_one, day_two);
    }

    #[test]
    fn derived_key_changes_with_service() {
        let signer = DerivedKeySigner::tc3();
        let dns = signer.signing_key(&credential(), "2024-01-15", "dnspod").unwrap();
        let cvm = signer.signing_key(&credential(), "2024-01-15", "cvm").unwrap();

        assert_ne!(dns, cvm);
    }
}
