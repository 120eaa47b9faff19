//! Credential value object.

use secrecy::{ExposeSecret, SecretString};

use super::errors::SigningError;

/// An issued key pair: access key id / app key plus its secret.
///
/// Immutable once issued. The secret never appears in `Debug` output.
#[derive(Debug, Clone)]
pub struct Credential {
    id: String,
    secret_id: String,
    secret_key: SecretString,
    scope: String,
}

impl Credential {
    /// Creates a credential.
    ///
    /// `id` names the credential record (e.g. `aliyun-dns:default`),
    /// `secret_id` is what the counterparty sees (access key id or app key),
    /// `scope` is the provider or tenant the credential is valid for.
    pub fn new(
        id: impl Into<String>,
        secret_id: impl Into<String>,
        secret_key: impl Into<String>,
        scope: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            secret_id: secret_id.into(),
            secret_key: SecretString::new(secret_key.into()),
            scope: scope.into(),
        }
    }

    /// Creates a credential from an already wrapped secret.
    pub fn from_secret(
        id: impl Into<String>,
        secret_id: impl Into<String>,
        secret_key: SecretString,
        scope: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            secret_id: secret_id.into(),
            secret_key,
            scope: scope.into(),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn secret_id(&self) -> &str {
        &self.secret_id
    }

    pub fn scope(&self) -> &str {
        &self.scope
    }

    /// Returns the secret key bytes, refusing to hand out an empty secret.
    pub fn secret_bytes(&self) -> Result<&[u8], SigningError> {
        let secret = self.secret_key.expose_secret();
        if secret.is_empty() {
            return Err(SigningError::MissingSecret(self.id.clone()));
        }
        Ok(secret.as_bytes())
    }

    /// Checks that both halves of the key pair are present.
    pub fn ensure_usable(&self) -> Result<(), SigningError> {
        if self.secret_id.trim().is_empty() {
            return Err(SigningError::MissingSecretId(self.id.clone()));
        }
        self.secret_bytes().map(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn debug_output_redacts_secret() {
        let credential = Credential::new("aliyun-dns", "AKID", "super-secret", "aliyun");
        let debug = format!("{:?}", credential);
        assert!(!debug.contains("super-secret"));
        assert!(debug.contains("AKID"));
    }

    #[test]
    fn empty_secret_is_rejected() {
        let credential = Credential::new("tencent-dns", "AKID", "", "tencent");
        assert_eq!(
            credential.secret_bytes(),
            Err(SigningError::MissingSecret("tencent-dns".to_string()))
        );
    }

    #[test]
    fn empty_secret_id_is_rejected() {
        let credential = Credential::new("tencent-dns", " ", "secret", "tencent");
        assert_eq!(
            credential.ensure_usable(),
            Err(SigningError::MissingSecretId("tencent-dns".to_string()))
        );
    }

    #[test]
    fn complete_credential_is_usable() {
        let credential = Credential::new("payment", "app-1", "secret", "payment");
        assert!(credential.ensure_usable().is_ok());
        assert_eq!(credential.secret_bytes().unwrap(), b"secret");
    }
}
