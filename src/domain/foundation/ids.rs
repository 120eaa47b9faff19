//! Strongly-typed identifier value objects.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use super::{Timestamp, ValidationError};

/// Identifier assigned to every outbound call and every inbound verification
/// attempt. Doubles as the signature nonce on outbound calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RequestId(Uuid);

impl RequestId {
    /// Creates a new random RequestId.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Creates a RequestId from an existing UUID.
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Returns the inner UUID.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for RequestId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for RequestId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(Uuid::parse_str(s)?))
    }
}

/// Locally generated merchant order number (`out_trade_no` / `out_refund_no`).
///
/// Format: `<prefix><YYYYMMDDHHMMSSmmm><10 random hex chars>`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OrderNo(String);

/// Length of the random suffix appended to generated order numbers.
const ORDER_NO_SUFFIX_LEN: usize = 10;

/// Most providers cap merchant order numbers at 64 characters.
const ORDER_NO_MAX_LEN: usize = 64;

impl OrderNo {
    /// Generates a fresh order number at the current instant.
    pub fn generate(prefix: &str) -> Self {
        Self::generate_at(prefix, Timestamp::now())
    }

    /// Generates a fresh order number stamped with `at`.
    pub fn generate_at(prefix: &str, at: Timestamp) -> Self {
        let random = Uuid::new_v4().simple().to_string();
        Self(format!(
            "{}{}{}",
            prefix,
            at.compact_millis(),
            &random[..ORDER_NO_SUFFIX_LEN]
        ))
    }

    /// Wraps a caller-supplied order number.
    pub fn new(value: impl Into<String>) -> Result<Self, ValidationError> {
        let value = value.into();
        if value.trim().is_empty() {
            return Err(ValidationError::empty_field("order_no"));
        }
        if value.len() > ORDER_NO_MAX_LEN {
            return Err(ValidationError::invalid_format(
                "order_no",
                format!("longer than {} characters", ORDER_NO_MAX_LEN),
            ));
        }
        Ok(Self(value))
    }

    /// Returns the order number as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for OrderNo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn request_ids_are_unique() {
        assert_ne!(RequestId::new(), RequestId::new());
    }

    #[test]
    fn request_id_parses_from_display() {
        let id = RequestId::new();
        let parsed: RequestId = id.to_string().parse().unwrap();
        assert_eq!(parsed, id);
    }

    #[test]
    fn order_no_has_prefix_timestamp_and_suffix() {
        let at = Timestamp::from_unix_millis(1705276800_123).unwrap();
        let order_no = OrderNo::generate_at("PAY", at);

        assert!(order_no.as_str().starts_with("PAY20240115000000123"));
        assert_eq!(order_no.as_str().len(), 3 + 17 + ORDER_NO_SUFFIX_LEN);
    }

    #[test]
    fn order_nos_generated_at_same_instant_differ() {
        let at = Timestamp::now();
        let generated: HashSet<String> = (0..1000)
            .map(|_| OrderNo::generate_at("R", at).to_string())
            .collect();
        assert_eq!(generated.len(), 1000);
    }

    #[test]
    fn order_no_rejects_empty_value() {
        assert!(OrderNo::new("  ").is_err());
    }

    #[test]
    fn order_no_rejects_overlong_value() {
        assert!(OrderNo::new("x".repeat(65)).is_err());
        assert!(OrderNo::new("x".repeat(64)).is_ok());
    }
}
