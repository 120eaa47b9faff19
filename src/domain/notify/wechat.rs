//! WeChat Pay v3 notification parser.
//!
//! Expects the JSON callback envelope with `resource` already decrypted
//! into its plaintext object. Payment events (`TRANSACTION.*`) carry
//! `trade_state`; refund events (`REFUND.*`) carry `refund_status`.

use serde_json::{Map, Value};

use super::errors::NotifyError;
use super::notify_data::{NotifyData, NotifyProvider, PaymentState, RefundState};

pub(super) fn parse(body: &[u8]) -> Result<NotifyData, NotifyError> {
    let envelope: Map<String, Value> = serde_json::from_slice(body)
        .map_err(|e| NotifyError::Malformed(format!("wechat body is not a JSON object: {}", e)))?;

    let event_type = str_field(&envelope, "event_type").ok_or(NotifyError::MissingField("event_type"))?;
    let resource = match envelope.get("resource") {
        Some(Value::Object(resource)) => resource,
        _ => return Err(NotifyError::MissingField("resource")),
    };
    if resource.contains_key("ciphertext") && !resource.contains_key("out_trade_no") {
        return Err(NotifyError::Malformed(
            "resource has not been decrypted".to_string(),
        ));
    }

    let out_trade_no =
        str_field(resource, "out_trade_no").ok_or(NotifyError::MissingField("out_trade_no"))?;
    let trade_no =
        str_field(resource, "transaction_id").ok_or(NotifyError::MissingField("transaction_id"))?;
    let amount = resource.get("amount");

    let is_refund = event_type.starts_with("REFUND.");

    let data = if is_refund {
        let status =
            str_field(resource, "refund_status").ok_or(NotifyError::MissingField("refund_status"))?;
        let refund_state = match status.as_str() {
            "SUCCESS" => RefundState::Succeeded,
            "PROCESSING" => RefundState::Processing,
            "CLOSED" | "ABNORMAL" => RefundState::Failed,
            other => {
                return Err(NotifyError::Malformed(format!(
                    "unknown refund_status '{}'",
                    other
                )))
            }
        };
        NotifyData {
            provider: NotifyProvider::Wechat,
            raw_payload: Map::new(),
            trade_no,
            out_trade_no,
            is_refund,
            payment_state: None,
            refund_state: Some(refund_state),
            refund_no: str_field(resource, "out_refund_no"),
            amount: amount.and_then(|a| a.get("refund")).and_then(Value::as_i64),
        }
    } else {
        let state =
            str_field(resource, "trade_state").ok_or(NotifyError::MissingField("trade_state"))?;
        let payment_state = match state.as_str() {
            "SUCCESS" | "REFUND" => PaymentState::Succeeded,
            "NOTPAY" | "USERPAYING" => PaymentState::Pending,
            "CLOSED" | "REVOKED" | "PAYERROR" => PaymentState::Closed,
            other => {
                return Err(NotifyError::Malformed(format!(
                    "unknown trade_state '{}'",
                    other
                )))
            }
        };
        NotifyData {
            provider: NotifyProvider::Wechat,
            raw_payload: Map::new(),
            trade_no,
            out_trade_no,
            is_refund,
            payment_state: Some(payment_state),
            refund_state: None,
            refund_no: None,
            amount: amount.and_then(|a| a.get("total")).and_then(Value::as_i64),
        }
    };

    Ok(NotifyData {
        raw_payload: envelope,
        ..data
    })
}

fn str_field(map: &Map<String, Value>, key: &str) -> Option<String> {
    match map.get(key) {
        Some(Value::String(s)) if !s.is_empty() => Some(s.clone()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn body(value: Value) -> Vec<u8> {
        serde_json::to_vec(&value).unwrap()
    }

    fn transaction(trade_state: &str) -> Value {
        json!({
            "id": "EV-2018022511223320873",
            "create_time": "2024-01-15T10:00:00+08:00",
            "event_type": "TRANSACTION.SUCCESS",
            "resource_type": "encrypt-resource",
            "resource": {
                "out_trade_no": "P20240115",
                "transaction_id": "4200000001",
                "trade_state": trade_state,
                "amount": {"total": 1999, "currency": "CNY"}
            }
        })
    }

    fn refund(refund_status: &str) -> Value {
        json!({
            "id": "EV-2",
            "event_type": "REFUND.SUCCESS",
            "resource": {
                "out_trade_no": "P20240115",
                "transaction_id": "4200000001",
                "out_refund_no": "R20240116",
                "refund_id": "50000000001",
                "refund_status": refund_status,
                "amount": {"total": 1999, "refund": 500}
            }
        })
    }

    // ══════════════════════════════════════════════════════════════
    // Transaction Event Tests
    // ══════════════════════════════════════════════════════════════

    #[test]
    fn parses_successful_transaction() {
        let data = parse(&body(transaction("SUCCESS"))).unwrap();

        assert_eq!(data.provider(), NotifyProvider::Wechat);
        assert_eq!(data.out_trade_no(), "P20240115");
        assert_eq!(data.trade_no(), "4200000001");
        assert!(data.is_pay_success());
        assert_eq!(data.amount(), Some(1999));
        assert_eq!(
            data.raw_payload().get("id"),
            Some(&json!("EV-2018022511223320873"))
        );
    }

    #[test]
    fn maps_pending_and_closed_trade_states() {
        assert_eq!(
            parse(&body(transaction("NOTPAY"))).unwrap().payment_state(),
            Some(PaymentState::Pending)
        );
        assert_eq!(
            parse(&body(transaction("REVOKED"))).unwrap().payment_state(),
            Some(PaymentState::Closed)
        );
    }

    // ══════════════════════════════════════════════════════════════
    // Refund Event Tests
    // ══════════════════════════════════════════════════════════════

    #[test]
    fn parses_successful_refund() {
        let data = parse(&body(refund("SUCCESS"))).unwrap();

        assert!(data.is_refund());
        assert!(data.is_refund_success());
        assert_eq!(data.refund_no(), Some("R20240116"));
        assert_eq!(data.amount(), Some(500));
    }

    #[test]
    fn abnormal_refund_is_failed() {
        let data = parse(&body(refund("ABNORMAL"))).unwrap();

        assert_eq!(data.refund_state(), Some(RefundState::Failed));
        assert!(!data.is_refund_success());
    }

    // ══════════════════════════════════════════════════════════════
    // Malformed Input Tests
    // ══════════════════════════════════════════════════════════════

    #[test]
    fn encrypted_resource_is_malformed() {
        let value = json!({
            "event_type": "TRANSACTION.SUCCESS",
            "resource": {"algorithm": "AEAD_AES_256_GCM", "ciphertext": "...", "nonce": "n"}
        });

        assert!(matches!(parse(&body(value)), Err(NotifyError::Malformed(_))));
    }

    #[test]
    fn non_json_body_is_malformed() {
        assert!(matches!(parse(b"<xml/>"), Err(NotifyError::Malformed(_))));
    }

    #[test]
    fn missing_event_type_is_rejected() {
        let value = json!({"resource": {"out_trade_no": "P1"}});

        assert!(matches!(
            parse(&body(value)),
            Err(NotifyError::MissingField("event_type"))
        ));
    }
}
