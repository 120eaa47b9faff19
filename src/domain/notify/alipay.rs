//! Alipay asynchronous notification parser.
//!
//! Alipay posts `application/x-www-form-urlencoded` bodies. Payment
//! notifications carry `trade_status`; refund notifications additionally
//! carry `out_biz_no` / `refund_fee` / `gmt_refund`.

use percent_encoding::percent_decode_str;
use serde_json::{Map, Value};

use super::errors::NotifyError;
use super::notify_data::{NotifyData, NotifyProvider, PaymentState, RefundState};

pub(super) fn parse(body: &[u8]) -> Result<NotifyData, NotifyError> {
    let text = std::str::from_utf8(body)
        .map_err(|_| NotifyError::Malformed("alipay body is not UTF-8".to_string()))?;
    let fields = parse_form(text)?;

    let field = |name: &str| -> Option<String> {
        match fields.get(name) {
            Some(Value::String(s)) if !s.is_empty() => Some(s.clone()),
            _ => None,
        }
    };
    let required = |name: &'static str| -> Result<String, NotifyError> {
        field(name).ok_or(NotifyError::MissingField(name))
    };

    let out_trade_no = required("out_trade_no")?;
    let trade_no = required("trade_no")?;
    let trade_status = required("trade_status")?;

    let is_refund =
        field("out_biz_no").is_some() || field("refund_fee").is_some() || field("gmt_refund").is_some();

    let payment_state = match trade_status.as_str() {
        "WAIT_BUYER_PAY" => PaymentState::Pending,
        "TRADE_SUCCESS" | "TRADE_FINISHED" => PaymentState::Succeeded,
        "TRADE_CLOSED" => PaymentState::Closed,
        other => {
            return Err(NotifyError::Malformed(format!(
                "unknown trade_status '{}'",
                other
            )))
        }
    };

    // Alipay only notifies completed refunds.
    let (refund_state, refund_no, amount) = if is_refund {
        (
            Some(RefundState::Succeeded),
            field("out_biz_no"),
            field("refund_fee").as_deref().and_then(parse_decimal_amount),
        )
    } else {
        (
            None,
            None,
            field("total_amount").as_deref().and_then(parse_decimal_amount),
        )
    };

    Ok(NotifyData {
        provider: NotifyProvider::Alipay,
        raw_payload: fields,
        trade_no,
        out_trade_no,
        is_refund,
        payment_state: Some(payment_state),
        refund_state,
        refund_no,
        amount,
    })
}

fn parse_form(text: &str) -> Result<Map<String, Value>, NotifyError> {
    let mut fields = Map::new();
    for pair in text.split('&').filter(|p| !p.is_empty()) {
        let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
        fields.insert(decode_component(key)?, Value::String(decode_component(value)?));
    }
    if fields.is_empty() {
        return Err(NotifyError::Malformed("empty alipay body".to_string()));
    }
    Ok(fields)
}

fn decode_component(raw: &str) -> Result<String, NotifyError> {
    let spaced = raw.replace('+', " ");
    percent_decode_str(&spaced)
        .decode_utf8()
        .map(|s| s.into_owned())
        .map_err(|_| NotifyError::Malformed("invalid percent-encoding".to_string()))
}

/// Parses a decimal yuan amount (`"88.8"`) into minor units (`8880`).
pub(super) fn parse_decimal_amount(raw: &str) -> Option<i64> {
    let raw = raw.trim();
    let (whole, fraction) = raw.split_once('.').unwrap_or((raw, ""));
    if whole.is_empty() || fraction.len() > 2 {
        return None;
    }
    if !whole.bytes().all(|b| b.is_ascii_digit()) || !fraction.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let whole: i64 = whole.parse().ok()?;
    let fraction: i64 = match fraction.len() {
        0 => 0,
        1 => fraction.parse::<i64>().ok()? * 10,
        _ => fraction.parse().ok()?,
    };
    whole.checked_mul(100)?.checked_add(fraction)
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAID: &str = "notify_type=trade_status_sync&trade_no=2024011522001&out_trade_no=P20240115&trade_status=TRADE_SUCCESS&total_amount=88.88&subject=Pro+plan%20yearly";

    // ══════════════════════════════════════════════════════════════
    // Payment Notification Tests
    // ══════════════════════════════════════════════════════════════

    #[test]
    fn parses_successful_payment() {
        let data = parse(PAID.as_bytes()).unwrap();

        assert_eq!(data.provider(), NotifyProvider::Alipay);
        assert_eq!(data.out_trade_no(), "P20240115");
        assert_eq!(data.trade_no(), "2024011522001");
        assert!(!data.is_refund());
        assert!(data.is_pay_success());
        assert_eq!(data.amount(), Some(8888));
    }

    #[test]
    fn decodes_form_encoding_into_raw_payload() {
        let data = parse(PAID.as_bytes()).unwrap();

        assert_eq!(
            data.raw_payload().get("subject"),
            Some(&Value::String("Pro plan yearly".to_string()))
        );
    }

    #[test]
    fn maps_waiting_and_closed_states() {
        let waiting = PAID.replace("TRADE_SUCCESS", "WAIT_BUYER_PAY");
        let closed = PAID.replace("TRADE_SUCCESS", "TRADE_CLOSED");

        assert_eq!(
            parse(waiting.as_bytes()).unwrap().payment_state(),
            Some(PaymentState::Pending)
        );
        assert_eq!(
            parse(closed.as_bytes()).unwrap().payment_state(),
            Some(PaymentState::Closed)
        );
    }

    // ══════════════════════════════════════════════════════════════
    // Refund Notification Tests
    // ══════════════════════════════════════════════════════════════

    #[test]
    fn refund_fields_mark_refund_notification() {
        let body = format!("{}&out_biz_no=R20240116&refund_fee=10.5&gmt_refund=2024-01-16+10%3A00%3A00", PAID);

        let data = parse(body.as_bytes()).unwrap();

        assert!(data.is_refund());
        assert!(data.is_refund_success());
        assert!(!data.is_pay_success());
        assert_eq!(data.refund_no(), Some("R20240116"));
        assert_eq!(data.amount(), Some(1050));
    }

    // ══════════════════════════════════════════════════════════════
    // Malformed Input Tests
    // ══════════════════════════════════════════════════════════════

    #[test]
    fn missing_out_trade_no_is_rejected() {
        let result = parse(b"trade_no=1&trade_status=TRADE_SUCCESS");

        assert!(matches!(result, Err(NotifyError::MissingField("out_trade_no"))));
    }

    #[test]
    fn unknown_trade_status_is_malformed() {
        let body = PAID.replace("TRADE_SUCCESS", "SOMETHING_ELSE");

        assert!(matches!(parse(body.as_bytes()), Err(NotifyError::Malformed(_))));
    }

    #[test]
    fn empty_body_is_malformed() {
        assert!(matches!(parse(b""), Err(NotifyError::Malformed(_))));
    }

    #[test]
    fn decimal_amounts_convert_to_minor_units() {
        assert_eq!(parse_decimal_amount("88.88"), Some(8888));
        assert_eq!(parse_decimal_amount("0.1"), Some(10));
        assert_eq!(parse_decimal_amount("12"), Some(1200));
        assert_eq!(parse_decimal_amount("1.234"), None);
        assert_eq!(parse_decimal_amount("-1"), None);
        assert_eq!(parse_decimal_amount("abc"), None);
    }
}
