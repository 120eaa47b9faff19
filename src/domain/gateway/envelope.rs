//! Provider response envelopes.

use serde_json::Value;

use super::errors::GatewayError;
use super::provider::EnvelopeStyle;

/// Longest body excerpt kept in an [`GatewayError::Http`] error.
const BODY_EXCERPT_LEN: usize = 512;

/// Unwraps a provider response.
///
/// Returns the payload on success. A recognizable provider error envelope
/// becomes [`GatewayError::ProviderEnvelope`] regardless of HTTP status; an
/// unrecognizable non-2xx response becomes [`GatewayError::Http`].
pub fn unwrap_envelope(style: EnvelopeStyle, status: u16, body: &[u8]) -> Result<Value, GatewayError> {
    let success_status = (200..300).contains(&status);

    let value: Value = match serde_json::from_slice(body) {
        Ok(value) => value,
        Err(e) if success_status => {
            return Err(GatewayError::InvalidResponse(format!("body is not JSON: {}", e)))
        }
        Err(_) => return Err(http_error(status, body)),
    };

    let unwrapped = match style {
        EnvelopeStyle::Aliyun => unwrap_aliyun(value),
        EnvelopeStyle::Tencent => unwrap_tencent(value),
        EnvelopeStyle::Payment => unwrap_payment(value),
    };

    match unwrapped {
        Err(GatewayError::InvalidResponse(_)) if !success_status => Err(http_error(status, body)),
        Ok(_) if !success_status => Err(http_error(status, body)),
        other => other,
    }
}

fn http_error(status: u16, body: &[u8]) -> GatewayError {
    let text = String::from_utf8_lossy(body);
    let excerpt: String = text.chars().take(BODY_EXCERPT_LEN).collect();
    GatewayError::Http {
        status,
        body: excerpt,
    }
}

fn string_field(value: &Value, key: &str) -> Option<String> {
    match value.get(key)? {
        Value::String(s) => Some(s.clone()),
        Value::Null => None,
        other => Some(other.to_string()),
    }
}

fn unwrap_aliyun(value: Value) -> Result<Value, GatewayError> {
    if !value.is_object() {
        return Err(GatewayError::InvalidResponse(
            "expected a JSON object".to_string(),
        ));
    }
    match string_field(&value, "Code") {
        Some(code) => Err(GatewayError::ProviderEnvelope {
            code,
            message: string_field(&value, "Message").unwrap_or_default(),
            request_id: string_field(&value, "RequestId"),
        }),
        None => Ok(value),
    }
}

fn unwrap_tencent(mut value: Value) -> Result<Value, GatewayError> {
    let response = value
        .get_mut("Response")
        .map(Value::take)
        .filter(Value::is_object)
        .ok_or_else(|| GatewayError::InvalidResponse("missing Response object".to_string()))?;

    match response.get("Error") {
        Some(error) if !error.is_null() => Err(GatewayError::ProviderEnvelope {
            code: string_field(error, "Code").unwrap_or_else(|| "Unknown".to_string()),
            message: string_field(error, "Message").unwrap_or_default(),
            request_id: string_field(&response, "RequestId"),
        }),
        _ => Ok(response),
    }
}

fn unwrap_payment(mut value: Value) -> Result<Value, GatewayError> {
    let code = match value.get("code") {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        _ => {
            return Err(GatewayError::InvalidResponse(
                "missing code field".to_string(),
            ))
        }
    };

    if code == "SUCCESS" || code == "0" {
        let data = value.get_mut("data").map(Value::take).unwrap_or(Value::Null);
        return Ok(data);
    }

    Err(GatewayError::ProviderEnvelope {
        code,
        message: string_field(&value, "message").unwrap_or_default(),
        request_id: string_field(&value, "request_id"),
    })
}
