// LogMerge - core/recognizer.rs
//
// Positional grammar for access-log lines:
//
//   [<timestamp> - <level>] [<t0> <t1> <url> <status> <rt> ...] {"sid": ...}
//
// The format is owned by the producing application and is not versioned, so
// recognition is literal-delimiter splitting with fixed token offsets rather
// than a tolerant pattern. Every step either succeeds or returns a
// `Rejection`; nothing here panics or logs.

use crate::core::model::ParsedRecord;
use crate::util::constants::{
    MESSAGE_BRACKET_DELIMITER, MIN_MESSAGE_TOKENS, PAYLOAD_DELIMITER, PAYLOAD_KEY_ANO,
    PAYLOAD_KEY_APP_VERSION, PAYLOAD_KEY_RT_AREA, PAYLOAD_KEY_SERVICE_ID, PAYLOAD_KEY_VNO,
    RESPONSE_TIME_TOKEN_INDEX, SEVERITY_SEPARATOR, STATUS_TOKEN_INDEX, SUCCESS_STATUS,
    URL_TOKEN_INDEX,
};
use crate::util::error::Rejection;
use serde_json::{Map, Value};

/// Recognise one raw line.
///
/// Returns the structured record, or the first grammar step that failed.
pub fn recognize(line: &str) -> Result<ParsedRecord, Rejection> {
    let (head, remainder) = line
        .split_once(MESSAGE_BRACKET_DELIMITER)
        .ok_or(Rejection::MissingMessageBracket)?;

    let (raw_timestamp, _level) = head
        .trim_matches(|c| c == '[' || c == ']')
        .split_once(SEVERITY_SEPARATOR)
        .ok_or(Rejection::MissingSeveritySeparator)?;

    let (message_tail, payload) = remainder
        .rsplit_once(PAYLOAD_DELIMITER)
        .ok_or(Rejection::MissingPayloadBracket)?;

    let tokens: Vec<&str> = message_tail.split_whitespace().collect();
    if tokens.len() < MIN_MESSAGE_TOKENS {
        return Err(Rejection::TooFewTokens {
            found: tokens.len(),
            required: MIN_MESSAGE_TOKENS,
        });
    }
    let url = tokens[URL_TOKEN_INDEX];
    let status_code = tokens[STATUS_TOKEN_INDEX];
    let response_time_raw = tokens[RESPONSE_TIME_TOKEN_INDEX];

    let fields = decode_payload(payload)?;

    Ok(ParsedRecord {
        service_id: payload_field(&fields, PAYLOAD_KEY_SERVICE_ID),
        vno: payload_field(&fields, PAYLOAD_KEY_VNO),
        ano: payload_field(&fields, PAYLOAD_KEY_ANO),
        rt_area: payload_field(&fields, PAYLOAD_KEY_RT_AREA),
        url: url.to_string(),
        status_code: status_code.to_string(),
        response_time_ms: response_time(status_code, response_time_raw),
        app_version: payload_field(&fields, PAYLOAD_KEY_APP_VERSION),
        raw_timestamp: raw_timestamp.to_string(),
    })
}

/// Decode the trailing payload; only a JSON object is accepted.
fn decode_payload(payload: &str) -> Result<Map<String, Value>, Rejection> {
    match serde_json::from_str::<Value>(payload) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(other) => Err(Rejection::InvalidPayload {
            reason: format!("expected an object, found {}", json_kind(&other)),
        }),
        Err(e) => Err(Rejection::InvalidPayload {
            reason: e.to_string(),
        }),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Strings are taken verbatim, `null` and missing keys are absent, anything
/// else keeps its compact JSON text.
fn payload_field(fields: &Map<String, Value>, key: &str) -> Option<String> {
    match fields.get(key)? {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

/// Response time is only meaningful for successful requests; anything
/// non-numeric is dropped rather than rejecting the line.
fn response_time(status_code: &str, raw: &str) -> Option<f64> {
    if status_code != SUCCESS_STATUS {
        return None;
    }
    raw.parse::<f64>().ok()
}
