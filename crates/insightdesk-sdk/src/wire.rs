//! JSON decoding for backend responses.
//!
//! Decoding is deliberately tolerant of per-field oddities (plain values
//! without a visibility status, unknown extra keys) but strict about the
//! overall shape: a list response that is not a `[records, total]` pair is
//! [`BackendError::Malformed`], never a partial list.

use insightdesk_runtime::{BackendError, ListPage};
use insightdesk_types::{AccessStatus, CreditStatus, Field, Record, RecordId, Visibility};
use serde_json::Value;
use std::collections::BTreeMap;

fn malformed(msg: impl Into<String>) -> BackendError {
    BackendError::Malformed(msg.into())
}

fn decode_id(value: &Value) -> Result<RecordId, BackendError> {
    match value {
        Value::Number(n) => n
            .as_u64()
            .map(RecordId)
            .ok_or_else(|| malformed(format!("record id {} is not a non-negative integer", n))),
        Value::String(s) => s
            .parse::<u64>()
            .map(RecordId)
            .map_err(|_| malformed(format!("record id {:?} is not numeric", s))),
        other => Err(malformed(format!("record id has unexpected type: {}", other))),
    }
}

fn decode_field(value: Value) -> Result<Field, BackendError> {
    match value {
        Value::Object(ref map) if map.contains_key("visibility_status") => {
            let field: Field =
                serde_json::from_value(value).map_err(|e| malformed(format!("field: {}", e)))?;
            // Only a visible field may carry its value past decoding.
            Ok(match field.visibility_status {
                Visibility::Visible => field,
                Visibility::Hidden => Field::hidden(),
                Visibility::Missing => Field::missing(),
            })
        }
        Value::Null => Ok(Field::missing()),
        plain => Ok(Field {
            value: Some(plain),
            visibility_status: Visibility::Visible,
        }),
    }
}

/// One record object: `id` plus attribute name → field.
pub fn decode_record(value: Value) -> Result<Record, BackendError> {
    let Value::Object(map) = value else {
        return Err(malformed("record is not an object"));
    };

    let mut id = None;
    let mut fields = BTreeMap::new();
    for (key, value) in map {
        if key == "id" {
            id = Some(decode_id(&value)?);
        } else {
            fields.insert(key, decode_field(value)?);
        }
    }

    let id = id.ok_or_else(|| malformed("record has no id"))?;
    Ok(Record { id, fields })
}

/// `[records[], totalCount]`.
pub fn decode_list(value: Value) -> Result<ListPage, BackendError> {
    let Value::Array(parts) = value else {
        return Err(malformed("list response is not an array"));
    };
    let [records, total] = <[Value; 2]>::try_from(parts)
        .map_err(|parts| malformed(format!("list response has {} elements, expected 2", parts.len())))?;

    let Value::Array(records) = records else {
        return Err(malformed("list response records are not an array"));
    };
    let total_count = total
        .as_u64()
        .ok_or_else(|| malformed("list response total is not a count"))? as usize;

    let records = records
        .into_iter()
        .map(decode_record)
        .collect::<Result<Vec<_>, _>>()?;

    Ok(ListPage {
        records,
        total_count,
    })
}

/// `{ "status": "NO_CREDITS" | ... }`.
pub fn decode_credit_status(value: Value) -> Result<CreditStatus, BackendError> {
    let status = value
        .get("status")
        .and_then(Value::as_str)
        .ok_or_else(|| malformed("credit status response has no status"))?;
    status
        .parse()
        .map_err(|e: insightdesk_types::Error| malformed(e.to_string()))
}

/// The precondition code carried by a 403 body, if it is one we know.
pub fn decode_access_status(body: &[u8]) -> Option<AccessStatus> {
    let value: Value = serde_json::from_slice(body).ok()?;
    let code = value
        .get("status")
        .or_else(|| value.get("detail").and_then(|detail| detail.get("status")))?
        .as_str()?;
    AccessStatus::from_code(code)
}
