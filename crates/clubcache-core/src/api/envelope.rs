//! Response envelope adapters.
//!
//! The club API wraps list pages in a handful of slightly different JSON
//! envelopes. Each endpoint names the adapter it needs so the cache only ever
//! sees `{ items, total_pages }`.

use serde_json::{Map, Value};

use super::ApiError;

/// Items and page count pulled out of an envelope, before record decoding.
#[derive(Debug, Clone, PartialEq)]
pub struct RawPage {
    pub items: Vec<Value>,
    pub total_pages: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Envelope {
    /// `{ "success": true, "data": { "items": [...], "totalPages": n } }`
    SuccessItems,
    /// `{ "success": true, "data": { "data": [...], "totalPages": n } }`
    SuccessNested,
    /// `{ "code": 0, "data": { "items" | "list": [...], "totalPages": n } }`
    CodeZero,
}

impl Envelope {
    /// Validate the envelope and extract the page.
    ///
    /// `page_size` is needed for endpoints that report a record count
    /// (`total`) instead of a page count.
    pub fn normalize(&self, body: Value, page_size: u32) -> Result<RawPage, ApiError> {
        let mut body = match body {
            Value::Object(map) => map,
            other => {
                return Err(ApiError::InvalidResponse(format!(
                    "expected JSON object, got {}",
                    type_name(&other)
                )))
            }
        };

        self.check_success(&body)?;

        let mut data = match body.remove("data") {
            Some(Value::Object(map)) => map,
            Some(other) => {
                return Err(ApiError::InvalidResponse(format!(
                    "expected object at data, got {}",
                    type_name(&other)
                )))
            }
            None => return Err(ApiError::InvalidResponse("missing data".to_string())),
        };

        let total_pages = total_pages(&data, page_size)?;

        let items_field = match self {
            Envelope::SuccessItems => "items",
            Envelope::SuccessNested => "data",
            Envelope::CodeZero if data.contains_key("items") => "items",
            Envelope::CodeZero => "list",
        };
        let items = match data.remove(items_field) {
            Some(Value::Array(items)) => items,
            // Some endpoints send null for an empty page
            Some(Value::Null) => Vec::new(),
            Some(other) => {
                return Err(ApiError::InvalidResponse(format!(
                    "expected array at data.{}, got {}",
                    items_field,
                    type_name(&other)
                )))
            }
            None => {
                return Err(ApiError::InvalidResponse(format!(
                    "missing data.{}",
                    items_field
                )))
            }
        };

        Ok(RawPage { items, total_pages })
    }

    fn check_success(&self, body: &Map<String, Value>) -> Result<(), ApiError> {
        let ok = match self {
            Envelope::SuccessItems | Envelope::SuccessNested => match body.get("success") {
                Some(Value::Bool(b)) => *b,
                _ => {
                    return Err(ApiError::InvalidResponse(
                        "missing success flag".to_string(),
                    ))
                }
            },
            Envelope::CodeZero => match body.get("code") {
                Some(Value::Number(n)) => n.as_i64() == Some(0),
                Some(Value::String(s)) => s.trim() == "0",
                _ => return Err(ApiError::InvalidResponse("missing code".to_string())),
            },
        };

        if ok {
            Ok(())
        } else {
            Err(ApiError::Rejected(message(body).unwrap_or_default()))
        }
    }
}

fn message(body: &Map<String, Value>) -> Option<String> {
    ["message", "msg", "error"]
        .iter()
        .find_map(|k| body.get(*k).and_then(Value::as_str))
        .map(String::from)
}

fn total_pages(data: &Map<String, Value>, page_size: u32) -> Result<u32, ApiError> {
    let explicit = data.get("totalPages").or_else(|| {
        data.get("pagination")
            .and_then(|p| p.get("totalPages"))
    });
    if let Some(value) = explicit {
        return as_count(value, "totalPages");
    }

    if let Some(value) = data.get("total") {
        let total = as_count(value, "total")?;
        let size = page_size.max(1);
        return Ok(total.div_ceil(size));
    }

    Err(ApiError::InvalidResponse("missing totalPages".to_string()))
}

fn as_count(value: &Value, field: &str) -> Result<u32, ApiError> {
    let n = match value {
        Value::Number(n) => n.as_u64(),
        Value::String(s) => s.trim().parse::<u64>().ok(),
        _ => None,
    };
    n.and_then(|n| u32::try_from(n).ok())
        .ok_or_else(|| ApiError::InvalidResponse(format!("invalid {}: {}", field, value)))
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
