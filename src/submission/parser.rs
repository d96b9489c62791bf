use std::collections::HashMap;

use axum::http::HeaderMap;
use serde_json::Value;

/// Raw form fields as posted by the browser, before validation.
pub type RawFields = HashMap<String, String>;

/// Parse a request body based on Content-Type header.
pub fn parse_body(content_type: Option<&str>, body: &[u8]) -> Result<RawFields, String> {
    let ct = content_type
        .unwrap_or("application/json")
        .to_ascii_lowercase();

    if ct.contains("application/json") {
        parse_json(body)
    } else if ct.contains("application/x-www-form-urlencoded") {
        parse_form_urlencoded(body)
    } else if ct.contains("multipart/form-data") {
        Err("multipart".to_string())
    } else {
        // Try JSON first, then form-urlencoded
        parse_json(body)
            .or_else(|_| parse_form_urlencoded(body))
            .map_err(|e| format!("Unable to parse body: {e}"))
    }
}

fn parse_json(body: &[u8]) -> Result<RawFields, String> {
    let value: Value = serde_json::from_slice(body).map_err(|e| format!("Invalid JSON: {e}"))?;
    let Value::Object(obj) = value else {
        return Err("Invalid JSON: expected an object".to_string());
    };

    let mut fields = RawFields::new();
    for (key, value) in obj {
        let text = match value {
            Value::Null => continue,
            Value::String(s) => s,
            other => other.to_string(),
        };
        fields.insert(key, text);
    }
    Ok(fields)
}

fn parse_form_urlencoded(body: &[u8]) -> Result<RawFields, String> {
    let body_str = std::str::from_utf8(body).map_err(|e| format!("Invalid UTF-8: {e}"))?;

    let mut fields = RawFields::new();
    for (k, v) in form_urlencoded::parse(body_str.as_bytes()) {
        fields.entry(k.into_owned()).or_insert_with(|| v.into_owned());
    }
    Ok(fields)
}

/// Parse multipart form data using multer.
pub async fn parse_multipart(headers: &HeaderMap, body: bytes::Bytes) -> Result<RawFields, String> {
    let boundary = headers
        .get("content-type")
        .and_then(|v| v.to_str().ok())
        .and_then(|ct| multer::parse_boundary(ct).ok())
        .ok_or_else(|| "Missing multipart boundary".to_string())?;

    let stream = futures_util::stream::once(async { Ok::<_, std::io::Error>(body) });
    let mut multipart = multer::Multipart::new(stream, boundary);

    let mut fields = RawFields::new();
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| format!("Multipart error: {e}"))?
    {
        let Some(name) = field.name().map(|n| n.to_string()) else {
            continue;
        };
        let value = field
            .text()
            .await
            .map_err(|e| format!("Field read error: {e}"))?;
        fields.entry(name).or_insert(value);
    }

    Ok(fields)
}
