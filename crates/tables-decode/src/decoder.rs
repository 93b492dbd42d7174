// SPDX-License-Identifier: MIT OR Apache-2.0
//! Error-body decoding.
//!
//! Two body shapes are understood:
//!
//! * an OData JSON envelope (`{"odata.error": {"code": .., "message": {"value": ..}, ..}}`,
//!   or the same under `"error"`);
//! * an XML document whose root's direct children carry the code, the
//!   message and any other fields by tag name.
//!
//! Nothing here fails. A body that cannot be read leaves the decoded error
//! with whatever the error-code header provided.

use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};
use serde::Serialize;
use serde_json::Value;
use tables_error::{AdditionalInfo, WireCode};
use tracing::{debug, trace};

use crate::response::HttpResponse;

/// Header the services use to report the error code.
pub const ERROR_CODE_HEADER: &str = "x-ms-error-code";

/// JSON envelope keys, tried in order.
const ENVELOPE_KEYS: &[&str] = &["odata.error", "error"];

// ---------------------------------------------------------------------------
// DecodedError
// ---------------------------------------------------------------------------

/// The structured content of a failure response, before classification.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DecodedError {
    /// Error code from the body, else from the error-code header.
    pub code: Option<WireCode>,
    /// Human-readable message; empty if the body had none.
    pub message: String,
    /// Every other field, in decode order.
    pub extra: AdditionalInfo,
}

impl DecodedError {
    /// Use `fallback` as the message if decoding found none.
    #[must_use]
    pub fn with_fallback_message(mut self, fallback: &str) -> Self {
        if self.message.is_empty() {
            self.message = fallback.to_owned();
        }
        self
    }
}

// ---------------------------------------------------------------------------
// Body format
// ---------------------------------------------------------------------------

/// Structured body formats the decoder reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BodyFormat {
    /// OData JSON.
    Json,
    /// XML error document.
    Xml,
}

impl BodyFormat {
    /// Pick a format from the declared content type, falling back to the
    /// first non-whitespace byte of the body.
    #[must_use]
    pub fn detect(content_type: Option<&str>, body: &[u8]) -> Option<Self> {
        if let Some(ct) = content_type {
            let ct = ct.to_ascii_lowercase();
            if ct.contains("json") {
                return Some(Self::Json);
            }
            if ct.contains("xml") {
                return Some(Self::Xml);
            }
        }
        match body.iter().find(|b| !b.is_ascii_whitespace()) {
            Some(b'{') => Some(Self::Json),
            Some(b'<') => Some(Self::Xml),
            _ => None,
        }
    }
}

/// One piece of information read from a body.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Field {
    Code(String),
    Message(String),
    Extra(String, String),
}

#[derive(Debug, thiserror::Error)]
enum BodyError {
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid XML: {0}")]
    Xml(#[from] quick_xml::Error),
    #[error("XML document ended inside an element")]
    Truncated,
}

// ---------------------------------------------------------------------------
// Decoder
// ---------------------------------------------------------------------------

/// Decodes failure responses into [`DecodedError`]s.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorDecoder {
    code_header: String,
}

impl Default for ErrorDecoder {
    fn default() -> Self {
        Self::new(ERROR_CODE_HEADER)
    }
}

impl ErrorDecoder {
    /// A decoder that seeds the code from `code_header`.
    pub fn new(code_header: impl Into<String>) -> Self {
        Self {
            code_header: code_header.into(),
        }
    }

    /// Header consulted for the code.
    pub fn code_header(&self) -> &str {
        &self.code_header
    }

    /// Decode `response`. Never fails.
    pub fn decode<R: HttpResponse + ?Sized>(&self, response: &R) -> DecodedError {
        let mut decoded = DecodedError {
            code: response
                .header(&self.code_header)
                .filter(|c| !c.is_empty())
                .map(WireCode::parse),
            ..DecodedError::default()
        };

        let body = response.body();
        let Some(format) = BodyFormat::detect(response.content_type(), body) else {
            trace!(
                target: "tables.decode",
                status = response.status(),
                body_len = body.len(),
                "no structured error body"
            );
            return decoded;
        };

        let fields = match format {
            BodyFormat::Json => json_fields(body),
            BodyFormat::Xml => xml_fields(body),
        };
        match fields {
            Ok(fields) => {
                trace!(
                    target: "tables.decode",
                    status = response.status(),
                    ?format,
                    fields = fields.len(),
                    "decoded error body"
                );
                apply(&mut decoded, fields);
            }
            Err(err) => {
                debug!(
                    target: "tables.decode",
                    status = response.status(),
                    ?format,
                    error = %err,
                    "error body unreadable, keeping header code only"
                );
            }
        }
        decoded
    }
}

/// Decode with the default error-code header.
pub fn decode_error<R: HttpResponse + ?Sized>(response: &R) -> DecodedError {
    ErrorDecoder::default().decode(response)
}

fn apply(decoded: &mut DecodedError, fields: Vec<Field>) {
    for field in fields {
        match field {
            Field::Code(code) => {
                decoded.code = (!code.is_empty()).then(|| WireCode::parse(&code));
            }
            Field::Message(message) => decoded.message = message,
            Field::Extra(key, value) => decoded.extra.insert(key, value),
        }
    }
}

// ---------------------------------------------------------------------------
// JSON
// ---------------------------------------------------------------------------

fn json_fields(body: &[u8]) -> Result<Vec<Field>, BodyError> {
    let value: Value = serde_json::from_slice(body)?;
    let Some(envelope) = ENVELOPE_KEYS
        .iter()
        .find_map(|key| value.get(*key).and_then(Value::as_object))
    else {
        return Ok(Vec::new());
    };

    Ok(envelope
        .iter()
        .map(|(key, field)| match key.as_str() {
            // null clears the code like an empty string does
            "code" if field.is_null() => Field::Code(String::new()),
            "code" => Field::Code(json_text(field)),
            "message" => {
                let value = field.get("value").unwrap_or(field);
                Field::Message(if value.is_null() {
                    String::new()
                } else {
                    json_text(value)
                })
            }
            _ => Field::Extra(key.clone(), json_text(field)),
        })
        .collect())
}

fn json_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

// ---------------------------------------------------------------------------
// XML
// ---------------------------------------------------------------------------

fn xml_fields(body: &[u8]) -> Result<Vec<Field>, BodyError> {
    let mut reader = Reader::from_reader(body);
    reader.config_mut().trim_text(true);

    let mut fields = Vec::new();
    let mut depth = 0usize;
    let mut current: Option<(String, String)> = None;

    loop {
        match reader.read_event()? {
            Event::Start(e) => {
                depth += 1;
                if depth == 2 {
                    current = Some((local_name(&e), String::new()));
                }
            }
            Event::Empty(e) => {
                if depth == 1 {
                    fields.push(xml_field(local_name(&e), String::new()));
                }
            }
            Event::End(_) => {
                if depth == 2
                    && let Some((tag, text)) = current.take()
                {
                    fields.push(xml_field(tag, text.trim().to_owned()));
                }
                depth = depth.saturating_sub(1);
            }
            Event::Text(t) => {
                if let Some((_, text)) = current.as_mut() {
                    text.push_str(&t.unescape()?);
                }
            }
            Event::CData(c) => {
                if let Some((_, text)) = current.as_mut() {
                    text.push_str(&String::from_utf8_lossy(&c.into_inner()));
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if depth != 0 {
        return Err(BodyError::Truncated);
    }
    Ok(fields)
}

fn local_name(e: &BytesStart<'_>) -> String {
    String::from_utf8_lossy(e.local_name().as_ref()).into_owned()
}

fn xml_field(tag: String, text: String) -> Field {
    let lower = tag.to_ascii_lowercase();
    if lower.contains("code") {
        Field::Code(text)
    } else if lower.contains("message") {
        Field::Message(text)
    } else {
        Field::Extra(tag, text)
    }
}
