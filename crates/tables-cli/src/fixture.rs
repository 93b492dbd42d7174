// SPDX-License-Identifier: MIT OR Apache-2.0
//! Captured failures read from disk.

use anyhow::{Context, Result};
use serde::Deserialize;
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::Path;
use tables_decode::{RawResponse, ResponseError};

/// A failed call as the transport reported it.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct Fixture {
    /// Response status; `None` models a failure with no response.
    #[serde(default)]
    pub status: Option<u16>,
    /// Response headers.
    #[serde(default)]
    pub headers: BTreeMap<String, String>,
    /// Response body: a string is used verbatim, any other JSON value is serialized.
    #[serde(default)]
    pub body: Option<Value>,
    /// The transport's own message.
    #[serde(default)]
    pub message: Option<String>,
}

impl Fixture {
    /// Read a fixture from a JSON file.
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("read fixture {}", path.display()))?;
        Self::parse(&text).with_context(|| format!("parse fixture {}", path.display()))
    }

    /// Parse a fixture from JSON text.
    pub fn parse(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    /// The response this fixture describes, if it has a status.
    pub fn response(&self) -> Option<RawResponse> {
        let status = self.status?;
        let mut response = RawResponse::new(status);
        for (name, value) in &self.headers {
            response = response.with_header(name.as_str(), value.as_str());
        }
        match &self.body {
            Some(Value::String(s)) => response = response.with_body(s.as_bytes()),
            Some(other) => response = response.with_body(other.to_string()),
            None => {}
        }
        Some(response)
    }

    /// The failure to feed into the classifier.
    pub fn into_error(self) -> ResponseError {
        match (self.response(), self.message) {
            (Some(response), Some(message)) => ResponseError::new(message).with_response(response),
            (Some(response), None) => ResponseError::from_response(response),
            (None, message) => {
                ResponseError::new(message.unwrap_or_else(|| "request failed".to_owned()))
            }
        }
    }
}
