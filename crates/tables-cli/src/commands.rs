// SPDX-License-Identifier: MIT OR Apache-2.0
//! Command implementations.
//!
//! These functions are library-level so they can be tested without
//! spawning the binary.

use anyhow::{Context, Result};
use schemars::schema_for;
use std::error::Error as StdError;
use std::fmt::Write as _;
use tables_classify::ErrorClassifier;
use tables_config::ClassifierConfig;
use tables_error::{ErrorCode, ErrorKind, TableError, TableErrorDto};
use tables_naming::{Backend, NameViolation, validate_table_name};

use crate::fixture::Fixture;

/// Run a captured failure through the classifier.
pub fn explain(
    classifier: &ErrorClassifier,
    fixture: Fixture,
    table_name: Option<&str>,
    transaction: bool,
) -> TableError {
    let failure = fixture.into_error();
    if transaction {
        classifier.process_transaction(failure)
    } else {
        classifier.process(failure, table_name)
    }
}

/// Human-readable report of a classified error and its cause chain.
pub fn render_text(err: &TableError) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "kind:      {}", err.kind());
    if let Some(index) = err.index() {
        let _ = writeln!(out, "index:     {index}");
    }
    let _ = writeln!(
        out,
        "code:      {}",
        err.error_code().map_or("-", |c| c.as_str())
    );
    if let Some(status) = err.status() {
        let _ = writeln!(out, "status:    {status}");
    }
    let _ = writeln!(out, "retryable: {}", err.is_retryable());
    if !err.additional_info().is_empty() {
        let _ = writeln!(out, "info:");
        for (key, value) in err.additional_info().iter() {
            let _ = writeln!(out, "  {key}: {value}");
        }
    }
    let _ = writeln!(out, "message:");
    for line in err.message().lines() {
        let _ = writeln!(out, "  {line}");
    }

    let mut source = err.source();
    while let Some(cause) = source {
        let first = cause.to_string();
        let first = first.lines().next().unwrap_or_default();
        let _ = writeln!(out, "caused by: {first}");
        source = cause.source();
    }
    out
}

/// JSON rendering of a classified error.
pub fn render_json(err: &TableError) -> Result<String> {
    serde_json::to_string_pretty(&TableErrorDto::from(err)).context("serialize error")
}

/// Check `name` against `backend`'s grammar.
pub fn check_name(name: &str, backend: Backend) -> Result<(), NameViolation> {
    validate_table_name(name, backend)
}

/// Known codes and the kind each classifies as, optionally filtered by kind label.
pub fn codes(kind: Option<&str>) -> Vec<(ErrorCode, ErrorKind)> {
    ErrorCode::ALL
        .iter()
        .map(|code| (*code, code.kind()))
        .filter(|(_, k)| kind.is_none_or(|label| k.label() == label))
        .collect()
}

/// JSON schema for [`ClassifierConfig`].
pub fn schema_json() -> Result<String> {
    let value = serde_json::to_value(schema_for!(ClassifierConfig))?;
    serde_json::to_string_pretty(&value).context("serialize schema")
}
