// SPDX-License-Identifier: MIT OR Apache-2.0
#![doc = include_str!("../README.md")]
#![deny(unsafe_code)]
#![warn(missing_docs)]

//! # tables-error
//!
//! Every failed table-service call surfaces as a [`TableError`]: an
//! [`ErrorKind`] to branch on, the [`WireCode`] the service sent, a message
//! decorated with that code and any additional fields, and the original
//! failure as its [`source`](std::error::Error::source).

pub mod code;
pub mod info;
pub mod message;
pub mod transaction;

pub use code::{ErrorCode, UnknownErrorCode, WireCode};
pub use info::AdditionalInfo;
pub use message::{DecoratedParts, ERROR_CODE_PREFIX, decorate_message, parse_decorated};
pub use tables_naming::NameViolation;
pub use transaction::extract_index;

use serde::{Deserialize, Serialize};
use std::fmt;

/// HTTP statuses worth retrying regardless of the error code.
const TRANSIENT_STATUSES: &[u16] = &[408, 429, 500, 502, 503, 504];

// ---------------------------------------------------------------------------
// ErrorKind
// ---------------------------------------------------------------------------

/// What went wrong, at the granularity callers branch on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ErrorKind {
    /// The table, entity or resource does not exist.
    NotFound,
    /// The table, entity, resource or account already exists.
    AlreadyExists,
    /// A conditional write lost to a concurrent modification.
    ModifiedConflict,
    /// The credentials were rejected.
    AuthFailure,
    /// The table name breaks the backend's naming grammar.
    NamingValidation {
        /// The rule the name broke.
        violation: NameViolation,
    },
    /// Any other service error.
    Generic,
    /// A sub-operation of a batch failed.
    Transaction {
        /// Zero-based position of the failed sub-operation.
        index: usize,
    },
    /// The batch was rejected with `413 Request Entity Too Large`.
    RequestTooLarge {
        /// Zero-based position of the failed sub-operation.
        index: usize,
    },
}

impl ErrorKind {
    /// Stable snake_case label.
    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            Self::NotFound => "not_found",
            Self::AlreadyExists => "already_exists",
            Self::ModifiedConflict => "modified_conflict",
            Self::AuthFailure => "auth_failure",
            Self::NamingValidation { .. } => "naming_validation",
            Self::Generic => "generic",
            Self::Transaction { .. } => "transaction",
            Self::RequestTooLarge { .. } => "request_too_large",
        }
    }

    /// Batch position for transaction kinds.
    #[must_use]
    pub fn index(&self) -> Option<usize> {
        match self {
            Self::Transaction { index } | Self::RequestTooLarge { index } => Some(*index),
            _ => None,
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

// ---------------------------------------------------------------------------
// TableError
// ---------------------------------------------------------------------------

/// Unified table-service error.
///
/// # Builder usage
///
/// ```
/// use tables_error::{AdditionalInfo, ErrorCode, ErrorKind, TableError, WireCode};
///
/// let info: AdditionalInfo = [("RequestId", "9b1c")].into_iter().collect();
/// let err = TableError::decorated(
///     ErrorKind::AlreadyExists,
///     Some(WireCode::from(ErrorCode::TableAlreadyExists)),
///     "The table specified already exists.",
///     info,
/// )
/// .with_status(409);
///
/// assert_eq!(err.error_code().unwrap(), &ErrorCode::TableAlreadyExists);
/// assert!(err.message().ends_with("\nErrorCode:TableAlreadyExists\nRequestId:9b1c"));
/// ```
pub struct TableError {
    kind: ErrorKind,
    code: Option<WireCode>,
    message: String,
    additional_info: AdditionalInfo,
    status: Option<u16>,
    source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl TableError {
    /// Create an error with a message used verbatim.
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            code: None,
            message: message.into(),
            additional_info: AdditionalInfo::new(),
            status: None,
            source: None,
        }
    }

    /// Create an error whose message is `base` decorated with the code and
    /// additional fields (see [`decorate_message`]).
    pub fn decorated(
        kind: ErrorKind,
        code: Option<WireCode>,
        base: &str,
        additional_info: AdditionalInfo,
    ) -> Self {
        let message = decorate_message(base, code.as_ref().map(WireCode::as_str), &additional_info);
        Self {
            kind,
            code,
            message,
            additional_info,
            status: None,
            source: None,
        }
    }

    /// Record the HTTP status of the failed response.
    #[must_use]
    pub fn with_status(mut self, status: u16) -> Self {
        self.status = Some(status);
        self
    }

    /// Attach the wire code without touching the message.
    #[must_use]
    pub fn with_code(mut self, code: WireCode) -> Self {
        self.code = Some(code);
        self
    }

    /// Attach an underlying cause.
    #[must_use]
    pub fn with_source(mut self, source: impl std::error::Error + Send + Sync + 'static) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    /// Attach an already boxed cause.
    #[must_use]
    pub fn with_boxed_source(mut self, source: Box<dyn std::error::Error + Send + Sync>) -> Self {
        self.source = Some(source);
        self
    }

    /// Category of the failure.
    pub fn kind(&self) -> &ErrorKind {
        &self.kind
    }

    /// The code the service sent, if any.
    pub fn error_code(&self) -> Option<&WireCode> {
        self.code.as_ref()
    }

    /// Decorated, human-readable message.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Additional fields the service sent, in decode order.
    pub fn additional_info(&self) -> &AdditionalInfo {
        &self.additional_info
    }

    /// HTTP status of the failed response, if there was one.
    pub fn status(&self) -> Option<u16> {
        self.status
    }

    /// Batch position for transaction errors.
    pub fn index(&self) -> Option<usize> {
        self.kind.index()
    }

    /// The naming rule that was broken, for naming errors.
    pub fn name_violation(&self) -> Option<&NameViolation> {
        match &self.kind {
            ErrorKind::NamingValidation { violation } => Some(violation),
            _ => None,
        }
    }

    /// Whether repeating the same request may succeed.
    ///
    /// Only generic and transaction failures qualify, and only when the code
    /// or the status marks them as transient.
    pub fn is_retryable(&self) -> bool {
        if !matches!(
            self.kind,
            ErrorKind::Generic | ErrorKind::Transaction { .. }
        ) {
            return false;
        }
        let transient_code = self
            .code
            .as_ref()
            .and_then(WireCode::known)
            .is_some_and(|c| c.is_transient());
        let transient_status = self
            .status
            .is_some_and(|s| TRANSIENT_STATUSES.contains(&s));
        transient_code || transient_status
    }
}

impl fmt::Debug for TableError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut d = f.debug_struct("TableError");
        d.field("kind", &self.kind);
        d.field("code", &self.code);
        d.field("message", &self.message);
        if !self.additional_info.is_empty() {
            d.field("additional_info", &self.additional_info);
        }
        if let Some(status) = self.status {
            d.field("status", &status);
        }
        if let Some(ref src) = self.source {
            d.field("source", &src.to_string());
        }
        d.finish()
    }
}

impl fmt::Display for TableError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for TableError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_ref()
            .map(|e| e.as_ref() as &(dyn std::error::Error + 'static))
    }
}

// ---------------------------------------------------------------------------
// Serialization support
// ---------------------------------------------------------------------------

/// Serialisable snapshot of a [`TableError`] (without the opaque source).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TableErrorDto {
    /// Error kind.
    #[serde(flatten)]
    pub kind: ErrorKind,
    /// Wire code, if any.
    pub error_code: Option<WireCode>,
    /// Decorated message.
    pub message: String,
    /// Additional fields.
    pub additional_info: AdditionalInfo,
    /// HTTP status, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<u16>,
    /// String representation of the source error, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_message: Option<String>,
}

impl From<&TableError> for TableErrorDto {
    fn from(err: &TableError) -> Self {
        Self {
            kind: err.kind.clone(),
            error_code: err.code.clone(),
            message: err.message.clone(),
            additional_info: err.additional_info.clone(),
            status: err.status,
            source_message: err.source.as_ref().map(|s| s.to_string()),
        }
    }
}

impl From<TableErrorDto> for TableError {
    fn from(dto: TableErrorDto) -> Self {
        Self {
            kind: dto.kind,
            code: dto.error_code,
            message: dto.message,
            additional_info: dto.additional_info,
            status: dto.status,
            source: None,
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
