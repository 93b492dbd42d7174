// SPDX-License-Identifier: MIT OR Apache-2.0
//! Decode, classify and refine.

use tables_config::ClassifierConfig;
use tables_decode::{DecodedError, ErrorDecoder, HttpResponse, ResponseError};
use tables_error::{ErrorKind, TableError, decorate_message, extract_index};
use tables_naming::{Backend, match_rule};
use tracing::{debug, warn};

/// Status the service answers with when a batch exceeds the size limit.
const REQUEST_ENTITY_TOO_LARGE: u16 = 413;

/// Turns failed responses into [`TableError`]s.
#[derive(Debug, Clone)]
pub struct ErrorClassifier {
    decoder: ErrorDecoder,
    validate_names: bool,
    backends: Vec<Backend>,
}

impl Default for ErrorClassifier {
    fn default() -> Self {
        Self::new(&ClassifierConfig::default())
    }
}

impl ErrorClassifier {
    /// Build a classifier from `config`.
    pub fn new(config: &ClassifierConfig) -> Self {
        Self {
            decoder: ErrorDecoder::new(config.error_code_header()),
            validate_names: config.validate_names(),
            backends: config.backends().to_vec(),
        }
    }

    /// Backends whose naming rules are consulted.
    pub fn backends(&self) -> &[Backend] {
        &self.backends
    }

    /// Decode a failed response.
    pub fn decode<R: HttpResponse + ?Sized>(&self, response: &R) -> DecodedError {
        self.decoder.decode(response)
    }

    /// Classify by error code and decorate the message.
    ///
    /// Codes outside the known set classify as [`ErrorKind::Generic`] and
    /// are kept verbatim.
    pub fn classify(&self, decoded: DecodedError) -> TableError {
        let kind = decoded
            .code
            .as_ref()
            .map_or(ErrorKind::Generic, |code| code.kind());
        self.classify_as(decoded, kind)
    }

    /// Decorate the message under a caller-chosen kind.
    pub fn classify_as(&self, decoded: DecodedError, kind: ErrorKind) -> TableError {
        TableError::decorated(kind, decoded.code, &decoded.message, decoded.extra)
    }

    /// Replace `err` with a naming error if the service's complaint carries
    /// a naming signature and `table_name` really breaks that grammar.
    ///
    /// The original error becomes the source of the naming error. If the
    /// name is fine, missing or empty, `err` is returned unchanged.
    pub fn refine_naming(&self, err: TableError, table_name: Option<&str>) -> TableError {
        if !self.validate_names {
            return err;
        }
        let (Some(name), Some(code)) = (table_name.filter(|n| !n.is_empty()), err.error_code())
        else {
            return err;
        };
        let Some(rule) = match_rule(code.as_str(), err.message(), &self.backends) else {
            return err;
        };

        let violation = match rule.grammar().validate(name) {
            Ok(()) => {
                debug!(
                    target: "tables.classify",
                    code = %code,
                    grammar = %rule.grammar(),
                    table = name,
                    "naming signature matched but the name is valid; keeping service error"
                );
                return err;
            }
            Err(violation) => violation,
        };

        warn!(
            target: "tables.classify",
            code = %code,
            backend = %rule.backend,
            table = name,
            reason = %violation.reason,
            "service rejected table name"
        );
        let code = code.clone();
        let status = err.status();
        let message = violation.to_string();
        let mut refined = TableError::new(ErrorKind::NamingValidation { violation }, message)
            .with_code(code)
            .with_source(err);
        if let Some(status) = status {
            refined = refined.with_status(status);
        }
        refined
    }

    /// Full error path for a single-entity or table operation.
    pub fn process(&self, error: ResponseError, table_name: Option<&str>) -> TableError {
        let (decoded, status) = match self.decode_failure(&error) {
            Some(parts) => parts,
            None => return without_response(error),
        };
        let classified = self.classify(decoded).with_status(status).with_source(error);
        debug!(
            target: "tables.classify",
            kind = %classified.kind(),
            code = classified.error_code().map(|c| c.as_str()),
            status,
            "classified service error"
        );
        self.refine_naming(classified, table_name)
    }

    /// Full error path for a batch submission.
    ///
    /// A `413` becomes [`ErrorKind::RequestTooLarge`], anything else
    /// [`ErrorKind::Transaction`]; both carry the index of the failed
    /// sub-operation. Names are not re-validated here.
    pub fn process_transaction(&self, error: ResponseError) -> TableError {
        let (decoded, status) = match self.decode_failure(&error) {
            Some(parts) => parts,
            None => return without_response(error),
        };
        let decorated = decorate_message(
            &decoded.message,
            decoded.code.as_ref().map(|c| c.as_str()),
            &decoded.extra,
        );
        let index = extract_index(&decorated);
        let kind = if status == REQUEST_ENTITY_TOO_LARGE {
            ErrorKind::RequestTooLarge { index }
        } else {
            ErrorKind::Transaction { index }
        };
        let classified = self
            .classify_as(decoded, kind)
            .with_status(status)
            .with_source(error);
        debug!(
            target: "tables.classify",
            kind = %classified.kind(),
            index,
            status,
            "classified batch error"
        );
        classified
    }

    fn decode_failure(&self, error: &ResponseError) -> Option<(DecodedError, u16)> {
        let response = error.response()?;
        let decoded = self
            .decode(response)
            .with_fallback_message(error.message());
        Some((decoded, response.status()))
    }
}

fn without_response(error: ResponseError) -> TableError {
    debug!(
        target: "tables.classify",
        error = %error,
        "failure carried no response; surfacing transport error"
    );
    TableError::new(ErrorKind::Generic, error.message().to_owned()).with_source(error)
}
