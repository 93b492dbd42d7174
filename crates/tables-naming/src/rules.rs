// SPDX-License-Identifier: MIT OR Apache-2.0
//! Error signatures that really mean "bad table name".
//!
//! Neither backend reports a malformed table name with a dedicated error
//! code. Instead each emits one of a handful of generic codes with a
//! recognisable message. The table below lists those signatures; when one
//! matches, the caller re-checks the name locally with the backend's grammar.

use crate::{Backend, NameGrammar, NameViolation};

/// One (backend, code, message) signature of a naming failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NamingRule {
    /// Backend that emits this signature.
    pub backend: Backend,
    /// Exact wire error code.
    pub code: &'static str,
    /// The rule matches when the message contains any of these.
    pub fragments: &'static [&'static str],
}

impl NamingRule {
    /// Grammar to re-check the name against.
    #[must_use]
    pub fn grammar(&self) -> NameGrammar {
        self.backend.grammar()
    }

    /// Whether `code` and `message` carry this signature.
    #[must_use]
    pub fn matches(&self, code: &str, message: &str) -> bool {
        self.code == code && self.fragments.iter().any(|f| message.contains(f))
    }
}

/// All known naming-failure signatures, checked in order.
///
/// The storage service has shipped both "specified" and "specifed" in the
/// same message, so both spellings stay.
pub const NAMING_RULES: &[NamingRule] = &[
    // Any table or entity operation with forbidden characters in the name.
    NamingRule {
        backend: Backend::Storage,
        code: "InvalidResourceName",
        fragments: &["specified resource name contains invalid characters"],
    },
    NamingRule {
        backend: Backend::Storage,
        code: "InvalidResourceName",
        fragments: &["specifed resource name contains invalid characters"],
    },
    // Names shorter than 3 or longer than 63 characters.
    NamingRule {
        backend: Backend::Storage,
        code: "OutOfRangeInput",
        fragments: &["specified resource name length is not within the permissible limits"],
    },
    // create_table with forbidden characters or a trailing space.
    NamingRule {
        backend: Backend::Cosmos,
        code: "InternalServerError",
        fragments: &[
            "resource name presented contains invalid character",
            "resource name can't end with space",
        ],
    },
    // create_table with a name of 255 or more characters.
    NamingRule {
        backend: Backend::Cosmos,
        code: "BadRequest",
        fragments: &["input name is invalid"],
    },
    // Entity operations and delete_table with forbidden characters.
    NamingRule {
        backend: Backend::Cosmos,
        code: "InvalidInput",
        fragments: &[
            "Request url is invalid",
            "One of the input values is invalid",
            "table name contains an invalid character",
            "Table name cannot end with a space",
        ],
    },
    // Entity operations on some forbidden characters fail authentication
    // instead of validation.
    NamingRule {
        backend: Backend::Cosmos,
        code: "Unauthorized",
        fragments: &[
            "input authorization token can't serve the request",
            "MAC signature found in the HTTP request",
        ],
    },
];

/// First rule among `backends` whose signature `code` and `message` carry.
#[must_use]
pub fn match_rule(code: &str, message: &str, backends: &[Backend]) -> Option<&'static NamingRule> {
    NAMING_RULES
        .iter()
        .find(|rule| backends.contains(&rule.backend) && rule.matches(code, message))
}

/// Re-check `name` when a decoded error carries a naming signature.
///
/// Returns `None` when no signature matches *or* when the name satisfies the
/// grammar anyway; in the latter case the backend error stands as reported.
#[must_use]
pub fn check_table_name(
    code: &str,
    message: &str,
    name: &str,
    backends: &[Backend],
) -> Option<NameViolation> {
    match_rule(code, message, backends)?
        .grammar()
        .validate(name)
        .err()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
