// SPDX-License-Identifier: MIT OR Apache-2.0
#![doc = include_str!("../README.md")]
#![deny(unsafe_code)]
#![warn(missing_docs)]

//! # tables-naming
//!
//! Backend dialects, table-name grammars, and the signatures under which a
//! backend error actually reports a bad table name.

pub mod grammar;
pub mod rules;

pub use grammar::{NameGrammar, NameViolation, ViolationReason, validate_table_name};
pub use rules::{NAMING_RULES, NamingRule, check_table_name, match_rule};

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

// ── Backend enum ────────────────────────────────────────────────────────

/// The two table-service implementations a client may talk to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum Backend {
    /// Table service hosted in a storage account.
    Storage,
    /// Table API hosted on a Cosmos DB account.
    Cosmos,
}

/// Host suffixes that identify a Cosmos table endpoint.
const COSMOS_HOST_SUFFIXES: &[&str] = &[
    ".table.cosmos.azure.com",
    ".table.cosmosdb.azure.com",
    ".documents.azure.com",
];

impl Backend {
    /// Human-readable label for this backend.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Storage => "Storage",
            Self::Cosmos => "Cosmos",
        }
    }

    /// Returns all known backends.
    #[must_use]
    pub fn all() -> &'static [Backend] {
        &[Self::Storage, Self::Cosmos]
    }

    /// The table-name grammar this backend enforces.
    #[must_use]
    pub fn grammar(self) -> NameGrammar {
        match self {
            Self::Storage => NameGrammar::Storage,
            Self::Cosmos => NameGrammar::Cosmos,
        }
    }

    /// Guess the backend from an account endpoint URL.
    ///
    /// Anything that is not a recognised Cosmos host (including local
    /// emulators and malformed input) is treated as a storage endpoint.
    #[must_use]
    pub fn from_endpoint(endpoint: &str) -> Self {
        let host = endpoint_host(endpoint).to_ascii_lowercase();
        if COSMOS_HOST_SUFFIXES.iter().any(|s| host.ends_with(s)) {
            Self::Cosmos
        } else {
            Self::Storage
        }
    }
}

impl std::fmt::Display for Backend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

impl std::str::FromStr for Backend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "storage" => Ok(Self::Storage),
            "cosmos" | "cosmosdb" => Ok(Self::Cosmos),
            other => Err(format!("unknown backend: {other}")),
        }
    }
}

/// Strip scheme, credentials, port, path and query from an endpoint.
fn endpoint_host(endpoint: &str) -> &str {
    let rest = endpoint
        .split_once("://")
        .map_or(endpoint, |(_, rest)| rest);
    let authority = rest.split(['/', '?', '#']).next().unwrap_or(rest);
    let host = authority
        .rsplit_once('@')
        .map_or(authority, |(_, host)| host);
    host.split(':').next().unwrap_or(host)
}

// ── Tests ───────────────────────────────────────────────────────────────
