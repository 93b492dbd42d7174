// SPDX-License-Identifier: MIT OR Apache-2.0
//! Table-name grammars for the two backends.
//!
//! Each grammar reports the *first* rule a name breaks so callers get a
//! specific, actionable message instead of a generic "invalid name".

use crate::Backend;
use serde::{Deserialize, Serialize};
use std::fmt;

// ---------------------------------------------------------------------------
// Grammar
// ---------------------------------------------------------------------------

/// Characters a Cosmos table name may never contain.
const COSMOS_FORBIDDEN: &[char] = &['/', '\\', '#', '?'];

/// The character-set and length rules a table name must satisfy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NameGrammar {
    /// `^[A-Za-z][A-Za-z0-9]{2,62}$`
    Storage,
    /// Up to 253 characters outside `/ \ # ?`, then one more that is also
    /// not a space.
    Cosmos,
}

impl NameGrammar {
    /// Shortest accepted name, in characters.
    #[must_use]
    pub const fn min_len(self) -> usize {
        match self {
            Self::Storage => 3,
            Self::Cosmos => 1,
        }
    }

    /// Longest accepted name, in characters.
    #[must_use]
    pub const fn max_len(self) -> usize {
        match self {
            Self::Storage => 63,
            Self::Cosmos => 254,
        }
    }

    /// The backend that enforces this grammar.
    #[must_use]
    pub fn backend(self) -> Backend {
        match self {
            Self::Storage => Backend::Storage,
            Self::Cosmos => Backend::Cosmos,
        }
    }

    /// One-sentence description of the whole grammar.
    #[must_use]
    pub fn summary(self) -> &'static str {
        match self {
            Self::Storage => {
                "Storage table names must be alphanumeric, cannot begin with a number, \
                 and must be between 3-63 characters long."
            }
            Self::Cosmos => {
                "Cosmos table names must contain from 1-254 characters, \
                 and they cannot contain /, \\, #, ?, or a trailing space."
            }
        }
    }

    /// Check `name` against this grammar.
    ///
    /// # Errors
    ///
    /// Returns the first [`NameViolation`] found. Length is checked first,
    /// then the character rules in reading order.
    pub fn validate(self, name: &str) -> Result<(), NameViolation> {
        let reason = match self {
            Self::Storage => storage_violation(name),
            Self::Cosmos => cosmos_violation(name),
        };
        match reason {
            None => Ok(()),
            Some(reason) => Err(NameViolation {
                grammar: self,
                name: name.to_owned(),
                reason,
            }),
        }
    }

    /// Shorthand for `self.validate(name).is_ok()`.
    #[must_use]
    pub fn is_valid(self, name: &str) -> bool {
        self.validate(name).is_ok()
    }
}

impl fmt::Display for NameGrammar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Storage => "storage",
            Self::Cosmos => "cosmos",
        })
    }
}

fn length_violation(grammar: NameGrammar, len: usize) -> Option<ViolationReason> {
    if len < grammar.min_len() {
        Some(ViolationReason::TooShort {
            len,
            min: grammar.min_len(),
        })
    } else if len > grammar.max_len() {
        Some(ViolationReason::TooLong {
            len,
            max: grammar.max_len(),
        })
    } else {
        None
    }
}

fn storage_violation(name: &str) -> Option<ViolationReason> {
    if let Some(reason) = length_violation(NameGrammar::Storage, name.chars().count()) {
        return Some(reason);
    }
    let mut chars = name.chars().enumerate();
    if let Some((_, first)) = chars.next()
        && !first.is_ascii_alphabetic()
    {
        return Some(ViolationReason::LeadingNonLetter { found: first });
    }
    chars
        .find(|(_, c)| !c.is_ascii_alphanumeric())
        .map(|(position, found)| ViolationReason::InvalidCharacter { found, position })
}

fn cosmos_violation(name: &str) -> Option<ViolationReason> {
    if let Some(reason) = length_violation(NameGrammar::Cosmos, name.chars().count()) {
        return Some(reason);
    }
    if let Some((position, found)) = name
        .chars()
        .enumerate()
        .find(|(_, c)| COSMOS_FORBIDDEN.contains(c))
    {
        return Some(ViolationReason::InvalidCharacter { found, position });
    }
    if name.ends_with(' ') {
        return Some(ViolationReason::TrailingSpace);
    }
    None
}

// ---------------------------------------------------------------------------
// Violations
// ---------------------------------------------------------------------------

/// The specific rule a name broke.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "rule", rename_all = "snake_case")]
pub enum ViolationReason {
    /// Fewer characters than the grammar allows.
    TooShort {
        /// Actual length in characters.
        len: usize,
        /// Minimum length.
        min: usize,
    },
    /// More characters than the grammar allows.
    TooLong {
        /// Actual length in characters.
        len: usize,
        /// Maximum length.
        max: usize,
    },
    /// The first character is not an ASCII letter.
    LeadingNonLetter {
        /// The offending character.
        found: char,
    },
    /// A character outside the allowed set.
    InvalidCharacter {
        /// The offending character.
        found: char,
        /// Zero-based character position.
        position: usize,
    },
    /// The name ends with a space.
    TrailingSpace,
}

impl fmt::Display for ViolationReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TooShort { len, min } => {
                write!(f, "name is {len} characters long, at least {min} required")
            }
            Self::TooLong { len, max } => {
                write!(f, "name is {len} characters long, at most {max} allowed")
            }
            Self::LeadingNonLetter { found } => {
                write!(f, "name must begin with a letter, found {found:?}")
            }
            Self::InvalidCharacter { found, position } => {
                write!(f, "character {found:?} at position {position} is not allowed")
            }
            Self::TrailingSpace => f.write_str("name must not end with a space"),
        }
    }
}

/// A table name rejected by a [`NameGrammar`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NameViolation {
    /// Grammar the name was checked against.
    pub grammar: NameGrammar,
    /// The rejected name.
    pub name: String,
    /// First rule the name broke.
    pub reason: ViolationReason,
}

impl fmt::Display for NameViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} Invalid name {:?}: {}.",
            self.grammar.summary(),
            self.name,
            self.reason
        )
    }
}

impl std::error::Error for NameViolation {}

/// Validate `name` against the grammar of `backend` before sending it.
///
/// # Errors
///
/// Returns the first rule the name breaks.
pub fn validate_table_name(name: &str, backend: Backend) -> Result<(), NameViolation> {
    backend.grammar().validate(name)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn reason(grammar: NameGrammar, name: &str) -> ViolationReason {
        grammar.validate(name).unwrap_err().reason
    }

    // -- Storage ---------------------------------------------------------

    #[test]
    fn storage_accepts_boundary_lengths() {
        assert!(NameGrammar::Storage.is_valid("abc"));
        assert!(NameGrammar::Storage.is_valid(&format!("a{}", "1".repeat(62))));
    }

    #[test]
    fn storage_rejects_two_characters() {
        assert_eq!(
            reason(NameGrammar::Storage, "ab"),
            ViolationReason::TooShort { len: 2, min: 3 }
        );
    }

    #[test]
    fn storage_rejects_sixty_four_characters() {
        let name = "a".repeat(64);
        assert_eq!(
            reason(NameGrammar::Storage, &name),
            ViolationReason::TooLong { len: 64, max: 63 }
        );
    }

    #[test]
    fn storage_rejects_leading_digit() {
        assert_eq!(
            reason(NameGrammar::Storage, "1table"),
            ViolationReason::LeadingNonLetter { found: '1' }
        );
    }

    #[test]
    fn storage_rejects_punctuation() {
        assert_eq!(
            reason(NameGrammar::Storage, "my-table"),
            ViolationReason::InvalidCharacter {
                found: '-',
                position: 2
            }
        );
    }

    #[test]
    fn storage_rejects_non_ascii_letters() {
        assert_eq!(
            reason(NameGrammar::Storage, "tablé"),
            ViolationReason::InvalidCharacter {
                found: 'é',
                position: 4
            }
        );
    }

    #[test]
    fn storage_length_counts_characters_not_bytes() {
        // 3 characters, 6 bytes: length passes, charset fails.
        assert!(matches!(
            reason(NameGrammar::Storage, "aéé"),
            ViolationReason::InvalidCharacter { position: 1, .. }
        ));
    }

    // -- Cosmos ----------------------------------------------------------

    #[test]
    fn cosmos_accepts_single_character_and_punctuation() {
        assert!(NameGrammar::Cosmos.is_valid("a"));
        assert!(NameGrammar::Cosmos.is_valid("my table-with.dots,and commas"));
    }

    #[test]
    fn cosmos_rejects_empty() {
        assert_eq!(
            reason(NameGrammar::Cosmos, ""),
            ViolationReason::TooShort { len: 0, min: 1 }
        );
    }

    #[test]
    fn cosmos_length_bound_is_254() {
        assert!(NameGrammar::Cosmos.is_valid(&"x".repeat(254)));
        assert_eq!(
            reason(NameGrammar::Cosmos, &"x".repeat(255)),
            ViolationReason::TooLong { len: 255, max: 254 }
        );
    }

    #[test]
    fn cosmos_rejects_each_forbidden_character() {
        for c in ['/', '\\', '#', '?'] {
            let name = format!("ab{c}cd");
            assert_eq!(
                reason(NameGrammar::Cosmos, &name),
                ViolationReason::InvalidCharacter {
                    found: c,
                    position: 2
                },
                "{name:?}"
            );
        }
    }

    #[test]
    fn cosmos_rejects_trailing_space_only_at_the_end() {
        assert_eq!(
            reason(NameGrammar::Cosmos, "table "),
            ViolationReason::TrailingSpace
        );
        assert!(NameGrammar::Cosmos.is_valid(" table"));
        assert_eq!(reason(NameGrammar::Cosmos, " "), ViolationReason::TrailingSpace);
    }

    #[test]
    fn cosmos_tab_is_not_a_space() {
        assert!(NameGrammar::Cosmos.is_valid("table\t"));
    }

    // -- Messages --------------------------------------------------------

    #[test]
    fn violation_message_names_the_rule() {
        let err = NameGrammar::Storage.validate("ab").unwrap_err();
        let msg = err.to_string();
        assert!(msg.starts_with("Storage table names must be alphanumeric"));
        assert!(msg.contains("\"ab\""));
        assert!(msg.contains("at least 3 required"));
    }

    #[test]
    fn cosmos_summary_lists_forbidden_characters() {
        assert!(NameGrammar::Cosmos.summary().contains("/, \\, #, ?"));
    }

    #[test]
    fn violation_serializes_with_rule_tag() {
        let err = NameGrammar::Cosmos.validate("a/b").unwrap_err();
        let json = serde_json::to_value(&err).unwrap();
        assert_eq!(json["grammar"], "cosmos");
        assert_eq!(json["reason"]["rule"], "invalid_character");
        assert_eq!(json["reason"]["position"], 1);
    }

    #[test]
    fn validate_table_name_uses_backend_grammar() {
        assert!(validate_table_name("a/b", Backend::Storage).is_err());
        assert!(validate_table_name("a/b", Backend::Cosmos).is_err());
        assert!(validate_table_name("a-b", Backend::Storage).is_err());
        assert!(validate_table_name("a-b", Backend::Cosmos).is_ok());
    }
}
