// SPDX-License-Identifier: MIT OR Apache-2.0
//! Decorated error messages.
//!
//! A decorated message is the service's human-readable message followed by
//! one `ErrorCode:<code>` line and one `<key>:<value>` line per additional
//! field:
//!
//! ```text
//! The specified entity already exists.
//! ErrorCode:EntityAlreadyExists
//! RequestId:5f3a...
//! ```

use crate::AdditionalInfo;

/// Marker that starts the machine-readable suffix.
pub const ERROR_CODE_PREFIX: &str = "ErrorCode:";

/// Append the code line and one line per additional field to `base`.
///
/// A missing code renders as an empty value. Keys and values are written
/// as-is, so a value containing `\n` (or a key containing `:` or `\n`)
/// produces a message [`parse_decorated`] cannot split back.
#[must_use]
pub fn decorate_message(base: &str, code: Option<&str>, info: &AdditionalInfo) -> String {
    let mut out = String::with_capacity(base.len() + 32);
    out.push_str(base);
    out.push('\n');
    out.push_str(ERROR_CODE_PREFIX);
    out.push_str(code.unwrap_or_default());
    for (key, value) in info.iter() {
        out.push('\n');
        out.push_str(key);
        out.push(':');
        out.push_str(value);
    }
    out
}

/// The pieces of a decorated message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecoratedParts<'a> {
    /// The message before the suffix.
    pub base: &'a str,
    /// The code, or `None` if the line was empty.
    pub code: Option<&'a str>,
    /// Additional fields in order.
    pub additional_info: AdditionalInfo,
}

/// Split a decorated message back into its parts.
///
/// Returns `None` if there is no `ErrorCode:` line or a following line is
/// not of the form `<key>:<value>`. That includes messages whose extra
/// values span several lines, e.g. a multi-line `ExceptionDetails` field.
#[must_use]
pub fn parse_decorated(message: &str) -> Option<DecoratedParts<'_>> {
    let marker = format!("\n{ERROR_CODE_PREFIX}");
    let at = message.rfind(&marker)?;
    let base = &message[..at];
    let mut lines = message[at + marker.len()..].split('\n');
    let code = lines.next().filter(|c| !c.is_empty());

    let mut additional_info = AdditionalInfo::new();
    for line in lines {
        let (key, value) = line.split_once(':')?;
        additional_info.insert(key, value);
    }

    Some(DecoratedParts {
        base,
        code,
        additional_info,
    })
}
