// SPDX-License-Identifier: MIT OR Apache-2.0
//! Failing-operation index of a batch error.

/// Zero-based index of the failed sub-operation encoded in a batch error
/// message such as `"3:The specified entity already exists."`.
///
/// Everything before the first `:` (the whole message if there is none) is
/// parsed as a non-negative integer; anything unparseable yields `0`.
#[must_use]
pub fn extract_index(message: &str) -> usize {
    let head = message.split_once(':').map_or(message, |(head, _)| head);
    head.trim().parse().unwrap_or(0)
}
