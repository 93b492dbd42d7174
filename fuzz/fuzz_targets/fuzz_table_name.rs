// SPDX-License-Identifier: MIT OR Apache-2.0
//! Fuzz the table-name grammars and the naming-rule table.
//!
//! Verifies:
//! 1. Validating arbitrary names never panics on either backend.
//! 2. Every violation message starts with the grammar summary.
//! 3. Rule matching with arbitrary codes and messages never panics.
#![no_main]
use libfuzzer_sys::fuzz_target;
use tables_naming::{Backend, check_table_name, validate_table_name};

fuzz_target!(|data: &[u8]| {
    let Ok(s) = std::str::from_utf8(data) else {
        return;
    };

    // --- Property 1 & 2 ---
    for backend in Backend::all() {
        if let Err(v) = validate_table_name(s, *backend) {
            assert!(v.to_string().starts_with(v.grammar.summary()));
        }
    }

    // --- Property 3 ---
    let (code, rest) = s.split_once('|').unwrap_or((s, ""));
    let (message, name) = rest.split_once('|').unwrap_or((rest, ""));
    let _ = check_table_name(code, message, name, Backend::all());
});
