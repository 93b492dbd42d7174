// SPDX-License-Identifier: MIT OR Apache-2.0
//! Fuzz the error decoder and the classifier behind it.
//!
//! Verifies:
//! 1. Decoding arbitrary bytes as JSON, XML or sniffed content never panics.
//! 2. The decorated message of a classified error always parses back.
#![no_main]
use libfuzzer_sys::fuzz_target;
use tables_classify::ErrorClassifier;
use tables_decode::{RawResponse, ResponseError, decode_error};
use tables_error::parse_decorated;

const CONTENT_TYPES: &[Option<&str>] = &[
    None,
    Some("application/json;odata=minimalmetadata"),
    Some("application/xml"),
    Some("text/plain"),
];

fuzz_target!(|data: &[u8]| {
    let selector = data.first().copied().unwrap_or(0) as usize;
    let body = data.get(1..).unwrap_or_default();
    let mut response = RawResponse::new(400 + (selector % 100) as u16).with_body(body);
    if let Some(ct) = CONTENT_TYPES[selector % CONTENT_TYPES.len()] {
        response = response.with_header("Content-Type", ct);
    }

    // --- Property 1: decoding never panics ---
    let decoded = decode_error(&response);
    let _ = format!("{decoded:?}");

    // --- Property 2: decorated suffix is recoverable when fields are single-line ---
    let single_line = !decoded.message.contains('\n')
        && decoded
            .extra
            .iter()
            .all(|(k, v)| !k.contains(['\n', ':']) && !v.contains('\n'))
        && decoded.code.as_ref().is_none_or(|c| !c.as_str().contains('\n'));
    let err = ErrorClassifier::default().process(ResponseError::from_response(response), Some("fuzz"));
    if single_line && err.name_violation().is_none() {
        let parts = parse_decorated(err.message()).expect("decorated message must parse");
        assert_eq!(parts.code, err.error_code().map(|c| c.as_str()).filter(|c| !c.is_empty()));
    }
});
