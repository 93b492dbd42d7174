// SPDX-License-Identifier: MIT OR Apache-2.0
#![doc = include_str!("../README.md")]
#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod decoder;
pub mod response;

pub use decoder::{BodyFormat, DecodedError, ERROR_CODE_HEADER, ErrorDecoder, decode_error};
pub use response::{HttpResponse, RawResponse, ResponseError};
