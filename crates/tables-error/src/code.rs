// SPDX-License-Identifier: MIT OR Apache-2.0
//! Wire error codes.

use crate::ErrorKind;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

// ---------------------------------------------------------------------------
// ErrorCode
// ---------------------------------------------------------------------------

macro_rules! error_codes {
    ($( $(#[$doc:meta])* $variant:ident => $wire:literal, )+) => {
        /// Error codes documented by the table services.
        ///
        /// Each variant maps to exactly one case-sensitive wire string that
        /// never changes.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub enum ErrorCode {
            $( $(#[$doc])* $variant, )+
        }

        impl ErrorCode {
            /// Every known code, in declaration order.
            pub const ALL: &'static [ErrorCode] = &[ $( Self::$variant, )+ ];

            /// Stable wire representation (e.g. `"TableNotFound"`).
            #[must_use]
            pub fn as_str(&self) -> &'static str {
                match self {
                    $( Self::$variant => $wire, )+
                }
            }
        }

        impl FromStr for ErrorCode {
            type Err = UnknownErrorCode;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $( $wire => Ok(Self::$variant), )+
                    other => Err(UnknownErrorCode(other.to_owned())),
                }
            }
        }
    };
}

error_codes! {
    // -- Generic storage --
    /// The account already exists.
    AccountAlreadyExists => "AccountAlreadyExists",
    /// The account is still being created.
    AccountBeingCreated => "AccountBeingCreated",
    /// The account has been disabled.
    AccountIsDisabled => "AccountIsDisabled",
    /// Request signature did not match.
    AuthenticationFailed => "AuthenticationFailed",
    /// The request is not authorised to perform the operation.
    AuthorizationFailure => "AuthorizationFailure",
    /// No credentials were supplied.
    NoAuthenticationInformation => "NoAuthenticationInformation",
    /// Conditional headers are not supported here.
    ConditionHeadersNotSupported => "ConditionHeadersNotSupported",
    /// A conditional header was not satisfied.
    ConditionNotMet => "ConditionNotMet",
    /// A metadata key was empty.
    EmptyMetadataKey => "EmptyMetadataKey",
    /// The account lacks permissions for the operation.
    InsufficientAccountPermissions => "InsufficientAccountPermissions",
    /// The service hit an internal error.
    InternalError => "InternalError",
    /// Malformed authentication information.
    InvalidAuthenticationInfo => "InvalidAuthenticationInfo",
    /// A header value is invalid.
    InvalidHeaderValue => "InvalidHeaderValue",
    /// The HTTP verb is not recognised.
    InvalidHttpVerb => "InvalidHttpVerb",
    /// One of the request inputs is invalid.
    InvalidInput => "InvalidInput",
    /// The MD5 value is malformed.
    InvalidMd5 => "InvalidMd5",
    /// Metadata is malformed.
    InvalidMetadata => "InvalidMetadata",
    /// A query parameter value is invalid.
    InvalidQueryParameterValue => "InvalidQueryParameterValue",
    /// The requested range is invalid.
    InvalidRange => "InvalidRange",
    /// The resource name is malformed.
    InvalidResourceName => "InvalidResourceName",
    /// The request URI is invalid.
    InvalidUri => "InvalidUri",
    /// The XML document is malformed.
    InvalidXmlDocument => "InvalidXmlDocument",
    /// An XML node value is invalid.
    InvalidXmlNodeValue => "InvalidXmlNodeValue",
    /// The MD5 of the body did not match.
    Md5Mismatch => "Md5Mismatch",
    /// Metadata exceeds the size limit.
    MetadataTooLarge => "MetadataTooLarge",
    /// `Content-Length` is missing.
    MissingContentLengthHeader => "MissingContentLengthHeader",
    /// A required query parameter is missing.
    MissingRequiredQueryParameter => "MissingRequiredQueryParameter",
    /// A required header is missing.
    MissingRequiredHeader => "MissingRequiredHeader",
    /// A required XML node is missing.
    MissingRequiredXmlNode => "MissingRequiredXmlNode",
    /// Several conditional headers were sent together.
    MultipleConditionHeadersNotSupported => "MultipleConditionHeadersNotSupported",
    /// The operation did not finish in time.
    OperationTimedOut => "OperationTimedOut",
    /// An input is out of range (including name length).
    OutOfRangeInput => "OutOfRangeInput",
    /// A query parameter is out of range.
    OutOfRangeQueryParameterValue => "OutOfRangeQueryParameterValue",
    /// The request body exceeds the size limit.
    RequestBodyTooLarge => "RequestBodyTooLarge",
    /// The resource type does not match.
    ResourceTypeMismatch => "ResourceTypeMismatch",
    /// The request URL could not be parsed.
    RequestUrlFailedToParse => "RequestUrlFailedToParse",
    /// The resource already exists.
    ResourceAlreadyExists => "ResourceAlreadyExists",
    /// The resource does not exist.
    ResourceNotFound => "ResourceNotFound",
    /// The service is busy.
    ServerBusy => "ServerBusy",
    /// A header is not supported.
    UnsupportedHeader => "UnsupportedHeader",
    /// An XML node is not supported.
    UnsupportedXmlNode => "UnsupportedXmlNode",
    /// A query parameter is not supported.
    UnsupportedQueryParameter => "UnsupportedQueryParameter",
    /// The HTTP verb is not supported.
    UnsupportedHttpVerb => "UnsupportedHttpVerb",

    // -- Table --
    /// The same property was specified twice.
    DuplicatePropertiesSpecified => "DuplicatePropertiesSpecified",
    /// The entity does not exist.
    EntityNotFound => "EntityNotFound",
    /// The entity already exists.
    EntityAlreadyExists => "EntityAlreadyExists",
    /// The entity exceeds the size limit.
    EntityTooLarge => "EntityTooLarge",
    /// The host header is missing.
    HostInformationNotPresent => "HostInformationNotPresent",
    /// A batch touches the same row twice.
    InvalidDuplicateRow => "InvalidDuplicateRow",
    /// A property value has an unsupported type.
    InvalidValueType => "InvalidValueType",
    /// The JSON format is not supported.
    JsonFormatNotSupported => "JsonFormatNotSupported",
    /// The method is not allowed.
    MethodNotAllowed => "MethodNotAllowed",
    /// The operation is not implemented.
    NotImplemented => "NotImplemented",
    /// Properties were sent without values.
    PropertiesNeedValue => "PropertiesNeedValue",
    /// A property name is invalid.
    PropertyNameInvalid => "PropertyNameInvalid",
    /// A property name is too long.
    PropertyNameTooLong => "PropertyNameTooLong",
    /// A property value is too large.
    PropertyValueTooLarge => "PropertyValueTooLarge",
    /// The table already exists.
    TableAlreadyExists => "TableAlreadyExists",
    /// The table is being deleted.
    TableBeingDeleted => "TableBeingDeleted",
    /// The table does not exist.
    TableNotFound => "TableNotFound",
    /// The entity has too many properties.
    TooManyProperties => "TooManyProperties",
    /// The entity's ETag did not match.
    UpdateConditionNotSatisfied => "UpdateConditionNotSatisfied",
    /// `X-HTTP-Method` appears the wrong number of times.
    XMethodIncorrectCount => "XMethodIncorrectCount",
    /// `X-HTTP-Method` has an invalid value.
    XMethodIncorrectValue => "XMethodIncorrectValue",
    /// `X-HTTP-Method` was sent on a non-POST request.
    XMethodNotUsingPost => "XMethodNotUsingPost",
}

impl ErrorCode {
    /// The [`ErrorKind`] callers should see for this code.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::ConditionNotMet | Self::UpdateConditionNotSatisfied => {
                ErrorKind::ModifiedConflict
            }

            Self::InvalidAuthenticationInfo | Self::AuthenticationFailed => ErrorKind::AuthFailure,

            Self::ResourceNotFound | Self::TableNotFound | Self::EntityNotFound => {
                ErrorKind::NotFound
            }

            Self::ResourceAlreadyExists
            | Self::TableAlreadyExists
            | Self::AccountAlreadyExists
            | Self::EntityAlreadyExists => ErrorKind::AlreadyExists,

            _ => ErrorKind::Generic,
        }
    }

    /// Whether a retry of the same request may succeed.
    #[must_use]
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            Self::InternalError | Self::OperationTimedOut | Self::ServerBusy
        )
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for ErrorCode {
    fn serialize<S: Serializer>(&self, ser: S) -> Result<S::Ok, S::Error> {
        ser.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for ErrorCode {
    fn deserialize<D: Deserializer<'de>>(de: D) -> Result<Self, D::Error> {
        let s = String::deserialize(de)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// A wire string that is not a known [`ErrorCode`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownErrorCode(pub String);

impl fmt::Display for UnknownErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown error code {:?}", self.0)
    }
}

impl std::error::Error for UnknownErrorCode {}

// ---------------------------------------------------------------------------
// WireCode
// ---------------------------------------------------------------------------

/// The error code a service actually sent.
///
/// Codes outside the documented set (Cosmos emits several, such as
/// `BadRequest`) are kept verbatim so callers can still inspect them.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum WireCode {
    /// A documented code.
    Known(ErrorCode),
    /// Any other string, exactly as received.
    Unknown(String),
}

impl WireCode {
    /// Map a wire string onto the known set, keeping it raw otherwise.
    #[must_use]
    pub fn parse(s: &str) -> Self {
        match s.parse::<ErrorCode>() {
            Ok(code) => Self::Known(code),
            Err(UnknownErrorCode(raw)) => Self::Unknown(raw),
        }
    }

    /// The code as it appeared on the wire.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Known(code) => code.as_str(),
            Self::Unknown(raw) => raw,
        }
    }

    /// The known code, if any.
    #[must_use]
    pub fn known(&self) -> Option<ErrorCode> {
        match self {
            Self::Known(code) => Some(*code),
            Self::Unknown(_) => None,
        }
    }

    /// [`ErrorCode::kind`] for known codes, [`ErrorKind::Generic`] otherwise.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        self.known().map_or(ErrorKind::Generic, |code| code.kind())
    }
}

impl From<ErrorCode> for WireCode {
    fn from(code: ErrorCode) -> Self {
        Self::Known(code)
    }
}

impl From<&str> for WireCode {
    fn from(s: &str) -> Self {
        Self::parse(s)
    }
}

impl PartialEq<ErrorCode> for WireCode {
    fn eq(&self, other: &ErrorCode) -> bool {
        self.known() == Some(*other)
    }
}

impl PartialEq<str> for WireCode {
    fn eq(&self, other: &str) -> bool {
        self.as_str() == other
    }
}

impl PartialEq<&str> for WireCode {
    fn eq(&self, other: &&str) -> bool {
        self.as_str() == *other
    }
}

impl fmt::Display for WireCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for WireCode {
    fn serialize<S: Serializer>(&self, ser: S) -> Result<S::Ok, S::Error> {
        ser.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for WireCode {
    fn deserialize<D: Deserializer<'de>>(de: D) -> Result<Self, D::Error> {
        let s = String::deserialize(de)?;
        Ok(Self::parse(&s))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
