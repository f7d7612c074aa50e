// opcua-client - an OPC UA client communication stack
// SPDX-License-Identifier: MPL-2.0

//! Contains the `StatusCode` type. Values are the subset of the codes from
//! OPC UA Part 6 Annex A that this stack raises or interprets, plus the
//! severity / info bits that may accompany any code on the wire.

#![allow(non_upper_case_globals)]

use std::{
    error::Error,
    fmt,
    fmt::Formatter,
    io::{self, Read, Write},
};

use crate::types::encoding::*;

bitflags! {
    pub struct StatusCode: u32 {
        // Severity bits
        const IS_ERROR             = 0x8000_0000;
        const IS_UNCERTAIN         = 0x4000_0000;

        // Mask for the code portion and for any accompanying flag bits
        const STATUS_MASK          = 0xffff_0000;
        const BIT_MASK             = 0x0000_ffff;

        // Info bits that may ride along with a code on data values
        const LIMIT_LOW            = 0x0000_0100;
        const LIMIT_HIGH           = 0x0000_0200;
        const LIMIT_CONSTANT       = 0x0000_0300;
        const HISTORICAL_CALCULATED = 0x0000_0001;

        const Good                          = 0x0000_0000;
        const UncertainLastUsableValue      = 0x4090_0000;
        const BadUnexpectedError            = 0x8001_0000;
        const BadInternalError              = 0x8002_0000;
        const BadCommunicationError         = 0x8005_0000;
        const BadUnknownResponse            = 0x8006_0000;
        const BadDecodingError              = 0x8007_0000;
        const BadEncodingError              = 0x8008_0000;
        const BadEncodingLimitsExceeded     = 0x8009_0000;
        const BadRequestTooLarge            = 0x80b8_0000;
        const BadResponseTooLarge           = 0x80b9_0000;
        const BadTimeout                    = 0x800a_0000;
        const BadServiceUnsupported         = 0x800b_0000;
        const BadServerNotConnected         = 0x800d_0000;
        const BadNothingToDo                = 0x800f_0000;
        const BadSecurityChecksFailed       = 0x8013_0000;
        const BadIdentityTokenInvalid       = 0x8020_0000;
        const BadIdentityTokenRejected      = 0x8021_0000;
        const BadSecureChannelIdInvalid     = 0x8022_0000;
        const BadNonceInvalid               = 0x8024_0000;
        const BadSessionIdInvalid           = 0x8025_0000;
        const BadSessionClosed              = 0x8026_0000;
        const BadSessionNotActivated        = 0x8027_0000;
        const BadRequestCancelledByClient   = 0x802c_0000;
        const BadNodeIdInvalid              = 0x8033_0000;
        const BadNodeIdUnknown              = 0x8034_0000;
        const BadAttributeIdInvalid         = 0x8035_0000;
        const BadNotSupported               = 0x803d_0000;
        const BadSecurityModeRejected       = 0x8053_0000;
        const BadSecurityPolicyRejected     = 0x8054_0000;
        const BadTcpMessageTypeInvalid      = 0x807e_0000;
        const BadTcpSecureChannelUnknown    = 0x807f_0000;
        const BadTcpMessageTooLarge         = 0x8080_0000;
        const BadTcpInternalError           = 0x8082_0000;
        const BadTcpEndpointUrlInvalid      = 0x8083_0000;
        const BadSecureChannelClosed        = 0x8086_0000;
        const BadSecureChannelTokenUnknown  = 0x8087_0000;
        const BadSequenceNumberInvalid      = 0x8088_0000;
        const BadNotConnected               = 0x808a_0000;
        const BadInvalidArgument            = 0x80ab_0000;
        const BadConnectionRejected         = 0x80ac_0000;
        const BadConnectionClosed           = 0x80ae_0000;
        const BadInvalidState               = 0x80af_0000;
    }
}

impl fmt::Display for StatusCode {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        // Displays the StatusCode as its name, or its name + bit flags
        let bits = self.bitflags();
        if bits.is_empty() {
            write!(f, "{}", self.name())
        } else {
            write!(f, "{}+{:?}", self.name(), bits)
        }
    }
}

impl BinaryEncoder<StatusCode> for StatusCode {
    fn byte_len(&self) -> usize {
        4
    }

    fn encode<S: Write>(&self, stream: &mut S) -> EncodingResult<usize> {
        write_u32(stream, self.bits())
    }

    fn decode<S: Read>(stream: &mut S, _: &DecodingOptions) -> EncodingResult<Self> {
        Ok(StatusCode::from_bits_truncate(read_u32(stream)?))
    }
}

impl Error for StatusCode {}

impl Default for StatusCode {
    fn default() -> Self {
        StatusCode::Good
    }
}

impl From<StatusCode> for io::Error {
    fn from(e: StatusCode) -> io::Error {
        io::Error::new(io::ErrorKind::Other, format!("StatusCode {}", e))
    }
}

impl StatusCode {
    /// Returns the bit flags of the status code, i.e. it masks out the actual status code value
    pub fn bitflags(&self) -> StatusCode {
        *self & StatusCode::BIT_MASK
    }

    /// Returns the status only, i.e. it masks out any bit flags that come with the status code
    pub fn status(&self) -> StatusCode {
        *self & StatusCode::STATUS_MASK
    }

    /// Tests if the status code is bad
    pub fn is_bad(&self) -> bool {
        self.contains(StatusCode::IS_ERROR)
    }

    /// Tests if the status code is uncertain
    pub fn is_uncertain(&self) -> bool {
        self.contains(StatusCode::IS_UNCERTAIN)
    }

    /// Tests if the status code is good (i.e. not bad or uncertain)
    pub fn is_good(&self) -> bool {
        !self.is_bad() && !self.is_uncertain()
    }

    /// Makes a status code from a raw u32 value, providing the status portion is recognized
    pub fn from_u32(value: u32) -> Option<StatusCode> {
        StatusCode::from_bits(value & StatusCode::STATUS_MASK.bits())
    }

    /// Returns the symbolic name of the status portion of the code
    pub fn name(&self) -> &'static str {
        match self.status() {
            StatusCode::Good => "Good",
            StatusCode::UncertainLastUsableValue => "UncertainLastUsableValue",
            StatusCode::BadUnexpectedError => "BadUnexpectedError",
            StatusCode::BadInternalError => "BadInternalError",
            StatusCode::BadCommunicationError => "BadCommunicationError",
            StatusCode::BadUnknownResponse => "BadUnknownResponse",
            StatusCode::BadDecodingError => "BadDecodingError",
            StatusCode::BadEncodingError => "BadEncodingError",
            StatusCode::BadEncodingLimitsExceeded => "BadEncodingLimitsExceeded",
            StatusCode::BadRequestTooLarge => "BadRequestTooLarge",
            StatusCode::BadResponseTooLarge => "BadResponseTooLarge",
            StatusCode::BadTimeout => "BadTimeout",
            StatusCode::BadServiceUnsupported => "BadServiceUnsupported",
            StatusCode::BadServerNotConnected => "BadServerNotConnected",
            StatusCode::BadNothingToDo => "BadNothingToDo",
            StatusCode::BadSecurityChecksFailed => "BadSecurityChecksFailed",
            StatusCode::BadIdentityTokenInvalid => "BadIdentityTokenInvalid",
            StatusCode::BadIdentityTokenRejected => "BadIdentityTokenRejected",
            StatusCode::BadSecureChannelIdInvalid => "BadSecureChannelIdInvalid",
            StatusCode::BadNonceInvalid => "BadNonceInvalid",
            StatusCode::BadSessionIdInvalid => "BadSessionIdInvalid",
            StatusCode::BadSessionClosed => "BadSessionClosed",
            StatusCode::BadSessionNotActivated => "BadSessionNotActivated",
            StatusCode::BadRequestCancelledByClient => "BadRequestCancelledByClient",
            StatusCode::BadNodeIdInvalid => "BadNodeIdInvalid",
            StatusCode::BadNodeIdUnknown => "BadNodeIdUnknown",
            StatusCode::BadAttributeIdInvalid => "BadAttributeIdInvalid",
            StatusCode::BadNotSupported => "BadNotSupported",
            StatusCode::BadSecurityModeRejected => "BadSecurityModeRejected",
            StatusCode::BadSecurityPolicyRejected => "BadSecurityPolicyRejected",
            StatusCode::BadTcpMessageTypeInvalid => "BadTcpMessageTypeInvalid",
            StatusCode::BadTcpSecureChannelUnknown => "BadTcpSecureChannelUnknown",
            StatusCode::BadTcpMessageTooLarge => "BadTcpMessageTooLarge",
            StatusCode::BadTcpInternalError => "BadTcpInternalError",
            StatusCode::BadTcpEndpointUrlInvalid => "BadTcpEndpointUrlInvalid",
            StatusCode::BadSecureChannelClosed => "BadSecureChannelClosed",
            StatusCode::BadSecureChannelTokenUnknown => "BadSecureChannelTokenUnknown",
            StatusCode::BadSequenceNumberInvalid => "BadSequenceNumberInvalid",
            StatusCode::BadNotConnected => "BadNotConnected",
            StatusCode::BadInvalidArgument => "BadInvalidArgument",
            StatusCode::BadConnectionRejected => "BadConnectionRejected",
            StatusCode::BadConnectionClosed => "BadConnectionClosed",
            StatusCode::BadInvalidState => "BadInvalidState",
            _ => "UnknownStatusCode",
        }
    }

    /// Returns a short description of the status portion of the code
    pub fn description(&self) -> &'static str {
        match self.status() {
            StatusCode::Good => "The operation succeeded",
            StatusCode::BadTimeout => "The operation timed out",
            StatusCode::BadCommunicationError => "A low level communication error occurred",
            StatusCode::BadConnectionClosed => "The network connection has been closed",
            StatusCode::BadSequenceNumberInvalid => "The sequence number is not valid",
            StatusCode::BadSecureChannelIdInvalid => "The specified secure channel is not valid",
            StatusCode::BadSecureChannelTokenUnknown => "The token id is not known to the channel",
            StatusCode::BadTcpMessageTypeInvalid => "The type of the message specified in the header is not valid",
            StatusCode::BadTcpMessageTooLarge => "The size of the message exceeds the negotiated limits",
            StatusCode::BadTcpEndpointUrlInvalid => "The server does not recognize the endpoint url",
            StatusCode::BadSecurityModeRejected => "The security mode does not meet the requirements set by the stack",
            StatusCode::BadSecurityPolicyRejected => "The security policy does not meet the requirements set by the stack",
            _ => self.name(),
        }
    }
}

#[test]
fn status_code() {
    assert!(StatusCode::Good.is_good());
    assert!(!StatusCode::Good.is_bad());
    assert!(!StatusCode::Good.is_uncertain());

    assert!(StatusCode::UncertainLastUsableValue.is_uncertain());
    assert!(!StatusCode::UncertainLastUsableValue.is_bad());
    assert!(!StatusCode::UncertainLastUsableValue.is_good());

    assert!(StatusCode::BadDecodingError.is_bad());
    assert!(!StatusCode::BadDecodingError.is_uncertain());
    assert!(!StatusCode::BadDecodingError.is_good());

    assert_eq!(
        (StatusCode::BadDecodingError | StatusCode::HISTORICAL_CALCULATED).status(),
        StatusCode::BadDecodingError
    );
    assert_eq!(
        (StatusCode::BadDecodingError | StatusCode::HISTORICAL_CALCULATED).bitflags(),
        StatusCode::HISTORICAL_CALCULATED
    );
}
