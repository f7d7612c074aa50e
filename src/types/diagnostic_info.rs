// opcua-client - an OPC UA client communication stack
// SPDX-License-Identifier: MPL-2.0

//! Contains the implementation of `DiagnosticInfo`.

use std::io::{Read, Write};

use crate::types::{encoding::*, status_codes::StatusCode, string::UAString};

bitflags! {
    pub struct DiagnosticBits: u32 {
        /// ServiceLevel / SymbolicId
        const SERVICE_LEVEL_SYMBOLIC_ID = 0x0000_0001;
        /// ServiceLevel / LocalizedText
        const SERVICE_LEVEL_LOCALIZED_TEXT = 0x0000_0002;
        /// ServiceLevel / AdditionalInfo
        const SERVICE_LEVEL_ADDITIONAL_INFO = 0x0000_0004;
        /// ServiceLevel / Inner StatusCode
        const SERVICE_LEVEL_LOCALIZED_INNER_STATUS_CODE = 0x0000_0008;
        /// ServiceLevel / Inner Diagnostics
        const SERVICE_LEVEL_LOCALIZED_INNER_DIAGNOSTICS = 0x0000_0010;
        /// OperationLevel / SymbolicId
        const OPERATIONAL_LEVEL_SYMBOLIC_ID = 0x0000_0020;
        /// OperationLevel / LocalizedText
        const OPERATIONAL_LEVEL_LOCALIZED_TEXT = 0x0000_0040;
        /// OperationLevel / AdditionalInfo
        const OPERATIONAL_LEVEL_ADDITIONAL_INFO = 0x0000_0080;
        /// OperationLevel / Inner StatusCode
        const OPERATIONAL_LEVEL_INNER_STATUS_CODE = 0x0000_0100;
        /// OperationLevel / Inner Diagnostics
        const OPERATIONAL_LEVEL_INNER_DIAGNOSTICS = 0x0000_0200;
    }
}

mod diagnostic_info_mask {
    pub const HAS_SYMBOLIC_ID: u8 = 0x01;
    pub const HAS_NAMESPACE: u8 = 0x02;
    pub const HAS_LOCALIZED_TEXT: u8 = 0x04;
    pub const HAS_LOCALE: u8 = 0x08;
    pub const HAS_ADDITIONAL_INFO: u8 = 0x10;
    pub const HAS_INNER_STATUS_CODE: u8 = 0x20;
    pub const HAS_INNER_DIAGNOSTIC_INFO: u8 = 0x40;
}

/// Vendor specific diagnostic information attached to a response. Every field
/// is optional, signalled by the leading encoding mask byte.
#[derive(PartialEq, Debug, Clone, Default)]
pub struct DiagnosticInfo {
    /// A symbolic name for the status code.
    pub symbolic_id: Option<i32>,
    /// A namespace that qualifies the symbolic id.
    pub namespace_uri: Option<i32>,
    /// The locale used for the localized text.
    pub locale: Option<i32>,
    /// A human readable summary of the status code.
    pub localized_text: Option<i32>,
    /// Detailed application specific diagnostic information.
    pub additional_info: Option<UAString>,
    /// A status code provided by an underlying system.
    pub inner_status_code: Option<StatusCode>,
    /// Diagnostic info associated with the inner status code.
    pub inner_diagnostic_info: Option<Box<DiagnosticInfo>>,
}

impl BinaryEncoder<DiagnosticInfo> for DiagnosticInfo {
    fn byte_len(&self) -> usize {
        let mut size: usize = 1;
        if let Some(ref symbolic_id) = self.symbolic_id {
            size += symbolic_id.byte_len();
        }
        if let Some(ref namespace_uri) = self.namespace_uri {
            size += namespace_uri.byte_len();
        }
        if let Some(ref locale) = self.locale {
            size += locale.byte_len();
        }
        if let Some(ref localized_text) = self.localized_text {
            size += localized_text.byte_len();
        }
        if let Some(ref additional_info) = self.additional_info {
            size += additional_info.byte_len();
        }
        if let Some(ref inner_status_code) = self.inner_status_code {
            size += inner_status_code.byte_len();
        }
        if let Some(ref inner_diagnostic_info) = self.inner_diagnostic_info {
            size += inner_diagnostic_info.byte_len();
        }
        size
    }

    fn encode<S: Write>(&self, stream: &mut S) -> EncodingResult<usize> {
        let mut size: usize = 0;
        size += self.encoding_mask().encode(stream)?;
        if let Some(ref symbolic_id) = self.symbolic_id {
            size += symbolic_id.encode(stream)?;
        }
        if let Some(ref namespace_uri) = self.namespace_uri {
            size += namespace_uri.encode(stream)?;
        }
        if let Some(ref locale) = self.locale {
            size += locale.encode(stream)?;
        }
        if let Some(ref localized_text) = self.localized_text {
            size += localized_text.encode(stream)?;
        }
        if let Some(ref additional_info) = self.additional_info {
            size += additional_info.encode(stream)?;
        }
        if let Some(ref inner_status_code) = self.inner_status_code {
            size += inner_status_code.encode(stream)?;
        }
        if let Some(ref inner_diagnostic_info) = self.inner_diagnostic_info {
            size += inner_diagnostic_info.encode(stream)?;
        }
        assert_eq!(size, self.byte_len());
        Ok(size)
    }

    fn decode<S: Read>(stream: &mut S, decoding_options: &DecodingOptions) -> EncodingResult<Self> {
        let encoding_mask = u8::decode(stream, decoding_options)?;
        let mut diagnostic_info = DiagnosticInfo::default();
        if encoding_mask & diagnostic_info_mask::HAS_SYMBOLIC_ID != 0 {
            diagnostic_info.symbolic_id = Some(i32::decode(stream, decoding_options)?);
        }
        if encoding_mask & diagnostic_info_mask::HAS_NAMESPACE != 0 {
            diagnostic_info.namespace_uri = Some(i32::decode(stream, decoding_options)?);
        }
        if encoding_mask & diagnostic_info_mask::HAS_LOCALE != 0 {
            diagnostic_info.locale = Some(i32::decode(stream, decoding_options)?);
        }
        if encoding_mask & diagnostic_info_mask::HAS_LOCALIZED_TEXT != 0 {
            diagnostic_info.localized_text = Some(i32::decode(stream, decoding_options)?);
        }
        if encoding_mask & diagnostic_info_mask::HAS_ADDITIONAL_INFO != 0 {
            diagnostic_info.additional_info = Some(UAString::decode(stream, decoding_options)?);
        }
        if encoding_mask & diagnostic_info_mask::HAS_INNER_STATUS_CODE != 0 {
            diagnostic_info.inner_status_code = Some(StatusCode::decode(stream, decoding_options)?);
        }
        if encoding_mask & diagnostic_info_mask::HAS_INNER_DIAGNOSTIC_INFO != 0 {
            diagnostic_info.inner_diagnostic_info = Some(Box::new(DiagnosticInfo::decode(
                stream,
                decoding_options,
            )?));
        }
        Ok(diagnostic_info)
    }
}

impl DiagnosticInfo {
    pub fn null() -> DiagnosticInfo {
        DiagnosticInfo::default()
    }

    fn encoding_mask(&self) -> u8 {
        let mut encoding_mask = 0;
        if self.symbolic_id.is_some() {
            encoding_mask |= diagnostic_info_mask::HAS_SYMBOLIC_ID;
        }
        if self.namespace_uri.is_some() {
            encoding_mask |= diagnostic_info_mask::HAS_NAMESPACE;
        }
        if self.locale.is_some() {
            encoding_mask |= diagnostic_info_mask::HAS_LOCALE;
        }
        if self.localized_text.is_some() {
            encoding_mask |= diagnostic_info_mask::HAS_LOCALIZED_TEXT;
        }
        if self.additional_info.is_some() {
            encoding_mask |= diagnostic_info_mask::HAS_ADDITIONAL_INFO;
        }
        if self.inner_status_code.is_some() {
            encoding_mask |= diagnostic_info_mask::HAS_INNER_STATUS_CODE;
        }
        if self.inner_diagnostic_info.is_some() {
            encoding_mask |= diagnostic_info_mask::HAS_INNER_DIAGNOSTIC_INFO;
        }
        encoding_mask
    }
}
