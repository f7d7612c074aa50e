// opcua-client - an OPC UA client communication stack
// SPDX-License-Identifier: MPL-2.0

//! Defines the request and response messages that the stack can move across a
//! secure channel. The `SupportedMessage` enumeration has a variant for each,
//! so that messages can be passed around in an agnostic fashion by the
//! chunker, the transport and the demultiplexer.

use std::io::{Read, Write};

use crate::types::*;

/// This macro helps avoid tedious repetition as new messages are added.
/// The first form just handles the trailing comma after the last entry to save some pointless
/// editing when new messages are added to the list.
macro_rules! supported_messages {
    [ $( $x:ident, ) * ] => (supported_messages![ $( $x ),* ];);
    [ $( $x:ident ), * ] => {
        #[derive(Debug, PartialEq, Clone)]
        pub enum SupportedMessage {
            /// An invalid request / response of some form
            Invalid(ObjectId),
            /// Other messages
            $( $x(Box<$x>), )*
        }

        impl BinaryEncoder<SupportedMessage> for SupportedMessage {
            fn byte_len(&self) -> usize {
                match self {
                    SupportedMessage::Invalid(object_id) => {
                        panic!("Unsupported message {:?}", object_id);
                    }
                    $( SupportedMessage::$x(value) => value.byte_len(), )*
                }
            }

            fn encode<S: Write>(&self, stream: &mut S) -> EncodingResult<usize> {
                match self {
                    SupportedMessage::Invalid(object_id) => {
                        panic!("Unsupported message {:?}", object_id);
                    }
                    $( SupportedMessage::$x(value) => value.encode(stream), )*
                }
            }

            fn decode<S: Read>(_: &mut S, _: &DecodingOptions) -> EncodingResult<Self> {
                // THIS WILL NOT DO ANYTHING - use decode_by_object_id.
                panic!("Cannot decode a stream to a supported message type");
            }
        }

        $(
            impl From<$x> for SupportedMessage {
                fn from(value: $x) -> Self {
                    SupportedMessage::$x(Box::new(value))
                }
            }
        )*

        impl SupportedMessage {
            /// The node id of the message's binary encoding, written ahead of the
            /// body so the receiving end knows what to decode.
            pub fn node_id(&self) -> NodeId {
                match self {
                    SupportedMessage::Invalid(object_id) => {
                        panic!("Unsupported message {:?}", object_id);
                    }
                    $( SupportedMessage::$x(value) => value.object_id().into(), )*
                }
            }
        }
    }
}

supported_messages![
    // A service fault, returned when the service failed
    ServiceFault,
    // Secure channel service
    OpenSecureChannelRequest,
    OpenSecureChannelResponse,
    CloseSecureChannelRequest,
    CloseSecureChannelResponse,
    // Discovery service
    GetEndpointsRequest,
    GetEndpointsResponse,
    // Session service
    CreateSessionRequest,
    CreateSessionResponse,
    ActivateSessionRequest,
    ActivateSessionResponse,
    CloseSessionRequest,
    CloseSessionResponse,
    // Attribute service
    ReadRequest,
    ReadResponse,
    WriteRequest,
    WriteResponse,
    // View service
    BrowseRequest,
    BrowseResponse,
    BrowseNextRequest,
    BrowseNextResponse,
    // Subscription service
    CreateSubscriptionRequest,
    CreateSubscriptionResponse,
    PublishRequest,
    PublishResponse,
];

impl SupportedMessage {
    pub fn is_supported(&self) -> bool {
        !matches!(self, SupportedMessage::Invalid(_))
    }

    /// The request handle of the message's request or response header. Requests
    /// and responses are correlated through this value.
    pub fn request_handle(&self) -> u32 {
        match self {
            SupportedMessage::Invalid(_) => 0,
            SupportedMessage::ServiceFault(value) => value.response_header.request_handle,
            SupportedMessage::OpenSecureChannelRequest(value) => {
                value.request_header.request_handle
            }
            SupportedMessage::OpenSecureChannelResponse(value) => {
                value.response_header.request_handle
            }
            SupportedMessage::CloseSecureChannelRequest(value) => {
                value.request_header.request_handle
            }
            SupportedMessage::CloseSecureChannelResponse(value) => {
                value.response_header.request_handle
            }
            SupportedMessage::GetEndpointsRequest(value) => value.request_header.request_handle,
            SupportedMessage::GetEndpointsResponse(value) => value.response_header.request_handle,
            SupportedMessage::CreateSessionRequest(value) => value.request_header.request_handle,
            SupportedMessage::CreateSessionResponse(value) => value.response_header.request_handle,
            SupportedMessage::ActivateSessionRequest(value) => value.request_header.request_handle,
            SupportedMessage::ActivateSessionResponse(value) => {
                value.response_header.request_handle
            }
            SupportedMessage::CloseSessionRequest(value) => value.request_header.request_handle,
            SupportedMessage::CloseSessionResponse(value) => value.response_header.request_handle,
            SupportedMessage::ReadRequest(value) => value.request_header.request_handle,
            SupportedMessage::ReadResponse(value) => value.response_header.request_handle,
            SupportedMessage::WriteRequest(value) => value.request_header.request_handle,
            SupportedMessage::WriteResponse(value) => value.response_header.request_handle,
            SupportedMessage::BrowseRequest(value) => value.request_header.request_handle,
            SupportedMessage::BrowseResponse(value) => value.response_header.request_handle,
            SupportedMessage::BrowseNextRequest(value) => value.request_header.request_handle,
            SupportedMessage::BrowseNextResponse(value) => value.response_header.request_handle,
            SupportedMessage::CreateSubscriptionRequest(value) => {
                value.request_header.request_handle
            }
            SupportedMessage::CreateSubscriptionResponse(value) => {
                value.response_header.request_handle
            }
            SupportedMessage::PublishRequest(value) => value.request_header.request_handle,
            SupportedMessage::PublishResponse(value) => value.response_header.request_handle,
        }
    }

    /// Decodes a message from the stream, dispatching on the object id that was
    /// read ahead of the body.
    pub fn decode_by_object_id<S: Read>(
        stream: &mut S,
        object_id: ObjectId,
        decoding_options: &DecodingOptions,
    ) -> EncodingResult<Self> {
        trace!("decoding object_id {:?}", object_id);
        let decoded_message = match object_id {
            ObjectId::ServiceFault_Encoding_DefaultBinary => {
                ServiceFault::decode(stream, decoding_options)?.into()
            }
            ObjectId::OpenSecureChannelRequest_Encoding_DefaultBinary => {
                OpenSecureChannelRequest::decode(stream, decoding_options)?.into()
            }
            ObjectId::OpenSecureChannelResponse_Encoding_DefaultBinary => {
                OpenSecureChannelResponse::decode(stream, decoding_options)?.into()
            }
            ObjectId::CloseSecureChannelRequest_Encoding_DefaultBinary => {
                CloseSecureChannelRequest::decode(stream, decoding_options)?.into()
            }
            ObjectId::CloseSecureChannelResponse_Encoding_DefaultBinary => {
                CloseSecureChannelResponse::decode(stream, decoding_options)?.into()
            }
            ObjectId::GetEndpointsRequest_Encoding_DefaultBinary => {
                GetEndpointsRequest::decode(stream, decoding_options)?.into()
            }
            ObjectId::GetEndpointsResponse_Encoding_DefaultBinary => {
                GetEndpointsResponse::decode(stream, decoding_options)?.into()
            }
            ObjectId::CreateSessionRequest_Encoding_DefaultBinary => {
                CreateSessionRequest::decode(stream, decoding_options)?.into()
            }
            ObjectId::CreateSessionResponse_Encoding_DefaultBinary => {
                CreateSessionResponse::decode(stream, decoding_options)?.into()
            }
            ObjectId::ActivateSessionRequest_Encoding_DefaultBinary => {
                ActivateSessionRequest::decode(stream, decoding_options)?.into()
            }
            ObjectId::ActivateSessionResponse_Encoding_DefaultBinary => {
                ActivateSessionResponse::decode(stream, decoding_options)?.into()
            }
            ObjectId::CloseSessionRequest_Encoding_DefaultBinary => {
                CloseSessionRequest::decode(stream, decoding_options)?.into()
            }
            ObjectId::CloseSessionResponse_Encoding_DefaultBinary => {
                CloseSessionResponse::decode(stream, decoding_options)?.into()
            }
            ObjectId::ReadRequest_Encoding_DefaultBinary => {
                ReadRequest::decode(stream, decoding_options)?.into()
            }
            ObjectId::ReadResponse_Encoding_DefaultBinary => {
                ReadResponse::decode(stream, decoding_options)?.into()
            }
            ObjectId::WriteRequest_Encoding_DefaultBinary => {
                WriteRequest::decode(stream, decoding_options)?.into()
            }
            ObjectId::WriteResponse_Encoding_DefaultBinary => {
                WriteResponse::decode(stream, decoding_options)?.into()
            }
            ObjectId::BrowseRequest_Encoding_DefaultBinary => {
                BrowseRequest::decode(stream, decoding_options)?.into()
            }
            ObjectId::BrowseResponse_Encoding_DefaultBinary => {
                BrowseResponse::decode(stream, decoding_options)?.into()
            }
            ObjectId::BrowseNextRequest_Encoding_DefaultBinary => {
                BrowseNextRequest::decode(stream, decoding_options)?.into()
            }
            ObjectId::BrowseNextResponse_Encoding_DefaultBinary => {
                BrowseNextResponse::decode(stream, decoding_options)?.into()
            }
            ObjectId::CreateSubscriptionRequest_Encoding_DefaultBinary => {
                CreateSubscriptionRequest::decode(stream, decoding_options)?.into()
            }
            ObjectId::CreateSubscriptionResponse_Encoding_DefaultBinary => {
                CreateSubscriptionResponse::decode(stream, decoding_options)?.into()
            }
            ObjectId::PublishRequest_Encoding_DefaultBinary => {
                PublishRequest::decode(stream, decoding_options)?.into()
            }
            ObjectId::PublishResponse_Encoding_DefaultBinary => {
                PublishResponse::decode(stream, decoding_options)?.into()
            }
            _ => {
                debug!("decoding unsupported for object id {:?}", object_id);
                SupportedMessage::Invalid(object_id)
            }
        };
        Ok(decoded_message)
    }
}
