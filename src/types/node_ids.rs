// opcua-client - an OPC UA client communication stack
// SPDX-License-Identifier: MPL-2.0

//! The numeric identifiers that services and their payloads use on the wire.
//!
//! Every service request / response structure has a namespace 0 object id
//! for its default binary encoding. The chunker prefixes each message body
//! with this id and the demultiplexer dispatches on it, so this enum is the
//! catalogue that ties type ids to codecs.

#![allow(non_camel_case_types)]

use std::convert::TryFrom;

use crate::types::node_id::NodeId;

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[repr(u32)]
pub enum ObjectId {
    AnonymousIdentityToken_Encoding_DefaultBinary = 321,
    UserNameIdentityToken_Encoding_DefaultBinary = 324,
    X509IdentityToken_Encoding_DefaultBinary = 327,
    ServiceFault_Encoding_DefaultBinary = 397,
    GetEndpointsRequest_Encoding_DefaultBinary = 428,
    GetEndpointsResponse_Encoding_DefaultBinary = 431,
    OpenSecureChannelRequest_Encoding_DefaultBinary = 446,
    OpenSecureChannelResponse_Encoding_DefaultBinary = 449,
    CloseSecureChannelRequest_Encoding_DefaultBinary = 452,
    CloseSecureChannelResponse_Encoding_DefaultBinary = 455,
    CreateSessionRequest_Encoding_DefaultBinary = 461,
    CreateSessionResponse_Encoding_DefaultBinary = 464,
    ActivateSessionRequest_Encoding_DefaultBinary = 467,
    ActivateSessionResponse_Encoding_DefaultBinary = 470,
    CloseSessionRequest_Encoding_DefaultBinary = 473,
    CloseSessionResponse_Encoding_DefaultBinary = 476,
    BrowseRequest_Encoding_DefaultBinary = 527,
    BrowseResponse_Encoding_DefaultBinary = 530,
    BrowseNextRequest_Encoding_DefaultBinary = 533,
    BrowseNextResponse_Encoding_DefaultBinary = 536,
    ReadRequest_Encoding_DefaultBinary = 631,
    ReadResponse_Encoding_DefaultBinary = 634,
    WriteRequest_Encoding_DefaultBinary = 673,
    WriteResponse_Encoding_DefaultBinary = 676,
    CreateSubscriptionRequest_Encoding_DefaultBinary = 787,
    CreateSubscriptionResponse_Encoding_DefaultBinary = 790,
    PublishRequest_Encoding_DefaultBinary = 826,
    PublishResponse_Encoding_DefaultBinary = 829,
    IssuedIdentityToken_Encoding_DefaultBinary = 940,
}

impl TryFrom<u32> for ObjectId {
    type Error = ();

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        let object_id = match value {
            321 => ObjectId::AnonymousIdentityToken_Encoding_DefaultBinary,
            324 => ObjectId::UserNameIdentityToken_Encoding_DefaultBinary,
            327 => ObjectId::X509IdentityToken_Encoding_DefaultBinary,
            397 => ObjectId::ServiceFault_Encoding_DefaultBinary,
            428 => ObjectId::GetEndpointsRequest_Encoding_DefaultBinary,
            431 => ObjectId::GetEndpointsResponse_Encoding_DefaultBinary,
            446 => ObjectId::OpenSecureChannelRequest_Encoding_DefaultBinary,
            449 => ObjectId::OpenSecureChannelResponse_Encoding_DefaultBinary,
            452 => ObjectId::CloseSecureChannelRequest_Encoding_DefaultBinary,
            455 => ObjectId::CloseSecureChannelResponse_Encoding_DefaultBinary,
            461 => ObjectId::CreateSessionRequest_Encoding_DefaultBinary,
            464 => ObjectId::CreateSessionResponse_Encoding_DefaultBinary,
            467 => ObjectId::ActivateSessionRequest_Encoding_DefaultBinary,
            470 => ObjectId::ActivateSessionResponse_Encoding_DefaultBinary,
            473 => ObjectId::CloseSessionRequest_Encoding_DefaultBinary,
            476 => ObjectId::CloseSessionResponse_Encoding_DefaultBinary,
            527 => ObjectId::BrowseRequest_Encoding_DefaultBinary,
            530 => ObjectId::BrowseResponse_Encoding_DefaultBinary,
            533 => ObjectId::BrowseNextRequest_Encoding_DefaultBinary,
            536 => ObjectId::BrowseNextResponse_Encoding_DefaultBinary,
            631 => ObjectId::ReadRequest_Encoding_DefaultBinary,
            634 => ObjectId::ReadResponse_Encoding_DefaultBinary,
            673 => ObjectId::WriteRequest_Encoding_DefaultBinary,
            676 => ObjectId::WriteResponse_Encoding_DefaultBinary,
            787 => ObjectId::CreateSubscriptionRequest_Encoding_DefaultBinary,
            790 => ObjectId::CreateSubscriptionResponse_Encoding_DefaultBinary,
            826 => ObjectId::PublishRequest_Encoding_DefaultBinary,
            829 => ObjectId::PublishResponse_Encoding_DefaultBinary,
            940 => ObjectId::IssuedIdentityToken_Encoding_DefaultBinary,
            _ => return Err(()),
        };
        Ok(object_id)
    }
}

impl From<ObjectId> for NodeId {
    fn from(object_id: ObjectId) -> NodeId {
        NodeId::new(0, object_id as u32)
    }
}
