// opcua-client - an OPC UA client communication stack
// SPDX-License-Identifier: MPL-2.0

//! Round trip tests on the built-in types. Encode-then-decode is expected to
//! be the identity for every value here, including the null and boundary forms.

use std::io::Cursor;
use std::str::FromStr;

use crate::types::*;

use super::*;

#[test]
fn encoding_bool() {
    serialize_test(true);
    serialize_test(false);
}

#[test]
fn encoding_sbyte() {
    serialize_test(0i8);
    serialize_test(100i8);
    serialize_test(-90i8);
    serialize_test(i8::MIN);
    serialize_test(i8::MAX);
}

#[test]
fn encoding_byte() {
    serialize_test(0u8);
    serialize_test(255u8);
    serialize_test(90u8);
}

#[test]
fn encoding_int16() {
    serialize_test(0i16);
    serialize_test(-17000i16);
    serialize_test(32000i16);
    serialize_test(i16::MIN);
    serialize_test(i16::MAX);
}

#[test]
fn encoding_uint16() {
    serialize_test(0u16);
    serialize_test(57000u16);
    serialize_test(u16::MAX);
}

#[test]
fn encoding_int32() {
    serialize_test(0i32);
    serialize_test(-17444000i32);
    serialize_test(500000i32);
    serialize_test(i32::MIN);
    serialize_test(i32::MAX);
}

#[test]
fn encoding_uint32() {
    serialize_test(0u32);
    serialize_test(57444000u32);
    serialize_test(u32::MAX);
}

#[test]
fn encoding_int64() {
    serialize_test(0i64);
    serialize_test(-174440000i64);
    serialize_test(5000000000i64);
    serialize_test(i64::MIN);
    serialize_test(i64::MAX);
}

#[test]
fn encoding_uint64() {
    serialize_test(0u64);
    serialize_test(57444000000u64);
    serialize_test(u64::MAX);
}

#[test]
fn encoding_f32() {
    serialize_test(0f32);
    serialize_test(12.4342f32);
    serialize_test(f32::MIN);
    serialize_test(f32::MAX);
}

#[test]
fn encoding_f64() {
    serialize_test(0f64);
    serialize_test(12.43424324234f64);
    serialize_test(f64::MIN);
    serialize_test(f64::MAX);
}

#[test]
fn encoding_string() {
    serialize_test(UAString::null());
    serialize_test(UAString::from(""));
    serialize_test(UAString::from("Hello world"));
    serialize_test(UAString::from("你好，世界"));
}

#[test]
fn encoding_string_wire_format() {
    // A null string is a -1 length and no bytes
    serialize_and_compare(UAString::null(), &[0xff, 0xff, 0xff, 0xff]);
    // A string is an i32 length followed by UTF-8
    serialize_and_compare(
        UAString::from("abc"),
        &[0x03, 0x00, 0x00, 0x00, b'a', b'b', b'c'],
    );
}

#[test]
fn decoding_string_limits() {
    let s = UAString::from("A long enough string");
    let buf = s.encode_to_vec();

    let decoding_options = DecodingOptions {
        max_string_length: 5,
        ..DecodingOptions::test()
    };
    let mut stream = Cursor::new(buf);
    assert_eq!(
        UAString::decode(&mut stream, &decoding_options).unwrap_err(),
        StatusCode::BadDecodingError
    );
}

#[test]
fn decoding_string_negative_length() {
    // Any length lower than -1 is invalid
    let buf = vec![0xfe, 0xff, 0xff, 0xff];
    let mut stream = Cursor::new(buf);
    assert_eq!(
        UAString::decode(&mut stream, &DecodingOptions::test()).unwrap_err(),
        StatusCode::BadDecodingError
    );
}

#[test]
fn encoding_byte_string() {
    serialize_test(ByteString::null());
    serialize_test(ByteString::from(&[] as &[u8]));
    serialize_test(ByteString::from(&[0x0u8, 0x1, 0x2, 0xff]));
}

#[test]
fn decoding_byte_string_limits() {
    let v = ByteString::from(&[0x0u8; 16]);
    let buf = v.encode_to_vec();

    let decoding_options = DecodingOptions {
        max_byte_string_length: 8,
        ..DecodingOptions::test()
    };
    let mut stream = Cursor::new(buf);
    assert_eq!(
        ByteString::decode(&mut stream, &decoding_options).unwrap_err(),
        StatusCode::BadDecodingError
    );
}

#[test]
fn encoding_guid() {
    serialize_test(Guid::null());
    serialize_test(Guid::from_bytes([0xffu8; 16]));
    serialize_test(Guid::from_str("f9e561f3-351c-47a2-b969-b8d6d7226fee").unwrap());
}

#[test]
fn encoding_guid_wire_format() {
    // Part 6 example - 72962B91-FA75-4AE6-8D28-B404DC7DAF63
    let guid = Guid::from_str("72962B91-FA75-4AE6-8D28-B404DC7DAF63").unwrap();
    serialize_and_compare(
        guid,
        &[
            0x91, 0x2b, 0x96, 0x72, 0x75, 0xfa, 0xe6, 0x4a, 0x8d, 0x28, 0xb4, 0x04, 0xdc, 0x7d,
            0xaf, 0x63,
        ],
    );
}

#[test]
fn encoding_date_time() {
    serialize_test(DateTime::null());
    serialize_test(DateTime::epoch());
    serialize_test(DateTime::endtimes());
    serialize_test(DateTime::ymd_hms(2021, 4, 2, 12, 30, 59));
}

#[test]
fn encoding_node_id() {
    // Two byte
    serialize_test(NodeId::null());
    serialize_test(NodeId::new(0, 255u32));
    // Four byte
    serialize_test(NodeId::new(1, 256u32));
    serialize_test(NodeId::new(255, 65535u32));
    // Full numeric
    serialize_test(NodeId::new(256, 1u32));
    serialize_test(NodeId::new(30000, u32::MAX));
    // Other identifier kinds
    serialize_test(NodeId::new(2, "Demo.Static"));
    serialize_test(NodeId::new(2, UAString::null()));
    serialize_test(NodeId::new(2, Guid::new()));
    serialize_test(NodeId::new(2, ByteString::from(&[0x1u8, 0x2, 0x3])));
}

#[test]
fn encoding_node_id_two_byte_wire_format() {
    serialize_and_compare(NodeId::new(0, 72u32), &[0x00, 0x48]);
}

#[test]
fn encoding_node_id_four_byte_wire_format() {
    // Part 6 example - ns=5;i=1025
    serialize_and_compare(NodeId::new(5, 1025u32), &[0x01, 0x05, 0x01, 0x04]);
}

#[test]
fn encoding_expanded_node_id() {
    serialize_test(ExpandedNodeId::null());
    serialize_test(ExpandedNodeId::from(NodeId::new(200, 2000u32)));
    let mut v = ExpandedNodeId::from(NodeId::new(1, "expanded"));
    v.namespace_uri = UAString::from("urn:mynamespace");
    v.server_index = 42;
    serialize_test(v);
}

#[test]
fn encoding_qualified_name() {
    serialize_test(QualifiedName::null());
    serialize_test(QualifiedName::new(2, "Browse"));
}

#[test]
fn encoding_localized_text() {
    serialize_test(LocalizedText::null());
    serialize_test(LocalizedText::new("en-US", "Hello"));
    serialize_test(LocalizedText {
        locale: UAString::null(),
        text: UAString::from("no locale"),
    });
    serialize_test(LocalizedText {
        locale: UAString::from("de"),
        text: UAString::null(),
    });
}

#[test]
fn encoding_diagnostic_info() {
    serialize_test(DiagnosticInfo::null());
    serialize_test(DiagnosticInfo {
        symbolic_id: Some(10),
        namespace_uri: Some(11),
        locale: Some(12),
        localized_text: Some(13),
        additional_info: Some(UAString::from("info")),
        inner_status_code: Some(StatusCode::BadNodeIdUnknown),
        inner_diagnostic_info: Some(Box::new(DiagnosticInfo {
            symbolic_id: Some(99),
            ..Default::default()
        })),
    });
}

#[test]
fn encoding_extension_object() {
    serialize_test(ExtensionObject::null());
    serialize_test(ExtensionObject {
        node_id: ObjectId::GetEndpointsRequest_Encoding_DefaultBinary.into(),
        body: ExtensionObjectEncoding::ByteString(ByteString::from(&[0xde, 0xad, 0xbe, 0xef])),
    });
}

#[test]
fn extension_object_from_encodable() {
    let token = AnonymousIdentityToken::default();
    let e = ExtensionObject::from_encodable(
        ObjectId::AnonymousIdentityToken_Encoding_DefaultBinary,
        &token,
    );
    let token2: AnonymousIdentityToken = e.decode_inner(&DecodingOptions::test()).unwrap();
    assert_eq!(token, token2);
}

#[test]
fn encoding_status_code() {
    serialize_test(StatusCode::Good);
    serialize_test(StatusCode::BadSequenceNumberInvalid);
    serialize_test(StatusCode::BadDecodingError | StatusCode::HISTORICAL_CALCULATED);
}

#[test]
fn encoding_variant_scalars() {
    serialize_test(Variant::Empty);
    serialize_test(Variant::Boolean(true));
    serialize_test(Variant::SByte(-5));
    serialize_test(Variant::Byte(0xff));
    serialize_test(Variant::Int32(-12345));
    serialize_test(Variant::UInt64(u64::MAX));
    serialize_test(Variant::Double(-1234.5678));
    serialize_test(Variant::String(UAString::from("variant")));
    serialize_test(Variant::DateTime(Box::new(DateTime::epoch())));
    serialize_test(Variant::Guid(Box::new(Guid::new())));
    serialize_test(Variant::StatusCode(StatusCode::BadTimeout));
    serialize_test(Variant::NodeId(Box::new(NodeId::new(2, "abc"))));
    serialize_test(Variant::LocalizedText(Box::new(LocalizedText::new(
        "en", "text",
    ))));
}

#[test]
fn encoding_variant_array() {
    serialize_test(Variant::Array(
        VariantTypeId::Int32,
        vec![Variant::Int32(1), Variant::Int32(2), Variant::Int32(3)],
    ));
    // Empty array round trips to empty
    serialize_test(Variant::Array(VariantTypeId::String, vec![]));
}

#[test]
fn encoding_data_value() {
    serialize_test(DataValue::null());
    serialize_test(DataValue::from(Variant::Int32(42)));
    serialize_test(DataValue {
        value: Some(Variant::Double(1.5)),
        status: Some(StatusCode::UncertainLastUsableValue),
        source_timestamp: Some(DateTime::ymd_hms(2020, 1, 1, 0, 0, 0)),
        source_picoseconds: Some(100),
        server_timestamp: Some(DateTime::ymd_hms(2020, 1, 1, 0, 0, 1)),
        server_picoseconds: Some(200),
    });
}

#[test]
fn encoding_array() {
    // Null array vs empty array are distinct on the wire
    let null_array: Option<Vec<u32>> = None;
    let mut stream = Cursor::new(Vec::new());
    write_array(&mut stream, &null_array).unwrap();
    assert_eq!(stream.into_inner(), vec![0xff, 0xff, 0xff, 0xff]);

    let empty_array: Option<Vec<u32>> = Some(vec![]);
    let mut stream = Cursor::new(Vec::new());
    write_array(&mut stream, &empty_array).unwrap();
    assert_eq!(stream.into_inner(), vec![0x00, 0x00, 0x00, 0x00]);
}

#[test]
fn decoding_array_limits() {
    let values: Option<Vec<u32>> = Some((0..100).collect());
    let mut stream = Cursor::new(Vec::new());
    write_array(&mut stream, &values).unwrap();

    let decoding_options = DecodingOptions {
        max_array_length: 50,
        ..DecodingOptions::test()
    };
    let mut stream = Cursor::new(stream.into_inner());
    let result: EncodingResult<Option<Vec<u32>>> = read_array(&mut stream, &decoding_options);
    assert_eq!(result.unwrap_err(), StatusCode::BadDecodingError);
}

#[test]
fn encoding_request_header() {
    serialize_test(RequestHeader::new(
        &NodeId::new(0, 99u32),
        &DateTime::now(),
        1000,
    ));
}

#[test]
fn encoding_response_header() {
    serialize_test(ResponseHeader::null());
}

#[test]
fn encoding_get_endpoints_request() {
    serialize_test(GetEndpointsRequest {
        request_header: RequestHeader::new(&NodeId::null(), &DateTime::now(), 1),
        endpoint_url: UAString::from("opc.tcp://localhost:4840/"),
        locale_ids: None,
        profile_uris: None,
    });
}

#[test]
fn encoding_open_secure_channel_request() {
    serialize_test(OpenSecureChannelRequest {
        request_header: RequestHeader::new(&NodeId::null(), &DateTime::now(), 1),
        client_protocol_version: 0,
        request_type: SecurityTokenRequestType::Issue,
        security_mode: MessageSecurityMode::None,
        client_nonce: ByteString::from(&[0u8; 32]),
        requested_lifetime: 3_600_000,
    });
}

#[test]
fn encoding_create_session_request() {
    serialize_test(CreateSessionRequest {
        request_header: RequestHeader::new(&NodeId::null(), &DateTime::now(), 2),
        client_description: ApplicationDescription::default(),
        server_uri: UAString::null(),
        endpoint_url: UAString::from("opc.tcp://localhost:4840/"),
        session_name: UAString::from("gopcua-12345"),
        client_nonce: ByteString::from(&[1u8; 32]),
        client_certificate: ByteString::null(),
        requested_session_timeout: 120000.0,
        max_response_message_size: 0,
    });
}

#[test]
fn encoding_activate_session_request() {
    let token = AnonymousIdentityToken::default();
    serialize_test(ActivateSessionRequest {
        request_header: RequestHeader::new(&NodeId::new(0, 1000u32), &DateTime::now(), 3),
        client_signature: SignatureData::null(),
        client_software_certificates: None,
        locale_ids: Some(vec![UAString::from("en-US")]),
        user_identity_token: ExtensionObject::from_encodable(
            ObjectId::AnonymousIdentityToken_Encoding_DefaultBinary,
            &token,
        ),
        user_token_signature: SignatureData::null(),
    });
}

#[test]
fn encoding_read_request() {
    serialize_test(ReadRequest {
        request_header: RequestHeader::new(&NodeId::new(0, 1000u32), &DateTime::now(), 4),
        max_age: 0.0,
        timestamps_to_return: TimestampsToReturn::Both,
        nodes_to_read: Some(vec![ReadValueId::from(NodeId::new(2, "Counter"))]),
    });
}

#[test]
fn encoding_browse_request() {
    serialize_test(BrowseRequest {
        request_header: RequestHeader::new(&NodeId::new(0, 1000u32), &DateTime::now(), 5),
        view: ViewDescription::default(),
        requested_max_references_per_node: 1000,
        nodes_to_browse: Some(vec![BrowseDescription {
            node_id: NodeId::new(0, 84u32),
            browse_direction: BrowseDirection::Forward,
            reference_type_id: NodeId::null(),
            include_subtypes: true,
            node_class_mask: 0,
            result_mask: 0x3f,
        }]),
    });
}
