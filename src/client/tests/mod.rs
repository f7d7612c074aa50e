// opcua-client - an OPC UA client communication stack
// SPDX-License-Identifier: MPL-2.0

//! End to end tests of the client against an in-process server that speaks
//! just enough of the protocol - hello / acknowledge, open secure channel and
//! canned service responses - to drive the whole connect lifecycle.

use std::sync::Arc;
use std::time::Duration;

use futures::StreamExt;
use parking_lot::Mutex;
use tokio::io::AsyncWriteExt;
use tokio::net::TcpListener;
use tokio_util::codec::FramedRead;

use crate::client::{Client, ClientConfig, SessionConfig};
use crate::core::comms::chunker::{next_sequence_number, Chunker};
use crate::core::comms::secure_channel::{Role, SecureChannel};
use crate::core::comms::tcp_codec::{Message, TcpCodec};
use crate::core::comms::tcp_types::{AcknowledgeMessage, MessageHeader, MessageType};
use crate::core::supported_message::SupportedMessage;
use crate::types::*;

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// What the test server observed and how it should (mis)behave.
#[derive(Default)]
struct ServerState {
    /// Request ids seen, in arrival order.
    request_ids: Vec<u32>,
    /// Number of OpenSecureChannel requests - the issue plus any renewals.
    open_secure_channel_count: usize,
    /// Authentication tokens on CreateSession requests. Expected to be null.
    create_session_tokens: Vec<NodeId>,
    /// Authentication tokens sessions were activated with.
    activated_tokens: Vec<NodeId>,
    /// Authentication tokens sessions were closed with.
    closed_tokens: Vec<NodeId>,
    /// Authentication tokens on read requests.
    read_tokens: Vec<NodeId>,
    /// The read value ids as they appeared on the wire.
    read_nodes: Vec<ReadValueId>,
    /// Respond to CloseSession with a service fault.
    fail_close_session: bool,
    /// Hold back read responses this long.
    delay_read_response: Option<Duration>,
}

struct TestServer {
    endpoint_url: String,
    state: Arc<Mutex<ServerState>>,
}

impl TestServer {
    /// Binds a listener on an ephemeral port and serves a single connection.
    async fn start() -> TestServer {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let endpoint_url = format!("opc.tcp://{}/", listener.local_addr().unwrap());
        let state: Arc<Mutex<ServerState>> = Default::default();
        tokio::spawn(Self::serve(listener, state.clone()));
        TestServer {
            endpoint_url,
            state,
        }
    }

    async fn serve(listener: TcpListener, state: Arc<Mutex<ServerState>>) {
        let (socket, _) = listener.accept().await.unwrap();
        let (reader, mut writer) = tokio::io::split(socket);

        let decoding_options = DecodingOptions::default();
        let mut framed_read = FramedRead::new(reader, TcpCodec::new(decoding_options.clone()));

        // Expect a hello, give an acknowledge back echoing its limits
        let hello = match framed_read.next().await {
            Some(Ok(Message::Hello(hello))) => hello,
            other => panic!("Expected a hello, got {:?}", other),
        };
        let mut ack = AcknowledgeMessage {
            message_header: MessageHeader::new(MessageType::Acknowledge),
            protocol_version: 0,
            receive_buffer_size: hello.receive_buffer_size,
            send_buffer_size: hello.send_buffer_size,
            max_message_size: hello.max_message_size,
            max_chunk_count: hello.max_chunk_count,
        };
        ack.message_header.message_size = ack.byte_len() as u32;
        writer.write_all(&ack.encode_to_vec()).await.unwrap();

        let mut secure_channel = SecureChannel::new(Role::Server, decoding_options);
        let channel_id = 1u32;
        let mut next_token_id = 99u32;
        let mut next_session = 0u32;
        let mut sequence_number = 0u32;

        while let Some(Ok(message)) = framed_read.next().await {
            let Message::Chunk(chunk) = message else {
                panic!("Expected a chunk, got {:?}", message);
            };
            let chunk = secure_channel.verify_and_remove_security(&chunk.data).unwrap();
            let request_id = chunk.chunk_info(&secure_channel).unwrap().sequence_header.request_id;
            state.lock().request_ids.push(request_id);

            let request = Chunker::decode(&[chunk], &secure_channel, None).unwrap();

            let mut read_delay = None;
            let response: SupportedMessage = match request {
                SupportedMessage::OpenSecureChannelRequest(request) => {
                    state.lock().open_secure_channel_count += 1;
                    next_token_id += 1;
                    let security_token = ChannelSecurityToken {
                        channel_id,
                        token_id: next_token_id,
                        created_at: DateTime::now(),
                        revised_lifetime: request.requested_lifetime,
                    };
                    secure_channel.set_security_token(security_token.clone());
                    OpenSecureChannelResponse {
                        response_header: ResponseHeader::new_good(&request.request_header),
                        server_protocol_version: 0,
                        security_token,
                        server_nonce: ByteString::from(&[1u8; 32]),
                    }
                    .into()
                }
                SupportedMessage::CloseSecureChannelRequest(_) => {
                    // No response to a close, the connection just goes away
                    return;
                }
                SupportedMessage::GetEndpointsRequest(request) => GetEndpointsResponse {
                    response_header: ResponseHeader::new_good(&request.request_header),
                    endpoints: Some(vec![EndpointDescription::from(
                        request.endpoint_url.as_ref(),
                    )]),
                }
                .into(),
                SupportedMessage::CreateSessionRequest(request) => {
                    state
                        .lock()
                        .create_session_tokens
                        .push(request.request_header.authentication_token.clone());
                    next_session += 1;
                    CreateSessionResponse {
                        response_header: ResponseHeader::new_good(&request.request_header),
                        session_id: NodeId::new(1, next_session),
                        authentication_token: NodeId::new(0, 1000 + next_session),
                        revised_session_timeout: request.requested_session_timeout,
                        server_nonce: ByteString::from(&[2u8; 32]),
                        server_certificate: ByteString::null(),
                        server_endpoints: None,
                        server_software_certificates: None,
                        server_signature: SignatureData::null(),
                        max_request_message_size: 0,
                    }
                    .into()
                }
                SupportedMessage::ActivateSessionRequest(request) => {
                    state
                        .lock()
                        .activated_tokens
                        .push(request.request_header.authentication_token.clone());
                    ActivateSessionResponse {
                        response_header: ResponseHeader::new_good(&request.request_header),
                        server_nonce: ByteString::from(&[3u8; 32]),
                        results: None,
                        diagnostic_infos: None,
                    }
                    .into()
                }
                SupportedMessage::CloseSessionRequest(request) => {
                    let fail = {
                        let mut state = state.lock();
                        state
                            .closed_tokens
                            .push(request.request_header.authentication_token.clone());
                        state.fail_close_session
                    };
                    if fail {
                        ServiceFault::new(&request.request_header, StatusCode::BadSessionIdInvalid)
                            .into()
                    } else {
                        CloseSessionResponse {
                            response_header: ResponseHeader::new_good(&request.request_header),
                        }
                        .into()
                    }
                }
                SupportedMessage::ReadRequest(request) => {
                    let delay = {
                        let mut state = state.lock();
                        state
                            .read_tokens
                            .push(request.request_header.authentication_token.clone());
                        state
                            .read_nodes
                            .extend(request.nodes_to_read.clone().unwrap_or_default());
                        state.delay_read_response
                    };
                    read_delay = delay;
                    let node_count = request.nodes_to_read.as_ref().map(|n| n.len()).unwrap_or(0);
                    ReadResponse {
                        response_header: ResponseHeader::new_good(&request.request_header),
                        results: Some(vec![DataValue::from(Variant::Int32(42)); node_count]),
                        diagnostic_infos: None,
                    }
                    .into()
                }
                other => {
                    panic!("Test server has no answer for {:?}", other);
                }
            };

            if let Some(delay) = read_delay {
                tokio::time::sleep(delay).await;
            }

            sequence_number = next_sequence_number(sequence_number);
            let chunks =
                Chunker::encode(sequence_number, request_id, 0, 0, &secure_channel, &response)
                    .unwrap();
            writer
                .write_all(&chunks[0].encode_to_vec())
                .await
                .unwrap();
        }
    }
}

fn test_client(server: &TestServer) -> Client {
    // A deterministic request id seed so the tests can assert contiguity
    Client::new(
        &server.endpoint_url,
        ClientConfig::new(1),
        SessionConfig::default(),
    )
}

#[tokio::test]
async fn connect_creates_and_activates_a_session() {
    init_logging();
    let server = TestServer::start().await;
    let mut client = test_client(&server);

    client.connect().await.unwrap();

    // The channel is open and a session is active
    assert_ne!(client.secure_channel_id(), 0);
    let session = client.session().expect("Expected an active session");
    assert!(!session.authentication_token().is_null());
    assert_eq!(session.authentication_token(), &NodeId::new(0, 1001u32));

    // The create session request carried a null authentication token
    {
        let state = server.state.lock();
        assert_eq!(state.create_session_tokens, vec![NodeId::null()]);
        assert_eq!(state.activated_tokens, vec![NodeId::new(0, 1001u32)]);
    }

    // A read attaches the session's token to its request header
    let value = client.read_value(&NodeId::new(2, "Counter")).await.unwrap();
    assert_eq!(value.value, Some(Variant::Int32(42)));
    {
        let state = server.state.lock();
        assert_eq!(state.read_tokens, vec![NodeId::new(0, 1001u32)]);
    }

    client.close().await.unwrap();
}

#[tokio::test]
async fn connect_twice_fails_and_keeps_the_channel() {
    init_logging();
    let server = TestServer::start().await;
    let mut client = test_client(&server);

    client.connect().await.unwrap();
    let session = client.session().unwrap();

    // The second connect is rejected outright
    assert_eq!(client.connect().await.unwrap_err(), StatusCode::BadInvalidState);

    // The original channel and session remain usable
    assert_eq!(client.session().unwrap().authentication_token(), session.authentication_token());
    let value = client.read_value(&NodeId::new(2, "Counter")).await.unwrap();
    assert_eq!(value.value, Some(Variant::Int32(42)));
}

#[tokio::test]
async fn get_endpoints_without_a_session() {
    init_logging();
    let server = TestServer::start().await;
    let mut client = test_client(&server);

    client.dial().await.unwrap();
    let endpoints = client.get_endpoints().await.unwrap();
    assert!(!endpoints.is_empty());

    // No session was created or activated on the way
    assert!(client.session().is_none());
    {
        let state = server.state.lock();
        assert!(state.create_session_tokens.is_empty());
        assert!(state.activated_tokens.is_empty());
    }
    client.close().await.unwrap();
}

#[tokio::test]
async fn dial_twice_fails() {
    init_logging();
    let server = TestServer::start().await;
    let mut client = test_client(&server);

    client.dial().await.unwrap();
    assert_eq!(client.dial().await.unwrap_err(), StatusCode::BadInvalidState);
}

#[tokio::test]
async fn activating_a_second_session_closes_the_first() {
    init_logging();
    let server = TestServer::start().await;
    let mut client = test_client(&server);

    client.connect().await.unwrap();
    let first_token = client.session().unwrap().authentication_token().clone();

    // Create and activate a replacement session
    let second = client.create_session().await.unwrap();
    let second_token = second.authentication_token().clone();
    assert_ne!(first_token, second_token);
    client.activate_session(second).await.unwrap();

    // The first session was closed on the wire, the second is now active
    assert_eq!(
        client.session().unwrap().authentication_token(),
        &second_token
    );
    {
        let state = server.state.lock();
        assert_eq!(state.closed_tokens, vec![first_token]);
    }
}

#[tokio::test]
async fn failing_to_close_the_first_session_fails_the_replacement() {
    init_logging();
    let server = TestServer::start().await;
    let mut client = test_client(&server);

    client.connect().await.unwrap();
    let first_token = client.session().unwrap().authentication_token().clone();

    server.state.lock().fail_close_session = true;

    let second = client.create_session().await.unwrap();
    let second_token = second.authentication_token().clone();
    let err = client.activate_session(second).await.unwrap_err();
    assert_eq!(err, StatusCode::BadSessionIdInvalid);

    // The first session remains the active one, and the server saw close
    // attempts for the old session and then the abandoned new one
    assert_eq!(
        client.session().unwrap().authentication_token(),
        &first_token
    );
    {
        let state = server.state.lock();
        assert_eq!(state.closed_tokens, vec![first_token, second_token]);
    }
}

#[tokio::test]
async fn detach_session_leaves_it_open_on_the_wire() {
    init_logging();
    let server = TestServer::start().await;
    let mut client = test_client(&server);

    client.connect().await.unwrap();
    let detached = client.detach_session().expect("Expected a session to detach");
    assert!(client.session().is_none());
    assert!(!detached.authentication_token().is_null());

    // Nothing was closed on the wire
    assert!(server.state.lock().closed_tokens.is_empty());

    // Requests now go out without an authentication token
    let _ = client.read_value(&NodeId::new(2, "Counter")).await.unwrap();
    {
        let state = server.state.lock();
        assert_eq!(state.read_tokens, vec![NodeId::null()]);
    }
}

#[tokio::test]
async fn request_ids_are_contiguous_from_the_seed() {
    init_logging();
    let server = TestServer::start().await;
    let mut client = test_client(&server);

    client.connect().await.unwrap();
    for _ in 0..3 {
        let _ = client.read_value(&NodeId::new(2, "Counter")).await.unwrap();
    }

    // Every request on the channel - open secure channel, session handshake,
    // reads - consumed one id, counting up from the seed with no gaps
    let state = server.state.lock();
    let expected: Vec<u32> = (1..=state.request_ids.len() as u32).collect();
    assert_eq!(state.request_ids, expected);
}

#[tokio::test]
async fn timed_out_request_fails_and_late_response_is_dropped() {
    init_logging();
    let server = TestServer::start().await;
    let mut client = Client::new(
        &server.endpoint_url,
        ClientConfig::new(1).request_timeout(Duration::from_millis(500)),
        SessionConfig::default(),
    );

    client.connect().await.unwrap();

    // The server holds the response back past the request timeout
    server.state.lock().delay_read_response = Some(Duration::from_millis(800));
    let err = client
        .read_value(&NodeId::new(2, "Counter"))
        .await
        .unwrap_err();
    assert_eq!(err, StatusCode::BadTimeout);

    // The late response arrives eventually and is silently discarded - the
    // channel stays usable for the next request
    server.state.lock().delay_read_response = None;
    let value = client.read_value(&NodeId::new(2, "Counter")).await.unwrap();
    assert_eq!(value.value, Some(Variant::Int32(42)));
}

#[tokio::test]
async fn cancelled_request_does_not_tear_down_the_channel() {
    init_logging();
    let server = TestServer::start().await;
    let mut client = test_client(&server);

    client.connect().await.unwrap();

    // Cancel a request by dropping its future before the response arrives
    server.state.lock().delay_read_response = Some(Duration::from_millis(500));
    let result = tokio::time::timeout(
        Duration::from_millis(50),
        client.read_value(&NodeId::new(2, "Counter")),
    )
    .await;
    assert!(result.is_err());

    // The eventual response finds no one waiting; the channel survives
    server.state.lock().delay_read_response = None;
    let value = client.read_value(&NodeId::new(2, "Counter")).await.unwrap();
    assert_eq!(value.value, Some(Variant::Int32(42)));
}

#[tokio::test]
async fn read_rewrites_attribute_id_and_data_encoding() {
    init_logging();
    let server = TestServer::start().await;
    let mut client = test_client(&server);

    client.connect().await.unwrap();

    // An unset attribute id and a populated data encoding are both rewritten
    // before the request goes out
    let rv = ReadValueId {
        node_id: NodeId::new(2, "Counter"),
        attribute_id: 0,
        index_range: UAString::null(),
        data_encoding: QualifiedName::new(1, "Custom"),
    };
    let results = client
        .read(&[rv], TimestampsToReturn::Neither, 0.0)
        .await
        .unwrap();
    assert_eq!(results.len(), 1);

    let state = server.state.lock();
    assert_eq!(state.read_nodes.len(), 1);
    assert_eq!(state.read_nodes[0].node_id, NodeId::new(2, "Counter"));
    assert_eq!(state.read_nodes[0].attribute_id, ATTRIBUTE_ID_VALUE);
    assert!(state.read_nodes[0].data_encoding.is_null());
}

#[tokio::test]
async fn security_token_is_renewed_in_the_background() {
    init_logging();
    let server = TestServer::start().await;
    // A one second token lifetime makes the renewal timer fire at 750ms
    let mut client = Client::new(
        &server.endpoint_url,
        ClientConfig::new(1).requested_lifetime(1_000),
        SessionConfig::default(),
    );

    client.connect().await.unwrap();
    assert_eq!(server.state.lock().open_secure_channel_count, 1);

    tokio::time::sleep(Duration::from_millis(1200)).await;

    // At least one renewal went out while nothing else was happening, and the
    // channel remains usable under the rotated token
    assert!(server.state.lock().open_secure_channel_count >= 2);
    let value = client.read_value(&NodeId::new(2, "Counter")).await.unwrap();
    assert_eq!(value.value, Some(Variant::Int32(42)));
}

#[tokio::test]
async fn get_endpoints_helper_dials_and_closes() {
    init_logging();
    let server = TestServer::start().await;
    let endpoints = crate::client::get_endpoints(&server.endpoint_url)
        .await
        .unwrap();
    assert_eq!(endpoints.len(), 1);
    assert!(server.state.lock().create_session_tokens.is_empty());
}

#[tokio::test]
async fn send_without_a_channel_fails() {
    init_logging();
    let client = Client::new(
        "opc.tcp://localhost:4840/",
        ClientConfig::new(1),
        SessionConfig::default(),
    );
    assert!(client.session().is_none());
    assert_eq!(
        client.get_endpoints().await.unwrap_err(),
        StatusCode::BadNotConnected
    );
    assert_eq!(
        client.create_session().await.unwrap_err(),
        StatusCode::BadNotConnected
    );
}
