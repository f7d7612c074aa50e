// opcua-client - an OPC UA client communication stack
// SPDX-License-Identifier: MPL-2.0

//! Convenience wrappers over [`Client::send`] for the attribute, view and
//! subscription services. These are thin adapters - they build the request,
//! dispatch it and unwrap the matching response type.

use std::time::Duration;

use crate::client::{process_service_result, process_unexpected_response};
use crate::core::supported_message::SupportedMessage;
use crate::types::{
    BrowseDescription, BrowseNextRequest, BrowseRequest, BrowseResult, ByteString,
    CreateSubscriptionRequest, CreateSubscriptionResponse, DataValue, NodeId, QualifiedName,
    ReadRequest, ReadValueId, StatusCode, TimestampsToReturn, ViewDescription, WriteRequest,
    WriteValue, ATTRIBUTE_ID_VALUE,
};

use super::Client;

impl Client {
    /// Executes a read request for the supplied nodes. A `ReadValueId` with an
    /// unset attribute id is rewritten to read the value attribute, and the
    /// data encoding is rewritten to null so values come back in the server's
    /// default encoding.
    ///
    /// See Part 4, 5.10.2.
    pub async fn read(
        &self,
        nodes_to_read: &[ReadValueId],
        timestamps_to_return: TimestampsToReturn,
        max_age: f64,
    ) -> Result<Vec<DataValue>, StatusCode> {
        if nodes_to_read.is_empty() {
            return Err(StatusCode::BadNothingToDo);
        }
        let nodes_to_read = nodes_to_read
            .iter()
            .map(|rv| {
                let mut rv = rv.clone();
                if rv.attribute_id == 0 {
                    rv.attribute_id = ATTRIBUTE_ID_VALUE;
                }
                rv.data_encoding = QualifiedName::null();
                rv
            })
            .collect();
        let request = ReadRequest {
            request_header: self.make_request_header()?,
            max_age,
            timestamps_to_return,
            nodes_to_read: Some(nodes_to_read),
        };
        let response = self.send(request).await?;
        if let SupportedMessage::ReadResponse(response) = response {
            process_service_result(&response.response_header)?;
            Ok(response.results.unwrap_or_default())
        } else {
            Err(process_unexpected_response(response))
        }
    }

    /// Reads the value attribute of a single node.
    pub async fn read_value(&self, node_id: &NodeId) -> Result<DataValue, StatusCode> {
        let results = self
            .read(
                &[ReadValueId::from(node_id)],
                TimestampsToReturn::Neither,
                0.0,
            )
            .await?;
        results.into_iter().next().ok_or(StatusCode::BadUnexpectedError)
    }

    /// Executes a write request for the supplied nodes and values, returning
    /// the per node status codes.
    ///
    /// See Part 4, 5.10.4.
    pub async fn write(&self, nodes_to_write: &[WriteValue]) -> Result<Vec<StatusCode>, StatusCode> {
        if nodes_to_write.is_empty() {
            return Err(StatusCode::BadNothingToDo);
        }
        let request = WriteRequest {
            request_header: self.make_request_header()?,
            nodes_to_write: Some(nodes_to_write.to_vec()),
        };
        let response = self.send(request).await?;
        if let SupportedMessage::WriteResponse(response) = response {
            process_service_result(&response.response_header)?;
            Ok(response.results.unwrap_or_default())
        } else {
            Err(process_unexpected_response(response))
        }
    }

    /// Executes a browse request for the supplied node descriptions.
    ///
    /// See Part 4, 5.8.2.
    pub async fn browse(
        &self,
        nodes_to_browse: &[BrowseDescription],
        max_references_per_node: u32,
    ) -> Result<Vec<BrowseResult>, StatusCode> {
        if nodes_to_browse.is_empty() {
            return Err(StatusCode::BadNothingToDo);
        }
        let request = BrowseRequest {
            request_header: self.make_request_header()?,
            view: ViewDescription::default(),
            requested_max_references_per_node: max_references_per_node,
            nodes_to_browse: Some(nodes_to_browse.to_vec()),
        };
        let response = self.send(request).await?;
        if let SupportedMessage::BrowseResponse(response) = response {
            process_service_result(&response.response_header)?;
            Ok(response.results.unwrap_or_default())
        } else {
            Err(process_unexpected_response(response))
        }
    }

    /// Continues a browse from the supplied continuation points, or releases
    /// them without fetching more results.
    ///
    /// See Part 4, 5.8.3.
    pub async fn browse_next(
        &self,
        release_continuation_points: bool,
        continuation_points: &[ByteString],
    ) -> Result<Vec<BrowseResult>, StatusCode> {
        if continuation_points.is_empty() {
            return Err(StatusCode::BadNothingToDo);
        }
        let request = BrowseNextRequest {
            request_header: self.make_request_header()?,
            release_continuation_points,
            continuation_points: Some(continuation_points.to_vec()),
        };
        let response = self.send(request).await?;
        if let SupportedMessage::BrowseNextResponse(response) = response {
            process_service_result(&response.response_header)?;
            Ok(response.results.unwrap_or_default())
        } else {
            Err(process_unexpected_response(response))
        }
    }

    /// Creates a subscription with the supplied publishing interval, returning
    /// the subscription id and revised parameters. Monitored item management
    /// and the publish loop are up to the caller.
    ///
    /// See Part 4, 5.13.2.
    pub async fn create_subscription(
        &self,
        publishing_interval: Duration,
        lifetime_count: u32,
        max_keep_alive_count: u32,
        max_notifications_per_publish: u32,
        priority: u8,
        publishing_enabled: bool,
    ) -> Result<CreateSubscriptionResponse, StatusCode> {
        let request = CreateSubscriptionRequest {
            request_header: self.make_request_header()?,
            requested_publishing_interval: publishing_interval.as_millis() as f64,
            requested_lifetime_count: lifetime_count,
            requested_max_keep_alive_count: max_keep_alive_count,
            max_notifications_per_publish,
            publishing_enabled,
            priority,
        };
        let response = self.send(request).await?;
        if let SupportedMessage::CreateSubscriptionResponse(response) = response {
            process_service_result(&response.response_header)?;
            Ok(*response)
        } else {
            Err(process_unexpected_response(response))
        }
    }
}
