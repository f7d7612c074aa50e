// opcua-client - an OPC UA client communication stack
// SPDX-License-Identifier: MPL-2.0

//! Convenience constructors and helpers on the service types.

use crate::types::{
    constants,
    service_types::{
        AnonymousIdentityToken, ApplicationDescription, EndpointDescription, MessageSecurityMode,
        UserTokenPolicy, UserTokenType,
    },
    string::UAString,
};

impl UserTokenPolicy {
    pub fn anonymous() -> UserTokenPolicy {
        UserTokenPolicy {
            policy_id: UAString::from(constants::ANONYMOUS_POLICY_ID),
            token_type: UserTokenType::Anonymous,
            issued_token_type: UAString::null(),
            issuer_endpoint_url: UAString::null(),
            security_policy_uri: UAString::null(),
        }
    }
}

impl Default for AnonymousIdentityToken {
    fn default() -> Self {
        AnonymousIdentityToken {
            policy_id: UAString::from(constants::ANONYMOUS_POLICY_ID),
        }
    }
}

impl EndpointDescription {
    /// Returns a reference to a policy that matches the supplied token type, otherwise None
    pub fn find_policy(&self, token_type: UserTokenType) -> Option<&UserTokenPolicy> {
        if let Some(ref policies) = self.user_identity_tokens {
            policies.iter().find(|t| t.token_type == token_type)
        } else {
            None
        }
    }

    /// Returns a reference to a policy that matches the supplied policy id
    pub fn find_policy_by_id(&self, policy_id: &str) -> Option<&UserTokenPolicy> {
        if let Some(ref policies) = self.user_identity_tokens {
            policies.iter().find(|t| t.policy_id.as_ref() == policy_id)
        } else {
            None
        }
    }
}

impl<'a> From<&'a str> for EndpointDescription {
    fn from(v: &'a str) -> Self {
        EndpointDescription {
            endpoint_url: UAString::from(v),
            security_policy_uri: UAString::from(constants::SECURITY_POLICY_NONE_URI),
            security_mode: MessageSecurityMode::None,
            server: ApplicationDescription::default(),
            security_level: 0,
            server_certificate: Default::default(),
            transport_profile_uri: UAString::null(),
            user_identity_tokens: None,
        }
    }
}
