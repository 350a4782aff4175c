//! Access-gate decision types.
//!
//! A decision is computed once per request and handed to the routing
//! layer as a value; nothing here is shared between requests.

use serde::{Deserialize, Serialize};

pub mod validator;

pub use validator::ValidatorClient;

/// Payload the gate forwards to the external validation service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckRequest {
    #[serde(rename = "ipAddress", default)]
    pub ip_address: String,
    /// Opaque session token; absent means no check is performed.
    #[serde(default)]
    pub uuid: String,
}

/// Message the `/check` endpoint returns to the caller.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckResponse {
    pub message: String,
}

/// Per-request authorization outcome.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AccessDecision {
    Allowed,
    Denied,
    /// The validator could not produce an answer (unreachable, timeout,
    /// unparseable body). Distinct from `Denied`: this is a server-side
    /// fault, not a refusal.
    Failed(String),
}

impl AccessDecision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, AccessDecision::Allowed)
    }
}

/// A decision together with the validator's human-readable message.
#[derive(Debug, Clone)]
pub struct GateVerdict {
    pub decision: AccessDecision,
    pub message: String,
}

/// Maps validator messages onto decisions.
///
/// Exactly two literals are recognized; anything else is denied
/// conservatively. The literals come from configuration because the
/// validator answers in the deployment's language.
#[derive(Debug, Clone)]
pub struct GatePolicy {
    granted_message: String,
    denied_message: String,
}

impl GatePolicy {
    pub fn new(granted_message: impl Into<String>, denied_message: impl Into<String>) -> Self {
        Self {
            granted_message: granted_message.into(),
            denied_message: denied_message.into(),
        }
    }

    pub fn granted_message(&self) -> &str {
        &self.granted_message
    }

    pub fn classify(&self, message: &str) -> AccessDecision {
        if message == self.granted_message {
            AccessDecision::Allowed
        } else if message == self.denied_message {
            AccessDecision::Denied
        } else {
            tracing::warn!(message, "unrecognized validator message, denying");
            AccessDecision::Denied
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn policy() -> GatePolicy {
        GatePolicy::new("Access granted!", "Access denied!")
    }

    #[test]
    fn granted_literal_allows() {
        assert_eq!(policy().classify("Access granted!"), AccessDecision::Allowed);
    }

    #[test]
    fn denied_literal_denies() {
        assert_eq!(policy().classify("Access denied!"), AccessDecision::Denied);
    }

    #[test]
    fn anything_else_denies_conservatively() {
        let policy = policy();
        assert_eq!(policy.classify(""), AccessDecision::Denied);
        assert_eq!(policy.classify("access granted!"), AccessDecision::Denied);
        assert_eq!(policy.classify("Access granted! "), AccessDecision::Denied);
        assert_eq!(policy.classify("\u{1f512}"), AccessDecision::Denied);
    }

    #[test]
    fn literals_are_configurable() {
        let policy = GatePolicy::new("Доступ открыт!", "Доступ закрыт!");
        assert_eq!(policy.classify("Доступ открыт!"), AccessDecision::Allowed);
        assert_eq!(policy.classify("Access granted!"), AccessDecision::Denied);
    }

    #[test]
    fn check_request_uses_the_validator_field_names() {
        let request = CheckRequest {
            ip_address: "203.0.113.9".to_string(),
            uuid: "1db581e3".to_string(),
        };
        let value = serde_json::to_value(&request).expect("serialize");
        assert_eq!(value["ipAddress"], "203.0.113.9");
        assert_eq!(value["uuid"], "1db581e3");
    }
}
