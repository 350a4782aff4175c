//! Client for the external validation service.

use horizon_config::GateConfig;
use tracing::{debug, warn};

use super::{AccessDecision, CheckRequest, GatePolicy, GateVerdict};

/// Synchronous-per-request client for the external validator.
///
/// Every call is bounded by the configured timeout; failures surface as
/// [`AccessDecision::Failed`] for the request at hand and are never
/// retried.
#[derive(Debug, Clone)]
pub struct ValidatorClient {
    http: reqwest::Client,
    check_url: String,
    policy: GatePolicy,
}

impl ValidatorClient {
    pub fn new(config: &GateConfig) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()?;

        Ok(Self {
            http,
            check_url: config.check_url.clone(),
            policy: GatePolicy::new(&config.granted_message, &config.denied_message),
        })
    }

    /// Evaluate one request.
    ///
    /// An absent or empty session token means no check is performed and
    /// the request is implicitly allowed; the validator is not called.
    pub async fn check(&self, request: &CheckRequest) -> GateVerdict {
        if request.uuid.trim().is_empty() {
            debug!("no session token presented, skipping validator call");
            return GateVerdict {
                decision: AccessDecision::Allowed,
                message: self.policy.granted_message().to_string(),
            };
        }

        let response = match self.http.post(&self.check_url).json(request).send().await {
            Ok(response) => response,
            Err(e) => return Self::failed(format!("validator unreachable: {e}")),
        };

        let status = response.status();
        if !status.is_success() {
            return Self::failed(format!("validator answered {status}"));
        }

        // The validator's body is a JSON-encoded string holding a bare
        // human-readable message.
        let message = match response.json::<String>().await {
            Ok(message) => message,
            Err(e) => return Self::failed(format!("malformed validator response: {e}")),
        };

        debug!(message, "validator responded");
        GateVerdict {
            decision: self.policy.classify(&message),
            message,
        }
    }

    fn failed(reason: String) -> GateVerdict {
        warn!(reason, "validator call failed");
        GateVerdict {
            decision: AccessDecision::Failed(reason.clone()),
            message: reason,
        }
    }
}
