use std::time::Duration;

use serde::Deserialize;
use serde_json::{json, Value};

use super::{Decision, DenyReason, ScreeningError, ScreeningRequest, Screener};
use crate::config::{ArcjetConfig, TokenBucketConfig};

const DECIDE_PATH: &str = "/proto.decide.v1alpha1.DecideService/Decide";
const SDK_VERSION: &str = concat!("social-api/", env!("CARGO_PKG_VERSION"));

/// Client for the Arcjet decision API (Connect protocol, JSON encoding).
///
/// Every call sends the same rule set: shield, bot detection allowing search
/// engines, and a token bucket.
pub struct ArcjetClient {
    http: reqwest::Client,
    endpoint: String,
    key: String,
    rules: Value,
}

impl ArcjetClient {
    /// `None` when no key is configured.
    pub fn from_config(config: &ArcjetConfig) -> Result<Option<Self>, ScreeningError> {
        let Some(key) = config.key.clone() else {
            return Ok(None);
        };

        let http = reqwest::Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()?;

        Ok(Some(Self {
            http,
            endpoint: format!("{}{}", config.base_url, DECIDE_PATH),
            key,
            rules: rules(&config.rate_limit),
        }))
    }
}

fn rules(bucket: &TokenBucketConfig) -> Value {
    json!([
        { "shield": { "mode": "MODE_LIVE" } },
        {
            "botV2": {
                "mode": "MODE_LIVE",
                "allow": ["CATEGORY:SEARCH_ENGINE"],
                "deny": []
            }
        },
        {
            "rateLimit": {
                "mode": "MODE_LIVE",
                "algorithm": "RATE_LIMIT_ALGORITHM_TOKEN_BUCKET",
                "refillRate": bucket.refill_rate,
                "interval": bucket.interval_secs,
                "capacity": bucket.capacity
            }
        }
    ])
}

fn request_body(request: &ScreeningRequest, rules: &Value) -> Value {
    json!({
        "sdkStack": "SDK_STACK_UNSPECIFIED",
        "sdkVersion": SDK_VERSION,
        "details": {
            "ip": request.ip,
            "method": request.method,
            "protocol": request.protocol,
            "host": request.host,
            "path": request.path,
            "headers": request.headers,
            "extra": { "requested": request.requested.to_string() }
        },
        "rules": rules
    })
}

#[derive(Debug, Deserialize)]
struct DecideResponse {
    decision: Option<WireDecision>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireDecision {
    #[serde(default)]
    id: String,
    #[serde(default)]
    conclusion: String,
    reason: Option<WireReason>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireReason {
    rate_limit: Option<Value>,
    bot: Option<Value>,
    bot_v2: Option<WireBotReason>,
    error: Option<WireErrorReason>,
}

#[derive(Debug, Default, Deserialize)]
struct WireBotReason {
    #[serde(default)]
    spoofed: bool,
}

#[derive(Debug, Default, Deserialize)]
struct WireErrorReason {
    #[serde(default)]
    message: String,
}

impl WireDecision {
    fn into_decision(self) -> Result<Decision, ScreeningError> {
        let reason = self.reason.unwrap_or_default();
        let conclusion = self.conclusion.to_ascii_uppercase();

        if conclusion.ends_with("ERROR") {
            let message = reason
                .error
                .map(|e| e.message)
                .filter(|m| !m.is_empty())
                .unwrap_or_else(|| format!("decision {} concluded with an error", self.id));
            return Err(ScreeningError::Service(message));
        }

        if conclusion.ends_with("DENY") || conclusion.ends_with("CHALLENGE") {
            let why = if reason.rate_limit.is_some() {
                DenyReason::RateLimit
            } else if reason.bot.is_some() || reason.bot_v2.is_some() {
                DenyReason::Bot
            } else {
                DenyReason::Other
            };
            return Ok(Decision::Deny(why));
        }

        Ok(Decision::Allow {
            spoofed_bot: reason.bot_v2.map(|b| b.spoofed).unwrap_or(false),
        })
    }
}

#[async_trait::async_trait]
impl Screener for ArcjetClient {
    async fn screen(&self, request: &ScreeningRequest) -> Result<Decision, ScreeningError> {
        let response: DecideResponse = self
            .http
            .post(&self.endpoint)
            .bearer_auth(&self.key)
            .header("Connect-Protocol-Version", "1")
            .json(&request_body(request, &self.rules))
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        let decision = response
            .decision
            .ok_or_else(|| ScreeningError::Service("response carried no decision".into()))?;

        tracing::debug!(
            decision_id = %decision.id,
            conclusion = %decision.conclusion,
            path = %request.path,
            "screening decision"
        );

        decision.into_decision()
    }
}
