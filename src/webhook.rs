// Copyright 2024 FastLabs Developers
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Best-effort webhook delivery.

use std::fmt;
use std::time::Duration;

use serde::Serialize;
use ureq::Agent;
use ureq::AgentBuilder;

use crate::config::WebhookConfig;

pub(crate) const USER_AGENT: &str = "Wiretap/1.0";

/// Why a delivery attempt failed.
///
/// Delivery is single attempt; the dispatcher turns these into local
/// warnings at most, never into caller-visible failures.
#[derive(Debug, thiserror::Error)]
pub enum DeliveryError {
    /// The payload could not be serialized.
    #[error("failed to serialize webhook payload: {0}")]
    Payload(#[from] serde_json::Error),
    /// The endpoint answered outside the 2xx range.
    #[error("webhook endpoint returned HTTP {0}")]
    Status(u16),
    /// The endpoint could not be reached at all.
    #[error("failed to reach webhook endpoint: {0}")]
    Transport(#[from] ureq::Transport),
}

impl DeliveryError {
    /// The HTTP status of the failure, when a response was received.
    pub fn status(&self) -> Option<u16> {
        match self {
            DeliveryError::Status(code) => Some(*code),
            _ => None,
        }
    }
}

/// Shared blocking HTTP client carrying the webhook configuration.
///
/// Constructed once per dispatcher and reused across calls so connections
/// are pooled; the configured timeout bounds every request.
pub(crate) struct WebhookClient {
    agent: Agent,
    config: WebhookConfig,
}

impl fmt::Debug for WebhookClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WebhookClient")
            .field("url", &self.config.url)
            .finish_non_exhaustive()
    }
}

impl WebhookClient {
    pub(crate) fn new(config: WebhookConfig, timeout: Duration) -> Self {
        let agent = AgentBuilder::new().timeout(timeout).build();
        Self { agent, config }
    }

    /// POSTs `payload` as JSON. One attempt, no retry; a missing URL is a
    /// no-op.
    pub(crate) fn send<T: Serialize>(&self, payload: &T) -> Result<(), DeliveryError> {
        let Some(url) = self.config.url.as_deref() else {
            return Ok(());
        };
        let body = serde_json::to_string(payload)?;

        let mut request = self
            .agent
            .post(url)
            .set("Content-Type", "application/json")
            .set("User-Agent", USER_AGENT);
        if let Some(secret) = self.config.secret.as_deref() {
            request = request.set("Authorization", &format!("Bearer {secret}"));
        }
        // Custom headers go last so they win over the computed defaults,
        // Authorization included.
        for (name, value) in &self.config.headers {
            request = request.set(name, value);
        }

        match request.send_string(&body) {
            Ok(response) => {
                let status = response.status();
                if (200..300).contains(&status) {
                    Ok(())
                } else {
                    Err(DeliveryError::Status(status))
                }
            }
            Err(ureq::Error::Status(code, _)) => Err(DeliveryError::Status(code)),
            Err(ureq::Error::Transport(transport)) => Err(transport.into()),
        }
    }
}
