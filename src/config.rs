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

//! Typed configuration consumed by the dispatcher.
//!
//! Configuration is read-only once a [`Wiretap`][crate::Wiretap] instance
//! owns it. The data parts deserialize from any serde format; the exception
//! mapping holds closures and is attached programmatically via
//! [`Config::exception_levels`].

use std::collections::HashMap;
use std::str::FromStr;
use std::time::Duration;

use serde::Deserialize;
use serde::Deserializer;
use serde::Serialize;

use crate::classify::ExceptionLevels;

/// Default timeout applied to webhook HTTP requests.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

/// Top-level dispatcher configuration.
///
/// # Examples
///
/// ```
/// use wiretap::Config;
/// use wiretap::ExceptionLevels;
/// use wiretap::Level;
///
/// let config = Config::default()
///     .exception_levels(ExceptionLevels::new().default_rule(Level::Error));
/// assert!(config.enabled);
/// ```
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Master switch. When false, every dispatcher call is a no-op.
    pub enabled: bool,
    /// Whether events are emitted to the local sink.
    pub local_logging: bool,
    /// Webhook relay settings.
    pub webhook: WebhookConfig,
    /// Timeout for webhook HTTP requests, in seconds when deserialized.
    #[serde(deserialize_with = "duration_secs")]
    pub timeout: Duration,
    /// Application metadata included in webhook payloads.
    pub app: AppInfo,
    /// Host identity included in webhook payloads.
    pub server: ServerInfo,
    /// Maps caught errors to severity levels.
    #[serde(skip)]
    pub exception_levels: ExceptionLevels,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            enabled: true,
            local_logging: true,
            webhook: WebhookConfig::default(),
            timeout: DEFAULT_TIMEOUT,
            app: AppInfo::default(),
            server: ServerInfo::detect(),
            exception_levels: ExceptionLevels::default(),
        }
    }
}

impl Config {
    /// Builds a configuration from `WIRETAP_*` environment variables.
    ///
    /// Recognized variables: `WIRETAP_ENABLED`, `WIRETAP_LOCAL_LOGGING`,
    /// `WIRETAP_WEBHOOK_ENABLED`, `WIRETAP_WEBHOOK_URL`,
    /// `WIRETAP_WEBHOOK_SECRET`, `WIRETAP_WEBHOOK_LOG_FAILURES`,
    /// `WIRETAP_TIMEOUT` (seconds), `WIRETAP_APP_NAME`, `WIRETAP_APP_ENV`
    /// and `WIRETAP_APP_URL`. Unset or unparsable variables keep their
    /// defaults; booleans parse as `true`/`false`.
    pub fn from_env() -> Config {
        let mut config = Config::default();
        load_env("WIRETAP_ENABLED", &mut config.enabled);
        load_env("WIRETAP_LOCAL_LOGGING", &mut config.local_logging);
        load_env("WIRETAP_WEBHOOK_ENABLED", &mut config.webhook.enabled);
        load_env_opt("WIRETAP_WEBHOOK_URL", &mut config.webhook.url);
        load_env_opt("WIRETAP_WEBHOOK_SECRET", &mut config.webhook.secret);
        load_env("WIRETAP_WEBHOOK_LOG_FAILURES", &mut config.webhook.log_failures);

        let mut timeout_secs = DEFAULT_TIMEOUT.as_secs();
        load_env("WIRETAP_TIMEOUT", &mut timeout_secs);
        config.timeout = Duration::from_secs(timeout_secs);

        load_env("WIRETAP_APP_NAME", &mut config.app.name);
        load_env("WIRETAP_APP_ENV", &mut config.app.env);
        load_env("WIRETAP_APP_URL", &mut config.app.url);
        config
    }

    /// Attaches the exception mapping.
    #[must_use = "the config must be passed to Wiretap::new to take effect"]
    pub fn exception_levels(mut self, levels: ExceptionLevels) -> Self {
        self.exception_levels = levels;
        self
    }
}

/// Webhook relay settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct WebhookConfig {
    /// Whether webhook delivery is attempted at all.
    pub enabled: bool,
    /// POST endpoint. Delivery is a no-op while unset.
    pub url: Option<String>,
    /// Sent as `Authorization: Bearer <secret>` when set.
    pub secret: Option<String>,
    /// Extra request headers, applied after the computed defaults so they
    /// win on collision, Authorization included.
    pub headers: HashMap<String, String>,
    /// Whether delivery failures are surfaced as local warnings.
    pub log_failures: bool,
}

impl Default for WebhookConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            url: None,
            secret: None,
            headers: HashMap::new(),
            log_failures: true,
        }
    }
}

/// Application metadata attached to every webhook payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppInfo {
    pub name: String,
    pub env: String,
    pub url: String,
}

impl Default for AppInfo {
    fn default() -> Self {
        Self {
            name: "rust".to_owned(),
            env: "production".to_owned(),
            url: String::new(),
        }
    }
}

/// Host identity attached to every webhook payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerInfo {
    pub hostname: String,
    pub ip: String,
}

impl Default for ServerInfo {
    fn default() -> Self {
        Self::detect()
    }
}

impl ServerInfo {
    /// Detects the local hostname. The address is not guessed; deployments
    /// that know their address should overwrite `ip`.
    pub fn detect() -> Self {
        let hostname = hostname::get()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|_| "unknown".to_owned());
        Self {
            hostname,
            ip: "unknown".to_owned(),
        }
    }
}

fn duration_secs<'de, D>(deserializer: D) -> Result<Duration, D::Error>
where
    D: Deserializer<'de>,
{
    let secs = u64::deserialize(deserializer)?;
    Ok(Duration::from_secs(secs))
}

/// Overwrites `target` when the variable is set and parses; otherwise keeps
/// the current value.
fn load_env<T>(name: &str, target: &mut T)
where
    T: FromStr,
{
    if let Ok(value) = std::env::var(name) {
        if let Ok(parsed) = value.parse() {
            *target = parsed;
        }
    }
}

fn load_env_opt(name: &str, target: &mut Option<String>) {
    if let Ok(value) = std::env::var(name) {
        *target = Some(value);
    }
}
