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

//! The dispatcher tying the local sink and the webhook together.

use std::error::Error as StdError;
use std::io::Write;
use std::panic::Location;

use serde::Serialize;
use serde_json::Value;

use crate::Context;
use crate::Level;
use crate::classify::Verdict;
use crate::config::Config;
use crate::payload::EventPayload;
use crate::payload::custom_payload;
use crate::sink::LogFacade;
use crate::sink::Sink;
use crate::webhook::WebhookClient;

/// Dispatches log events to the local sink and the configured webhook.
///
/// Construct one per application and share it; the configuration is
/// read-only for the dispatcher's lifetime and the HTTP client is reused
/// across calls. Every call runs inline on the caller's thread: the local
/// emit, then at most one blocking POST. No entry point returns an error or
/// panics.
///
/// # Examples
///
/// ```
/// use wiretap::Config;
/// use wiretap::Context;
/// use wiretap::Wiretap;
///
/// let wiretap = Wiretap::new(Config::default());
/// wiretap.info("listener started", Context::new(), false);
/// ```
#[derive(Debug)]
pub struct Wiretap {
    config: Config,
    sink: Box<dyn Sink>,
    webhook: WebhookClient,
}

impl Wiretap {
    /// Creates a dispatcher forwarding local events to the `log` facade.
    pub fn new(config: Config) -> Self {
        Self::with_sink(config, LogFacade)
    }

    /// Creates a dispatcher with a custom local sink.
    pub fn with_sink(config: Config, sink: impl Sink) -> Self {
        let webhook = WebhookClient::new(config.webhook.clone(), config.timeout);
        Self {
            config,
            sink: Box::new(sink),
            webhook,
        }
    }

    /// Logs a debug message. Debug events usually stay local; pass
    /// `send_webhook = false` unless the endpoint wants them.
    pub fn debug(&self, message: &str, context: Context, send_webhook: bool) {
        self.log_event(Level::Debug, message, context, send_webhook);
    }

    /// Logs an info message.
    pub fn info(&self, message: &str, context: Context, send_webhook: bool) {
        self.log_event(Level::Info, message, context, send_webhook);
    }

    /// Logs a warning message.
    pub fn warning(&self, message: &str, context: Context, send_webhook: bool) {
        self.log_event(Level::Warning, message, context, send_webhook);
    }

    /// Logs an error message.
    pub fn error(&self, message: &str, context: Context, send_webhook: bool) {
        self.log_event(Level::Error, message, context, send_webhook);
    }

    /// Logs `message` at error level when `condition` holds.
    pub fn error_if(&self, condition: bool, message: &str, context: Context, send_webhook: bool) {
        if condition {
            self.error(message, context, send_webhook);
        }
    }

    /// Logs an application event.
    ///
    /// The message reads `Event: {name}` and the name lands in the context
    /// under `event`; caller data wins on collision.
    pub fn event(&self, name: &str, data: Context, send_webhook: bool) {
        let mut context = Context::new();
        context.insert("event".to_owned(), Value::String(name.to_owned()));
        context.extend(data);
        self.log_event(Level::Event, &format!("Event: {name}"), context, send_webhook);
    }

    /// Classifies `error` through the configured exception mapping and logs
    /// it at the resolved level.
    ///
    /// A [`Skip`][Verdict::Skip] verdict produces no local event and no
    /// webhook call. Otherwise the context is enriched with the error's type
    /// name, the call site (`file`, `line`) and the rendered source chain
    /// (`trace`), with caller-supplied entries winning on collision. An
    /// error whose message is empty is logged under its type name instead.
    #[track_caller]
    pub fn exception<E>(&self, error: &E, context: Context, send_webhook: bool)
    where
        E: StdError + 'static,
    {
        let level = match self.config.exception_levels.classify(error) {
            Verdict::Skip => return,
            Verdict::Level(level) => level,
        };

        let mut message = error.to_string();
        if message.is_empty() {
            message = std::any::type_name::<E>().to_owned();
        }

        let caller = Location::caller();
        let mut enriched = Context::new();
        enriched.insert(
            "exception".to_owned(),
            Value::String(std::any::type_name::<E>().to_owned()),
        );
        enriched.insert("file".to_owned(), Value::String(caller.file().to_owned()));
        enriched.insert("line".to_owned(), Value::from(caller.line()));
        enriched.insert("trace".to_owned(), Value::String(render_chain(error)));
        enriched.extend(context);

        self.log_event(level, &format!("Exception: {message}"), enriched, send_webhook);
    }

    /// Logs one event.
    ///
    /// This is the single gate: a globally disabled configuration makes the
    /// whole call a no-op, whatever `send_webhook` says.
    pub fn log_event(&self, level: Level, message: &str, context: Context, send_webhook: bool) {
        if !self.config.enabled {
            return;
        }

        if self.config.local_logging {
            if let Err(err) = self.sink.emit(level, message, &context) {
                report_sink_error(message, &err);
            }
        }

        if send_webhook && self.config.webhook.enabled {
            let payload = EventPayload::new(
                level,
                message,
                &context,
                &self.config.app,
                &self.config.server,
            );
            self.deliver(&payload);
        }
    }

    /// Sends caller data straight to the webhook, bypassing the local sink
    /// and level classification.
    ///
    /// The payload is `{timestamp, type: "custom", app}` merged with `data`;
    /// caller fields win on collision. Subject to the same global and
    /// webhook gating as every other call.
    pub fn send_webhook(&self, data: Context) {
        if !self.config.enabled || !self.config.webhook.enabled {
            return;
        }
        if self.config.webhook.url.is_none() {
            return;
        }

        let payload = custom_payload(&self.config.app, data);
        self.deliver(&payload);
    }

    /// Attempts one delivery and swallows the failure, surfacing it as a
    /// local warning when configured to.
    fn deliver<T: Serialize>(&self, payload: &T) {
        let Err(err) = self.webhook.send(payload) else {
            return;
        };
        if !self.config.webhook.log_failures {
            return;
        }

        let mut context = Context::new();
        context.insert("error".to_owned(), Value::String(err.to_string()));
        context.insert(
            "url".to_owned(),
            Value::String(
                self.config
                    .webhook
                    .url
                    .clone()
                    .unwrap_or_else(|| "not_set".to_owned()),
            ),
        );
        if let Some(status) = err.status() {
            context.insert("status_code".to_owned(), Value::from(status));
        }

        let message = if err.status() == Some(401) {
            "wiretap webhook authentication failed; check the WIRETAP_WEBHOOK_SECRET configuration"
        } else {
            "wiretap webhook delivery failed"
        };
        if let Err(err) = self.sink.emit(Level::Warning, message, &context) {
            report_sink_error(message, &err);
        }
    }
}

fn render_chain(error: &(dyn StdError + 'static)) -> String {
    let mut rendered = error.to_string();
    let mut source = error.source();
    while let Some(cause) = source {
        rendered.push_str(&format!("\ncaused by: {cause}"));
        source = cause.source();
    }
    rendered
}

fn report_sink_error(message: &str, error: &anyhow::Error) {
    let _ = writeln!(
        std::io::stderr(),
        "error performing local logging.\n    attempted to log: {message}\n    error: {error}",
    );
}
