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

//! Local logging sinks.

use std::fmt;
use std::sync::Arc;
use std::sync::Mutex;

use serde_json::Value;

use crate::Context;
use crate::Level;

/// A local destination for dispatched events.
///
/// The dispatcher never propagates emission failures; a returned error is
/// reported to stderr and dropped.
pub trait Sink: fmt::Debug + Send + Sync + 'static {
    /// Emits one event.
    fn emit(&self, level: Level, message: &str, context: &Context) -> anyhow::Result<()>;
}

/// Forwards events to the global `log` facade.
///
/// Context entries ride along as stringified key-values under the `wiretap`
/// target.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogFacade;

impl Sink for LogFacade {
    fn emit(&self, level: Level, message: &str, context: &Context) -> anyhow::Result<()> {
        let kvs = context
            .iter()
            .map(|(key, value)| (key.as_str(), stringify(value)))
            .collect::<Vec<_>>();
        let kvs = kvs.as_slice();

        log::logger().log(
            &log::Record::builder()
                .args(format_args!("{message}"))
                .level(level.to_log_level())
                .target("wiretap")
                .key_values(&kvs)
                .build(),
        );
        Ok(())
    }
}

fn stringify(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

/// An event captured by the [`Testing`] sink.
#[derive(Debug, Clone)]
pub struct CapturedEvent {
    pub level: Level,
    pub message: String,
    pub context: Context,
}

/// A sink that records events in memory so tests can assert on them.
///
/// Cloning shares the underlying buffer: keep one clone and hand the other
/// to the dispatcher.
///
/// # Examples
///
/// ```
/// use wiretap::Config;
/// use wiretap::Context;
/// use wiretap::Wiretap;
/// use wiretap::sink::Testing;
///
/// let sink = Testing::new();
/// let wiretap = Wiretap::with_sink(Config::default(), sink.clone());
///
/// wiretap.info("listener started", Context::new(), false);
/// assert_eq!(sink.events().len(), 1);
/// ```
#[derive(Debug, Clone, Default)]
pub struct Testing {
    events: Arc<Mutex<Vec<CapturedEvent>>>,
}

impl Testing {
    /// Creates an empty capture sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a snapshot of the events captured so far.
    pub fn events(&self) -> Vec<CapturedEvent> {
        self.events
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }
}

impl Sink for Testing {
    fn emit(&self, level: Level, message: &str, context: &Context) -> anyhow::Result<()> {
        self.events
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(CapturedEvent {
                level,
                message: message.to_owned(),
                context: context.clone(),
            });
        Ok(())
    }
}
