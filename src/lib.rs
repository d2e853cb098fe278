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

//! Wiretap forwards application log events to a local logging sink and, when
//! configured, relays the same data to an HTTP webhook endpoint.
//!
//! # Overview
//!
//! A [`Wiretap`] dispatcher owns an immutable [`Config`], a local [`Sink`]
//! (the [`log`] facade by default), and one reusable HTTP client. Every call
//! emits locally and performs at most one blocking POST; webhook delivery is
//! best effort with a single attempt, and a failed delivery can never
//! disturb the calling application.
//!
//! Caught errors are mapped to severity levels through an
//! [`ExceptionLevels`] rule table: exact error types first, then named
//! categories in declaration order, then a default. A rule can also compute
//! the level from the error value, or drop the error entirely.
//!
//! # Examples
//!
//! Simple setup that logs through the `log` facade with the webhook turned
//! off:
//!
//! ```
//! use wiretap::Config;
//! use wiretap::Context;
//! use wiretap::Wiretap;
//!
//! let wiretap = Wiretap::new(Config::default());
//!
//! let mut context = Context::new();
//! context.insert("disk".to_owned(), "/dev/sda1".into());
//! wiretap.error("disk full", context, false);
//! ```
//!
//! Classifying caught errors:
//!
//! ```
//! use std::io;
//!
//! use wiretap::ExceptionLevels;
//! use wiretap::Level;
//! use wiretap::Verdict;
//!
//! let levels = ExceptionLevels::new()
//!     .exact::<io::Error>(Level::Warning)
//!     .default_rule(Level::Error);
//!
//! let err = io::Error::other("connection reset");
//! assert_eq!(levels.classify(&err), Verdict::Level(Level::Warning));
//! ```

pub mod classify;
pub mod config;
pub mod sink;

mod dispatch;
mod level;
mod payload;
mod webhook;

pub use classify::ExceptionLevels;
pub use classify::Rule;
pub use classify::Verdict;
pub use config::AppInfo;
pub use config::Config;
pub use config::ServerInfo;
pub use config::WebhookConfig;
pub use dispatch::Wiretap;
pub use level::Level;
pub use sink::Sink;
pub use webhook::DeliveryError;

/// Structured context attached to a log event and carried into the webhook
/// payload.
pub type Context = serde_json::Map<String, serde_json::Value>;
