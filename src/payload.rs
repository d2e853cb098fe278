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

//! Webhook payload bodies.

use jiff::Timestamp;
use serde::Serialize;
use serde_json::Map;
use serde_json::Value;
use serde_json::json;

use crate::Context;
use crate::Level;
use crate::config::AppInfo;
use crate::config::ServerInfo;

/// The body POSTed for a standard log event.
///
/// Wire shape:
///
/// ```json
/// {"timestamp":"2024-08-11T14:44:57.172051Z","level":"error","message":"disk full",
///  "context":{"disk":"/dev/sda1"},"app":{"name":"orders","env":"production","url":""},
///  "server":{"hostname":"web-1","ip":"unknown"}}
/// ```
#[derive(Debug, Serialize)]
pub(crate) struct EventPayload<'a> {
    #[serde(serialize_with = "serialize_timestamp")]
    timestamp: Timestamp,
    level: &'a str,
    message: &'a str,
    context: &'a Context,
    app: &'a AppInfo,
    server: &'a ServerInfo,
}

impl<'a> EventPayload<'a> {
    pub(crate) fn new(
        level: Level,
        message: &'a str,
        context: &'a Context,
        app: &'a AppInfo,
        server: &'a ServerInfo,
    ) -> Self {
        Self {
            timestamp: Timestamp::now(),
            level: level.as_str(),
            message,
            context,
            app,
            server,
        }
    }
}

/// The body for direct sends: fixed fields plus the caller's data, with the
/// caller winning on key collision. The app block carries no URL on this
/// path.
pub(crate) fn custom_payload(app: &AppInfo, data: Context) -> Value {
    let mut payload = Map::new();
    payload.insert(
        "timestamp".to_owned(),
        Value::String(Timestamp::now().to_string()),
    );
    payload.insert("type".to_owned(), Value::String("custom".to_owned()));
    payload.insert(
        "app".to_owned(),
        json!({"name": &app.name, "env": &app.env}),
    );
    payload.extend(data);
    Value::Object(payload)
}

fn serialize_timestamp<S>(timestamp: &Timestamp, serializer: S) -> Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    serializer.collect_str(timestamp)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn event_payload_serializes_wire_shape() {
        let mut context = Context::new();
        context.insert("disk".to_owned(), "/dev/sda1".into());
        let app = AppInfo::default();
        let server = ServerInfo {
            hostname: "web-1".to_owned(),
            ip: "10.0.0.2".to_owned(),
        };

        let payload = EventPayload::new(Level::Error, "disk full", &context, &app, &server);
        let value = serde_json::to_value(&payload).unwrap();

        assert_eq!(value["level"], "error");
        assert_eq!(value["message"], "disk full");
        assert_eq!(value["context"]["disk"], "/dev/sda1");
        assert_eq!(value["app"]["env"], "production");
        assert_eq!(value["server"]["hostname"], "web-1");
        let timestamp = value["timestamp"].as_str().unwrap();
        assert!(timestamp.contains('T'));
    }

    #[test]
    fn custom_payload_lets_caller_fields_win() {
        let mut data = Context::new();
        data.insert("type".to_owned(), "deploy".into());
        data.insert("sha".to_owned(), "abc123".into());

        let value = custom_payload(&AppInfo::default(), data);

        assert_eq!(value["type"], "deploy");
        assert_eq!(value["sha"], "abc123");
        assert!(value["app"].get("url").is_none());
        assert!(value["timestamp"].as_str().is_some());
    }
}
