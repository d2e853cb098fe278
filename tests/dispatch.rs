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

use std::error::Error;
use std::fmt;

use wiretap::Config;
use wiretap::Context;
use wiretap::ExceptionLevels;
use wiretap::Level;
use wiretap::Rule;
use wiretap::Wiretap;
use wiretap::sink::Testing;

#[derive(Debug)]
struct AuthenticationError;

impl fmt::Display for AuthenticationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("user is not authenticated")
    }
}

impl Error for AuthenticationError {}

#[derive(Debug)]
struct TimeoutError;

impl fmt::Display for TimeoutError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("operation timed out")
    }
}

impl Error for TimeoutError {}

#[derive(Debug)]
struct NamelessError;

impl fmt::Display for NamelessError {
    fn fmt(&self, _: &mut fmt::Formatter<'_>) -> fmt::Result {
        Ok(())
    }
}

impl Error for NamelessError {}

#[derive(Debug)]
struct WrappedError {
    source: TimeoutError,
}

impl fmt::Display for WrappedError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("job failed")
    }
}

impl Error for WrappedError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        Some(&self.source)
    }
}

fn context(entries: &[(&str, &str)]) -> Context {
    let mut context = Context::new();
    for (key, value) in entries {
        context.insert((*key).to_owned(), (*value).into());
    }
    context
}

#[test]
fn error_emits_single_local_event() {
    let sink = Testing::new();
    let wiretap = Wiretap::with_sink(Config::default(), sink.clone());

    wiretap.error("disk full", context(&[("disk", "/dev/sda1")]), true);

    let events = sink.events();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].level, Level::Error);
    assert_eq!(events[0].message, "disk full");
    assert_eq!(events[0].context["disk"], "/dev/sda1");
}

#[test]
fn globally_disabled_config_is_a_no_op() {
    let sink = Testing::new();
    let config = Config {
        enabled: false,
        ..Config::default()
    };
    let wiretap = Wiretap::with_sink(config, sink.clone());

    wiretap.info("ignored", Context::new(), true);
    wiretap.error("ignored", Context::new(), true);
    wiretap.event("ignored", Context::new(), true);
    wiretap.send_webhook(context(&[("kind", "deploy")]));

    assert!(sink.events().is_empty());
}

#[test]
fn local_logging_can_be_disabled_alone() {
    let sink = Testing::new();
    let config = Config {
        local_logging: false,
        ..Config::default()
    };
    let wiretap = Wiretap::with_sink(config, sink.clone());

    wiretap.error("quiet", Context::new(), false);

    assert!(sink.events().is_empty());
}

#[test]
fn error_if_logs_only_when_condition_holds() {
    let sink = Testing::new();
    let wiretap = Wiretap::with_sink(Config::default(), sink.clone());

    wiretap.error_if(true, "condition held", Context::new(), false);
    wiretap.error_if(false, "never logged", Context::new(), false);

    let events = sink.events();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].message, "condition held");
}

#[test]
fn event_merges_name_into_context() {
    let sink = Testing::new();
    let wiretap = Wiretap::with_sink(Config::default(), sink.clone());

    wiretap.event("user_signup", context(&[("plan", "pro")]), false);

    let events = sink.events();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].level, Level::Event);
    assert_eq!(events[0].message, "Event: user_signup");
    assert_eq!(events[0].context["event"], "user_signup");
    assert_eq!(events[0].context["plan"], "pro");
}

#[test]
fn event_data_wins_over_generated_context() {
    let sink = Testing::new();
    let wiretap = Wiretap::with_sink(Config::default(), sink.clone());

    wiretap.event("user_signup", context(&[("event", "overridden")]), false);

    assert_eq!(sink.events()[0].context["event"], "overridden");
}

#[test]
fn exception_maps_level_and_enriches_context() {
    let sink = Testing::new();
    let config = Config::default()
        .exception_levels(ExceptionLevels::new().exact::<AuthenticationError>(Level::Warning));
    let wiretap = Wiretap::with_sink(config, sink.clone());

    wiretap.exception(&AuthenticationError, context(&[("route", "/login")]), false);

    let events = sink.events();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].level, Level::Warning);
    assert_eq!(events[0].message, "Exception: user is not authenticated");

    let captured = &events[0].context;
    assert!(
        captured["exception"]
            .as_str()
            .unwrap()
            .contains("AuthenticationError")
    );
    assert!(captured["file"].as_str().unwrap().ends_with("dispatch.rs"));
    assert!(captured["line"].as_u64().unwrap() > 0);
    assert_eq!(captured["trace"], "user is not authenticated");
    assert_eq!(captured["route"], "/login");
}

#[test]
fn exception_trace_renders_source_chain() {
    let sink = Testing::new();
    let wiretap = Wiretap::with_sink(Config::default(), sink.clone());

    let err = WrappedError {
        source: TimeoutError,
    };
    wiretap.exception(&err, Context::new(), false);

    let events = sink.events();
    assert_eq!(events[0].level, Level::Error);
    assert_eq!(
        events[0].context["trace"],
        "job failed\ncaused by: operation timed out"
    );
}

#[test]
fn exception_with_empty_message_logs_type_name() {
    let sink = Testing::new();
    let wiretap = Wiretap::with_sink(Config::default(), sink.clone());

    wiretap.exception(&NamelessError, Context::new(), false);

    let events = sink.events();
    assert!(events[0].message.starts_with("Exception: "));
    assert!(events[0].message.contains("NamelessError"));
}

#[test]
fn skipped_exception_produces_nothing() {
    let sink = Testing::new();
    let config = Config::default().exception_levels(
        ExceptionLevels::new()
            .exact::<TimeoutError>(Rule::Skip)
            .default_rule(Level::Error),
    );
    let wiretap = Wiretap::with_sink(config, sink.clone());

    wiretap.exception(&TimeoutError, Context::new(), true);

    assert!(sink.events().is_empty());
}

#[test]
fn unmapped_exception_defaults_to_error_level() {
    let sink = Testing::new();
    let wiretap = Wiretap::with_sink(Config::default(), sink.clone());

    wiretap.exception(&TimeoutError, Context::new(), false);

    assert_eq!(sink.events()[0].level, Level::Error);
}
