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

use serde_json::Value;
use wiretap::Config;
use wiretap::Context;
use wiretap::ExceptionLevels;
use wiretap::Level;
use wiretap::Rule;
use wiretap::Sink;
use wiretap::Wiretap;

#[derive(Debug)]
struct AuthenticationError;

impl fmt::Display for AuthenticationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("user is not authenticated")
    }
}

impl Error for AuthenticationError {}

#[derive(Debug)]
struct HttpError {
    status: u16,
}

impl fmt::Display for HttpError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "upstream answered {}", self.status)
    }
}

impl Error for HttpError {}

#[derive(Debug)]
struct StdoutSink;

impl Sink for StdoutSink {
    fn emit(&self, level: Level, message: &str, context: &Context) -> anyhow::Result<()> {
        println!("{level:>7} {message} {}", Value::Object(context.clone()));
        Ok(())
    }
}

fn main() {
    let levels = ExceptionLevels::new()
        .exact::<AuthenticationError>(Level::Warning)
        .category(
            "http",
            |err| err.is::<HttpError>(),
            Rule::dynamic(|err| {
                err.downcast_ref::<HttpError>().map(|http| {
                    if http.status >= 500 {
                        Level::Error
                    } else {
                        Level::Info
                    }
                })
            }),
        )
        .default_rule(Level::Error);

    let config = Config::default().exception_levels(levels);
    let wiretap = Wiretap::with_sink(config, StdoutSink);

    wiretap.exception(&AuthenticationError, Context::new(), false);
    wiretap.exception(&HttpError { status: 502 }, Context::new(), false);
    wiretap.exception(&HttpError { status: 404 }, Context::new(), false);
}
