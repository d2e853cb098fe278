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

use serde_json::Value;
use wiretap::Config;
use wiretap::Context;
use wiretap::Level;
use wiretap::Sink;
use wiretap::Wiretap;

#[derive(Debug)]
struct StdoutSink;

impl Sink for StdoutSink {
    fn emit(&self, level: Level, message: &str, context: &Context) -> anyhow::Result<()> {
        println!("{level:>7} {message} {}", Value::Object(context.clone()));
        Ok(())
    }
}

fn main() {
    let wiretap = Wiretap::with_sink(Config::default(), StdoutSink);

    wiretap.info("service started", Context::new(), false);

    let mut context = Context::new();
    context.insert("disk".to_owned(), "/dev/sda1".into());
    wiretap.error("disk full", context, false);

    let mut data = Context::new();
    data.insert("plan".to_owned(), "pro".into());
    wiretap.event("user_signup", data, false);

    wiretap.error_if(2 + 2 == 5, "arithmetic is broken", Context::new(), false);
}
