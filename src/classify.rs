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

//! Maps caught errors to severity levels.

use std::borrow::Cow;
use std::error::Error as StdError;
use std::fmt;

use crate::Level;

/// The outcome of classifying an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    /// Log the error at this level.
    Level(Level),
    /// Produce no log event and no webhook call for this error.
    Skip,
}

type DynamicFn = Box<dyn Fn(&(dyn StdError + 'static)) -> Option<Level> + Send + Sync>;

/// A severity rule attached to an error class.
pub enum Rule {
    /// Always log at this level.
    Fixed(Level),
    /// Drop the error entirely.
    Skip,
    /// Compute the level from the error value; `None` falls back to
    /// [`Level::Error`].
    Dynamic(DynamicFn),
}

impl Rule {
    /// Creates a rule that computes the level from the error value.
    ///
    /// # Examples
    ///
    /// ```
    /// use wiretap::Level;
    /// use wiretap::Rule;
    ///
    /// let rule = Rule::dynamic(|err| {
    ///     err.downcast_ref::<std::io::Error>()
    ///         .map(|_| Level::Warning)
    /// });
    /// ```
    pub fn dynamic(
        f: impl Fn(&(dyn StdError + 'static)) -> Option<Level> + Send + Sync + 'static,
    ) -> Rule {
        Rule::Dynamic(Box::new(f))
    }

    fn resolve(&self, err: &(dyn StdError + 'static)) -> Verdict {
        match self {
            Rule::Fixed(level) => Verdict::Level(*level),
            Rule::Skip => Verdict::Skip,
            Rule::Dynamic(f) => Verdict::Level(f(err).unwrap_or(Level::Error)),
        }
    }
}

impl fmt::Debug for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rule::Fixed(level) => f.debug_tuple("Fixed").field(level).finish(),
            Rule::Skip => f.write_str("Skip"),
            Rule::Dynamic(_) => f.write_str("Dynamic { .. }"),
        }
    }
}

impl From<Level> for Rule {
    fn from(level: Level) -> Self {
        Rule::Fixed(level)
    }
}

#[derive(Debug, PartialEq, Eq)]
enum MatcherKind {
    Exact,
    Category,
}

struct Entry {
    name: Cow<'static, str>,
    kind: MatcherKind,
    matches: Box<dyn Fn(&(dyn StdError + 'static)) -> bool + Send + Sync>,
    rule: Rule,
}

/// An ordered mapping from error classes to severity rules.
///
/// Classification runs in two passes: first the error's concrete runtime
/// type is looked up among the [`exact`][ExceptionLevels::exact] entries,
/// then the [`category`][ExceptionLevels::category] predicates are consulted
/// in declaration order and the first match wins. Errors that match nothing
/// resolve to the [`default_rule`][ExceptionLevels::default_rule], or
/// [`Level::Error`] if none is configured.
///
/// An exact entry always beats a category entry, regardless of where either
/// is declared. Between categories, declaration order is the contract: the
/// first declared match wins even if a narrower category appears later.
///
/// # Examples
///
/// ```
/// use std::io;
///
/// use wiretap::ExceptionLevels;
/// use wiretap::Level;
/// use wiretap::Rule;
///
/// let levels = ExceptionLevels::new()
///     .exact::<io::Error>(Level::Warning)
///     .category("timeouts", |err| err.to_string().contains("timed out"), Rule::Skip)
///     .default_rule(Level::Error);
/// ```
#[derive(Default)]
pub struct ExceptionLevels {
    entries: Vec<Entry>,
    default: Option<Rule>,
}

impl fmt::Debug for ExceptionLevels {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let entries = self
            .entries
            .iter()
            .map(|entry| (&entry.name, &entry.kind, &entry.rule))
            .collect::<Vec<_>>();
        f.debug_struct("ExceptionLevels")
            .field("entries", &entries)
            .field("default", &self.default)
            .finish()
    }
}

impl ExceptionLevels {
    /// Creates an empty mapping. Every error resolves to [`Level::Error`]
    /// until rules are added.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a rule for the exact error type `E`.
    ///
    /// Matched by downcast against the error's concrete runtime type, so a
    /// wrapper type does not match the type it wraps.
    #[must_use = "the mapping must be attached to a Config to take effect"]
    pub fn exact<E>(mut self, rule: impl Into<Rule>) -> Self
    where
        E: StdError + 'static,
    {
        self.entries.push(Entry {
            name: Cow::Borrowed(std::any::type_name::<E>()),
            kind: MatcherKind::Exact,
            matches: Box::new(|err: &(dyn StdError + 'static)| err.is::<E>()),
            rule: rule.into(),
        });
        self
    }

    /// Registers a named category of errors recognized by `matches`.
    ///
    /// Categories stand in for ancestor types: the predicate decides whether
    /// an error belongs to the category. They are consulted after exact
    /// entries, in declaration order, and the first match wins.
    #[must_use = "the mapping must be attached to a Config to take effect"]
    pub fn category(
        mut self,
        name: impl Into<Cow<'static, str>>,
        matches: impl Fn(&(dyn StdError + 'static)) -> bool + Send + Sync + 'static,
        rule: impl Into<Rule>,
    ) -> Self {
        self.entries.push(Entry {
            name: name.into(),
            kind: MatcherKind::Category,
            matches: Box::new(matches),
            rule: rule.into(),
        });
        self
    }

    /// Sets the rule applied when no entry matches.
    #[must_use = "the mapping must be attached to a Config to take effect"]
    pub fn default_rule(mut self, rule: impl Into<Rule>) -> Self {
        self.default = Some(rule.into());
        self
    }

    /// Determines the severity for `err`.
    pub fn classify(&self, err: &(dyn StdError + 'static)) -> Verdict {
        for entry in &self.entries {
            if entry.kind == MatcherKind::Exact && (entry.matches)(err) {
                return entry.rule.resolve(err);
            }
        }

        for entry in &self.entries {
            if entry.kind == MatcherKind::Category && (entry.matches)(err) {
                return entry.rule.resolve(err);
            }
        }

        match &self.default {
            Some(rule) => rule.resolve(err),
            None => Verdict::Level(Level::Error),
        }
    }
}
