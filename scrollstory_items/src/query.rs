// Copyright 2025 the ScrollStory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Property queries over items.
//!
//! ## Overview
//!
//! A [`Where`] is an ordered list of `(property, Matcher)` pairs; an item
//! matches when every pair matches. A [`Matcher`] is either a plain value
//! compared for equality, or a predicate over the property value.
//!
//! Predicates return a [`Value`]. A boolean result is the verdict; any other
//! result is compared for equality with the property, so a predicate can
//! either test the value or compute the value it should equal.
//!
//! ```
//! use scrollstory_items::{Matcher, Where};
//! use serde_json::Value;
//!
//! let query = Where::new()
//!     .eq("category", "cats")
//!     .test("index", |v| v.as_u64().is_some_and(|i| i > 2))
//!     .with("width", Matcher::computed(|_| Value::from(516.0)));
//! assert_eq!(query.len(), 3);
//! ```

use serde_json::Value;

use crate::types::Item;

/// How a single property is matched.
pub enum Matcher {
    /// Property must equal this value. Missing properties read as `Null`.
    Equals(Value),
    /// Property is handed to the function. `Bool` results decide the match;
    /// other results must equal the property.
    Predicate(Box<dyn Fn(&Value) -> Value>),
}

impl core::fmt::Debug for Matcher {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Equals(v) => f.debug_tuple("Equals").field(v).finish(),
            Self::Predicate(_) => f.write_str("Predicate(..)"),
        }
    }
}

impl Matcher {
    /// Match with a boolean test.
    pub fn test(f: impl Fn(&Value) -> bool + 'static) -> Self {
        Self::Predicate(Box::new(move |v| Value::Bool(f(v))))
    }

    /// Match when the property equals whatever `f` computes from it.
    pub fn computed(f: impl Fn(&Value) -> Value + 'static) -> Self {
        Self::Predicate(Box::new(f))
    }

    /// Whether `actual` satisfies this matcher.
    pub fn matches(&self, actual: &Value) -> bool {
        match self {
            Self::Equals(expected) => same_value(expected, actual),
            Self::Predicate(f) => match f(actual) {
                Value::Bool(verdict) => verdict,
                computed => same_value(&computed, actual),
            },
        }
    }
}

// Numbers compare by value so `2` matches `2.0`.
fn same_value(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => x.as_f64() == y.as_f64(),
        _ => a == b,
    }
}

impl From<Value> for Matcher {
    fn from(value: Value) -> Self {
        Self::Equals(value)
    }
}

/// Conjunction of property matchers, evaluated in insertion order.
#[derive(Debug, Default)]
pub struct Where {
    entries: Vec<(String, Matcher)>,
}

impl Where {
    /// Empty query; matches every item.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an arbitrary matcher for `property`.
    pub fn with(mut self, property: impl Into<String>, matcher: Matcher) -> Self {
        self.entries.push((property.into(), matcher));
        self
    }

    /// Require `property` to equal `value`.
    pub fn eq(self, property: impl Into<String>, value: impl Into<Value>) -> Self {
        self.with(property, Matcher::Equals(value.into()))
    }

    /// Require `test` to hold for `property`.
    pub fn test(
        self,
        property: impl Into<String>,
        test: impl Fn(&Value) -> bool + 'static,
    ) -> Self {
        self.with(property, Matcher::test(test))
    }

    /// Number of property matchers.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when there are no matchers.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Whether `item` satisfies every matcher.
    pub fn matches(&self, item: &Item) -> bool {
        self.entries
            .iter()
            .all(|(name, matcher)| matcher.matches(&item.property(name)))
    }
}

/// How multi-tag lookups combine.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub enum TagMatch {
    /// Item carries at least one of the tags.
    #[default]
    Any,
    /// Item carries every tag.
    All,
}
