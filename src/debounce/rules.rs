//! Debounce Rules
//!
//! Ordered `matcher -> delay` rules. A matcher string of the form
//! `/regex/flags` is a pattern; anything else matches one key literally.
//! The first matching rule wins.

use std::time::Duration;

use regex::{Regex, RegexBuilder};

use crate::error::{Result, StoreError};

// == Key Matcher ==
#[derive(Debug, Clone)]
pub enum KeyMatcher {
    Literal(String),
    Pattern(Regex),
}

impl KeyMatcher {
    // == Parse ==
    /// Reads `/regex/flags` as a pattern, every other string as a literal.
    ///
    /// Flags: `i` case-insensitive, `m` multi-line, `s` dot matches newline,
    /// `x` ignore whitespace, `u` unicode, `y` sticky (the match must start
    /// at the first character of the key). `g` has no effect on a single match.
    pub fn parse(matcher: &str) -> Result<Self> {
        let Some((body, flags)) = split_pattern(matcher) else {
            return Ok(KeyMatcher::Literal(matcher.to_string()));
        };

        let mut sticky = false;
        let mut verbose = false;
        for flag in flags.chars() {
            match flag {
                'y' => sticky = true,
                'x' => verbose = true,
                'i' | 'm' | 's' | 'u' | 'g' => {}
                other => {
                    return Err(StoreError::InvalidPattern(format!(
                        "{}: unknown flag '{}'",
                        matcher, other
                    )))
                }
            }
        }

        // A trailing `#` comment in verbose mode must not swallow the group end
        let source = match (sticky, verbose) {
            (true, true) => format!("\\A(?:{}\n)", body),
            (true, false) => format!("\\A(?:{})", body),
            (false, _) => body.to_string(),
        };

        RegexBuilder::new(&source)
            .case_insensitive(flags.contains('i'))
            .multi_line(flags.contains('m'))
            .dot_matches_new_line(flags.contains('s'))
            .ignore_whitespace(verbose)
            .unicode(true)
            .build()
            .map(KeyMatcher::Pattern)
            .map_err(|err| StoreError::InvalidPattern(format!("{}: {}", matcher, err)))
    }

    pub fn matches(&self, key: &str) -> bool {
        match self {
            KeyMatcher::Literal(literal) => literal == key,
            KeyMatcher::Pattern(regex) => regex.is_match(key),
        }
    }
}

/// `/body/flags` with a non-empty body; the body runs to the last slash.
fn split_pattern(matcher: &str) -> Option<(&str, &str)> {
    let rest = matcher.strip_prefix('/')?;
    let end = rest.rfind('/')?;
    let (body, flags) = (&rest[..end], &rest[end + 1..]);
    if body.is_empty() {
        None
    } else {
        Some((body, flags))
    }
}

// == Debounce Rule ==
#[derive(Debug, Clone)]
pub struct DebounceRule {
    pub matcher: KeyMatcher,
    pub delay: Duration,
}

impl DebounceRule {
    pub fn new(matcher: KeyMatcher, delay: Duration) -> Self {
        Self { matcher, delay }
    }
}

// == Debounce Rules ==
/// Rules in declaration order.
#[derive(Debug, Clone, Default)]
pub struct DebounceRules {
    rules: Vec<DebounceRule>,
}

impl DebounceRules {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a rule parsed from a matcher string.
    pub fn with_rule(mut self, matcher: &str, delay: Duration) -> Result<Self> {
        self.push(DebounceRule::new(KeyMatcher::parse(matcher)?, delay));
        Ok(self)
    }

    pub fn push(&mut self, rule: DebounceRule) {
        self.rules.push(rule);
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    // == Delay For ==
    /// Delay of the first rule matching `key`; `None` means pass-through.
    pub fn delay_for(&self, key: &str) -> Option<Duration> {
        self.rules
            .iter()
            .find(|rule| rule.matcher.matches(key))
            .map(|rule| rule.delay)
    }

    // == From JSON ==
    /// Parses an ordered JSON object of matcher to delay in milliseconds,
    /// e.g. `{"k2": 100, "/^session:/i": 250}`.
    pub fn from_json(text: &str) -> Result<Self> {
        let object: serde_json::Map<String, serde_json::Value> = serde_json::from_str(text)
            .map_err(|err| StoreError::Config(format!("debounce rules: {}", err)))?;

        let mut rules = Self::new();
        for (matcher, delay) in object {
            let millis = delay.as_u64().ok_or_else(|| {
                StoreError::Config(format!(
                    "debounce delay for {} must be a non-negative integer, got {}",
                    matcher, delay
                ))
            })?;
            rules = rules.with_rule(&matcher, Duration::from_millis(millis))?;
        }
        Ok(rules)
    }
}
