//! # String Formats
//!
//! Built-in `format` checks for `type: string` and the registry that lets an
//! application add or replace them during setup.
//!
//! A [`FormatRegistry`] is an ordinary value handed to the compiler. Once the
//! compiler has looked a format up, the resulting [`FormatCheck`] is stored in
//! the validator node, so the registry is never consulted while serving.

use std::collections::HashMap;
use std::fmt;
use std::net::{Ipv4Addr, Ipv6Addr};
use std::sync::{Arc, OnceLock};

use base64::Engine as _;
use regex::Regex;

/// Names of the formats every registry starts with.
pub const BUILTIN_FORMATS: &[&str] = &[
    "date",
    "date-time",
    "email",
    "uuid",
    "byte",
    "ipv4",
    "ipv6",
    "hostname",
];

type CheckFn = dyn Fn(&str) -> Result<(), String> + Send + Sync;

/// A named string check. `Err` carries the leaf error message.
#[derive(Clone)]
pub struct FormatCheck {
    name: String,
    check: Arc<CheckFn>,
}

impl FormatCheck {
    /// Wrap a check function.
    pub fn new<F>(name: impl Into<String>, check: F) -> Self
    where
        F: Fn(&str) -> Result<(), String> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            check: Arc::new(check),
        }
    }

    /// Format name this check was registered under.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Run the check.
    ///
    /// # Errors
    ///
    /// Returns the message produced by the check function.
    pub fn run(&self, value: &str) -> Result<(), String> {
        (self.check)(value)
    }
}

impl fmt::Debug for FormatCheck {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FormatCheck")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

/// Format name → check function.
#[derive(Clone)]
pub struct FormatRegistry {
    checks: HashMap<String, FormatCheck>,
}

impl Default for FormatRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl FormatRegistry {
    /// Registry holding every built-in format.
    pub fn new() -> Self {
        let mut registry = Self::empty();
        registry.register("date", check_date);
        registry.register("date-time", check_date_time);
        registry.register("email", check_email);
        registry.register("uuid", check_uuid);
        registry.register("byte", check_byte);
        registry.register("ipv4", check_ipv4);
        registry.register("ipv6", check_ipv6);
        registry.register("hostname", check_hostname);
        registry
    }

    /// Registry with no formats at all; every format passes unchecked.
    pub fn empty() -> Self {
        Self {
            checks: HashMap::new(),
        }
    }

    /// Add a format, replacing any existing check of the same name
    /// (built-ins included).
    pub fn register<F>(&mut self, name: impl Into<String>, check: F) -> &mut Self
    where
        F: Fn(&str) -> Result<(), String> + Send + Sync + 'static,
    {
        let name = name.into();
        tracing::debug!(format = %name, "registering string format");
        self.checks
            .insert(name.clone(), FormatCheck::new(name, check));
        self
    }

    /// Look up the check for a format name.
    pub fn get(&self, name: &str) -> Option<&FormatCheck> {
        self.checks.get(name)
    }

    /// True when a check is registered for `name`.
    pub fn contains(&self, name: &str) -> bool {
        self.checks.contains_key(name)
    }

    /// Registered format names, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.checks.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

impl fmt::Debug for FormatRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FormatRegistry")
            .field("formats", &self.names())
            .finish()
    }
}

// ── Built-in checks ─────────────────────────────────────────────────

/// `YYYY-MM-DD`, digits only.
fn is_full_date(value: &str) -> bool {
    value.len() == 10
        && value.bytes().enumerate().all(|(i, b)| match i {
            4 | 7 => b == b'-',
            _ => b.is_ascii_digit(),
        })
}

fn check_date(value: &str) -> Result<(), String> {
    let invalid = || "value should be date format".to_string();
    if !is_full_date(value) {
        return Err(invalid());
    }
    chrono::NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map(drop)
        .map_err(|_| invalid())
}

/// RFC 3339 proper: chrono also takes a space between date and time.
fn check_date_time(value: &str) -> Result<(), String> {
    let invalid = || "value should be datetime format".to_string();
    let strict = value.get(..10).is_some_and(is_full_date)
        && matches!(value.as_bytes().get(10), Some(b'T' | b't'));
    if !strict {
        return Err(invalid());
    }
    chrono::DateTime::parse_from_rfc3339(value)
        .map(drop)
        .map_err(|_| invalid())
}

/// Anchored at the start only: trailing text after the domain is allowed.
fn check_email(value: &str) -> Result<(), String> {
    static EMAIL: OnceLock<Option<Regex>> = OnceLock::new();
    let matched = EMAIL
        .get_or_init(|| Regex::new(r"^[^@]+@[^@]+\.[^@]+").ok())
        .as_ref()
        .is_some_and(|re| re.is_match(value));
    if matched {
        Ok(())
    } else {
        Err("value should be valid email".to_string())
    }
}

fn check_uuid(value: &str) -> Result<(), String> {
    uuid::Uuid::parse_str(value)
        .map(drop)
        .map_err(|_| "value should be uuid".to_string())
}

fn check_byte(value: &str) -> Result<(), String> {
    base64::engine::general_purpose::STANDARD
        .decode(value)
        .map(drop)
        .map_err(|_| "value should be base64-encoded string".to_string())
}

fn check_ipv4(value: &str) -> Result<(), String> {
    value
        .parse::<Ipv4Addr>()
        .map(drop)
        .map_err(|_| "value should be valid ipv4 address".to_string())
}

fn check_ipv6(value: &str) -> Result<(), String> {
    value
        .parse::<Ipv6Addr>()
        .map(drop)
        .map_err(|_| "value should be valid ipv6 address".to_string())
}

fn check_hostname(value: &str) -> Result<(), String> {
    let invalid = || "value should be valid hostname".to_string();
    let host = value.strip_suffix('.').unwrap_or(value);
    if host.is_empty() || host.len() > 255 {
        return Err(invalid());
    }
    let label_ok = |label: &str| {
        (1..=63).contains(&label.len())
            && !label.starts_with('-')
            && !label.ends_with('-')
            && label.chars().all(|c| c.is_ascii_alphanumeric() || c == '-')
    };
    if host.split('.').all(label_ok) {
        Ok(())
    } else {
        Err(invalid())
    }
}
