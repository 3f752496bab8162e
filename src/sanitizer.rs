// SPDX-FileCopyrightText: 2026 Hyperpolymath
// SPDX-License-Identifier: Apache-2.0

//! Input sanitizers for untrusted request content.
//!
//! All functions here are total: they never fail and never allocate an
//! error path. Malformed input degrades to the safe empty string. This is
//! a blocklist approach tuned for the common injection vectors (XSS,
//! scheme smuggling); it is a baseline, not a guarantee against every
//! vector. Callers that need a hard guarantee should front this with an
//! allow-list HTML sanitizer.
//!
//! Note the documented ambiguity: [`sanitize_email`] and [`sanitize_url`]
//! return `""` both for absent and for invalid input. Call sites that need
//! to distinguish the two use the validating wrappers in [`crate::guard`].

use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::LazyLock;

/// `javascript:` scheme prefix, anywhere in the string.
static JS_SCHEME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)javascript\s*:").expect("valid scheme regex"));

/// Inline event-handler attribute pattern (`onload=`, `onclick =`, ...).
static EVENT_ATTR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)on\w+\s*=").expect("valid event attribute regex"));

/// `<script ...> ... </script>` blocks, non-greedy, across lines.
static SCRIPT_BLOCK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<script[^>]*>.*?</script>").expect("valid script regex"));

/// Event-handler attributes with quoted or unquoted values.
static HTML_EVENT_ATTR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)\s*on\w+\s*=\s*("[^"]*"|'[^']*'|[^\s>]+)"#)
        .expect("valid event attribute regex")
});

/// Dangerous URI scheme tokens. Removing the token itself also neutralizes
/// the `href=`/`src=`/`action=`/`formaction=`-prefixed forms.
static DANGEROUS_SCHEME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)javascript\s*:|vbscript\s*:|data\s*:\s*text/html").expect("valid scheme regex")
});

/// `local@domain.tld` shape, checked after trimming and lowercasing.
static EMAIL_SHAPE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("valid email regex"));

/// Sanitize a plain-text field.
///
/// Trims, strips angle brackets, then removes `javascript:` prefixes and
/// inline event-handler patterns until a fixed point is reached, so the
/// result is idempotent even when one removal exposes another match.
pub fn sanitize_text(input: &str) -> String {
    let mut out: String = input.trim().chars().filter(|c| *c != '<' && *c != '>').collect();
    loop {
        let pass = EVENT_ATTR
            .replace_all(JS_SCHEME.replace_all(&out, "").as_ref(), "")
            .into_owned();
        if pass == out {
            break;
        }
        out = pass;
    }
    out.trim().to_string()
}

/// Sanitize an HTML fragment.
///
/// Same threat model as [`sanitize_text`] but markup-preserving: removes
/// `<script>` blocks, event-handler attributes in quoted and unquoted
/// form, and `javascript:`/`vbscript:`/`data:text/html` scheme tokens.
pub fn sanitize_html(input: &str) -> String {
    let mut out = input.to_string();
    loop {
        let pass = DANGEROUS_SCHEME
            .replace_all(
                HTML_EVENT_ATTR
                    .replace_all(SCRIPT_BLOCK.replace_all(&out, "").as_ref(), "")
                    .as_ref(),
                "",
            )
            .into_owned();
        if pass == out {
            break;
        }
        out = pass;
    }
    out
}

/// Sanitize an email address: trim, lowercase, shape-check.
///
/// Returns the empty string when the input does not match a simple
/// `local@domain.tld` shape. Quote and bracket characters are stripped
/// from valid matches.
pub fn sanitize_email(input: &str) -> String {
    let lowered = input.trim().to_lowercase();
    if !EMAIL_SHAPE.is_match(&lowered) {
        return String::new();
    }
    lowered
        .chars()
        .filter(|c| !matches!(c, '<' | '>' | '\'' | '"' | '`'))
        .collect()
}

/// Sanitize a URL field.
///
/// Accepts only `http://`, `https://`, root-relative (`/`), and fragment
/// (`#`) forms. Dangerous schemes (`javascript:`, `data:`, `vbscript:`)
/// and anything else collapse to the empty string.
pub fn sanitize_url(input: &str) -> String {
    let trimmed = input.trim();
    let lowered = trimmed.to_lowercase();
    if lowered.starts_with("javascript:")
        || lowered.starts_with("data:")
        || lowered.starts_with("vbscript:")
    {
        return String::new();
    }
    if lowered.starts_with("http://")
        || lowered.starts_with("https://")
        || trimmed.starts_with('/')
        || trimmed.starts_with('#')
    {
        return trimmed.to_string();
    }
    String::new()
}

/// Per-call toggles for [`sanitize_value`]. All default to on.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SanitizeOptions {
    #[serde(default = "default_true")]
    pub sanitize_strings: bool,
    #[serde(default = "default_true")]
    pub sanitize_emails: bool,
    #[serde(default = "default_true")]
    pub sanitize_urls: bool,
}

fn default_true() -> bool {
    true
}

impl Default for SanitizeOptions {
    fn default() -> Self {
        Self {
            sanitize_strings: true,
            sanitize_emails: true,
            sanitize_urls: true,
        }
    }
}

/// Deep-sanitize a JSON structure, returning a new value.
///
/// Objects and arrays are walked recursively with their shape preserved;
/// only string leaves are rewritten. String fields are routed by their
/// (lowercased) key name: keys containing `email` go through
/// [`sanitize_email`], keys containing `url` or `link` through
/// [`sanitize_url`], everything else through [`sanitize_text`]. Scalars
/// other than strings, and non-container top-level values, pass through
/// unchanged.
pub fn sanitize_value(value: &Value, options: &SanitizeOptions) -> Value {
    match value {
        Value::Object(map) => Value::Object(
            map.iter()
                .map(|(key, val)| (key.clone(), sanitize_keyed(key, val, options)))
                .collect(),
        ),
        Value::Array(items) => {
            Value::Array(items.iter().map(|item| sanitize_element(item, options)).collect())
        }
        other => other.clone(),
    }
}

/// Sanitize a value that sits under a named key. Arrays keep the key
/// context, so a list under `"links"` routes its string elements as links.
fn sanitize_keyed(key: &str, value: &Value, options: &SanitizeOptions) -> Value {
    match value {
        Value::String(s) => Value::String(route_by_key(key, s, options)),
        Value::Array(items) => Value::Array(
            items.iter().map(|item| sanitize_keyed(key, item, options)).collect(),
        ),
        other => sanitize_value(other, options),
    }
}

/// Sanitize an array element with no key context.
fn sanitize_element(value: &Value, options: &SanitizeOptions) -> Value {
    match value {
        Value::String(s) if options.sanitize_strings => Value::String(sanitize_text(s)),
        other => sanitize_value(other, options),
    }
}

fn route_by_key(key: &str, value: &str, options: &SanitizeOptions) -> String {
    let key = key.to_lowercase();
    if options.sanitize_emails && key.contains("email") {
        sanitize_email(value)
    } else if options.sanitize_urls && (key.contains("url") || key.contains("link")) {
        sanitize_url(value)
    } else if options.sanitize_strings {
        sanitize_text(value)
    } else {
        value.to_string()
    }
}
