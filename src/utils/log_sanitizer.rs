// ============================================================================
// Log Sanitization - keep form input from forging or bloating log lines
// ============================================================================
//
// Contact and parts inquiry forms are anonymous, so every free-text value
// that reaches a log line is attacker controlled. Values pass through
// `sanitize_for_log` first:
//
//   - newlines / carriage returns become spaces (no fake log entries)
//   - ANSI escape sequences are dropped (no terminal tricks)
//   - remaining control characters are dropped
//   - output is capped at MAX_LOG_LENGTH characters
//
// Submitter emails are masked with `mask_email` before logging.
//
// ============================================================================

use regex::Regex;
use once_cell::sync::Lazy;

/// Maximum length for logged user input
const MAX_LOG_LENGTH: usize = 200;

static ANSI_ESCAPE_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\x1b\[[0-9;]*[a-zA-Z]").expect("static regex")
});

/// Sanitize user input for safe logging
///
/// ```
/// use nexxa_auto::utils::log_sanitizer::sanitize_for_log;
///
/// assert_eq!(
///     sanitize_for_log("jane@example.com\nINFO: Fake log entry"),
///     "jane@example.com INFO: Fake log entry"
/// );
/// assert_eq!(sanitize_for_log("test\x1b[31mred\x1b[0m"), "testred");
/// ```
pub fn sanitize_for_log(input: &str) -> String {
    let no_ansi = ANSI_ESCAPE_REGEX.replace_all(input, "");

    let cleaned: String = no_ansi
        .chars()
        .map(|c| match c {
            '\n' | '\r' | '\t' => ' ',
            other => other,
        })
        .filter(|c| !c.is_control())
        .collect();

    if cleaned.chars().count() > MAX_LOG_LENGTH {
        let truncated: String = cleaned.chars().take(MAX_LOG_LENGTH).collect();
        format!("{}...", truncated)
    } else {
        cleaned
    }
}

/// Keep the first character of the local part and the whole domain
///
/// ```
/// use nexxa_auto::utils::log_sanitizer::mask_email;
///
/// assert_eq!(mask_email("jane.doe@example.com"), "j***@example.com");
/// ```
pub fn mask_email(email: &str) -> String {
    let sanitized = sanitize_for_log(email);
    match sanitized.split_once('@') {
        Some((local, domain)) => {
            let first = local.chars().next().map(String::from).unwrap_or_default();
            format!("{}***@{}", first, domain)
        }
        None => "***".to_string(),
    }
}

/// For values that must never be logged in full (API keys, tokens)
pub fn redact_sensitive(input: &str) -> String {
    format!("[REDACTED-{}]", input.len())
}
