//! Log Redaction Layer
//!
//! Keeps audio payloads and URL tokens out of log lines.

use regex::Regex;
use serde_json::Value;
use std::sync::LazyLock;

static API_KEY_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(sk-[a-zA-Z0-9]{32,})|(Bearer\s+[a-zA-Z0-9\-\._~+/]+=*)").unwrap()
});

/// Payload strings longer than this are replaced by a length marker.
const PAYLOAD_PREVIEW_LIMIT: usize = 64;

/// Redacts API keys and bearer tokens in a string.
pub fn redact_sensitive_data(input: &str) -> String {
    API_KEY_RE.replace_all(input, "[REDACTED_TOKEN]").to_string()
}

/// Returns a copy of a job input that is safe to log.
///
/// `audio_base64` becomes a length marker and `audio_url` loses its query
/// string and fragment (signed URLs carry credentials there).
pub fn redact_job_input(input: &Value) -> Value {
    let Value::Object(map) = input else {
        return input.clone();
    };

    let mut out = serde_json::Map::with_capacity(map.len());
    for (key, value) in map {
        let redacted = match (key.as_str(), value) {
            ("audio_base64", Value::String(s)) if s.len() > PAYLOAD_PREVIEW_LIMIT => {
                Value::String(format!("[{} base64 chars]", s.len()))
            }
            ("audio_url", Value::String(s)) => Value::String(strip_query(s).to_string()),
            (_, Value::String(s)) => Value::String(redact_sensitive_data(s)),
            _ => value.clone(),
        };
        out.insert(key.clone(), redacted);
    }
    Value::Object(out)
}

fn strip_query(url: &str) -> &str {
    let end = url.find(['?', '#']).unwrap_or(url.len());
    &url[..end]
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_redaction() {
        let raw = "calling with Bearer eyJhbGciOiJIUzI1NiIsInR5cCI6IkpXVCJ9";
        let clean = redact_sensitive_data(raw);
        assert!(!clean.contains("eyJhbGciOiJIUzI1NiIsInR5cCI6IkpXVCJ9"));
    }

    #[test]
    fn long_payload_becomes_marker() {
        let payload = "A".repeat(4096);
        let clean = redact_job_input(&json!({ "audio_base64": payload, "model": "large-v2" }));
        assert_eq!(clean["audio_base64"], "[4096 base64 chars]");
        assert_eq!(clean["model"], "large-v2");
    }

    #[test]
    fn short_payload_kept() {
        let clean = redact_job_input(&json!({ "audio_base64": "UklGRg==" }));
        assert_eq!(clean["audio_base64"], "UklGRg==");
    }

    #[test]
    fn url_query_stripped() {
        let clean = redact_job_input(&json!({ "audio_url": "https://cdn.example/a/clip.flac?X-Amz-Signature=abc#t=1" }));
        assert_eq!(clean["audio_url"], "https://cdn.example/a/clip.flac");
    }

    #[test]
    fn non_object_passes_through() {
        assert_eq!(redact_job_input(&json!(null)), json!(null));
    }
}
