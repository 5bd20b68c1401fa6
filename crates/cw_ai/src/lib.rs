pub mod analyze;
pub mod chat;
pub mod gemini;
pub mod guardrails;
pub mod llm;
pub mod request;
pub mod schema;
pub mod session;

#[cfg(test)]
mod tests {
    use super::gemini::GeminiClient;
    use super::guardrails::{require_text, strip_code_fence};

    #[test]
    fn enforces_https_or_loopback_base_url() {
        assert!(GeminiClient::new("https://generativelanguage.googleapis.com", "k").is_ok());
        assert!(GeminiClient::new("https://proxy.internal:8443", "k").is_ok());
        assert!(GeminiClient::new("http://127.0.0.1:8080", "k").is_ok());
        assert!(GeminiClient::new("http://127.0.0.1", "k").is_ok());

        assert!(GeminiClient::new("http://generativelanguage.googleapis.com", "k").is_err());
        assert!(GeminiClient::new("http://localhost:8080", "k").is_err());
        assert!(GeminiClient::new("ftp://example.com", "k").is_err());
        assert!(GeminiClient::new("", "k").is_err());

        // Harden against authority tricks.
        assert!(GeminiClient::new("http://127.0.0.1.evil.com:8080", "k").is_err());
        assert!(GeminiClient::new("http://127.0.0.1@evil.com:8080", "k").is_err());
        assert!(GeminiClient::new("https://good.com@evil.com", "k").is_err());
        assert!(GeminiClient::new("https://example.com:", "k").is_err());
        assert!(GeminiClient::new("https://example.com:0", "k").is_err());
        assert!(GeminiClient::new("https://example.com:99999", "k").is_err());
        assert!(GeminiClient::new("https://example.com/", "k").is_ok()); // trailing slash is trimmed
        assert!(GeminiClient::new("https://example.com/v1beta", "k").is_err());
        assert!(GeminiClient::new("https://example.com?x=1", "k").is_err());
    }

    #[test]
    fn rejects_blank_api_key() {
        let err = GeminiClient::new("https://example.com", "  ").unwrap_err();
        assert_eq!(err.code, "CONFIG_ERROR");
    }

    #[test]
    fn debug_output_redacts_api_key() {
        let client = GeminiClient::new("https://example.com", "secret-key-123").unwrap();
        let dbg = format!("{client:?}");
        assert!(!dbg.contains("secret-key-123"));
        assert!(dbg.contains("<redacted>"));
    }

    #[test]
    fn generate_content_url_accepts_prefixed_model_names() {
        let client = GeminiClient::new("https://example.com/", "k").unwrap();
        assert_eq!(
            client.generate_content_url("gemini-3-pro-preview"),
            "https://example.com/v1beta/models/gemini-3-pro-preview:generateContent"
        );
        assert_eq!(
            client.generate_content_url("models/gemini-3-pro-preview"),
            "https://example.com/v1beta/models/gemini-3-pro-preview:generateContent"
        );
    }

    #[test]
    fn code_fence_guard_only_strips_a_full_wrapper() {
        assert_eq!(strip_code_fence("```json\n{\"a\":1}\n```"), "{\"a\":1}");
        assert_eq!(strip_code_fence("```\n{}\n```"), "{}");
        assert_eq!(strip_code_fence("  {\"a\":1}  "), "{\"a\":1}");
        assert_eq!(strip_code_fence("```json {} ```"), "```json {} ```");
    }

    #[test]
    fn empty_reply_guard() {
        assert_eq!(require_text("   \n").unwrap_err().code, "EMPTY_RESPONSE");
        assert_eq!(require_text(" ok ").unwrap(), "ok");
    }
}
