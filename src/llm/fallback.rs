//! Static replies used when the completion backend cannot produce one.
//! A turn must always complete with some assistant text, so every backend
//! failure category resolves here instead of surfacing to the user.

const GREETING_WORDS: &[&str] = &["hello", "hi", "hey"];

pub const GREETING_REPLY: &str =
    "Hello, I'm here to offer support. How are you feeling today?";
pub const GENERIC_REPLY: &str =
    "I hear you, and it sounds like you're going through a lot. Can you tell me more about what's happening?";

pub fn fallback_reply(message: &str) -> &'static str {
    let lower = message.to_lowercase();
    let is_greeting = lower
        .split(|c: char| !c.is_alphanumeric())
        .any(|word| GREETING_WORDS.contains(&word));
    if is_greeting {
        GREETING_REPLY
    } else {
        GENERIC_REPLY
    }
}

/// Coarse classification of backend failures, for logging only. Every
/// category resolves to a fallback reply; none fail the turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendFailure {
    Timeout,
    RateLimited,
    Auth,
    MalformedResponse,
    Other,
}

impl BackendFailure {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Timeout => "timeout",
            Self::RateLimited => "rate_limited",
            Self::Auth => "auth",
            Self::MalformedResponse => "malformed_response",
            Self::Other => "other",
        }
    }
}

pub fn classify_backend_error(error: &anyhow::Error) -> BackendFailure {
    let lower = error.to_string().to_ascii_lowercase();
    if lower.contains("timed out") || lower.contains("timeout") {
        BackendFailure::Timeout
    } else if lower.contains("429") || lower.contains("rate limit") || lower.contains("quota") {
        BackendFailure::RateLimited
    } else if lower.contains("401") || lower.contains("403") || lower.contains("api key") {
        BackendFailure::Auth
    } else if lower.contains("no text in") || lower.contains("error decoding") {
        BackendFailure::MalformedResponse
    } else {
        BackendFailure::Other
    }
}

#[cfg(test)]
mod tests {
    use super::{
        BackendFailure, GENERIC_REPLY, GREETING_REPLY, classify_backend_error, fallback_reply,
    };

    #[test]
    fn greeting_words_get_greeting_reply() {
        assert_eq!(fallback_reply("hello"), GREETING_REPLY);
        assert_eq!(fallback_reply("Hey there!"), GREETING_REPLY);
        assert_eq!(fallback_reply("Hi, anyone around?"), GREETING_REPLY);
    }

    #[test]
    fn greeting_match_is_word_based() {
        // "hi" inside another word is not a greeting.
        assert_eq!(fallback_reply("this is hard"), GENERIC_REPLY);
    }

    #[test]
    fn everything_else_gets_generic_reply() {
        assert_eq!(fallback_reply("my day was rough"), GENERIC_REPLY);
        assert_eq!(fallback_reply(""), GENERIC_REPLY);
    }

    #[test]
    fn classifies_common_failure_shapes() {
        assert_eq!(
            classify_backend_error(&anyhow::anyhow!("operation timed out")),
            BackendFailure::Timeout
        );
        assert_eq!(
            classify_backend_error(&anyhow::anyhow!("Gemini API error (429 Too Many Requests)")),
            BackendFailure::RateLimited
        );
        assert_eq!(
            classify_backend_error(&anyhow::anyhow!("Gemini API key not found")),
            BackendFailure::Auth
        );
        assert_eq!(
            classify_backend_error(&anyhow::anyhow!("no text in Gemini response")),
            BackendFailure::MalformedResponse
        );
        assert_eq!(
            classify_backend_error(&anyhow::anyhow!("connection reset")),
            BackendFailure::Other
        );
    }
}
