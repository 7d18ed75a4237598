//! Completion backends. The pipeline only sees the [`CompletionBackend`]
//! trait; everything behind it is a black box that either produces one
//! assistant reply or fails.

pub mod fallback;
pub mod gemini;
pub mod traits;

pub use fallback::{BackendFailure, classify_backend_error, fallback_reply};
pub use gemini::GeminiBackend;
pub use traits::CompletionBackend;
