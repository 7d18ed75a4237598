//! Deterministic crisis detection and the fixed escalation response.
//!
//! Matching is a pure function of the normalized message and a static,
//! manually curated rule set. There is no learned component and no
//! negation handling: a message that merely mentions a danger signal is
//! flagged, trading false positives for a low false-negative rate.

pub mod detector;
pub mod escalation;
pub mod normalize;
pub mod rules;

pub use detector::{CrisisDetector, Detection};
pub use escalation::{
    CRISIS_TAG, ResponseSegment, SegmentKind, concatenated_crisis_text, crisis_response_sequence,
};
pub use normalize::normalize;
pub use rules::{BUILTIN_RULES_VERSION, RuleSet};
