use super::normalize::normalize;
use super::rules::RuleSet;

/// Outcome of evaluating one message against the rule set. Carries which
/// rules fired so the audit trail can record them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Detection {
    pub matched_keywords: Vec<String>,
    pub matched_pattern: Option<String>,
}

impl Detection {
    pub fn is_crisis(&self) -> bool {
        !self.matched_keywords.is_empty() || self.matched_pattern.is_some()
    }
}

pub struct CrisisDetector {
    rules: RuleSet,
}

impl CrisisDetector {
    pub fn new(rules: RuleSet) -> Self {
        Self { rules }
    }

    pub fn rules(&self) -> &RuleSet {
        &self.rules
    }

    /// Pure function of the message and the static rule set; never inspects
    /// conversation history. Keywords are checked first because substring
    /// scans are cheaper than the regex layer; the result is a logical OR,
    /// so the order never changes the verdict.
    pub fn detect(&self, message: &str) -> Detection {
        let normalized = normalize(message);

        let matched_keywords: Vec<String> = self
            .rules
            .keywords
            .iter()
            .filter(|keyword| normalized.contains(keyword.as_str()))
            .cloned()
            .collect();

        if !matched_keywords.is_empty() {
            return Detection {
                matched_keywords,
                matched_pattern: None,
            };
        }

        let matched_pattern = self
            .rules
            .patterns
            .iter()
            .find(|pattern| pattern.is_match(&normalized))
            .map(|pattern| pattern.as_str().to_string());

        Detection {
            matched_keywords,
            matched_pattern,
        }
    }
}
