use super::normalize::normalize;
use anyhow::{Context, Result};
use regex::Regex;
use serde::Deserialize;
use std::fs;
use std::path::Path;

/// Version tag of the built-in rule set. Bumped on every curation pass.
pub const BUILTIN_RULES_VERSION: &str = "2.2";

// Keyword and pattern lists are bilingual (Slovak/Czech + English), stored
// diacritic-stripped and lower-case. Several suicide-related Slovak terms
// appear in both layers; the overlap is intentional defense in depth.
const KEYWORDS: &[&str] = &[
    "suicide",
    "suicidal",
    "kill myself",
    "end my life",
    "want to die",
    "better off dead",
    "end it all",
    "take my own life",
    "hurt myself",
    "cut myself",
    "harm myself",
    "self harm",
    "samovrazda",
    "sebevrazda",
    "zabijem sa",
    "zabit sa",
    "ukoncit zivot",
    "chcem zomriet",
    "chci umrit",
    "ublizit si",
    "uskodit si",
    "chcem to skoncit",
    "chci to skoncit",
    "nevladzem dalej",
    "uz nemuzu",
    "je po vsem",
    "nema to zmysel",
    "nema to smysl",
    "overdose",
    "predavkoval",
    "bad trip",
    "halucinacie",
    "no point living",
    "life is meaningless",
    "cannot go on",
];

const PATTERNS: &[&str] = &[
    // Suicide and self-harm paraphrases
    r"myslim na (sebevrazd|samovrazd)",
    r"chci spachat (sebevrazd|samovrazd)",
    r"chcem spachat (sebevrazd|samovrazd)",
    r"chci (skocit|skoncit)",
    r"chcem (skocit|skoncit)",
    r"\bi want to (die|kill|hurt|harm)",
    r"\bi (wish|want) i (was|were) dead",
    r"\bi can'?t (take|handle|deal with) (this|it) anymore",
    r"\blife isn'?t worth",
    // Drug-use self-reports and altered-state descriptions
    r"\bi (am|was) on [a-z]+",
    r"\bi took [a-z]+",
    r"\bi'?m (high|tripping|freaking)",
    r"\bseeing (fractals|patterns|colors)",
    r"\bhearing (things|voices)",
    r"\bcan'?t (stop|come down|control)",
];

/// Static crisis rule set: a substring keyword layer plus an ordered regex
/// pattern layer. Manually curated; loadable from TOML so tests and
/// deployments can swap in an alternate set without a rebuild.
pub struct RuleSet {
    pub version: String,
    pub keywords: Vec<String>,
    pub patterns: Vec<Regex>,
}

#[derive(Debug, Deserialize)]
struct RuleSetFile {
    version: String,
    keywords: Vec<String>,
    patterns: Vec<String>,
}

impl RuleSet {
    pub fn builtin() -> Result<Self> {
        Self::compile(
            BUILTIN_RULES_VERSION.to_string(),
            KEYWORDS.iter().map(|k| (*k).to_string()).collect(),
            PATTERNS.iter().copied(),
        )
    }

    pub fn from_toml_file(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("reading rule set {}", path.display()))?;
        let file: RuleSetFile = toml::from_str(&raw)
            .with_context(|| format!("parsing rule set {}", path.display()))?;
        Self::compile(
            file.version,
            file.keywords,
            file.patterns.iter().map(String::as_str),
        )
    }

    fn compile<'a>(
        version: String,
        keywords: Vec<String>,
        patterns: impl Iterator<Item = &'a str>,
    ) -> Result<Self> {
        // Keywords are normalized on load so curated files with diacritics
        // still match the normalized message text.
        let keywords = keywords.iter().map(|k| normalize(k)).collect();
        let patterns = patterns
            .map(|p| Regex::new(p).with_context(|| format!("invalid crisis pattern {p:?}")))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self {
            version,
            keywords,
            patterns,
        })
    }

    pub fn rule_counts(&self) -> (usize, usize) {
        (self.keywords.len(), self.patterns.len())
    }
}
