//! Image description signal and keyword scanning

use aho_corasick::AhoCorasick;
use serde::{Deserialize, Serialize};

use imageguard_core::Result;

/// Default child-content keyword list; deployments override it through the
/// configuration snapshot.
pub const DEFAULT_CHILD_KEYWORDS: &[&str] = &[
    "child", "children", "kid", "kids", "baby", "babies", "toddler", "infant", "minor", "teen",
    "young",
];

/// How the description signal was produced
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DescriptionSource {
    /// Generated by the external caption service
    Generated,
    /// Category disabled by configuration
    Disabled,
    /// Generator failed or timed out; zero-contribution fallback
    AnalysisError,
}

/// Raw caption generator output
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawCaption {
    /// Free-text description of the image
    pub description: String,

    /// Tags derived from the description by the generator
    #[serde(default)]
    pub tags: Vec<String>,
}

/// Normalized description signal
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DescriptionSignal {
    pub description: String,

    pub tags: Vec<String>,

    /// Whether the description or tags matched the child keyword list
    pub contains_child_keywords: bool,

    /// Keywords that matched, for the audit trail
    pub matched_keywords: Vec<String>,

    pub source: DescriptionSource,
}

impl DescriptionSignal {
    /// Build a signal from raw caption output.
    ///
    /// `scanner` is `None` when child-content detection is disabled, in which
    /// case no keyword scan runs and the flag stays false.
    pub fn from_caption(raw: &RawCaption, scanner: Option<&KeywordScanner>) -> Self {
        let tags: Vec<String> = raw.tags.iter().map(|t| t.to_lowercase()).collect();

        let matched_keywords = scanner
            .map(|s| {
                let mut matched = s.matches(&raw.description);
                for tag in &tags {
                    for hit in s.matches(tag) {
                        if !matched.contains(&hit) {
                            matched.push(hit);
                        }
                    }
                }
                matched
            })
            .unwrap_or_default();

        Self {
            description: raw.description.clone(),
            tags,
            contains_child_keywords: !matched_keywords.is_empty(),
            matched_keywords,
            source: DescriptionSource::Generated,
        }
    }

    /// Signal for a disabled description category
    pub fn disabled() -> Self {
        Self {
            description: String::new(),
            tags: Vec::new(),
            contains_child_keywords: false,
            matched_keywords: Vec::new(),
            source: DescriptionSource::Disabled,
        }
    }

    /// Zero-contribution fallback for a generator failure or timeout
    pub fn analysis_error() -> Self {
        Self {
            description: String::new(),
            tags: Vec::new(),
            contains_child_keywords: false,
            matched_keywords: Vec::new(),
            source: DescriptionSource::AnalysisError,
        }
    }
}

/// Case-insensitive substring scanner over a configurable keyword list
#[derive(Debug, Clone)]
pub struct KeywordScanner {
    automaton: AhoCorasick,
    keywords: Vec<String>,
}

impl KeywordScanner {
    /// Build a scanner from a keyword list
    pub fn new<I, S>(keywords: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let keywords: Vec<String> = keywords.into_iter().map(Into::into).collect();

        let automaton = AhoCorasick::builder()
            .ascii_case_insensitive(true)
            .build(&keywords)
            .map_err(|e| {
                imageguard_core::Error::config(format!("failed to build keyword scanner: {}", e))
            })?;

        Ok(Self {
            automaton,
            keywords,
        })
    }

    /// Scanner over the built-in child keyword list
    pub fn default_child_keywords() -> Self {
        Self::new(DEFAULT_CHILD_KEYWORDS.iter().copied())
            .expect("default keyword list is valid")
    }

    /// Distinct keywords matching anywhere in the text
    pub fn matches(&self, text: &str) -> Vec<String> {
        let mut matched = Vec::new();
        for hit in self.automaton.find_iter(text) {
            let keyword = self.keywords[hit.pattern().as_usize()].clone();
            if !matched.contains(&keyword) {
                matched.push(keyword);
            }
        }
        matched
    }

    /// Whether any keyword matches
    pub fn is_match(&self, text: &str) -> bool {
        self.automaton.is_match(text)
    }
}
