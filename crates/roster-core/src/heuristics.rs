//! Heuristic tables
//!
//! Keyword families, domain patterns, the expertise taxonomy, tool triggers
//! and execution-mode bias live here as plain data. The classifier and the
//! selector consume them through the generic matching functions below.

use crate::agents::ToolCapability;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::sync::LazyLock;

/// Points added per matched keyword of a family
#[derive(Debug)]
pub struct KeywordFamily {
    /// Family name (used in justifications)
    pub name: &'static str,
    /// Points per matched keyword
    pub weight: u32,
    /// Keywords and phrases, lowercase
    pub keywords: &'static [&'static str],
}

/// Build/action verbs
pub const ACTION_KEYWORDS: KeywordFamily = KeywordFamily {
    name: "action",
    weight: 2,
    keywords: &[
        "build",
        "create",
        "develop",
        "implement",
        "design",
        "architect",
        "integrate",
        "migrate",
        "refactor",
        "deploy",
        "launch",
    ],
};

/// Phrases implying several domains must cooperate
pub const CROSS_DOMAIN_KEYWORDS: KeywordFamily = KeywordFamily {
    name: "cross-domain",
    weight: 3,
    keywords: &[
        "full-stack",
        "full stack",
        "end-to-end",
        "end to end",
        "frontend and backend",
        "from scratch",
        "complete system",
        "entire application",
        "multiple teams",
    ],
};

/// Production-grade scope
pub const TECHNICAL_DEPTH_KEYWORDS: KeywordFamily = KeywordFamily {
    name: "technical-depth",
    weight: 2,
    keywords: &[
        "production",
        "production-ready",
        "scalable",
        "enterprise",
        "architecture",
        "microservices",
        "infrastructure",
        "high availability",
        "performance",
        "comprehensive",
        "robust",
    ],
};

/// All keyword families scored by the classifier
pub const KEYWORD_FAMILIES: [&KeywordFamily; 3] = [
    &ACTION_KEYWORDS,
    &CROSS_DOMAIN_KEYWORDS,
    &TECHNICAL_DEPTH_KEYWORDS,
];

/// Points per distinct domain beyond the first
pub const EXTRA_DOMAIN_WEIGHT: u32 = 2;

/// Word count above which a request counts as long
pub const LONG_REQUEST_WORDS: usize = 50;

/// Points for a long request
pub const LONG_REQUEST_WEIGHT: u32 = 2;

/// Score at which a request is complex on keyword signal alone
pub const COMPLEXITY_THRESHOLD: u32 = 5;

/// Distinct domains at which a request is complex on breadth alone
pub const DOMAIN_THRESHOLD: usize = 2;

/// A domain and the pattern that detects it
#[derive(Debug)]
pub struct DomainPattern {
    /// Domain label reported in `required_expertise`
    pub domain: &'static str,
    /// Case-insensitive detection pattern
    pub regex: Regex,
}

const DOMAIN_SOURCES: [(&str, &str); 7] = [
    (
        "frontend",
        r"front-?end|ui|user interface|react|vue|angular|svelte|css|html|components?|web ?pages?|landing pages?",
    ),
    (
        "backend",
        r"back-?end|apis?|server|endpoints?|rest(ful| ?apis?)|graphql|microservices?",
    ),
    (
        "design",
        r"design|ux|wireframes?|mockups?|prototypes?|figma|branding|logo|visual",
    ),
    (
        "database",
        r"databases?|db|sql|postgres(ql)?|mysql|mongo(db)?|schemas?|data model",
    ),
    (
        "security",
        r"security|secure|auth(entication|orization)?|encryption|vulnerabilit(y|ies)|oauth|penetration",
    ),
    (
        "testing",
        r"testing|(unit|integration|automated|regression|e2e) tests?|test (suites?|cases?|coverage|plans?)|qa|e2e|quality assurance",
    ),
    (
        "deployment",
        r"deploy(ment|ing)?|ci/?cd|docker|kubernetes|k8s|hosting|devops|infrastructure",
    ),
];

/// Domain detection patterns in reporting order
pub static DOMAIN_PATTERNS: LazyLock<Vec<DomainPattern>> = LazyLock::new(|| {
    DOMAIN_SOURCES
        .iter()
        .map(|(domain, source)| DomainPattern {
            domain,
            regex: Regex::new(&format!(r"(?i)\b(?:{source})\b"))
                .expect("DOMAIN_SOURCES are compile-time constants"),
        })
        .collect()
});

/// Expertise tag → keywords that signal it
pub const EXPERTISE_TAXONOMY: &[(&str, &[&str])] = &[
    (
        "frontend",
        &[
            "frontend", "front-end", "ui", "interface", "react", "vue", "angular", "css",
            "html", "component", "responsive", "web page", "landing page",
        ],
    ),
    (
        "backend",
        &[
            "backend", "back-end", "api", "server", "endpoint", "rest", "graphql",
            "microservice", "integration",
        ],
    ),
    (
        "design",
        &[
            "design", "ux", "wireframe", "mockup", "prototype", "figma", "branding", "logo",
            "visual", "layout", "color",
        ],
    ),
    (
        "database",
        &[
            "database", "sql", "postgres", "mysql", "mongodb", "schema", "query", "migration",
            "index",
        ],
    ),
    (
        "security",
        &[
            "security", "vulnerability", "authentication", "authorization", "encryption",
            "oauth", "audit", "compliance", "penetration",
        ],
    ),
    (
        "testing",
        &[
            "test", "testing", "qa", "bug", "regression", "e2e", "coverage", "quality",
        ],
    ),
    (
        "devops",
        &[
            "deploy", "deployment", "docker", "kubernetes", "ci/cd", "pipeline",
            "infrastructure", "cloud", "hosting", "monitoring",
        ],
    ),
    (
        "data",
        &[
            "data", "analytics", "dataset", "metrics", "statistics", "chart", "dashboard",
            "report", "visualization",
        ],
    ),
    (
        "writing",
        &[
            "write", "article", "blog", "copy", "documentation", "email", "content",
            "proofread", "edit",
        ],
    ),
    (
        "marketing",
        &[
            "marketing", "campaign", "seo", "audience", "brand", "social media", "growth",
            "advertising", "launch",
        ],
    ),
    (
        "research",
        &[
            "research", "compare", "sources", "investigate", "summarize", "study", "analysis",
            "competitors",
        ],
    ),
];

/// Keywords for an expertise tag (empty for unknown tags)
#[must_use]
pub fn expertise_keywords(tag: &str) -> &'static [&'static str] {
    EXPERTISE_TAXONOMY
        .iter()
        .find(|(name, _)| name.eq_ignore_ascii_case(tag))
        .map_or(&[], |(_, keywords)| keywords)
}

/// Action words → tool capability they imply
pub const TOOL_TRIGGERS: &[(ToolCapability, &[&str])] = &[
    (
        ToolCapability::CodeExecution,
        &["execute", "run", "script", "compile", "debug", "code"],
    ),
    (
        ToolCapability::WebSearch,
        &["search", "look up", "latest", "news", "find out"],
    ),
    (
        ToolCapability::FileAccess,
        &["file", "files", "upload", "attachment", "folder"],
    ),
    (
        ToolCapability::ImageGeneration,
        &["image", "picture", "illustration", "draw", "logo", "icon"],
    ),
    (
        ToolCapability::WebBrowse,
        &["browse", "website", "url", "visit", "link"],
    ),
    (
        ToolCapability::DataAnalysis,
        &["analyze", "analyse", "statistics", "spreadsheet", "csv", "dataset"],
    ),
];

/// Capabilities implied by the request text, in table order
#[must_use]
pub fn implied_tools(text: &str) -> Vec<ToolCapability> {
    TOOL_TRIGGERS
        .iter()
        .filter(|(_, words)| {
            words
                .iter()
                .any(|word| match_keyword(text, word) == Some(MatchStrength::WholeWord))
        })
        .map(|(tool, _)| *tool)
        .collect()
}

/// Execution-mode hint biasing selection toward a group of agents
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExecutionBias {
    /// Engineering-oriented agents
    Technical,
    /// Design and content agents
    Creative,
    /// Data and research agents
    Analytical,
    /// No bias
    #[default]
    General,
}

impl ExecutionBias {
    /// Expertise tags favored by this bias
    #[must_use]
    pub fn favored_expertise(&self) -> &'static [&'static str] {
        match self {
            Self::Technical => &["frontend", "backend", "database", "security", "testing", "devops"],
            Self::Creative => &["design", "writing", "marketing"],
            Self::Analytical => &["data", "research"],
            Self::General => &[],
        }
    }

    /// Returns the string representation
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Technical => "technical",
            Self::Creative => "creative",
            Self::Analytical => "analytical",
            Self::General => "general",
        }
    }
}

impl FromStr for ExecutionBias {
    type Err = std::convert::Infallible;

    /// Unknown hints map to `General`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.trim().to_ascii_lowercase().as_str() {
            "technical" | "engineering" | "code" => Self::Technical,
            "creative" | "design" | "content" => Self::Creative,
            "analytical" | "analysis" | "research" => Self::Analytical,
            _ => Self::General,
        })
    }
}

/// Words ignored for description overlap
pub const STOP_WORDS: &[&str] = &[
    "about", "after", "also", "been", "being", "both", "could", "does", "each", "from",
    "have", "help", "into", "just", "like", "make", "more", "most", "need", "only", "other",
    "over", "please", "should", "some", "such", "than", "that", "their", "them", "then",
    "there", "these", "they", "this", "those", "very", "want", "what", "when", "where",
    "which", "while", "will", "with", "would", "your",
];

/// Minimum length of a word counted for description overlap
pub const MIN_OVERLAP_WORD_LEN: usize = 4;

static WORD_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[a-z0-9][a-z0-9+#]*").expect("WORD_REGEX is a compile-time constant")
});

/// Lowercased content words (length ≥ 4, stop words removed), deduplicated
/// in first-seen order
#[must_use]
pub fn content_words(text: &str) -> Vec<String> {
    let lower = text.to_lowercase();
    let mut words: Vec<String> = Vec::new();
    for m in WORD_REGEX.find_iter(&lower) {
        let word = m.as_str();
        if word.len() >= MIN_OVERLAP_WORD_LEN
            && !STOP_WORDS.contains(&word)
            && !words.iter().any(|w| w == word)
        {
            words.push(word.to_string());
        }
    }
    words
}

/// How strongly a keyword matched
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum MatchStrength {
    /// Stem of the keyword appears
    Partial,
    /// Keyword appears inside a longer word
    Substring,
    /// Keyword appears as a whole word or phrase
    WholeWord,
}

/// Minimum stem length for a partial match
const MIN_STEM_LEN: usize = 4;

/// Match one keyword against text, case-insensitively
///
/// Whole-word requires word boundaries on both sides. Keywords shorter than
/// four characters only match as whole words. Partial matching uses the
/// keyword minus its last two characters, never shorter than four.
#[must_use]
pub fn match_keyword(text: &str, keyword: &str) -> Option<MatchStrength> {
    let keyword = keyword.trim().to_lowercase();
    if keyword.is_empty() {
        return None;
    }
    let lower = text.to_lowercase();

    if contains_whole_word(&lower, &keyword) {
        return Some(MatchStrength::WholeWord);
    }
    let chars: Vec<char> = keyword.chars().collect();
    if chars.len() < MIN_STEM_LEN {
        return None;
    }
    if lower.contains(&keyword) {
        return Some(MatchStrength::Substring);
    }

    if chars.len() > MIN_STEM_LEN {
        let stem_len = (chars.len() - 2).max(MIN_STEM_LEN);
        let stem: String = chars[..stem_len].iter().collect();
        if lower.contains(&stem) {
            return Some(MatchStrength::Partial);
        }
    }
    None
}

/// Whole-word/phrase containment on already-lowercased input
#[must_use]
pub fn contains_whole_word(lower_text: &str, lower_keyword: &str) -> bool {
    if lower_keyword.is_empty() {
        return false;
    }
    let is_word = |c: char| c.is_alphanumeric() || c == '_';
    let mut start = 0;
    while let Some(pos) = lower_text[start..].find(lower_keyword) {
        let begin = start + pos;
        let end = begin + lower_keyword.len();
        let before_ok = lower_text[..begin].chars().next_back().is_none_or(|c| !is_word(c))
            || lower_keyword.chars().next().is_some_and(|c| !is_word(c));
        let after_ok = lower_text[end..].chars().next().is_none_or(|c| !is_word(c))
            || lower_keyword.chars().next_back().is_some_and(|c| !is_word(c));
        if before_ok && after_ok {
            return true;
        }
        start = begin + lower_keyword.chars().next().map_or(1, char::len_utf8);
    }
    false
}

/// Score a keyword family: `weight` per whole-word match
///
/// Returns the points and the matched keywords in table order.
#[must_use]
pub fn score_family(family: &KeywordFamily, text: &str) -> (u32, Vec<&'static str>) {
    let lower = text.to_lowercase();
    let matched: Vec<&'static str> = family
        .keywords
        .iter()
        .copied()
        .filter(|keyword| contains_whole_word(&lower, keyword))
        .collect();
    let points = family.weight * u32::try_from(matched.len()).unwrap_or(u32::MAX);
    (points, matched)
}

/// Domains detected in the text, in pattern order
#[must_use]
pub fn detect_domains(text: &str) -> Vec<&'static str> {
    DOMAIN_PATTERNS
        .iter()
        .filter(|pattern| pattern.regex.is_match(text))
        .map(|pattern| pattern.domain)
        .collect()
}
