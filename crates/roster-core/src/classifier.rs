//! Complexity Classifier
//!
//! Decides whether a request needs a team. Pure and total: no I/O, no
//! errors, the same input always yields the same verdict.

use crate::heuristics::{
    detect_domains, score_family, COMPLEXITY_THRESHOLD, DOMAIN_THRESHOLD, EXTRA_DOMAIN_WEIGHT,
    KEYWORD_FAMILIES, LONG_REQUEST_WEIGHT, LONG_REQUEST_WORDS,
};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Smallest team estimate
pub const MIN_TEAM_ESTIMATE: usize = 2;
/// Largest team estimate
pub const MAX_TEAM_ESTIMATE: usize = 3;

/// Result of classifying one request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComplexityVerdict {
    /// Whether the request should engage a team
    pub is_complex: bool,
    /// Human-readable justification
    pub reasoning: String,
    /// Detected expertise domains, in detection order
    pub required_expertise: Vec<String>,
    /// Suggested team size, always in `[2, 3]`
    pub estimated_team_size: usize,
    /// Raw complexity score
    pub score: u32,
}

impl ComplexityVerdict {
    fn simple(reasoning: impl Into<String>) -> Self {
        Self {
            is_complex: false,
            reasoning: reasoning.into(),
            required_expertise: Vec::new(),
            estimated_team_size: MIN_TEAM_ESTIMATE,
            score: 0,
        }
    }
}

/// Keyword and domain based complexity classifier
#[derive(Debug, Clone, Copy, Default)]
pub struct ComplexityClassifier;

impl ComplexityClassifier {
    /// Create a classifier
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Classify a request
    #[must_use]
    pub fn classify(&self, request: &str) -> ComplexityVerdict {
        let request = request.trim();
        if request.is_empty() {
            return ComplexityVerdict::simple("Empty request; a single agent can handle it");
        }

        let mut score = 0u32;
        let mut signals = Vec::new();
        for family in KEYWORD_FAMILIES {
            let (points, matched) = score_family(family, request);
            if points > 0 {
                score += points;
                signals.push(format!("{} [{}]", family.name, matched.join(", ")));
            }
        }

        let domains = detect_domains(request);
        if domains.len() > 1 {
            let extra = u32::try_from(domains.len() - 1).unwrap_or(u32::MAX);
            score += extra * EXTRA_DOMAIN_WEIGHT;
        }

        let word_count = request.split_whitespace().count();
        if word_count > LONG_REQUEST_WORDS {
            score += LONG_REQUEST_WEIGHT;
            signals.push(format!("long request ({word_count} words)"));
        }

        let is_complex = score >= COMPLEXITY_THRESHOLD || domains.len() >= DOMAIN_THRESHOLD;
        let estimated_team_size = domains
            .len()
            .max(MIN_TEAM_ESTIMATE)
            .clamp(MIN_TEAM_ESTIMATE, MAX_TEAM_ESTIMATE);

        let reasoning = Self::explain(is_complex, score, &domains, &signals);
        debug!(score, domains = domains.len(), is_complex, "request classified");

        ComplexityVerdict {
            is_complex,
            reasoning,
            required_expertise: domains.into_iter().map(str::to_string).collect(),
            estimated_team_size,
            score,
        }
    }

    fn explain(is_complex: bool, score: u32, domains: &[&str], signals: &[String]) -> String {
        let verdict = if is_complex {
            "Complex task requiring collaboration"
        } else {
            "Simple task for a single agent"
        };
        let domain_text = if domains.is_empty() {
            "no specific domains".to_string()
        } else {
            format!("domains: {}", domains.join(", "))
        };
        if signals.is_empty() {
            format!("{verdict} (score {score}; {domain_text})")
        } else {
            format!(
                "{verdict} (score {score}; {domain_text}; signals: {})",
                signals.join("; ")
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn classify(request: &str) -> ComplexityVerdict {
        ComplexityClassifier::new().classify(request)
    }

    #[test]
    fn test_full_stack_request_is_complex() {
        let verdict = classify(
            "Build a production-ready full-stack application with frontend, backend, and database",
        );
        assert!(verdict.is_complex);
        for domain in ["frontend", "backend", "database"] {
            assert!(verdict.required_expertise.iter().any(|d| d == domain));
        }
        assert_eq!(verdict.estimated_team_size, 3);
    }

    #[test]
    fn test_simple_question_not_complex() {
        let verdict = classify("What time zone is Tokyo in?");
        assert!(!verdict.is_complex);
        assert_eq!(verdict.score, 0);
        assert_eq!(verdict.estimated_team_size, 2);
    }

    #[test]
    fn test_empty_request() {
        let verdict = classify("   ");
        assert!(!verdict.is_complex);
        assert!(verdict.required_expertise.is_empty());
        assert_eq!(verdict.estimated_team_size, 2);
    }

    #[test]
    fn test_keyword_score_alone_is_enough() {
        // cross-domain 3 + action 2, no domain detected
        let verdict = classify("Create it from scratch");
        assert_eq!(verdict.score, 5);
        assert!(verdict.required_expertise.is_empty());
        assert!(verdict.is_complex);
    }

    #[test]
    fn test_domain_breadth_alone_is_enough() {
        let verdict = classify("my css and sql");
        assert!(verdict.score < COMPLEXITY_THRESHOLD);
        assert_eq!(verdict.required_expertise.len(), 2);
        assert!(verdict.is_complex);
    }

    #[test]
    fn test_below_both_thresholds_not_complex() {
        let verdict = classify("Create a logo");
        // action 2, one domain (design)
        assert_eq!(verdict.score, 2);
        assert_eq!(verdict.required_expertise, vec!["design"]);
        assert!(!verdict.is_complex);
    }

    #[test]
    fn test_everyday_words_do_not_add_domains() {
        let verdict = classify("tell me the rest of the design story");
        assert_eq!(verdict.required_expertise, vec!["design"]);
        assert!(!verdict.is_complex);
    }

    #[test]
    fn test_long_request_bonus() {
        let long = vec!["word"; 60].join(" ");
        let verdict = classify(&long);
        assert_eq!(verdict.score, LONG_REQUEST_WEIGHT);
    }

    #[test]
    fn test_deterministic_and_bounded() {
        let requests = [
            "",
            "hi",
            "Deploy a secure, tested, scalable React + GraphQL + Postgres system on Kubernetes",
            "Write me a poem",
        ];
        for request in requests {
            let a = classify(request);
            let b = classify(request);
            assert_eq!(a, b);
            assert!((2..=3).contains(&a.estimated_team_size));
            let expected =
                a.score >= COMPLEXITY_THRESHOLD || a.required_expertise.len() >= DOMAIN_THRESHOLD;
            assert_eq!(a.is_complex, expected);
        }
    }
}
