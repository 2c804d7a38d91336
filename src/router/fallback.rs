//! Static fallback chains per processing tier.

use super::routing::ModelTier;

/// Ordered substitute models per tier, consulted strictly left-to-right when
/// a call fails with a retryable error.
///
/// Each model appears once per chain; the complex chain favors
/// higher-capability models first, the simple chain cheaper ones. Read-only
/// at call time.
#[derive(Debug, Clone)]
pub struct FallbackChains {
    complex: Vec<String>,
    simple: Vec<String>,
}

impl Default for FallbackChains {
    fn default() -> Self {
        Self {
            complex: vec![
                "deepseek-reasoner".to_string(),
                "openai/gpt-4o".to_string(),
                "anthropic/claude-sonnet-4".to_string(),
            ],
            simple: vec![
                "deepseek-chat".to_string(),
                "openai/gpt-4o-mini".to_string(),
                "google/gemini-2.0-flash".to_string(),
            ],
        }
    }
}

impl FallbackChains {
    pub fn new(complex: Vec<String>, simple: Vec<String>) -> Self {
        Self { complex, simple }
    }

    pub fn for_tier(&self, tier: ModelTier) -> &[String] {
        match tier {
            ModelTier::Complex => &self.complex,
            ModelTier::Simple => &self.simple,
        }
    }
}

/// Next untried model in `chain`, starting strictly after `current`'s
/// position if present, otherwise from the head. Models in `tried` are never
/// revisited, so progress through the chain is monotonically forward.
pub(crate) fn next_after<'a>(
    chain: &'a [String],
    current: &str,
    tried: &[String],
) -> Option<&'a str> {
    let start = chain
        .iter()
        .position(|m| m == current)
        .map(|i| i + 1)
        .unwrap_or(0);

    chain[start..]
        .iter()
        .find(|m| m.as_str() != current && !tried.iter().any(|t| t == *m))
        .map(String::as_str)
}
