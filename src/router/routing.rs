//! Data-driven model-to-provider routing.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::limiter::normalize;

/// Backend providers the router can dispatch to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    /// DeepSeek native API.
    DeepSeek,
    /// OpenAI chat completions, reached directly.
    OpenAi,
    /// OpenAI image generation.
    OpenAiImage,
    /// Multi-vendor aggregator; the documented default for unmapped names.
    OpenRouter,
}

/// Coarse capability class of a model, selecting which fallback chain applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModelTier {
    /// Long-form writing, research, strategy. Chain favors high-capability
    /// models first.
    Complex,
    /// Short structural tasks: meta descriptions, outlines, titles.
    Simple,
}

/// Routing decision for one logical model name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RouteTarget {
    pub provider: ProviderKind,
    pub tier: ModelTier,
}

/// Markers that classify a model name as the simple tier when no table entry
/// says otherwise.
const SIMPLE_MARKERS: &[&str] = &["mini", "flash", "lite", "haiku", "nano", "small"];

/// Markers for image-capable vendor names.
const IMAGE_MARKERS: &[&str] = &["dall-e", "gpt-image"];

/// Explicit lookup table from model identifier to `{provider, tier}`.
///
/// Exact entries win; names without one fall back to fixed rules: names
/// containing `deepseek` route to the DeepSeek backend, an `openai/` path
/// prefix routes to OpenAI's direct API, image-capable names route to the
/// image backend, and everything else routes to the aggregator.
#[derive(Debug, Clone, Default)]
pub struct RoutingTable {
    entries: HashMap<String, RouteTarget>,
}

impl RoutingTable {
    pub fn builder() -> RoutingTableBuilder {
        RoutingTableBuilder::default()
    }

    /// Every logical model name maps to exactly one target; this never fails.
    pub fn resolve(&self, model: &str) -> RouteTarget {
        let name = normalize(model);
        if let Some(target) = self.entries.get(&name) {
            return *target;
        }

        let provider = if name.contains("deepseek") {
            ProviderKind::DeepSeek
        } else if IMAGE_MARKERS.iter().any(|m| name.contains(m)) {
            ProviderKind::OpenAiImage
        } else if name.starts_with("openai/") {
            ProviderKind::OpenAi
        } else {
            ProviderKind::OpenRouter
        };

        let tier = if SIMPLE_MARKERS.iter().any(|m| name.contains(m)) {
            ModelTier::Simple
        } else {
            ModelTier::Complex
        };

        RouteTarget { provider, tier }
    }
}

#[derive(Debug, Default)]
pub struct RoutingTableBuilder {
    entries: HashMap<String, RouteTarget>,
}

impl RoutingTableBuilder {
    pub fn route(mut self, model: impl AsRef<str>, provider: ProviderKind, tier: ModelTier) -> Self {
        self.entries
            .insert(normalize(model.as_ref()), RouteTarget { provider, tier });
        self
    }

    pub fn build(self) -> RoutingTable {
        RoutingTable {
            entries: self.entries,
        }
    }
}
