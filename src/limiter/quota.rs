//! Published provider quotas per logical model.

use std::collections::HashMap;

/// Quota limits for one model, as published by its backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModelQuota {
    pub tokens_per_minute: u64,
    pub requests_per_minute: u64,
    /// Daily token cap; most backends publish only per-minute limits.
    pub tokens_per_day: Option<u64>,
}

impl ModelQuota {
    pub const fn new(tokens_per_minute: u64, requests_per_minute: u64) -> Self {
        Self {
            tokens_per_minute,
            requests_per_minute,
            tokens_per_day: None,
        }
    }

    pub const fn with_daily_cap(mut self, tokens_per_day: u64) -> Self {
        self.tokens_per_day = Some(tokens_per_day);
        self
    }

    /// Applied to models with no published quota entry. Deliberately tight so
    /// an unconfigured fallback target is throttled rather than rejected.
    pub const fn conservative_default() -> Self {
        Self {
            tokens_per_minute: 10_000,
            requests_per_minute: 10,
            tokens_per_day: Some(200_000),
        }
    }
}

/// Lookup table from normalized model name to its quota.
#[derive(Debug, Clone)]
pub struct QuotaTable {
    quotas: HashMap<String, ModelQuota>,
    default: ModelQuota,
}

impl Default for QuotaTable {
    fn default() -> Self {
        Self {
            quotas: HashMap::new(),
            default: ModelQuota::conservative_default(),
        }
    }
}

impl QuotaTable {
    pub fn builder() -> QuotaTableBuilder {
        QuotaTableBuilder::default()
    }

    /// Quota for a model; unconfigured names receive the conservative
    /// default rather than rejection, so fallback substitutions never fail
    /// purely because their new target has no entry.
    pub fn quota_for(&self, model: &str) -> ModelQuota {
        self.quotas
            .get(&normalize(model))
            .copied()
            .unwrap_or(self.default)
    }

    pub fn contains(&self, model: &str) -> bool {
        self.quotas.contains_key(&normalize(model))
    }
}

pub(crate) fn normalize(model: &str) -> String {
    model.trim().to_lowercase()
}

#[derive(Debug, Default)]
pub struct QuotaTableBuilder {
    quotas: HashMap<String, ModelQuota>,
    default: Option<ModelQuota>,
}

impl QuotaTableBuilder {
    pub fn model(mut self, name: impl AsRef<str>, quota: ModelQuota) -> Self {
        self.quotas.insert(normalize(name.as_ref()), quota);
        self
    }

    pub fn default_quota(mut self, quota: ModelQuota) -> Self {
        self.default = Some(quota);
        self
    }

    pub fn build(self) -> QuotaTable {
        QuotaTable {
            quotas: self.quotas,
            default: self.default.unwrap_or(ModelQuota::conservative_default()),
        }
    }
}
