//! Input shape for the quality gate.

use serde::{Deserialize, Serialize};

/// SEO metadata attached to an article.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArticleMeta {
    pub title: String,
    pub description: String,
}

/// A finished generation job's output, ready to be scored.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Article {
    /// Rendered HTML body.
    pub body: String,
    pub meta: Option<ArticleMeta>,
    /// Focus keyword the article was written for.
    pub keyword: String,
    pub target_word_count: usize,
    /// Host of the publishing site; absolute links to it count as internal.
    pub site_host: Option<String>,
}

impl Article {
    pub fn new(body: impl Into<String>, keyword: impl Into<String>, target_word_count: usize) -> Self {
        Self {
            body: body.into(),
            meta: None,
            keyword: keyword.into(),
            target_word_count,
            site_host: None,
        }
    }

    pub fn with_meta(mut self, title: impl Into<String>, description: impl Into<String>) -> Self {
        self.meta = Some(ArticleMeta {
            title: title.into(),
            description: description.into(),
        });
        self
    }

    pub fn with_site_host(mut self, host: impl Into<String>) -> Self {
        self.site_host = Some(host.into());
        self
    }
}
