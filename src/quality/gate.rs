//! Weighted aggregation of the structural checks.

use tracing::debug;

use crate::quality::analysis::BodyAnalysis;
use crate::quality::article::Article;
use crate::quality::checks;
use crate::quality::report::{CheckResult, QualityReport};

/// Relative weight of each check in the aggregate score.
///
/// The defaults sum to 1.0; custom tables need not, since aggregation divides
/// by the total weight.
#[derive(Debug, Clone, PartialEq)]
pub struct QualityWeights {
    pub word_count: f64,
    pub keyword_usage: f64,
    pub heading_structure: f64,
    pub readability: f64,
    pub meta_quality: f64,
    pub content_structure: f64,
    pub image_alt_text: f64,
    pub internal_links: f64,
}

impl Default for QualityWeights {
    fn default() -> Self {
        Self {
            word_count: 0.20,
            keyword_usage: 0.15,
            heading_structure: 0.15,
            readability: 0.10,
            meta_quality: 0.15,
            content_structure: 0.10,
            image_alt_text: 0.05,
            internal_links: 0.10,
        }
    }
}

impl QualityWeights {
    fn total(&self) -> f64 {
        self.word_count
            + self.keyword_usage
            + self.heading_structure
            + self.readability
            + self.meta_quality
            + self.content_structure
            + self.image_alt_text
            + self.internal_links
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct QualityConfig {
    /// Minimum weighted score for the article to pass.
    pub threshold: f64,
    pub weights: QualityWeights,
}

impl Default for QualityConfig {
    fn default() -> Self {
        Self {
            threshold: 70.0,
            weights: QualityWeights::default(),
        }
    }
}

/// Scores a finished article against the structural checks.
#[derive(Debug, Clone, Default)]
pub struct QualityGate {
    config: QualityConfig,
}

impl QualityGate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: QualityConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &QualityConfig {
        &self.config
    }

    /// Runs every check and folds the results into one weighted verdict.
    ///
    /// A bad article is a normal negative verdict; this never fails.
    pub fn evaluate(&self, article: &Article) -> QualityReport {
        let analysis =
            BodyAnalysis::of(&article.body, &article.keyword, article.site_host.as_deref());

        let weights = &self.config.weights;
        let weighted: Vec<(CheckResult, f64)> = vec![
            (checks::word_count(article, &analysis), weights.word_count),
            (checks::keyword_usage(article, &analysis), weights.keyword_usage),
            (checks::heading_structure(&analysis), weights.heading_structure),
            (checks::readability(&analysis), weights.readability),
            (checks::meta_quality(article), weights.meta_quality),
            (checks::content_structure(&analysis), weights.content_structure),
            (checks::image_alt_text(&analysis), weights.image_alt_text),
            (checks::internal_links(&analysis), weights.internal_links),
        ];

        let total_weight = weights.total();
        let score = if total_weight > 0.0 {
            weighted.iter().map(|(c, w)| c.score * w).sum::<f64>() / total_weight
        } else {
            0.0
        };
        let checks: Vec<CheckResult> = weighted.into_iter().map(|(c, _)| c).collect();
        let passed = score >= self.config.threshold;

        debug!(
            score,
            passed,
            failing = checks.iter().filter(|c| !c.passed).count(),
            "quality gate evaluated"
        );

        QualityReport {
            score,
            passed,
            threshold: self.config.threshold,
            checks,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// One h1, three h2, five paragraphs, keyword at ~1.5% density, three
    /// internal links, zero images, short readable sentences.
    fn good_article() -> Article {
        let mut sentences = Vec::new();
        for i in 0..40 {
            if i % 13 == 0 {
                sentences.push("We like rust for this kind of work.".to_string());
            } else {
                sentences.push("The tool does one small job well.".to_string());
            }
        }
        let prose = sentences.join(" ");
        let chunk = prose.len() / 5;
        let paragraphs: String = (0..5)
            .map(|i| {
                let start = i * chunk;
                let end = if i == 4 { prose.len() } else { (i + 1) * chunk };
                format!("<p>{}</p>", &prose[start..end])
            })
            .collect();

        let body = format!(
            "<h1>Main Title</h1><h2>First</h2><h2>Second</h2><h2>Third</h2>\
             {paragraphs}\
             <a href=\"/guide\">one</a><a href=\"/faq\">two</a><a href=\"/about\">three</a>"
        );
        Article::new(body, "rust", 280).with_meta(
            "A Practical Guide To Rust For Content Teams",
            "A grounded walkthrough of how small content teams can put rust to \
             work, with worked examples and honest notes on the tradeoffs.",
        )
    }

    #[test]
    fn test_good_article_scores_high_with_no_blockers() {
        let report = QualityGate::new().evaluate(&good_article());
        assert!(report.score >= 90.0, "score was {:.1}", report.score);
        assert!(report.passed);
        assert!(!report.has_blockers());
        assert!(report.is_publishable());
    }

    #[test]
    fn test_two_h1_blocks_even_a_high_scorer() {
        let mut article = good_article();
        article.body = article.body.replacen("<h2>First</h2>", "<h1>Second Title</h1>", 1)
            + "<h2>First</h2>";
        let report = QualityGate::new().evaluate(&article);
        assert!(report.has_blockers());
        assert!(!report.is_publishable());
        let blocker = report.blockers().next().unwrap();
        assert_eq!(blocker.name, "heading-structure");
    }

    #[test]
    fn test_missing_meta_blocks() {
        let mut article = good_article();
        article.meta = None;
        let report = QualityGate::new().evaluate(&article);
        assert!(report.has_blockers());
        assert!(!report.is_publishable());
    }

    #[test]
    fn test_thin_article_fails_threshold() {
        let article = Article::new("<p>one short paragraph</p>", "rust", 500);
        let report = QualityGate::new().evaluate(&article);
        assert!(!report.passed);
        assert!(report.score < 70.0);
    }

    #[test]
    fn test_custom_threshold() {
        let config = QualityConfig {
            threshold: 99.5,
            ..QualityConfig::default()
        };
        let report = QualityGate::with_config(config).evaluate(&good_article());
        assert!(!report.passed);
        // Blockers are independent of the threshold.
        assert!(!report.has_blockers());
    }

    #[test]
    fn test_report_round_trips_through_json() {
        let report = QualityGate::new().evaluate(&good_article());
        let json = serde_json::to_string(&report).unwrap();
        let back: QualityReport = serde_json::from_str(&json).unwrap();
        assert_eq!(back.checks.len(), 8);
        assert_eq!(back.passed, report.passed);
    }
}
