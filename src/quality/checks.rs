//! The individual structural checks.
//!
//! Each check returns a [`CheckResult`] with a 0-100 score. Only two failure
//! modes are hard blockers: more than one top-level heading, and missing SEO
//! metadata. Everything else degrades to a warning so the aggregate score
//! stays the deciding factor.

use crate::quality::analysis::BodyAnalysis;
use crate::quality::article::Article;
use crate::quality::report::{CheckResult, Severity};

const MIN_WORD_RATIO: f64 = 0.8;
const MAX_WORD_RATIO: f64 = 1.5;
const MIN_KEYWORD_OCCURRENCES: usize = 3;
const KEYWORD_DENSITY_RANGE: (f64, f64) = (0.5, 3.0);
const MIN_H2_COUNT: usize = 3;
const MIN_READING_EASE: f64 = 30.0;
const MAX_GRADE_LEVEL: f64 = 12.0;
const TITLE_LENGTH_RANGE: (usize, usize) = (30, 70);
const DESCRIPTION_LENGTH_RANGE: (usize, usize) = (100, 160);
const MIN_PARAGRAPHS: usize = 5;
const MIN_ALT_COVERAGE: f64 = 0.8;
const MIN_INTERNAL_LINKS: usize = 2;
const MAX_INTERNAL_LINKS: usize = 10;

pub(crate) fn word_count(article: &Article, analysis: &BodyAnalysis) -> CheckResult {
    const NAME: &str = "word-count";
    let target = article.target_word_count;
    if target == 0 {
        return CheckResult::pass(NAME, 100.0, "no word-count target set");
    }

    let actual = analysis.word_count;
    let ratio = actual as f64 / target as f64;
    if ratio < MIN_WORD_RATIO {
        let score = ratio / MIN_WORD_RATIO * 100.0;
        return CheckResult::fail(
            NAME,
            score,
            format!("{actual} words, below 80% of the {target}-word target"),
            Severity::Warning,
        );
    }
    if ratio > MAX_WORD_RATIO {
        return CheckResult::pass_with_warning(
            NAME,
            80.0,
            format!("{actual} words, more than 150% of the {target}-word target"),
        );
    }
    CheckResult::pass(NAME, 100.0, format!("{actual} words against a {target}-word target"))
}

pub(crate) fn keyword_usage(article: &Article, analysis: &BodyAnalysis) -> CheckResult {
    const NAME: &str = "keyword-usage";
    let occurrences = analysis.keyword_occurrences;
    let density = analysis.keyword_density();
    let (lo, hi) = KEYWORD_DENSITY_RANGE;

    let enough = occurrences >= MIN_KEYWORD_OCCURRENCES;
    let in_range = density >= lo && density <= hi;
    if enough && in_range {
        return CheckResult::pass(
            NAME,
            100.0,
            format!("keyword \"{}\" used {occurrences} times at {density:.1}% density", article.keyword),
        );
    }

    let score = if enough || in_range { 50.0 } else { 0.0 };
    CheckResult::fail(
        NAME,
        score,
        format!(
            "keyword \"{}\" used {occurrences} times at {density:.1}% density (need >={MIN_KEYWORD_OCCURRENCES} uses within {lo}%-{hi}%)",
            article.keyword
        ),
        Severity::Warning,
    )
}

pub(crate) fn heading_structure(analysis: &BodyAnalysis) -> CheckResult {
    const NAME: &str = "heading-structure";
    if analysis.h1_count > 1 {
        return CheckResult::fail(
            NAME,
            0.0,
            format!("{} top-level headings; exactly one is required", analysis.h1_count),
            Severity::Error,
        );
    }
    if analysis.h1_count == 0 {
        return CheckResult::fail(
            NAME,
            40.0,
            "no top-level heading",
            Severity::Warning,
        );
    }
    if analysis.h2_count < MIN_H2_COUNT {
        return CheckResult::fail(
            NAME,
            60.0,
            format!("{} second-level headings; at least {MIN_H2_COUNT} expected", analysis.h2_count),
            Severity::Warning,
        );
    }
    CheckResult::pass(
        NAME,
        100.0,
        format!("one top-level heading, {} second-level headings", analysis.h2_count),
    )
}

pub(crate) fn readability(analysis: &BodyAnalysis) -> CheckResult {
    const NAME: &str = "readability";
    let ease = analysis.flesch_reading_ease();
    let grade = analysis.flesch_kincaid_grade();

    if ease < MIN_READING_EASE || grade > MAX_GRADE_LEVEL {
        return CheckResult::fail(
            NAME,
            40.0,
            format!("reading ease {ease:.0}, grade level {grade:.1}; text is too dense"),
            Severity::Warning,
        );
    }
    let score = if ease >= 60.0 && grade <= 10.0 { 100.0 } else { 80.0 };
    CheckResult::pass(
        NAME,
        score,
        format!("reading ease {ease:.0}, grade level {grade:.1}"),
    )
}

pub(crate) fn meta_quality(article: &Article) -> CheckResult {
    const NAME: &str = "meta-quality";
    let Some(meta) = &article.meta else {
        return CheckResult::fail(NAME, 0.0, "article has no SEO metadata", Severity::Error);
    };

    let title_len = meta.title.chars().count();
    let desc_len = meta.description.chars().count();
    let title_ok = (TITLE_LENGTH_RANGE.0..=TITLE_LENGTH_RANGE.1).contains(&title_len);
    let desc_ok = (DESCRIPTION_LENGTH_RANGE.0..=DESCRIPTION_LENGTH_RANGE.1).contains(&desc_len);

    if title_ok && desc_ok {
        return CheckResult::pass(
            NAME,
            100.0,
            format!("title {title_len} chars, description {desc_len} chars"),
        );
    }
    CheckResult::fail(
        NAME,
        50.0,
        format!(
            "title {title_len} chars (want {}-{}), description {desc_len} chars (want {}-{})",
            TITLE_LENGTH_RANGE.0, TITLE_LENGTH_RANGE.1,
            DESCRIPTION_LENGTH_RANGE.0, DESCRIPTION_LENGTH_RANGE.1
        ),
        Severity::Warning,
    )
}

pub(crate) fn content_structure(analysis: &BodyAnalysis) -> CheckResult {
    const NAME: &str = "content-structure";
    let mut score = if analysis.paragraph_count >= MIN_PARAGRAPHS {
        70.0
    } else {
        analysis.paragraph_count as f64 / MIN_PARAGRAPHS as f64 * 70.0
    };
    if analysis.has_list {
        score += 15.0;
    }
    if analysis.has_blockquote {
        score += 15.0;
    }

    if analysis.paragraph_count < MIN_PARAGRAPHS {
        return CheckResult::fail(
            NAME,
            score,
            format!("{} paragraphs; at least {MIN_PARAGRAPHS} required", analysis.paragraph_count),
            Severity::Warning,
        );
    }
    CheckResult::pass(
        NAME,
        score,
        format!(
            "{} paragraphs, list: {}, blockquote: {}",
            analysis.paragraph_count, analysis.has_list, analysis.has_blockquote
        ),
    )
}

pub(crate) fn image_alt_text(analysis: &BodyAnalysis) -> CheckResult {
    const NAME: &str = "image-alt-text";
    if analysis.image_count == 0 {
        return CheckResult::pass(NAME, 100.0, "no images present");
    }

    let coverage = analysis.images_with_alt as f64 / analysis.image_count as f64;
    let message = format!(
        "{} of {} images carry alt text",
        analysis.images_with_alt, analysis.image_count
    );
    if coverage >= MIN_ALT_COVERAGE {
        CheckResult::pass(NAME, coverage * 100.0, message)
    } else {
        CheckResult::fail(NAME, coverage * 100.0, message, Severity::Warning)
    }
}

pub(crate) fn internal_links(analysis: &BodyAnalysis) -> CheckResult {
    const NAME: &str = "internal-links";
    let count = analysis.internal_link_count;
    if count < MIN_INTERNAL_LINKS {
        return CheckResult::fail(
            NAME,
            count as f64 / MIN_INTERNAL_LINKS as f64 * 100.0,
            format!("{count} internal links; at least {MIN_INTERNAL_LINKS} expected"),
            Severity::Warning,
        );
    }
    if count > MAX_INTERNAL_LINKS {
        return CheckResult::pass_with_warning(
            NAME,
            80.0,
            format!("{count} internal links; more than {MAX_INTERNAL_LINKS} reads as link stuffing"),
        );
    }
    CheckResult::pass(NAME, 100.0, format!("{count} internal links"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn analyze(article: &Article) -> BodyAnalysis {
        BodyAnalysis::of(&article.body, &article.keyword, article.site_host.as_deref())
    }

    #[test]
    fn test_word_count_boundaries() {
        let body = format!("<p>{}</p>", vec!["word"; 80].join(" "));
        let article = Article::new(body, "word", 100);
        let result = word_count(&article, &analyze(&article));
        assert!(result.passed);
        assert_eq!(result.score, 100.0);

        let short = Article::new("<p>too short</p>", "word", 100);
        let result = word_count(&short, &analyze(&short));
        assert!(!result.passed);
        assert_eq!(result.severity, Severity::Warning);

        let long = Article::new(format!("<p>{}</p>", vec!["word"; 200].join(" ")), "word", 100);
        let result = word_count(&long, &analyze(&long));
        assert!(result.passed);
        assert_eq!(result.severity, Severity::Warning);
    }

    #[test]
    fn test_keyword_usage_requires_both_conditions() {
        // 3 occurrences in 200 words = 1.5% density.
        let mut words = vec!["filler"; 197];
        words.extend(["rust", "rust", "rust"]);
        let article = Article::new(format!("<p>{}</p>", words.join(" ")), "rust", 200);
        let result = keyword_usage(&article, &analyze(&article));
        assert!(result.passed);

        // 2 occurrences: count too low even though density is fine.
        let article = Article::new("<p>rust is rust</p>", "rust", 3);
        let result = keyword_usage(&article, &analyze(&article));
        assert!(!result.passed);
        assert_eq!(result.score, 0.0);
    }

    #[test]
    fn test_multiple_h1_is_a_blocker() {
        let article = Article::new("<h1>One</h1><h1>Two</h1>", "kw", 10);
        let result = heading_structure(&analyze(&article));
        assert!(result.is_blocker());
        assert_eq!(result.score, 0.0);
    }

    #[test]
    fn test_too_few_h2_is_only_a_warning() {
        let article = Article::new("<h1>One</h1><h2>A</h2>", "kw", 10);
        let result = heading_structure(&analyze(&article));
        assert!(!result.passed);
        assert_eq!(result.severity, Severity::Warning);
        assert!(!result.is_blocker());
    }

    #[test]
    fn test_missing_meta_is_a_blocker() {
        let article = Article::new("<p>body</p>", "kw", 10);
        let result = meta_quality(&article);
        assert!(result.is_blocker());

        let with_meta = article.with_meta(
            "A Title That Lands Between Thirty And Seventy",
            "A description that is deliberately padded out until it comfortably \
             exceeds the one hundred character floor for descriptions.",
        );
        assert!(meta_quality(&with_meta).passed);
    }

    #[test]
    fn test_content_structure_partial_credit() {
        let five = "<p>a</p>".repeat(5);
        let article = Article::new(five.clone(), "kw", 10);
        let result = content_structure(&analyze(&article));
        assert!(result.passed);
        assert_eq!(result.score, 70.0);

        let rich = Article::new(format!("{five}<ul><li>x</li></ul><blockquote>q</blockquote>"), "kw", 10);
        let result = content_structure(&analyze(&rich));
        assert_eq!(result.score, 100.0);
    }

    #[test]
    fn test_no_images_passes_trivially() {
        let article = Article::new("<p>plain text</p>", "kw", 10);
        let result = image_alt_text(&analyze(&article));
        assert!(result.passed);
        assert_eq!(result.score, 100.0);
    }

    #[test]
    fn test_alt_coverage_threshold() {
        let body = r#"<img src="a" alt="a"><img src="b" alt="b"><img src="c" alt="c"><img src="d" alt="d"><img src="e">"#;
        let article = Article::new(body, "kw", 10);
        let result = image_alt_text(&analyze(&article));
        assert!(result.passed);
        assert_eq!(result.score, 80.0);
    }

    #[test]
    fn test_internal_link_bounds() {
        let article = Article::new(r#"<a href="/a">a</a><a href="/b">b</a>"#, "kw", 10);
        assert!(internal_links(&analyze(&article)).passed);

        let one = Article::new(r#"<a href="/a">a</a>"#, "kw", 10);
        let result = internal_links(&analyze(&one));
        assert!(!result.passed);
        assert_eq!(result.score, 50.0);

        let many: String = (0..11).map(|i| format!(r#"<a href="/p{i}">x</a>"#)).collect();
        let result = internal_links(&analyze(&Article::new(many, "kw", 10)));
        assert!(result.passed);
        assert_eq!(result.severity, Severity::Warning);
    }
}
