//! Structural analysis of rendered article HTML.

use std::sync::OnceLock;

use regex::Regex;
use url::Url;

fn tag_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"<[^>]+>").expect("valid tag regex"))
}

fn h1_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)<h1[\s>]").expect("valid h1 regex"))
}

fn h2_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)<h2[\s>]").expect("valid h2 regex"))
}

fn paragraph_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)<p[\s>]").expect("valid paragraph regex"))
}

fn list_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)<(ul|ol)[\s>]").expect("valid list regex"))
}

fn blockquote_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)<blockquote[\s>]").expect("valid blockquote regex"))
}

fn image_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)<img[^>]*>").expect("valid image regex"))
}

fn alt_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r#"(?i)alt\s*=\s*"([^"]*)""#).expect("valid alt regex"))
}

fn href_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r#"(?i)<a[^>]*href\s*=\s*"([^"]*)""#).expect("valid href regex"))
}

/// Everything the checks need, computed in one pass over the body.
#[derive(Debug, Clone)]
pub(crate) struct BodyAnalysis {
    pub word_count: usize,
    pub sentence_count: usize,
    pub syllable_count: usize,
    pub keyword_occurrences: usize,
    pub h1_count: usize,
    pub h2_count: usize,
    pub paragraph_count: usize,
    pub has_list: bool,
    pub has_blockquote: bool,
    pub image_count: usize,
    pub images_with_alt: usize,
    pub internal_link_count: usize,
}

impl BodyAnalysis {
    pub(crate) fn of(body: &str, keyword: &str, site_host: Option<&str>) -> Self {
        let text = strip_tags(body);
        let words: Vec<&str> = text.split_whitespace().collect();
        let word_count = words.len();
        let syllable_count = words.iter().map(|w| syllables(w)).sum();
        let sentence_count = text
            .split(['.', '!', '?'])
            .filter(|s| s.split_whitespace().next().is_some())
            .count()
            .max(1);

        let keyword_occurrences = if keyword.is_empty() {
            0
        } else {
            text.to_lowercase().matches(&keyword.to_lowercase()).count()
        };

        let images: Vec<&str> = image_regex().find_iter(body).map(|m| m.as_str()).collect();
        let images_with_alt = images
            .iter()
            .filter(|img| {
                alt_regex()
                    .captures(img)
                    .is_some_and(|c| !c[1].trim().is_empty())
            })
            .count();

        let internal_link_count = href_regex()
            .captures_iter(body)
            .filter(|c| is_internal_link(&c[1], site_host))
            .count();

        Self {
            word_count,
            sentence_count,
            syllable_count,
            keyword_occurrences,
            h1_count: h1_regex().find_iter(body).count(),
            h2_count: h2_regex().find_iter(body).count(),
            paragraph_count: paragraph_regex().find_iter(body).count(),
            has_list: list_regex().is_match(body),
            has_blockquote: blockquote_regex().is_match(body),
            image_count: images.len(),
            images_with_alt,
            internal_link_count,
        }
    }

    /// Keyword occurrences as a percentage of total words.
    pub(crate) fn keyword_density(&self) -> f64 {
        if self.word_count == 0 {
            return 0.0;
        }
        self.keyword_occurrences as f64 / self.word_count as f64 * 100.0
    }

    pub(crate) fn flesch_reading_ease(&self) -> f64 {
        if self.word_count == 0 {
            return 0.0;
        }
        let wps = self.word_count as f64 / self.sentence_count as f64;
        let spw = self.syllable_count as f64 / self.word_count as f64;
        206.835 - 1.015 * wps - 84.6 * spw
    }

    pub(crate) fn flesch_kincaid_grade(&self) -> f64 {
        if self.word_count == 0 {
            return 0.0;
        }
        let wps = self.word_count as f64 / self.sentence_count as f64;
        let spw = self.syllable_count as f64 / self.word_count as f64;
        0.39 * wps + 11.8 * spw - 15.59
    }
}

pub(crate) fn strip_tags(html: &str) -> String {
    tag_regex().replace_all(html, " ").into_owned()
}

/// Relative hrefs are internal; absolute hrefs are internal only when they
/// point at the publishing site's host.
fn is_internal_link(href: &str, site_host: Option<&str>) -> bool {
    if href.starts_with('#') || href.starts_with('/') {
        return true;
    }
    match Url::parse(href) {
        Ok(url) => match (url.host_str(), site_host) {
            (Some(link_host), Some(host)) => link_host.eq_ignore_ascii_case(host),
            _ => false,
        },
        // Not absolute, not a fragment: treat bare relative paths as internal.
        Err(_) => !href.is_empty(),
    }
}

/// Heuristic syllable count: vowel groups, minus a silent trailing 'e',
/// floored at one.
fn syllables(word: &str) -> usize {
    let w: String = word
        .chars()
        .filter(|c| c.is_ascii_alphabetic())
        .collect::<String>()
        .to_lowercase();
    if w.is_empty() {
        return 0;
    }

    let mut count = 0usize;
    let mut prev_vowel = false;
    for c in w.chars() {
        let vowel = matches!(c, 'a' | 'e' | 'i' | 'o' | 'u' | 'y');
        if vowel && !prev_vowel {
            count += 1;
        }
        prev_vowel = vowel;
    }
    if w.ends_with('e') && !w.ends_with("le") && count > 1 {
        count -= 1;
    }
    count.max(1)
}
