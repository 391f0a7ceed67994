//! Link classification
//!
//! Buckets extracted links into program/partnership links and social-profile
//! links. Both rule sets are tables of patterns, so a new keyword or platform
//! is a new row rather than a new branch.
//!
//! Matching deliberately favors recall: every hit is reviewed by a person
//! downstream, and a missed affiliate program costs more than a stray link.

use crate::config::ClassifierConfig;
use crate::scanner::parser::LinkCandidate;
use crate::scanner::record::ClassifiedLinks;
use crate::url::{is_absolute_web_url, normalize_target};
use crate::ConfigError;
use regex::Regex;
use serde::Deserialize;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::str::FromStr;
use url::Url;

/// Keywords that mark a link as leading to a partnership program
pub const DEFAULT_PROGRAM_KEYWORDS: &[&str] = &[
    "affiliate",
    "brand ambassador",
    "influencer program",
    "partner program",
    "partnership program",
    "collaboration",
];

/// Separator accepted between the words of a multi-word keyword
const KEYWORD_SEPARATOR: &str = r"(?:\s+|[-_+]|%20)";

/// Social platforms recognized by the scanner
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Facebook,
    Instagram,
    Twitter,
    Linkedin,
    Youtube,
    Tiktok,
}

impl Platform {
    /// Every platform, in report column order
    pub const ALL: [Platform; 6] = [
        Platform::Facebook,
        Platform::Instagram,
        Platform::Twitter,
        Platform::Linkedin,
        Platform::Youtube,
        Platform::Tiktok,
    ];

    /// Lowercase key used in config and logs
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Facebook => "facebook",
            Self::Instagram => "instagram",
            Self::Twitter => "twitter",
            Self::Linkedin => "linkedin",
            Self::Youtube => "youtube",
            Self::Tiktok => "tiktok",
        }
    }

    /// Capitalized name used in report headers
    pub fn label(&self) -> &'static str {
        match self {
            Self::Facebook => "Facebook",
            Self::Instagram => "Instagram",
            Self::Twitter => "Twitter",
            Self::Linkedin => "Linkedin",
            Self::Youtube => "Youtube",
            Self::Tiktok => "Tiktok",
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Platform {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Platform::ALL
            .into_iter()
            .find(|p| p.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("unknown platform '{}'", s))
    }
}

/// Platform domain and handle patterns
///
/// `(platform, domain, handle)`; the domain must start on a word boundary so
/// `notfacebook.com` and `box.com` do not count.
///
/// Only TikTok handles take an `@`. YouTube's `youtube.com/@handle` profile
/// form is therefore not recognized; `/channel/`, `/c/` and `/user/` paths are.
const SOCIAL_PATTERNS: &[(Platform, &str, &str)] = &[
    (Platform::Facebook, r"facebook\.com", r"[\w.\-]+"),
    (Platform::Instagram, r"instagram\.com", r"[\w.\-]+"),
    (Platform::Twitter, r"(?:twitter|x)\.com", r"[\w.\-]+"),
    (Platform::Linkedin, r"linkedin\.com", r"[\w.\-]+"),
    (Platform::Youtube, r"youtube\.com", r"[\w.\-]+"),
    (Platform::Tiktok, r"tiktok\.com", r"@[\w.\-]+"),
];

struct ProgramRule {
    keyword: String,
    regex: Regex,
}

struct SocialRule {
    platform: Platform,
    link: Regex,
    text: Regex,
}

/// Compiled classification tables
pub struct LinkClassifier {
    program_rules: Vec<ProgramRule>,
    social_rules: Vec<SocialRule>,
    fallback_platform: Platform,
}

impl fmt::Debug for LinkClassifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LinkClassifier")
            .field(
                "program_keywords",
                &self
                    .program_rules
                    .iter()
                    .map(|r| r.keyword.as_str())
                    .collect::<Vec<_>>(),
            )
            .field("platforms", &self.social_rules.len())
            .field("fallback_platform", &self.fallback_platform)
            .finish()
    }
}

impl LinkClassifier {
    /// Builds a classifier from explicit keyword and fallback settings
    ///
    /// # Returns
    ///
    /// * `Ok(LinkClassifier)` - All patterns compiled
    /// * `Err(ConfigError::InvalidPattern)` - A keyword produced an unusable pattern
    pub fn new<S: AsRef<str>>(
        program_keywords: &[S],
        fallback_platform: Platform,
    ) -> Result<Self, ConfigError> {
        let program_rules = program_keywords
            .iter()
            .map(|k| compile_keyword(k.as_ref()))
            .collect::<Result<Vec<_>, _>>()?;

        let social_rules = SOCIAL_PATTERNS
            .iter()
            .map(|(platform, domain, handle)| compile_social(*platform, domain, handle))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            program_rules,
            social_rules,
            fallback_platform,
        })
    }

    /// Builds a classifier from the `[classifier]` config section
    pub fn from_config(config: &ClassifierConfig) -> Result<Self, ConfigError> {
        Self::new(&config.program_keywords, config.fallback_platform)
    }

    /// Platform searched in page text when links yield nothing for it
    pub fn fallback_platform(&self) -> Platform {
        self.fallback_platform
    }

    /// Returns the keyword a link matches on, checking anchor text then href
    pub fn program_match(&self, link: &LinkCandidate) -> Option<&str> {
        self.program_rules
            .iter()
            .find(|rule| rule.regex.is_match(&link.text) || rule.regex.is_match(&link.href))
            .map(|rule| rule.keyword.as_str())
    }

    /// Collects links whose anchor text or href contains a program keyword
    ///
    /// Matching is case-insensitive; a link matching on its text alone counts.
    pub fn classify_program_links(&self, links: &[LinkCandidate]) -> BTreeSet<Url> {
        let mut matched = BTreeSet::new();

        for link in links {
            if let Some(keyword) = self.program_match(link) {
                tracing::trace!("Program link {} (keyword '{}')", link.url, keyword);
                matched.insert(link.url.clone());
            }
        }

        matched
    }

    /// Returns every platform whose pattern a link satisfies
    pub fn social_matches<'a>(
        &'a self,
        link: &'a LinkCandidate,
    ) -> impl Iterator<Item = Platform> + 'a {
        self.social_rules
            .iter()
            .filter(move |rule| rule.link.is_match(&link.href) || rule.link.is_match(link.url.as_str()))
            .map(|rule| rule.platform)
    }

    /// Groups social-profile links by platform
    ///
    /// All platform patterns are evaluated independently for every link.
    /// Platforms without a match are absent from the map.
    pub fn classify_social_links(&self, links: &[LinkCandidate]) -> BTreeMap<Platform, BTreeSet<Url>> {
        let mut social: BTreeMap<Platform, BTreeSet<Url>> = BTreeMap::new();

        for link in links {
            for platform in self.social_matches(link) {
                social.entry(platform).or_default().insert(link.url.clone());
            }
        }

        social
    }

    /// Searches free text for a profile of the fallback platform
    ///
    /// Catches handles written out in prose, e.g. "find us at instagram.com/acme".
    /// The first match is returned as an absolute `https://` URL.
    pub fn classify_text_fallback(&self, text: &str) -> Option<Url> {
        let rule = self
            .social_rules
            .iter()
            .find(|rule| rule.platform == self.fallback_platform)?;

        rule.text.find_iter(text).find_map(|m| {
            let candidate = m.as_str().trim_end_matches(['.', '-']);
            Url::parse(&normalize_target(candidate))
                .ok()
                .filter(is_absolute_web_url)
        })
    }

    /// Runs both link rule sets
    pub fn classify(&self, links: &[LinkCandidate]) -> ClassifiedLinks {
        ClassifiedLinks {
            program_links: self.classify_program_links(links),
            social_links: self.classify_social_links(links),
        }
    }
}

fn compile_keyword(keyword: &str) -> Result<ProgramRule, ConfigError> {
    let words: Vec<String> = keyword.split_whitespace().map(regex::escape).collect();
    if words.is_empty() {
        return Err(ConfigError::InvalidPattern(format!(
            "keyword '{}' has no words",
            keyword
        )));
    }

    let pattern = format!("(?i){}", words.join(KEYWORD_SEPARATOR));
    let regex = Regex::new(&pattern)
        .map_err(|e| ConfigError::InvalidPattern(format!("{}: {}", keyword, e)))?;

    Ok(ProgramRule {
        keyword: keyword.trim().to_string(),
        regex,
    })
}

fn compile_social(platform: Platform, domain: &str, handle: &str) -> Result<SocialRule, ConfigError> {
    let link = Regex::new(&format!(r"(?i)\b{}/{}", domain, handle))
        .map_err(|e| ConfigError::InvalidPattern(format!("{}: {}", platform, e)))?;
    let text = Regex::new(&format!(r"(?i)(?:https?://)?(?:www\.)?\b{}/{}", domain, handle))
        .map_err(|e| ConfigError::InvalidPattern(format!("{}: {}", platform, e)))?;

    Ok(SocialRule {
        platform,
        link,
        text,
    })
}
