use crate::scanner::classifier::Platform;
use crate::scanner::metadata::PageMetadata;
use std::collections::{BTreeMap, BTreeSet};
use url::Url;

/// Output of link classification for one page
///
/// Platforms with no links are absent from `social_links`; an empty set is
/// never stored.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClassifiedLinks {
    pub program_links: BTreeSet<Url>,
    pub social_links: BTreeMap<Platform, BTreeSet<Url>>,
}

impl ClassifiedLinks {
    /// Adds a social link under its platform
    pub fn insert_social(&mut self, platform: Platform, url: Url) {
        self.social_links.entry(platform).or_default().insert(url);
    }

    /// Whether any link was found for `platform`
    pub fn has_platform(&self, platform: Platform) -> bool {
        self.social_links
            .get(&platform)
            .is_some_and(|links| !links.is_empty())
    }

    /// Every classified URL, program links first
    pub fn all_urls(&self) -> impl Iterator<Item = &Url> {
        self.program_links
            .iter()
            .chain(self.social_links.values().flatten())
    }
}

/// The scan result for one website
///
/// Built once by the site scanner and never modified afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SiteRecord {
    /// Normalized target URL that was scanned
    pub url: String,

    pub display_name: String,

    pub meta_description: String,

    pub program_links: BTreeSet<Url>,

    pub social_links: BTreeMap<Platform, BTreeSet<Url>>,
}

impl SiteRecord {
    pub fn new(url: String, metadata: PageMetadata, links: ClassifiedLinks) -> Self {
        Self {
            url,
            display_name: metadata.display_name,
            meta_description: metadata.meta_description,
            program_links: links.program_links,
            social_links: links.social_links,
        }
    }

    /// Links for one platform, empty when none were found
    pub fn social_for(&self, platform: Platform) -> impl Iterator<Item = &Url> {
        self.social_links.get(&platform).into_iter().flatten()
    }

    /// Total number of social links across platforms
    pub fn social_link_count(&self) -> usize {
        self.social_links.values().map(BTreeSet::len).sum()
    }

    /// Whether the site yielded at least one program link
    pub fn has_program_links(&self) -> bool {
        !self.program_links.is_empty()
    }
}
