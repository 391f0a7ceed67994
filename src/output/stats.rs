//! Statistics over a finished scan batch
//!
//! This module tallies records and skips into a summary and prints it.

use crate::scanner::{Platform, ScanBatchResult};
use std::collections::BTreeMap;

/// Scan statistics summary
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScanStatistics {
    /// Number of targets attempted
    pub attempted: usize,

    /// Number of records produced
    pub scanned: usize,

    /// Number of targets skipped
    pub skipped: usize,

    /// Records with at least one program link
    pub sites_with_program_links: usize,

    /// Total program links across records
    pub total_program_links: usize,

    /// Records with at least one link, per platform
    pub sites_per_platform: BTreeMap<Platform, usize>,

    /// Skip counts per failure kind
    pub skip_reasons: BTreeMap<&'static str, usize>,
}

impl ScanStatistics {
    /// Tallies a batch
    pub fn from_batch(batch: &ScanBatchResult) -> Self {
        let mut stats = Self {
            attempted: batch.attempted,
            scanned: batch.records.len(),
            skipped: batch.skipped.len(),
            ..Self::default()
        };

        for record in &batch.records {
            if record.has_program_links() {
                stats.sites_with_program_links += 1;
            }
            stats.total_program_links += record.program_links.len();

            for (platform, links) in &record.social_links {
                if !links.is_empty() {
                    *stats.sites_per_platform.entry(*platform).or_insert(0) += 1;
                }
            }
        }

        for skip in &batch.skipped {
            *stats.skip_reasons.entry(skip.kind).or_insert(0) += 1;
        }

        stats
    }

    /// Share of attempted targets that produced a record, as a percentage
    pub fn success_rate(&self) -> f64 {
        if self.attempted == 0 {
            return 0.0;
        }
        (self.scanned as f64 / self.attempted as f64) * 100.0
    }
}

/// Prints statistics to stdout in a formatted manner
///
/// # Arguments
///
/// * `stats` - The statistics to display
pub fn print_statistics(stats: &ScanStatistics) {
    println!("=== Scan Statistics ===\n");

    println!("Overview:");
    println!("  Sites attempted: {}", stats.attempted);
    println!("  Sites scanned: {}", stats.scanned);
    println!("  Sites skipped: {}", stats.skipped);
    println!();

    println!("Program Links:");
    println!("  Sites with program links: {}", stats.sites_with_program_links);
    println!("  Total program links: {}", stats.total_program_links);
    println!();

    println!("Social Profiles:");
    for platform in Platform::ALL {
        let count = stats.sites_per_platform.get(&platform).copied().unwrap_or(0);
        println!("  {}: {} sites", platform.label(), count);
    }
    println!();

    if !stats.skip_reasons.is_empty() {
        println!("Skip Reasons:");
        let mut reasons: Vec<_> = stats.skip_reasons.iter().collect();
        reasons.sort_by(|a, b| b.1.cmp(a.1));

        for (kind, count) in reasons {
            println!("  {}: {}", kind, count);
        }
        println!();
    }

    println!(
        "Success Rate: {:.1}% ({} / {} sites scanned)",
        stats.success_rate(),
        stats.scanned,
        stats.attempted
    );
}
