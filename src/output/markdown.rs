//! Markdown summary generation
//!
//! This module generates a human-readable markdown summary of a scan,
//! including statistics, skipped sites, and per-site findings.

use crate::output::stats::ScanStatistics;
use crate::output::traits::{ExportError, ExportResult, ReportSink, RunInfo};
use crate::scanner::{Platform, ScanBatchResult};
use std::path::PathBuf;

/// Writes the summary to a fixed path
#[derive(Debug, Clone)]
pub struct MarkdownSummary {
    path: PathBuf,
}

impl MarkdownSummary {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl ReportSink for MarkdownSummary {
    fn name(&self) -> &str {
        "markdown"
    }

    fn export(&self, batch: &ScanBatchResult, run: &RunInfo) -> ExportResult<PathBuf> {
        let markdown = format_markdown_summary(batch, run);

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|source| ExportError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
        }

        std::fs::write(&self.path, markdown).map_err(|source| ExportError::Io {
            path: self.path.clone(),
            source,
        })?;

        tracing::info!("Wrote summary to {}", self.path.display());
        Ok(self.path.clone())
    }
}

/// Formats a scan batch as markdown
///
/// # Arguments
///
/// * `batch` - The scan results
/// * `run` - Run timing and provenance
///
/// # Returns
///
/// A formatted markdown string
pub fn format_markdown_summary(batch: &ScanBatchResult, run: &RunInfo) -> String {
    let stats = ScanStatistics::from_batch(batch);
    let mut md = String::new();

    md.push_str("# Affiliate-Scout Scan Summary\n\n");

    // Run metadata
    md.push_str("## Run Information\n\n");
    md.push_str(&format!("- **Started**: {}\n", run.started_at.to_rfc3339()));
    md.push_str(&format!("- **Finished**: {}\n", run.finished_at.to_rfc3339()));
    md.push_str(&format!(
        "- **Duration**: {} seconds ({:.2} minutes)\n",
        run.duration_seconds(),
        run.duration_seconds() as f64 / 60.0
    ));
    md.push_str(&format!("- **Source**: {}\n", run.source));
    if let Some(hash) = &run.config_hash {
        md.push_str(&format!("- **Config Hash**: {}\n", hash));
    }
    md.push('\n');

    // Overall statistics
    md.push_str("## Overall Statistics\n\n");
    md.push_str(&format!("- **Sites Attempted**: {}\n", stats.attempted));
    md.push_str(&format!("- **Sites Scanned**: {}\n", stats.scanned));
    md.push_str(&format!("- **Sites Skipped**: {}\n", stats.skipped));
    md.push_str(&format!(
        "- **Sites With Program Links**: {}\n",
        stats.sites_with_program_links
    ));
    md.push_str(&format!("- **Success Rate**: {:.2}%\n\n", stats.success_rate()));

    md.push_str("## Social Profiles\n\n");
    md.push_str("| Platform | Sites |\n");
    md.push_str("|----------|-------|\n");
    for platform in Platform::ALL {
        let count = stats.sites_per_platform.get(&platform).copied().unwrap_or(0);
        md.push_str(&format!("| {} | {} |\n", platform.label(), count));
    }
    md.push('\n');

    if !batch.skipped.is_empty() {
        md.push_str("## Skipped Sites\n\n");
        md.push_str("| URL | Kind | Reason |\n");
        md.push_str("|-----|------|--------|\n");
        for skip in &batch.skipped {
            md.push_str(&format!(
                "| {} | {} | {} |\n",
                escape_cell(&skip.url),
                skip.kind,
                escape_cell(&skip.reason)
            ));
        }
        md.push('\n');
    }

    if !batch.records.is_empty() {
        md.push_str("## Findings\n\n");
        for record in &batch.records {
            md.push_str(&format!("### {}\n\n", record.display_name));
            md.push_str(&format!("- **URL**: {}\n", record.url));
            if !record.meta_description.is_empty() {
                md.push_str(&format!("- **Description**: {}\n", record.meta_description));
            }

            if record.program_links.is_empty() {
                md.push_str("- **Program Links**: none\n");
            } else {
                md.push_str("- **Program Links**:\n");
                for link in &record.program_links {
                    md.push_str(&format!("  - {}\n", link));
                }
            }

            for (platform, links) in &record.social_links {
                let joined = links.iter().map(|u| u.as_str()).collect::<Vec<_>>().join(", ");
                md.push_str(&format!("- **{}**: {}\n", platform.label(), joined));
            }
            md.push('\n');
        }
    }

    md
}

fn escape_cell(text: &str) -> String {
    text.replace('|', "\\|").replace('\n', " ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scanner::{SiteRecord, SkippedSite};
    use chrono::{TimeZone, Utc};
    use std::collections::{BTreeMap, BTreeSet};
    use tempfile::TempDir;
    use url::Url;

    fn run_info() -> RunInfo {
        RunInfo {
            started_at: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
            finished_at: Utc.with_ymd_and_hms(2024, 1, 1, 0, 2, 0).unwrap(),
            config_hash: Some("abc123".to_string()),
            source: "sites.csv (column 'website_url')".to_string(),
        }
    }

    fn batch() -> ScanBatchResult {
        let mut social = BTreeMap::new();
        social.insert(
            Platform::Instagram,
            BTreeSet::from([Url::parse("https://instagram.com/acme").unwrap()]),
        );

        ScanBatchResult {
            records: vec![SiteRecord {
                url: "https://acme.example".to_string(),
                display_name: "Acme Co".to_string(),
                meta_description: "Outdoor gear".to_string(),
                program_links: BTreeSet::from([Url::parse("https://acme.example/affiliate").unwrap()]),
                social_links: social,
            }],
            skipped: vec![SkippedSite {
                url: "badhost.invalid".to_string(),
                kind: "connect",
                reason: "Could not connect | dns error".to_string(),
            }],
            attempted: 2,
        }
    }

    #[test]
    fn test_format_markdown_summary() {
        let markdown = format_markdown_summary(&batch(), &run_info());

        assert!(markdown.contains("# Affiliate-Scout Scan Summary"));
        assert!(markdown.contains("- **Duration**: 120 seconds"));
        assert!(markdown.contains("- **Config Hash**: abc123"));
        assert!(markdown.contains("- **Sites Attempted**: 2"));
        assert!(markdown.contains("| Instagram | 1 |"));
    }

    #[test]
    fn test_markdown_lists_skips_and_findings() {
        let markdown = format_markdown_summary(&batch(), &run_info());

        assert!(markdown.contains("## Skipped Sites"));
        assert!(markdown.contains("Could not connect \\| dns error"));
        assert!(markdown.contains("### Acme Co"));
        assert!(markdown.contains("  - https://acme.example/affiliate"));
        assert!(markdown.contains("- **Instagram**: https://instagram.com/acme"));
    }

    #[test]
    fn test_markdown_empty_batch() {
        let markdown = format_markdown_summary(&ScanBatchResult::default(), &run_info());
        assert!(!markdown.contains("## Skipped Sites"));
        assert!(!markdown.contains("## Findings"));
    }

    #[test]
    fn test_export_writes_file() {
        let dir = TempDir::new().unwrap();
        let sink = MarkdownSummary::new(dir.path().join("out/summary.md"));
        let path = sink.export(&batch(), &run_info()).unwrap();

        let text = std::fs::read_to_string(path).unwrap();
        assert!(text.contains("Acme Co"));
    }
}
