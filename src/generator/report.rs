//! Markdown run report and JSON statistics export

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt::Write;
use strum::IntoEnumIterator;

use crate::config::ProcessingConfig;
use crate::errors::AppResult;
use crate::models::{ProcessingResult, ProcessingStats, Quality};
use crate::sources::ParseStats;

/// Machine-readable companion of the Markdown report
#[derive(Debug, Serialize)]
pub struct StatsExport<'a> {
    pub generated_at: DateTime<Utc>,
    pub stats: &'a ProcessingStats,
    pub import: &'a ParseStats,
}

pub struct ReportGenerator<'a> {
    processing: &'a ProcessingConfig,
}

impl<'a> ReportGenerator<'a> {
    pub fn new(processing: &'a ProcessingConfig) -> Self {
        Self { processing }
    }

    pub fn render_markdown(
        &self,
        result: &ProcessingResult,
        import: &ParseStats,
        generated_at: DateTime<Utc>,
    ) -> String {
        let stats = &result.stats;
        let mut report = String::new();

        // Writing into a String cannot fail
        let _ = writeln!(report, "# Channel Processing Report");
        let _ = writeln!(
            report,
            "**Generated:** {}\n",
            generated_at.format("%Y-%m-%d %H:%M:%S UTC")
        );

        let _ = writeln!(report, "## Summary Statistics");
        let _ = writeln!(report, "- **Entries processed:** {}", stats.input_entries);
        let _ = writeln!(report, "- **Channels kept:** {}", stats.total_entries);
        let _ = writeln!(report, "- **Duplicates removed:** {}", stats.duplicates_removed);
        let _ = writeln!(report, "- **Rejected:** {}", stats.rejected);
        let _ = writeln!(report, "- **Countries detected:** {}", stats.countries_detected());
        let _ = writeln!(
            report,
            "- **Imported entries:** {} ({} glued or stray EXTINF lines fixed)",
            import.entries, import.malformed_fixed
        );
        report.push('\n');

        if !stats.per_country.is_empty() {
            let mut countries: Vec<(&String, &usize)> = stats.per_country.iter().collect();
            countries.sort_by(|a, b| b.1.cmp(a.1).then_with(|| a.0.cmp(b.0)));

            let _ = writeln!(report, "## Channel Distribution by Country");
            for (country, count) in countries {
                let _ = writeln!(report, "- **{}:** {} channels", country, count);
            }
            report.push('\n');
        }

        if !stats.per_quality.is_empty() {
            let _ = writeln!(report, "## Channel Distribution by Quality");
            // Every tier, best first, zero counts included
            for quality in Quality::iter().rev() {
                let count = stats.per_quality.get(&quality).copied().unwrap_or(0);
                let _ = writeln!(report, "- **{}:** {} channels", quality, count);
            }
            report.push('\n');
        }

        if !result.rejections.is_empty() {
            let _ = writeln!(report, "## Rejected Entries");
            for (reason, count) in &stats.rejected_by_reason {
                let _ = writeln!(report, "- **{}:** {}", reason, count);
            }
            report.push('\n');

            let limit = self.processing.max_rejections_in_report;
            if limit > 0 {
                let _ = writeln!(report, "### First {} Rejections", limit.min(result.rejections.len()));
                for rejected in result.rejections.iter().take(limit) {
                    let _ = writeln!(report, "- `{}`: {}", rejected.display_name(), rejected.reason);
                }
                if result.rejections.len() > limit {
                    let _ = writeln!(report, "- ... and {} more", result.rejections.len() - limit);
                }
                report.push('\n');
            }
        }

        let _ = writeln!(report, "## Configuration");
        let _ = writeln!(report, "- **Remove duplicates:** {}", self.processing.remove_duplicates);
        let _ = writeln!(report, "- **Quality detection:** {}", self.processing.detect_quality);
        let _ = writeln!(report, "- **Quality tags in titles:** {}", self.processing.append_quality_tag);
        let _ = writeln!(report, "- **Adult content filtering:** {}", self.processing.skip_adult_content);
        let _ = writeln!(
            report,
            "- **Minimum name length:** {}",
            self.processing.min_channel_name_length
        );
        let _ = writeln!(
            report,
            "- **Allowed URL schemes:** {}",
            if self.processing.allowed_schemes.is_empty() {
                "any".to_string()
            } else {
                self.processing.allowed_schemes.join(", ")
            }
        );

        report
    }

    pub fn render_json_stats(
        &self,
        stats: &ProcessingStats,
        import: &ParseStats,
        generated_at: DateTime<Utc>,
    ) -> AppResult<String> {
        let export = StatsExport {
            generated_at,
            stats,
            import,
        };
        Ok(serde_json::to_string_pretty(&export)?)
    }
}
