//! Harvest run statistics
//!
//! Counts what a run wrote and records the failures it skipped past, so
//! they can be reported once the run finishes.

use std::fmt;

/// Stage of the harvest a failure happened in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HarvestStage {
    Comments,
    Videos,
    Channels,
}

impl fmt::Display for HarvestStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Comments => f.write_str("comments"),
            Self::Videos => f.write_str("videos"),
            Self::Channels => f.write_str("channels"),
        }
    }
}

/// A failure that was logged and skipped
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HarvestFailure {
    pub stage: HarvestStage,
    /// Video ID, batch query or username the failure belongs to
    pub target: String,
    pub message: String,
}

/// Summary of a harvest run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HarvestSummary {
    /// Distinct seed video IDs after merging all sources
    pub seed_count: usize,

    /// Seed IDs skipped because the video table already had them
    pub skipped_existing: usize,

    pub comments_written: usize,
    pub videos_written: usize,
    pub channels_written: usize,

    /// Videos whose comment listing reported comments disabled
    pub comments_disabled: Vec<String>,

    pub failures: Vec<HarvestFailure>,
}

impl HarvestSummary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a skipped failure
    pub fn record_failure(
        &mut self,
        stage: HarvestStage,
        target: impl Into<String>,
        message: impl ToString,
    ) {
        self.failures.push(HarvestFailure {
            stage,
            target: target.into(),
            message: message.to_string(),
        });
    }

    /// Number of skipped failures in `stage`
    pub fn failures_in(&self, stage: HarvestStage) -> usize {
        self.failures.iter().filter(|f| f.stage == stage).count()
    }
}

/// Prints a summary to stdout in a formatted manner
pub fn print_summary(summary: &HarvestSummary) {
    println!("=== Harvest Summary ===\n");

    println!("Seeds:");
    println!("  Distinct video IDs: {}", summary.seed_count);
    println!(
        "  Already in video output: {}",
        summary.skipped_existing
    );
    println!();

    println!("Written:");
    println!("  Comments: {}", summary.comments_written);
    println!("  Videos: {}", summary.videos_written);
    println!("  Channels: {}", summary.channels_written);
    println!();

    if !summary.comments_disabled.is_empty() {
        println!(
            "Comments Disabled ({}):",
            summary.comments_disabled.len()
        );
        for video_id in &summary.comments_disabled {
            println!("  - {}", video_id);
        }
        println!();
    }

    if !summary.failures.is_empty() {
        println!("Skipped Failures ({}):", summary.failures.len());
        for failure in &summary.failures {
            println!(
                "  [{}] {}: {}",
                failure.stage, failure.target, failure.message
            );
        }
        println!();
    }
}
