//! Pipeline statistics.

use std::path::PathBuf;
use std::time::Duration;

use dispatcher::DispatchReport;
use observability::OutcomeAggregator;

/// Statistics from a pipeline run
#[derive(Debug, Clone, Default)]
pub struct PipelineStats {
    /// Non-blank words read from the wordlist
    pub words: usize,

    /// URLs rendered and saved
    pub generated: usize,

    /// Where the URL list was written
    pub output: PathBuf,

    /// Total duration of the pipeline run
    pub duration: Duration,

    /// Engine report, present only when requests were sent
    pub report: Option<DispatchReport>,

    /// Per-outcome aggregation
    pub outcomes: OutcomeAggregator,
}

impl PipelineStats {
    /// Completed requests per second
    pub fn rate(&self) -> f64 {
        match &self.report {
            Some(report) if report.elapsed.as_secs_f64() > 0.0 => {
                report.completed as f64 / report.elapsed.as_secs_f64()
            }
            _ => 0.0,
        }
    }

    /// One-line completion message
    pub fn final_line(&self) -> String {
        match &self.report {
            None => format!("Saved {} URLs to {}", self.generated, self.output.display()),
            Some(report) if report.cancelled => format!(
                "Cancelled: {} responses ({} ok, {} failed), {} not sent",
                report.completed, report.succeeded, report.failed, report.skipped
            ),
            Some(report) => format!(
                "Done: {} responses ({} ok, {} failed)",
                report.completed, report.succeeded, report.failed
            ),
        }
    }

    /// Print detailed summary
    pub fn print_summary(&self) {
        println!("{}", self.final_line());

        let Some(report) = &self.report else {
            return;
        };

        println!();
        println!("Overview");
        println!("   Duration: {:.2}s", self.duration.as_secs_f64());
        println!("   Words: {}", self.words);
        println!("   URLs: {} (saved to {})", self.generated, self.output.display());
        println!("   Dispatched: {} of {}", report.completed, report.total);
        println!("   Rate: {:.2} req/s", self.rate());
        if !report.panicked.is_empty() {
            println!("   Panicked workers: {:?}", report.panicked);
        }
        println!();
        print!("{}", self.outcomes.summary());
    }
}
