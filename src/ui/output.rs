use crate::error::{SplitError, UserFriendlyError};
use crate::splitter::{BatchReport, ItemStatus, SplitOutcome};
use crate::ui::progress::format_duration;
use console::{style, Emoji, Term};

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum OutputMode {
    Human,
    Json,
    Plain,
}

// Emojis with text fallbacks
static CHECKMARK: Emoji = Emoji("✅ ", "✓ ");
static CROSS: Emoji = Emoji("❌ ", "✗ ");
static INFO: Emoji = Emoji("ℹ️  ", "i ");
static WARNING: Emoji = Emoji("⚠️  ", "! ");
static SCISSORS: Emoji = Emoji("✂️  ", "> ");
static SPARKLES: Emoji = Emoji("✨ ", "* ");

pub struct OutputFormatter {
    #[allow(dead_code)]
    term: Term,
    mode: OutputMode,
    use_colors: bool,
    verbose_level: u8,
    quiet: bool,
}

impl OutputFormatter {
    pub fn new(mode: OutputMode, verbose: u8, quiet: bool) -> Self {
        let term = Term::stdout();
        let use_colors = match mode {
            OutputMode::Human => term.features().colors_supported() && !quiet,
            _ => false,
        };

        Self {
            term,
            mode,
            use_colors,
            verbose_level: if quiet { 0 } else { verbose },
            quiet,
        }
    }

    // Core messaging methods
    pub fn success(&self, message: &str) {
        if self.should_show_message(0) {
            match self.mode {
                OutputMode::Human => self.print_human_message(MessageType::Success, message),
                OutputMode::Json => self.print_json_message("success", message),
                OutputMode::Plain => println!("SUCCESS: {}", message),
            }
        }
    }

    pub fn error(&self, message: &str) {
        match self.mode {
            OutputMode::Human => self.print_human_message(MessageType::Error, message),
            OutputMode::Json => self.print_json_message("error", message),
            OutputMode::Plain => eprintln!("ERROR: {}", message),
        }
    }

    pub fn warning(&self, message: &str) {
        if self.should_show_message(0) {
            match self.mode {
                OutputMode::Human => self.print_human_message(MessageType::Warning, message),
                OutputMode::Json => self.print_json_message("warning", message),
                OutputMode::Plain => println!("WARNING: {}", message),
            }
        }
    }

    pub fn info(&self, message: &str) {
        if self.should_show_message(0) {
            match self.mode {
                OutputMode::Human => self.print_human_message(MessageType::Info, message),
                OutputMode::Json => self.print_json_message("info", message),
                OutputMode::Plain => println!("INFO: {}", message),
            }
        }
    }

    pub fn debug(&self, message: &str) {
        if self.should_show_message(1) {
            match self.mode {
                OutputMode::Human => {
                    if self.use_colors {
                        println!("  {}", style(message).dim());
                    } else {
                        println!("  DEBUG: {}", message);
                    }
                }
                OutputMode::Json => self.print_json_message("debug", message),
                OutputMode::Plain => println!("DEBUG: {}", message),
            }
        }
    }

    pub fn start_operation(&self, operation: &str) {
        if self.should_show_message(0) {
            match self.mode {
                OutputMode::Human => {
                    if self.use_colors {
                        println!("{}{}", SCISSORS, style(operation).bold());
                    } else {
                        println!("> {}", operation);
                    }
                }
                OutputMode::Json => self.print_json_message("operation_start", operation),
                OutputMode::Plain => println!("STARTING: {}", operation),
            }
        }
    }

    // User-friendly error handling
    pub fn print_user_friendly_error(&self, error: &SplitError) {
        let user_message = error.user_message();
        if error.is_skip() {
            self.warning(&user_message);
        } else {
            self.error(&user_message);
        }

        if let Some(suggestion) = error.suggestion() {
            if !self.should_show_message(1) && error.is_skip() {
                return;
            }

            match self.mode {
                OutputMode::Human => {
                    if self.use_colors {
                        println!(
                            "   {}{}",
                            INFO,
                            style(&format!("Suggestion: {}", suggestion)).cyan()
                        );
                    } else {
                        println!("   Suggestion: {}", suggestion);
                    }
                }
                OutputMode::Json => {
                    self.print_json_object(&serde_json::json!({
                        "type": "suggestion",
                        "message": suggestion
                    }));
                }
                OutputMode::Plain => {
                    println!("SUGGESTION: {}", suggestion);
                }
            }
        }
    }

    /// Per-file details: encoding, row counts, output paths, deletion.
    pub fn print_split_outcome(&self, outcome: &SplitOutcome, dry_run: bool) {
        let (created, deleted) = if dry_run {
            ("Would create", "Would delete original file")
        } else {
            ("Created", "Deleted original file")
        };

        self.info(&format!(
            "Read {} with {} encoding",
            outcome.input.display(),
            outcome.encoding
        ));
        if outcome.lossy_decode {
            self.warning("Some byte sequences could not be decoded and were replaced");
        }
        if outcome.replaced_on_encode {
            self.warning(&format!(
                "Some characters are not representable in {} and were written as '?'",
                outcome.encoding
            ));
        }
        self.info(&format!(
            "Total: {} lines (header + {} data rows)",
            outcome.total_lines, outcome.data_rows
        ));
        self.success(&format!(
            "{} {} with {} data rows",
            created,
            outcome.first.path.display(),
            outcome.first.rows
        ));
        self.success(&format!(
            "{} {} with {} data rows",
            created,
            outcome.second.path.display(),
            outcome.second.rows
        ));

        if dry_run || outcome.original_deleted {
            self.success(&format!("{}: {}", deleted, outcome.input.display()));
        } else {
            self.info(&format!("Kept original file: {}", outcome.input.display()));
        }
    }

    // Summary and reporting
    pub fn print_batch_summary(&self, report: &BatchReport) {
        if self.quiet {
            return;
        }

        match self.mode {
            OutputMode::Human => self.print_human_summary(report),
            OutputMode::Json => self.print_json_summary(report),
            OutputMode::Plain => self.print_plain_summary(report),
        }
    }

    pub fn print_batch_report(&self, report: &BatchReport) {
        if self.quiet {
            return;
        }

        match self.mode {
            OutputMode::Human => self.print_human_report(report),
            OutputMode::Json => self.print_json_object(&report_json(report)),
            OutputMode::Plain => self.print_plain_report(report),
        }
    }

    // Specialized output methods
    pub fn print_header(&self, title: &str) {
        if self.quiet {
            return;
        }

        match self.mode {
            OutputMode::Human => {
                println!();
                if self.use_colors {
                    println!("{} {}", SPARKLES, style(title).bold().cyan());
                } else {
                    println!("=== {} ===", title);
                }
                println!();
            }
            OutputMode::Json => {
                self.print_json_object(&serde_json::json!({
                    "type": "header",
                    "title": title
                }));
            }
            OutputMode::Plain => {
                println!("=== {} ===", title);
            }
        }
    }

    pub fn print_separator(&self) {
        if self.quiet {
            return;
        }

        match self.mode {
            OutputMode::Human => {
                if self.use_colors {
                    println!("{}", style("─".repeat(60)).dim());
                } else {
                    println!("{}", "-".repeat(60));
                }
            }
            OutputMode::Plain => {
                println!("{}", "-".repeat(60));
            }
            OutputMode::Json => {}
        }
    }

    // Private helper methods
    fn should_show_message(&self, min_verbose_level: u8) -> bool {
        !self.quiet && self.verbose_level >= min_verbose_level
    }

    fn print_human_message(&self, msg_type: MessageType, message: &str) {
        #[allow(clippy::type_complexity)]
        let (emoji, color_fn): (Emoji, Box<dyn Fn(&str) -> console::StyledObject<&str>>) =
            match msg_type {
                MessageType::Success => (CHECKMARK, Box::new(|msg| style(msg).green().bold())),
                MessageType::Error => (CROSS, Box::new(|msg| style(msg).red().bold())),
                MessageType::Warning => (WARNING, Box::new(|msg| style(msg).yellow().bold())),
                MessageType::Info => (INFO, Box::new(|msg| style(msg).cyan())),
            };

        if self.use_colors {
            match msg_type {
                MessageType::Error => eprintln!("{}{}", emoji, color_fn(message)),
                _ => println!("{}{}", emoji, color_fn(message)),
            }
        } else {
            let prefix = match msg_type {
                MessageType::Success => "✓",
                MessageType::Error => "✗",
                MessageType::Warning => "!",
                MessageType::Info => "i",
            };

            match msg_type {
                MessageType::Error => eprintln!("{} {}", prefix, message),
                _ => println!("{} {}", prefix, message),
            }
        }
    }

    fn print_json_message(&self, level: &str, message: &str) {
        self.print_json_object(&serde_json::json!({
            "type": "message",
            "level": level,
            "message": message,
            "timestamp": chrono::Utc::now().to_rfc3339()
        }));
    }

    fn print_json_object(&self, obj: &serde_json::Value) {
        println!(
            "{}",
            serde_json::to_string(obj).unwrap_or_else(|_| "{}".to_string())
        );
    }

    fn print_human_summary(&self, report: &BatchReport) {
        println!();
        self.print_separator();

        let headline = summary_line(report);
        if self.use_colors {
            let styled = if report.is_clean() {
                style(headline).green().bold()
            } else {
                style(headline).yellow().bold()
            };
            println!("{} {}", styled, CHECKMARK);
        } else {
            println!("✓ {}", headline);
        }

        println!();
        println!("  Files split:     {}", self.highlight(report.split_count()));
        println!("  Rows moved:      {}", self.highlight(report.total_data_rows()));
        println!(
            "  Time taken:      {}",
            self.highlight(format_duration(report.duration))
        );
        if report.skipped_count() > 0 {
            println!("  Skipped:         {}", report.skipped_count());
        }
        if report.failed_count() > 0 {
            println!("  Failed:          {}", report.failed_count());
        }

        self.print_separator();
    }

    fn highlight<T: std::fmt::Display>(&self, value: T) -> String {
        if self.use_colors {
            style(value).cyan().bold().to_string()
        } else {
            value.to_string()
        }
    }

    fn print_json_summary(&self, report: &BatchReport) {
        let summary = serde_json::json!({
            "type": "summary",
            "message": summary_line(report),
            "split": report.split_count(),
            "skipped": report.skipped_count(),
            "failed": report.failed_count(),
            "cancelled": report.cancelled,
            "data_rows": report.total_data_rows(),
            "duration_ms": report.duration.as_millis(),
            "timestamp": chrono::Utc::now().to_rfc3339()
        });

        self.print_json_object(&summary);
    }

    fn print_plain_summary(&self, report: &BatchReport) {
        println!("COMPLETED: {}", summary_line(report));
        println!("Split: {}", report.split_count());
        println!("Skipped: {}", report.skipped_count());
        println!("Failed: {}", report.failed_count());
        println!("Duration: {:?}", report.duration);
    }

    fn print_human_report(&self, report: &BatchReport) {
        self.print_header(if report.dry_run { "Split Plan" } else { "Split Report" });

        for item in &report.items {
            match &item.status {
                ItemStatus::Split(outcome) | ItemStatus::Planned(outcome) => {
                    println!(
                        "  [{}] {} ({}) -> {} ({} rows) + {} ({} rows)",
                        item.tag,
                        item.input.display(),
                        outcome.encoding,
                        outcome.first.path.display(),
                        outcome.first.rows,
                        outcome.second.path.display(),
                        outcome.second.rows
                    );
                }
                ItemStatus::Skipped { reason } => {
                    println!("  [{}] skipped: {}", item.tag, reason);
                }
                ItemStatus::Failed { reason, outcome, .. } => {
                    println!("  [{}] failed: {}", item.tag, reason);
                    if let Some(outcome) = outcome {
                        println!(
                            "       halves left on disk: {} + {}",
                            outcome.first.path.display(),
                            outcome.second.path.display()
                        );
                    }
                }
            }
        }
    }

    fn print_plain_report(&self, report: &BatchReport) {
        for item in &report.items {
            let status = match &item.status {
                ItemStatus::Split(_) => "split",
                ItemStatus::Planned(_) => "planned",
                ItemStatus::Skipped { .. } => "skipped",
                ItemStatus::Failed { .. } => "failed",
            };
            println!("ITEM: {} {} {}", item.tag, status, item.input.display());
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum MessageType {
    Success,
    Error,
    Warning,
    Info,
}

/// The full report as one JSON line, tagged like the other JSON messages.
fn report_json(report: &BatchReport) -> serde_json::Value {
    let mut value = serde_json::to_value(report).unwrap_or_default();
    if let Some(object) = value.as_object_mut() {
        object.insert("type".to_string(), serde_json::Value::from("report"));
    }
    value
}

/// The final line printed for every batch, whatever happened to the items.
pub fn summary_line(report: &BatchReport) -> String {
    let attempted = report.items.len();
    let verb = if report.dry_run { "Planned" } else { "Split" };
    let mut line = format!(
        "{} {} of {} files in half ({} skipped, {} failed)",
        verb,
        report.split_count(),
        attempted,
        report.skipped_count(),
        report.failed_count()
    );
    if report.cancelled {
        line.push_str(", cancelled before the remaining files");
    }
    line
}

// Progress-aware output wrapper
pub struct ProgressAwareOutput<'a> {
    formatter: &'a OutputFormatter,
    progress_manager: Option<&'a crate::ui::ProgressManager>,
}

impl<'a> ProgressAwareOutput<'a> {
    pub fn new(
        formatter: &'a OutputFormatter,
        progress_manager: Option<&'a crate::ui::ProgressManager>,
    ) -> Self {
        Self {
            formatter,
            progress_manager,
        }
    }

    pub fn suspend_and_print<F>(&self, f: F)
    where
        F: FnOnce(&OutputFormatter),
    {
        if let Some(pm) = self.progress_manager {
            pm.suspend(|| f(self.formatter));
        } else {
            f(self.formatter);
        }
    }

    pub fn info(&self, message: &str) {
        self.suspend_and_print(|f| f.info(message));
    }

    pub fn debug(&self, message: &str) {
        self.suspend_and_print(|f| f.debug(message));
    }

    pub fn split_outcome(&self, outcome: &SplitOutcome, dry_run: bool) {
        self.suspend_and_print(|f| f.print_split_outcome(outcome, dry_run));
    }

    pub fn split_error(&self, error: &SplitError) {
        self.suspend_and_print(|f| f.print_user_friendly_error(error));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::splitter::ItemReport;
    use std::path::PathBuf;

    #[test]
    fn test_report_json_is_tagged() {
        let mut report = BatchReport::new(true);
        report.finish();

        let value = report_json(&report);
        assert_eq!(value["type"], "report");
        assert_eq!(value["dry_run"], true);
        assert!(!serde_json::to_string(&value).unwrap().contains('\n'));
    }

    #[test]
    fn test_quiet_mode() {
        let formatter = OutputFormatter::new(OutputMode::Human, 2, true);
        assert_eq!(formatter.verbose_level, 0);
        assert!(formatter.quiet);
        assert!(!formatter.should_show_message(0));
    }

    #[test]
    fn test_should_show_message() {
        let formatter = OutputFormatter::new(OutputMode::Plain, 0, false);
        assert!(formatter.should_show_message(0));
        assert!(!formatter.should_show_message(1));

        let verbose = OutputFormatter::new(OutputMode::Plain, 1, false);
        assert!(verbose.should_show_message(1));
    }

    #[test]
    fn test_summary_line() {
        let mut report = BatchReport::new(false);
        report.push(ItemReport::from_result(
            2,
            PathBuf::from("govcontracts2.csv"),
            Err(&SplitError::MissingInput {
                path: PathBuf::from("govcontracts2.csv"),
            }),
        ));
        assert_eq!(
            summary_line(&report),
            "Split 0 of 1 files in half (1 skipped, 0 failed)"
        );

        report.cancelled = true;
        assert!(summary_line(&report).ends_with("cancelled before the remaining files"));
    }
}
