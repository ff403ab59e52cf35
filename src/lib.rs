pub mod cli;
pub mod config;
pub mod error;
pub mod splitter;
pub mod ui;

// Public API re-exports
pub use cli::{Cli, OutputFormat, TagList};
pub use config::{CliOverrides, Config, EncodingConfig, InputConfig, OutputConfig};
pub use error::{Result, SplitError, UserFriendlyError};

// Core functionality re-exports
pub use splitter::{BatchReport, FileSplitter, ItemReport, ItemStatus, SplitOutcome, SplitPlan};
pub use ui::{GracefulShutdown, OutputFormatter, OutputMode, ProgressAwareOutput, ProgressManager};

use std::path::Path;

/// Main library interface: splits every configured file in turn.
pub struct CsvHalves {
    config: Config,
    output_formatter: OutputFormatter,
    progress_manager: ProgressManager,
    shutdown: GracefulShutdown,
}

impl CsvHalves {
    /// Create a new CsvHalves instance with the provided configuration
    pub fn new(config: Config, output_mode: OutputMode, verbose: u8, quiet: bool) -> Result<Self> {
        let output_formatter = OutputFormatter::new(output_mode, verbose, quiet);
        let progress_manager = ProgressManager::new(!quiet && output_mode == OutputMode::Human);
        let shutdown = GracefulShutdown::new()?;

        Ok(Self {
            config,
            output_formatter,
            progress_manager,
            shutdown,
        })
    }

    /// Create a CsvHalves instance without a signal handler or progress bars
    pub fn new_for_test(config: Config, output_mode: OutputMode, verbose: u8, quiet: bool) -> Self {
        Self {
            config,
            output_formatter: OutputFormatter::new(output_mode, verbose, quiet),
            progress_manager: ProgressManager::new(false),
            shutdown: GracefulShutdown::new_for_test(),
        }
    }

    /// Create CsvHalves instance from CLI arguments
    pub fn from_cli(cli_args: &Cli) -> Result<Self> {
        let config = cli_args.load_config()?;
        let output_mode = match cli_args.output_format {
            crate::cli::OutputFormat::Human => OutputMode::Human,
            crate::cli::OutputFormat::Json => OutputMode::Json,
            crate::cli::OutputFormat::Plain => OutputMode::Plain,
        };

        Self::new(config, output_mode, cli_args.verbosity_level(), cli_args.quiet)
    }

    /// Split every configured file. Per-file errors are recorded in the
    /// report; only a bad encoding configuration fails the whole call.
    pub fn split_all(&self) -> Result<BatchReport> {
        self.run_batch(false)
    }

    /// Decode and partition every configured file without writing or
    /// deleting anything.
    pub fn plan_all(&self) -> Result<BatchReport> {
        self.run_batch(true)
    }

    fn run_batch(&self, dry_run: bool) -> Result<BatchReport> {
        let splitter = FileSplitter::from_config(&self.config)?;
        Ok(self.run_batch_with(&splitter, dry_run))
    }

    fn run_batch_with(&self, splitter: &FileSplitter, dry_run: bool) -> BatchReport {
        let tags = &self.config.input.tags;
        let mut report = BatchReport::new(dry_run);

        self.output_formatter.start_operation(&format!(
            "{} {} file(s) in {}",
            if dry_run { "Planning" } else { "Splitting" },
            tags.len(),
            self.config.input.directory.display()
        ));
        self.output_formatter.debug(&format!(
            "Encodings: {}",
            self.config.encoding.candidates.join(", ")
        ));

        let batch_progress = self.progress_manager.create_batch_progress(tags.len() as u64);
        let output = ProgressAwareOutput::new(&self.output_formatter, Some(&self.progress_manager));

        for &tag in tags {
            if self.shutdown.check_shutdown().is_err() {
                report.cancelled = true;
                break;
            }

            let input = self.config.input_path(tag);
            let file_name = input
                .file_name()
                .map(|n| n.to_string_lossy().to_string())
                .unwrap_or_else(|| input.display().to_string());
            ui::progress::update_batch_progress(&batch_progress, &report, &file_name);

            output.debug(&format!("Tag {}: {}", tag, input.display()));
            let item = self.process_item(splitter, tag, &input, dry_run, &output);
            report.push(item);
        }

        batch_progress.set_position(report.items.len() as u64);
        report.finish();
        ui::progress::finish_progress_with_summary(
            &batch_progress,
            &ui::output::summary_line(&report),
            report.duration,
        );
        self.progress_manager.clear();

        self.output_formatter.print_batch_summary(&report);

        report
    }

    fn process_item(
        &self,
        splitter: &FileSplitter,
        tag: u32,
        input: &Path,
        dry_run: bool,
        output: &ProgressAwareOutput<'_>,
    ) -> ItemReport {
        output.info(&format!("Reading {}...", input.display()));

        let result = if dry_run {
            splitter.plan(input).map(|plan| plan.to_outcome(false))
        } else {
            splitter.split(input)
        };

        match result {
            Ok(outcome) => {
                output.split_outcome(&outcome, dry_run);
                if dry_run {
                    ItemReport {
                        tag,
                        input: input.to_path_buf(),
                        status: ItemStatus::Planned(outcome),
                    }
                } else {
                    ItemReport::from_result(tag, input.to_path_buf(), Ok(outcome))
                }
            }
            Err(e) => {
                output.split_error(&e);
                ItemReport::from_result(tag, input.to_path_buf(), Err(&e))
            }
        }
    }

    /// Generate sample configuration file
    pub fn generate_sample_config<P: AsRef<Path>>(output_path: P) -> Result<()> {
        Config::sample().save_to_file(output_path)
    }

    /// Get output formatter reference
    pub fn output_formatter(&self) -> &OutputFormatter {
        &self.output_formatter
    }

    /// Handle error with user-friendly output
    pub fn handle_error(&self, error: &SplitError) {
        self.output_formatter.print_user_friendly_error(error);
    }
}
