use clap::Parser;
use csvhalves::{
    BatchReport, Cli, CsvHalves, OutputFormatter, OutputMode, SplitError, UserFriendlyError,
};
use std::process;

fn main() {
    let exit_code = run();
    process::exit(exit_code);
}

fn run() -> i32 {
    // Parse CLI arguments
    let cli = Cli::parse();

    // Handle special commands first
    if cli.generate_config {
        return handle_generate_config(&cli);
    }

    let halves = match CsvHalves::from_cli(&cli) {
        Ok(halves) => halves,
        Err(e) => {
            print_startup_error(&e);
            return 1;
        }
    };

    let result = if cli.dry_run {
        halves.plan_all()
    } else {
        halves.split_all()
    };

    match result {
        Ok(report) => {
            halves.output_formatter().print_batch_report(&report);
            exit_code_for(&report)
        }
        Err(e) => {
            halves.handle_error(&e);
            match e {
                SplitError::Cancelled => 130,
                _ => 1,
            }
        }
    }
}

fn exit_code_for(report: &BatchReport) -> i32 {
    if report.cancelled {
        130 // Interrupted (SIGINT)
    } else if report.is_clean() {
        0
    } else {
        2 // Finished with skipped or failed files
    }
}

fn handle_generate_config(cli: &Cli) -> i32 {
    let config_path = cli
        .config
        .as_ref()
        .map(|p| p.to_string_lossy().to_string())
        .unwrap_or_else(|| "csvhalves.toml".to_string());

    match CsvHalves::generate_sample_config(&config_path) {
        Ok(()) => {
            println!("Generated sample configuration file: {}", config_path);
            println!("\nTo use this configuration:");
            println!("  csvhalves --config {}", config_path);
            println!("\nEdit the directory, file_pattern and tags for your exports.");
            0
        }
        Err(e) => {
            eprintln!("Failed to generate configuration file: {}", e.user_message());
            if let Some(suggestion) = e.suggestion() {
                eprintln!("Suggestion: {}", suggestion);
            }
            1
        }
    }
}

fn print_startup_error(error: &SplitError) {
    let formatter = OutputFormatter::new(OutputMode::Human, 0, false);
    formatter.print_user_friendly_error(error);
}
