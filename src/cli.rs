use crate::config::{CliOverrides, Config};
use crate::error::Result;
use clap::{Parser, ValueEnum};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "csvhalves")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Split CSV exports in half, keeping the header row in both halves")]
#[command(
    long_about = "csvhalves reads each configured file, splits its data rows into two \
                  halves of floor(N/2) and the remainder, writes both halves next to the \
                  original with an 'a'/'b' suffix and deletes the original."
)]
#[command(after_help = "EXAMPLES:\n  \
    csvhalves --directory ./Opportunities\n  \
    csvhalves -d ./exports --pattern 'contracts{tag}.csv' --tags 1-3\n  \
    csvhalves --encodings utf-8,windows-1250 --strict --keep-original\n  \
    csvhalves --config my-config.toml --dry-run")]
pub struct Cli {
    /// Directory containing the files to split
    #[arg(short, long)]
    pub directory: Option<PathBuf>,

    /// File name pattern; {tag} is replaced by each tag
    #[arg(short, long, help = "File name pattern containing {tag} (e.g., govcontracts{tag}.csv)")]
    pub pattern: Option<String>,

    /// Tags to process (comma-separated, ranges allowed)
    #[arg(short, long, value_parser = parse_tag_list, help = "Tags to process (e.g., 2,3,4,5 or 2-5)")]
    pub tags: Option<TagList>,

    /// Candidate encodings, tried in order
    #[arg(short, long, help = "Encodings to try in order (e.g., utf-8,windows-1252)")]
    pub encodings: Option<String>,

    /// Fail instead of replacing undecodable bytes
    #[arg(long, help = "Skip files no candidate encoding decodes cleanly")]
    pub strict: bool,

    /// Keep the original file after writing both halves
    #[arg(long)]
    pub keep_original: bool,

    /// Do not overwrite existing halves
    #[arg(long)]
    pub no_clobber: bool,

    /// Configuration file path
    #[arg(short, long, help = "Path to TOML configuration file")]
    pub config: Option<PathBuf>,

    /// Output format for results
    #[arg(long, value_enum, default_value_t = OutputFormat::Human)]
    pub output_format: OutputFormat,

    /// Verbose output level (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Quiet mode (suppress non-essential output)
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Dry run (show what would be done without executing)
    #[arg(long, help = "Show how each file would be split without writing or deleting anything")]
    pub dry_run: bool,

    /// Generate sample configuration file
    #[arg(long, help = "Generate a sample configuration file")]
    pub generate_config: bool,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable colored output
    Human,
    /// JSON formatted output
    Json,
    /// Plain text output
    Plain,
}

/// Parsed `--tags` value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagList(pub Vec<u32>);

impl Cli {
    pub fn load_config(&self) -> Result<Config> {
        let mut config = Config::load_with_defaults(self.config.as_ref())?;

        let overrides = self.create_cli_overrides();
        config.merge_with_cli_args(&overrides);
        config.validate()?;

        Ok(config)
    }

    pub fn create_cli_overrides(&self) -> CliOverrides {
        CliOverrides::new()
            .with_directory(self.directory.clone())
            .with_file_pattern(self.pattern.clone())
            .with_tags(self.tags.as_ref().map(|t| t.0.clone()))
            .with_encodings(self.encodings.clone())
            .with_strict(self.strict)
            .with_keep_original(self.keep_original)
            .with_no_clobber(self.no_clobber)
    }

    pub fn verbosity_level(&self) -> u8 {
        if self.quiet {
            0
        } else {
            self.verbose
        }
    }
}

/// Upper bound on the number of tags one `--tags` value may expand to.
pub const MAX_TAGS: usize = 10_000;

/// Parses `2,3,4,5`, `2-5` or mixes such as `1,4-6`.
pub fn parse_tag_list(s: &str) -> std::result::Result<TagList, String> {
    let mut tags = Vec::new();

    for part in s.split(',').map(str::trim).filter(|p| !p.is_empty()) {
        match part.split_once('-') {
            Some((start, end)) => {
                let start = parse_tag(start)?;
                let end = parse_tag(end)?;
                if start > end {
                    return Err(format!("Invalid tag range: {}", part));
                }
                let width = u64::from(end - start) + 1;
                if tags.len() as u64 + width > MAX_TAGS as u64 {
                    return Err(format!(
                        "Tag range {} is too wide (at most {} tags in total)",
                        part, MAX_TAGS
                    ));
                }
                tags.extend(start..=end);
            }
            None => {
                if tags.len() >= MAX_TAGS {
                    return Err(format!("Too many tags (at most {})", MAX_TAGS));
                }
                tags.push(parse_tag(part)?);
            }
        }
    }

    if tags.is_empty() {
        return Err("At least one tag is required".to_string());
    }

    Ok(TagList(tags))
}

fn parse_tag(s: &str) -> std::result::Result<u32, String> {
    s.trim()
        .parse()
        .map_err(|_| format!("Invalid tag: '{}' (expected a non-negative integer)", s.trim()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn cli() -> Cli {
        Cli {
            directory: None,
            pattern: None,
            tags: None,
            encodings: None,
            strict: false,
            keep_original: false,
            no_clobber: false,
            config: None,
            output_format: OutputFormat::Human,
            verbose: 0,
            quiet: false,
            dry_run: false,
            generate_config: false,
        }
    }

    #[test]
    fn test_parse_tag_list() {
        assert_eq!(parse_tag_list("2,3,4,5").unwrap(), TagList(vec![2, 3, 4, 5]));
        assert_eq!(parse_tag_list("2-5").unwrap(), TagList(vec![2, 3, 4, 5]));
        assert_eq!(parse_tag_list("1, 4-6").unwrap(), TagList(vec![1, 4, 5, 6]));

        assert!(parse_tag_list("").is_err());
        assert!(parse_tag_list("five").is_err());
        assert!(parse_tag_list("5-2").is_err());
        assert!(parse_tag_list("-3").is_err());
    }

    #[test]
    fn test_parse_tag_list_rejects_huge_ranges() {
        assert!(parse_tag_list("0-4294967295").is_err());
        assert!(parse_tag_list("1-9999,20000-20001").is_err());
        assert_eq!(parse_tag_list("1-10000").unwrap().0.len(), MAX_TAGS);
    }

    #[test]
    fn test_cli_parsing() {
        let cli = Cli::try_parse_from([
            "csvhalves",
            "--directory",
            "/tmp/exports",
            "--tags",
            "7-8",
            "--keep-original",
            "-vv",
        ])
        .unwrap();

        assert_eq!(cli.directory, Some(PathBuf::from("/tmp/exports")));
        assert_eq!(cli.tags, Some(TagList(vec![7, 8])));
        assert!(cli.keep_original);
        assert_eq!(cli.verbosity_level(), 2);
    }

    #[test]
    fn test_quiet_conflicts_with_verbose() {
        assert!(Cli::try_parse_from(["csvhalves", "-q", "-v"]).is_err());
    }

    #[test]
    fn test_load_config_applies_overrides() {
        let temp_dir = TempDir::new().unwrap();
        let mut cli = cli();
        cli.directory = Some(temp_dir.path().to_path_buf());
        cli.tags = Some(TagList(vec![1, 2]));
        cli.no_clobber = true;

        let config = cli.load_config().unwrap();
        assert_eq!(config.input.directory, temp_dir.path());
        assert_eq!(config.input.tags, vec![1, 2]);
        assert!(!config.output.overwrite_existing);
    }

    #[test]
    fn test_load_config_rejects_unknown_encoding() {
        let temp_dir = TempDir::new().unwrap();
        let mut cli = cli();
        cli.directory = Some(temp_dir.path().to_path_buf());
        cli.encodings = Some("utf-8,nonsense".to_string());

        assert!(cli.load_config().is_err());
    }
}
