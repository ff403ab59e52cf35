use crate::error::{Result, SplitError};
use crate::splitter::encoding;
use encoding_rs::Encoding;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};

pub const TAG_PLACEHOLDER: &str = "{tag}";

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    pub input: InputConfig,
    pub encoding: EncodingConfig,
    pub output: OutputConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct InputConfig {
    pub directory: PathBuf,
    pub file_pattern: String,
    pub tags: Vec<u32>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct EncodingConfig {
    pub candidates: Vec<String>,
    pub allow_lossy: bool,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct OutputConfig {
    pub suffixes: [String; 2],
    pub delete_original: bool,
    pub overwrite_existing: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            input: InputConfig::default(),
            encoding: EncodingConfig::default(),
            output: OutputConfig::default(),
        }
    }
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            directory: std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
            file_pattern: "govcontracts{tag}.csv".to_string(),
            tags: vec![2, 3, 4, 5],
        }
    }
}

impl Default for EncodingConfig {
    fn default() -> Self {
        Self {
            candidates: vec![
                "utf-8".to_string(),
                "windows-1252".to_string(),
                "iso-8859-1".to_string(),
                "x-user-defined".to_string(), // byte-preserving
            ],
            allow_lossy: true,
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            suffixes: ["a".to_string(), "b".to_string()],
            delete_original: true,
            overwrite_existing: true,
        }
    }
}

impl Config {
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(SplitError::Config {
                message: format!("Configuration file not found: {}", path.display()),
            });
        }

        let content = std::fs::read_to_string(path).map_err(|e| SplitError::Config {
            message: format!("Failed to read config file {}: {}", path.display(), e),
        })?;

        let config: Config = toml::from_str(&content).map_err(|e| SplitError::Config {
            message: format!("Failed to parse config file {}: {}", path.display(), e),
        })?;

        Ok(config)
    }

    pub fn load_with_defaults<P: AsRef<Path>>(config_path: Option<P>) -> Result<Self> {
        match config_path {
            Some(path) => Self::load_from_file(path),
            None => {
                let default_paths = ["csvhalves.toml", ".csvhalves.toml"];

                for default_path in &default_paths {
                    if Path::new(default_path).exists() {
                        return Self::load_from_file(default_path);
                    }
                }

                Ok(Self::default())
            }
        }
    }

    pub fn merge_with_cli_args(&mut self, cli_args: &CliOverrides) {
        if let Some(ref directory) = cli_args.directory {
            self.input.directory = directory.clone();
        }

        if let Some(ref pattern) = cli_args.file_pattern {
            self.input.file_pattern = pattern.clone();
        }

        if let Some(ref tags) = cli_args.tags {
            self.input.tags = tags.clone();
        }

        if let Some(ref encodings) = cli_args.encodings {
            self.encoding.candidates = encodings
                .split(',')
                .map(|s| s.trim().to_lowercase())
                .filter(|s| !s.is_empty())
                .collect();
        }

        if cli_args.strict {
            self.encoding.allow_lossy = false;
        }

        if cli_args.keep_original {
            self.output.delete_original = false;
        }

        if cli_args.no_clobber {
            self.output.overwrite_existing = false;
        }
    }

    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let content = toml::to_string_pretty(self).map_err(|e| SplitError::Config {
            message: format!("Failed to serialize config: {}", e),
        })?;

        std::fs::write(path, content).map_err(|e| SplitError::Config {
            message: format!("Failed to write config file {}: {}", path.display(), e),
        })?;

        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if self.input.tags.is_empty() {
            return Err(SplitError::Config {
                message: "At least one tag must be specified".to_string(),
            });
        }

        let mut seen = HashSet::new();
        if let Some(tag) = self.input.tags.iter().find(|tag| !seen.insert(**tag)) {
            return Err(SplitError::Config {
                message: format!("Tag {} is listed more than once", tag),
            });
        }

        if !self.input.file_pattern.contains(TAG_PLACEHOLDER) {
            return Err(SplitError::Config {
                message: format!(
                    "File pattern '{}' must contain the {} placeholder",
                    self.input.file_pattern, TAG_PLACEHOLDER
                ),
            });
        }

        if has_separator(&self.input.file_pattern) {
            return Err(SplitError::Config {
                message: format!(
                    "File pattern '{}' must be a file name, not a path",
                    self.input.file_pattern
                ),
            });
        }

        if self.encoding.candidates.is_empty() {
            return Err(SplitError::Config {
                message: "At least one candidate encoding must be specified".to_string(),
            });
        }
        self.resolved_encodings()?;

        let [first, second] = &self.output.suffixes;
        if first.is_empty() || second.is_empty() {
            return Err(SplitError::Config {
                message: "Output suffixes must not be empty".to_string(),
            });
        }
        if first == second {
            return Err(SplitError::Config {
                message: format!("Output suffixes must differ (both are '{}')", first),
            });
        }
        if has_separator(first) || has_separator(second) {
            return Err(SplitError::Config {
                message: "Output suffixes must not contain path separators".to_string(),
            });
        }

        if !self.input.directory.is_dir() {
            return Err(SplitError::Config {
                message: format!(
                    "Input directory does not exist: {}",
                    self.input.directory.display()
                ),
            });
        }

        Ok(())
    }

    pub fn input_path(&self, tag: u32) -> PathBuf {
        let file_name = self
            .input
            .file_pattern
            .replace(TAG_PLACEHOLDER, &tag.to_string());
        self.input.directory.join(file_name)
    }

    pub fn resolved_encodings(&self) -> Result<Vec<&'static Encoding>> {
        self.encoding
            .candidates
            .iter()
            .map(|label| encoding::resolve_label(label))
            .collect()
    }

    /// Defaults with the directory relative to wherever the file is used.
    pub fn sample() -> Self {
        let mut sample = Self::default();
        sample.input.directory = PathBuf::from(".");
        sample
    }
}

fn has_separator(s: &str) -> bool {
    s.contains('/') || s.contains('\\')
}

#[derive(Debug, Default)]
pub struct CliOverrides {
    pub directory: Option<PathBuf>,
    pub file_pattern: Option<String>,
    pub tags: Option<Vec<u32>>,
    pub encodings: Option<String>,
    pub strict: bool,
    pub keep_original: bool,
    pub no_clobber: bool,
}

impl CliOverrides {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_directory(mut self, directory: Option<PathBuf>) -> Self {
        self.directory = directory;
        self
    }

    pub fn with_file_pattern(mut self, pattern: Option<String>) -> Self {
        self.file_pattern = pattern;
        self
    }

    pub fn with_tags(mut self, tags: Option<Vec<u32>>) -> Self {
        self.tags = tags;
        self
    }

    pub fn with_encodings(mut self, encodings: Option<String>) -> Self {
        self.encodings = encodings;
        self
    }

    pub fn with_strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    pub fn with_keep_original(mut self, keep: bool) -> Self {
        self.keep_original = keep;
        self
    }

    pub fn with_no_clobber(mut self, no_clobber: bool) -> Self {
        self.no_clobber = no_clobber;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::{NamedTempFile, TempDir};

    fn config_in(dir: &Path) -> Config {
        let mut config = Config::default();
        config.input.directory = dir.to_path_buf();
        config
    }

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.input.tags, vec![2, 3, 4, 5]);
        assert_eq!(config.encoding.candidates[0], "utf-8");
        assert_eq!(config.output.suffixes, ["a".to_string(), "b".to_string()]);
        assert!(config.output.delete_original);
    }

    #[test]
    fn test_config_validation() {
        let temp_dir = TempDir::new().unwrap();
        let mut config = config_in(temp_dir.path());
        assert!(config.validate().is_ok());

        config.input.tags.clear();
        assert!(config.validate().is_err());

        let mut config = config_in(temp_dir.path());
        config.input.tags = vec![2, 3, 2];
        assert!(config.validate().is_err());

        let mut config = config_in(temp_dir.path());
        config.input.file_pattern = "contracts.csv".to_string();
        assert!(config.validate().is_err());

        let mut config = config_in(temp_dir.path());
        config.input.file_pattern = "sub/contracts{tag}.csv".to_string();
        assert!(config.validate().is_err());

        let mut config = config_in(temp_dir.path());
        config.encoding.candidates = vec!["no-such-charset".to_string()];
        assert!(matches!(
            config.validate(),
            Err(SplitError::UnknownEncoding { .. })
        ));

        let mut config = config_in(temp_dir.path());
        config.output.suffixes = ["x".to_string(), "x".to_string()];
        assert!(config.validate().is_err());

        let mut config = config_in(temp_dir.path());
        config.input.directory = temp_dir.path().join("missing");
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_input_path() {
        let temp_dir = TempDir::new().unwrap();
        let config = config_in(temp_dir.path());
        assert_eq!(
            config.input_path(3),
            temp_dir.path().join("govcontracts3.csv")
        );
    }

    #[test]
    fn test_config_file_operations() {
        let temp_dir = TempDir::new().unwrap();
        let mut config = config_in(temp_dir.path());
        config.input.tags = vec![7, 9];
        let temp_file = NamedTempFile::new().unwrap();

        config.save_to_file(temp_file.path()).unwrap();

        let loaded_config = Config::load_from_file(temp_file.path()).unwrap();
        assert_eq!(loaded_config.input.tags, vec![7, 9]);
        assert_eq!(loaded_config.input.directory, temp_dir.path());
    }

    #[test]
    fn test_missing_config_file() {
        let temp_dir = TempDir::new().unwrap();
        let result = Config::load_from_file(temp_dir.path().join("nope.toml"));
        assert!(matches!(result, Err(SplitError::Config { .. })));
    }

    #[test]
    fn test_cli_overrides() {
        let mut config = Config::default();

        let overrides = CliOverrides::new()
            .with_directory(Some(PathBuf::from("/tmp/exports")))
            .with_tags(Some(vec![1]))
            .with_encodings(Some("UTF-8, windows-1250".to_string()))
            .with_strict(true)
            .with_keep_original(true);

        config.merge_with_cli_args(&overrides);

        assert_eq!(config.input.directory, PathBuf::from("/tmp/exports"));
        assert_eq!(config.input.tags, vec![1]);
        assert_eq!(config.encoding.candidates, vec!["utf-8", "windows-1250"]);
        assert!(!config.encoding.allow_lossy);
        assert!(!config.output.delete_original);
        assert!(config.output.overwrite_existing);
    }

    #[test]
    fn test_sample_config_generation() {
        let temp_file = NamedTempFile::new().unwrap();
        Config::sample().save_to_file(temp_file.path()).unwrap();

        let sample = std::fs::read_to_string(temp_file.path()).unwrap();
        assert!(sample.contains("[input]"));
        assert!(sample.contains("[encoding]"));
        assert!(sample.contains("[output]"));
        assert!(sample.contains("directory = \".\""));
    }

    #[test]
    fn test_partial_config_file() {
        let temp_file = NamedTempFile::new().unwrap();
        std::fs::write(temp_file.path(), "[input]\ntags = [7, 8]\n").unwrap();

        let config = Config::load_from_file(temp_file.path()).unwrap();
        assert_eq!(config.input.tags, vec![7, 8]);
        assert_eq!(config.input.file_pattern, "govcontracts{tag}.csv");
        assert_eq!(config.encoding.candidates.len(), 4);
        assert_eq!(config.output.suffixes, ["a".to_string(), "b".to_string()]);
    }

    #[test]
    fn test_encodings_that_cannot_be_written_back() {
        let temp_dir = TempDir::new().unwrap();

        let mut config = config_in(temp_dir.path());
        config.encoding.candidates = vec!["utf-8".to_string(), "iso-2022-kr".to_string()];
        assert!(matches!(
            config.validate(),
            Err(SplitError::UnsupportedEncoding { .. })
        ));

        let mut config = config_in(temp_dir.path());
        config.encoding.candidates = vec!["utf-16le".to_string(), "utf-16be".to_string()];
        assert!(config.validate().is_ok());
    }
}
