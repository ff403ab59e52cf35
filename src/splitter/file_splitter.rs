use crate::config::Config;
use crate::error::{Result, SplitError};
use crate::splitter::encoding::{self, Decoded};
use crate::splitter::partition::{half_path, Partition};
use encoding_rs::Encoding;
use serde::Serialize;
use std::fs;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

const WRITE_BUFFER_SIZE: usize = 64 * 1024;

/// One output half, ready to be written.
#[derive(Debug, Clone)]
pub struct HalfPlan {
    pub path: PathBuf,
    pub rows: usize,
    pub bytes: Vec<u8>,
}

/// Everything needed to write both halves of one input, computed up front.
#[derive(Debug, Clone)]
pub struct SplitPlan {
    pub input: PathBuf,
    pub encoding: &'static Encoding,
    pub lossy_decode: bool,
    pub replaced_on_encode: bool,
    pub total_lines: usize,
    pub first: HalfPlan,
    pub second: HalfPlan,
}

#[derive(Debug, Clone, Serialize)]
pub struct HalfSummary {
    pub path: PathBuf,
    pub rows: usize,
}

/// What happened to one input file.
#[derive(Debug, Clone, Serialize)]
pub struct SplitOutcome {
    /// Serialized on the enclosing item report.
    #[serde(skip_serializing)]
    pub input: PathBuf,
    pub encoding: String,
    pub lossy_decode: bool,
    pub replaced_on_encode: bool,
    pub total_lines: usize,
    pub data_rows: usize,
    pub first: HalfSummary,
    pub second: HalfSummary,
    pub original_deleted: bool,
}

impl SplitPlan {
    pub fn data_rows(&self) -> usize {
        self.first.rows + self.second.rows
    }

    pub fn to_outcome(&self, original_deleted: bool) -> SplitOutcome {
        SplitOutcome {
            input: self.input.clone(),
            encoding: self.encoding.name().to_string(),
            lossy_decode: self.lossy_decode,
            replaced_on_encode: self.replaced_on_encode,
            total_lines: self.total_lines,
            data_rows: self.data_rows(),
            first: HalfSummary {
                path: self.first.path.clone(),
                rows: self.first.rows,
            },
            second: HalfSummary {
                path: self.second.path.clone(),
                rows: self.second.rows,
            },
            original_deleted,
        }
    }
}

pub struct FileSplitter {
    candidates: Vec<&'static Encoding>,
    allow_lossy: bool,
    suffixes: [String; 2],
    delete_original: bool,
    overwrite_existing: bool,
    remove: fn(&Path) -> io::Result<()>,
}

impl FileSplitter {
    pub fn new(candidates: Vec<&'static Encoding>) -> Self {
        Self {
            candidates,
            allow_lossy: true,
            suffixes: ["a".to_string(), "b".to_string()],
            delete_original: true,
            overwrite_existing: true,
            remove: |path| fs::remove_file(path),
        }
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        Ok(Self::new(config.resolved_encodings()?)
            .with_allow_lossy(config.encoding.allow_lossy)
            .with_suffixes(config.output.suffixes.clone())
            .with_delete_original(config.output.delete_original)
            .with_overwrite_existing(config.output.overwrite_existing))
    }

    pub fn with_allow_lossy(mut self, allow: bool) -> Self {
        self.allow_lossy = allow;
        self
    }

    pub fn with_suffixes(mut self, suffixes: [String; 2]) -> Self {
        self.suffixes = suffixes;
        self
    }

    pub fn with_delete_original(mut self, delete: bool) -> Self {
        self.delete_original = delete;
        self
    }

    pub fn with_overwrite_existing(mut self, overwrite: bool) -> Self {
        self.overwrite_existing = overwrite;
        self
    }

    /// Replaces the call that deletes the original.
    #[cfg(test)]
    pub(crate) fn with_remover(mut self, remove: fn(&Path) -> io::Result<()>) -> Self {
        self.remove = remove;
        self
    }

    /// Reads, splits and writes `input`, then removes it.
    pub fn split(&self, input: &Path) -> Result<SplitOutcome> {
        let plan = self.plan(input)?;
        self.write_halves(&plan)?;

        if self.delete_original {
            self.remove_original(&plan.input).map_err(|error| match error {
                SplitError::DeleteFailure { path, source, .. } => SplitError::DeleteFailure {
                    path,
                    source,
                    outcome: Some(Box::new(plan.to_outcome(false))),
                },
                other => other,
            })?;
        }

        Ok(plan.to_outcome(self.delete_original))
    }

    /// Phase one: read and decode the input and prepare both halves in memory.
    pub fn plan(&self, input: &Path) -> Result<SplitPlan> {
        if !input.exists() {
            return Err(SplitError::MissingInput {
                path: input.to_path_buf(),
            });
        }

        let bytes = fs::read(input).map_err(|e| match e.kind() {
            io::ErrorKind::NotFound => SplitError::MissingInput {
                path: input.to_path_buf(),
            },
            _ => SplitError::Io(e),
        })?;

        let Decoded {
            text,
            encoding,
            lossy,
        } = encoding::detect(&bytes, &self.candidates, self.allow_lossy).ok_or_else(|| {
            SplitError::UnreadableEncoding {
                path: input.to_path_buf(),
                tried: self
                    .candidates
                    .iter()
                    .map(|e| e.name().to_string())
                    .collect(),
            }
        })?;

        let partition = Partition::from_text(&text).ok_or_else(|| SplitError::EmptyInput {
            path: input.to_path_buf(),
        })?;

        let (first_bytes, first_replaced) = encoding::encode_lossy(&partition.render_first(), encoding);
        let (second_bytes, second_replaced) =
            encoding::encode_lossy(&partition.render_second(), encoding);

        Ok(SplitPlan {
            input: input.to_path_buf(),
            encoding,
            lossy_decode: lossy,
            replaced_on_encode: first_replaced || second_replaced,
            total_lines: partition.total_lines(),
            first: HalfPlan {
                path: half_path(input, &self.suffixes[0]),
                rows: partition.first.len(),
                bytes: first_bytes,
            },
            second: HalfPlan {
                path: half_path(input, &self.suffixes[1]),
                rows: partition.second.len(),
                bytes: second_bytes,
            },
        })
    }

    /// Phase two: stage both halves next to their targets, then move them
    /// into place. The input is never touched here.
    pub fn write_halves(&self, plan: &SplitPlan) -> Result<()> {
        let halves = [&plan.first, &plan.second];

        if !self.overwrite_existing {
            if let Some(existing) = halves.iter().find(|half| half.path.exists()) {
                return Err(SplitError::OutputExists {
                    path: existing.path.clone(),
                });
            }
        }

        let staged_first = self.stage(&plan.first)?;
        let staged_second = self.stage(&plan.second)?;

        self.persist(staged_first, &plan.first.path)?;
        self.persist(staged_second, &plan.second.path)?;

        Ok(())
    }

    /// Phase three: remove the input after both halves exist.
    pub fn remove_original(&self, input: &Path) -> Result<()> {
        (self.remove)(input).map_err(|source| SplitError::DeleteFailure {
            path: input.to_path_buf(),
            source,
            outcome: None,
        })
    }

    fn stage(&self, half: &HalfPlan) -> Result<NamedTempFile> {
        let write_failure = |e: io::Error| SplitError::WriteFailure {
            path: half.path.clone(),
            source: e,
        };

        let parent = match half.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };

        let temp_file = NamedTempFile::new_in(parent).map_err(write_failure)?;
        let mut writer = BufWriter::with_capacity(WRITE_BUFFER_SIZE, temp_file);
        writer.write_all(&half.bytes).map_err(write_failure)?;

        let temp_file = writer
            .into_inner()
            .map_err(|e| write_failure(e.into_error()))?;
        temp_file.as_file().sync_all().map_err(write_failure)?;

        Ok(temp_file)
    }

    fn persist(&self, staged: NamedTempFile, target: &Path) -> Result<()> {
        let persisted = if self.overwrite_existing {
            staged.persist(target)
        } else {
            staged.persist_noclobber(target)
        };

        persisted.map(|_| ()).map_err(|e| SplitError::WriteFailure {
            path: target.to_path_buf(),
            source: e.error,
        })
    }
}
