//! Backup artifact naming
//!
//! An artifact is named `backup_<YYYY-MM-DD_HH-mm-ss>[_N].<ext>`. The
//! optional `_N` sequence only appears when two artifacts would otherwise
//! share a second. The provenance descriptor shares the stem and uses the
//! `.txt` extension.

use chrono::NaiveDateTime;
use serde::{Serialize, Serializer};
use std::fmt;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::clock::truncate_to_second;

pub const ARTIFACT_PREFIX: &str = "backup_";
pub const DESCRIPTOR_EXTENSION: &str = "txt";
/// Suffix of the file an export is written to before it is renamed into place
pub const STAGING_SUFFIX: &str = "partial";

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d_%H-%M-%S";
const TIMESTAMP_LEN: usize = 19;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ArtifactNameError {
    #[error("'{0}' does not start with 'backup_'")]
    MissingPrefix(String),
    #[error("'{name}' does not end with '.{extension}'")]
    WrongExtension { name: String, extension: String },
    #[error("'{0}' does not embed a YYYY-MM-DD_HH-mm-ss timestamp")]
    BadTimestamp(String),
    #[error("'{0}' has an invalid sequence suffix")]
    BadSequence(String),
}

/// Parsed identity of one backup artifact
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ArtifactName {
    timestamp: NaiveDateTime,
    sequence: u32,
    extension: String,
}

impl ArtifactName {
    /// Name for an artifact taken at `timestamp` (truncated to the second)
    pub fn new(timestamp: NaiveDateTime, extension: impl Into<String>) -> Self {
        Self {
            timestamp: truncate_to_second(timestamp),
            sequence: 0,
            extension: extension.into(),
        }
    }

    /// Same timestamp with a disambiguating sequence number (0 = none)
    pub fn with_sequence(mut self, sequence: u32) -> Self {
        self.sequence = sequence;
        self
    }

    pub fn timestamp(&self) -> NaiveDateTime {
        self.timestamp
    }

    pub fn sequence(&self) -> u32 {
        self.sequence
    }

    pub fn extension(&self) -> &str {
        &self.extension
    }

    /// `backup_2026-01-02_03-00-00` or `backup_2026-01-02_03-00-00_1`
    pub fn stem(&self) -> String {
        let ts = self.timestamp.format(TIMESTAMP_FORMAT);
        if self.sequence == 0 {
            format!("{}{}", ARTIFACT_PREFIX, ts)
        } else {
            format!("{}{}_{}", ARTIFACT_PREFIX, ts, self.sequence)
        }
    }

    pub fn file_name(&self) -> String {
        format!("{}.{}", self.stem(), self.extension)
    }

    pub fn descriptor_file_name(&self) -> String {
        format!("{}.{}", self.stem(), DESCRIPTOR_EXTENSION)
    }

    pub fn staging_file_name(&self) -> String {
        format!("{}.{}", self.file_name(), STAGING_SUFFIX)
    }

    pub fn path_in(&self, dir: &Path) -> PathBuf {
        dir.join(self.file_name())
    }

    pub fn descriptor_path_in(&self, dir: &Path) -> PathBuf {
        dir.join(self.descriptor_file_name())
    }

    pub fn staging_path_in(&self, dir: &Path) -> PathBuf {
        dir.join(self.staging_file_name())
    }

    /// Parse a directory entry name; anything not produced by `file_name`
    /// for the given extension is rejected.
    pub fn parse(file_name: &str, extension: &str) -> Result<Self, ArtifactNameError> {
        let suffix = format!(".{}", extension);
        let stem = file_name
            .strip_suffix(&suffix)
            .ok_or_else(|| ArtifactNameError::WrongExtension {
                name: file_name.to_string(),
                extension: extension.to_string(),
            })?;
        let rest = stem
            .strip_prefix(ARTIFACT_PREFIX)
            .ok_or_else(|| ArtifactNameError::MissingPrefix(file_name.to_string()))?;

        let ts_part = rest
            .get(..TIMESTAMP_LEN)
            .ok_or_else(|| ArtifactNameError::BadTimestamp(file_name.to_string()))?;
        let timestamp = NaiveDateTime::parse_from_str(ts_part, TIMESTAMP_FORMAT)
            .map_err(|_| ArtifactNameError::BadTimestamp(file_name.to_string()))?;

        let sequence = match &rest[TIMESTAMP_LEN..] {
            "" => 0,
            tail => {
                let digits = tail
                    .strip_prefix('_')
                    .filter(|d| !d.is_empty() && d.bytes().all(|b| b.is_ascii_digit()))
                    .ok_or_else(|| ArtifactNameError::BadSequence(file_name.to_string()))?;
                let n = digits
                    .parse::<u32>()
                    .map_err(|_| ArtifactNameError::BadSequence(file_name.to_string()))?;
                if n == 0 {
                    return Err(ArtifactNameError::BadSequence(file_name.to_string()));
                }
                n
            }
        };

        Ok(Self {
            timestamp,
            sequence,
            extension: extension.to_string(),
        })
    }

    /// Stem of a descriptor file name, if it looks like one
    pub fn descriptor_stem(file_name: &str) -> Option<&str> {
        file_name
            .strip_suffix(DESCRIPTOR_EXTENSION)
            .and_then(|s| s.strip_suffix('.'))
            .filter(|s| s.starts_with(ARTIFACT_PREFIX))
    }
}

impl fmt::Display for ArtifactName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.file_name())
    }
}

impl Serialize for ArtifactName {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// A snapshot file on disk
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BackupArtifact {
    pub name: ArtifactName,
    pub path: PathBuf,
    pub size_bytes: u64,
}

impl BackupArtifact {
    pub fn descriptor_path(&self) -> PathBuf {
        match self.path.parent() {
            Some(dir) => self.name.descriptor_path_in(dir),
            None => PathBuf::from(self.name.descriptor_file_name()),
        }
    }

    pub fn size_kib(&self) -> f64 {
        self.size_bytes as f64 / 1024.0
    }
}
