// ============================================================================
// rezzer-core/src/config.rs
// ============================================================================
//
// CONFIGURATION: Batch Configuration Structures and Constants
//
// This module defines the settings a batch runs with: the ProRes profile,
// the encoder thread policy and the runner-level options (encoder program,
// job concurrency, per-job timeout, overwrite behavior).
//
// KEY COMPONENTS:
// - Profile: The four ProRes quality levels accepted by prores_ks
// - ThreadPolicy: Whether each encoder process uses all cores or one
// - BatchSettings: The per-batch choices made by the user (profile, threads)
// - BatchConfig: Runner options shared by every batch
// - Constants for codec, pixel format and output naming
//
// AI-ASSISTANT-INFO: Configuration structures and constants for rezzer-core

// ---- Internal crate imports ----
use crate::error::{CoreError, CoreResult};

// ---- External crate imports ----
use serde::Serialize;

// ---- Standard library imports ----
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

// ============================================================================
// CONSTANTS
// ============================================================================

/// Encoder executable used when none is configured.
pub const DEFAULT_ENCODER_PROGRAM: &str = "ffmpeg";

/// Environment variable the CLI reads to override the encoder executable.
pub const ENCODER_ENV_VAR: &str = "REZZER_ENCODER";

/// ffmpeg video codec producing ProRes.
pub const PRORES_CODEC: &str = "prores_ks";

/// 10-bit 4:2:2, the pixel format every ProRes profile here is encoded in.
pub const PIXEL_FORMAT: &str = "yuv422p10le";

/// Appended to the input stem to form the output file name.
pub const OUTPUT_SUFFIX: &str = "_prores";

/// Output container extension.
pub const OUTPUT_EXTENSION: &str = "mov";

// ============================================================================
// PROFILE
// ============================================================================

/// ProRes quality level passed to the encoder as `-profile:v`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Profile {
    Proxy,
    Lt,
    #[default]
    Standard,
    Hq,
}

impl Profile {
    /// All profiles in encoder index order.
    pub const ALL: [Profile; 4] = [Profile::Proxy, Profile::Lt, Profile::Standard, Profile::Hq];

    /// Numeric value understood by prores_ks.
    pub const fn index(self) -> u8 {
        match self {
            Profile::Proxy => 0,
            Profile::Lt => 1,
            Profile::Standard => 2,
            Profile::Hq => 3,
        }
    }

    pub fn from_index(index: u8) -> Option<Self> {
        Self::ALL.get(usize::from(index)).copied()
    }

    /// Machine-friendly identifier for this profile.
    pub const fn as_str(self) -> &'static str {
        match self {
            Profile::Proxy => "proxy",
            Profile::Lt => "lt",
            Profile::Standard => "standard",
            Profile::Hq => "hq",
        }
    }

    /// Label shown to users, e.g. `2 - STANDARD`.
    pub fn label(self) -> String {
        format!("{} - {}", self.index(), self.as_str().to_ascii_uppercase())
    }

    pub const fn variants_display() -> &'static str {
        "0-3, proxy, lt, standard, hq"
    }
}

impl fmt::Display for Profile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing a profile from a string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProfileParseError {
    invalid_value: String,
}

impl ProfileParseError {
    pub fn new<S: Into<String>>(value: S) -> Self {
        Self {
            invalid_value: value.into(),
        }
    }
}

impl fmt::Display for ProfileParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Unknown ProRes profile '{}'. Valid options: {}",
            self.invalid_value,
            Profile::variants_display()
        )
    }
}

impl std::error::Error for ProfileParseError {}

impl FromStr for Profile {
    type Err = ProfileParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if let Ok(index) = trimmed.parse::<u8>() {
            return Profile::from_index(index).ok_or_else(|| ProfileParseError::new(s));
        }

        Profile::ALL
            .into_iter()
            .find(|profile| trimmed.eq_ignore_ascii_case(profile.as_str()))
            .ok_or_else(|| ProfileParseError::new(s))
    }
}

// ============================================================================
// THREAD POLICY
// ============================================================================

/// How many threads each encoder process is told to use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ThreadPolicy {
    /// One thread per available logical processor.
    #[default]
    Multi,
    Single,
}

impl ThreadPolicy {
    pub fn from_multithread_flag(multithread: bool) -> Self {
        if multithread {
            ThreadPolicy::Multi
        } else {
            ThreadPolicy::Single
        }
    }

    /// Thread count passed to the encoder. Queried from the host each call.
    pub fn thread_count(self) -> usize {
        match self {
            ThreadPolicy::Multi => num_cpus::get().max(1),
            ThreadPolicy::Single => 1,
        }
    }
}

// ============================================================================
// BATCH SETTINGS
// ============================================================================

/// The choices a user makes when starting a batch.
///
/// Both values are fixed for the lifetime of the batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BatchSettings {
    pub profile: Profile,
    pub thread_policy: ThreadPolicy,
}

impl BatchSettings {
    pub fn new(profile: Profile, thread_policy: ThreadPolicy) -> Self {
        Self {
            profile,
            thread_policy,
        }
    }
}

// ============================================================================
// BATCH CONFIG
// ============================================================================

/// Runner options shared by every batch a coordinator starts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchConfig {
    /// Encoder executable, looked up on `PATH` when not absolute.
    pub encoder_program: PathBuf,

    /// Maximum number of jobs running at once. `None` uses the number of
    /// logical processors.
    pub max_concurrent_jobs: Option<usize>,

    /// Kill an encoder that runs longer than this.
    pub job_timeout: Option<Duration>,

    /// Overwrite existing outputs (`-y`) instead of refusing (`-n`).
    pub overwrite: bool,
}

impl BatchConfig {
    pub fn new() -> Self {
        Self {
            encoder_program: PathBuf::from(DEFAULT_ENCODER_PROGRAM),
            max_concurrent_jobs: None,
            job_timeout: None,
            overwrite: false,
        }
    }

    /// Number of worker slots for a batch of `file_count` files.
    pub fn worker_count(&self, file_count: usize) -> usize {
        let limit = self.max_concurrent_jobs.unwrap_or_else(num_cpus::get);
        limit.min(file_count).max(1)
    }

    pub fn validate(&self) -> CoreResult<()> {
        if self.encoder_program.as_os_str().is_empty() {
            return Err(CoreError::Config(
                "encoder_program must not be empty".to_string(),
            ));
        }

        if self.max_concurrent_jobs == Some(0) {
            return Err(CoreError::Config(
                "max_concurrent_jobs must be at least 1".to_string(),
            ));
        }

        if self.job_timeout == Some(Duration::ZERO) {
            return Err(CoreError::Config(
                "job_timeout must be greater than zero".to_string(),
            ));
        }

        Ok(())
    }
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_profile_indices_match_encoder_values() {
        let indices: Vec<u8> = Profile::ALL.iter().map(|p| p.index()).collect();
        assert_eq!(indices, vec![0, 1, 2, 3]);
        assert_eq!(Profile::from_index(3), Some(Profile::Hq));
        assert_eq!(Profile::from_index(4), None);
    }

    #[test]
    fn test_profile_default_is_standard() {
        assert_eq!(Profile::default(), Profile::Standard);
        assert_eq!(Profile::default().label(), "2 - STANDARD");
    }

    #[test]
    fn test_profile_parses_names_and_indices() {
        assert_eq!("0".parse::<Profile>(), Ok(Profile::Proxy));
        assert_eq!("LT".parse::<Profile>(), Ok(Profile::Lt));
        assert_eq!(" hq ".parse::<Profile>(), Ok(Profile::Hq));
        assert_eq!("Standard".parse::<Profile>(), Ok(Profile::Standard));
    }

    #[test]
    fn test_profile_rejects_unknown_values() {
        let err = "4".parse::<Profile>().unwrap_err();
        assert!(err.to_string().contains("'4'"));
        assert!("4444xq".parse::<Profile>().is_err());
    }

    #[test]
    fn test_single_thread_policy_is_one() {
        assert_eq!(ThreadPolicy::Single.thread_count(), 1);
        assert!(ThreadPolicy::Multi.thread_count() >= 1);
        assert_eq!(ThreadPolicy::from_multithread_flag(false), ThreadPolicy::Single);
    }

    #[test]
    fn test_worker_count_is_bounded_by_batch_size() {
        let mut config = BatchConfig::new();
        config.max_concurrent_jobs = Some(8);
        assert_eq!(config.worker_count(3), 3);
        assert_eq!(config.worker_count(20), 8);
        assert_eq!(config.worker_count(0), 1);
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut config = BatchConfig::new();
        assert!(config.validate().is_ok());

        config.max_concurrent_jobs = Some(0);
        assert!(matches!(config.validate(), Err(CoreError::Config(_))));

        config.max_concurrent_jobs = None;
        config.job_timeout = Some(Duration::ZERO);
        assert!(matches!(config.validate(), Err(CoreError::Config(_))));

        config.job_timeout = None;
        config.encoder_program = PathBuf::new();
        assert!(matches!(config.validate(), Err(CoreError::Config(_))));
    }
}
