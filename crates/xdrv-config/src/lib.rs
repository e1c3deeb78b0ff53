// SPDX-License-Identifier: MIT OR Apache-2.0
//! Configuration loading, validation, and merging for the Xapian port driver.
//!
//! This crate provides [`DriverConfig`] together with helpers for loading
//! from TOML files, applying environment overrides, merging overlays, and
//! producing advisory [`ConfigWarning`]s.
#![deny(unsafe_code)]
#![warn(missing_docs)]

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::path::Path;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Errors that can occur during configuration loading or validation.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The requested configuration file was not found.
    #[error("config file not found: {path}")]
    FileNotFound {
        /// Path that was requested.
        path: String,
    },

    /// The file or an override could not be parsed.
    #[error("failed to parse config: {reason}")]
    ParseError {
        /// Human-readable parse error detail.
        reason: String,
    },

    /// Semantic validation failed (one or more problems).
    #[error("config validation failed: {reasons:?}")]
    ValidationError {
        /// Individual validation failure messages.
        reasons: Vec<String>,
    },
}

// ---------------------------------------------------------------------------
// Warnings
// ---------------------------------------------------------------------------

/// Advisory-level issues that do not prevent operation but deserve attention.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigWarning {
    /// A size limit is unusually large.
    LargeLimit {
        /// Name of the field.
        field: String,
        /// Configured value in bytes.
        bytes: u64,
    },
    /// Replies may be larger than the frames the port accepts.
    ReplyLimitAboveFrameLimit {
        /// Effective reply limit.
        reply: u64,
        /// Effective frame limit.
        frame: u64,
    },
}

impl std::fmt::Display for ConfigWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigWarning::LargeLimit { field, bytes } => {
                write!(f, "'{field}' is unusually large ({bytes} bytes)")
            }
            ConfigWarning::ReplyLimitAboveFrameLimit { reply, frame } => {
                write!(
                    f,
                    "max_reply_bytes ({reply}) exceeds max_frame_bytes ({frame})"
                )
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Config types
// ---------------------------------------------------------------------------

/// Runtime configuration for the port driver.
#[derive(Debug, Clone, Deserialize, Serialize, JsonSchema, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct DriverConfig {
    /// Log level override (e.g. `"debug"`, `"info"`, `"warn"`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log_level: Option<String>,

    /// Largest inbound command frame accepted, in bytes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_frame_bytes: Option<u64>,

    /// Largest reply payload a command may produce, in bytes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_reply_bytes: Option<u64>,
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self {
            log_level: Some("info".into()),
            max_frame_bytes: None,
            max_reply_bytes: None,
        }
    }
}

impl DriverConfig {
    /// Effective frame limit.
    #[must_use]
    pub fn frame_limit(&self) -> usize {
        to_usize(self.max_frame_bytes.unwrap_or(DEFAULT_LIMIT_BYTES))
    }

    /// Effective reply limit.
    #[must_use]
    pub fn reply_limit(&self) -> usize {
        to_usize(self.max_reply_bytes.unwrap_or(DEFAULT_LIMIT_BYTES))
    }

    /// Effective log level.
    #[must_use]
    pub fn log_level(&self) -> &str {
        self.log_level.as_deref().unwrap_or("info")
    }
}

fn to_usize(bytes: u64) -> usize {
    usize::try_from(bytes).unwrap_or(usize::MAX)
}

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Frame and reply limit used when none is configured (16 MiB).
pub const DEFAULT_LIMIT_BYTES: u64 = 16 * 1024 * 1024;

/// Threshold above which a limit generates a warning (256 MiB).
const LARGE_LIMIT_THRESHOLD: u64 = 256 * 1024 * 1024;

/// Frames carry a `u32` length prefix.
const MAX_FRAME_BYTES: u64 = u32::MAX as u64;

/// A reply body is one status byte plus the payload, and must fit a frame.
const MAX_REPLY_BYTES: u64 = MAX_FRAME_BYTES - 1;

/// Smallest useful reply payload: one `u32` (a docid or a count).
const MIN_REPLY_BYTES: u64 = 4;

/// Recognised log levels.
const VALID_LOG_LEVELS: &[&str] = &["error", "warn", "info", "debug", "trace"];

/// Environment variables read by [`apply_env_overrides`].
pub const ENV_LOG_LEVEL: &str = "XDRV_LOG_LEVEL";
/// See [`ENV_LOG_LEVEL`].
pub const ENV_MAX_FRAME_BYTES: &str = "XDRV_MAX_FRAME_BYTES";
/// See [`ENV_LOG_LEVEL`].
pub const ENV_MAX_REPLY_BYTES: &str = "XDRV_MAX_REPLY_BYTES";

// ---------------------------------------------------------------------------
// Loading
// ---------------------------------------------------------------------------

/// Load a [`DriverConfig`] from an optional TOML file path.
///
/// * If `path` is `Some`, reads and parses the file.
/// * If `path` is `None`, returns [`DriverConfig::default()`].
///
/// Environment variable overrides are applied on top in both cases.
pub fn load_config(path: Option<&Path>) -> Result<DriverConfig, ConfigError> {
    let mut config = match path {
        Some(p) => {
            let content = std::fs::read_to_string(p).map_err(|_| ConfigError::FileNotFound {
                path: p.display().to_string(),
            })?;
            parse_toml(&content)?
        }
        None => DriverConfig::default(),
    };
    apply_env_overrides(&mut config)?;
    Ok(config)
}

/// Parse a TOML string into a [`DriverConfig`].
pub fn parse_toml(content: &str) -> Result<DriverConfig, ConfigError> {
    toml::from_str::<DriverConfig>(content).map_err(|e| ConfigError::ParseError {
        reason: e.to_string(),
    })
}

// ---------------------------------------------------------------------------
// Env overrides
// ---------------------------------------------------------------------------

/// Apply environment variable overrides.
///
/// Recognised variables:
/// - `XDRV_LOG_LEVEL`
/// - `XDRV_MAX_FRAME_BYTES`
/// - `XDRV_MAX_REPLY_BYTES`
pub fn apply_env_overrides(config: &mut DriverConfig) -> Result<(), ConfigError> {
    apply_overrides(config, |key| std::env::var(key).ok())
}

/// Apply overrides from any key lookup, using the environment variable names.
pub fn apply_overrides(
    config: &mut DriverConfig,
    lookup: impl Fn(&str) -> Option<String>,
) -> Result<(), ConfigError> {
    if let Some(val) = lookup(ENV_LOG_LEVEL) {
        config.log_level = Some(val);
    }
    if let Some(val) = lookup(ENV_MAX_FRAME_BYTES) {
        config.max_frame_bytes = Some(parse_bytes(ENV_MAX_FRAME_BYTES, &val)?);
    }
    if let Some(val) = lookup(ENV_MAX_REPLY_BYTES) {
        config.max_reply_bytes = Some(parse_bytes(ENV_MAX_REPLY_BYTES, &val)?);
    }
    Ok(())
}

fn parse_bytes(key: &str, val: &str) -> Result<u64, ConfigError> {
    val.trim().parse().map_err(|_| ConfigError::ParseError {
        reason: format!("{key}: '{val}' is not a byte count"),
    })
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

/// Validate a parsed configuration, returning advisory warnings.
///
/// Hard errors (unknown log level, limits too small to be useful or too
/// large to frame) are returned
/// as a [`ConfigError::ValidationError`]; soft issues come back as warnings.
pub fn validate_config(config: &DriverConfig) -> Result<Vec<ConfigWarning>, ConfigError> {
    let mut errors: Vec<String> = Vec::new();
    let mut warnings: Vec<ConfigWarning> = Vec::new();

    if let Some(ref level) = config.log_level {
        if !VALID_LOG_LEVELS.contains(&level.as_str()) {
            errors.push(format!("invalid log_level '{level}'"));
        }
    }

    let limits = [
        ("max_frame_bytes", config.max_frame_bytes, 1, MAX_FRAME_BYTES),
        (
            "max_reply_bytes",
            config.max_reply_bytes,
            MIN_REPLY_BYTES,
            MAX_REPLY_BYTES,
        ),
    ];
    for (field, value, min, max) in limits {
        let Some(bytes) = value else { continue };
        if bytes < min || bytes > max {
            errors.push(format!("{field} {bytes} out of range ({min}..={max})"));
        } else if bytes > LARGE_LIMIT_THRESHOLD {
            warnings.push(ConfigWarning::LargeLimit {
                field: field.into(),
                bytes,
            });
        }
    }

    let frame = config.max_frame_bytes.unwrap_or(DEFAULT_LIMIT_BYTES);
    let reply = config.max_reply_bytes.unwrap_or(DEFAULT_LIMIT_BYTES);
    if reply > frame {
        warnings.push(ConfigWarning::ReplyLimitAboveFrameLimit { reply, frame });
    }

    if errors.is_empty() {
        Ok(warnings)
    } else {
        Err(ConfigError::ValidationError { reasons: errors })
    }
}

// ---------------------------------------------------------------------------
// Merging
// ---------------------------------------------------------------------------

/// Merge two configurations.  Values in `overlay` take precedence over `base`.
pub fn merge_configs(base: DriverConfig, overlay: DriverConfig) -> DriverConfig {
    DriverConfig {
        log_level: overlay.log_level.or(base.log_level),
        max_frame_bytes: overlay.max_frame_bytes.or(base.max_frame_bytes),
        max_reply_bytes: overlay.max_reply_bytes.or(base.max_reply_bytes),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
