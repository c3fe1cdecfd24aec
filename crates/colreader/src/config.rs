// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Reader configuration.
//!
//! Supports both programmatic and file-based configuration.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::path::Path;
use thiserror::Error;

use crate::memory::{ByteArena, DEFAULT_ARENA_BASE, MAX_ARENA_BASE};
use crate::navigator::split_tail;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Reader configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReaderConfig {
    /// Column paths whose absence is recorded without an error log.
    #[serde(default)]
    pub suppress_missing: BTreeSet<String>,

    /// First address of every in-memory dataset arena.
    #[serde(default = "default_arena_base")]
    pub arena_base: u64,
}

fn default_arena_base() -> u64 {
    DEFAULT_ARENA_BASE
}

impl Default for ReaderConfig {
    fn default() -> Self {
        Self {
            suppress_missing: BTreeSet::new(),
            arena_base: DEFAULT_ARENA_BASE,
        }
    }
}

impl ReaderConfig {
    /// Load configuration from a TOML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Parse configuration from TOML text.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Add a column path to the suppressed-missing set.
    pub fn suppress(mut self, path: impl Into<String>) -> Self {
        self.suppress_missing.insert(path.into());
        self
    }

    pub fn is_suppressed(&self, path: &str) -> bool {
        self.suppress_missing.contains(path)
    }

    /// Fresh arena starting at [`arena_base`](Self::arena_base).
    pub fn arena(&self) -> ByteArena {
        ByteArena::with_base(self.arena_base)
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.arena_base == 0 {
            return Err(ConfigError::Invalid(
                "arena_base 0 is reserved for the null address".into(),
            ));
        }
        if self.arena_base > MAX_ARENA_BASE {
            return Err(ConfigError::Invalid(format!(
                "arena_base {:#x} is above the maximum {:#x}",
                self.arena_base, MAX_ARENA_BASE
            )));
        }
        for path in &self.suppress_missing {
            if path.trim().is_empty() {
                return Err(ConfigError::Invalid("empty suppressed column path".into()));
            }
            let dotted = path.contains('.') && !path.ends_with('.');
            if path.starts_with('.') || (dotted && split_tail(path).is_none()) {
                return Err(ConfigError::Invalid(format!(
                    "malformed suppressed column path: {}",
                    path
                )));
            }
        }
        Ok(())
    }
}
