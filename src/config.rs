// src/config.rs
use anyhow::{bail, Result};
use std::path::PathBuf;

use crate::rolling::InputOrder;

/// Set to `1`/`true` to reject out-of-order input without passing `--strict`.
pub const ENV_STRICT: &str = "DELIVERY_AVG_STRICT";

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub input_file: PathBuf,
    /// Trailing window length in minutes.
    pub window_size: u32,
    pub input_order: InputOrder,
}

impl Config {
    /// Build a config from CLI values. `strict` wins; otherwise the
    /// environment decides, defaulting to trusted ordering.
    pub fn new(input_file: impl Into<PathBuf>, window_size: u32, strict: bool) -> Self {
        let input_order = if strict || strict_from_env() {
            InputOrder::Strict
        } else {
            InputOrder::Trusted
        };
        Self {
            input_file: input_file.into(),
            window_size,
            input_order,
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.window_size == 0 {
            bail!("window_size must be a positive number of minutes");
        }
        if self.input_file.as_os_str().is_empty() {
            bail!("input_file must not be empty");
        }
        Ok(())
    }
}

fn strict_from_env() -> bool {
    std::env::var(ENV_STRICT)
        .map(|v| matches!(v.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes"))
        .unwrap_or(false)
}
