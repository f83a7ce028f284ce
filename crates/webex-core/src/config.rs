//! Grading configuration.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::model::RegexSource;

/// Behavioural switches that reconcile the historical runtime variants.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GradingRules {
    /// Dropdowns receive correct/incorrect markers. When off, a dropdown
    /// is always neutral and earns nothing.
    #[serde(default = "default_true")]
    pub select_marks_correctness: bool,
    /// Append the points suffix only when the section has possible points.
    #[serde(default)]
    pub points_only_when_possible: bool,
    /// Answer list and response used by regex-mode items.
    #[serde(default)]
    pub regex_source: RegexSource,
    /// Divisor of the running average.
    #[serde(default = "default_average_divisor")]
    pub average_divisor: f64,
}

impl Default for GradingRules {
    fn default() -> Self {
        Self {
            select_marks_correctness: true,
            points_only_when_possible: false,
            regex_source: RegexSource::Normalized,
            average_divisor: default_average_divisor(),
        }
    }
}

/// Top-level webex configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GradingConfig {
    #[serde(default)]
    pub rules: GradingRules,
    /// Output directory for grade reports.
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
}

impl Default for GradingConfig {
    fn default() -> Self {
        Self {
            rules: GradingRules::default(),
            output_dir: default_output_dir(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_average_divisor() -> f64 {
    5.0
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("./webex-results")
}

/// Load config from an explicit path, or search the default locations.
///
/// Search order without a path:
/// 1. `webex.toml` in the current directory
/// 2. `~/.config/webex/config.toml`
///
/// Environment variable overrides: `WEBEX_AVERAGE_DIVISOR`, `WEBEX_SELECT_MARKS`.
pub fn load_config_from(path: Option<&Path>) -> Result<GradingConfig> {
    let config_path = if let Some(p) = path {
        if p.exists() {
            Some(p.to_path_buf())
        } else {
            anyhow::bail!("config file not found: {}", p.display());
        }
    } else {
        let local = PathBuf::from("webex.toml");
        if local.exists() {
            Some(local)
        } else {
            dirs_path()
                .map(|home| home.join("config.toml"))
                .filter(|global| global.exists())
        }
    };

    let mut config = match config_path {
        Some(path) => {
            tracing::debug!("loading config from {}", path.display());
            let content = std::fs::read_to_string(&path)
                .with_context(|| format!("failed to read config: {}", path.display()))?;
            parse_config(&content)
                .with_context(|| format!("failed to parse config: {}", path.display()))?
        }
        None => GradingConfig::default(),
    };

    apply_env_overrides(&mut config, |name| std::env::var(name).ok())?;
    Ok(config)
}

/// Parse a TOML config document.
pub fn parse_config(content: &str) -> Result<GradingConfig> {
    let config: GradingConfig = toml::from_str(content)?;
    anyhow::ensure!(
        config.rules.average_divisor.is_finite() && config.rules.average_divisor > 0.0,
        "average_divisor must be a positive number"
    );
    Ok(config)
}

fn apply_env_overrides(
    config: &mut GradingConfig,
    lookup: impl Fn(&str) -> Option<String>,
) -> Result<()> {
    if let Some(divisor) = lookup("WEBEX_AVERAGE_DIVISOR") {
        let divisor: f64 = divisor
            .trim()
            .parse()
            .with_context(|| format!("invalid WEBEX_AVERAGE_DIVISOR: '{divisor}'"))?;
        anyhow::ensure!(
            divisor.is_finite() && divisor > 0.0,
            "WEBEX_AVERAGE_DIVISOR must be a positive number"
        );
        config.rules.average_divisor = divisor;
    }

    if let Some(flag) = lookup("WEBEX_SELECT_MARKS") {
        config.rules.select_marks_correctness = match flag.trim().to_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => true,
            "0" | "false" | "no" | "off" => false,
            other => anyhow::bail!("invalid WEBEX_SELECT_MARKS: '{other}'"),
        };
    }

    Ok(())
}

fn dirs_path() -> Option<PathBuf> {
    std::env::var("HOME")
        .ok()
        .map(|h| PathBuf::from(h).join(".config").join("webex"))
}
