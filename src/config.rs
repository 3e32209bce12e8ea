//! Configuration management with layered loading
//!
//! Precedence (lowest to highest):
//! 1. Compiled defaults
//! 2. Global config: `$XDG_CONFIG_HOME/orgchart/orgchart.toml`
//! 3. Local config: `<dir>/.orgchart.toml` (`-C <dir>`, default cwd)
//! 4. Environment variables: `ORGCHART_*` prefix, `__` between sections
//!
//! Later layers win. Arrays are replaced, not merged.

use std::path::{Path, PathBuf};

use config::{Config, ConfigError, Environment, Map};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::application::ApplicationError;
use crate::util::path::expand_path;

pub const LOCAL_CONFIG_FILE: &str = ".orgchart.toml";

/// How the chart is drawn.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct RenderSettings {
    /// Show the number of direct subordinates
    pub show_counts: bool,
    /// Show ids next to names when they differ
    pub show_ids: bool,
    /// Attribute keys shown after the name
    pub attributes: Vec<String>,
    /// Node ids collapsed when the chart is first shown
    pub collapsed: Vec<String>,
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            show_counts: true,
            show_ids: true,
            attributes: vec!["position".into()],
            collapsed: vec![],
        }
    }
}

/// Raw render settings for intermediate parsing (None = not specified).
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawRenderSettings {
    pub show_counts: Option<bool>,
    pub show_ids: Option<bool>,
    pub attributes: Option<Vec<String>>,
    pub collapsed: Option<Vec<String>>,
}

/// Raw settings for intermediate parsing.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawSettings {
    pub chart_file: Option<PathBuf>,
    pub render: RawRenderSettings,
}

/// Unified configuration for orgchart.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(default)]
pub struct Settings {
    /// Chart used when no file is given on the command line
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chart_file: Option<PathBuf>,
    pub render: RenderSettings,
}

/// Get the XDG config directory for orgchart.
pub fn global_config_dir() -> Option<PathBuf> {
    ProjectDirs::from("", "", "orgchart").map(|dirs| dirs.config_dir().to_path_buf())
}

/// Get the path to the global config file.
pub fn global_config_path() -> Option<PathBuf> {
    global_config_dir().map(|dir| dir.join("orgchart.toml"))
}

/// Get the path to the local config file in `dir`.
pub fn local_config_path(dir: &Path) -> PathBuf {
    dir.join(LOCAL_CONFIG_FILE)
}

/// Load a TOML file into RawSettings for manual merging.
fn load_raw_settings(path: &Path) -> Result<RawSettings, ApplicationError> {
    let content = std::fs::read_to_string(path).map_err(|e| ApplicationError::Config {
        message: format!("read {}: {}", path.display(), e),
    })?;
    toml::from_str(&content).map_err(|e| ApplicationError::Config {
        message: format!("parse {}: {}", path.display(), e),
    })
}

impl Settings {
    /// Overlay wins where it specifies a value.
    fn merge_with(&self, overlay: &RawSettings) -> Self {
        let render = &overlay.render;
        Self {
            chart_file: overlay
                .chart_file
                .clone()
                .or_else(|| self.chart_file.clone()),
            render: RenderSettings {
                show_counts: render.show_counts.unwrap_or(self.render.show_counts),
                show_ids: render.show_ids.unwrap_or(self.render.show_ids),
                attributes: render
                    .attributes
                    .clone()
                    .unwrap_or_else(|| self.render.attributes.clone()),
                collapsed: render
                    .collapsed
                    .clone()
                    .unwrap_or_else(|| self.render.collapsed.clone()),
            },
        }
    }

    /// Load settings with layered precedence.
    ///
    /// # Arguments
    /// * `local_dir` - Directory searched for `.orgchart.toml`
    pub fn load(local_dir: Option<&Path>) -> Result<Self, ApplicationError> {
        Self::load_layers(global_config_path().as_deref(), local_dir, None)
    }

    /// Load from explicit layer locations.
    ///
    /// `env` replaces the process environment as source of `ORGCHART_*`
    /// overrides when given.
    pub fn load_layers(
        global_path: Option<&Path>,
        local_dir: Option<&Path>,
        env: Option<Map<String, String>>,
    ) -> Result<Self, ApplicationError> {
        // 1. Start with defaults
        let mut current = Self::default();

        // 2. Global config
        if let Some(global_path) = global_path {
            if global_path.exists() {
                debug!("global config: {}", global_path.display());
                current = current.merge_with(&load_raw_settings(global_path)?);
            }
        }

        // 3. Local config
        if let Some(dir) = local_dir {
            let local_path = local_config_path(dir);
            if local_path.exists() {
                debug!("local config: {}", local_path.display());
                current = current.merge_with(&load_raw_settings(&local_path)?);
            }
        }

        // 4. Environment variables
        current = Self::apply_env_overrides(current, env)?;

        current.expand_paths();
        Ok(current)
    }

    /// Apply ORGCHART_* environment variables as explicit overrides.
    fn apply_env_overrides(
        mut settings: Self,
        source: Option<Map<String, String>>,
    ) -> Result<Self, ApplicationError> {
        let environment = Environment::with_prefix("ORGCHART")
            .prefix_separator("_")
            .separator("__")
            .source(source);

        let config = Config::builder()
            .add_source(environment)
            .build()
            .map_err(config_err)?;

        if let Ok(val) = config.get_string("chart_file") {
            settings.chart_file = Some(PathBuf::from(val));
        }
        if let Ok(val) = config.get_bool("render.show_counts") {
            settings.render.show_counts = val;
        }
        if let Ok(val) = config.get_bool("render.show_ids") {
            settings.render.show_ids = val;
        }
        if let Ok(val) = config.get_string("render.attributes") {
            settings.render.attributes = split_list(&val);
        }
        if let Ok(val) = config.get_string("render.collapsed") {
            settings.render.collapsed = split_list(&val);
        }

        Ok(settings)
    }

    /// Expand `~` and `$VAR` in path-like fields.
    fn expand_paths(&mut self) {
        if let Some(path) = &self.chart_file {
            self.chart_file = Some(expand_path(path));
        }
    }

    /// Show the effective configuration as TOML.
    pub fn to_toml(&self) -> Result<String, ApplicationError> {
        toml::to_string_pretty(self).map_err(|source| ApplicationError::Serialize {
            context: "settings".to_string(),
            source,
        })
    }

    /// Generate a template config file.
    pub fn template() -> String {
        r#"# orgchart configuration
#
# Locations (by precedence, lowest to highest):
#   Global: ~/.config/orgchart/orgchart.toml
#   Local:  <dir>/.orgchart.toml  (dir from -C, default: current directory)
#   Env:    ORGCHART_* environment variables, e.g. ORGCHART_RENDER__SHOW_COUNTS=false
#
# Later layers replace earlier values, arrays included.

# Chart used when no --file is given
# chart_file = "~/charts/org.toml"

[render]
# Show number of direct subordinates
# show_counts = true

# Show ids next to names when they differ
# show_ids = true

# Attributes shown after the name
# attributes = ["position"]

# Nodes collapsed on first display
# collapsed = ["SUPERINTENDENTE1"]
"#
        .to_string()
    }
}

/// Comma-separated env value into a list, empty items dropped.
fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

fn config_err(e: ConfigError) -> ApplicationError {
    ApplicationError::Config {
        message: e.to_string(),
    }
}
