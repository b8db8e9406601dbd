//! Configuration management with layered loading
//!
//! Precedence (lowest to highest):
//! 1. Compiled defaults
//! 2. Global config: `$XDG_CONFIG_HOME/guesstree/guesstree.toml`
//! 3. Local config: `<dir>/.guesstree.toml`
//! 4. Environment variables: `GUESSTREE_*` prefix, nested keys joined by `__`
//!    (e.g. `GUESSTREE_CODEC__INDENT=2`)

use std::path::{Path, PathBuf};

use config::{Config, ConfigError, Environment, File};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use crate::application::ApplicationError;
use crate::domain::arena::DEFAULT_SLAB_SIZE;
use crate::domain::codec::DEFAULT_INDENT;
use crate::domain::{ArenaOptions, CodecOptions};

/// Name of the subject a fresh knowledge base starts with.
pub const DEFAULT_ROOT_NAME: &str = "nothing";

/// Widest accepted `codec.indent`.
pub const MAX_INDENT: usize = 64;

/// Text arena configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ArenaConfig {
    /// Slab granularity in bytes
    pub slab_size: usize,
    /// Upper bound on text bytes per knowledge base
    pub max_bytes: Option<usize>,
}

impl Default for ArenaConfig {
    fn default() -> Self {
        Self {
            slab_size: DEFAULT_SLAB_SIZE,
            max_bytes: None,
        }
    }
}

/// Text form configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct CodecConfig {
    /// Spaces per nesting level
    pub indent: usize,
    /// Deepest nesting accepted when loading, unbounded if unset
    pub max_depth: Option<usize>,
    /// Save on a single line
    pub compact: bool,
}

impl Default for CodecConfig {
    fn default() -> Self {
        Self {
            indent: DEFAULT_INDENT,
            max_depth: None,
            compact: false,
        }
    }
}

/// Interactive session configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct SessionConfig {
    /// Subject of a fresh knowledge base
    pub root_name: String,
    /// Knowledge base loaded by `play` when no file is given
    pub knowledge_file: Option<PathBuf>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            root_name: DEFAULT_ROOT_NAME.to_string(),
            knowledge_file: None,
        }
    }
}

/// Unified configuration for guesstree.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Settings {
    pub arena: ArenaConfig,
    pub codec: CodecConfig,
    pub session: SessionConfig,
}

/// Get the XDG config directory for guesstree.
pub fn global_config_dir() -> Option<PathBuf> {
    ProjectDirs::from("", "", "guesstree").map(|dirs| dirs.config_dir().to_path_buf())
}

/// Get the path to the global config file.
pub fn global_config_path() -> Option<PathBuf> {
    global_config_dir().map(|dir| dir.join("guesstree.toml"))
}

/// Get the path to the local config file in `dir`.
pub fn local_config_path(dir: &Path) -> PathBuf {
    dir.join(".guesstree.toml")
}

impl Settings {
    /// Load settings with layered precedence.
    ///
    /// # Arguments
    /// * `local_dir` - Optional directory holding a `.guesstree.toml`
    pub fn load(local_dir: Option<&Path>) -> Result<Self, ApplicationError> {
        let defaults = Settings::default();
        let mut builder = Config::builder()
            .set_default("arena.slab_size", defaults.arena.slab_size as u64)
            .map_err(config_err)?
            .set_default("codec.indent", defaults.codec.indent as u64)
            .map_err(config_err)?
            .set_default("codec.compact", defaults.codec.compact)
            .map_err(config_err)?
            .set_default("session.root_name", defaults.session.root_name)
            .map_err(config_err)?;

        if let Some(global_path) = global_config_path() {
            if global_path.exists() {
                builder = builder.add_source(File::from(global_path).required(false));
            }
        }

        if let Some(dir) = local_dir {
            let local_path = local_config_path(dir);
            if local_path.exists() {
                builder = builder.add_source(File::from(local_path).required(true));
            }
        }

        builder = builder.add_source(
            Environment::with_prefix("GUESSTREE")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let config = builder.build().map_err(config_err)?;
        let mut settings: Self = config.try_deserialize().map_err(config_err)?;

        settings.expand_paths();
        settings.validate()?;
        Ok(settings)
    }

    /// Expand `~`, `$VAR` and `${VAR}` in path-like fields.
    fn expand_paths(&mut self) {
        if let Some(file) = &self.session.knowledge_file {
            let raw = file.to_string_lossy();
            let expanded = shellexpand::full(raw.as_ref())
                .map(|s| s.into_owned())
                .unwrap_or_else(|_| raw.to_string());
            self.session.knowledge_file = Some(PathBuf::from(expanded));
        }
    }

    fn validate(&self) -> Result<(), ApplicationError> {
        if self.arena.slab_size == 0 {
            return Err(ApplicationError::Config {
                message: "arena.slab_size must be positive".to_string(),
            });
        }
        if self.codec.indent > MAX_INDENT {
            return Err(ApplicationError::Config {
                message: format!(
                    "codec.indent must be at most {MAX_INDENT}, got {}",
                    self.codec.indent
                ),
            });
        }
        if self.codec.max_depth == Some(0) {
            return Err(ApplicationError::Config {
                message: "codec.max_depth must be positive".to_string(),
            });
        }
        if self.session.root_name.is_empty() || self.session.root_name.contains('"') {
            return Err(ApplicationError::Config {
                message: format!(
                    "session.root_name must be non-empty and free of '\"': {:?}",
                    self.session.root_name
                ),
            });
        }
        Ok(())
    }

    pub fn arena_options(&self) -> ArenaOptions {
        ArenaOptions {
            slab_size: self.arena.slab_size,
            max_bytes: self.arena.max_bytes,
        }
    }

    pub fn codec_options(&self) -> CodecOptions {
        CodecOptions {
            indent: self.codec.indent,
            max_depth: self.codec.max_depth,
            compact: self.codec.compact,
        }
    }

    /// Show the effective configuration as TOML.
    pub fn to_toml(&self) -> Result<String, ApplicationError> {
        toml::to_string_pretty(self).map_err(|e| ApplicationError::Config {
            message: format!("serialize config: {e}"),
        })
    }

    /// Generate a template config file.
    pub fn template() -> String {
        r#"# guesstree configuration
#
# Locations (by precedence, lowest to highest):
#   Global: ~/.config/guesstree/guesstree.toml
#   Local:  <dir>/.guesstree.toml
#   Env:    GUESSTREE_<SECTION>__<KEY>, e.g. GUESSTREE_CODEC__INDENT=2

[arena]
# Slab granularity in bytes
# slab_size = 1024

# Upper bound on text bytes per knowledge base (unbounded if unset)
# max_bytes = 1048576

[codec]
# Spaces per nesting level when saving (at most 64)
# indent = 4

# Deepest nesting accepted when loading (unbounded if unset)
# max_depth = 100000

# Save the whole tree on a single line
# compact = false

[session]
# Subject a fresh knowledge base starts with
# root_name = "nothing"

# Knowledge base used by `play` when no file is given
# knowledge_file = "~/.local/share/guesstree/knowledge.txt"
"#
        .to_string()
    }
}

fn config_err(e: ConfigError) -> ApplicationError {
    ApplicationError::Config {
        message: e.to_string(),
    }
}
