//! Per-invocation resolution context and the resolution pipeline

use super::decoder::decode_into;
use super::defaults::ensure_default_file;
use super::error::{ConfigError, Result};
use super::flags::FlagSet;
use super::naming::{NameMode, DEFAULT_NAME_MODE};
use super::resolver::resolve;
use super::sources::{locate_config_file, EnvSnapshot, SourceSet};
use super::types::Config;
use std::fmt;
use std::path::{Path, PathBuf};

/// Base name of the config file (`jetpalm.yaml`, `~/.jetpalm.yaml`).
pub const CONFIG_BASE_NAME: &str = "jetpalm";

/// Prefix of the environment variables consulted for every key.
pub const ENV_PREFIX: &str = "STING";

/// Steps of one resolution pass, in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Init,
    DefaultsSet,
    FileEnsured,
    SourcesLoaded,
    FlagsBound,
    Decoded,
    Presented,
    Failed,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Init => "init",
            Stage::DefaultsSet => "defaults-set",
            Stage::FileEnsured => "file-ensured",
            Stage::SourcesLoaded => "sources-loaded",
            Stage::FlagsBound => "flags-bound",
            Stage::Decoded => "decoded",
            Stage::Presented => "presented",
            Stage::Failed => "failed",
        };
        f.write_str(name)
    }
}

pub fn enter(stage: Stage) {
    tracing::debug!(stage = %stage, "config resolution");
}

/// Everything resolution reads from the outside world, captured up front.
#[derive(Debug, Clone)]
pub struct ResolutionContext {
    pub cwd: PathBuf,
    pub home: Option<PathBuf>,
    pub env: EnvSnapshot,
    pub config_override: Option<PathBuf>,
    pub name_mode: NameMode,
    pub base_name: String,
    pub env_prefix: String,
}

impl ResolutionContext {
    pub fn new(cwd: PathBuf, home: Option<PathBuf>, env: EnvSnapshot) -> Self {
        Self {
            cwd,
            home,
            env,
            config_override: None,
            name_mode: DEFAULT_NAME_MODE,
            base_name: CONFIG_BASE_NAME.to_string(),
            env_prefix: ENV_PREFIX.to_string(),
        }
    }

    /// Capture the working directory, home directory and environment of this process.
    pub fn from_process() -> Result<Self> {
        let cwd = std::env::current_dir().map_err(|e| ConfigError::io(".", e))?;
        Ok(Self::new(cwd, dirs::home_dir(), EnvSnapshot::from_process()))
    }

    pub fn with_config_override(mut self, path: Option<PathBuf>) -> Self {
        self.config_override = path;
        self
    }

    pub fn with_name_mode(mut self, mode: NameMode) -> Self {
        self.name_mode = mode;
        self
    }

    /// The file created on first run, always in the working directory.
    pub fn default_file_path(&self) -> PathBuf {
        self.cwd.join(format!("{}.yaml", self.base_name))
    }

    fn explicit_config(&self) -> Option<PathBuf> {
        self.config_override.as_deref().map(|p| self.cwd.join(p))
    }
}

/// Run one full resolution pass, leaving the result in `cfg`.
///
/// `cfg` is reset to compiled defaults first and overwritten once, at decode
/// time. Returns the config file that was read, if any.
pub fn initialize_config(
    ctx: &ResolutionContext,
    flags: &mut FlagSet,
    cfg: &mut Config,
) -> Result<Option<PathBuf>> {
    enter(Stage::Init);

    *cfg = Config::default();
    enter(Stage::DefaultsSet);

    ensure_default_file(&ctx.default_file_path(), &*cfg)?;
    enter(Stage::FileEnsured);

    let explicit = ctx.explicit_config();
    let config_file =
        locate_config_file(explicit.as_deref(), &ctx.cwd, ctx.home.as_deref(), &ctx.base_name)?;
    if config_file.is_none() {
        tracing::debug!("No config file found; using environment and defaults only");
    }
    let sources = SourceSet::load(config_file.as_deref(), ctx.env.clone(), &ctx.env_prefix)?;
    enter(Stage::SourcesLoaded);

    let injected = resolve(flags, &sources, ctx.name_mode)?;
    tracing::debug!("{} flag(s) filled from environment or config file", injected);
    enter(Stage::FlagsBound);

    decode_into(cfg, &sources, flags)?;
    enter(Stage::Decoded);

    Ok(sources.file_used().map(Path::to_path_buf))
}
