//! Configuration loading and merging
//!
//! Resolves one typed [`Config`] from command-line flags, `STING_*` environment
//! variables and a `jetpalm.yaml` config file, with precedence
//! (Flags > Env > File > Defaults).

pub mod context;
pub mod decoder;
pub mod defaults;
pub mod error;
pub mod flags;
pub mod interval;
pub mod naming;
pub mod resolver;
pub mod sources;
pub mod types;

pub use context::{initialize_config, ResolutionContext, Stage};
pub use error::ConfigError;
pub use flags::{FlagSet, FlagSpec, FlagValue};
pub use interval::Interval;
pub use naming::NameMode;
pub use sources::{EnvSnapshot, Origin, SourceSet};
pub use types::{ClientConfig, Config, DEFAULT_PUSH_FREQUENCY};
