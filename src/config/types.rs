//! The resolved configuration

use super::interval::Interval;
use serde::{Deserialize, Serialize};

pub const DEFAULT_PUSH_FREQUENCY: Interval = Interval::from_secs(60);

/// Settings for talking to the upstream collector.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientConfig {
    /// How often buffered data is pushed.
    #[serde(rename = "pushfrequency")]
    pub push_frequency: Interval,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self { push_frequency: DEFAULT_PUSH_FREQUENCY }
    }
}

/// Everything the program needs once flags, environment and file are merged.
///
/// The client section is flattened: its keys live at the top level of the
/// config file.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(flatten)]
    pub client: ClientConfig,
    pub toggle: bool,
}
