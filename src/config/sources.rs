//! Config file discovery plus the file and environment key-value sources

use super::error::{ConfigError, Result};
use super::naming::{env_var_name, fold_key};
use serde_yaml::{Mapping, Value};
use std::collections::BTreeMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// Extensions tried, in order, for every candidate file name.
///
/// `yaml` comes after `json` and `toml`, so a hand-written `jetpalm.toml`
/// is read instead of the generated `jetpalm.yaml`.
pub const CONFIG_EXTENSIONS: &[&str] = &["json", "toml", "yaml", "yml"];

/// Where a source value came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Origin {
    Environment,
    File,
}

/// Environment variables captured once per invocation.
///
/// Empty values count as unset.
#[derive(Debug, Clone, Default)]
pub struct EnvSnapshot {
    vars: BTreeMap<String, String>,
}

impl EnvSnapshot {
    pub fn from_process() -> Self {
        // Variables that are not valid unicode cannot name a config key.
        std::env::vars_os()
            .filter_map(|(k, v)| Some((k.into_string().ok()?, v.into_string().ok()?)))
            .collect()
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.vars.get(name).map(String::as_str).filter(|v| !v.is_empty())
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for EnvSnapshot {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self { vars: iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect() }
    }
}

/// Find the config file to read.
///
/// An explicit path must exist. Otherwise `<base>.<ext>` is tried in `cwd`,
/// then `.<base>.<ext>` in the home directory; finding nothing is not an error.
pub fn locate_config_file(
    explicit: Option<&Path>,
    cwd: &Path,
    home: Option<&Path>,
    base_name: &str,
) -> Result<Option<PathBuf>> {
    if let Some(path) = explicit {
        return match fs::metadata(path) {
            Ok(_) => Ok(Some(path.to_path_buf())),
            Err(e) => Err(ConfigError::io(path, e)),
        };
    }

    if let Some(found) = first_existing(cwd, base_name) {
        return Ok(Some(found));
    }

    let home = home.ok_or(ConfigError::HomeDirUnavailable)?;
    Ok(first_existing(home, &format!(".{}", base_name)))
}

fn first_existing(dir: &Path, stem: &str) -> Option<PathBuf> {
    CONFIG_EXTENSIONS
        .iter()
        .map(|ext| dir.join(format!("{}.{}", stem, ext)))
        .find(|candidate| candidate.is_file())
}

/// Parse a config file into its top-level key/value mapping.
pub fn read_config_file(path: &Path) -> Result<Mapping> {
    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("").to_ascii_lowercase();
    if !CONFIG_EXTENSIONS.contains(&ext.as_str()) {
        return Err(ConfigError::UnsupportedFormat { path: path.to_path_buf(), extension: ext });
    }

    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == ErrorKind::InvalidData => {
            return Err(ConfigError::parse(path, "file is not valid UTF-8"))
        }
        Err(e) => return Err(ConfigError::io(path, e)),
    };

    let raw: Value = match ext.as_str() {
        "toml" => {
            let parsed: toml::Value =
                toml::from_str(&content).map_err(|e| ConfigError::parse(path, e))?;
            serde_yaml::to_value(parsed).map_err(|e| ConfigError::parse(path, e))?
        }
        "json" => {
            let parsed: serde_json::Value =
                serde_json::from_str(&content).map_err(|e| ConfigError::parse(path, e))?;
            serde_yaml::to_value(parsed).map_err(|e| ConfigError::parse(path, e))?
        }
        _ => serde_yaml::from_str(&content).map_err(|e| ConfigError::parse(path, e))?,
    };

    match raw {
        Value::Mapping(mapping) => Ok(mapping),
        // An empty YAML document.
        Value::Null => Ok(Mapping::new()),
        other => Err(ConfigError::parse(
            path,
            format!("expected a mapping at the top level, found {}", describe_value(&other)),
        )),
    }
}

/// Values read from one config file, keys lowercased.
#[derive(Debug, Clone)]
pub struct FileSource {
    path: PathBuf,
    entries: Vec<(String, Value)>,
}

impl FileSource {
    pub fn load(path: &Path) -> Result<Self> {
        let mapping = read_config_file(path)?;
        Ok(Self::from_mapping(path.to_path_buf(), mapping))
    }

    fn from_mapping(path: PathBuf, mapping: Mapping) -> Self {
        let entries = mapping
            .into_iter()
            .filter_map(|(k, v)| match k {
                Value::String(key) => Some((key.to_lowercase(), v)),
                Value::Number(n) => Some((n.to_string(), v)),
                Value::Bool(b) => Some((b.to_string(), v)),
                _ => None,
            })
            .collect();
        Self { path, entries }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    // Later entries shadow earlier ones that collide after lowercasing.
    fn find(&self, matches: impl Fn(&str) -> bool) -> Option<&Value> {
        self.entries.iter().rev().find(|(k, _)| matches(k.as_str())).map(|(_, v)| v)
    }
}

/// The file and environment sources seen through one lookup interface.
///
/// Every lookup checks the prefixed environment variable before the file,
/// so environment values override file values for the same key.
#[derive(Debug, Clone)]
pub struct SourceSet {
    file: Option<FileSource>,
    env: EnvSnapshot,
    env_prefix: String,
}

impl SourceSet {
    pub fn new(file: Option<FileSource>, env: EnvSnapshot, env_prefix: impl Into<String>) -> Self {
        Self { file, env, env_prefix: env_prefix.into() }
    }

    /// Read `config_file` (if any) and attach the environment.
    pub fn load(config_file: Option<&Path>, env: EnvSnapshot, env_prefix: &str) -> Result<Self> {
        let file = config_file.map(FileSource::load).transpose()?;
        Ok(Self::new(file, env, env_prefix))
    }

    pub fn file_used(&self) -> Option<&Path> {
        self.file.as_ref().map(FileSource::path)
    }

    /// Value for `key`, with file keys compared case-insensitively.
    pub fn get(&self, key: &str) -> Option<Value> {
        self.lookup(key).map(|(value, _)| value)
    }

    /// Like [`SourceSet::get`], also reporting which source answered.
    pub fn lookup(&self, key: &str) -> Option<(Value, Origin)> {
        if let Some(value) = self.env_value(key) {
            return Some((value, Origin::Environment));
        }
        let wanted = key.to_lowercase();
        let value = self.file.as_ref()?.find(|k| k == wanted)?;
        Some((value.clone(), Origin::File))
    }

    /// File value for `key`, ignoring case and hyphens. The environment is
    /// not consulted.
    pub fn file_value_folded(&self, key: &str) -> Option<Value> {
        let wanted = fold_key(key);
        self.file.as_ref()?.find(|k| fold_key(k) == wanted).cloned()
    }

    /// Value of the `<PREFIX>_<KEY>` environment variable, if set and non-empty.
    pub fn env_value(&self, key: &str) -> Option<Value> {
        let name = env_var_name(&self.env_prefix, key);
        let raw = self.env.get(&name)?;
        tracing::trace!("{} read from {}", key, name);
        Some(scalar_from_env(raw))
    }
}

/// Environment values stay text unless they spell a YAML boolean.
///
/// Numbers are not typed: `10` must not decode as a nanosecond count.
fn scalar_from_env(raw: &str) -> Value {
    match serde_yaml::from_str::<Value>(raw) {
        Ok(value @ Value::Bool(_)) => value,
        _ => Value::String(raw.to_string()),
    }
}

/// Short human-readable rendering of a source value for error messages.
pub fn display_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::Null => "null".to_string(),
        other => serde_yaml::to_string(other)
            .map(|s| s.trim_end().replace('\n', " "))
            .unwrap_or_else(|_| describe_value(other).to_string()),
    }
}

pub fn describe_value(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Sequence(_) => "a sequence",
        Value::Mapping(_) => "a mapping",
        Value::Tagged(_) => "a tagged value",
    }
}

#[cfg(test)]
pub(crate) fn yaml_sources(yaml: &str, env: &[(&str, &str)]) -> SourceSet {
    let mapping: Mapping = serde_yaml::from_str(yaml).expect("test yaml");
    let file = FileSource::from_mapping(PathBuf::from("test.yaml"), mapping);
    SourceSet::new(Some(file), env.iter().copied().collect(), "STING")
}
