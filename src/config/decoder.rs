//! Decoding the layered key space into the typed config

use super::error::{ConfigError, Result};
use super::flags::{FlagSet, FlagSpec};
use super::naming::fold_key;
use super::sources::{display_value, Origin, SourceSet};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_yaml::{Mapping, Value};

/// Overwrite the fields of `target` that have a value in the sources or a bound flag.
///
/// The target's current values are the bottom layer, so fields nobody sets
/// keep their defaults. Layers, lowest first: current value, config file,
/// flags filled from the config file, environment, then flags typed by the
/// user or filled from the environment. Keys that match no field are ignored.
pub fn decode_into<T>(target: &mut T, sources: &SourceSet, flags: &FlagSet) -> Result<()>
where
    T: Serialize + DeserializeOwned,
{
    let base = match serde_yaml::to_value(&*target) {
        Ok(Value::Mapping(mapping)) => mapping,
        Ok(_) => {
            return Err(ConfigError::Serialize("config does not serialize to a mapping".into()))
        }
        Err(e) => return Err(ConfigError::Serialize(e.to_string())),
    };

    let mut layered = base.clone();
    overlay_source(&mut layered, "config file", |field| sources.file_value_folded(field));
    overlay_flags(&mut layered, flags.iter().filter(|f| f.filled_from() == Some(Origin::File)));
    overlay_source(&mut layered, "environment", |field| sources.env_value(field));
    overlay_flags(
        &mut layered,
        flags.iter().filter(|f| f.changed() || f.filled_from() == Some(Origin::Environment)),
    );

    match serde_yaml::from_value::<T>(Value::Mapping(layered.clone())) {
        Ok(decoded) => {
            *target = decoded;
            Ok(())
        }
        Err(err) => Err(pinpoint_failure::<T>(&base, &layered, &err)),
    }
}

fn overlay_source(layered: &mut Mapping, layer: &str, lookup: impl Fn(&str) -> Option<Value>) {
    for (key, slot) in layered.iter_mut() {
        let Some(field) = key.as_str() else {
            continue;
        };
        if let Some(value) = lookup(field) {
            tracing::debug!("{} decoded from {}: {}", field, layer, display_value(&value));
            *slot = value;
        }
    }
}

// Flag names match fields with case and hyphens ignored.
fn overlay_flags<'a>(layered: &mut Mapping, flags: impl Iterator<Item = &'a FlagSpec>) {
    for flag in flags {
        let wanted = fold_key(flag.name());
        for (key, slot) in layered.iter_mut() {
            if key.as_str().map(fold_key).as_deref() == Some(wanted.as_str()) {
                *slot = flag.value().to_value();
            }
        }
    }
}

/// Find the single field whose layered value breaks decoding.
fn pinpoint_failure<T: DeserializeOwned>(
    base: &Mapping,
    layered: &Mapping,
    err: &serde_yaml::Error,
) -> ConfigError {
    for (key, value) in layered {
        if base.get(key) == Some(value) {
            continue;
        }
        let mut probe = base.clone();
        probe.insert(key.clone(), value.clone());
        if let Err(field_err) = serde_yaml::from_value::<T>(Value::Mapping(probe)) {
            return ConfigError::Decode {
                field: key.as_str().map(str::to_string).unwrap_or_else(|| display_value(key)),
                expected: expectation(&field_err),
                actual: display_value(value),
            };
        }
    }

    ConfigError::Decode {
        field: "(config)".to_string(),
        expected: expectation(err),
        actual: "the combined value set".to_string(),
    }
}

// serde phrases type errors as "invalid type: <actual>, expected <what>".
fn expectation(err: &serde_yaml::Error) -> String {
    let message = err.to_string();
    match message.split_once(", expected ") {
        Some((_, expected)) => expected.to_string(),
        None => message,
    }
}
