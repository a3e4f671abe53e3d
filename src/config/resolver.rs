//! Per-flag precedence merge
//!
//! Precedence, highest first: explicit flag > environment > config file > compiled default.

use super::error::{ConfigError, Result};
use super::flags::FlagSet;
use super::naming::{flag_key, NameMode};
use super::sources::{display_value, SourceSet};

/// Fill every flag that was not passed explicitly from the sources.
///
/// Source keys that match no declared flag are ignored. Returns how many
/// flags took a value from a source.
pub fn resolve(flags: &mut FlagSet, sources: &SourceSet, mode: NameMode) -> Result<usize> {
    let mut injected = 0;

    for flag in flags.iter_mut() {
        if flag.changed() {
            continue;
        }

        let key = flag_key(flag.name(), mode);
        let Some((raw, origin)) = sources.lookup(&key) else {
            continue;
        };

        let current = flag.value();
        let value = current.convert(&raw).ok_or_else(|| ConfigError::TypeMismatch {
            flag: flag.name().to_string(),
            value: display_value(&raw),
            expected: current.type_name(),
        })?;

        tracing::debug!(
            "--{} resolved from {:?} key '{}': {}",
            flag.name(),
            origin,
            key,
            display_value(&raw)
        );
        flag.inject(value, origin);
        injected += 1;
    }

    Ok(injected)
}
