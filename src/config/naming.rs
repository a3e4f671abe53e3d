//! Mapping between flag names, source keys and environment variable names

/// How a flag's long name becomes the key looked up in the file and environment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NameMode {
    /// `push-frequency` is looked up as `push-frequency`.
    #[default]
    Identity,
    /// `push-frequency` is looked up as `pushfrequency`.
    FoldHyphens,
}

/// Mode the binary is built with.
pub const DEFAULT_NAME_MODE: NameMode = NameMode::Identity;

pub fn flag_key(name: &str, mode: NameMode) -> String {
    match mode {
        NameMode::Identity => name.to_string(),
        NameMode::FoldHyphens => name.replace('-', ""),
    }
}

/// Form used to match source keys against struct fields: case-insensitive,
/// hyphens ignored.
pub fn fold_key(key: &str) -> String {
    key.chars().filter(|c| *c != '-').flat_map(char::to_lowercase).collect()
}

/// `STING` + `push-frequency` -> `STING_PUSH_FREQUENCY`
pub fn env_var_name(prefix: &str, key: &str) -> String {
    let key = key.to_uppercase().replace('-', "_");
    if prefix.is_empty() {
        key
    } else {
        format!("{}_{}", prefix.to_uppercase(), key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity_mode_keeps_flag_name() {
        assert_eq!(flag_key("push-frequency", NameMode::Identity), "push-frequency");
        assert_eq!(flag_key("toggle", NameMode::Identity), "toggle");
    }

    #[test]
    fn test_fold_mode_drops_every_hyphen() {
        assert_eq!(flag_key("push-frequency", NameMode::FoldHyphens), "pushfrequency");
        assert_eq!(flag_key("a-b-c", NameMode::FoldHyphens), "abc");
    }

    #[test]
    fn test_default_mode_is_identity() {
        assert_eq!(DEFAULT_NAME_MODE, NameMode::Identity);
        assert_eq!(NameMode::default(), NameMode::Identity);
    }

    #[test]
    fn test_fold_key_ignores_case_and_hyphens() {
        assert_eq!(fold_key("PushFrequency"), "pushfrequency");
        assert_eq!(fold_key("push-frequency"), "pushfrequency");
        assert_eq!(fold_key("TOGGLE"), "toggle");
    }

    #[test]
    fn test_env_var_name_uppercases_and_translates_hyphens() {
        assert_eq!(env_var_name("STING", "pushfrequency"), "STING_PUSHFREQUENCY");
        assert_eq!(env_var_name("STING", "push-frequency"), "STING_PUSH_FREQUENCY");
        assert_eq!(env_var_name("sting", "toggle"), "STING_TOGGLE");
        assert_eq!(env_var_name("", "toggle"), "TOGGLE");
    }
}
