//! Declared command-line flags with typed values

use super::interval::Interval;
use super::sources::Origin;
use serde_yaml::Value;

/// A flag's current value in its native type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlagValue {
    Interval(Interval),
    Bool(bool),
}

impl FlagValue {
    pub fn type_name(&self) -> &'static str {
        match self {
            FlagValue::Interval(_) => "a duration such as 30s",
            FlagValue::Bool(_) => "a boolean",
        }
    }

    /// Convert a source value into this flag's type, or `None` if it does not fit.
    pub fn convert(&self, value: &Value) -> Option<FlagValue> {
        match self {
            FlagValue::Interval(_) => match value {
                Value::String(s) => s.parse().ok().map(FlagValue::Interval),
                Value::Number(n) => {
                    n.as_u64().map(|ns| FlagValue::Interval(Interval::from_nanos(ns)))
                }
                _ => None,
            },
            FlagValue::Bool(_) => match value {
                Value::Bool(b) => Some(FlagValue::Bool(*b)),
                Value::Number(n) => match n.as_u64() {
                    Some(0) => Some(FlagValue::Bool(false)),
                    Some(1) => Some(FlagValue::Bool(true)),
                    _ => None,
                },
                Value::String(s) => parse_bool(s).map(FlagValue::Bool),
                _ => None,
            },
        }
    }

    pub fn to_value(&self) -> Value {
        match self {
            FlagValue::Interval(interval) => Value::String(interval.to_string()),
            FlagValue::Bool(b) => Value::Bool(*b),
        }
    }
}

fn parse_bool(text: &str) -> Option<bool> {
    match text {
        "1" | "t" | "T" | "true" | "TRUE" | "True" => Some(true),
        "0" | "f" | "F" | "false" | "FALSE" | "False" => Some(false),
        _ => None,
    }
}

/// One declared flag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlagSpec {
    name: String,
    value: FlagValue,
    changed: bool,
    filled_from: Option<Origin>,
}

impl FlagSpec {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn value(&self) -> FlagValue {
        self.value
    }

    /// Passed explicitly on this invocation.
    pub fn changed(&self) -> bool {
        self.changed
    }

    /// Filled in from the environment or config file.
    pub fn injected(&self) -> bool {
        self.filled_from.is_some()
    }

    /// The source an injected value came from.
    pub fn filled_from(&self) -> Option<Origin> {
        self.filled_from
    }

    pub(crate) fn inject(&mut self, value: FlagValue, origin: Origin) {
        self.value = value;
        self.filled_from = Some(origin);
    }
}

/// The flags a command declares, in declaration order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FlagSet {
    flags: Vec<FlagSpec>,
}

impl FlagSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn declare(mut self, name: impl Into<String>, value: FlagValue, changed: bool) -> Self {
        self.flags.push(FlagSpec { name: name.into(), value, changed, filled_from: None });
        self
    }

    pub fn get(&self, name: &str) -> Option<&FlagSpec> {
        self.flags.iter().find(|f| f.name == name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &FlagSpec> {
        self.flags.iter()
    }

    pub(crate) fn iter_mut(&mut self) -> impl Iterator<Item = &mut FlagSpec> {
        self.flags.iter_mut()
    }

    pub fn interval(&self, name: &str) -> Option<Interval> {
        match self.get(name)?.value {
            FlagValue::Interval(interval) => Some(interval),
            FlagValue::Bool(_) => None,
        }
    }

    pub fn bool(&self, name: &str) -> Option<bool> {
        match self.get(name)?.value {
            FlagValue::Bool(b) => Some(b),
            FlagValue::Interval(_) => None,
        }
    }
}
